//! # Dark Bremsstrahlung Library
//!
//! Cross sections and outgoing kinematics for dark bremsstrahlung, the
//! radiation of a massive dark photon (A') by a charged lepton scattering off
//! a nucleus, for use inside a particle transport simulation.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless physics: units, particle
//!   definitions, four-vector kinematics, adaptive quadrature, nuclear form
//!   factors, the Weizsäcker–Williams cross-section estimator and the event
//!   library of pre-generated vertices.
//!
//! - **[`engine`]: Per-context state.** The model configuration, the scaling
//!   engine that maps library samples onto the actual incident energy, the
//!   per-element cross-section cache, the [`engine::model::DarkBremModel`]
//!   composition root and the host-facing [`engine::process::DarkBremProcess`].
//!   Every execution context owns its own instances; nothing is shared mutably.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built on the two
//!   layers above, such as cross-section table generation.

pub mod core;
pub mod engine;
pub mod workflows;
