//! # Core Module
//!
//! Stateless physics building blocks for dark bremsstrahlung.
//!
//! ## Overview
//!
//! - **Units** ([`units`]) - The MeV/mm unit system and cross-section conversions
//! - **Particles** ([`particle`]) - Lepton species and the dark photon definition
//! - **Kinematics** ([`kinematics`]) - Four-momenta, Lorentz boosts and frame rotations
//! - **Integration** ([`quadrature`]) - Adaptive Gauss–Kronrod quadrature
//! - **Form factors** ([`form_factor`]) - Elastic and inelastic photon flux factors
//! - **Cross sections** ([`xsec`]) - The Weizsäcker–Williams cross-section estimator
//! - **Event libraries** ([`library`]) - Pre-generated vertices and sampling cursors
//! - **Targets** ([`elements`]) - A small table of common target elements

pub mod elements;
pub mod form_factor;
pub mod kinematics;
pub mod library;
pub mod particle;
pub mod quadrature;
pub mod units;
pub mod xsec;
