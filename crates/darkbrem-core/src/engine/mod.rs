//! # Engine Module
//!
//! Stateful, per-context pieces built on top of [`crate::core`]: the model
//! configuration, kinematic scaling of library samples, the per-element
//! cross-section cache, the [`model::DarkBremModel`] composition root and the
//! host-facing [`process::DarkBremProcess`].

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod process;
pub mod progress;
pub mod scaling;
