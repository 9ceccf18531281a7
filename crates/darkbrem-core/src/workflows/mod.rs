//! # Workflows Module
//!
//! End-to-end entry points for front ends.
//!
//! - **Cross-section tables** ([`xsec_table`]) - Per-atom cross sections over an
//!   energy scan for one target element, computed in parallel.
//! - **Scaled sampling** ([`scample`]) - Batches of rescaled recoil leptons at a
//!   fixed incident energy, for checking scaling methods outside a host engine.

pub mod scample;
pub mod xsec_table;
