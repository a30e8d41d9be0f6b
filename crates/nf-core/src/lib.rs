//! nf-core: Shared types for the notch filter bank
//!
//! Sample type, error types, parameter ranges, the host topology
//! interface and bank configuration.

mod config;
mod error;
mod params;
mod topology;

pub use config::*;
pub use error::*;
pub use params::*;
pub use topology::*;

/// Type alias for signal samples (always f64 for maximum precision)
pub type Sample = f64;
