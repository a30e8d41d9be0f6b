//! nf-state: Persistence for the notch filter bank
//!
//! Snapshots of per-channel notch settings and the bank configuration,
//! stored as JSON.

mod config_file;
mod error;
mod snapshot;

pub use config_file::*;
pub use error::*;
pub use snapshot::*;
