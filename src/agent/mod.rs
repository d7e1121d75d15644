//! Agent system
//!
//! An `Agent` owns one replaceable streaming call function. Provider-aware
//! request shaping wraps that function at setup time:
//! - `base`: the `Agent` type, its stream function, and provider wiring
//! - `extra_params`: default-header injection and extra-parameter merging
mod base;
mod extra_params;

pub use base::*;
pub use extra_params::*;
