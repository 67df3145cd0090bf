//! Umbrella crate for the Haar wavelet workspace.
//!
//! Re-exports the pixel buffer layer and the transform crate so callers
//! depend on a single crate.

pub use hw_core::*;
pub use hw_haar::*;
