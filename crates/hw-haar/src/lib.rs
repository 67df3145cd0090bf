//! Multi-level 2D Haar decomposition for single-channel 8-bit images.
//!
//! Each level splits its input into four half-size bands with a fixed 2x2
//! butterfly over non-overlapping blocks `[a b; c d]`:
//!
//! - approximation: `((a + b) + (c + d)) / 4`
//! - horizontal: `((a + b) - (c + d)) / 4`
//! - vertical: `((a - b) + (c - d)) / 4`
//! - diagonal: `((a - b) - (c - d)) / 4`
//!
//! Arithmetic is done in `i32`, division truncates toward zero, and results
//! are narrowed to `u8` by wrapping modulo 256 ([`Narrowing::Wrap`], the
//! default) or, opt-in, by saturating ([`Narrowing::Clamp`]). The transform
//! is therefore lossy: [`haar_inverse`] does not in general restore the input.
//!
//! Dimension policy:
//! - A depth of `L` requires both source dimensions to be divisible by `2^L`.
//! - Depth is validated before any band is allocated; there is no partial
//!   pyramid.
//!
//! Parallelism:
//! - [`Execution::Parallel`] distributes output rows of a level over a rayon
//!   pool. Results are bit-identical to [`Execution::Sequential`].
//! - Levels are computed strictly in order.

#[macro_use]
mod log;

mod butterfly;
mod decomposition;
mod exec;
mod forward;
mod inverse;
mod montage;
mod subband;

pub use butterfly::{Coefficients, Narrowing, forward_block, inverse_block};
pub use decomposition::{
    DecomposeConfig, Decomposer, Decomposition, decompose, decompose_source, validate_depth,
};
pub use exec::Execution;
pub use forward::{TransformConfig, haar_forward};
pub use inverse::{haar_inverse, haar_inverse_with_approximation};
pub use montage::{merge_decomposition, merge_subbands};
pub use subband::{Band, SubbandSet};
