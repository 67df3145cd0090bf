//! Foundational primitives for the Haar wavelet workspace.
//!
//! ## Images and Stride
//! [`Image`] owns a tightly packed row-major buffer. [`ImageView`] and
//! [`ImageViewMut`] borrow a window whose `stride` (in elements, not bytes)
//! may exceed `width`, which lets transforms read from subviews and lets the
//! montage write each band straight into its quadrant of the canvas.
//!
//! ## Sources
//! [`ImageSource`] is the seam to whatever produces pixels (files, decoders,
//! cameras). The transform crates never perform I/O themselves.

mod error;
mod image;
mod source;

pub use error::Error;
pub use image::{Image, ImageView, ImageViewMut};
pub use source::ImageSource;
