use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    OutOfBounds,
    InvalidStride,
    /// Decomposition depth below one.
    InvalidDepth {
        levels: usize,
    },
    /// The input of `level` would have an odd width or height.
    ///
    /// `width` and `height` are the dimensions of the source image, not of
    /// the offending level.
    InvalidDimensions {
        width: usize,
        height: usize,
        level: usize,
    },
    /// The four bands of a subband set disagree on their dimensions.
    BandMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    SourceUnavailable(String),
    WorkerPool(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::InvalidDepth { levels } => {
                write!(f, "invalid depth {levels}: at least one level is required")
            }
            Self::InvalidDimensions {
                width,
                height,
                level,
            } => write!(
                f,
                "invalid dimensions {width}x{height}: level {level} input is not evenly divisible by 2"
            ),
            Self::BandMismatch { expected, actual } => write!(
                f,
                "subband dimensions differ: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::SourceUnavailable(reason) => write!(f, "image source unavailable: {reason}"),
            Self::WorkerPool(reason) => write!(f, "failed to build worker pool: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
