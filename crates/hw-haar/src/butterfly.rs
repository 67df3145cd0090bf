//! Fixed 2x2 Haar butterflies in widened integer arithmetic.
//!
//! Both directions widen `u8` samples to `i32`, combine them, and narrow the
//! result back to `u8`. The forward direction divides by 4 first, truncating
//! toward zero. Narrowing wraps modulo 256 unless [`Narrowing::Clamp`] is
//! selected, so forward followed by inverse is not the identity in general.

/// How a widened butterfly result returns to the 8-bit storage domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Narrowing {
    /// Keep the low 8 bits (two's complement modulo 256).
    #[default]
    Wrap,
    /// Saturate to `0..=255`.
    Clamp,
}

impl Narrowing {
    #[inline]
    pub fn narrow(self, v: i32) -> u8 {
        match self {
            Self::Wrap => v as u8,
            Self::Clamp => v.clamp(0, u8::MAX as i32) as u8,
        }
    }
}

/// One block's coefficients, in band order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coefficients {
    pub approximation: u8,
    pub horizontal: u8,
    pub vertical: u8,
    pub diagonal: u8,
}

/// Forward butterfly over the block `[a b; c d]`.
#[inline]
pub fn forward_block(a: u8, b: u8, c: u8, d: u8, narrowing: Narrowing) -> Coefficients {
    let (a, b, c, d) = (a as i32, b as i32, c as i32, d as i32);
    // Rust integer division truncates toward zero.
    Coefficients {
        approximation: narrowing.narrow(((a + b) + (c + d)) / 4),
        horizontal: narrowing.narrow(((a + b) - (c + d)) / 4),
        vertical: narrowing.narrow(((a - b) + (c - d)) / 4),
        diagonal: narrowing.narrow(((a - b) - (c - d)) / 4),
    }
}

/// Inverse butterfly, returning `[top_left, top_right, bottom_left, bottom_right]`.
#[inline]
pub fn inverse_block(coef: Coefficients, narrowing: Narrowing) -> [u8; 4] {
    let a = coef.approximation as i32;
    let h = coef.horizontal as i32;
    let v = coef.vertical as i32;
    let d = coef.diagonal as i32;
    [
        narrowing.narrow(a + h + v + d),
        narrowing.narrow(a - h + v - d),
        narrowing.narrow(a + h - v - d),
        narrowing.narrow(a - h - v + d),
    ]
}

#[cfg(test)]
mod tests {
    use super::{Coefficients, Narrowing, forward_block, inverse_block};

    #[test]
    fn reference_block_numeric_path() {
        let coef = forward_block(200, 40, 10, 90, Narrowing::Wrap);
        assert_eq!(
            coef,
            Coefficients {
                approximation: 85,
                horizontal: 35,
                vertical: 20,
                diagonal: 60,
            }
        );

        // The inverse swaps the off-diagonal samples of this block.
        assert_eq!(inverse_block(coef, Narrowing::Wrap), [200, 10, 40, 90]);
    }

    #[test]
    fn negative_intermediates_wrap() {
        // (0 - 255 + 0 - 0) / 4 truncates to -63, stored as 193.
        let coef = forward_block(0, 255, 0, 0, Narrowing::Wrap);
        assert_eq!(
            coef,
            Coefficients {
                approximation: 63,
                horizontal: 63,
                vertical: 193,
                diagonal: 193,
            }
        );

        // 63 + 63 + 193 + 193 = 512 -> 0, and 63 + 63 - 193 - 193 = -260 -> 252.
        assert_eq!(inverse_block(coef, Narrowing::Wrap), [0, 0, 252, 0]);
    }

    #[test]
    fn truncation_is_toward_zero() {
        // 765 / 4 = 191.25 -> 191, and -255 / 4 = -63.75 -> -63 (193), not -64.
        let coef = forward_block(0, 255, 255, 255, Narrowing::Wrap);
        assert_eq!(
            coef,
            Coefficients {
                approximation: 191,
                horizontal: 193,
                vertical: 193,
                diagonal: 193,
            }
        );

        // -510 / 4 = -127.5 -> -127.
        let coef = forward_block(0, 0, 255, 255, Narrowing::Wrap);
        assert_eq!(coef.horizontal, 129);
        assert_eq!(coef.vertical, 0);
    }

    #[test]
    fn clamp_saturates_instead_of_wrapping() {
        let coef = forward_block(0, 255, 0, 0, Narrowing::Clamp);
        assert_eq!(coef.vertical, 0);
        assert_eq!(coef.diagonal, 0);
        assert_eq!(inverse_block(coef, Narrowing::Clamp), [126, 0, 126, 0]);
    }

    #[test]
    fn modes_agree_inside_range() {
        let wrap = forward_block(200, 40, 10, 90, Narrowing::Wrap);
        let clamp = forward_block(200, 40, 10, 90, Narrowing::Clamp);
        assert_eq!(wrap, clamp);
        assert_eq!(
            inverse_block(wrap, Narrowing::Wrap),
            inverse_block(clamp, Narrowing::Clamp)
        );
    }
}
