use hw_core::{Error, Image, ImageView};

use crate::butterfly::{Coefficients, Narrowing, inverse_block};
use crate::subband::SubbandSet;

/// Rebuilds the `2w x 2h` level input from one subband set.
///
/// The result generally differs from the original input: the forward
/// division truncates and both directions narrow to 8 bits.
pub fn haar_inverse(set: &SubbandSet, narrowing: Narrowing) -> Image<u8> {
    inverse_from(&set.approximation().as_view(), set, narrowing)
}

/// Like [`haar_inverse`], but takes the approximation band from `approximation`
/// instead of the set. Used to feed a coarser level's reconstruction back in.
pub fn haar_inverse_with_approximation(
    set: &SubbandSet,
    approximation: &ImageView<'_, u8>,
    narrowing: Narrowing,
) -> Result<Image<u8>, Error> {
    if approximation.dims() != set.dims() {
        return Err(Error::BandMismatch {
            expected: set.dims(),
            actual: approximation.dims(),
        });
    }
    Ok(inverse_from(approximation, set, narrowing))
}

pub(crate) fn inverse_from(
    approximation: &ImageView<'_, u8>,
    set: &SubbandSet,
    narrowing: Narrowing,
) -> Image<u8> {
    debug_assert_eq!(approximation.dims(), set.dims());

    let (w, h) = set.dims();
    let out_w = 2 * w;
    let mut out = Image::new_fill(out_w, 2 * h, 0u8);
    if w == 0 || h == 0 {
        return out;
    }

    let horizontal = set.horizontal().as_view();
    let vertical = set.vertical().as_view();
    let diagonal = set.diagonal().as_view();

    for (y, rows) in out.data_mut().chunks_exact_mut(2 * out_w).enumerate() {
        let (top, bottom) = rows.split_at_mut(out_w);
        let coefs = approximation
            .row(y)
            .iter()
            .zip(horizontal.row(y))
            .zip(vertical.row(y))
            .zip(diagonal.row(y));

        for (x, (((&a, &hz), &v), &d)) in coefs.enumerate() {
            let coef = Coefficients {
                approximation: a,
                horizontal: hz,
                vertical: v,
                diagonal: d,
            };
            let [tl, tr, bl, br] = inverse_block(coef, narrowing);
            top[2 * x] = tl;
            top[2 * x + 1] = tr;
            bottom[2 * x] = bl;
            bottom[2 * x + 1] = br;
        }
    }

    out
}
