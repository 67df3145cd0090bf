//! Quadrant montage of subbands for visualisation.
//!
//! Layout of one level, for bands of `w x h`:
//!
//! ```text
//! +---------------+---------------+
//! | approximation |   vertical    |
//! +---------------+---------------+
//! |  horizontal   |   diagonal    |
//! +---------------+---------------+
//! ```
//!
//! Quadrant offsets are `w` columns and `h` rows, so non-square levels tile
//! without overlap. The montage is not an inverse transform.

use hw_core::{Image, ImageView};

use crate::decomposition::Decomposition;
use crate::subband::SubbandSet;

/// Tiles one level into a `2w x 2h` buffer.
pub fn merge_subbands(set: &SubbandSet) -> Image<u8> {
    tile(&set.approximation().as_view(), set)
}

/// Nested montage of the whole pyramid at source resolution.
///
/// The coarsest level is tiled first; each tile then stands in for the
/// approximation band of the next finer level. The decomposition itself is
/// left untouched.
pub fn merge_decomposition(decomposition: &Decomposition) -> Image<u8> {
    let (coarsest, finer) = decomposition
        .levels()
        .split_last()
        .expect("decomposition has at least one level");

    let mut montage = merge_subbands(coarsest);
    for set in finer.iter().rev() {
        montage = tile(&montage.as_view(), set);
    }

    ldebug!(
        "merged {} levels into {}x{} montage",
        decomposition.num_levels(),
        montage.width(),
        montage.height()
    );
    montage
}

fn tile(approximation: &ImageView<'_, u8>, set: &SubbandSet) -> Image<u8> {
    debug_assert_eq!(approximation.dims(), set.dims());

    let (w, h) = set.dims();
    let mut out = Image::new_fill(2 * w, 2 * h, 0u8);
    if w == 0 || h == 0 {
        return out;
    }

    let quadrants = [
        (0, 0, *approximation),
        (w, 0, set.vertical().as_view()),
        (0, h, set.horizontal().as_view()),
        (w, h, set.diagonal().as_view()),
    ];
    let mut canvas = out.as_view_mut();
    for (x, y, band) in quadrants {
        canvas
            .subview_mut(x, y, w, h)
            .and_then(|mut dst| dst.copy_from(&band))
            .expect("quadrant fits a 2w x 2h canvas");
    }

    out
}
