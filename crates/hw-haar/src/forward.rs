use hw_core::{Error, ImageView};

use crate::butterfly::{Narrowing, forward_block};
use crate::exec::{Execution, Executor};
use crate::subband::SubbandSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformConfig {
    pub execution: Execution,
    pub narrowing: Narrowing,
}

/// Single-level forward Haar transform.
///
/// Output bands are `(src.width() / 2, src.height() / 2)`. Odd input
/// dimensions are rejected before any band is allocated.
pub fn haar_forward(src: &ImageView<'_, u8>, cfg: &TransformConfig) -> Result<SubbandSet, Error> {
    check_even(src)?;
    let executor = Executor::new(cfg.execution)?;
    forward_with(src, cfg.narrowing, &executor)
}

pub(crate) fn forward_with(
    src: &ImageView<'_, u8>,
    narrowing: Narrowing,
    executor: &Executor,
) -> Result<SubbandSet, Error> {
    check_even(src)?;

    let (dst_w, dst_h) = (src.width() / 2, src.height() / 2);
    let mut set = SubbandSet::zeroed(dst_w, dst_h);
    if dst_w == 0 || dst_h == 0 {
        return Ok(set);
    }

    ltrace!(
        "forward {}x{} -> {}x{}",
        src.width(),
        src.height(),
        dst_w,
        dst_h
    );

    let src = *src;
    executor.for_each_band_row(set.bands_mut(), dst_w, |y, [a, h, v, d]| {
        let top = src.row(2 * y);
        let bottom = src.row(2 * y + 1);
        let blocks = top.chunks_exact(2).zip(bottom.chunks_exact(2));
        let outputs = a.iter_mut().zip(h.iter_mut()).zip(v.iter_mut()).zip(d.iter_mut());

        for ((t, b), (((a, h), v), d)) in blocks.zip(outputs) {
            let coef = forward_block(t[0], t[1], b[0], b[1], narrowing);
            *a = coef.approximation;
            *h = coef.horizontal;
            *v = coef.vertical;
            *d = coef.diagonal;
        }
    });

    Ok(set)
}

fn check_even(src: &ImageView<'_, u8>) -> Result<(), Error> {
    if !src.width().is_multiple_of(2) || !src.height().is_multiple_of(2) {
        return Err(Error::InvalidDimensions {
            width: src.width(),
            height: src.height(),
            level: 0,
        });
    }
    Ok(())
}
