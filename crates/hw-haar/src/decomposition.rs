use hw_core::{Error, Image, ImageSource, ImageView};

use crate::butterfly::Narrowing;
use crate::exec::Executor;
use crate::forward::{TransformConfig, forward_with};
use crate::inverse::{haar_inverse, inverse_from};
use crate::montage::merge_decomposition;
use crate::subband::SubbandSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecomposeConfig {
    pub levels: usize,
    pub transform: TransformConfig,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            levels: 3,
            transform: TransformConfig::default(),
        }
    }
}

/// Ordered subband sets of a multi-level decomposition.
///
/// Level 0 transforms the source image; level `k` transforms the
/// approximation band of level `k - 1`. Bands of level `k` are
/// `(width >> (k + 1), height >> (k + 1))`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    width: usize,
    height: usize,
    levels: Vec<SubbandSet>,
}

impl Decomposition {
    pub fn source_width(&self) -> usize {
        self.width
    }

    pub fn source_height(&self) -> usize {
        self.height
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, k: usize) -> Option<&SubbandSet> {
        self.levels.get(k)
    }

    pub fn levels(&self) -> &[SubbandSet] {
        &self.levels
    }

    pub fn into_levels(self) -> Vec<SubbandSet> {
        self.levels
    }

    /// Inverse of level `k` alone, using that level's stored approximation.
    pub fn inverse_level(&self, k: usize, narrowing: Narrowing) -> Option<Image<u8>> {
        self.levels.get(k).map(|set| haar_inverse(set, narrowing))
    }

    /// Inverts every level from the coarsest up, feeding each result in as
    /// the next finer approximation. Returns a source-sized image.
    pub fn reconstruct(&self, narrowing: Narrowing) -> Image<u8> {
        let (coarsest, finer) = self
            .levels
            .split_last()
            .expect("decomposition has at least one level");

        let mut current = haar_inverse(coarsest, narrowing);
        for set in finer.iter().rev() {
            current = inverse_from(&current.as_view(), set, narrowing);
        }
        current
    }

    /// Nested quadrant montage; see [`merge_decomposition`].
    pub fn merge(&self) -> Image<u8> {
        merge_decomposition(self)
    }
}

/// Checks that `levels` halvings of `width x height` stay integral.
///
/// Reports the first level whose input would have an odd dimension.
pub fn validate_depth(width: usize, height: usize, levels: usize) -> Result<(), Error> {
    if levels == 0 {
        return Err(Error::InvalidDepth { levels });
    }

    let (mut w, mut h) = (width, height);
    for level in 0..levels {
        if !w.is_multiple_of(2) || !h.is_multiple_of(2) {
            return Err(Error::InvalidDimensions {
                width,
                height,
                level,
            });
        }
        w /= 2;
        h /= 2;
    }
    Ok(())
}

/// Reusable decomposition engine.
///
/// Owns its execution strategy, so a parallel decomposer builds its worker
/// pool once and reuses it for every image. Decomposers with different
/// worker counts are independent of each other.
#[derive(Debug)]
pub struct Decomposer {
    config: DecomposeConfig,
    executor: Executor,
}

impl Decomposer {
    pub fn new(config: DecomposeConfig) -> Result<Self, Error> {
        if config.levels == 0 {
            return Err(Error::InvalidDepth {
                levels: config.levels,
            });
        }
        let executor = Executor::new(config.transform.execution)?;
        Ok(Self { config, executor })
    }

    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }

    pub fn decompose(&self, src: &ImageView<'_, u8>) -> Result<Decomposition, Error> {
        let num_levels = self.config.levels;
        validate_depth(src.width(), src.height(), num_levels)?;
        ldebug!(
            "decomposing {}x{} into {} levels",
            src.width(),
            src.height(),
            num_levels
        );

        let narrowing = self.config.transform.narrowing;
        let mut levels: Vec<SubbandSet> = Vec::with_capacity(num_levels);
        levels.push(forward_with(src, narrowing, &self.executor)?);
        for k in 1..num_levels {
            let next = forward_with(
                &levels[k - 1].approximation().as_view(),
                narrowing,
                &self.executor,
            )?;
            ltrace!("level {} bands are {}x{}", k, next.width(), next.height());
            levels.push(next);
        }

        Ok(Decomposition {
            width: src.width(),
            height: src.height(),
            levels,
        })
    }

    /// Pulls one image from `source` and decomposes it. Source failures are
    /// returned unchanged.
    pub fn decompose_source<S: ImageSource>(&self, mut source: S) -> Result<Decomposition, Error> {
        let img = source.read_u8()?;
        self.decompose(&img.as_view())
    }
}

/// One-shot [`Decomposer::decompose`].
pub fn decompose(src: &ImageView<'_, u8>, config: &DecomposeConfig) -> Result<Decomposition, Error> {
    validate_depth(src.width(), src.height(), config.levels)?;
    Decomposer::new(*config)?.decompose(src)
}

/// One-shot [`Decomposer::decompose_source`].
pub fn decompose_source<S: ImageSource>(
    source: S,
    config: &DecomposeConfig,
) -> Result<Decomposition, Error> {
    Decomposer::new(*config)?.decompose_source(source)
}

#[cfg(test)]
mod tests {
    use hw_core::{Error, Image, ImageSource};

    use super::{DecomposeConfig, Decomposer, decompose, decompose_source, validate_depth};
    use crate::butterfly::Narrowing;
    use crate::exec::Execution;
    use crate::forward::{TransformConfig, haar_forward};
    use crate::inverse::haar_inverse_with_approximation;

    fn textured(width: usize, height: usize) -> Image<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(((x * 29) ^ (y * 53) ^ (x * y)) as u8);
            }
        }
        Image::from_vec(width, height, data).expect("valid image")
    }

    fn with_levels(levels: usize) -> DecomposeConfig {
        DecomposeConfig {
            levels,
            ..DecomposeConfig::default()
        }
    }

    #[test]
    fn level_count_and_dimensions() {
        let img = textured(64, 32);
        for levels in 1..=5 {
            let decomp = decompose(&img.as_view(), &with_levels(levels)).expect("valid depth");
            assert_eq!(decomp.num_levels(), levels);
            assert_eq!((decomp.source_width(), decomp.source_height()), (64, 32));
            for (k, set) in decomp.levels().iter().enumerate() {
                assert_eq!(set.dims(), (64 >> (k + 1), 32 >> (k + 1)));
                for band in [set.horizontal(), set.vertical(), set.diagonal()] {
                    assert_eq!(band.dims(), set.approximation().dims());
                }
            }
        }
    }

    #[test]
    fn levels_chain_through_approximation() {
        let img = textured(16, 16);
        let decomp = decompose(&img.as_view(), &with_levels(3)).expect("valid depth");

        for k in 1..3 {
            let prev = decomp.level(k - 1).expect("previous level");
            let expected = haar_forward(&prev.approximation().as_view(), &TransformConfig::default())
                .expect("even approximation");
            assert_eq!(decomp.level(k), Some(&expected));
        }
    }

    #[test]
    fn indivisible_dimensions_fail_up_front() {
        // 24 = 8 * 3: levels 0..=2 are fine, level 3 would see a 3-wide input.
        let img = textured(24, 32);
        let err = decompose(&img.as_view(), &with_levels(4)).expect_err("24 is not divisible by 16");
        assert_eq!(
            err,
            Error::InvalidDimensions {
                width: 24,
                height: 32,
                level: 3
            }
        );
        assert!(decompose(&img.as_view(), &with_levels(3)).is_ok());
    }

    #[test]
    fn reusable_parallel_decomposer_rejects_indivisible_source() {
        let decomposer = Decomposer::new(DecomposeConfig {
            levels: 4,
            transform: TransformConfig {
                execution: Execution::Parallel { workers: 3 },
                ..TransformConfig::default()
            },
        })
        .expect("three workers");

        let img = textured(24, 32);
        assert_eq!(
            decomposer.decompose(&img.as_view()),
            Err(Error::InvalidDimensions {
                width: 24,
                height: 32,
                level: 3
            })
        );
        assert!(decomposer.decompose(&textured(32, 32).as_view()).is_ok());
    }

    #[test]
    fn odd_source_fails_at_level_zero() {
        assert_eq!(
            validate_depth(7, 8, 1),
            Err(Error::InvalidDimensions {
                width: 7,
                height: 8,
                level: 0
            })
        );
    }

    #[test]
    fn zero_depth_rejected() {
        let img = textured(8, 8);
        assert_eq!(
            decompose(&img.as_view(), &with_levels(0)),
            Err(Error::InvalidDepth { levels: 0 })
        );
        assert!(matches!(
            Decomposer::new(with_levels(0)),
            Err(Error::InvalidDepth { levels: 0 })
        ));
    }

    #[test]
    fn all_zero_image_end_to_end() {
        let img = Image::new_fill(8, 8, 0u8);
        let decomp = decompose(&img.as_view(), &with_levels(2)).expect("valid depth");

        assert_eq!(decomp.num_levels(), 2);
        for set in decomp.levels() {
            for band in [set.approximation(), set.horizontal(), set.vertical(), set.diagonal()] {
                assert!(band.data().iter().all(|&v| v == 0));
            }
        }

        let montage = decomp.merge();
        assert_eq!(montage.dims(), (8, 8));
        assert!(montage.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn parallel_decomposers_are_bit_identical() {
        let img = textured(128, 96);
        let reference = decompose(&img.as_view(), &with_levels(4)).expect("sequential");

        let small = Decomposer::new(DecomposeConfig {
            levels: 4,
            transform: TransformConfig {
                execution: Execution::Parallel { workers: 2 },
                ..TransformConfig::default()
            },
        })
        .expect("two workers");
        let large = Decomposer::new(DecomposeConfig {
            levels: 4,
            transform: TransformConfig {
                execution: Execution::Parallel { workers: 7 },
                ..TransformConfig::default()
            },
        })
        .expect("seven workers");

        assert_eq!(small.decompose(&img.as_view()).expect("two workers"), reference);
        assert_eq!(large.decompose(&img.as_view()).expect("seven workers"), reference);
    }

    #[test]
    fn reconstruct_composes_levels_coarse_to_fine() {
        let img = textured(32, 16);
        let decomp = decompose(&img.as_view(), &with_levels(3)).expect("valid depth");

        let mut expected = decomp
            .inverse_level(2, Narrowing::Wrap)
            .expect("coarsest level");
        for k in (0..2).rev() {
            let set = decomp.level(k).expect("finer level");
            expected = haar_inverse_with_approximation(set, &expected.as_view(), Narrowing::Wrap)
                .expect("dimensions chain");
        }

        let rebuilt = decomp.reconstruct(Narrowing::Wrap);
        assert_eq!(rebuilt.dims(), (32, 16));
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn constant_image_reconstructs_exactly() {
        let img = Image::new_fill(16, 8, 77u8);
        let decomp = decompose(&img.as_view(), &with_levels(3)).expect("valid depth");
        assert_eq!(decomp.reconstruct(Narrowing::Wrap), img);
        assert!(decomp.inverse_level(3, Narrowing::Wrap).is_none());
    }

    struct Unavailable;

    impl ImageSource for Unavailable {
        fn read_u8(&mut self) -> Result<Image<u8>, Error> {
            Err(Error::SourceUnavailable("camera offline".to_string()))
        }
    }

    #[test]
    fn source_failure_propagates() {
        assert_eq!(
            decompose_source(Unavailable, &DecomposeConfig::default()),
            Err(Error::SourceUnavailable("camera offline".to_string()))
        );
    }

    #[test]
    fn in_memory_source_decomposes() {
        let img = textured(8, 8);
        let from_source =
            decompose_source(img.clone(), &DecomposeConfig::default()).expect("in-memory source");
        let direct = decompose(&img.as_view(), &DecomposeConfig::default()).expect("direct");
        assert_eq!(from_source, direct);
    }
}
