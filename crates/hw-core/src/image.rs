use crate::Error;

/// Owned row-major image with `stride == width`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    pub fn as_view_mut(&mut self) -> ImageViewMut<'_, T> {
        ImageViewMut {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &mut self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }
}

/// Borrowed image window. `stride` is in elements and may exceed `width`.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'a, T>, Error> {
        let start = subview_start(self.dims(), self.stride, x, y, width, height)?;
        let min_len = min_required_len(width, height, self.stride).ok_or(Error::OutOfBounds)?;
        let tail = self.data.get(start..).ok_or(Error::OutOfBounds)?;

        if tail.len() < min_len {
            return Err(Error::OutOfBounds);
        }

        Ok(ImageView {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }

    pub fn is_contiguous(&self) -> bool {
        self.stride == self.width
    }

    pub fn as_contiguous_slice(&self) -> Option<&'a [T]> {
        if !self.is_contiguous() {
            return None;
        }
        self.data.get(0..self.width * self.height)
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Copies the window into a tightly packed owned image.
    pub fn to_image(&self) -> Image<T> {
        if let Some(contig) = self.as_contiguous_slice() {
            return Image {
                width: self.width,
                height: self.height,
                data: contig.to_vec(),
            };
        }

        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            data.extend_from_slice(self.row(y));
        }
        Image {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Mutable counterpart of [`ImageView`], used to fill canvas windows.
#[derive(Debug)]
pub struct ImageViewMut<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [T],
}

impl<'a, T> ImageViewMut<'a, T> {
    pub fn from_slice_mut(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a mut [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    pub fn subview_mut(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageViewMut<'_, T>, Error> {
        let start = subview_start((self.width, self.height), self.stride, x, y, width, height)?;
        let min_len = min_required_len(width, height, self.stride).ok_or(Error::OutOfBounds)?;
        if start > self.data.len() {
            return Err(Error::OutOfBounds);
        }

        let (_, tail) = self.data.split_at_mut(start);
        if tail.len() < min_len {
            return Err(Error::OutOfBounds);
        }

        Ok(ImageViewMut {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }
}

impl<T: Copy> ImageViewMut<'_, T> {
    /// Copies `src` row by row into this window. Dimensions must match.
    pub fn copy_from(&mut self, src: &ImageView<'_, T>) -> Result<(), Error> {
        if src.width() != self.width || src.height() != self.height {
            return Err(Error::SizeMismatch {
                expected: self.width * self.height,
                actual: src.width() * src.height(),
            });
        }

        for y in 0..self.height {
            self.row_mut(y).copy_from_slice(src.row(y));
        }
        Ok(())
    }
}

fn subview_start(
    (parent_w, parent_h): (usize, usize),
    stride: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<usize, Error> {
    if x > parent_w || y > parent_h || width > (parent_w - x) || height > (parent_h - y) {
        return Err(Error::OutOfBounds);
    }

    y.checked_mul(stride)
        .and_then(|v| v.checked_add(x))
        .ok_or(Error::OutOfBounds)
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)
}
