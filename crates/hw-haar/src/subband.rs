use hw_core::{Error, Image};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Approximation,
    Horizontal,
    Vertical,
    Diagonal,
}

impl Band {
    pub const ALL: [Band; 4] = [
        Band::Approximation,
        Band::Horizontal,
        Band::Vertical,
        Band::Diagonal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Approximation => "approximation",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Diagonal => "diagonal",
        }
    }
}

/// The four bands of one decomposition level.
///
/// Every band is `width x height`, half the dimensions of the level input.
/// Bands are owned independently and never alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SubbandSet {
    width: usize,
    height: usize,
    approximation: Image<u8>,
    horizontal: Image<u8>,
    vertical: Image<u8>,
    diagonal: Image<u8>,
}

impl SubbandSet {
    pub fn from_bands(
        approximation: Image<u8>,
        horizontal: Image<u8>,
        vertical: Image<u8>,
        diagonal: Image<u8>,
    ) -> Result<Self, Error> {
        let expected = approximation.dims();
        for band in [&horizontal, &vertical, &diagonal] {
            if band.dims() != expected {
                return Err(Error::BandMismatch {
                    expected,
                    actual: band.dims(),
                });
            }
        }

        Ok(Self {
            width: expected.0,
            height: expected.1,
            approximation,
            horizontal,
            vertical,
            diagonal,
        })
    }

    pub(crate) fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            approximation: Image::new_fill(width, height, 0),
            horizontal: Image::new_fill(width, height, 0),
            vertical: Image::new_fill(width, height, 0),
            diagonal: Image::new_fill(width, height, 0),
        }
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

    pub fn approximation(&self) -> &Image<u8> {
        &self.approximation
    }

    pub fn horizontal(&self) -> &Image<u8> {
        &self.horizontal
    }

    pub fn vertical(&self) -> &Image<u8> {
        &self.vertical
    }

    pub fn diagonal(&self) -> &Image<u8> {
        &self.diagonal
    }

    pub fn band(&self, band: Band) -> &Image<u8> {
        match band {
            Band::Approximation => &self.approximation,
            Band::Horizontal => &self.horizontal,
            Band::Vertical => &self.vertical,
            Band::Diagonal => &self.diagonal,
        }
    }

    /// Mutable access to all four bands at once, in [`Band::ALL`] order.
    pub(crate) fn bands_mut(&mut self) -> [&mut [u8]; 4] {
        [
            self.approximation.data_mut(),
            self.horizontal.data_mut(),
            self.vertical.data_mut(),
            self.diagonal.data_mut(),
        ]
    }

    pub fn into_bands(self) -> [Image<u8>; 4] {
        [
            self.approximation,
            self.horizontal,
            self.vertical,
            self.diagonal,
        ]
    }
}
