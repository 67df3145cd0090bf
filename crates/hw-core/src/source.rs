use crate::{Error, Image};

/// Supplier of single-channel 8-bit pixel data.
///
/// Implementations that perform I/O report failures as
/// [`Error::SourceUnavailable`]; callers propagate the error unchanged.
pub trait ImageSource {
    fn read_u8(&mut self) -> Result<Image<u8>, Error>;
}

impl ImageSource for Image<u8> {
    fn read_u8(&mut self) -> Result<Image<u8>, Error> {
        Ok(self.clone())
    }
}

impl<S: ImageSource + ?Sized> ImageSource for &mut S {
    fn read_u8(&mut self) -> Result<Image<u8>, Error> {
        (**self).read_u8()
    }
}
