use std::io::Write;

mod encoder;

pub use encoder::Encoder;

use image::DynamicImage;

use crate::error::Error;
use crate::raster::ImageWriter;

pub struct TgaImageWriter<'a, T: Write> {
    writer: T,
    image: &'a DynamicImage,
}

impl<'a, T: Write> TgaImageWriter<'a, T> {
    pub fn new(writer: T, image: &'a DynamicImage) -> Self {
        Self { writer, image }
    }
}

impl<T: Write> ImageWriter for TgaImageWriter<'_, T> {
    fn write_image(&mut self) -> crate::Result<()> {
        let mut encoder = Encoder::new(&mut self.writer);
        encoder.encode(self.image)?;
        self.writer.flush().map_err(|_| Error::FailedToFlushOutput)
    }
}
