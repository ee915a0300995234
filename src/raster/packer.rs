use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Combines three source images into one RGBA composite, sampling the red
/// channel from the first image, green from the second and blue from the
/// third.
pub struct ChannelPacker {
    images: [DynamicImage; 3],
}

impl ChannelPacker {
    pub fn new(images: [DynamicImage; 3]) -> Self {
        Self { images }
    }

    /// Builds the composite image.
    ///
    /// The output takes the dimensions of the input with the largest pixel
    /// area; the other inputs are resized to match before their channel is
    /// extracted. The output alpha is fully opaque everywhere.
    pub fn pack(&self) -> crate::Result<RgbaImage> {
        let (width, height) = self.canonical_dimensions();
        let channels = self.channel_sources(width, height);
        let mut composite = RgbaImage::new(width, height);
        for (x, y, pixel) in composite.enumerate_pixels_mut() {
            *pixel = Rgba([
                channels[0].get_pixel(x, y)[0],
                channels[1].get_pixel(x, y)[1],
                channels[2].get_pixel(x, y)[2],
                u8::MAX,
            ]);
        }
        Ok(composite)
    }

    fn canonical_dimensions(&self) -> (u32, u32) {
        let mut canonical = self.images[0].dimensions();
        for image in &self.images[1..] {
            let dimensions = image.dimensions();
            if pixel_area(dimensions) > pixel_area(canonical) {
                canonical = dimensions;
            }
        }
        canonical
    }

    /// Converts every input to non-premultiplied RGBA at the canonical size,
    /// resizing where the dimensions differ.
    fn channel_sources(&self, width: u32, height: u32) -> [RgbaImage; 3] {
        self.images.each_ref().map(|image| {
            let (source_width, source_height) = image.dimensions();
            if (source_width, source_height) == (width, height) {
                image.to_rgba8()
            } else {
                log::info!(
                    "resize {}x{} -> {}x{}",
                    source_width,
                    source_height,
                    width,
                    height
                );
                imageops::resize(image, width, height, FilterType::Triangle)
            }
        })
    }
}

fn pixel_area((width, height): (u32, u32)) -> u64 {
    width as u64 * height as u64
}
