use std::io::Write;

use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

use crate::error::Error;
use crate::logger;
use crate::Result;

const HEADER_SIZE: usize = 18;
const FOOTER_SIZE: usize = 26;
const EXTENSION_AREA_SIZE: usize = 495;

const IMAGE_TYPE_TRUE_COLOR: u8 = 2;
const IMAGE_TYPE_MONOCHROME: u8 = 3;

/// Bit 5 of the image descriptor: row 0 is the top row.
const FLAG_ORIGIN_TOP: u8 = 1 << 5;

/// Attribute type stored in the extension area: no alpha data included.
const ATTRIBUTE_TYPE_NO_ALPHA: u8 = 0;

const FOOTER_SIGNATURE: &[u8; 18] = b"TRUEVISION-XFILE.\0";

struct RawHeader {
    image_type: u8,
    width: u16,
    height: u16,
    bits_per_pixel: u8,
    flags: u8,
}

impl RawHeader {
    fn true_color(width: u32, height: u32) -> Result<Self> {
        Self::new(IMAGE_TYPE_TRUE_COLOR, width, height, 24)
    }

    fn monochrome(width: u32, height: u32) -> Result<Self> {
        Self::new(IMAGE_TYPE_MONOCHROME, width, height, 8)
    }

    fn new(image_type: u8, width: u32, height: u32, bits_per_pixel: u8) -> Result<Self> {
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(Error::ImageDimensionsTooLargeForTga(width, height));
        }
        Ok(Self {
            image_type,
            width: width as u16,
            height: height as u16,
            bits_per_pixel,
            flags: FLAG_ORIGIN_TOP,
        })
    }

    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let width = self.width.to_le_bytes();
        let height = self.height.to_le_bytes();
        #[rustfmt::skip]
        let bytes = [
            0,                    // image ID length
            0,                    // color map type
            self.image_type,      // image type code
            0, 0, 0, 0, 0,        // color map specification
            0, 0,                 // X origin
            0, 0,                 // Y origin
            width[0], width[1],   // width, little endian
            height[0], height[1], // height, little endian
            self.bits_per_pixel,  // bits per pixel
            self.flags,           // image descriptor
        ];
        bytes
    }
}

pub struct Encoder<'a, T> {
    writer: &'a mut T,
}

impl<'a, T: Write> Encoder<'a, T> {
    pub fn new(writer: &'a mut T) -> Encoder<'a, T> {
        Encoder { writer }
    }

    /// Serializes the image as an uncompressed TGA file.
    ///
    /// Gray images are written as 8 bit monochrome, RGBA images as 24 bit
    /// true color without alpha. Every other pixel format is converted to
    /// non-premultiplied RGBA first and written as true color, so any
    /// decodable image encodes successfully. Dimensions above 65535 are
    /// rejected before a single byte reaches the writer.
    pub fn encode(&mut self, image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();
        match image {
            DynamicImage::ImageLuma8(monochrome) => {
                self.encode_monochrome(monochrome, RawHeader::monochrome(width, height)?)
            }
            DynamicImage::ImageRgba8(true_color) => {
                self.encode_true_color(true_color, RawHeader::true_color(width, height)?)
            }
            other => {
                let converted = other.to_rgba8();
                self.encode_true_color(&converted, RawHeader::true_color(width, height)?)
            }
        }
    }

    fn encode_monochrome(&mut self, image: &GrayImage, header: RawHeader) -> Result<()> {
        self.write_header(&header)?;

        let row_length = header.width as usize;
        if row_length > 0 {
            for row in image.as_raw().chunks_exact(row_length) {
                self.write_pixel_row(row)?;
            }
        }

        // monochrome files carry a footer but no extension area
        self.write_footer(0)
    }

    fn encode_true_color(&mut self, image: &RgbaImage, header: RawHeader) -> Result<()> {
        self.write_header(&header)?;

        let source_row_length = header.width as usize * 4;
        let mut row_buffer = vec![0u8; header.width as usize * 3];
        if source_row_length > 0 {
            for row in image.as_raw().chunks_exact(source_row_length) {
                for (source, target) in row.chunks_exact(4).zip(row_buffer.chunks_exact_mut(3)) {
                    target[0] = source[2]; // blue
                    target[1] = source[1]; // green
                    target[2] = source[0]; // red
                }
                self.write_pixel_row(&row_buffer)?;
            }
        }

        self.write_extension_area(ATTRIBUTE_TYPE_NO_ALPHA)?;

        // The recorded offset counts the 4 byte per pixel source rows,
        // not the 3 byte rows actually written.
        let extension_area_offset =
            (HEADER_SIZE as u64 + header.height as u64 * source_row_length as u64) as u32;
        self.write_footer(extension_area_offset)
    }

    fn write_header(&mut self, header: &RawHeader) -> Result<()> {
        let bytes = header.to_bytes();
        logger::log_file_block("TGA header", &bytes);
        self.writer
            .write_all(&bytes)
            .map_err(|_| Error::FailedToWriteHeader)
    }

    fn write_pixel_row(&mut self, row: &[u8]) -> Result<()> {
        self.writer
            .write_all(row)
            .map_err(|_| Error::FailedToWritePixelRow)
    }

    fn write_extension_area(&mut self, attribute_type: u8) -> Result<()> {
        log::info!("Writing extension area ({} bytes)", EXTENSION_AREA_SIZE);
        let mut extension_area = [0u8; EXTENSION_AREA_SIZE];
        extension_area[..2].copy_from_slice(&(EXTENSION_AREA_SIZE as u16).to_le_bytes());
        extension_area[EXTENSION_AREA_SIZE - 1] = attribute_type;
        self.writer
            .write_all(&extension_area)
            .map_err(|_| Error::FailedToWriteExtensionArea)
    }

    fn write_footer(&mut self, extension_area_offset: u32) -> Result<()> {
        let mut footer = [0u8; FOOTER_SIZE];
        footer[..4].copy_from_slice(&extension_area_offset.to_le_bytes());
        // bytes 4..8 hold the developer directory offset, always zero
        footer[8..].copy_from_slice(FOOTER_SIGNATURE);
        logger::log_file_block("TGA footer", &footer);
        self.writer
            .write_all(&footer)
            .map_err(|_| Error::FailedToWriteFooter)
    }
}

#[cfg(test)]
mod test {
    use super::{Encoder, EXTENSION_AREA_SIZE, FOOTER_SIZE, HEADER_SIZE};
    use crate::error::Error;
    use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::{self, Write};

    /// Sink that fails every write, for exercising the error paths.
    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink rejected the write"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "sink rejected the flush"))
        }
    }

    fn encode_to_vec(image: &DynamicImage) -> Vec<u8> {
        let mut output: Vec<u8> = vec![];
        let mut encoder = Encoder::new(&mut output);
        encoder.encode(image).expect("encoding should not fail");
        output
    }

    fn footer_extension_offset(bytes: &[u8]) -> u32 {
        let footer = &bytes[bytes.len() - FOOTER_SIZE..];
        u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]])
    }

    #[test]
    fn encode_white_pixel_composite() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let output = encode_to_vec(&DynamicImage::ImageRgba8(image));

        #[rustfmt::skip]
        let expected_header = [
            0, 0, 2,
            0, 0, 0, 0, 0,
            0, 0, 0, 0,
            1, 0, 1, 0,
            24, 0x20,
        ];
        assert_eq!(&output[..HEADER_SIZE], &expected_header);
        assert_eq!(
            &output[HEADER_SIZE..HEADER_SIZE + 3],
            &[0xFF, 0xFF, 0xFF],
            "pixel bytes must be blue, green, red"
        );

        let extension_area = &output[HEADER_SIZE + 3..HEADER_SIZE + 3 + EXTENSION_AREA_SIZE];
        assert_eq!(extension_area[0], 0xEF);
        assert_eq!(extension_area[1], 0x01);
        assert_eq!(
            extension_area[EXTENSION_AREA_SIZE - 1],
            0,
            "attribute type must record the absent alpha channel"
        );

        let footer = &output[output.len() - FOOTER_SIZE..];
        assert_eq!(footer_extension_offset(&output), 22);
        assert_eq!(&footer[4..8], &[0, 0, 0, 0]);
        assert_eq!(&footer[8..], b"TRUEVISION-XFILE.\0");
        assert_eq!(output.len(), HEADER_SIZE + 3 + EXTENSION_AREA_SIZE + FOOTER_SIZE);
    }

    #[test]
    fn true_color_pixels_are_reordered_to_bgr() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
        let output = encode_to_vec(&DynamicImage::ImageRgba8(image));
        assert_eq!(&output[HEADER_SIZE..HEADER_SIZE + 6], &[30, 20, 10, 30, 20, 10]);
    }

    #[test]
    fn footer_records_source_based_offset() {
        let image = RgbaImage::from_pixel(257, 3, Rgba([1, 2, 3, 255]));
        let output = encode_to_vec(&DynamicImage::ImageRgba8(image));
        let expected_offset = (HEADER_SIZE + 257 * 4 * 3) as u32;
        assert_eq!(footer_extension_offset(&output), expected_offset);
        assert_eq!(
            output.len(),
            HEADER_SIZE + 257 * 3 * 3 + EXTENSION_AREA_SIZE + FOOTER_SIZE
        );
    }

    #[test]
    fn monochrome_layout_has_no_extension_area() {
        let pixels: Vec<u8> = vec![0, 1, 2, 3, 4, 5];
        let image = GrayImage::from_raw(3, 2, pixels.clone()).unwrap();
        let output = encode_to_vec(&DynamicImage::ImageLuma8(image));

        assert_eq!(output.len(), HEADER_SIZE + 6 + FOOTER_SIZE);
        assert_eq!(output[2], 3, "image type must be monochrome");
        assert_eq!(output[16], 8, "bits per pixel must be 8");
        assert_eq!(output[17], 0x20, "origin must be the top row");
        assert_eq!(&output[HEADER_SIZE..HEADER_SIZE + 6], &pixels[..]);
        assert_eq!(footer_extension_offset(&output), 0);
        let footer = &output[output.len() - FOOTER_SIZE..];
        assert_eq!(&footer[8..], b"TRUEVISION-XFILE.\0");
    }

    #[test]
    fn oversized_image_is_rejected_before_writing() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(65536, 1));
        let mut output: Vec<u8> = vec![];
        let mut encoder = Encoder::new(&mut output);
        let result = encoder.encode(&image);
        assert!(
            matches!(result, Err(Error::ImageDimensionsTooLargeForTga(65536, 1))),
            "oversized width must be rejected"
        );
        assert!(output.is_empty(), "no bytes may be written on overflow");
    }

    #[test]
    fn rgb_input_is_normalized_to_true_color() {
        let rgb = RgbImage::from_pixel(2, 2, Rgb([40, 50, 60]));
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([40, 50, 60, 255]));
        let from_rgb = encode_to_vec(&DynamicImage::ImageRgb8(rgb));
        let from_rgba = encode_to_vec(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(from_rgb, from_rgba);
    }

    #[test]
    fn empty_image_produces_header_extension_and_footer() {
        let output = encode_to_vec(&DynamicImage::ImageRgba8(RgbaImage::new(0, 0)));
        assert_eq!(output.len(), HEADER_SIZE + EXTENSION_AREA_SIZE + FOOTER_SIZE);
        assert_eq!(footer_extension_offset(&output), HEADER_SIZE as u32);
    }

    #[test]
    fn encoded_file_decodes_back_to_composite() {
        let mut image = RgbaImage::new(5, 4);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 40) as u8, (y * 60) as u8, (x + y) as u8, 255]);
        }
        let output = encode_to_vec(&DynamicImage::ImageRgba8(image.clone()));
        let decoded = image::load_from_memory_with_format(&output, ImageFormat::Tga)
            .expect("a conformant reader must accept the encoded file");
        assert_eq!(decoded.to_rgba8(), image);
    }

    #[test]
    fn failing_sink_aborts_with_header_error() {
        let mut sink = FailingSink;
        let mut encoder = Encoder::new(&mut sink);
        let image = DynamicImage::ImageRgba8(RgbaImage::new(1, 1));
        let result = encoder.encode(&image);
        assert!(matches!(result, Err(Error::FailedToWriteHeader)));
    }
}
