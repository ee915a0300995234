use std::{
    fs::{File, OpenOptions},
    io::BufWriter,
    path::{Path, PathBuf},
};

pub use cli::CLIParser;
pub use error::Error;
use image::DynamicImage;
use raster::{packer::ChannelPacker, writer::tga::TgaImageWriter, ImageWriter};

mod cli;
mod error;
mod logger;
pub mod raster;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    red_file: PathBuf,
    green_file: PathBuf,
    blue_file: PathBuf,
    output_file: PathBuf,
}

fn decode_input_image(file_path: &Path) -> Result<DynamicImage> {
    image::open(file_path)
        .map_err(|e| Error::UnableToDecodeInputImage(file_path.display().to_string(), e))
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| {
            Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e)
        })
}

pub fn pack_channels_to_tga(arguments: &Arguments) -> Result<()> {
    let red_image = decode_input_image(&arguments.red_file)?;
    let green_image = decode_input_image(&arguments.green_file)?;
    let blue_image = decode_input_image(&arguments.blue_file)?;
    let packer = ChannelPacker::new([red_image, green_image, blue_image]);
    let composite = DynamicImage::ImageRgba8(packer.pack()?);
    let output_file = open_output_file(&arguments.output_file)?;
    let output_file_writer = BufWriter::new(&output_file);
    let mut image_writer = TgaImageWriter::new(output_file_writer, &composite);
    image_writer.write_image()?;
    Ok(())
}
