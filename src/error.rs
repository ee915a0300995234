use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    ImageDimensionsTooLargeForTga(u32, u32),
    UnableToDecodeInputImage(String, image::ImageError),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToWriteHeader,
    FailedToWritePixelRow,
    FailedToWriteExtensionArea,
    FailedToWriteFooter,
    FailedToFlushOutput,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageDimensionsTooLargeForTga(width, height) => {
                write!(
                    f,
                    "Image dimensions {}x{} exceed the 16 bit range of the TGA header",
                    width, height
                )
            }
            Self::UnableToDecodeInputImage(path, error) => {
                write!(f, "Unable to decode input image '{}': {}", path, error)
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToWriteHeader => write!(f, "Failed to write TGA header"),
            Self::FailedToWritePixelRow => write!(f, "Failed to write pixel row"),
            Self::FailedToWriteExtensionArea => write!(f, "Failed to write extension area"),
            Self::FailedToWriteFooter => write!(f, "Failed to write TGA footer"),
            Self::FailedToFlushOutput => write!(f, "Failed to flush the output stream"),
        }
    }
}

impl std::error::Error for Error {}
