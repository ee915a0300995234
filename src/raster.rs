pub mod packer;
pub mod writer;

pub trait ImageWriter {
    fn write_image(&mut self) -> crate::Result<()>;
}
