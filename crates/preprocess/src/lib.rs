pub mod config;
pub mod cpu;
pub mod error;
pub mod raw_image;
pub mod tensor;

pub use config::{CHANNELS, DEFAULT_INPUT_SIZE};
pub use cpu::CpuPreProcessor;
pub use error::PreprocessError;
pub use raw_image::{PixelFormat, RawImage};
pub use tensor::InputTensor;

/// Trait for image preprocessing implementations
pub trait Preprocess {
    /// Convert an image into the model's input tensor.
    ///
    /// The image is converted to RGB, stretched to exactly
    /// `target_size × target_size` (aspect ratio is not preserved), scaled to
    /// `[0, 1]` and laid out channel-major: every red value in row-major pixel
    /// order, then every green value, then every blue value.
    fn prepare(&mut self, image: &RawImage) -> Result<InputTensor, PreprocessError>;

    /// Get the square input resolution this preprocessor targets
    fn target_size(&self) -> u32;
}

/// One-shot convenience wrapper around [`CpuPreProcessor`].
pub fn prepare(image: &RawImage, target_size: u32) -> Result<InputTensor, PreprocessError> {
    CpuPreProcessor::new(target_size).prepare(image)
}
