use crate::error::PreprocessError;
use image::{
    DynamicImage, GrayImage, ImageDecoder, ImageError, ImageReader, RgbImage, RgbaImage,
};
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

/// Layout of a packed, CPU-addressable pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Bgr8,
    Bgra8,
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// An in-memory bitmap of arbitrary size and pixel format.
#[derive(Debug, Clone)]
pub struct RawImage {
    inner: DynamicImage,
}

impl RawImage {
    /// Decode an encoded image (PNG, JPEG), upright per its EXIF orientation.
    pub fn decode(bytes: &[u8]) -> Result<Self, PreprocessError> {
        Self::read_oriented(ImageReader::new(Cursor::new(bytes)))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreprocessError> {
        Self::read_oriented(ImageReader::open(path).map_err(ImageError::IoError)?)
    }

    fn read_oriented<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<Self, PreprocessError> {
        let mut decoder = reader
            .with_guessed_format()
            .map_err(ImageError::IoError)?
            .into_decoder()?;
        let orientation = decoder.orientation()?;

        let mut inner = DynamicImage::from_decoder(decoder)?;
        inner.apply_orientation(orientation);

        Ok(Self::from(inner))
    }

    /// Copy a packed pixel buffer into an owned bitmap.
    ///
    /// BGR(A) buffers are reordered to RGB(A); nothing else is converted until
    /// [`RawImage::to_rgb8`].
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut pixels: Vec<u8>,
    ) -> Result<Self, PreprocessError> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::invalid_format(format!(
                "zero-sized image ({}x{})",
                width, height
            )));
        }

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(PreprocessError::invalid_format(format!(
                "buffer size mismatch: expected {} bytes for {}x{} {:?}, got {}",
                expected,
                width,
                height,
                format,
                pixels.len()
            )));
        }

        let inner = match format {
            PixelFormat::Rgb8 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
            PixelFormat::Rgba8 => {
                RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Bgr8 => {
                pixels.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
                RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
            }
            PixelFormat::Bgra8 => {
                pixels.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
                RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Gray8 => {
                GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
            }
        };

        inner
            .map(Self::from)
            .ok_or_else(|| PreprocessError::invalid_format("failed to create image buffer"))
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Copy a rectangular region into a new bitmap. The region is clamped to
    /// the image bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> RawImage {
        Self::from(self.inner.crop_imm(x, y, width, height))
    }

    /// Convert to packed 8-bit RGB. Alpha is dropped and grayscale is
    /// replicated into all three channels.
    pub fn to_rgb8(&self) -> Result<RgbImage, PreprocessError> {
        if self.width() == 0 || self.height() == 0 {
            return Err(PreprocessError::invalid_format(format!(
                "zero-sized image ({}x{})",
                self.width(),
                self.height()
            )));
        }

        Ok(match &self.inner {
            DynamicImage::ImageRgb8(rgb) => rgb.clone(),
            other => other.to_rgb8(),
        })
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }
}

impl From<DynamicImage> for RawImage {
    fn from(inner: DynamicImage) -> Self {
        Self { inner }
    }
}

impl From<RgbImage> for RawImage {
    fn from(rgb: RgbImage) -> Self {
        Self::from(DynamicImage::ImageRgb8(rgb))
    }
}
