use crate::config::DEFAULT_INPUT_SIZE;
use crate::{InputTensor, Preprocess, PreprocessError, RawImage};
use common::span_debug;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};

pub struct CpuPreProcessor {
    pub target_size: u32,
    resizer: Resizer,
}

impl CpuPreProcessor {
    pub fn new(target_size: u32) -> Self {
        Self {
            target_size,
            resizer: Resizer::new(),
        }
    }

    pub fn prepare(&mut self, image: &RawImage) -> Result<InputTensor, PreprocessError> {
        let _s = span_debug!("prepare");

        if self.target_size == 0 {
            return Err(PreprocessError::invalid_format("target size must be non-zero"));
        }

        let rgb = image.to_rgb8()?;
        let (width, height) = rgb.dimensions();

        tracing::trace!(
            width,
            height,
            target_size = self.target_size,
            "Preprocessing image"
        );

        let values = if width == self.target_size && height == self.target_size {
            Self::normalize(rgb.as_raw())
        } else {
            let resized = self.resize(rgb.as_raw(), width, height)?;
            Self::normalize(resized.buffer())
        };

        InputTensor::from_chw(self.target_size, values)
    }

    /// Stretch to `target_size × target_size`; aspect ratio is not preserved.
    fn resize(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Image<'static>, PreprocessError> {
        let _s = span_debug!("resize");

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)
            .map_err(|e| PreprocessError::invalid_format(e.to_string()))?;

        let mut resized = Image::new(self.target_size, self.target_size, PixelType::U8x3);

        self.resizer
            .resize(
                &src,
                &mut resized,
                &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            )
            .map_err(|e| PreprocessError::invalid_format(e.to_string()))?;

        Ok(resized)
    }

    /// Packed RGB bytes to planar `[0, 1]` floats: R plane, G plane, B plane.
    fn normalize(buf: &[u8]) -> Vec<f32> {
        let spatial = buf.len() / 3;
        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in buf.chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[i + spatial] = px[1] as f32 / 255.0;
            output[i + 2 * spatial] = px[2] as f32 / 255.0;
        }

        output
    }
}

impl Default for CpuPreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

impl Preprocess for CpuPreProcessor {
    fn prepare(&mut self, image: &RawImage) -> Result<InputTensor, PreprocessError> {
        CpuPreProcessor::prepare(self, image)
    }

    fn target_size(&self) -> u32 {
        self.target_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelFormat;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RawImage {
        RawImage::from(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn test_output_length_and_range() {
        let mut src = RgbImage::new(100, 60);
        for (x, y, px) in src.enumerate_pixels_mut() {
            *px = Rgb([(x * 2) as u8, (y * 4) as u8, ((x + y) % 256) as u8]);
        }

        let mut preprocessor = CpuPreProcessor::default();
        let tensor = preprocessor.prepare(&RawImage::from(src)).unwrap();

        assert_eq!(tensor.len(), 3 * 256 * 256);
        assert_eq!(tensor.as_array().shape(), &[1, 3, 256, 256]);
        assert!(
            tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)),
            "every value should be normalized into [0, 1]"
        );
    }

    #[test]
    fn test_layout_is_channel_major() {
        let mut preprocessor = CpuPreProcessor::new(4);
        let tensor = preprocessor.prepare(&solid(4, 4, [255, 0, 0])).unwrap();
        let values = tensor.as_slice();

        assert!(values[..16].iter().all(|&v| v == 1.0), "red plane first");
        assert!(values[16..].iter().all(|&v| v == 0.0), "green and blue planes after");
    }

    #[test]
    fn test_planes_are_row_major() {
        let pixels = vec![
            10, 0, 0, 20, 0, 0, // row 0
            30, 0, 0, 40, 0, 255, // row 1
        ];
        let img = RawImage::from_pixels(2, 2, PixelFormat::Rgb8, pixels).unwrap();

        let mut preprocessor = CpuPreProcessor::new(2);
        let tensor = preprocessor.prepare(&img).unwrap();
        let red: Vec<f32> = tensor.channel(0).to_vec();

        assert_eq!(red, vec![10.0 / 255.0, 20.0 / 255.0, 30.0 / 255.0, 40.0 / 255.0]);
        assert_eq!(tensor.channel(2)[3], 1.0);
    }

    #[test]
    fn test_stretch_does_not_letterbox() {
        // A letterboxed resize would introduce border pixels of another colour.
        let mut preprocessor = CpuPreProcessor::new(64);
        let tensor = preprocessor.prepare(&solid(800, 200, [128, 128, 128])).unwrap();

        let expected = 128.0 / 255.0;
        assert!(
            tensor
                .as_slice()
                .iter()
                .all(|v| (v - expected).abs() <= 1.0 / 255.0 + f32::EPSILON),
            "constant image should stay constant after stretching"
        );
    }

    #[test]
    fn test_bgr_and_rgb_sources_agree() {
        let rgb = RawImage::from_pixels(1, 1, PixelFormat::Rgb8, vec![200, 100, 50]).unwrap();
        let bgr = RawImage::from_pixels(1, 1, PixelFormat::Bgr8, vec![50, 100, 200]).unwrap();

        let mut preprocessor = CpuPreProcessor::new(8);
        let a = preprocessor.prepare(&rgb).unwrap();
        let b = preprocessor.prepare(&bgr).unwrap();

        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_rgba_source_is_accepted() {
        let rgba = RawImage::from_pixels(2, 2, PixelFormat::Rgba8, vec![255; 16]).unwrap();
        let tensor = CpuPreProcessor::new(2).prepare(&rgba).unwrap();
        assert!(tensor.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_zero_target_size_is_rejected() {
        let result = CpuPreProcessor::new(0).prepare(&solid(4, 4, [0, 0, 0]));
        assert!(matches!(result, Err(PreprocessError::InvalidFormat(_))));
    }

    #[test]
    fn test_preprocess_trait() {
        let mut preprocessor = CpuPreProcessor::default();
        let tensor = Preprocess::prepare(&mut preprocessor, &solid(100, 100, [1, 2, 3])).unwrap();

        assert_eq!(preprocessor.target_size(), 256);
        assert_eq!(tensor.size(), 256);
    }

    #[test]
    fn test_free_function_matches_preprocessor() {
        let img = solid(30, 10, [90, 180, 30]);
        let a = crate::prepare(&img, 16).unwrap();
        let b = CpuPreProcessor::new(16).prepare(&img).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
