use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use preprocess::{CpuPreProcessor, PixelFormat, RawImage};

/// Create raw pixel buffer for benchmarking (gradient pattern)
fn create_test_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            pixels[idx] = (x % 256) as u8; // R
            pixels[idx + 1] = (y % 256) as u8; // G
            pixels[idx + 2] = ((x + y) % 256) as u8; // B
        }
    }
    pixels
}

fn benchmark_cpu_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_prepare");

    // Phone photos, a single drone patch, and a large drone frame
    let resolutions = [(256, 256), (1280, 960), (4000, 3000)];

    for (width, height) in resolutions.iter() {
        let image =
            RawImage::from_pixels(*width, *height, PixelFormat::Rgb8, create_test_pixels(*width, *height))
                .unwrap();
        let mut preprocessor = CpuPreProcessor::default();

        group.bench_with_input(
            BenchmarkId::new("stretch_normalize", format!("{}x{}", width, height)),
            &image,
            |b, image| {
                b.iter(|| preprocessor.prepare(black_box(image)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_pixel_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel_conversion");
    let (width, height) = (1280, 960);
    let bgra = vec![128u8; (width * height * 4) as usize];

    group.bench_function("bgra_to_rgb", |b| {
        b.iter(|| {
            let image =
                RawImage::from_pixels(width, height, PixelFormat::Bgra8, black_box(bgra.clone()))
                    .unwrap();
            image.to_rgb8().unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_cpu_prepare, benchmark_pixel_conversion);
criterion_main!(benches);
