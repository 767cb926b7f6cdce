//! Sequential and row-band parallel executors.
//!
//! Both executors allocate a zeroed output grid with the source's dimensions
//! and run a [`Transform`] over it. The parallel executor splits the output
//! buffer into one disjoint slice per band and hands each slice to its own
//! task on a worker pool that lives for the duration of the call.

use image::ImageBuffer;
use std::time::Instant;

use crate::config::ExecutionConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::partition::{partition_rows, RowBand};
use crate::source::{row_stride, BandMut, PixelSource};
use crate::transform::Transform;

/// Output grid produced by running `T`.
pub type Output<T> = ImageBuffer<<T as Transform>::Pixel, Vec<u8>>;

/// Single-threaded reference executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Apply `transform` to the whole source on the calling thread.
    pub fn run<T, S>(&self, transform: &T, src: &S) -> Output<T>
    where
        T: Transform,
        S: PixelSource + ?Sized,
    {
        let (width, height) = src.dimensions();
        let mut output = Output::<T>::new(width, height);
        let start = Instant::now();
        {
            let mut band = BandMut::new(0, width, &mut output);
            transform.apply_band(src, RowBand::new(0, height), &mut band);
        }
        tracing::trace!(
            "  {} (sequential) {}x{}: {:?}",
            transform.name(),
            width,
            height,
            start.elapsed()
        );
        output
    }
}

/// Row-band executor with a fixed worker count.
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecutor {
    workers: usize,
}

impl ParallelExecutor {
    /// Create an executor that runs `workers` band tasks per call.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is 0.
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "workers must be > 0");
        Self { workers }
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(config.workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `transform` with one task per row band and wait for all of them.
    ///
    /// The output grid is returned only after every band task has finished.
    pub fn run<T, S>(&self, transform: &T, src: &S) -> PipelineResult<Output<T>>
    where
        T: Transform,
        S: PixelSource + ?Sized,
    {
        let (width, height) = src.dimensions();
        let mut output = Output::<T>::new(width, height);
        let bands = partition_rows(height, self.workers);
        tracing::debug!(
            "{} {}x{} on {} workers, bands {:?}",
            transform.name(),
            width,
            height,
            self.workers,
            bands.iter().map(RowBand::rows).collect::<Vec<_>>()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("pixband-worker-{i}"))
            .build()
            .map_err(|e| PipelineError::WorkerPool {
                workers: self.workers,
                message: e.to_string(),
            })?;

        let start = Instant::now();
        let slices = split_bands::<T::Pixel>(&mut output, width, &bands);
        pool.scope(|scope| {
            for (band, data) in bands.iter().copied().zip(slices) {
                scope.spawn(move |_| {
                    if band.is_empty() {
                        return;
                    }
                    let mut view = BandMut::new(band.start, width, data);
                    transform.apply_band(src, band, &mut view);
                });
            }
        });
        tracing::trace!(
            "  {} ({} workers) {}x{}: {:?}",
            transform.name(),
            self.workers,
            width,
            height,
            start.elapsed()
        );

        Ok(output)
    }
}

/// Carve `buffer` into one mutable slice per band, in band order.
///
/// Bands must be contiguous and start at row 0, as produced by
/// [`partition_rows`].
fn split_bands<'a, P>(buffer: &'a mut [u8], width: u32, bands: &[RowBand]) -> Vec<&'a mut [u8]>
where
    P: image::Pixel<Subpixel = u8>,
{
    let stride = row_stride::<P>(width);
    let mut slices = Vec::with_capacity(bands.len());
    let mut rest = buffer;
    for band in bands {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(band.len() as usize * stride);
        slices.push(head);
        rest = tail;
    }
    debug_assert!(rest.is_empty());
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Grayscale, Sharpen};
    use crate::Rgba64Image;
    use image::{GrayImage, Luma, Rgba, RgbImage, RgbaImage};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const WORKER_COUNTS: [usize; 4] = [1, 2, 3, 8];

    fn noise_image(width: u32, height: u32, seed: u64) -> Rgba64Image {
        let mut rng = StdRng::seed_from_u64(seed);
        Rgba64Image::from_fn(width, height, |_, _| {
            Rgba([rng.gen(), rng.gen(), rng.gen(), rng.gen()])
        })
    }

    #[test]
    fn test_grayscale_parallel_matches_sequential() {
        for (w, h) in [(37, 23), (8, 3), (1, 1), (64, 64)] {
            let src = noise_image(w, h, 7);
            let baseline = SequentialExecutor::new().run(&Grayscale, &src);
            for workers in WORKER_COUNTS {
                let parallel = ParallelExecutor::new(workers)
                    .run(&Grayscale, &src)
                    .unwrap();
                assert_eq!(
                    parallel.as_raw(),
                    baseline.as_raw(),
                    "{w}x{h} with {workers} workers"
                );
            }
        }
    }

    #[test]
    fn test_sharpen_parallel_matches_sequential() {
        for (w, h) in [(37, 23), (5, 5), (2, 9), (64, 7)] {
            let src = noise_image(w, h, 11);
            let sharpen = Sharpen::new();
            let baseline = SequentialExecutor::new().run(&sharpen, &src);
            for workers in WORKER_COUNTS {
                let parallel = ParallelExecutor::new(workers).run(&sharpen, &src).unwrap();
                assert_eq!(
                    parallel.as_raw(),
                    baseline.as_raw(),
                    "{w}x{h} with {workers} workers"
                );
            }
        }
    }

    #[test]
    fn test_grayscale_output_is_single_channel() {
        let src = noise_image(16, 9, 3);
        let gray = ParallelExecutor::new(3).run(&Grayscale, &src).unwrap();
        let rgb: RgbImage = image::DynamicImage::ImageLuma8(gray).to_rgb8();
        assert!(rgb.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn test_sharpen_border_stays_zero() {
        let (w, h) = (13, 10);
        let src = noise_image(w, h, 5);
        for workers in WORKER_COUNTS {
            let out = ParallelExecutor::new(workers)
                .run(&Sharpen::new(), &src)
                .unwrap();
            for (x, y, p) in out.enumerate_pixels() {
                let border = x == 0 || x == w - 1 || y == 0 || y == h - 1;
                if border {
                    assert_eq!(p, &Rgba([0, 0, 0, 0]), "({x}, {y})");
                } else {
                    assert_eq!(p.0[3], 255, "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let src = noise_image(31, 17, 99);
        let executor = ParallelExecutor::new(3);
        let first = executor.run(&Sharpen::new(), &src).unwrap();
        for _ in 0..5 {
            let again = executor.run(&Sharpen::new(), &src).unwrap();
            assert_eq!(again.as_raw(), first.as_raw());
        }
    }

    #[test]
    fn test_solid_red_grayscale() {
        let src = Rgba64Image::from_pixel(4, 4, Rgba([65535, 0, 0, 65535]));
        let expected = GrayImage::from_pixel(4, 4, Luma([255]));
        assert_eq!(SequentialExecutor::new().run(&Grayscale, &src), expected);
        for workers in WORKER_COUNTS {
            assert_eq!(
                ParallelExecutor::new(workers).run(&Grayscale, &src).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_uniform_gray_sharpen() {
        let v = 51_234u16;
        let src = Rgba64Image::from_pixel(5, 5, Rgba([v, v, v, 65535]));
        let interior = (v >> 8) as u8;
        for workers in WORKER_COUNTS {
            let out = ParallelExecutor::new(workers)
                .run(&Sharpen::new(), &src)
                .unwrap();
            for (x, y, p) in out.enumerate_pixels() {
                if (1..4).contains(&x) && (1..4).contains(&y) {
                    assert_eq!(p, &Rgba([interior, interior, interior, 255]));
                } else {
                    assert_eq!(p, &Rgba([0, 0, 0, 0]));
                }
            }
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        let src = RgbaImage::from_pixel(6, 2, Rgba([128, 1, 2, 255]));
        let out = ParallelExecutor::new(8).run(&Grayscale, &src).unwrap();
        assert!(out.pixels().all(|p| p.0[0] == 128));
    }

    #[test]
    fn test_split_bands_lengths() {
        let mut buffer = vec![0u8; 4 * 10];
        let bands = partition_rows(10, 3);
        let slices = split_bands::<Luma<u8>>(&mut buffer, 4, &bands);
        let lens: Vec<usize> = slices.iter().map(|s| s.len()).collect();
        assert_eq!(lens, vec![12, 12, 16]);
    }

    #[test]
    #[should_panic(expected = "workers must be > 0")]
    fn test_zero_workers_panics() {
        ParallelExecutor::new(0);
    }
}
