//! Per-pixel kernels: single-channel luminance and 3x3 convolution.
//!
//! Both kernels read 16-bit samples and reduce to 8-bit output by shifting
//! right by 8 bits.

use image::Rgba;

use crate::source::{PixelSource, Sample};

/// A fixed 3x3 integer weight matrix, indexed `weights[ky + 1][kx + 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel3x3 {
    pub weights: [[i32; 3]; 3],
}

impl Kernel3x3 {
    pub const fn new(weights: [[i32; 3]; 3]) -> Self {
        Self { weights }
    }

    /// Weight applied to the neighbor at offset `(kx, ky)`, each in `-1..=1`.
    #[inline]
    pub fn weight(&self, kx: i32, ky: i32) -> i32 {
        self.weights[(ky + 1) as usize][(kx + 1) as usize]
    }
}

/// Sharpen kernel: the center counts five times, the four edge neighbors are
/// subtracted once each, corners are ignored.
pub static SHARPEN_KERNEL: Kernel3x3 = Kernel3x3::new([[0, -1, 0], [-1, 5, -1], [0, -1, 0]]);

/// Gray value of a sample: its red intensity reduced to 8 bits.
///
/// Green, blue and alpha are ignored.
#[inline]
pub fn luminance(sample: Sample) -> u8 {
    (sample.0[0] >> 8) as u8
}

/// Convolve the 3x3 neighborhood centered on `(x, y)` with `kernel`.
///
/// `(x, y)` must be an interior pixel (`1 <= x < W-1`, `1 <= y < H-1`).
/// Red, green and blue are accumulated independently, shifted down to 8 bits
/// and clamped to `[0, 255]`; alpha is always 255.
#[inline]
pub fn convolve3x3<S>(src: &S, x: u32, y: u32, kernel: &Kernel3x3) -> Rgba<u8>
where
    S: PixelSource + ?Sized,
{
    let mut sums = [0i64; 3];
    for ky in -1i32..=1 {
        for kx in -1i32..=1 {
            let weight = i64::from(kernel.weight(kx, ky));
            if weight == 0 {
                continue;
            }
            let nx = x.wrapping_add_signed(kx);
            let ny = y.wrapping_add_signed(ky);
            let sample = src.sample(nx, ny);
            for (sum, &channel) in sums.iter_mut().zip(&sample.0[..3]) {
                *sum += i64::from(channel) * weight;
            }
        }
    }
    Rgba([reduce(sums[0]), reduce(sums[1]), reduce(sums[2]), u8::MAX])
}

/// Shift an accumulated 16-bit-scale sum down to 8 bits and clamp.
#[inline]
fn reduce(sum: i64) -> u8 {
    (sum >> 8).clamp(0, 255) as u8
}
