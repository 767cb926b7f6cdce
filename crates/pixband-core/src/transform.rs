//! Pixel transforms applied band by band.
//!
//! A [`Transform`] knows how to fill any run of output rows from the source.
//! It is the only place that knows which rows and columns it writes, so the
//! partitioner stays transform-agnostic: the sharpen transform skips the
//! image border itself, whichever band that border falls in.

use image::{Luma, Pixel, Rgba};
use serde::{Deserialize, Serialize};

use crate::kernel::{convolve3x3, luminance, Kernel3x3, SHARPEN_KERNEL};
use crate::partition::RowBand;
use crate::source::{BandMut, PixelSource};

/// A per-pixel or per-neighborhood transform that can run on disjoint bands
/// concurrently.
pub trait Transform: Sync {
    /// Output pixel type (8-bit subpixels).
    type Pixel: Pixel<Subpixel = u8> + Send;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Compute every output pixel this transform produces in `band`, writing
    /// into `out`, which covers exactly the rows of `band`.
    fn apply_band<S>(&self, src: &S, band: RowBand, out: &mut BandMut<'_, Self::Pixel>)
    where
        S: PixelSource + ?Sized;
}

/// Which transform to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Grayscale,
    Sharpen,
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformKind::Grayscale => write!(f, "grayscale"),
            TransformKind::Sharpen => write!(f, "sharpen"),
        }
    }
}

/// Luminance extraction: every pixel becomes the 8-bit red intensity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl Transform for Grayscale {
    type Pixel = Luma<u8>;

    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply_band<S>(&self, src: &S, band: RowBand, out: &mut BandMut<'_, Luma<u8>>)
    where
        S: PixelSource + ?Sized,
    {
        let width = src.width();
        for y in band.rows() {
            for x in 0..width {
                out.put(x, y, Luma([luminance(src.sample(x, y))]));
            }
        }
    }
}

/// 3x3 convolution over interior pixels.
///
/// Border pixels (`x == 0`, `x == W-1`, `y == 0`, `y == H-1`) are never
/// written and keep the output grid's zero value. Every worker reads the
/// same [`SHARPEN_KERNEL`].
#[derive(Debug, Clone, Copy)]
pub struct Sharpen {
    kernel: &'static Kernel3x3,
}

impl Sharpen {
    pub fn new() -> Self {
        Self {
            kernel: &SHARPEN_KERNEL,
        }
    }
}

impl Default for Sharpen {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Sharpen {
    type Pixel = Rgba<u8>;

    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn apply_band<S>(&self, src: &S, band: RowBand, out: &mut BandMut<'_, Rgba<u8>>)
    where
        S: PixelSource + ?Sized,
    {
        let (width, height) = src.dimensions();
        // Interior rows only; images narrower or shorter than 3 have none.
        let first = band.start.max(1);
        let last = band.end.min(height.saturating_sub(1));
        for y in first..last {
            for x in 1..width.saturating_sub(1) {
                out.put(x, y, convolve3x3(src, x, y, self.kernel));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::row_stride;
    use crate::Rgba64Image;
    use image::{GrayImage, RgbaImage};

    fn run_band<T: Transform>(
        transform: &T,
        src: &Rgba64Image,
        band: RowBand,
        out: &mut [u8],
    ) {
        let width = src.width();
        let stride = row_stride::<T::Pixel>(width);
        let slice = &mut out[band.start as usize * stride..band.end as usize * stride];
        let mut view = BandMut::new(band.start, width, slice);
        transform.apply_band(src, band, &mut view);
    }

    #[test]
    fn test_grayscale_band_touches_only_its_rows() {
        let src = Rgba64Image::from_pixel(4, 6, Rgba([65535, 0, 0, 65535]));
        let mut out = GrayImage::new(4, 6);
        run_band(&Grayscale, &src, RowBand::new(2, 4), &mut out);
        for (_, y, p) in out.enumerate_pixels() {
            let expected = if (2..4).contains(&y) { 255 } else { 0 };
            assert_eq!(p.0[0], expected, "row {y}");
        }
    }

    #[test]
    fn test_sharpen_band_at_top_skips_row_zero() {
        let src = Rgba64Image::from_pixel(5, 5, Rgba([25_700, 25_700, 25_700, 65535]));
        let mut out = RgbaImage::new(5, 5);
        run_band(&Sharpen::new(), &src, RowBand::new(0, 2), &mut out);
        assert_eq!(out.get_pixel(2, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(0, 1), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(1, 1), &Rgba([100, 100, 100, 255]));
        assert_eq!(out.get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_sharpen_tiny_images_have_no_interior() {
        for (w, h) in [(1, 1), (2, 5), (5, 2), (1, 9)] {
            let src = Rgba64Image::from_pixel(w, h, Rgba([65535; 4]));
            let mut out = RgbaImage::new(w, h);
            run_band(&Sharpen::new(), &src, RowBand::new(0, h), &mut out);
            assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]), "{w}x{h}");
        }
    }

    #[test]
    fn test_sharpen_shares_the_static_kernel() {
        assert!(std::ptr::eq(Sharpen::new().kernel, &SHARPEN_KERNEL));
        assert!(std::ptr::eq(Sharpen::default().kernel, &SHARPEN_KERNEL));
    }

    #[test]
    fn test_transform_kind_display() {
        assert_eq!(TransformKind::Grayscale.to_string(), "grayscale");
        assert_eq!(TransformKind::Sharpen.to_string(), "sharpen");
    }
}
