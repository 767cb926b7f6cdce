//! Read-only pixel sources and write-only row bands of an output grid.
//!
//! Sources hand out 16-bit, alpha-premultiplied RGBA samples regardless of
//! how the decoded image stores them, so the kernels see one fixed intensity
//! scale (0-65535). Opaque images, including every JPEG, are unaffected by
//! premultiplication.
//! Output grids are plain `image` buffers with 8-bit subpixels; a
//! [`BandMut`] borrows a contiguous run of their rows.

use image::{ImageBuffer, Pixel, Rgba};
use std::ops::Deref;

/// A 16-bit RGBA sample read from a source.
pub type Sample = Rgba<u16>;

/// Read-only, addressable 2-D grid of color samples.
///
/// Implementations must be safe to read from many workers at once.
pub trait PixelSource: Sync {
    /// `(width, height)` of the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Premultiplied sample at `(x, y)`. Callers guarantee `x < width` and
    /// `y < height`.
    fn sample(&self, x: u32, y: u32) -> Sample;

    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

impl<C> PixelSource for ImageBuffer<Rgba<u16>, C>
where
    C: Deref<Target = [u16]> + Sync,
{
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> Sample {
        premultiply(*self.get_pixel(x, y))
    }
}

impl<C> PixelSource for ImageBuffer<Rgba<u8>, C>
where
    C: Deref<Target = [u8]> + Sync,
{
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> Sample {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        premultiply(Rgba([widen(r), widen(g), widen(b), widen(a)]))
    }
}

/// Scale the color channels of a straight-alpha sample by its alpha.
#[inline]
pub fn premultiply(sample: Sample) -> Sample {
    let [r, g, b, a] = sample.0;
    if a == u16::MAX {
        return sample;
    }
    let scale = |c: u16| (u32::from(c) * u32::from(a) / u32::from(u16::MAX)) as u16;
    Rgba([scale(r), scale(g), scale(b), a])
}

/// Widen an 8-bit intensity to the 16-bit scale (`v * 257`).
#[inline]
pub fn widen(v: u8) -> u16 {
    (u16::from(v) << 8) | u16::from(v)
}

/// Write-only view over rows `[first_row, first_row + rows)` of an output grid.
///
/// Coordinates are absolute image coordinates; the band translates them into
/// its own slice. Bands of one grid never alias, so each can be handed to a
/// different worker.
pub struct BandMut<'a, P: Pixel<Subpixel = u8>> {
    first_row: u32,
    width: u32,
    rows: u32,
    data: &'a mut [u8],
    _pixel: std::marker::PhantomData<P>,
}

impl<'a, P: Pixel<Subpixel = u8>> BandMut<'a, P> {
    /// Wrap `data`, which must hold whole rows of `width` pixels of `P`.
    pub fn new(first_row: u32, width: u32, data: &'a mut [u8]) -> Self {
        let stride = row_stride::<P>(width);
        let rows = if stride == 0 { 0 } else { data.len() / stride };
        debug_assert_eq!(rows * stride, data.len());
        Self {
            first_row,
            width,
            rows: rows as u32,
            data,
            _pixel: std::marker::PhantomData,
        }
    }

    /// Number of rows covered by this band.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Write `pixel` at absolute coordinates `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside this band.
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, pixel: P) {
        assert!(
            x < self.width && y >= self.first_row && y < self.first_row + self.rows,
            "pixel ({x}, {y}) outside band starting at row {}",
            self.first_row
        );
        let channels = usize::from(P::CHANNEL_COUNT);
        let offset = (y - self.first_row) as usize * row_stride::<P>(self.width)
            + x as usize * channels;
        self.data[offset..offset + channels].copy_from_slice(pixel.channels());
    }
}

/// Bytes per row of `width` pixels of `P`.
#[inline]
pub(crate) fn row_stride<P: Pixel<Subpixel = u8>>(width: u32) -> usize {
    width as usize * usize::from(P::CHANNEL_COUNT)
}
