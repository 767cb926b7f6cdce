//! Row-band partitioning of an image's vertical extent.

use std::ops::Range;

/// Half-open range of image rows `[start, end)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    pub start: u32,
    pub end: u32,
}

impl RowBand {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of rows in the band.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// An empty band is legal; its worker has nothing to do.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<u32> {
        self.start..self.end
    }
}

/// Split `[0, height)` into exactly `workers` contiguous bands.
///
/// Every band but the last holds `height / workers` rows; the last band runs
/// to `height` and absorbs the remainder. When `height < workers` all bands
/// except the last are empty.
///
/// # Panics
///
/// Panics if `workers` is 0.
pub fn partition_rows(height: u32, workers: usize) -> Vec<RowBand> {
    assert!(workers > 0, "workers must be > 0");

    let step = height as usize / workers;
    (0..workers)
        .map(|i| {
            let start = (i * step) as u32;
            let end = if i == workers - 1 {
                height
            } else {
                ((i + 1) * step) as u32
            };
            RowBand::new(start, end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(bands: &[RowBand], height: u32) {
        let mut next = 0;
        for band in bands {
            assert_eq!(band.start, next, "gap or overlap at row {next}");
            assert!(band.start <= band.end);
            next = band.end;
        }
        assert_eq!(next, height);
    }

    #[test]
    fn test_bands_cover_every_row_once() {
        for height in 1..=64u32 {
            for workers in 1..=(height as usize + 5) {
                let bands = partition_rows(height, workers);
                assert_eq!(bands.len(), workers);
                assert_exact_cover(&bands, height);
                let total: u32 = bands.iter().map(RowBand::len).sum();
                assert_eq!(total, height);
            }
        }
    }

    #[test]
    fn test_last_band_absorbs_remainder() {
        let bands = partition_rows(10, 3);
        assert_eq!(
            bands,
            vec![RowBand::new(0, 3), RowBand::new(3, 6), RowBand::new(6, 10)]
        );
    }

    #[test]
    fn test_more_workers_than_rows() {
        let bands = partition_rows(2, 5);
        assert_eq!(bands.len(), 5);
        assert!(bands[..4].iter().all(RowBand::is_empty));
        assert_eq!(bands[4], RowBand::new(0, 2));
    }

    #[test]
    fn test_single_worker_takes_everything() {
        assert_eq!(partition_rows(7, 1), vec![RowBand::new(0, 7)]);
    }

    #[test]
    #[should_panic(expected = "workers must be > 0")]
    fn test_zero_workers_panics() {
        partition_rows(4, 0);
    }
}
