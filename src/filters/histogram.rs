//! 256-bin intensity histogram.
//!
//! Bins have unit width over 0-255. A sample falls into bin
//! `floor(value)`, clamped to the first/last bin, so every sample of every
//! channel is counted exactly once.

use rayon::prelude::*;

use crate::buffer::Image;

pub const BINS: usize = 256;

/// Samples counted per parallel work item.
const CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u32; BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { counts: [0; BINS] }
    }
}

impl Histogram {
    pub fn counts(&self) -> &[u32; BINS] {
        &self.counts
    }

    /// Total number of samples counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Running sum of counts; entry `i` covers bins `0..=i`.
    pub fn cumulative(&self) -> [u64; BINS] {
        let mut cdf = [0u64; BINS];
        let mut sum = 0u64;
        for (i, &count) in self.counts.iter().enumerate() {
            sum += count as u64;
            cdf[i] = sum;
        }
        cdf
    }
}

/// Bin index of a sample.
#[inline]
pub fn bin_of(value: f32) -> usize {
    value.floor().clamp(0.0, (BINS - 1) as f32) as usize
}

/// Count the samples of `image` per intensity bin.
pub fn histogram(image: &Image) -> Histogram {
    image
        .samples()
        .par_chunks(CHUNK)
        .fold(Histogram::default, |mut hist, chunk| {
            for &v in chunk {
                hist.counts[bin_of(v)] += 1;
            }
            hist
        })
        .reduce(Histogram::default, |mut acc, part| {
            for (a, b) in acc.counts.iter_mut().zip(part.counts.iter()) {
                *a += b;
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_histogram_counts_every_sample() {
        let img = Image::from_gray_u8(2, 2, vec![0, 128, 255, 64]).unwrap();
        let hist = histogram(&img);

        assert_eq!(hist.total(), 4);
        assert_eq!(hist.counts()[0], 1);
        assert_eq!(hist.counts()[64], 1);
        assert_eq!(hist.counts()[128], 1);
        assert_eq!(hist.counts()[255], 1);
    }

    #[test]
    fn test_histogram_rgb_counts_all_channels() {
        let img = Image::from_array(Array3::<f32>::from_elem((3, 5, 3), 10.0)).unwrap();
        let hist = histogram(&img);

        assert_eq!(hist.total(), img.sample_count() as u64);
        assert_eq!(hist.counts()[10], 45);
    }

    #[test]
    fn test_fractional_and_out_of_range_samples() {
        let img = Image::from_array(array![[[127.5f32], [-4.0], [300.0], [254.99]]]).unwrap();
        let hist = histogram(&img);

        assert_eq!(hist.counts()[127], 1);
        assert_eq!(hist.counts()[0], 1);
        assert_eq!(hist.counts()[254], 1);
        assert_eq!(hist.counts()[255], 1);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn test_cumulative_ends_at_total() {
        let img = Image::from_gray_u8(3, 1, vec![5, 5, 200]).unwrap();
        let cdf = histogram(&img).cumulative();

        assert_eq!(cdf[4], 0);
        assert_eq!(cdf[5], 2);
        assert_eq!(cdf[199], 2);
        assert_eq!(cdf[255], 3);
    }
}
