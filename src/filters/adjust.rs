//! Intensity adjustments: Gamma, Contrast, Brightness, Histogram Equalization.
//!
//! Pixel-wise operations over the 0-255 sample domain. Every function
//! returns a freshly computed image with the same shape as its input and
//! never touches the input buffer.
//!
//! Gamma, contrast and brightness are evaluated against the Original image.
//! Equalization is evaluated against the current Modified image, so it
//! composes with whichever edit preceded it.

use crate::buffer::Image;
use crate::filters::histogram::{self, bin_of, BINS};
use crate::session::state::{Mode, Parameters};

/// Scale factor mapping the brightness slider offset to an intensity shift.
pub const BRIGHTNESS_SCALE: f32 = 400.0;

/// Contrast pivot, applied in the raw 0-255 domain.
pub const CONTRAST_PIVOT: f32 = 0.5;

/// Tolerance for snapping a brightness offset to a whole intensity.
const SHIFT_SNAP: f64 = 1e-4;

fn map_samples<F>(input: &Image, f: F) -> Image
where
    F: Fn(f32) -> f32 + Sync + Send,
{
    let mut output = input.view().to_owned();
    output.par_mapv_inplace(f);
    Image::from_filtered(output)
}

/// Requantize a sample to the 8-bit intensity grid.
#[inline]
fn requantize(v: f32) -> f32 {
    v.clamp(0.0, 255.0).round()
}

// ============================================================================
// Gamma
// ============================================================================

/// Apply power-law gamma correction: `255 * (v / 255)^gamma`.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels, samples 0-255
/// * `gamma` - Exponent: > 1.0 darkens, < 1.0 brightens, 1.0 = no change
///
/// # Returns
/// Gamma-corrected image requantized to whole intensities
pub fn gamma(input: &Image, gamma: f32) -> Image {
    map_samples(input, |v| {
        let normalized = v.clamp(0.0, 255.0) / 255.0;
        requantize(255.0 * normalized.powf(gamma))
    })
}

// ============================================================================
// Contrast
// ============================================================================

/// Scale samples around a 0.5 pivot: `(v - 0.5) * contrast + 0.5`.
///
/// The pivot is applied to raw 0-255 samples, so the stretch is centred
/// just above black rather than at mid-gray. Results are clamped to 0-255
/// but keep their fractional part.
pub fn contrast(input: &Image, contrast: f32) -> Image {
    map_samples(input, |v| {
        ((v - CONTRAST_PIVOT) * contrast + CONTRAST_PIVOT).clamp(0.0, 255.0)
    })
}

// ============================================================================
// Brightness
// ============================================================================

/// Whole-intensity shift for a brightness setting; 0.5 is no shift.
///
/// The scaled offset is truncated toward zero. Offsets within
/// 1e-4 of a whole intensity snap to it first, so slider values
/// like 0.52 give exactly 8 despite `f32` representation error.
pub fn brightness_shift(brightness: f32) -> f32 {
    let shift = (brightness as f64 - 0.5) * BRIGHTNESS_SCALE as f64;
    let nearest = shift.round();
    let shift = if (shift - nearest).abs() < SHIFT_SNAP {
        nearest
    } else {
        shift.trunc()
    };
    shift as f32
}

/// Add a uniform offset derived from `brightness` (0.0-1.0) and clip.
pub fn brightness(input: &Image, brightness: f32) -> Image {
    let shift = brightness_shift(brightness);
    map_samples(input, move |v| (v + shift).clamp(0.0, 255.0))
}

// ============================================================================
// Histogram Equalization
// ============================================================================

/// Build the equalization lookup table for `input`.
///
/// Entry `i` is `round(255 * cdf(i) / N)` where `cdf(i)` counts the
/// samples in bins `0..=i`.
///
/// Bins are always the absolute unit bins of [`histogram::histogram`],
/// also for fractional buffers left by contrast or brightness: samples
/// sharing a `floor` map to the same output. The buffer's own min..max
/// range is not used for binning, so a chained equalization of a
/// fractional buffer can differ from range-adaptive implementations.
pub fn equalize_lut(input: &Image) -> [f32; BINS] {
    let cdf = histogram::histogram(input).cumulative();
    let total = cdf[BINS - 1].max(1) as f64;

    let mut lut = [0.0f32; BINS];
    for (entry, &c) in lut.iter_mut().zip(cdf.iter()) {
        *entry = (255.0 * c as f64 / total).round() as f32;
    }
    lut
}

/// Remap samples through the cumulative distribution of `input` itself.
///
/// Not idempotent: equalizing an equalized image may shift values again.
pub fn equalize(input: &Image) -> Image {
    let lut = equalize_lut(input);
    map_samples(input, move |v| lut[bin_of(v)])
}

// ============================================================================
// Dispatch
// ============================================================================

/// Compute the next Modified image for `mode`.
///
/// Returns `None` for [`Mode::None`], which has nothing to apply.
pub fn apply(mode: Mode, original: &Image, modified: &Image, params: &Parameters) -> Option<Image> {
    match mode {
        Mode::None => None,
        Mode::Gamma => Some(gamma(original, params.gamma())),
        Mode::Contrast => Some(contrast(original, params.contrast())),
        Mode::Brightness => Some(brightness(original, params.brightness())),
        Mode::HistogramEqualization => Some(equalize(modified)),
    }
}
