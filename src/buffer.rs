//! Intensity image buffer.
//!
//! Samples are stored as `f32` in the nominal 0-255 domain with shape
//! `(height, width, channels)`. Only grayscale (1 channel) and RGB
//! (3 channels) layouts are accepted; RGB samples are treated uniformly,
//! each one adjusted as an independent intensity.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AdjustError, AdjustResult};

/// Supported channel counts.
pub const SUPPORTED_CHANNELS: [usize; 2] = [1, 3];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array3<f32>", into = "Array3<f32>")]
pub struct Image {
    data: Array3<f32>,
}

impl Image {
    /// Wrap an array, validating its layout and samples.
    pub fn from_array(data: Array3<f32>) -> AdjustResult<Self> {
        let (height, width, channels) = data.dim();
        if height == 0 || width == 0 {
            return Err(AdjustError::UnsupportedImageFormat(format!(
                "empty image ({width}x{height})"
            )));
        }
        if !SUPPORTED_CHANNELS.contains(&channels) {
            return Err(AdjustError::UnsupportedImageFormat(format!(
                "{channels} channels per pixel, expected 1 or 3"
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(AdjustError::UnsupportedImageFormat(
                "non-finite sample values".to_string(),
            ));
        }
        // Standard layout keeps the sample slice contiguous for the filters.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// Build a single channel image from row-major 8-bit samples.
    pub fn from_gray_u8(width: usize, height: usize, samples: Vec<u8>) -> AdjustResult<Self> {
        Self::from_u8(width, height, 1, samples)
    }

    /// Build an image from row-major interleaved 8-bit samples.
    pub fn from_u8(
        width: usize,
        height: usize,
        channels: usize,
        samples: Vec<u8>,
    ) -> AdjustResult<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| {
                AdjustError::UnsupportedImageFormat(format!(
                    "{width}x{height}x{channels} image is too large"
                ))
            })?;
        if samples.len() != expected {
            return Err(AdjustError::UnsupportedImageFormat(format!(
                "{} samples for a {width}x{height}x{channels} image, expected {expected}",
                samples.len()
            )));
        }
        let floats: Vec<f32> = samples.into_iter().map(f32::from).collect();
        let data = Array3::from_shape_vec((height, width, channels), floats)
            .map_err(|e| AdjustError::UnsupportedImageFormat(e.to_string()))?;
        Self::from_array(data)
    }

    /// Build a single channel image from a `(height, width)` 8-bit view, as
    /// produced by grayscale decoders.
    pub fn from_gray_view(view: ArrayView2<'_, u8>) -> AdjustResult<Self> {
        let data = view.mapv(f32::from).insert_axis(Axis(2));
        Self::from_array(data)
    }

    /// Wrap an already validated array. Used by the filters, whose outputs
    /// keep the input's shape.
    pub(crate) fn from_filtered(data: Array3<f32>) -> Self {
        debug_assert!(SUPPORTED_CHANNELS.contains(&data.dim().2));
        Self { data }
    }

    /// `(height, width, channels)`
    pub fn dims(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Contiguous row-major samples.
    pub fn samples(&self) -> &[f32] {
        // Invariant: construction always yields standard layout.
        self.data
            .as_slice()
            .unwrap_or_else(|| unreachable!("image buffers are always standard layout"))
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }

    /// Requantize to 8-bit for display.
    pub fn to_u8(&self) -> Array3<u8> {
        self.data.mapv(|v| v.round().clamp(0.0, 255.0) as u8)
    }
}

impl TryFrom<Array3<f32>> for Image {
    type Error = AdjustError;

    fn try_from(data: Array3<f32>) -> Result<Self, Self::Error> {
        Image::from_array(data)
    }
}

impl From<Image> for Array3<f32> {
    fn from(image: Image) -> Self {
        image.data
    }
}
