//! Image Buffer Store: sample resolution, decoding and the
//! Original/Modified buffer pair.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{ColorType, DynamicImage};
use serde::{Deserialize, Serialize};

use crate::buffer::Image;
use crate::config::AdjustConfig;
use crate::error::{AdjustError, AdjustResult};

/// The named sample images a session can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleImage {
    #[default]
    Tires,
    Bubbles,
}

impl SampleImage {
    pub const ALL: &'static [SampleImage] = &[SampleImage::Tires, SampleImage::Bubbles];

    pub fn name(&self) -> &'static str {
        match self {
            SampleImage::Tires => "tires",
            SampleImage::Bubbles => "bubbles",
        }
    }
}

impl fmt::Display for SampleImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleImage {
    type Err = AdjustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleImage::ALL
            .iter()
            .copied()
            .find(|sample| sample.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AdjustError::load(s, "unknown sample image"))
    }
}

/// Turns a file on disk into an intensity buffer.
pub trait SourceDecoder: Send {
    fn decode(&self, path: &Path) -> AdjustResult<Image>;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl SourceDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> AdjustResult<Image> {
        let decoded =
            image::open(path).map_err(|e| AdjustError::load(path.display().to_string(), e))?;
        image_from_dynamic(decoded)
    }
}

/// Convert a decoded image into an intensity buffer.
///
/// Grayscale decodes to one channel, RGB to three. Layouts with alpha or
/// float samples are rejected.
pub fn image_from_dynamic(decoded: DynamicImage) -> AdjustResult<Image> {
    let width = decoded.width() as usize;
    let height = decoded.height() as usize;
    match decoded.color() {
        ColorType::L8 | ColorType::L16 => {
            Image::from_u8(width, height, 1, decoded.to_luma8().into_raw())
        }
        ColorType::Rgb8 | ColorType::Rgb16 => {
            Image::from_u8(width, height, 3, decoded.to_rgb8().into_raw())
        }
        other => Err(AdjustError::UnsupportedImageFormat(format!(
            "{other:?} pixel layout"
        ))),
    }
}

/// Resolves sample names to files and decodes them.
pub struct ImageStore {
    images_dir: PathBuf,
    extension: String,
    decoder: Box<dyn SourceDecoder>,
}

impl fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStore")
            .field("images_dir", &self.images_dir)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl ImageStore {
    pub fn new(config: &AdjustConfig, decoder: Box<dyn SourceDecoder>) -> Self {
        Self {
            images_dir: config.images_dir.clone(),
            extension: config.extension.clone(),
            decoder,
        }
    }

    /// `<images_dir>/<name>.<extension>`
    pub fn path_of(&self, sample: SampleImage) -> PathBuf {
        self.images_dir
            .join(format!("{}.{}", sample.name(), self.extension))
    }

    /// Resolve and decode a named sample.
    pub fn fetch(&self, source_id: &str) -> AdjustResult<Image> {
        let sample: SampleImage = source_id.parse()?;
        let path = self.path_of(sample);
        log::debug!("Decoding sample '{}' from {}", sample, path.display());
        self.decoder.decode(&path)
    }
}

/// The immutable Original and the derived Modified buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buffers {
    original: Image,
    modified: Image,
}

impl Buffers {
    /// Start a pair with Modified as an independent copy of Original.
    pub fn new(original: Image) -> Self {
        let modified = original.clone();
        Self { original, modified }
    }

    pub(crate) fn validate(&self) -> AdjustResult<()> {
        if self.original.dims() != self.modified.dims() {
            return Err(AdjustError::UnsupportedImageFormat(format!(
                "modified buffer {:?} does not match original {:?}",
                self.modified.dims(),
                self.original.dims()
            )));
        }
        Ok(())
    }

    pub fn original(&self) -> &Image {
        &self.original
    }

    pub fn modified(&self) -> &Image {
        &self.modified
    }

    pub(crate) fn replace_modified(&mut self, modified: Image) {
        debug_assert_eq!(modified.dims(), self.original.dims());
        self.modified = modified;
    }

    pub(crate) fn reset(&mut self) {
        self.modified = self.original.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage, RgbaImage};

    fn store_in(dir: &Path, extension: &str) -> ImageStore {
        let config = AdjustConfig {
            images_dir: dir.to_path_buf(),
            extension: extension.to_string(),
            ..AdjustConfig::default()
        };
        ImageStore::new(&config, Box::new(FileDecoder))
    }

    #[test]
    fn test_sample_names() {
        assert_eq!("tires".parse::<SampleImage>().unwrap(), SampleImage::Tires);
        assert_eq!("Bubbles".parse::<SampleImage>().unwrap(), SampleImage::Bubbles);
        assert!(matches!(
            "moon".parse::<SampleImage>(),
            Err(AdjustError::Load { .. })
        ));
    }

    #[test]
    fn test_path_convention() {
        let store = store_in(Path::new("images"), "jpg");
        assert_eq!(
            store.path_of(SampleImage::Bubbles),
            PathBuf::from("images").join("bubbles.jpg")
        );
    }

    #[test]
    fn test_fetch_grayscale_png() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_raw(2, 2, vec![0, 128, 255, 64])
            .unwrap()
            .save(dir.path().join("tires.png"))
            .unwrap();

        let image = store_in(dir.path(), "png").fetch("tires").unwrap();

        assert_eq!(image.dims(), (2, 2, 1));
        assert_eq!(image.samples(), &[0.0, 128.0, 255.0, 64.0]);
    }

    #[test]
    fn test_fetch_rgb_png() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_raw(1, 1, vec![10, 20, 30])
            .unwrap()
            .save(dir.path().join("bubbles.png"))
            .unwrap();

        let image = store_in(dir.path(), "png").fetch("bubbles").unwrap();
        assert_eq!(image.dims(), (1, 1, 3));
    }

    #[test]
    fn test_fetch_rgba_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_raw(1, 1, vec![10, 20, 30, 40])
            .unwrap()
            .save(dir.path().join("tires.png"))
            .unwrap();

        let err = store_in(dir.path(), "png").fetch("tires").unwrap_err();
        assert!(matches!(err, AdjustError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_fetch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(dir.path(), "png").fetch("tires").unwrap_err();
        assert!(matches!(err, AdjustError::Load { .. }));
    }

    #[test]
    fn test_fetch_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tires.png"), b"not a png").unwrap();

        let err = store_in(dir.path(), "png").fetch("tires").unwrap_err();
        assert!(matches!(err, AdjustError::Load { .. }));
    }

    #[test]
    fn test_buffers_reset_copies_original() {
        let original = Image::from_gray_u8(2, 1, vec![3, 4]).unwrap();
        let mut buffers = Buffers::new(original.clone());
        buffers.replace_modified(Image::from_gray_u8(2, 1, vec![9, 9]).unwrap());
        assert_ne!(buffers.modified(), &original);

        buffers.reset();
        assert_eq!(buffers.modified(), &original);
        assert_eq!(buffers.original(), &original);
    }
}
