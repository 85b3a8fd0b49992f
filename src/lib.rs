//! HistAdjust
//!
//! Intensity adjustment engine for interactive before/after comparison of
//! grayscale images: gamma correction, contrast scaling, brightness shift
//! and histogram equalization, with 256-bin histograms of both images.
//! Optional Python bindings via PyO3 serve a display front-end.
//!
//! ## Image Format
//! Images are `(height, width, channels)` arrays of `f32` samples in the
//! nominal 0-255 range:
//! - **Grayscale**: (height, width, 1)
//! - **RGB**: (height, width, 3), every sample adjusted as an intensity
//!
//! ## Session Model
//! [`session::AdjustSession`] holds the Original image, the Modified image,
//! the selected [`Mode`] and the three parameters. Gamma, contrast and
//! brightness always recompute Modified from Original; equalization
//! recomputes it from the current Modified image.

pub mod buffer;
pub mod config;
pub mod error;
pub mod filters;
pub mod session;

pub use buffer::Image;
pub use config::{AdjustConfig, ParameterRange};
pub use error::{AdjustError, AdjustResult};
pub use filters::histogram::Histogram;
pub use session::state::{Mode, Parameter, Parameters, Phase};
pub use session::store::SampleImage;
pub use session::{AdjustSession, DisplayFrame, SessionState};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::path::PathBuf;

    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::filters::{adjust, histogram};
    use crate::{AdjustConfig, AdjustError, AdjustSession, DisplayFrame, Image, Mode, Parameter};

    impl From<AdjustError> for PyErr {
        fn from(err: AdjustError) -> Self {
            match err {
                AdjustError::Load { .. } => PyIOError::new_err(err.to_string()),
                AdjustError::NoImageLoaded => PyRuntimeError::new_err(err.to_string()),
                AdjustError::UnsupportedImageFormat(_) | AdjustError::Config(_) => {
                    PyValueError::new_err(err.to_string())
                }
            }
        }
    }

    /// (original, modified, original_histogram, modified_histogram), images
    /// requantized to `uint8` for display.
    type FrameTuple<'py> = (
        Bound<'py, PyArray3<u8>>,
        Bound<'py, PyArray3<u8>>,
        Vec<u32>,
        Vec<u32>,
    );

    fn frame_to_py(py: Python<'_>, frame: DisplayFrame) -> FrameTuple<'_> {
        (
            frame.original.to_u8().into_pyarray(py),
            frame.modified.to_u8().into_pyarray(py),
            frame.original_histogram.counts().to_vec(),
            frame.modified_histogram.counts().to_vec(),
        )
    }

    fn image_from_py(image: PyReadonlyArray3<'_, f32>) -> PyResult<Image> {
        Ok(Image::from_array(image.as_array().to_owned())?)
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Interactive adjustment session.
    ///
    /// Every state-changing method returns the display tuple
    /// `(original, modified, original_hist, modified_hist)` with `uint8`
    /// images.
    #[pyclass(name = "AdjustSession", unsendable)]
    pub struct PyAdjustSession {
        inner: AdjustSession,
    }

    #[pymethods]
    impl PyAdjustSession {
        #[new]
        #[pyo3(signature = (images_dir=None, config_path=None))]
        fn new(images_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> PyResult<Self> {
            let mut config = match config_path {
                Some(path) => AdjustConfig::from_file(&path)?,
                None => AdjustConfig::default(),
            };
            if let Some(dir) = images_dir {
                config.images_dir = dir;
            }
            Ok(Self {
                inner: AdjustSession::new(config)?,
            })
        }

        fn load<'py>(&mut self, py: Python<'py>, source_id: &str) -> PyResult<FrameTuple<'py>> {
            let frame = self.inner.load(source_id)?;
            Ok(frame_to_py(py, frame))
        }

        fn load_array<'py>(
            &mut self,
            py: Python<'py>,
            image: PyReadonlyArray3<'py, f32>,
        ) -> PyResult<FrameTuple<'py>> {
            let image = image_from_py(image)?;
            Ok(frame_to_py(py, self.inner.load_image(image)))
        }

        /// Load a `(height, width)` `uint8` grayscale array.
        fn load_gray<'py>(
            &mut self,
            py: Python<'py>,
            image: PyReadonlyArray2<'py, u8>,
        ) -> PyResult<FrameTuple<'py>> {
            let image = Image::from_gray_view(image.as_array())?;
            Ok(frame_to_py(py, self.inner.load_image(image)))
        }

        fn select_mode(&mut self, mode: &str) -> PyResult<()> {
            let mode: Mode = mode.parse().map_err(PyValueError::new_err)?;
            self.inner.select_mode(mode)?;
            Ok(())
        }

        /// Returns the stored (clamped) value, or None if the edit was ignored.
        fn set_parameter(&mut self, parameter: &str, value: f32) -> PyResult<Option<f32>> {
            let parameter: Parameter = parameter.parse().map_err(PyValueError::new_err)?;
            Ok(self.inner.set_parameter(parameter, value))
        }

        fn apply<'py>(&mut self, py: Python<'py>) -> PyResult<FrameTuple<'py>> {
            let frame = self.inner.apply()?;
            Ok(frame_to_py(py, frame))
        }

        fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<FrameTuple<'py>> {
            let frame = self.inner.reset()?;
            Ok(frame_to_py(py, frame))
        }

        #[getter]
        fn mode(&self) -> &'static str {
            self.inner.mode().name()
        }

        #[getter]
        fn modes_available(&self) -> bool {
            self.inner.phase().modes_available()
        }

        #[getter]
        fn editable_parameter(&self) -> Option<&'static str> {
            self.inner.editable_parameter().map(|p| p.name())
        }

        fn label(&self, parameter: &str) -> PyResult<String> {
            let parameter: Parameter = parameter.parse().map_err(PyValueError::new_err)?;
            Ok(self.inner.label(parameter))
        }
    }

    // ========================================================================
    // Stateless Filters
    // ========================================================================

    #[pyfunction]
    pub fn gamma<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        gamma: f32,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let input = image_from_py(image)?;
        Ok(adjust::gamma(&input, gamma).into_array().into_pyarray(py))
    }

    #[pyfunction]
    pub fn contrast<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        contrast: f32,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let input = image_from_py(image)?;
        Ok(adjust::contrast(&input, contrast).into_array().into_pyarray(py))
    }

    #[pyfunction]
    pub fn brightness<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        brightness: f32,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let input = image_from_py(image)?;
        Ok(adjust::brightness(&input, brightness).into_array().into_pyarray(py))
    }

    #[pyfunction]
    pub fn equalize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let input = image_from_py(image)?;
        Ok(adjust::equalize(&input).into_array().into_pyarray(py))
    }

    /// 256-bin intensity histogram.
    #[pyfunction(name = "histogram")]
    pub fn histogram_counts(image: PyReadonlyArray3<'_, f32>) -> PyResult<Vec<u32>> {
        let input = image_from_py(image)?;
        Ok(histogram::histogram(&input).counts().to_vec())
    }

    #[pymodule]
    pub fn histadjust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<PyAdjustSession>()?;

        m.add_function(wrap_pyfunction!(gamma, m)?)?;
        m.add_function(wrap_pyfunction!(contrast, m)?)?;
        m.add_function(wrap_pyfunction!(brightness, m)?)?;
        m.add_function(wrap_pyfunction!(equalize, m)?)?;
        m.add_function(wrap_pyfunction!(histogram_counts, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::histadjust;
