//! Interactive adjustment session.
//!
//! `AdjustSession` owns one explicit [`SessionState`] (mode, parameters and
//! the Original/Modified pair) and exposes the user actions as plain
//! commands. Each command runs to completion and hands back what a display
//! front-end needs to render; nothing here depends on an event loop.
//!
//! ```text
//! Locked ──load──▶ Loaded(None) ──select_mode(m)──▶ Loaded(m)
//!                      ▲                               │
//!                      └─────────────reset─────────────┘
//! ```

pub mod state;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::buffer::Image;
use crate::config::AdjustConfig;
use crate::error::{AdjustError, AdjustResult};
use crate::filters::adjust;
use crate::filters::histogram::{histogram, Histogram};

use state::{Mode, Parameter, Parameters, Phase};
use store::{Buffers, FileDecoder, ImageStore, SourceDecoder};

/// Snapshot handed to the display after every state-affecting command.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub original: Image,
    pub modified: Image,
    pub original_histogram: Histogram,
    pub modified_histogram: Histogram,
}

impl DisplayFrame {
    fn capture(buffers: &Buffers) -> Self {
        Self {
            original: buffers.original().clone(),
            modified: buffers.modified().clone(),
            original_histogram: histogram(buffers.original()),
            modified_histogram: histogram(buffers.modified()),
        }
    }
}

/// Everything that defines a session at a point in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Mode,
    pub params: Parameters,
    pub buffers: Option<Buffers>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self.buffers {
            None => Phase::Locked,
            Some(_) => Phase::Loaded(self.mode),
        }
    }
}

#[derive(Debug)]
pub struct AdjustSession {
    config: AdjustConfig,
    store: ImageStore,
    state: SessionState,
}

impl Default for AdjustSession {
    fn default() -> Self {
        let config = AdjustConfig::default();
        let store = ImageStore::new(&config, Box::new(FileDecoder));
        let state = SessionState {
            params: Parameters::from_config(&config),
            ..SessionState::default()
        };
        Self {
            config,
            store,
            state,
        }
    }
}

impl AdjustSession {
    pub fn new(config: AdjustConfig) -> AdjustResult<Self> {
        Self::with_decoder(config, Box::new(FileDecoder))
    }

    pub fn with_decoder(
        config: AdjustConfig,
        decoder: Box<dyn SourceDecoder>,
    ) -> AdjustResult<Self> {
        config.validate()?;
        let store = ImageStore::new(&config, decoder);
        let state = SessionState {
            params: Parameters::from_config(&config),
            ..SessionState::default()
        };
        Ok(Self {
            config,
            store,
            state,
        })
    }

    /// Rebuild a session from an exported state.
    pub fn from_state(config: AdjustConfig, state: SessionState) -> AdjustResult<Self> {
        let mut session = Self::new(config)?;
        match &state.buffers {
            Some(buffers) => buffers.validate()?,
            None if state.mode != Mode::None => {
                return Err(AdjustError::NoImageLoaded);
            }
            None => {}
        }
        let mut params = Parameters::from_config(&session.config);
        for &p in Parameter::ALL {
            params.set_clamped(p, state.params.get(p), &p.range(&session.config));
        }
        session.state = SessionState { params, ..state };
        Ok(session)
    }

    pub fn config(&self) -> &AdjustConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn parameters(&self) -> &Parameters {
        &self.state.params
    }

    /// The parameter the display may offer for editing, if any.
    pub fn editable_parameter(&self) -> Option<Parameter> {
        self.phase().editable_parameter()
    }

    pub fn label(&self, parameter: Parameter) -> String {
        self.state.params.label(parameter)
    }

    pub fn original(&self) -> Option<&Image> {
        self.state.buffers.as_ref().map(Buffers::original)
    }

    pub fn modified(&self) -> Option<&Image> {
        self.state.buffers.as_ref().map(Buffers::modified)
    }

    /// Current display snapshot, or `None` before the first load.
    pub fn frame(&self) -> Option<DisplayFrame> {
        self.state.buffers.as_ref().map(DisplayFrame::capture)
    }

    fn loaded(&self) -> AdjustResult<&Buffers> {
        self.state.buffers.as_ref().ok_or(AdjustError::NoImageLoaded)
    }

    /// Load a named sample image.
    ///
    /// On failure the session keeps whatever it had before.
    pub fn load(&mut self, source_id: &str) -> AdjustResult<DisplayFrame> {
        match self.store.fetch(source_id) {
            Ok(image) => Ok(self.load_image(image)),
            Err(e) => {
                log::warn!("Failed to load '{}': {}", source_id, e);
                Err(e)
            }
        }
    }

    /// Install an already decoded image as the new Original.
    pub fn load_image(&mut self, image: Image) -> DisplayFrame {
        log::info!(
            "Loaded {}x{} image with {} channel(s)",
            image.width(),
            image.height(),
            image.channels()
        );
        let buffers = Buffers::new(image);
        let frame = DisplayFrame::capture(&buffers);
        self.state.buffers = Some(buffers);
        self.state.mode = Mode::None;
        frame
    }

    /// Choose the active adjustment. Unavailable until an image is loaded.
    pub fn select_mode(&mut self, mode: Mode) -> AdjustResult<Phase> {
        self.loaded()?;
        if self.state.mode != mode {
            log::debug!("Mode {} -> {}", self.state.mode, mode);
        }
        self.state.mode = mode;
        Ok(self.phase())
    }

    /// Edit a parameter. Values are clamped into the configured range.
    ///
    /// Returns the stored value, or `None` when the parameter is locked
    /// (not the selected mode's) or `value` is NaN; both leave the
    /// parameters untouched.
    pub fn set_parameter(&mut self, parameter: Parameter, value: f32) -> Option<f32> {
        if !self.phase().is_editable(parameter) {
            log::debug!("Ignoring edit of locked parameter {}", parameter.name());
            return None;
        }
        if value.is_nan() {
            log::debug!("Ignoring NaN for {}", parameter.name());
            return None;
        }
        let range = parameter.range(&self.config);
        Some(self.state.params.set_clamped(parameter, value, &range))
    }

    /// Run the selected adjustment and replace Modified with the result.
    pub fn apply(&mut self) -> AdjustResult<DisplayFrame> {
        let buffers = self.loaded()?;
        let mode = self.state.mode;
        let params = self.state.params;

        let Some(next) = adjust::apply(mode, buffers.original(), buffers.modified(), &params)
        else {
            log::debug!("Apply with no mode selected");
            return Ok(DisplayFrame::capture(buffers));
        };

        match mode.parameter() {
            Some(p) => log::info!("Applied {} ({})", mode, params.label(p)),
            None => log::info!("Applied {}", mode),
        }

        let buffers = self
            .state
            .buffers
            .as_mut()
            .ok_or(AdjustError::NoImageLoaded)?;
        buffers.replace_modified(next);
        Ok(DisplayFrame::capture(buffers))
    }

    /// Discard edits: Modified = Original, mode None, default parameters.
    pub fn reset(&mut self) -> AdjustResult<DisplayFrame> {
        let buffers = self
            .state
            .buffers
            .as_mut()
            .ok_or(AdjustError::NoImageLoaded)?;
        buffers.reset();
        let frame = DisplayFrame::capture(buffers);
        self.state.mode = Mode::None;
        self.state.params = Parameters::from_config(&self.config);
        log::info!("Reset to original");
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn init_logger() {
        INIT.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });
    }

    /// Decoder that serves a fixed image for any path.
    struct FixedDecoder(Option<Image>);

    impl SourceDecoder for FixedDecoder {
        fn decode(&self, path: &Path) -> AdjustResult<Image> {
            self.0
                .clone()
                .ok_or_else(|| AdjustError::load(path.display().to_string(), "decode failed"))
        }
    }

    fn sample() -> Image {
        Image::from_gray_u8(2, 2, vec![0, 128, 255, 64]).unwrap()
    }

    fn loaded_session() -> AdjustSession {
        init_logger();
        let mut session = AdjustSession::default();
        session.load_image(sample());
        session
    }

    fn assert_frame_invariants(frame: &DisplayFrame) {
        assert_eq!(frame.original_histogram.total(), frame.original.sample_count() as u64);
        assert_eq!(frame.modified_histogram.total(), frame.modified.sample_count() as u64);
        assert!(frame
            .modified
            .samples()
            .iter()
            .all(|&v| (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn test_starts_locked() {
        init_logger();
        let mut session = AdjustSession::default();

        assert_eq!(session.phase(), Phase::Locked);
        assert!(session.frame().is_none());
        assert!(matches!(
            session.select_mode(Mode::Gamma),
            Err(AdjustError::NoImageLoaded)
        ));
        assert!(matches!(session.apply(), Err(AdjustError::NoImageLoaded)));
        assert!(matches!(session.reset(), Err(AdjustError::NoImageLoaded)));
        assert_eq!(session.set_parameter(Parameter::Gamma, 2.0), None);
    }

    #[test]
    fn test_load_via_decoder() {
        init_logger();
        let mut session =
            AdjustSession::with_decoder(AdjustConfig::default(), Box::new(FixedDecoder(Some(sample()))))
                .unwrap();

        let frame = session.load("bubbles").unwrap();

        assert_eq!(session.phase(), Phase::Loaded(Mode::None));
        assert_eq!(frame.original, frame.modified);
        assert_frame_invariants(&frame);
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        init_logger();
        let mut session =
            AdjustSession::with_decoder(AdjustConfig::default(), Box::new(FixedDecoder(None)))
                .unwrap();

        assert!(matches!(session.load("tires"), Err(AdjustError::Load { .. })));
        assert_eq!(session.phase(), Phase::Locked);

        session.load_image(sample());
        session.select_mode(Mode::Brightness).unwrap();
        session.set_parameter(Parameter::Brightness, 0.75);
        session.apply().unwrap();
        let before = session.state().clone();

        assert!(session.load("tires").is_err());
        assert!(session.load("not-a-sample").is_err());
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_edit_lock_follows_mode() {
        let mut session = loaded_session();
        assert_eq!(session.editable_parameter(), None);
        assert_eq!(session.set_parameter(Parameter::Gamma, 2.0), None);

        session.select_mode(Mode::Gamma).unwrap();
        assert_eq!(session.editable_parameter(), Some(Parameter::Gamma));
        assert_eq!(session.set_parameter(Parameter::Gamma, 2.0), Some(2.0));
        assert_eq!(session.set_parameter(Parameter::Contrast, 3.0), None);
        assert_eq!(session.parameters().contrast(), 1.0);

        session.select_mode(Mode::HistogramEqualization).unwrap();
        assert_eq!(session.editable_parameter(), None);
        // Locked parameters keep their values
        assert_eq!(session.parameters().gamma(), 2.0);
    }

    #[test]
    fn test_set_parameter_clamps() {
        let mut session = loaded_session();
        session.select_mode(Mode::Contrast).unwrap();

        assert_eq!(session.set_parameter(Parameter::Contrast, 12.0), Some(5.0));
        assert_eq!(session.set_parameter(Parameter::Contrast, -1.0), Some(0.1));
        assert_eq!(session.set_parameter(Parameter::Contrast, f32::NAN), None);
        assert_eq!(session.parameters().contrast(), 0.1);
        assert_eq!(session.label(Parameter::Contrast), "Contrast: 0.10");
    }

    #[test]
    fn test_gamma_scenario() {
        let mut session = loaded_session();
        session.select_mode(Mode::Gamma).unwrap();
        session.set_parameter(Parameter::Gamma, 2.0);

        let frame = session.apply().unwrap();

        assert_eq!(frame.modified.samples(), &[0.0, 64.0, 255.0, 16.0]);
        assert_eq!(frame.original, sample());
        assert_frame_invariants(&frame);
    }

    #[test]
    fn test_contrast_scenario() {
        let mut session = loaded_session();
        session.select_mode(Mode::Contrast).unwrap();
        session.set_parameter(Parameter::Contrast, 2.0);

        let frame = session.apply().unwrap();
        assert_eq!(frame.modified.samples(), &[0.0, 255.0, 255.0, 127.5]);
    }

    #[test]
    fn test_brightness_scenario() {
        let mut session = loaded_session();
        session.select_mode(Mode::Brightness).unwrap();
        session.set_parameter(Parameter::Brightness, 0.75);

        let frame = session.apply().unwrap();
        assert_eq!(frame.modified.samples(), &[100.0, 228.0, 255.0, 164.0]);
    }

    #[test]
    fn test_identity_parameters() {
        let mut session = loaded_session();
        for mode in [Mode::Gamma, Mode::Contrast, Mode::Brightness] {
            session.select_mode(mode).unwrap();
            let frame = session.apply().unwrap();
            assert_eq!(frame.modified, frame.original, "mode {mode}");
        }
    }

    #[test]
    fn test_edits_are_not_cumulative() {
        let mut session = loaded_session();
        session.select_mode(Mode::Brightness).unwrap();
        session.set_parameter(Parameter::Brightness, 0.75);
        let first = session.apply().unwrap();
        let second = session.apply().unwrap();
        assert_eq!(first.modified, second.modified);

        // Gamma ignores the brightness edit and reads Original
        session.select_mode(Mode::Gamma).unwrap();
        let frame = session.apply().unwrap();
        assert_eq!(frame.modified, sample());
    }

    #[test]
    fn test_equalization_chains_on_modified() {
        let mut session = loaded_session();
        session.select_mode(Mode::Brightness).unwrap();
        session.set_parameter(Parameter::Brightness, 0.75);
        let brightened = session.apply().unwrap().modified;

        session.select_mode(Mode::HistogramEqualization).unwrap();
        let once = session.apply().unwrap();
        assert_eq!(once.modified, adjust::equalize(&brightened));
        assert_frame_invariants(&once);

        let twice = session.apply().unwrap();
        assert_frame_invariants(&twice);
        assert!(twice.modified.samples().iter().all(|v| v.fract() == 0.0));
    }

    #[test]
    fn test_apply_without_mode_is_noop() {
        let mut session = loaded_session();
        let frame = session.apply().unwrap();
        assert_eq!(frame.modified, frame.original);
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut session = loaded_session();
        session.select_mode(Mode::Gamma).unwrap();
        session.set_parameter(Parameter::Gamma, 3.0);
        session.apply().unwrap();

        let frame = session.reset().unwrap();

        assert_eq!(frame.modified, frame.original);
        assert_eq!(session.phase(), Phase::Loaded(Mode::None));
        assert_eq!(session.parameters(), &Parameters::default());
        assert_eq!(session.editable_parameter(), None);
        assert_frame_invariants(&frame);
    }

    #[test]
    fn test_reload_returns_to_no_mode() {
        let mut session = loaded_session();
        session.select_mode(Mode::Gamma).unwrap();

        let other = Image::from_gray_u8(1, 1, vec![7]).unwrap();
        let frame = session.load_image(other.clone());

        assert_eq!(session.phase(), Phase::Loaded(Mode::None));
        assert_eq!(frame.original, other);
        assert_eq!(frame.modified, other);
    }

    #[test]
    fn test_state_round_trip() {
        let mut session = loaded_session();
        session.select_mode(Mode::Brightness).unwrap();
        session.set_parameter(Parameter::Brightness, 0.9);
        session.apply().unwrap();

        let json = serde_json::to_string(session.state()).unwrap();
        let state: SessionState = serde_json::from_str(&json).unwrap();
        let restored = AdjustSession::from_state(AdjustConfig::default(), state).unwrap();

        assert_eq!(restored.state(), session.state());
    }

    #[test]
    fn test_from_state_rejects_mode_without_image() {
        let state = SessionState {
            mode: Mode::Gamma,
            ..SessionState::default()
        };
        assert!(AdjustSession::from_state(AdjustConfig::default(), state).is_err());
    }

    #[test]
    fn test_from_state_rejects_mismatched_buffers() {
        let buffers = Buffers::new(sample());
        let mut json: serde_json::Value = serde_json::to_value(&buffers).unwrap();
        json["modified"] = serde_json::to_value(Image::from_gray_u8(1, 1, vec![0]).unwrap()).unwrap();
        let buffers: Buffers = serde_json::from_value(json).unwrap();

        let state = SessionState {
            buffers: Some(buffers),
            ..SessionState::default()
        };
        assert!(AdjustSession::from_state(AdjustConfig::default(), state).is_err());
    }
}
