//! The text-to-speech form
//!
//! One component covers both page variants: [`FormOptions::basic`] has no
//! sliders and loads the voice list once, [`FormOptions::full`] adds
//! pitch/rate/volume and follows voice-list changes.

pub mod catalog;
pub mod params;
pub mod playback;
pub mod text;

pub use catalog::{VoiceCatalog, VoicePolicy};
pub use params::{ParamKind, PlaybackParameters};
pub use playback::{PlaybackController, PlaybackState};
pub use text::{TextInput, DEFAULT_WORDS_PER_SECOND};

use crate::speech::{PlatformEvent, SpeechPlatform, SubscriptionId, UtteranceRequest};
use crate::{Result, SpeakpadError};
use log::{debug, info};
use std::sync::mpsc::Sender;

/// Configuration of a form instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    /// Show pitch/rate/volume sliders and send them with each utterance
    pub include_pitch_rate_volume: bool,
    pub voice_policy: VoicePolicy,
    pub words_per_second: usize,
}

impl FormOptions {
    /// Text, language and play button only
    pub fn basic() -> Self {
        Self {
            include_pitch_rate_volume: false,
            voice_policy: VoicePolicy::Once,
            words_per_second: DEFAULT_WORDS_PER_SECOND,
        }
    }

    /// Basic plus sliders and a live voice list
    pub fn full() -> Self {
        Self {
            include_pitch_rate_volume: true,
            voice_policy: VoicePolicy::Subscribe,
            words_per_second: DEFAULT_WORDS_PER_SECOND,
        }
    }
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Form state plus the engine it drives
///
/// All mutation happens through the event methods below, called from a
/// single event loop.
pub struct SpeechForm {
    options: FormOptions,
    text: TextInput,
    catalog: VoiceCatalog,
    /// `None` is the "Select Language" placeholder: engine default
    language: Option<String>,
    /// Specific voice, set only when picked by dropdown position
    voice: Option<String>,
    params: PlaybackParameters,
    playback: PlaybackController,

    /// `None` when the host has no speech capability
    platform: Option<Box<dyn SpeechPlatform>>,
    subscription: Option<SubscriptionId>,
}

impl SpeechForm {
    /// Build the form and load the voice catalog
    ///
    /// Engine notifications are delivered to `events`; feed them back
    /// through [`SpeechForm::handle_platform_event`].
    pub fn new(
        options: FormOptions,
        mut platform: Option<Box<dyn SpeechPlatform>>,
        events: Sender<PlatformEvent>,
    ) -> Self {
        let mut catalog = VoiceCatalog::new();
        let mut subscription = None;

        match platform.as_deref_mut() {
            Some(p) => {
                // Completion signals are needed under either voice policy
                subscription = p.subscribe(events);
                catalog.refresh(p);
                info!(
                    "Form ready on {} backend ({:?} voice policy)",
                    p.name(),
                    options.voice_policy
                );
            }
            None => info!("Form ready without speech capability; playback is inert"),
        }

        Self {
            options,
            text: TextInput::new(options.words_per_second),
            catalog,
            language: None,
            voice: None,
            params: PlaybackParameters::default(),
            playback: PlaybackController::new(),
            platform,
            subscription,
        }
    }

    // ========== Text ==========

    pub fn set_text(&mut self, text: &str) {
        self.text.set(text);
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.append(text);
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &TextInput {
        &self.text
    }

    // ========== Language ==========

    /// Select a language; `None` returns to the placeholder
    pub fn select_language(&mut self, language: Option<String>) {
        debug!("Language selected: {:?}", language);
        self.language = language.filter(|l| !l.is_empty());
        self.voice = None;
    }

    /// Select by dropdown position, 0 being the placeholder
    pub fn select_position(&mut self, position: usize) -> Result<()> {
        if position == 0 {
            self.select_language(None);
            return Ok(());
        }
        let voice = self.catalog.voice_at(position).cloned().ok_or_else(|| {
            SpeakpadError::InvalidCommand(format!(
                "no language at position {} ({} available)",
                position,
                self.catalog.len()
            ))
        })?;
        self.select_language(Some(voice.language));
        self.voice = Some(voice.name).filter(|n| !n.is_empty());
        Ok(())
    }

    pub fn selected_language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    // ========== Sliders ==========

    /// Set a slider; returns the stored value
    pub fn set_parameter(&mut self, kind: ParamKind, value: f32) -> Result<f32> {
        self.ensure_sliders()?;
        Ok(self.params.set(kind, value))
    }

    /// Move a slider by whole steps; returns the stored value
    pub fn nudge_parameter(&mut self, kind: ParamKind, steps: i32) -> Result<f32> {
        self.ensure_sliders()?;
        Ok(self.params.nudge(kind, steps))
    }

    pub fn parameters(&self) -> &PlaybackParameters {
        &self.params
    }

    fn ensure_sliders(&self) -> Result<()> {
        if self.options.include_pitch_rate_volume {
            Ok(())
        } else {
            Err(SpeakpadError::InvalidCommand(
                "pitch, rate and volume are not available in the basic form".to_string(),
            ))
        }
    }

    // ========== Playback ==========

    /// What would be submitted if Play were pressed now
    pub fn utterance_request(&self) -> UtteranceRequest {
        let sliders = self.options.include_pitch_rate_volume;
        UtteranceRequest {
            text: self.text.as_str().to_string(),
            language: self.language.clone(),
            voice: self.voice.clone(),
            pitch: sliders.then(|| self.params.pitch()),
            rate: sliders.then(|| self.params.rate()),
            volume: sliders.then(|| self.params.volume()),
        }
    }

    pub fn toggle_playback(&mut self) -> Result<PlaybackState> {
        let request = self.utterance_request();
        self.playback.toggle(self.platform.as_deref_mut(), request)
    }

    pub fn play(&mut self) -> Result<PlaybackState> {
        let request = self.utterance_request();
        self.playback.start(self.platform.as_deref_mut(), request)
    }

    pub fn pause(&mut self) -> Result<PlaybackState> {
        self.playback.stop(self.platform.as_deref_mut())
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    // ========== Engine ==========

    /// React to a notification from the engine
    pub fn handle_platform_event(&mut self, event: PlatformEvent) {
        debug!("Platform event: {:?}", event);
        match event {
            PlatformEvent::UtteranceEnded(id) => self.playback.utterance_ended(id),
            PlatformEvent::VoicesChanged => {
                if self.options.voice_policy != VoicePolicy::Subscribe {
                    return;
                }
                if let Some(p) = self.platform.as_deref_mut() {
                    self.catalog.refresh(p);
                }
            }
        }
    }

    /// Give the engine a chance to notice finished utterances
    pub fn tick(&mut self) {
        if let Some(p) = self.platform.as_deref_mut() {
            p.tick();
        }
    }

    pub fn has_speech(&self) -> bool {
        self.platform.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.platform.as_deref().map(|p| p.name())
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }
}

impl Drop for SpeechForm {
    fn drop(&mut self) {
        if let (Some(id), Some(p)) = (self.subscription.take(), self.platform.as_deref_mut()) {
            debug!("Unsubscribing {} from {}", id, p.name());
            p.unsubscribe(id);
        }
    }
}
