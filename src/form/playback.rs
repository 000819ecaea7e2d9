//! Play/Pause state machine
//!
//! Idle --play--> Playing --pause or end of utterance--> Idle
//!
//! There is no queue: starting a new utterance replaces the old one inside
//! the engine. Without an engine every transition is a no-op. An end signal
//! only counts for the utterance that is currently playing.

use crate::speech::{SpeechPlatform, UtteranceId, UtteranceRequest};
use crate::Result;
use log::{debug, info};

/// Whether an utterance is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

impl PlaybackState {
    /// Label of the toggle button in this state
    pub fn button_label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "Play",
            PlaybackState::Playing => "Pause",
        }
    }
}

/// Drives the engine's speak/cancel from user input
#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    current: Option<UtteranceId>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Play when idle, pause when playing
    pub fn toggle<'p>(
        &mut self,
        platform: Option<&mut (dyn SpeechPlatform + 'p)>,
        request: UtteranceRequest,
    ) -> Result<PlaybackState> {
        match self.state {
            PlaybackState::Idle => self.start(platform, request),
            PlaybackState::Playing => self.stop(platform),
        }
    }

    /// Submit an utterance and enter Playing
    ///
    /// Already playing: nothing happens.
    pub fn start<'p>(
        &mut self,
        platform: Option<&mut (dyn SpeechPlatform + 'p)>,
        request: UtteranceRequest,
    ) -> Result<PlaybackState> {
        let Some(platform) = platform else {
            debug!("No speech capability; play ignored");
            return Ok(self.state);
        };
        if self.is_playing() {
            return Ok(self.state);
        }

        info!(
            "Speaking {} chars (lang {:?}) via {}",
            request.text.chars().count(),
            request.language,
            platform.name()
        );
        let id = platform.speak(&request)?;
        self.current = Some(id);
        self.state = PlaybackState::Playing;
        Ok(self.state)
    }

    /// Cancel speech and enter Idle
    ///
    /// Already idle: nothing happens.
    pub fn stop<'p>(
        &mut self,
        platform: Option<&mut (dyn SpeechPlatform + 'p)>,
    ) -> Result<PlaybackState> {
        let Some(platform) = platform else {
            debug!("No speech capability; pause ignored");
            return Ok(self.state);
        };
        if !self.is_playing() {
            return Ok(self.state);
        }

        platform.cancel()?;
        self.current = None;
        self.state = PlaybackState::Idle;
        info!("Playback cancelled");
        Ok(self.state)
    }

    /// The engine finished speaking utterance `id` on its own
    pub fn utterance_ended(&mut self, id: UtteranceId) {
        if self.is_playing() && self.current == Some(id) {
            debug!("Utterance {} ended", id);
            self.current = None;
            self.state = PlaybackState::Idle;
        } else {
            debug!("Ignoring end of utterance {} (current {:?})", id, self.current);
        }
    }
}
