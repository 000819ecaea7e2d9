//! Native TTS backend using the tts crate
//!
//! The `tts` crate gives a unified interface to:
//! - Speech Dispatcher on Linux
//! - AVFoundation on macOS/iOS
//! - WinRT / SAPI on Windows
//!
//! Pitch, rate and volume ranges differ per engine, so form values are
//! rescaled against the engine's own min/normal/max on every utterance.
//!
//! Not every engine can report its current voice (Speech Dispatcher can't).
//! Going back to the default language there means reopening the engine.

use crate::speech::{
    scale_to_engine, PlatformEvent, SpeechPlatform, Subscribers, SubscriptionId, UtteranceId,
    UtteranceRequest, ValueRange, VoiceInfo, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE,
};
use crate::{Result, SpeakpadError};
use log::{debug, error, info, warn};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tts::{Tts as TtsCrate, UtteranceId as EngineUtteranceId, Voice};

/// Engine utterance ids still expected to finish, with our ids
type Pending = Vec<(EngineUtteranceId, UtteranceId)>;

/// How to get back to the engine's default voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceRestore {
    /// No voice was ever set; the engine is already on its default
    Nothing,
    /// Set the default voice captured at startup
    SetDefault,
    /// Default voice unknown: reopen the engine
    Reopen,
}

impl VoiceRestore {
    fn plan(has_default_voice: bool, voice_overridden: bool) -> Self {
        match (voice_overridden, has_default_voice) {
            (false, _) => VoiceRestore::Nothing,
            (true, true) => VoiceRestore::SetDefault,
            (true, false) => VoiceRestore::Reopen,
        }
    }
}

/// Native TTS backend using the tts crate
pub struct NativePlatform {
    tts: TtsCrate,

    /// Voice the engine started with, restored when no language is selected
    default_voice: Option<Voice>,

    /// Shared with the engine's completion callback
    subscribers: Arc<Mutex<Subscribers>>,
    pending: Arc<Mutex<Pending>>,

    /// Id handed out by the last `speak`
    last_utterance: UtteranceId,

    /// A language voice replaced the engine's default
    voice_overridden: bool,

    /// Whether the end-of-utterance callback has been installed
    callback_installed: bool,
}

impl NativePlatform {
    /// Create a new native TTS platform
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = Self::open_engine()?;

        let default_voice = if tts.supported_features().get_voice {
            tts.voice().unwrap_or_else(|e| {
                warn!("Could not read default voice: {}", e);
                None
            })
        } else {
            None
        };

        debug!("Native TTS backend created successfully");

        Ok(Self {
            tts,
            default_voice,
            subscribers: Arc::new(Mutex::new(Subscribers::new())),
            pending: Arc::new(Mutex::new(Vec::new())),
            last_utterance: 0,
            voice_overridden: false,
            callback_installed: false,
        })
    }

    fn open_engine() -> Result<TtsCrate> {
        TtsCrate::default()
            .map_err(|e| SpeakpadError::Speech(format!("Failed to initialize TTS: {}", e)))
    }

    /// Replace the engine with a fresh instance on its default voice
    fn reopen(&mut self) -> Result<()> {
        info!("Reopening TTS engine to restore the default voice");
        self.tts = Self::open_engine()?;
        self.callback_installed = false;
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
        let has_subscribers = self
            .subscribers
            .lock()
            .map(|subs| !subs.is_empty())
            .unwrap_or(false);
        if has_subscribers {
            self.install_end_callback();
        }
        Ok(())
    }

    fn install_end_callback(&mut self) {
        if self.callback_installed {
            return;
        }
        if !self.tts.supported_features().utterance_callbacks {
            warn!("Utterance callbacks not supported; playback state won't reset on its own");
            return;
        }

        let subscribers = Arc::clone(&self.subscribers);
        let pending = Arc::clone(&self.pending);
        let result = self.tts.on_utterance_end(Some(Box::new(
            move |engine_id: EngineUtteranceId| {
                let ours = pending.lock().ok().and_then(|mut pending| {
                    let index = pending.iter().position(|(e, _)| *e == engine_id)?;
                    Some(pending.remove(index).1)
                });
                match ours {
                    Some(id) => {
                        if let Ok(mut subs) = subscribers.lock() {
                            subs.notify(PlatformEvent::UtteranceEnded(id));
                        }
                    }
                    None => debug!("End of superseded utterance {:?}", engine_id),
                }
            },
        )));

        match result {
            Ok(()) => self.callback_installed = true,
            Err(e) => warn!("Failed to install utterance callback: {}", e),
        }
    }

    fn apply_voice(&mut self, request: &UtteranceRequest) -> Result<()> {
        if !self.tts.supported_features().voice {
            if request.language.is_some() {
                warn!("Voice selection not supported on this platform");
            }
            return Ok(());
        }

        let Some(tag) = request.language.as_deref() else {
            return self.restore_default_voice();
        };

        let voices = self
            .tts
            .voices()
            .map_err(|e| SpeakpadError::Speech(format!("Failed to get voices: {}", e)))?;
        let in_language = |v: &Voice| v.language().to_string().eq_ignore_ascii_case(tag);
        // A voice picked by name wins over the first voice of its language
        let found = request
            .voice
            .as_deref()
            .and_then(|name| {
                voices
                    .iter()
                    .find(|v| in_language(*v) && v.name() == name)
                    .cloned()
            })
            .or_else(|| voices.iter().find(|v| in_language(*v)).cloned());

        match found {
            Some(voice) => {
                debug!("Selecting voice: {} ({})", voice.name(), voice.language());
                self.tts
                    .set_voice(&voice)
                    .map_err(|e| SpeakpadError::Speech(format!("Failed to set voice: {}", e)))?;
                self.voice_overridden = true;
            }
            None => warn!("No voice for language '{}', using current voice", tag),
        }

        Ok(())
    }

    fn restore_default_voice(&mut self) -> Result<()> {
        match VoiceRestore::plan(self.default_voice.is_some(), self.voice_overridden) {
            VoiceRestore::Nothing => return Ok(()),
            VoiceRestore::SetDefault => {
                if let Some(voice) = self.default_voice.clone() {
                    debug!("Restoring default voice: {}", voice.name());
                    self.tts.set_voice(&voice).map_err(|e| {
                        SpeakpadError::Speech(format!("Failed to set voice: {}", e))
                    })?;
                }
            }
            VoiceRestore::Reopen => self.reopen()?,
        }
        self.voice_overridden = false;
        Ok(())
    }

    fn apply_parameters(&mut self, request: &UtteranceRequest) -> Result<()> {
        let features = self.tts.supported_features();

        if features.rate {
            let engine = ValueRange::new(
                self.tts.min_rate(),
                self.tts.normal_rate(),
                self.tts.max_rate(),
            );
            let rate = request
                .rate
                .map_or(engine.normal, |r| scale_to_engine(r, RATE_RANGE, engine));
            self.tts
                .set_rate(rate)
                .map_err(|e| SpeakpadError::Speech(format!("Failed to set rate: {}", e)))?;
        } else if request.rate.is_some() {
            warn!("Rate control not supported on this platform");
        }

        if features.pitch {
            let engine = ValueRange::new(
                self.tts.min_pitch(),
                self.tts.normal_pitch(),
                self.tts.max_pitch(),
            );
            let pitch = request
                .pitch
                .map_or(engine.normal, |p| scale_to_engine(p, PITCH_RANGE, engine));
            self.tts
                .set_pitch(pitch)
                .map_err(|e| SpeakpadError::Speech(format!("Failed to set pitch: {}", e)))?;
        } else if request.pitch.is_some() {
            warn!("Pitch control not supported on this platform");
        }

        if features.volume {
            // Volume is linear over the whole engine range
            let engine = ValueRange::new(
                self.tts.min_volume(),
                self.tts.max_volume(),
                self.tts.max_volume(),
            );
            let volume = request.volume.map_or(self.tts.normal_volume(), |v| {
                scale_to_engine(v, VOLUME_RANGE, engine)
            });
            self.tts
                .set_volume(volume)
                .map_err(|e| SpeakpadError::Speech(format!("Failed to set volume: {}", e)))?;
        } else if request.volume.is_some() {
            warn!("Volume control not supported on this platform");
        }

        Ok(())
    }
}

impl SpeechPlatform for NativePlatform {
    fn name(&self) -> &str {
        "native"
    }

    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>> {
        if !self.tts.supported_features().voice {
            return Ok(Vec::new());
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| SpeakpadError::Speech(format!("Failed to get voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| VoiceInfo {
                name: v.name(),
                language: v.language().to_string(),
            })
            .collect())
    }

    fn subscribe(&mut self, sink: Sender<PlatformEvent>) -> Option<SubscriptionId> {
        self.install_end_callback();
        // The tts crate has no voices-changed notification; only completion
        // events are delivered through this subscription.
        let mut subs = self.subscribers.lock().ok()?;
        Some(subs.add(sink))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.remove(id);
        }
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId> {
        self.apply_voice(request)?;
        self.apply_parameters(request)?;

        self.last_utterance += 1;
        let id = self.last_utterance;

        debug!("Speaking {} chars as utterance {}", request.text.chars().count(), id);
        let engine_id = self.tts.speak(request.text.as_str(), true).map_err(|e| {
            error!("Failed to speak: {}", e);
            SpeakpadError::Speech(format!("Speak failed: {}", e))
        })?;

        // Interrupting drops whatever was still pending
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
            if let Some(engine_id) = engine_id {
                pending.push((engine_id, id));
            }
        }

        Ok(id)
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        if !self.tts.supported_features().stop {
            warn!("Stopping speech not supported on this platform");
            return Ok(());
        }
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            SpeakpadError::Speech(format!("Cancel failed: {}", e))
        })?;
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_platform() {
        // May fail without speech-dispatcher (Linux) or in CI without audio
        match NativePlatform::new() {
            Ok(p) => println!("✓ Native TTS backend initialized: {}", p.name()),
            Err(e) => println!("⚠ TTS initialization failed (may be expected in CI): {}", e),
        }
    }

    #[test]
    fn test_voice_restore_plan() {
        assert_eq!(VoiceRestore::plan(true, false), VoiceRestore::Nothing);
        assert_eq!(VoiceRestore::plan(false, false), VoiceRestore::Nothing);
        assert_eq!(VoiceRestore::plan(true, true), VoiceRestore::SetDefault);
        // Speech Dispatcher: no readable default voice
        assert_eq!(VoiceRestore::plan(false, true), VoiceRestore::Reopen);
    }

    #[test]
    fn test_placeholder_after_language_resets_override() {
        let Ok(mut platform) = NativePlatform::new() else {
            println!("⚠ TTS not available, skipping");
            return;
        };
        platform.voice_overridden = true;
        let request = UtteranceRequest::default();
        match platform.apply_voice(&request) {
            Ok(()) => {
                if platform.tts.supported_features().voice {
                    assert!(!platform.voice_overridden);
                }
            }
            Err(e) => println!("⚠ Could not restore default voice: {}", e),
        }
    }

    #[test]
    fn test_list_voices_have_languages() {
        if let Ok(mut platform) = NativePlatform::new() {
            if let Ok(voices) = platform.list_voices() {
                for voice in voices {
                    assert!(!voice.name.is_empty() || !voice.language.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        if let Ok(mut platform) = NativePlatform::new() {
            let (tx, _rx) = std::sync::mpsc::channel();
            if let Some(id) = platform.subscribe(tx) {
                platform.unsubscribe(id);
                assert!(platform.subscribers.lock().unwrap().is_empty());
            }
        }
    }
}
