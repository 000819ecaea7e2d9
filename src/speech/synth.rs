//! Speech engine abstraction
//!
//! The form never talks to a concrete engine. It holds an optional
//! `Box<dyn SpeechPlatform>`; `None` means the host has no speech capability
//! and every playback control is inert.

use super::events::{PlatformEvent, SubscriptionId, UtteranceId};
use crate::platform::{host_kind, HostKind};
use crate::{Result, SpeakpadError};
use log::info;
use std::str::FromStr;
use std::sync::mpsc::Sender;

/// One unit of text submitted for synthesis
///
/// `None` parameters leave the engine at its own default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UtteranceRequest {
    pub text: String,
    pub language: Option<String>,
    /// Name of a specific voice within `language`, when one was picked
    pub voice: Option<String>,
    pub pitch: Option<f32>,
    pub rate: Option<f32>,
    pub volume: Option<f32>,
}

/// A voice the engine can synthesize with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    /// Opaque language identifier, usually a locale tag such as `en-US`
    pub language: String,
}

/// Capability interface over the host speech engine
pub trait SpeechPlatform {
    /// Short backend name for logs and the status line
    fn name(&self) -> &str;

    /// Currently installed voices, in engine order
    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>>;

    /// Register for voice-list changes and end-of-utterance signals
    ///
    /// Returns `None` when the engine can't deliver notifications at all.
    fn subscribe(&mut self, sink: Sender<PlatformEvent>) -> Option<SubscriptionId>;

    /// Stop delivering events to a sink
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Speak a request, replacing whatever is being spoken
    ///
    /// The returned id is the one carried by the matching
    /// [`PlatformEvent::UtteranceEnded`].
    fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId>;

    /// Silence current speech
    fn cancel(&mut self) -> Result<()>;

    /// Called from the event loop between input events
    ///
    /// Engines without completion callbacks poll for it here.
    fn tick(&mut self) {}
}

/// Range of a playback parameter with its neutral point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub normal: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, normal: f32, max: f32) -> Self {
        Self { min, normal, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

pub const PITCH_RANGE: ValueRange = ValueRange::new(0.5, 1.0, 2.0);
pub const RATE_RANGE: ValueRange = ValueRange::new(0.5, 1.0, 2.0);
pub const VOLUME_RANGE: ValueRange = ValueRange::new(0.0, 1.0, 1.0);

/// Map a form value onto an engine's native scale
///
/// The two halves `[min, normal]` and `[normal, max]` are mapped linearly
/// and independently, so the neutral value always lands on the engine's
/// normal value.
pub fn scale_to_engine(value: f32, ours: ValueRange, engine: ValueRange) -> f32 {
    let value = ours.clamp(value);
    if value <= ours.normal {
        let span = ours.normal - ours.min;
        let t = if span > 0.0 { (value - ours.min) / span } else { 1.0 };
        engine.min + t * (engine.normal - engine.min)
    } else {
        let span = ours.max - ours.normal;
        let t = if span > 0.0 { (value - ours.normal) / span } else { 0.0 };
        engine.normal + t * (engine.max - engine.normal)
    }
}

/// Which backend to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Pick based on the host
    #[default]
    Auto,
    /// `tts` crate (Speech Dispatcher, AVFoundation, WinRT, ...)
    Native,
    /// espeak-ng subprocess
    Espeak,
}

impl FromStr for BackendChoice {
    type Err = SpeakpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(BackendChoice::Auto),
            "native" | "tts" => Ok(BackendChoice::Native),
            "espeak" | "espeak-ng" => Ok(BackendChoice::Espeak),
            other => Err(SpeakpadError::Config(format!(
                "Unknown speech backend '{}' (expected auto, native or espeak)",
                other
            ))),
        }
    }
}

/// Create a speech platform for this host
///
/// With [`BackendChoice::Auto`]:
///
/// **WSL:** espeak-ng first (usually routed through WSLg PulseAudio),
/// then the native backend.
///
/// **Native Linux, macOS, others:** native first, then espeak-ng.
///
/// An error means the host has no speech capability; callers treat that
/// as "playback controls are inert" rather than a fatal condition.
pub fn create_platform(choice: BackendChoice) -> Result<Box<dyn SpeechPlatform>> {
    use super::backends::espeak::EspeakPlatform;
    use super::backends::native::NativePlatform;

    match choice {
        BackendChoice::Native => return Ok(Box::new(NativePlatform::new()?)),
        BackendChoice::Espeak => return Ok(Box::new(EspeakPlatform::new()?)),
        BackendChoice::Auto => {}
    }

    let host = host_kind();
    info!("Selecting speech backend for {:?} host", host);

    let espeak_first = host == HostKind::Wsl;
    let order: [BackendChoice; 2] = if espeak_first {
        [BackendChoice::Espeak, BackendChoice::Native]
    } else {
        [BackendChoice::Native, BackendChoice::Espeak]
    };

    let mut failures = Vec::new();
    for backend in order {
        let attempt: Result<Box<dyn SpeechPlatform>> = match backend {
            BackendChoice::Espeak => {
                EspeakPlatform::new().map(|p| Box::new(p) as Box<dyn SpeechPlatform>)
            }
            _ => NativePlatform::new().map(|p| Box::new(p) as Box<dyn SpeechPlatform>),
        };
        match attempt {
            Ok(platform) => {
                info!("✓ Using {} speech backend", platform.name());
                return Ok(platform);
            }
            Err(e) => {
                info!("✗ {:?} backend unavailable: {}", backend, e);
                failures.push(format!("{:?}: {}", backend, e));
            }
        }
    }

    Err(SpeakpadError::Speech(format!(
        "No speech backend available. Tried:\n  {}",
        failures.join("\n  ")
    )))
}
