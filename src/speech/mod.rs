//! Speech synthesis system

pub mod backends;
pub mod events;
pub mod synth;

pub use events::{PlatformEvent, Subscribers, SubscriptionId, UtteranceId};
pub use synth::{
    create_platform, scale_to_engine, BackendChoice, SpeechPlatform, UtteranceRequest,
    ValueRange, VoiceInfo, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE,
};
