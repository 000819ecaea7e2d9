//! speakpad - terminal text-to-speech pad
//!
//! Type text, pick a language, optionally adjust pitch/rate/volume, and
//! play it back through the host's speech engine.

pub mod error;
pub mod form;
pub mod input;
pub mod platform;
pub mod speech;
pub mod state;
pub mod view;

pub use error::{Result, SpeakpadError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "speakpad";
