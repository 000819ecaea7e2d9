//! Startup settings
//!
//! Command-line flags layered over the config file. The result decides
//! which form variant runs, which backend is tried, and the initial
//! language and slider values.

pub mod config;

use crate::form::{FormOptions, ParamKind, PlaybackParameters, VoicePolicy};
use crate::speech::BackendChoice;
use crate::{Result, SpeakpadError};
use config::Config;
use log::info;
use std::path::PathBuf;

/// Parsed command-line flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Log at debug level to speakpad.log
    pub debug: bool,
    /// Run the basic form (no sliders, voice list loaded once)
    pub basic: bool,
    /// Load the voice list once even in the full form
    pub once: bool,
    pub backend: Option<BackendChoice>,
    pub config_path: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments (without the program name)
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => parsed.debug = true,
                "--basic" => parsed.basic = true,
                "--once" => parsed.once = true,
                "--help" | "-h" => parsed.help = true,
                "--backend" => {
                    let value = args.next().ok_or_else(|| {
                        SpeakpadError::Config("--backend needs a value".to_string())
                    })?;
                    parsed.backend = Some(value.parse()?);
                }
                "--config" => {
                    let value = args.next().ok_or_else(|| {
                        SpeakpadError::Config("--config needs a path".to_string())
                    })?;
                    parsed.config_path = Some(PathBuf::from(value));
                }
                other => {
                    return Err(SpeakpadError::Config(format!(
                        "Unknown argument '{}'",
                        other
                    )))
                }
            }
        }

        Ok(parsed)
    }
}

/// Usage text for --help
pub const USAGE: &str = "\
Usage: speakpad [OPTIONS]

Options:
  -d, --debug              Log debug output to speakpad.log
      --basic              Text, language and play button only
      --once               Load the voice list once instead of following changes
      --backend <NAME>     auto, native or espeak
      --config <PATH>      Config file (default ~/.speakpad.cfg)
  -h, --help               Show this help";

/// Effective settings after applying flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub form: FormOptions,
    pub backend: BackendChoice,
    pub language: Option<String>,
    pub parameters: PlaybackParameters,
    pub preview_width: usize,
}

impl Settings {
    /// Combine config file values with command-line overrides
    pub fn resolve(config: &Config, args: &CliArgs) -> Result<Self> {
        let mut form = if args.basic || !config.sliders() {
            FormOptions::basic()
        } else {
            FormOptions::full()
        };
        // --basic implies the query-once catalog of the basic page
        form.voice_policy = if args.basic || args.once {
            VoicePolicy::Once
        } else {
            config.voice_policy()?
        };
        form.words_per_second = config.words_per_second();

        let mut parameters = PlaybackParameters::default();
        parameters.set(ParamKind::Pitch, config.pitch());
        parameters.set(ParamKind::Rate, config.rate());
        parameters.set(ParamKind::Volume, config.volume());

        let backend = match args.backend {
            Some(choice) => choice,
            None => config.backend()?,
        };

        let settings = Self {
            form,
            backend,
            language: config.language(),
            parameters,
            preview_width: config.preview_width(),
        };
        info!("Resolved settings: {:?}", settings);
        Ok(settings)
    }
}
