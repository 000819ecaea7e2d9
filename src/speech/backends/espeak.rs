//! espeak-ng subprocess backend
//!
//! Each utterance runs one `espeak-ng --stdin` process. Cancelling kills it;
//! natural completion is noticed in [`SpeechPlatform::tick`], which the event
//! loop calls between input events.
//!
//! On WSL with WSLg, audio goes through the PulseAudio server at
//! /mnt/wslg/PulseServer.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::platform::is_wsl;
use crate::speech::{
    scale_to_engine, PlatformEvent, SpeechPlatform, Subscribers, SubscriptionId, UtteranceId,
    UtteranceRequest, ValueRange, VoiceInfo, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE,
};
use crate::{Result, SpeakpadError};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::Sender;

/// espeak-ng speed in words per minute
const ESPEAK_SPEED: ValueRange = ValueRange::new(80.0, 175.0, 450.0);
/// espeak-ng pitch adjustment
const ESPEAK_PITCH: ValueRange = ValueRange::new(0.0, 50.0, 99.0);
/// espeak-ng amplitude
const ESPEAK_AMPLITUDE: ValueRange = ValueRange::new(0.0, 200.0, 200.0);

/// One row of `espeak-ng --voices`: priority, language, age/gender, name
static VOICE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\s+(\S+)\s+\S+\s+(\S+)").expect("voice line pattern is valid")
});

/// espeak-ng backend
pub struct EspeakPlatform {
    /// Currently running espeak-ng process and the utterance it speaks
    current_process: Option<(Child, UtteranceId)>,

    /// Id handed out by the last `speak`
    last_utterance: UtteranceId,

    /// Path to espeak-ng
    espeak_path: String,

    subscribers: Subscribers,
}

impl EspeakPlatform {
    /// Create a new espeak-ng platform
    ///
    /// Verifies espeak-ng is installed and, on WSL, that PulseAudio is reachable
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        Self::setup_pulseaudio()?;

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self::with_path(espeak_path))
    }

    fn with_path(espeak_path: String) -> Self {
        Self {
            current_process: None,
            last_utterance: 0,
            espeak_path,
            subscribers: Subscribers::new(),
        }
    }

    /// Point PULSE_SERVER at WSLg when running under WSL
    fn setup_pulseaudio() -> Result<()> {
        const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

        if std::env::var("PULSE_SERVER").is_ok() {
            debug!("PULSE_SERVER already set via environment");
            return Ok(());
        }

        if !is_wsl() {
            // Native hosts use the default sound server
            return Ok(());
        }

        if std::path::Path::new(WSLG_PULSE_PATH).exists() {
            info!("Auto-detected WSLG PulseAudio server at {}", WSLG_PULSE_PATH);
            std::env::set_var("PULSE_SERVER", WSLG_PULSE_PATH);
            return Ok(());
        }

        warn!("WSLG PulseAudio server not found at {}", WSLG_PULSE_PATH);
        Err(SpeakpadError::Speech(
            "PulseAudio server not found. Install WSLg or set PULSE_SERVER environment variable."
                .to_string(),
        ))
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        for path in ["espeak-ng", "/usr/bin/espeak-ng"] {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(SpeakpadError::Speech(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Parse the table printed by `espeak-ng --voices`
    fn parse_voices(listing: &str) -> Vec<VoiceInfo> {
        listing
            .lines()
            .skip(1) // header
            .filter_map(|line| {
                let caps = VOICE_LINE.captures(line)?;
                Some(VoiceInfo {
                    language: caps[1].to_string(),
                    name: caps[2].to_string(),
                })
            })
            .collect()
    }

    /// Build the espeak-ng argument list for a request
    fn build_args(request: &UtteranceRequest) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(lang) = request.language.as_deref().filter(|l| !l.is_empty()) {
            args.push("-v".to_string());
            args.push(lang.to_string());
        }
        if let Some(rate) = request.rate {
            let speed = scale_to_engine(rate, RATE_RANGE, ESPEAK_SPEED).round();
            args.push("-s".to_string());
            args.push(format!("{}", speed as u32));
        }
        if let Some(pitch) = request.pitch {
            let pitch = scale_to_engine(pitch, PITCH_RANGE, ESPEAK_PITCH).round();
            args.push("-p".to_string());
            args.push(format!("{}", pitch as u32));
        }
        if let Some(volume) = request.volume {
            let amplitude = scale_to_engine(volume, VOLUME_RANGE, ESPEAK_AMPLITUDE).round();
            args.push("-a".to_string());
            args.push(format!("{}", amplitude as u32));
        }
        args.push("--stdin".to_string());
        args
    }

    /// Kill any running espeak-ng process without reporting completion
    fn cancel_process(&mut self) {
        if let Some((mut child, id)) = self.current_process.take() {
            debug!("Killing espeak-ng process for utterance {}", id);
            match child.kill() {
                Ok(_) => {
                    let _ = child.wait(); // Clean up zombie
                }
                Err(e) => {
                    debug!("Failed to kill espeak-ng process: {}", e);
                }
            }
        }
    }
}

impl SpeechPlatform for EspeakPlatform {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>> {
        let output = Command::new(&self.espeak_path)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(SpeakpadError::Speech(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let voices = Self::parse_voices(&listing);
        debug!("espeak-ng reports {} voices", voices.len());
        Ok(voices)
    }

    fn subscribe(&mut self, sink: Sender<PlatformEvent>) -> Option<SubscriptionId> {
        Some(self.subscribers.add(sink))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.remove(id);
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId> {
        // New requests replace the current one
        self.cancel_process();

        self.last_utterance += 1;
        let id = self.last_utterance;

        if request.text.is_empty() {
            self.subscribers.notify(PlatformEvent::UtteranceEnded(id));
            return Ok(id);
        }

        let args = Self::build_args(request);
        debug!("Spawning espeak-ng {:?}", args);

        let mut child = Command::new(&self.espeak_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn espeak-ng: {}", e);
                SpeakpadError::Speech(format!("Failed to start espeak-ng: {}", e))
            })?;

        let stdin = child.stdin.take();
        self.current_process = Some((child, id));

        if let Some(mut stdin) = stdin {
            if let Err(e) = stdin.write_all(request.text.as_bytes()) {
                error!("Failed to feed text to espeak-ng: {}", e);
                drop(stdin);
                self.cancel_process();
                return Err(e.into());
            }
            // stdin drops here so espeak-ng sees EOF
        }

        Ok(id)
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.cancel_process();
        Ok(())
    }

    fn tick(&mut self) {
        let finished = match self.current_process.as_mut() {
            Some((child, id)) => match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("espeak-ng finished utterance {}: {}", id, status);
                    Some(*id)
                }
                Ok(None) => None,
                Err(e) => {
                    warn!("Failed to poll espeak-ng: {}", e);
                    Some(*id)
                }
            },
            None => None,
        };

        if let Some(id) = finished {
            self.current_process = None;
            self.subscribers.notify(PlatformEvent::UtteranceEnded(id));
        }
    }
}

impl Drop for EspeakPlatform {
    fn drop(&mut self) {
        debug!("Shutting down espeak-ng backend");
        self.cancel_process();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-gb           --/M      English_(Great_Britain) gmw/en            (en 2)
 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  hu              --/M      Hungarian          urj/hu
";

    #[test]
    fn test_parse_voices() {
        let voices = EspeakPlatform::parse_voices(LISTING);
        let langs: Vec<&str> = voices.iter().map(|v| v.language.as_str()).collect();
        assert_eq!(langs, vec!["af", "en-gb", "en-us", "hu"]);
        assert_eq!(voices[3].name, "Hungarian");
    }

    #[test]
    fn test_parse_voices_ignores_garbage() {
        assert!(EspeakPlatform::parse_voices("").is_empty());
        assert!(EspeakPlatform::parse_voices("header\nnot a voice line\n").is_empty());
    }

    #[test]
    fn test_default_request_args() {
        let request = UtteranceRequest {
            text: "hi".to_string(),
            ..Default::default()
        };
        assert_eq!(EspeakPlatform::build_args(&request), vec!["--stdin"]);
    }

    #[test]
    fn test_full_request_args() {
        let request = UtteranceRequest {
            text: "hi".to_string(),
            language: Some("hu".to_string()),
            voice: None,
            pitch: Some(1.0),
            rate: Some(2.0),
            volume: Some(0.5),
        };
        assert_eq!(
            EspeakPlatform::build_args(&request),
            vec!["-v", "hu", "-s", "450", "-p", "50", "-a", "100", "--stdin"]
        );
    }

    #[test]
    fn test_empty_text_ends_at_once() {
        let mut platform = EspeakPlatform::with_path("espeak-ng".to_string());
        let (tx, rx) = std::sync::mpsc::channel();
        platform.subscribe(tx);

        let first = platform.speak(&UtteranceRequest::default()).unwrap();
        let second = platform.speak(&UtteranceRequest::default()).unwrap();
        assert_ne!(first, second);
        assert_eq!(rx.try_recv(), Ok(PlatformEvent::UtteranceEnded(first)));
        assert_eq!(rx.try_recv(), Ok(PlatformEvent::UtteranceEnded(second)));
        assert!(platform.current_process.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_feed_leaves_no_process() {
        // `true` exits without reading stdin, so a write larger than the
        // pipe buffer always hits a closed pipe
        let Some(path) = ["/bin/true", "/usr/bin/true"]
            .into_iter()
            .find(|p| std::path::Path::new(p).exists())
        else {
            println!("⚠ Skipping: no `true` binary");
            return;
        };
        let mut platform = EspeakPlatform::with_path(path.to_string());
        let (tx, rx) = std::sync::mpsc::channel();
        platform.subscribe(tx);

        let request = UtteranceRequest {
            text: "x".repeat(1 << 20),
            ..Default::default()
        };
        assert!(platform.speak(&request).is_err());
        assert!(platform.current_process.is_none());

        platform.tick();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_create_espeak_platform() {
        match EspeakPlatform::new() {
            Ok(_) => println!("✓ espeak-ng backend available"),
            Err(e) => println!("⚠ espeak-ng backend not available: {}", e),
        }
    }
}
