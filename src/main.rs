//! speakpad main entry point
//!
//! The event loop waits on two sources:
//! 1. stdin lines (read on a helper thread) - parsed into form actions
//! 2. speech engine notifications - voice list changes, end of utterance
//!
//! All form state lives on the main thread.

use log::{debug, error, info, warn};
use speakpad::form::{ParamKind, SpeechForm, VoiceCatalog};
use speakpad::input::{apply, parse_line, HandlerAction};
use speakpad::speech::create_platform;
use speakpad::state::config::Config;
use speakpad::state::{CliArgs, Settings, USAGE};
use speakpad::view::render;
use speakpad::{Result, SpeakpadError};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// How long to wait for input before polling the engine
const TICK: Duration = Duration::from_millis(100);

fn main() {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return;
    }

    init_logging(args.debug);

    if let Err(e) = run(args) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to speakpad.log so the form stays readable
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("speakpad.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open speakpad.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "speakpad version {} starting (debug mode, logging to speakpad.log)",
            speakpad::VERSION
        );
    } else {
        // Normal mode: errors only, unless RUST_LOG says otherwise
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!("Configuration loaded from {:?}", config.path());

    let settings = Settings::resolve(&config, &args)?;

    // No engine is not fatal: the form runs with inert playback controls
    let platform = match create_platform(settings.backend) {
        Ok(platform) => Some(platform),
        Err(e) => {
            warn!("Speech unavailable: {}", e);
            eprintln!("Speech unavailable; playback is disabled.\n{}", e);
            None
        }
    };

    let (event_tx, event_rx) = mpsc::channel();
    let mut form = SpeechForm::new(settings.form, platform, event_tx);

    form.select_language(settings.language.clone());
    if settings.form.include_pitch_rate_volume {
        for kind in ParamKind::ALL {
            form.set_parameter(kind, settings.parameters.get(kind))?;
        }
    }

    let lines = spawn_stdin_reader();

    println!(
        "{} {} - type text to speak, :help for commands",
        speakpad::APP_NAME,
        speakpad::VERSION
    );
    redraw(&form, settings.preview_width)?;

    let mut seen = Snapshot::of(&form);

    loop {
        match lines.recv_timeout(TICK) {
            Ok(line) => {
                let outcome = parse_line(&line).and_then(|action| apply(&mut form, action));
                match outcome {
                    Ok(HandlerAction::Quit) => break,
                    Ok(HandlerAction::Print(message)) => {
                        println!("{}", message);
                        redraw(&form, settings.preview_width)?;
                    }
                    Ok(HandlerAction::Render) => redraw(&form, settings.preview_width)?,
                    Err(e @ SpeakpadError::InvalidCommand(_)) => {
                        println!("{}", e);
                        prompt()?;
                    }
                    Err(e) => {
                        error!("{}", e);
                        println!("Error: {}", e);
                        prompt()?;
                    }
                }
                seen = Snapshot::of(&form);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("stdin closed");
                break;
            }
        }

        form.tick();
        while let Ok(event) = event_rx.try_recv() {
            form.handle_platform_event(event);
        }

        // Redraw when the engine changed something behind the user's back
        let now = Snapshot::of(&form);
        if now != seen {
            debug!("Engine-driven change, redrawing");
            println!();
            redraw(&form, settings.preview_width)?;
            seen = now;
        }
    }

    form.pause()?;
    info!("speakpad exiting");
    Ok(())
}

/// Engine-visible parts of the form
#[derive(PartialEq)]
struct Snapshot {
    playing: bool,
    catalog: VoiceCatalog,
}

impl Snapshot {
    fn of(form: &SpeechForm) -> Self {
        Self {
            playing: form.playback_state() == speakpad::form::PlaybackState::Playing,
            catalog: form.catalog().clone(),
        }
    }
}

fn redraw(form: &SpeechForm, preview_width: usize) -> Result<()> {
    println!("{}", render(form, preview_width));
    prompt()
}

fn prompt() -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

/// Forward stdin lines to the event loop
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        debug!("stdin reader finished");
    });
    rx
}
