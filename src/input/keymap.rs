//! Command names understood at the prompt

use crate::form::ParamKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Lines starting with this are commands; anything else is text
pub const COMMAND_PREFIX: char = ':';

/// Action identifier for a command word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    // Playback
    Play,
    Pause,
    Toggle,

    // Text
    Append,
    Clear,

    // Language
    Language,
    Languages,

    // Sliders
    Slider(ParamKind),

    // Screen
    Show,
    Help,
    Quit,
}

/// Command words, including short aliases
pub static COMMANDS: Lazy<HashMap<&'static str, CommandKind>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert("play", CommandKind::Play);
    map.insert("pause", CommandKind::Pause);
    map.insert("stop", CommandKind::Pause);
    map.insert("toggle", CommandKind::Toggle);
    map.insert("p", CommandKind::Toggle);

    map.insert("append", CommandKind::Append);
    map.insert("a", CommandKind::Append);
    map.insert("clear", CommandKind::Clear);

    map.insert("lang", CommandKind::Language);
    map.insert("language", CommandKind::Language);
    map.insert("langs", CommandKind::Languages);
    map.insert("languages", CommandKind::Languages);

    map.insert("pitch", CommandKind::Slider(ParamKind::Pitch));
    map.insert("rate", CommandKind::Slider(ParamKind::Rate));
    map.insert("volume", CommandKind::Slider(ParamKind::Volume));
    map.insert("vol", CommandKind::Slider(ParamKind::Volume));

    map.insert("show", CommandKind::Show);
    map.insert("help", CommandKind::Help);
    map.insert("h", CommandKind::Help);
    map.insert("?", CommandKind::Help);
    map.insert("quit", CommandKind::Quit);
    map.insert("q", CommandKind::Quit);
    map.insert("exit", CommandKind::Quit);

    map
});

/// Help text shown by `:help`
pub const HELP: &str = "\
Type any line to replace the text. Commands:
  :play  :pause  :toggle (:p)    start or stop speaking
  :append <text> (:a)            add to the text
  :clear                         empty the text
  :langs                         list available languages
  :lang <n|tag>                  choose a language (:lang alone = default)
  :pitch|:rate|:volume <v|+|->   adjust a slider
  :show  :help  :quit";

/// Look up a command word, case-insensitively
pub fn lookup(word: &str) -> Option<CommandKind> {
    COMMANDS.get(word.to_ascii_lowercase().as_str()).copied()
}
