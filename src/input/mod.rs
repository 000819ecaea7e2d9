//! Input handling
//!
//! Lines read from the terminal are parsed into [`FormAction`]s and applied
//! to the form. Plain lines replace the text; `:`-prefixed lines are
//! commands looked up in the keymap.

pub mod handler;
pub mod keymap;

pub use handler::{apply, parse_line, FormAction, HandlerAction, LanguageArg};
pub use keymap::{lookup, CommandKind, COMMANDS, HELP};
