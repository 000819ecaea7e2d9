//! Turning input lines into form events

use super::keymap::{lookup, CommandKind, COMMAND_PREFIX, HELP};
use crate::form::{ParamKind, SpeechForm};
use crate::{Result, SpeakpadError};
use log::debug;

/// Language argument of `:lang`
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageArg {
    /// Back to "Select Language" (engine default)
    Placeholder,
    /// 1-based dropdown position
    Position(usize),
    /// Identifier typed directly
    Tag(String),
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetText(String),
    AppendText(String),
    ClearText,
    Play,
    Pause,
    Toggle,
    SelectLanguage(LanguageArg),
    ListLanguages,
    SetParameter(ParamKind, f32),
    NudgeParameter(ParamKind, i32),
    Show,
    Help,
    Quit,
}

/// What the event loop should do after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerAction {
    /// Redraw the form
    Render,
    /// Print a message, then redraw
    Print(String),
    /// Leave the event loop
    Quit,
}

/// Parse one line of input
///
/// An empty line just redraws the form.
pub fn parse_line(line: &str) -> Result<FormAction> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(command) = line.strip_prefix(COMMAND_PREFIX) else {
        if line.is_empty() {
            return Ok(FormAction::Show);
        }
        return Ok(FormAction::SetText(line.to_string()));
    };

    let command = command.trim_start();
    let (word, arg) = match command.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (command, ""),
    };

    let kind = lookup(word)
        .ok_or_else(|| SpeakpadError::InvalidCommand(format!("unknown command ':{}'", word)))?;
    debug!("Command {:?} arg {:?}", kind, arg);

    Ok(match kind {
        CommandKind::Play => FormAction::Play,
        CommandKind::Pause => FormAction::Pause,
        CommandKind::Toggle => FormAction::Toggle,
        // Keep the argument verbatim apart from the separating space
        CommandKind::Append => FormAction::AppendText(
            command[word.len()..]
                .strip_prefix(char::is_whitespace)
                .unwrap_or("")
                .to_string(),
        ),
        CommandKind::Clear => FormAction::ClearText,
        CommandKind::Language => FormAction::SelectLanguage(parse_language(arg)),
        CommandKind::Languages => FormAction::ListLanguages,
        CommandKind::Slider(param) => parse_slider(param, arg)?,
        CommandKind::Show => FormAction::Show,
        CommandKind::Help => FormAction::Help,
        CommandKind::Quit => FormAction::Quit,
    })
}

fn parse_language(arg: &str) -> LanguageArg {
    if arg.is_empty() {
        return LanguageArg::Placeholder;
    }
    match arg.parse::<usize>() {
        Ok(0) => LanguageArg::Placeholder,
        Ok(n) => LanguageArg::Position(n),
        Err(_) => LanguageArg::Tag(arg.to_string()),
    }
}

fn parse_slider(param: ParamKind, arg: &str) -> Result<FormAction> {
    match arg {
        "" => Err(SpeakpadError::InvalidCommand(format!(
            "{} needs a value, + or -",
            param
        ))),
        "+" => Ok(FormAction::NudgeParameter(param, 1)),
        "-" => Ok(FormAction::NudgeParameter(param, -1)),
        value => value
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| FormAction::SetParameter(param, v))
            .ok_or_else(|| {
                SpeakpadError::InvalidCommand(format!("'{}' is not a number", value))
            }),
    }
}

/// Apply an action to the form
pub fn apply(form: &mut SpeechForm, action: FormAction) -> Result<HandlerAction> {
    match action {
        FormAction::SetText(text) => form.set_text(&text),
        FormAction::AppendText(text) => form.append_text(&text),
        FormAction::ClearText => form.clear_text(),
        FormAction::Play => {
            form.play()?;
        }
        FormAction::Pause => {
            form.pause()?;
        }
        FormAction::Toggle => {
            form.toggle_playback()?;
        }
        FormAction::SelectLanguage(LanguageArg::Placeholder) => form.select_language(None),
        FormAction::SelectLanguage(LanguageArg::Position(n)) => form.select_position(n)?,
        FormAction::SelectLanguage(LanguageArg::Tag(tag)) => form.select_language(Some(tag)),
        FormAction::ListLanguages => {
            return Ok(HandlerAction::Print(crate::view::render_language_list(form)));
        }
        FormAction::SetParameter(kind, value) => {
            form.set_parameter(kind, value)?;
        }
        FormAction::NudgeParameter(kind, steps) => {
            form.nudge_parameter(kind, steps)?;
        }
        FormAction::Show => {}
        FormAction::Help => return Ok(HandlerAction::Print(HELP.to_string())),
        FormAction::Quit => return Ok(HandlerAction::Quit),
    }
    Ok(HandlerAction::Render)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            parse_line("hello world\n").unwrap(),
            FormAction::SetText("hello world".to_string())
        );
        assert_eq!(parse_line("").unwrap(), FormAction::Show);
    }

    #[test]
    fn test_append_keeps_spacing() {
        assert_eq!(
            parse_line(":append  two spaces").unwrap(),
            FormAction::AppendText(" two spaces".to_string())
        );
        assert_eq!(parse_line(":a").unwrap(), FormAction::AppendText(String::new()));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            parse_line(":dance"),
            Err(SpeakpadError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_language_args() {
        assert_eq!(parse_language(""), LanguageArg::Placeholder);
        assert_eq!(parse_language("0"), LanguageArg::Placeholder);
        assert_eq!(parse_language("3"), LanguageArg::Position(3));
        assert_eq!(parse_language("hu-HU"), LanguageArg::Tag("hu-HU".to_string()));
    }

    #[test]
    fn test_slider_args() {
        assert_eq!(
            parse_line(":pitch 1.7").unwrap(),
            FormAction::SetParameter(ParamKind::Pitch, 1.7)
        );
        assert_eq!(
            parse_line(":vol -").unwrap(),
            FormAction::NudgeParameter(ParamKind::Volume, -1)
        );
        assert!(parse_line(":rate").is_err());
        assert!(parse_line(":rate fast").is_err());
        assert!(parse_line(":rate inf").is_err());
    }
}
