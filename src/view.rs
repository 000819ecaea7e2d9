//! Text rendering of the form
//!
//! Mirrors the on-screen layout: text area, character count, duration,
//! language dropdown, optional sliders, and the Play/Pause button.

use crate::form::{ParamKind, SpeechForm};
use unicode_width::UnicodeWidthChar;

/// Dropdown entry meaning "engine default language"
pub const LANGUAGE_PLACEHOLDER: &str = "Select Language";

/// Width of the slider track in cells
const TRACK_WIDTH: usize = 20;

/// Cut `text` to at most `width` display cells, marking the cut with an ellipsis
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        // Line breaks render as a visible marker
        let ch = if ch == '\n' { '⏎' } else { ch };
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            if width > 0 {
                // Make room for the ellipsis
                while used + 1 > width {
                    match out.pop() {
                        Some(c) => used -= c.width().unwrap_or(0),
                        None => break,
                    }
                }
                out.push('…');
            }
            return out;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Slider track with a knob at the value's position
pub fn render_track(kind: ParamKind, value: f32) -> String {
    let range = kind.range();
    let span = range.max - range.min;
    let t = if span > 0.0 {
        (range.clamp(value) - range.min) / span
    } else {
        0.0
    };
    let knob = (t * (TRACK_WIDTH - 1) as f32).round() as usize;
    (0..TRACK_WIDTH)
        .map(|i| if i == knob { '●' } else { '─' })
        .collect()
}

/// Dropdown label of the current selection
pub fn selected_language_label(form: &SpeechForm) -> &str {
    form.selected_language().unwrap_or(LANGUAGE_PLACEHOLDER)
}

/// Numbered dropdown contents, placeholder first
pub fn render_language_list(form: &SpeechForm) -> String {
    let mut lines = vec![format!("  0. {}", LANGUAGE_PLACEHOLDER)];
    lines.extend(
        form.catalog()
            .languages()
            .into_iter()
            .enumerate()
            .map(|(i, lang)| format!("{:>3}. {}", i + 1, lang)),
    );
    lines.join("\n")
}

/// Full form, one field per line
pub fn render(form: &SpeechForm, preview_width: usize) -> String {
    let text = form.text();
    let mut lines = Vec::new();

    let preview = if text.as_str().is_empty() {
        "(enter text)".to_string()
    } else {
        truncate_to_width(text.as_str(), preview_width)
    };
    lines.push(format!("Text: {}", preview));
    lines.push(format!("Character Count: {}", text.character_count()));
    lines.push(format!("Duration: {} seconds", text.estimated_duration_secs()));
    lines.push(format!(
        "Language: [{}] ({} available)",
        selected_language_label(form),
        form.catalog().len()
    ));

    if form.options().include_pitch_rate_volume {
        let params = form.parameters();
        for kind in ParamKind::ALL {
            lines.push(format!(
                "{:<8}{} {}",
                format!("{}:", kind.label()),
                params.display(kind),
                render_track(kind, params.get(kind))
            ));
        }
    }

    let button = form.playback_state().button_label();
    match form.backend_name() {
        Some(backend) => lines.push(format!("[ {} ]  ({})", button, backend)),
        None => lines.push(format!("[ {} ]  (speech unavailable)", button)),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 5), "hell…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char is two cells wide
        assert_eq!(truncate_to_width("世界世界", 5), "世界…");
    }

    #[test]
    fn test_truncate_newlines() {
        assert_eq!(truncate_to_width("a\nb", 10), "a⏎b");
    }

    #[test]
    fn test_track_positions() {
        let low = render_track(ParamKind::Pitch, 0.5);
        assert!(low.starts_with('●'));
        let high = render_track(ParamKind::Volume, 1.0);
        assert!(high.ends_with('●'));
        assert_eq!(high.chars().count(), TRACK_WIDTH);
    }
}
