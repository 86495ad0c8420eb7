//! Inline keyboards and callback token parsing.
//!
//! Conversation state is carried entirely in callback tokens - there is no
//! server-side session. A button press hands the token back verbatim, and
//! [`CallbackToken::decode`] reconstructs the selection on the next event.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Selection carried by a keyboard button callback.
///
/// Wire format: `subject_<name>` for the subject step, `debt_<subject>_<theme>`
/// for the theme step. Theme tokens are split on `_` into exactly three parts,
/// so a theme containing `_` does not round-trip - it decodes to `Invalid`.
/// That mirrors the upstream sheet conventions (topic names use spaces) and is
/// a known limitation, not something decode tries to repair.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackToken {
    Subject(String),
    Theme { subject: String, theme: String },
    Invalid,
}

impl CallbackToken {
    /// Encode selection as callback data string
    pub fn encode(&self) -> String {
        match self {
            Self::Subject(name) => format!("subject_{}", name),
            Self::Theme { subject, theme } => format!("debt_{}_{}", subject, theme),
            Self::Invalid => String::new(),
        }
    }

    /// Decode callback data string to a selection
    ///
    /// Never fails: anything unrecognized decodes to `Invalid` so the
    /// controller can answer the callback harmlessly.
    pub fn decode(data: &str) -> Self {
        if let Some(name) = data.strip_prefix("subject_") {
            if name.is_empty() {
                return Self::Invalid;
            }
            return Self::Subject(name.to_string());
        }

        let parts: Vec<&str> = data.split('_').collect();
        if parts.len() == 3 && parts[0] == "debt" && !parts[1].is_empty() && !parts[2].is_empty() {
            return Self::Theme {
                subject: parts[1].to_string(),
                theme: parts[2].to_string(),
            };
        }

        Self::Invalid
    }
}

/// Emoji shown next to a subject button label
fn subject_emoji(subject: &str) -> &'static str {
    match subject {
        "Coding" => "💻",
        "Math" => "📐",
        "English" => "📚",
        _ => "📘",
    }
}

/// Build the subject-selection keyboard, one button per subject
pub fn subjects_keyboard(subjects: &[&str]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = subjects
        .iter()
        .map(|subject| {
            vec![InlineKeyboardButton::callback(
                format!("{} {}", subject_emoji(subject), subject),
                CallbackToken::Subject(subject.to_string()).encode(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}

/// Build the theme-selection keyboard, one button per debt theme
pub fn themes_keyboard(subject: &str, themes: &[String]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = themes
        .iter()
        .map(|theme| {
            vec![InlineKeyboardButton::callback(
                theme.clone(),
                CallbackToken::Theme {
                    subject: subject.to_string(),
                    theme: theme.clone(),
                }
                .encode(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_token_round_trip() {
        let token = CallbackToken::Subject("Math".to_string());
        assert_eq!(CallbackToken::decode(&token.encode()), token);
    }

    #[test]
    fn test_theme_token_round_trip() {
        let token = CallbackToken::Theme {
            subject: "Math".to_string(),
            theme: "Algebra".to_string(),
        };
        let encoded = token.encode();
        assert_eq!(encoded, "debt_Math_Algebra");
        assert_eq!(CallbackToken::decode(&encoded), token);
    }

    #[test]
    fn test_theme_with_delimiter_is_invalid() {
        // Documented limitation: themes containing '_' corrupt the token.
        let token = CallbackToken::Theme {
            subject: "Math".to_string(),
            theme: "Linear_equations".to_string(),
        };
        assert_eq!(CallbackToken::decode(&token.encode()), CallbackToken::Invalid);
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        for data in ["", "debt_", "debt_Math", "debt_Math_", "debt__Algebra", "subject_", "garbage"] {
            assert_eq!(CallbackToken::decode(data), CallbackToken::Invalid, "data: {:?}", data);
        }
    }

    #[test]
    fn test_subjects_keyboard_one_button_per_subject() {
        let markup = subjects_keyboard(&["Coding", "Math", "English"]);
        assert_eq!(markup.inline_keyboard.len(), 3);
    }

    #[test]
    fn test_themes_keyboard_tokens() {
        use teloxide::types::InlineKeyboardButtonKind;

        let themes = vec!["Algebra".to_string(), "Geometry".to_string()];
        let markup = themes_keyboard("Math", &themes);
        assert_eq!(markup.inline_keyboard.len(), 2);

        match &markup.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, "debt_Math_Algebra");
            }
            other => panic!("unexpected button kind: {:?}", other),
        }
    }
}
