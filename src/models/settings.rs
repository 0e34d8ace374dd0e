use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_LABEL_LIKE: &str = "Helpful";
pub const DEFAULT_LABEL_BAD: &str = "Not helpful";
pub const DEFAULT_COOKIE_DAYS: u32 = 7;
/// Ten years. Keeps marker expiry well inside the representable date range.
pub const MAX_COOKIE_DAYS: u32 = 3650;
pub const DEFAULT_THANK_YOU_MESSAGE: &str = "Thank you for your feedback";

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VoteSettings {
    #[validate(length(min = 1, max = 100))]
    pub label_like: String,
    #[validate(length(min = 1, max = 100))]
    pub label_bad: String,
    #[validate(range(min = 1, max = 3650))]
    pub cookie_days: u32,
    /// Empty suppresses the acknowledgment after voting.
    #[validate(length(max = 500))]
    pub thank_you_message: String,
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            label_like: DEFAULT_LABEL_LIKE.to_string(),
            label_bad: DEFAULT_LABEL_BAD.to_string(),
            cookie_days: DEFAULT_COOKIE_DAYS,
            thank_you_message: DEFAULT_THANK_YOU_MESSAGE.to_string(),
        }
    }
}

/// Settings as submitted by an administrator. Missing fields fall back to
/// defaults, matching how a fresh settings form is saved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteSettingsInput {
    pub label_like: Option<String>,
    pub label_bad: Option<String>,
    pub cookie_days: Option<i64>,
    pub thank_you_message: Option<String>,
}

impl VoteSettingsInput {
    pub fn sanitize(self) -> VoteSettings {
        let defaults = VoteSettings::default();
        VoteSettings {
            label_like: self
                .label_like
                .map(|v| sanitize_text_field(&v))
                .unwrap_or(defaults.label_like),
            label_bad: self
                .label_bad
                .map(|v| sanitize_text_field(&v))
                .unwrap_or(defaults.label_bad),
            cookie_days: self
                .cookie_days
                .map(|days| days.clamp(1, MAX_COOKIE_DAYS as i64) as u32)
                .unwrap_or(defaults.cookie_days),
            thank_you_message: self
                .thank_you_message
                .map(|v| sanitize_textarea_field(&v))
                .unwrap_or(defaults.thank_you_message),
        }
    }
}

/// Strips markup and collapses all whitespace, including newlines.
pub fn sanitize_text_field(input: &str) -> String {
    let stripped = TAGS.replace_all(input, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Strips markup but keeps line breaks.
pub fn sanitize_textarea_field(input: &str) -> String {
    let stripped = TAGS.replace_all(input, "");
    stripped
        .replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = VoteSettingsInput::default().sanitize();
        assert_eq!(settings, VoteSettings::default());
        assert_eq!(settings.cookie_days, 7);
    }

    #[test]
    fn cookie_days_is_clamped_to_at_least_one() {
        let settings = VoteSettingsInput {
            cookie_days: Some(-3),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(settings.cookie_days, 1);
    }

    #[test]
    fn cookie_days_is_capped_at_ten_years() {
        let settings = VoteSettingsInput {
            cookie_days: Some(100_000_000),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(settings.cookie_days, MAX_COOKIE_DAYS);
        assert!(settings.validate().is_ok());

        let stored = VoteSettings {
            cookie_days: MAX_COOKIE_DAYS + 1,
            ..Default::default()
        };
        assert!(stored.validate().is_err());
    }

    #[test]
    fn labels_lose_markup_and_extra_whitespace() {
        assert_eq!(
            sanitize_text_field("  <b>Very</b>\n  useful "),
            "Very useful"
        );
    }

    #[test]
    fn message_keeps_line_breaks() {
        assert_eq!(
            sanitize_textarea_field("Thanks!\r\n<script>x</script>See you  "),
            "Thanks!\nxSee you"
        );
    }

    #[test]
    fn empty_message_is_allowed() {
        let settings = VoteSettingsInput {
            thank_you_message: Some(String::new()),
            ..Default::default()
        }
        .sanitize();
        assert!(settings.validate().is_ok());
        assert!(settings.thank_you_message.is_empty());
    }

    #[test]
    fn empty_label_fails_validation() {
        let settings = VoteSettingsInput {
            label_like: Some("<i></i>".into()),
            ..Default::default()
        }
        .sanitize();
        assert!(settings.validate().is_err());
    }
}
