use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A named event source and the callers allowed to fire it.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookDefinition {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<KeyMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyMapping {
    pub key: String,
    pub telegram: Destination,
}

/// Where a composed message ends up: a bot credential plus the chat to post in.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Destination {
    pub bot_token: String,
    #[serde(deserialize_with = "chat_id_from_string_or_int")]
    pub chat_id: String,
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

// Telegram chat ids are usually written as bare (often negative) integers.
// Goes through `Value` rather than an untagged enum so number digits survive
// `arbitrary_precision` untouched.
fn chat_id_from_string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "chat_id must be a string or an integer, got {other}"
        ))),
    }
}

/// Query parameters accepted by the trigger route.
#[derive(Debug, Clone, Default)]
pub struct TriggerParams {
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub value3: Option<String>,
}

impl TriggerParams {
    /// Collect from decoded query pairs. A repeated name keeps its last value;
    /// unknown names are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "value1" => &mut params.value1,
                "value2" => &mut params.value2,
                "value3" => &mut params.value3,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

/// One inbound trigger request, never persisted.
#[derive(Debug, Clone)]
pub struct IncomingTrigger {
    pub webhook_name: String,
    pub webhook_key: String,
    pub params: TriggerParams,
    /// Raw request body, only kept when the request declared a JSON content type.
    pub body: Option<Vec<u8>>,
}

/// How the chat service should interpret markup in the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    #[default]
    Plain,
    MarkdownV2,
    Html,
    Markdown,
}

impl FormatHint {
    /// Map the `value3` token to a hint. Unknown tokens fall back to plain text.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("MarkdownV2") => FormatHint::MarkdownV2,
            Some("HTML") => FormatHint::Html,
            Some("Markdown") => FormatHint::Markdown,
            _ => FormatHint::Plain,
        }
    }

    /// Value for the Bot API `parse_mode` field.
    pub fn parse_mode(self) -> Option<&'static str> {
        match self {
            FormatHint::Plain => None,
            FormatHint::MarkdownV2 => Some("MarkdownV2"),
            FormatHint::Html => Some("HTML"),
            FormatHint::Markdown => Some("Markdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_hint_recognises_exact_tokens() {
        assert_eq!(FormatHint::from_token(Some("HTML")), FormatHint::Html);
        assert_eq!(FormatHint::from_token(Some("MarkdownV2")), FormatHint::MarkdownV2);
        assert_eq!(FormatHint::from_token(Some("Markdown")), FormatHint::Markdown);
    }

    #[test]
    fn format_hint_falls_back_to_plain() {
        assert_eq!(FormatHint::from_token(None), FormatHint::Plain);
        assert_eq!(FormatHint::from_token(Some("")), FormatHint::Plain);
        assert_eq!(FormatHint::from_token(Some("garbage")), FormatHint::Plain);
        // Tokens are case-sensitive.
        assert_eq!(FormatHint::from_token(Some("html")), FormatHint::Plain);
        assert_eq!(FormatHint::Plain.parse_mode(), None);
    }

    #[test]
    fn chat_id_accepts_integers() {
        let dest: Destination =
            serde_json::from_str(r#"{"bot_token":"t","chat_id":-100123}"#).unwrap();
        assert_eq!(dest.chat_id, "-100123");

        let dest: Destination =
            serde_json::from_str(r#"{"bot_token":"t","chat_id":"@channel"}"#).unwrap();
        assert_eq!(dest.chat_id, "@channel");
    }

    #[test]
    fn chat_id_rejects_other_types() {
        for raw in [
            r#"{"bot_token":"t","chat_id":1.5}"#,
            r#"{"bot_token":"t","chat_id":null}"#,
            r#"{"bot_token":"t","chat_id":[1]}"#,
        ] {
            assert!(serde_json::from_str::<Destination>(raw).is_err(), "{raw} should fail");
        }
    }

    #[test]
    fn query_pairs_keep_last_value() {
        let pairs = [
            ("value1", "A"),
            ("other", "ignored"),
            ("value1", "B"),
            ("value3", "HTML"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));

        let params = TriggerParams::from_pairs(pairs);
        assert_eq!(params.value1.as_deref(), Some("B"));
        assert_eq!(params.value2, None);
        assert_eq!(params.value3.as_deref(), Some("HTML"));
    }

    #[test]
    fn destination_debug_hides_token() {
        let dest = Destination {
            bot_token: "123:secret".into(),
            chat_id: "42".into(),
        };
        let rendered = format!("{dest:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("42"));
    }
}
