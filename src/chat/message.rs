//! Chat message extraction
//!
//! Submissions are expected to look like `{"name":"Ann","message":"hi"}`,
//! but nothing is validated. Each field is located by scanning for its key,
//! the next `:`, and the next pair of double quotes. Escaped quotes, nested
//! objects and non-string values are not understood; producers rely on this
//! exact behavior, so it is kept as is.

/// Sender name used when the body carries none
pub const DEFAULT_NAME: &str = "Anon";

/// A single chat submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender name
    pub name: String,
    /// Message text
    pub message: String,
}

impl ChatMessage {
    /// Create a message from its parts
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Extract name and message from a submission body
    ///
    /// The body counts as structured only if it starts with `{` once
    /// trimmed. Fields are extracted independently; a missing `name` falls
    /// back to [`DEFAULT_NAME`] and a missing `message` to the whole raw
    /// body.
    pub fn parse(body: &str) -> Self {
        let trimmed = body.trim();

        let (name, message) = if trimmed.starts_with('{') {
            (
                extract_field(trimmed, "name"),
                extract_field(trimmed, "message"),
            )
        } else {
            (None, None)
        };

        Self {
            name: name.unwrap_or(DEFAULT_NAME).to_string(),
            message: message.unwrap_or(body).to_string(),
        }
    }

    /// The line to broadcast: `<name>: <message>`
    pub fn line(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Find the string value following the first occurrence of `key`
///
/// Prefers the quoted key (`"name"`) and falls back to the bare word.
fn extract_field<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let quoted = format!("\"{key}\"");
    let key_at = body.find(&quoted).or_else(|| body.find(key))?;

    let colon = key_at + body[key_at..].find(':')?;
    let open = colon + body[colon..].find('"')?;
    let start = open + 1;
    let len = body[start..].find('"')?;

    Some(&body[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        let msg = ChatMessage::parse(r#"{"name":"Ann","message":"hi"}"#);
        assert_eq!(msg, ChatMessage::new("Ann", "hi"));
        assert_eq!(msg.line(), "Ann: hi");
    }

    #[test]
    fn test_not_structured() {
        let msg = ChatMessage::parse("not json at all");
        assert_eq!(msg.line(), "Anon: not json at all");
    }

    #[test]
    fn test_missing_name() {
        let msg = ChatMessage::parse(r#"{"message":"only msg"}"#);
        assert_eq!(msg.line(), "Anon: only msg");
    }

    #[test]
    fn test_missing_message_uses_raw_body() {
        let body = r#"  {"name":"Bob"}  "#;
        let msg = ChatMessage::parse(body);
        assert_eq!(msg.name, "Bob");
        // Untrimmed, exactly as submitted
        assert_eq!(msg.message, body);
    }

    #[test]
    fn test_whitespace_around_body() {
        let msg = ChatMessage::parse("\n  { \"name\" : \"Ann\" , \"message\" : \"hey there\" }\n");
        assert_eq!(msg.line(), "Ann: hey there");
    }

    #[test]
    fn test_key_order_irrelevant() {
        let msg = ChatMessage::parse(r#"{"message":"yo","name":"Cy"}"#);
        assert_eq!(msg.line(), "Cy: yo");
    }

    #[test]
    fn test_unquoted_keys() {
        let msg = ChatMessage::parse(r#"{name: "Ann", message: "hi"}"#);
        assert_eq!(msg.line(), "Ann: hi");
    }

    #[test]
    fn test_empty_values() {
        let msg = ChatMessage::parse(r#"{"name":"","message":""}"#);
        assert_eq!(msg.line(), ": ");
    }

    #[test]
    fn test_non_string_value_falls_through() {
        // The scan skips the number and picks up the next quoted text
        let msg = ChatMessage::parse(r#"{"name":42,"message":"hi"}"#);
        assert_eq!(msg.name, "message");
        assert_eq!(msg.message, "hi");
    }

    #[test]
    fn test_escaped_quotes_truncate() {
        let msg = ChatMessage::parse(r#"{"name":"Ann","message":"say \"hi\""}"#);
        assert_eq!(msg.message, r"say \");
    }

    #[test]
    fn test_unterminated_value() {
        let body = r#"{"name":"Ann","message":"never closed"#;
        let msg = ChatMessage::parse(body);
        assert_eq!(msg.name, "Ann");
        assert_eq!(msg.message, body);
    }

    #[test]
    fn test_no_colon_after_key() {
        let body = r#"{"name" "Ann"}"#;
        let msg = ChatMessage::parse(body);
        assert_eq!(msg.name, DEFAULT_NAME);
        assert_eq!(msg.message, body);
    }

    #[test]
    fn test_fields_parse_independently() {
        // A broken name does not disturb the message
        let msg = ChatMessage::parse(r#"{"message":"ok","name":}"#);
        assert_eq!(msg.name, DEFAULT_NAME);
        assert_eq!(msg.message, "ok");
    }

    #[test]
    fn test_brace_not_first() {
        let body = r#"x{"name":"Ann","message":"hi"}"#;
        let msg = ChatMessage::parse(body);
        assert_eq!(msg.line(), format!("Anon: {body}"));
    }

    #[test]
    fn test_multi_line_message_kept() {
        let msg = ChatMessage::parse("line one\nline two");
        assert_eq!(msg.line(), "Anon: line one\nline two");
    }
}
