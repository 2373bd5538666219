//! Message formatting for chat delivery
//!
//! A formatter maps an entry and its resolved fields to the text of one chat
//! message. It is invoked once per entry, before the entry is sent to any
//! destination.
//!
//! Built-in layouts:
//! - `Default`: logger name, timestamp, level and message on separate lines
//! - `Detailed`: the default layout followed by caller, fields and stack
//! - `Json`: the whole entry as a pretty-printed JSON object

use super::field::{format_fields, Field};
use super::log_entry::LogEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Logger name used when the entry's logger is unnamed
pub const DEFAULT_LOGGER_NAME: &str = "rust_telegram_logger";

/// Timestamp layout of the default message, e.g. `11:25:59 01.01.2007`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M:%S %d.%m.%Y";

/// Custom message formatter
///
/// Must be pure and must not panic for any well formed entry.
pub type Formatter = Arc<dyn Fn(&LogEntry, &[Field]) -> String + Send + Sync>;

/// Render the default layout:
///
/// ```text
/// Logger: rust_telegram_logger
/// 11:25:59 01.01.2007
/// INFO
/// Hello bar
/// ```
pub fn default_format(entry: &LogEntry, _fields: &[Field]) -> String {
    format!(
        "Logger: {}\n{}\n{}\n{}",
        logger_name(entry),
        entry.timestamp.format(DEFAULT_TIMESTAMP_FORMAT),
        entry.level,
        entry.message
    )
}

/// The entry's logger name, or [`DEFAULT_LOGGER_NAME`] when unnamed or empty
fn logger_name(entry: &LogEntry) -> &str {
    entry
        .logger_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_LOGGER_NAME)
}

/// Built-in message layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLayout {
    #[default]
    Default,
    Detailed,
    Json,
}

impl MessageLayout {
    pub fn format(&self, entry: &LogEntry, fields: &[Field]) -> String {
        match self {
            MessageLayout::Default => default_format(entry, fields),
            MessageLayout::Detailed => format_detailed(entry, fields),
            MessageLayout::Json => format_json(entry, fields),
        }
    }

    /// Wrap this layout in a [`Formatter`]
    pub fn formatter(self) -> Formatter {
        Arc::new(move |entry: &LogEntry, fields: &[Field]| self.format(entry, fields))
    }
}

fn format_detailed(entry: &LogEntry, fields: &[Field]) -> String {
    let mut message = default_format(entry, fields);

    if let Some(ref caller) = entry.caller {
        message.push_str("\nCaller: ");
        message.push_str(&caller.to_string());
    }
    if !fields.is_empty() {
        message.push_str("\nFields: ");
        message.push_str(&format_fields(fields));
    }
    if let Some(ref stack) = entry.stack {
        message.push_str("\nStack:\n");
        message.push_str(stack);
    }

    message
}

fn format_json(entry: &LogEntry, fields: &[Field]) -> String {
    let mut json_obj = serde_json::Map::new();

    json_obj.insert(
        "logger".to_string(),
        serde_json::Value::String(logger_name(entry).to_string()),
    );
    json_obj.insert(
        "timestamp".to_string(),
        serde_json::Value::String(entry.timestamp.to_rfc3339()),
    );
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(entry.level.to_str().to_string()),
    );
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(entry.message.clone()),
    );

    if let Some(ref caller) = entry.caller {
        json_obj.insert(
            "caller".to_string(),
            serde_json::Value::String(caller.to_string()),
        );
    }
    if let Some(ref stack) = entry.stack {
        json_obj.insert("stack".to_string(), serde_json::Value::String(stack.clone()));
    }

    // Later fields win on duplicate keys
    for field in fields {
        json_obj.insert(field.key.clone(), field.value.to_json_value());
    }

    serde_json::to_string_pretty(&serde_json::Value::Object(json_obj)).unwrap_or_default()
}

/// Bot API formatting option for message text
///
/// <https://core.telegram.org/bots/api#formatting-options>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Html => "HTML",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches("mode") {
            "markdown" => Ok(ParseMode::Markdown),
            "markdownv2" => Ok(ParseMode::MarkdownV2),
            "html" => Ok(ParseMode::Html),
            _ => Err(format!("Invalid parse mode: '{}'", s)),
        }
    }
}
