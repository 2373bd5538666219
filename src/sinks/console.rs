//! Console sink implementation
//!
//! Useful next to a [`crate::TelegramRouter`] in a [`crate::Tee`]: everything
//! goes to the terminal, only the important entries go to chat.

use crate::core::{format_fields, Field, LogEntry, LogLevel, LogSink, Result};
use colored::Colorize;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConsoleSink {
    min_level: LogLevel,
    use_colors: bool,
    timestamp_format: String,
    inherited: Arc<[Field]>,
}

impl ConsoleSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            use_colors: true,
            timestamp_format: "%Y-%m-%dT%H:%M:%S%.3fZ".to_string(),
            inherited: Arc::from(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set a strftime-compatible timestamp format
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_telegram_logger::prelude::*;
    ///
    /// let sink = ConsoleSink::new(LogLevel::Info)
    ///     .with_timestamp_format("%d/%b/%Y:%H:%M:%S %z");
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format_str: &str) -> Self {
        self.timestamp_format = format_str.to_string();
        self
    }

    /// Format as text with optional colors
    fn format_text(&self, entry: &LogEntry, fields: &[Field]) -> String {
        let level_str = if self.use_colors {
            format!("{:5}", entry.level.to_str())
                .color(entry.level.color_code())
                .to_string()
        } else {
            format!("{:5}", entry.level.to_str())
        };

        let mut line = format!(
            "[{}] [{}] {} - {}",
            entry.timestamp.format(&self.timestamp_format),
            level_str,
            entry.logger_name.as_deref().unwrap_or("-"),
            entry.message
        );

        if !fields.is_empty() || !self.inherited.is_empty() {
            let mut all = fields.to_vec();
            all.extend_from_slice(&self.inherited);
            line.push(' ');
            line.push_str(&format_fields(&all));
        }

        line
    }
}

impl LogSink for ConsoleSink {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn accept(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
        let output = self.format_text(entry, fields);

        // Route Error and above to stderr, others to stdout
        if entry.level >= LogLevel::Error {
            eprintln!("{}", output);
        } else {
            println!("{}", output);
        }
        Ok(())
    }

    fn with(&self, fields: Vec<Field>) -> Box<dyn LogSink> {
        let mut inherited = self.inherited.to_vec();
        inherited.extend(fields);
        Box::new(Self {
            inherited: inherited.into(),
            ..self.clone()
        })
    }

    fn flush(&self) -> Result<()> {
        use std::io::Write;
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
