//! Log record format module
//!
//! Supports two layouts:
//! - `text` (timestamp, level, scope, message, then `key=value` fields)
//! - `json` (one JSON object per line)

use std::fmt::Display;

use chrono::{DateTime, Local, SecondsFormat};
use serde_json::{Map, Value};

use crate::config::{LogFormat, LogLevel};

/// One log line before formatting
#[derive(Debug, Clone)]
pub struct EventRecord {
    /// Record timestamp
    pub time: DateTime<Local>,
    pub level: LogLevel,
    /// What the line is about, e.g. `conn 3` or `listener`
    pub scope: Option<String>,
    pub message: String,
    /// Structured details, in insertion order
    pub fields: Vec<(&'static str, Value)>,
}

impl EventRecord {
    /// Create a new record with current timestamp
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            level,
            scope: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Display) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    #[must_use]
    pub fn field(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    /// Format the record according to the specified layout
    pub fn format(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Text => self.format_text(),
            LogFormat::Json => self.format_json(),
        }
    }

    fn format_text(&self) -> String {
        let mut line = format!(
            "{} {:<5} ",
            self.time.to_rfc3339_opts(SecondsFormat::Millis, false),
            self.level.as_str()
        );
        if let Some(scope) = &self.scope {
            line.push_str(&format!("[{scope}] "));
        }
        line.push_str(&self.message);
        for (key, value) in &self.fields {
            // Strings print JSON-quoted and escaped
            line.push_str(&format!(" {key}={value}"));
        }
        line
    }

    fn format_json(&self) -> String {
        let mut object = Map::new();
        object.insert("time".to_string(), Value::from(self.time.to_rfc3339()));
        object.insert("level".to_string(), Value::from(self.level.as_str()));
        if let Some(scope) = &self.scope {
            object.insert("scope".to_string(), Value::from(scope.as_str()));
        }
        object.insert("message".to_string(), Value::from(self.message.as_str()));
        for (key, value) in &self.fields {
            object.insert((*key).to_string(), value.clone());
        }
        Value::Object(object).to_string()
    }
}
