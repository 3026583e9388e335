//! Output layer shared by every command: plain text for people, stable JSON
//! for scripts.
//!
//! Mode precedence (highest wins): `--json` flag, `FORMAT` env var, user
//! config `output`, then text. The chain itself is resolved in
//! [`trellis_core::config::resolve_config`]; this module only maps the
//! resolved name onto [`OutputMode`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use trellis_core::{ErrorCode, HierarchyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    /// Map a resolved mode name (`"text"` or `"json"`) onto a mode.
    /// Anything unrecognised falls back to text.
    pub fn from_resolved(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Error payload rendered to stderr.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }

    /// Error built from a code's canned message and hint.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&HierarchyError> for CliError {
    fn from(err: &HierarchyError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

/// Render a serializable value: pretty JSON, or the human formatter.
pub fn render<T, F>(mode: OutputMode, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T, &mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, mode, value, human_fn)
}

fn render_to<T, F>(out: &mut dyn Write, mode: OutputMode, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T, &mut dyn Write) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
            writeln!(out, "{json}")
        }
        OutputMode::Text => human_fn(value, out),
    }
}

/// Render an error to stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    let mut err = stderr.lock();
    render_error_to(&mut err, mode, error)
}

fn render_error_to(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapped = serde_json::json!({ "error": error });
            let json = serde_json::to_string_pretty(&wrapped).map_err(io::Error::other)?;
            writeln!(out, "{json}")
        }
        OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
            Ok(())
        }
    }
}

/// Render a one-line confirmation.
pub fn render_success(mode: OutputMode, message: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let json = serde_json::json!({ "ok": true, "message": message });
            writeln!(out, "{json}")
        }
        OutputMode::Text => writeln!(out, "✓ {message}"),
    }
}

/// Left-aligned key/value line for text output.
pub fn text_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// Format a microsecond timestamp as RFC 3339, or the raw number if it is
/// out of range.
pub fn format_us(us: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(us)
        .map_or_else(|| us.to_string(), |dt| dt.to_rfc3339())
}

/// Comma-separated id list, or `-` when empty.
pub fn id_list(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
