//! JSON output types for CLI responses.
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same session state, same output
//! 3. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{ErrorCode, QuizError};
use crate::types::QuestionId;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Successful response to one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    /// Always `"ok"`.
    pub status: String,
    pub schema_version: String,
    /// The command name as typed.
    pub command: String,
    /// Navigation path after the command ran; empty outside a session.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub navigation: Vec<QuestionId>,
    /// Command-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    pub fn new(
        command: impl Into<String>,
        navigation: Vec<QuestionId>,
        data: Option<serde_json::Value>,
    ) -> Self {
        CommandResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            command: command.into(),
            navigation,
            data,
        }
    }
}

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Machine-readable error kind.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a QuizError.
    pub fn from_error(err: &QuizError) -> Self {
        let code = ErrorCode::from(err);
        ErrorInfo {
            code: code.code(),
            kind: code.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(command: Option<String>, err: &QuizError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            command,
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
