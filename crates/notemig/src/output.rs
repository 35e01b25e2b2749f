//! Structured output formatting for the CLI.
//!
//! Human-readable lines go through [`OutputContext`], which honours
//! `--quiet` and `--json`. Machine-readable results are wrapped in
//! [`JsonOutput`] / [`JsonError`] envelopes.

use chrono::Utc;
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::io::{self, Write};

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

/// Routes console lines according to `--quiet` and `--json`
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Dry-run plan lines; shown unless --json
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        write_line(io::stdout().lock(), msg)
    }

    /// Progress lines; hidden by --quiet and --json
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        write_line(io::stdout().lock(), msg)
    }

    /// Warnings go to stderr; hidden by --quiet and --json
    pub fn print_warning(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        write_line(io::stderr().lock(), format_args!("Warning: {}", msg))
    }
}

/// A closed pipe (`notemig ... | head`) ends the process quietly.
fn write_line(mut out: impl Write, msg: impl Display) -> io::Result<()> {
    match writeln!(out, "{}", msg) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        result => result,
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

/// Error details including code and message
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code, e.g. "NOT_FOUND"
    pub code: String,
    pub message: String,
}

impl JsonError {
    pub fn new(exit_code: ExitCode, message: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: exit_code.error_code().to_string(),
                message: message.into(),
            },
            metadata: Metadata::new(command),
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Response metadata
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Timestamp when the response was generated
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

/// Serialize timestamp in ISO 8601 format
fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Process exit codes of the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments, rejected workspace path (2)
    InvalidArgument = 2,

    /// A file or directory disappeared mid-run (3)
    NotFound = 3,

    /// Permission denied (5)
    PermissionDenied = 5,

    /// File system or archive failure (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Code string used in JSON error envelopes
    pub fn error_code(self) -> &'static str {
        match self {
            ExitCode::Success => "OK",
            ExitCode::GenericError => "ERROR",
            ExitCode::InvalidArgument => "INVALID_ARGUMENT",
            ExitCode::NotFound => "NOT_FOUND",
            ExitCode::PermissionDenied => "PERMISSION_DENIED",
            ExitCode::ExternalError => "IO_ERROR",
        }
    }
}
