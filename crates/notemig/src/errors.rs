//! Error types for the migration library.
//!
//! Two layers:
//! - [`MigrationError`]: what library operations return. I/O failures carry
//!   the path that failed and abort the whole batch.
//! - [`ActionableError`]: a user-facing message with possible causes and
//!   remediation steps, used for rejected workspace roots.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by migration operations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The workspace root failed validation
    #[error(transparent)]
    InvalidWorkspace(#[from] ActionableError),

    /// A read, copy, delete, write or mkdir failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A document or attachment path is not below the workspace root
    #[error("{} is outside the workspace {}", path.display(), root.display())]
    OutsideWorkspace { path: PathBuf, root: PathBuf },

    /// The backup archive could not be written
    #[error("Failed to write backup archive {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl MigrationError {
    /// Underlying I/O error, if this failure came from the filesystem
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            MigrationError::Io { source, .. } => Some(source.kind()),
            MigrationError::Backup {
                source: zip::result::ZipError::Io(source),
                ..
            } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Build a `map_err` adapter that attaches `path` to an I/O error.
pub(crate) fn io_at(path: &Path) -> impl FnOnce(io::Error) -> MigrationError + '_ {
    move |source| MigrationError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use notemig::errors::ActionableError;
///
/// let error = ActionableError::new("Workspace not found: /notes")
///     .with_cause("The path may be misspelled")
///     .with_remedy("Pass the absolute path of the workspace folder");
///
/// assert!(error.to_error_message().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

pub fn empty_workspace_path() -> ActionableError {
    ActionableError::new("No workspace path was given")
        .with_remedy("Pass the workspace folder: notemig /path/to/notes")
        .with_remedy("Or run notemig without arguments and type the path at the prompt")
}

pub fn workspace_is_file(path: &str) -> ActionableError {
    ActionableError::new(format!("Workspace path is a file, not a directory: {}", path))
        .with_cause("The path may point at a single note instead of its folder")
        .with_remedy("Pass the folder that contains your notes")
}

pub fn workspace_not_found(path: &str) -> ActionableError {
    ActionableError::new(format!("Workspace path does not exist: {}", path))
        .with_cause("The path may be misspelled")
        .with_cause("Quotes or trailing spaces may have been copied with the path")
        .with_remedy(format!("Check the folder exists: ls -d {}", path))
}

pub fn workspace_not_absolute(path: &str) -> ActionableError {
    ActionableError::new(format!("Workspace path must be absolute: {}", path))
        .with_remedy("Pass the full path starting from the filesystem root")
}

pub fn workspace_not_directory(path: &Path) -> ActionableError {
    ActionableError::new(format!(
        "Workspace path is missing or not a directory: {}",
        path.display()
    ))
    .with_cause("The folder may have been moved or deleted after validation started")
}

pub fn json_requires_yes() -> ActionableError {
    ActionableError::new("--json cannot prompt for confirmation before changing files")
        .with_remedy("Add --yes to confirm the migration up front")
        .with_remedy("Or add --dry-run to only report what would change")
}
