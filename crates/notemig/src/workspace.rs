//! Workspace root validation, document enumeration and `.vscode` retirement.

use crate::document::{AttachmentLayout, DocFormatAdapter};
use crate::errors::{self, io_at, MigrationError};
use crate::events::{EventSink, MigrationEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory holding editor settings of the previous note-taking setup
pub const VSCODE_DIR: &str = ".vscode";
/// Name the settings directory is renamed to
pub const VSCODE_RETIRED_DIR: &str = ".vscode.bak";

/// Trim whitespace and one pair of surrounding quotes from user input.
pub fn clean_input(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim_matches('\'')
}

/// Validate raw user input and return the canonical workspace root.
///
/// Rejects empty input, files, missing paths and relative paths.
pub fn validate_root(raw: &str) -> Result<PathBuf, MigrationError> {
    let input = clean_input(raw);
    if input.is_empty() {
        return Err(errors::empty_workspace_path().into());
    }

    let path = Path::new(input);
    if path.is_file() {
        return Err(errors::workspace_is_file(input).into());
    }
    if !path.exists() {
        return Err(errors::workspace_not_found(input).into());
    }
    if !path.is_absolute() {
        return Err(errors::workspace_not_absolute(input).into());
    }

    let root = fs::canonicalize(path).map_err(io_at(path))?;
    if !root.is_dir() {
        return Err(errors::workspace_not_directory(&root).into());
    }
    Ok(root)
}

/// Every document under the root, sorted, excluding the attachments tree.
///
/// Symlinked directories are not followed.
pub fn list_documents(
    layout: &AttachmentLayout,
    adapter: &dyn DocFormatAdapter,
) -> Result<Vec<PathBuf>, MigrationError> {
    let root = layout.workspace_root();
    let mut documents = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !layout.is_attachment_path(e.path()));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            MigrationError::Io {
                path,
                source: io::Error::from(e),
            }
        })?;
        if entry.file_type().is_file() && adapter.supports_path(entry.path()) {
            documents.push(entry.into_path());
        }
    }

    debug!(count = documents.len(), "documents enumerated");
    Ok(documents)
}

/// Rename `<root>/.vscode` to `<root>/.vscode.bak`.
///
/// Returns the new path, or `None` when there is no `.vscode` directory or
/// the target name is already taken.
pub fn retire_vscode_dir(
    root: &Path,
    sink: &dyn EventSink,
) -> Result<Option<PathBuf>, MigrationError> {
    let from = root.join(VSCODE_DIR);
    let to = root.join(VSCODE_RETIRED_DIR);
    if !from.is_dir() || to.exists() {
        debug!(from = %from.display(), "vscode directory left in place");
        return Ok(None);
    }

    fs::rename(&from, &to).map_err(io_at(&from))?;
    sink.notify(&MigrationEvent::VscodeRetired {
        from,
        to: to.clone(),
    });
    Ok(Some(to))
}
