//! Attachment relocation into `<workspace>/attachments/<doc-stem>/`
//!
//! Moves are copy-then-delete, never a rename. A crash between the copy and
//! the delete leaves both files on disk; the pre-run backup covers that.
//! A copy that fails part way is removed again.
//! An existing destination is never overwritten.

use crate::document::assets::content_hash;
use crate::errors::{io_at, MigrationError};
use serde::Serialize;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the attachments directory under the workspace root
pub const ATTACHMENTS_DIR: &str = "attachments";

/// What happened to one attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relocation {
    /// Copied to the destination and the source deleted
    Moved,
    /// Destination already existed; source left untouched.
    ///
    /// `identical` is false when both files exist with different content.
    AlreadyPresent { identical: bool },
}

/// Path arithmetic and moves for the attachments tree of one workspace
///
/// # Example
///
/// ```
/// use notemig::document::AttachmentLayout;
/// use std::path::{Path, PathBuf};
///
/// let layout = AttachmentLayout::new("/ws");
/// let dest = layout
///     .destination_for(Path::new("/ws/notes/x.md"), Path::new("/ws/notes/img/pic.png"))
///     .unwrap();
/// assert_eq!(dest, PathBuf::from("/ws/attachments/notes/x/pic.png"));
/// ```
#[derive(Debug, Clone)]
pub struct AttachmentLayout {
    workspace_root: PathBuf,
    attachments_root: PathBuf,
}

impl AttachmentLayout {
    /// `workspace_root` must already be absolute and canonical.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let attachments_root = workspace_root.join(ATTACHMENTS_DIR);
        Self {
            workspace_root,
            attachments_root,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn attachments_root(&self) -> &Path {
        &self.attachments_root
    }

    /// Whether `path` lies inside the attachments tree
    pub fn is_attachment_path(&self, path: &Path) -> bool {
        path.starts_with(&self.attachments_root)
    }

    /// Document path relative to the workspace root, extension removed
    pub fn relative_stem(&self, doc_path: &Path) -> Result<PathBuf, MigrationError> {
        let relative = doc_path
            .strip_prefix(&self.workspace_root)
            .map_err(|_| MigrationError::OutsideWorkspace {
                path: doc_path.to_path_buf(),
                root: self.workspace_root.clone(),
            })?;
        Ok(relative.with_extension(""))
    }

    /// Directory that receives the attachments of `doc_path`
    pub fn destination_dir(&self, doc_path: &Path) -> Result<PathBuf, MigrationError> {
        Ok(self.attachments_root.join(self.relative_stem(doc_path)?))
    }

    /// Destination file for `source` when owned by `doc_path`.
    ///
    /// Only the leaf name of `source` survives, so two sources with the same
    /// leaf name owned by the same document map to the same destination.
    pub fn destination_for(
        &self,
        doc_path: &Path,
        source: &Path,
    ) -> Result<PathBuf, MigrationError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| MigrationError::OutsideWorkspace {
                path: source.to_path_buf(),
                root: self.workspace_root.clone(),
            })?;
        Ok(self.destination_dir(doc_path)?.join(file_name))
    }

    /// Move `source` to `destination` unless the destination already exists.
    ///
    /// Parent directories are created as needed. Bytes, permissions and
    /// timestamps are copied before the source is deleted.
    pub fn relocate(&self, source: &Path, destination: &Path) -> Result<Relocation, MigrationError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(io_at(parent))?;
        }

        if destination.exists() {
            let identical = same_content(source, destination)?;
            debug!(
                source = %source.display(),
                destination = %destination.display(),
                identical,
                "destination exists, not moving"
            );
            return Ok(Relocation::AlreadyPresent { identical });
        }

        copy_with_metadata(source, destination)?;
        if source.exists() {
            fs::remove_file(source).map_err(io_at(source))?;
        }
        debug!(from = %source.display(), to = %destination.display(), "attachment moved");

        Ok(Relocation::Moved)
    }
}

/// Copy bytes, then times, then permission bits.
///
/// Times are set through the handle that wrote the bytes, before a
/// read-only mode lands on the copy. A failed copy leaves no destination.
fn copy_with_metadata(source: &Path, destination: &Path) -> Result<(), MigrationError> {
    let mut input = File::open(source).map_err(io_at(source))?;
    let meta = input.metadata().map_err(io_at(source))?;
    let output = File::options()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(io_at(destination))?;

    let result = fill_copy(&mut input, output, &meta, destination);
    if result.is_err() {
        let _ = fs::remove_file(destination);
    }
    result
}

fn fill_copy(
    input: &mut File,
    mut output: File,
    meta: &fs::Metadata,
    destination: &Path,
) -> Result<(), MigrationError> {
    io::copy(input, &mut output).map_err(io_at(destination))?;
    if let (Ok(accessed), Ok(modified)) = (meta.accessed(), meta.modified()) {
        let times = FileTimes::new()
            .set_accessed(accessed)
            .set_modified(modified);
        output.set_times(times).map_err(io_at(destination))?;
    }
    drop(output);

    fs::set_permissions(destination, meta.permissions()).map_err(io_at(destination))
}

/// A source that is gone or is the destination itself counts as identical.
/// Anything other than two regular files is a real collision.
fn same_content(source: &Path, destination: &Path) -> Result<bool, MigrationError> {
    if source == destination || !source.exists() {
        return Ok(true);
    }
    if !source.is_file() || !destination.is_file() {
        return Ok(false);
    }
    let a = content_hash(source).map_err(io_at(source))?;
    let b = content_hash(destination).map_err(io_at(destination))?;
    Ok(a == b)
}
