//! Workspace backup as a timestamped zip archive.

use crate::errors::{io_at, MigrationError};
use crate::events::{EventSink, MigrationEvent};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Where the archive went and how many files it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub path: PathBuf,
    pub files: usize,
}

/// `<YYYYmmdd-HHMMSS>-backup.zip` for the given local time
pub fn backup_file_name(now: DateTime<Local>) -> String {
    format!("{}-backup.zip", now.format("%Y%m%d-%H%M%S"))
}

/// Archive every file under `workspace_root` into `backup_dir`.
///
/// Entry names are relative to the root with `/` separators. An existing
/// archive with the same name is never overwritten, and the archive being
/// written is skipped when `backup_dir` lies inside the workspace.
pub fn create_backup(
    workspace_root: &Path,
    backup_dir: &Path,
    sink: &dyn EventSink,
) -> Result<BackupSummary, MigrationError> {
    fs::create_dir_all(backup_dir).map_err(io_at(backup_dir))?;
    let backup_dir = fs::canonicalize(backup_dir).map_err(io_at(backup_dir))?;
    let archive_path = backup_dir.join(backup_file_name(Local::now()));

    let file = File::options()
        .write(true)
        .create_new(true)
        .open(&archive_path)
        .map_err(io_at(&archive_path))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let zip_err = |source| MigrationError::Backup {
        path: archive_path.clone(),
        source,
    };

    let mut files = 0;
    for entry in WalkDir::new(workspace_root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| workspace_root.to_path_buf());
            MigrationError::Io {
                path,
                source: io::Error::from(e),
            }
        })?;
        let path = entry.path();
        if !path.is_file() || path == archive_path {
            continue;
        }

        let name = archive_name(workspace_root, path)?;
        debug!(entry = %name, "archiving");
        zip.start_file(name, options).map_err(zip_err)?;
        let mut source = File::open(path).map_err(io_at(path))?;
        io::copy(&mut source, &mut zip).map_err(io_at(path))?;
        files += 1;
    }

    zip.finish().map_err(zip_err)?;
    info!(archive = %archive_path.display(), files, "backup written");

    sink.notify(&MigrationEvent::BackupCreated {
        path: archive_path.clone(),
        files,
    });
    Ok(BackupSummary {
        path: archive_path,
        files,
    })
}

fn archive_name(root: &Path, path: &Path) -> Result<String, MigrationError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| MigrationError::OutsideWorkspace {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
