//! Link target classification
//!
//! Decides whether a link target written in a document is a relocation
//! candidate: not a URL, and resolving to an existing regular file.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of classifying one link target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum Resolution {
    /// `http://` or `https://` target, never touched
    External,
    /// Does not resolve to an existing regular file (dangling, directory, anchor...)
    Missing,
    /// Canonical absolute path of an existing regular file
    Eligible(PathBuf),
}

/// Returns true for targets with an `http://` or `https://` prefix.
///
/// The check is case-sensitive on purpose: `HTTP://` is resolved like any
/// other relative path and will simply fail to exist.
pub fn is_external(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

/// Classify a raw link target relative to the document's directory
///
/// `.`/`..` segments and symlinks are resolved through the filesystem.
/// Fragments (`doc.md#part`) get no special treatment and normally fail to
/// resolve.
///
/// # Example
///
/// ```
/// use notemig::document::{resolve_target, Resolution};
/// use std::path::Path;
///
/// assert_eq!(
///     resolve_target("https://example.com/a.png", Path::new("/ws")),
///     Resolution::External
/// );
/// ```
pub fn resolve_target(target: &str, doc_dir: &Path) -> Resolution {
    if is_external(target) {
        return Resolution::External;
    }

    let candidate = doc_dir.join(target);
    match fs::canonicalize(&candidate) {
        Ok(resolved) if resolved.is_file() => Resolution::Eligible(resolved),
        _ => Resolution::Missing,
    }
}

/// Compute SHA256 hash of file content, streamed from disk
pub fn content_hash(path: &Path) -> Result<String, io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        (temp, root)
    }

    #[test]
    fn test_external_urls() {
        let (_temp, root) = workspace();

        assert_eq!(
            resolve_target("https://example.com/image.png", &root),
            Resolution::External
        );
        assert_eq!(resolve_target("http://example.com", &root), Resolution::External);
    }

    #[test]
    fn test_external_prefix_is_case_sensitive() {
        assert!(!is_external("HTTPS://example.com"));
        assert!(!is_external("ftp://example.com"));
        assert!(!is_external("./http://x"));
    }

    #[test]
    fn test_missing_file() {
        let (_temp, root) = workspace();

        assert_eq!(resolve_target("./missing.png", &root), Resolution::Missing);
    }

    #[test]
    fn test_directory_is_not_eligible() {
        let (_temp, root) = workspace();
        fs::create_dir(root.join("img")).unwrap();

        assert_eq!(resolve_target("img", &root), Resolution::Missing);
    }

    #[test]
    fn test_fragment_is_not_resolved() {
        let (_temp, root) = workspace();
        fs::write(root.join("doc.md"), "# Part").unwrap();

        assert_eq!(resolve_target("doc.md#part", &root), Resolution::Missing);
        assert_eq!(resolve_target("#part", &root), Resolution::Missing);
    }

    #[test]
    fn test_existing_file_resolves_with_parent_segments() {
        let (_temp, root) = workspace();
        fs::create_dir_all(root.join("notes/img")).unwrap();
        fs::create_dir_all(root.join("shared")).unwrap();
        fs::write(root.join("shared/logo.png"), b"png").unwrap();

        let doc_dir = root.join("notes/img");
        let resolved = resolve_target("./../../shared/logo.png", &doc_dir);

        assert_eq!(resolved, Resolution::Eligible(root.join("shared/logo.png")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_resolves_to_real_file() {
        let (_temp, root) = workspace();
        fs::write(root.join("real.png"), b"png").unwrap();
        std::os::unix::fs::symlink(root.join("real.png"), root.join("alias.png")).unwrap();

        assert_eq!(
            resolve_target("alias.png", &root),
            Resolution::Eligible(root.join("real.png"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_missing() {
        let (_temp, root) = workspace();
        std::os::unix::fs::symlink(root.join("gone.png"), root.join("alias.png")).unwrap();

        assert_eq!(resolve_target("alias.png", &root), Resolution::Missing);
    }

    #[test]
    fn test_content_hash() {
        let (_temp, root) = workspace();
        let file_path = root.join("test.txt");
        fs::write(&file_path, b"hello world").unwrap();

        assert_eq!(
            content_hash(&file_path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
