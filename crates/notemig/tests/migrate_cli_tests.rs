//! End-to-end tests for the notemig binary against temporary workspaces.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A canonical workspace root plus a separate directory used as cwd and backup target
struct TestEnv {
    _workspace: TempDir,
    _scratch: TempDir,
    root: PathBuf,
    scratch: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let workspace = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let root = fs::canonicalize(workspace.path()).unwrap();
        let scratch_path = fs::canonicalize(scratch.path()).unwrap();
        Self {
            _workspace: workspace,
            _scratch: scratch,
            root,
            scratch: scratch_path,
        }
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).unwrap()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("notemig"));
        cmd.current_dir(&self.scratch)
            .env_remove("NOTEMIG_LANG")
            .env_remove("NOTEMIG_BACKUP_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn backups_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with("-backup.zip"))
        .collect()
}

#[test]
fn test_migrates_workspace_and_reports() {
    let env = TestEnv::new();
    env.write("notes/x.md", "![alt](./img/pic.png)");
    env.write("notes/img/pic.png", "png");

    env.cmd()
        .args(["--yes", "--no-backup"])
        .arg(&env.root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Markdown files: 1"))
        .stdout(predicate::str::contains("All done."));

    assert_eq!(env.read("notes/x.md"), "![alt](../attachments/notes/x/pic.png)");
    assert_eq!(env.read("attachments/notes/x/pic.png"), "png");
    assert!(!env.root.join("notes/img/pic.png").exists());
}

#[test]
fn test_backup_written_to_current_dir_by_default() {
    let env = TestEnv::new();
    env.write("a.md", "![](pic.png)");
    env.write("pic.png", "png");

    env.cmd().arg("-y").arg(&env.root).assert().success();

    assert_eq!(backups_in(&env.scratch).len(), 1);
}

#[test]
fn test_backup_dir_flag() {
    let env = TestEnv::new();
    env.write("a.md", "plain");
    let target = env.scratch.join("archives");

    env.cmd()
        .arg("-y")
        .arg("--backup-dir")
        .arg(&target)
        .arg(&env.root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup written"));

    assert_eq!(backups_in(&target).len(), 1);
}

#[test]
fn test_dry_run_lists_plan_and_changes_nothing() {
    let env = TestEnv::new();
    env.write("a.md", "![](pic.png)");
    env.write("pic.png", "png");
    env.write(".vscode/settings.json", "{}");

    env.cmd()
        .arg("--dry-run")
        .arg(&env.root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would update:"))
        .stdout(predicate::str::contains("pic.png -> attachments/a/pic.png"));

    assert_eq!(env.read("a.md"), "![](pic.png)");
    assert!(env.root.join("pic.png").exists());
    assert!(env.root.join(".vscode").exists());
    assert!(backups_in(&env.scratch).is_empty());
}

#[test]
fn test_json_output_envelope() {
    let env = TestEnv::new();
    env.write("a.md", "![](pic.png) [site](https://example.com)");
    env.write("pic.png", "png");

    let output = env
        .cmd()
        .args(["--json", "-y", "--no-backup"])
        .arg(&env.root)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["metadata"]["command"], "migrate");
    assert_eq!(json["data"]["documents_updated"], 1);
    assert_eq!(json["data"]["links_rewritten"], 1);
    assert_eq!(json["data"]["attachments_moved"], 1);
    assert_eq!(json["data"]["dry_run"], false);
}

#[test]
fn test_vscode_directory_retired_unless_kept() {
    let env = TestEnv::new();
    env.write("a.md", "plain");
    env.write(".vscode/settings.json", "{}");

    env.cmd()
        .args(["-y", "--no-backup", "--keep-vscode"])
        .arg(&env.root)
        .assert()
        .success();
    assert!(env.root.join(".vscode").exists());

    env.cmd()
        .args(["-y", "--no-backup"])
        .arg(&env.root)
        .assert()
        .success();
    assert!(!env.root.join(".vscode").exists());
    assert_eq!(env.read(".vscode.bak/settings.json"), "{}");
}

#[test]
fn test_japanese_messages() {
    let env = TestEnv::new();
    env.write("a.md", "plain");

    env.cmd()
        .args(["-y", "--no-backup", "--lang", "ja"])
        .arg(&env.root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Markdownファイル数: 1"));
}

#[test]
fn test_quiet_mode_prints_nothing() {
    let env = TestEnv::new();
    env.write("a.md", "![](pic.png)");
    env.write("pic.png", "png");

    env.cmd()
        .args(["-y", "-q", "--no-backup"])
        .arg(&env.root)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(env.read("a.md"), "![](attachments/a/pic.png)");
}

#[test]
fn test_second_run_changes_nothing() {
    let env = TestEnv::new();
    env.write("a.md", "![](img/pic.png)");
    env.write("img/pic.png", "png");

    env.cmd().args(["-y", "--no-backup"]).arg(&env.root).assert().success();
    let after_first = env.read("a.md");

    let output = env
        .cmd()
        .args(["--json", "-y", "--no-backup"])
        .arg(&env.root)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["data"]["documents_updated"], 0);
    assert_eq!(json["data"]["attachments_moved"], 0);
    assert_eq!(env.read("a.md"), after_first);
}

#[test]
fn test_json_dry_run_needs_no_confirmation() {
    let env = TestEnv::new();
    env.write("a.md", "![](pic.png)");
    env.write("pic.png", "png");

    let output = env
        .cmd()
        .args(["--json", "--dry-run"])
        .arg(&env.root)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["dry_run"], true);
    assert_eq!(json["data"]["plans"][0]["links"][0]["new_target"], "attachments/a/pic.png");
    assert_eq!(env.read("a.md"), "![](pic.png)");
}

#[cfg(unix)]
#[test]
fn test_read_only_attachment_is_moved() {
    use std::os::unix::fs::PermissionsExt;

    let env = TestEnv::new();
    env.write("a.md", "![](img/pic.png)");
    env.write("img/pic.png", "png");
    let source = env.root.join("img/pic.png");
    fs::set_permissions(&source, fs::Permissions::from_mode(0o444)).unwrap();

    env.cmd()
        .args(["-y", "--no-backup"])
        .arg(&env.root)
        .assert()
        .success();

    assert!(!source.exists());
    assert_eq!(env.read("attachments/a/pic.png"), "png");
    assert_eq!(env.read("a.md"), "![](attachments/a/pic.png)");
}
