//! Command-line interface definitions using clap.

use crate::errors::{self, ActionableError};
use crate::messages::Lang;
use crate::migrate::MigrateOptions;
use clap::Parser;
use std::path::PathBuf;

/// Note workspace migrator
///
/// Moves every local file linked from a Markdown note into
/// `attachments/<note path without extension>/` and rewrites the links.
///
/// Exit Codes:
///   0  - Migration finished (or was declined at the prompt)
///   1  - Generic error occurred
///   2  - Invalid workspace path or arguments
///   3  - A file or directory was not found
///   5  - Permission denied
///  10  - File system or archive failure
#[derive(Parser, Debug)]
#[command(name = "notemig")]
#[command(version, about = "Migrate a Markdown note workspace to a centralized attachments layout", long_about = None)]
pub struct Cli {
    /// Absolute path of the workspace root (prompted for when omitted)
    pub workspace: Option<String>,

    /// Directory that receives the backup archive
    #[arg(long, env = "NOTEMIG_BACKUP_DIR", default_value = ".")]
    pub backup_dir: PathBuf,

    /// Do not archive the workspace before migrating
    #[arg(long)]
    pub no_backup: bool,

    /// Show what would change without touching the disk
    #[arg(long)]
    pub dry_run: bool,

    /// Leave the .vscode directory in place
    #[arg(long)]
    pub keep_vscode: bool,

    /// Language of user-facing messages
    #[arg(long, value_enum, env = "NOTEMIG_LANG", default_value_t = Lang::En)]
    pub lang: Lang,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Suppress non-essential output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output the migration report as JSON (needs --yes unless --dry-run)
    #[arg(long)]
    pub json: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Collect the run knobs for [`crate::migrate::migrate_workspace`]
    pub fn migrate_options(&self) -> MigrateOptions {
        MigrateOptions {
            backup_dir: (!self.no_backup).then(|| self.backup_dir.clone()),
            dry_run: self.dry_run,
            retire_vscode: !self.keep_vscode,
        }
    }

    /// Whether the interactive confirmation should be skipped
    pub fn skip_confirmation(&self) -> bool {
        self.yes || self.dry_run
    }

    /// Reject flag combinations that would need a prompt nobody sees
    pub fn check(&self) -> Result<(), ActionableError> {
        if self.json && !self.skip_confirmation() {
            return Err(errors::json_requires_yes());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["notemig", "/ws"]).unwrap();
        let options = cli.migrate_options();

        assert_eq!(cli.workspace.as_deref(), Some("/ws"));
        assert_eq!(options.backup_dir, Some(PathBuf::from(".")));
        assert!(!options.dry_run);
        assert!(options.retire_vscode);
        assert!(!cli.skip_confirmation());
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "notemig",
            "--no-backup",
            "--keep-vscode",
            "--dry-run",
            "--lang",
            "ja",
            "/ws",
        ])
        .unwrap();
        let options = cli.migrate_options();

        assert_eq!(options.backup_dir, None);
        assert!(options.dry_run);
        assert!(!options.retire_vscode);
        assert_eq!(cli.lang, Lang::Ja);
        assert!(cli.skip_confirmation());
    }

    #[test]
    fn test_json_mutating_run_needs_yes() {
        let cli = Cli::try_parse_from(["notemig", "--json", "/ws"]).unwrap();
        assert!(!cli.skip_confirmation());
        assert!(cli.check().is_err());

        let confirmed = Cli::try_parse_from(["notemig", "--json", "-y", "/ws"]).unwrap();
        assert!(confirmed.check().is_ok());

        let dry = Cli::try_parse_from(["notemig", "--json", "--dry-run", "/ws"]).unwrap();
        assert!(dry.check().is_ok());
    }

    #[test]
    fn test_workspace_is_optional() {
        let cli = Cli::try_parse_from(["notemig", "-y", "-q"]).unwrap();

        assert!(cli.workspace.is_none());
        assert!(cli.yes);
        assert!(cli.quiet);
    }

    #[test]
    fn test_rejects_unknown_lang() {
        assert!(Cli::try_parse_from(["notemig", "--lang", "fr", "/ws"]).is_err());
    }
}
