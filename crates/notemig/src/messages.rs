//! User-facing CLI strings in English and Japanese.

use crate::events::MigrationEvent;
use crate::migrate::MigrationReport;
use clap::ValueEnum;
use std::path::Path;

/// Display language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    #[default]
    En,
    Ja,
}

/// Message table for one language
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    lang: Lang,
}

impl Messages {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    fn pick(&self, en: String, ja: String) -> String {
        match self.lang {
            Lang::En => en,
            Lang::Ja => ja,
        }
    }

    pub fn prompt_workspace(&self) -> String {
        self.pick(
            "Absolute path of the note workspace".into(),
            "VSCode Note Taking Extensionのワークスペースパスを絶対パスで入力してください".into(),
        )
    }

    pub fn confirm_start(&self, root: &Path) -> String {
        self.pick(
            format!(
                "Relocate linked files of {} into attachments/ and rewrite links?",
                root.display()
            ),
            format!(
                "{} のリンク先ファイルを attachments/ に移動し、リンクを書き換えますか?",
                root.display()
            ),
        )
    }

    pub fn aborted(&self) -> String {
        self.pick("Aborted, nothing changed.".into(), "中止しました。変更はありません。".into())
    }

    pub fn backing_up(&self) -> String {
        self.pick("Backing up...".into(), "バックアップ中...".into())
    }

    pub fn starting(&self) -> String {
        self.pick(
            "Rewriting links and relocating attachments...".into(),
            "リンク修正およびリソースの再配置を開始します...".into(),
        )
    }

    pub fn dry_run_notice(&self) -> String {
        self.pick(
            "Dry run: nothing will be moved or written.".into(),
            "ドライラン: ファイルの移動や書き込みは行いません。".into(),
        )
    }

    pub fn finished(&self) -> String {
        self.pick("All done.".into(), "すべての処理が完了しました。".into())
    }

    pub fn planned_link(&self, from: &str, to: &str) -> String {
        self.pick(
            format!("    {} -> {}", from, to),
            format!("    {} → {}", from, to),
        )
    }

    pub fn plan_header(&self, doc: &Path) -> String {
        self.pick(
            format!("  Would update: {}", doc.display()),
            format!("  更新予定: {}", doc.display()),
        )
    }

    /// One line per event; genuine collisions are rendered by [`Messages::collision_warning`]
    pub fn event(&self, event: &MigrationEvent) -> String {
        match event {
            MigrationEvent::BackupCreated { path, files } => self.pick(
                format!("Backup written: {} ({} files)", path.display(), files),
                format!("バックアップ完了: {} ({} ファイル)", path.display(), files),
            ),
            MigrationEvent::DocumentsFound { count } => self.pick(
                format!("Markdown files: {}", count),
                format!("Markdownファイル数: {}", count),
            ),
            MigrationEvent::AttachmentMoved { from, to } => self.pick(
                format!("Moved: {} -> {}", from.display(), to.display()),
                format!("移動: {} → {}", from.display(), to.display()),
            ),
            MigrationEvent::AttachmentCollision {
                source,
                destination,
                ..
            } => self.pick(
                format!(
                    "Already present: {} (kept {})",
                    destination.display(),
                    source.display()
                ),
                format!(
                    "移動先に既に存在: {} ({} はそのまま)",
                    destination.display(),
                    source.display()
                ),
            ),
            MigrationEvent::DocumentUpdated { path, links } => self.pick(
                format!("Updated: {} ({} links)", path.display(), links),
                format!("更新: {} ({} リンク)", path.display(), links),
            ),
            MigrationEvent::DocumentVanished { path } => self.pick(
                format!("Skipped (moved as an attachment): {}", path.display()),
                format!("スキップ (添付ファイルとして移動済み): {}", path.display()),
            ),
            MigrationEvent::VscodeRetired { from, to } => self.pick(
                format!("Renamed {} -> {}", from.display(), to.display()),
                format!("名前を変更: {} → {}", from.display(), to.display()),
            ),
        }
    }

    pub fn collision_warning(&self, source: &Path, destination: &Path) -> String {
        self.pick(
            format!(
                "{} differs from existing {}; links now point at the existing file",
                source.display(),
                destination.display()
            ),
            format!(
                "{} は既存の {} と内容が異なります。リンクは既存ファイルを指します",
                source.display(),
                destination.display()
            ),
        )
    }

    pub fn summary(&self, report: &MigrationReport) -> String {
        self.pick(
            format!(
                "{} documents scanned, {} updated, {} links rewritten, {} attachments moved, {} collisions",
                report.documents_scanned,
                report.documents_updated,
                report.links_rewritten,
                report.attachments_moved,
                report.collisions
            ),
            format!(
                "文書 {} 件を確認、{} 件を更新、リンク {} 件を書き換え、添付 {} 件を移動、衝突 {} 件",
                report.documents_scanned,
                report.documents_updated,
                report.links_rewritten,
                report.attachments_moved,
                report.collisions
            ),
        )
    }
}
