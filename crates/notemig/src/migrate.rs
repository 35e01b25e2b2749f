//! Whole-workspace migration: backup, link rewriting over every document,
//! then `.vscode` retirement.
//!
//! Documents are processed one at a time in sorted order. The first I/O
//! failure aborts the run; work already done stays on disk.

use crate::backup::{create_backup, BackupSummary};
use crate::document::{
    rewrite_document, AttachmentLayout, DocFormatAdapter, DocumentPlan, MarkdownAdapter,
};
use crate::errors::MigrationError;
use crate::events::{EventSink, MigrationEvent};
use crate::workspace::{list_documents, retire_vscode_dir};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Knobs for a migration run
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Directory for the backup archive; `None` skips the backup
    pub backup_dir: Option<PathBuf>,
    /// Plan and report only; nothing on disk changes
    pub dry_run: bool,
    /// Rename `.vscode` to `.vscode.bak` after rewriting
    pub retire_vscode: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            backup_dir: None,
            dry_run: false,
            retire_vscode: true,
        }
    }
}

/// Totals for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub workspace: PathBuf,
    pub dry_run: bool,
    pub backup: Option<BackupSummary>,
    pub documents_scanned: usize,
    pub documents_updated: usize,
    pub documents_vanished: usize,
    pub links_rewritten: usize,
    pub attachments_moved: usize,
    pub collisions: usize,
    pub vscode_retired: Option<PathBuf>,
    /// Non-empty document plans, filled in dry runs only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<DocumentPlan>,
}

/// Run the full migration on a validated, canonical workspace root.
pub fn migrate_workspace(
    root: &Path,
    options: &MigrateOptions,
    sink: &dyn EventSink,
) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport {
        workspace: root.to_path_buf(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    if !options.dry_run {
        if let Some(dir) = &options.backup_dir {
            report.backup = Some(create_backup(root, dir, sink)?);
        }
    }

    let layout = AttachmentLayout::new(root);
    process_workspace(&layout, &MarkdownAdapter, sink, options.dry_run, &mut report)?;

    if options.retire_vscode && !options.dry_run {
        report.vscode_retired = retire_vscode_dir(root, sink)?;
    }

    info!(
        scanned = report.documents_scanned,
        updated = report.documents_updated,
        moved = report.attachments_moved,
        "migration finished"
    );
    Ok(report)
}

/// Rewrite every document of the workspace, accumulating into `report`.
pub fn process_workspace(
    layout: &AttachmentLayout,
    adapter: &dyn DocFormatAdapter,
    sink: &dyn EventSink,
    dry_run: bool,
    report: &mut MigrationReport,
) -> Result<(), MigrationError> {
    let documents = list_documents(layout, adapter)?;
    sink.notify(&MigrationEvent::DocumentsFound {
        count: documents.len(),
    });

    for doc in documents {
        if !doc.exists() {
            warn!(document = %doc.display(), "document was relocated by an earlier link");
            report.documents_vanished += 1;
            sink.notify(&MigrationEvent::DocumentVanished { path: doc });
            continue;
        }

        report.documents_scanned += 1;
        let (plan, outcome) = rewrite_document(adapter, layout, &doc, sink, dry_run)?;

        report.links_rewritten += outcome.links_rewritten;
        report.attachments_moved += outcome.attachments_moved;
        report.collisions += outcome.collisions;
        if outcome.updated {
            report.documents_updated += 1;
        }
        if dry_run && !plan.is_empty() {
            report.plans.push(plan);
        }
    }

    Ok(())
}
