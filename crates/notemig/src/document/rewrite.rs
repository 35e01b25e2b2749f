//! Link rewriting for a single document
//!
//! Three phases, so the text logic can be tested without touching disk:
//! 1. [`plan_document`] scans links, classifies targets and computes
//!    destinations and new link text. Reads the filesystem, mutates nothing.
//! 2. [`apply_plan`] performs the moves in document order.
//! 3. [`splice`] substitutes the new targets into the text.
//!
//! [`rewrite_document`] drives all three and persists the result.

use crate::document::adapter::DocFormatAdapter;
use crate::document::assets::{resolve_target, Resolution};
use crate::document::relocate::{AttachmentLayout, Relocation};
use crate::errors::{io_at, MigrationError};
use crate::events::{EventSink, MigrationEvent};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// One eligible link and where its target is going
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedLink {
    /// Byte range of `label(target)` in the original content
    pub span: Range<usize>,
    pub label: String,
    pub original_target: String,
    /// Canonical path of the file the link currently points at
    pub source: PathBuf,
    /// Where the file lives after relocation
    pub destination: PathBuf,
    /// `destination` relative to the document's directory, `/`-separated
    pub new_target: String,
}

impl PlannedLink {
    /// The text that replaces the original match
    pub fn replacement(&self) -> String {
        format!("{}({})", self.label, self.new_target)
    }
}

/// All eligible links of one document, in text order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentPlan {
    pub document: PathBuf,
    pub links: Vec<PlannedLink>,
}

impl DocumentPlan {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Result of processing one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    /// Links whose text changed
    pub links_rewritten: usize,
    pub attachments_moved: usize,
    /// Destinations that already existed for a different source path
    pub collisions: usize,
    /// Whether the document content changed (and, outside dry runs, was written)
    pub updated: bool,
}

/// Scan `content` and plan every eligible link. No filesystem mutation.
pub fn plan_document(
    adapter: &dyn DocFormatAdapter,
    layout: &AttachmentLayout,
    doc_path: &Path,
    content: &str,
) -> Result<DocumentPlan, MigrationError> {
    let doc_dir = doc_path.parent().unwrap_or(layout.workspace_root());
    let mut links = Vec::new();

    for link in adapter.scan_links(content) {
        let source = match resolve_target(link.target, doc_dir) {
            Resolution::Eligible(source) => source,
            skipped => {
                trace!(target_path = link.target, ?skipped, "link left as is");
                continue;
            }
        };

        let destination = layout.destination_for(doc_path, &source)?;
        let new_target = relative_link(&destination, doc_dir);
        debug!(
            document = %doc_path.display(),
            from = link.target,
            to = %new_target,
            "planned link"
        );

        links.push(PlannedLink {
            span: link.span.clone(),
            label: link.label.to_string(),
            original_target: link.target.to_string(),
            source,
            destination,
            new_target,
        });
    }

    Ok(DocumentPlan {
        document: doc_path.to_path_buf(),
        links,
    })
}

/// Perform the moves of a plan, emitting one event per relocation attempt.
///
/// Links that repeat an already handled source, or whose source already is
/// the destination, do not touch the filesystem.
pub fn apply_plan(
    layout: &AttachmentLayout,
    plan: &DocumentPlan,
    sink: &dyn EventSink,
) -> Result<DocumentOutcome, MigrationError> {
    let mut outcome = DocumentOutcome::default();
    let mut handled: HashSet<&Path> = HashSet::new();

    for link in &plan.links {
        if link.source == link.destination || !handled.insert(link.source.as_path()) {
            continue;
        }

        match layout.relocate(&link.source, &link.destination)? {
            Relocation::Moved => {
                outcome.attachments_moved += 1;
                sink.notify(&MigrationEvent::AttachmentMoved {
                    from: link.source.clone(),
                    to: link.destination.clone(),
                });
            }
            Relocation::AlreadyPresent { identical } => {
                outcome.collisions += 1;
                sink.notify(&MigrationEvent::AttachmentCollision {
                    source: link.source.clone(),
                    destination: link.destination.clone(),
                    identical,
                });
            }
        }
    }

    Ok(outcome)
}

/// Replace each planned span with `label(new_target)`.
///
/// Returns the new text and whether it differs from `content`. `links` must
/// be sorted and non-overlapping, as produced by [`plan_document`].
pub fn splice(content: &str, links: &[PlannedLink]) -> (String, bool) {
    let mut output = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut changed = false;

    for link in links {
        let replacement = link.replacement();
        if replacement != content[link.span.clone()] {
            changed = true;
        }
        output.push_str(&content[cursor..link.span.start]);
        output.push_str(&replacement);
        cursor = link.span.end;
    }
    output.push_str(&content[cursor..]);

    (output, changed)
}

/// Number of planned links whose text would change
fn count_rewritten(content: &str, links: &[PlannedLink]) -> usize {
    links
        .iter()
        .filter(|link| link.replacement() != content[link.span.clone()])
        .count()
}

/// Express `destination` relative to `from_dir` with `/` separators.
///
/// Both paths must be absolute and free of `.`/`..` segments.
///
/// ```
/// use notemig::document::relative_link;
/// use std::path::Path;
///
/// assert_eq!(
///     relative_link(Path::new("/ws/attachments/notes/x/pic.png"), Path::new("/ws/notes")),
///     "../attachments/notes/x/pic.png"
/// );
/// ```
pub fn relative_link(destination: &Path, from_dir: &Path) -> String {
    let dest: Vec<Component> = destination.components().collect();
    let base: Vec<Component> = from_dir.components().collect();
    let common = dest
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); base.len() - common];
    parts.extend(
        dest[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Read, plan, relocate, splice and persist one document.
///
/// With `dry_run` nothing is moved or written; the returned outcome
/// describes what would change.
pub fn rewrite_document(
    adapter: &dyn DocFormatAdapter,
    layout: &AttachmentLayout,
    doc_path: &Path,
    sink: &dyn EventSink,
    dry_run: bool,
) -> Result<(DocumentPlan, DocumentOutcome), MigrationError> {
    let content = fs::read_to_string(doc_path).map_err(io_at(doc_path))?;
    let plan = plan_document(adapter, layout, doc_path, &content)?;
    if plan.is_empty() {
        return Ok((plan, DocumentOutcome::default()));
    }

    let mut outcome = if dry_run {
        DocumentOutcome::default()
    } else {
        apply_plan(layout, &plan, sink)?
    };

    let (new_content, changed) = splice(&content, &plan.links);
    outcome.updated = changed;
    outcome.links_rewritten = count_rewritten(&content, &plan.links);

    if changed && !dry_run {
        fs::write(doc_path, new_content).map_err(io_at(doc_path))?;
        sink.notify(&MigrationEvent::DocumentUpdated {
            path: doc_path.to_path_buf(),
            links: outcome.links_rewritten,
        });
    }

    Ok((plan, outcome))
}
