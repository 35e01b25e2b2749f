//! Markdown link discovery, attachment relocation and link rewriting
//!
//! The pipeline for one document is: scan links with an adapter, classify
//! each target, plan destinations under the attachments tree, move the
//! files, then splice the new relative targets into the text.

mod adapter;
mod assets;
mod relocate;
mod rewrite;

pub use adapter::{DocFormatAdapter, LinkRef, MarkdownAdapter};
pub use assets::{content_hash, is_external, resolve_target, Resolution};
pub use relocate::{AttachmentLayout, Relocation, ATTACHMENTS_DIR};
pub use rewrite::{
    apply_plan, plan_document, relative_link, rewrite_document, splice, DocumentOutcome,
    DocumentPlan, PlannedLink,
};
