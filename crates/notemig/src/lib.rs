//! Note workspace migration library
//!
//! Moves files linked from Markdown notes into a per-note directory under
//! `<root>/attachments/` and rewrites the links to match. The binary is a
//! thin layer over [`migrate::migrate_workspace`].

pub mod backup;
pub mod cli;
pub mod document;
pub mod errors;
pub mod events;
pub mod messages;
pub mod migrate;
pub mod output;
pub mod workspace;

// Re-export commonly used types
pub use errors::{ActionableError, MigrationError};
pub use events::{EventSink, MigrationEvent, NullSink, RecordingSink};
pub use migrate::{migrate_workspace, MigrateOptions, MigrationReport};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use workspace::validate_root;
