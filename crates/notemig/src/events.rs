//! Migration events and the sinks that receive them.
//!
//! The library never prints. Everything a user should see is emitted as a
//! [`MigrationEvent`] to an [`EventSink`] supplied by the caller.

use serde::Serialize;
use std::cell::RefCell;
use std::path::PathBuf;

/// Something user-visible that happened during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MigrationEvent {
    BackupCreated {
        path: PathBuf,
        files: usize,
    },
    DocumentsFound {
        count: usize,
    },
    AttachmentMoved {
        from: PathBuf,
        to: PathBuf,
    },
    /// Destination already existed; the source was left in place.
    ///
    /// `identical` is false when the two files differ, i.e. a real
    /// collision between distinct files sharing a leaf name.
    AttachmentCollision {
        source: PathBuf,
        destination: PathBuf,
        identical: bool,
    },
    DocumentUpdated {
        path: PathBuf,
        links: usize,
    },
    /// Enumerated document no longer exists (an earlier document relocated it)
    DocumentVanished {
        path: PathBuf,
    },
    VscodeRetired {
        from: PathBuf,
        to: PathBuf,
    },
}

/// Receiver for migration events
pub trait EventSink {
    fn notify(&self, event: &MigrationEvent);
}

/// Discards every event
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &MigrationEvent) {}
}

/// Keeps every event in order, for inspection after a run
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<MigrationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MigrationEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&MigrationEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &MigrationEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.notify(&MigrationEvent::DocumentsFound { count: 2 });
        sink.notify(&MigrationEvent::DocumentVanished {
            path: PathBuf::from("/ws/a.md"),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], MigrationEvent::DocumentsFound { count: 2 });
        assert_eq!(
            sink.count(|e| matches!(e, MigrationEvent::DocumentVanished { .. })),
            1
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(MigrationEvent::DocumentUpdated {
            path: PathBuf::from("/ws/a.md"),
            links: 3,
        })
        .unwrap();

        assert_eq!(json["event"], "document_updated");
        assert_eq!(json["links"], 3);
    }
}
