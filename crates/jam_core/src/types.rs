use std::fmt;

/// Record identifier. Unique across a whole collection and doubling as the
/// record's 1-based position for page window membership.
pub type RecordId = u64;

/// Opaque identifier the backend hands out for a deferred mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First two `-` separated segments, enough to tell tasks apart on screen.
    pub fn short(&self) -> String {
        self.0.split('-').take(2).collect::<Vec<_>>().join("-")
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMeta {
    pub id: CollectionId,
    pub name: String,
}

/// The slice of record positions the table currently renders: `(offset, offset + page_size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub page_size: u64,
}

impl PageWindow {
    pub fn new(offset: u64, page_size: u64) -> Self {
        Self { offset, page_size }
    }

    pub fn contains(&self, id: RecordId) -> bool {
        id > self.offset && id <= self.offset.saturating_add(self.page_size)
    }
}

/// Key of one cached page in the page cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub collection_id: CollectionId,
    pub offset: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: RecordId,
    pub name: String,
    pub liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub key: CacheKey,
    pub total: u64,
    pub rows: Vec<RecordRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Add,
    Remove,
}

impl MutationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationAction::Add => "add",
            MutationAction::Remove => "remove",
        }
    }
}

/// Which bulk request a response belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Modify(MutationAction),
    SelectAll {
        source: CollectionId,
        target: CollectionId,
    },
    ClearCollection(CollectionId),
}

/// Backend answer to a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Completed,
    InProgress(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageWindow, TaskId};

    #[test]
    fn window_is_open_at_offset_and_closed_at_end() {
        let window = PageWindow::new(25, 25);
        assert!(!window.contains(25));
        assert!(window.contains(26));
        assert!(window.contains(50));
        assert!(!window.contains(51));
    }

    #[test]
    fn window_end_saturates() {
        let window = PageWindow::new(u64::MAX - 1, 25);
        assert!(window.contains(u64::MAX));
        assert!(!window.contains(0));
    }

    #[test]
    fn short_task_id_keeps_two_segments() {
        let id = TaskId::new("3f2a9c1e-77b0-4c11-9d1e-000000000000");
        assert_eq!(id.short(), "3f2a9c1e-77b0");
        assert_eq!(TaskId::new("plain").short(), "plain");
    }
}
