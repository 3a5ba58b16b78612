//! Change notifications emitted by collections

use std::fmt;

/// Process-local identity of a collection member.
///
/// Assigned when a record enters a list and stable while it stays there,
/// independent of whether the record has a server id yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub(crate) u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A change to a collection, delivered to every subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent<R> {
    /// A record was appended or inserted at `index`
    Added { cid: ClientId, index: usize, record: R },
    /// A record was removed from `index`
    Removed { cid: ClientId, index: usize, record: R },
    /// An existing member's attributes were replaced by a merge
    Changed { cid: ClientId, previous: R, current: R },
    /// Member order changed to follow the incoming data
    Sorted,
    /// Contents were replaced wholesale
    Reset { len: usize },
    /// A fetch has been sent
    Request { url: String },
    /// A fetch completed and was applied
    Synced { len: usize },
    /// A fetch failed; contents are unchanged
    Error { message: String },
}

impl<R> CollectionEvent<R> {
    /// Short event name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            CollectionEvent::Added { .. } => "add",
            CollectionEvent::Removed { .. } => "remove",
            CollectionEvent::Changed { .. } => "change",
            CollectionEvent::Sorted => "sort",
            CollectionEvent::Reset { .. } => "reset",
            CollectionEvent::Request { .. } => "request",
            CollectionEvent::Synced { .. } => "sync",
            CollectionEvent::Error { .. } => "error",
        }
    }
}
