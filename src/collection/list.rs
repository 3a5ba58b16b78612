//! Ordered, identity-deduplicated record list
//!
//! Holds the members of a collection in memory and implements the add,
//! remove, smart-update (`set`) and `reset` semantics. Every mutation is
//! announced on a broadcast channel; sends never block and are dropped when
//! nobody is subscribed.

use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast;

use super::events::{ClientId, CollectionEvent};
use super::record::Record;

/// Which parts of a smart update to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Append records whose id is not present yet
    pub add: bool,
    /// Drop members that are absent from the incoming data
    pub remove: bool,
    /// Replace attributes of members whose id is present
    pub merge: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            add: true,
            remove: true,
            merge: true,
        }
    }
}

impl SetOptions {
    /// Add new records and merge known ones, never remove
    pub fn keep_missing() -> Self {
        Self {
            remove: false,
            ..Default::default()
        }
    }
}

/// Outcome of a smart update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSummary {
    pub added: usize,
    pub merged: usize,
    pub removed: usize,
    pub reordered: bool,
}

impl SetSummary {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.merged == 0 && self.removed == 0 && !self.reordered
    }
}

#[derive(Debug, Clone)]
struct Entry<R> {
    cid: ClientId,
    record: R,
}

/// In-memory ordered container of records.
pub struct RecordList<R: Record> {
    entries: Vec<Entry<R>>,
    next_cid: u64,
    events: broadcast::Sender<CollectionEvent<R>>,
}

impl<R: Record> RecordList<R> {
    /// Create an empty list whose event channel buffers `event_capacity` events
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            entries: Vec::new(),
            next_cid: 1,
            events,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent<R>> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: CollectionEvent<R>) {
        // Err only means there are no subscribers right now
        let _ = self.events.send(event);
    }

    fn next_client_id(&mut self) -> ClientId {
        let cid = ClientId(self.next_cid);
        self.next_cid += 1;
        cid
    }

    fn position_of(&self, id: &R::Id) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.record.id().as_ref() == Some(id))
    }

    fn position_of_cid(&self, cid: ClientId) -> Option<usize> {
        self.entries.iter().position(|e| e.cid == cid)
    }

    fn push(&mut self, record: R, notify: bool) -> ClientId {
        let cid = self.next_client_id();
        let index = self.entries.len();
        if notify {
            self.emit(CollectionEvent::Added {
                cid,
                index,
                record: record.clone(),
            });
        }
        self.entries.push(Entry { cid, record });
        cid
    }

    /// Replace the attributes at `pos`; returns whether anything changed
    fn merge_at(&mut self, pos: usize, record: R) -> bool {
        let entry = &mut self.entries[pos];
        if entry.record == record {
            return false;
        }
        let previous = std::mem::replace(&mut entry.record, record.clone());
        let cid = entry.cid;
        self.emit(CollectionEvent::Changed {
            cid,
            previous,
            current: record,
        });
        true
    }

    fn remove_at(&mut self, index: usize) -> R {
        let entry = self.entries.remove(index);
        self.emit(CollectionEvent::Removed {
            cid: entry.cid,
            index,
            record: entry.record.clone(),
        });
        entry.record
    }

    /// Add a record, merging it into the existing member with the same id
    pub fn add(&mut self, record: R) -> ClientId {
        if let Some(pos) = record.id().and_then(|id| self.position_of(&id)) {
            let cid = self.entries[pos].cid;
            self.merge_at(pos, record);
            return cid;
        }
        self.push(record, true)
    }

    /// Remove the member with the given id
    pub fn remove(&mut self, id: &R::Id) -> Option<R> {
        let pos = self.position_of(id)?;
        Some(self.remove_at(pos))
    }

    /// Remove the member with the given client id
    pub fn remove_cid(&mut self, cid: ClientId) -> Option<R> {
        let pos = self.position_of_cid(cid)?;
        Some(self.remove_at(pos))
    }

    /// Smart update against a full or partial view of the remote data.
    ///
    /// Members missing from `records` are removed first, then known ids are
    /// merged and new ones appended. When both `add` and `remove` are set the
    /// final order follows `records`.
    pub fn set(&mut self, records: Vec<R>, options: SetOptions) -> SetSummary {
        let incoming = dedup_by_id(records);
        let mut summary = SetSummary::default();

        if options.remove {
            let wanted: HashSet<R::Id> = incoming.iter().filter_map(|r| r.id()).collect();
            for pos in (0..self.entries.len()).rev() {
                let keep = matches!(self.entries[pos].record.id(), Some(id) if wanted.contains(&id));
                if !keep {
                    self.remove_at(pos);
                    summary.removed += 1;
                }
            }
        }

        let mut order = Vec::with_capacity(incoming.len());
        let mut added = Vec::new();
        for record in incoming {
            match record.id().and_then(|id| self.position_of(&id)) {
                Some(pos) => {
                    order.push(self.entries[pos].cid);
                    if options.merge && self.merge_at(pos, record) {
                        summary.merged += 1;
                    }
                }
                None if options.add => {
                    let cid = self.push(record, false);
                    order.push(cid);
                    added.push(cid);
                    summary.added += 1;
                }
                None => {}
            }
        }

        if options.add && options.remove {
            let current: Vec<ClientId> = self.entries.iter().map(|e| e.cid).collect();
            if current != order {
                let rank: HashMap<ClientId, usize> =
                    order.iter().enumerate().map(|(i, cid)| (*cid, i)).collect();
                self.entries
                    .sort_by_key(|e| rank.get(&e.cid).copied().unwrap_or(usize::MAX));
                summary.reordered = true;
            }
        }

        // Added indices refer to final positions, so announce after ordering
        for cid in added {
            if let Some(index) = self.position_of_cid(cid) {
                self.emit(CollectionEvent::Added {
                    cid,
                    index,
                    record: self.entries[index].record.clone(),
                });
            }
        }
        if summary.reordered {
            self.emit(CollectionEvent::Sorted);
        }

        tracing::debug!(
            "set: +{} ~{} -{} (reordered: {})",
            summary.added,
            summary.merged,
            summary.removed,
            summary.reordered
        );
        summary
    }

    /// Replace all members, announcing a single `Reset`
    pub fn reset(&mut self, records: Vec<R>) {
        self.entries.clear();
        for record in dedup_by_id(records) {
            self.push(record, false);
        }
        self.emit(CollectionEvent::Reset {
            len: self.entries.len(),
        });
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.position_of(id).map(|pos| &self.entries[pos].record)
    }

    pub fn get_cid(&self, cid: ClientId) -> Option<&R> {
        self.position_of_cid(cid).map(|pos| &self.entries[pos].record)
    }

    /// Client id of the member with the given id
    pub fn cid_of(&self, id: &R::Id) -> Option<ClientId> {
        self.position_of(id).map(|pos| self.entries[pos].cid)
    }

    pub fn at(&self, index: usize) -> Option<&R> {
        self.entries.get(index).map(|e| &e.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Snapshot of all members in order
    pub fn records(&self) -> Vec<R> {
        self.iter().cloned().collect()
    }

    /// Ids of persisted members in order
    pub fn ids(&self) -> Vec<R::Id> {
        self.iter().filter_map(|r| r.id()).collect()
    }

    pub fn filter<F>(&self, mut predicate: F) -> Vec<R>
    where
        F: FnMut(&R) -> bool,
    {
        self.iter().filter(|r| predicate(r)).cloned().collect()
    }

    pub fn find<F>(&self, mut predicate: F) -> Option<&R>
    where
        F: FnMut(&R) -> bool,
    {
        self.iter().find(|r| predicate(r))
    }

    /// Raw JSON array of all members
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.iter().map(Record::to_raw).collect())
    }
}

/// Collapse duplicate ids: first occurrence keeps its position, last one
/// supplies the attributes.
fn dedup_by_id<R: Record>(records: Vec<R>) -> Vec<R> {
    let mut out: Vec<R> = Vec::with_capacity(records.len());
    let mut seen: HashMap<R::Id, usize> = HashMap::new();
    for record in records {
        if let Some(id) = record.id() {
            if let Some(&i) = seen.get(&id) {
                out[i] = record;
                continue;
            }
            seen.insert(id, out.len());
        }
        out.push(record);
    }
    out
}
