//! Device registry: discovered peers keyed by identity, plus the selection.
//!
//! Readers (UI, notification fan-out) and the single writer (the dispatcher
//! worker) share one [`DeviceRegistry`] behind an `Arc`.  A `parking_lot`
//! read-write lock keeps the map and the selection consistent with each
//! other, so a selected identity always names a present entry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::device::{DeviceRecord, RemoteHandle};

struct Entry {
    record: DeviceRecord,
    handle: RemoteHandle,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    selected: Option<String>,
}

/// Concurrent map from identity to `(DeviceRecord, RemoteHandle)`.
pub struct DeviceRegistry {
    inner: RwLock<Inner>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Insert or replace.  Last write wins; returns the displaced record.
    pub fn insert(&self, record: DeviceRecord, handle: RemoteHandle) -> Option<DeviceRecord> {
        let mut inner = self.inner.write();
        inner
            .entries
            .insert(record.identity.clone(), Entry { record, handle })
            .map(|old| old.record)
    }

    /// Remove by record identity.  Clears the selection if it pointed here.
    pub fn remove(&self, record: &DeviceRecord) -> Option<RemoteHandle> {
        let mut inner = self.inner.write();
        let removed = inner.entries.remove(&record.identity)?;
        if inner.selected.as_deref() == Some(record.identity.as_str()) {
            inner.selected = None;
        }
        Some(removed.handle)
    }

    /// Remove the entry whose handle is the very same proxy as `handle`.
    ///
    /// Returns the removed record, or `None` if no entry holds that proxy.
    pub fn remove_by_handle(&self, handle: &RemoteHandle) -> Option<DeviceRecord> {
        let mut inner = self.inner.write();
        let identity = inner
            .entries
            .iter()
            .find(|(_, e)| e.handle.same_as(handle))
            .map(|(id, _)| id.clone())?;
        let removed = inner.entries.remove(&identity)?;
        if inner.selected.as_deref() == Some(identity.as_str()) {
            inner.selected = None;
        }
        Some(removed.record)
    }

    pub fn find_by_identity(&self, identity: &str) -> Option<DeviceRecord> {
        self.inner
            .read()
            .entries
            .get(identity)
            .map(|e| e.record.clone())
    }

    /// Handle of the entry with `identity`.
    pub fn handle_of(&self, identity: &str) -> Option<RemoteHandle> {
        self.inner
            .read()
            .entries
            .get(identity)
            .map(|e| e.handle.clone())
    }

    /// Record and handle of the entry with `identity`, read under one lock.
    pub fn lookup(&self, identity: &str) -> Option<(DeviceRecord, RemoteHandle)> {
        self.inner
            .read()
            .entries
            .get(identity)
            .map(|e| (e.record.clone(), e.handle.clone()))
    }

    /// Mark `record` as the command target.
    ///
    /// Returns `false` (and leaves the selection unchanged) if the record is
    /// not present.
    pub fn set_selected(&self, record: &DeviceRecord) -> bool {
        let mut inner = self.inner.write();
        if !inner.entries.contains_key(&record.identity) {
            return false;
        }
        inner.selected = Some(record.identity.clone());
        true
    }

    pub fn clear_selection(&self) {
        self.inner.write().selected = None;
    }

    /// The selected record and its handle.
    pub fn selected(&self) -> Option<(DeviceRecord, RemoteHandle)> {
        let inner = self.inner.read();
        let id = inner.selected.as_ref()?;
        inner
            .entries
            .get(id)
            .map(|e| (e.record.clone(), e.handle.clone()))
    }

    /// Snapshot of every record, ordered by identity.
    pub fn records(&self) -> Vec<DeviceRecord> {
        let mut out: Vec<_> = self
            .inner
            .read()
            .entries
            .values()
            .map(|e| e.record.clone())
            .collect();
        out.sort_by(|a, b| a.identity.cmp(&b.identity));
        out
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
