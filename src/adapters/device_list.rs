//! In-memory device list adapter.
//!
//! Implements [`DeviceView`] as a plain ordered list with a highlighted
//! row, the shape a list widget keeps behind its rows.

use parking_lot::RwLock;

use crate::app::ports::DeviceView;
use crate::device::DeviceRecord;

#[derive(Default)]
struct ListState {
    rows: Vec<DeviceRecord>,
    highlighted: Option<String>,
}

/// A device list shown to the user.
pub struct DeviceList {
    state: RwLock<ListState>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ListState::default()),
        }
    }

    /// Highlight the row with `identity`.  `false` if no such row.
    pub fn highlight(&self, identity: &str) -> bool {
        let mut state = self.state.write();
        if state.rows.iter().any(|r| r.identity == identity) {
            state.highlighted = Some(identity.to_owned());
            true
        } else {
            false
        }
    }

    /// Rows in display order.
    pub fn rows(&self) -> Vec<DeviceRecord> {
        self.state.read().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeviceList {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceView for DeviceList {
    fn add(&self, record: &DeviceRecord) {
        let mut state = self.state.write();
        if !state.rows.contains(record) {
            state.rows.push(record.clone());
        }
    }

    fn remove(&self, record: &DeviceRecord) {
        let mut state = self.state.write();
        state.rows.retain(|r| r != record);
        if state.highlighted.as_deref() == Some(record.identity.as_str())
            && !state.rows.iter().any(|r| r.identity == record.identity)
        {
            state.highlighted = None;
        }
    }

    fn add_all(&self, records: &[DeviceRecord]) {
        for r in records {
            self.add(r);
        }
    }

    fn find_by_identity(&self, identity: &str) -> Option<DeviceRecord> {
        self.state
            .read()
            .rows
            .iter()
            .find(|r| r.identity == identity)
            .cloned()
    }

    fn selected_item(&self) -> Option<DeviceRecord> {
        let state = self.state.read();
        let id = state.highlighted.as_ref()?;
        state.rows.iter().find(|r| &r.identity == id).cloned()
    }
}
