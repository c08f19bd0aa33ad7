//! Notification subscribers and fan-out.
//!
//! Peers subscribe by identity through the local service.  When the user
//! pushes a `title:body` message, every subscriber that is still present in
//! the registry receives one `notify(from, title, body)` call; subscribers
//! whose device has vanished are pruned as a side effect.
//!
//! ```text
//!   "Dinner: ready at 7"
//!          │ parse (first ':' splits, both halves trimmed)
//!          ▼
//!   Notification { title: "Dinner", body: "ready at 7" }
//!          │ for id in subscribers.snapshot()
//!          ├─ no registry entry ──▶ unsubscribe(id)
//!          ├─ Board             ──▶ skipped (no notify member)
//!          └─ PC / Mobile       ──▶ notify(from, title, body)
//! ```

use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::registry::DeviceRegistry;
use crate::rpc::capability::Capability;

// ───────────────────────────────────────────────────────────────
// SubscriberSet
// ───────────────────────────────────────────────────────────────

/// Identities that asked for notifications.  Safe to mutate from remote
/// callbacks while the worker iterates a snapshot.
pub struct SubscriberSet {
    inner: Mutex<HashSet<String>>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashSet::new()),
        }
    }

    /// Returns `true` if `identity` was not already subscribed.
    pub fn subscribe(&self, identity: &str) -> bool {
        self.inner.lock().insert(identity.to_owned())
    }

    /// Returns `true` if `identity` was subscribed.
    pub fn unsubscribe(&self, identity: &str) -> bool {
        self.inner.lock().remove(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.inner.lock().contains(identity)
    }

    /// Point-in-time copy, ordered by identity.
    pub fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.inner.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Notification
// ───────────────────────────────────────────────────────────────

/// A parsed `title:body` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl FromStr for Notification {
    type Err = Error;

    /// Split on the first `':'`; later colons stay in the body.
    fn from_str(s: &str) -> Result<Self> {
        let (title, body) = s
            .split_once(':')
            .ok_or_else(|| Error::MalformedNotification(s.to_owned()))?;
        Ok(Self {
            title: title.trim().to_owned(),
            body: body.trim().to_owned(),
        })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

// ───────────────────────────────────────────────────────────────
// Fan-out
// ───────────────────────────────────────────────────────────────

/// What one fan-out pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    /// Subscribers that received the notification.
    pub delivered: Vec<String>,
    /// Subscribers whose `notify` call failed.
    pub failed: Vec<String>,
    /// Subscribers removed because their device is gone.
    pub pruned: Vec<String>,
    /// Present subscribers whose device type has no `notify` member.
    pub skipped: Vec<String>,
}

/// Deliver `message` from `from` to every live subscriber.
///
/// Missing-device pruning always runs.  If `message` lacks a `':'` no
/// remote call is made and [`Error::MalformedNotification`] is returned
/// after pruning.  A failed delivery is logged and the pass continues.
pub fn fan_out(
    subscribers: &SubscriberSet,
    registry: &DeviceRegistry,
    from: &str,
    message: &str,
) -> Result<FanOutReport> {
    let parsed = message.parse::<Notification>();
    let mut report = FanOutReport::default();

    for id in subscribers.snapshot() {
        let Some((record, handle)) = registry.lookup(&id) else {
            subscribers.unsubscribe(&id);
            debug!("Notify: pruned subscriber {} (device gone)", id);
            report.pruned.push(id);
            continue;
        };
        let Ok(note) = &parsed else {
            continue;
        };
        match Capability::resolve(record.device_type, handle.proxy()).notify(
            from,
            &note.title,
            &note.body,
        ) {
            Some(Ok(())) => report.delivered.push(id),
            Some(Err(e)) => {
                warn!("Notify: cannot notify {}: {}", id, e);
                report.failed.push(id);
            }
            None => {
                debug!("Notify: {} is a {}, skipping", id, record.device_type);
                report.skipped.push(id);
            }
        }
    }

    let note = parsed?;
    info!(
        "Notify: \"{}\" delivered to {} subscriber(s), {} failed, {} pruned",
        note.title,
        report.delivered.len(),
        report.failed.len(),
        report.pruned.len()
    );
    Ok(report)
}
