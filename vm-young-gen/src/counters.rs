//! Generation counters
//!
//! The generation owns no counter state. After every effective resize, every
//! swap and on demand it builds an immutable [`YoungGenSnapshot`] and hands it
//! to the installed [`CounterSink`].

use serde::Serialize;

use crate::bump_space::{BumpSpace, SpaceKind};
use crate::{GcError, GcResult};

/// Capacity and occupancy of one space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpaceSnapshot {
    pub kind: SpaceKind,
    pub bottom: usize,
    pub capacity_bytes: usize,
    pub used_bytes: usize,
}

impl SpaceSnapshot {
    pub fn of(kind: SpaceKind, space: &BumpSpace) -> Self {
        Self {
            kind,
            bottom: space.bottom(),
            capacity_bytes: space.capacity_in_bytes(),
            used_bytes: space.used_in_bytes(),
        }
    }
}

/// Point-in-time view of the whole generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YoungGenSnapshot {
    pub committed_bytes: usize,
    pub reserved_bytes: usize,
    pub min_size: usize,
    /// Ceiling reported to the sizing policy
    pub max_size: usize,
    pub gen_size_limit: usize,
    pub balloon_bytes: usize,
    pub capacity_policy: &'static str,
    pub eden: SpaceSnapshot,
    pub from: SpaceSnapshot,
    pub to: SpaceSnapshot,
}

impl YoungGenSnapshot {
    pub fn used_bytes(&self) -> usize {
        self.eden.used_bytes + self.from.used_bytes
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> GcResult<String> {
        serde_json::to_string(self)
            .map_err(|e| GcError::CounterEncoding(e.to_string()))
    }
}

/// Receiver of generation snapshots
pub trait CounterSink: Send + Sync {
    fn publish(&self, snapshot: &YoungGenSnapshot);
}

/// Sink writing each snapshot as JSON at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCounterSink;

impl CounterSink for LogCounterSink {
    fn publish(&self, snapshot: &YoungGenSnapshot) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        match snapshot.to_json() {
            Ok(json) => log::debug!("young gen counters: {json}"),
            Err(e) => log::warn!("cannot encode young gen counters: {e}"),
        }
    }
}
