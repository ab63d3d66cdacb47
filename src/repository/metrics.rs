//! Database Metrics
//!
//! Counters owned by one `DbState` and shared with whoever hosts it.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct DbMetrics {
    committed: AtomicU64,
    rolled_back: AtomicU64,
    conflicts: AtomicU64,
    timeouts: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub committed: u64,
    pub rolled_back: u64,
    pub conflicts: u64,
    pub timeouts: u64,
}

impl DbMetrics {
    pub fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback(&self) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, err: &DomainError) {
        match err {
            DomainError::ConcurrentModification(_) => {
                self.conflicts.fetch_add(1, Ordering::Relaxed);
            }
            DomainError::PersistenceTimeout(_) => {
                self.timeouts.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}
