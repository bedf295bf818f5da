//! Operation history.
//!
//! The engine never records anything itself. Callers that want a history
//! wrap an operation with [`timed`] and hand it an [`OperationRecorder`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;

/// Default number of entries kept by [`MemoryHistory`]
pub const DEFAULT_CAPACITY: usize = 100;

/// Kind of recorded operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Compression
    Compress,
    /// Decompression
    Decompress,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Compress => write!(f, "Compress"),
            OperationKind::Decompress => write!(f, "Decompress"),
        }
    }
}

/// Sink for completed operations
pub trait OperationRecorder: Send + Sync {
    /// Record one successful operation
    fn record_operation(&self, kind: OperationKind, before: usize, after: usize, elapsed: Duration);
}

/// Recorder that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl OperationRecorder for NoopRecorder {
    fn record_operation(&self, _: OperationKind, _: usize, _: usize, _: Duration) {}
}

/// One history line
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// When the operation finished
    pub timestamp: DateTime<Local>,
    /// Operation kind
    pub kind: OperationKind,
    /// Input size in bytes
    pub before: usize,
    /// Output size in bytes
    pub after: usize,
    /// Wall time
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl HistoryEntry {
    /// `after / before` (0.0 for empty input)
    pub fn ratio(&self) -> f64 {
        if self.before == 0 {
            return 0.0;
        }
        self.after as f64 / self.before as f64
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} -> {} bytes (ratio {:.2}) in {} ms",
            self.timestamp.format("%d.%m.%y %H:%M"),
            self.kind,
            self.before,
            self.after,
            self.ratio(),
            self.elapsed.as_millis()
        )
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Bounded in-memory history, newest first
#[derive(Debug)]
pub struct MemoryHistory {
    capacity: usize,
    entries: RwLock<VecDeque<HistoryEntry>>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemoryHistory {
    /// Create a history keeping at most `capacity` entries (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot, newest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl OperationRecorder for MemoryHistory {
    fn record_operation(&self, kind: OperationKind, before: usize, after: usize, elapsed: Duration) {
        let entry = HistoryEntry {
            timestamp: Local::now(),
            kind,
            before,
            after,
            elapsed,
        };

        if let Ok(mut entries) = self.entries.write() {
            entries.push_front(entry);
            entries.truncate(self.capacity);
        }
    }
}

/// Run `op`, recording its output size and duration if it succeeds
pub fn timed<F>(recorder: &dyn OperationRecorder, kind: OperationKind, before: usize, op: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    let start = Instant::now();
    let output = op()?;
    recorder.record_operation(kind, before, output.len(), start.elapsed());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqzError;

    #[test]
    fn test_newest_first_and_bounded() {
        let history = MemoryHistory::new(3);
        for i in 1..=5 {
            history.record_operation(OperationKind::Compress, i * 10, i, Duration::from_millis(1));
        }

        let entries = history.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].before, 50);
        assert_eq!(entries[2].before, 30);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_display_line() {
        let entry = HistoryEntry {
            timestamp: Local::now(),
            kind: OperationKind::Compress,
            before: 120,
            after: 48,
            elapsed: Duration::from_millis(3),
        };

        let line = entry.to_string();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Compress: 120 -> 48 bytes (ratio 0.40) in 3 ms"));
    }

    #[test]
    fn test_ratio_of_empty_input() {
        let entry = HistoryEntry {
            timestamp: Local::now(),
            kind: OperationKind::Decompress,
            before: 0,
            after: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(entry.ratio(), 0.0);
    }

    #[test]
    fn test_timed_records_only_success() {
        let history = MemoryHistory::default();

        let out = timed(&history, OperationKind::Decompress, 4, || Ok("hello".to_string())).unwrap();
        assert_eq!(out, "hello");
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].after, 5);

        let err = timed(&history, OperationKind::Decompress, 4, || {
            Err(SqzError::Format("bad".into()))
        });
        assert!(err.is_err());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_noop_recorder() {
        let out = timed(&NoopRecorder, OperationKind::Compress, 1, || Ok("x".into())).unwrap();
        assert_eq!(out, "x");
    }
}
