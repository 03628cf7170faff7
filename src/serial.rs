//! Prefix-scoped serial numbers (`AO-C-000001`, `AO-B-000042`, ...).

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Result, WorkflowError};
use crate::store::{Document, Persistence};

/// Zero-padding width of the numeric part.
pub const SERIAL_WIDTH: usize = 6;

pub fn format_serial(prefix: &str, value: u64) -> String {
    format!("{prefix}-{value:0width$}", width = SERIAL_WIDTH)
}

/// Mints serial numbers from counters kept in the shared document.
#[derive(Clone)]
pub struct SerialAllocator {
    store: Arc<Persistence>,
}

impl SerialAllocator {
    pub fn new(store: Arc<Persistence>) -> Self {
        Self { store }
    }

    /// Issue the next number for `prefix`. Concurrent callers never share or
    /// skip a value.
    pub fn next_serial(&self, prefix: &str) -> Result<String> {
        let prefix = validate_prefix(prefix)?;
        self.store.update(|doc| allocate(doc, prefix))
    }

    /// The last issued number for `prefix`, without issuing a new one.
    pub fn peek_serial(&self, prefix: &str) -> Result<String> {
        let prefix = validate_prefix(prefix)?;
        let doc = self.store.read()?;
        let current = doc.counters.get(prefix).copied().unwrap_or(0);
        Ok(format_serial(prefix, current))
    }

    /// Administrative override: set the counter for `prefix` to `value`.
    ///
    /// The next [`next_serial`](Self::next_serial) returns `value + 1`. This
    /// does NOT check that `value` is above the previous counter; moving it
    /// backwards will re-issue numbers that were already handed out.
    pub fn reset_counter(&self, prefix: &str, value: u64) -> Result<u64> {
        let prefix = validate_prefix(prefix)?;
        self.store.update(|doc| {
            let previous = doc.counters.insert(prefix.to_string(), value).unwrap_or(0);
            if value < previous {
                warn!(prefix, previous, value, "counter moved backwards");
            } else {
                info!(prefix, previous, value, "counter reset");
            }
            Ok(value)
        })
    }
}

/// Increment the counter for `prefix` inside an open document update.
///
/// A counter already at `u64::MAX` is exhausted; wrapping would re-issue
/// numbers that were handed out before.
pub(crate) fn allocate(doc: &mut Document, prefix: &str) -> Result<String> {
    let counter = doc.counters.entry(prefix.to_string()).or_insert(0);
    *counter = counter
        .checked_add(1)
        .ok_or_else(|| WorkflowError::Validation(format!("counter for {prefix} exhausted")))?;
    Ok(format_serial(prefix, *counter))
}

fn validate_prefix(prefix: &str) -> Result<&str> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(WorkflowError::Validation("serial prefix is required".into()));
    }
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::store::MemoryStore;

    fn allocator() -> SerialAllocator {
        SerialAllocator::new(Arc::new(Persistence::new(MemoryStore::default())))
    }

    #[test]
    fn formats_with_six_digits() {
        assert_eq!(format_serial("AO-C", 1), "AO-C-000001");
        assert_eq!(format_serial("AO-B", 1234567), "AO-B-1234567");
    }

    #[test]
    fn sequential_calls_are_consecutive() {
        let alloc = allocator();
        let issued: Vec<String> = (0..100).map(|_| alloc.next_serial("AO-C").unwrap()).collect();
        let expected: Vec<String> = (1..=100).map(|n| format_serial("AO-C", n)).collect();
        assert_eq!(issued, expected);
    }

    #[test]
    fn concurrent_calls_never_collide_or_skip() {
        let alloc = allocator();
        let issued: BTreeSet<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let alloc = alloc.clone();
                    s.spawn(move || {
                        (0..10)
                            .map(|_| alloc.next_serial("AO-C").unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let expected: BTreeSet<String> = (1..=100).map(|n| format_serial("AO-C", n)).collect();
        assert_eq!(issued, expected);
        assert_eq!(alloc.peek_serial("AO-C").unwrap(), "AO-C-000100");
    }

    #[test]
    fn prefixes_are_independent() {
        let alloc = allocator();
        alloc.next_serial("AO-C").unwrap();
        alloc.next_serial("AO-C").unwrap();
        assert_eq!(alloc.next_serial("AO-B").unwrap(), "AO-B-000001");
    }

    #[test]
    fn peek_has_no_side_effect() {
        let alloc = allocator();
        assert_eq!(alloc.peek_serial("AO-C").unwrap(), "AO-C-000000");
        alloc.next_serial("AO-C").unwrap();
        assert_eq!(alloc.peek_serial("AO-C").unwrap(), "AO-C-000001");
        assert_eq!(alloc.peek_serial("AO-C").unwrap(), "AO-C-000001");
        assert_eq!(alloc.next_serial("AO-C").unwrap(), "AO-C-000002");
    }

    #[test]
    fn reset_then_next_continues_from_value() {
        let alloc = allocator();
        assert_eq!(alloc.reset_counter("AO-C", 500).unwrap(), 500);
        assert_eq!(alloc.next_serial("AO-C").unwrap(), "AO-C-000501");
    }

    #[test]
    fn reset_may_move_backwards() {
        let alloc = allocator();
        alloc.reset_counter("AO-C", 10).unwrap();
        alloc.reset_counter("AO-C", 2).unwrap();
        assert_eq!(alloc.next_serial("AO-C").unwrap(), "AO-C-000003");
    }

    #[test]
    fn exhausted_counter_fails_without_wrapping() {
        let alloc = allocator();
        alloc.reset_counter("AO-C", u64::MAX).unwrap();

        let err = alloc.next_serial("AO-C").unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ref msg) if msg.contains("AO-C")));
        assert_eq!(alloc.peek_serial("AO-C").unwrap(), format_serial("AO-C", u64::MAX));
        assert_eq!(alloc.next_serial("AO-B").unwrap(), "AO-B-000001");
    }

    #[test]
    fn blank_prefix_is_rejected() {
        let alloc = allocator();
        assert!(matches!(
            alloc.next_serial("  "),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            alloc.peek_serial(""),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            alloc.reset_counter("", 1),
            Err(WorkflowError::Validation(_))
        ));
    }
}
