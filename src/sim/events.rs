//! Deferred race effects
//!
//! Trick outcomes and icon clearing happen a fixed delay after they are
//! scheduled. Entries are keyed by the host clock (ms) and drained at the
//! start of each frame, so the engine never needs a real timer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::roster::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredEvent {
    /// Reveal whether an attempted trick landed
    ResolveTrick { agent: AgentId },
    /// Remove an icon, unless it has since been replaced
    ClearIcon { agent: AgentId, token: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_ms: f64,
    seq: u64,
    event: DeferredEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest entry first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of deferred events ordered by due time, then insertion
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, event: DeferredEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due_ms, seq, event });
    }

    /// Pop the earliest event due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<DeferredEvent> {
        if self.heap.peek()?.due_ms <= now_ms {
            self.heap.pop().map(|e| e.event)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop everything still pending
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_due_order() {
        let mut q = EventQueue::new();
        q.schedule(300.0, DeferredEvent::ResolveTrick { agent: 3 });
        q.schedule(100.0, DeferredEvent::ResolveTrick { agent: 1 });
        q.schedule(200.0, DeferredEvent::ResolveTrick { agent: 2 });

        assert_eq!(q.pop_due(50.0), None);
        assert_eq!(q.pop_due(250.0), Some(DeferredEvent::ResolveTrick { agent: 1 }));
        assert_eq!(q.pop_due(250.0), Some(DeferredEvent::ResolveTrick { agent: 2 }));
        assert_eq!(q.pop_due(250.0), None);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut q = EventQueue::new();
        q.schedule(100.0, DeferredEvent::ClearIcon { agent: 2, token: 7 });
        q.schedule(100.0, DeferredEvent::ResolveTrick { agent: 1 });

        assert_eq!(q.pop_due(100.0), Some(DeferredEvent::ClearIcon { agent: 2, token: 7 }));
        assert_eq!(q.pop_due(100.0), Some(DeferredEvent::ResolveTrick { agent: 1 }));
    }

    #[test]
    fn test_clear() {
        let mut q = EventQueue::new();
        q.schedule(1.0, DeferredEvent::ResolveTrick { agent: 1 });
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop_due(f64::MAX), None);
    }
}
