//! Bounded FIFO memory of the persona.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Most records a ring can hold.
pub const MAX_MEMORY_CAPACITY: usize = 50;

/// Default number of records kept.
pub const DEFAULT_MEMORY_CAPACITY: usize = MAX_MEMORY_CAPACITY;

/// One remembered item. The content is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub content: Value,
    pub recorded_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(content: impl Into<Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Fixed-capacity ring buffer; pushing past capacity evicts the oldest record.
#[derive(Debug, Clone)]
pub struct MemoryRing {
    records: VecDeque<MemoryRecord>,
    capacity: usize,
}

impl MemoryRing {
    /// The capacity is clamped into `1..=MAX_MEMORY_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_MEMORY_CAPACITY);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, returning the evicted one when the ring was full.
    pub fn push(&mut self, record: MemoryRecord) -> Option<MemoryRecord> {
        self.records.push_back(record);
        if self.records.len() > self.capacity {
            self.records.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryRecord> {
        self.records.iter()
    }

    pub fn oldest(&self) -> Option<&MemoryRecord> {
        self.records.front()
    }

    pub fn newest(&self) -> Option<&MemoryRecord> {
        self.records.back()
    }
}

impl Default for MemoryRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut ring = MemoryRing::default();
        for i in 1..=51 {
            let evicted = ring.push(MemoryRecord::new(json!(i)));
            if i <= 50 {
                assert!(evicted.is_none());
            } else {
                assert_eq!(evicted.unwrap().content, json!(1));
            }
        }
        assert_eq!(ring.len(), 50);
        assert_eq!(ring.oldest().unwrap().content, json!(2));
        assert_eq!(ring.newest().unwrap().content, json!(51));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut ring = MemoryRing::with_capacity(3);
        for word in ["a", "b", "c", "d", "e"] {
            ring.push(MemoryRecord::new(word));
        }
        let contents: Vec<&Value> = ring.iter().map(|r| &r.content).collect();
        assert_eq!(contents, vec![&json!("c"), &json!("d"), &json!("e")]);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut ring = MemoryRing::with_capacity(0);
        ring.push(MemoryRecord::new("x"));
        ring.push(MemoryRecord::new("y"));
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.newest().unwrap().content, json!("y"));
    }

    #[test]
    fn test_capacity_never_exceeds_fifty() {
        let mut ring = MemoryRing::with_capacity(500);
        assert_eq!(ring.capacity(), MAX_MEMORY_CAPACITY);
        for i in 0..200 {
            ring.push(MemoryRecord::new(json!(i)));
        }
        assert_eq!(ring.len(), 50);
        assert_eq!(ring.oldest().unwrap().content, json!(150));
    }
}
