//! Expiration Queue Module
//!
//! Keeps tracked keys in first-insertion order so the sweep can find the
//! oldest key without scanning the store.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::cache::QueueNode;

// == Expiration Queue ==
/// Arrival-ordered queue of per-key markers.
///
/// Nodes are stored in a VecDeque where:
/// - Front = Most recently inserted key
/// - Back = Oldest inserted key
///
/// A key is pushed exactly once, when it is first inserted. Later appends to
/// the same key never move its node.
#[derive(Debug)]
pub struct ExpirationQueue<K> {
    /// Nodes by first-insertion time
    nodes: VecDeque<QueueNode<K>>,
}

impl<K> ExpirationQueue<K> {
    // == Constructor ==
    /// Creates a new empty expiration queue.
    pub fn new() -> Self {
        Self {
            nodes: VecDeque::new(),
        }
    }

    // == Push Front ==
    /// Records a newly inserted key as the most recent arrival.
    pub fn push_front(&mut self, key: K, timestamp: DateTime<Utc>) {
        self.nodes.push_front(QueueNode::new(key, timestamp));
    }

    // == Peek Oldest ==
    /// Returns the oldest node without removing it.
    pub fn peek_oldest(&self) -> Option<&QueueNode<K>> {
        self.nodes.back()
    }

    // == Pop Oldest ==
    /// Removes and returns the oldest node.
    ///
    /// Returns None if the queue is empty.
    pub fn pop_oldest(&mut self) -> Option<QueueNode<K>> {
        self.nodes.pop_back()
    }

    // == Length ==
    /// Returns the number of tracked nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<K> Default for ExpirationQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_queue_new() {
        let queue: ExpirationQueue<&str> = ExpirationQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.peek_oldest().is_none());
    }

    #[test]
    fn test_queue_oldest_is_first_pushed() {
        let start = Utc::now();
        let mut queue = ExpirationQueue::new();

        queue.push_front("key1", start);
        queue.push_front("key2", start + Duration::milliseconds(1));
        queue.push_front("key3", start + Duration::milliseconds(2));

        assert_eq!(queue.len(), 3);
        let oldest = queue.peek_oldest().unwrap();
        assert_eq!(oldest.key, "key1");
        assert_eq!(oldest.timestamp, start);
    }

    #[test]
    fn test_queue_pop_oldest_order() {
        let start = Utc::now();
        let mut queue = ExpirationQueue::new();

        queue.push_front("a", start);
        queue.push_front("b", start);
        queue.push_front("c", start);

        assert_eq!(queue.pop_oldest().map(|n| n.key), Some("a"));
        assert_eq!(queue.pop_oldest().map(|n| n.key), Some("b"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_oldest().map(|n| n.key), Some("c"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_pop_empty() {
        let mut queue: ExpirationQueue<u32> = ExpirationQueue::default();
        assert_eq!(queue.pop_oldest(), None);
    }

    #[test]
    fn test_queue_keeps_insertion_order_not_timestamp_order() {
        // Backdated first timestamps are not reordered; the back stays the
        // first key pushed.
        let start = Utc::now();
        let mut queue = ExpirationQueue::new();

        queue.push_front("late", start + Duration::seconds(5));
        queue.push_front("early", start);

        assert_eq!(queue.peek_oldest().map(|n| n.key), Some("late"));
    }
}
