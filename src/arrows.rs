//! Bounded ring of message-flow events shared between the simulation and the
//! render loop.
//!
//! The producer never blocks: once the ring is full, every push overwrites the
//! oldest pending event. Reading does not consume anything, so the render loop
//! draws a sliding window of the most recent hops every frame.

use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

/// One message hop between two nodes. Node ids are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrowEvent {
    pub from_node: usize,
    pub to_node: usize,
    pub direction: Direction,
}

impl ArrowEvent {
    pub fn new(from_node: usize, to_node: usize, direction: Direction) -> Self {
        Self {
            from_node,
            to_node,
            direction,
        }
    }
}

/// Fixed-capacity circular buffer. `head` points at the oldest valid entry and
/// `len` entries follow it, wrapping modulo the capacity.
#[derive(Debug)]
pub struct ArrowRing {
    slots: Box<[Option<ArrowEvent>]>,
    head: usize,
    len: usize,
}

impl ArrowRing {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index one past the newest entry.
    pub fn tail(&self) -> usize {
        (self.head + self.len) % self.capacity()
    }

    pub fn push(&mut self, event: ArrowEvent) {
        let tail = self.tail();
        self.slots[tail] = Some(event);
        if self.len == self.capacity() {
            self.head = (self.head + 1) % self.capacity();
        } else {
            self.len += 1;
        }
    }

    /// Pending events from oldest to newest. Restartable; does not consume.
    pub fn iter(&self) -> impl Iterator<Item = ArrowEvent> + '_ {
        (0..self.len).filter_map(move |offset| self.slots[(self.head + offset) % self.capacity()])
    }
}

/// Cloneable handle to a ring guarded by a mutex. The lock is held only for
/// the index update on push and for the copy on snapshot.
#[derive(Clone, Debug)]
pub struct ArrowQueue {
    ring: Arc<Mutex<ArrowRing>>,
}

impl ArrowQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(ArrowRing::with_capacity(capacity))),
        }
    }

    pub fn push(&self, event: ArrowEvent) {
        self.ring.lock().push(event);
    }

    pub fn snapshot(&self) -> Vec<ArrowEvent> {
        let ring = self.ring.lock();
        if ring.is_empty() {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(ring.len());
        events.extend(ring.iter());
        events
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn hop(from: usize, to: usize) -> ArrowEvent {
        ArrowEvent::new(from, to, Direction::Send)
    }

    #[test]
    fn empty_ring_yields_nothing() {
        let ring = ArrowRing::with_capacity(4);
        assert!(ring.is_empty());
        assert_eq!(ring.iter().count(), 0);
    }

    #[test]
    fn fresh_queue_snapshot_is_empty() {
        let queue = ArrowQueue::new(8);
        assert!(queue.snapshot().is_empty());
        queue.push(hop(1, 2));
        assert_eq!(queue.snapshot(), vec![hop(1, 2)]);
    }

    #[test]
    fn under_capacity_keeps_push_order() {
        let mut ring = ArrowRing::with_capacity(32);
        for i in 1..=5 {
            ring.push(hop(i, i + 1));
        }
        let events = ring.iter().collect::<Vec<_>>();
        assert_eq!(events.len(), 5);
        assert_eq!(events.first(), Some(&hop(1, 2)));
        assert_eq!(events.last(), Some(&hop(5, 6)));
    }

    #[test]
    fn exactly_full_ring_keeps_everything() {
        let mut ring = ArrowRing::with_capacity(4);
        for i in 0..4 {
            ring.push(hop(i + 1, i + 2));
        }
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.iter().next(), Some(hop(1, 2)));
    }

    #[test]
    fn overflow_drops_oldest() {
        let capacity = 32;
        let mut ring = ArrowRing::with_capacity(capacity);
        for i in 0..=capacity {
            ring.push(hop(i + 1, i + 2));
        }
        let events = ring.iter().collect::<Vec<_>>();
        assert_eq!(events.len(), capacity);
        assert_eq!(events[0], hop(2, 3));
        assert_eq!(events[capacity - 1], hop(capacity + 1, capacity + 2));
    }

    #[test]
    fn iteration_is_restartable() {
        let mut ring = ArrowRing::with_capacity(3);
        ring.push(hop(1, 2));
        ring.push(hop(2, 3));
        let first = ring.iter().collect::<Vec<_>>();
        let second = ring.iter().collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn tail_wraps_modulo_capacity() {
        let mut ring = ArrowRing::with_capacity(3);
        for i in 0..5 {
            ring.push(hop(i + 1, i + 2));
        }
        assert_eq!(ring.tail(), 2);
        assert_eq!(
            ring.iter().collect::<Vec<_>>(),
            vec![hop(3, 4), hop(4, 5), hop(5, 6)]
        );
    }

    #[test]
    fn send_and_receive_scenario() {
        let queue = ArrowQueue::new(32);
        queue.push(ArrowEvent::new(1, 2, Direction::Send));
        queue.push(ArrowEvent::new(2, 3, Direction::Receive));
        assert_eq!(
            queue.snapshot(),
            vec![
                ArrowEvent::new(1, 2, Direction::Send),
                ArrowEvent::new(2, 3, Direction::Receive),
            ]
        );
        // snapshots do not drain
        assert_eq!(queue.snapshot().len(), 2);
    }

    #[test]
    fn concurrent_producer_never_exceeds_capacity() {
        let queue = ArrowQueue::new(8);
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..10_000 {
                    queue.push(hop(i % 7 + 1, i % 5 + 1));
                }
            })
        };
        for _ in 0..1_000 {
            assert!(queue.snapshot().len() <= 8);
        }
        producer.join().expect("producer thread");
        assert_eq!(queue.snapshot().len(), queue.capacity());
    }
}
