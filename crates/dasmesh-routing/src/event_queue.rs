//! Discrete-event queue driven by a logical clock

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An event waiting for its delivery time
#[derive(Debug, Clone)]
pub struct ScheduledEvent<T> {
    /// Logical time at which the event fires
    pub time: u64,

    /// Insertion order, breaks ties between events at the same time
    pub sequence: u64,

    /// The event itself
    pub payload: T,
}

impl<T> PartialEq for ScheduledEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}

impl<T> Eq for ScheduledEvent<T> {}

impl<T> PartialOrd for ScheduledEvent<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledEvent<T> {
    // BinaryHeap is a max-heap; earliest (time, sequence) must compare greatest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Events processed in non-decreasing time order, FIFO within a tick
#[derive(Debug)]
pub struct EventQueue<T> {
    heap: BinaryHeap<ScheduledEvent<T>>,
    next_sequence: u64,
    now: u64,
}

impl<T> EventQueue<T> {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
            next_sequence: 0,
            now: 0,
        }
    }

    /// Current logical time
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedule at an absolute time; times in the past fire now
    pub fn schedule_at(&mut self, time: u64, payload: T) {
        let event = ScheduledEvent {
            time: time.max(self.now),
            sequence: self.next_sequence,
            payload,
        };
        self.next_sequence += 1;
        self.heap.push(event);
    }

    /// Schedule `delay` ticks from now
    pub fn schedule_after(&mut self, delay: u64, payload: T) {
        self.schedule_at(self.now.saturating_add(delay), payload);
    }

    /// Time of the next pending event
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|event| event.time)
    }

    /// Pop the next event if it fires no later than `deadline`, advancing the clock
    pub fn pop_due(&mut self, deadline: u64) -> Option<ScheduledEvent<T>> {
        if self.peek_time()? > deadline {
            return None;
        }
        let event = self.heap.pop()?;
        self.now = event.time;
        Some(event)
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
