use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use traffic_lab_abstract::Event;

#[derive(Debug)]
struct Scheduled {
    event: Event,
    seq: u64, // Insertion order, breaks ties between equal times
}

// Custom Ord for Min-Heap (earliest time pops first)
impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse comparison: smallest time is Greater in BinaryHeap
        other
            .event
            .time()
            .total_cmp(&self.event.time())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Chronological scheduler of source transitions.
///
/// Events come out ordered by time; events sharing a timestamp come out in
/// the order they were added.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event: Event) {
        self.heap.push(Scheduled {
            event,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Remove and return the earliest event.
    pub fn next_event(&mut self) -> Option<Event> {
        self.heap.pop().map(|s| s.event)
    }

    pub fn peek_next_event(&self) -> Option<&Event> {
        self.heap.peek().map(|s| &s.event)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl fmt::Display for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventQueue{{size={}}}", self.heap.len())
    }
}

/// Monotonic simulation time in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationClock {
    now: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.now
    }

    /// Move the clock forward to `t`. Requests to go backwards are ignored.
    pub fn advance_to(&mut self, t: f64) {
        if t >= self.now {
            self.now = t;
        }
    }

    pub fn reset(&mut self) {
        self.now = 0.0;
    }
}

impl fmt::Display for SimulationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.now)
    }
}
