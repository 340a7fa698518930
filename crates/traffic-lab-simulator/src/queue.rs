use crate::error::{Result, SimError};
use std::collections::VecDeque;
use std::fmt;
use traffic_lab_abstract::QueueMetrics;

/// Slack for comparing accumulated service times against a horizon.
const TIME_EPSILON: f64 = 1e-9;

/// One packet moving through the [`NetworkQueue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueElement {
    arrival_time: f64,
    service_start_time: Option<f64>,
    departure_time: Option<f64>,
}

impl QueueElement {
    pub fn new(arrival_time: f64) -> Self {
        Self {
            arrival_time,
            service_start_time: None,
            departure_time: None,
        }
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn service_start_time(&self) -> Option<f64> {
        self.service_start_time
    }

    pub fn departure_time(&self) -> Option<f64> {
        self.departure_time
    }

    /// Time spent waiting before service; 0 until service has started.
    pub fn waiting_time(&self) -> f64 {
        self.service_start_time
            .map_or(0.0, |start| start - self.arrival_time)
    }

    /// Waiting plus service; 0 until a departure is scheduled.
    pub fn system_time(&self) -> f64 {
        self.departure_time
            .map_or(0.0, |departure| departure - self.arrival_time)
    }
}

/// FIFO with one deterministic server of rate `mu`, unbounded unless a capacity is set.
#[derive(Debug)]
pub struct NetworkQueue {
    service_rate: f64,
    capacity: Option<usize>,
    queue: VecDeque<QueueElement>,
    last_processed_time: f64,
    server_busy_until: f64,
    total_arrived: u64,
    total_served: u64,
    total_dropped: u64,
    sum_waiting_time: f64,
    sum_system_time: f64,
}

impl NetworkQueue {
    pub fn new(service_rate: f64) -> Result<Self> {
        if !(service_rate > 0.0) {
            return Err(SimError::config(format!(
                "service rate must be > 0, got {service_rate}"
            )));
        }
        Ok(Self {
            service_rate,
            capacity: None,
            queue: VecDeque::new(),
            last_processed_time: 0.0,
            server_busy_until: 0.0,
            total_arrived: 0,
            total_served: 0,
            total_dropped: 0,
            sum_waiting_time: 0.0,
            sum_system_time: 0.0,
        })
    }

    /// Queue holding at most `capacity` packets; arrivals beyond that are dropped.
    pub fn with_capacity(service_rate: f64, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SimError::config("queue capacity must be > 0"));
        }
        let mut queue = Self::new(service_rate)?;
        queue.capacity = Some(capacity);
        Ok(queue)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// `count` packets arriving together at `t`.
    pub fn enqueue_bulk(&mut self, t: f64, count: usize) {
        if count == 0 {
            return;
        }
        self.total_arrived += count as u64;
        let admitted = match self.capacity {
            Some(capacity) => count.min(capacity.saturating_sub(self.queue.len())),
            None => count,
        };
        self.total_dropped += (count - admitted) as u64;
        self.queue
            .extend(std::iter::repeat_n(QueueElement::new(t), admitted));
    }

    pub fn enqueue(&mut self, t: f64) {
        self.enqueue_bulk(t, 1);
    }

    /// Advance service up to `t`, releasing every packet that departs by then.
    pub fn process_until(&mut self, t: f64) {
        if t <= self.last_processed_time {
            return;
        }

        let service_time = 1.0 / self.service_rate;
        while let Some(head) = self.queue.front_mut() {
            if head.service_start_time.is_none() {
                let start = head
                    .arrival_time
                    .max(self.last_processed_time)
                    .max(self.server_busy_until);
                let departure = start + service_time;
                head.service_start_time = Some(start);
                head.departure_time = Some(departure);
                self.server_busy_until = departure;
                self.sum_waiting_time += start - head.arrival_time;
            }

            // Departures are monotonic, nothing behind the head can leave earlier.
            match head.departure_time {
                Some(departure) if departure <= t + TIME_EPSILON => {
                    self.sum_system_time += head.system_time();
                    self.total_served += 1;
                    self.queue.pop_front();
                }
                _ => break,
            }
        }
        self.last_processed_time = t;
    }

    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    pub fn total_arrived(&self) -> u64 {
        self.total_arrived
    }

    pub fn total_served(&self) -> u64 {
        self.total_served
    }

    /// Arrivals rejected because the queue was full; always 0 when unbounded.
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    pub fn avg_waiting_time(&self) -> f64 {
        if self.total_served == 0 {
            0.0
        } else {
            self.sum_waiting_time / self.total_served as f64
        }
    }

    pub fn avg_system_time(&self) -> f64 {
        if self.total_served == 0 {
            0.0
        } else {
            self.sum_system_time / self.total_served as f64
        }
    }

    pub fn metrics(&self) -> QueueMetrics {
        QueueMetrics {
            arrived: self.total_arrived,
            served: self.total_served,
            dropped: self.total_dropped,
            queue_length: self.queue.len(),
            avg_waiting_time: self.avg_waiting_time(),
            avg_system_time: self.avg_system_time(),
        }
    }
}

impl fmt::Display for NetworkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Queue[arr={}, served={}, dropped={}, avgWait={:.4}, avgSys={:.4}]",
            self.total_arrived,
            self.total_served,
            self.total_dropped,
            self.avg_waiting_time(),
            self.avg_system_time()
        )
    }
}
