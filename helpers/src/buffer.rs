use std::collections::VecDeque;

/// RingBuffer keeps the last `capacity` values that were pushed into it. It is used to smooth
/// values that fluctuate from frame to frame, e.g. the GUI update durations.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T: Copy + Into<f64>> RingBuffer<T> {
    pub fn new(capacity: usize) -> RingBuffer<T> {
        if capacity == 0 {
            panic!("Capacity of a ring buffer must be at least 1!")
        }

        RingBuffer {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// push appends a value and drops the oldest one if the buffer is full.
    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// get_avg returns the average of the stored values or None if the buffer is empty.
    pub fn get_avg(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }

        let sum: f64 = self.values.iter().map(|&val| val.into()).sum();
        Some(sum / self.values.len() as f64)
    }
}
