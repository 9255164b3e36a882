use super::{EventLogEntry, EventLogSink};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

pub struct MemoryLogSink {
    buffer: Arc<RwLock<VecDeque<EventLogEntry>>>,
    capacity: usize,
}

impl MemoryLogSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn get_recent(&self) -> Vec<EventLogEntry> {
        let buffer = self.buffer.read().unwrap();
        buffer.iter().cloned().collect()
    }

    // Allow sharing the buffer with test assertions
    pub fn clone_buffer(&self) -> Arc<RwLock<VecDeque<EventLogEntry>>> {
        self.buffer.clone()
    }
}

impl EventLogSink for MemoryLogSink {
    fn log(&self, entry: &EventLogEntry) {
        let mut buffer = self.buffer.write().unwrap();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry.clone());
    }
}
