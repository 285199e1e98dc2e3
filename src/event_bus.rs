// src/event_bus.rs
//
// Outward-facing event queue. The tracker publishes object lifecycle and
// touch transitions here; the embedding application drains once per frame.
// Hand notifications are NOT routed through this bus — they are a
// synchronous in-frame pass over the registry (see touch.rs).

use crate::registry::ObjectCategory;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum TrackerEvent {
    ObjectAppeared { label: u32, category: ObjectCategory },
    ObjectRemoved { label: u32 },
    TouchStarted { label: u32, hand: u32 },
    TouchReleased { label: u32, hand: u32 },
}

pub struct EventBus {
    events: VecDeque<TrackerEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: TrackerEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<TrackerEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
