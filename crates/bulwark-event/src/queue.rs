//! FIFO queue of pending notifications.

use std::collections::VecDeque;

use crate::{Listener, Notification, WorldEvent, dispatch};

/// Notifications waiting to be delivered on the event thread.
#[derive(Default)]
pub struct EventQueue {
    pending: VecDeque<Notification>,
}

impl EventQueue {
    /// Create a new empty event queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: WorldEvent) {
        self.pending.push_back(Notification::new(event));
    }

    pub fn pop(&mut self) -> Option<Notification> {
        self.pending.pop_front()
    }

    /// Deliver every queued notification, returning them with their final veto state.
    pub fn flush(&mut self, listeners: &mut [&mut dyn Listener]) -> Vec<Notification> {
        let mut delivered = Vec::with_capacity(self.pending.len());
        while let Some(mut notification) = self.pending.pop_front() {
            dispatch(&mut notification, listeners);
            delivered.push(notification);
        }
        delivered
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl Extend<WorldEvent> for EventQueue {
    fn extend<I: IntoIterator<Item = WorldEvent>>(&mut self, events: I) {
        self.pending.extend(events.into_iter().map(Notification::new));
    }
}

impl core::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}
