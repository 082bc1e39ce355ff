//! Delivery of deny messages to actors.

use std::sync::Arc;

use bulwark_event::Actor;
use parking_lot::Mutex;

/// Tells an actor why their action was denied.
pub trait Messenger: Send {
    fn send(&self, actor: &Actor, message: &str);
}

/// Writes deny messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn send(&self, actor: &Actor, message: &str) {
        tracing::info!(actor = %actor.name, "{message}");
    }
}

/// Collects deny messages. Clones share the same messages.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Arc<Mutex<Vec<(Actor, String)>>>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every message sent so far.
    #[must_use]
    pub fn messages(&self) -> Vec<(Actor, String)> {
        self.messages.lock().clone()
    }

    /// Remove and return every message sent so far.
    pub fn take(&self) -> Vec<(Actor, String)> {
        std::mem::take(&mut *self.messages.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Messenger for Outbox {
    fn send(&self, actor: &Actor, message: &str) {
        self.messages.lock().push((actor.clone(), message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_clones_share_messages() {
        let outbox = Outbox::new();
        let handle = outbox.clone();
        let actor = Actor::new("steve");

        handle.send(&actor, "no");
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.take(), vec![(actor, "no".to_owned())]);
        assert!(handle.is_empty());
    }
}
