//! Listener trait and priority-ordered dispatch.

use crate::Notification;

/// Dispatch order. Lower priorities run first; `Monitor` runs last and
/// should only observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    Monitor,
}

/// A subsystem subscribed to the world feed.
pub trait Listener {
    /// When this listener runs relative to the others.
    fn priority(&self) -> Priority {
        Priority::Normal
    }

    /// Skip notifications an earlier listener already cancelled.
    fn ignore_cancelled(&self) -> bool {
        false
    }

    /// Handle one notification, vetoing its action if needed.
    fn on_event(&mut self, notification: &mut Notification);
}

/// Deliver `notification` to every listener in priority order.
///
/// Listeners with equal priority run in slice order.
pub fn dispatch(notification: &mut Notification, listeners: &mut [&mut dyn Listener]) {
    let mut order: Vec<usize> = (0..listeners.len()).collect();
    order.sort_by_key(|&i| listeners[i].priority());

    for i in order {
        let listener = &mut *listeners[i];
        if notification.is_cancelled() && listener.ignore_cancelled() {
            continue;
        }
        listener.on_event(notification);
    }
}
