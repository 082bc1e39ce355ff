//! Notifications: a world event plus the veto state of its action.

use bulwark_spatial::Coord;

use crate::WorldEvent;

/// A world event in flight through the listeners.
///
/// Listeners veto the underlying action by cancelling it, or, for batch
/// events, by excluding individual blocks from the batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    event: WorldEvent,
    cancelled: bool,
    excluded: Vec<Coord>,
}

impl Notification {
    #[must_use]
    pub const fn new(event: WorldEvent) -> Self {
        Self {
            event,
            cancelled: false,
            excluded: Vec::new(),
        }
    }

    #[must_use]
    pub const fn event(&self) -> &WorldEvent {
        &self.event
    }

    /// Mutable access for rollbacks that rewrite the event instead of cancelling it.
    pub fn event_mut(&mut self) -> &mut WorldEvent {
        &mut self.event
    }

    #[must_use]
    pub fn into_event(self) -> WorldEvent {
        self.event
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Veto the whole action.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// Drop `coord` from the event's batch so the rest of the batch still happens.
    ///
    /// Returns `false` if the event has no batch or the block was not in it.
    pub fn exclude(&mut self, coord: &Coord) -> bool {
        let Some(blocks) = self.event.batch_mut() else {
            return false;
        };
        let before = blocks.len();
        blocks.retain(|block| block != coord);
        if blocks.len() == before {
            return false;
        }
        self.excluded.push(coord.clone());
        true
    }

    /// Blocks excluded from the batch so far, in exclusion order.
    #[must_use]
    pub fn excluded(&self) -> &[Coord] {
        &self.excluded
    }

    /// Whether the action at `coord` will not happen.
    #[must_use]
    pub fn is_vetoed(&self, coord: &Coord) -> bool {
        self.cancelled || self.excluded.contains(coord)
    }
}

impl From<WorldEvent> for Notification {
    fn from(event: WorldEvent) -> Self {
        Self::new(event)
    }
}
