//! Bulwark world event feed
//!
//! The host world reports mutations as [`WorldEvent`]s wrapped in a
//! [`Notification`], which carries the veto state of the underlying action.
//! Subsystems implement [`Listener`] and are driven by [`dispatch`] in
//! priority order.
//!
//! # Vetoes
//!
//! - Single-block actions are vetoed by cancelling the whole notification.
//! - Batch actions (explosions) are vetoed per block by excluding the block
//!   from the notification's batch; the rest of the batch still happens.
//! - Some actions cannot be cancelled and are rolled back by rewriting the
//!   event instead (redstone current reset).
//!
//! Domain decisions raised by subsystems are explicit [`Decision`] values
//! returned by observers, never a mutable flag on a shared object.
//!
//! ```ignore
//! let mut notification = Notification::new(WorldEvent::BlockBreak { block, player });
//! dispatch(&mut notification, &mut [&mut policies, &mut block_data]);
//! if notification.is_cancelled() {
//!     // put the block back
//! }
//! ```

mod actor;
mod event;
mod listener;
mod notification;
mod observer;
mod queue;

pub use actor::Actor;
pub use event::{ChangingEntity, EventKind, InteractAction, SpawnReason, WorldEvent};
pub use listener::{Listener, Priority, dispatch};
pub use notification::Notification;
pub use observer::{Decision, ObserverId, ObserverInfo, ObserverSet};
pub use queue::EventQueue;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Actor, Decision, EventKind, EventQueue, Listener, Notification, ObserverId, ObserverSet,
        Priority, WorldEvent, dispatch,
    };
}
