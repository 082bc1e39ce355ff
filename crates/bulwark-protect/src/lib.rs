//! Bulwark protection policies
//!
//! A [`Policy`] forbids a set of [`ProtectionKind`]s either everywhere
//! (global) or inside one [`Region`](bulwark_spatial::Region). The
//! [`PolicyIndex`] owns every policy, finds the ones covering a coordinate,
//! and, as a [`Listener`](bulwark_event::Listener), vetoes world events
//! through the [`STANDARD_ADAPTERS`] table.
//!
//! ```ignore
//! let mut policies = PolicyIndex::new();
//! let spawn = Region::from_corners("world", [-50, 0, -50], [50, 255, 50]);
//!
//! let mut policy = Policy::bounded(spawn, ProtectionKinds::DIRECT_PLAYERS);
//! policy.add_actor_bypass(|actor, _| actor.is_some_and(|a| a.name == "admin"));
//! policy.set_deny_message(ProtectionKind::BreakBlock, "Spawn is protected");
//! let id = policies.insert(policy);
//!
//! assert!(!policies.allow(&Coord::new("world", 0, 64, 0), ProtectionKind::BreakBlock, Some(&guest)));
//! policies.disable(id);
//! ```

mod adapter;
mod index;
mod kind;
mod messenger;
mod policy;

pub use adapter::{ActorSource, Adapter, Condition, CoordSource, Rollback, STANDARD_ADAPTERS};
pub use index::{PolicyId, PolicyIndex};
pub use kind::{ProtectionKind, ProtectionKinds};
pub use messenger::{LogMessenger, Messenger, Outbox};
pub use policy::{BypassRule, CheckFn, Policy};
