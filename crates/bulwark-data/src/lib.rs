//! Persistent metadata attached to blocks.
//!
//! A [`BlockDataManager`] owns every [`DataBlock`] in a spatial index and
//! keeps them consistent with the world: blocks broken, burnt or blown up
//! lose their data, blocks pushed or pulled by pistons carry it along.
//!
//! # Mutation protocol
//!
//! For every tracked block an event touches:
//!
//! 1. Propose the change as a [`BlockDataEvent`].
//! 2. Ask every observer for a [`Decision`](bulwark_event::Decision).
//! 3. Allowed: remove the block (destruction) or remove-then-reinsert it at
//!    the target (relocation).
//! 4. Denied: leave the index alone and veto the originating action for that
//!    block only.
//!
//! # Persistence
//!
//! ```ignore
//! use bulwark_data::{BlockDataManager, JsonFileStore};
//!
//! let mut manager = BlockDataManager::with_store(JsonFileStore::new("data/blocks.json"))?;
//! manager.get_or_create(&coord).set("owner", "steve");
//! manager.save()?;
//! ```
//!
//! Saving always writes a full snapshot; loading skips records whose key
//! does not decode to a coordinate.

mod block;
mod error;
mod manager;
mod protocol;
mod store;
mod value;

pub use block::{DataBlock, DataBlockId};
pub use error::{StoreError, StoreResult};
pub use manager::{BlockDataManager, DataBlockObserver};
pub use protocol::{BlockChange, BlockDataEvent, DestroyCause};
pub use store::{BlockStore, JsonFileStore, MemoryStore, StoreDocument};
pub use value::ScalarValue;
