//! World event shapes reported by the host.
//!
//! Events only describe what happens to coordinates. What a piston or a
//! silverfish *is* stays with the host; the core only needs the affected
//! blocks, the responsible actor and how the action can be vetoed.

use bulwark_spatial::{Coord, Direction};
use serde::{Deserialize, Serialize};

use crate::Actor;

/// How a player interacted with the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractAction {
    LeftClickBlock,
    RightClickBlock,
    LeftClickAir,
    RightClickAir,
    Physical,
}

/// The kind of non-player entity changing a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangingEntity {
    /// Sand, gravel and friends landing.
    FallingBlock,
    /// Infesting or breaking out of a block.
    Silverfish,
    Other,
}

/// Why a creature spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnReason {
    Natural,
    Spawner,
    Breeding,
    SpawnEgg,
    /// Spawned by plugin code; never subject to protection.
    Custom,
    Other,
}

/// A mutation reported by the world feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    BlockBreak {
        block: Coord,
        player: Actor,
    },
    BlockPlace {
        block: Coord,
        player: Actor,
    },
    Interact {
        player: Actor,
        action: InteractAction,
        block: Option<Coord>,
        /// Whether the clicked block reacts to clicks (doors, levers, ...).
        #[serde(default)]
        interactable: bool,
    },
    InventoryOpen {
        player: Actor,
        /// Block holding the inventory; virtual inventories have none.
        container: Option<Coord>,
    },
    EntityExplode {
        blocks: Vec<Coord>,
    },
    BlockExplode {
        block: Coord,
        blocks: Vec<Coord>,
    },
    BucketFill {
        player: Actor,
        block: Coord,
    },
    BucketEmpty {
        player: Actor,
        block: Coord,
    },
    PistonExtend {
        piston: Coord,
        direction: Direction,
        blocks: Vec<Coord>,
    },
    PistonRetract {
        piston: Coord,
        direction: Direction,
        blocks: Vec<Coord>,
    },
    Redstone {
        block: Coord,
        old_current: u8,
        new_current: u8,
    },
    EntityChangeBlock {
        entity: ChangingEntity,
        block: Coord,
    },
    BlockGrow {
        block: Coord,
    },
    BlockSpread {
        block: Coord,
        source: Coord,
    },
    BlockForm {
        block: Coord,
    },
    BlockFade {
        block: Coord,
    },
    Flow {
        from: Coord,
        to: Coord,
    },
    BlockBurn {
        block: Coord,
    },
    CreatureSpawn {
        location: Coord,
        reason: SpawnReason,
    },
}

/// Discriminant of [`WorldEvent`], used to key adapter tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    BlockBreak,
    BlockPlace,
    Interact,
    InventoryOpen,
    EntityExplode,
    BlockExplode,
    BucketFill,
    BucketEmpty,
    PistonExtend,
    PistonRetract,
    Redstone,
    EntityChangeBlock,
    BlockGrow,
    BlockSpread,
    BlockForm,
    BlockFade,
    Flow,
    BlockBurn,
    CreatureSpawn,
}

impl EventKind {
    pub const ALL: [EventKind; 19] = [
        EventKind::BlockBreak,
        EventKind::BlockPlace,
        EventKind::Interact,
        EventKind::InventoryOpen,
        EventKind::EntityExplode,
        EventKind::BlockExplode,
        EventKind::BucketFill,
        EventKind::BucketEmpty,
        EventKind::PistonExtend,
        EventKind::PistonRetract,
        EventKind::Redstone,
        EventKind::EntityChangeBlock,
        EventKind::BlockGrow,
        EventKind::BlockSpread,
        EventKind::BlockForm,
        EventKind::BlockFade,
        EventKind::Flow,
        EventKind::BlockBurn,
        EventKind::CreatureSpawn,
    ];
}

impl WorldEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::BlockBreak { .. } => EventKind::BlockBreak,
            Self::BlockPlace { .. } => EventKind::BlockPlace,
            Self::Interact { .. } => EventKind::Interact,
            Self::InventoryOpen { .. } => EventKind::InventoryOpen,
            Self::EntityExplode { .. } => EventKind::EntityExplode,
            Self::BlockExplode { .. } => EventKind::BlockExplode,
            Self::BucketFill { .. } => EventKind::BucketFill,
            Self::BucketEmpty { .. } => EventKind::BucketEmpty,
            Self::PistonExtend { .. } => EventKind::PistonExtend,
            Self::PistonRetract { .. } => EventKind::PistonRetract,
            Self::Redstone { .. } => EventKind::Redstone,
            Self::EntityChangeBlock { .. } => EventKind::EntityChangeBlock,
            Self::BlockGrow { .. } => EventKind::BlockGrow,
            Self::BlockSpread { .. } => EventKind::BlockSpread,
            Self::BlockForm { .. } => EventKind::BlockForm,
            Self::BlockFade { .. } => EventKind::BlockFade,
            Self::Flow { .. } => EventKind::Flow,
            Self::BlockBurn { .. } => EventKind::BlockBurn,
            Self::CreatureSpawn { .. } => EventKind::CreatureSpawn,
        }
    }

    /// The player responsible, for player-driven events.
    #[must_use]
    pub const fn actor(&self) -> Option<&Actor> {
        match self {
            Self::BlockBreak { player, .. }
            | Self::BlockPlace { player, .. }
            | Self::Interact { player, .. }
            | Self::InventoryOpen { player, .. }
            | Self::BucketFill { player, .. }
            | Self::BucketEmpty { player, .. } => Some(player),
            _ => None,
        }
    }

    /// The single block the event is about, if it has one.
    ///
    /// Pistons report the piston itself, flows their source, spawns the
    /// spawn location.
    #[must_use]
    pub const fn block(&self) -> Option<&Coord> {
        match self {
            Self::BlockBreak { block, .. }
            | Self::BlockPlace { block, .. }
            | Self::BlockExplode { block, .. }
            | Self::BucketFill { block, .. }
            | Self::BucketEmpty { block, .. }
            | Self::Redstone { block, .. }
            | Self::EntityChangeBlock { block, .. }
            | Self::BlockGrow { block }
            | Self::BlockSpread { block, .. }
            | Self::BlockForm { block }
            | Self::BlockFade { block }
            | Self::BlockBurn { block } => Some(block),
            Self::Interact { block, .. } => block.as_ref(),
            Self::InventoryOpen { container, .. } => container.as_ref(),
            Self::PistonExtend { piston, .. } | Self::PistonRetract { piston, .. } => Some(piston),
            Self::Flow { from, .. } => Some(from),
            Self::CreatureSpawn { location, .. } => Some(location),
            Self::EntityExplode { .. } => None,
        }
    }

    /// The many blocks affected by a batch event.
    #[must_use]
    pub fn batch(&self) -> Option<&[Coord]> {
        match self {
            Self::EntityExplode { blocks }
            | Self::BlockExplode { blocks, .. }
            | Self::PistonExtend { blocks, .. }
            | Self::PistonRetract { blocks, .. } => Some(blocks.as_slice()),
            _ => None,
        }
    }

    pub(crate) fn batch_mut(&mut self) -> Option<&mut Vec<Coord>> {
        match self {
            Self::EntityExplode { blocks }
            | Self::BlockExplode { blocks, .. }
            | Self::PistonExtend { blocks, .. }
            | Self::PistonRetract { blocks, .. } => Some(blocks),
            _ => None,
        }
    }

    /// Direction blocks move in, for relocating events.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::PistonExtend { direction, .. } | Self::PistonRetract { direction, .. } => {
                Some(*direction)
            }
            _ => None,
        }
    }
}
