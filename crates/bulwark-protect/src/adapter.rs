//! Mapping world events onto protection checks.
//!
//! Each [`Adapter`] row names an event, the protection kind it needs, where
//! the responsible actor and the affected coordinates come from, and how a
//! denied event is vetoed. [`STANDARD_ADAPTERS`] covers every event the
//! world feed reports.

use bulwark_event::{
    Actor, ChangingEntity, EventKind, InteractAction, Notification, SpawnReason, WorldEvent,
};
use bulwark_spatial::Coord;
use smallvec::SmallVec;
use tracing::debug;

use crate::{PolicyIndex, ProtectionKind};

/// Where the responsible actor comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorSource {
    /// The player carried by the event.
    Event,
    /// Nobody; the world did it.
    None,
}

/// Extra requirement for an event to be checked at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// A right click on a block that reacts to clicks.
    RightClickInteractable,
    EntityIs(ChangingEntity),
    /// Any spawn not requested by plugin code.
    SpawnNotCustom,
}

impl Condition {
    #[must_use]
    pub fn holds(self, event: &WorldEvent) -> bool {
        match (self, event) {
            (
                Self::RightClickInteractable,
                WorldEvent::Interact {
                    action,
                    block,
                    interactable,
                    ..
                },
            ) => *action == InteractAction::RightClickBlock && block.is_some() && *interactable,
            (Self::EntityIs(expected), WorldEvent::EntityChangeBlock { entity, .. }) => {
                *entity == expected
            }
            (Self::SpawnNotCustom, WorldEvent::CreatureSpawn { reason, .. }) => {
                *reason != SpawnReason::Custom
            }
            _ => false,
        }
    }
}

/// Where the coordinates to check come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordSource {
    /// The event's own block.
    Block,
    /// The event's own block, only if the condition holds.
    BlockWhen(Condition),
    /// Both ends of a flow.
    FromTo,
    /// Every block of a batch.
    Batch,
    /// Every block of a batch plus the block causing it.
    BatchWithOrigin,
}

/// How a denied event is vetoed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rollback {
    /// Cancel the whole event.
    Cancel,
    /// Drop each denied block from the batch.
    ExcludeFromBatch,
    /// Put the redstone current back; the event itself still happens.
    ResetCurrent,
}

/// One row of the adapter table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Adapter {
    pub event: EventKind,
    pub kind: ProtectionKind,
    pub actor: ActorSource,
    pub coords: CoordSource,
    pub rollback: Rollback,
}

const fn player(event: EventKind, kind: ProtectionKind, coords: CoordSource) -> Adapter {
    Adapter {
        event,
        kind,
        actor: ActorSource::Event,
        coords,
        rollback: Rollback::Cancel,
    }
}

const fn world(event: EventKind, kind: ProtectionKind, coords: CoordSource, rollback: Rollback) -> Adapter {
    Adapter {
        event,
        kind,
        actor: ActorSource::None,
        coords,
        rollback,
    }
}

/// Every event the world feed reports, mapped onto its protection kind.
pub const STANDARD_ADAPTERS: &[Adapter] = &[
    player(EventKind::BlockBreak, ProtectionKind::BreakBlock, CoordSource::Block),
    player(EventKind::BlockPlace, ProtectionKind::PlaceBlock, CoordSource::Block),
    player(
        EventKind::Interact,
        ProtectionKind::Interact,
        CoordSource::BlockWhen(Condition::RightClickInteractable),
    ),
    player(EventKind::InventoryOpen, ProtectionKind::ContainerAccess, CoordSource::Block),
    world(
        EventKind::EntityExplode,
        ProtectionKind::EntityExplosion,
        CoordSource::Batch,
        Rollback::ExcludeFromBatch,
    ),
    world(
        EventKind::BlockExplode,
        ProtectionKind::BlockExplosion,
        CoordSource::Batch,
        Rollback::ExcludeFromBatch,
    ),
    player(EventKind::BucketFill, ProtectionKind::UseBuckets, CoordSource::Block),
    player(EventKind::BucketEmpty, ProtectionKind::UseBuckets, CoordSource::Block),
    world(
        EventKind::PistonExtend,
        ProtectionKind::Pistons,
        CoordSource::BatchWithOrigin,
        Rollback::Cancel,
    ),
    world(
        EventKind::PistonRetract,
        ProtectionKind::Pistons,
        CoordSource::BatchWithOrigin,
        Rollback::Cancel,
    ),
    world(
        EventKind::Redstone,
        ProtectionKind::Redstone,
        CoordSource::Block,
        Rollback::ResetCurrent,
    ),
    world(
        EventKind::EntityChangeBlock,
        ProtectionKind::FallingBlock,
        CoordSource::BlockWhen(Condition::EntityIs(ChangingEntity::FallingBlock)),
        Rollback::Cancel,
    ),
    world(
        EventKind::EntityChangeBlock,
        ProtectionKind::Silverfish,
        CoordSource::BlockWhen(Condition::EntityIs(ChangingEntity::Silverfish)),
        Rollback::Cancel,
    ),
    world(EventKind::BlockGrow, ProtectionKind::Growth, CoordSource::Block, Rollback::Cancel),
    world(EventKind::BlockSpread, ProtectionKind::Growth, CoordSource::Block, Rollback::Cancel),
    world(EventKind::BlockForm, ProtectionKind::Growth, CoordSource::Block, Rollback::Cancel),
    world(EventKind::BlockFade, ProtectionKind::Fade, CoordSource::Block, Rollback::Cancel),
    world(EventKind::Flow, ProtectionKind::Flow, CoordSource::FromTo, Rollback::Cancel),
    world(EventKind::BlockBurn, ProtectionKind::Fire, CoordSource::Block, Rollback::Cancel),
    world(
        EventKind::CreatureSpawn,
        ProtectionKind::MobSpawn,
        CoordSource::BlockWhen(Condition::SpawnNotCustom),
        Rollback::Cancel,
    ),
];

impl Adapter {
    #[must_use]
    pub fn actor<'e>(self, event: &'e WorldEvent) -> Option<&'e Actor> {
        match self.actor {
            ActorSource::Event => event.actor(),
            ActorSource::None => None,
        }
    }

    /// Coordinates to check for `event`. Empty if the row does not apply.
    #[must_use]
    pub fn coords(self, event: &WorldEvent) -> SmallVec<[Coord; 4]> {
        let mut coords = SmallVec::new();
        if event.kind() != self.event {
            return coords;
        }

        match self.coords {
            CoordSource::Block => coords.extend(event.block().cloned()),
            CoordSource::BlockWhen(condition) => {
                if condition.holds(event) {
                    coords.extend(event.block().cloned());
                }
            }
            CoordSource::FromTo => {
                if let WorldEvent::Flow { from, to } = event {
                    coords.push(from.clone());
                    coords.push(to.clone());
                }
            }
            CoordSource::Batch => coords.extend(event.batch().into_iter().flatten().cloned()),
            CoordSource::BatchWithOrigin => {
                coords.extend(event.batch().into_iter().flatten().cloned());
                coords.extend(event.block().cloned());
            }
        }
        coords
    }

    /// Check `notification` against `policies`, vetoing it if denied.
    ///
    /// Returns the number of denied coordinates.
    pub fn apply(self, policies: &PolicyIndex, notification: &mut Notification) -> usize {
        let coords = self.coords(notification.event());
        if coords.is_empty() {
            return 0;
        }
        let actor = self.actor(notification.event()).cloned();

        match self.rollback {
            Rollback::ExcludeFromBatch => {
                let denied: SmallVec<[Coord; 4]> = coords
                    .into_iter()
                    .filter(|coord| !policies.allow(coord, self.kind, actor.as_ref()))
                    .collect();
                for coord in &denied {
                    debug!("{} denied at {coord}, excluding from batch", self.kind);
                    notification.exclude(coord);
                }
                denied.len()
            }
            Rollback::Cancel | Rollback::ResetCurrent => {
                let Some(coord) = coords
                    .iter()
                    .find(|coord| !policies.allow(coord, self.kind, actor.as_ref()))
                else {
                    return 0;
                };
                debug!("{} denied at {coord}", self.kind);
                self.roll_back(notification);
                1
            }
        }
    }

    fn roll_back(self, notification: &mut Notification) {
        match self.rollback {
            Rollback::Cancel => notification.cancel(),
            Rollback::ResetCurrent => {
                if let WorldEvent::Redstone {
                    old_current,
                    new_current,
                    ..
                } = notification.event_mut()
                {
                    *new_current = *old_current;
                }
            }
            Rollback::ExcludeFromBatch => {}
        }
    }
}
