//! Keeping data blocks in step with world events.

use bulwark_event::{Actor, Decision, Listener, Notification, Priority, WorldEvent};
use bulwark_spatial::Coord;
use tracing::debug;

use crate::{BlockDataManager, DataBlock, DataBlockId};

/// What destroyed a block without a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DestroyCause {
    Explosion,
    Fire,
}

/// How a tracked block is about to change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockChange<'a> {
    /// A player breaks the block.
    Break { actor: &'a Actor },
    /// The block is blown up or burnt.
    Destroy { cause: DestroyCause },
    /// The block is pushed or pulled to `to`.
    Move { to: &'a Coord },
}

/// A proposed change to a tracked block, put to every observer.
#[derive(Clone, Copy, Debug)]
pub struct BlockDataEvent<'a> {
    pub block: &'a DataBlock,
    pub change: BlockChange<'a>,
}

impl BlockDataEvent<'_> {
    /// Whether the block loses its data if the change goes ahead.
    #[must_use]
    pub const fn removes_data(&self) -> bool {
        !matches!(self.change, BlockChange::Move { .. })
    }
}

impl BlockDataManager {
    fn decide(&self, event: &BlockDataEvent<'_>) -> Decision {
        let decision: Decision = self.observers.iter().map(|observer| observer(event)).collect();
        debug!(
            "{:?} of data block at {}: {decision:?}",
            event.change,
            event.block.coord()
        );
        decision
    }

    /// Decide the destruction of every block at `coord`; removes them if allowed.
    fn destroy_at(&mut self, coord: &Coord, change: BlockChange<'_>) -> Decision {
        let ids = self.ids_at(coord);
        let decision: Decision = ids
            .iter()
            .filter_map(|id| self.get(*id))
            .map(|block| self.decide(&BlockDataEvent { block, change }))
            .collect();

        if decision.is_allowed() {
            for id in ids {
                self.remove(id);
            }
        }
        decision
    }

    fn on_break(&mut self, notification: &mut Notification, coord: &Coord, change: BlockChange<'_>) {
        if self.destroy_at(coord, change).is_denied() {
            notification.cancel();
        }
    }

    fn on_explosion(&mut self, notification: &mut Notification, blocks: &[Coord]) {
        let change = BlockChange::Destroy {
            cause: DestroyCause::Explosion,
        };
        for coord in blocks {
            if self.destroy_at(coord, change).is_denied() {
                notification.exclude(coord);
            }
        }
    }

    /// Relocate every tracked block in the batch one step along the push.
    ///
    /// All sources are looked up before anything moves, so chains shifting
    /// into each other's old positions never pick up a moved block twice.
    fn on_piston(&mut self, notification: &mut Notification, blocks: &[Coord]) {
        let Some(direction) = notification.event().direction() else {
            return;
        };

        let moves: Vec<(DataBlockId, Coord)> = blocks
            .iter()
            .flat_map(|coord| {
                let to = coord.relative(direction);
                self.ids_at(coord).into_iter().map(move |id| (id, to.clone()))
            })
            .collect();

        let mut approved = Vec::with_capacity(moves.len());
        let mut vetoed = false;
        for (id, to) in moves {
            let Some(block) = self.get(id) else {
                continue;
            };
            let decision = self.decide(&BlockDataEvent {
                block,
                change: BlockChange::Move { to: &to },
            });
            if decision.is_allowed() {
                approved.push((id, to));
            } else {
                vetoed = true;
            }
        }

        for (id, to) in approved {
            self.relocate(id, to);
        }
        if vetoed {
            notification.cancel();
        }
    }
}

impl Listener for BlockDataManager {
    fn priority(&self) -> Priority {
        Priority::Highest
    }

    fn ignore_cancelled(&self) -> bool {
        true
    }

    fn on_event(&mut self, notification: &mut Notification) {
        // Owned copies: the handlers below veto through `notification`.
        match notification.event().clone() {
            WorldEvent::BlockBreak { block, player } => {
                self.on_break(notification, &block, BlockChange::Break { actor: &player });
            }
            WorldEvent::BlockBurn { block } => {
                let change = BlockChange::Destroy {
                    cause: DestroyCause::Fire,
                };
                self.on_break(notification, &block, change);
            }
            WorldEvent::EntityExplode { blocks } | WorldEvent::BlockExplode { blocks, .. } => {
                self.on_explosion(notification, &blocks);
            }
            WorldEvent::PistonExtend { blocks, .. } | WorldEvent::PistonRetract { blocks, .. } => {
                self.on_piston(notification, &blocks);
            }
            _ => {}
        }
    }
}
