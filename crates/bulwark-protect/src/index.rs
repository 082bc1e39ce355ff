//! The policy registry: spatial lookup of bounded policies plus the global set.

use core::fmt;
use core::num::NonZeroU32;
use std::collections::BTreeSet;

use bulwark_event::{Actor, Listener, Notification, SpawnReason};
use bulwark_spatial::{Coord, SpatialIndex};
use hashbrown::HashMap;
use tracing::debug;

use crate::{Adapter, LogMessenger, Messenger, Policy, ProtectionKind, STANDARD_ADAPTERS};

/// Handle to a policy registered in a [`PolicyIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyId(u32);

impl PolicyId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Owns every policy and decides whether actions may happen.
///
/// Policies stay owned by the index while disabled, so re-enabling one keeps
/// its check, bypasses and messages.
pub struct PolicyIndex {
    policies: HashMap<PolicyId, Policy>,
    regions: SpatialIndex<PolicyId>,
    global: BTreeSet<PolicyId>,
    next_id: u32,
    messenger: Box<dyn Messenger>,
    adapters: &'static [Adapter],
}

impl PolicyIndex {
    /// An empty index that logs deny messages and adapts every standard event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
            regions: SpatialIndex::new(),
            global: BTreeSet::new(),
            next_id: 0,
            messenger: Box::new(LogMessenger),
            adapters: STANDARD_ADAPTERS,
        }
    }

    /// Send deny messages through `messenger`.
    #[must_use]
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Box::new(messenger);
        self
    }

    /// Rebuild the region lookup with a different cell size.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: NonZeroU32) -> Self {
        let mut regions = SpatialIndex::with_cell_size(cell_size);
        for (id, policy) in &self.policies {
            if let Some(bound) = policy.bound() {
                if self.regions.contains(bound, id) {
                    regions.set(bound, *id);
                }
            }
        }
        self.regions = regions;
        self
    }

    #[must_use]
    pub const fn adapters(&self) -> &'static [Adapter] {
        self.adapters
    }

    /// Register `policy` and enable it.
    pub fn insert(&mut self, policy: Policy) -> PolicyId {
        let id = PolicyId(self.next_id);
        self.next_id += 1;
        self.policies.insert(id, policy);
        self.enable(id);
        id
    }

    /// Unregister a policy entirely.
    pub fn remove(&mut self, id: PolicyId) -> Option<Policy> {
        self.disable(id);
        self.policies.remove(&id)
    }

    /// Start consulting a policy. Returns `false` if it was already enabled
    /// or does not exist.
    pub fn enable(&mut self, id: PolicyId) -> bool {
        let Some(policy) = self.policies.get(&id) else {
            return false;
        };
        match policy.bound() {
            Some(bound) => {
                if self.regions.contains(bound, &id) {
                    return false;
                }
                self.regions.set(bound, id);
                true
            }
            None => self.global.insert(id),
        }
    }

    /// Stop consulting a policy. Disabling twice is a no-op.
    pub fn disable(&mut self, id: PolicyId) -> bool {
        let Some(policy) = self.policies.get(&id) else {
            return false;
        };
        match policy.bound() {
            Some(bound) => {
                if !self.regions.contains(bound, &id) {
                    return false;
                }
                self.regions.remove(bound, &id);
                true
            }
            None => self.global.remove(&id),
        }
    }

    #[must_use]
    pub fn is_enabled(&self, id: PolicyId) -> bool {
        match self.policies.get(&id).map(Policy::bound) {
            Some(Some(bound)) => self.regions.contains(bound, &id),
            Some(None) => self.global.contains(&id),
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.get(&id)
    }

    /// Reconfigure a policy. Its bound cannot change.
    pub fn get_mut(&mut self, id: PolicyId) -> Option<&mut Policy> {
        self.policies.get_mut(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Enabled policies that might cover `coord`, oldest first.
    fn candidates(&self, coord: &Coord) -> Vec<(PolicyId, &Policy)> {
        let mut ids: Vec<PolicyId> = self
            .regions
            .get(coord)
            .copied()
            .chain(self.global.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .filter_map(|id| self.policies.get(&id).map(|policy| (id, policy)))
            .collect()
    }

    /// Whether `actor` (or the world, for `None`) may perform `kind` at `coord`.
    ///
    /// Denied if any enabled policy covering `coord` protects `kind` and none
    /// of its bypass rules match. The first denying policy's message for
    /// `kind`, if any, is sent to `actor`. Coordinates no policy covers are
    /// always allowed.
    pub fn allow(&self, coord: &Coord, kind: ProtectionKind, actor: Option<&Actor>) -> bool {
        let Some((id, policy)) = self
            .candidates(coord)
            .into_iter()
            .find(|(_, policy)| !policy.allow(coord, kind, actor))
        else {
            return true;
        };

        debug!("Policy {} denies {kind} at {coord}", id.raw());
        if let (Some(actor), Some(message)) = (actor, policy.deny_message(kind)) {
            self.messenger.send(actor, message);
        }
        false
    }

    /// Whether a creature may spawn at `coord`. Custom spawns always may.
    pub fn allow_spawn(&self, coord: &Coord, reason: SpawnReason) -> bool {
        reason == SpawnReason::Custom || self.allow(coord, ProtectionKind::MobSpawn, None)
    }
}

impl Listener for PolicyIndex {
    fn ignore_cancelled(&self) -> bool {
        true
    }

    fn on_event(&mut self, notification: &mut Notification) {
        let kind = notification.event().kind();
        for adapter in self.adapters.iter().filter(|adapter| adapter.event == kind) {
            adapter.apply(self, notification);
        }
    }
}

impl Default for PolicyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PolicyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyIndex")
            .field("policies", &self.policies.len())
            .field("global", &self.global)
            .field("region_cells", &self.regions.cell_count())
            .field("adapters", &self.adapters.len())
            .finish_non_exhaustive()
    }
}
