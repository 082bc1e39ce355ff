//! A single protection policy.

use core::fmt;

use bulwark_event::Actor;
use bulwark_spatial::{Coord, Region};
use hashbrown::HashMap;

use crate::{ProtectionKind, ProtectionKinds};

/// Predicate deciding whether a policy protects a block at all.
pub type CheckFn = dyn Fn(&Coord) -> bool + Send + Sync;

/// Grants an actor (or the absence of one) a way around a policy.
pub type BypassRule = dyn Fn(Option<&Actor>, ProtectionKind, &Coord) -> bool + Send + Sync;

/// Forbids a set of actions, either everywhere or inside one region.
///
/// A policy never changes its bound; everything else can be reconfigured at
/// any time, including while it is disabled.
pub struct Policy {
    bound: Option<Region>,
    kinds: ProtectionKinds,
    check: Box<CheckFn>,
    bypasses: Vec<Box<BypassRule>>,
    messages: HashMap<ProtectionKind, String>,
}

impl Policy {
    /// A policy consulted for every coordinate.
    #[must_use]
    pub fn global(kinds: impl Into<ProtectionKinds>) -> Self {
        Self::with_bound(None, kinds.into())
    }

    /// A policy consulted only inside `region`.
    #[must_use]
    pub fn bounded(region: Region, kinds: impl Into<ProtectionKinds>) -> Self {
        Self::with_bound(Some(region), kinds.into())
    }

    fn with_bound(bound: Option<Region>, kinds: ProtectionKinds) -> Self {
        Self {
            bound,
            kinds,
            check: Box::new(|_| true),
            bypasses: Vec::new(),
            messages: HashMap::new(),
        }
    }

    /// Only protect blocks matching `check`.
    #[must_use]
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Coord) -> bool + Send + Sync + 'static,
    {
        self.check = Box::new(check);
        self
    }

    #[must_use]
    pub const fn bound(&self) -> Option<&Region> {
        self.bound.as_ref()
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.bound.is_none()
    }

    #[must_use]
    pub const fn kinds(&self) -> ProtectionKinds {
        self.kinds
    }

    /// Replace the protected kinds.
    pub fn set_protection_types(&mut self, kinds: impl Into<ProtectionKinds>) {
        self.kinds = kinds.into();
    }

    /// Add a bypass rule. Rules are consulted in insertion order.
    pub fn add_bypass<F>(&mut self, rule: F)
    where
        F: Fn(Option<&Actor>, ProtectionKind, &Coord) -> bool + Send + Sync + 'static,
    {
        self.bypasses.push(Box::new(rule));
    }

    /// Add a bypass rule that ignores where the action happens.
    pub fn add_actor_bypass<F>(&mut self, rule: F)
    where
        F: Fn(Option<&Actor>, ProtectionKind) -> bool + Send + Sync + 'static,
    {
        self.add_bypass(move |actor, kind, _| rule(actor, kind));
    }

    pub fn clear_bypasses(&mut self) {
        self.bypasses.clear();
    }

    #[must_use]
    pub fn bypass_count(&self) -> usize {
        self.bypasses.len()
    }

    /// Message sent to an actor denied `kind`.
    pub fn set_deny_message(&mut self, kind: ProtectionKind, message: impl Into<String>) {
        self.messages.insert(kind, message.into());
    }

    /// Set the same deny message for every kind matching `filter`.
    pub fn set_deny_message_where(
        &mut self,
        filter: impl Fn(ProtectionKind) -> bool,
        message: impl Into<String>,
    ) {
        let message = message.into();
        for kind in ProtectionKind::ALL.into_iter().filter(|kind| filter(*kind)) {
            self.messages.insert(kind, message.clone());
        }
    }

    pub fn clear_deny_messages(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn deny_message(&self, kind: ProtectionKind) -> Option<&str> {
        self.messages.get(&kind).map(String::as_str)
    }

    /// Whether this policy has a say about `kind` at `coord`.
    #[must_use]
    pub fn applies(&self, coord: &Coord, kind: ProtectionKind) -> bool {
        self.kinds.contains_kind(kind)
            && self.bound.as_ref().is_none_or(|bound| bound.contains(coord))
            && (self.check)(coord)
    }

    /// First matching rule wins.
    #[must_use]
    pub fn can_bypass(&self, actor: Option<&Actor>, kind: ProtectionKind, coord: &Coord) -> bool {
        self.bypasses.iter().any(|rule| rule(actor, kind, coord))
    }

    /// Whether this policy alone lets the action through.
    ///
    /// Does not send deny messages; [`PolicyIndex::allow`](crate::PolicyIndex::allow)
    /// does that.
    #[must_use]
    pub fn allow(&self, coord: &Coord, kind: ProtectionKind, actor: Option<&Actor>) -> bool {
        !self.applies(coord, kind) || self.can_bypass(actor, kind, coord)
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("bound", &self.bound)
            .field("kinds", &self.kinds)
            .field("bypasses", &self.bypasses.len())
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}
