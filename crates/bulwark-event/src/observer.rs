//! Observers of domain decisions.
//!
//! A subsystem proposes a mutation, asks its observers for a [`Decision`],
//! then commits or rolls back. Observers never flip a shared cancel flag;
//! they return a value.

use core::fmt;

/// Unique identifier for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u32);

impl ObserverId {
    /// Create a new observer ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An observer's verdict on a proposed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Decision {
    #[default]
    Allow,
    Deny,
}

impl Decision {
    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Deny)
    }

    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Deny wins.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Allow, Self::Allow) => Self::Allow,
            _ => Self::Deny,
        }
    }
}

impl From<bool> for Decision {
    /// `true` allows.
    fn from(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Deny }
    }
}

/// Folds every observer's decision; any deny denies.
impl FromIterator<Decision> for Decision {
    fn from_iter<I: IntoIterator<Item = Decision>>(iter: I) -> Self {
        iter.into_iter().fold(Self::Allow, Self::and)
    }
}

/// A registered observer callback.
pub struct ObserverInfo<F: ?Sized> {
    /// Unique ID
    pub id: ObserverId,
    pub callback: Box<F>,
}

impl<F: ?Sized> fmt::Debug for ObserverInfo<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverInfo")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Observers of one decision type, in registration order.
///
/// `F` is the (unsized) callback type, e.g.
/// `dyn Fn(&BlockDataEvent<'_>) -> Decision + Send + Sync`, so decision
/// payloads may borrow from the subsystem raising them.
pub struct ObserverSet<F: ?Sized> {
    observers: Vec<ObserverInfo<F>>,
    next_id: u32,
}

impl<F: ?Sized> ObserverSet<F> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a callback.
    pub fn add(&mut self, callback: Box<F>) -> ObserverId {
        let id = ObserverId::new(self.next_id);
        self.next_id += 1;
        self.observers.push(ObserverInfo { id, callback });
        id
    }

    /// Unregister a callback. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|info| info.id != id);
        self.observers.len() != before
    }

    /// Callbacks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &F> + '_ {
        self.observers.iter().map(|info| &*info.callback)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<F: ?Sized> Default for ObserverSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for ObserverSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.observers).finish()
    }
}
