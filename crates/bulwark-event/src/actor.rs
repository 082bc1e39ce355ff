//! Actors: the players behind player-driven events.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player that can cause events and receive deny messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    /// Create an actor with a fresh random id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    #[must_use]
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actors_with_same_name_differ() {
        let a = Actor::new("steve");
        let b = Actor::new("steve");
        assert_ne!(a, b);
        assert_eq!(a, Actor::with_id(a.id, "steve"));
        assert_eq!(a.to_string(), "steve");
    }
}
