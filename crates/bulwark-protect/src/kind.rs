//! Protection kinds and sets of them.

use core::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// An action a policy can forbid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectionKind {
    /// Players breaking blocks.
    BreakBlock,
    /// Players placing blocks.
    PlaceBlock,
    /// Players right-clicking blocks that react to it.
    Interact,
    /// Players filling or emptying buckets.
    UseBuckets,
    /// Players opening containers.
    ContainerAccess,
    EntityExplosion,
    BlockExplosion,
    /// Pistons pushing and pulling blocks.
    Pistons,
    Redstone,
    /// Falling blocks landing.
    FallingBlock,
    /// Crops growing, blocks spreading and forming.
    Growth,
    Fade,
    /// Liquids flowing.
    Flow,
    AnvilBreak,
    MobSpawn,
    Silverfish,
    /// Fire burning blocks away.
    Fire,
}

impl ProtectionKind {
    pub const ALL: [Self; 17] = [
        Self::BreakBlock,
        Self::PlaceBlock,
        Self::Interact,
        Self::UseBuckets,
        Self::ContainerAccess,
        Self::EntityExplosion,
        Self::BlockExplosion,
        Self::Pistons,
        Self::Redstone,
        Self::FallingBlock,
        Self::Growth,
        Self::Fade,
        Self::Flow,
        Self::AnvilBreak,
        Self::MobSpawn,
        Self::Silverfish,
        Self::Fire,
    ];

    /// The single-kind set.
    #[must_use]
    pub const fn flag(self) -> ProtectionKinds {
        ProtectionKinds::from_bits_retain(1 << self as u32)
    }
}

/// Writes the name used in policy files, e.g. `BREAK_BLOCK`.
impl fmt::Display for ProtectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BreakBlock => "BREAK_BLOCK",
            Self::PlaceBlock => "PLACE_BLOCK",
            Self::Interact => "INTERACT",
            Self::UseBuckets => "USE_BUCKETS",
            Self::ContainerAccess => "CONTAINER_ACCESS",
            Self::EntityExplosion => "ENTITY_EXPLOSION",
            Self::BlockExplosion => "BLOCK_EXPLOSION",
            Self::Pistons => "PISTONS",
            Self::Redstone => "REDSTONE",
            Self::FallingBlock => "FALLING_BLOCK",
            Self::Growth => "GROWTH",
            Self::Fade => "FADE",
            Self::Flow => "FLOW",
            Self::AnvilBreak => "ANVIL_BREAK",
            Self::MobSpawn => "MOB_SPAWN",
            Self::Silverfish => "SILVERFISH",
            Self::Fire => "FIRE",
        })
    }
}

bitflags! {
    /// A set of [`ProtectionKind`]s. Bit `n` is the `n`th kind of
    /// [`ProtectionKind::ALL`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ProtectionKinds: u32 {
        const BREAK_BLOCK = 1 << 0;
        const PLACE_BLOCK = 1 << 1;
        const INTERACT = 1 << 2;
        const USE_BUCKETS = 1 << 3;
        const CONTAINER_ACCESS = 1 << 4;
        const ENTITY_EXPLOSION = 1 << 5;
        const BLOCK_EXPLOSION = 1 << 6;
        const PISTONS = 1 << 7;
        const REDSTONE = 1 << 8;
        const FALLING_BLOCK = 1 << 9;
        const GROWTH = 1 << 10;
        const FADE = 1 << 11;
        const FLOW = 1 << 12;
        const ANVIL_BREAK = 1 << 13;
        const MOB_SPAWN = 1 << 14;
        const SILVERFISH = 1 << 15;
        const FIRE = 1 << 16;
    }
}

impl ProtectionKinds {
    /// Every kind.
    pub const ALL: Self = Self::all();

    /// Actions players take directly on blocks.
    pub const DIRECT_PLAYERS: Self = Self::BREAK_BLOCK
        .union(Self::PLACE_BLOCK)
        .union(Self::INTERACT)
        .union(Self::CONTAINER_ACCESS)
        .union(Self::USE_BUCKETS);

    /// Actions usually started by players that reach blocks indirectly.
    pub const INDIRECT_PLAYERS: Self = Self::PISTONS
        .union(Self::REDSTONE)
        .union(Self::ENTITY_EXPLOSION)
        .union(Self::BLOCK_EXPLOSION)
        .union(Self::FALLING_BLOCK)
        .union(Self::FIRE);

    /// Processes nobody causes.
    pub const NATURAL: Self = Self::GROWTH
        .union(Self::FADE)
        .union(Self::FLOW)
        .union(Self::MOB_SPAWN);

    #[must_use]
    pub const fn all_except(except: Self) -> Self {
        Self::all().difference(except)
    }

    #[must_use]
    pub const fn contains_kind(self, kind: ProtectionKind) -> bool {
        self.contains(kind.flag())
    }

    /// The kinds in this set, in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = ProtectionKind> {
        ProtectionKind::ALL
            .into_iter()
            .filter(move |kind| self.contains_kind(*kind))
    }
}

impl From<ProtectionKind> for ProtectionKinds {
    fn from(kind: ProtectionKind) -> Self {
        kind.flag()
    }
}

impl FromIterator<ProtectionKind> for ProtectionKinds {
    fn from_iter<I: IntoIterator<Item = ProtectionKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, kind| set.union(kind.flag()))
    }
}
