//! Runner configuration: environment variables and the policy file.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use bulwark_protect::{Policy, ProtectionKind, ProtectionKinds};
use bulwark_spatial::Region;
use eyre::{WrapErr, eyre};
use serde::Deserialize;

/// Where the runner reads and writes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Block data store (`BULWARK_DATA`).
    pub data: PathBuf,
    /// Policy file (`BULWARK_POLICIES`).
    pub policies: Option<PathBuf>,
    /// Cell size for both indexes (`BULWARK_CELL_SIZE`).
    pub cell_size: Option<NonZeroU32>,
    /// Event script to replay.
    pub script: PathBuf,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let data = std::env::var("BULWARK_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/blocks.json"));

        let policies = std::env::var("BULWARK_POLICIES").ok().map(PathBuf::from);

        let cell_size = std::env::var("BULWARK_CELL_SIZE")
            .ok()
            .map(|size| size.parse::<NonZeroU32>())
            .transpose()
            .wrap_err("BULWARK_CELL_SIZE must be a positive integer")?;

        let script = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("usage: bulwark-runner <events.json>"))?;

        Ok(Self {
            data,
            policies,
            cell_size,
            script,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundConfig {
    pub world: String,
    pub min: [i64; 3],
    pub max: [i64; 3],
}

/// One entry of the policy file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Leave out for a global policy.
    #[serde(default)]
    pub bound: Option<BoundConfig>,
    pub protect: Vec<ProtectionKind>,
    /// Keyed by kind name, e.g. `"BREAK_BLOCK"`.
    #[serde(default)]
    pub deny_messages: BTreeMap<ProtectionKind, String>,
    /// Actors, by name, that may do anything.
    #[serde(default)]
    pub bypass_actors: Vec<String>,
}

impl PolicyConfig {
    pub fn into_policy(self) -> Policy {
        let kinds: ProtectionKinds = self.protect.into_iter().collect();
        let mut policy = match self.bound {
            Some(bound) => Policy::bounded(Region::from_corners(bound.world, bound.min, bound.max), kinds),
            None => Policy::global(kinds),
        };

        for (kind, message) in self.deny_messages {
            policy.set_deny_message(kind, message);
        }

        if !self.bypass_actors.is_empty() {
            let names = self.bypass_actors;
            policy.add_actor_bypass(move |actor, _| {
                actor.is_some_and(|actor| names.contains(&actor.name))
            });
        }
        policy
    }
}

pub fn load_policies(path: &Path) -> eyre::Result<Vec<PolicyConfig>> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read policy file {}", path.display()))?;
    serde_json::from_str(&text)
        .wrap_err_with(|| format!("Failed to parse policy file {}", path.display()))
}
