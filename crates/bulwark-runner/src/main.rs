//! Bulwark event replay runner
//!
//! This binary:
//! 1. Loads block data from `BULWARK_DATA`
//! 2. Registers the policies from `BULWARK_POLICIES`
//! 3. Replays a JSON event script through protection, then block data
//! 4. Reports what was denied and saves the block data
//!
//! Logging follows `RUST_LOG`.

mod config;

use bulwark_data::{BlockDataManager, JsonFileStore};
use bulwark_event::{EventQueue, Listener, WorldEvent};
use bulwark_protect::{Outbox, PolicyIndex};
use eyre::WrapErr;
use tracing::{info, warn};

use crate::config::Config;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bulwark_runner=info".parse()?)
                .add_directive("bulwark_data=info".parse()?)
                .add_directive("bulwark_protect=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!("Block data: {}", config.data.display());

    let mut manager = BlockDataManager::with_store(JsonFileStore::new(&config.data))
        .wrap_err_with(|| format!("Failed to load block data from {}", config.data.display()))?;

    let outbox = Outbox::new();
    let mut policies = PolicyIndex::new().with_messenger(outbox.clone());

    if let Some(cell_size) = config.cell_size {
        info!("Cell size: {cell_size}");
        manager = manager.with_cell_size(cell_size);
        policies = policies.with_cell_size(cell_size);
    }

    if let Some(path) = &config.policies {
        for policy in config::load_policies(path)? {
            policies.insert(policy.into_policy());
        }
        info!("Registered {} policies from {}", policies.len(), path.display());
    }

    let script = std::fs::read_to_string(&config.script)
        .wrap_err_with(|| format!("Failed to read event script {}", config.script.display()))?;
    let events: Vec<WorldEvent> = serde_json::from_str(&script)
        .wrap_err_with(|| format!("Failed to parse event script {}", config.script.display()))?;

    let mut queue = EventQueue::new();
    queue.extend(events);

    let listeners: &mut [&mut dyn Listener] = &mut [&mut policies, &mut manager];
    let delivered = queue.flush(listeners);

    let cancelled = delivered.iter().filter(|n| n.is_cancelled()).count();
    let excluded: usize = delivered.iter().map(|n| n.excluded().len()).sum();
    for (actor, message) in outbox.take() {
        warn!("Denied {}: {message}", actor.name);
    }
    info!(
        "Replayed {} events: {cancelled} cancelled, {excluded} blocks spared from batches",
        delivered.len()
    );
    info!("{} data blocks tracked", manager.len());

    manager.save().wrap_err("Failed to save block data")?;
    Ok(())
}
