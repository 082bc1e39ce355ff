//! The block data manager: index, lookups and persistence.

use core::fmt;
use core::num::NonZeroU32;
use std::collections::BTreeMap;

use bulwark_event::{Decision, ObserverId, ObserverSet};
use bulwark_spatial::{Coord, SpatialIndex, WorldId};
use hashbrown::{HashMap, HashSet};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    BlockDataEvent, BlockStore, DataBlock, DataBlockId, ScalarValue, StoreDocument, StoreError,
    StoreResult,
};

/// Callback deciding whether a proposed change to a data block may happen.
pub type DataBlockObserver = dyn Fn(&BlockDataEvent<'_>) -> Decision + Send + Sync;

type Fields = BTreeMap<String, ScalarValue>;

/// Tracks metadata attached to blocks and keeps it in step with the world.
pub struct BlockDataManager {
    index: SpatialIndex<DataBlockId>,
    blocks: HashMap<DataBlockId, DataBlock>,
    next_id: u64,
    pub(crate) observers: ObserverSet<DataBlockObserver>,
    store: Option<Box<dyn BlockStore>>,
    /// Worlds currently loaded; `None` accepts every world.
    worlds: Option<HashSet<WorldId>>,
    /// Records for worlds that are not loaded yet.
    deferred: Vec<(Coord, Fields)>,
}

impl BlockDataManager {
    /// A manager with no backing store. `load` and `save` fail with
    /// [`StoreError::NoStore`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: SpatialIndex::new(),
            blocks: HashMap::new(),
            next_id: 0,
            observers: ObserverSet::new(),
            store: None,
            worlds: None,
            deferred: Vec::new(),
        }
    }

    /// A manager backed by `store`, loaded immediately.
    pub fn with_store(store: impl BlockStore + 'static) -> StoreResult<Self> {
        let mut manager = Self::new();
        manager.store = Some(Box::new(store));
        manager.load()?;
        Ok(manager)
    }

    /// Rebuild the index with a different cell size.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: NonZeroU32) -> Self {
        let mut index = SpatialIndex::with_cell_size(cell_size);
        for block in self.blocks.values() {
            index.set(block.coord(), block.id());
        }
        self.index = index;
        self
    }

    /// Only register records for these worlds; others wait for [`Self::load_world`].
    pub fn restrict_worlds(&mut self, worlds: impl IntoIterator<Item = WorldId>) {
        self.worlds = Some(worlds.into_iter().collect());
    }

    fn world_loaded(&self, world: &WorldId) -> bool {
        self.worlds.as_ref().is_none_or(|worlds| worlds.contains(world))
    }

    /// Mark `world` loaded and register any records deferred for it.
    ///
    /// Returns the number of blocks registered.
    pub fn load_world(&mut self, world: &WorldId) -> usize {
        if let Some(worlds) = &mut self.worlds {
            worlds.insert(world.clone());
        }

        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|(coord, _)| &coord.world == world);
        self.deferred = waiting;

        let count = ready.len();
        for (coord, fields) in ready {
            self.register(coord, fields);
        }
        if count > 0 {
            info!("Registered {count} deferred data blocks for world {world}");
        }
        count
    }

    /// Number of records waiting for their world to load.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    // ==================== Lookups ====================

    /// Ids of every block registered at exactly `coord`.
    pub(crate) fn ids_at(&self, coord: &Coord) -> Vec<DataBlockId> {
        let mut ids: Vec<_> = self
            .index
            .get(coord)
            .copied()
            .filter(|id| self.blocks.get(id).is_some_and(|block| block.coord() == coord))
            .collect();
        ids.sort_unstable();
        ids
    }

    fn find(&self, coord: &Coord) -> Option<DataBlockId> {
        self.ids_at(coord).into_iter().next()
    }

    /// The data block at `coord`, if that block has data.
    #[must_use]
    pub fn get_existing(&self, coord: &Coord) -> Option<&DataBlock> {
        self.find(coord).and_then(|id| self.blocks.get(&id))
    }

    pub fn get_existing_mut(&mut self, coord: &Coord) -> Option<&mut DataBlock> {
        self.find(coord).and_then(|id| self.blocks.get_mut(&id))
    }

    /// The data block at `coord`, registering an empty one if there is none.
    pub fn get_or_create(&mut self, coord: &Coord) -> &mut DataBlock {
        match self.find(coord) {
            Some(id) => self
                .blocks
                .entry(id)
                .or_insert_with(|| DataBlock::new(id, coord.clone(), Fields::new())),
            None => self.register(coord.clone(), Fields::new()),
        }
    }

    #[must_use]
    pub fn get(&self, id: DataBlockId) -> Option<&DataBlock> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: DataBlockId) -> Option<&mut DataBlock> {
        self.blocks.get_mut(&id)
    }

    /// Data blocks in cells near `coord`.
    ///
    /// Coarse: every block in a cell touched by the radius cube is returned.
    pub fn get_nearby(&self, coord: &Coord, radius: u32) -> Vec<&DataBlock> {
        self.index
            .get_nearby(coord, radius)
            .into_iter()
            .filter_map(|id| self.blocks.get(&id))
            .collect()
    }

    /// Every registered data block, oldest first.
    pub fn get_all(&self) -> Vec<&DataBlock> {
        let mut blocks: Vec<_> = self
            .index
            .get_all()
            .into_iter()
            .filter_map(|id| self.blocks.get(&id))
            .collect();
        blocks.sort_unstable_by_key(|block| block.id());
        blocks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // ==================== Mutation ====================

    fn register(&mut self, coord: Coord, fields: Fields) -> &mut DataBlock {
        let id = DataBlockId(self.next_id);
        self.next_id += 1;
        self.index.set(&coord, id);
        tracing::trace!("Registered data block {} at {coord}", id.raw());
        self.blocks
            .entry(id)
            .or_insert_with(|| DataBlock::new(id, coord, fields))
    }

    /// Unregister a data block. Removing an absent block is a no-op.
    ///
    /// Does not persist; call [`Self::save`] for that.
    pub fn remove(&mut self, id: DataBlockId) -> Option<DataBlock> {
        let block = self.blocks.remove(&id)?;
        self.index.remove(block.coord(), &id);
        Some(block)
    }

    /// Move a block's data to `to`: out of the index, then back in.
    pub(crate) fn relocate(&mut self, id: DataBlockId, to: Coord) -> bool {
        let Some(block) = self.blocks.get_mut(&id) else {
            return false;
        };
        self.index.remove(&block.coord, &id);
        block.coord = to;
        self.index.set(&block.coord, id);
        true
    }

    // ==================== Observers ====================

    /// Register an observer of proposed breaks, destructions and moves.
    pub fn observe<F>(&mut self, observer: F) -> ObserverId
    where
        F: Fn(&BlockDataEvent<'_>) -> Decision + Send + Sync + 'static,
    {
        self.observers.add(Box::new(observer))
    }

    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    // ==================== Persistence ====================

    /// Replace the in-memory state with the store's contents.
    ///
    /// Returns the number of blocks registered.
    pub fn load(&mut self) -> StoreResult<usize> {
        let document = self.store.as_ref().ok_or(StoreError::NoStore)?.load_all()?;
        self.blocks.clear();
        self.index.clear();
        self.deferred.clear();
        let count = self.load_document(&document);
        info!(
            "Loaded {count} data blocks ({} deferred)",
            self.deferred.len()
        );
        Ok(count)
    }

    /// Register every decodable record in `document`, keeping existing blocks.
    ///
    /// Keys that are not coordinates are skipped. Returns the number of
    /// blocks registered now (deferred records are not counted).
    pub fn load_document(&mut self, document: &StoreDocument) -> usize {
        let mut count = 0;
        for (key, section) in document {
            let Ok(coord) = key.parse::<Coord>() else {
                debug!("Skipping store key {key:?}: not a coordinate");
                continue;
            };
            let Some(section) = section.as_object() else {
                debug!("Skipping store key {key:?}: not a field map");
                continue;
            };

            let fields = decode_fields(key, section);
            if self.world_loaded(&coord.world) {
                self.register(coord, fields);
                count += 1;
            } else {
                self.deferred.push((coord, fields));
            }
        }
        count
    }

    /// Full snapshot of every block, plus records still waiting for their world.
    ///
    /// Blocks sharing a coordinate are merged in creation order, so the
    /// newest block's value wins for a field both carry.
    #[must_use]
    pub fn to_document(&self) -> StoreDocument {
        let mut document = StoreDocument::new();
        let registered = self
            .get_all()
            .into_iter()
            .map(|block| (block.coord(), block.fields()));
        let deferred = self.deferred.iter().map(|(coord, fields)| (coord, fields));

        for (coord, fields) in registered.chain(deferred) {
            let section = document
                .entry(coord.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(section) = section {
                section.extend(fields.iter().map(|(k, v)| (k.clone(), v.to_json())));
            }
        }
        document
    }

    /// Overwrite the store with a full snapshot.
    pub fn save(&self) -> StoreResult<()> {
        let store = self.store.as_ref().ok_or(StoreError::NoStore)?;
        let document = self.to_document();
        store.save_all(&document)?;
        info!("Saved {} data block records", document.len());
        Ok(())
    }
}

fn decode_fields(key: &str, section: &Map<String, Value>) -> Fields {
    section
        .iter()
        .filter_map(|(field, value)| match ScalarValue::from_json(value) {
            Some(value) => Some((field.clone(), value)),
            None => {
                warn!("Dropping field {field:?} of {key:?}: unsupported value {value}");
                None
            }
        })
        .collect()
}

impl Default for BlockDataManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockDataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDataManager")
            .field("blocks", &self.blocks.len())
            .field("cells", &self.index.cell_count())
            .field("observers", &self.observers.len())
            .field("deferred", &self.deferred.len())
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    fn at(x: i64, y: i64, z: i64) -> Coord {
        Coord::new("world", x, y, z)
    }

    fn doc(value: Value) -> StoreDocument {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_get_or_create_registers_once() {
        let mut manager = BlockDataManager::new();
        let id = manager.get_or_create(&at(1, 2, 3)).id();
        assert_eq!(manager.get_or_create(&at(1, 2, 3)).id(), id);
        assert_eq!(manager.len(), 1);
        assert!(manager.get_existing(&at(1, 2, 4)).is_none());
    }

    #[test]
    fn test_get_existing_scans_shared_cell() {
        let mut manager = BlockDataManager::new();
        manager.get_or_create(&at(1, 1, 1)).set("n", 1);
        manager.get_or_create(&at(2, 2, 2)).set("n", 2);

        assert_eq!(manager.get_existing(&at(2, 2, 2)).and_then(|b| b.get_int("n")), Some(2));
        assert_eq!(manager.get_existing(&at(1, 1, 1)).and_then(|b| b.get_int("n")), Some(1));
        assert!(manager.get_existing(&at(3, 3, 3)).is_none());
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut manager = BlockDataManager::new();
        let id = manager.get_or_create(&at(0, 0, 0)).id();

        assert!(manager.remove(id).is_some());
        assert!(manager.remove(id).is_none());
        assert!(manager.get_existing(&at(0, 0, 0)).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_get_nearby_and_all() {
        let mut manager = BlockDataManager::new();
        manager.get_or_create(&at(0, 0, 0));
        manager.get_or_create(&at(5, 0, 0));
        manager.get_or_create(&at(500, 0, 0));

        assert_eq!(manager.get_nearby(&at(0, 0, 0), 5).len(), 2);
        assert_eq!(manager.get_all().len(), 3);
    }

    #[test]
    fn test_with_cell_size_reindexes() {
        let mut manager = BlockDataManager::new();
        manager.get_or_create(&at(100, 0, 0)).set("k", true);
        let manager = manager.with_cell_size(NonZeroU32::new(64).unwrap());
        assert_eq!(manager.get_existing(&at(100, 0, 0)).and_then(|b| b.get_bool("k")), Some(true));
    }

    #[test]
    fn test_relocate_moves_index_entry() {
        let mut manager = BlockDataManager::new();
        let id = manager.get_or_create(&at(0, 0, 0)).id();
        assert!(manager.relocate(id, at(50, 0, 0)));

        assert!(manager.get_existing(&at(0, 0, 0)).is_none());
        assert_eq!(manager.get_existing(&at(50, 0, 0)).map(DataBlock::id), Some(id));
    }

    #[test]
    fn test_load_skips_bad_keys_and_fields() {
        let mut manager = BlockDataManager::new();
        let loaded = manager.load_document(&doc(json!({
            "world,1,2,3": { "owner": "steve", "bad": null },
            "not a coordinate": { "owner": "alex" },
            "world,4,5,6": "not a section",
            "world,01,2,3": { "owner": "alex" },
        })));

        assert_eq!(loaded, 1);
        let block = manager.get_existing(&at(1, 2, 3)).unwrap();
        assert_eq!(block.get_str("owner"), Some("steve"));
        assert!(!block.contains("bad"));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = MemoryStore::new();
        let mut manager = BlockDataManager::with_store(store.clone()).unwrap();
        {
            let block = manager.get_or_create(&at(-7, 64, 12));
            block.set("owner", "steve");
            block.set("uses", 4);
            block.set("ratio", 0.5);
            block.set("tags", vec!["a", "b"]);
        }
        manager.get_or_create(&Coord::new("world_nether", 0, 70, 0)).set("lit", true);
        manager.get_or_create(&at(9, 9, 9));
        manager.save().unwrap();

        let reloaded = BlockDataManager::with_store(store).unwrap();
        let mut before: Vec<_> = manager
            .get_all()
            .into_iter()
            .map(|b| (b.coord().clone(), b.fields().clone()))
            .collect();
        let mut after: Vec<_> = reloaded
            .get_all()
            .into_iter()
            .map(|b| (b.coord().clone(), b.fields().clone()))
            .collect();
        before.sort_by(|a, b| a.0.cmp(&b.0));
        after.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_replaces_state() {
        let store = MemoryStore::with_document(doc(json!({ "world,0,0,0": { "n": 1 } })));
        let mut manager = BlockDataManager::with_store(store).unwrap();
        manager.get_or_create(&at(1, 1, 1));

        assert_eq!(manager.load().unwrap(), 1);
        assert_eq!(manager.len(), 1);
        assert!(manager.get_existing(&at(1, 1, 1)).is_none());
    }

    #[test]
    fn test_no_store() {
        let mut manager = BlockDataManager::new();
        assert!(matches!(manager.load(), Err(StoreError::NoStore)));
        assert!(matches!(manager.save(), Err(StoreError::NoStore)));
    }

    #[test]
    fn test_deferred_worlds() {
        let mut manager = BlockDataManager::new();
        manager.restrict_worlds([WorldId::new("world")]);
        let loaded = manager.load_document(&doc(json!({
            "world,0,0,0": { "n": 1 },
            "world_the_end,0,0,0": { "n": 2 },
        })));

        assert_eq!(loaded, 1);
        assert_eq!(manager.deferred_len(), 1);
        assert!(manager.get_existing(&Coord::new("world_the_end", 0, 0, 0)).is_none());

        // Deferred records survive a save.
        assert!(manager.to_document().contains_key("world_the_end,0,0,0"));

        assert_eq!(manager.load_world(&WorldId::new("world_the_end")), 1);
        assert_eq!(manager.deferred_len(), 0);
        assert_eq!(
            manager
                .get_existing(&Coord::new("world_the_end", 0, 0, 0))
                .and_then(|b| b.get_int("n")),
            Some(2)
        );
    }
}
