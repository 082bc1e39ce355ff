use std::sync::Arc;

use bulwark_data::{
    BlockChange, BlockDataManager, BlockStore, DestroyCause, JsonFileStore, MemoryStore,
};
use bulwark_event::{Actor, Decision, EventQueue, Listener, Notification, WorldEvent};
use bulwark_spatial::{Coord, Direction};
use parking_lot::Mutex;

fn at(x: i64, y: i64, z: i64) -> Coord {
    Coord::new("w", x, y, z)
}

struct Cancel;

impl Listener for Cancel {
    fn on_event(&mut self, notification: &mut Notification) {
        notification.cancel();
    }
}

fn deliver(manager: &mut BlockDataManager, event: WorldEvent) -> Notification {
    let mut notification = Notification::new(event);
    manager.on_event(&mut notification);
    notification
}

#[test]
fn test_unvetoed_break_removes_entity() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(0, 0, 0)).set("count", 1);

    let notification = deliver(
        &mut manager,
        WorldEvent::BlockBreak {
            block: at(0, 0, 0),
            player: Actor::new("steve"),
        },
    );

    assert!(!notification.is_cancelled());
    assert!(manager.get_existing(&at(0, 0, 0)).is_none());
}

#[test]
fn test_vetoed_break_keeps_entity_and_flags_notification() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(0, 0, 0)).set("count", 1);
    manager.observe(|_| Decision::Deny);

    let notification = deliver(
        &mut manager,
        WorldEvent::BlockBreak {
            block: at(0, 0, 0),
            player: Actor::new("steve"),
        },
    );

    assert!(notification.is_cancelled());
    assert!(notification.is_vetoed(&at(0, 0, 0)));
    let block = manager.get_existing(&at(0, 0, 0)).unwrap();
    assert_eq!(block.get_int("count"), Some(1));
    assert_eq!(block.fields().len(), 1);
}

#[test]
fn test_explosion_excludes_only_vetoed_coordinate() {
    let mut manager = BlockDataManager::new();
    for x in 0..3 {
        manager.get_or_create(&at(x, 0, 0)).set("x", x);
    }
    let guarded = at(1, 0, 0);
    let rule = guarded.clone();
    manager.observe(move |event| Decision::from(event.block.coord() != &rule));

    let notification = deliver(
        &mut manager,
        WorldEvent::EntityExplode {
            blocks: vec![at(0, 0, 0), at(1, 0, 0), at(2, 0, 0)],
        },
    );

    assert!(!notification.is_cancelled());
    assert_eq!(manager.len(), 1);
    assert!(manager.get_existing(&guarded).is_some());
    assert_eq!(notification.excluded(), &[guarded.clone()]);
    assert_eq!(
        notification.event().batch(),
        Some(&[at(0, 0, 0), at(2, 0, 0)][..])
    );
}

#[test]
fn test_observers_see_explosion_cause() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(0, 0, 0));
    let log = Arc::clone(&seen);
    manager.observe(move |event| {
        if let BlockChange::Destroy { cause } = event.change {
            log.lock().push(cause);
        }
        Decision::Allow
    });

    deliver(
        &mut manager,
        WorldEvent::BlockExplode {
            block: at(5, 0, 0),
            blocks: vec![at(0, 0, 0), at(1, 0, 0)],
        },
    );

    assert_eq!(*seen.lock(), vec![DestroyCause::Explosion]);
}

#[test]
fn test_unobserve_stops_vetoes() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(0, 0, 0));
    let id = manager.observe(|_| Decision::Deny);
    assert!(manager.unobserve(id));
    assert!(!manager.unobserve(id));

    let notification = deliver(&mut manager, WorldEvent::BlockBurn { block: at(0, 0, 0) });
    assert!(!notification.is_cancelled());
    assert!(manager.is_empty());
}

#[test]
fn test_piston_chain_shifts_every_block_once() {
    let mut manager = BlockDataManager::new();
    for x in 1..=3 {
        manager.get_or_create(&at(x, 0, 0)).set("origin", x);
    }

    deliver(
        &mut manager,
        WorldEvent::PistonExtend {
            piston: at(0, 0, 0),
            direction: Direction::East,
            blocks: vec![at(1, 0, 0), at(2, 0, 0), at(3, 0, 0)],
        },
    );

    assert!(manager.get_existing(&at(1, 0, 0)).is_none());
    for x in 2..=4 {
        let block = manager.get_existing(&at(x, 0, 0)).unwrap();
        assert_eq!(block.get_int("origin"), Some(x - 1));
    }
    assert_eq!(manager.len(), 3);
}

#[test]
fn test_piston_retract_pulls_data() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(0, 2, 0)).set("sticky", true);

    deliver(
        &mut manager,
        WorldEvent::PistonRetract {
            piston: at(0, 0, 0),
            direction: Direction::Down,
            blocks: vec![at(0, 2, 0)],
        },
    );

    assert_eq!(
        manager.get_existing(&at(0, 1, 0)).and_then(|b| b.get_bool("sticky")),
        Some(true)
    );
}

#[test]
fn test_vetoed_move_cancels_piston_but_applies_others() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(1, 0, 0)).set("pinned", true);
    manager.get_or_create(&at(1, 0, 5)).set("pinned", false);
    manager.observe(|event| Decision::from(event.block.get_bool("pinned") != Some(true)));

    let notification = deliver(
        &mut manager,
        WorldEvent::PistonExtend {
            piston: at(0, 0, 0),
            direction: Direction::Up,
            blocks: vec![at(1, 0, 0), at(1, 0, 5)],
        },
    );

    assert!(notification.is_cancelled());
    assert!(manager.get_existing(&at(1, 0, 0)).is_some());
    assert!(manager.get_existing(&at(1, 1, 5)).is_some());
}

#[test]
fn test_relocation_onto_tracked_block_keeps_both() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(1, 0, 0)).set("name", "mover");
    manager.get_or_create(&at(2, 0, 0)).set("name", "resident");

    deliver(
        &mut manager,
        WorldEvent::PistonExtend {
            piston: at(0, 0, 0),
            direction: Direction::East,
            blocks: vec![at(1, 0, 0)],
        },
    );

    // Nothing merges: two blocks now share one coordinate.
    assert_eq!(manager.len(), 2);
    let names: Vec<_> = manager
        .get_all()
        .into_iter()
        .filter(|block| block.coord() == &at(2, 0, 0))
        .filter_map(|block| block.get_str("name").map(str::to_owned))
        .collect();
    assert_eq!(names.len(), 2);
}

#[test]
fn test_shared_coordinate_saves_newest_fields() {
    let store = MemoryStore::new();
    let mut manager = BlockDataManager::with_store(store.clone()).unwrap();
    manager.get_or_create(&at(1, 0, 0)).set("name", "mover");
    manager.get_or_create(&at(1, 0, 0)).set("pushed", true);
    manager.get_or_create(&at(2, 0, 0)).set("name", "resident");

    deliver(
        &mut manager,
        WorldEvent::PistonExtend {
            piston: at(0, 0, 0),
            direction: Direction::East,
            blocks: vec![at(1, 0, 0)],
        },
    );
    manager.save().unwrap();

    let document = store.load_all().unwrap();
    assert_eq!(document.len(), 1);
    let section = &document["w,2,0,0"];
    assert_eq!(section["name"], "resident");
    assert_eq!(section["pushed"], true);
}

#[test]
fn test_cancelled_notifications_are_ignored() {
    let mut manager = BlockDataManager::new();
    manager.get_or_create(&at(0, 0, 0));

    let mut queue = EventQueue::new();
    queue.push(WorldEvent::BlockBreak {
        block: at(0, 0, 0),
        player: Actor::new("steve"),
    });

    let mut cancel = Cancel;
    let listeners: &mut [&mut dyn Listener] = &mut [&mut cancel, &mut manager];
    let delivered = queue.flush(listeners);

    assert!(delivered[0].is_cancelled());
    assert!(manager.get_existing(&at(0, 0, 0)).is_some());
}

#[test]
fn test_file_roundtrip_across_managers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocks.json");

    let mut manager = BlockDataManager::with_store(JsonFileStore::new(&path)).unwrap();
    {
        let block = manager.get_or_create(&at(-3, 70, 12));
        block.set("owner", "steve");
        block.set("uses", 4);
        block.set("tags", vec!["a", "b"]);
    }
    manager.save().unwrap();

    let reloaded = BlockDataManager::with_store(JsonFileStore::new(&path)).unwrap();
    assert_eq!(reloaded.len(), 1);
    let block = reloaded.get_existing(&at(-3, 70, 12)).unwrap();
    assert_eq!(block.get_str("owner"), Some("steve"));
    assert_eq!(block.get_int("uses"), Some(4));
    assert_eq!(block.get_list("tags").map(<[_]>::len), Some(2));
}

#[test]
fn test_removed_block_is_gone_after_save() {
    let store = MemoryStore::new();
    let mut manager = BlockDataManager::with_store(store.clone()).unwrap();
    let id = manager.get_or_create(&at(0, 0, 0)).id();
    manager.get_or_create(&at(1, 0, 0));
    manager.save().unwrap();

    assert!(manager.remove(id).is_some());
    assert!(manager.remove(id).is_none());
    manager.save().unwrap();

    let document = store.load_all().unwrap();
    assert_eq!(document.len(), 1);
    assert!(document.contains_key("w,1,0,0"));
}
