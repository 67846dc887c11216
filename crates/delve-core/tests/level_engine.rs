use delve_core::{
    EntityId, GameRng, ItemId, Level, LevelParams, PlacementResult, Point, Rect, TileDataSet,
    UniqueEntity, UniqueItem, Vec2,
};
use proptest::prelude::*;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scenario_params() -> LevelParams {
    let mut params = LevelParams::with_size(50, 40);
    params.bsp.min_region_size = 3;
    params.bsp.max_region_size = 20;
    params.bsp.room_chance_num = 60;
    params.bsp.room_chance_den = 100;
    params
}

/// A 16x12 floor with a pillar at (8, 6)
fn arena() -> Level {
    let mut level = Level::new(16, 12, 0);
    level.fill_tiles(Rect::new(1, 1, 15, 11), &TileDataSet::floor());
    level.update_tile_at(Point::new(8, 6), &TileDataSet::wall());
    level
}

#[derive(Debug, PartialEq)]
struct Snapshot {
    tiles: Vec<String>,
    regions: Vec<u16>,
    entities: Vec<(EntityId, Point)>,
}

fn snapshot(level: &Level) -> Snapshot {
    let all = level.bounds();
    let mut entities = Vec::new();
    level.for_each_entity(|id, p| entities.push((id, p)));
    Snapshot {
        tiles: level.tile_ids(all).iter().map(|t| format!("{t:?}")).collect(),
        regions: level.region_ids(all).iter().copied().collect(),
        entities,
    }
}

#[test]
fn test_end_to_end_scenario() {
    init_logs();
    let mut rng = GameRng::new(2024);
    let mut level = Level::generate(&mut rng, &scenario_params(), 1).unwrap();

    // Leaves are numbered biggest first; take the biggest one holding a room
    let info = (0..level.region_count())
        .filter_map(|i| level.region(i))
        .find(|r| r.room.is_some())
        .unwrap();
    let p = info.room.unwrap().center();

    assert_eq!(level.can_place_entity_at(p), PlacementResult::Ok);
    let id = level
        .add_object_at(UniqueEntity::new(EntityId(42)), p)
        .unwrap();
    assert_eq!(level.entity_at(p), Some(id));
    assert_eq!(level.find(id), Some(p));
    assert_eq!(level.region(info.id as usize).unwrap().entity_count, 1);
}

#[test]
fn test_items_and_entities_share_cells() {
    let mut level = arena();
    let p = Point::new(3, 3);
    level.add_object_at(UniqueEntity::new(EntityId(1)), p).unwrap();
    level.add_object_at(UniqueItem::new(ItemId(7)), p).unwrap();

    let err = level
        .add_object_at(UniqueEntity::new(EntityId(2)), p)
        .unwrap_err();
    assert_eq!(err.reason, PlacementResult::FailedEntity);
    assert_eq!(err.object.release(), EntityId(2));
    assert_eq!(level.item_at(p).unwrap().items(), &[ItemId(7)]);
}

#[test]
fn test_entity_walks_around_pillar() {
    let mut level = arena();
    let id = level
        .add_object_at(UniqueEntity::new(EntityId(1)), Point::new(6, 6))
        .unwrap();

    let mut path = Vec::new();
    assert!(level.find_path(Point::new(6, 6), Point::new(10, 6), &mut path));
    assert!(!path.contains(&Point::new(8, 6)));

    let mut at = Point::new(6, 6);
    for step in path.clone() {
        assert_eq!(level.move_by(id, step - at), PlacementResult::Ok);
        at = step;
    }
    assert_eq!(level.find(id), Some(Point::new(10, 6)));
    assert!(!level.has_line_of_sight(Point::new(6, 6), Point::new(10, 6)));
    assert!(level.has_line_of_sight(Point::new(6, 5), Point::new(10, 5)));
}

proptest! {
    #[test]
    fn prop_failed_move_changes_nothing(
        x in 0..16i32,
        y in 0..12i32,
        dx in -20..20i32,
        dy in -20..20i32,
    ) {
        let mut level = arena();
        let id = level
            .add_object_at(UniqueEntity::new(EntityId(1)), Point::new(7, 6))
            .unwrap();
        let other = Point::new(x.clamp(1, 14), y.clamp(1, 10));
        level.add_object_at(UniqueEntity::new(EntityId(2)), other).ok();

        let before = snapshot(&level);
        let from = level.find(id).unwrap();
        let v = Vec2::new(dx, dy);
        let expected = level.can_place_entity_at(from + v);

        let result = level.move_by(id, v);
        if v == Vec2::ZERO {
            prop_assert_eq!(result, PlacementResult::Ok);
        } else {
            prop_assert_eq!(result, expected);
        }
        if !result.is_ok() {
            prop_assert_eq!(snapshot(&level), before);
        }
    }

    #[test]
    fn prop_round_trip_move(dx in -3..=3i32, dy in -3..=3i32) {
        let mut level = arena();
        let id = level.add_object_at(UniqueEntity::new(EntityId(1)), Point::new(4, 4)).unwrap();
        let v = Vec2::new(dx, dy);

        if level.move_by(id, v).is_ok() && level.move_by(id, -v).is_ok() {
            prop_assert_eq!(level.find(id), Some(Point::new(4, 4)));
        }
    }

    #[test]
    fn prop_nearest_placement_bound(
        seed in any::<u64>(),
        x in -3..19i32,
        y in -3..15i32,
        d in 0..5i32,
        crowd in 0usize..30,
    ) {
        let mut rng = GameRng::new(seed);
        let mut level = arena();
        for i in 0..crowd {
            let q = Point::new(1 + (i as i32 * 7) % 14, 1 + (i as i32 * 3) % 10);
            level.add_object_at(UniqueEntity::new(EntityId(100 + i as u32)), q).ok();
        }

        let target = Point::new(x, y);
        match level.find_valid_entity_placement_nearest(&mut rng, target, d) {
            Ok(q) => {
                prop_assert!(q.chebyshev(target) <= d);
                prop_assert_eq!(level.can_place_entity_at(q), PlacementResult::Ok);
            }
            Err(reason) => prop_assert!(!reason.is_ok()),
        }

        match level.add_object_nearest_random(&mut rng, UniqueEntity::new(EntityId(1)), target, d) {
            Ok((q, id)) => {
                prop_assert!(q.chebyshev(target) <= d);
                prop_assert_eq!(level.entity_at(q), Some(id));
            }
            Err(err) => {
                prop_assert!(!err.reason.is_ok());
                prop_assert!(level.find(EntityId(1)).is_none());
            }
        }
    }
}

#[test]
fn test_generated_level_params_from_json() {
    let params: LevelParams =
        serde_json::from_str(r#"{ "bsp": { "width": 40, "height": 30 }, "stairs_down": 2 }"#)
            .unwrap();
    assert_eq!(params.bsp.width, 40);
    assert_eq!(params.stairs_up, 1);
    assert_eq!(params.stairs_down, 2);

    let mut rng = GameRng::new(5);
    let level = Level::generate(&mut rng, &params, 2).unwrap();
    assert_eq!(level.bounds(), Rect::new(0, 0, 40, 30));
    assert!(level.stair_down(1).is_some());
}
