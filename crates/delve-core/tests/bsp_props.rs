use delve_core::{BspGenerator, BspParams, GameRng};
use proptest::prelude::*;

fn generate(params: BspParams, seed: u64) -> BspGenerator {
    let mut bsp = BspGenerator::new(params).unwrap();
    bsp.generate(&mut GameRng::new(seed));
    bsp
}

proptest! {
    #[test]
    fn prop_children_inside_parents(seed in any::<u64>()) {
        let bsp = generate(BspParams::with_size(50, 40), seed);
        let nodes = bsp.nodes();
        prop_assert!(nodes[0].parent.is_none());

        for (i, node) in nodes.iter().enumerate().skip(1) {
            let parent = &nodes[node.parent.unwrap() as usize];
            prop_assert!(parent.rect.contains_rect(&node.rect), "node {} escapes its parent", i);
            prop_assert_eq!(node.depth, parent.depth + 1);
        }

        for i in 0..nodes.len() {
            if let [a, b] = bsp.children(i) {
                prop_assert!(!a.rect.intersects(&b.rect));
                prop_assert_eq!(a.rect.area() + b.rect.area(), nodes[i].rect.area());
            }
        }
    }

    #[test]
    fn prop_leaves_do_not_overlap(seed in any::<u64>()) {
        let bsp = generate(BspParams::with_size(50, 40), seed);
        let leaves: Vec<_> = bsp.iter().collect();

        let mut overlapping = 0;
        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                if a.rect.intersects(&b.rect) {
                    overlapping += 1;
                }
            }
        }
        prop_assert_eq!(overlapping, 0);

        let covered: i32 = leaves.iter().map(|l| l.rect.area()).sum();
        prop_assert_eq!(covered, 50 * 40);
    }

    #[test]
    fn prop_leaves_sorted_biggest_first(seed in any::<u64>()) {
        let bsp = generate(BspParams::with_size(50, 40), seed);
        let leaves: Vec<_> = bsp.iter().collect();
        for pair in leaves.windows(2) {
            let (a, b) = (&pair[0].rect, &pair[1].rect);
            prop_assert!(a.min_dimension() >= b.min_dimension());
            if a.min_dimension() == b.min_dimension() {
                prop_assert!(a.area() >= b.area());
            }
        }
    }

    #[test]
    fn prop_rooms_fit_their_leaf(seed in any::<u64>(), min_room in 3i32..6) {
        let params = BspParams {
            min_room_size: min_room,
            ..BspParams::with_size(60, 45)
        };
        let bsp = generate(params, seed);
        for leaf in bsp.iter() {
            prop_assert!(leaf.rect.width() >= 3 && leaf.rect.height() >= 3);
            prop_assert!(leaf.rect.width() <= 20 && leaf.rect.height() <= 20);
            if let Some(room) = leaf.room {
                prop_assert!(leaf.rect.contains_rect(&room));
                prop_assert!(room.width() <= 20 && room.height() <= 20);
            }
        }
    }
}

#[test]
fn test_params_load_with_defaults() {
    let params: BspParams =
        serde_json::from_str(r#"{ "width": 64, "room_chance_num": 30 }"#).unwrap();
    assert_eq!(params.width, 64);
    assert_eq!(params.height, 100);
    assert_eq!(params.room_chance_num, 30);
    assert_eq!(params.room_chance_den, 100);
    assert_eq!(params.split_variance, 5.0);
    assert!(BspGenerator::new(params).is_ok());
}
