
use rtreedex::Index;
use shared::*;

/// BulkLoad 200 random rectangles, capacity=4, minFill=2. Delete 195 of them
/// in random order, checking consistency after every delete. Final height
/// must be at most 2.
#[test]
fn scenario_c_delete_and_root_collapse() {
    let mut rng = Lcg::new(0xC0FFEE);

    let entries: Vec<(rtreedex::geometry::Rectangle, i32)> =
        (0..200).map(|id| (random_rect(&mut rng, 1000.0, 5.0), id)).collect();

    let mut idx = Index::with_consistency_checking(4, 2, true).unwrap();
    idx.bulk_load(entries.clone());
    assert_eq!(idx.size(), 200);

    let mut order: Vec<usize> = (0..200).collect();
    // Fisher-Yates shuffle using the same deterministic generator.
    for i in (1..order.len()).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        order.swap(i, j);
    }

    for &pos in order.iter().take(195) {
        let (rect, id) = entries[pos];
        assert!(idx.delete(rect, id), "entry {id} should still be present");
    }

    assert_eq!(idx.size(), 5);
    assert!(idx.height() <= 2, "height was {}", idx.height());
}

/// BulkLoad N=10000 rectangles, capacity=50. `numNodes()` must stay within the
/// geometric upper bound implied by repeatedly tiling at `capacity` per level.
#[test]
fn scenario_d_str_packing_node_count_bound() {
    let mut rng = Lcg::new(0x5EED_1234);
    let n = 10_000usize;
    let entries: Vec<(rtreedex::geometry::Rectangle, i32)> =
        (0..n as i32).map(|id| (random_rect(&mut rng, 100_000.0, 20.0), id)).collect();

    let mut idx = Index::new(50, 20).unwrap();
    idx.bulk_load(entries.clone());

    assert_eq!(idx.size(), n as u64);

    let capacity = 50u64;
    let mut bound = 0u64;
    let mut level_size = n as u64;
    loop {
        level_size = level_size.div_ceil(capacity);
        bound += level_size;
        if level_size <= 1 {
            break;
        }
    }
    assert!(
        idx.num_nodes() <= bound,
        "num_nodes {} exceeded bound {bound}",
        idx.num_nodes()
    );

    let whole_plane = rect(-1.0e9, -1.0e9, 1.0e9, 1.0e9);
    assert_eq!(idx.range(whole_plane).len(), n);
}

/// Build A and B each with 1000 random rectangles and check join symmetry.
#[test]
fn scenario_e_join_symmetry() {
    let mut rng_a = Lcg::new(0xA11CE);
    let mut rng_b = Lcg::new(0xB0B);

    let entries_a: Vec<_> = (0..1000).map(|id| (random_rect(&mut rng_a, 500.0, 10.0), id)).collect();
    let entries_b: Vec<_> =
        (0..1000).map(|id| (random_rect(&mut rng_b, 500.0, 10.0), id + 100_000)).collect();

    let mut a = new_index();
    let mut b = new_index();
    a.bulk_load(entries_a);
    b.bulk_load(entries_b);

    let a_join_b = a.join(&b);
    let b_join_a = b.join(&a);

    let mut forward: Vec<(i32, i32)> = Vec::new();
    for (&id_a, ids_b) in &a_join_b {
        for &id_b in ids_b {
            forward.push((id_a, id_b));
        }
    }
    let mut backward: Vec<(i32, i32)> = Vec::new();
    for (&id_b, ids_a) in &b_join_a {
        for &id_a in ids_a {
            backward.push((id_a, id_b));
        }
    }
    forward.sort_unstable();
    backward.sort_unstable();
    assert_eq!(forward, backward);
}
