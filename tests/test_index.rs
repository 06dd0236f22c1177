
use rtreedex::geometry::Point;
use shared::*;
use tracing::info;

#[test]
fn scenario_a_insert_and_range() {
    run_scenario_a_test();
}

fn run_scenario_a_test() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 10.0, 10.0), 1);
    index.insert(rect(20.0, 20.0, 30.0, 30.0), 2);
    index.insert(rect(5.0, 5.0, 25.0, 25.0), 3);

    let mut hits = index.range(rect(8.0, 8.0, 22.0, 22.0));
    hits.sort_unstable();
    info!(?hits, "scenario A range result");
    assert_eq!(hits, vec![1, 2, 3]);
}

#[test]
fn scenario_b_nearest_neighbors() {
    run_scenario_b_test();
}

fn run_scenario_b_test() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 1.0, 1.0), 1);
    index.insert(rect(10.0, 10.0, 11.0, 11.0), 2);
    index.insert(rect(5.0, 5.0, 6.0, 6.0), 3);

    let result = index.nearest_n(Point::new(0.0, 0.0), 2);
    info!(?result, "scenario B nearest_n result");
    assert_eq!(result, vec![(0.0, 1), (50.0, 3)]);
}

#[test]
fn scenario_f_knn_tie_handling() {
    run_scenario_f_test();
}

fn run_scenario_f_test() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 1.0, 1.0), 1);
    index.insert(rect(0.0, 0.0, 1.0, 1.0), 2);

    let one = index.nearest_n(Point::new(2.0, 2.0), 1);
    assert_eq!(one.len(), 1);
    assert!(one[0].1 == 1 || one[0].1 == 2);

    let two = index.nearest_n(Point::new(2.0, 2.0), 2);
    let mut ids: Vec<i32> = two.iter().map(|&(_, id)| id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(two[0].0, two[1].0);
}

#[test]
fn empty_tree_boundary_behaviors() {
    let index = new_index();
    assert!(index.range(rect(0.0, 0.0, 100.0, 100.0)).is_empty());
    assert!(index.nearest_n(Point::new(0.0, 0.0), 5).is_empty());

    let mut mutable_index = new_index();
    assert!(!mutable_index.delete(rect(0.0, 0.0, 1.0, 1.0), 1));
}

#[test]
fn knn_k_zero_and_k_over_size() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 1.0, 1.0), 1);
    index.insert(rect(1.0, 1.0, 2.0, 2.0), 2);

    assert!(index.nearest_n(Point::new(0.0, 0.0), 0).is_empty());
    assert_eq!(index.nearest_n(Point::new(0.0, 0.0), 50).len(), 2);
}

#[test]
fn range_query_touching_only_an_edge_counts_as_intersecting() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 10.0, 10.0), 1);
    let hits = index.range(rect(10.0, 0.0, 20.0, 10.0));
    assert_eq!(hits, vec![1]);
}

#[test]
fn point_inside_rectangle_has_zero_distance() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 10.0, 10.0), 1);
    let result = index.nearest_n(Point::new(5.0, 5.0), 1);
    assert_eq!(result, vec![(0.0, 1)]);
}

#[test]
fn delete_removes_only_the_matching_pair() {
    let mut index = new_index();
    index.insert(rect(0.0, 0.0, 1.0, 1.0), 1);
    index.insert(rect(0.0, 0.0, 1.0, 1.0), 2);

    assert!(index.delete(rect(0.0, 0.0, 1.0, 1.0), 1));
    let mut remaining = index.range(rect(0.0, 0.0, 1.0, 1.0));
    remaining.sort_unstable();
    assert_eq!(remaining, vec![2]);
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(rtreedex::Index::new(10, 0).is_err());
    assert!(rtreedex::Index::new(10, 6).is_err());
}
