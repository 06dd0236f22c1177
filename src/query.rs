//! The query engine: range (window) search, best-first kNN, and dual-tree
//! spatial join. All three are read-only traversals over the node graph
//! built by `src/tree.rs` or `src/bulk.rs`; none of them touch tree state.

use crate::geometry::{Point, Rectangle};
use crate::heap::{PriorityQueue, SortOrder};
use crate::node::NodeStore;
use crate::tree::Index;
use std::collections::HashMap;

impl Index {
    /// Ids of every stored rectangle intersecting `query`. May contain
    /// duplicates only if the same id was inserted more than once; each leaf
    /// is visited at most once.
    pub fn range(&self, query: Rectangle) -> Vec<i32> {
        let mut result = Vec::new();
        let mut stack: Vec<u32> = vec![self.root_node_id()];

        while let Some(node_id) = stack.pop() {
            let node = self.store.get(node_id);

            if node.is_leaf() {
                for i in 0..node.entry_count() {
                    if node.entry_rect(i).intersects(query) {
                        result.push(node.entry_id(i));
                    }
                }
                continue;
            }

            if query.contains(node.mbr()) {
                collect_all_leaves(&self.store, node_id, &mut result);
                continue;
            }

            for i in 0..node.entry_count() {
                if node.entry_rect(i).intersects(query) {
                    stack.push(node.entry_id(i) as u32);
                }
            }
        }
        result
    }

    /// The `k` stored rectangles closest to `p`, ascending by squared
    /// distance. Returns `min(k, size())` results; `k == 0` returns empty.
    pub fn nearest_n(&self, p: Point, k: u32) -> Vec<(f32, i32)> {
        if k == 0 {
            return Vec::new();
        }
        let k = k as usize;

        let mut frontier = PriorityQueue::new(SortOrder::Ascending);
        let mut best = PriorityQueue::new(SortOrder::Descending);

        let root_id = self.root_node_id();
        let root_dist = self.store.get(root_id).mbr().distance_sq(p);
        frontier.insert(root_id as i32, root_dist);

        while let Some((node_id, dist)) = frontier.pop() {
            if best.len() == k {
                let tau = best.peek().expect("len == k > 0").1;
                if dist >= tau {
                    break;
                }
            }

            let node = self.store.get(node_id as u32);
            if node.is_leaf() {
                for i in 0..node.entry_count() {
                    let entry_dist = node.entry_rect(i).distance_sq(p);
                    let id = node.entry_id(i);
                    if best.len() < k {
                        best.insert(id, entry_dist);
                    } else if entry_dist < best.peek().expect("len == k > 0").1 {
                        best.pop();
                        best.insert(id, entry_dist);
                    }
                }
            } else {
                for i in 0..node.entry_count() {
                    let entry_dist = node.entry_rect(i).distance_sq(p);
                    let within_bound =
                        best.len() < k || entry_dist <= best.peek().expect("len == k > 0").1;
                    if within_bound {
                        frontier.insert(node.entry_id(i), entry_dist);
                    }
                }
            }
        }

        let mut results = Vec::with_capacity(best.len());
        while let Some((id, dist)) = best.pop() {
            results.push((dist, id));
        }
        results.reverse();
        results
    }

    /// All pairs `(idA, idB)` whose rectangles intersect, grouped by `idA`.
    pub fn join(&self, other: &Index) -> HashMap<i32, Vec<i32>> {
        let mut result: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut stack: Vec<(u32, u32)> = vec![(self.root_node_id(), other.root_node_id())];

        while let Some((a_id, b_id)) = stack.pop() {
            let a = self.store.get(a_id);
            let b = other.store.get(b_id);
            if !a.mbr().intersects(b.mbr()) {
                continue;
            }

            match (a.is_leaf(), b.is_leaf()) {
                (true, true) => {
                    for i in 0..a.entry_count() {
                        let ra = a.entry_rect(i);
                        let id_a = a.entry_id(i);
                        for j in 0..b.entry_count() {
                            if ra.intersects(b.entry_rect(j)) {
                                result.entry(id_a).or_default().push(b.entry_id(j));
                            }
                        }
                    }
                }
                (false, false) => {
                    for i in 0..a.entry_count() {
                        let ra = a.entry_rect(i);
                        for j in 0..b.entry_count() {
                            let rb = b.entry_rect(j);
                            if ra.intersects(rb) {
                                stack.push((a.entry_id(i) as u32, b.entry_id(j) as u32));
                            }
                        }
                    }
                }
                (true, false) => {
                    for j in 0..b.entry_count() {
                        let rb = b.entry_rect(j);
                        if rb.intersects(a.mbr()) {
                            stack.push((a_id, b.entry_id(j) as u32));
                        }
                    }
                }
                (false, true) => {
                    for i in 0..a.entry_count() {
                        let ra = a.entry_rect(i);
                        if ra.intersects(b.mbr()) {
                            stack.push((a.entry_id(i) as u32, b_id));
                        }
                    }
                }
            }
        }
        result
    }
}

fn collect_all_leaves(store: &NodeStore, node_id: u32, result: &mut Vec<i32>) {
    let node = store.get(node_id);
    if node.is_leaf() {
        for i in 0..node.entry_count() {
            result.push(node.entry_id(i));
        }
    } else {
        for i in 0..node.entry_count() {
            collect_all_leaves(store, node.entry_id(i) as u32, result);
        }
    }
}
