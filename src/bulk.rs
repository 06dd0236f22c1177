//! STR (Sort-Tile-Recursive) bulk loading: builds a packed, near-optimally
//! filled tree from a full rectangle set in one pass, bottom-up.

use crate::geometry::Rectangle;
use crate::node::NodeStore;
use crate::tree::Index;
use tracing::info;

impl Index {
    /// Replaces the index's contents with an STR-packed tree built from
    /// `rects`. Any prior tree state is discarded.
    pub fn bulk_load(&mut self, rects: Vec<(Rectangle, i32)>) {
        self.store.reset();
        let capacity = self.capacity;
        let count = rects.len() as u64;

        if rects.is_empty() {
            self.root_node_id = self.store.alloc(1, capacity);
            self.tree_height = 1;
            self.size = 0;
            return;
        }

        info!(count, "bulk loading index via STR");

        let mut level_ids = build_leaf_level(&mut self.store, rects, capacity);
        let mut height = 1u16;
        while level_ids.len() > 1 {
            level_ids = build_next_level(&mut self.store, level_ids, capacity);
            height += 1;
        }

        self.root_node_id = level_ids[0];
        self.tree_height = height;
        self.size = count;
    }
}

fn center_x(r: Rectangle) -> f32 {
    (r.min_x + r.max_x) * 0.5
}

/// Slices `items.len()` items into leaves (or parents) of at most `capacity`
/// each, via the STR recipe: `L = ceil(N/C)` target groups, `S = ceil(sqrt(L))`
/// vertical slices of width `S*C`, each slice internally sorted along the
/// secondary axis before being cut into `capacity`-sized chunks.
fn str_chunks(total: usize, capacity: usize) -> Vec<(usize, usize)> {
    let num_groups = total.div_ceil(capacity);
    let num_slices = (num_groups as f64).sqrt().ceil() as usize;
    let slice_width = num_slices * capacity;

    let mut slices = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + slice_width).min(total);
        slices.push((start, end));
        start = end;
    }
    slices
}

fn build_leaf_level(store: &mut NodeStore, mut rects: Vec<(Rectangle, i32)>, capacity: usize) -> Vec<u32> {
    rects.sort_by(|a, b| center_x(a.0).partial_cmp(&center_x(b.0)).unwrap());

    let mut leaf_ids = Vec::new();
    for (start, end) in str_chunks(rects.len(), capacity) {
        let mut slice = rects[start..end].to_vec();
        slice.sort_by(|a, b| a.0.min_y.partial_cmp(&b.0.min_y).unwrap());

        let mut chunk_start = 0;
        while chunk_start < slice.len() {
            let chunk_end = (chunk_start + capacity).min(slice.len());
            let node_id = store.alloc(1, capacity);
            {
                let node = store.get_mut(node_id);
                for (rect, id) in &slice[chunk_start..chunk_end] {
                    node.add_entry(*rect, *id);
                }
                node.sort_by_min_x();
            }
            leaf_ids.push(node_id);
            chunk_start = chunk_end;
        }
    }
    leaf_ids
}

fn build_next_level(store: &mut NodeStore, mut nodes: Vec<u32>, capacity: usize) -> Vec<u32> {
    let level = store.get(nodes[0]).level() + 1;
    nodes.sort_by(|&a, &b| {
        center_x(store.get(a).mbr()).partial_cmp(&center_x(store.get(b).mbr())).unwrap()
    });

    let mut parent_ids = Vec::new();
    for (start, end) in str_chunks(nodes.len(), capacity) {
        let mut slice = nodes[start..end].to_vec();
        slice.sort_by(|&a, &b| {
            store.get(a).mbr().min_y.partial_cmp(&store.get(b).mbr().min_y).unwrap()
        });

        let mut chunk_start = 0;
        while chunk_start < slice.len() {
            let chunk_end = (chunk_start + capacity).min(slice.len());
            let entries: Vec<(Rectangle, i32)> = slice[chunk_start..chunk_end]
                .iter()
                .map(|&child_id| (store.get(child_id).mbr(), child_id as i32))
                .collect();

            let parent_id = store.alloc(level, capacity);
            {
                let parent = store.get_mut(parent_id);
                for (rect, id) in entries {
                    parent.add_entry(rect, id);
                }
                parent.sort_by_min_x();
            }
            parent_ids.push(parent_id);
            chunk_start = chunk_end;
        }
    }
    parent_ids
}
