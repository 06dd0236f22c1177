//! The dynamic Guttman R-tree: incremental insertion with quadratic splitting
//! and deletion with under-full node elimination and orphan reinsertion.
//!
//! See `src/bulk.rs` for the STR bulk loader and `src/query.rs` for the
//! range/kNN/join query engine, both implemented as further `impl Index`
//! blocks over the type defined here.

use crate::error::RTreeError;
use crate::geometry::Rectangle;
use crate::node::NodeStore;
use tracing::{debug, info};

pub const DEFAULT_CAPACITY: u32 = 50;
pub const DEFAULT_MIN_FILL: u32 = 20;

/// An in-memory R-tree index over axis-aligned rectangles, each carrying a
/// caller-supplied `i32` id.
pub struct Index {
    pub(crate) store: NodeStore,
    pub(crate) root_node_id: u32,
    pub(crate) tree_height: u16,
    pub(crate) size: u64,
    pub(crate) capacity: usize,
    pub(crate) min_fill: usize,
    pub(crate) check_consistency: bool,
}

impl Index {
    /// Builds an empty index with the given `capacity` and `min_fill`.
    /// Requires `1 <= min_fill` and `2 * min_fill <= capacity + 1`.
    pub fn new(capacity: u32, min_fill: u32) -> Result<Self, RTreeError> {
        Self::with_consistency_checking(capacity, min_fill, false)
    }

    /// As [`Index::new`], but runs a full consistency walk after every
    /// mutation and reports violations through the logging channel instead
    /// of panicking. Intended for tests and debugging, not hot paths.
    pub fn with_consistency_checking(
        capacity: u32,
        min_fill: u32,
        check_consistency: bool,
    ) -> Result<Self, RTreeError> {
        if min_fill < 1 || 2 * min_fill > capacity + 1 {
            return Err(RTreeError::InvalidConfiguration { capacity, min_fill });
        }
        let mut store = NodeStore::new();
        let root_node_id = store.alloc(1, capacity as usize);
        info!(capacity, min_fill, "created new R-tree index");
        Ok(Index {
            store,
            root_node_id,
            tree_height: 1,
            size: 0,
            capacity: capacity as usize,
            min_fill: min_fill as usize,
            check_consistency,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn num_nodes(&self) -> u64 {
        self.store.live_count()
    }

    pub fn height(&self) -> u32 {
        self.tree_height as u32
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    pub fn min_fill(&self) -> u32 {
        self.min_fill as u32
    }

    pub fn root_node_id(&self) -> u32 {
        self.root_node_id
    }

    /// Inserts `rect` under external id `id`. Duplicates of an existing
    /// `(rect, id)` pair are not prevented.
    pub fn insert(&mut self, rect: Rectangle, id: i32) {
        debug!(?rect, id, "inserting entry");
        self.insert_at(rect, id, 1);
        self.size += 1;
        if self.check_consistency {
            self.check_consistency_or_log();
        }
    }

    /// Generalized insert used internally by `condense_tree` to reinsert an
    /// orphaned subtree's entries at their original level, so subtree depth
    /// is preserved. Does not touch `size`, the caller owns that bookkeeping.
    pub(crate) fn insert_at(&mut self, rect: Rectangle, id: i32, level: u16) {
        let mut stack: Vec<(u32, usize)> = Vec::new();
        let target_node = self.choose_node(rect, level, &mut stack);

        let mut new_sibling = {
            let node = self.store.get_mut(target_node);
            if node.entry_count() < node.capacity() {
                node.add_entry(rect, id);
                None
            } else {
                Some(self.split_node(target_node, rect, id))
            }
        };

        new_sibling = self.adjust_tree(&mut stack, new_sibling);

        if let Some(sibling_id) = new_sibling {
            self.grow_root(sibling_id);
        }
    }

    /// Descends from the root to the first node at `level`, at each internal
    /// node choosing the child entry with minimal enlargement (ties broken
    /// by smaller child area). Records `(node, chosenIndex)` for every
    /// internal node visited, so `adjust_tree` can walk back up.
    fn choose_node(&self, rect: Rectangle, level: u16, stack: &mut Vec<(u32, usize)>) -> u32 {
        let mut node_id = self.root_node_id;
        loop {
            let node = self.store.get(node_id);
            if node.level() == level {
                return node_id;
            }

            let mut best_index = 0usize;
            let mut best_enlargement = f32::INFINITY;
            let mut best_area = f32::INFINITY;
            for i in 0..node.entry_count() {
                let child_rect = node.entry_rect(i);
                let enlargement = child_rect.enlargement(rect);
                let area = child_rect.area();
                if enlargement < best_enlargement
                    || (enlargement == best_enlargement && area < best_area)
                {
                    best_index = i;
                    best_enlargement = enlargement;
                    best_area = area;
                }
            }
            stack.push((node_id, best_index));
            node_id = node.entry_id(best_index) as u32;
        }
    }

    /// Quadratic split: redistributes `node_id`'s existing entries plus the
    /// overflowing `(new_rect, new_id)` between `node_id` (reused) and a
    /// freshly allocated sibling at the same level.
    fn split_node(&mut self, node_id: u32, new_rect: Rectangle, new_id: i32) -> u32 {
        let capacity = self.capacity;
        let level = self.store.get(node_id).level();

        let mut cand_rect: Vec<Rectangle> = Vec::with_capacity(capacity + 1);
        let mut cand_id: Vec<i32> = Vec::with_capacity(capacity + 1);
        {
            let node = self.store.get(node_id);
            for i in 0..node.entry_count() {
                cand_rect.push(node.entry_rect(i));
                cand_id.push(node.entry_id(i));
            }
        }
        cand_rect.push(new_rect);
        cand_id.push(new_id);

        let sibling_id = self.store.alloc(level, capacity);

        let (seed_a, seed_b) = pick_seeds(&cand_rect);

        self.store.get_mut(node_id).reset_to_seed(cand_rect[seed_a], cand_id[seed_a]);
        self.store.get_mut(sibling_id).add_entry(cand_rect[seed_b], cand_id[seed_b]);

        let mut remaining: Vec<usize> =
            (0..cand_rect.len()).filter(|&i| i != seed_a && i != seed_b).collect();

        while !remaining.is_empty() {
            let n_count = self.store.get(node_id).entry_count();
            let m_count = self.store.get(sibling_id).entry_count();

            if n_count + remaining.len() == self.min_fill {
                for &i in &remaining {
                    self.store.get_mut(node_id).add_entry(cand_rect[i], cand_id[i]);
                }
                break;
            }
            if m_count + remaining.len() == self.min_fill {
                for &i in &remaining {
                    self.store.get_mut(sibling_id).add_entry(cand_rect[i], cand_id[i]);
                }
                break;
            }

            let n_mbr = self.store.get(node_id).mbr();
            let m_mbr = self.store.get(sibling_id).mbr();

            let mut best_pos = 0usize;
            let mut best_diff = -1.0f32;
            let mut best_enl_n = 0.0f32;
            let mut best_enl_m = 0.0f32;
            for (pos, &i) in remaining.iter().enumerate() {
                let enl_n = n_mbr.enlargement(cand_rect[i]);
                let enl_m = m_mbr.enlargement(cand_rect[i]);
                let diff = (enl_n - enl_m).abs();
                if diff > best_diff {
                    best_diff = diff;
                    best_pos = pos;
                    best_enl_n = enl_n;
                    best_enl_m = enl_m;
                }
            }
            let chosen = remaining.remove(best_pos);

            let area_n = n_mbr.area();
            let area_m = m_mbr.area();
            let goes_to_n = if best_enl_n != best_enl_m {
                best_enl_n < best_enl_m
            } else if area_n != area_m {
                area_n < area_m
            } else {
                n_count <= m_count
            };

            if goes_to_n {
                self.store.get_mut(node_id).add_entry(cand_rect[chosen], cand_id[chosen]);
            } else {
                self.store.get_mut(sibling_id).add_entry(cand_rect[chosen], cand_id[chosen]);
            }
        }

        sibling_id
    }

    /// Walks the traversal stack from leaf-parent to root, keeping each
    /// parent's entry in sync with its child's current MBR and propagating
    /// any pending sibling split upward.
    fn adjust_tree(&mut self, stack: &mut Vec<(u32, usize)>, mut new_sibling: Option<u32>) -> Option<u32> {
        while let Some((parent_id, entry_idx)) = stack.pop() {
            let child_id = self.store.get(parent_id).entry_id(entry_idx) as u32;
            let child_mbr = self.store.get(child_id).mbr();
            self.store.get_mut(parent_id).set_entry_rect(entry_idx, child_mbr);

            if let Some(sibling_id) = new_sibling {
                let sibling_mbr = self.store.get(sibling_id).mbr();
                let parent = self.store.get_mut(parent_id);
                new_sibling = if parent.entry_count() < parent.capacity() {
                    parent.add_entry(sibling_mbr, sibling_id as i32);
                    None
                } else {
                    Some(self.split_node(parent_id, sibling_mbr, sibling_id as i32))
                };
            }
        }
        new_sibling
    }

    fn grow_root(&mut self, sibling_id: u32) {
        let old_root_id = self.root_node_id;
        let old_root_mbr = self.store.get(old_root_id).mbr();
        let sibling_mbr = self.store.get(sibling_id).mbr();

        self.tree_height += 1;
        let new_root_id = self.store.alloc(self.tree_height, self.capacity);
        let new_root = self.store.get_mut(new_root_id);
        new_root.add_entry(old_root_mbr, old_root_id as i32);
        new_root.add_entry(sibling_mbr, sibling_id as i32);
        self.root_node_id = new_root_id;
    }

    /// Removes the first `(rect, id)` match found by `find_leaf`'s
    /// deterministic depth-first order. Returns whether an entry was
    /// actually removed.
    pub fn delete(&mut self, rect: Rectangle, id: i32) -> bool {
        debug!(?rect, id, "deleting entry");
        let Some((leaf_id, entry_idx, mut ancestors)) = self.find_leaf(rect, id) else {
            return false;
        };
        self.store.get_mut(leaf_id).delete_entry(entry_idx);

        let mut eliminated: Vec<(u32, u16)> = Vec::new();
        self.condense_tree(leaf_id, &mut ancestors, &mut eliminated);

        for (node_id, level) in eliminated {
            let node = self.store.get(node_id);
            let entries: Vec<(Rectangle, i32)> =
                (0..node.entry_count()).map(|i| (node.entry_rect(i), node.entry_id(i))).collect();
            self.store.free(node_id);
            for (r, eid) in entries {
                self.insert_at(r, eid, level);
            }
        }

        while self.store.get(self.root_node_id).level() > 1
            && self.store.get(self.root_node_id).entry_count() == 1
        {
            let old_root = self.root_node_id;
            let sole_child = self.store.get(old_root).entry_id(0) as u32;
            self.store.free(old_root);
            self.root_node_id = sole_child;
            self.tree_height -= 1;
        }

        self.size -= 1;
        if self.size == 0 {
            self.store.get_mut(self.root_node_id).recalculate_mbr();
        }

        if self.check_consistency {
            self.check_consistency_or_log();
        }
        true
    }

    /// Iterative DFS of every subtree whose MBR contains `rect`. Returns the
    /// leaf holding the match, the matching entry's index, and the ancestor
    /// chain as `(node, entryIndex)` pairs in root-to-parent order (so the
    /// caller can walk it bottom-up via `Vec::pop`).
    fn find_leaf(&self, rect: Rectangle, id: i32) -> Option<(u32, usize, Vec<(u32, usize)>)> {
        let mut dfs: Vec<(u32, usize)> = vec![(self.root_node_id, 0)];
        let mut ancestors: Vec<(u32, usize)> = Vec::new();

        loop {
            let (node_id, resume) = *dfs.last()?;
            let node = self.store.get(node_id);

            if node.is_leaf() {
                dfs.pop();
                if let Some(idx) = node.find_entry(rect, id) {
                    return Some((node_id, idx, ancestors));
                }
                ancestors.pop();
                continue;
            }

            let mut descended = false;
            for i in resume..node.entry_count() {
                if node.entry_rect(i).contains(rect) {
                    dfs.last_mut().expect("just peeked it").1 = i + 1;
                    dfs.push((node.entry_id(i) as u32, 0));
                    ancestors.push((node_id, i));
                    descended = true;
                    break;
                }
            }
            if !descended {
                dfs.pop();
                ancestors.pop();
            }
        }
    }

    /// Ascends from the deleted leaf, eliminating under-full nodes (pushed
    /// onto `eliminated` for the caller to reinsert) and otherwise keeping
    /// each parent's entry synced to its child's MBR.
    fn condense_tree(
        &mut self,
        start_node_id: u32,
        ancestors: &mut Vec<(u32, usize)>,
        eliminated: &mut Vec<(u32, u16)>,
    ) {
        let mut current_id = start_node_id;
        while let Some((parent_id, entry_idx)) = ancestors.pop() {
            let current_count = self.store.get(current_id).entry_count();
            if current_count < self.min_fill {
                let level = self.store.get(current_id).level();
                self.store.get_mut(parent_id).delete_entry(entry_idx);
                eliminated.push((current_id, level));
            } else {
                let mbr = self.store.get(current_id).mbr();
                self.store.get_mut(parent_id).set_entry_rect(entry_idx, mbr);
            }
            current_id = parent_id;
        }
    }

    fn check_consistency_or_log(&self) {
        if let Err(detail) = self.check_consistency() {
            tracing::error!("{}", detail);
        }
    }

    /// Walks the whole tree verifying invariants 1-4: node occupancy bounds,
    /// parent entries matching child MBRs bit-for-bit, and tight MBRs. Used
    /// internally by the optional self-check mode, and exposed directly so
    /// tests can assert on structural soundness rather than only on the
    /// logging side effect.
    pub fn check_consistency(&self) -> Result<(), String> {
        self.check_consistency_at(self.root_node_id, self.tree_height, None)
    }

    fn check_consistency_at(
        &self,
        node_id: u32,
        expected_level: u16,
        expected_mbr: Option<Rectangle>,
    ) -> Result<(), String> {
        let node = self.store.get(node_id);

        if node.level() != expected_level {
            return Err(format!(
                "node {node_id}: expected level {expected_level}, got {}",
                node.level()
            ));
        }

        let mut recomputed = Rectangle::EMPTY;
        for i in 0..node.entry_count() {
            let r = node.entry_rect(i);
            recomputed = if recomputed.is_empty() { r } else { recomputed.union(r) };
        }
        if node.entry_count() > 0 && recomputed != node.mbr() {
            return Err(format!("node {node_id}: stored mbr does not match its entries"));
        }

        if let Some(expected) = expected_mbr {
            if expected != node.mbr() {
                return Err(format!("node {node_id}: parent entry does not match child mbr"));
            }
        }

        if node_id != self.root_node_id
            && (node.entry_count() < self.min_fill || node.entry_count() > self.capacity)
        {
            return Err(format!(
                "node {node_id}: entry_count {} outside [{}, {}]",
                node.entry_count(),
                self.min_fill,
                self.capacity
            ));
        }

        if !node.is_leaf() {
            for i in 0..node.entry_count() {
                let child_id = node.entry_id(i) as u32;
                self.check_consistency_at(child_id, node.level() - 1, Some(node.entry_rect(i)))?;
            }
        }
        Ok(())
    }
}

/// Chooses two maximally separated candidates as split seeds, scanning each
/// axis for the entry with the highest low-edge and the one with the lowest
/// high-edge, then keeping whichever axis yields the greatest normalized
/// separation.
fn pick_seeds(rects: &[Rectangle]) -> (usize, usize) {
    let mut best_separation = f32::NEG_INFINITY;
    let mut seed_a = 0;
    let mut seed_b = 1;

    for axis in 0..2 {
        let mut highest_low = f32::NEG_INFINITY;
        let mut highest_low_idx = 0usize;
        let mut lowest_high = f32::INFINITY;
        let mut lowest_high_idx = 0usize;
        let mut axis_min = f32::INFINITY;
        let mut axis_max = f32::NEG_INFINITY;

        for (i, r) in rects.iter().enumerate() {
            let (lo, hi) = if axis == 0 { (r.min_x, r.max_x) } else { (r.min_y, r.max_y) };
            if lo > highest_low {
                highest_low = lo;
                highest_low_idx = i;
            }
            if hi < lowest_high {
                lowest_high = hi;
                lowest_high_idx = i;
            }
            axis_min = axis_min.min(lo);
            axis_max = axis_max.max(hi);
        }

        let axis_span = axis_max - axis_min;
        let normalized_separation =
            if axis_span == 0.0 { 1.0 } else { (highest_low - lowest_high) / axis_span };

        if normalized_separation > best_separation {
            best_separation = normalized_separation;
            seed_a = highest_low_idx;
            seed_b = lowest_high_idx;
        }
    }

    if seed_a == seed_b {
        seed_b = if seed_a == 0 { 1 } else { 0 };
    }
    (seed_a, seed_b)
}
