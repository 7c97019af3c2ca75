//! Binary Merkle tree construction shared by the hypertree and FORS forest (Section 4.9-4.11).
//!
//! Both structures need the same three operations - build every level, extract an authentication
//! path for one leaf, recompute a root from a leaf plus its path - over subtrees small enough
//! (height <= 14) that materializing every level outright is simpler than a streaming treehash
//! and costs nothing that matters here.

use alloc::vec::Vec;

pub(crate) fn build_tree(
    height: usize,
    mut leaf_fn: impl FnMut(usize) -> Vec<u8>,
    mut node_fn: impl FnMut(usize, usize, &[u8], &[u8]) -> Vec<u8>,
) -> Vec<Vec<Vec<u8>>> {
    let num_leaves = 1usize << height;
    let mut levels = Vec::with_capacity(height + 1);
    levels.push((0..num_leaves).map(&mut leaf_fn).collect::<Vec<_>>());
    for h in 1..=height {
        let prev_len = levels[h - 1].len();
        let level: Vec<Vec<u8>> = (0..prev_len / 2)
            .map(|i| node_fn(h, i, &levels[h - 1][2 * i], &levels[h - 1][2 * i + 1]))
            .collect();
        levels.push(level);
    }
    levels
}

pub(crate) fn auth_path(levels: &[Vec<Vec<u8>>], leaf_idx: usize, height: usize) -> Vec<Vec<u8>> {
    let mut idx = leaf_idx;
    let mut path = Vec::with_capacity(height);
    for level in levels.iter().take(height) {
        path.push(level[idx ^ 1].clone());
        idx >>= 1;
    }
    path
}

pub(crate) fn root_from_path(
    leaf: Vec<u8>,
    leaf_idx: usize,
    auth: &[Vec<u8>],
    mut node_fn: impl FnMut(usize, usize, &[u8], &[u8]) -> Vec<u8>,
) -> Vec<u8> {
    let mut node = leaf;
    let mut idx = leaf_idx;
    for (h, sibling) in auth.iter().enumerate() {
        node = if idx & 1 == 0 { node_fn(h + 1, idx >> 1, &node, sibling) } else { node_fn(h + 1, idx >> 1, sibling, &node) };
        idx >>= 1;
    }
    node
}
