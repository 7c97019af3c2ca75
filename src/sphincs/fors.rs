//! FORS: forest-of-random-subsets few-time signature used to authenticate the message digest
//! at the bottom of the hypertree (Section 4.10). `k` independent height-`a` trees, one leaf
//! revealed per tree, roots compressed into a single public key by one more `thash`.

use super::address::{Address, FORS_PRF, FORS_ROOTS, FORS_TREE};
use super::merkle;
use super::{prf, thash, Params};
use alloc::vec::Vec;

fn node_addr_at(base: Address, tree_i: usize, height: usize, a: usize, local_index: usize) -> Address {
    let mut addr = base;
    addr.set_type(FORS_TREE);
    addr.set_tree_height(height as u32);
    let width = 1usize << (a - height);
    addr.set_tree_index((tree_i * width + local_index) as u32);
    addr
}

fn build_tree_for(pub_seed: &[u8], sk_seed: &[u8], base_addr: Address, tree_i: usize, params: &Params) -> Vec<Vec<Vec<u8>>> {
    let n = params.n;
    let a = params.a;
    merkle::build_tree(
        a,
        |local_idx| {
            let mut sk_addr = base_addr;
            sk_addr.set_type(FORS_PRF);
            sk_addr.set_chain(tree_i as u32);
            sk_addr.set_hash(local_idx as u32);
            let sk = prf(pub_seed, sk_seed, sk_addr, n);
            let leaf_addr = node_addr_at(base_addr, tree_i, 0, a, local_idx);
            thash(pub_seed, leaf_addr, &sk, n)
        },
        |height, local_idx, left, right| {
            let addr = node_addr_at(base_addr, tree_i, height, a, local_idx);
            thash(pub_seed, addr, &[left, right].concat(), n)
        },
    )
}

/// Sign the `k` FORS indices extracted from a message digest, one revealed leaf + auth path
/// per tree.
pub(crate) fn sign(indices: &[u32], pub_seed: &[u8], sk_seed: &[u8], base_addr: Address, params: &Params) -> Vec<u8> {
    let mut sig = Vec::with_capacity(indices.len() * (params.n + params.a * params.n));
    for (tree_i, &leaf_idx) in indices.iter().enumerate() {
        let mut sk_addr = base_addr;
        sk_addr.set_type(FORS_PRF);
        sk_addr.set_chain(tree_i as u32);
        sk_addr.set_hash(leaf_idx);
        sig.extend_from_slice(&prf(pub_seed, sk_seed, sk_addr, params.n));

        let levels = build_tree_for(pub_seed, sk_seed, base_addr, tree_i, params);
        for node in merkle::auth_path(&levels, leaf_idx as usize, params.a) {
            sig.extend_from_slice(&node);
        }
    }
    sig
}

/// Recompute the FORS public key that `sig` must correspond to, given the same indices.
pub(crate) fn pk_from_sig(sig: &[u8], indices: &[u32], pub_seed: &[u8], base_addr: Address, params: &Params) -> Vec<u8> {
    let n = params.n;
    let a = params.a;
    let seg_len = n + a * n;
    let mut roots = Vec::with_capacity(indices.len() * n);
    for (tree_i, &leaf_idx) in indices.iter().enumerate() {
        let seg = &sig[tree_i * seg_len..(tree_i + 1) * seg_len];
        let sk = &seg[..n];
        let leaf_addr = node_addr_at(base_addr, tree_i, 0, a, leaf_idx as usize);
        let leaf = thash(pub_seed, leaf_addr, sk, n);
        let auth: Vec<Vec<u8>> = seg[n..].chunks(n).map(<[u8]>::to_vec).collect();
        let root = merkle::root_from_path(leaf, leaf_idx as usize, &auth, |height, local_idx, l, r| {
            let addr = node_addr_at(base_addr, tree_i, height, a, local_idx);
            thash(pub_seed, addr, &[l, r].concat(), n)
        });
        roots.extend_from_slice(&root);
    }
    let mut pk_addr = base_addr;
    pk_addr.set_type(FORS_ROOTS);
    thash(pub_seed, pk_addr, &roots, n)
}
