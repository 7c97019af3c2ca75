//! WOTS+ one-time signatures (Section 4.9): Winternitz chains with base-`w=16` digits plus a
//! checksum, compressed into a single public key leaf by one more `thash`.

use super::address::{Address, WOTS_HASH, WOTS_PK, WOTS_PRF};
use super::{prf, thash, Params};
use alloc::vec::Vec;

const W: usize = 16;

fn base_w(input: &[u8], out_len: usize) -> Vec<u32> {
    let lg_w = 4u32;
    let mut out = Vec::with_capacity(out_len);
    let mut bits = 0u32;
    let mut total = 0u32;
    let mut idx = 0usize;
    for _ in 0..out_len {
        if bits == 0 {
            total = u32::from(input[idx]);
            idx += 1;
            bits = 8;
        }
        bits -= lg_w;
        out.push((total >> bits) & (W as u32 - 1));
    }
    out
}

fn digits(msg: &[u8], params: &Params) -> Vec<u32> {
    let mut d = base_w(msg, params.len1);
    let csum: u32 = d.iter().map(|&v| W as u32 - 1 - v).sum();
    let csum_bits = params.len2 * 4;
    let csum_bytes_len = (csum_bits + 7) / 8;
    let shift = csum_bytes_len * 8 - csum_bits;
    let mut v = csum << shift;
    let mut csum_bytes = alloc::vec![0u8; csum_bytes_len];
    for b in csum_bytes.iter_mut().rev() {
        *b = (v & 0xFF) as u8;
        v >>= 8;
    }
    d.extend(base_w(&csum_bytes, params.len2));
    d
}

fn chain(x: &[u8], start: u32, steps: u32, pub_seed: &[u8], addr: &mut Address, n: usize) -> Vec<u8> {
    let mut out = x.to_vec();
    for i in start..start + steps {
        addr.set_hash(i);
        out = thash(pub_seed, *addr, &out, n);
    }
    out
}

/// Derive the compressed public key leaf for the keypair selected by `addr`.
pub(crate) fn pk_gen(pub_seed: &[u8], sk_seed: &[u8], mut addr: Address, params: &Params) -> Vec<u8> {
    let len = params.len1 + params.len2;
    let mut pk_concat = Vec::with_capacity(len * params.n);
    for i in 0..len {
        let mut sk_addr = addr;
        sk_addr.set_type(WOTS_PRF);
        sk_addr.set_chain(i as u32);
        let sk_i = prf(pub_seed, sk_seed, sk_addr, params.n);
        addr.set_type(WOTS_HASH);
        addr.set_chain(i as u32);
        pk_concat.extend_from_slice(&chain(&sk_i, 0, W as u32 - 1, pub_seed, &mut addr, params.n));
    }
    addr.set_type(WOTS_PK);
    thash(pub_seed, addr, &pk_concat, params.n)
}

/// Sign `msg_hash` (already compressed to `len1` base-w digits' worth of bytes) under `addr`.
pub(crate) fn sign(msg_hash: &[u8], pub_seed: &[u8], sk_seed: &[u8], mut addr: Address, params: &Params) -> Vec<u8> {
    let ds = digits(msg_hash, params);
    let mut sig = Vec::with_capacity(ds.len() * params.n);
    for (i, &d) in ds.iter().enumerate() {
        let mut sk_addr = addr;
        sk_addr.set_type(WOTS_PRF);
        sk_addr.set_chain(i as u32);
        let sk_i = prf(pub_seed, sk_seed, sk_addr, params.n);
        addr.set_type(WOTS_HASH);
        addr.set_chain(i as u32);
        sig.extend_from_slice(&chain(&sk_i, 0, d, pub_seed, &mut addr, params.n));
    }
    sig
}

/// Recompute the public key leaf that `sig` must correspond to, given `msg_hash`.
pub(crate) fn pk_from_sig(sig: &[u8], msg_hash: &[u8], pub_seed: &[u8], mut addr: Address, params: &Params) -> Vec<u8> {
    let ds = digits(msg_hash, params);
    let mut pk_concat = Vec::with_capacity(ds.len() * params.n);
    for (i, &d) in ds.iter().enumerate() {
        addr.set_type(WOTS_HASH);
        addr.set_chain(i as u32);
        let sig_i = &sig[i * params.n..(i + 1) * params.n];
        pk_concat.extend_from_slice(&chain(sig_i, d, W as u32 - 1 - d, pub_seed, &mut addr, params.n));
    }
    addr.set_type(WOTS_PK);
    thash(pub_seed, addr, &pk_concat, params.n)
}
