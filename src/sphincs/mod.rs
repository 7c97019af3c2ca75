//! SPHINCS+-SHAKE: stateless hash-based signatures (Section 4.11). A WOTS+-signed hypertree of
//! `d` layers, each of height `h/d`, with the bottom layer authenticating a FORS few-time
//! signature over the message digest instead of the message directly.
//!
//! Every hash primitive here is `SHAKE256` over `(pub_seed || address || data)` - the "simple"
//! SPHINCS+ instantiation, with no bitmask XOR step, matching the crate's habit of building every
//! scheme's hashing on the shared sponge rather than a dedicated block cipher.

mod address;
mod fors;
mod merkle;
mod wots;

use crate::codec::ParameterSet;
use crate::domain::ct_eq;
use crate::error::{Error, Result};
use crate::sponge::shake256;
use address::{Address, TREE};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};

pub(crate) struct Params {
    pub(crate) n: usize,
    pub(crate) h: usize,
    pub(crate) d: usize,
    pub(crate) a: usize,
    pub(crate) k: usize,
    pub(crate) len1: usize,
    pub(crate) len2: usize,
}

impl Params {
    pub(crate) fn h_prime(&self) -> usize {
        self.h / self.d
    }
}

fn params_for(ps: ParameterSet) -> Params {
    match ps {
        ParameterSet::SphincsS128Shake => Params { n: 16, h: 63, d: 7, a: 12, k: 14, len1: 32, len2: 3 },
        ParameterSet::SphincsS192Shake => Params { n: 24, h: 63, d: 7, a: 14, k: 17, len1: 48, len2: 3 },
        ParameterSet::SphincsS256Shake => Params { n: 32, h: 64, d: 8, a: 14, k: 22, len1: 64, len2: 3 },
        _ => unreachable!("caller validated the primitive"),
    }
}

fn validate_ps(ps: ParameterSet) -> Result<Params> {
    match ps {
        ParameterSet::SphincsS128Shake | ParameterSet::SphincsS192Shake | ParameterSet::SphincsS256Shake => {
            Ok(params_for(ps))
        }
        _ => Err(Error::InvalidParameter),
    }
}

pub(self) fn prf(pub_seed: &[u8], sk_seed: &[u8], addr: Address, n: usize) -> Vec<u8> {
    let mut xof = shake256(&[pub_seed, &addr.to_bytes(), sk_seed].concat());
    let mut out = vec![0u8; n];
    xof.read(&mut out);
    out
}

pub(self) fn thash(pub_seed: &[u8], addr: Address, input: &[u8], n: usize) -> Vec<u8> {
    let mut xof = shake256(&[pub_seed, &addr.to_bytes(), input].concat());
    let mut out = vec![0u8; n];
    xof.read(&mut out);
    out
}

fn randomizer(sk_prf: &[u8], opt_rand: &[u8], message: &[u8], n: usize) -> Vec<u8> {
    let mut xof = shake256(&[sk_prf, opt_rand, message].concat());
    let mut out = vec![0u8; n];
    xof.read(&mut out);
    out
}

/// Hash the message under the randomizer, splitting the digest into the FORS message digest,
/// the hypertree tree index and the bottom-layer leaf index.
fn hash_message(r: &[u8], pub_seed: &[u8], pk_root: &[u8], message: &[u8], params: &Params) -> (Vec<u8>, u64, u32) {
    let h_prime = params.h_prime();
    let md_bytes = (params.k * params.a + 7) / 8;
    let tree_bits = params.h - h_prime;
    let tree_bytes = (tree_bits + 7) / 8;
    let leaf_bytes = (h_prime + 7) / 8;
    let total = md_bytes + tree_bytes + leaf_bytes;

    let mut xof = shake256(&[r, pub_seed, pk_root, message].concat());
    let mut buf = vec![0u8; total];
    xof.read(&mut buf);

    let md = buf[..md_bytes].to_vec();
    let mut tree_idx: u64 = 0;
    for &b in &buf[md_bytes..md_bytes + tree_bytes] {
        tree_idx = (tree_idx << 8) | u64::from(b);
    }
    tree_idx &= (1u64 << tree_bits) - 1;
    let mut leaf_idx: u32 = 0;
    for &b in &buf[md_bytes + tree_bytes..] {
        leaf_idx = (leaf_idx << 8) | u32::from(b);
    }
    leaf_idx &= (1u32 << h_prime) - 1;
    (md, tree_idx, leaf_idx)
}

fn fors_indices(md: &[u8], params: &Params) -> Vec<u32> {
    let mut indices = Vec::with_capacity(params.k);
    let mut bit_pos = 0usize;
    for _ in 0..params.k {
        let mut val = 0u32;
        for _ in 0..params.a {
            let byte = md[bit_pos / 8];
            let bit = (byte >> (7 - (bit_pos % 8))) & 1;
            val = (val << 1) | u32::from(bit);
            bit_pos += 1;
        }
        indices.push(val);
    }
    indices
}

fn build_wots_subtree(
    pub_seed: &[u8],
    sk_seed: &[u8],
    layer: u32,
    tree_addr: u64,
    height: usize,
    params: &Params,
) -> Vec<Vec<Vec<u8>>> {
    let n = params.n;
    merkle::build_tree(
        height,
        |leaf_idx| {
            let mut addr = Address::new();
            addr.set_layer(layer);
            addr.set_tree(tree_addr);
            addr.set_key_pair(leaf_idx as u32);
            let leaf_pk = wots::pk_gen(pub_seed, sk_seed, addr, params);
            addr.set_type(TREE);
            addr.set_tree_height(0);
            addr.set_tree_index(leaf_idx as u32);
            thash(pub_seed, addr, &leaf_pk, n)
        },
        |h, local_idx, left, right| {
            let mut addr = Address::new();
            addr.set_layer(layer);
            addr.set_tree(tree_addr);
            addr.set_type(TREE);
            addr.set_tree_height(h as u32);
            addr.set_tree_index(local_idx as u32);
            thash(pub_seed, addr, &[left, right].concat(), n)
        },
    )
}

/// Generate a `(pk, sk)` pair.
pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> Result<(Vec<u8>, Vec<u8>)> {
    let params = validate_ps(ps)?;
    let sizes = ps.sizes();
    let n = params.n;

    let mut sk_seed = vec![0u8; n];
    let mut sk_prf = vec![0u8; n];
    let mut pub_seed = vec![0u8; n];
    rng.fill_bytes(&mut sk_seed);
    rng.fill_bytes(&mut sk_prf);
    rng.fill_bytes(&mut pub_seed);

    let top_layer = (params.d - 1) as u32;
    let h_prime = params.h_prime();
    let levels = build_wots_subtree(&pub_seed, &sk_seed, top_layer, 0, h_prime, &params);
    let root = levels[h_prime][0].clone();

    let mut pk = Vec::with_capacity(sizes.public_key_len);
    pk.extend_from_slice(&pub_seed);
    pk.extend_from_slice(&root);

    let mut sk = Vec::with_capacity(sizes.private_key_len);
    sk.extend_from_slice(&sk_seed);
    sk.extend_from_slice(&sk_prf);
    sk.extend_from_slice(&pub_seed);
    sk.extend_from_slice(&root);

    debug_assert_eq!(pk.len(), sizes.public_key_len);
    debug_assert_eq!(sk.len(), sizes.private_key_len);
    Ok((pk, sk))
}

/// Sign `message` under `sk`.
///
/// # Errors
/// Returns [`Error::InvalidKey`] if `sk` has the wrong length.
pub fn sign(
    ps: ParameterSet,
    sk_bytes: &[u8],
    message: &[u8],
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Vec<u8>> {
    let params = validate_ps(ps)?;
    let sizes = ps.sizes();
    if sk_bytes.len() != sizes.private_key_len {
        return Err(Error::InvalidKey);
    }
    let n = params.n;
    let sk_seed = &sk_bytes[0..n];
    let sk_prf = &sk_bytes[n..2 * n];
    let pub_seed = &sk_bytes[2 * n..3 * n];
    let pk_root = &sk_bytes[3 * n..4 * n];

    let mut opt_rand = vec![0u8; n];
    rng.fill_bytes(&mut opt_rand);
    let r = randomizer(sk_prf, &opt_rand, message, n);
    let (md, tree_idx, leaf_idx) = hash_message(&r, pub_seed, pk_root, message, &params);
    let indices = fors_indices(&md, &params);

    let mut sig = Vec::with_capacity(sizes.signature_len);
    sig.extend_from_slice(&r);

    let mut cur_tree = tree_idx;
    let mut cur_leaf = leaf_idx as usize;
    let mut fors_addr = Address::new();
    fors_addr.set_layer(0);
    fors_addr.set_tree(cur_tree);
    fors_addr.set_key_pair(cur_leaf as u32);

    let fors_sig = fors::sign(&indices, pub_seed, sk_seed, fors_addr, &params);
    sig.extend_from_slice(&fors_sig);
    let mut node = fors::pk_from_sig(&fors_sig, &indices, pub_seed, fors_addr, &params);

    let h_prime = params.h_prime();
    for layer in 0..params.d {
        let layer_u32 = layer as u32;
        let mut wots_addr = Address::new();
        wots_addr.set_layer(layer_u32);
        wots_addr.set_tree(cur_tree);
        wots_addr.set_key_pair(cur_leaf as u32);

        sig.extend_from_slice(&wots::sign(&node, pub_seed, sk_seed, wots_addr, &params));

        let levels = build_wots_subtree(pub_seed, sk_seed, layer_u32, cur_tree, h_prime, &params);
        for auth_node in merkle::auth_path(&levels, cur_leaf, h_prime) {
            sig.extend_from_slice(&auth_node);
        }
        node = levels[h_prime][0].clone();

        cur_leaf = (cur_tree & ((1u64 << h_prime) - 1)) as usize;
        cur_tree >>= h_prime;
    }

    debug_assert_eq!(sig.len(), sizes.signature_len);
    Ok(sig)
}

/// Verify `sig` over `message` under `pk`.
///
/// # Errors
/// Returns [`Error::InvalidKey`] on malformed input lengths, [`Error::VerifyFailed`] if the
/// recomputed hypertree root does not match the stored one.
pub fn verify(ps: ParameterSet, pk_bytes: &[u8], message: &[u8], sig_bytes: &[u8]) -> Result<()> {
    let params = validate_ps(ps)?;
    let sizes = ps.sizes();
    if pk_bytes.len() != sizes.public_key_len || sig_bytes.len() != sizes.signature_len {
        return Err(Error::InvalidKey);
    }
    let n = params.n;
    let pub_seed = &pk_bytes[0..n];
    let pk_root = &pk_bytes[n..2 * n];

    let mut pos = 0usize;
    let r = &sig_bytes[pos..pos + n];
    pos += n;
    let (md, tree_idx, leaf_idx) = hash_message(r, pub_seed, pk_root, message, &params);
    let indices = fors_indices(&md, &params);

    let fors_sig_len = params.k * (n + params.a * n);
    if sig_bytes.len() < pos + fors_sig_len {
        return Err(Error::InvalidKey);
    }
    let fors_sig = &sig_bytes[pos..pos + fors_sig_len];
    pos += fors_sig_len;

    let mut cur_tree = tree_idx;
    let mut cur_leaf = leaf_idx as usize;
    let mut fors_addr = Address::new();
    fors_addr.set_layer(0);
    fors_addr.set_tree(cur_tree);
    fors_addr.set_key_pair(cur_leaf as u32);

    let mut node = fors::pk_from_sig(fors_sig, &indices, pub_seed, fors_addr, &params);

    let h_prime = params.h_prime();
    let wots_sig_len = (params.len1 + params.len2) * n;
    for layer in 0..params.d {
        let layer_u32 = layer as u32;
        if sig_bytes.len() < pos + wots_sig_len + h_prime * n {
            return Err(Error::InvalidKey);
        }
        let wots_sig = &sig_bytes[pos..pos + wots_sig_len];
        pos += wots_sig_len;
        let auth_bytes = &sig_bytes[pos..pos + h_prime * n];
        pos += h_prime * n;

        let mut wots_addr = Address::new();
        wots_addr.set_layer(layer_u32);
        wots_addr.set_tree(cur_tree);
        wots_addr.set_key_pair(cur_leaf as u32);
        let leaf_pk = wots::pk_from_sig(wots_sig, &node, pub_seed, wots_addr, &params);

        let mut leaf_addr = Address::new();
        leaf_addr.set_layer(layer_u32);
        leaf_addr.set_tree(cur_tree);
        leaf_addr.set_type(TREE);
        leaf_addr.set_tree_height(0);
        leaf_addr.set_tree_index(cur_leaf as u32);
        let leaf = thash(pub_seed, leaf_addr, &leaf_pk, n);

        let auth: Vec<Vec<u8>> = auth_bytes.chunks(n).map(<[u8]>::to_vec).collect();
        let tree_for_closure = cur_tree;
        node = merkle::root_from_path(leaf, cur_leaf, &auth, |h, local_idx, left, right| {
            let mut addr = Address::new();
            addr.set_layer(layer_u32);
            addr.set_tree(tree_for_closure);
            addr.set_type(TREE);
            addr.set_tree_height(h as u32);
            addr.set_tree_index(local_idx as u32);
            thash(pub_seed, addr, &[left, right].concat(), n)
        });

        cur_leaf = (cur_tree & ((1u64 << h_prime) - 1)) as usize;
        cur_tree >>= h_prime;
    }

    if ct_eq(&node, pk_root) {
        Ok(())
    } else {
        Err(Error::VerifyFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sign_then_verify_succeeds_for_s128() {
        let ps = ParameterSet::SphincsS128Shake;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (pk, sk) = generate(ps, &mut rng).unwrap();
        assert_eq!(pk.len(), ps.sizes().public_key_len);
        assert_eq!(sk.len(), ps.sizes().private_key_len);
        let message = b"sphincs test message";
        let sig = sign(ps, &sk, message, &mut rng).unwrap();
        assert_eq!(sig.len(), ps.sizes().signature_len);
        assert!(verify(ps, &pk, message, &sig).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let ps = ParameterSet::SphincsS128Shake;
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (pk, sk) = generate(ps, &mut rng).unwrap();
        let sig = sign(ps, &sk, b"original", &mut rng).unwrap();
        assert!(verify(ps, &pk, b"tampered", &sig).is_err());
    }

    #[test]
    fn rejects_wrong_length_key() {
        let ps = ParameterSet::SphincsS128Shake;
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        assert!(sign(ps, &[0u8; 3], b"msg", &mut rng).is_err());
    }
}
