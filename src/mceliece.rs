//! Classic McEliece KEM (§4.8): binary Goppa code over GF(2^13), n=6960, t=119, m=13.
//!
//! Key generation samples an irreducible degree-t Goppa polynomial (tested via the standard
//! `x^(q^t) ≡ x` / `gcd(x^(q^(t/p)) - x, g) = 1` criterion over `GF(2^13)[x]`), derives the
//! public support list from a uniformly sampled permutation routed through the Beneš network in
//! [`crate::benes`], and row-reduces the resulting parity-check matrix into systematic form
//! `[I | T]`; `pk = T`. Decapsulation leans on [`crate::goppa::GoppaCode::decode`] for the
//! error-correction step and reconstructs `T` from the stored Goppa polynomial and support to
//! recompute the ciphertext for the implicit-rejection check, rather than storing the public key
//! a second time inside the private key.

use crate::benes;
use crate::codec::ParameterSet;
use crate::error::{Error, Result};
use crate::gf213::Elem;
use crate::goppa::GoppaCode;
use crate::prng::Prng;
use crate::sponge::shake256;
use alloc::vec;
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};

const N: usize = 6960;
const T: usize = 119;
const M: usize = 13;
const FIELD_SIZE: usize = 1 << M;
const MT: usize = M * T;
const K: usize = N - MT;
const ROW_BYTES: usize = (K + 7) / 8;
const PK_LEN: usize = MT * ROW_BYTES;
const CONTROL_BITS_TOTAL: usize = (2 * M - 1) * (FIELD_SIZE / 2);
const CONTROL_BYTES: usize = (CONTROL_BITS_TOTAL + 7) / 8;
const G_BYTES: usize = (T * M + 7) / 8;
const SK_LEN: usize = 32 + CONTROL_BYTES + G_BYTES + 32;
const CT_CORE_BYTES: usize = (MT + 7) / 8;
const CT_LEN: usize = CT_CORE_BYTES + 32;

/// `119 = 7 * 17`; hardcoded since this module only ever instantiates this one parameter set.
const T_PRIME_FACTORS: [usize; 2] = [7, 17];

fn expect_params(ps: ParameterSet) -> Result<()> {
    if ps == ParameterSet::McEliece6960T119 {
        Ok(())
    } else {
        Err(Error::InvalidParameter)
    }
}

fn derive(tag: u8, parts: &[&[u8]]) -> [u8; 32] {
    let mut input = vec![tag];
    for p in parts {
        input.extend_from_slice(p);
    }
    let mut xof = shake256(&input);
    let mut out = [0u8; 32];
    xof.read(&mut out);
    out
}

// --- GF(2^13)[x] polynomial arithmetic, used only for the irreducibility test -----------------

fn poly_trim(mut p: Vec<Elem>) -> Vec<Elem> {
    while p.len() > 1 && p.last() == Some(&Elem::zero()) {
        p.pop();
    }
    p
}

/// Polynomial remainder `a mod g`; `g` need not be monic.
fn poly_mod(a: &[Elem], g: &[Elem]) -> Vec<Elem> {
    let mut r = poly_trim(a.to_vec());
    let gdeg = g.len() - 1;
    let lead_inv = g[gdeg].inv();
    while r.len() > gdeg && !(r.len() == 1 && r[0].is_zero()) {
        let coeff = r[r.len() - 1].mul(lead_inv);
        let shift = r.len() - 1 - gdeg;
        for (i, &gc) in g.iter().enumerate() {
            r[i + shift] = r[i + shift].add(coeff.mul(gc));
        }
        r = poly_trim(r);
    }
    r
}

fn poly_mulmod(a: &[Elem], b: &[Elem], g: &[Elem]) -> Vec<Elem> {
    let mut raw = vec![Elem::zero(); a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai.is_zero() {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            raw[i + j] = raw[i + j].add(ai.mul(bj));
        }
    }
    poly_mod(&poly_trim(raw), g)
}

fn poly_gcd(a: &[Elem], b: &[Elem]) -> Vec<Elem> {
    let mut a = poly_trim(a.to_vec());
    let mut b = poly_trim(b.to_vec());
    while !(b.len() == 1 && b[0].is_zero()) {
        let r = poly_mod(&a, &b);
        a = b;
        b = r;
    }
    a
}

/// `p^(2^13) mod g`, via 13 repeated squarings (Frobenius over `GF(2^13)`).
fn frobenius_q(p: &[Elem], g: &[Elem]) -> Vec<Elem> {
    let mut cur = p.to_vec();
    for _ in 0..M {
        cur = poly_mulmod(&cur, &cur, g);
    }
    cur
}

fn pow_q_iterated(mut base: Vec<Elem>, g: &[Elem], iterations: usize) -> Vec<Elem> {
    for _ in 0..iterations {
        base = frobenius_q(&base, g);
    }
    base
}

/// `g` is irreducible over `GF(2^13)` of degree `t` iff `x^(q^t) == x (mod g)` and, for every
/// prime `p | t`, `gcd(x^(q^(t/p)) - x, g) == 1`.
fn is_irreducible(g: &[Elem]) -> bool {
    let x = vec![Elem::zero(), Elem::new(1)];
    let xq_t = pow_q_iterated(x.clone(), g, T);
    if poly_trim(xq_t) != poly_trim(x.clone()) {
        return false;
    }
    for &p in &T_PRIME_FACTORS {
        let xq_t_over_p = pow_q_iterated(x.clone(), g, T / p);
        // subtraction over GF(2) is XOR, same as addition.
        let mut diff = xq_t_over_p;
        let len = diff.len().max(x.len());
        diff.resize(len, Elem::zero());
        let mut xr = x.clone();
        xr.resize(len, Elem::zero());
        for (d, &xi) in diff.iter_mut().zip(xr.iter()) {
            *d = d.add(xi);
        }
        let gcd = poly_gcd(&poly_trim(diff), g);
        if gcd.len() != 1 {
            return false;
        }
    }
    true
}

fn sample_field_element(prng: &mut Prng) -> Elem {
    let mut b = [0u8; 2];
    prng.fill(&mut b);
    Elem::new(u16::from_le_bytes(b) & ((1u16 << M) - 1))
}

/// Sample coefficients `g[0..T-1]` uniformly, append the implicit leading `1`, and retry until
/// the result is irreducible.
fn sample_irreducible_goppa_poly(prng: &mut Prng) -> Vec<Elem> {
    loop {
        let mut coeffs: Vec<Elem> = (0..T).map(|_| sample_field_element(prng)).collect();
        coeffs.push(Elem::new(1));
        if is_irreducible(&coeffs) {
            return coeffs;
        }
    }
}

/// Fisher-Yates with rejection sampling at each step, so every permutation of `FIELD_SIZE`
/// elements is equally likely regardless of `FIELD_SIZE`'s factors.
fn sample_permutation(prng: &mut Prng) -> Vec<u16> {
    let mut perm: Vec<u16> = (0..FIELD_SIZE as u32).map(|i| i as u16).collect();
    for i in (1..FIELD_SIZE).rev() {
        let bound = (i + 1) as u32;
        let bits = 32 - (bound - 1).leading_zeros();
        let j = loop {
            let mut buf = [0u8; 4];
            prng.fill(&mut buf);
            let v = u32::from_le_bytes(buf) & ((1u32 << bits) - 1);
            if v < bound {
                break v as usize;
            }
        };
        perm.swap(i, j);
    }
    perm
}

fn bit_reverse_13(v: u16) -> u16 {
    let mut r = 0u16;
    for b in 0..M {
        if (v >> b) & 1 == 1 {
            r |= 1 << (M - 1 - b);
        }
    }
    r
}

/// Route the bit-reversed index list through the Beneš network built from `pi`, then keep the
/// first `N` of the resulting `FIELD_SIZE` field elements as the public support list.
fn derive_support(control_bits: &[Vec<u8>]) -> Vec<Elem> {
    let mut data: Vec<u16> = (0..FIELD_SIZE as u32).map(|i| bit_reverse_13(i as u16)).collect();
    benes::apply(control_bits, &mut data);
    data.into_iter().take(N).map(Elem::new).collect()
}

fn eval_poly(p: &[Elem], x: Elem) -> Elem {
    let mut acc = Elem::zero();
    for &coeff in p.iter().rev() {
        acc = acc.mul(x).add(coeff);
    }
    acc
}

fn get_bit(row: &[u64], idx: usize) -> bool {
    (row[idx / 64] >> (idx % 64)) & 1 == 1
}

fn set_bit(row: &mut [u64], idx: usize) {
    row[idx / 64] |= 1 << (idx % 64);
}

/// Build the `(m*t) x n` parity-check bit matrix (column `j`'s entries are the bit decomposition
/// of `L_j^i / g(L_j)^2` for `i` in `0..t`) and row-reduce it into `[I | T]`. Returns `None` when
/// the leading `m*t` columns are not invertible, the signal to resample the permutation.
fn build_systematic_h(g: &[Elem], support: &[Elem]) -> Option<(Vec<u8>, [u8; 32])> {
    let words = (N + 63) / 64;
    let mut rows: Vec<Vec<u64>> = vec![vec![0u64; words]; MT];
    for (j, &x) in support.iter().enumerate() {
        let gx = eval_poly(g, x);
        if gx.is_zero() {
            return None;
        }
        let ginv = gx.inv();
        let mut power = ginv.mul(ginv);
        for i in 0..T {
            for b in 0..M {
                if (power.0 >> b) & 1 == 1 {
                    set_bit(&mut rows[i * M + b], j);
                }
            }
            power = power.mul(x);
        }
    }

    for col in 0..MT {
        let pivot = (col..MT).find(|&r| get_bit(&rows[r], col))?;
        rows.swap(col, pivot);
        let pivot_row = rows[col].clone();
        for r in 0..MT {
            if r != col && get_bit(&rows[r], col) {
                for w in 0..words {
                    rows[r][w] ^= pivot_row[w];
                }
            }
        }
    }

    let mut pk = vec![0u8; PK_LEN];
    for i in 0..MT {
        for (j_rel, j) in (MT..N).enumerate() {
            if get_bit(&rows[i], j) {
                pk[i * ROW_BYTES + j_rel / 8] |= 1 << (j_rel % 8);
            }
        }
    }
    let mut xof = shake256(&pk);
    let mut h4 = [0u8; 32];
    xof.read(&mut h4);
    Some((pk, h4))
}

fn pack_control_bits(bits: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0u8; CONTROL_BYTES];
    let mut idx = 0usize;
    for layer in bits {
        for &b in layer {
            if b == 1 {
                out[idx / 8] |= 1 << (idx % 8);
            }
            idx += 1;
        }
    }
    out
}

fn unpack_control_bits(bytes: &[u8]) -> Vec<Vec<u8>> {
    let layer_len = FIELD_SIZE / 2;
    let mut flat = Vec::with_capacity(CONTROL_BITS_TOTAL);
    for idx in 0..CONTROL_BITS_TOTAL {
        flat.push((bytes[idx / 8] >> (idx % 8)) & 1);
    }
    flat.chunks(layer_len).map(<[u8]>::to_vec).collect()
}

fn pack_g(g: &[Elem]) -> Vec<u8> {
    let mut out = vec![0u8; G_BYTES];
    let mut bitpos = 0usize;
    for elem in &g[..T] {
        let v = u32::from(elem.0);
        for b in 0..M {
            if (v >> b) & 1 == 1 {
                out[(bitpos + b) / 8] |= 1 << ((bitpos + b) % 8);
            }
        }
        bitpos += M;
    }
    out
}

fn unpack_g(bytes: &[u8]) -> Vec<Elem> {
    let mut g = Vec::with_capacity(T + 1);
    let mut bitpos = 0usize;
    for _ in 0..T {
        let mut v = 0u32;
        for b in 0..M {
            let byte = bytes[(bitpos + b) / 8];
            let bit = (byte >> ((bitpos + b) % 8)) & 1;
            v |= u32::from(bit) << b;
        }
        g.push(Elem::new(v as u16));
        bitpos += M;
    }
    g.push(Elem::new(1));
    g
}

fn pack_bits_n(bits: &[u8], n: usize) -> Vec<u8> {
    let mut out = vec![0u8; (n + 7) / 8];
    for (i, &b) in bits.iter().enumerate() {
        if b == 1 {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// Exactly `T` distinct positions set, via rejection-sampled index draws.
fn sample_fixed_weight_error(prng: &mut Prng) -> Vec<u8> {
    let mut e = vec![0u8; N];
    let mut placed = 0usize;
    let mut buf = [0u8; 2];
    while placed < T {
        prng.fill(&mut buf);
        let idx = (u16::from_le_bytes(buf) as usize) % N;
        if e[idx] == 1 {
            continue;
        }
        e[idx] = 1;
        placed += 1;
    }
    e
}

/// `c = H.e`, computed directly from the systematic public key as `e0 XOR T.e1`.
fn encode_syndrome(pk: &[u8], e: &[u8]) -> Vec<u8> {
    let mut c = vec![0u8; CT_CORE_BYTES];
    for i in 0..MT {
        if e[i] == 1 {
            c[i / 8] ^= 1 << (i % 8);
        }
    }
    for i in 0..MT {
        let row = &pk[i * ROW_BYTES..(i + 1) * ROW_BYTES];
        let mut acc = 0u8;
        for (j_rel, &ej) in e[MT..].iter().enumerate() {
            if ej == 1 && (row[j_rel / 8] >> (j_rel % 8)) & 1 == 1 {
                acc ^= 1;
            }
        }
        if acc == 1 {
            c[i / 8] ^= 1 << (i % 8);
        }
    }
    c
}

/// Keygen resamples `pi` whenever the induced matrix isn't systematisable; this bounds that
/// retry loop rather than spinning forever on a pathological RNG.
const MAX_KEYGEN_ATTEMPTS: usize = 128;

/// `KeyGen`: resample `(g, pi)` until the parity-check matrix they induce is systematisable.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if `ps` is not [`ParameterSet::McEliece6960T119`], or
/// [`Error::InternalInvariant`] if no systematisable permutation is found within the retry budget.
pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> Result<(Vec<u8>, Vec<u8>)> {
    expect_params(ps)?;
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let mut prng = Prng::from_seed(seed);
    let g = sample_irreducible_goppa_poly(&mut prng);
    for attempt in 0..MAX_KEYGEN_ATTEMPTS {
        let pi = sample_permutation(&mut prng);
        let control_bits = benes::control_bits_from_permutation(&pi);
        let support = derive_support(&control_bits);
        let (pk, h4) = match build_systematic_h(&g, &support) {
            Some(result) => result,
            None => {
                log::trace!("mceliece keygen: resampling support, attempt {attempt}");
                continue;
            }
        };
        let mut delta = [0u8; 32];
        rng.fill_bytes(&mut delta);
        let mut sk = Vec::with_capacity(SK_LEN);
        sk.extend_from_slice(&delta);
        sk.extend_from_slice(&pack_control_bits(&control_bits));
        sk.extend_from_slice(&pack_g(&g));
        sk.extend_from_slice(&h4);
        return Ok((pk, sk));
    }
    Err(Error::InternalInvariant)
}

/// `KEM.Enc(pk)`.
///
/// # Errors
/// Returns [`Error::InvalidKey`] if `pk.len()` does not match the parameter set.
pub fn encapsulate(
    ps: ParameterSet, pk: &[u8], rng: &mut (impl RngCore + CryptoRng),
) -> Result<(Vec<u8>, Vec<u8>)> {
    expect_params(ps)?;
    if pk.len() != PK_LEN {
        return Err(Error::InvalidKey);
    }
    let mut xof = shake256(pk);
    let mut h4_pk = [0u8; 32];
    xof.read(&mut h4_pk);

    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let mut prng = Prng::from_seed(seed);
    let e = sample_fixed_weight_error(&mut prng);
    let e_bytes = pack_bits_n(&e, N);

    let c_core = encode_syndrome(pk, &e);
    let confirm = derive(2, &[&e_bytes, &h4_pk]);
    let mut ct = c_core.clone();
    ct.extend_from_slice(&confirm);

    let ss = derive(1, &[&e_bytes, &c_core]).to_vec();
    Ok((ct, ss))
}

/// `KEM.Dec(sk, c)`, implicit rejection on mismatch.
///
/// # Errors
/// Returns [`Error::InvalidKey`] or [`Error::InvalidCiphertext`] on a length mismatch, or
/// [`Error::InvalidKey`] if the private key's stored support/polynomial does not reconstruct a
/// valid systematic matrix matching its own stored hash.
pub fn decapsulate(ps: ParameterSet, sk: &[u8], ct: &[u8]) -> Result<Vec<u8>> {
    expect_params(ps)?;
    if sk.len() != SK_LEN {
        return Err(Error::InvalidKey);
    }
    if ct.len() != CT_LEN {
        return Err(Error::InvalidCiphertext);
    }
    let delta = &sk[..32];
    let control_bytes = &sk[32..32 + CONTROL_BYTES];
    let g_bytes = &sk[32 + CONTROL_BYTES..32 + CONTROL_BYTES + G_BYTES];
    let h4_pk: [u8; 32] = sk[32 + CONTROL_BYTES + G_BYTES..].try_into().unwrap();

    let control_bits = unpack_control_bits(control_bytes);
    let support = derive_support(&control_bits);
    let g = unpack_g(g_bytes);

    let (pk, h4_check) = build_systematic_h(&g, &support).ok_or(Error::InvalidKey)?;
    if !crate::domain::ct_eq(&h4_check, &h4_pk) {
        return Err(Error::InvalidKey);
    }

    let c_core = &ct[..CT_CORE_BYTES];
    let mac = &ct[CT_CORE_BYTES..];

    let mut r = vec![0u8; N];
    for (i, slot) in r.iter_mut().enumerate().take(MT) {
        *slot = (c_core[i / 8] >> (i % 8)) & 1;
    }

    let code = GoppaCode::new(g, support);
    let decoded = code.decode(&r);

    let (decode_ok, candidate_e) = match decoded {
        Some(e) => (true, e),
        None => (false, vec![0u8; N]),
    };

    let candidate_bytes = pack_bits_n(&candidate_e, N);
    let c_recomputed = encode_syndrome(&pk, &candidate_e);
    let mac_recomputed = derive(2, &[&candidate_bytes, &h4_pk]);

    let matches =
        decode_ok && crate::domain::ct_eq(&c_recomputed, c_core) && crate::domain::ct_eq(&mac_recomputed, mac);

    let (tag, secret_bytes) = if matches { (1u8, candidate_bytes) } else { (0u8, delta.to_vec()) };
    Ok(derive(tag, &[&secret_bytes, c_core]).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sizes_match_the_declared_parameter_set() {
        let sizes = ParameterSet::McEliece6960T119.sizes();
        assert_eq!(sizes.public_key_len, PK_LEN);
        assert_eq!(sizes.ciphertext_len, CT_LEN);
    }

    #[test]
    fn encapsulation_correctness() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ps = ParameterSet::McEliece6960T119;
        let (pk, sk) = generate(ps, &mut rng).unwrap();
        let (ct, ss1) = encapsulate(ps, &pk, &mut rng).unwrap();
        let ss2 = decapsulate(ps, &sk, &ct).unwrap();
        assert_eq!(ss1, ss2);
    }

    #[test]
    fn tampered_ciphertext_does_not_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let ps = ParameterSet::McEliece6960T119;
        let (pk, sk) = generate(ps, &mut rng).unwrap();
        let (mut ct, _ss1) = encapsulate(ps, &pk, &mut rng).unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 1;
        assert!(decapsulate(ps, &sk, &ct).is_ok());
    }
}
