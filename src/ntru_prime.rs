//! Streamlined NTRU Prime KEM (§4.7): `R_q = Z_q[x]/(x^p - x - 1)`, rounded-quotient
//! ciphertexts, FO-style implicit rejection on decapsulation failure.
//!
//! Polynomials are represented as trimmed little-endian coefficient vectors (`coeffs[i]` is the
//! coefficient of `x^i`), reduced into `[0, q)` or, for small/short polynomials, the signed set
//! `{-1, 0, 1}` stored as `i8`. `x^p ≡ x + 1` in this ring, so reduction after a schoolbook
//! multiply is a single top-down fold rather than a general polynomial division.
//!
//! Implementation note: this module's wire sizes are a self-consistent fixed-width bit-packing
//! of the same mathematical objects the reference submission's variable-base encoder packs more
//! tightly; see DESIGN.md for why exact reference byte-compatibility was not attempted.

use crate::codec::ParameterSet;
use crate::error::{Error, Result};
use crate::prng::Prng;
use crate::sponge::sha3_256;
use alloc::vec;
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};

struct Params {
    p: usize,
    q: u32,
    w: usize,
}

fn params_for(ps: ParameterSet) -> Params {
    match ps {
        ParameterSet::NtruPrime653 => Params { p: 653, q: 4621, w: 288 },
        ParameterSet::NtruPrime761 => Params { p: 761, q: 4591, w: 286 },
        ParameterSet::NtruPrime857 => Params { p: 857, q: 5167, w: 322 },
        _ => unreachable!("caller validated the primitive"),
    }
}

fn bits_for(range: u32) -> u32 {
    32 - (range - 1).leading_zeros()
}

fn pack_bits(values: &[u32], bits: u32) -> Vec<u8> {
    let total_bits = values.len() * bits as usize;
    let mut out = vec![0u8; (total_bits + 7) / 8];
    let mut bitpos = 0usize;
    for &v in values {
        for b in 0..bits {
            if (v >> b) & 1 == 1 {
                out[(bitpos + b as usize) / 8] |= 1 << ((bitpos + b as usize) % 8);
            }
        }
        bitpos += bits as usize;
    }
    out
}

fn unpack_bits(bytes: &[u8], count: usize, bits: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(count);
    let mut bitpos = 0usize;
    for _ in 0..count {
        let mut v = 0u32;
        for b in 0..bits {
            let byte = bytes[(bitpos + b as usize) / 8];
            let bit = (byte >> ((bitpos + b as usize) % 8)) & 1;
            v |= u32::from(bit) << b;
        }
        out.push(v);
        bitpos += bits as usize;
    }
    out
}

// --- Rq arithmetic: Z_q[x]/(x^p - x - 1) ------------------------------------------------------

fn reduce_mod_q(v: i64, q: i64) -> u32 {
    (((v % q) + q) % q) as u32
}

/// Fold a raw schoolbook-multiply result (degree up to `2p-2`) down to degree `< p` using
/// `x^p ≡ x + 1`.
fn reduce_poly(raw: &mut [i64], p: usize, q: i64) {
    for d in (p..raw.len()).rev() {
        let c = raw[d];
        if c == 0 {
            continue;
        }
        raw[d] = 0;
        raw[d - p + 1] += c;
        raw[d - p] += c;
    }
    for c in raw.iter_mut().take(p) {
        *c = reduce_mod_q(*c, q) as i64;
    }
}

fn rq_mul(a: &[u32], b: &[u32], p: usize, q: u32) -> Vec<u32> {
    let mut raw = vec![0i64; 2 * p - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            raw[i + j] += i64::from(ai) * i64::from(bj);
        }
    }
    reduce_poly(&mut raw, p, i64::from(q));
    raw.into_iter().take(p).map(|c| c as u32).collect()
}

fn rq_add(a: &[u32], b: &[u32], q: u32) -> Vec<u32> {
    a.iter().zip(b).map(|(&x, &y)| (x + y) % q).collect()
}

fn small_mul_rq(small: &[i8], b: &[u32], p: usize, q: u32) -> Vec<u32> {
    let a: Vec<u32> = small.iter().map(|&x| reduce_mod_q(i64::from(x), i64::from(q))).collect();
    rq_mul(&a, b, p, q)
}

fn scale_small(small: &[i8], scalar: i64, q: u32) -> Vec<u32> {
    small.iter().map(|&x| reduce_mod_q(i64::from(x) * scalar, i64::from(q))).collect()
}

/// Polynomial extended-gcd over `Z_m[x]` (`m` prime), used both for `R3`'s inverse of `g` and
/// `Rq`'s inverse of `3f`. Returns `None` if `a` is not invertible modulo `modulus`.
fn poly_inverse(a: &[i64], modulus_poly: &[i64], m: i64) -> Option<Vec<i64>> {
    let mut old_r = trim(modulus_poly.to_vec());
    let mut r = trim(a.to_vec());
    let mut old_s = vec![0i64];
    let mut s = vec![1i64];
    while !(r.len() == 1 && r[0] == 0) {
        let (quot, rem) = poly_divmod(&old_r, &r, m)?;
        old_r = r.clone();
        r = rem;
        let new_s = poly_sub(&old_s, &poly_mul_mod(&quot, &s, m), m);
        old_s = s;
        s = new_s;
    }
    if old_r.len() != 1 {
        return None;
    }
    let inv_lead = mod_inverse(old_r[0], m)?;
    Some(old_s.iter().map(|&c| (c * inv_lead).rem_euclid(m)).collect())
}

fn trim(mut p: Vec<i64>) -> Vec<i64> {
    while p.len() > 1 && *p.last().unwrap() == 0 {
        p.pop();
    }
    p
}

fn poly_mul_mod(a: &[i64], b: &[i64], m: i64) -> Vec<i64> {
    if a == [0] || b == [0] {
        return vec![0];
    }
    let mut out = vec![0i64; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] = (out[i + j] + ai * bj).rem_euclid(m);
        }
    }
    trim(out)
}

fn poly_sub(a: &[i64], b: &[i64], m: i64) -> Vec<i64> {
    let len = a.len().max(b.len());
    let mut out = vec![0i64; len];
    for (i, o) in out.iter_mut().enumerate() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        *o = (av - bv).rem_euclid(m);
    }
    trim(out)
}

fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    let a = a.rem_euclid(m);
    if a == 0 {
        return None;
    }
    // m is prime: Fermat's little theorem.
    let mut result = 1i64;
    let mut base = a;
    let mut exp = m - 2;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }
    Some(result)
}

fn poly_divmod(a: &[i64], b: &[i64], m: i64) -> Option<(Vec<i64>, Vec<i64>)> {
    let b = trim(b.to_vec());
    if b == [0] {
        return None;
    }
    let inv_lead = mod_inverse(*b.last().unwrap(), m)?;
    let mut rem = a.to_vec();
    let mut quot = vec![0i64; a.len()];
    while rem.len() >= b.len() && !(rem.len() == 1 && rem[0] == 0) {
        let deg_diff = rem.len() - b.len();
        let coeff = (*rem.last().unwrap() * inv_lead).rem_euclid(m);
        if coeff != 0 {
            for (i, &bc) in b.iter().enumerate() {
                rem[i + deg_diff] = (rem[i + deg_diff] - coeff * bc).rem_euclid(m);
            }
            quot[deg_diff] = coeff;
        }
        rem = trim(rem);
        if rem.len() < b.len() {
            break;
        }
    }
    Some((trim(quot), trim(rem)))
}

/// `x^p - x - 1` as a coefficient vector, for the `poly_inverse` modulus argument.
fn ring_modulus(p: usize) -> Vec<i64> {
    let mut m = vec![0i64; p + 1];
    m[0] = -1;
    m[1] = -1;
    m[p] = 1;
    m
}

// --- sampling ----------------------------------------------------------------------------------

fn sample_small(p: usize, prng: &mut Prng) -> Vec<i8> {
    let mut out = Vec::with_capacity(p);
    let mut byte = [0u8; 1];
    while out.len() < p {
        prng.fill(&mut byte);
        if byte[0] >= 252 {
            continue; // 256 % 3 != 0: drop the high tail to keep the three outcomes uniform
        }
        out.push((byte[0] % 3) as i8 - 1);
    }
    out
}

/// Exactly `w` nonzero coefficients, each ±1, the rest zero ("short").
fn sample_short(p: usize, w: usize, prng: &mut Prng) -> Vec<i8> {
    let mut out = vec![0i8; p];
    let mut placed = 0usize;
    let mut byte = [0u8; 1];
    while placed < w {
        let mut idx_bytes = [0u8; 4];
        prng.fill(&mut idx_bytes);
        let idx = (u32::from_le_bytes(idx_bytes) as usize) % p;
        if out[idx] != 0 {
            continue;
        }
        prng.fill(&mut byte);
        out[idx] = if byte[0] & 1 == 1 { 1 } else { -1 };
        placed += 1;
    }
    out
}

fn small_to_i64(small: &[i8]) -> Vec<i64> {
    small.iter().map(|&x| i64::from(x)).collect()
}

fn hash_tag(tag: u8, data: &[u8]) -> [u8; 32] {
    sha3_256(&[&[tag], data].concat())
}

fn encode_small(small: &[i8]) -> Vec<u8> {
    let values: Vec<u32> = small.iter().map(|&x| (x + 1) as u32).collect();
    pack_bits(&values, 2)
}

fn encode_rq(poly: &[u32], bits: u32) -> Vec<u8> {
    pack_bits(poly, bits)
}

fn decode_rq(bytes: &[u8], p: usize, bits: u32) -> Vec<u32> {
    unpack_bits(bytes, p, bits)
}

struct Sizes {
    pk_bits: u32,
    ct_bits: u32,
    small_bytes: usize,
    pk_len: usize,
    sk_len: usize,
    ct_len: usize,
}

fn sizes_for(params: &Params) -> Sizes {
    let pk_bits = bits_for(params.q);
    // A rounded coefficient is stored as a full q-range residue (see `hide`'s bias), not the
    // smaller range its magnitude would allow, trading some density for a no-wraparound proof.
    let ct_bits = pk_bits;
    let small_bytes = (params.p * 2 + 7) / 8;
    let pk_len = (params.p * pk_bits as usize + 7) / 8;
    let sk_len = 2 * small_bytes + pk_len + 64;
    let ct_len = (params.p * ct_bits as usize + 7) / 8 + 32;
    Sizes { pk_bits, ct_bits, small_bytes, pk_len, sk_len, ct_len }
}

/// `KeyGen`: sample `g` (small, `R3`-invertible) and `f` (short, weight `w`); `h = g/(3f)` in `Rq`.
/// `sk = (f, ginv3, pk, rho, H4(pk))`.
pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> (Vec<u8>, Vec<u8>) {
    let params = params_for(ps);
    let sizes = sizes_for(&params);
    let modulus = ring_modulus(params.p);

    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let mut prng = Prng::from_seed(seed);

    let (g, ginv3) = loop {
        let g = sample_small(params.p, &mut prng);
        if let Some(inv) = poly_inverse(&small_to_i64(&g), &modulus, 3) {
            break (g, inv);
        }
    };
    let f = sample_short(params.p, params.w, &mut prng);

    let three_f_rq: Vec<u32> =
        f.iter().map(|&x| reduce_mod_q(3 * i64::from(x), i64::from(params.q))).collect();
    let three_f_inv_i64 = poly_inverse(
        &three_f_rq.iter().map(|&c| i64::from(c)).collect::<Vec<_>>(),
        &modulus,
        i64::from(params.q),
    )
    .expect("3f invertible in Rq with overwhelming probability");
    let mut three_f_inv: Vec<u32> =
        three_f_inv_i64.iter().map(|&c| reduce_mod_q(c, i64::from(params.q))).collect();
    three_f_inv.resize(params.p, 0);

    let g_rq: Vec<u32> = g.iter().map(|&x| reduce_mod_q(i64::from(x), i64::from(params.q))).collect();
    let h = rq_mul(&g_rq, &three_f_inv, params.p, params.q);

    let pk = encode_rq(&h, sizes.pk_bits);
    let h4_pk = hash_tag(4, &pk);
    let mut rho = [0u8; 32];
    rng.fill_bytes(&mut rho);

    let mut ginv3_trits = vec![0i8; params.p];
    for (slot, &c) in ginv3_trits.iter_mut().zip(ginv3.iter()) {
        *slot = match c.rem_euclid(3) {
            1 => 1,
            2 => -1,
            _ => 0,
        };
    }

    let mut sk = encode_small(&f);
    sk.extend_from_slice(&encode_small(&ginv3_trits));
    sk.extend_from_slice(&pk);
    sk.extend_from_slice(&rho);
    sk.extend_from_slice(&h4_pk);
    (pk, sk)
}

fn unpack_sk(params: &Params, sizes: &Sizes, sk: &[u8]) -> (Vec<i8>, Vec<i8>, Vec<u8>, [u8; 32], [u8; 32]) {
    let f_trits: Vec<i8> = unpack_bits(&sk[..sizes.small_bytes], params.p, 2)
        .into_iter()
        .map(|v| v as i8 - 1)
        .collect();
    let ginv_trits: Vec<i8> = unpack_bits(
        &sk[sizes.small_bytes..2 * sizes.small_bytes],
        params.p,
        2,
    )
    .into_iter()
    .map(|v| v as i8 - 1)
    .collect();
    let pk_start = 2 * sizes.small_bytes;
    let pk = sk[pk_start..pk_start + sizes.pk_len].to_vec();
    let rho: [u8; 32] = sk[pk_start + sizes.pk_len..pk_start + sizes.pk_len + 32].try_into().unwrap();
    let h4: [u8; 32] =
        sk[pk_start + sizes.pk_len + 32..pk_start + sizes.pk_len + 64].try_into().unwrap();
    (f_trits, ginv_trits, pk, rho, h4)
}

/// Round a centred residue to the nearest multiple of 3, as a plain integer (not reduced mod
/// `q`): `signed` is always centred in `(-q/2, q/2]`, so the result never needs to wrap.
fn round_to_multiple_of_3(signed: i64) -> i64 {
    let rem = signed.rem_euclid(3);
    let down = signed - rem;
    if rem == 2 {
        down + 3
    } else {
        down
    }
}

/// `Hide`: encrypt a short `r` under `h`, rounding to a multiple of 3, plus a confirmation tag.
///
/// Each rounded coefficient's quotient-by-3 is biased by `q/2` before packing, so it round-trips
/// through an unsigned `ct_bits`-wide field without ever wrapping around `q`.
fn hide(params: &Params, sizes: &Sizes, r: &[i8], h: &[u32], h4_pk: &[u8; 32]) -> Vec<u8> {
    let hr = small_mul_rq(r, h, params.p, params.q);
    let bias = i64::from(params.q / 2);
    let rounded: Vec<u32> = hr
        .iter()
        .map(|&c| {
            let signed = if c > params.q / 2 { i64::from(c) - i64::from(params.q) } else { i64::from(c) };
            let quotient = round_to_multiple_of_3(signed) / 3;
            (quotient + bias) as u32
        })
        .collect();
    let mut ct = encode_rq(&rounded, sizes.ct_bits);
    let r_enc = encode_small(r);
    let confirm = hash_confirm(&r_enc, h4_pk);
    ct.extend_from_slice(&confirm);
    ct
}

fn hash_confirm(r_enc: &[u8], h4_pk: &[u8; 32]) -> [u8; 32] {
    let hy = hash_tag(3, r_enc);
    hash_tag(2, &[hy.as_slice(), h4_pk].concat())
}

fn hash_session(tag: u8, r_enc: &[u8], ct_core: &[u8]) -> Vec<u8> {
    let hy = hash_tag(3, r_enc);
    let mut out = vec![0u8; 32];
    out.copy_from_slice(&hash_tag(tag, &[hy.as_slice(), ct_core].concat()));
    out
}

/// `KEM.Enc(pk)`.
///
/// # Errors
/// Returns [`Error::InvalidKey`] if `pk.len()` does not match the parameter set.
pub fn encapsulate(
    ps: ParameterSet, pk: &[u8], rng: &mut (impl RngCore + CryptoRng),
) -> Result<(Vec<u8>, Vec<u8>)> {
    let params = params_for(ps);
    let sizes = sizes_for(&params);
    if pk.len() != sizes.pk_len {
        return Err(Error::InvalidKey);
    }
    let h = decode_rq(pk, params.p, sizes.pk_bits);
    let h4_pk: [u8; 32] = hash_tag(4, pk);

    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let mut prng = Prng::from_seed(seed);
    let r = sample_short(params.p, params.w, &mut prng);

    let ct = hide(&params, &sizes, &r, &h, &h4_pk);
    let r_enc = encode_small(&r);
    let ss = hash_session(1, &r_enc, &ct);
    Ok((ct, ss))
}

/// `KEM.Dec(sk, c)`, implicit rejection on mismatch.
///
/// # Errors
/// Returns [`Error::InvalidKey`] or [`Error::InvalidCiphertext`] on a length mismatch.
pub fn decapsulate(ps: ParameterSet, sk: &[u8], ct: &[u8]) -> Result<Vec<u8>> {
    let params = params_for(ps);
    let sizes = sizes_for(&params);
    if sk.len() != sizes.sk_len {
        return Err(Error::InvalidKey);
    }
    if ct.len() != sizes.ct_len {
        return Err(Error::InvalidCiphertext);
    }
    let (f, ginv3, pk, rho, h4_pk) = unpack_sk(&params, &sizes, sk);
    let h = decode_rq(&pk, params.p, sizes.pk_bits);

    let ct_core = &ct[..ct.len() - 32];
    let rounded = decode_rq(ct_core, params.p, sizes.ct_bits);
    let bias = i64::from(params.q / 2);
    let c_scaled: Vec<u32> = rounded
        .iter()
        .map(|&biased| {
            let quotient = i64::from(biased) - bias;
            reduce_mod_q(3 * quotient, i64::from(params.q))
        })
        .collect();

    // 3*f*c in Rq, centred and reduced mod 3, then multiplied by ginv3 in R3.
    let fc = small_mul_rq(&f, &c_scaled, params.p, params.q);
    let e_mod3: Vec<i8> = fc
        .iter()
        .map(|&c| {
            let signed = if c > params.q / 2 { i64::from(c) - i64::from(params.q) } else { i64::from(c) };
            match signed.rem_euclid(3) {
                1 => 1i8,
                2 => -1i8,
                _ => 0i8,
            }
        })
        .collect();
    let candidate_i64 = poly_mul_mod(&small_to_i64(&e_mod3), &small_to_i64(&ginv3), 3);
    let mut candidate_r = vec![0i8; params.p];
    for (slot, &c) in candidate_r.iter_mut().zip(candidate_i64.iter()) {
        *slot = match c.rem_euclid(3) {
            1 => 1,
            2 => -1,
            _ => 0,
        };
    }

    let r_enc = encode_small(&candidate_r);
    let confirm = hash_confirm(&r_enc, &h4_pk);
    let recomputed = hide(&params, &sizes, &candidate_r, &h, &h4_pk);

    let ct_matches = crate::domain::ct_eq(ct_core, &recomputed[..recomputed.len() - 32])
        && crate::domain::ct_eq(&confirm, &ct[ct.len() - 32..]);

    let chosen = if ct_matches { r_enc } else { encode_small(&sample_short(params.p, params.w, &mut rho_prng(&rho))) };
    let tag = if ct_matches { 1 } else { 0 };
    Ok(hash_session(tag, &chosen, ct))
}

fn rho_prng(rho: &[u8; 32]) -> Prng {
    Prng::from_seed(*rho)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn encapsulation_correctness_all_parameter_sets() {
        for ps in [ParameterSet::NtruPrime653, ParameterSet::NtruPrime761, ParameterSet::NtruPrime857] {
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            let (pk, sk) = generate(ps, &mut rng);
            let (ct, ss1) = encapsulate(ps, &pk, &mut rng).unwrap();
            let ss2 = decapsulate(ps, &sk, &ct).unwrap();
            assert_eq!(ss1, ss2);
        }
    }

    #[test]
    fn tampered_ciphertext_does_not_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let ps = ParameterSet::NtruPrime653;
        let (pk, sk) = generate(ps, &mut rng);
        let (mut ct, _ss1) = encapsulate(ps, &pk, &mut rng).unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 1;
        assert!(decapsulate(ps, &sk, &ct).is_ok());
    }
}
