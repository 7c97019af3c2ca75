//! Dilithium: Fiat-Shamir-with-aborts lattice signatures over the shared `RingQ` (Section 4.12).
//!
//! Parameter sets differ only in the module rank `(k, l)`, the noise width `eta`, and the
//! rejection thresholds `(gamma1, gamma2, beta, tau, omega)`; the rest is the same NTT, hashing
//! and bit-packing plumbing `kyber.rs` already uses, just over a different modulus.

use crate::codec::ParameterSet;
use crate::domain::ct_eq;
use crate::error::{Error, Result};
use crate::ring::RingQ;
use crate::sponge::{cshake, shake256};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};

const Q: i64 = 8_380_417;
// 1753 is the primitive root Dilithium's reference code calls `zeta`, but it is only a
// primitive *512th* root of unity mod Q (1753^256 == -1, not 1753^128). `ring.rs`'s incomplete
// NTT needs a primitive *256th* root whose 128th power is -1, so square it: 1753^2 = 3073009
// satisfies 3073009^128 == -1 mod Q and is what actually drives the base-case factorization
// X^256 - zetas[2] == X^256 + 1.
const ZETA: u32 = 3_073_009;
const N: usize = 256;
const D: u32 = 13;

/// Bounded-retry budget for the Fiat-Shamir-with-aborts loop. Rejection probability per attempt
/// is small by construction; exhausting this many attempts means the sampled seed is pathological.
const MAX_SIGN_ATTEMPTS: u16 = 1000;

struct Params {
    k: usize,
    l: usize,
    eta: u32,
    eta_bits: u32,
    gamma1: i64,
    gamma1_bits: u32,
    gamma2: i64,
    tau: usize,
    beta: i64,
    omega: usize,
}

fn params_for(ps: ParameterSet) -> Params {
    match ps {
        ParameterSet::DilithiumS1 => Params {
            k: 4,
            l: 4,
            eta: 2,
            eta_bits: 3,
            gamma1: 1 << 17,
            gamma1_bits: 18,
            gamma2: (Q - 1) / 88,
            tau: 39,
            beta: 78,
            omega: 80,
        },
        ParameterSet::DilithiumS2 => Params {
            k: 6,
            l: 5,
            eta: 4,
            eta_bits: 4,
            gamma1: 1 << 19,
            gamma1_bits: 20,
            gamma2: (Q - 1) / 32,
            tau: 49,
            beta: 196,
            omega: 55,
        },
        ParameterSet::DilithiumS3 => Params {
            k: 8,
            l: 7,
            eta: 2,
            eta_bits: 3,
            gamma1: 1 << 19,
            gamma1_bits: 20,
            gamma2: (Q - 1) / 32,
            tau: 60,
            beta: 120,
            omega: 75,
        },
        _ => unreachable!("caller validated the primitive"),
    }
}

fn validate_ps(ps: ParameterSet) -> Result<Params> {
    match ps {
        ParameterSet::DilithiumS1 | ParameterSet::DilithiumS2 | ParameterSet::DilithiumS3 => Ok(params_for(ps)),
        _ => Err(Error::InvalidParameter),
    }
}

fn ring() -> RingQ {
    RingQ::new(Q as u32, ZETA)
}

fn hash32(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut xof = shake256(data);
    xof.read(&mut out);
    out
}

fn hash64(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    let mut xof = shake256(data);
    xof.read(&mut out);
    out
}

fn hash128(data: &[u8]) -> [u8; 128] {
    let mut out = [0u8; 128];
    let mut xof = shake256(data);
    xof.read(&mut out);
    out
}

/// Generalized bit packer, little-endian within the stream (same shape as `kyber::encode_poly`).
fn pack_bits(coeffs: &[u32], bits: u32) -> Vec<u8> {
    let mut out = vec![0u8; (coeffs.len() * bits as usize + 7) / 8];
    let mut acc = 0u32;
    let mut acc_bits = 0u32;
    let mut pos = 0usize;
    for &c in coeffs {
        acc |= c << acc_bits;
        acc_bits += bits;
        while acc_bits >= 8 {
            out[pos] = acc as u8;
            pos += 1;
            acc >>= 8;
            acc_bits -= 8;
        }
    }
    if acc_bits > 0 {
        out[pos] = acc as u8;
    }
    out
}

fn unpack_bits(bytes: &[u8], count: usize, bits: u32) -> Vec<u32> {
    let mask = if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 };
    let mut acc = 0u32;
    let mut acc_bits = 0u32;
    let mut pos = 0usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        while acc_bits < bits {
            acc |= u32::from(bytes[pos]) << acc_bits;
            pos += 1;
            acc_bits += 8;
        }
        out.push(acc & mask);
        acc >>= bits;
        acc_bits -= bits;
    }
    out
}

fn center(r: i64, q: i64) -> i64 {
    let r = r.rem_euclid(q);
    if r > q / 2 {
        r - q
    } else {
        r
    }
}

fn reduce_mod_q(x: i64) -> u32 {
    x.rem_euclid(Q) as u32
}

fn to_ring(poly: &[i64; N]) -> [u32; N] {
    core::array::from_fn(|i| reduce_mod_q(poly[i]))
}

fn infinity_norm_exceeds(poly: &[u32; N], bound: i64) -> bool {
    poly.iter().any(|&c| center(i64::from(c), Q).abs() >= bound)
}

fn bits_for_range(count: i64) -> u32 {
    let mut bits = 0u32;
    while (1i64 << bits) < count {
        bits += 1;
    }
    bits
}

/// `Power2Round`: split `r` into `(r1, r0)` with `r = r1 * 2^D + r0`, `r0` centred in
/// `(-2^(D-1), 2^(D-1)]`.
fn power2round(r: u32) -> (u32, i64) {
    let twod = 1i64 << D;
    let r0 = center(i64::from(r), twod);
    let r1 = (i64::from(r) - r0) >> D;
    (r1 as u32, r0)
}

/// `Decompose`: split `r` into `(r1, r0)` relative to `2*gamma2`, with the single boundary
/// adjustment the reference algorithm makes when `r - r0` lands exactly on `q - 1`.
fn decompose(r: u32, gamma2: i64) -> (i64, i64) {
    let r = i64::from(r).rem_euclid(Q);
    let r0 = center(r, 2 * gamma2);
    if r - r0 == Q - 1 {
        (0, r0 - 1)
    } else {
        ((r - r0) / (2 * gamma2), r0)
    }
}

fn high_bits(r: u32, gamma2: i64) -> i64 {
    decompose(r, gamma2).0
}

fn low_bits(r: u32, gamma2: i64) -> i64 {
    decompose(r, gamma2).1
}

fn make_hint(z: i64, r: u32, gamma2: i64) -> bool {
    let r1 = decompose(r, gamma2).0;
    let v1 = decompose(reduce_mod_q(i64::from(r) + z), gamma2).0;
    r1 != v1
}

fn use_hint(h: bool, r: u32, gamma2: i64) -> i64 {
    let (r1, r0) = decompose(r, gamma2);
    let m = (Q - 1) / (2 * gamma2);
    if !h {
        return r1;
    }
    if r0 > 0 {
        (r1 + 1) % m
    } else {
        (r1 - 1 + m) % m
    }
}

fn shift_t1(t1: &[u32; N]) -> [u32; N] {
    core::array::from_fn(|i| reduce_mod_q(i64::from(t1[i]) << D))
}

fn pack_t1(poly: &[u32; N]) -> Vec<u8> {
    pack_bits(poly, 10)
}

fn unpack_t1(bytes: &[u8]) -> [u32; N] {
    let vals = unpack_bits(bytes, N, 10);
    core::array::from_fn(|i| vals[i])
}

fn pack_t0(poly: &[i64; N]) -> Vec<u8> {
    let offset = 1i64 << (D - 1);
    let vals: Vec<u32> = poly.iter().map(|&v| (offset - v) as u32).collect();
    pack_bits(&vals, D)
}

fn unpack_t0(bytes: &[u8]) -> [i64; N] {
    let offset = 1i64 << (D - 1);
    let vals = unpack_bits(bytes, N, D);
    core::array::from_fn(|i| offset - i64::from(vals[i]))
}

fn pack_eta(poly: &[u32; N], eta: u32, bits: u32) -> Vec<u8> {
    let vals: Vec<u32> = poly.iter().map(|&c| (i64::from(eta) - center(i64::from(c), Q)) as u32).collect();
    pack_bits(&vals, bits)
}

fn unpack_eta(bytes: &[u8], eta: u32, bits: u32) -> [u32; N] {
    let vals = unpack_bits(bytes, N, bits);
    core::array::from_fn(|i| reduce_mod_q(i64::from(eta) - i64::from(vals[i])))
}

fn pack_z(poly: &[u32; N], params: &Params) -> Vec<u8> {
    let vals: Vec<u32> =
        poly.iter().map(|&c| (params.gamma1 - center(i64::from(c), Q)) as u32).collect();
    pack_bits(&vals, params.gamma1_bits)
}

fn unpack_z(bytes: &[u8], params: &Params) -> [u32; N] {
    let vals = unpack_bits(bytes, N, params.gamma1_bits);
    core::array::from_fn(|i| reduce_mod_q(params.gamma1 - i64::from(vals[i])))
}

fn pack_hint(h: &[[bool; N]], omega: usize, k: usize) -> Vec<u8> {
    let mut out = vec![0u8; omega + k];
    let mut idx = 0usize;
    for (i, poly) in h.iter().enumerate() {
        for (j, &bit) in poly.iter().enumerate() {
            if bit {
                out[idx] = j as u8;
                idx += 1;
            }
        }
        out[omega + i] = idx as u8;
    }
    out
}

fn unpack_hint(bytes: &[u8], omega: usize, k: usize) -> Option<Vec<[bool; N]>> {
    if bytes.len() != omega + k {
        return None;
    }
    let mut h = vec![[false; N]; k];
    let mut prev = 0usize;
    for i in 0..k {
        let cur = bytes[omega + i] as usize;
        if cur < prev || cur > omega {
            return None;
        }
        for &pos in &bytes[prev..cur] {
            if pos as usize >= N {
                return None;
            }
            h[i][pos as usize] = true;
        }
        prev = cur;
    }
    Some(h)
}

fn hint_weight(h: &[[bool; N]]) -> usize {
    h.iter().map(|p| p.iter().filter(|&&b| b).count()).sum()
}

fn expand_a(rho: &[u8; 32], k: usize, l: usize) -> Vec<Vec<[u32; N]>> {
    let r = ring();
    let mut a = vec![vec![[0u32; N]; l]; k];
    for (i, row) in a.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut xof = cshake(168, &[], &[], &[rho.as_slice(), &[j as u8], &[i as u8]].concat());
            *cell = r.sample_uniform(&mut xof);
        }
    }
    a
}

fn expand_mask(seed: &[u8; 64], attempt: u16, params: &Params) -> Vec<[u32; N]> {
    let nbytes = (N * params.gamma1_bits as usize + 7) / 8;
    let mut ys = Vec::with_capacity(params.l);
    for j in 0..params.l {
        let nonce = attempt * params.l as u16 + j as u16;
        let mut xof = shake256(&[seed.as_slice(), &nonce.to_le_bytes()].concat());
        let mut buf = vec![0u8; nbytes];
        xof.read(&mut buf);
        let vals = unpack_bits(&buf, N, params.gamma1_bits);
        let poly: [u32; N] = core::array::from_fn(|i| reduce_mod_q(params.gamma1 - i64::from(vals[i])));
        ys.push(poly);
    }
    ys
}

fn sample_in_ball(c_tilde: &[u8], tau: usize) -> [i64; N] {
    let mut c = [0i64; N];
    let mut xof = shake256(c_tilde);
    let mut sign_bytes = [0u8; 8];
    xof.read(&mut sign_bytes);
    let mut sign_bits = u64::from_le_bytes(sign_bytes);
    for i in (N - tau)..N {
        let j = loop {
            let mut b = [0u8; 1];
            xof.read(&mut b);
            if (b[0] as usize) <= i {
                break b[0] as usize;
            }
        };
        c[i] = c[j];
        c[j] = if sign_bits & 1 == 1 { -1 } else { 1 };
        sign_bits >>= 1;
    }
    c
}

fn w1_packed(w1: &[Vec<i64>], gamma2: i64) -> Vec<u8> {
    let bits = bits_for_range((Q - 1) / (2 * gamma2));
    let mut out = Vec::new();
    for poly in w1 {
        let vals: Vec<u32> = poly.iter().map(|&v| v as u32).collect();
        out.extend_from_slice(&pack_bits(&vals, bits));
    }
    out
}

/// Generate a `(pk, sk)` pair. Deterministic given the RNG's output; no rejection can occur.
#[must_use]
pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> Result<(Vec<u8>, Vec<u8>)> {
    let params = validate_ps(ps)?;
    let sizes = ps.sizes();
    let ring = ring();

    let mut xi = [0u8; 32];
    rng.fill_bytes(&mut xi);
    let seed_material = hash128(&xi);
    let rho: [u8; 32] = seed_material[0..32].try_into().expect("32-byte slice");
    let rho_prime: [u8; 64] = seed_material[32..96].try_into().expect("64-byte slice");
    let big_k: [u8; 32] = seed_material[96..128].try_into().expect("32-byte slice");

    let a_hat = expand_a(&rho, params.k, params.l);

    let mut s1 = Vec::with_capacity(params.l);
    for j in 0..params.l {
        let mut sxof = shake256(&[rho_prime.as_slice(), &(j as u16).to_le_bytes()].concat());
        s1.push(ring.sample_bounded(params.eta, &mut sxof));
    }
    let mut s2 = Vec::with_capacity(params.k);
    for i in 0..params.k {
        let nonce = (params.l + i) as u16;
        let mut sxof = shake256(&[rho_prime.as_slice(), &nonce.to_le_bytes()].concat());
        s2.push(ring.sample_bounded(params.eta, &mut sxof));
    }

    let s1_hat: Vec<[u32; N]> = s1.iter().map(|p| ring.ntt(p)).collect();
    let mut t = Vec::with_capacity(params.k);
    for i in 0..params.k {
        let mut acc = [0u32; N];
        for j in 0..params.l {
            let prod = ring.multiply_ntts(&a_hat[i][j], &s1_hat[j]);
            acc = ring.add(&acc, &prod);
        }
        let t_normal = ring.inv_ntt(&acc);
        t.push(ring.add(&t_normal, &s2[i]));
    }

    let mut t1 = Vec::with_capacity(params.k);
    let mut t0 = Vec::with_capacity(params.k);
    for poly in &t {
        let mut t1_poly = [0u32; N];
        let mut t0_poly = [0i64; N];
        for c in 0..N {
            let (hi, lo) = power2round(poly[c]);
            t1_poly[c] = hi;
            t0_poly[c] = lo;
        }
        t1.push(t1_poly);
        t0.push(t0_poly);
    }

    let mut pk = Vec::with_capacity(sizes.public_key_len);
    pk.extend_from_slice(&rho);
    for poly in &t1 {
        pk.extend_from_slice(&pack_t1(poly));
    }

    let tr = hash32(&pk);

    let mut sk = Vec::with_capacity(sizes.private_key_len);
    sk.extend_from_slice(&rho);
    sk.extend_from_slice(&big_k);
    sk.extend_from_slice(&tr);
    for poly in &s1 {
        sk.extend_from_slice(&pack_eta(poly, params.eta, params.eta_bits));
    }
    for poly in &s2 {
        sk.extend_from_slice(&pack_eta(poly, params.eta, params.eta_bits));
    }
    for poly in &t0 {
        sk.extend_from_slice(&pack_t0(poly));
    }

    debug_assert_eq!(pk.len(), sizes.public_key_len);
    debug_assert_eq!(sk.len(), sizes.private_key_len);
    Ok((pk, sk))
}

/// Sign `message` under `sk`. Loops the Fiat-Shamir-with-aborts rejection sampling internally;
/// bounded by [`MAX_SIGN_ATTEMPTS`].
///
/// # Errors
/// Returns [`Error::InvalidKey`] if `sk` has the wrong length, or [`Error::InternalInvariant`]
/// if the rejection loop exhausts its retry budget.
pub fn sign(
    ps: ParameterSet,
    sk_bytes: &[u8],
    message: &[u8],
    _rng: &mut (impl RngCore + CryptoRng),
) -> Result<Vec<u8>> {
    let params = validate_ps(ps)?;
    let sizes = ps.sizes();
    if sk_bytes.len() != sizes.private_key_len {
        return Err(Error::InvalidKey);
    }
    let ring = ring();

    let rho: [u8; 32] = sk_bytes[0..32].try_into().expect("32-byte slice");
    let big_k: [u8; 32] = sk_bytes[32..64].try_into().expect("32-byte slice");
    let tr: [u8; 32] = sk_bytes[64..96].try_into().expect("32-byte slice");
    let mut pos = 96usize;
    let eta_poly_bytes = (N * params.eta_bits as usize + 7) / 8;
    let mut s1 = Vec::with_capacity(params.l);
    for _ in 0..params.l {
        s1.push(unpack_eta(&sk_bytes[pos..pos + eta_poly_bytes], params.eta, params.eta_bits));
        pos += eta_poly_bytes;
    }
    let mut s2 = Vec::with_capacity(params.k);
    for _ in 0..params.k {
        s2.push(unpack_eta(&sk_bytes[pos..pos + eta_poly_bytes], params.eta, params.eta_bits));
        pos += eta_poly_bytes;
    }
    let t0_poly_bytes = (N * D as usize + 7) / 8;
    let mut t0 = Vec::with_capacity(params.k);
    for _ in 0..params.k {
        t0.push(unpack_t0(&sk_bytes[pos..pos + t0_poly_bytes]));
        pos += t0_poly_bytes;
    }
    let t0_ring: Vec<[u32; N]> = t0.iter().map(to_ring).collect();

    let mu = hash64(&[tr.as_slice(), message].concat());
    let rho_prime2 = hash64(&[big_k.as_slice(), mu.as_slice()].concat());

    let a_hat = expand_a(&rho, params.k, params.l);
    let s1_hat: Vec<[u32; N]> = s1.iter().map(|p| ring.ntt(p)).collect();

    for attempt in 0..MAX_SIGN_ATTEMPTS {
        let y = expand_mask(&rho_prime2, attempt, &params);
        let y_hat: Vec<[u32; N]> = y.iter().map(|p| ring.ntt(p)).collect();

        let mut w = Vec::with_capacity(params.k);
        for i in 0..params.k {
            let mut acc = [0u32; N];
            for j in 0..params.l {
                let prod = ring.multiply_ntts(&a_hat[i][j], &y_hat[j]);
                acc = ring.add(&acc, &prod);
            }
            w.push(ring.inv_ntt(&acc));
        }

        let w1: Vec<Vec<i64>> =
            w.iter().map(|p| p.iter().map(|&c| high_bits(c, params.gamma2)).collect()).collect();
        let c_tilde = hash32(&[mu.as_slice(), w1_packed(&w1, params.gamma2).as_slice()].concat());
        let c = sample_in_ball(&c_tilde, params.tau);
        let c_ring = to_ring(&c);

        let mut z = Vec::with_capacity(params.l);
        let mut norm_reject = false;
        for j in 0..params.l {
            let cs1 = ring.multiply(&c_ring, &s1[j]);
            let zj = ring.add(&y[j], &cs1);
            if infinity_norm_exceeds(&zj, params.gamma1 - params.beta) {
                norm_reject = true;
            }
            z.push(zj);
        }

        let mut cs2 = Vec::with_capacity(params.k);
        for i in 0..params.k {
            cs2.push(ring.multiply(&c_ring, &s2[i]));
        }
        for i in 0..params.k {
            let diff = ring.sub(&w[i], &cs2[i]);
            for &c in &diff {
                if low_bits(c, params.gamma2).abs() >= params.gamma2 - params.beta {
                    norm_reject = true;
                }
            }
        }

        let mut ct0 = Vec::with_capacity(params.k);
        for i in 0..params.k {
            let prod = ring.multiply(&c_ring, &t0_ring[i]);
            if infinity_norm_exceeds(&prod, params.gamma2) {
                norm_reject = true;
            }
            ct0.push(prod);
        }

        if norm_reject {
            log::trace!("dilithium sign: rejection at attempt {attempt}, resampling y");
            continue;
        }

        let mut h = Vec::with_capacity(params.k);
        for i in 0..params.k {
            let neg_ct0 = ring.neg(&ct0[i]);
            let diff = ring.sub(&w[i], &cs2[i]);
            let r_for_hint = ring.add(&diff, &ct0[i]);
            let mut hint_poly = [false; N];
            for c in 0..N {
                hint_poly[c] = make_hint(i64::from(neg_ct0[c]), r_for_hint[c], params.gamma2);
            }
            h.push(hint_poly);
        }
        if hint_weight(&h) > params.omega {
            log::trace!("dilithium sign: hint weight exceeded omega at attempt {attempt}");
            continue;
        }

        let mut sig = Vec::with_capacity(sizes.signature_len);
        sig.extend_from_slice(&c_tilde);
        for poly in &z {
            sig.extend_from_slice(&pack_z(poly, &params));
        }
        sig.extend_from_slice(&pack_hint(&h, params.omega, params.k));
        debug_assert_eq!(sig.len(), sizes.signature_len);
        return Ok(sig);
    }
    Err(Error::InternalInvariant)
}

/// Verify `sig` over `message` under `pk`.
///
/// # Errors
/// Returns [`Error::InvalidKey`] on malformed input lengths, [`Error::VerifyFailed`] on any
/// verification failure.
pub fn verify(ps: ParameterSet, pk_bytes: &[u8], message: &[u8], sig_bytes: &[u8]) -> Result<()> {
    let params = validate_ps(ps)?;
    let sizes = ps.sizes();
    if pk_bytes.len() != sizes.public_key_len || sig_bytes.len() != sizes.signature_len {
        return Err(Error::InvalidKey);
    }
    let ring = ring();

    let rho: [u8; 32] = pk_bytes[0..32].try_into().expect("32-byte slice");
    let t1_poly_bytes = (N * 10) / 8;
    let mut t1 = Vec::with_capacity(params.k);
    for i in 0..params.k {
        let start = 32 + i * t1_poly_bytes;
        t1.push(unpack_t1(&pk_bytes[start..start + t1_poly_bytes]));
    }

    if sig_bytes.len() < 32 {
        return Err(Error::InvalidKey);
    }
    let c_tilde = &sig_bytes[0..32];
    let z_poly_bytes = (N * params.gamma1_bits as usize + 7) / 8;
    let mut offset = 32usize;
    let mut z = Vec::with_capacity(params.l);
    for _ in 0..params.l {
        if sig_bytes.len() < offset + z_poly_bytes {
            return Err(Error::InvalidKey);
        }
        z.push(unpack_z(&sig_bytes[offset..offset + z_poly_bytes], &params));
        offset += z_poly_bytes;
    }
    let h = unpack_hint(&sig_bytes[offset..], params.omega, params.k).ok_or(Error::VerifyFailed)?;

    for poly in &z {
        if infinity_norm_exceeds(poly, params.gamma1 - params.beta) {
            return Err(Error::VerifyFailed);
        }
    }
    if hint_weight(&h) > params.omega {
        return Err(Error::VerifyFailed);
    }

    let tr = hash32(pk_bytes);
    let mu = hash64(&[tr.as_slice(), message].concat());

    let a_hat = expand_a(&rho, params.k, params.l);
    let c = sample_in_ball(c_tilde, params.tau);
    let c_ring = to_ring(&c);

    let z_hat: Vec<[u32; N]> = z.iter().map(|p| ring.ntt(p)).collect();
    let mut az = Vec::with_capacity(params.k);
    for i in 0..params.k {
        let mut acc = [0u32; N];
        for j in 0..params.l {
            let prod = ring.multiply_ntts(&a_hat[i][j], &z_hat[j]);
            acc = ring.add(&acc, &prod);
        }
        az.push(ring.inv_ntt(&acc));
    }

    let mut w1p: Vec<Vec<i64>> = Vec::with_capacity(params.k);
    for i in 0..params.k {
        let ct1 = ring.multiply(&c_ring, &shift_t1(&t1[i]));
        let r = ring.sub(&az[i], &ct1);
        let poly: Vec<i64> = (0..N).map(|c| use_hint(h[i][c], r[c], params.gamma2)).collect();
        w1p.push(poly);
    }

    let c_tilde_prime = hash32(&[mu.as_slice(), w1_packed(&w1p, params.gamma2).as_slice()].concat());

    if ct_eq(c_tilde, &c_tilde_prime) {
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
    fn sign_then_verify_succeeds_for_every_parameter_set() {
        for ps in [ParameterSet::DilithiumS1, ParameterSet::DilithiumS2, ParameterSet::DilithiumS3] {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let (pk, sk) = generate(ps, &mut rng).unwrap();
            assert_eq!(pk.len(), ps.sizes().public_key_len);
            assert_eq!(sk.len(), ps.sizes().private_key_len);
            let message = b"dilithium test message";
            let sig = sign(ps, &sk, message, &mut rng).unwrap();
            assert_eq!(sig.len(), ps.sizes().signature_len);
            assert!(verify(ps, &pk, message, &sig).is_ok());
        }
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let ps = ParameterSet::DilithiumS1;
        let (pk, sk) = generate(ps, &mut rng).unwrap();
        let sig = sign(ps, &sk, b"original", &mut rng).unwrap();
        assert!(verify(ps, &pk, b"tampered", &sig).is_err());
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let ps = ParameterSet::DilithiumS1;
        let (pk, sk) = generate(ps, &mut rng).unwrap();
        let message = b"some message";
        let mut sig = sign(ps, &sk, message, &mut rng).unwrap();
        sig[0] ^= 1;
        assert!(verify(ps, &pk, message, &sig).is_err());
    }
}
