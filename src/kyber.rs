//! Kyber: IND-CCA2 KEM via the Fujisaki-Okamoto transform over a CPA-secure PKE (§4.6).
//!
//! Parameter sets differ only in module rank `k`, the two noise widths `eta1`/`eta2`, and the
//! ciphertext compression widths `du`/`dv`; everything else is shared `RingQ`/`Sponge` plumbing.

use crate::codec::ParameterSet;
use crate::domain::ct_eq;
use crate::error::{Error, Result};
use crate::ring::RingQ;
use crate::sponge::{cshake, sha3_256, sha3_512, shake128, shake256};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};

const Q: u32 = 3329;
const ZETA: u32 = 17;
const N: usize = 256;

struct Params {
    k: usize,
    eta1: usize,
    eta2: usize,
    du: u32,
    dv: u32,
}

fn params_for(ps: ParameterSet) -> Params {
    match ps {
        ParameterSet::KyberK2 => Params { k: 2, eta1: 3, eta2: 2, du: 10, dv: 4 },
        ParameterSet::KyberK3 => Params { k: 3, eta1: 2, eta2: 2, du: 10, dv: 4 },
        ParameterSet::KyberK4 => Params { k: 4, eta1: 2, eta2: 2, du: 11, dv: 5 },
        _ => unreachable!("caller validated the primitive"),
    }
}

fn ring() -> RingQ {
    RingQ::new(Q, ZETA)
}

/// Encode a ring element's coefficients, `bits`-wide each, little-endian-packed.
fn encode_poly(coeffs: &[u32; N], bits: u32) -> Vec<u8> {
    let mut out = vec![0u8; N * bits as usize / 8];
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
    out
}

fn decode_poly(bytes: &[u8], bits: u32) -> [u32; N] {
    let mut out = [0u32; N];
    let mask = (1u32 << bits) - 1;
    let mut acc = 0u32;
    let mut acc_bits = 0u32;
    let mut pos = 0usize;
    for c in &mut out {
        while acc_bits < bits {
            acc |= u32::from(bytes[pos]) << acc_bits;
            pos += 1;
            acc_bits += 8;
        }
        *c = acc & mask;
        acc >>= bits;
        acc_bits -= bits;
    }
    out
}

fn compress(x: u32, d: u32) -> u32 {
    let num = (u64::from(x) << d) + u64::from(Q) / 2;
    ((num / u64::from(Q)) % (1u64 << d)) as u32
}

fn decompress(x: u32, d: u32) -> u32 {
    let num = u64::from(x) * u64::from(Q) + (1u64 << (d - 1));
    (num >> d) as u32
}

fn compress_vec(v: &[u32; N], d: u32) -> [u32; N] {
    core::array::from_fn(|i| compress(v[i], d))
}
fn decompress_vec(v: &[u32; N], d: u32) -> [u32; N] {
    core::array::from_fn(|i| decompress(v[i], d))
}

fn prf(seed: &[u8; 32], nonce: u8, out_len: usize) -> Vec<u8> {
    let mut xof = shake256(&[seed.as_slice(), &[nonce]].concat());
    let mut out = vec![0u8; out_len];
    xof.read(&mut out);
    out
}

fn gen_matrix(rho: &[u8; 32], k: usize, transpose: bool) -> Vec<Vec<[u32; N]>> {
    let r = ring();
    let mut a = vec![vec![[0u32; N]; k]; k];
    for i in 0..k {
        for j in 0..k {
            let (ii, jj) = if transpose { (j, i) } else { (i, j) };
            let mut xof = cshake(168, &[], &[], &[rho.as_slice(), &[ii as u8], &[jj as u8]].concat());
            a[i][j] = r.sample_uniform(&mut xof);
        }
    }
    a
}

struct CpaKeyPair {
    pk: Vec<u8>,
    sk: Vec<u8>,
}

fn cpa_keygen(params: &Params, rng: &mut (impl RngCore + CryptoRng)) -> CpaKeyPair {
    let r = ring();
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let g_out = sha3_512(&seed);
    let (rho, sigma): ([u8; 32], [u8; 32]) =
        (g_out[..32].try_into().unwrap(), g_out[32..].try_into().unwrap());

    let a_hat = gen_matrix(&rho, params.k, false);
    let mut nonce = 0u8;
    let mut s = Vec::with_capacity(params.k);
    let mut e = Vec::with_capacity(params.k);
    for _ in 0..params.k {
        s.push(r.sample_cbd(params.eta1, &prf(&sigma, nonce, 64 * params.eta1)));
        nonce += 1;
    }
    for _ in 0..params.k {
        e.push(r.sample_cbd(params.eta1, &prf(&sigma, nonce, 64 * params.eta1)));
        nonce += 1;
    }
    let s_hat: Vec<_> = s.iter().map(|p| r.ntt(p)).collect();
    let e_hat: Vec<_> = e.iter().map(|p| r.ntt(p)).collect();

    let mut t_hat = vec![[0u32; N]; params.k];
    for i in 0..params.k {
        for j in 0..params.k {
            let prod = r.multiply_ntts(&a_hat[i][j], &s_hat[j]);
            t_hat[i] = r.add(&t_hat[i], &prod);
        }
        t_hat[i] = r.add(&t_hat[i], &e_hat[i]);
    }

    let mut pk = Vec::with_capacity(params.k * 384 + 32);
    for t in &t_hat {
        pk.extend_from_slice(&encode_poly(t, 12));
    }
    pk.extend_from_slice(&rho);

    let mut sk = Vec::with_capacity(params.k * 384);
    for si in &s_hat {
        sk.extend_from_slice(&encode_poly(si, 12));
    }
    CpaKeyPair { pk, sk }
}

fn cpa_encrypt(params: &Params, pk: &[u8], m: &[u8; 32], coins: &[u8; 32]) -> Vec<u8> {
    let r = ring();
    let k = params.k;
    let mut t_hat = vec![[0u32; N]; k];
    for i in 0..k {
        t_hat[i] = decode_poly(&pk[i * 384..(i + 1) * 384], 12);
    }
    let rho: [u8; 32] = pk[k * 384..k * 384 + 32].try_into().unwrap();
    let a_hat_t = gen_matrix(&rho, k, true);

    let mut nonce = 0u8;
    let mut rvec = Vec::with_capacity(k);
    for _ in 0..k {
        rvec.push(r.sample_cbd(params.eta1, &prf(coins, nonce, 64 * params.eta1)));
        nonce += 1;
    }
    let mut e1 = Vec::with_capacity(k);
    for _ in 0..k {
        e1.push(r.sample_cbd(params.eta2, &prf(coins, nonce, 64 * params.eta2)));
        nonce += 1;
    }
    let e2 = r.sample_cbd(params.eta2, &prf(coins, nonce, 64 * params.eta2));

    let r_hat: Vec<_> = rvec.iter().map(|p| r.ntt(p)).collect();
    let mut u = vec![[0u32; N]; k];
    for i in 0..k {
        let mut acc = [0u32; N];
        for j in 0..k {
            let prod = r.multiply_ntts(&a_hat_t[i][j], &r_hat[j]);
            acc = r.add(&acc, &prod);
        }
        u[i] = r.add(&r.inv_ntt(&acc), &e1[i]);
    }

    let mut tr_dot = [0u32; N];
    for j in 0..k {
        let prod = r.multiply_ntts(&t_hat[j], &r_hat[j]);
        tr_dot = r.add(&tr_dot, &prod);
    }
    let tr_dot = r.inv_ntt(&tr_dot);

    // decompress_1(m): message bit i -> 0 or round(q/2).
    let mut msg_poly = [0u32; N];
    for i in 0..N {
        let bit = (m[i / 8] >> (i % 8)) & 1;
        msg_poly[i] = decompress(u32::from(bit), 1);
    }
    let v = r.add(&r.add(&tr_dot, &e2), &msg_poly);

    let mut out = Vec::with_capacity(k * params.du as usize * 32 + params.dv as usize * 32);
    for ui in &u {
        out.extend_from_slice(&encode_poly(&compress_vec(ui, params.du), params.du));
    }
    out.extend_from_slice(&encode_poly(&compress_vec(&v, params.dv), params.dv));
    out
}

fn cpa_decrypt(params: &Params, sk: &[u8], ct: &[u8]) -> [u8; 32] {
    let r = ring();
    let k = params.k;
    let u_bytes_len = params.du as usize * 32;
    let mut u = vec![[0u32; N]; k];
    for i in 0..k {
        let chunk = &ct[i * u_bytes_len..(i + 1) * u_bytes_len];
        u[i] = decompress_vec(&decode_poly(chunk, params.du), params.du);
    }
    let v_bytes = &ct[k * u_bytes_len..];
    let v = decompress_vec(&decode_poly(v_bytes, params.dv), params.dv);

    let mut s_hat = vec![[0u32; N]; k];
    for i in 0..k {
        s_hat[i] = decode_poly(&sk[i * 384..(i + 1) * 384], 12);
    }
    let u_hat: Vec<_> = u.iter().map(|p| r.ntt(p)).collect();
    let mut s_dot = [0u32; N];
    for j in 0..k {
        let prod = r.multiply_ntts(&s_hat[j], &u_hat[j]);
        s_dot = r.add(&s_dot, &prod);
    }
    let s_dot = r.inv_ntt(&s_dot);
    let m_poly = r.sub(&v, &s_dot);

    let mut m = [0u8; 32];
    for i in 0..N {
        let bit = u32::from(compress(m_poly[i], 1) == 1);
        m[i / 8] |= (bit as u8) << (i % 8);
    }
    m
}

/// `KEM.Gen`. `sk_KEM = sk_CPA || pk_CPA || H(pk_CPA) || z`.
pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> (Vec<u8>, Vec<u8>) {
    let params = params_for(ps);
    let CpaKeyPair { pk, sk: sk_cpa } = cpa_keygen(&params, rng);
    let h_pk = sha3_256(&pk);
    let mut z = [0u8; 32];
    rng.fill_bytes(&mut z);

    let mut sk = sk_cpa;
    sk.extend_from_slice(&pk);
    sk.extend_from_slice(&h_pk);
    sk.extend_from_slice(&z);
    (pk, sk)
}

/// `KEM.Enc(pk)`.
///
/// # Errors
/// Returns [`Error::InvalidKey`] if `pk.len()` does not match the parameter set.
pub fn encapsulate(
    ps: ParameterSet, pk: &[u8], rng: &mut (impl RngCore + CryptoRng),
) -> Result<(Vec<u8>, Vec<u8>)> {
    let params = params_for(ps);
    if pk.len() != ps.sizes().public_key_len {
        return Err(Error::InvalidKey);
    }
    let mut m = [0u8; 32];
    rng.fill_bytes(&mut m);
    let h_pk = sha3_256(pk);
    let g_out = sha3_512(&[m.as_slice(), &h_pk].concat());
    let (k_bar, coins): ([u8; 32], [u8; 32]) =
        (g_out[..32].try_into().unwrap(), g_out[32..].try_into().unwrap());
    let ct = cpa_encrypt(&params, pk, &m, &coins);
    let h_ct = sha3_256(&ct);
    let mut xof = shake256(&[k_bar.as_slice(), &h_ct].concat());
    let mut ss = vec![0u8; 32];
    xof.read(&mut ss);
    Ok((ct, ss))
}

/// `KEM.Dec(sk_KEM, c)`, with implicit rejection on re-encryption mismatch (§4.16).
///
/// # Errors
/// Returns [`Error::InvalidKey`] or [`Error::InvalidCiphertext`] on a length mismatch.
pub fn decapsulate(ps: ParameterSet, sk: &[u8], ct: &[u8]) -> Result<Vec<u8>> {
    let params = params_for(ps);
    let sizes = ps.sizes();
    if sk.len() != sizes.private_key_len {
        return Err(Error::InvalidKey);
    }
    if ct.len() != sizes.ciphertext_len {
        return Err(Error::InvalidCiphertext);
    }
    let sk_cpa_len = params.k * 384;
    let sk_cpa = &sk[..sk_cpa_len];
    let pk = &sk[sk_cpa_len..sk_cpa_len + sizes.public_key_len];
    let h_pk = &sk[sk_cpa_len + sizes.public_key_len..sk_cpa_len + sizes.public_key_len + 32];
    let z = &sk[sk_cpa_len + sizes.public_key_len + 32..];

    let m_prime = cpa_decrypt(&params, sk_cpa, ct);
    let g_out = sha3_512(&[m_prime.as_slice(), h_pk].concat());
    let (k_bar_prime, coins_prime): ([u8; 32], [u8; 32]) =
        (g_out[..32].try_into().unwrap(), g_out[32..].try_into().unwrap());
    let ct_prime = cpa_encrypt(&params, pk, &m_prime, &coins_prime);
    let h_ct = sha3_256(ct);

    let matches = ct.len() == ct_prime.len() && ct_eq(ct, &ct_prime);
    let key_material: [u8; 32] = if matches {
        k_bar_prime
    } else {
        let mut z_arr = [0u8; 32];
        z_arr.copy_from_slice(z);
        z_arr
    };
    let mut xof = shake256(&[key_material.as_slice(), &h_ct].concat());
    let mut ss = vec![0u8; 32];
    xof.read(&mut ss);
    Ok(ss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn encapsulation_correctness_all_parameter_sets() {
        for ps in [ParameterSet::KyberK2, ParameterSet::KyberK3, ParameterSet::KyberK4] {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let (pk, sk) = generate(ps, &mut rng);
            let (ct, ss1) = encapsulate(ps, &pk, &mut rng).unwrap();
            let ss2 = decapsulate(ps, &sk, &ct).unwrap();
            assert_eq!(ss1, ss2);
        }
    }

    #[test]
    fn tampered_ciphertext_does_not_error_but_changes_secret() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ps = ParameterSet::KyberK3;
        let (pk, sk) = generate(ps, &mut rng);
        let (mut ct, ss1) = encapsulate(ps, &pk, &mut rng).unwrap();
        ct[0] ^= 1;
        let ss2 = decapsulate(ps, &sk, &ct).unwrap();
        assert_ne!(ss1, ss2);
    }
}
