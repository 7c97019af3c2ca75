//! Binary Goppa code decoding for Classic McEliece: syndrome computation, Berlekamp-Massey
//! error-locator recovery, and Chien search, all over [`crate::gf213`].
//!
//! Decode failure is an ordinary `None`, never a panic (§4.16) — the FO-style transform in
//! `mceliece.rs` treats it as the trigger for implicit rejection.

use crate::gf213::Elem;
use alloc::vec;
use alloc::vec::Vec;

/// `t`: the number of errors the code corrects, and the Goppa polynomial's degree.
pub struct GoppaCode {
    pub t: usize,
    /// Goppa polynomial coefficients, degree `t`, monic (`g[t] == 1`).
    pub g: Vec<Elem>,
    /// Support list, length `n`.
    pub support: Vec<Elem>,
}

impl GoppaCode {
    #[must_use]
    pub fn new(g: Vec<Elem>, support: Vec<Elem>) -> Self {
        let t = g.len() - 1;
        GoppaCode { t, g, support }
    }

    fn eval_g(&self, x: Elem) -> Elem {
        let mut acc = Elem::zero();
        for &coeff in self.g.iter().rev() {
            acc = acc.mul(x).add(coeff);
        }
        acc
    }

    /// Compute the 2t-coefficient syndrome of received word `r` (one bit per support element).
    fn syndrome(&self, r: &[u8]) -> Vec<Elem> {
        let two_t = 2 * self.t;
        let mut s = vec![Elem::zero(); two_t];
        for (i, &x) in self.support.iter().enumerate() {
            if r[i] == 0 {
                continue;
            }
            let g_x = self.eval_g(x);
            let inv = g_x.inv();
            let denom = inv.mul(inv); // 1 / g(x)^2
            let mut power = denom;
            for s_j in &mut s {
                *s_j = s_j.add(power);
                power = power.mul(x);
            }
        }
        s
    }

    /// Berlekamp-Massey: recover the error-locator polynomial of degree <= t from the syndrome.
    fn berlekamp_massey(&self, s: &[Elem]) -> Vec<Elem> {
        let two_t = s.len();
        let mut c = vec![Elem::zero(); two_t + 1];
        let mut b = vec![Elem::zero(); two_t + 1];
        c[0] = Elem::new(1);
        b[0] = Elem::new(1);
        let mut l = 0usize;
        let mut m = 1usize;
        let mut bb = Elem::new(1);

        for n in 0..two_t {
            let mut delta = s[n];
            for i in 1..=l {
                delta = delta.add(c[i].mul(s[n - i]));
            }
            if delta.is_zero() {
                m += 1;
            } else if 2 * l <= n {
                let t_poly = c.clone();
                let coef = delta.mul(bb.inv());
                for i in 0..two_t + 1 {
                    let shifted = if i >= m { b[i - m] } else { Elem::zero() };
                    c[i] = c[i].add(coef.mul(shifted));
                }
                l = n + 1 - l;
                b = t_poly;
                bb = delta;
                m = 1;
            } else {
                let coef = delta.mul(bb.inv());
                for i in 0..two_t + 1 {
                    let shifted = if i >= m { b[i - m] } else { Elem::zero() };
                    c[i] = c[i].add(coef.mul(shifted));
                }
                m += 1;
            }
        }
        c.truncate(l + 1);
        c
    }

    /// Chien search: evaluate the locator at every support element; zeros mark error positions.
    /// Returns `None` if the recovered weight does not match `t` or the syndrome disagrees.
    #[must_use]
    pub fn decode(&self, r: &[u8]) -> Option<Vec<u8>> {
        let s = self.syndrome(r);
        let sigma = self.berlekamp_massey(&s);

        let mut e = vec![0u8; self.support.len()];
        let mut weight = 0usize;
        for (i, &x) in self.support.iter().enumerate() {
            let mut acc = Elem::zero();
            for &coeff in sigma.iter().rev() {
                acc = acc.mul(x).add(coeff);
            }
            if acc.is_zero() {
                e[i] = 1;
                weight += 1;
            }
        }

        if weight != self.t {
            return None;
        }
        let recomputed = self.syndrome(&e);
        if recomputed != s {
            return None;
        }
        Some(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gf213::Elem;

    #[test]
    fn decode_recovers_single_weight_one_error() {
        // Degenerate instance: support of size 8, t=1, arbitrary nonzero g.
        let support: Vec<Elem> = (0..8u16).map(Elem::new).collect();
        let g = vec![Elem::new(1), Elem::new(1)];
        let code = GoppaCode::new(g, support);
        let mut e = vec![0u8; 8];
        e[3] = 1;
        let recovered = code.decode(&e).expect("decode should recover the weight-1 error");
        assert_eq!(recovered, e);
    }
}
