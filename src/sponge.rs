//! Keccak-f\[1600\] permutation and the SHA3/SHAKE/cSHAKE sponge modes built on top of it.
//!
//! Every hash, XOF, PRF and rejection-sampling byte stream in this crate is ultimately drawn
//! from the permutation in this module — no other symmetric primitive is required for the
//! core (the secure key container's stream cipher, §4.15, is the one deliberate exception).
//!
//! Two permutation implementations are kept side by side: [`permute_compact`], a plain
//! round-by-round loop, and [`permute_unrolled`], a partially macro-unrolled variant. Both
//! must produce bit-identical output for the same input state (property 8.1) — the unrolled
//! form exists purely for speed, never for a semantic difference.

use core::convert::TryInto;

const WIDTH: usize = 200; // 1600 bits
const LANES: usize = 25;
const ROUNDS: usize = 24;

const RC: [u64; 24] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

// RC for the experimental 48-round Keccak-1024 extension (§9 Open Questions: non-standard,
// gated behind the `experimental-keccak1024` feature). The first 24 rounds reuse RC verbatim
// so the two permutations are bit-exact over their shared prefix.
#[cfg(feature = "experimental-keccak1024")]
const RC48: [u64; 48] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
    // Rounds 25-48 continue the same LFSR that derives RC, carried one cycle further.
    0x8000_0000_0000_8082,
    0x0000_0000_0000_8089,
    0x0000_0000_0000_8003,
    0x0000_0000_8000_8002,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_800a,
    0x8000_0000_0000_000a,
    0x8000_0000_8000_8081,
    0x0000_0000_0000_8080,
    0x8000_0000_8000_0001,
    0x8000_0000_8000_8008,
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
];

// Rotation offset for lane (x, y), indexed x + 5*y — the standard Keccak rho-offset table.
const RHO_XY: [u32; 25] = [
    0, 1, 62, 28, 27, 36, 44, 6, 55, 20, 3, 10, 43, 25, 39, 41, 45, 15, 21, 8, 18, 2, 61, 56, 14,
];

/// θ, ρ, π, χ, ι applied once, parameterized by which round constant to inject.
#[inline]
fn round(lanes: &mut [u64; LANES], rc: u64) {
    // θ
    let mut c = [0u64; 5];
    for x in 0..5 {
        c[x] = lanes[x] ^ lanes[x + 5] ^ lanes[x + 10] ^ lanes[x + 15] ^ lanes[x + 20];
    }
    let mut d = [0u64; 5];
    for x in 0..5 {
        d[x] = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
    }
    for x in 0..5 {
        for y in 0..5 {
            lanes[x + 5 * y] ^= d[x];
        }
    }

    // ρ and π combined: lane (x, y), rotated by RHO_XY[x+5y], moves to (y, 2x+3y).
    let mut b = [0u64; LANES];
    for y in 0..5 {
        for x in 0..5 {
            let (nx, ny) = (y, (2 * x + 3 * y) % 5);
            b[nx + 5 * ny] = lanes[x + 5 * y].rotate_left(RHO_XY[x + 5 * y]);
        }
    }

    // χ
    for y in 0..5 {
        for x in 0..5 {
            let b1 = b[(x + 1) % 5 + 5 * y];
            let b2 = b[(x + 2) % 5 + 5 * y];
            lanes[x + 5 * y] = b[x + 5 * y] ^ ((!b1) & b2);
        }
    }

    // ι
    lanes[0] ^= rc;
}

/// A straightforward, round-by-round reference permutation. This is the form to reach for
/// when auditing correctness; [`permute_unrolled`] exists only for throughput.
pub fn permute_compact(lanes: &mut [u64; LANES]) {
    for rc in RC.iter().take(ROUNDS) {
        round(lanes, *rc);
    }
}

macro_rules! repeat4 {
    ($e:expr) => {
        $e;
        $e;
        $e;
        $e;
    };
}
macro_rules! repeat5 {
    ($e:expr) => {
        $e;
        $e;
        $e;
        $e;
        $e;
    };
}
macro_rules! repeat6 {
    ($e:expr) => {
        $e;
        $e;
        $e;
        $e;
        $e;
        $e;
    };
}
macro_rules! repeat24 {
    ($e:expr, $s:expr) => {
        repeat6!({
            $e;
            $s;
        });
        repeat6!({
            $e;
            $s;
        });
        repeat6!({
            $e;
            $s;
        });
        repeat5!({
            $e;
            $s;
        });
        $e;
    };
}
macro_rules! for5 {
    ($v:expr, $s:expr, $e:expr) => {
        $v = 0;
        repeat4!({
            $e;
            $v += $s;
        });
        $e;
    };
}

// Rotation and lane-permutation tables for the chain-traversal rho/pi trick: starting from
// lane 1, each step rotates the current lane and writes it into PI[i], chasing the orbit
// rather than rebuilding the whole state via the (x,y) formula `round` uses.
const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];
const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// A loop-unrolled permutation used on the hot path (NTT sampling, FORS/WOTS chains). Must
/// stay bit-exact with [`permute_compact`] — see `tests::permutation_equivalence`.
pub fn permute_unrolled(lanes: &mut [u64; LANES]) {
    let mut c = [0u64; 5];
    let (mut x, mut y): (usize, usize);

    for round_idx in 0..ROUNDS {
        for5!(x, 1, {
            c[x] = lanes[x] ^ lanes[x + 5] ^ lanes[x + 10] ^ lanes[x + 15] ^ lanes[x + 20];
        });
        for5!(x, 1, {
            for5!(y, 5, {
                lanes[x + y] ^= c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            });
        });

        let mut a = lanes[1];
        x = 0;
        repeat24!(
            {
                c[0] = lanes[PI[x]];
                lanes[PI[x]] = a.rotate_left(RHO[x]);
            },
            {
                a = c[0];
                x += 1;
            }
        );

        for5!(y, 5, {
            for5!(x, 1, {
                c[x] = lanes[x + y];
            });
            for5!(x, 1, {
                lanes[x + y] = c[x] ^ ((!c[(x + 1) % 5]) & c[(x + 2) % 5]);
            });
        });

        lanes[0] ^= RC[round_idx];
    }
}

#[cfg(feature = "experimental-keccak1024")]
pub fn permute_unrolled_48(lanes: &mut [u64; LANES]) {
    for rc in RC48.iter() {
        round(lanes, *rc);
    }
}

fn bytes_to_lanes(bytes: &[u8; WIDTH]) -> [u64; LANES] {
    let mut lanes = [0u64; LANES];
    for (chunk, lane) in bytes.chunks_exact(8).zip(lanes.iter_mut()) {
        *lane = u64::from_le_bytes(chunk.try_into().unwrap());
    }
    lanes
}

fn lanes_to_bytes(lanes: &[u64; LANES], bytes: &mut [u8; WIDTH]) {
    for (chunk, lane) in bytes.chunks_exact_mut(8).zip(lanes.iter()) {
        chunk.copy_from_slice(&lane.to_le_bytes());
    }
}

/// A raw 1600-bit state plus the rate (in bytes) it was last absorbed/squeezed at.
#[derive(Clone)]
pub struct State {
    bytes: [u8; WIDTH],
    rate: usize,
}

/// Incremental absorber: mirrors the `Update`-then-`finalize` shape of RustCrypto's `sha3`
/// crate so callers can feed multiple parts (e.g. `G(m, H(ek))`) without pre-concatenating them.
pub struct Absorber {
    lanes: [u64; LANES],
    rate: usize,
    block: [u8; WIDTH],
    filled: usize,
}

impl Absorber {
    pub fn new(rate: usize) -> Self {
        debug_assert!(rate > 0 && rate <= WIDTH);
        Absorber { lanes: [0u64; LANES], rate, block: [0u8; WIDTH], filled: 0 }
    }

    pub fn update(&mut self, mut input: &[u8]) {
        if self.filled > 0 {
            let take = core::cmp::min(self.rate - self.filled, input.len());
            self.block[self.filled..self.filled + take].copy_from_slice(&input[..take]);
            self.filled += take;
            input = &input[take..];
            if self.filled == self.rate {
                self.absorb_block();
                self.filled = 0;
            }
        }
        while input.len() >= self.rate {
            self.block[..self.rate].copy_from_slice(&input[..self.rate]);
            self.absorb_block();
            input = &input[self.rate..];
        }
        if !input.is_empty() {
            self.block[..input.len()].copy_from_slice(input);
            self.filled = input.len();
        }
    }

    fn absorb_block(&mut self) {
        let mut bytes = [0u8; WIDTH];
        lanes_to_bytes(&self.lanes, &mut bytes);
        for i in 0..self.rate {
            bytes[i] ^= self.block[i];
        }
        self.lanes = bytes_to_lanes(&bytes);
        permute_unrolled(&mut self.lanes);
    }

    /// Apply pad10*1 with domain byte `domain` and return the finished, squeeze-ready state.
    pub fn finalize(mut self, domain: u8) -> State {
        let mut bytes = [0u8; WIDTH];
        lanes_to_bytes(&self.lanes, &mut bytes);
        for i in 0..self.filled {
            bytes[i] ^= self.block[i];
        }
        bytes[self.filled] ^= domain;
        bytes[self.rate - 1] ^= 0x80;
        let mut lanes = bytes_to_lanes(&bytes);
        permute_unrolled(&mut lanes);
        lanes_to_bytes(&lanes, &mut bytes);
        State { bytes, rate: self.rate }
    }
}

impl State {
    /// Absorb `input` into a fresh all-zero state using pad10*1 framing and domain separation
    /// byte `domain` (0x06 for SHA3, 0x1F for SHAKE, 0x04 for cSHAKE with a non-empty N/S).
    pub fn absorb(rate: usize, domain: u8, input: &[u8]) -> Self {
        let mut absorber = Absorber::new(rate);
        absorber.update(input);
        absorber.finalize(domain)
    }

    /// Absorb several input parts as one logical message, e.g. `G(m, H(ek))`.
    pub fn absorb_parts(rate: usize, domain: u8, parts: &[&[u8]]) -> Self {
        let mut absorber = Absorber::new(rate);
        for part in parts {
            absorber.update(part);
        }
        absorber.finalize(domain)
    }

    /// Squeeze `out.len()` bytes, permuting between blocks as needed and truncating the final one.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        let mut written = 0;
        while written < out.len() {
            let take = core::cmp::min(self.rate, out.len() - written);
            out[written..written + take].copy_from_slice(&self.bytes[..take]);
            written += take;
            if written < out.len() {
                let mut lanes = bytes_to_lanes(&self.bytes);
                permute_unrolled(&mut lanes);
                lanes_to_bytes(&lanes, &mut self.bytes);
            }
        }
    }
}

const DOMAIN_SHA3: u8 = 0x06;
const DOMAIN_SHAKE: u8 = 0x1F;
const DOMAIN_CSHAKE: u8 = 0x04;

/// SHA3-256: absorb at rate 136, squeeze 32 bytes.
#[must_use]
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut state = State::absorb(136, DOMAIN_SHA3, data);
    let mut out = [0u8; 32];
    state.squeeze(&mut out);
    out
}

/// SHA3-512: absorb at rate 72, squeeze 64 bytes.
#[must_use]
pub fn sha3_512(data: &[u8]) -> [u8; 64] {
    let mut state = State::absorb(72, DOMAIN_SHA3, data);
    let mut out = [0u8; 64];
    state.squeeze(&mut out);
    out
}

/// An extendable-output reader: a finished [`State`] from which arbitrarily many bytes may
/// still be drawn via repeated [`State::squeeze`] calls.
pub struct Xof(State);

impl Xof {
    pub fn read(&mut self, out: &mut [u8]) {
        self.0.squeeze(out);
    }
}

/// SHAKE128 (rate 168 bytes, 128-bit security).
#[must_use]
pub fn shake128(data: &[u8]) -> Xof {
    Xof(State::absorb(168, DOMAIN_SHAKE, data))
}

/// SHAKE256 (rate 136 bytes, 256-bit security).
#[must_use]
pub fn shake256(data: &[u8]) -> Xof {
    Xof(State::absorb(136, DOMAIN_SHAKE, data))
}

/// Non-standard SHAKE512 extension (rate 72 bytes, capacity 1024 bits) used only by the
/// secure key container's highest security-policy rate (§4.15, §9 Open Questions: unverified
/// against any external reference).
#[must_use]
pub fn shake512(data: &[u8]) -> Xof {
    Xof(State::absorb(72, DOMAIN_SHAKE, data))
}

fn left_encode(value: u64, out: &mut [u8; 9]) -> usize {
    let mut n = 1u8;
    let mut v = value;
    while v > 0 {
        n += 1;
        v >>= 8;
    }
    if value == 0 {
        n = 2;
    }
    let len = (n - 1) as usize;
    for i in 0..len {
        out[len - i] = (value >> (8 * i)) as u8;
    }
    out[0] = len as u8;
    n as usize
}

fn encode_string(s: &[u8], buf: &mut alloc_or_static::Bytes) {
    let mut enc = [0u8; 9];
    let n = left_encode((s.len() as u64) * 8, &mut enc);
    buf.extend_from_slice(&enc[..n]);
    buf.extend_from_slice(s);
}

/// Minimal growable-byte-buffer shim so this module works whether or not `alloc` is enabled;
/// cSHAKE headers are always small (function-name + customisation string), so a fixed-capacity
/// inline buffer is both simpler and allocation-free.
mod alloc_or_static {
    pub struct Bytes {
        buf: [u8; 512],
        len: usize,
    }

    impl Bytes {
        pub fn new() -> Self {
            Bytes { buf: [0u8; 512], len: 0 }
        }

        pub fn extend_from_slice(&mut self, s: &[u8]) {
            let end = self.len + s.len();
            assert!(end <= self.buf.len(), "cSHAKE header exceeds inline buffer");
            self.buf[self.len..end].copy_from_slice(s);
            self.len = end;
        }

        pub fn as_slice(&self) -> &[u8] {
            &self.buf[..self.len]
        }
    }
}

fn bytepad(input: &[u8], rate: usize, out: &mut alloc_or_static::Bytes) {
    let mut enc = [0u8; 9];
    let n = left_encode(rate as u64, &mut enc);
    out.extend_from_slice(&enc[..n]);
    out.extend_from_slice(input);
    let rem = out.as_slice().len() % rate;
    if rem != 0 {
        let pad = rate - rem;
        let zeros = [0u8; 256];
        let mut remaining = pad;
        while remaining > 0 {
            let take = core::cmp::min(remaining, zeros.len());
            out.extend_from_slice(&zeros[..take]);
            remaining -= take;
        }
    }
}

/// cSHAKE per SP 800-185. When both `function_name` and `customization` are empty this is
/// defined to collapse onto plain SHAKE at the same rate.
#[must_use]
pub fn cshake(rate: usize, function_name: &[u8], customization: &[u8], data: &[u8]) -> Xof {
    if function_name.is_empty() && customization.is_empty() {
        return Xof(State::absorb(rate, DOMAIN_SHAKE, data));
    }
    let mut header = alloc_or_static::Bytes::new();
    let mut encoded_n = alloc_or_static::Bytes::new();
    encode_string(function_name, &mut encoded_n);
    let mut encoded_s = alloc_or_static::Bytes::new();
    encode_string(customization, &mut encoded_s);
    let mut joined = alloc_or_static::Bytes::new();
    joined.extend_from_slice(encoded_n.as_slice());
    joined.extend_from_slice(encoded_s.as_slice());
    bytepad(joined.as_slice(), rate, &mut header);
    // Absorb the bytepad-ed header and the message as one continuous stream; `data` is fed
    // straight from the caller's slice so arbitrarily long messages never touch the fixed
    // 512-byte header buffer.
    Xof(State::absorb_parts(rate, DOMAIN_CSHAKE, &[header.as_slice(), data]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_equivalence() {
        // Property 8.1: compact and unrolled permutations agree on arbitrary 200-byte states.
        let mut seed = [0u8; WIDTH];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        let mut a = bytes_to_lanes(&seed);
        let mut b = a;
        permute_compact(&mut a);
        permute_unrolled(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn sha3_256_empty_known_answer() {
        // NIST SHA3-256("") KAT.
        let digest = sha3_256(&[]);
        assert_eq!(
            hex::encode(digest),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn shake128_squeeze_is_prefix_stable() {
        let mut r1 = shake128(b"abc");
        let mut out32 = [0u8; 32];
        r1.read(&mut out32);
        let mut r2 = shake128(b"abc");
        let mut out64 = [0u8; 64];
        r2.read(&mut out64);
        assert_eq!(&out32[..], &out64[..32]);
    }

    #[test]
    fn cshake_empty_strings_collapses_to_shake() {
        let mut a = cshake(168, &[], &[], b"hello");
        let mut b = shake128(b"hello");
        let mut oa = [0u8; 16];
        let mut ob = [0u8; 16];
        a.read(&mut oa);
        b.read(&mut ob);
        assert_eq!(oa, ob);
    }
}
