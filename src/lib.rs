#![no_std]
#![deny(clippy::pedantic, warnings, missing_docs, unsafe_code)]
#![deny(absolute_paths_not_starting_with_crate, box_pointers, dead_code)]
#![deny(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![deny(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![deny(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![deny(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![deny(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![deny(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![deny(unused_qualifications, unused_results, variant_size_differences)]
//
//! Post-quantum asymmetric primitives over a shared Keccak sponge and ring-arithmetic core.
//!
//! Five NIST-PQC finalists/alternates share the plumbing in this crate rather than each
//! reimplementing it:
//!
//! - [`kem`]: the `Kem` façade over three KEMs - Kyber (`kyber`), NTRU Prime Streamlined
//!   (`ntru_prime`), Classic McEliece (`mceliece`).
//! - [`signer`]: the `Signer` façade over two signature schemes - SPHINCS+-SHAKE (`sphincs`),
//!   Dilithium (`dilithium`).
//! - [`ring`]: shared `Z_q[x]/(x^n+1)` arithmetic (NTT, rejection sampling, centered binomial
//!   and bounded sampling) reused by Kyber and Dilithium.
//! - [`sponge`]: the Keccak-f[1600] sponge underlying every SHA3/SHAKE/cSHAKE instance in the
//!   crate.
//! - [`gf213`]/[`goppa`]/[`benes`]: GF(2^13) field arithmetic, binary Goppa codes and the
//!   Beneš-network permutation encoding that Classic McEliece is built from.
//! - [`key_container`]: the wire format tagging every key with its primitive, parameter set and
//!   class.
//! - [`secure_key`]: at-rest sealing of private key material.
//!
//! Each scheme module exposes free functions (`generate`/`encapsulate`/`decapsulate` or
//! `generate`/`sign`/`verify`) operating on raw byte slices; [`kem::Kem`] and [`signer::Signer`]
//! are the validated, enum-dispatched entry points most callers should use instead.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod codec;
pub mod domain;
pub mod error;
pub mod key_container;
pub mod ring;
pub mod secure_key;
pub mod sponge;
pub mod types;

#[cfg(feature = "mceliece")]
pub mod benes;
#[cfg(feature = "dilithium")]
pub mod dilithium;
#[cfg(feature = "mceliece")]
pub mod gf213;
#[cfg(feature = "mceliece")]
pub mod goppa;
#[cfg(feature = "kyber")]
pub mod kyber;
#[cfg(feature = "mceliece")]
pub mod mceliece;
#[cfg(feature = "ntru-prime")]
pub mod ntru_prime;
#[cfg(any(feature = "ntru-prime", feature = "mceliece"))]
pub mod prng;
#[cfg(feature = "sphincs")]
pub mod sphincs;

#[cfg(any(feature = "kyber", feature = "ntru-prime", feature = "mceliece"))]
pub mod kem;
#[cfg(any(feature = "sphincs", feature = "dilithium"))]
pub mod signer;
