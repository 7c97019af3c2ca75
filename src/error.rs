//! The error taxonomy shared by every façade in the crate (see the failure semantics table).
//!
//! Only [`Error::VerifyFailed`] is ever returned for a signature mismatch — no sub-reason is
//! ever surfaced, and ciphertext-decryption failure is never reported at all: that case is
//! absorbed internally by implicit rejection (§4.16).

use core::fmt;

/// Kinds of failure that can cross a façade boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The parameter-set tag was `None`, or disagreed with another argument to the call.
    InvalidParameter,
    /// A key's declared `(primitive, class, parameters)` disagreed with the requested operation,
    /// or its byte length did not match the parameter set's declared size.
    InvalidKey,
    /// A ciphertext's length did not match the parameter set's declared size. Never raised for
    /// "decryption failed" — see implicit rejection.
    InvalidCiphertext,
    /// A signature did not authenticate. The only observable outcome of a signature mismatch.
    VerifyFailed,
    /// The OS entropy source returned fewer bytes than requested. Fatal; callers should not retry.
    EntropyUnavailable,
    /// A bounded-retry operation (e.g. McEliece key generation) exhausted its retry budget.
    /// Treated as catastrophic: propagate, never mask.
    InternalInvariant,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidParameter => "invalid or inconsistent parameter set",
            Error::InvalidKey => "key bytes do not match the declared primitive/class/parameters",
            Error::InvalidCiphertext => "ciphertext length does not match the parameter set",
            Error::VerifyFailed => "signature did not authenticate",
            Error::EntropyUnavailable => "OS entropy source exhausted",
            Error::InternalInvariant => "bounded retry loop exhausted its retry budget",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// If the condition is not met, return the given error. Keeps rejection/validation code
/// free of nested `if`.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure;
