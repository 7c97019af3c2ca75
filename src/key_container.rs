//! Fixed, unversioned serialisation layout for an [`AsymmetricKey`] (§4.14).
//!
//! ```text
//! offset  size  field
//! 0       1     primitive tag
//! 1       1     class tag
//! 2       1     parameters tag
//! 3       4     polynomial length N (little-endian)
//! 7       N     polynomial bytes
//! ```
//!
//! No version byte: a future format change needs a new enum value, not a reuse of a name.

use crate::codec::{Class, ParameterSet, Primitive};
use crate::domain::{read_le_u32, write_le_u32};
use crate::error::{Error, Result};
use crate::types::AsymmetricKey;
use alloc::vec;
use alloc::vec::Vec;

const HEADER_LEN: usize = 7;

/// Serialise `key` into the fixed tagged-length-value layout above.
#[must_use]
pub fn serialize(key: &AsymmetricKey) -> Vec<u8> {
    let bytes = key.as_bytes();
    let mut out = vec![0u8; HEADER_LEN + bytes.len()];
    out[0] = key.primitive().tag();
    out[1] = key.class().tag();
    out[2] = key.parameters().tag();
    write_le_u32(&mut out, 3, bytes.len() as u32);
    out[HEADER_LEN..].copy_from_slice(bytes);
    out
}

/// Parse a byte stream produced by [`serialize`] back into an [`AsymmetricKey`].
///
/// # Errors
/// Returns [`Error::InvalidKey`] if the stream is shorter than the header, the declared length
/// does not match the remaining bytes, any tag byte is unrecognised, or the resulting length
/// disagrees with the parameter set's declared size.
pub fn deserialize(bytes: &[u8]) -> Result<AsymmetricKey> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::InvalidKey);
    }
    let primitive = Primitive::from_tag(bytes[0]).ok_or(Error::InvalidKey)?;
    let class = Class::from_tag(bytes[1]).ok_or(Error::InvalidKey)?;
    let parameters = ParameterSet::from_tag(bytes[2]).ok_or(Error::InvalidKey)?;
    let len = read_le_u32(bytes, 3) as usize;
    if bytes.len() != HEADER_LEN + len {
        return Err(Error::InvalidKey);
    }
    let polynomial = bytes[HEADER_LEN..].to_vec();
    AsymmetricKey::new(primitive, class, parameters, polynomial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn round_trips_a_public_key() {
        let len = ParameterSet::KyberK2.sizes().public_key_len;
        let key =
            AsymmetricKey::new(Primitive::Kyber, Class::Public, ParameterSet::KyberK2, vec![7u8; len])
                .unwrap();
        let bytes = serialize(&key);
        assert_eq!(bytes.len(), HEADER_LEN + len);
        let back = deserialize(&bytes).unwrap();
        assert_eq!(back.as_bytes(), key.as_bytes());
        assert_eq!(back.primitive(), key.primitive());
        assert_eq!(back.class(), key.class());
        assert_eq!(back.parameters(), key.parameters());
    }

    #[test]
    fn rejects_truncated_stream() {
        let bytes = vec![0u8; 3];
        assert!(deserialize(&bytes).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut bytes = vec![0u8; HEADER_LEN + 4];
        write_le_u32(&mut bytes, 3, 100);
        assert!(deserialize(&bytes).is_err());
    }
}
