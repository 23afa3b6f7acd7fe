//! Structural fingerprints used to speed up element comparison in array diffs.

use crate::Value;

/// 64-bit fingerprint of a [`Value`].
pub(crate) type HashCode = [u8; 8];

const NULL_HASH: HashCode = [0xFE, 0x73, 0xAB, 0xCC, 0xE6, 0x32, 0xE0, 0x88];
const BOOL_TRUE_HASH: HashCode = [0x24, 0x6B, 0xE3, 0xE4, 0xAF, 0x59, 0xDC, 0x1C];
const BOOL_FALSE_HASH: HashCode = [0xC6, 0x38, 0x77, 0xD1, 0x0A, 0x7E, 0x1F, 0xBF];
const STRING_SEED: [u8; 1] = [0x73];
const ARRAY_SEED: [u8; 8] = [0xF5, 0x18, 0x0A, 0x71, 0xA4, 0xC4, 0x03, 0xF3];
const OBJECT_SEED: [u8; 8] = [0x00, 0x5D, 0x39, 0xA4, 0x18, 0x10, 0xEA, 0xD5];

/// Compute the FNV-1a hash of the provided bytes.
pub(crate) fn hash_bytes(input: &[u8]) -> HashCode {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for byte in input {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash.to_le_bytes()
}

/// Combine hash codes independently of their order.
pub(crate) fn combine(mut codes: Vec<HashCode>) -> HashCode {
    codes.sort_unstable();
    let mut bytes = Vec::with_capacity(OBJECT_SEED.len() + codes.len() * 8);
    bytes.extend_from_slice(&OBJECT_SEED);
    for code in codes {
        bytes.extend_from_slice(&code);
    }
    hash_bytes(&bytes)
}

/// Fingerprint that agrees with `Value` equality: equal values hash alike.
pub(crate) fn fingerprint(value: &Value) -> HashCode {
    match value {
        Value::Null => NULL_HASH,
        Value::Bool(true) => BOOL_TRUE_HASH,
        Value::Bool(false) => BOOL_FALSE_HASH,
        Value::Number(n) => n.fingerprint(),
        Value::String(s) => {
            let mut bytes = Vec::with_capacity(STRING_SEED.len() + s.len());
            bytes.extend_from_slice(&STRING_SEED);
            bytes.extend_from_slice(s.as_bytes());
            hash_bytes(&bytes)
        }
        Value::Array(items) => {
            let mut bytes = Vec::with_capacity(ARRAY_SEED.len() + items.len() * 8);
            bytes.extend_from_slice(&ARRAY_SEED);
            for item in items {
                bytes.extend_from_slice(&fingerprint(item));
            }
            hash_bytes(&bytes)
        }
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(key, value)| {
                    let mut bytes = Vec::with_capacity(16);
                    bytes.extend_from_slice(&hash_bytes(key.as_bytes()));
                    bytes.extend_from_slice(&fingerprint(value));
                    hash_bytes(&bytes)
                })
                .collect();
            combine(entries)
        }
    }
}
