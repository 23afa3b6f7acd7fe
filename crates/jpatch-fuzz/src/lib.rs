//! Fuzzing harnesses for `jpatch-core`.
//!
//! Each public function accepts raw bytes so it can be driven from
//! `cargo fuzz` targets as well as plain unit tests. Decoding failures are
//! swallowed; broken invariants panic so the fuzzer records a crash.
//!
//! # Examples
//!
//! ```
//! jpatch_fuzz::fuzz_pointer(b"/a~1b/0");
//! jpatch_fuzz::fuzz_diff(&[1, 2, 3, 4]);
//! jpatch_fuzz::fuzz_patch(b"[{\"op\":\"remove\",\"path\":\"\"}]");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use jpatch_core::{diff, diff_with_options, DiffOptions, Patch, Pointer, Value};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 6;
const MAX_OBJECT_LEN: u8 = 6;
const MAX_STRING_LEN: u8 = 8;

/// Parses arbitrary bytes as a JSON Pointer and resolves it against a
/// random document.
///
/// A pointer that parses must print back to the same text.
///
/// ```
/// jpatch_fuzz::fuzz_pointer(b"/~0~1");
/// ```
pub fn fuzz_pointer(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(pointer) = Pointer::parse(text) else {
        return;
    };
    assert_eq!(pointer.to_string(), text, "pointer display must round-trip");

    let mut unstructured = Unstructured::new(data);
    if let Some(doc) = random_value(&mut unstructured) {
        let _ = pointer.get(&doc);
    }
}

/// Diffs two random documents and checks that the patch reproduces the
/// target, with and without test guards.
///
/// ```
/// jpatch_fuzz::fuzz_diff(b"seed");
/// ```
pub fn fuzz_diff(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let (Some(src), Some(dst)) = (random_value(&mut unstructured), random_value(&mut unstructured))
    else {
        return;
    };

    let patch = diff(&src, &dst);
    assert_eq!(patch.apply(&src).ok().as_ref(), Some(&dst), "diff must reproduce target");

    let guarded = DiffOptions::default().with_test_guards(true);
    let patch = diff_with_options(&src, &dst, &guarded);
    assert_eq!(patch.apply(&src).ok().as_ref(), Some(&dst), "guarded diff must reproduce target");
}

/// Parses arbitrary bytes as a patch and applies it to a random document.
///
/// A failing patch must leave the document untouched.
///
/// ```
/// jpatch_fuzz::fuzz_patch(b"patch fuzz");
/// ```
pub fn fuzz_patch(data: &[u8]) {
    let Ok(patch) = serde_json::from_slice::<Patch>(data) else {
        return;
    };
    let mut unstructured = Unstructured::new(data);
    let Some(original) = random_value(&mut unstructured) else {
        return;
    };

    let mut doc = original.clone();
    if patch.apply_in_place(&mut doc).is_err() {
        assert_eq!(doc, original, "failed patch must not modify the document");
    }
}

fn random_value(unstructured: &mut Unstructured<'_>) -> Option<Value> {
    let value = json_value_from_unstructured(unstructured, 0).ok()?;
    Value::from_json_value(value).ok()
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    match unstructured.int_in_range::<u8>(0..=5)? {
        0..=3 => json_leaf(unstructured),
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_string(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_string(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=2)? {
        0 => Ok(JsonNumber::from(unstructured.int_in_range::<i32>(-1_000_000..=1_000_000)?)),
        // beyond 2^53, where doubles can no longer tell neighbours apart
        1 => Ok(JsonNumber::from(unstructured.int_in_range::<u64>((1 << 53)..=u64::MAX)?)),
        _ => {
            let numerator = f64::from(unstructured.arbitrary::<i32>()?);
            let denominator = f64::from(unstructured.int_in_range::<u16>(1..=1024)?);
            JsonNumber::from_f64(numerator / denominator).ok_or(arbitrary::Error::IncorrectFormat)
        }
    }
}

/// Short strings over a small alphabet so keys and values collide often,
/// including the pointer escape characters.
fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    const ALPHABET: &[u8] = b"ab0/~";
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?);
    let mut string = String::with_capacity(len);
    for _ in 0..len {
        let index = usize::from(unstructured.int_in_range::<u8>(0..=4)?);
        string.push(char::from(ALPHABET[index]));
    }
    Ok(string)
}
