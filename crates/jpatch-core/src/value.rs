use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;

use crate::{DiffOptions, Number, Patch, PatchError, ValueError};

/// Insertion-ordered object representation.
pub type Map = IndexMap<String, Value>;

/// A parsed JSON document.
///
/// Object members keep their insertion order, which makes diff output
/// reproducible. Equality ignores member order.
///
/// ```
/// # use jpatch_core::Value;
/// let lhs = Value::from_json_str(r#"{"a":1,"b":2}"#)?;
/// let rhs = Value::from_json_str(r#"{"b":2.0,"a":1}"#)?;
/// assert_eq!(lhs, rhs);
/// # Ok::<(), jpatch_core::ValueError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<Value>),
    /// JSON object.
    Object(Map),
}

impl Value {
    /// Parses JSON text.
    ///
    /// ```
    /// # use jpatch_core::Value;
    /// let value = Value::from_json_str("{\"hello\":\"world\"}")?;
    /// assert!(matches!(value, Value::Object(_)));
    /// # Ok::<(), jpatch_core::ValueError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, ValueError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Converts a serde JSON value.
    pub fn from_json_value(value: JsonValue) -> Result<Self, ValueError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => Ok(Self::Number(Number::try_from(num)?)),
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Self::Array(items))
            }
            JsonValue::Object(map) => {
                let mut object = Map::with_capacity(map.len());
                for (key, value) in map {
                    object.insert(key, Self::from_json_value(value)?);
                }
                Ok(Self::Object(object))
            }
        }
    }

    /// Converts into a serde JSON value.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Number(n) => JsonValue::Number(n.to_json_number()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(values) => JsonValue::Array(values.iter().map(Self::to_json_value).collect()),
            Self::Object(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json_value());
                }
                JsonValue::Object(object)
            }
        }
    }

    /// Human-readable name of the variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Looks up a value by JSON Pointer, returning `None` if the pointer is
    /// malformed or does not resolve.
    ///
    /// ```
    /// # use jpatch_core::Value;
    /// let doc = Value::from_json_str(r#"{"a/b":[10,20]}"#)?;
    /// assert_eq!(doc.pointer("/a~1b/1"), Some(&Value::from(20)));
    /// assert_eq!(doc.pointer("/missing"), None);
    /// # Ok::<(), jpatch_core::ValueError>(())
    /// ```
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let pointer: crate::Pointer = pointer.parse().ok()?;
        pointer.get(self).ok()
    }

    /// Computes the patch that turns `self` into `other`.
    ///
    /// ```
    /// # use jpatch_core::Value;
    /// let lhs = Value::from_json_str("1")?;
    /// let rhs = Value::from_json_str("2")?;
    /// assert_eq!(lhs.diff(&rhs).len(), 1);
    /// # Ok::<(), jpatch_core::ValueError>(())
    /// ```
    #[must_use]
    pub fn diff(&self, other: &Self) -> Patch {
        crate::diff::diff(self, other)
    }

    /// Computes a patch using explicit [`DiffOptions`].
    #[must_use]
    pub fn diff_with_options(&self, other: &Self, options: &DiffOptions) -> Patch {
        crate::diff::diff_with_options(self, other, options)
    }

    /// Applies a patch, returning the patched document and leaving `self`
    /// untouched.
    ///
    /// ```
    /// # use jpatch_core::Value;
    /// let base = Value::from_json_str("[1,2,3]")?;
    /// let target = Value::from_json_str("[1,4,3]")?;
    /// let patch = base.diff(&target);
    /// assert_eq!(base.apply_patch(&patch)?, target);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply_patch(&self, patch: &Patch) -> Result<Self, PatchError> {
        patch.apply(self)
    }

    pub(crate) fn same_container_kind(&self, other: &Self) -> bool {
        matches!((self, other), (Self::Object(_), Self::Object(_)) | (Self::Array(_), Self::Array(_)))
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = ValueError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.to_json_value()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut object = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    object.serialize_entry(key, value)?;
                }
                object.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Value::deserialize(deserializer)
            }

            fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Number(Number::from(v)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
                Ok(Value::Number(Number::from(v)))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Value, E>
            where
                E: de::Error,
            {
                Number::new(v).map(Value::Number).map_err(E::custom)
            }

            fn visit_str<E>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(key, value);
                }
                Ok(Value::Object(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{
        collection::{btree_map, vec},
        prelude::*,
        string::string_regex,
    };

    fn arb_json_value() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            proptest::num::f64::ANY.prop_filter_map("finite", |f| {
                if f.is_finite() {
                    serde_json::Number::from_f64(f).map(JsonValue::Number)
                } else {
                    None
                }
            }),
            string_regex("[a-zA-Z0-9]{0,8}").unwrap().prop_map(JsonValue::String),
        ];
        leaf.prop_recursive(4, 8, 4, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                btree_map(string_regex("[a-zA-Z0-9]{1,8}").unwrap(), inner, 0..4).prop_map(|map| {
                    JsonValue::Object(map.into_iter().collect())
                }),
            ]
        })
    }

    #[test]
    fn object_keys_keep_insertion_order() {
        let value = Value::from_json_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let Value::Object(map) = &value else {
            panic!("expected object");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(value.to_string(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(Value::from_json_str("1").unwrap(), Value::from_json_str("1.0").unwrap());
        assert_ne!(Value::from_json_str("1").unwrap(), Value::from_json_str("\"1\"").unwrap());
    }

    #[test]
    fn large_integer_ids_stay_distinct() {
        let lhs = Value::from_json_str(r#"{"id":9007199254740993}"#).unwrap();
        let rhs = Value::from_json_str(r#"{"id":9007199254740992}"#).unwrap();
        assert_ne!(lhs, rhs);

        let patch = lhs.diff(&rhs);
        assert_eq!(
            patch.to_json_string(),
            r#"[{"op":"replace","path":"/id","value":9007199254740992}]"#
        );
        assert_eq!(lhs.apply_patch(&patch).unwrap(), rhs);
    }

    #[test]
    fn empty_patch_keeps_large_integers_verbatim() {
        let doc = Value::from_json_str(r#"{"id":12345678901234567891,"neg":-9223372036854775807}"#)
            .unwrap();
        let patched = doc.apply_patch(&Patch::from_json_str("[]").unwrap()).unwrap();
        assert_eq!(patched.to_string(), r#"{"id":12345678901234567891,"neg":-9223372036854775807}"#);
        assert_eq!(patched.to_json_value(), doc.to_json_value());
    }

    #[test]
    fn arrays_compare_in_order() {
        let lhs = Value::from_json_str("[1,2]").unwrap();
        let rhs = Value::from_json_str("[2,1]").unwrap();
        assert_ne!(lhs, rhs);
    }

    #[test]
    fn number_out_of_range_yields_error() {
        let err = Value::from_json_str("1e400").unwrap_err();
        assert!(matches!(err, ValueError::Json(_)));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(Value::from_json_str("{").is_err());
    }

    #[test]
    fn null_value_round_trips() {
        let value = Value::from_json_str(r#"{"a":null}"#).unwrap();
        assert_eq!(value.pointer("/a"), Some(&Value::Null));
        assert_eq!(value.to_string(), r#"{"a":null}"#);
    }

    proptest! {
        #[test]
        fn json_roundtrips_through_value(json in arb_json_value()) {
            let value = Value::from_json_value(json.clone()).unwrap();
            let reconstructed = value.to_json_value();
            let value_again = Value::from_json_value(reconstructed.clone()).unwrap();
            prop_assert_eq!(&value_again, &value);

            let text = serde_json::to_string(&value).unwrap();
            let parsed = Value::from_json_str(&text).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
