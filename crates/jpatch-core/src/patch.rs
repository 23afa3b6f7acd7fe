//! Patch operations and their JSON wire form.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::{ParseError, PatchError, Pointer, Value};

/// The six RFC 6902 operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// `add`
    Add,
    /// `remove`
    Remove,
    /// `replace`
    Replace,
    /// `move`
    Move,
    /// `copy`
    Copy,
    /// `test`
    Test,
}

impl OpKind {
    /// The wire name of the operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            "move" => Ok(Self::Move),
            "copy" => Ok(Self::Copy),
            "test" => Ok(Self::Test),
            other => Err(PatchError::invalid_operation(format!("unknown op {other:?}"))),
        }
    }
}

/// A single patch operation.
///
/// Every variant carries exactly the members its kind requires, so a
/// constructed operation is always well-formed.
///
/// ```
/// # use jpatch_core::{Operation, Pointer, Value};
/// let op = Operation::add("/baz".parse::<Pointer>()?, Value::from("qux"));
/// assert_eq!(serde_json::to_string(&op)?, r#"{"op":"add","path":"/baz","value":"qux"}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    /// Insert or overwrite `value` at `path`.
    Add {
        /// Target location.
        path: Pointer,
        /// Value to add.
        value: Value,
    },
    /// Delete the value at `path`.
    Remove {
        /// Target location.
        path: Pointer,
    },
    /// Overwrite the existing value at `path`.
    Replace {
        /// Target location.
        path: Pointer,
        /// Replacement value.
        value: Value,
    },
    /// Remove the value at `from` and add it at `path`.
    Move {
        /// Source location.
        from: Pointer,
        /// Target location.
        path: Pointer,
    },
    /// Add a deep copy of the value at `from` at `path`.
    Copy {
        /// Source location.
        from: Pointer,
        /// Target location.
        path: Pointer,
    },
    /// Require the value at `path` to equal `value`.
    Test {
        /// Target location.
        path: Pointer,
        /// Expected value.
        value: Value,
    },
}

impl Operation {
    /// Builds an `add` operation.
    #[must_use]
    pub fn add(path: Pointer, value: Value) -> Self {
        Self::Add { path, value }
    }

    /// Builds a `remove` operation.
    #[must_use]
    pub fn remove(path: Pointer) -> Self {
        Self::Remove { path }
    }

    /// Builds a `replace` operation.
    #[must_use]
    pub fn replace(path: Pointer, value: Value) -> Self {
        Self::Replace { path, value }
    }

    /// Builds a `move` operation.
    #[must_use]
    pub fn move_from(from: Pointer, path: Pointer) -> Self {
        Self::Move { from, path }
    }

    /// Builds a `copy` operation.
    #[must_use]
    pub fn copy_from(from: Pointer, path: Pointer) -> Self {
        Self::Copy { from, path }
    }

    /// Builds a `test` operation.
    #[must_use]
    pub fn test(path: Pointer, value: Value) -> Self {
        Self::Test { path, value }
    }

    /// The operation kind.
    #[must_use]
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Add { .. } => OpKind::Add,
            Self::Remove { .. } => OpKind::Remove,
            Self::Replace { .. } => OpKind::Replace,
            Self::Move { .. } => OpKind::Move,
            Self::Copy { .. } => OpKind::Copy,
            Self::Test { .. } => OpKind::Test,
        }
    }

    /// The target pointer.
    #[must_use]
    pub fn path(&self) -> &Pointer {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Move { path, .. }
            | Self::Copy { path, .. }
            | Self::Test { path, .. } => path,
        }
    }

    /// The source pointer of `move` and `copy`.
    #[must_use]
    pub fn from_path(&self) -> Option<&Pointer> {
        match self {
            Self::Move { from, .. } | Self::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// The value carried by `add`, `replace` and `test`.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } | Self::Test { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind(), self.path().to_string())?;
        if let Some(from) = self.from_path() {
            write!(f, " from {:?}", from.to_string())?;
        }
        if let Some(value) = self.value() {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// Operation object as it appears on the wire, before validation.
#[derive(Debug, Deserialize)]
struct RawOperation {
    op: Option<String>,
    path: Option<String>,
    #[serde(default, deserialize_with = "present")]
    value: Option<Value>,
    from: Option<String>,
}

/// Distinguishes `"value": null` (present) from a missing member.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawOperation> for Operation {
    type Error = PatchError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let kind: OpKind = raw
            .op
            .as_deref()
            .ok_or_else(|| PatchError::invalid_operation("missing \"op\" member"))?
            .parse()?;
        let path = raw.path.as_deref().map(Pointer::parse).transpose()?.ok_or_else(|| {
            PatchError::invalid_operation(format!("{kind} requires a \"path\" member"))
        })?;
        let value = || -> Result<Value, PatchError> {
            raw.value.clone().ok_or_else(|| {
                PatchError::invalid_operation(format!("{kind} requires a \"value\" member"))
            })
        };
        let from = || -> Result<Pointer, PatchError> {
            raw.from.as_deref().map(Pointer::parse).transpose()?.ok_or_else(|| {
                PatchError::invalid_operation(format!("{kind} requires a \"from\" member"))
            })
        };
        Ok(match kind {
            OpKind::Add => Self::Add { path, value: value()? },
            OpKind::Remove => Self::Remove { path },
            OpKind::Replace => Self::Replace { path, value: value()? },
            OpKind::Move => Self::Move { from: from()?, path },
            OpKind::Copy => Self::Copy { from: from()?, path },
            OpKind::Test => Self::Test { path, value: value()? },
        })
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawOperation::deserialize(deserializer)?;
        Self::try_from(raw).map_err(de::Error::custom)
    }
}

/// An ordered list of operations, applied left to right.
///
/// ```
/// # use jpatch_core::{Patch, Value};
/// let doc = Value::from_json_str(r#"{"foo":"bar"}"#)?;
/// let patch = Patch::from_json_str(r#"[{"op":"add","path":"/baz","value":"qux"}]"#)?;
/// let patched = patch.apply(&doc)?;
/// assert_eq!(patched.pointer("/baz"), Some(&Value::from("qux")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    operations: Vec<Operation>,
}

impl Patch {
    /// Constructs an empty patch.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a patch from the provided operations.
    #[must_use]
    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Parses the JSON wire form: an array of operation objects.
    pub fn from_json_str(input: &str) -> Result<Self, ParseError> {
        let raw: Vec<RawOperation> = serde_json::from_str(input)?;
        Self::from_raw(raw)
    }

    /// Converts an already-parsed JSON array of operation objects.
    pub fn from_json_value(value: JsonValue) -> Result<Self, ParseError> {
        let raw: Vec<RawOperation> = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: Vec<RawOperation>) -> Result<Self, ParseError> {
        let mut operations = Vec::with_capacity(raw.len());
        for (index, raw) in raw.into_iter().enumerate() {
            let operation =
                Operation::try_from(raw).map_err(|source| ParseError::Operation { index, source })?;
            operations.push(operation);
        }
        Ok(Self { operations })
    }

    /// Converts the patch into its JSON wire form.
    pub fn to_json_value(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Serializes the patch to its compact JSON wire form.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }

    /// Computes the patch turning `src` into `dst`.
    #[must_use]
    pub fn diff(src: &Value, dst: &Value) -> Self {
        crate::diff::diff(src, dst)
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Indicates whether the patch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The operations in application order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns an iterator over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Consumes the patch and returns the operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

impl FromStr for Patch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<Vec<Operation>> for Patch {
    fn from(value: Vec<Operation>) -> Self {
        Self::from_operations(value)
    }
}

impl FromIterator<Operation> for Patch {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self { operations: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl IntoIterator for Patch {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}
