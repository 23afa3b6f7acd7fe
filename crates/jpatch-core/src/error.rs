use std::fmt;

use thiserror::Error;

use crate::OpKind;

/// Errors that can occur while converting external data into a [`Value`](crate::Value).
#[derive(Debug, Error)]
pub enum ValueError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
}

/// Flat classification of a [`PatchError`], independent of operation context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed JSON Pointer syntax.
    InvalidPointer,
    /// A segment that must exist is missing.
    PathNotFound,
    /// A token expects a container kind the document does not have there.
    TypeMismatch,
    /// An array index is not valid for the operation.
    IndexOutOfRange,
    /// A `test` operation found a different value.
    TestFailed,
    /// Unknown op name, missing member, or an operation the target forbids.
    InvalidOperation,
    /// A `move` whose `from` is an ancestor of its `path`.
    CyclicMove,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidPointer => "invalid pointer",
            Self::PathNotFound => "path not found",
            Self::TypeMismatch => "type mismatch",
            Self::IndexOutOfRange => "index out of range",
            Self::TestFailed => "test failed",
            Self::InvalidOperation => "invalid operation",
            Self::CyclicMove => "cyclic move",
        };
        f.write_str(name)
    }
}

/// Errors raised while resolving pointers or applying a [`Patch`](crate::Patch).
///
/// Errors produced by [`Patch::apply`](crate::Patch::apply) are wrapped in
/// [`PatchError::Operation`] so callers can tell which operation failed.
///
/// ```
/// # use jpatch_core::{ErrorKind, Patch, Value};
/// let doc = Value::from_json_str(r#"{"a":1}"#)?;
/// let patch: Patch = r#"[{"op":"remove","path":"/b"}]"#.parse()?;
/// let err = patch.apply(&doc).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::PathNotFound);
/// assert_eq!(err.operation_index(), Some(0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// The pointer string is not valid JSON Pointer syntax.
    #[error("invalid JSON pointer {pointer:?}: {reason}")]
    InvalidPointer {
        /// The offending pointer text.
        pointer: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A segment that must exist does not.
    #[error("path not found: {pointer:?}")]
    PathNotFound {
        /// Pointer being resolved.
        pointer: String,
    },
    /// A token was applied to a value of the wrong kind.
    #[error("type mismatch at {pointer:?}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Pointer being resolved.
        pointer: String,
        /// What the token required.
        expected: &'static str,
        /// What the document holds.
        found: String,
    },
    /// An array index outside the bounds allowed by the operation.
    #[error("index {index} out of range at {pointer:?} (array length {len})")]
    IndexOutOfRange {
        /// Pointer being resolved.
        pointer: String,
        /// The index token as written.
        index: String,
        /// Length of the array at the time of the operation.
        len: usize,
    },
    /// A `test` operation did not match.
    #[error("test failed at {pointer:?}: expected {expected}, found {found}")]
    TestFailed {
        /// Pointer that was tested.
        pointer: String,
        /// Expected value rendered as JSON.
        expected: String,
        /// Actual value rendered as JSON.
        found: String,
    },
    /// The operation is malformed or not allowed on its target.
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// Description of the problem.
        reason: String,
    },
    /// `move` from a location into one of its own descendants.
    #[error("cannot move {from:?} into its own descendant {pointer:?}")]
    CyclicMove {
        /// The `from` pointer.
        from: String,
        /// The `path` pointer.
        pointer: String,
    },
    /// Context wrapper identifying the failing operation.
    #[error("operation {index} ({op}) failed: {source}")]
    Operation {
        /// Zero-based position of the operation in the patch.
        index: usize,
        /// The operation kind.
        op: OpKind,
        /// The underlying failure.
        #[source]
        source: Box<PatchError>,
    },
}

impl PatchError {
    pub(crate) fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation { reason: reason.into() }
    }

    pub(crate) fn at_operation(self, index: usize, op: OpKind) -> Self {
        Self::Operation { index, op, source: Box::new(self) }
    }

    /// Returns the error classification, looking through operation context.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPointer { .. } => ErrorKind::InvalidPointer,
            Self::PathNotFound { .. } => ErrorKind::PathNotFound,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::TestFailed { .. } => ErrorKind::TestFailed,
            Self::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            Self::CyclicMove { .. } => ErrorKind::CyclicMove,
            Self::Operation { source, .. } => source.kind(),
        }
    }

    /// Index of the failing operation, when known.
    #[must_use]
    pub fn operation_index(&self) -> Option<usize> {
        match self {
            Self::Operation { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Errors emitted when reading a patch from its JSON wire form.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not JSON, or not an array of operation objects.
    #[error("invalid patch JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// An operation object is well-formed JSON but not a valid operation.
    #[error("invalid patch operation {index}: {source}")]
    Operation {
        /// Zero-based position of the operation in the patch.
        index: usize,
        /// Why the operation was rejected.
        #[source]
        source: PatchError,
    },
}

/// Errors emitted when constructing [`DiffOptions`](crate::DiffOptions).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// A zero cell limit would disable matching altogether.
    #[error("LCS cell limit must be greater than zero")]
    ZeroCellLimit,
    /// The cell limit only applies to the LCS array strategy.
    #[error("an LCS cell limit requires the lcs array strategy")]
    LimitRequiresLcs,
}
