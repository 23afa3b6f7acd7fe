//! JSON Pointer (RFC 6901) parsing and resolution.
//!
//! A [`Pointer`] is a list of unescaped reference tokens. Resolving it with
//! [`Pointer::locate`] stops one step short of the target and hands back the
//! parent container together with the final token, which is what the patch
//! operations need to insert, remove or overwrite in place.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{value::Map, PatchError, Value};

/// A parsed JSON Pointer.
///
/// ```
/// # use jpatch_core::Pointer;
/// let pointer: Pointer = "/a~1b/c~0d/0".parse()?;
/// assert_eq!(pointer.tokens(), ["a/b", "c~d", "0"]);
/// assert_eq!(pointer.to_string(), "/a~1b/c~0d/0");
/// # Ok::<(), jpatch_core::PatchError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    tokens: Vec<String>,
}

/// An array position named by a reference token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayIndex {
    /// A concrete zero-based index.
    At(usize),
    /// The `-` token: one past the last element.
    End,
}

impl ArrayIndex {
    /// Parses a token as an array index. Leading zeros are rejected; digit
    /// strings too large for `usize` saturate, so they are never in range.
    ///
    /// ```
    /// # use jpatch_core::ArrayIndex;
    /// assert_eq!(ArrayIndex::parse("12"), Some(ArrayIndex::At(12)));
    /// assert_eq!(ArrayIndex::parse("-"), Some(ArrayIndex::End));
    /// assert_eq!(ArrayIndex::parse("01"), None);
    /// assert_eq!(ArrayIndex::parse("99999999999999999999999"), Some(ArrayIndex::At(usize::MAX)));
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token == "-" {
            return Some(Self::End);
        }
        let bytes = token.as_bytes();
        if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        if bytes.len() > 1 && bytes[0] == b'0' {
            return None;
        }
        Some(Self::At(token.parse().unwrap_or(usize::MAX)))
    }

    /// Position for inserting into an array of length `len` (`index <= len`).
    #[must_use]
    pub fn insertion_point(self, len: usize) -> Option<usize> {
        match self {
            Self::End => Some(len),
            Self::At(index) if index <= len => Some(index),
            Self::At(_) => None,
        }
    }

    /// Position of an existing element in an array of length `len`.
    #[must_use]
    pub fn existing(self, len: usize) -> Option<usize> {
        match self {
            Self::At(index) if index < len => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for ArrayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(index) => write!(f, "{index}"),
            Self::End => f.write_str("-"),
        }
    }
}

/// The resolved parent of a pointer target.
#[derive(Debug)]
pub enum Location<'v, 'p> {
    /// The pointer is empty and designates the whole document.
    Root(&'v mut Value),
    /// The target is a member of an object; the key may or may not exist.
    Member {
        /// The parent object.
        object: &'v mut Map,
        /// The final (unescaped) token.
        key: &'p str,
    },
    /// The target is a slot in an array; bounds are checked by the caller.
    Element {
        /// The parent array.
        array: &'v mut Vec<Value>,
        /// The final token as an index.
        index: ArrayIndex,
    },
}

impl Pointer {
    /// The empty pointer, designating the whole document.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a pointer string.
    ///
    /// ```
    /// # use jpatch_core::{ErrorKind, Pointer};
    /// assert!(Pointer::parse("").unwrap().is_root());
    /// assert_eq!(Pointer::parse("a").unwrap_err().kind(), ErrorKind::InvalidPointer);
    /// assert_eq!(Pointer::parse("/a~2").unwrap_err().kind(), ErrorKind::InvalidPointer);
    /// ```
    pub fn parse(input: &str) -> Result<Self, PatchError> {
        if input.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = input.strip_prefix('/') else {
            return Err(PatchError::InvalidPointer {
                pointer: input.to_owned(),
                reason: "must be empty or start with '/'".to_owned(),
            });
        };
        let tokens = rest
            .split('/')
            .map(|raw| unescape(raw).ok_or_else(|| invalid_escape(input)))
            .collect::<Result<_, _>>()?;
        Ok(Self { tokens })
    }

    /// Builds a pointer from already-unescaped tokens.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { tokens: tokens.into_iter().map(Into::into).collect() }
    }

    /// Returns a new pointer extended by one token.
    #[must_use]
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend(self.tokens.iter().cloned());
        tokens.push(token.into());
        Self { tokens }
    }

    /// Returns the pointer with its last token removed, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.tokens.split_last()?;
        Some(Self { tokens: init.to_vec() })
    }

    /// The final token, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// The unescaped tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether this pointer designates the whole document.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether `self` designates a strict ancestor of `other`.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let a: Pointer = "/a".parse()?;
    /// let ab: Pointer = "/a/b".parse()?;
    /// assert!(a.is_proper_prefix_of(&ab));
    /// assert!(!a.is_proper_prefix_of(&a));
    /// assert!(!ab.is_proper_prefix_of(&a));
    /// # Ok::<(), jpatch_core::PatchError>(())
    /// ```
    #[must_use]
    pub fn is_proper_prefix_of(&self, other: &Self) -> bool {
        self.tokens.len() < other.tokens.len() && other.tokens.starts_with(&self.tokens)
    }

    /// Resolves the pointer to an existing value.
    ///
    /// ```
    /// # use jpatch_core::{Pointer, Value};
    /// let doc = Value::from_json_str(r#"{"a":{"b":[1,2]}}"#)?;
    /// let pointer: Pointer = "/a/b/1".parse()?;
    /// assert_eq!(pointer.get(&doc)?, &Value::from(2));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get<'v>(&self, root: &'v Value) -> Result<&'v Value, PatchError> {
        let mut current = root;
        for token in &self.tokens {
            current = self.step(current, token)?;
        }
        Ok(current)
    }

    /// Resolves the pointer to an existing value, mutably.
    pub fn get_mut<'v>(&self, root: &'v mut Value) -> Result<&'v mut Value, PatchError> {
        let mut current = root;
        for token in &self.tokens {
            current = self.step_mut(current, token)?;
        }
        Ok(current)
    }

    /// Resolves every token but the last and returns the parent container
    /// together with the final token. Nothing is modified.
    pub fn locate<'v, 'p>(&'p self, root: &'v mut Value) -> Result<Location<'v, 'p>, PatchError> {
        let Some((last, init)) = self.tokens.split_last() else {
            return Ok(Location::Root(root));
        };
        let mut parent = root;
        for token in init {
            parent = self.step_mut(parent, token)?;
        }
        match parent {
            Value::Object(object) => Ok(Location::Member { object, key: last.as_str() }),
            Value::Array(array) => {
                let index = ArrayIndex::parse(last).ok_or_else(|| self.not_an_index(last))?;
                Ok(Location::Element { array, index })
            }
            other => Err(self.not_a_container(other)),
        }
    }

    fn step<'v>(&self, current: &'v Value, token: &str) -> Result<&'v Value, PatchError> {
        match current {
            Value::Object(map) => map.get(token).ok_or_else(|| self.not_found()),
            Value::Array(items) => {
                let index = ArrayIndex::parse(token).ok_or_else(|| self.not_an_index(token))?;
                let position =
                    index.existing(items.len()).ok_or_else(|| self.out_of_range(index, items.len()))?;
                Ok(&items[position])
            }
            other => Err(self.not_a_container(other)),
        }
    }

    fn step_mut<'v>(&self, current: &'v mut Value, token: &str) -> Result<&'v mut Value, PatchError> {
        match current {
            Value::Object(map) => map.get_mut(token).ok_or_else(|| self.not_found()),
            Value::Array(items) => {
                let index = ArrayIndex::parse(token).ok_or_else(|| self.not_an_index(token))?;
                let len = items.len();
                let position = index.existing(len).ok_or_else(|| self.out_of_range(index, len))?;
                Ok(&mut items[position])
            }
            other => Err(self.not_a_container(other)),
        }
    }

    pub(crate) fn not_found(&self) -> PatchError {
        PatchError::PathNotFound { pointer: self.to_string() }
    }

    pub(crate) fn out_of_range(&self, index: ArrayIndex, len: usize) -> PatchError {
        PatchError::IndexOutOfRange { pointer: self.to_string(), index: index.to_string(), len }
    }

    fn not_an_index(&self, token: &str) -> PatchError {
        PatchError::TypeMismatch {
            pointer: self.to_string(),
            expected: "array index",
            found: format!("token {token:?}"),
        }
    }

    fn not_a_container(&self, value: &Value) -> PatchError {
        PatchError::TypeMismatch {
            pointer: self.to_string(),
            expected: "object or array",
            found: value.kind_name().to_owned(),
        }
    }
}

fn unescape(raw: &str) -> Option<String> {
    if !raw.contains('~') {
        return Some(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return None,
        }
    }
    Some(out)
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn invalid_escape(input: &str) -> PatchError {
    PatchError::InvalidPointer {
        pointer: input.to_owned(),
        reason: "'~' must be followed by '0' or '1'".to_owned(),
    }
}

impl FromStr for Pointer {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str("/")?;
            f.write_str(&escape(token))?;
        }
        Ok(())
    }
}

impl Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}
