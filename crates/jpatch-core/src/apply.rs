//! Patch application engine.
//!
//! Operations run in order against a working copy of the document. The first
//! failure aborts the whole patch, so callers never observe a partially
//! patched document.

use tracing::{debug, trace};

use crate::pointer::Location;
use crate::{Operation, Patch, PatchError, Pointer, Value};

impl Patch {
    /// Applies the patch to `doc`, returning the patched document.
    ///
    /// `doc` itself is never modified. On failure the error is wrapped in
    /// [`PatchError::Operation`] with the index of the failing operation.
    ///
    /// ```
    /// # use jpatch_core::{ErrorKind, Patch, Value};
    /// let doc = Value::from_json_str(r#"{"a":1}"#)?;
    /// let patch = Patch::from_json_str(
    ///     r#"[{"op":"replace","path":"/a","value":2},{"op":"test","path":"/a","value":3}]"#,
    /// )?;
    /// let err = patch.apply(&doc).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::TestFailed);
    /// assert_eq!(doc, Value::from_json_str(r#"{"a":1}"#)?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply(&self, doc: &Value) -> Result<Value, PatchError> {
        let mut working = doc.clone();
        self.apply_to(&mut working)?;
        Ok(working)
    }

    /// Applies the patch to `doc` in place.
    ///
    /// The document is only replaced once every operation has succeeded; on
    /// error it is left exactly as it was.
    pub fn apply_in_place(&self, doc: &mut Value) -> Result<(), PatchError> {
        let mut working = doc.clone();
        self.apply_to(&mut working)?;
        *doc = working;
        Ok(())
    }

    fn apply_to(&self, working: &mut Value) -> Result<(), PatchError> {
        debug!(operations = self.len(), "applying patch");
        for (index, operation) in self.iter().enumerate() {
            trace!(index, op = %operation.kind(), path = %operation.path(), "applying operation");
            if let Err(err) = apply_operation(working, operation) {
                debug!(index, error = %err, "patch aborted");
                return Err(err.at_operation(index, operation.kind()));
            }
        }
        Ok(())
    }
}

/// Applies one operation to `doc` in place.
fn apply_operation(doc: &mut Value, operation: &Operation) -> Result<(), PatchError> {
    match operation {
        Operation::Add { path, value } => add(doc, path, value.clone()),
        Operation::Remove { path } => remove(doc, path).map(drop),
        Operation::Replace { path, value } => replace(doc, path, value.clone()),
        Operation::Move { from, path } => move_value(doc, from, path),
        Operation::Copy { from, path } => {
            let value = from.get(doc)?.clone();
            add(doc, path, value)
        }
        Operation::Test { path, value } => test(doc, path, value),
    }
}

fn add(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchError> {
    match path.locate(doc)? {
        Location::Root(root) => *root = value,
        Location::Member { object, key } => {
            object.insert(key.to_owned(), value);
        }
        Location::Element { array, index } => {
            let position =
                index.insertion_point(array.len()).ok_or_else(|| path.out_of_range(index, array.len()))?;
            array.insert(position, value);
        }
    }
    Ok(())
}

fn remove(doc: &mut Value, path: &Pointer) -> Result<Value, PatchError> {
    match path.locate(doc)? {
        Location::Root(_) => Err(PatchError::invalid_operation("cannot remove the document root")),
        // shift_remove keeps the remaining members in order
        Location::Member { object, key } => object.shift_remove(key).ok_or_else(|| path.not_found()),
        Location::Element { array, index } => {
            let position =
                index.existing(array.len()).ok_or_else(|| path.out_of_range(index, array.len()))?;
            Ok(array.remove(position))
        }
    }
}

fn replace(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchError> {
    *path.get_mut(doc)? = value;
    Ok(())
}

fn move_value(doc: &mut Value, from: &Pointer, path: &Pointer) -> Result<(), PatchError> {
    if from == path {
        from.get(doc)?;
        return Ok(());
    }
    if from.is_proper_prefix_of(path) {
        return Err(PatchError::CyclicMove { from: from.to_string(), pointer: path.to_string() });
    }
    let value = remove(doc, from)?;
    add(doc, path, value)
}

fn test(doc: &Value, path: &Pointer, expected: &Value) -> Result<(), PatchError> {
    let actual = path.get(doc)?;
    if actual == expected {
        Ok(())
    } else {
        Err(PatchError::TestFailed {
            pointer: path.to_string(),
            expected: expected.to_string(),
            found: actual.to_string(),
        })
    }
}
