//! Patch generation.
//!
//! Objects are compared key by key in insertion order, arrays are aligned
//! around their longest common runs, and anything else that differs is
//! replaced outright. The resulting patch turns the source into the
//! destination when applied.

mod list;
mod object;

use tracing::debug;

use crate::{ArrayStrategy, DiffOptions, Operation, Patch, Pointer, Value};

/// Computes the patch that turns `src` into `dst` using default options.
///
/// ```
/// # use jpatch_core::{diff, Value};
/// let src = Value::from_json_str(r#"{"a":[0,1,2,3]}"#)?;
/// let dst = Value::from_json_str(r#"{"a":[1,2,4,"hi"]}"#)?;
/// let patch = diff(&src, &dst);
/// assert_eq!(
///     patch.to_json_string(),
///     r#"[{"op":"remove","path":"/a/0"},{"op":"replace","path":"/a/2","value":4},{"op":"add","path":"/a/3","value":"hi"}]"#,
/// );
/// # Ok::<(), jpatch_core::ValueError>(())
/// ```
#[must_use]
pub fn diff(src: &Value, dst: &Value) -> Patch {
    diff_with_options(src, dst, &DiffOptions::default())
}

/// Computes the patch that turns `src` into `dst`.
#[must_use]
pub fn diff_with_options(src: &Value, dst: &Value, options: &DiffOptions) -> Patch {
    let mut out = Ops::new(options);
    diff_impl(src, dst, &Pointer::root(), &mut out);
    debug!(operations = out.ops.len(), strategy = %options.array_strategy(), "generated patch");
    Patch::from_operations(out.ops)
}

fn diff_impl(src: &Value, dst: &Value, path: &Pointer, out: &mut Ops<'_>) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(lhs), Value::Object(rhs)) => object::diff_objects(lhs, rhs, path, out),
        (Value::Array(lhs), Value::Array(rhs)) => match out.options.array_strategy() {
            ArrayStrategy::Lcs => list::diff_arrays(lhs, rhs, path, out),
            ArrayStrategy::Replace => out.replace(path.clone(), src, dst),
        },
        _ => out.replace(path.clone(), src, dst),
    }
}

/// Operation sink shared by the object and array walkers.
struct Ops<'o> {
    options: &'o DiffOptions,
    ops: Vec<Operation>,
}

impl<'o> Ops<'o> {
    fn new(options: &'o DiffOptions) -> Self {
        Self { options, ops: Vec::new() }
    }

    fn add(&mut self, path: Pointer, value: &Value) {
        self.ops.push(Operation::add(path, value.clone()));
    }

    fn remove(&mut self, path: Pointer, old: &Value) {
        self.guard(&path, old);
        self.ops.push(Operation::remove(path));
    }

    fn replace(&mut self, path: Pointer, old: &Value, new: &Value) {
        self.guard(&path, old);
        self.ops.push(Operation::replace(path, new.clone()));
    }

    fn guard(&mut self, path: &Pointer, old: &Value) {
        if self.options.test_guards() {
            self.ops.push(Operation::test(path.clone(), old.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpKind;

    fn json(text: &str) -> Value {
        Value::from_json_str(text).unwrap()
    }

    fn kinds(patch: &Patch) -> Vec<OpKind> {
        patch.iter().map(Operation::kind).collect()
    }

    #[test]
    fn equal_documents_yield_empty_patch() {
        let doc = json(r#"{"a":[1,{"b":null}],"c":"d"}"#);
        assert!(diff(&doc, &doc).is_empty());
        assert!(diff(&json(r#"{"x":1,"y":2}"#), &json(r#"{"y":2,"x":1.0}"#)).is_empty());
    }

    #[test]
    fn object_members_follow_insertion_order() {
        let src = json(r#"{"this":{"is":"my","document":"sir"}}"#);
        let dst = json(r#"{"this":{"document":"my","is":"sir","now":{"go":"away!"}}}"#);
        assert_eq!(
            diff(&src, &dst).to_json_string(),
            concat!(
                r#"[{"op":"replace","path":"/this/is","value":"sir"},"#,
                r#"{"op":"replace","path":"/this/document","value":"my"},"#,
                r#"{"op":"add","path":"/this/now","value":{"go":"away!"}}]"#,
            )
        );
    }

    #[test]
    fn kind_change_is_a_replace() {
        let patch = diff(&json(r#"{"a":[1]}"#), &json(r#"{"a":{"0":1}}"#));
        assert_eq!(patch.to_json_string(), r#"[{"op":"replace","path":"/a","value":{"0":1}}]"#);
        let patch = diff(&json("1"), &json(r#""1""#));
        assert_eq!(patch.to_json_string(), r#"[{"op":"replace","path":"","value":"1"}]"#);
    }

    #[test]
    fn removed_keys_use_escaped_pointers() {
        let patch = diff(&json(r#"{"a/b":1,"c~d":2}"#), &json("{}"));
        assert_eq!(
            patch.to_json_string(),
            r#"[{"op":"remove","path":"/a~1b"},{"op":"remove","path":"/c~0d"}]"#
        );
    }

    #[test]
    fn replace_strategy_swaps_whole_arrays() {
        let options = DiffOptions::default().with_array_strategy(ArrayStrategy::Replace).unwrap();
        let patch = diff_with_options(&json("[1,2,3]"), &json("[1,2,4]"), &options);
        assert_eq!(patch.to_json_string(), r#"[{"op":"replace","path":"","value":[1,2,4]}]"#);
    }

    #[test]
    fn guards_precede_removes_and_replaces() {
        let options = DiffOptions::default().with_test_guards(true);
        let patch = diff_with_options(&json(r#"{"a":1,"b":2}"#), &json(r#"{"a":3,"c":4}"#), &options);
        assert_eq!(
            kinds(&patch),
            [OpKind::Test, OpKind::Replace, OpKind::Test, OpKind::Remove, OpKind::Add]
        );
        assert_eq!(patch.operations()[0], Operation::test("/a".parse().unwrap(), 1.into()));
    }
}
