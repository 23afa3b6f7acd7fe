use super::{diff_impl, Ops};
use crate::{Map, Pointer};

pub(super) fn diff_objects(lhs: &Map, rhs: &Map, path: &Pointer, out: &mut Ops<'_>) {
    for (key, value) in lhs {
        let member = path.child(key.as_str());
        match rhs.get(key) {
            Some(other) => diff_impl(value, other, &member, out),
            None => out.remove(member, value),
        }
    }

    for (key, value) in rhs {
        if !lhs.contains_key(key) {
            out.add(path.child(key.as_str()), value);
        }
    }
}
