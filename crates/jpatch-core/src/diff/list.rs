use std::ops::Range;

use tracing::trace;

use super::{diff_impl, Ops};
use crate::hash::{fingerprint, HashCode};
use crate::lcs::longest_common_subsequence_by;
use crate::{Pointer, Value};

/// Partition of an array pair into unmatched gaps.
///
/// Each leaf pairs a source range with the destination range it must become.
/// Common runs sit between neighbouring leaves and are left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Split {
    Leaf { src: Range<usize>, dst: Range<usize> },
    Branch(Box<Split>, Box<Split>),
}

/// An array element with its fingerprint, compared cheaply before deeply.
struct Entry<'a> {
    hash: HashCode,
    value: &'a Value,
}

impl<'a> Entry<'a> {
    fn new(value: &'a Value) -> Self {
        Self { hash: fingerprint(value), value }
    }

    fn same(&self, other: &Self) -> bool {
        self.hash == other.hash && self.value == other.value
    }
}

pub(super) fn diff_arrays(lhs: &[Value], rhs: &[Value], path: &Pointer, out: &mut Ops<'_>) {
    let lhs_entries: Vec<Entry<'_>> = lhs.iter().map(Entry::new).collect();
    let rhs_entries: Vec<Entry<'_>> = rhs.iter().map(Entry::new).collect();
    let split = split_by_common_run(
        &lhs_entries,
        &rhs_entries,
        0..lhs.len(),
        0..rhs.len(),
        out.options.lcs_cell_limit(),
    );
    emit(&split, lhs, rhs, path, out);
}

fn split_by_common_run(
    lhs: &[Entry<'_>],
    rhs: &[Entry<'_>],
    src: Range<usize>,
    dst: Range<usize>,
    cell_limit: Option<usize>,
) -> Split {
    if src.is_empty() || dst.is_empty() {
        return Split::Leaf { src, dst };
    }
    if let Some(limit) = cell_limit {
        if src.len().saturating_mul(dst.len()) > limit {
            trace!(src = ?src, dst = ?dst, limit, "cell limit reached, skipping alignment");
            return Split::Leaf { src, dst };
        }
    }

    let Some((run_src, run_dst)) =
        longest_common_subsequence_by(&lhs[src.clone()], &rhs[dst.clone()], Entry::same)
    else {
        return Split::Leaf { src, dst };
    };

    let run_src = src.start + run_src.start..src.start + run_src.end;
    let run_dst = dst.start + run_dst.start..dst.start + run_dst.end;
    let left = split_by_common_run(lhs, rhs, src.start..run_src.start, dst.start..run_dst.start, cell_limit);
    let right = split_by_common_run(lhs, rhs, run_src.end..src.end, run_dst.end..dst.end, cell_limit);
    Split::Branch(Box::new(left), Box::new(right))
}

fn emit(split: &Split, lhs: &[Value], rhs: &[Value], path: &Pointer, out: &mut Ops<'_>) {
    match split {
        Split::Branch(left, right) => {
            emit(left, lhs, rhs, path, out);
            emit(right, lhs, rhs, path, out);
        }
        Split::Leaf { src, dst } => emit_leaf(&lhs[src.clone()], &rhs[dst.clone()], dst.start, path, out),
    }
}

/// Rewrites `old` into `new` starting at live index `base`.
///
/// Everything before the leaf already has its destination shape, so `base`
/// is where `old` currently begins.
fn emit_leaf(old: &[Value], new: &[Value], base: usize, path: &Pointer, out: &mut Ops<'_>) {
    let paired = old.len().min(new.len());
    let at = |offset: usize| path.child((base + offset).to_string());

    for offset in (paired..old.len()).rev() {
        out.remove(at(offset), &old[offset]);
    }
    for (offset, (lhs, rhs)) in old.iter().zip(new).enumerate() {
        if lhs.same_container_kind(rhs) {
            diff_impl(lhs, rhs, &at(offset), out);
        } else if lhs != rhs {
            out.replace(at(offset), lhs, rhs);
        }
    }
    for (offset, value) in new.iter().enumerate().skip(paired) {
        out.add(at(offset), value);
    }
}
