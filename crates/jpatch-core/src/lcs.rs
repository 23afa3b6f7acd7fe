//! Longest common run between two sequences.
//!
//! The array diff only needs one maximal run of consecutive matches at a time
//! and recursively splits the remaining prefix and suffix around it.

use std::ops::Range;

/// Matching ranges in the two input sequences, `(in_a, in_b)`.
pub type Match = (Range<usize>, Range<usize>);

/// Finds the longest run of consecutive elements common to `a` and `b`.
///
/// Returns `None` if no element of `a` equals any element of `b`. When
/// several runs share the maximal length, the one ending last in `a` wins,
/// and among those the one ending last in `b`.
///
/// ```
/// # use jpatch_core::lcs::longest_common_subsequence;
/// let (in_a, in_b) = longest_common_subsequence(&[1, 2, 3, 4], &[0, 1, 2, 3, 5]).unwrap();
/// assert_eq!((in_a, in_b), (0..3, 1..4));
/// assert!(longest_common_subsequence(&[1], &[2]).is_none());
/// ```
#[must_use]
pub fn longest_common_subsequence<T: PartialEq>(a: &[T], b: &[T]) -> Option<Match> {
    longest_common_subsequence_by(a, b, |x, y| x == y)
}

/// Same as [`longest_common_subsequence`] with a caller-supplied equality.
pub fn longest_common_subsequence_by<T, F>(a: &[T], b: &[T], mut eq: F) -> Option<Match>
where
    F: FnMut(&T, &T) -> bool,
{
    // run[j + 1] holds the length of the common run ending at (i, j).
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    let mut best_len = 0usize;
    let mut best_end = (0usize, 0usize);

    for (i, lhs) in a.iter().enumerate() {
        for (j, rhs) in b.iter().enumerate() {
            if eq(lhs, rhs) {
                let len = previous[j] + 1;
                current[j + 1] = len;
                if len >= best_len {
                    best_len = len;
                    best_end = (i + 1, j + 1);
                }
            } else {
                current[j + 1] = 0;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    if best_len == 0 {
        return None;
    }
    let (end_a, end_b) = best_end;
    Some((end_a - best_len..end_a, end_b - best_len..end_b))
}
