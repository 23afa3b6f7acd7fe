//! Synthetic corpora for the `jpatch` benchmarks.
//!
//! Every corpus is generated deterministically so runs are comparable
//! across machines and no fixture files need to be shipped.
//!
//! # Examples
//!
//! ```
//! use jpatch_core::DiffOptions;
//!
//! let corpus = jpatch_benches::available_corpora()
//!     .iter()
//!     .find(|corpus| corpus.name() == "records")
//!     .expect("registered corpus");
//! let dataset = corpus.load();
//! let patch = dataset.diff(&DiffOptions::default());
//! assert_eq!(dataset.before().apply_patch(&patch).unwrap(), *dataset.after());
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use jpatch_core::{DiffOptions, Map, Patch, Value};

/// A named generator for a before/after document pair.
#[derive(Debug)]
pub struct Corpus {
    name: &'static str,
    build: fn() -> Dataset,
}

impl Corpus {
    /// Short identifier used as the benchmark id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Generates the document pair.
    #[must_use]
    pub fn load(&self) -> Dataset {
        (self.build)()
    }
}

/// A source document and the document it should become.
#[derive(Clone, Debug)]
pub struct Dataset {
    before: Value,
    after: Value,
}

impl Dataset {
    /// The source document.
    #[must_use]
    pub fn before(&self) -> &Value {
        &self.before
    }

    /// The target document.
    #[must_use]
    pub fn after(&self) -> &Value {
        &self.after
    }

    /// Computes the patch from `before` to `after`.
    #[must_use]
    pub fn diff(&self, options: &DiffOptions) -> Patch {
        jpatch_core::diff_with_options(&self.before, &self.after, options)
    }

    /// Size of both documents in compact JSON, for throughput reporting.
    #[must_use]
    pub fn json_bytes(&self) -> usize {
        self.before.to_string().len() + self.after.to_string().len()
    }
}

static CORPORA: [Corpus; 3] = [
    Corpus { name: "records", build: records },
    Corpus { name: "shifted-array", build: shifted_array },
    Corpus { name: "nested-config", build: nested_config },
];

/// Lists the registered corpora.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

fn record(id: i32, revision: i32) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), id.into());
    map.insert("name".into(), format!("user-{id}").into());
    map.insert("revision".into(), revision.into());
    let tags: Vec<Value> = (0..id % 4).map(|tag| format!("tag-{tag}").into()).collect();
    map.insert("tags".into(), tags.into());
    map.into()
}

/// 500 records; every seventh updated, every eleventh dropped, a few appended.
fn records() -> Dataset {
    let before: Vec<Value> = (0..500).map(|id| record(id, 0)).collect();
    let after: Vec<Value> = (0..520)
        .filter(|id| id % 11 != 5)
        .map(|id| record(id, i32::from(id % 7 == 0)))
        .collect();
    Dataset { before: wrap("records", before), after: wrap("records", after) }
}

/// 2000 integers with a block inserted at the front and a hole punched in
/// the middle, so every element shifts.
fn shifted_array() -> Dataset {
    let before: Vec<Value> = (0..2000i32).map(Value::from).collect();
    let after: Vec<Value> =
        (-25..2000i32).filter(|value| !(900..950).contains(value)).map(Value::from).collect();
    Dataset { before: before.into(), after: after.into() }
}

/// A six-level configuration tree with a handful of scattered edits.
fn nested_config() -> Dataset {
    fn tree(depth: u32, seed: i32, edited: bool) -> Value {
        let mut map = Map::new();
        if depth == 0 {
            let value = if edited && seed % 13 == 0 { seed + 1 } else { seed };
            map.insert("value".into(), value.into());
            map.insert("enabled".into(), (seed % 2 == 0).into());
            return map.into();
        }
        for branch in 0..4 {
            let key = format!("section-{branch}");
            map.insert(key, tree(depth - 1, seed * 4 + branch, edited));
        }
        if edited && depth == 3 && seed % 5 == 0 {
            map.insert("added".into(), "yes".into());
        }
        map.into()
    }

    Dataset { before: tree(6, 1, false), after: tree(6, 1, true) }
}

fn wrap(key: &str, items: Vec<Value>) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), items.into());
    map.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpora_have_unique_names() {
        let mut names: Vec<_> = available_corpora().iter().map(Corpus::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), available_corpora().len());
    }

    #[test]
    fn corpora_differ_and_generation_is_stable() {
        for corpus in available_corpora() {
            let first = corpus.load();
            let second = corpus.load();
            assert_ne!(first.before(), first.after(), "{}", corpus.name());
            assert_eq!(first.after(), second.after(), "{}", corpus.name());
            assert!(first.json_bytes() > 0);
        }
    }
}
