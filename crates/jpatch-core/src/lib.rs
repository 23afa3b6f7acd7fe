//! JSON Pointer (RFC 6901) resolution, JSON Patch (RFC 6902) application and
//! patch generation.
//!
//! Documents are held as [`Value`] trees whose objects keep member insertion
//! order. [`diff`] produces a [`Patch`] that turns one document into another
//! and [`Patch::apply`] executes a patch atomically against a copy.
//!
//! ```
//! use jpatch_core::{diff, Patch, Value};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let base = Value::from_json_str(r#"{"name":"jpatch","tags":["a","b"]}"#)?;
//!     let target = Value::from_json_str(r#"{"name":"jpatch","tags":["a","c"],"v":2}"#)?;
//!     let patch = diff(&base, &target);
//!     assert_eq!(patch.len(), 2);
//!
//!     let wire = patch.to_json_string();
//!     let parsed: Patch = wire.parse()?;
//!     assert_eq!(parsed.apply(&base)?, target);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod apply;
mod diff;
mod error;
mod hash;
pub mod lcs;
mod number;
mod options;
mod patch;
pub mod pointer;
mod value;

pub use diff::{diff, diff_with_options};
pub use error::{ErrorKind, OptionsError, ParseError, PatchError, ValueError};
pub use number::Number;
pub use options::{ArrayStrategy, DiffOptions};
pub use patch::{OpKind, Operation, Patch};
pub use pointer::{ArrayIndex, Location, Pointer};
pub use value::{Map, Value};

/// Returns the semantic version of the `jpatch-core` crate.
///
/// ```
/// assert!(!jpatch_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
