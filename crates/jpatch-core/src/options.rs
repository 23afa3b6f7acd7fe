use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::OptionsError;

/// How differing arrays are turned into operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayStrategy {
    /// Align elements around common runs and patch the gaps (default).
    #[default]
    Lcs,
    /// Replace a differing array wholesale.
    Replace,
}

/// Configuration knobs passed to [`diff_with_options`](crate::diff_with_options).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    array_strategy: ArrayStrategy,
    test_guards: bool,
    lcs_cell_limit: Option<usize>,
}

impl DiffOptions {
    /// Returns the configured array strategy.
    #[must_use]
    pub fn array_strategy(&self) -> ArrayStrategy {
        self.array_strategy
    }

    /// Whether `test` operations guard every `remove` and `replace`.
    #[must_use]
    pub fn test_guards(&self) -> bool {
        self.test_guards
    }

    /// Returns the largest array sub-problem, in compared pairs, that is
    /// searched for a common run.
    #[must_use]
    pub fn lcs_cell_limit(&self) -> Option<usize> {
        self.lcs_cell_limit
    }

    /// Sets the array strategy.
    ///
    /// ```
    /// # use jpatch_core::{ArrayStrategy, DiffOptions};
    /// let opts = DiffOptions::default()
    ///     .with_array_strategy(ArrayStrategy::Replace)
    ///     .expect("set strategy");
    /// assert_eq!(opts.array_strategy(), ArrayStrategy::Replace);
    /// ```
    pub fn with_array_strategy(mut self, strategy: ArrayStrategy) -> Result<Self, OptionsError> {
        self.array_strategy = strategy;
        self.validate()?;
        Ok(self)
    }

    /// Emits a `test` of the old value before each `remove` and `replace`.
    #[must_use]
    pub fn with_test_guards(mut self, enabled: bool) -> Self {
        self.test_guards = enabled;
        self
    }

    /// Bounds the quadratic array alignment.
    ///
    /// Sub-problems of `src.len() * dst.len()` above `limit` are patched
    /// position by position without looking for a common run.
    ///
    /// ```
    /// # use jpatch_core::{DiffOptions, OptionsError};
    /// let opts = DiffOptions::default().with_lcs_cell_limit(10_000)?;
    /// assert_eq!(opts.lcs_cell_limit(), Some(10_000));
    /// assert_eq!(DiffOptions::default().with_lcs_cell_limit(0), Err(OptionsError::ZeroCellLimit));
    /// # Ok::<(), OptionsError>(())
    /// ```
    pub fn with_lcs_cell_limit(mut self, limit: usize) -> Result<Self, OptionsError> {
        if limit == 0 {
            return Err(OptionsError::ZeroCellLimit);
        }
        self.lcs_cell_limit = Some(limit);
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), OptionsError> {
        if self.lcs_cell_limit.is_some() && self.array_strategy != ArrayStrategy::Lcs {
            return Err(OptionsError::LimitRequiresLcs);
        }
        Ok(())
    }
}

impl fmt::Display for ArrayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayStrategy::Lcs => f.write_str("lcs"),
            ArrayStrategy::Replace => f.write_str("replace"),
        }
    }
}

impl FromStr for ArrayStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lcs" => Ok(Self::Lcs),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown array strategy {other:?}")),
        }
    }
}
