//! Abstract domain (lattice) trait

use std::cmp::Ordering;
use std::fmt::Debug;

/// Join semi-lattice over `Value`
///
/// `compare(old, new)` orders two values along the analysis direction:
/// `Less` means `new` is a legal successor of `old`. With
/// `assert_monotonicity`, a regression (`Greater`) is reported as a
/// non-fatal signal by the implementation.
pub trait AbstractDomain: Send + Sync {
    type Value: Clone + PartialEq + Debug;

    fn bottom(&self) -> Self::Value;

    fn unknown_or_maybe(&self) -> Self::Value;

    fn compare(&self, old: &Self::Value, new: &Self::Value, assert_monotonicity: bool) -> Ordering;

    fn merge(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
}
