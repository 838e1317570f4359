/*
 * Built-in Rules
 *
 * Completion rules used out-of-the-box without configuration.
 */

use crate::features::completion::domain::CompletionRule;

/// TransactionScope rule
///
/// A `System.Transactions.TransactionScope` that is disposed without
/// `Complete()` rolls the ambient transaction back.
///
/// # Example
/// ```ignore
/// let rule = TransactionScopeRule::define();
/// assert_eq!(rule.completion_method_name, "Complete");
/// ```
pub struct TransactionScopeRule;

impl TransactionScopeRule {
    pub const ID: &'static str = "XA0001";
    pub const TARGET_TYPE: &'static str = "System.Transactions.TransactionScope";
    pub const COMPLETION_METHOD: &'static str = "Complete";

    pub fn define() -> CompletionRule {
        CompletionRule::new(Self::ID, Self::TARGET_TYPE, Self::COMPLETION_METHOD)
    }
}
