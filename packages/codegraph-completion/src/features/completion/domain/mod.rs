//! Completion domain models

mod abstract_value;
mod analysis_kind;
mod finding;
mod rule;
mod value_domain;
mod value_kind;

pub use abstract_value::{CompletionAbstractValue, EvidenceSet};
pub use analysis_kind::CompletionAnalysisKind;
pub use finding::{findings_to_json, CompletionFinding, FindingSeverity};
pub use rule::CompletionRule;
pub use value_domain::{merge_kinds, CompletionValueDomain};
pub use value_kind::CompletionValueKind;

use crate::features::dataflow::{MapData, MapDomain};
use crate::features::points_to::AbstractLocation;

/// Completion state of every tracked location at one program point
pub type CompletionAnalysisData = MapData<AbstractLocation, CompletionAbstractValue>;

/// Lattice over `CompletionAnalysisData`
pub type CompletionAnalysisDomain = MapDomain<AbstractLocation, CompletionValueDomain>;
