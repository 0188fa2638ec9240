//! Serializable analysis output and its JSON rendering.

use serde::{Deserialize, Serialize};

use crate::compare::{BasicComparison, ConsolidatedSummary, SequentialDiff};
use crate::errors::MjscopeResult;
use crate::stats::AggregateStatistics;

/// Everything one analysis produces.
///
/// A single-snapshot batch has no adjacent pairs: `diffs` is empty and
/// `consolidated` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub snapshot_count: usize,
    pub basic: BasicComparison,
    pub diffs: Vec<SequentialDiff>,
    pub consolidated: Option<ConsolidatedSummary>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub statistics: Option<AggregateStatistics>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> MjscopeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> MjscopeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of adjacent pairs where the POV player changed.
    pub fn pov_switches(&self) -> usize {
        self.diffs
            .iter()
            .filter(|d| d.metadata.pov_change.is_some())
            .count()
    }
}
