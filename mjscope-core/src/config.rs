//! Analysis settings.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::compare::DEFAULT_TOP_DISCARDED;
use crate::errors::{MjscopeError, MjscopeResult};
use crate::stats::{StatsOptions, DEFAULT_CONTRIBUTOR_CAP, DEFAULT_TOP_DISCARDS, DEFAULT_TOP_MELDS};

/// Records beyond this count are ignored unless the cap is lifted.
pub const DEFAULT_MAX_RECORDS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Leading records to analyze. `None` analyzes the whole batch.
    pub max_records: Option<usize>,
    /// Length of the consolidated most-discarded ranking.
    pub top_discarded: usize,
    /// Length of the statistics discard ranking.
    pub stats_top_discards: usize,
    /// Length of each statistics meld ranking.
    pub stats_top_melds: usize,
    /// Contributing snapshot indices kept per meld key.
    pub contributor_cap: usize,
    pub include_statistics: bool,
    /// Worker threads for decoding. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_records: Some(DEFAULT_MAX_RECORDS),
            top_discarded: DEFAULT_TOP_DISCARDED,
            stats_top_discards: DEFAULT_TOP_DISCARDS,
            stats_top_melds: DEFAULT_TOP_MELDS,
            contributor_cap: DEFAULT_CONTRIBUTOR_CAP,
            include_statistics: true,
            num_threads: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> MjscopeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MjscopeResult<()> {
        let sizes = [
            ("top_discarded", self.top_discarded),
            ("stats_top_discards", self.stats_top_discards),
            ("stats_top_melds", self.stats_top_melds),
            ("contributor_cap", self.contributor_cap),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(MjscopeError::InvalidConfig {
                message: format!("{name} must be at least 1"),
            });
        }
        if self.num_threads == Some(0) {
            return Err(MjscopeError::InvalidConfig {
                message: "num_threads must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            top_discards: self.stats_top_discards,
            top_melds: self.stats_top_melds,
            contributor_cap: self.contributor_cap,
        }
    }

    /// How many of `available` records an analysis will use.
    pub fn effective_len(&self, available: usize) -> usize {
        self.max_records.map_or(available, |cap| available.min(cap))
    }
}
