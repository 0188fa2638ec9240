//! Per-request analysis state.
//!
//! A session owns one capped, decoded batch and answers every view over it.
//! Summaries are projected once at construction; diffs and statistics are
//! computed on first use and cached for the lifetime of the session.

use std::sync::OnceLock;

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compare::{ProgressionRow, SamePovComparison, SequentialComparator, SequentialDiff};
use crate::config::AnalysisConfig;
use crate::decoder::StateDecoder;
use crate::errors::{MjscopeError, MjscopeResult};
use crate::layout::NUM_PLAYERS;
use crate::report::AnalysisReport;
use crate::snapshot::{
    Control, DoraInfo, HandInfo, Metadata, SparseCounts, StateSnapshot, TileCount,
};
use crate::stats::AggregateStatistics;
use crate::summary::SnapshotSummary;
use crate::tile::tiles_to_string;

/// Entries shown inline before a tile list is summarized.
const DETAIL_MAX_SHOW: usize = 20;

/// One line of the snapshot listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotIndexEntry {
    pub index: usize,
    pub pov_player: i32,
    pub step_number: i32,
    pub wall_tiles: i32,
    pub hand_tiles: i64,
}

/// One player's slice of a per-player section, with a printable summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSection {
    pub player: usize,
    pub tiles: Vec<TileCount>,
    pub total: i64,
    pub text: String,
}

/// Drill-down view of a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDetail {
    pub index: usize,
    pub metadata: Metadata,
    pub control: Control,
    pub dora: DoraInfo,
    pub hand: HandInfo,
    pub hand_text: String,
    pub discards: Vec<PlayerSection>,
    /// Every tile visible in front of each player; `total` is the count of
    /// visible tiles.
    pub pond: Vec<PlayerSection>,
    pub melds: Vec<PlayerSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOverview {
    pub progression: Vec<ProgressionRow>,
    pub same_pov: Vec<SamePovComparison>,
}

#[derive(Debug)]
pub struct AnalysisSession {
    config: AnalysisConfig,
    pool: Option<ThreadPool>,
    snapshots: Vec<StateSnapshot>,
    summaries: Vec<SnapshotSummary>,
    diffs: OnceLock<Vec<SequentialDiff>>,
    statistics: OnceLock<AggregateStatistics>,
}

impl AnalysisSession {
    /// Cap, decode, and project a batch of raw records.
    ///
    /// Fails on an invalid config, on an empty batch after capping, or with
    /// the lowest-index decode failure.
    pub fn new<R, T>(records: &[R], config: AnalysisConfig) -> MjscopeResult<Self>
    where
        R: AsRef<[T]> + Sync,
        T: Copy + Into<i32> + Sync,
    {
        config.validate()?;
        let available = records.len();
        let used = config.effective_len(available);
        if used == 0 {
            return Err(MjscopeError::EmptyInput);
        }
        let pool = build_pool(config.num_threads)?;
        let records = &records[..used];
        let snapshots = match &pool {
            Some(pool) => pool.install(|| StateDecoder::decode_batch(records))?,
            None => StateDecoder::decode_batch(records)?,
        };
        debug!(
            available,
            used,
            threads = ?config.num_threads,
            "decoded analysis batch"
        );
        Ok(Self::assemble(config, pool, snapshots))
    }

    /// Build a session over snapshots decoded elsewhere. The record cap still
    /// applies.
    pub fn from_snapshots(
        mut snapshots: Vec<StateSnapshot>,
        config: AnalysisConfig,
    ) -> MjscopeResult<Self> {
        config.validate()?;
        snapshots.truncate(config.effective_len(snapshots.len()));
        if snapshots.is_empty() {
            return Err(MjscopeError::EmptyInput);
        }
        let pool = build_pool(config.num_threads)?;
        Ok(Self::assemble(config, pool, snapshots))
    }

    fn assemble(
        config: AnalysisConfig,
        pool: Option<ThreadPool>,
        snapshots: Vec<StateSnapshot>,
    ) -> Self {
        let summaries = snapshots.iter().map(SnapshotSummary::project).collect();
        Self {
            config,
            pool,
            snapshots,
            summaries,
            diffs: OnceLock::new(),
            statistics: OnceLock::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    pub fn summaries(&self) -> &[SnapshotSummary] {
        &self.summaries
    }

    pub fn comparator(&self) -> SequentialComparator<'_> {
        SequentialComparator::new(&self.summaries)
    }

    pub fn snapshot_index(&self) -> Vec<SnapshotIndexEntry> {
        self.summaries
            .iter()
            .enumerate()
            .map(|(index, s)| SnapshotIndexEntry {
                index,
                pov_player: s.pov_player,
                step_number: s.step_number,
                wall_tiles: s.wall_tiles,
                hand_tiles: s.hand_tiles,
            })
            .collect()
    }

    /// `None` when `index` is out of range.
    pub fn snapshot_detail(&self, index: usize) -> Option<SnapshotDetail> {
        let snapshot = self.snapshots.get(index)?;
        Some(SnapshotDetail {
            index,
            metadata: snapshot.metadata.clone(),
            control: snapshot.control,
            dora: snapshot.dora.clone(),
            hand: snapshot.hand.clone(),
            hand_text: tiles_to_string(&snapshot.hand.tiles, DETAIL_MAX_SHOW),
            discards: player_sections(&snapshot.discards),
            pond: player_sections(&snapshot.pond),
            melds: player_sections(&snapshot.melds),
        })
    }

    /// Adjacent-pair diffs, computed once.
    pub fn sequential_diffs(&self) -> MjscopeResult<&[SequentialDiff]> {
        if let Some(diffs) = self.diffs.get() {
            return Ok(diffs);
        }
        let diffs = self.comparator().sequential_diffs()?;
        Ok(self.diffs.get_or_init(|| diffs))
    }

    pub fn comparison_overview(&self) -> MjscopeResult<ComparisonOverview> {
        let comparator = self.comparator();
        let consolidated = comparator.consolidated_summary(self.config.top_discarded)?;
        let same_pov = comparator.same_pov_comparisons()?;
        Ok(ComparisonOverview {
            progression: consolidated.progression,
            same_pov,
        })
    }

    /// Corpus statistics over every snapshot in the session, computed once.
    pub fn statistics(&self) -> &AggregateStatistics {
        self.statistics.get_or_init(|| {
            let options = self.config.stats_options();
            match &self.pool {
                Some(pool) => {
                    pool.install(|| AggregateStatistics::compute_parallel(&self.snapshots, &options))
                }
                None => AggregateStatistics::compute_parallel(&self.snapshots, &options),
            }
        })
    }

    pub fn report(&self) -> MjscopeResult<AnalysisReport> {
        let basic = self.comparator().basic_comparison()?;
        let (diffs, consolidated) = if self.len() >= 2 {
            let consolidated = self
                .comparator()
                .consolidated_summary(self.config.top_discarded)?;
            (self.sequential_diffs()?.to_vec(), Some(consolidated))
        } else {
            (Vec::new(), None)
        };
        let statistics = self
            .config
            .include_statistics
            .then(|| self.statistics().clone());
        debug!(
            snapshots = self.len(),
            pairs = diffs.len(),
            statistics = statistics.is_some(),
            "built analysis report"
        );
        Ok(AnalysisReport {
            snapshot_count: self.len(),
            basic,
            diffs,
            consolidated,
            statistics,
        })
    }
}

fn player_sections(sections: &[SparseCounts; NUM_PLAYERS]) -> Vec<PlayerSection> {
    sections
        .iter()
        .enumerate()
        .map(|(player, section)| PlayerSection {
            player,
            tiles: section.tiles.clone(),
            total: section.total,
            text: tiles_to_string(&section.tiles, DETAIL_MAX_SHOW),
        })
        .collect()
}

fn build_pool(num_threads: Option<usize>) -> MjscopeResult<Option<ThreadPool>> {
    let Some(n) = num_threads else {
        return Ok(None);
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build()
        .map(Some)
        .map_err(|e| MjscopeError::ThreadPool {
            message: format!("failed to build thread pool: {e}"),
        })
}
