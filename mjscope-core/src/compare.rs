//! Sequential comparison over an ordered batch of [`SnapshotSummary`].
//!
//! Batch index order is taken as temporal order. Pairwise diffs only make
//! sense for adjacent entries, so they are always produced in index order.
//! Every walk over tile types or players is ascending, which makes the
//! structured output byte-identical across runs.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{MjscopeError, MjscopeResult};
use crate::layout::NUM_PLAYERS;
use crate::snapshot::TileCount;
use crate::summary::SnapshotSummary;

/// Default number of entries in the most-discarded ranking.
pub const DEFAULT_TOP_DISCARDED: usize = 5;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// One row of the side-by-side basic table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRow {
    pub index: usize,
    pub round_wind: i32,
    pub dealer: i32,
    pub pov_player: i32,
    pub hand_tiles: i64,
    pub step_number: i32,
    pub wall_tiles: i32,
}

/// Batch-wide variance, not per-pair deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicComparison {
    pub rows: Vec<BasicRow>,
    /// Distinct round winds, ascending.
    pub distinct_round_winds: Vec<i32>,
    /// Distinct dealers, ascending.
    pub distinct_dealers: Vec<i32>,
    pub min_hand_tiles: i64,
    pub max_hand_tiles: i64,
    pub step_progression: Vec<i32>,
    pub wall_progression: Vec<i32>,
}

impl BasicComparison {
    #[inline]
    pub fn hand_tiles_vary(&self) -> bool {
        self.min_hand_tiles != self.max_hand_tiles
    }
}

/// A tile type whose count changed between two nonzero values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedTile {
    pub tile_type: u8,
    pub from: i32,
    pub to: i32,
    pub diff: i32,
}

/// Lost / gained / modified classification between two sparse maps.
///
/// `lost` carries the count before, `gained` the count after. Types whose
/// count did not change are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDiff {
    pub lost: Vec<TileCount>,
    pub gained: Vec<TileCount>,
    pub modified: Vec<ModifiedTile>,
}

impl TileDiff {
    /// Classifies every tile type present in either list. Both inputs must
    /// be ascending by tile type, as produced by the decoder.
    pub fn between(current: &[TileCount], next: &[TileCount]) -> Self {
        let mut diff = TileDiff::default();
        let types: BTreeSet<u8> = current
            .iter()
            .chain(next)
            .map(|t| t.tile_type)
            .collect();

        for tile_type in types {
            let before = count_in(current, tile_type);
            let after = count_in(next, tile_type);
            if before == after {
                continue;
            }
            if before > 0 && after == 0 {
                diff.lost.push(TileCount::new(tile_type, before));
            } else if before == 0 && after > 0 {
                diff.gained.push(TileCount::new(tile_type, after));
            } else {
                diff.modified.push(ModifiedTile {
                    tile_type,
                    from: before,
                    to: after,
                    diff: after - before,
                });
            }
        }
        diff
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lost.is_empty() && self.gained.is_empty() && self.modified.is_empty()
    }
}

/// POV switch between two adjacent snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PovChange {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDelta {
    pub pov_change: Option<PovChange>,
    pub step_from: i32,
    pub step_to: i32,
    pub step_delta: i64,
    pub wall_from: i32,
    pub wall_to: i32,
    pub wall_delta: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDiscardDiff {
    pub player: usize,
    pub changes: TileDiff,
}

/// A discard count that grew by `delta` this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiscard {
    pub tile_type: u8,
    pub delta: i32,
}

/// What the player who held the POV at step i discarded before step i+1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPattern {
    pub player: i32,
    pub new_discards: Vec<NewDiscard>,
    /// Next POV player when the turn passed to someone else.
    pub passed_to: Option<i32>,
}

/// Everything that changed between snapshot `from_index` and the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialDiff {
    pub from_index: usize,
    pub to_index: usize,
    pub metadata: MetadataDelta,
    /// Present only when both snapshots share the same POV player.
    pub hand: Option<TileDiff>,
    /// Players whose discards changed, ascending.
    pub discards: Vec<PlayerDiscardDiff>,
    pub turn: TurnPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRow {
    pub index: usize,
    pub pov_player: i32,
    pub step_number: i32,
    pub wall_tiles: i32,
    /// Number of discard entries (distinct types) across all four players.
    pub total_discards: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardFrequency {
    pub tile_type: u8,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedSummary {
    pub progression: Vec<ProgressionRow>,
    pub pov_rotation: Vec<i32>,
    pub most_discarded: Vec<DiscardFrequency>,
}

/// Hand evolution between two adjacent snapshots held by the same player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamePovComparison {
    pub from_index: usize,
    pub to_index: usize,
    pub player: i32,
    pub hand_changes: TileDiff,
}

// ---------------------------------------------------------------------------
// SequentialComparator
// ---------------------------------------------------------------------------

/// Borrowing comparator over a temporally ordered batch.
#[derive(Debug, Clone, Copy)]
pub struct SequentialComparator<'a> {
    summaries: &'a [SnapshotSummary],
}

impl<'a> SequentialComparator<'a> {
    pub fn new(summaries: &'a [SnapshotSummary]) -> Self {
        Self { summaries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    fn require_pairs(&self) -> MjscopeResult<()> {
        if self.summaries.len() < 2 {
            return Err(MjscopeError::InsufficientData {
                required: 2,
                actual: self.summaries.len(),
            });
        }
        Ok(())
    }

    /// Global variance over the batch. Works with a single snapshot.
    pub fn basic_comparison(&self) -> MjscopeResult<BasicComparison> {
        if self.summaries.is_empty() {
            return Err(MjscopeError::EmptyInput);
        }
        let rows: Vec<BasicRow> = self
            .summaries
            .iter()
            .enumerate()
            .map(|(index, s)| BasicRow {
                index,
                round_wind: s.round_wind,
                dealer: s.dealer,
                pov_player: s.pov_player,
                hand_tiles: s.hand_tiles,
                step_number: s.step_number,
                wall_tiles: s.wall_tiles,
            })
            .collect();

        let distinct = |f: fn(&SnapshotSummary) -> i32| -> Vec<i32> {
            self.summaries
                .iter()
                .map(f)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };
        let hand_totals = self.summaries.iter().map(|s| s.hand_tiles);

        Ok(BasicComparison {
            distinct_round_winds: distinct(|s| s.round_wind),
            distinct_dealers: distinct(|s| s.dealer),
            min_hand_tiles: hand_totals.clone().min().unwrap_or(0),
            max_hand_tiles: hand_totals.max().unwrap_or(0),
            step_progression: rows.iter().map(|r| r.step_number).collect(),
            wall_progression: rows.iter().map(|r| r.wall_tiles).collect(),
            rows,
        })
    }

    /// Diff between entry `index` and `index + 1`.
    pub fn diff_at(&self, index: usize) -> MjscopeResult<SequentialDiff> {
        self.require_pairs()?;
        let next = index.checked_add(1).and_then(|i| self.summaries.get(i));
        match (self.summaries.get(index), next) {
            (Some(current), Some(next)) => Ok(diff_pair(index, current, next)),
            _ => Err(MjscopeError::InsufficientData {
                required: index.saturating_add(2),
                actual: self.summaries.len(),
            }),
        }
    }

    /// Diffs for every adjacent pair, in index order.
    pub fn sequential_diffs(&self) -> MjscopeResult<Vec<SequentialDiff>> {
        self.require_pairs()?;
        let diffs: Vec<SequentialDiff> = self
            .summaries
            .windows(2)
            .enumerate()
            .map(|(i, pair)| diff_pair(i, &pair[0], &pair[1]))
            .collect();
        debug!(
            pairs = diffs.len(),
            pov_switches = diffs.iter().filter(|d| d.hand.is_none()).count(),
            "sequential diffs computed"
        );
        Ok(diffs)
    }

    /// Progression table, POV rotation, and the `top_k` most-discarded types.
    pub fn consolidated_summary(&self, top_k: usize) -> MjscopeResult<ConsolidatedSummary> {
        self.require_pairs()?;
        let progression = self
            .summaries
            .iter()
            .enumerate()
            .map(|(index, s)| ProgressionRow {
                index,
                pov_player: s.pov_player,
                step_number: s.step_number,
                wall_tiles: s.wall_tiles,
                total_discards: s.discard_entry_count(),
            })
            .collect();

        Ok(ConsolidatedSummary {
            progression,
            pov_rotation: self.summaries.iter().map(|s| s.pov_player).collect(),
            most_discarded: self.most_discarded(top_k),
        })
    }

    /// Adjacent pairs that kept the same POV player, with their hand changes.
    pub fn same_pov_comparisons(&self) -> MjscopeResult<Vec<SamePovComparison>> {
        self.require_pairs()?;
        Ok(self
            .summaries
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].pov_player == pair[1].pov_player)
            .map(|(i, pair)| SamePovComparison {
                from_index: i,
                to_index: i + 1,
                player: pair[0].pov_player,
                hand_changes: TileDiff::between(&pair[0].hand_detail, &pair[1].hand_detail),
            })
            .collect())
    }

    fn most_discarded(&self, top_k: usize) -> Vec<DiscardFrequency> {
        let mut counter: BTreeMap<u8, i64> = BTreeMap::new();
        for summary in self.summaries {
            for entry in summary.discards_detail.iter().flatten() {
                *counter.entry(entry.tile_type).or_default() += i64::from(entry.count);
            }
        }
        let mut ranked: Vec<DiscardFrequency> = counter
            .into_iter()
            .map(|(tile_type, count)| DiscardFrequency { tile_type, count })
            .collect();
        ranked.sort_by_key(|f| (Reverse(f.count), f.tile_type));
        ranked.truncate(top_k);
        ranked
    }
}

// ---------------------------------------------------------------------------
// Pairwise diff
// ---------------------------------------------------------------------------

/// Diff between two adjacent summaries; `index` is the position of `current`.
pub fn diff_pair(index: usize, current: &SnapshotSummary, next: &SnapshotSummary) -> SequentialDiff {
    let same_pov = current.pov_player == next.pov_player;
    let pov_change = (!same_pov).then_some(PovChange {
        from: current.pov_player,
        to: next.pov_player,
    });

    let metadata = MetadataDelta {
        pov_change,
        step_from: current.step_number,
        step_to: next.step_number,
        step_delta: i64::from(next.step_number) - i64::from(current.step_number),
        wall_from: current.wall_tiles,
        wall_to: next.wall_tiles,
        wall_delta: i64::from(next.wall_tiles) - i64::from(current.wall_tiles),
    };

    // A different POV means a different visible hand; nothing to compare.
    let hand = same_pov.then(|| TileDiff::between(&current.hand_detail, &next.hand_detail));

    let discards = (0..NUM_PLAYERS)
        .map(|player| PlayerDiscardDiff {
            player,
            changes: TileDiff::between(
                &current.discards_detail[player],
                &next.discards_detail[player],
            ),
        })
        .filter(|d| !d.changes.is_empty())
        .collect();

    SequentialDiff {
        from_index: index,
        to_index: index + 1,
        metadata,
        hand,
        discards,
        turn: turn_pattern(current, next),
    }
}

fn turn_pattern(current: &SnapshotSummary, next: &SnapshotSummary) -> TurnPattern {
    let player = current.pov_player;
    let new_discards = match (current.discards_of(player), next.discards_of(player)) {
        (Some(before), Some(after)) => after
            .iter()
            .filter_map(|entry| {
                let delta = entry.count - count_in(before, entry.tile_type);
                (delta > 0).then_some(NewDiscard {
                    tile_type: entry.tile_type,
                    delta,
                })
            })
            .collect(),
        _ => Vec::new(),
    };
    TurnPattern {
        player,
        new_discards,
        passed_to: (next.pov_player != player).then_some(next.pov_player),
    }
}

/// Count of `tile_type` in an ascending sparse list, 0 when absent.
fn count_in(tiles: &[TileCount], tile_type: u8) -> i32 {
    tiles
        .binary_search_by_key(&tile_type, |t| t.tile_type)
        .map(|i| tiles[i].count)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
