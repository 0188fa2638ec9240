//! Corpus-wide discard frequency and meld classification.
//!
//! Works on full [`StateSnapshot`]s because it needs every player's meld
//! section, which the comparator summary trims away.
//!
//! Meld classification looks at raw counts only:
//!
//! | count | class |
//! |---|---|
//! | 4 | Kan |
//! | 3 | Pon |
//! | 2 | Pair (reported with the Pon groupings) |
//! | 1 | single, fed to the Chii heuristic |
//! | other | Anomalous |
//!
//! Accumulation is commutative per key, so a batch can be split into shards,
//! accumulated independently, and merged before ranking.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::NUM_PLAYERS;
use crate::snapshot::{SparseCounts, StateSnapshot, TileCount};
use crate::tile::{is_suited, suit_block, tile_label, NUM_TILE_TYPES};

/// Default length of the discarded-tiles ranking.
pub const DEFAULT_TOP_DISCARDS: usize = 10;

/// Default length of each meld grouping ranking.
pub const DEFAULT_TOP_MELDS: usize = 5;

/// Default number of contributing snapshot indices kept per key.
pub const DEFAULT_CONTRIBUTOR_CAP: usize = 5;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    pub top_discards: usize,
    pub top_melds: usize,
    pub contributor_cap: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_discards: DEFAULT_TOP_DISCARDS,
            top_melds: DEFAULT_TOP_MELDS,
            contributor_cap: DEFAULT_CONTRIBUTOR_CAP,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldClass {
    Kan,
    Pon,
    Pair,
    Chii,
    Anomalous,
}

impl MeldClass {
    /// Class of a single meld-section entry. Count 1 has no class of its
    /// own; those tiles go to sequence detection instead.
    pub const fn from_count(count: i32) -> Option<Self> {
        match count {
            4 => Some(MeldClass::Kan),
            3 => Some(MeldClass::Pon),
            2 => Some(MeldClass::Pair),
            1 => None,
            _ => Some(MeldClass::Anomalous),
        }
    }
}

/// Grouping key: class, tile ordinal (first tile for sequences), raw count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeldKey {
    pub tile_type: u8,
    pub class: MeldClass,
    pub count: i32,
}

impl MeldKey {
    /// Descriptive key, e.g. `"Kan 2-pin"`, `"Chii 1-man 2-man 3-man"`,
    /// `"7x East"`.
    pub fn describe(&self) -> String {
        let label = tile_label(self.tile_type);
        match self.class {
            MeldClass::Kan => format!("Kan {label}"),
            MeldClass::Pon => format!("Pon {label}"),
            MeldClass::Pair => format!("Pair {label}"),
            MeldClass::Chii => format!(
                "Chii {label} {} {}",
                tile_label(self.tile_type.saturating_add(1)),
                tile_label(self.tile_type.saturating_add(2))
            ),
            MeldClass::Anomalous => format!("{}x {label}", self.count),
        }
    }
}

/// Greedy, non-backtracking sequence finder.
///
/// Keeps suited tiles only, expands counts into an ascending multiset, and
/// scans left to right. Three scanned ordinals that are consecutive integers
/// inside one suit block are consumed together; otherwise the scan moves one
/// tile on. Tiles that would only form a run under a different grouping are
/// never retried, so ambiguous inputs are under-counted. That is a known
/// limitation of this heuristic and intentionally left as is.
///
/// Returns the first ordinal of every detected sequence.
pub fn greedy_sequences(tiles: &[TileCount]) -> Vec<u8> {
    let mut expanded: Vec<u8> = tiles
        .iter()
        .filter(|t| is_suited(t.tile_type) && t.count > 0)
        .flat_map(|t| std::iter::repeat(t.tile_type).take(t.count as usize))
        .collect();
    expanded.sort_unstable();

    let mut starts = Vec::new();
    let mut i = 0;
    while i + 2 < expanded.len() {
        let (a, b, c) = (expanded[i], expanded[i + 1], expanded[i + 2]);
        let consecutive = b == a + 1 && c == a + 2;
        let same_suit = suit_block(a) == suit_block(b) && suit_block(b) == suit_block(c);
        if consecutive && same_suit {
            starts.push(a);
            i += 3;
        } else {
            i += 1;
        }
    }
    starts
}

// ---------------------------------------------------------------------------
// Section validation
// ---------------------------------------------------------------------------

/// Why a per-player section was left out of the statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedSection {
    #[error("tile type {0} is outside 0..34")]
    UnknownTileType(u8),
    #[error("tile type {tile_type} has non-positive count {count}")]
    NonPositiveCount { tile_type: u8, count: i32 },
    #[error("tile type {0} is out of ascending order or repeated")]
    Unordered(u8),
    #[error("declared total {declared} differs from entry sum {computed}")]
    TotalMismatch { declared: i64, computed: i64 },
}

/// Decoder output always passes; snapshots deserialized from elsewhere may not.
pub fn validate_section(section: &SparseCounts) -> Result<(), MalformedSection> {
    let mut previous: Option<u8> = None;
    let mut computed = 0i64;
    for entry in &section.tiles {
        if entry.tile_type as usize >= NUM_TILE_TYPES {
            return Err(MalformedSection::UnknownTileType(entry.tile_type));
        }
        if entry.count <= 0 {
            return Err(MalformedSection::NonPositiveCount {
                tile_type: entry.tile_type,
                count: entry.count,
            });
        }
        if previous.is_some_and(|p| p >= entry.tile_type) {
            return Err(MalformedSection::Unordered(entry.tile_type));
        }
        previous = Some(entry.tile_type);
        computed += i64::from(entry.count);
    }
    if computed != section.total {
        return Err(MalformedSection::TotalMismatch {
            declared: section.total,
            computed,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct KeyTally {
    occurrences: u64,
    snapshots: Vec<usize>,
}

impl KeyTally {
    fn record(&mut self, index: usize, cap: usize) {
        self.occurrences += 1;
        if self.snapshots.len() < cap && self.snapshots.last() != Some(&index) {
            self.snapshots.push(index);
        }
    }

    fn absorb(&mut self, other: KeyTally, cap: usize) {
        self.occurrences += other.occurrences;
        self.snapshots.extend(other.snapshots);
        self.snapshots.sort_unstable();
        self.snapshots.dedup();
        self.snapshots.truncate(cap);
    }
}

/// Partial statistics over a contiguous or sharded slice of the batch.
///
/// Snapshot indices passed to [`observe`](Self::observe) must be global
/// batch indices so merged contributor lists stay meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsAccumulator {
    contributor_cap: usize,
    games: usize,
    total_discards: i64,
    skipped_sections: usize,
    discarded: BTreeMap<u8, i64>,
    melds: BTreeMap<MeldKey, KeyTally>,
}

impl StatsAccumulator {
    pub fn new(contributor_cap: usize) -> Self {
        Self {
            contributor_cap,
            games: 0,
            total_discards: 0,
            skipped_sections: 0,
            discarded: BTreeMap::new(),
            melds: BTreeMap::new(),
        }
    }

    /// Fold one snapshot in. Malformed per-player sections are skipped and
    /// logged; the rest of the snapshot still counts.
    pub fn observe(&mut self, index: usize, snapshot: &StateSnapshot) {
        self.games += 1;
        for player in 0..NUM_PLAYERS {
            match validate_section(&snapshot.discards[player]) {
                Ok(()) => self.observe_discards(&snapshot.discards[player]),
                Err(e) => self.skip(index, player, "discards", &e),
            }
            match validate_section(&snapshot.melds[player]) {
                Ok(()) => self.observe_melds(index, &snapshot.melds[player]),
                Err(e) => self.skip(index, player, "melds", &e),
            }
        }
    }

    fn skip(&mut self, index: usize, player: usize, section: &str, error: &MalformedSection) {
        self.skipped_sections += 1;
        warn!(
            snapshot = index,
            player,
            section,
            error = %error,
            "skipping malformed section"
        );
    }

    fn observe_discards(&mut self, discards: &SparseCounts) {
        for entry in discards.iter() {
            *self.discarded.entry(entry.tile_type).or_default() += i64::from(entry.count);
            self.total_discards += i64::from(entry.count);
        }
    }

    fn observe_melds(&mut self, index: usize, melds: &SparseCounts) {
        let cap = self.contributor_cap;
        let mut singles: Vec<TileCount> = Vec::new();
        for entry in melds.iter() {
            match MeldClass::from_count(entry.count) {
                Some(class) => {
                    let key = MeldKey {
                        tile_type: entry.tile_type,
                        class,
                        count: entry.count,
                    };
                    self.melds.entry(key).or_default().record(index, cap);
                }
                None => singles.push(*entry),
            }
        }
        for start in greedy_sequences(&singles) {
            let key = MeldKey {
                tile_type: start,
                class: MeldClass::Chii,
                count: 3,
            };
            self.melds.entry(key).or_default().record(index, cap);
        }
    }

    /// Combine two partials. Order of merging does not matter.
    pub fn merge(mut self, other: StatsAccumulator) -> StatsAccumulator {
        let cap = self.contributor_cap.max(other.contributor_cap);
        self.contributor_cap = cap;
        self.games += other.games;
        self.total_discards += other.total_discards;
        self.skipped_sections += other.skipped_sections;
        for (tile_type, count) in other.discarded {
            *self.discarded.entry(tile_type).or_default() += count;
        }
        for (key, tally) in other.melds {
            self.melds.entry(key).or_default().absorb(tally, cap);
        }
        self
    }

    /// Rank everything. Only call once the whole batch has been folded in.
    pub fn finish(self, options: &StatsOptions) -> AggregateStatistics {
        let percent = |count: i64| {
            if self.total_discards > 0 {
                count as f64 * 100.0 / self.total_discards as f64
            } else {
                0.0
            }
        };

        let mut discards: Vec<DiscardStat> = self
            .discarded
            .iter()
            .map(|(&tile_type, &count)| DiscardStat {
                tile_type,
                label: tile_label(tile_type).into_owned(),
                count,
                percentage: percent(count),
            })
            .collect();
        discards.sort_by_key(|d| (Reverse(d.count), d.tile_type));
        discards.truncate(options.top_discards);

        let occurrences_of = |class: MeldClass| -> u64 {
            self.melds
                .iter()
                .filter(|(k, _)| k.class == class)
                .map(|(_, t)| t.occurrences)
                .sum()
        };
        let distribution = MeldDistribution {
            pon: occurrences_of(MeldClass::Pon),
            chii: occurrences_of(MeldClass::Chii),
            kan: occurrences_of(MeldClass::Kan),
        };

        let ranked = |classes: &[MeldClass], limit: Option<usize>| -> Vec<MeldGroup> {
            let mut groups: Vec<MeldGroup> = self
                .melds
                .iter()
                .filter(|(k, _)| classes.contains(&k.class))
                .map(|(k, t)| MeldGroup::new(k, t))
                .collect();
            groups.sort_by(|a, b| {
                (Reverse(a.occurrences), a.tile_type, a.class, a.count)
                    .cmp(&(Reverse(b.occurrences), b.tile_type, b.class, b.count))
            });
            if let Some(limit) = limit {
                groups.truncate(limit);
            }
            groups
        };

        let per_game = |total: f64| {
            if self.games > 0 {
                total / self.games as f64
            } else {
                0.0
            }
        };
        let total_melds = distribution.pon + distribution.chii + distribution.kan;

        let stats = AggregateStatistics {
            total_games: self.games,
            total_discards: self.total_discards,
            total_melds,
            skipped_sections: self.skipped_sections,
            top_discards: discards,
            top_pon: ranked(&[MeldClass::Pon, MeldClass::Pair], Some(options.top_melds)),
            top_chii: ranked(&[MeldClass::Chii], Some(options.top_melds)),
            top_kan: ranked(&[MeldClass::Kan], Some(options.top_melds)),
            anomalous: ranked(&[MeldClass::Anomalous], None),
            averages: GameAverages {
                discards_per_game: per_game(self.total_discards as f64),
                melds_per_game: per_game(total_melds as f64),
            },
            distribution,
        };
        debug!(
            games = stats.total_games,
            discards = stats.total_discards,
            melds = stats.total_melds,
            skipped = stats.skipped_sections,
            "aggregate statistics ranked"
        );
        stats
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardStat {
    pub tile_type: u8,
    pub label: String,
    pub count: i64,
    /// Share of the batch's total discard count, 0-100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeldGroup {
    pub class: MeldClass,
    pub tile_type: u8,
    pub count: i32,
    /// Label of `tile_type`, e.g. `"2-pin"`.
    pub label: String,
    /// Descriptive key, e.g. `"Kan 2-pin"`.
    pub key: String,
    pub occurrences: u64,
    /// First contributing snapshot indices, ascending, capped.
    pub snapshots: Vec<usize>,
}

impl MeldGroup {
    fn new(key: &MeldKey, tally: &KeyTally) -> Self {
        Self {
            class: key.class,
            tile_type: key.tile_type,
            count: key.count,
            label: tile_label(key.tile_type).into_owned(),
            key: key.describe(),
            occurrences: tally.occurrences,
            snapshots: tally.snapshots.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameAverages {
    pub discards_per_game: f64,
    pub melds_per_game: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeldDistribution {
    pub pon: u64,
    pub chii: u64,
    pub kan: u64,
}

/// Corpus-wide statistics. An empty batch yields all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub total_games: usize,
    pub total_discards: i64,
    /// Pon + Chii + Kan occurrences.
    pub total_melds: u64,
    /// Per-player sections dropped as malformed.
    pub skipped_sections: usize,
    pub top_discards: Vec<DiscardStat>,
    /// Pon and pair groupings.
    pub top_pon: Vec<MeldGroup>,
    pub top_chii: Vec<MeldGroup>,
    pub top_kan: Vec<MeldGroup>,
    pub anomalous: Vec<MeldGroup>,
    pub averages: GameAverages,
    pub distribution: MeldDistribution,
}

impl AggregateStatistics {
    /// Single pass over the batch in index order.
    pub fn compute(snapshots: &[StateSnapshot], options: &StatsOptions) -> Self {
        let mut acc = StatsAccumulator::new(options.contributor_cap);
        for (index, snapshot) in snapshots.iter().enumerate() {
            acc.observe(index, snapshot);
        }
        acc.finish(options)
    }

    /// Sharded over the current rayon pool and merged before ranking.
    /// Produces the same result as [`compute`](Self::compute).
    pub fn compute_parallel(snapshots: &[StateSnapshot], options: &StatsOptions) -> Self {
        let cap = options.contributor_cap;
        snapshots
            .par_iter()
            .enumerate()
            .fold(
                || StatsAccumulator::new(cap),
                |mut acc, (index, snapshot)| {
                    acc.observe(index, snapshot);
                    acc
                },
            )
            .reduce(|| StatsAccumulator::new(cap), StatsAccumulator::merge)
            .finish(options)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
