//! Decoded, immutable view of one state record.
//!
//! Sparse sections are stored as ascending `(tile_type, count)` lists rather
//! than hash maps so every consumer iterates tile types in the same order.

use serde::{Deserialize, Serialize};

use crate::layout::{NUM_PLAYERS, NUM_RIICHI_SLOTS, SECTION_WIDTH};

/// One present tile type and how many of it a section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCount {
    pub tile_type: u8,
    pub count: i32,
}

impl TileCount {
    #[inline]
    pub const fn new(tile_type: u8, count: i32) -> Self {
        Self { tile_type, count }
    }
}

/// Ascending sparse list of the positive entries of a 34-wide section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseCounts {
    pub tiles: Vec<TileCount>,
    /// Sum of every emitted count, widened so full-range `i32` records
    /// cannot overflow it.
    pub total: i64,
}

impl SparseCounts {
    /// Scans a 34-element window in ascending index order, keeping only
    /// strictly positive values. Zero and negative (padding) values are
    /// both treated as absent.
    pub fn from_section(section: impl IntoIterator<Item = i32>) -> Self {
        let tiles: Vec<TileCount> = section
            .into_iter()
            .take(SECTION_WIDTH)
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .map(|(tile_type, count)| TileCount::new(tile_type as u8, count))
            .collect();
        let total = tiles.iter().map(|t| i64::from(t.count)).sum();
        Self { tiles, total }
    }

    /// Count held for `tile_type`, 0 when absent.
    pub fn count_of(&self, tile_type: u8) -> i32 {
        self.tiles
            .binary_search_by_key(&tile_type, |t| t.tile_type)
            .map(|i| self.tiles[i].count)
            .unwrap_or(0)
    }

    /// Number of distinct tile types present.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileCount> + '_ {
        self.tiles.iter()
    }
}

/// Scalar game metadata (record offsets 0..14).
///
/// Values are passed through as recorded; a wind of 7 stays 7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub round_wind: i32,
    pub dealer: i32,
    pub pov_player: i32,
    pub honba_sticks: i32,
    pub riichi_sticks: i32,
    pub wall_tiles: i32,
    pub scores: [i32; NUM_PLAYERS],
    pub riichi_status: [i32; NUM_RIICHI_SLOTS],
}

/// Round/step counters (record offsets 32..34).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub round_number: i32,
    pub step_number: i32,
}

/// Dora indicator flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoraInfo {
    /// First flagged indicator, if any.
    pub active_dora: Option<u8>,
    /// Every flagged indicator, ascending.
    pub all_dora: Vec<u8>,
}

/// The POV player's concealed hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandInfo {
    pub tiles: Vec<TileCount>,
    pub total_tiles: i64,
    pub unique_types: usize,
}

impl From<SparseCounts> for HandInfo {
    fn from(counts: SparseCounts) -> Self {
        Self {
            unique_types: counts.len(),
            total_tiles: counts.total,
            tiles: counts.tiles,
        }
    }
}

/// Fully decoded record. Built once by the decoder and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub metadata: Metadata,
    pub control: Control,
    pub dora: DoraInfo,
    pub hand: HandInfo,
    pub melds: [SparseCounts; NUM_PLAYERS],
    pub discards: [SparseCounts; NUM_PLAYERS],
    pub pond: [SparseCounts; NUM_PLAYERS],
}

impl StateSnapshot {
    #[inline]
    pub fn pov_player(&self) -> i32 {
        self.metadata.pov_player
    }

    #[inline]
    pub fn step_number(&self) -> i32 {
        self.control.step_number
    }

    /// Total tiles discarded across all four players.
    pub fn total_discards(&self) -> i64 {
        self.discards.iter().map(|d| d.total).sum()
    }
}
