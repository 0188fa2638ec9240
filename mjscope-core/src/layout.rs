//! 510-element state record layout.
//!
//! A record is a flat vector of signed integers. The first 34 elements hold
//! scalar game metadata; the remaining 476 are fourteen 34-wide sections, one
//! element per tile type:
//!
//! - 0..34:    metadata (winds, sticks, wall, scores, riichi, round/step)
//! - 34..68:   dora indicator flags
//! - 68..102:  POV player's hand counts
//! - 102..238: melds, 4 players x 34
//! - 238..374: discards, 4 players x 34
//! - 374..510: pond, 4 players x 34
//!
//! The same vector reshapes to a 15 x 34 grid (see [`GRID_ROWS`]) which is
//! what heatmap renderers consume.

use std::ops::Range;

use crate::errors::{MjscopeError, MjscopeResult};
use crate::tile::NUM_TILE_TYPES;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Total elements in one record.
pub const RECORD_LEN: usize = 510;

/// Elements per tile-type section (one per tile type).
pub const SECTION_WIDTH: usize = NUM_TILE_TYPES; // 34

/// Number of players at the table.
pub const NUM_PLAYERS: usize = 4;

/// Riichi status slots stored in the metadata block.
pub const NUM_RIICHI_SLOTS: usize = 3;

/// Rows of the 15 x 34 grid view.
pub const GRID_ROWS: usize = RECORD_LEN / SECTION_WIDTH; // 15

// -- Scalar offsets --

const OFF_ROUND_WIND: usize = 0;
const OFF_DEALER: usize = 1;
const OFF_POV_PLAYER: usize = 2;
const OFF_HONBA: usize = 3;
const OFF_RIICHI_STICKS: usize = 4;
const OFF_WALL: usize = 5;
const OFF_SCORES: usize = 6; // 6..10
const OFF_RIICHI_STATUS: usize = 11; // 11..14
const OFF_PADDING: usize = 14; // 14..32
const OFF_ROUND_NUMBER: usize = 32;
const OFF_STEP_NUMBER: usize = 33;

// -- Section starts --

const OFF_DORA: usize = 34;
const OFF_HAND: usize = 68;
const OFF_MELDS: usize = 102;
const OFF_DISCARDS: usize = 238;
const OFF_POND: usize = 374;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Named region of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RoundWind,
    Dealer,
    PovPlayer,
    HonbaSticks,
    RiichiSticks,
    WallTiles,
    Scores,
    RiichiStatus,
    Padding,
    RoundNumber,
    StepNumber,
    DoraFlags,
    Hand,
    Melds,
    Discards,
    Pond,
}

impl Field {
    /// Every field in offset order.
    pub const ALL: [Field; 16] = [
        Field::RoundWind,
        Field::Dealer,
        Field::PovPlayer,
        Field::HonbaSticks,
        Field::RiichiSticks,
        Field::WallTiles,
        Field::Scores,
        Field::RiichiStatus,
        Field::Padding,
        Field::RoundNumber,
        Field::StepNumber,
        Field::DoraFlags,
        Field::Hand,
        Field::Melds,
        Field::Discards,
        Field::Pond,
    ];

    /// Snake-case name matching the serialized report keys.
    pub const fn name(self) -> &'static str {
        match self {
            Field::RoundWind => "round_wind",
            Field::Dealer => "dealer",
            Field::PovPlayer => "pov_player",
            Field::HonbaSticks => "honba_sticks",
            Field::RiichiSticks => "riichi_sticks",
            Field::WallTiles => "wall_tiles",
            Field::Scores => "scores",
            Field::RiichiStatus => "riichi_status",
            Field::Padding => "padding",
            Field::RoundNumber => "round_number",
            Field::StepNumber => "step_number",
            Field::DoraFlags => "dora_flags",
            Field::Hand => "hand",
            Field::Melds => "melds",
            Field::Discards => "discards",
            Field::Pond => "pond",
        }
    }

    /// True for sections repeated once per player with a 34-element stride.
    #[inline]
    pub const fn is_per_player(self) -> bool {
        matches!(self, Field::Melds | Field::Discards | Field::Pond)
    }

    /// Full `[start, end)` extent of the field, all players included.
    pub const fn span(self) -> (usize, usize) {
        match self {
            Field::RoundWind => (OFF_ROUND_WIND, OFF_ROUND_WIND + 1),
            Field::Dealer => (OFF_DEALER, OFF_DEALER + 1),
            Field::PovPlayer => (OFF_POV_PLAYER, OFF_POV_PLAYER + 1),
            Field::HonbaSticks => (OFF_HONBA, OFF_HONBA + 1),
            Field::RiichiSticks => (OFF_RIICHI_STICKS, OFF_RIICHI_STICKS + 1),
            Field::WallTiles => (OFF_WALL, OFF_WALL + 1),
            Field::Scores => (OFF_SCORES, OFF_SCORES + NUM_PLAYERS),
            Field::RiichiStatus => (OFF_RIICHI_STATUS, OFF_RIICHI_STATUS + NUM_RIICHI_SLOTS),
            Field::Padding => (OFF_PADDING, OFF_ROUND_NUMBER),
            Field::RoundNumber => (OFF_ROUND_NUMBER, OFF_ROUND_NUMBER + 1),
            Field::StepNumber => (OFF_STEP_NUMBER, OFF_STEP_NUMBER + 1),
            Field::DoraFlags => (OFF_DORA, OFF_DORA + SECTION_WIDTH),
            Field::Hand => (OFF_HAND, OFF_HAND + SECTION_WIDTH),
            Field::Melds => (OFF_MELDS, OFF_MELDS + NUM_PLAYERS * SECTION_WIDTH),
            Field::Discards => (OFF_DISCARDS, OFF_DISCARDS + NUM_PLAYERS * SECTION_WIDTH),
            Field::Pond => (OFF_POND, OFF_POND + NUM_PLAYERS * SECTION_WIDTH),
        }
    }
}

// ---------------------------------------------------------------------------
// VectorLayout
// ---------------------------------------------------------------------------

/// Stateless offset table for the 510-element record.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorLayout;

impl VectorLayout {
    /// Number of elements a record must have.
    #[inline]
    pub const fn total_length() -> usize {
        RECORD_LEN
    }

    /// Offset range of `field`, optionally narrowed to one player's section.
    ///
    /// Scalar fields ignore `player`. For per-player fields `None` yields the
    /// whole 136-element block and `Some(p)` the 34-element slice of player
    /// `p`; a player outside 0..4 yields `None`.
    pub fn range_of(field: Field, player: Option<usize>) -> Option<Range<usize>> {
        let (start, end) = field.span();
        match (field.is_per_player(), player) {
            (true, Some(p)) if p >= NUM_PLAYERS => None,
            (true, Some(p)) => Some(Self::player_section(start, p)),
            _ => Some(start..end),
        }
    }

    /// 34-element range of `player`'s slice of the block starting at `base`.
    #[inline]
    pub const fn player_section(base: usize, player: usize) -> Range<usize> {
        let start = base + player * SECTION_WIDTH;
        start..start + SECTION_WIDTH
    }

    /// Single-element offset of a scalar field.
    #[inline]
    pub(crate) const fn offset(field: Field) -> usize {
        field.span().0
    }

    /// Label of a row in the 15 x 34 grid view, or `None` past the last row.
    pub fn row_label(row: usize) -> Option<&'static str> {
        const LABELS: [&str; GRID_ROWS] = [
            "Metadata",
            "Dora indicators",
            "POV hand",
            "P0 melds",
            "P1 melds",
            "P2 melds",
            "P3 melds",
            "P0 discards",
            "P1 discards",
            "P2 discards",
            "P3 discards",
            "P0 pond",
            "P1 pond",
            "P2 pond",
            "P3 pond",
        ];
        LABELS.get(row).copied()
    }

    /// Reshapes a record into 15 rows of 34 values, row-major.
    pub fn as_grid<T>(record: &[T]) -> MjscopeResult<[[i32; SECTION_WIDTH]; GRID_ROWS]>
    where
        T: Copy + Into<i32>,
    {
        if record.len() != RECORD_LEN {
            return Err(MjscopeError::InvalidLength {
                expected: RECORD_LEN,
                actual: record.len(),
            });
        }
        let mut grid = [[0i32; SECTION_WIDTH]; GRID_ROWS];
        for (row, chunk) in grid.iter_mut().zip(record.chunks_exact(SECTION_WIDTH)) {
            for (cell, &value) in row.iter_mut().zip(chunk) {
                *cell = value.into();
            }
        }
        Ok(grid)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_offsets() {
        assert_eq!(VectorLayout::range_of(Field::RoundWind, None), Some(0..1));
        assert_eq!(VectorLayout::range_of(Field::Scores, None), Some(6..10));
        assert_eq!(VectorLayout::range_of(Field::RiichiStatus, None), Some(11..14));
        assert_eq!(VectorLayout::range_of(Field::Padding, None), Some(14..32));
        assert_eq!(VectorLayout::range_of(Field::StepNumber, None), Some(33..34));
        assert_eq!(VectorLayout::range_of(Field::DoraFlags, None), Some(34..68));
        assert_eq!(VectorLayout::range_of(Field::Hand, None), Some(68..102));
        assert_eq!(VectorLayout::range_of(Field::Melds, None), Some(102..238));
        assert_eq!(VectorLayout::range_of(Field::Discards, None), Some(238..374));
        assert_eq!(VectorLayout::range_of(Field::Pond, None), Some(374..510));
    }

    #[test]
    fn per_player_stride() {
        assert_eq!(VectorLayout::range_of(Field::Melds, Some(0)), Some(102..136));
        assert_eq!(VectorLayout::range_of(Field::Melds, Some(3)), Some(204..238));
        assert_eq!(VectorLayout::range_of(Field::Discards, Some(1)), Some(272..306));
        assert_eq!(VectorLayout::range_of(Field::Pond, Some(2)), Some(442..476));
        assert_eq!(VectorLayout::range_of(Field::Pond, Some(4)), None);
        // Scalars ignore the player argument.
        assert_eq!(VectorLayout::range_of(Field::Dealer, Some(7)), Some(1..2));
    }

    #[test]
    fn ranges_do_not_overlap_and_stay_in_bounds() {
        let mut claimed = [false; RECORD_LEN];
        for field in Field::ALL {
            let (start, end) = field.span();
            assert!(start < end && end <= RECORD_LEN, "{} out of bounds", field.name());
            for slot in &mut claimed[start..end] {
                assert!(!*slot, "{} overlaps another field", field.name());
                *slot = true;
            }
        }
        // Offset 10 is the only element no named field claims.
        let unclaimed: Vec<usize> = (0..RECORD_LEN).filter(|&i| !claimed[i]).collect();
        assert_eq!(unclaimed, vec![10]);
        assert_eq!(VectorLayout::total_length(), 510);
    }

    #[test]
    fn grid_rows_follow_sections() {
        let mut record = vec![0i8; RECORD_LEN];
        record[68 + 5] = 3; // hand, tile 5
        record[238 + 34 + 1] = 2; // P1 discards, tile 1
        let grid = VectorLayout::as_grid(&record).unwrap();
        assert_eq!(grid[2][5], 3);
        assert_eq!(grid[8][1], 2);
        assert_eq!(VectorLayout::row_label(2), Some("POV hand"));
        assert_eq!(VectorLayout::row_label(8), Some("P1 discards"));
        assert_eq!(VectorLayout::row_label(GRID_ROWS), None);
    }

    #[test]
    fn grid_rejects_short_record() {
        let record = vec![0i32; 34];
        assert!(matches!(
            VectorLayout::as_grid(&record),
            Err(MjscopeError::InvalidLength { expected: 510, actual: 34 })
        ));
    }
}
