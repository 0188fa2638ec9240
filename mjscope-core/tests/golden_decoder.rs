//! Golden decoder regression tests.
//!
//! Each test builds a raw 510-element record by hand, decodes it, and checks
//! specific fields against hardcoded expectations.

use mjscope_core::layout::{GRID_ROWS, SECTION_WIDTH};
use mjscope_core::{MjscopeError, StateDecoder, TileCount, VectorLayout, RECORD_LEN};

fn zero_record() -> Vec<i32> {
    vec![0; RECORD_LEN]
}

// =========================================================================
// Hand section
// =========================================================================

#[test]
fn golden_single_hand_entry() {
    let mut r = zero_record();
    r[68 + 5] = 3;
    let snap = StateDecoder::decode(&r).unwrap();
    assert_eq!(snap.hand.tiles, vec![TileCount::new(5, 3)]);
    assert_eq!(snap.hand.total_tiles, 3);
    assert_eq!(snap.hand.unique_types, 1);
    assert!(snap.dora.all_dora.is_empty());
    assert_eq!(snap.total_discards(), 0);
}

#[test]
fn golden_full_hand() {
    // 123m 456p 789s EEE N N
    let mut r = zero_record();
    for t in [0, 1, 2, 12, 13, 14, 24, 25, 26] {
        r[68 + t] = 1;
    }
    r[68 + 27] = 3;
    r[68 + 30] = 2;
    let snap = StateDecoder::decode(&r).unwrap();
    assert_eq!(snap.hand.total_tiles, 14);
    assert_eq!(snap.hand.unique_types, 11);
    let types: Vec<u8> = snap.hand.tiles.iter().map(|t| t.tile_type).collect();
    assert_eq!(types, vec![0, 1, 2, 12, 13, 14, 24, 25, 26, 27, 30]);
}

#[test]
fn golden_extreme_hand_counts() {
    let mut r = zero_record();
    r[68] = i32::MAX;
    r[69] = 1;
    let snap = StateDecoder::decode(&r).unwrap();
    assert_eq!(snap.hand.total_tiles, 2_147_483_648);
    assert_eq!(snap.hand.tiles[0], TileCount::new(0, i32::MAX));
}

// =========================================================================
// Length checks
// =========================================================================

#[test]
fn golden_short_record_rejected() {
    let err = StateDecoder::decode(&vec![0i32; 509]).unwrap_err();
    assert!(matches!(
        err,
        MjscopeError::InvalidLength { expected: 510, actual: 509 }
    ));
}

#[test]
fn golden_empty_record_rejected() {
    let empty: Vec<i16> = Vec::new();
    assert!(matches!(
        StateDecoder::decode(&empty),
        Err(MjscopeError::InvalidLength { expected: 510, actual: 0 })
    ));
}

// =========================================================================
// Per-player sections and layout
// =========================================================================

#[test]
fn golden_sections_match_layout_ranges() {
    use mjscope_core::Field;
    let mut r = zero_record();
    for player in 0..4 {
        let melds = VectorLayout::range_of(Field::Melds, Some(player)).unwrap();
        let discards = VectorLayout::range_of(Field::Discards, Some(player)).unwrap();
        let pond = VectorLayout::range_of(Field::Pond, Some(player)).unwrap();
        r[melds.start + player] = 3;
        r[discards.start + 10 + player] = 1;
        r[pond.end - 1] = 2;
    }
    let snap = StateDecoder::decode(&r).unwrap();
    for player in 0..4 {
        assert_eq!(snap.melds[player].tiles, vec![TileCount::new(player as u8, 3)]);
        assert_eq!(
            snap.discards[player].tiles,
            vec![TileCount::new(10 + player as u8, 1)]
        );
        assert_eq!(snap.pond[player].tiles, vec![TileCount::new(33, 2)]);
    }
}

#[test]
fn golden_grid_rows_follow_sections() {
    let mut r = zero_record();
    r[2] = 1;
    r[68 + 4] = 2;
    r[374 + 3 * 34 + 33] = 1;
    let grid = VectorLayout::as_grid(&r).unwrap();
    assert_eq!(grid.len(), GRID_ROWS);
    assert_eq!(grid[0][2], 1);
    assert_eq!(grid[2][4], 2);
    assert_eq!(grid[14][SECTION_WIDTH - 1], 1);
    assert_eq!(VectorLayout::row_label(2), Some("POV hand"));
}

// =========================================================================
// Batch decoding
// =========================================================================

#[test]
fn golden_batch_decode_order_and_failure_index() {
    let mut records: Vec<Vec<i8>> = (0..64)
        .map(|i| {
            let mut r = vec![0i8; RECORD_LEN];
            r[33] = i as i8;
            r
        })
        .collect();
    let snaps = StateDecoder::decode_batch(&records).unwrap();
    assert!(snaps.iter().enumerate().all(|(i, s)| s.step_number() == i as i32));

    records[40].truncate(100);
    records[7].push(0);
    match StateDecoder::decode_batch(&records) {
        Err(MjscopeError::InvalidRecord { index, .. }) => assert_eq!(index, 7),
        other => panic!("expected InvalidRecord, got {other:?}"),
    }
}
