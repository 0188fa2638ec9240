//! Record decoder: 510-element vector -> [`StateSnapshot`].
//!
//! Decoding reads every field at its fixed offset and performs no domain
//! validation on the values. The only failure is a length mismatch.

use rayon::prelude::*;

use crate::errors::{MjscopeError, MjscopeResult};
use crate::layout::{Field, VectorLayout, NUM_PLAYERS, NUM_RIICHI_SLOTS, RECORD_LEN};
use crate::snapshot::{Control, DoraInfo, HandInfo, Metadata, SparseCounts, StateSnapshot};

/// Stateless decoder over the [`VectorLayout`] offset table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateDecoder;

impl StateDecoder {
    /// Decode one record.
    ///
    /// Accepts any element type that widens losslessly into `i32`, so int8
    /// buffers from storage decode without an intermediate copy.
    pub fn decode<T>(record: &[T]) -> MjscopeResult<StateSnapshot>
    where
        T: Copy + Into<i32>,
    {
        if record.len() != RECORD_LEN {
            return Err(MjscopeError::InvalidLength {
                expected: RECORD_LEN,
                actual: record.len(),
            });
        }
        let reader = RecordReader { record };

        Ok(StateSnapshot {
            metadata: reader.metadata(),
            control: reader.control(),
            dora: reader.dora(),
            hand: HandInfo::from(reader.section(Field::Hand, None)),
            melds: reader.per_player(Field::Melds),
            discards: reader.per_player(Field::Discards),
            pond: reader.per_player(Field::Pond),
        })
    }

    /// Decode a batch in parallel on the current rayon pool.
    ///
    /// Output order equals input order. On failure the lowest failing index
    /// is reported.
    pub fn decode_batch<R, T>(records: &[R]) -> MjscopeResult<Vec<StateSnapshot>>
    where
        R: AsRef<[T]> + Sync,
        T: Copy + Into<i32> + Sync,
    {
        let results: Vec<MjscopeResult<StateSnapshot>> = records
            .par_iter()
            .map(|record| Self::decode(record.as_ref()))
            .collect();

        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                result.map_err(|err| MjscopeError::InvalidRecord {
                    index,
                    source: Box::new(err),
                })
            })
            .collect()
    }
}

/// Convenience: decode one record with [`StateDecoder`].
pub fn decode<T>(record: &[T]) -> MjscopeResult<StateSnapshot>
where
    T: Copy + Into<i32>,
{
    StateDecoder::decode(record)
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

/// Borrowed, length-checked record.
struct RecordReader<'a, T> {
    record: &'a [T],
}

impl<T> RecordReader<'_, T>
where
    T: Copy + Into<i32>,
{
    #[inline]
    fn at(&self, offset: usize) -> i32 {
        self.record[offset].into()
    }

    #[inline]
    fn scalar(&self, field: Field) -> i32 {
        self.at(VectorLayout::offset(field))
    }

    fn metadata(&self) -> Metadata {
        let scores_start = VectorLayout::offset(Field::Scores);
        let riichi_start = VectorLayout::offset(Field::RiichiStatus);
        Metadata {
            round_wind: self.scalar(Field::RoundWind),
            dealer: self.scalar(Field::Dealer),
            pov_player: self.scalar(Field::PovPlayer),
            honba_sticks: self.scalar(Field::HonbaSticks),
            riichi_sticks: self.scalar(Field::RiichiSticks),
            wall_tiles: self.scalar(Field::WallTiles),
            scores: std::array::from_fn::<_, NUM_PLAYERS, _>(|i| self.at(scores_start + i)),
            riichi_status: std::array::from_fn::<_, NUM_RIICHI_SLOTS, _>(|i| {
                self.at(riichi_start + i)
            }),
        }
    }

    fn control(&self) -> Control {
        Control {
            round_number: self.scalar(Field::RoundNumber),
            step_number: self.scalar(Field::StepNumber),
        }
    }

    /// Dora flags are expected to be 0/1; only exact 1s count as flagged.
    fn dora(&self) -> DoraInfo {
        let (start, end) = Field::DoraFlags.span();
        let all_dora: Vec<u8> = (start..end)
            .filter(|&offset| self.at(offset) == 1)
            .map(|offset| (offset - start) as u8)
            .collect();
        DoraInfo {
            active_dora: all_dora.first().copied(),
            all_dora,
        }
    }

    fn section(&self, field: Field, player: Option<usize>) -> SparseCounts {
        match VectorLayout::range_of(field, player) {
            Some(range) => SparseCounts::from_section(self.record[range].iter().map(|&v| v.into())),
            None => SparseCounts::default(),
        }
    }

    fn per_player(&self, field: Field) -> [SparseCounts; NUM_PLAYERS] {
        std::array::from_fn(|player| self.section(field, Some(player)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
