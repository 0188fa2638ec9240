//! Comparator-oriented projection of a [`StateSnapshot`].

use serde::{Deserialize, Serialize};

use crate::layout::NUM_PLAYERS;
use crate::snapshot::{SparseCounts, StateSnapshot, TileCount};

/// Only the fields the sequential comparator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub round_wind: i32,
    pub dealer: i32,
    pub pov_player: i32,
    pub step_number: i32,
    pub wall_tiles: i32,
    pub hand_tiles: i64,
    pub hand_detail: Vec<TileCount>,
    pub discards_detail: [Vec<TileCount>; NUM_PLAYERS],
    pub pond_detail: [Vec<TileCount>; NUM_PLAYERS],
    pub melds_detail: [Vec<TileCount>; NUM_PLAYERS],
}

impl SnapshotSummary {
    /// Project a decoded snapshot. Total; never fails.
    pub fn project(snapshot: &StateSnapshot) -> Self {
        let detail = |sections: &[SparseCounts; NUM_PLAYERS]| -> [Vec<TileCount>; NUM_PLAYERS] {
            std::array::from_fn(|p| sections[p].tiles.clone())
        };
        Self {
            round_wind: snapshot.metadata.round_wind,
            dealer: snapshot.metadata.dealer,
            pov_player: snapshot.metadata.pov_player,
            step_number: snapshot.control.step_number,
            wall_tiles: snapshot.metadata.wall_tiles,
            hand_tiles: snapshot.hand.total_tiles,
            hand_detail: snapshot.hand.tiles.clone(),
            discards_detail: detail(&snapshot.discards),
            pond_detail: detail(&snapshot.pond),
            melds_detail: detail(&snapshot.melds),
        }
    }

    /// Number of distinct discarded tile types summed over all players.
    pub fn discard_entry_count(&self) -> usize {
        self.discards_detail.iter().map(Vec::len).sum()
    }

    /// Discard list of `player`, or `None` when the id is outside 0..4.
    pub fn discards_of(&self, player: i32) -> Option<&[TileCount]> {
        usize::try_from(player)
            .ok()
            .and_then(|p| self.discards_detail.get(p))
            .map(Vec::as_slice)
    }
}

impl From<&StateSnapshot> for SnapshotSummary {
    fn from(snapshot: &StateSnapshot) -> Self {
        Self::project(snapshot)
    }
}
