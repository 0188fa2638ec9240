//! Tile-type ordinals, suit blocks, and human-readable labels.
//!
//! Every sparse section of a state record is 34 elements wide, one per tile
//! type: three suits of nine (manzu, pinzu, souzu) followed by seven honors.

use std::borrow::Cow;
use std::fmt;

use crate::snapshot::TileCount;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Total number of distinct tile types (0-33).
pub const NUM_TILE_TYPES: usize = 34;

/// Number of tiles per suited category (1-9).
pub const NUM_SUIT_TILES: usize = 9;

// Suit range starts (tile type indices).
pub const MANZU_START: u8 = 0;
pub const PINZU_START: u8 = 9;
pub const SOUZU_START: u8 = 18;
pub const JIHAI_START: u8 = 27;

// Named honor tile indices for readability.
pub const EAST: u8 = 27;
pub const SOUTH: u8 = 28;
pub const WEST: u8 = 29;
pub const NORTH: u8 = 30;
pub const HAKU: u8 = 31;
pub const HATSU: u8 = 32;
pub const CHUN: u8 = 33;

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

/// The four tile categories in Riichi Mahjong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Manzu = 0,
    Pinzu = 1,
    Souzu = 2,
    Jihai = 3,
}

impl Suit {
    /// Returns the starting tile type index for this suit.
    #[inline]
    pub const fn start(self) -> u8 {
        match self {
            Suit::Manzu => MANZU_START,
            Suit::Pinzu => PINZU_START,
            Suit::Souzu => SOUZU_START,
            Suit::Jihai => JIHAI_START,
        }
    }

    /// Short suffix used in tile labels (`"man"`, `"pin"`, `"sou"`).
    /// Honors have no suffix; they are labeled by name.
    #[inline]
    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Suit::Manzu => Some("man"),
            Suit::Pinzu => Some("pin"),
            Suit::Souzu => Some("sou"),
            Suit::Jihai => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TileType newtype
// ---------------------------------------------------------------------------

/// A tile type in the range 0-33. Wraps a `u8` for type safety.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileType(u8);

impl TileType {
    /// Creates a `TileType` if `id` is in range 0..34.
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if id < NUM_TILE_TYPES as u8 {
            Some(TileType(id))
        } else {
            None
        }
    }

    /// Which suit this tile belongs to.
    #[inline]
    pub const fn suit(self) -> Suit {
        match self.0 {
            0..9 => Suit::Manzu,
            9..18 => Suit::Pinzu,
            18..27 => Suit::Souzu,
            _ => Suit::Jihai,
        }
    }

    /// 1-based number within the suit (1-9), or `None` for honor tiles.
    #[inline]
    pub const fn number(self) -> Option<u8> {
        match self.suit() {
            Suit::Jihai => None,
            suit => Some(self.0 - suit.start() + 1),
        }
    }

    /// True for manzu, pinzu, or souzu (not jihai).
    #[inline]
    pub const fn is_suited(self) -> bool {
        self.0 < JIHAI_START
    }
}

impl fmt::Debug for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileType({}={})", self.0, tile_label(self.0))
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tile_label(self.0))
    }
}

// ---------------------------------------------------------------------------
// Ordinal helpers
// ---------------------------------------------------------------------------

/// True if the raw ordinal is a suited tile (0-26).
#[inline]
pub const fn is_suited(tile_type: u8) -> bool {
    tile_type < JIHAI_START
}

/// Suit block of an ordinal: 0 = manzu, 1 = pinzu, 2 = souzu, 3+ = honors
/// and anything beyond.
#[inline]
pub const fn suit_block(tile_type: u8) -> u8 {
    tile_type / NUM_SUIT_TILES as u8
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

const HONOR_NAMES: [&str; 7] = ["East", "South", "West", "North", "Haku", "Hatsu", "Chun"];

/// Human-readable label for a tile ordinal.
///
/// Suited tiles read `"{n}-man"`, `"{n}-pin"`, `"{n}-sou"`; honors use their
/// English/Japanese names. Ordinals outside 0-33 fall back to `"T{n}"`.
pub fn tile_label(tile_type: u8) -> Cow<'static, str> {
    match TileType::new(tile_type) {
        Some(t) => match (t.number(), t.suit().suffix()) {
            (Some(n), Some(suffix)) => Cow::Owned(format!("{n}-{suffix}")),
            _ => Cow::Borrowed(HONOR_NAMES[(tile_type - Suit::Jihai.start()) as usize]),
        },
        None => Cow::Owned(format!("T{tile_type}")),
    }
}

/// Compact one-line rendering of a sparse list: `"T5(3), T7(1)"`.
///
/// When `max_show` is nonzero and the list is longer, only the first
/// `max_show` entries are printed, followed by `" ... and {k} more types"`.
/// A `max_show` of 0 prints everything.
pub fn tiles_to_string(tiles: &[TileCount], max_show: usize) -> String {
    if tiles.is_empty() {
        return "no tiles".to_string();
    }
    let render = |list: &[TileCount]| {
        list.iter()
            .map(|t| format!("T{}({})", t.tile_type, t.count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    if max_show > 0 && tiles.len() > max_show {
        let hidden = tiles.len() - max_show;
        format!("{} ... and {hidden} more types", render(&tiles[..max_show]))
    } else {
        render(tiles)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_type_new_valid() {
        for i in 0..34u8 {
            assert!(TileType::new(i).is_some(), "TileType::new({i}) should be Some");
        }
        assert!(TileType::new(34).is_none());
        assert!(TileType::new(255).is_none());
    }

    #[test]
    fn suit_classification() {
        for i in 0..9u8 {
            assert_eq!(TileType::new(i).unwrap().suit(), Suit::Manzu, "tile {i}");
        }
        for i in 9..18u8 {
            assert_eq!(TileType::new(i).unwrap().suit(), Suit::Pinzu, "tile {i}");
        }
        for i in 18..27u8 {
            assert_eq!(TileType::new(i).unwrap().suit(), Suit::Souzu, "tile {i}");
        }
        for i in 27..34u8 {
            let t = TileType::new(i).unwrap();
            assert_eq!(t.suit(), Suit::Jihai, "tile {i}");
            assert!(!t.is_suited());
        }
    }

    #[test]
    fn numbers_count_from_suit_start() {
        assert_eq!(TileType::new(MANZU_START).unwrap().number(), Some(1));
        assert_eq!(TileType::new(PINZU_START + 4).unwrap().number(), Some(5));
        assert_eq!(TileType::new(SOUZU_START + 8).unwrap().number(), Some(9));
        assert_eq!(TileType::new(CHUN).unwrap().number(), None);
        assert_eq!(Suit::Souzu.start(), 18);
    }

    #[test]
    fn suit_blocks_split_at_nine() {
        assert_eq!(suit_block(8), 0);
        assert_eq!(suit_block(9), 1);
        assert_eq!(suit_block(17), 1);
        assert_eq!(suit_block(18), 2);
        assert_eq!(suit_block(26), 2);
        assert!(is_suited(26));
        assert!(!is_suited(EAST));
    }

    #[test]
    fn suited_labels() {
        assert_eq!(tile_label(0), "1-man");
        assert_eq!(tile_label(8), "9-man");
        assert_eq!(tile_label(10), "2-pin");
        assert_eq!(tile_label(22), "5-sou");
    }

    #[test]
    fn honor_labels() {
        assert_eq!(tile_label(EAST), "East");
        assert_eq!(tile_label(NORTH), "North");
        assert_eq!(tile_label(HAKU), "Haku");
        assert_eq!(tile_label(HATSU), "Hatsu");
        assert_eq!(tile_label(CHUN), "Chun");
    }

    #[test]
    fn out_of_range_label_is_generic() {
        assert_eq!(tile_label(34), "T34");
        assert_eq!(tile_label(200), "T200");
    }

    #[test]
    fn tile_type_display() {
        assert_eq!(format!("{}", TileType::new(9).unwrap()), "1-pin");
        assert_eq!(format!("{}", TileType::new(SOUTH).unwrap()), "South");
        assert_eq!(format!("{:?}", TileType::new(WEST).unwrap()), "TileType(29=West)");
    }

    #[test]
    fn tiles_to_string_truncates() {
        let tiles = [TileCount::new(5, 3), TileCount::new(7, 1), TileCount::new(30, 2)];
        assert_eq!(tiles_to_string(&tiles, 10), "T5(3), T7(1), T30(2)");
        assert_eq!(tiles_to_string(&tiles, 2), "T5(3), T7(1) ... and 1 more types");
        assert_eq!(tiles_to_string(&tiles, 1), "T5(3) ... and 2 more types");
        assert_eq!(tiles_to_string(&tiles, 3), "T5(3), T7(1), T30(2)");
        assert_eq!(tiles_to_string(&[], 5), "no tiles");
    }

    #[test]
    fn tiles_to_string_zero_means_unlimited() {
        let tiles: Vec<TileCount> = (0..25u8).map(|t| TileCount::new(t, 1)).collect();
        let text = tiles_to_string(&tiles, 0);
        assert!(!text.contains("more types"));
        assert!(text.starts_with("T0(1), T1(1)"));
        assert!(text.ends_with("T24(1)"));
    }
}
