//! mjscope decode-and-diff engine
//!
//! Decodes fixed-layout 510-element state records from four-player Riichi
//! Mahjong games into typed snapshots, compares temporally ordered batches
//! pair by pair, and aggregates corpus-wide discard and meld statistics.

pub mod errors;
pub mod tile;
pub mod layout;
pub mod snapshot;
pub mod decoder;
pub mod summary;
pub mod compare;
pub mod stats;
pub mod config;
pub mod report;
pub mod session;

pub use compare::{BasicComparison, ConsolidatedSummary, SequentialComparator, SequentialDiff, TileDiff};
pub use config::AnalysisConfig;
pub use decoder::{decode, StateDecoder};
pub use errors::{MjscopeError, MjscopeResult};
pub use layout::{Field, VectorLayout, RECORD_LEN};
pub use report::AnalysisReport;
pub use session::AnalysisSession;
pub use snapshot::{SparseCounts, StateSnapshot, TileCount};
pub use stats::{AggregateStatistics, StatsAccumulator, StatsOptions};
pub use summary::SnapshotSummary;
