use thiserror::Error;

/// Why a command was turned into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("source and destination columns are the same")]
    SameColumn,
    #[error("column {0} does not exist")]
    ColumnOutOfRange(usize),
    #[error("run does not match the source column")]
    RunMismatch,
    #[error("run cannot be lifted")]
    RunNotLiftable,
    #[error("run cannot be placed on the destination column")]
    IllegalPlacement,
    #[error("stock is empty")]
    StockEmpty,
    #[error("column {0} is empty; fill it before dealing")]
    EmptyColumn(usize),
    #[error("nothing to undo")]
    NothingToUndo,
}

/// A snapshot that cannot be a reachable game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("card {id} has rank {rank}")]
    BadRank { id: u8, rank: u8 },
    #[error("card {id} has a suit outside the {suit_count}-suit deck")]
    ForeignSuit { id: u8, suit_count: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(u8),
    #[error("{0} cards accounted for, expected 104")]
    CardCount(usize),
    #[error("{0} completed sequences, at most 8 allowed")]
    TooManySequences(u8),
    #[error("won flag disagrees with {0} completed sequences")]
    WonMismatch(u8),
    #[error("move history holds {0} entries")]
    HistoryOverflow(usize),
    #[error("history entry removes sequences that were never completed")]
    PhantomSequences,
    #[error("undo step {step} would restore a bad position: {reason}")]
    BadHistory {
        step: usize,
        reason: Box<SnapshotError>,
    },
}

/// Failure to read or write the persisted snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine a data directory")]
    NoProjectDir,
    #[error("snapshot file is truncated")]
    Truncated,
    #[error("snapshot signature mismatch")]
    Signature,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] SnapshotError),
}
