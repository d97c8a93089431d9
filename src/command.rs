use serde::{Deserialize, Serialize};

use crate::card::{Card, SuitCount};
use crate::error::RuleViolation;

/// Every state-changing request a presentation layer can make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    /// Throw the current game away and deal a new one.
    #[serde(rename_all = "camelCase")]
    NewGame { suit_count: SuitCount },
    /// Move a dragged run. `run` must be the cards at
    /// `from_column[from_index..]`.
    #[serde(rename_all = "camelCase")]
    MoveCards {
        run: Vec<Card>,
        from_column: usize,
        from_index: usize,
        to_column: usize,
    },
    /// Move whatever run currently sits at `from_column[from_index..]`.
    #[serde(rename_all = "camelCase")]
    MoveRun {
        from_column: usize,
        from_index: usize,
        to_column: usize,
    },
    DealFromStock,
    Undo,
}

/// What a dispatched [`Command`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NewGame,
    /// Cards moved; `completed` names the column that finished a sequence.
    Moved { completed: Option<usize> },
    /// A row was dealt; `completed` lists columns that finished sequences.
    Dealt { completed: Vec<usize> },
    Undone,
    /// Nothing changed.
    Rejected(RuleViolation),
}

impl Outcome {
    pub fn changed_state(&self) -> bool {
        !matches!(self, Outcome::Rejected(_))
    }
}
