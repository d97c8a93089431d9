use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::Tableau;
use crate::card::Card;

/// Undo depth; older entries are evicted first.
pub const MAX_UNDO: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Move,
    Deal,
    /// A move whose destination finished a King..Ace sequence.
    Complete,
}

/// A card turned face up because the cards above it left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlippedCard {
    pub column: usize,
    pub card_index: usize,
}

/// One undoable step, carrying the state needed to reverse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Move {
    #[serde(rename_all = "camelCase")]
    Cards {
        from_column: usize,
        from_index: usize,
        to_column: usize,
        cards: Vec<Card>,
        flipped_card: Option<FlippedCard>,
        completed: bool,
        previous_tableau: Tableau,
    },
    #[serde(rename_all = "camelCase")]
    Deal {
        dealt: usize,
        completed_columns: Vec<usize>,
        previous_tableau: Tableau,
        previous_stock: Vec<Card>,
    },
}

impl Move {
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::Cards { completed: true, .. } => MoveKind::Complete,
            Move::Cards { .. } => MoveKind::Move,
            Move::Deal { .. } => MoveKind::Deal,
        }
    }

    pub fn previous_tableau(&self) -> &Tableau {
        match self {
            Move::Cards { previous_tableau, .. } | Move::Deal { previous_tableau, .. } => {
                previous_tableau
            }
        }
    }

    pub fn previous_stock(&self) -> Option<&[Card]> {
        match self {
            Move::Deal { previous_stock, .. } => Some(previous_stock),
            Move::Cards { .. } => None,
        }
    }

    /// Sequences this step removed from the tableau.
    pub fn sequences_completed(&self) -> u8 {
        match self {
            Move::Cards { completed, .. } => u8::from(*completed),
            Move::Deal {
                completed_columns, ..
            } => completed_columns.len() as u8,
        }
    }
}

/// Fixed-capacity ring of the most recent moves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveHistory {
    entries: VecDeque<Move>,
}

impl MoveHistory {
    pub fn new() -> Self {
        MoveHistory {
            entries: VecDeque::with_capacity(MAX_UNDO),
        }
    }

    /// Record `entry`, dropping the oldest one once full.
    pub fn push(&mut self, entry: Move) {
        if self.entries.len() == MAX_UNDO {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<Move> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&Move> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Move> {
        self.entries.iter()
    }
}
