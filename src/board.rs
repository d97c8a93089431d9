use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, DECK_SIZE, SuitCount, create_deck, shuffle_deck};
use crate::error::RuleViolation;
use crate::rules::{RUN_LENGTH, can_lift_run, find_complete_sequence, is_legal_placement};

/// Number of tableau columns.
pub const NUM_COLUMNS: usize = 10;
/// Cards dealt into the tableau before play starts.
pub const INITIAL_TABLEAU_CARDS: usize = 54;

/// Ten columns; index 0 of each column is the bottom card.
pub type Tableau = [Vec<Card>; NUM_COLUMNS];

/// Tableau plus the face-down stock. Plain data; the rules live in
/// [`crate::rules`] and the state machine in [`crate::state`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    pub tableau: Tableau,
    /// Undealt cards; deals take from the end.
    pub stock: Vec<Card>,
}

/// Columns 0-3 start with six cards, the rest with five.
fn initial_column_len(col: usize) -> usize {
    if col < 4 { 6 } else { 5 }
}

impl Board {
    // -------------------------------------------------------------------------
    // Construction / Dealing
    // -------------------------------------------------------------------------

    /// Deal a fresh shuffled board using OS entropy.
    pub fn deal_random(suit_count: SuitCount) -> Self {
        let mut rng = rand::rngs::SmallRng::from_os_rng();
        Self::deal_from_deck(shuffle_deck(&create_deck(suit_count), &mut rng))
    }

    /// Deal a board from a specific seed (useful for reproducible games).
    pub fn deal_seeded(suit_count: SuitCount, seed: u64) -> Self {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
        Self::deal_from_deck(shuffle_deck(&create_deck(suit_count), &mut rng))
    }

    /// Lay out an already-ordered deck: 54 cards left to right into the
    /// columns, only each column's last card face up, the rest into the stock.
    pub fn deal_from_deck(deck: Vec<Card>) -> Self {
        debug_assert_eq!(deck.len(), DECK_SIZE, "Need exactly 104 cards to deal");

        let mut cards = deck.into_iter();
        let mut tableau: Tableau = Default::default();
        for (col, column) in tableau.iter_mut().enumerate() {
            let len = initial_column_len(col);
            column.extend(
                cards
                    .by_ref()
                    .take(len)
                    .enumerate()
                    .map(|(i, card)| if i + 1 == len { card.face_up() } else { card.face_down() }),
            );
        }
        let stock = cards.map(Card::face_down).collect();

        Board { tableau, stock }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn column(&self, col: usize) -> Option<&[Card]> {
        self.tableau.get(col).map(Vec::as_slice)
    }

    /// Returns the top card of a column, if any.
    pub fn column_top(&self, col: usize) -> Option<Card> {
        self.tableau.get(col)?.last().copied()
    }

    pub fn has_empty_column(&self) -> bool {
        self.tableau.iter().any(Vec::is_empty)
    }

    pub fn card_count(&self) -> usize {
        self.tableau.iter().map(Vec::len).sum::<usize>() + self.stock.len()
    }

    // -------------------------------------------------------------------------
    // Move Execution
    // -------------------------------------------------------------------------

    /// Move `run`, which must be exactly `tableau[src][start..]`, onto `dst`.
    ///
    /// On success returns the index of a card flipped face up in `src`.
    pub fn move_run(
        &mut self,
        run: &[Card],
        src: usize,
        start: usize,
        dst: usize,
        suit_count: SuitCount,
    ) -> Result<Option<usize>, RuleViolation> {
        if src == dst {
            return Err(RuleViolation::SameColumn);
        }
        for col in [src, dst] {
            if col >= NUM_COLUMNS {
                return Err(RuleViolation::ColumnOutOfRange(col));
            }
        }

        let source = &self.tableau[src];
        let Some(tail) = source.get(start..).filter(|tail| !tail.is_empty() && *tail == run) else {
            return Err(RuleViolation::RunMismatch);
        };
        if !can_lift_run(source, start, suit_count) {
            return Err(RuleViolation::RunNotLiftable);
        }
        if !is_legal_placement(tail, &self.tableau[dst]) {
            return Err(RuleViolation::IllegalPlacement);
        }

        let moved = self.tableau[src].split_off(start);
        self.tableau[dst].extend(moved);
        Ok(self.flip_top_if_needed(src))
    }

    /// Deal one face-up card per column, left to right, until the stock runs
    /// out. Returns the number of cards dealt.
    pub fn deal_row(&mut self) -> Result<usize, RuleViolation> {
        if self.stock.is_empty() {
            return Err(RuleViolation::StockEmpty);
        }
        if let Some(col) = self.tableau.iter().position(Vec::is_empty) {
            return Err(RuleViolation::EmptyColumn(col));
        }

        let mut dealt = 0;
        for column in self.tableau.iter_mut() {
            let Some(card) = self.stock.pop() else {
                break;
            };
            column.push(card.face_up());
            dealt += 1;
        }
        Ok(dealt)
    }

    /// Remove a finished King..Ace run from `col`, if there is one, and
    /// expose the card beneath it.
    pub fn take_complete_sequence(&mut self, col: usize, suit_count: SuitCount) -> Option<Vec<Card>> {
        let column = self.tableau.get_mut(col)?;
        let start = find_complete_sequence(column, suit_count)?;
        let removed: Vec<Card> = column.drain(start..start + RUN_LENGTH).collect();
        self.flip_top_if_needed(col);
        Some(removed)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn flip_top_if_needed(&mut self, col: usize) -> Option<usize> {
        let column = &mut self.tableau[col];
        let index = column.len().checked_sub(1)?;
        let top = &mut column[index];
        if top.is_face_up {
            return None;
        }
        top.is_face_up = true;
        Some(index)
    }
}
