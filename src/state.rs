use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::{Board, NUM_COLUMNS, Tableau};
use crate::card::{ACE, Card, DECK_SIZE, KING, SuitCount};
use crate::error::{RuleViolation, SnapshotError, StoreError};
use crate::history::{FlippedCard, MAX_UNDO, Move, MoveHistory};
use crate::rules::{RUN_LENGTH, can_lift_run, is_legal_placement};

/// Sequences needed to win.
pub const SEQUENCES_TO_WIN: u8 = 8;

/// Snapshot of a whole game. Every transition returns a new value and leaves
/// `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    board: Board,
    completed_sequences: u8,
    moves: MoveHistory,
    is_won: bool,
    suit_count: SuitCount,
}

impl GameState {
    /// A game starting from `board` with no history.
    pub fn new(board: Board, suit_count: SuitCount) -> Self {
        Self::from_parts(board, suit_count, 0)
    }

    /// Build a state from raw parts; `is_won` is derived. Not validated.
    pub fn from_parts(board: Board, suit_count: SuitCount, completed_sequences: u8) -> Self {
        GameState {
            board,
            completed_sequences,
            moves: MoveHistory::new(),
            is_won: completed_sequences == SEQUENCES_TO_WIN,
            suit_count,
        }
    }

    /// Shuffle and deal a fresh game; `seed` makes the deal reproducible.
    pub fn deal(suit_count: SuitCount, seed: Option<u64>) -> Self {
        let board = match seed {
            Some(seed) => Board::deal_seeded(suit_count, seed),
            None => Board::deal_random(suit_count),
        };
        Self::new(board, suit_count)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tableau(&self) -> &Tableau {
        &self.board.tableau
    }

    pub fn stock(&self) -> &[Card] {
        &self.board.stock
    }

    pub fn completed_sequences(&self) -> u8 {
        self.completed_sequences
    }

    pub fn moves(&self) -> &MoveHistory {
        &self.moves
    }

    pub fn is_won(&self) -> bool {
        self.is_won
    }

    pub fn suit_count(&self) -> SuitCount {
        self.suit_count
    }

    pub fn can_undo(&self) -> bool {
        !self.moves.is_empty()
    }

    pub fn has_empty_column(&self) -> bool {
        self.board.has_empty_column()
    }

    pub fn can_deal(&self) -> bool {
        !self.board.stock.is_empty() && !self.has_empty_column()
    }

    /// Full rows of ten left in the stock.
    pub fn remaining_deals(&self) -> usize {
        self.board.stock.len() / NUM_COLUMNS
    }

    pub fn can_lift_from(&self, column: usize, card_index: usize) -> bool {
        self.board
            .column(column)
            .is_some_and(|cards| can_lift_run(cards, card_index, self.suit_count))
    }

    /// Columns where `run` could legally be dropped, in column order.
    pub fn valid_destinations(&self, run: &[Card]) -> Vec<usize> {
        self.board
            .tableau
            .iter()
            .enumerate()
            .filter(|(_, column)| is_legal_placement(run, column))
            .map(|(col, _)| col)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Move `run` from `from[from_index..]` onto `to`, clearing a finished
    /// sequence at the destination. Also returns the column that completed.
    pub fn apply_move(
        &self,
        run: &[Card],
        from: usize,
        from_index: usize,
        to: usize,
    ) -> Result<(GameState, Option<usize>), RuleViolation> {
        let mut board = self.board.clone();
        let flipped = board.move_run(run, from, from_index, to, self.suit_count)?;
        let completed = board.take_complete_sequence(to, self.suit_count).is_some();

        let entry = Move::Cards {
            from_column: from,
            from_index,
            to_column: to,
            cards: run.to_vec(),
            flipped_card: flipped.map(|card_index| FlippedCard {
                column: from,
                card_index,
            }),
            completed,
            previous_tableau: self.board.tableau.clone(),
        };
        let next = self.advance(board, u8::from(completed), entry);
        Ok((next, completed.then_some(to)))
    }

    /// Deal a row from the stock, then clear every column that now ends in a
    /// finished sequence. Returns those columns.
    pub fn apply_deal(&self) -> Result<(GameState, Vec<usize>), RuleViolation> {
        let mut board = self.board.clone();
        let dealt = board.deal_row()?;
        let completed_columns: Vec<usize> = (0..NUM_COLUMNS)
            .filter(|&col| board.take_complete_sequence(col, self.suit_count).is_some())
            .collect();

        let entry = Move::Deal {
            dealt,
            completed_columns: completed_columns.clone(),
            previous_tableau: self.board.tableau.clone(),
            previous_stock: self.board.stock.clone(),
        };
        let next = self.advance(board, completed_columns.len() as u8, entry);
        Ok((next, completed_columns))
    }

    /// Restore the position before the latest recorded move. The result is
    /// never won.
    pub fn apply_undo(&self) -> Result<GameState, RuleViolation> {
        let mut moves = self.moves.clone();
        let last = moves.pop().ok_or(RuleViolation::NothingToUndo)?;

        let board = Board {
            tableau: last.previous_tableau().clone(),
            stock: last
                .previous_stock()
                .map_or_else(|| self.board.stock.clone(), <[Card]>::to_vec),
        };
        Ok(GameState {
            board,
            completed_sequences: self
                .completed_sequences
                .saturating_sub(last.sequences_completed()),
            moves,
            is_won: false,
            suit_count: self.suit_count,
        })
    }

    fn advance(&self, board: Board, newly_completed: u8, entry: Move) -> GameState {
        let completed_sequences = self.completed_sequences + newly_completed;
        let mut moves = self.moves.clone();
        moves.push(entry);
        GameState {
            board,
            completed_sequences,
            moves,
            is_won: completed_sequences == SEQUENCES_TO_WIN,
            suit_count: self.suit_count,
        }
    }

    // -------------------------------------------------------------------------
    // Snapshot checks and codec
    // -------------------------------------------------------------------------

    /// Check that this snapshot could have been produced by play.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.completed_sequences > SEQUENCES_TO_WIN {
            return Err(SnapshotError::TooManySequences(self.completed_sequences));
        }
        if self.is_won != (self.completed_sequences == SEQUENCES_TO_WIN) {
            return Err(SnapshotError::WonMismatch(self.completed_sequences));
        }
        if self.moves.len() > MAX_UNDO {
            return Err(SnapshotError::HistoryOverflow(self.moves.len()));
        }

        check_cards(
            &self.board.tableau,
            &self.board.stock,
            self.completed_sequences,
            self.suit_count,
        )?;

        // Replay the undo chain so a bad entry is caught on load, not on undo.
        let mut stock = self.board.stock.as_slice();
        let mut completed = self.completed_sequences;
        for (i, entry) in self.moves.iter().rev().enumerate() {
            let bad = |reason| SnapshotError::BadHistory {
                step: i + 1,
                reason: Box::new(reason),
            };
            completed = completed
                .checked_sub(entry.sequences_completed())
                .ok_or_else(|| bad(SnapshotError::PhantomSequences))?;
            if let Some(previous) = entry.previous_stock() {
                stock = previous;
            }
            check_cards(entry.previous_tableau(), stock, completed, self.suit_count).map_err(bad)?;
        }
        Ok(())
    }

    /// The JSON form lists `tableau` and `stock` at the top level.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&JsonSnapshot::from(self))?)
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let state = GameState::from(serde_json::from_str::<JsonSnapshot>(json)?);
        state.validate()?;
        Ok(state)
    }
}

/// 104 distinct, well-formed cards of the active suits, counting the ones
/// already removed in completed sequences.
fn check_cards(
    tableau: &Tableau,
    stock: &[Card],
    completed: u8,
    suit_count: SuitCount,
) -> Result<(), SnapshotError> {
    let in_play = tableau.iter().map(Vec::len).sum::<usize>() + stock.len();
    let accounted = in_play + RUN_LENGTH * usize::from(completed);
    if accounted != DECK_SIZE {
        return Err(SnapshotError::CardCount(accounted));
    }

    let active = suit_count.active_suits();
    let mut seen = HashSet::with_capacity(DECK_SIZE);
    for card in tableau.iter().flatten().chain(stock) {
        if !(ACE..=KING).contains(&card.rank) {
            return Err(SnapshotError::BadRank {
                id: card.id.0,
                rank: card.rank,
            });
        }
        if !active.contains(&card.suit) {
            return Err(SnapshotError::ForeignSuit {
                id: card.id.0,
                suit_count: suit_count.count(),
            });
        }
        if !seen.insert(card.id) {
            return Err(SnapshotError::DuplicateCard(card.id.0));
        }
    }
    Ok(())
}

/// Flat JSON layout shared with other front ends: the board's fields sit
/// beside the rest of the state instead of under a `board` key.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSnapshot {
    tableau: Tableau,
    stock: Vec<Card>,
    completed_sequences: u8,
    moves: MoveHistory,
    is_won: bool,
    suit_count: SuitCount,
}

impl From<&GameState> for JsonSnapshot {
    fn from(state: &GameState) -> Self {
        JsonSnapshot {
            tableau: state.board.tableau.clone(),
            stock: state.board.stock.clone(),
            completed_sequences: state.completed_sequences,
            moves: state.moves.clone(),
            is_won: state.is_won,
            suit_count: state.suit_count,
        }
    }
}

impl From<JsonSnapshot> for GameState {
    fn from(json: JsonSnapshot) -> Self {
        GameState {
            board: Board {
                tableau: json.tableau,
                stock: json.stock,
            },
            completed_sequences: json.completed_sequences,
            moves: json.moves,
            is_won: json.is_won,
            suit_count: json.suit_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;
    use crate::history::MoveKind;

    fn up(id: u8, rank: u8, suit: Suit) -> Card {
        Card::new(id, rank, suit, true)
    }

    /// Column 0 holds K..2 of spades on a face-down card, column 1 the ace.
    fn nearly_complete() -> GameState {
        let mut board = Board::default();
        board.tableau[0].push(Card::new(100, 7, Suit::Hearts, false));
        board.tableau[0].extend((2..=KING).rev().map(|r| up(r, r, Suit::Spades)));
        board.tableau[1].push(up(1, ACE, Suit::Spades));
        GameState::from_parts(board, SuitCount::Two, 7)
    }

    #[test]
    fn completing_move_clears_run_and_wins() {
        let state = nearly_complete();
        let run = state.tableau()[1].clone();
        let (next, completed) = state.apply_move(&run, 1, 0, 0).unwrap();

        assert_eq!(completed, Some(0));
        assert_eq!(next.completed_sequences(), 8);
        assert!(next.is_won());
        assert_eq!(next.tableau()[0].len(), 1);
        assert!(next.tableau()[0][0].is_face_up);
        assert_eq!(next.moves().last().map(Move::kind), Some(MoveKind::Complete));
        // The original snapshot is untouched.
        assert_eq!(state.tableau()[1].len(), 1);
        assert_eq!(state.completed_sequences(), 7);
    }

    #[test]
    fn undo_after_completion_restores_count() {
        let state = nearly_complete();
        let run = state.tableau()[1].clone();
        let (next, _) = state.apply_move(&run, 1, 0, 0).unwrap();
        let undone = next.apply_undo().unwrap();

        assert_eq!(undone.tableau(), state.tableau());
        assert_eq!(undone.completed_sequences(), 7);
        assert!(!undone.is_won());
        assert!(!undone.can_undo());
        assert_eq!(undone.apply_undo(), Err(RuleViolation::NothingToUndo));
    }

    #[test]
    fn deal_that_completes_is_undone_in_full() {
        let mut board = Board::default();
        board.tableau[3].extend((2..=KING).rev().map(|r| up(r, r, Suit::Spades)));
        for col in (0..NUM_COLUMNS).filter(|&c| c != 3) {
            board.tableau[col].push(up(20 + col as u8, KING, Suit::Spades));
        }
        // Popped from the end: column 0 gets the last card, column 3 the ace.
        board.stock = (0..NUM_COLUMNS)
            .rev()
            .map(|col| {
                let rank = if col == 3 { ACE } else { 5 };
                Card::new(40 + col as u8, rank, Suit::Spades, false)
            })
            .collect();
        let state = GameState::from_parts(board, SuitCount::One, 0);

        let (next, completed) = state.apply_deal().unwrap();
        assert_eq!(completed, vec![3]);
        assert_eq!(next.completed_sequences(), 1);
        assert!(next.stock().is_empty());
        assert!(next.tableau()[3].is_empty());

        let undone = next.apply_undo().unwrap();
        assert_eq!(undone.board(), state.board());
        assert_eq!(undone.completed_sequences(), 0);
    }

    #[test]
    fn fresh_deal_validates_and_round_trips_json() {
        let state = GameState::deal(SuitCount::Four, Some(5));
        assert_eq!(state.validate(), Ok(()));

        let json = state.to_json().unwrap();
        assert!(json.contains("\"suitCount\":4"));
        let back = GameState::from_json(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn validation_catches_lost_cards_and_foreign_suits() {
        let mut state = GameState::deal(SuitCount::One, Some(5));
        state.board.stock.pop();
        assert_eq!(state.validate(), Err(SnapshotError::CardCount(103)));

        let mut state = GameState::deal(SuitCount::One, Some(5));
        state.board.stock[0].suit = Suit::Clubs;
        assert!(matches!(
            state.validate(),
            Err(SnapshotError::ForeignSuit { suit_count: 1, .. })
        ));

        let mut state = GameState::deal(SuitCount::One, Some(5));
        state.is_won = true;
        assert_eq!(state.validate(), Err(SnapshotError::WonMismatch(0)));
    }

    #[test]
    fn json_keeps_tableau_and_stock_at_top_level() {
        let state = GameState::deal(SuitCount::Two, Some(3));
        let value: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(value["tableau"].as_array().map(Vec::len), Some(NUM_COLUMNS));
        assert_eq!(value["stock"].as_array().map(Vec::len), Some(50));
        assert!(value.get("board").is_none());
    }

    #[test]
    fn tampered_history_entry_is_rejected() {
        let (dealt, _) = GameState::deal(SuitCount::One, Some(8)).apply_deal().unwrap();
        let json: serde_json::Value = serde_json::from_str(&dealt.to_json().unwrap()).unwrap();
        assert!(GameState::from_json(&json.to_string()).is_ok());

        let mut lost_card = json.clone();
        lost_card["moves"][0]["deal"]["previousTableau"][0]
            .as_array_mut()
            .unwrap()
            .pop();
        assert!(matches!(
            GameState::from_json(&lost_card.to_string()),
            Err(StoreError::Invalid(SnapshotError::BadHistory { step: 1, ref reason }))
                if **reason == SnapshotError::CardCount(103)
        ));

        let mut phantom = json;
        phantom["moves"][0]["deal"]["completedColumns"] = serde_json::json!([3]);
        assert!(matches!(
            GameState::from_json(&phantom.to_string()),
            Err(StoreError::Invalid(SnapshotError::BadHistory { step: 1, ref reason }))
                if **reason == SnapshotError::PhantomSequences
        ));
    }

    #[test]
    fn undo_chain_of_a_valid_game_validates() {
        let mut state = GameState::deal(SuitCount::Four, Some(21));
        for _ in 0..3 {
            state = state.apply_deal().unwrap().0;
        }
        assert_eq!(state.validate(), Ok(()));
        while state.can_undo() {
            state = state.apply_undo().unwrap();
            assert_eq!(state.validate(), Ok(()));
        }
    }

    #[test]
    fn json_without_suit_count_is_rejected() {
        let state = GameState::deal(SuitCount::One, Some(1));
        let mut value: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("suitCount");
        assert!(GameState::from_json(&value.to_string()).is_err());
        assert!(GameState::from_json("not json").is_err());
    }
}
