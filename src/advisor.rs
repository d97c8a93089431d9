//! Move suggestions for the hint and joker buttons.
//!
//! Every liftable run is tried against every legal destination and scored;
//! the best-scoring candidate wins, earliest in scan order on ties.

use serde::{Deserialize, Serialize};

use crate::card::{Card, KING};
use crate::rules::{can_lift_run, is_legal_placement};
use crate::state::GameState;

const REVEAL_BONUS: i32 = 100;
const SAME_SUIT_BONUS: i32 = 60;
const RUN_LENGTH_WEIGHT: i32 = 3;
const SUIT_BREAK_PENALTY: i32 = 20;
const KING_TO_EMPTY_REVEAL_BONUS: i32 = 40;
const KING_TO_EMPTY_BONUS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub from_column: usize,
    pub from_index: usize,
    pub to_column: usize,
    pub score: i32,
}

/// Best scored move on the current tableau, if any move is worth making.
pub fn find_interesting_move(state: &GameState) -> Option<Suggestion> {
    let tableau = state.tableau();
    let suit_count = state.suit_count();
    let mut best: Option<Suggestion> = None;

    for (from_column, column) in tableau.iter().enumerate() {
        for from_index in 0..column.len() {
            if !can_lift_run(column, from_index, suit_count) {
                continue;
            }
            for (to_column, target) in tableau.iter().enumerate() {
                if to_column == from_column || !is_legal_placement(&column[from_index..], target) {
                    continue;
                }
                let Some(score) = score_candidate(column, from_index, target) else {
                    continue;
                };
                if best.is_none_or(|b| score > b.score) {
                    best = Some(Suggestion {
                        from_column,
                        from_index,
                        to_column,
                        score,
                    });
                }
            }
        }
    }
    best
}

/// First column the run at `from[from_index..]` may be dropped on.
pub fn first_legal_destination(state: &GameState, from: usize, from_index: usize) -> Option<usize> {
    let column = state.tableau().get(from)?;
    if !can_lift_run(column, from_index, state.suit_count()) {
        return None;
    }
    let run = &column[from_index..];
    state
        .tableau()
        .iter()
        .enumerate()
        .find(|&(to, target)| to != from && is_legal_placement(run, target))
        .map(|(to, _)| to)
}

/// Score moving `column[from_index..]` onto `target`; `None` rejects it.
fn score_candidate(column: &[Card], from_index: usize, target: &[Card]) -> Option<i32> {
    let run = &column[from_index..];
    let bottom = run[0];
    let below = from_index.checked_sub(1).map(|i| column[i]);
    let reveals = below.is_some_and(|c| !c.is_face_up);

    if target.is_empty() {
        // A whole column moved into an empty one would just bounce between
        // the two empty columns on every later suggestion.
        if from_index == 0 || (bottom.rank != KING && !reveals) {
            return None;
        }
    }

    let same_suit = target.last().is_some_and(|top| top.suit == bottom.suit);
    let projected = run.len() + suited_chain_below(bottom, target);

    let well_placed = below.is_some_and(|c| bottom.continues_suited_run(c));
    if well_placed {
        let current = run.len() + suited_chain_below(bottom, &column[..from_index]);
        if !same_suit || projected <= current {
            return None;
        }
    }

    let mut score = 0;
    if reveals {
        score += REVEAL_BONUS;
    }
    if same_suit {
        score += SAME_SUIT_BONUS + RUN_LENGTH_WEIGHT * projected as i32;
    } else if !reveals && !target.is_empty() {
        score -= SUIT_BREAK_PENALTY;
    }
    if target.is_empty() && bottom.rank == KING {
        score += if reveals {
            KING_TO_EMPTY_REVEAL_BONUS
        } else {
            KING_TO_EMPTY_BONUS
        };
    }

    (score > 0).then_some(score)
}

/// How many cards of `pile`, walking down from its top, extend a same-suit
/// descending run ending in `bottom`.
fn suited_chain_below(bottom: Card, pile: &[Card]) -> usize {
    let mut upper = bottom;
    let mut len = 0;
    for &card in pile.iter().rev() {
        if !upper.continues_suited_run(card) {
            break;
        }
        upper = card;
        len += 1;
    }
    len
}
