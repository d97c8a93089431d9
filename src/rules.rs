//! Pure Spider rule predicates: which runs may be lifted, where they may
//! land, and whether a column holds a finished King..Ace sequence.

use crate::card::{ACE, Card, KING, SuitCount};

/// Cards in a completed King..Ace sequence.
pub const RUN_LENGTH: usize = 13;

/// Can the cards `column[start..]` be picked up together?
///
/// Every card must be face up and descend by one towards the top. Multi-suit
/// games additionally require the whole run to share one suit.
pub fn can_lift_run(column: &[Card], start: usize, suit_count: SuitCount) -> bool {
    let Some(run) = column.get(start..) else {
        return false;
    };
    if run.is_empty() || !run.iter().all(|c| c.is_face_up) {
        return false;
    }
    run.windows(2).all(|pair| {
        let (lower, upper) = (pair[0], pair[1]);
        lower.rank.checked_sub(1) == Some(upper.rank)
            && (!suit_count.requires_same_suit() || lower.suit == upper.suit)
    })
}

/// May `run` be dropped on `target`? Suit never matters for placement.
pub fn is_legal_placement(run: &[Card], target: &[Card]) -> bool {
    let Some(bottom) = run.first() else {
        return false;
    };
    if !(ACE..=KING).contains(&bottom.rank) {
        return false;
    }
    match target.last() {
        None => true,
        Some(top) => top.rank.checked_sub(1) == Some(bottom.rank),
    }
}

/// Offset of a complete King..Ace run in `column`, scanning from the top down.
pub fn find_complete_sequence(column: &[Card], suit_count: SuitCount) -> Option<usize> {
    let last_start = column.len().checked_sub(RUN_LENGTH)?;
    (0..=last_start)
        .rev()
        .find(|&start| is_complete_run(&column[start..start + RUN_LENGTH], suit_count))
}

fn is_complete_run(run: &[Card], suit_count: SuitCount) -> bool {
    let suit = run[0].suit;
    run.iter().enumerate().all(|(i, card)| {
        card.is_face_up
            && usize::from(card.rank) == usize::from(KING) - i
            && (!suit_count.requires_same_suit() || card.suit == suit)
    }) && run[RUN_LENGTH - 1].rank == ACE
}
