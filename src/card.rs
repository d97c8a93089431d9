use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Number of cards in a Spider deck, whatever the suit count.
pub const DECK_SIZE: usize = 104;
/// Number of 13-card sets the deck is built from.
pub const NUM_SETS: usize = 8;

pub const ACE: u8 = 1;
pub const KING: u8 = 13;

const RANK_LABELS: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

/// The four French suits, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    /// All four suits, in canonical order.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

/// How many distinct suits are in play.
///
/// Serialized as the bare number so snapshots carry `"suitCount": 1|2|4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SuitCount {
    #[default]
    One,
    Two,
    Four,
}

impl SuitCount {
    pub fn count(self) -> usize {
        match self {
            SuitCount::One => 1,
            SuitCount::Two => 2,
            SuitCount::Four => 4,
        }
    }

    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(SuitCount::One),
            2 => Some(SuitCount::Two),
            4 => Some(SuitCount::Four),
            _ => None,
        }
    }

    /// Suits dealt for this count: a prefix of [`Suit::ALL`].
    pub fn active_suits(self) -> &'static [Suit] {
        &Suit::ALL[..self.count()]
    }

    /// Multi-suit games only let same-suit runs move or complete.
    pub fn requires_same_suit(self) -> bool {
        self != SuitCount::One
    }
}

impl TryFrom<u8> for SuitCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SuitCount::from_count(value).ok_or_else(|| format!("unsupported suit count {value}"))
    }
}

impl From<SuitCount> for u8 {
    fn from(value: SuitCount) -> Self {
        value.count() as u8
    }
}

/// Stable identity of a card: its position in the unshuffled deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u8);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    /// 1 (Ace) ..= 13 (King).
    pub rank: u8,
    pub suit: Suit,
    pub is_face_up: bool,
}

impl Card {
    pub fn new(id: u8, rank: u8, suit: Suit, is_face_up: bool) -> Self {
        Card {
            id: CardId(id),
            rank,
            suit,
            is_face_up,
        }
    }

    pub fn face_up(self) -> Self {
        Card {
            is_face_up: true,
            ..self
        }
    }

    pub fn face_down(self) -> Self {
        Card {
            is_face_up: false,
            ..self
        }
    }

    /// `self` sits directly on `below` in a descending same-suit run.
    pub fn continues_suited_run(self, below: Card) -> bool {
        below.is_face_up
            && self.is_face_up
            && below.suit == self.suit
            && below.rank.checked_sub(1) == Some(self.rank)
    }

    pub fn rank_label(self) -> &'static str {
        rank_label(self.rank)
    }

    pub fn label(self) -> String {
        format!("{}{}", self.rank_label(), self.suit.symbol())
    }
}

/// Display label for a rank; out-of-range ranks render as `?`.
pub fn rank_label(rank: u8) -> &'static str {
    match rank {
        ACE..=KING => RANK_LABELS[usize::from(rank - 1)],
        _ => "?",
    }
}

/// Build the 104-card Spider deck for `suit_count`, all face down.
///
/// The deck is `8 / k` repetitions of one Ace..King run per active suit.
pub fn create_deck(suit_count: SuitCount) -> Vec<Card> {
    let suits = suit_count.active_suits();
    let repetitions = NUM_SETS / suits.len();
    let mut deck = Vec::with_capacity(DECK_SIZE);

    for _ in 0..repetitions {
        for &suit in suits {
            for rank in ACE..=KING {
                let id = deck.len() as u8;
                deck.push(Card::new(id, rank, suit, false));
            }
        }
    }

    debug_assert_eq!(deck.len(), DECK_SIZE, "Deck must have exactly 104 cards");
    deck
}

/// Return a uniformly shuffled copy of `deck`; the input is left untouched.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    shuffled.shuffle(rng);
    shuffled
}
