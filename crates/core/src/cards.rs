use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "S" | "s" | "♠" => Some(Suit::Spades),
            "H" | "h" | "♥" => Some(Suit::Hearts),
            "C" | "c" | "♣" => Some(Suit::Clubs),
            "D" | "d" | "♦" => Some(Suit::Diamonds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let rank = match value.to_ascii_uppercase().as_str() {
            "A" | "1" => Rank::Ace,
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" | "T" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            _ => return None,
        };
        Some(rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("empty card text")]
    Empty,
    #[error("unknown rank '{0}'")]
    UnknownRank(String),
    #[error("unknown suit '{0}'")]
    UnknownSuit(String),
}

/// A rank and suit without identity: one cell of the picker grid, or the
/// text form of a card in scripts and advisor payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardFace {
    pub rank: Rank,
    pub suit: Suit,
}

impl CardFace {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// ASCII form, e.g. `10H` or `KS`.
    pub fn code(&self) -> String {
        format!("{}{}", self.rank.label(), self.suit.letter())
    }
}

impl fmt::Display for CardFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

impl FromStr for CardFace {
    type Err = CardParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let Some((split, last)) = text.char_indices().last() else {
            return Err(CardParseError::Empty);
        };
        let (rank_text, suit_text) = (&text[..split], &text[split..]);
        let suit = Suit::parse(suit_text)
            .ok_or_else(|| CardParseError::UnknownSuit(last.to_string()))?;
        let rank =
            Rank::parse(rank_text).ok_or_else(|| CardParseError::UnknownRank(rank_text.into()))?;
        Ok(Self { rank, suit })
    }
}

/// Number of cells in the picker grid.
pub const PICKER_CELLS: usize = 52;

/// Every rank and suit combination, suits outer and ranks inner.
pub fn picker_grid() -> impl Iterator<Item = CardFace> {
    Suit::ALL
        .into_iter()
        .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| CardFace::new(rank, suit)))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A card instance placed on the table. Only [`CardIds::mint`] creates one,
/// so two cards with the same face are still distinct.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct Card {
    rank: Rank,
    suit: Suit,
    id: CardId,
}

impl Card {
    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn face(&self) -> CardFace {
        CardFace::new(self.rank, self.suit)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.face().fmt(f)
    }
}

/// Monotonic card identity allocator. Ids are never handed out twice.
#[derive(Debug, Default)]
pub struct CardIds {
    next: u64,
}

impl CardIds {
    pub fn mint(&mut self, face: CardFace) -> Card {
        self.next += 1;
        Card {
            rank: face.rank,
            suit: face.suit,
            id: CardId(self.next),
        }
    }
}
