use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

/// Ink used when a face-up card is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardColor {
    Red,
    Black,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        }
    }

    pub fn code(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    pub fn color(self) -> CardColor {
        match self {
            Suit::Hearts | Suit::Diamonds => CardColor::Red,
            Suit::Clubs | Suit::Spades => CardColor::Black,
        }
    }

    fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'C' => Some(Suit::Clubs),
            'D' => Some(Suit::Diamonds),
            'H' => Some(Suit::Hearts),
            'S' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
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
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
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
        Rank::Ace,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Rank::ALL.iter().copied().find(|rank| rank.value() == value)
    }

    pub fn code(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// Rank as printed on a card face; tens read `10`.
    pub fn face_label(self) -> &'static str {
        match self {
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
            Rank::Ace => "A",
        }
    }

    fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        Rank::ALL.iter().copied().find(|rank| rank.code() == code)
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.face_label())
    }
}

/// A playing card as carried on the wire.
///
/// The server writes codes suit first (`"HA"`, `"DT"`). Rank-first codes (`"AH"`) parse
/// as well since the rank and suit alphabets do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank_value(&self) -> u8 {
        self.rank.value()
    }

    /// Human-facing label such as `10♥`.
    pub fn label(&self) -> String {
        format!("{}{}", self.rank.face_label(), self.suit.symbol())
    }

    pub fn color(&self) -> CardColor {
        self.suit.color()
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.suit.code(), self.rank.code())
    }
}

impl FromStr for Card {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(format!("Invalid card code '{s}'"));
        };

        if let (Some(suit), Some(rank)) = (Suit::from_code(first), Rank::from_code(second)) {
            return Ok(Card::new(rank, suit));
        }
        if let (Some(rank), Some(suit)) = (Rank::from_code(first), Suit::from_code(second)) {
            return Ok(Card::new(rank, suit));
        }
        Err(format!("Invalid card code '{s}'"))
    }
}

pub fn standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suit_first_and_rank_first_codes() {
        let ace_hearts = Card::new(Rank::Ace, Suit::Hearts);
        assert_eq!("HA".parse::<Card>(), Ok(ace_hearts));
        assert_eq!("AH".parse::<Card>(), Ok(ace_hearts));
        assert_eq!("dt".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Diamonds)));
    }

    #[test]
    fn rejects_malformed_codes() {
        for code in ["", "H", "HAX", "H1", "XA", "10H", "HH"] {
            assert!(code.parse::<Card>().is_err(), "{code} should not parse");
        }
    }

    #[test]
    fn labels_tens_and_colours_suits() {
        let ten = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(ten.label(), "10♥");
        assert_eq!(ten.color(), CardColor::Red);
        assert_eq!(Card::new(Rank::Two, Suit::Spades).color(), CardColor::Black);
    }

    #[test]
    fn wire_form_is_suit_first() {
        let card = Card::new(Rank::King, Suit::Clubs);
        assert_eq!(card.to_string(), "CK");
        assert_eq!(serde_json::to_string(&card).unwrap(), "\"CK\"");
        let decoded: Card = serde_json::from_str("\"CK\"").unwrap();
        assert_eq!(decoded, card);
    }

    #[test]
    fn deck_has_fifty_two_distinct_cards() {
        let deck = standard_deck();
        assert_eq!(deck.len(), 52);
        let unique: std::collections::HashSet<_> = deck.iter().collect();
        assert_eq!(unique.len(), 52);
    }
}
