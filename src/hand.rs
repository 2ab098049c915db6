use std::cmp::Ordering;

use itertools::Itertools;

use crate::cards::{Card, Rank, Suit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

/// Category plus tie-break ranks, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandStrength {
    pub category: HandCategory,
    pub ranks: [u8; 5],
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.ranks.cmp(&other.ranks))
    }
}

impl HandStrength {
    /// Rank that defines the hand: the pair, the set, the top of a straight.
    pub fn lead_rank(&self) -> u8 {
        self.ranks[0]
    }

    /// Showdown wording that names the deciding rank, e.g. `Pair of Kings`.
    pub fn detailed_name(&self) -> String {
        let lead = self.lead_rank();
        let high = rank_name(lead);
        match self.category {
            HandCategory::HighCard => format!("High Card ({high})"),
            HandCategory::OnePair => format!("Pair of {}", plural_rank_name(lead)),
            HandCategory::TwoPair => format!("Two Pair ({high} high)"),
            HandCategory::ThreeOfAKind => format!("Three {}", plural_rank_name(lead)),
            HandCategory::Straight => format!("Straight ({high} high)"),
            HandCategory::Flush => format!("Flush ({high} high)"),
            HandCategory::FullHouse => "Full House".to_string(),
            HandCategory::FourOfAKind => format!("Four {}", plural_rank_name(lead)),
            HandCategory::StraightFlush => format!("Straight Flush ({high} high)"),
        }
    }
}

fn rank_name(value: u8) -> String {
    match Rank::from_value(value) {
        Some(Rank::Ace) => "Ace".to_string(),
        Some(Rank::King) => "King".to_string(),
        Some(Rank::Queen) => "Queen".to_string(),
        Some(Rank::Jack) => "Jack".to_string(),
        _ => value.to_string(),
    }
}

fn plural_rank_name(value: u8) -> String {
    let name = match Rank::from_value(value) {
        Some(Rank::Ace) => "Aces",
        Some(Rank::King) => "Kings",
        Some(Rank::Queen) => "Queens",
        Some(Rank::Jack) => "Jacks",
        Some(Rank::Ten) => "Tens",
        Some(Rank::Nine) => "Nines",
        Some(Rank::Eight) => "Eights",
        Some(Rank::Seven) => "Sevens",
        Some(Rank::Six) => "Sixes",
        Some(Rank::Five) => "Fives",
        Some(Rank::Four) => "Fours",
        Some(Rank::Three) => "Threes",
        Some(Rank::Two) => "Twos",
        None => return format!("{value}s"),
    };
    name.to_string()
}

fn pad(mut values: Vec<u8>) -> [u8; 5] {
    values.resize(5, 0);
    [values[0], values[1], values[2], values[3], values[4]]
}

fn suit_index(suit: Suit) -> usize {
    match suit {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut counts = [0u8; 15];
    let mut suits = [0u8; 4];
    let mut descending: Vec<u8> = cards.iter().map(|c| c.rank_value()).collect();
    descending.sort_unstable_by(|a, b| b.cmp(a));

    for card in cards {
        counts[card.rank_value() as usize] += 1;
        suits[suit_index(card.suit)] += 1;
    }

    let flush = suits.contains(&5);

    let mut mask: u32 = 0;
    for value in 2u8..=14 {
        if counts[value as usize] > 0 {
            mask |= 1 << value;
            if value == Rank::Ace.value() {
                // wheel
                mask |= 1 << 1;
            }
        }
    }
    let straight_high = (5u8..=14).rev().find(|&high| {
        let run = (0..5u8).fold(0u32, |acc, i| acc | 1 << (high - i));
        mask & run == run
    });

    // (count, rank), biggest groups first, then higher ranks
    let mut groups: Vec<(u8, u8)> = (2u8..=14)
        .filter(|&rank| counts[rank as usize] > 0)
        .map(|rank| (counts[rank as usize], rank))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let singles = || -> Vec<u8> {
        groups
            .iter()
            .filter(|(count, _)| *count == 1)
            .map(|(_, rank)| *rank)
            .collect()
    };
    let run = |high: u8| pad(vec![high, high - 1, high - 2, high - 3, high - 4]);

    if flush && let Some(high) = straight_high {
        return HandStrength {
            category: HandCategory::StraightFlush,
            ranks: run(high),
        };
    }

    let (top_count, top_rank) = groups[0];
    let second_count = groups.get(1).map(|(count, _)| *count).unwrap_or(0);

    if top_count == 4 {
        let mut values = vec![top_rank];
        values.extend(singles());
        return HandStrength {
            category: HandCategory::FourOfAKind,
            ranks: pad(values),
        };
    }
    if top_count == 3 && second_count == 2 {
        return HandStrength {
            category: HandCategory::FullHouse,
            ranks: pad(vec![top_rank, groups[1].1]),
        };
    }
    if flush {
        return HandStrength {
            category: HandCategory::Flush,
            ranks: pad(descending),
        };
    }
    if let Some(high) = straight_high {
        return HandStrength {
            category: HandCategory::Straight,
            ranks: run(high),
        };
    }

    let (category, mut values) = match (top_count, second_count) {
        (3, _) => (HandCategory::ThreeOfAKind, vec![top_rank]),
        (2, 2) => (HandCategory::TwoPair, vec![top_rank, groups[1].1]),
        (2, _) => (HandCategory::OnePair, vec![top_rank]),
        _ => (HandCategory::HighCard, Vec::new()),
    };
    values.extend(singles());
    HandStrength {
        category,
        ranks: pad(values),
    }
}

/// Best five-card hand out of five to seven cards.
pub fn best_five_card_hand(cards: &[Card]) -> HandStrength {
    assert!(cards.len() >= 5, "at least 5 cards required");
    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|combo| evaluate_five(&[combo[0], combo[1], combo[2], combo[3], combo[4]]))
        .max()
        .expect("combinations non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Rank, Suit};

    #[test]
    fn straight_flush_beats_four_kind() {
        let sf = [
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Jack, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Hearts),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Ace, Suit::Hearts),
        ];
        let four = [
            Card::new(Rank::Nine, Suit::Clubs),
            Card::new(Rank::Nine, Suit::Diamonds),
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Spades),
            Card::new(Rank::Ace, Suit::Clubs),
        ];

        assert!(evaluate_five(&sf) > evaluate_five(&four));
    }

    #[test]
    fn wheel_straight_detected() {
        let hand = [
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::Two, Suit::Diamonds),
            Card::new(Rank::Three, Suit::Hearts),
            Card::new(Rank::Four, Suit::Spades),
            Card::new(Rank::Five, Suit::Clubs),
        ];
        let strength = evaluate_five(&hand);
        assert_eq!(strength.category, HandCategory::Straight);
        assert_eq!(strength.lead_rank(), 5);
        assert_eq!(strength.detailed_name(), "Straight (5 high)");
    }

    #[test]
    fn pair_kickers_break_ties() {
        let better = [
            Card::new(Rank::King, Suit::Clubs),
            Card::new(Rank::King, Suit::Diamonds),
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Four, Suit::Spades),
            Card::new(Rank::Two, Suit::Clubs),
        ];
        let worse = [
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Queen, Suit::Hearts),
            Card::new(Rank::Four, Suit::Clubs),
            Card::new(Rank::Two, Suit::Diamonds),
        ];
        let strength = evaluate_five(&better);
        assert_eq!(strength.detailed_name(), "Pair of Kings");
        assert!(strength > evaluate_five(&worse));
    }
}
