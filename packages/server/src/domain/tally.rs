//! Vote Tally Engine.
//!
//! Pure and deterministic: the same participant snapshot always yields the
//! same counts and ranks.
//!
//! Ranking is competition ranking ("1224"). Cards are ordered by count
//! descending (stable, so equal counts keep ascending card order) and each
//! card's rank is the 1-based position of the first card in that ordering
//! with the same count.

use super::{
    entity::{Participant, RankedCard},
    value_object::Card,
};

const CARD_COUNT: usize = (Card::MAX - Card::MIN + 1) as usize;

/// Rank threshold for crown/medal decoration.
pub const MEDAL_RANK_LIMIT: usize = 3;

/// Per-card counts and ranks for one participant snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    counts: [usize; CARD_COUNT],
    ranks: [usize; CARD_COUNT],
}

impl Tally {
    pub fn compute<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> Self {
        Self::from_cards(participants.into_iter().map(|p| p.selected_card))
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Option<Card>>) -> Self {
        let mut counts = [0usize; CARD_COUNT];
        for card in cards.into_iter().flatten() {
            counts[card.index()] += 1;
        }

        let mut ordered: Vec<(Card, usize)> = Card::all().map(|c| (c, counts[c.index()])).collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        let mut ranks = [0usize; CARD_COUNT];
        let mut previous: Option<(usize, usize)> = None; // (count, rank)
        for (position, (card, count)) in ordered.iter().enumerate() {
            let rank = match previous {
                Some((prev_count, prev_rank)) if prev_count == *count => prev_rank,
                _ => position + 1,
            };
            ranks[card.index()] = rank;
            previous = Some((*count, rank));
        }

        Self { counts, ranks }
    }

    pub fn count(&self, card: Card) -> usize {
        self.counts[card.index()]
    }

    pub fn rank(&self, card: Card) -> usize {
        self.ranks[card.index()]
    }

    /// Number of cast votes.
    pub fn total_votes(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_medal_worthy(&self, card: Card) -> bool {
        self.count(card) > 0 && self.rank(card) <= MEDAL_RANK_LIMIT
    }

    /// All seven cards with their counts and ranks, ascending by card value.
    pub fn entries(&self) -> Vec<RankedCard> {
        Card::all()
            .map(|card| RankedCard {
                card,
                count: self.count(card),
                rank: self.rank(card),
            })
            .collect()
    }

    /// Medal-worthy cards ordered by rank, then card value.
    ///
    /// Ties can make this longer than three entries.
    pub fn podium(&self) -> Vec<RankedCard> {
        let mut podium: Vec<RankedCard> = self
            .entries()
            .into_iter()
            .filter(|entry| self.is_medal_worthy(entry.card))
            .collect();
        podium.sort_by_key(|entry| (entry.rank, entry.card));
        podium
    }
}
