//! Card piles.
//!
//! A [`Deck`] is a duplicate-free set of cards keyed by exact name. The
//! [`InfectionDeck`] is a stack of such decks: every epidemic shuffles the
//! discard pile and places it on top of whatever is left, so infections
//! always draw from the newest shuffle while epidemics reveal the oldest
//! cards at the bottom.

use crate::resolver::{self, Resolution};
use crate::{Card, Category, Location};
use std::collections::{BTreeMap, VecDeque};

// ============================================================================
// Deck
// ============================================================================

/// Duplicate-free set of cards ordered by name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deck {
    cards: BTreeMap<String, Category>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.cards.get(name).copied()
    }

    /// Insert a card, returning false if the name was already present
    pub fn insert(&mut self, card: Card) -> bool {
        if self.cards.contains_key(&card.name) {
            return false;
        }
        self.cards.insert(card.name, card.category);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Card> {
        self.cards
            .remove_entry(name)
            .map(|(name, category)| Card { name, category })
    }

    /// Move every card out of `other` into this deck
    pub fn append(&mut self, other: &mut Deck) {
        self.cards.append(&mut other.cards);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Category)> + '_ {
        self.cards.iter().map(|(name, category)| (name.as_str(), *category))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.cards.keys().map(String::as_str)
    }

    /// Number of cards per category, in category order
    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for category in self.cards.values() {
            *counts.entry(*category).or_insert(0) += 1;
        }
        counts
    }

    pub fn resolve(&self, token: &str) -> Resolution {
        resolver::resolve(token, self.iter())
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        let mut deck = Deck::new();
        for card in iter {
            deck.insert(card);
        }
        deck
    }
}

// ============================================================================
// Infection deck
// ============================================================================

/// Identifier of an infection sub-pile, unique for the pile's lifetime
pub type PileId = u32;

#[derive(Clone, Debug, PartialEq, Eq)]
struct SubPile {
    id: PileId,
    cards: Deck,
}

/// What an epidemic changed, kept so it can be undone exactly
#[derive(Clone, Debug, PartialEq, Eq)]
struct EpidemicRecord {
    pile: PileId,
    source: PileId,
    absorbed: BTreeMap<String, PileId>,
}

/// Stack of infection sub-piles plus the discard pile.
///
/// The top of the stack is the back of `piles`, the bottom is the front.
/// The stack never holds an empty sub-pile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfectionDeck {
    piles: VecDeque<SubPile>,
    discard: Deck,
    /// Sub-pile each discard card was infected from
    origins: BTreeMap<String, PileId>,
    records: Vec<EpidemicRecord>,
    next_id: PileId,
}

impl InfectionDeck {
    pub fn new(cities: Deck) -> Self {
        let mut piles = VecDeque::new();
        if !cities.is_empty() {
            piles.push_back(SubPile { id: 0, cards: cities });
        }
        Self {
            piles,
            discard: Deck::new(),
            origins: BTreeMap::new(),
            records: Vec::new(),
            next_id: 1,
        }
    }

    pub fn top(&self) -> Option<&Deck> {
        self.piles.back().map(|p| &p.cards)
    }

    pub fn bottom(&self) -> Option<&Deck> {
        self.piles.front().map(|p| &p.cards)
    }

    /// Sub-piles from top to bottom
    pub fn piles(&self) -> impl Iterator<Item = &Deck> + '_ {
        self.piles.iter().rev().map(|p| &p.cards)
    }

    pub fn pile_count(&self) -> usize {
        self.piles.len()
    }

    pub fn discard(&self) -> &Deck {
        &self.discard
    }

    /// Cards still in the stack, across all sub-piles
    pub fn remaining(&self) -> usize {
        self.piles.iter().map(|p| p.cards.len()).sum()
    }

    /// Resolve a token against every card still in the stack
    pub fn resolve(&self, token: &str) -> Resolution {
        resolver::resolve(token, self.piles.iter().flat_map(|p| p.cards.iter()))
    }

    pub fn locate(&self, name: &str) -> Option<Location> {
        if self.discard.contains(name) {
            return Some(Location::InfectionDiscard);
        }
        self.piles
            .iter()
            .rev()
            .position(|p| p.cards.contains(name))
            .map(Location::InfectionPile)
    }

    /// True when the top sub-pile was pushed by the latest card-level epidemic
    pub fn epidemic_on_top(&self) -> bool {
        match (self.records.last(), self.piles.back()) {
            (Some(record), Some(top)) => record.pile == top.id,
            _ => false,
        }
    }

    /// Move `name` from the top sub-pile to the discard.
    ///
    /// Returns `None` if the card is not in the top sub-pile.
    pub fn infect(&mut self, name: &str) -> Option<Card> {
        let top = self.piles.back_mut()?;
        let card = top.cards.remove(name)?;
        let origin = top.id;
        if top.cards.is_empty() {
            self.piles.pop_back();
        }

        self.origins.insert(card.name.clone(), origin);
        self.discard.insert(card.clone());
        Some(card)
    }

    /// Return `name` from the discard to the top of the stack, recreating
    /// its sub-pile if `infect` popped it.
    pub fn uninfect(&mut self, name: &str) -> Option<Card> {
        let card = self.discard.remove(name)?;
        let origin = self.origins.remove(name);

        let top_id = self.piles.back().map(|p| p.id);
        match (top_id, origin) {
            (Some(top), Some(id)) if top == id => self.insert_on_top(card.clone()),
            (Some(_), None) => self.insert_on_top(card.clone()),
            (_, origin) => {
                let id = origin.unwrap_or_else(|| self.allocate_id());
                let cards = std::iter::once(card.clone()).collect();
                self.piles.push_back(SubPile { id, cards });
            }
        }
        Some(card)
    }

    /// Reveal `name` from the bottom sub-pile, then shuffle it with the
    /// discard into a new top sub-pile.
    ///
    /// Returns `None` if the card is not in the bottom sub-pile.
    pub fn epidemic(&mut self, name: &str) -> Option<Card> {
        let bottom = self.piles.front_mut()?;
        let card = bottom.cards.remove(name)?;
        let source = bottom.id;
        if bottom.cards.is_empty() {
            self.piles.pop_front();
        }

        let id = self.allocate_id();
        let mut cards = std::mem::take(&mut self.discard);
        cards.insert(card.clone());
        self.piles.push_back(SubPile { id, cards });
        self.records.push(EpidemicRecord {
            pile: id,
            source,
            absorbed: std::mem::take(&mut self.origins),
        });
        Some(card)
    }

    /// Undo the latest card-level epidemic, sending `name` back to the
    /// bottom and the rest of the epidemic sub-pile back to the discard.
    ///
    /// Returns `None` unless the top sub-pile is the latest epidemic's pile
    /// and contains `name`.
    pub fn unepidemic(&mut self, name: &str) -> Option<Card> {
        if !self.epidemic_on_top() || !self.top()?.contains(name) {
            return None;
        }
        let record = self.records.pop()?;
        let mut top = self.piles.pop_back()?;
        let card = top.cards.remove(name)?;

        for (rest, _) in top.cards.iter() {
            let origin = record.absorbed.get(rest).copied().unwrap_or(record.pile);
            self.origins.insert(rest.to_string(), origin);
        }
        self.discard.append(&mut top.cards);

        if self.piles.front().map(|p| p.id) == Some(record.source) {
            if let Some(bottom) = self.piles.front_mut() {
                bottom.cards.insert(card.clone());
            }
        } else {
            let cards = std::iter::once(card.clone()).collect();
            self.piles.push_front(SubPile {
                id: record.source,
                cards,
            });
        }

        if record.pile + 1 == self.next_id {
            self.next_id = record.pile;
        }
        Some(card)
    }

    fn insert_on_top(&mut self, card: Card) {
        if let Some(top) = self.piles.back_mut() {
            top.cards.insert(card);
        }
    }

    fn allocate_id(&mut self) -> PileId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
