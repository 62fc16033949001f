//! Card registry: the immutable card -> category mapping for a session.
//!
//! Cards are read from a flat, whitespace-separated list of
//! `name category` pairs, e.g.
//!
//! ```text
//! atlanta blue  chicago blue
//! miami yellow
//! ```
//!
//! Event cards are added by name afterwards and never enter the infection
//! deck.

use crate::resolver::{self, Resolution};
use crate::{Card, Category, Deck, Error, Result};
use std::path::Path;

/// The set of cards known to a session
#[derive(Clone, Debug, Default)]
pub struct Registry {
    cards: Deck,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load cards from a file.
    ///
    /// An unreadable file is an error rather than an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&source);
        tracing::info!("Loaded {} cards from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Parse whitespace-separated `name category` pairs
    pub fn parse(source: &str) -> Self {
        let mut registry = Self::new();
        let mut tokens = source.split_whitespace();

        while let Some(name) = tokens.next() {
            let Some(token) = tokens.next() else {
                tracing::warn!("Ignoring card '{}' with no category", name);
                break;
            };
            let category: Category = token.parse().unwrap_or(Category::Unknown);
            if category == Category::Unknown {
                tracing::warn!("Card '{}' has unknown category '{}'", name, token);
            }
            registry.register(Card::new(name, category));
        }

        registry
    }

    /// Add event cards by name
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for event in events {
            self.register(Card::new(event, Category::Event));
        }
        self
    }

    /// Register a card unless its name lazily equals one already present.
    ///
    /// Returns whether the card was added. Since no two registered names are
    /// prefixes of each other, an exact name can never also be the prefix of
    /// a longer card: a token that fully names a registered card always
    /// resolves uniquely against this registry and every deck built from it.
    pub fn register(&mut self, card: Card) -> bool {
        if let Some(existing) = self.cards.names().find(|n| resolver::lazy_eq(n, &card.name)) {
            tracing::warn!(
                "Skipping card '{}': indistinguishable from '{}'",
                card.name,
                existing
            );
            return false;
        }
        tracing::debug!("Registered {}", card);
        self.cards.insert(card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Category of the card with exactly this name, ignoring case
    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.cards
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, category)| category)
    }

    pub fn resolve(&self, token: &str) -> Resolution {
        self.cards.resolve(token)
    }

    /// Card names matching `partial`, in key order
    pub fn complete(&self, partial: &str) -> Vec<String> {
        self.cards
            .names()
            .filter(|name| resolver::lazy_eq(partial, name))
            .map(str::to_string)
            .collect()
    }

    /// Every card, cities and events
    pub fn cards(&self) -> &Deck {
        &self.cards
    }

    /// Cards that belong in the infection deck
    pub fn cities(&self) -> Deck {
        self.cards
            .iter()
            .filter(|(_, category)| *category != Category::Event)
            .map(|(name, category)| Card::new(name, category))
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|(_, category)| *category == Category::Event)
            .count()
    }
}
