//! Core domain types for the deck tracker.
//!
//! This module defines:
//! - Card categories (the four disease colours plus events)
//! - Cards as registered in a session
//! - Locations a card can occupy

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Category
// ============================================================================

/// Category of a card
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Yellow,
    Red,
    Blue,
    Black,
    Event,
    /// Sentinel for a category token that is not recognised
    Unknown,
}

impl Category {
    /// The real categories, in display order
    pub const ALL: [Category; 5] = [
        Category::Yellow,
        Category::Red,
        Category::Blue,
        Category::Black,
        Category::Event,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Yellow => "yellow",
            Category::Red => "red",
            Category::Blue => "blue",
            Category::Black => "black",
            Category::Event => "event",
            Category::Unknown => "unknown",
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    /// Parsing never fails: unrecognised tokens become `Category::Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(Category::Unknown);
        Ok(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Card
// ============================================================================

/// A card: identifier plus category
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    pub name: String,
    pub category: Category,
}

impl Card {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}

// ============================================================================
// Location
// ============================================================================

/// Where a card currently sits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    PlayerDeck,
    PlayerDrawn,
    /// Infection sub-pile, counted from the top of the stack (0 = top)
    InfectionPile(usize),
    InfectionDiscard,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::PlayerDeck => f.write_str("the player deck"),
            Location::PlayerDrawn => f.write_str("the drawn player cards"),
            Location::InfectionPile(0) => f.write_str("the top infection pile"),
            Location::InfectionPile(depth) => {
                write!(f, "infection pile {} from the top", depth + 1)
            }
            Location::InfectionDiscard => f.write_str("the infection discard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("blue".parse::<Category>().unwrap(), Category::Blue);
        assert_eq!("BLACK".parse::<Category>().unwrap(), Category::Black);
        assert_eq!("event".parse::<Category>().unwrap(), Category::Event);
    }

    #[test]
    fn test_unknown_category_is_sentinel() {
        let parsed: Category = "purple".parse().unwrap();
        assert_eq!(parsed, Category::Unknown);
        assert!(!Category::ALL.contains(&parsed));
    }

    #[test]
    fn test_card_display() {
        let card = Card::new("atlanta", Category::Blue);
        assert_eq!(card.to_string(), "atlanta (blue)");
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::InfectionPile(0).to_string(), "the top infection pile");
        assert_eq!(
            Location::InfectionPile(2).to_string(),
            "infection pile 3 from the top"
        );
    }
}
