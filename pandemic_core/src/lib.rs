#![forbid(unsafe_code)]

//! Core deck-state model for the Pandemic deck tracker.
//!
//! This crate provides:
//! - Card types and the card registry
//! - Lazy (case-insensitive prefix) name resolution
//! - Player and infection deck state with reversible operations
//! - Epidemic phase arithmetic and the probability report
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod deck;
pub mod tracker;
pub mod schedule;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use registry::Registry;
pub use resolver::{lazy_eq, resolve, Resolution};
pub use deck::{Deck, InfectionDeck, PileId};
pub use tracker::{MoveError, Step, Tracker};
pub use schedule::{EpidemicSchedule, EpidemicStats, PhaseReport};
