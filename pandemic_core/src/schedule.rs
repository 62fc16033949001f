//! Epidemic phase arithmetic.
//!
//! During setup the player deck (minus the initial hands) is split into as
//! many piles as there are epidemics, one epidemic shuffled into each, and
//! the piles stacked. The first `big_stacks` piles get one extra card. Each
//! pile is a *phase*: exactly one epidemic is drawn somewhere inside it.
//!
//! Knowing how many epidemics have been drawn and how many cards have been
//! drawn tells us which phase we are in and how far its boundary is.

use crate::{Error, Result};
use std::fmt;

/// What the operator should be told about the next epidemic
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhaseReport {
    /// This phase's epidemic was already drawn; no epidemic for `draws` draws
    Safe { draws: i64, turns: i64 },
    /// The epidemic is somewhere in the next `draws` draws
    Window { draws: i64, chance: f64 },
    /// The next card is certainly the epidemic; the card after that starts a
    /// phase of `phase_length` cards
    Imminent { phase_length: i64 },
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseReport::Safe { draws, turns } => {
                write!(f, "No epidemics for {} more draws. ({} turns)", draws, turns)
            }
            PhaseReport::Window { draws, chance } => write!(
                f,
                "Epidemic is in the next {} draws ({:.1}% chance to draw this turn)",
                draws, chance
            ),
            PhaseReport::Imminent { phase_length } => write!(
                f,
                "Epidemic will be the next card drawn, followed by a 1/{} chance of drawing another after",
                phase_length
            ),
        }
    }
}

/// Running totals shown by `epidemic_stats`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpidemicStats {
    pub epidemics: u32,
    pub draws_left: i64,
    pub turns_left: i64,
    pub report: Option<PhaseReport>,
}

/// Phase layout for one game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpidemicSchedule {
    total_cards: i64,
    epidemics: i64,
    cards_per_epidemic: i64,
    big_stacks: i64,
}

impl EpidemicSchedule {
    /// Build the schedule for a deck of `total_cards` (epidemics included)
    pub fn new(total_cards: i64, epidemics: u32) -> Result<Self> {
        if epidemics == 0 {
            return Err(Error::Config("at least one epidemic is required".into()));
        }
        let epidemics = i64::from(epidemics);
        if total_cards < epidemics {
            return Err(Error::Config(format!(
                "{} player cards cannot be split into {} epidemic piles",
                total_cards, epidemics
            )));
        }

        let cards_per_epidemic = total_cards / epidemics;
        let big_stacks = total_cards - cards_per_epidemic * epidemics;

        Ok(Self {
            total_cards,
            epidemics,
            cards_per_epidemic,
            big_stacks,
        })
    }

    /// Schedule for `player_cards` cities and events, after the initial
    /// hands are dealt and the epidemics shuffled in
    pub fn for_game(player_cards: usize, initial_draws: u32, epidemics: u32) -> Result<Self> {
        let player_cards = i64::try_from(player_cards)
            .map_err(|_| Error::Config("too many player cards".into()))?;
        let total = player_cards - i64::from(initial_draws) + i64::from(epidemics);
        Self::new(total, epidemics)
    }

    pub fn total_cards(&self) -> i64 {
        self.total_cards
    }

    pub fn epidemics(&self) -> i64 {
        self.epidemics
    }

    pub fn cards_per_epidemic(&self) -> i64 {
        self.cards_per_epidemic
    }

    pub fn big_stacks(&self) -> i64 {
        self.big_stacks
    }

    /// Number of cards in phase `e`
    pub fn phase_length(&self, e: i64) -> i64 {
        self.cards_per_epidemic + i64::from(e < self.big_stacks)
    }

    /// Draw count at which phase `e` begins
    pub fn safe_phase(&self, e: i64) -> i64 {
        if e < self.big_stacks {
            e * (self.cards_per_epidemic + 1)
        } else {
            self.big_stacks * (self.cards_per_epidemic + 1)
                + (e - self.big_stacks) * self.cards_per_epidemic
        }
    }

    /// Draw count at which phase `e` ends
    pub fn next_phase(&self, e: i64) -> i64 {
        self.safe_phase(e) + self.phase_length(e)
    }

    /// Report for the current position, if any applies.
    ///
    /// Nothing is reported once `n_draws` has reached the end of the current
    /// phase without its epidemic being recorded.
    pub fn report(&self, current_epidemics: u32, n_draws: i64) -> Option<PhaseReport> {
        let e = i64::from(current_epidemics);
        let safe_phase = self.safe_phase(e);
        let next_phase = self.next_phase(e);

        if n_draws + 2 <= safe_phase {
            let draws = safe_phase - n_draws;
            Some(PhaseReport::Safe {
                draws,
                turns: draws / 2,
            })
        } else if n_draws + 2 <= next_phase {
            let draws = next_phase - n_draws;
            Some(PhaseReport::Window {
                draws,
                chance: 200.0 / draws as f64,
            })
        } else if n_draws + 1 == next_phase {
            Some(PhaseReport::Imminent {
                phase_length: self.phase_length(e),
            })
        } else {
            None
        }
    }

    pub fn stats(&self, current_epidemics: u32, n_draws: i64) -> EpidemicStats {
        let draws_left = (self.total_cards - n_draws.max(0)).max(0);
        EpidemicStats {
            epidemics: current_epidemics,
            draws_left,
            turns_left: draws_left / 2,
            report: self.report(current_epidemics, n_draws),
        }
    }
}
