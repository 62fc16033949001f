//! Deck state and its reversible operations.
//!
//! A [`Tracker`] owns the player deck, the drawn player cards, the infection
//! deck and the two counters that feed the epidemic schedule. Every
//! operation takes a batch of operator tokens and handles each one on its
//! own: a token that fails to resolve is reported and skipped, the rest of
//! the batch still applies.
//!
//! | forward    | inverse      |
//! |------------|--------------|
//! | `draw`     | `undraw`     |
//! | `infect`   | `uninfect`   |
//! | `epidemic` | `unepidemic` |

use crate::resolver::{lazy_eq, Resolution};
use crate::{
    Card, Deck, EpidemicSchedule, EpidemicStats, InfectionDeck, Location, PhaseReport, Registry,
    Result,
};
use std::fmt;

/// Token that stands for the epidemic card inside a `draw` batch
const EPIDEMIC_MARKER: &str = "epidemic";

/// Why a single token in a batch was skipped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveError {
    /// Nothing in the queried pile matches; `elsewhere` says where the card
    /// is when the token names exactly one known card
    NotFound {
        token: String,
        elsewhere: Option<(Card, Location)>,
    },
    Ambiguous {
        token: String,
        candidates: Vec<String>,
    },
    /// The card resolved but is not where the operation needs it
    PreconditionViolation { card: Card, reason: String },
    /// An epidemic undo was requested with no epidemic recorded
    NoEpidemic,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::NotFound {
                token,
                elsewhere: Some((card, location)),
            } => write!(f, "error: {} is not here, {} is in {}.", token, card, location),
            MoveError::NotFound { token, .. } => write!(f, "{} is an invalid card.", token),
            MoveError::Ambiguous { token, candidates } => write!(
                f,
                "{} was ambiguous. Could be: {}.",
                token,
                candidates.join(", ")
            ),
            MoveError::PreconditionViolation { card, reason } => {
                write!(f, "error: {} {}.", card, reason)
            }
            MoveError::NoEpidemic => f.write_str("error: no epidemic to undo."),
        }
    }
}

impl std::error::Error for MoveError {}

/// Result of processing one token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The card changed location
    Moved(Card),
    /// The epidemic counter changed to `count`; `card` is the infection card
    /// involved in a card-level epidemic
    Epidemic { count: u32, card: Option<Card> },
    Failed(MoveError),
}

/// Where a known card currently sits on each side of the game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardInfo {
    pub card: Card,
    pub player: Option<Location>,
    pub infection: Option<Location>,
}

#[derive(Clone, Copy)]
enum Side {
    Player,
    Infection,
}

/// Hidden deck state for one game session
#[derive(Clone, Debug)]
pub struct Tracker {
    registry: Registry,
    schedule: EpidemicSchedule,
    player_deck: Deck,
    player_drawn: Deck,
    infection: InfectionDeck,
    n_draws: i64,
    current_epidemics: u32,
}

impl Tracker {
    /// Start a game: every card in the player deck, every city in a single
    /// infection pile, and `n_draws` offset so the first post-setup draw
    /// is draw 1.
    pub fn new(registry: Registry, initial_draws: u32, epidemics: u32) -> Result<Self> {
        let schedule = EpidemicSchedule::for_game(registry.len(), initial_draws, epidemics)?;
        let player_deck = registry.cards().clone();
        let infection = InfectionDeck::new(registry.cities());

        tracing::info!(
            "New game: {} player cards, {} infection cards, {} epidemics",
            player_deck.len(),
            infection.remaining(),
            epidemics
        );

        Ok(Self {
            registry,
            schedule,
            player_deck,
            player_drawn: Deck::new(),
            infection,
            n_draws: -i64::from(initial_draws),
            current_epidemics: 0,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn schedule(&self) -> &EpidemicSchedule {
        &self.schedule
    }

    pub fn player_deck(&self) -> &Deck {
        &self.player_deck
    }

    pub fn player_drawn(&self) -> &Deck {
        &self.player_drawn
    }

    pub fn infection(&self) -> &InfectionDeck {
        &self.infection
    }

    pub fn n_draws(&self) -> i64 {
        self.n_draws
    }

    pub fn current_epidemics(&self) -> u32 {
        self.current_epidemics
    }

    pub fn report(&self) -> Option<PhaseReport> {
        self.schedule.report(self.current_epidemics, self.n_draws)
    }

    pub fn stats(&self) -> EpidemicStats {
        self.schedule.stats(self.current_epidemics, self.n_draws)
    }

    /// Resolve a token against the registry and report where the card is
    pub fn lookup(&self, token: &str) -> std::result::Result<CardInfo, MoveError> {
        match self.registry.resolve(token) {
            Resolution::Unique(card) => Ok(CardInfo {
                player: self.location(&card.name, Side::Player),
                infection: self.location(&card.name, Side::Infection),
                card,
            }),
            Resolution::Ambiguous(candidates) => Err(MoveError::Ambiguous {
                token: token.to_string(),
                candidates,
            }),
            Resolution::NotFound => Err(MoveError::NotFound {
                token: token.to_string(),
                elsewhere: None,
            }),
        }
    }

    // ========================================================================
    // Player deck
    // ========================================================================

    /// Draw player cards. A token matching `epidemic` records a drawn
    /// epidemic card instead.
    pub fn draw<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<Step> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                if lazy_eq(token, EPIDEMIC_MARKER) {
                    return self.announce_epidemic();
                }
                match self.resolve(token, self.player_deck.resolve(token), Side::Player) {
                    Ok(card) => match self.transfer(&card.name, true) {
                        Some(card) => {
                            self.n_draws += 1;
                            tracing::debug!("Drew {}, {} draws so far", card, self.n_draws);
                            Step::Moved(card)
                        }
                        None => self.violation(card, "is not in the player deck"),
                    },
                    Err(e) => Step::Failed(e),
                }
            })
            .collect()
    }

    /// Return drawn player cards to the deck. A token matching `epidemic`
    /// takes back a drawn epidemic card.
    pub fn undraw<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<Step> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                if lazy_eq(token, EPIDEMIC_MARKER) {
                    return self.retract_epidemic();
                }
                match self.resolve(token, self.player_drawn.resolve(token), Side::Player) {
                    Ok(card) => match self.transfer(&card.name, false) {
                        Some(card) => {
                            self.n_draws -= 1;
                            tracing::debug!("Undrew {}, {} draws so far", card, self.n_draws);
                            Step::Moved(card)
                        }
                        None => self.violation(card, "has not been drawn"),
                    },
                    Err(e) => Step::Failed(e),
                }
            })
            .collect()
    }

    // ========================================================================
    // Infection deck
    // ========================================================================

    /// Infect cities from the top infection pile
    pub fn infect<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<Step> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                let card = match self.resolve(token, self.infection.resolve(token), Side::Infection)
                {
                    Ok(card) => card,
                    Err(e) => return Step::Failed(e),
                };
                match self.infection.infect(&card.name) {
                    Some(card) => {
                        tracing::debug!("Infected {}", card);
                        Step::Moved(card)
                    }
                    None => self.violation(card, "is not in the top infection pile"),
                }
            })
            .collect()
    }

    /// Put infected cities back on top of the infection deck
    pub fn uninfect<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<Step> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                let resolution = self.infection.discard().resolve(token);
                let card = match self.resolve(token, resolution, Side::Infection) {
                    Ok(card) => card,
                    Err(e) => return Step::Failed(e),
                };
                match self.infection.uninfect(&card.name) {
                    Some(card) => {
                        tracing::debug!("Uninfected {}", card);
                        Step::Moved(card)
                    }
                    None => self.violation(card, "is not in the infection discard"),
                }
            })
            .collect()
    }

    // ========================================================================
    // Epidemics
    // ========================================================================

    /// Record epidemics. With no tokens a single epidemic is counted without
    /// touching the infection deck; each token names the card revealed from
    /// the bottom of the infection deck for one epidemic.
    pub fn epidemic<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<Step> {
        if tokens.is_empty() {
            return vec![self.announce_epidemic()];
        }
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                let card = match self.resolve(token, self.infection.resolve(token), Side::Infection)
                {
                    Ok(card) => card,
                    Err(e) => return Step::Failed(e),
                };
                match self.infection.epidemic(&card.name) {
                    Some(card) => {
                        let count = self.count_epidemic();
                        tracing::debug!("Epidemic {} revealed {}", count, card);
                        Step::Epidemic {
                            count,
                            card: Some(card),
                        }
                    }
                    None => self.violation(card, "is not in the bottom infection pile"),
                }
            })
            .collect()
    }

    /// Undo epidemics, the inverse of [`Tracker::epidemic`]
    pub fn unepidemic<S: AsRef<str>>(&mut self, tokens: &[S]) -> Vec<Step> {
        if tokens.is_empty() {
            return vec![self.retract_epidemic()];
        }
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                if self.current_epidemics == 0 {
                    return Step::Failed(MoveError::NoEpidemic);
                }
                let card = match self.resolve(token, self.infection.resolve(token), Side::Infection)
                {
                    Ok(card) => card,
                    Err(e) => return Step::Failed(e),
                };
                if !self.infection.epidemic_on_top() {
                    return self.violation(
                        card,
                        "cannot be undone: the top infection pile is not from an epidemic",
                    );
                }
                match self.infection.unepidemic(&card.name) {
                    Some(card) => {
                        let count = self.uncount_epidemic();
                        tracing::debug!("Undid epidemic, {} returned to the bottom", card);
                        Step::Epidemic {
                            count,
                            card: Some(card),
                        }
                    }
                    None => self.violation(card, "is not in the top infection pile"),
                }
            })
            .collect()
    }

    /// Count a drawn epidemic card without touching the infection deck
    pub fn announce_epidemic(&mut self) -> Step {
        let count = self.count_epidemic();
        tracing::debug!("Epidemic {} announced", count);
        Step::Epidemic { count, card: None }
    }

    /// Inverse of [`Tracker::announce_epidemic`]
    pub fn retract_epidemic(&mut self) -> Step {
        if self.current_epidemics == 0 {
            return Step::Failed(MoveError::NoEpidemic);
        }
        let count = self.uncount_epidemic();
        tracing::debug!("Epidemic retracted, {} remain", count);
        Step::Epidemic { count, card: None }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn count_epidemic(&mut self) -> u32 {
        self.current_epidemics += 1;
        self.n_draws += 1;
        self.current_epidemics
    }

    fn uncount_epidemic(&mut self) -> u32 {
        self.current_epidemics -= 1;
        self.n_draws -= 1;
        self.current_epidemics
    }

    /// Move a card between the player deck and the drawn pile
    fn transfer(&mut self, name: &str, drawing: bool) -> Option<Card> {
        let (from, to) = if drawing {
            (&mut self.player_deck, &mut self.player_drawn)
        } else {
            (&mut self.player_drawn, &mut self.player_deck)
        };
        let card = from.remove(name)?;
        to.insert(card.clone());
        Some(card)
    }

    fn resolve(
        &self,
        token: &str,
        resolution: Resolution,
        side: Side,
    ) -> std::result::Result<Card, MoveError> {
        match resolution {
            Resolution::Unique(card) => Ok(card),
            Resolution::Ambiguous(candidates) => Err(MoveError::Ambiguous {
                token: token.to_string(),
                candidates,
            }),
            Resolution::NotFound => {
                let elsewhere = match self.registry.resolve(token) {
                    Resolution::Unique(card) => {
                        self.location(&card.name, side).map(|location| (card, location))
                    }
                    _ => None,
                };
                Err(MoveError::NotFound {
                    token: token.to_string(),
                    elsewhere,
                })
            }
        }
    }

    fn location(&self, name: &str, side: Side) -> Option<Location> {
        match side {
            Side::Player if self.player_deck.contains(name) => Some(Location::PlayerDeck),
            Side::Player if self.player_drawn.contains(name) => Some(Location::PlayerDrawn),
            Side::Player => None,
            Side::Infection => self.infection.locate(name),
        }
    }

    fn violation(&self, card: Card, reason: &str) -> Step {
        Step::Failed(MoveError::PreconditionViolation {
            card,
            reason: reason.to_string(),
        })
    }
}
