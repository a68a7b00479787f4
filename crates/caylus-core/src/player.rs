//! Player state and deck management.
//!
//! This module contains:
//! - Player colors and identifiers
//! - Card locations for the 12-card building deck
//! - The Player struct with resources, workers and prestige points
//! - End-of-game scoring of the resources a player still holds

use crate::building::BuildingId;
use crate::data::PlayerSetup;
use crate::resource::{Ledger, Resource};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Seat index of a player, in seating order
pub type PlayerId = u8;

/// Player color; player-owned buildings and residences are printed per color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Orange,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Orange, Color::Blue];

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown color name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color `{0}` (expected red, green, orange or blue)")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

/// Where one of a player's building cards currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardLocation {
    Pile,
    Hand,
    Discard,
    /// Constructed along the road
    Road,
    /// Constructed, then turned into a residence
    Replaced,
}

/// A player in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub color: Color,
    pub resources: Ledger,
    /// Workers not currently on the road
    pub workers: u32,
    /// Prestige points already earned (castle tokens, beginner prestige buildings)
    pub prestige_points: u32,
    /// Every card of the player's deck and its location
    pub deck: BTreeMap<BuildingId, CardLocation>,
}

impl Player {
    /// Create a player with every deck card in the pile
    pub fn new(
        id: PlayerId,
        color: Color,
        setup: &PlayerSetup,
        cards: impl IntoIterator<Item = BuildingId>,
    ) -> Self {
        Self {
            id,
            color,
            resources: setup.resources,
            workers: setup.workers,
            prestige_points: setup.prestige_points,
            deck: cards.into_iter().map(|c| (c, CardLocation::Pile)).collect(),
        }
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    /// Cards at a location, in catalog order
    pub fn cards_in(&self, location: CardLocation) -> Vec<BuildingId> {
        self.deck
            .iter()
            .filter(|(_, loc)| **loc == location)
            .map(|(card, _)| *card)
            .collect()
    }

    pub fn count_in(&self, location: CardLocation) -> usize {
        self.deck.values().filter(|loc| **loc == location).count()
    }

    pub fn hand(&self) -> Vec<BuildingId> {
        self.cards_in(CardLocation::Hand)
    }

    pub fn location_of(&self, card: BuildingId) -> Option<CardLocation> {
        self.deck.get(&card).copied()
    }

    /// Move a card of this deck; cards from other decks are ignored
    pub fn move_card(&mut self, card: BuildingId, location: CardLocation) {
        if let Some(loc) = self.deck.get_mut(&card) {
            *loc = location;
        }
    }

    pub fn move_all(&mut self, from: CardLocation, to: CardLocation) {
        for loc in self.deck.values_mut() {
            if *loc == from {
                *loc = to;
            }
        }
    }

    /// Whether at least one card can still be drawn
    pub fn can_draw(&self) -> bool {
        self.count_in(CardLocation::Pile) + self.count_in(CardLocation::Discard) > 0
    }

    /// Draw up to `count` random cards from the pile into the hand.
    ///
    /// An empty pile is refilled from the discard before drawing further.
    pub fn draw_cards<R: Rng>(&mut self, count: usize, rng: &mut R) -> Vec<BuildingId> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            if self.count_in(CardLocation::Pile) == 0 {
                self.move_all(CardLocation::Discard, CardLocation::Pile);
            }
            let pile = self.cards_in(CardLocation::Pile);
            let Some(&card) = pile.choose(rng) else {
                break;
            };
            self.move_card(card, CardLocation::Hand);
            drawn.push(card);
        }
        drawn
    }

    /// Final score given the prestige value of the visible road buildings this
    /// player owns
    pub fn score(&self, road_points: u32) -> u32 {
        let res = &self.resources;
        let gold = res.get(Resource::Gold).max(0) as u32;
        let cubes = res.ordinary_cubes().max(0) as u32;
        let deniers = res.get(Resource::Denier).max(0) as u32;
        self.prestige_points + road_points + gold + cubes / 3 + deniers / 3
    }
}
