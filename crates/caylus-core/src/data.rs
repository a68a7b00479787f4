//! Static game data.
//!
//! The rules numbers, castle tiers, road composition and building templates
//! are read from a JSON document. The standard Caylus Magna Carta document is
//! embedded in the crate; callers may load their own with
//! [`GameData::from_path`]. Data is validated once and never mutated after
//! setup.

use crate::building::{Behavior, Effect, IncomeHook};
use crate::resource::{Cost, Ledger, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The embedded standard game document
pub const STANDARD_GAME_DATA: &str = include_str!("../data/caylus_magna_carta.json");

/// Smallest supported table
pub const MIN_PLAYERS: usize = 2;
/// Largest supported table
pub const MAX_PLAYERS: usize = 4;

/// Errors detected while loading or validating game data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed game data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cannot read game data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported number of players: {0} (expected 2 to 4)")]
    UnsupportedPlayerCount(usize),

    #[error("Color {0} is seated twice")]
    DuplicateColor(String),

    #[error("Unknown building: {0}")]
    UnknownBuilding(String),

    #[error("Building name used by more than one building: {0}")]
    AmbiguousBuilding(String),

    #[error("Invalid cost for {0}")]
    InvalidCost(String),

    #[error("Invalid effect on {building}: {reason}")]
    InvalidEffect { building: String, reason: String },

    #[error("Castle batch must ask for food, wood or stone only")]
    InvalidBatch,

    #[error("Castle has no tokens for {0} players")]
    EmptyCastle(usize),

    #[error("Road needs {needed} neutral buildings but only {available} exist")]
    NotEnoughNeutrals { needed: usize, available: usize },

    #[error("Invalid rule parameter: {0}")]
    InvalidParameter(String),
}

/// A value for each supported player count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByPlayerCount<T> {
    #[serde(rename = "2")]
    pub two: T,
    #[serde(rename = "3")]
    pub three: T,
    #[serde(rename = "4")]
    pub four: T,
}

impl<T: Copy> ByPlayerCount<T> {
    pub fn get(&self, players: usize) -> Option<T> {
        match players {
            2 => Some(self.two),
            3 => Some(self.three),
            4 => Some(self.four),
            _ => None,
        }
    }

    pub fn values(&self) -> [T; 3] {
        [self.two, self.three, self.four]
    }
}

/// Everything a player starts with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub workers: u32,
    pub resources: Ledger,
    #[serde(default)]
    pub prestige_points: u32,
    pub cards_in_hand: u32,
    /// How many times the opening hand may be thrown away and redrawn
    pub hand_redraws: u32,
}

/// A castle section and its token counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastleTierData {
    pub name: String,
    pub front_color: String,
    pub prestige_points: u32,
    pub tokens: ByPlayerCount<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRules {
    pub beginner: bool,
    pub deniers: i32,
    pub per_residence: i32,
    pub hotel: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRules {
    pub beginner: bool,
    pub draw_card_cost: i32,
    pub refill_hand_cost: i32,
    pub place_worker_cost: i32,
    pub workers_per_placement: u32,
    pub first_pass_bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvostRules {
    pub beginner: bool,
    /// Rounds of movement offered through the passing list
    pub rounds: u32,
    pub cost_per_step: i32,
    /// Largest shift a single player may make in either direction
    pub max_steps: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRules {
    pub beginner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastleRules {
    pub beginner: bool,
    /// Cost of one batch, as non-positive amounts
    pub batch: Ledger,
    /// Gold given to whoever offered the most batches
    pub gold_bonus: i32,
    /// Tokens discarded when nobody offers
    pub tokens_removed_if_none: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTurnRules {
    pub beginner: bool,
    pub provost_advance: u32,
}

/// Numeric parameters of the six phases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRules {
    pub income: IncomeRules,
    pub actions: ActionRules,
    pub provost: ProvostRules,
    pub effects: EffectRules,
    pub castle: CastleRules,
    pub end_turn: EndTurnRules,
}

/// How the road is laid out at setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadRules {
    /// Shuffled neutral buildings placed before the last one
    pub leading_neutrals: ByPlayerCount<usize>,
    /// Neutral building always placed at the end
    pub last_neutral: String,
    /// Building the provost starts on
    pub provost_start: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrestigeTemplate {
    pub name: String,
    pub front_color: String,
    pub prestige_points: u32,
    pub cost: Cost,
    pub beginner: bool,
    #[serde(default)]
    pub income: IncomeHook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeutralTemplate {
    pub name: String,
    pub front_color: String,
    pub beginner: bool,
    pub primary: Effect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidenceTemplate {
    pub name: String,
    pub front_color: String,
    pub prestige_points: u32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTemplate {
    pub name: String,
    pub front_color: String,
    pub prestige_points: u32,
    pub cost: Cost,
    pub beginner: bool,
    #[serde(default = "default_true")]
    pub can_be_residence: bool,
    pub primary: Effect,
    #[serde(default)]
    pub secondary: Option<Effect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTemplates {
    pub prestige: Vec<PrestigeTemplate>,
    pub neutral: Vec<NeutralTemplate>,
    pub residence: ResidenceTemplate,
    pub player: Vec<PlayerTemplate>,
}

/// The whole static game description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    pub name: String,
    pub player_setup: PlayerSetup,
    pub castle: Vec<CastleTierData>,
    pub phases: PhaseRules,
    pub road: RoadRules,
    pub buildings: BuildingTemplates,
}

impl GameData {
    /// The embedded Caylus Magna Carta data
    pub fn standard() -> Result<Self, ConfigError> {
        Self::from_json(STANDARD_GAME_DATA)
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let data: GameData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check every cross-reference and numeric range
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_names()?;
        self.validate_castle()?;
        self.validate_phases()?;
        self.validate_road()?;

        let templates = &self.buildings;
        for t in &templates.prestige {
            check_cost(&t.name, &t.cost)?;
        }
        for t in &templates.neutral {
            check_effect(&t.name, &t.primary)?;
        }
        for t in &templates.player {
            check_cost(&t.name, &t.cost)?;
            check_effect(&t.name, &t.primary)?;
            if let Some(secondary) = &t.secondary {
                check_effect(&t.name, secondary)?;
            }
        }
        Ok(())
    }

    fn validate_names(&self) -> Result<(), ConfigError> {
        // Prestige and neutral buildings are looked up by name
        let mut shared = HashSet::new();
        let names = self
            .buildings
            .prestige
            .iter()
            .map(|t| &t.name)
            .chain(self.buildings.neutral.iter().map(|t| &t.name));
        for name in names {
            if !shared.insert(name) {
                return Err(ConfigError::AmbiguousBuilding(name.clone()));
            }
        }

        let mut player = HashSet::new();
        for t in &self.buildings.player {
            if !player.insert(&t.name) {
                return Err(ConfigError::AmbiguousBuilding(t.name.clone()));
            }
        }
        Ok(())
    }

    fn validate_castle(&self) -> Result<(), ConfigError> {
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let total: u32 = self
                .castle
                .iter()
                .filter_map(|t| t.tokens.get(players))
                .sum();
            if total == 0 {
                return Err(ConfigError::EmptyCastle(players));
            }
        }
        Ok(())
    }

    fn validate_phases(&self) -> Result<(), ConfigError> {
        let phases = &self.phases;
        let actions = &phases.actions;
        if actions.draw_card_cost < 0 || actions.refill_hand_cost < 0 || actions.place_worker_cost < 0 {
            return Err(ConfigError::InvalidParameter(
                "action costs must not be negative".into(),
            ));
        }
        if phases.provost.cost_per_step <= 0 || phases.provost.max_steps < 0 {
            return Err(ConfigError::InvalidParameter(
                "provost steps need a positive cost and a non-negative cap".into(),
            ));
        }
        if self.player_setup.cards_in_hand == 0 {
            return Err(ConfigError::InvalidParameter(
                "hand size must be at least one card".into(),
            ));
        }

        let batch = &phases.castle.batch;
        let only_ordinary = Resource::ALL
            .iter()
            .all(|&r| Resource::ORDINARY.contains(&r) || batch.get(r) == 0);
        let asks_something = Resource::ORDINARY.iter().any(|&r| batch.get(r) < 0);
        let non_positive = Resource::ALL.iter().all(|&r| batch.get(r) <= 0);
        if !(only_ordinary && asks_something && non_positive) {
            return Err(ConfigError::InvalidBatch);
        }
        Ok(())
    }

    fn validate_road(&self) -> Result<(), ConfigError> {
        let road = &self.road;
        let neutral = &self.buildings.neutral;
        let find = |name: &str| neutral.iter().find(|t| t.name == name);

        if find(&road.last_neutral).is_none() {
            return Err(ConfigError::UnknownBuilding(road.last_neutral.clone()));
        }
        if find(&road.provost_start).is_none() {
            return Err(ConfigError::UnknownBuilding(road.provost_start.clone()));
        }

        // The beginner version sees the fewest neutral buildings
        let available = neutral
            .iter()
            .filter(|t| t.beginner && t.name != road.last_neutral)
            .count();
        let needed = road.leading_neutrals.values().into_iter().max().unwrap_or(0);
        if needed > available {
            return Err(ConfigError::NotEnoughNeutrals { needed, available });
        }
        Ok(())
    }

    /// Check a seating before a game is created
    pub fn check_player_count(&self, players: usize) -> Result<(), ConfigError> {
        if (MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedPlayerCount(players))
        }
    }
}

fn check_cost(building: &str, cost: &Cost) -> Result<(), ConfigError> {
    if cost.is_well_formed() {
        Ok(())
    } else {
        Err(ConfigError::InvalidCost(building.to_string()))
    }
}

fn check_effect(building: &str, effect: &Effect) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEffect {
        building: building.to_string(),
        reason: reason.to_string(),
    };

    match &effect.behavior {
        Behavior::Gain { gain } | Behavior::AreaGain { gain, .. } => {
            if gain.amount == 0 {
                return Err(invalid("gain of zero"));
            }
        }
        Behavior::Buy { gains, .. } => {
            if gains.is_empty() {
                return Err(invalid("nothing to buy"));
            }
        }
        Behavior::BuyTiers { tiers, gains } => {
            if tiers.is_empty() || gains.is_empty() {
                return Err(invalid("tiered buy needs tiers and gains"));
            }
        }
        Behavior::Exchange { gain, .. } => {
            if gain.amount == 0 {
                return Err(invalid("exchange for nothing"));
            }
        }
        Behavior::BuyCastleTokens { tiers } => {
            if tiers.is_empty() {
                return Err(invalid("castle buy needs tiers"));
            }
        }
        Behavior::ConstructResidence { cost } => {
            check_cost(building, cost)?;
        }
    }
    Ok(())
}
