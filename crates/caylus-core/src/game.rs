//! Core game state.
//!
//! This module contains the `GameState` struct: setup of the road, castle and
//! decks, the legal actions of the actions phase, and how each action is
//! applied. The phase loop itself lives in [`crate::engine`].

use crate::actions::{GameAction, GameEvent};
use crate::building::{Behavior, BuildingId, BuildingKind, Catalog};
use crate::castle::{Castle, CastleTier};
use crate::data::{ConfigError, GameData, PhaseRules, PlayerSetup};
use crate::payment::all_payments;
use crate::player::{CardLocation, Color, Player, PlayerId};
use crate::road::Road;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rules variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    /// No provost; prestige buildings are scored immediately
    Beginner,
    Standard,
}

impl Version {
    pub fn is_beginner(self) -> bool {
        self == Version::Beginner
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Beginner => f.write_str("beginner"),
            Version::Standard => f.write_str("standard"),
        }
    }
}

/// Error returned when parsing an unknown version name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown version `{0}` (expected beginner or standard)")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Version::Beginner),
            "standard" => Ok(Version::Standard),
            _ => Err(ParseVersionError(s.to_string())),
        }
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Opening hands dealt, redraws pending
    Setup,
    Income,
    Actions,
    ProvostMovement,
    BuildingEffects,
    Castle,
    EndTurn,
    /// Castle emptied
    Finished,
}

/// Errors that abort a game
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {player} cannot take {action:?} now")]
    IllegalAction { player: PlayerId, action: GameAction },

    #[error("Player {player} gave an answer outside the offered options for {decision}")]
    InvalidDecision {
        player: PlayerId,
        decision: &'static str,
    },

    #[error("Player {0} ended up with a negative resource")]
    NegativeLedger(PlayerId),

    #[error("Game is over")]
    GameOver,
}

/// Final scores and the players tied for the best one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub scores: Vec<(PlayerId, u32)>,
    pub winners: Vec<PlayerId>,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    version: Version,
    catalog: Catalog,
    rules: PhaseRules,
    player_setup: PlayerSetup,
    /// Players in seating order
    pub players: Vec<Player>,
    pub road: Road,
    pub castle: Castle,
    /// Owners of constructed prestige buildings
    pub prestige_owners: BTreeMap<BuildingId, PlayerId>,
    /// Cubes left on buildings that stock them
    pub area_cubes: BTreeMap<BuildingId, u32>,
    /// Players who passed this turn, in passing order
    pub passing_order: Vec<PlayerId>,
    pub first_player: PlayerId,
    /// Turn number (starts at 1 once the first turn begins)
    pub turn_number: u32,
    pub phase: GamePhase,
    rng: StdRng,
}

impl GameState {
    /// Set up a game for the given seating.
    ///
    /// Builds the road and castle, prints every deck into its pile and deals
    /// the opening hands. Fails before creating anything if the data or the
    /// seating is unusable.
    pub fn new(data: &GameData, version: Version, colors: &[Color], seed: u64) -> Result<Self, GameError> {
        data.validate()?;
        data.check_player_count(colors.len())?;
        let mut seen = HashSet::new();
        for color in colors {
            if !seen.insert(*color) {
                return Err(ConfigError::DuplicateColor(color.to_string()).into());
            }
        }

        let n_players = colors.len();
        let beginner = version.is_beginner();
        let catalog = Catalog::from_data(data);
        let mut rng = StdRng::seed_from_u64(seed);

        // Road: shuffled neutral buildings, then the fixed last one
        let last = catalog
            .find_shared(&data.road.last_neutral)
            .filter(|b| b.kind == BuildingKind::Neutral)
            .ok_or_else(|| ConfigError::UnknownBuilding(data.road.last_neutral.clone()))?
            .id;
        let mut neutrals: Vec<BuildingId> = catalog
            .of_kind(BuildingKind::Neutral)
            .filter(|b| b.in_version(beginner) && b.id != last)
            .map(|b| b.id)
            .collect();
        neutrals.shuffle(&mut rng);
        let leading = data
            .road
            .leading_neutrals
            .get(n_players)
            .ok_or(ConfigError::UnsupportedPlayerCount(n_players))?;
        if neutrals.len() < leading {
            return Err(ConfigError::NotEnoughNeutrals {
                needed: leading,
                available: neutrals.len(),
            }
            .into());
        }
        neutrals.truncate(leading);
        neutrals.push(last);
        let mut road = Road::new(neutrals);

        if !beginner {
            let start = catalog
                .find_shared(&data.road.provost_start)
                .and_then(|b| road.position_of(b.id))
                .ok_or_else(|| ConfigError::UnknownBuilding(data.road.provost_start.clone()))?;
            road.set_provost(Some(start));
        }

        let castle = Castle::new(
            data.castle
                .iter()
                .map(|t| {
                    CastleTier::new(
                        t.name.clone(),
                        t.front_color.clone(),
                        t.prestige_points,
                        t.tokens.get(n_players).unwrap_or(0),
                    )
                })
                .collect(),
        );

        let mut area_cubes = BTreeMap::new();
        for building in catalog.of_kind(BuildingKind::Player) {
            for effect in building.primary.iter().chain(building.secondary.iter()) {
                if let Behavior::AreaGain { cubes, .. } = &effect.behavior {
                    area_cubes.insert(building.id, cubes.get(n_players).unwrap_or(0));
                }
            }
        }

        let mut players: Vec<Player> = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                let deck = catalog
                    .deck_of(color)
                    .filter(|b| b.in_version(beginner))
                    .map(|b| b.id);
                Player::new(i as PlayerId, color, &data.player_setup, deck)
            })
            .collect();

        let hand_size = data.player_setup.cards_in_hand as usize;
        for player in &mut players {
            player.draw_cards(hand_size, &mut rng);
        }

        Ok(Self {
            version,
            catalog,
            rules: data.phases.clone(),
            player_setup: data.player_setup.clone(),
            players,
            road,
            castle,
            prestige_owners: BTreeMap::new(),
            area_cubes,
            passing_order: Vec::new(),
            first_player: 0,
            turn_number: 0,
            phase: GamePhase::Setup,
            rng,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &PhaseRules {
        &self.rules
    }

    pub fn player_setup(&self) -> &PlayerSetup {
        &self.player_setup
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(id as usize)
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Throw away a player's hand and draw a full new one
    pub fn redraw_hand(&mut self, player: PlayerId) -> Result<Vec<BuildingId>, GameError> {
        let hand_size = self.player_setup.cards_in_hand as usize;
        let p = self
            .players
            .get_mut(player as usize)
            .ok_or(GameError::UnknownPlayer(player))?;
        p.move_all(CardLocation::Hand, CardLocation::Discard);
        Ok(p.draw_cards(hand_size, &mut self.rng))
    }

    pub fn seat_of(&self, color: Color) -> Option<PlayerId> {
        self.players.iter().find(|p| p.color == color).map(|p| p.id)
    }

    /// Current owner of a building, if any
    pub fn owner_of(&self, building: BuildingId) -> Option<PlayerId> {
        let b = self.catalog.get(building);
        match b.kind {
            BuildingKind::Prestige => self.prestige_owners.get(&building).copied(),
            BuildingKind::Player | BuildingKind::Residence => b.color.and_then(|c| self.seat_of(c)),
            BuildingKind::Neutral => None,
        }
    }

    /// Prestige buildings of this version nobody has built yet
    pub fn available_prestige(&self) -> Vec<BuildingId> {
        let beginner = self.version.is_beginner();
        self.catalog
            .of_kind(BuildingKind::Prestige)
            .filter(|b| b.in_version(beginner) && !self.prestige_owners.contains_key(&b.id))
            .map(|b| b.id)
            .collect()
    }

    /// The game ends as soon as the castle is empty
    pub fn is_over(&self) -> bool {
        self.castle.is_empty()
    }

    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passing_order.contains(&player)
    }

    // ==================== Action Enumeration ====================

    /// Get all currently valid actions for a player.
    ///
    /// Outside the actions phase, or once the player has passed, nothing is
    /// offered. Otherwise `Pass` always comes first.
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let mut actions = Vec::new();
        if self.phase != GamePhase::Actions || self.has_passed(player) {
            return actions;
        }
        let Some(p) = self.get_player(player) else {
            return actions;
        };
        actions.push(GameAction::Pass);

        let rules = &self.rules.actions;
        let deniers = p.resources.deniers;

        if deniers >= rules.draw_card_cost && p.can_draw() {
            actions.push(GameAction::DrawCard);
        }
        if deniers >= rules.refill_hand_cost && p.count_in(CardLocation::Hand) > 0 && p.can_draw() {
            actions.push(GameAction::RefillHand);
        }

        if deniers >= rules.place_worker_cost && p.workers >= rules.workers_per_placement {
            for (i, slot) in self.road.slots().iter().enumerate() {
                if slot.worker.is_none() && self.catalog.get(slot.building).allows_worker() {
                    actions.push(GameAction::PlaceWorker { slot: i });
                }
            }
        }

        for card in p.hand() {
            for payment in all_payments(&p.resources, &self.catalog.get(card).cost) {
                actions.push(GameAction::ConstructFromHand {
                    building: card,
                    payment,
                });
            }
        }

        let available = self.available_prestige();
        match self.version {
            Version::Beginner => {
                for &building in &available {
                    for payment in all_payments(&p.resources, &self.catalog.get(building).cost) {
                        actions.push(GameAction::ConstructPrestige { building, payment });
                    }
                }
            }
            Version::Standard => {
                for (i, slot) in self.road.slots().iter().enumerate() {
                    let upgradeable = self.catalog.get(slot.building).can_be_prestige()
                        && self.owner_of(slot.building) == Some(player);
                    if !upgradeable {
                        continue;
                    }
                    for &building in &available {
                        for payment in all_payments(&p.resources, &self.catalog.get(building).cost) {
                            actions.push(GameAction::UpgradeToPrestige {
                                slot: i,
                                building,
                                payment,
                            });
                        }
                    }
                }
            }
        }

        actions
    }

    // ==================== Action Resolution ====================

    /// Apply one of the player's valid actions
    pub fn apply_action(&mut self, player: PlayerId, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != GamePhase::Actions {
            return Err(GameError::InvalidPhase);
        }
        if !self.valid_actions(player).contains(&action) {
            return Err(GameError::IllegalAction { player, action });
        }

        let events = self.resolve_action(player, action)?;
        if !self.player_mut(player)?.resources.is_non_negative() {
            return Err(GameError::NegativeLedger(player));
        }
        Ok(events)
    }

    fn resolve_action(&mut self, player: PlayerId, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        let rules = self.rules.actions.clone();
        let mut events = Vec::new();

        match action {
            GameAction::Pass => {
                let position = self.passing_order.len();
                let bonus = if position == 0 { rules.first_pass_bonus } else { 0 };
                self.player_mut(player)?.resources.deniers += bonus;
                self.passing_order.push(player);
                events.push(GameEvent::Passed {
                    player,
                    position,
                    bonus,
                });
            }

            GameAction::DrawCard => {
                events.push(GameEvent::ActionTaken {
                    player,
                    action: GameAction::DrawCard,
                });
                let idx = player as usize;
                self.players[idx].resources.deniers -= rules.draw_card_cost;
                let cards = self.players[idx].draw_cards(1, &mut self.rng);
                events.push(GameEvent::CardsDrawn { player, cards });
            }

            GameAction::RefillHand => {
                events.push(GameEvent::ActionTaken {
                    player,
                    action: GameAction::RefillHand,
                });
                let idx = player as usize;
                let p = &mut self.players[idx];
                p.resources.deniers -= rules.refill_hand_cost;
                let count = p.count_in(CardLocation::Hand);
                p.move_all(CardLocation::Hand, CardLocation::Discard);
                let cards = p.draw_cards(count, &mut self.rng);
                events.push(GameEvent::CardsDrawn { player, cards });
            }

            GameAction::PlaceWorker { slot } => {
                let p = self.player_mut(player)?;
                p.resources.deniers -= rules.place_worker_cost;
                p.workers -= rules.workers_per_placement;
                self.road.place_worker(slot, player);
                events.push(GameEvent::ActionTaken { player, action });
            }

            GameAction::ConstructFromHand { building, payment } => {
                let p = self.player_mut(player)?;
                p.resources.apply(&payment);
                p.move_card(building, CardLocation::Road);
                self.road.push(building);
                events.push(GameEvent::ActionTaken { player, action });
            }

            GameAction::ConstructPrestige { building, payment } => {
                let points = self.catalog.get(building).prestige_points;
                let p = self.player_mut(player)?;
                p.resources.apply(&payment);
                p.prestige_points += points;
                self.prestige_owners.insert(building, player);
                events.push(GameEvent::ActionTaken { player, action });
            }

            GameAction::UpgradeToPrestige {
                slot,
                building,
                payment,
            } => {
                self.player_mut(player)?.resources.apply(&payment);
                self.prestige_owners.insert(building, player);
                self.road.upgrade(slot, building);
                events.push(GameEvent::ActionTaken { player, action });
            }
        }

        Ok(events)
    }

    // ==================== Scoring ====================

    /// Prestige value of the visible road buildings a player owns
    pub fn road_points(&self, player: PlayerId) -> u32 {
        self.road
            .slots()
            .iter()
            .filter(|slot| self.owner_of(slot.building) == Some(player))
            .map(|slot| self.catalog.get(slot.building).prestige_points)
            .sum()
    }

    /// Calculate total prestige points for a player
    pub fn total_prestige_points(&self, player: PlayerId) -> u32 {
        self.get_player(player)
            .map(|p| p.score(self.road_points(player)))
            .unwrap_or(0)
    }

    /// Scores of every player and everyone tied at the top
    pub fn outcome(&self) -> GameOutcome {
        let scores: Vec<(PlayerId, u32)> = self
            .players
            .iter()
            .map(|p| (p.id, self.total_prestige_points(p.id)))
            .collect();
        let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
        let winners = scores
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|(id, _)| *id)
            .collect();
        GameOutcome { scores, winners }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Ledger, Resource};
    use pretty_assertions::assert_eq;

    fn new_game(version: Version, players: usize) -> GameState {
        let data = GameData::standard().unwrap();
        GameState::new(&data, version, &Color::ALL[..players], 42).unwrap()
    }

    fn card_named(game: &GameState, color: Color, name: &str) -> BuildingId {
        game.catalog()
            .deck_of(color)
            .find(|b| b.name == name)
            .map(|b| b.id)
            .unwrap()
    }

    #[test]
    fn test_setup_deals_hands_and_builds_road() {
        let game = new_game(Version::Standard, 4);
        assert_eq!(game.phase, GamePhase::Setup);
        assert_eq!(game.road.len(), 4);
        let last = game.road.slots().last().unwrap().building;
        assert_eq!(game.catalog().get(last).name, "Peddler");
        assert_eq!(game.road.provost(), Some(3));
        for p in &game.players {
            assert_eq!(p.count_in(CardLocation::Hand), 3);
            assert_eq!(p.deck_size(), 12);
        }
    }

    #[test]
    fn test_beginner_has_no_provost_and_fewer_prestige() {
        let game = new_game(Version::Beginner, 2);
        assert_eq!(game.road.len(), 2);
        assert_eq!(game.road.provost(), None);
        let standard = new_game(Version::Standard, 2);
        assert!(game.available_prestige().len() < standard.available_prestige().len());
    }

    #[test]
    fn test_castle_counts_follow_player_count() {
        let two = new_game(Version::Standard, 2);
        let four = new_game(Version::Standard, 4);
        assert_eq!(two.castle.remaining(), 6 + 8 + 10);
        assert_eq!(four.castle.remaining(), 8 + 10 + 12);
    }

    #[test]
    fn test_duplicate_color_is_rejected() {
        let data = GameData::standard().unwrap();
        let result = GameState::new(&data, Version::Standard, &[Color::Red, Color::Red], 1);
        assert!(matches!(
            result,
            Err(GameError::Config(ConfigError::DuplicateColor(_)))
        ));
    }

    #[test]
    fn test_single_player_is_rejected() {
        let data = GameData::standard().unwrap();
        let result = GameState::new(&data, Version::Standard, &[Color::Red], 1);
        assert!(matches!(
            result,
            Err(GameError::Config(ConfigError::UnsupportedPlayerCount(1)))
        ));
    }

    #[test]
    fn test_no_actions_outside_actions_phase() {
        let game = new_game(Version::Standard, 2);
        assert!(game.valid_actions(0).is_empty());
    }

    #[test]
    fn test_pass_always_offered() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        game.players[0].resources = Ledger::new();
        game.players[0].workers = 0;
        game.players[0].move_all(CardLocation::Hand, CardLocation::Discard);
        assert_eq!(game.valid_actions(0), vec![GameAction::Pass]);
    }

    #[test]
    fn test_worker_slots_offered_when_affordable() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        let actions = game.valid_actions(0);
        let slots: Vec<usize> = actions
            .iter()
            .filter_map(|a| match a {
                GameAction::PlaceWorker { slot } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn test_construct_offers_each_payment() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        let farm = card_named(&game, Color::Red, "Large Farm");
        let p = &mut game.players[0];
        p.move_all(CardLocation::Hand, CardLocation::Pile);
        p.move_card(farm, CardLocation::Hand);
        // wood + any: any can land on food, wood or stone
        p.resources = Ledger::with_amounts(0, 1, 2, 1, 0);
        let payments: Vec<Ledger> = game
            .valid_actions(0)
            .into_iter()
            .filter_map(|a| match a {
                GameAction::ConstructFromHand { building, payment } if building == farm => Some(payment),
                _ => None,
            })
            .collect();
        assert_eq!(payments.len(), 3);
    }

    #[test]
    fn test_first_passer_gets_bonus() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        let before = game.players[1].resources.deniers;
        game.apply_action(1, GameAction::Pass).unwrap();
        game.apply_action(0, GameAction::Pass).unwrap();
        assert_eq!(game.players[1].resources.deniers, before + 1);
        assert_eq!(game.passing_order, vec![1, 0]);
        assert!(game.valid_actions(1).is_empty());
    }

    #[test]
    fn test_place_worker_consumes_worker_and_money() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        game.apply_action(0, GameAction::PlaceWorker { slot: 1 }).unwrap();
        assert_eq!(game.players[0].workers, 5);
        assert_eq!(game.players[0].resources.deniers, 4);
        assert_eq!(game.road.slot(1).unwrap().worker, Some(0));
        assert!(matches!(
            game.apply_action(1, GameAction::PlaceWorker { slot: 1 }),
            Err(GameError::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_construct_from_hand_appends_to_road() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        let farm = card_named(&game, Color::Red, "Small Farm");
        game.players[0].move_card(farm, CardLocation::Hand);
        let payment = Ledger::of(Resource::Wood, -1);
        game.apply_action(0, GameAction::ConstructFromHand { building: farm, payment })
            .unwrap();
        assert_eq!(game.road.slots().last().unwrap().building, farm);
        assert_eq!(game.players[0].location_of(farm), Some(CardLocation::Road));
        assert_eq!(game.players[0].resources.wood, 0);
        assert_eq!(game.road_points(0), 1);
    }

    #[test]
    fn test_beginner_prestige_scores_immediately() {
        let mut game = new_game(Version::Beginner, 2);
        game.phase = GamePhase::Actions;
        game.players[0].resources = Ledger::with_amounts(0, 0, 0, 2, 1);
        let statue = game.catalog().find_shared("Statue").unwrap().id;
        let payment = Ledger::with_amounts(0, 0, 0, -2, -1);
        game.apply_action(0, GameAction::ConstructPrestige { building: statue, payment })
            .unwrap();
        assert_eq!(game.players[0].prestige_points, 3);
        assert_eq!(game.owner_of(statue), Some(0));
        assert!(!game.available_prestige().contains(&statue));
    }

    #[test]
    fn test_standard_prestige_needs_own_residence() {
        let mut game = new_game(Version::Standard, 2);
        game.phase = GamePhase::Actions;
        game.players[0].resources = Ledger::with_amounts(0, 0, 0, 2, 1);
        let statue = game.catalog().find_shared("Statue").unwrap().id;
        let upgrade = |g: &GameState| {
            g.valid_actions(0)
                .into_iter()
                .any(|a| matches!(a, GameAction::UpgradeToPrestige { building, .. } if building == statue))
        };
        assert!(!upgrade(&game));

        let residence = game.catalog().residence_of(Color::Red).unwrap();
        game.road.push(residence);
        assert!(upgrade(&game));

        let slot = game.road.len() - 1;
        let payment = Ledger::with_amounts(0, 0, 0, -2, -1);
        game.apply_action(0, GameAction::UpgradeToPrestige { slot, building: statue, payment })
            .unwrap();
        assert_eq!(game.road.slot(slot).unwrap().building, statue);
        assert_eq!(game.players[0].prestige_points, 0);
        assert_eq!(game.road_points(0), 3);
    }

    #[test]
    fn test_outcome_reports_ties() {
        let mut game = new_game(Version::Standard, 3);
        for p in &mut game.players {
            p.resources = Ledger::new();
        }
        game.players[0].prestige_points = 5;
        game.players[2].prestige_points = 5;
        let outcome = game.outcome();
        assert_eq!(outcome.winners, vec![0, 2]);
        assert_eq!(outcome.scores[1], (1, 0));
    }
}
