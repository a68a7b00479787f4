//! Game actions that players can take.
//!
//! This module defines the actions offered during the actions phase and the
//! events emitted while a game runs.

use crate::building::BuildingId;
use crate::game::GamePhase;
use crate::player::PlayerId;
use crate::resource::{Ledger, Resource};
use serde::{Deserialize, Serialize};

/// Everything a player may do on their turn of the actions phase.
///
/// Each action carries the parameters it needs to be applied directly,
/// including the exact payment for constructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Stop acting for the rest of the phase
    Pass,

    // ==================== Cards ====================
    /// Pay to draw one card
    DrawCard,
    /// Pay to discard the whole hand and draw as many cards
    RefillHand,

    // ==================== Workers ====================
    /// Pay to put a worker on an empty road slot
    PlaceWorker { slot: usize },

    // ==================== Construction ====================
    /// Build a card from hand at the end of the road
    ConstructFromHand { building: BuildingId, payment: Ledger },
    /// Build a prestige building directly (beginner version)
    ConstructPrestige { building: BuildingId, payment: Ledger },
    /// Build a prestige building over one of the player's residences
    /// (standard version)
    UpgradeToPrestige {
        slot: usize,
        building: BuildingId,
        payment: Ledger,
    },
}

/// Whose effect of a building is resolving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectRole {
    /// For the worker's owner
    Primary,
    /// For the building's owner
    Secondary,
}

/// Why a player was paid during the income phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeSource {
    Stipend,
    Residence(BuildingId),
    Hotel(BuildingId),
}

/// Events that occur while a game runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Opening hands were dealt
    HandsDealt { cards: usize },

    /// A player threw away their opening hand and drew a new one
    HandRedrawn { player: PlayerId },

    /// A new turn began
    TurnStarted { turn: u32, first_player: PlayerId },

    /// A phase began
    PhaseStarted { phase: GamePhase },

    /// A player received income
    IncomeReceived {
        player: PlayerId,
        deniers: i32,
        source: IncomeSource,
    },

    /// A player took an action other than passing
    ActionTaken { player: PlayerId, action: GameAction },

    /// Cards moved into a player's hand
    CardsDrawn { player: PlayerId, cards: Vec<BuildingId> },

    /// A player passed
    Passed {
        player: PlayerId,
        /// Position in the passing list, from 0
        position: usize,
        bonus: i32,
    },

    /// A player moved the provost
    ProvostMoved {
        player: PlayerId,
        delta: i32,
        position: usize,
        cost: i32,
    },

    /// The provost advanced at the end of the turn
    ProvostAdvanced { position: usize },

    /// A building effect changed a player's holdings
    EffectApplied {
        player: PlayerId,
        building: BuildingId,
        role: EffectRole,
        delta: Ledger,
        prestige_points: u32,
    },

    /// A player chose not to use an effect
    EffectDeclined {
        player: PlayerId,
        building: BuildingId,
        role: EffectRole,
    },

    /// An effect could not apply (unaffordable, nothing to choose, empty pool)
    EffectUnavailable {
        player: PlayerId,
        building: BuildingId,
        role: EffectRole,
    },

    /// A road building was turned into a residence
    ResidenceBuilt {
        player: PlayerId,
        slot: usize,
        replaced: BuildingId,
    },

    /// A worker went back to its owner
    WorkerReturned { player: PlayerId, slot: usize },

    /// A player offered batches to the castle
    BatchesOffered {
        player: PlayerId,
        batches: u32,
        prestige_points: u32,
    },

    /// The player who offered the most batches got the bonus
    CastleBonus {
        player: PlayerId,
        resource: Resource,
        amount: i32,
    },

    /// Tokens left the castle without compensation
    TokensRemoved { count: u32, prestige_points: u32 },

    /// The castle is empty; final scores and winners
    GameEnded {
        scores: Vec<(PlayerId, u32)>,
        winners: Vec<PlayerId>,
    },
}
