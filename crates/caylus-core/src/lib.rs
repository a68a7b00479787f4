//! Caylus Magna Carta - a worker-placement game engine
//!
//! This crate provides the core game logic, including:
//! - Resource ledgers and the payment solver for wild-substitutable costs
//! - The building catalog and its effect behaviors, loaded from JSON data
//! - The road, the provost and the castle token pool
//! - A phase engine driving turns through pluggable decision providers
//!
//! # Architecture
//!
//! The engine never asks anyone anything directly. Every choice goes through a
//! [`DecisionProvider`], one per seat, and every observable change is emitted as
//! a [`GameEvent`] to an [`EventSink`]. A seeded game with seeded providers is
//! fully reproducible.
//!
//! # Modules
//!
//! - [`resource`]: Resource kinds, ledgers, costs and prices
//! - [`payment`]: Distinct minimal payments for a cost
//! - [`building`]: Building catalog and effect behaviors
//! - [`data`]: Static game data and its validation
//! - [`road`]: Road slots, workers and the provost
//! - [`castle`]: Castle token pool and batch counting
//! - [`player`]: Player state and decks
//! - [`game`]: Game state, action enumeration and scoring
//! - [`effects`]: Building effect dispatch
//! - [`engine`]: Turn and phase loop
//! - [`decision`]: Decision provider and event sink seams
//! - [`bot`]: Uniform random player

pub mod actions;
pub mod bot;
pub mod building;
pub mod castle;
pub mod data;
pub mod decision;
pub mod effects;
pub mod engine;
pub mod game;
pub mod payment;
pub mod player;
pub mod resource;
pub mod road;

// Re-export commonly used types
pub use actions::{EffectRole, GameAction, GameEvent, IncomeSource};
pub use bot::RandomBot;
pub use building::{Behavior, Building, BuildingId, BuildingKind, Catalog, Effect};
pub use castle::{consume_batches, max_batches, Castle, CastleTier};
pub use data::{ConfigError, GameData};
pub use decision::{DecisionProvider, EventSink, NullSink};
pub use engine::{Game, Seat};
pub use game::{GameError, GameOutcome, GamePhase, GameState, Version};
pub use payment::{all_payments, single_payment};
pub use player::{CardLocation, Color, Player, PlayerId};
pub use resource::{Cost, Ledger, Price, Resource};
pub use road::{Road, Slot};
