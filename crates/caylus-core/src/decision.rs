//! Seams between the engine and the outside world.
//!
//! - [`DecisionProvider`]: answers every choice a player has to make
//! - [`EventSink`]: receives every event the engine emits
//!
//! Providers are only shown options the engine has already checked. Any
//! answer outside those options aborts the game with
//! [`GameError::InvalidDecision`](crate::game::GameError::InvalidDecision).

use crate::actions::{GameAction, GameEvent};
use crate::game::GameState;
use crate::player::PlayerId;
use crate::resource::{Ledger, Price, Resource};

/// Makes decisions on behalf of one seated player
pub trait DecisionProvider {
    /// Whether to throw away the opening hand and draw a new one
    fn discard_hand(&mut self, game: &GameState, player: PlayerId) -> bool;

    /// Pick one of the legal actions; `options` always contains `Pass`
    fn choose_action(&mut self, game: &GameState, player: PlayerId, options: &[GameAction]) -> GameAction;

    /// Signed provost shift within `[min, max]`
    fn provost_delta(&mut self, game: &GameState, player: PlayerId, min: i32, max: i32) -> i32;

    /// One of `gains` for `cost`, or `None` to decline
    fn buy_resource(
        &mut self,
        game: &GameState,
        player: PlayerId,
        cost: Price,
        gains: &[Resource],
    ) -> Option<Resource>;

    /// Between zero and `tiers.len()` cubes from `gains`; the count selects
    /// the tier paid, zero declines
    fn buy_resource_tiers(
        &mut self,
        game: &GameState,
        player: PlayerId,
        tiers: &[Price],
        gains: &[Resource],
    ) -> Vec<Resource>;

    /// A prefix of `tokens` (castle tier indices in removal order); its length
    /// selects the tier paid, empty declines
    fn buy_castle_tokens(
        &mut self,
        game: &GameState,
        player: PlayerId,
        tiers: &[Price],
        tokens: &[usize],
    ) -> Vec<usize>;

    /// One of `choices` to give up for `gain`; `None` only when `optional`
    fn exchange(
        &mut self,
        game: &GameState,
        player: PlayerId,
        choices: &[Resource],
        gain: Price,
        optional: bool,
    ) -> Option<Resource>;

    /// One of `slots` to turn into a residence for `payment`, or `None`
    fn construct_residence(
        &mut self,
        game: &GameState,
        player: PlayerId,
        payment: &Ledger,
        slots: &[usize],
    ) -> Option<usize>;

    /// Number of batches to offer, within `[0, max]`
    fn offer_batches(&mut self, game: &GameState, player: PlayerId, max: u32) -> u32;
}

/// Receives events as the engine emits them
pub trait EventSink {
    fn emit(&mut self, event: &GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &GameEvent) {}
}
