//! Turn and phase engine.
//!
//! `Game` owns a [`GameState`] plus one [`DecisionProvider`] per seat and
//! drives the six phases of every turn until the castle is empty:
//!
//! - Income: stipend for everyone, residence and hotel income in standard games
//! - Actions: seating order from the first player until everyone has passed
//! - Provost movement (standard only): passing order, paid per step
//! - Building effects: road order, gated by the provost in standard games
//! - Castle: passing order, most batches wins the bonus
//! - End of turn: provost advance and first player rotation

use crate::actions::{EffectRole, GameAction, GameEvent, IncomeSource};
use crate::building::{BuildingId, BuildingKind, IncomeHook};
use crate::castle::{consume_batches, max_batches};
use crate::data::GameData;
use crate::decision::{DecisionProvider, EventSink, NullSink};
use crate::effects::resolve_effect;
use crate::game::{GameError, GameOutcome, GamePhase, GameState, Version};
use crate::player::{Color, PlayerId};
use crate::resource::Resource;
use tracing::{debug, trace};

/// A color and whoever decides for it
pub struct Seat {
    pub color: Color,
    pub provider: Box<dyn DecisionProvider>,
}

impl Seat {
    pub fn new(color: Color, provider: impl DecisionProvider + 'static) -> Self {
        Self {
            color,
            provider: Box::new(provider),
        }
    }
}

fn seat(providers: &mut [Box<dyn DecisionProvider>], player: PlayerId) -> Result<&mut dyn DecisionProvider, GameError> {
    providers
        .get_mut(player as usize)
        .map(|p| -> &mut dyn DecisionProvider { p.as_mut() })
        .ok_or(GameError::UnknownPlayer(player))
}

/// A running game
pub struct Game {
    state: GameState,
    providers: Vec<Box<dyn DecisionProvider>>,
    sink: Box<dyn EventSink>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Set up a game; seats are in seating order
    pub fn new(data: &GameData, version: Version, seats: Vec<Seat>, seed: u64) -> Result<Self, GameError> {
        let colors: Vec<Color> = seats.iter().map(|s| s.color).collect();
        let state = GameState::new(data, version, &colors, seed)?;
        debug!(%version, players = colors.len(), seed, "game created");
        Ok(Self {
            state,
            providers: seats.into_iter().map(|s| s.provider).collect(),
            sink: Box::new(NullSink),
            events: Vec::new(),
        })
    }

    /// Forward every event to `sink` as it happens
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for tests and tools that set up positions by hand
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Every event emitted so far
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    fn emit(&mut self, event: GameEvent) {
        trace!(?event, "event");
        self.sink.emit(&event);
        self.events.push(event);
    }

    fn emit_all(&mut self, events: Vec<GameEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Play turns until the castle is empty, then score
    pub fn run(&mut self) -> Result<GameOutcome, GameError> {
        while !self.state.is_over() {
            self.play_turn()?;
        }
        Ok(self.finish())
    }

    /// Play one full turn. Opening hands are settled before the first one.
    pub fn play_turn(&mut self) -> Result<(), GameError> {
        if self.state.is_over() {
            return Err(GameError::GameOver);
        }
        if self.state.phase == GamePhase::Setup {
            self.settle_hands()?;
        }

        self.state.turn_number += 1;
        debug!(turn = self.state.turn_number, first_player = self.state.first_player, "turn started");
        self.emit(GameEvent::TurnStarted {
            turn: self.state.turn_number,
            first_player: self.state.first_player,
        });

        for phase in [
            GamePhase::Income,
            GamePhase::Actions,
            GamePhase::ProvostMovement,
            GamePhase::BuildingEffects,
            GamePhase::Castle,
            GamePhase::EndTurn,
        ] {
            self.run_phase(phase)?;
        }
        Ok(())
    }

    /// Run a single phase if it belongs to this game's version
    pub fn run_phase(&mut self, phase: GamePhase) -> Result<(), GameError> {
        let rules = self.state.rules();
        let in_beginner = match phase {
            GamePhase::Income => rules.income.beginner,
            GamePhase::Actions => rules.actions.beginner,
            GamePhase::ProvostMovement => rules.provost.beginner,
            GamePhase::BuildingEffects => rules.effects.beginner,
            GamePhase::Castle => rules.castle.beginner,
            GamePhase::EndTurn => rules.end_turn.beginner,
            GamePhase::Setup | GamePhase::Finished => return Err(GameError::InvalidPhase),
        };
        if self.state.version().is_beginner() && !in_beginner {
            trace!(?phase, "phase skipped");
            return Ok(());
        }

        self.state.phase = phase;
        self.emit(GameEvent::PhaseStarted { phase });
        match phase {
            GamePhase::Income => self.income_phase(),
            GamePhase::Actions => self.actions_phase(),
            GamePhase::ProvostMovement => self.provost_phase(),
            GamePhase::BuildingEffects => self.effects_phase(),
            GamePhase::Castle => self.castle_phase(),
            GamePhase::EndTurn => self.end_turn_phase(),
            GamePhase::Setup | GamePhase::Finished => Err(GameError::InvalidPhase),
        }
    }

    /// Mark the game finished and report the final scores
    pub fn finish(&mut self) -> GameOutcome {
        self.state.phase = GamePhase::Finished;
        let outcome = self.state.outcome();
        debug!(winners = ?outcome.winners, "game ended");
        self.emit(GameEvent::GameEnded {
            scores: outcome.scores.clone(),
            winners: outcome.winners.clone(),
        });
        outcome
    }

    // ==================== Setup ====================

    fn settle_hands(&mut self) -> Result<(), GameError> {
        let setup = self.state.player_setup().clone();
        self.emit(GameEvent::HandsDealt {
            cards: setup.cards_in_hand as usize,
        });
        for player in 0..self.state.player_count() as PlayerId {
            for _ in 0..setup.hand_redraws {
                let discard = seat(&mut self.providers, player)?.discard_hand(&self.state, player);
                if !discard {
                    break;
                }
                self.state.redraw_hand(player)?;
                self.emit(GameEvent::HandRedrawn { player });
            }
        }
        Ok(())
    }

    // ==================== Phases ====================

    fn income_phase(&mut self) -> Result<(), GameError> {
        let rules = self.state.rules().income.clone();
        let mut payments: Vec<(PlayerId, i32, IncomeSource)> = (0..self.state.player_count() as PlayerId)
            .map(|p| (p, rules.deniers, IncomeSource::Stipend))
            .collect();

        if !self.state.version().is_beginner() {
            for slot in self.state.road.slots() {
                let (amount, source) = match self.state.catalog().get(slot.building).income {
                    IncomeHook::Residence => (rules.per_residence, IncomeSource::Residence(slot.building)),
                    IncomeHook::Hotel => (rules.hotel, IncomeSource::Hotel(slot.building)),
                    IncomeHook::None => continue,
                };
                if let Some(owner) = self.state.owner_of(slot.building) {
                    payments.push((owner, amount, source));
                }
            }
        }

        for (player, deniers, source) in payments {
            self.state.player_mut(player)?.resources.deniers += deniers;
            self.emit(GameEvent::IncomeReceived {
                player,
                deniers,
                source,
            });
        }
        Ok(())
    }

    fn actions_phase(&mut self) -> Result<(), GameError> {
        self.state.passing_order.clear();
        let n = self.state.player_count();
        let first = self.state.first_player as usize;
        let mut active: Vec<PlayerId> = (0..n).map(|i| ((first + i) % n) as PlayerId).collect();
        let mut index = 0;

        while !active.is_empty() {
            let player = active[index];
            let options = self.state.valid_actions(player);
            let action = seat(&mut self.providers, player)?.choose_action(&self.state, player, &options);
            if !options.contains(&action) {
                return Err(GameError::InvalidDecision {
                    player,
                    decision: "choose_action",
                });
            }
            trace!(player, ?action, options = options.len(), "action chosen");

            let passed = action == GameAction::Pass;
            let events = self.state.apply_action(player, action)?;
            self.emit_all(events);

            if passed {
                active.remove(index);
                if index >= active.len() {
                    index = 0;
                }
            } else {
                index = (index + 1) % active.len();
            }
        }
        Ok(())
    }

    fn provost_phase(&mut self) -> Result<(), GameError> {
        let rules = self.state.rules().provost.clone();
        let order = self.state.passing_order.clone();

        for _ in 0..rules.rounds {
            for &player in &order {
                let Some(position) = self.state.road.provost() else {
                    return Ok(());
                };
                let position = position as i32;
                let last = self.state.road.len() as i32 - 1;
                let deniers = self.state.player_mut(player)?.resources.deniers;
                let affordable = if rules.cost_per_step > 0 {
                    deniers / rules.cost_per_step
                } else {
                    rules.max_steps
                };

                let min = (-position).max(-rules.max_steps).max(-affordable);
                let max = (last - position).min(rules.max_steps).min(affordable);
                if min >= max {
                    continue;
                }

                let delta = seat(&mut self.providers, player)?.provost_delta(&self.state, player, min, max);
                if delta < min || delta > max {
                    return Err(GameError::InvalidDecision {
                        player,
                        decision: "provost_delta",
                    });
                }
                if delta == 0 {
                    continue;
                }

                let cost = delta.abs() * rules.cost_per_step;
                self.state.road.move_provost(delta);
                self.state.player_mut(player)?.resources.deniers -= cost;
                let position = self.state.road.provost().unwrap_or_default();
                self.emit(GameEvent::ProvostMoved {
                    player,
                    delta,
                    position,
                    cost,
                });
            }
        }
        Ok(())
    }

    fn effects_phase(&mut self) -> Result<(), GameError> {
        let per_placement = self.state.rules().actions.workers_per_placement;

        for index in 0..self.state.road.len() {
            let Some(building) = self.state.road.take_resolving_building(index) else {
                continue;
            };
            let Some(worker) = self.state.road.slot(index).and_then(|s| s.worker) else {
                continue;
            };

            if self.state.road.is_before_provost(index) {
                let events = self.resolve(building, worker, EffectRole::Primary)?;
                self.emit_all(events);

                let owned = self.state.catalog().get(building).kind == BuildingKind::Player;
                if let Some(owner) = self.state.owner_of(building).filter(|&o| owned && o != worker) {
                    let events = self.resolve(building, owner, EffectRole::Secondary)?;
                    self.emit_all(events);
                }
            } else {
                trace!(slot = index, "past the provost");
            }

            if let Some(player) = self.state.road.take_worker(index) {
                self.state.player_mut(player)?.workers += per_placement;
                self.emit(GameEvent::WorkerReturned { player, slot: index });
            }
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        building: BuildingId,
        player: PlayerId,
        role: EffectRole,
    ) -> Result<Vec<GameEvent>, GameError> {
        let provider = seat(&mut self.providers, player)?;
        resolve_effect(&mut self.state, provider, building, player, role)
    }

    fn castle_phase(&mut self) -> Result<(), GameError> {
        let rules = self.state.rules().castle.clone();
        let order = self.state.passing_order.clone();
        let mut best: Option<(PlayerId, u32)> = None;

        for player in order {
            let holdings = self.state.player_mut(player)?.resources;
            let max = max_batches(&holdings, &rules.batch).min(self.state.castle.remaining());
            if max == 0 {
                continue;
            }
            let batches = seat(&mut self.providers, player)?.offer_batches(&self.state, player, max);
            if batches > max {
                return Err(GameError::InvalidDecision {
                    player,
                    decision: "offer_batches",
                });
            }
            if batches == 0 {
                continue;
            }

            let prestige_points = self.state.castle.remove_tokens(batches);
            let p = self.state.player_mut(player)?;
            consume_batches(&mut p.resources, &rules.batch, batches);
            p.prestige_points += prestige_points;
            if !p.resources.is_non_negative() {
                return Err(GameError::NegativeLedger(player));
            }
            self.emit(GameEvent::BatchesOffered {
                player,
                batches,
                prestige_points,
            });

            // ties go to whoever offered first
            if best.map_or(true, |(_, most)| batches > most) {
                best = Some((player, batches));
            }
        }

        match best {
            Some((player, _)) => {
                self.state.player_mut(player)?.resources.add(Resource::WILD, rules.gold_bonus);
                self.emit(GameEvent::CastleBonus {
                    player,
                    resource: Resource::WILD,
                    amount: rules.gold_bonus,
                });
            }
            None => {
                let count = rules.tokens_removed_if_none.min(self.state.castle.remaining());
                let prestige_points = self.state.castle.remove_tokens(count);
                self.emit(GameEvent::TokensRemoved {
                    count,
                    prestige_points,
                });
            }
        }
        Ok(())
    }

    fn end_turn_phase(&mut self) -> Result<(), GameError> {
        if !self.state.version().is_beginner() {
            if let Some(position) = self.state.road.provost() {
                let advance = self.state.rules().end_turn.provost_advance as usize;
                self.state.road.set_provost(Some(position + advance));
                if let Some(position) = self.state.road.provost() {
                    self.emit(GameEvent::ProvostAdvanced { position });
                }
            }
        }
        let n = self.state.player_count() as PlayerId;
        self.state.first_player = (self.state.first_player + 1) % n;
        Ok(())
    }
}
