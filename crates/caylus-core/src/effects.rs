//! Building effect dispatch.
//!
//! Resolves the primary or secondary effect of a building for one player.
//! Every branch checks affordability before touching any state; when an
//! effect cannot apply nothing changes and an `EffectUnavailable` event is
//! reported instead.

use crate::actions::{EffectRole, GameEvent};
use crate::building::{Behavior, BuildingId, BuildingKind};
use crate::decision::DecisionProvider;
use crate::game::{GameError, GameState};
use crate::payment::all_payments;
use crate::player::{CardLocation, PlayerId};
use crate::resource::{Cost, Ledger, Price, Resource};
use tracing::trace;

/// Resolve one effect of `building` for `player`.
///
/// Buildings without the requested effect produce no events.
pub fn resolve_effect(
    state: &mut GameState,
    provider: &mut dyn DecisionProvider,
    building: BuildingId,
    player: PlayerId,
    role: EffectRole,
) -> Result<Vec<GameEvent>, GameError> {
    let b = state.catalog().get(building);
    let effect = match role {
        EffectRole::Primary => b.primary.clone(),
        EffectRole::Secondary => b.secondary.clone(),
    };
    let Some(effect) = effect else {
        return Ok(Vec::new());
    };
    trace!(player, building = %b, ?role, text = %effect.text, "resolving effect");

    let ctx = Context {
        building,
        player,
        role,
    };
    let holdings = state
        .get_player(player)
        .ok_or(GameError::UnknownPlayer(player))?
        .resources;

    match effect.behavior {
        Behavior::Gain { gain } => ctx.apply(state, gain.as_gain(), 0),

        Behavior::AreaGain { gain, .. } => {
            let left = state.area_cubes.get(&building).copied().unwrap_or(0);
            if left == 0 {
                return Ok(ctx.unavailable());
            }
            let taken = left.min(gain.amount);
            state.area_cubes.insert(building, left - taken);
            ctx.apply(state, Price::new(gain.resource, taken).as_gain(), 0)
        }

        Behavior::Buy { cost, gains } => {
            if !cost.is_affordable(&holdings) {
                return Ok(ctx.unavailable());
            }
            buy_single(state, provider, &ctx, cost, &gains)
        }

        Behavior::BuyTiers { tiers, gains } => {
            let affordable: Vec<Price> = tiers
                .into_iter()
                .filter(|t| t.is_affordable(&holdings))
                .collect();
            match affordable.len() {
                0 => Ok(ctx.unavailable()),
                1 => buy_single(state, provider, &ctx, affordable[0], &gains),
                _ => {
                    let chosen = provider.buy_resource_tiers(state, player, &affordable, &gains);
                    if chosen.is_empty() {
                        return Ok(ctx.declined());
                    }
                    if chosen.len() > affordable.len() || !chosen.iter().all(|r| gains.contains(r)) {
                        return Err(ctx.invalid("buy_resource_tiers"));
                    }
                    let mut delta = affordable[chosen.len() - 1].as_payment();
                    for resource in chosen {
                        delta.add(resource, 1);
                    }
                    ctx.apply(state, delta, 0)
                }
            }
        }

        Behavior::Exchange {
            from,
            gain,
            optional,
        } => {
            let choices: Vec<Resource> = from
                .kinds()
                .iter()
                .copied()
                .filter(|&r| holdings.get(r) >= 1)
                .collect();
            if choices.is_empty() {
                return Ok(ctx.unavailable());
            }
            let choice = if !optional && choices.len() == 1 {
                Some(choices[0])
            } else {
                provider.exchange(state, player, &choices, gain, optional)
            };
            match choice {
                None if optional => Ok(ctx.declined()),
                Some(r) if choices.contains(&r) => {
                    let mut delta = gain.as_gain();
                    delta.add(r, -1);
                    ctx.apply(state, delta, 0)
                }
                _ => Err(ctx.invalid("exchange")),
            }
        }

        Behavior::BuyCastleTokens { tiers } => {
            if state.castle.is_empty() {
                return Ok(ctx.unavailable());
            }
            let mut tokens = state.castle.token_choices();
            let mut costs: Vec<Price> = tiers
                .into_iter()
                .filter(|t| t.is_affordable(&holdings))
                .collect();
            let n = costs.len().min(tokens.len());
            if n == 0 {
                return Ok(ctx.unavailable());
            }
            costs.truncate(n);
            tokens.truncate(n);

            let chosen = provider.buy_castle_tokens(state, player, &costs, &tokens);
            if chosen.is_empty() {
                return Ok(ctx.declined());
            }
            if chosen.len() > n || chosen[..] != tokens[..chosen.len()] {
                return Err(ctx.invalid("buy_castle_tokens"));
            }
            let count = chosen.len();
            let points = state.castle.remove_tokens(count as u32);
            ctx.apply(state, costs[count - 1].as_payment(), points)
        }

        Behavior::ConstructResidence { cost } => construct_residence(state, provider, &ctx, &holdings, &cost),
    }
}

/// Identifies the effect being resolved
struct Context {
    building: BuildingId,
    player: PlayerId,
    role: EffectRole,
}

impl Context {
    fn apply(&self, state: &mut GameState, delta: Ledger, prestige_points: u32) -> Result<Vec<GameEvent>, GameError> {
        let p = state.player_mut(self.player)?;
        if !p.resources.can_apply(&delta) {
            return Err(GameError::NegativeLedger(self.player));
        }
        p.resources.apply(&delta);
        p.prestige_points += prestige_points;
        Ok(vec![GameEvent::EffectApplied {
            player: self.player,
            building: self.building,
            role: self.role,
            delta,
            prestige_points,
        }])
    }

    fn declined(&self) -> Vec<GameEvent> {
        vec![GameEvent::EffectDeclined {
            player: self.player,
            building: self.building,
            role: self.role,
        }]
    }

    fn unavailable(&self) -> Vec<GameEvent> {
        vec![GameEvent::EffectUnavailable {
            player: self.player,
            building: self.building,
            role: self.role,
        }]
    }

    fn invalid(&self, decision: &'static str) -> GameError {
        GameError::InvalidDecision {
            player: self.player,
            decision,
        }
    }
}

/// Pay `cost` for one cube of a chosen kind
fn buy_single(
    state: &mut GameState,
    provider: &mut dyn DecisionProvider,
    ctx: &Context,
    cost: Price,
    gains: &[Resource],
) -> Result<Vec<GameEvent>, GameError> {
    if gains.is_empty() {
        return Ok(ctx.unavailable());
    }
    match provider.buy_resource(state, ctx.player, cost, gains) {
        None => Ok(ctx.declined()),
        Some(r) if gains.contains(&r) => {
            let mut delta = cost.as_payment();
            delta.add(r, 1);
            ctx.apply(state, delta, 0)
        }
        Some(_) => Err(ctx.invalid("buy_resource")),
    }
}

/// Turn one of the player's own road buildings into their residence
fn construct_residence(
    state: &mut GameState,
    provider: &mut dyn DecisionProvider,
    ctx: &Context,
    holdings: &Ledger,
    cost: &Cost,
) -> Result<Vec<GameEvent>, GameError> {
    let player = ctx.player;
    let Some(payment) = all_payments(holdings, cost).into_iter().next() else {
        return Ok(ctx.unavailable());
    };
    let color = state
        .get_player(player)
        .ok_or(GameError::UnknownPlayer(player))?
        .color;
    let Some(residence) = state.catalog().residence_of(color) else {
        return Ok(ctx.unavailable());
    };

    let slots: Vec<usize> = state
        .road
        .slots()
        .iter()
        .enumerate()
        .filter(|(_, slot)| {
            let b = state.catalog().get(slot.building);
            b.kind == BuildingKind::Player && b.can_be_residence && state.owner_of(slot.building) == Some(player)
        })
        .map(|(i, _)| i)
        .collect();
    if slots.is_empty() {
        return Ok(ctx.unavailable());
    }

    match provider.construct_residence(state, player, &payment, &slots) {
        None => Ok(ctx.declined()),
        Some(slot) if slots.contains(&slot) => {
            let mut events = ctx.apply(state, payment, 0)?;
            if let Some(replaced) = state.road.upgrade(slot, residence) {
                state.player_mut(player)?.move_card(replaced, CardLocation::Replaced);
                events.push(GameEvent::ResidenceBuilt {
                    player,
                    slot,
                    replaced,
                });
            }
            Ok(events)
        }
        Some(_) => Err(ctx.invalid("construct_residence")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameData;
    use crate::game::{GamePhase, Version};
    use crate::player::Color;
    use pretty_assertions::assert_eq;

    /// Provider answering every question the same scripted way
    #[derive(Default)]
    struct Scripted {
        buy: Option<Resource>,
        tiers: Vec<Resource>,
        tokens: usize,
        exchange: Option<Resource>,
        residence: Option<usize>,
        asked: Vec<&'static str>,
    }

    impl DecisionProvider for Scripted {
        fn discard_hand(&mut self, _: &GameState, _: PlayerId) -> bool {
            false
        }
        fn choose_action(&mut self, _: &GameState, _: PlayerId, _: &[crate::actions::GameAction]) -> crate::actions::GameAction {
            crate::actions::GameAction::Pass
        }
        fn provost_delta(&mut self, _: &GameState, _: PlayerId, _: i32, _: i32) -> i32 {
            0
        }
        fn buy_resource(&mut self, _: &GameState, _: PlayerId, _: Price, _: &[Resource]) -> Option<Resource> {
            self.asked.push("buy");
            self.buy
        }
        fn buy_resource_tiers(&mut self, _: &GameState, _: PlayerId, _: &[Price], _: &[Resource]) -> Vec<Resource> {
            self.asked.push("tiers");
            self.tiers.clone()
        }
        fn buy_castle_tokens(&mut self, _: &GameState, _: PlayerId, _: &[Price], tokens: &[usize]) -> Vec<usize> {
            self.asked.push("castle");
            tokens[..self.tokens.min(tokens.len())].to_vec()
        }
        fn exchange(&mut self, _: &GameState, _: PlayerId, _: &[Resource], _: Price, _: bool) -> Option<Resource> {
            self.asked.push("exchange");
            self.exchange
        }
        fn construct_residence(&mut self, _: &GameState, _: PlayerId, _: &Ledger, slots: &[usize]) -> Option<usize> {
            self.asked.push("residence");
            self.residence.or(slots.first().copied())
        }
        fn offer_batches(&mut self, _: &GameState, _: PlayerId, _: u32) -> u32 {
            0
        }
    }

    fn game() -> GameState {
        let data = GameData::standard().unwrap();
        let mut game = GameState::new(&data, Version::Standard, &[Color::Red, Color::Blue], 3).unwrap();
        game.phase = GamePhase::BuildingEffects;
        game
    }

    fn building(game: &GameState, color: Color, name: &str) -> BuildingId {
        game.catalog()
            .deck_of(color)
            .find(|b| b.name == name)
            .map(|b| b.id)
            .unwrap()
    }

    #[test]
    fn test_plain_gain() {
        let mut g = game();
        let farm = building(&g, Color::Blue, "Large Farm");
        let mut p = Scripted::default();
        let events = resolve_effect(&mut g, &mut p, farm, 0, EffectRole::Primary).unwrap();
        assert_eq!(g.players[0].resources.food, 4);
        assert_eq!(events.len(), 1);
        assert!(p.asked.is_empty());
    }

    #[test]
    fn test_area_gain_runs_dry() {
        let mut g = game();
        let farm = building(&g, Color::Red, "Small Farm");
        assert_eq!(g.area_cubes[&farm], 2);
        let mut p = Scripted::default();
        for _ in 0..2 {
            resolve_effect(&mut g, &mut p, farm, 0, EffectRole::Secondary).unwrap();
        }
        let events = resolve_effect(&mut g, &mut p, farm, 0, EffectRole::Secondary).unwrap();
        assert_eq!(g.players[0].resources.food, 4);
        assert!(matches!(events[0], GameEvent::EffectUnavailable { .. }));
    }

    #[test]
    fn test_single_buy_can_be_declined() {
        let mut g = game();
        let peddler = building(&g, Color::Blue, "Peddler");
        let before = g.players[0].resources;
        let mut p = Scripted::default();
        let events = resolve_effect(&mut g, &mut p, peddler, 0, EffectRole::Secondary).unwrap();
        assert_eq!(g.players[0].resources, before);
        assert!(matches!(events[0], GameEvent::EffectDeclined { .. }));
    }

    #[test]
    fn test_single_buy_rejects_unoffered_gain() {
        let mut g = game();
        let peddler = building(&g, Color::Blue, "Peddler");
        let mut p = Scripted {
            buy: Some(Resource::Gold),
            ..Default::default()
        };
        let result = resolve_effect(&mut g, &mut p, peddler, 0, EffectRole::Secondary);
        assert!(matches!(result, Err(GameError::InvalidDecision { decision: "buy_resource", .. })));
    }

    #[test]
    fn test_tiered_buy_charges_tier_of_chosen_size() {
        let mut g = game();
        let peddler = building(&g, Color::Blue, "Peddler");
        let mut p = Scripted {
            tiers: vec![Resource::Stone, Resource::Stone],
            ..Default::default()
        };
        resolve_effect(&mut g, &mut p, peddler, 0, EffectRole::Primary).unwrap();
        assert_eq!(g.players[0].resources.deniers, 3);
        assert_eq!(g.players[0].resources.stone, 2);
        assert_eq!(p.asked, vec!["tiers"]);
    }

    #[test]
    fn test_tiered_buy_with_one_affordable_tier_asks_single_buy() {
        let mut g = game();
        let bank = building(&g, Color::Blue, "Bank");
        g.players[0].resources.deniers = 2;
        let mut p = Scripted {
            buy: Some(Resource::Gold),
            ..Default::default()
        };
        resolve_effect(&mut g, &mut p, bank, 0, EffectRole::Primary).unwrap();
        assert_eq!(p.asked, vec!["buy"]);
        assert_eq!(g.players[0].resources.deniers, 1);
        assert_eq!(g.players[0].resources.gold, 1);
    }

    #[test]
    fn test_unaffordable_buy_is_unavailable() {
        let mut g = game();
        let bank = building(&g, Color::Blue, "Bank");
        g.players[0].resources.deniers = 0;
        let mut p = Scripted::default();
        let events = resolve_effect(&mut g, &mut p, bank, 0, EffectRole::Primary).unwrap();
        assert!(matches!(events[0], GameEvent::EffectUnavailable { .. }));
        assert!(p.asked.is_empty());
    }

    #[test]
    fn test_mandatory_exchange_with_single_choice_is_automatic() {
        let mut g = game();
        let mine = building(&g, Color::Red, "Gold Mine");
        g.players[0].resources = Ledger::with_amounts(0, 0, 1, 0, 0);
        let mut p = Scripted::default();
        resolve_effect(&mut g, &mut p, mine, 0, EffectRole::Secondary).unwrap();
        assert!(p.asked.is_empty());
        assert_eq!(g.players[0].resources, Ledger::with_amounts(0, 0, 0, 0, 1));
    }

    #[test]
    fn test_mandatory_exchange_cannot_be_declined() {
        let mut g = game();
        let mine = building(&g, Color::Red, "Gold Mine");
        let mut p = Scripted::default();
        let result = resolve_effect(&mut g, &mut p, mine, 0, EffectRole::Secondary);
        assert!(matches!(result, Err(GameError::InvalidDecision { .. })));
    }

    #[test]
    fn test_market_sells_gold() {
        let mut g = game();
        let market = building(&g, Color::Blue, "Market");
        g.players[0].resources = Ledger::with_amounts(0, 0, 0, 0, 1);
        let mut p = Scripted {
            exchange: Some(Resource::Gold),
            ..Default::default()
        };
        resolve_effect(&mut g, &mut p, market, 0, EffectRole::Primary).unwrap();
        assert_eq!(g.players[0].resources, Ledger::with_amounts(4, 0, 0, 0, 0));
    }

    #[test]
    fn test_castle_tokens_taken_from_best_tier() {
        let mut g = game();
        let church = building(&g, Color::Blue, "Church");
        let before = g.castle.remaining();
        let mut p = Scripted {
            tokens: 2,
            ..Default::default()
        };
        resolve_effect(&mut g, &mut p, church, 0, EffectRole::Primary).unwrap();
        assert_eq!(g.players[0].prestige_points, 8);
        assert_eq!(g.players[0].resources.deniers, 0);
        assert_eq!(g.castle.remaining(), before - 2);
    }

    #[test]
    fn test_castle_tokens_limited_by_pool() {
        let mut g = game();
        let church = building(&g, Color::Blue, "Church");
        let total = g.castle.remaining();
        g.castle.remove_tokens(total - 1);
        let mut p = Scripted {
            tokens: 2,
            ..Default::default()
        };
        resolve_effect(&mut g, &mut p, church, 0, EffectRole::Primary).unwrap();
        assert!(g.castle.is_empty());
        assert_eq!(g.players[0].resources.deniers, 3);
        assert_eq!(g.players[0].prestige_points, 2);

        let events = resolve_effect(&mut g, &mut p, church, 0, EffectRole::Primary).unwrap();
        assert!(matches!(events[0], GameEvent::EffectUnavailable { .. }));
    }

    #[test]
    fn test_residence_replaces_own_building_in_place() {
        let mut g = game();
        let lawyer = building(&g, Color::Blue, "Lawyer");
        let farm = building(&g, Color::Red, "Small Farm");
        g.players[0].move_card(farm, CardLocation::Road);
        g.road.push(farm);
        let slot = g.road.len() - 1;
        g.road.place_worker(slot, 1);

        let mut p = Scripted::default();
        let events = resolve_effect(&mut g, &mut p, lawyer, 0, EffectRole::Primary).unwrap();

        let residence = g.catalog().residence_of(Color::Red).unwrap();
        let s = g.road.slot(slot).unwrap();
        assert_eq!(s.building, residence);
        assert_eq!(s.replaced_building, Some(farm));
        assert_eq!(g.players[0].location_of(farm), Some(CardLocation::Replaced));
        assert_eq!(g.players[0].resources.food, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::ResidenceBuilt { replaced, .. } if *replaced == farm)));
    }

    #[test]
    fn test_residence_needs_an_eligible_building() {
        let mut g = game();
        let lawyer = building(&g, Color::Blue, "Lawyer");
        let own_lawyer = building(&g, Color::Red, "Lawyer");
        g.road.push(own_lawyer);
        let mut p = Scripted::default();
        let events = resolve_effect(&mut g, &mut p, lawyer, 0, EffectRole::Primary).unwrap();
        assert!(matches!(events[0], GameEvent::EffectUnavailable { .. }));
    }
}
