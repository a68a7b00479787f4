//! Random bot player.
//!
//! `RandomBot` answers every decision uniformly at random among the options
//! it is offered, declining included wherever declining is legal.

use crate::actions::GameAction;
use crate::decision::DecisionProvider;
use crate::game::GameState;
use crate::payment::multisets_up_to;
use crate::player::PlayerId;
use crate::resource::{Ledger, Price, Resource};
use rand::prelude::*;

/// A bot player picking uniformly among legal answers
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// An element of `choices`, or `None` with the same odds as any element
    fn choose_or_decline<T: Copy>(&mut self, choices: &[T]) -> Option<T> {
        let pick = self.rng.gen_range(0..=choices.len());
        choices.get(pick).copied()
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProvider for RandomBot {
    fn discard_hand(&mut self, _game: &GameState, _player: PlayerId) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn choose_action(&mut self, _game: &GameState, _player: PlayerId, options: &[GameAction]) -> GameAction {
        options.choose(&mut self.rng).cloned().unwrap_or(GameAction::Pass)
    }

    fn provost_delta(&mut self, _game: &GameState, _player: PlayerId, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn buy_resource(&mut self, _game: &GameState, _player: PlayerId, _cost: Price, gains: &[Resource]) -> Option<Resource> {
        self.choose_or_decline(gains)
    }

    fn buy_resource_tiers(
        &mut self,
        _game: &GameState,
        _player: PlayerId,
        tiers: &[Price],
        gains: &[Resource],
    ) -> Vec<Resource> {
        multisets_up_to(gains, tiers.len())
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    fn buy_castle_tokens(
        &mut self,
        _game: &GameState,
        _player: PlayerId,
        tiers: &[Price],
        tokens: &[usize],
    ) -> Vec<usize> {
        let count = self.rng.gen_range(0..=tiers.len().min(tokens.len()));
        tokens[..count].to_vec()
    }

    fn exchange(
        &mut self,
        _game: &GameState,
        _player: PlayerId,
        choices: &[Resource],
        _gain: Price,
        optional: bool,
    ) -> Option<Resource> {
        if optional {
            self.choose_or_decline(choices)
        } else {
            choices.choose(&mut self.rng).copied()
        }
    }

    fn construct_residence(
        &mut self,
        _game: &GameState,
        _player: PlayerId,
        _payment: &Ledger,
        slots: &[usize],
    ) -> Option<usize> {
        self.choose_or_decline(slots)
    }

    fn offer_batches(&mut self, _game: &GameState, _player: PlayerId, max: u32) -> u32 {
        self.rng.gen_range(0..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameData;
    use crate::game::{GamePhase, Version};
    use crate::player::Color;

    fn game() -> GameState {
        let data = GameData::standard().unwrap();
        let mut game = GameState::new(&data, Version::Standard, &[Color::Red, Color::Green], 9).unwrap();
        game.phase = GamePhase::Actions;
        game
    }

    #[test]
    fn test_bot_picks_offered_action() {
        let game = game();
        let mut bot = RandomBot::with_seed(1);
        let options = game.valid_actions(0);
        for _ in 0..50 {
            let action = bot.choose_action(&game, 0, &options);
            assert!(options.contains(&action));
        }
    }

    #[test]
    fn test_bot_answers_stay_in_range() {
        let game = game();
        let mut bot = RandomBot::with_seed(2);
        let gains = [Resource::Food, Resource::Wood, Resource::Stone];
        let tiers = [Price::new(Resource::Denier, 1), Price::new(Resource::Denier, 2)];
        for _ in 0..100 {
            let delta = bot.provost_delta(&game, 0, -2, 1);
            assert!((-2..=1).contains(&delta));

            let bought = bot.buy_resource_tiers(&game, 0, &tiers, &gains);
            assert!(bought.len() <= 2);
            assert!(bought.iter().all(|r| gains.contains(r)));

            let tokens = bot.buy_castle_tokens(&game, 0, &tiers[..1], &[0, 0, 1]);
            assert!(tokens.is_empty() || tokens == vec![0]);

            assert!(bot.offer_batches(&game, 0, 3) <= 3);
            assert!(bot.exchange(&game, 0, &[Resource::Wood], Price::new(Resource::Gold, 1), false).is_some());
        }
    }

    #[test]
    fn test_seeded_bots_agree() {
        let game = game();
        let options = game.valid_actions(0);
        let mut a = RandomBot::with_seed(7);
        let mut b = RandomBot::with_seed(7);
        for _ in 0..20 {
            assert_eq!(a.choose_action(&game, 0, &options), b.choose_action(&game, 0, &options));
        }
    }
}
