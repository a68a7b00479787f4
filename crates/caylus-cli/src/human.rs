//! Interactive player reading answers from stdin.
//!
//! Every question is a numbered menu; the prompt repeats until the answer is
//! one of the listed numbers, so only legal answers ever reach the engine.

use crate::render::describe_action;
use caylus_core::{DecisionProvider, GameAction, GameState, Ledger, PlayerId, Price, Resource};
use std::io::{self, BufRead, Write};

/// A human at the terminal
pub struct Human {
    /// Scripted answers; stdin when absent
    script: Option<Box<dyn BufRead>>,
}

impl Human {
    pub fn stdin() -> Self {
        Self { script: None }
    }

    pub fn scripted(input: impl BufRead + 'static) -> Self {
        Self {
            script: Some(Box::new(input)),
        }
    }

    fn read_line(&mut self, line: &mut String) -> io::Result<usize> {
        match &mut self.script {
            Some(input) => input.read_line(line),
            None => io::stdin().read_line(line),
        }
    }

    /// Index into `options`, asking until the answer is valid
    fn pick(&mut self, question: &str, options: &[String]) -> usize {
        println!("{question}");
        for (i, option) in options.iter().enumerate() {
            println!("  {i}: {option}");
        }
        loop {
            print!("> ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match self.read_line(&mut line) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    std::process::exit(0);
                }
                Err(_) => {
                    println!("Error reading input, try again.");
                    continue;
                }
                Ok(_) => {}
            }

            match line.trim().parse::<usize>() {
                Ok(i) if i < options.len() => return i,
                _ => println!("Enter a number from 0 to {}", options.len().saturating_sub(1)),
            }
        }
    }

    /// Like `pick`, with a leading decline entry mapped to `None`
    fn pick_or_decline(&mut self, question: &str, options: &[String]) -> Option<usize> {
        let mut all = vec!["decline".to_string()];
        all.extend(options.iter().cloned());
        self.pick(question, &all).checked_sub(1)
    }
}

fn status(game: &GameState, player: PlayerId) {
    let Some(p) = game.get_player(player) else {
        return;
    };
    let hand: Vec<String> = p.hand().iter().map(|&b| game.catalog().get(b).name.clone()).collect();
    println!(
        "[{}] {} | workers {} | {} PP | hand: {}",
        p.color,
        p.resources,
        p.workers,
        p.prestige_points,
        hand.join(", ")
    );
}

fn names(resources: &[Resource]) -> Vec<String> {
    resources.iter().map(|r| r.to_string()).collect()
}

impl DecisionProvider for Human {
    fn discard_hand(&mut self, game: &GameState, player: PlayerId) -> bool {
        status(game, player);
        let options = ["keep".to_string(), "discard and redraw".to_string()];
        self.pick("Keep your opening hand?", &options) == 1
    }

    fn choose_action(&mut self, game: &GameState, player: PlayerId, options: &[GameAction]) -> GameAction {
        status(game, player);
        let labels: Vec<String> = options.iter().map(|a| describe_action(game, a)).collect();
        let i = self.pick("Choose an action:", &labels);
        options[i].clone()
    }

    fn provost_delta(&mut self, game: &GameState, player: PlayerId, min: i32, max: i32) -> i32 {
        status(game, player);
        let deltas: Vec<i32> = (min..=max).collect();
        let labels: Vec<String> = deltas.iter().map(|d| format!("{d:+}")).collect();
        let question = format!("Move the provost (now on slot {:?}):", game.road.provost());
        deltas[self.pick(&question, &labels)]
    }

    fn buy_resource(&mut self, game: &GameState, player: PlayerId, cost: Price, gains: &[Resource]) -> Option<Resource> {
        status(game, player);
        let question = format!("Pay {cost} for one of:");
        self.pick_or_decline(&question, &names(gains)).map(|i| gains[i])
    }

    fn buy_resource_tiers(
        &mut self,
        game: &GameState,
        player: PlayerId,
        tiers: &[Price],
        gains: &[Resource],
    ) -> Vec<Resource> {
        status(game, player);
        let choices = caylus_core::payment::multisets_up_to(gains, tiers.len());
        let labels: Vec<String> = choices
            .iter()
            .map(|c| match c.len() {
                0 => "decline".to_string(),
                n => format!("{} for {}", names(c).join(" + "), tiers[n - 1]),
            })
            .collect();
        let i = self.pick("Buy:", &labels);
        choices[i].clone()
    }

    fn buy_castle_tokens(
        &mut self,
        game: &GameState,
        player: PlayerId,
        tiers: &[Price],
        tokens: &[usize],
    ) -> Vec<usize> {
        status(game, player);
        let castle = game.castle.tiers();
        let labels: Vec<String> = (1..=tiers.len().min(tokens.len()))
            .map(|n| {
                let taken: Vec<&str> = tokens[..n]
                    .iter()
                    .filter_map(|&t| castle.get(t).map(|tier| tier.name.as_str()))
                    .collect();
                format!("{} for {}", taken.join(" + "), tiers[n - 1])
            })
            .collect();
        match self.pick_or_decline("Take castle tokens:", &labels) {
            Some(i) => tokens[..=i].to_vec(),
            None => Vec::new(),
        }
    }

    fn exchange(
        &mut self,
        game: &GameState,
        player: PlayerId,
        choices: &[Resource],
        gain: Price,
        optional: bool,
    ) -> Option<Resource> {
        status(game, player);
        let question = format!("Give one cube for {gain}:");
        if optional {
            self.pick_or_decline(&question, &names(choices)).map(|i| choices[i])
        } else {
            Some(choices[self.pick(&question, &names(choices))])
        }
    }

    fn construct_residence(
        &mut self,
        game: &GameState,
        player: PlayerId,
        payment: &Ledger,
        slots: &[usize],
    ) -> Option<usize> {
        status(game, player);
        let labels: Vec<String> = slots
            .iter()
            .map(|&s| {
                let name = game.road.slot(s).map(|slot| game.catalog().get(slot.building).to_string());
                format!("slot {s}: {}", name.unwrap_or_default())
            })
            .collect();
        let question = format!("Pay {} to build a residence on:", payment.negated());
        self.pick_or_decline(&question, &labels).map(|i| slots[i])
    }

    fn offer_batches(&mut self, game: &GameState, player: PlayerId, max: u32) -> u32 {
        status(game, player);
        let labels: Vec<String> = (0..=max).map(|n| n.to_string()).collect();
        self.pick("Batches to offer to the castle:", &labels) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caylus_core::{Color, GameData, Version};
    use std::io::Cursor;

    fn game() -> GameState {
        let data = GameData::standard().unwrap();
        GameState::new(&data, Version::Standard, &[Color::Red, Color::Green], 1).unwrap()
    }

    #[test]
    fn test_reprompts_until_valid() {
        let game = game();
        let mut human = Human::scripted(Cursor::new("x\n9\n2\n"));
        assert_eq!(human.offer_batches(&game, 0, 3), 2);
    }

    #[test]
    fn test_decline_is_first_entry() {
        let game = game();
        let gains = [Resource::Food, Resource::Wood];
        let mut human = Human::scripted(Cursor::new("0\n2\n"));
        let cost = Price::new(Resource::Denier, 1);
        assert_eq!(human.buy_resource(&game, 0, cost, &gains), None);
        assert_eq!(human.buy_resource(&game, 0, cost, &gains), Some(Resource::Wood));
    }

    #[test]
    fn test_castle_tokens_are_a_prefix() {
        let game = game();
        let tiers = [Price::new(Resource::Denier, 2), Price::new(Resource::Denier, 5)];
        let mut human = Human::scripted(Cursor::new("2\n"));
        assert_eq!(human.buy_castle_tokens(&game, 0, &tiers, &[0, 0, 0]), vec![0, 0]);
    }
}
