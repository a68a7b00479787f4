//! The castle token pool and the batch economy that feeds it.
//!
//! Tiers are kept in descending prestige order and tokens always leave the
//! pool from the most valuable remaining tier first. The game ends once the
//! pool is empty.

use crate::resource::{Ledger, Resource};
use serde::{Deserialize, Serialize};

/// One section of the castle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastleTier {
    pub name: String,
    pub front_color: String,
    /// Prestige points per token
    pub prestige_points: u32,
    /// Tokens still available
    pub remaining: u32,
}

impl CastleTier {
    pub fn new(name: impl Into<String>, front_color: impl Into<String>, prestige_points: u32, remaining: u32) -> Self {
        Self {
            name: name.into(),
            front_color: front_color.into(),
            prestige_points,
            remaining,
        }
    }
}

/// The castle token pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Castle {
    tiers: Vec<CastleTier>,
}

impl Castle {
    /// Build the pool; tiers are ordered by descending prestige value
    pub fn new(mut tiers: Vec<CastleTier>) -> Self {
        tiers.sort_by(|a, b| b.prestige_points.cmp(&a.prestige_points));
        Self { tiers }
    }

    pub fn tiers(&self) -> &[CastleTier] {
        &self.tiers
    }

    /// Total tokens left across all tiers
    pub fn remaining(&self) -> u32 {
        self.tiers.iter().map(|t| t.remaining).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Remove up to `count` tokens, best tier first.
    ///
    /// Returns the prestige value actually removed, which is lower than
    /// requested once the pool runs dry.
    pub fn remove_tokens(&mut self, count: u32) -> u32 {
        let mut left = count;
        let mut points = 0;
        for tier in &mut self.tiers {
            if left == 0 {
                break;
            }
            let taken = tier.remaining.min(left);
            tier.remaining -= taken;
            left -= taken;
            points += taken * tier.prestige_points;
        }
        points
    }

    /// One entry per remaining token, in removal order, naming its tier index
    pub fn token_choices(&self) -> Vec<usize> {
        self.tiers
            .iter()
            .enumerate()
            .flat_map(|(i, tier)| std::iter::repeat(i).take(tier.remaining as usize))
            .collect()
    }
}

/// Units of `kind` one batch needs
fn required(batch: &Ledger, kind: Resource) -> i32 {
    (-batch.get(kind)).max(0)
}

/// Largest number of batches payable from `holdings`.
///
/// Batches are added one at a time: ordinary cubes are spent first and the
/// per-batch shortfall is drawn from gold while enough gold remains.
pub fn max_batches(holdings: &Ledger, batch: &Ledger) -> u32 {
    if Resource::ORDINARY.iter().all(|&k| required(batch, k) == 0) {
        return 0;
    }

    let mut stock = *holdings;
    let mut gold = holdings.get(Resource::WILD).max(0);
    let mut batches = 0;
    loop {
        let mut shortfall = 0;
        for kind in Resource::ORDINARY {
            let need = required(batch, kind);
            let have = stock.get(kind).max(0);
            shortfall += (need - have).max(0);
        }
        if shortfall > gold {
            return batches;
        }
        for kind in Resource::ORDINARY {
            let left = (stock.get(kind) - required(batch, kind)).max(0);
            stock.set(kind, left);
        }
        gold -= shortfall;
        batches += 1;
    }
}

/// Pay for exactly `count` batches and return the gold spent.
///
/// Ordinary cubes are consumed down to zero and the remainder comes out of
/// gold. Callers keep `count` within [`max_batches`].
pub fn consume_batches(holdings: &mut Ledger, batch: &Ledger, count: u32) -> i32 {
    let mut wild_needed = 0;
    for kind in Resource::ORDINARY {
        let left = holdings.get(kind) - required(batch, kind) * count as i32;
        if left >= 0 {
            holdings.set(kind, left);
        } else {
            holdings.set(kind, 0);
            wild_needed -= left;
        }
    }
    holdings.add(Resource::WILD, -wild_needed);
    wild_needed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn castle(counts: [u32; 3]) -> Castle {
        Castle::new(vec![
            CastleTier::new("Towers", "yellow", 2, counts[2]),
            CastleTier::new("Dungeon", "red", 4, counts[0]),
            CastleTier::new("Walls", "orange", 3, counts[1]),
        ])
    }

    fn batch() -> Ledger {
        Ledger::with_amounts(0, -1, -1, -1, 0)
    }

    #[test]
    fn test_tiers_sorted_by_prestige() {
        let c = castle([1, 1, 1]);
        let points: Vec<u32> = c.tiers().iter().map(|t| t.prestige_points).collect();
        assert_eq!(points, vec![4, 3, 2]);
    }

    #[test]
    fn test_remove_tokens_spills_over_tiers() {
        let mut c = castle([2, 2, 2]);
        assert_eq!(c.remove_tokens(5), 16);
        let counts: Vec<u32> = c.tiers().iter().map(|t| t.remaining).collect();
        assert_eq!(counts, vec![0, 0, 1]);
    }

    #[test]
    fn test_remove_tokens_stops_at_empty_pool() {
        let mut c = castle([1, 0, 1]);
        assert_eq!(c.remove_tokens(0), 0);
        assert_eq!(c.remove_tokens(10), 6);
        assert!(c.is_empty());
        assert_eq!(c.remove_tokens(3), 0);
    }

    #[test]
    fn test_token_choices_in_removal_order() {
        let c = castle([1, 2, 1]);
        assert_eq!(c.token_choices(), vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_max_batches_without_gold() {
        let holdings = Ledger::with_amounts(9, 3, 2, 4, 0);
        assert_eq!(max_batches(&holdings, &batch()), 2);
    }

    #[test]
    fn test_max_batches_with_gold_filling_gaps() {
        // two full batches, then one gold per missing wood
        let holdings = Ledger::with_amounts(0, 4, 2, 4, 3);
        assert_eq!(max_batches(&holdings, &batch()), 4);
        let holdings = Ledger::with_amounts(0, 0, 0, 0, 7);
        assert_eq!(max_batches(&holdings, &batch()), 2);
    }

    #[test]
    fn test_consume_batches_draws_gold_last() {
        let mut holdings = Ledger::with_amounts(5, 4, 2, 4, 3);
        let spent = consume_batches(&mut holdings, &batch(), 3);
        assert_eq!(spent, 1);
        assert_eq!(holdings, Ledger::with_amounts(5, 1, 0, 1, 2));
    }
}
