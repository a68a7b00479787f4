//! Payment solver for resource costs.
//!
//! Gold is wild: it covers any ordinary cube a player is missing, but only
//! for the shortfall left once every ordinary kind has paid what it can.
//! Money is never substitutable.

use crate::resource::{Cost, Ledger, Resource};

/// Every distinct payment of `cost` from `holdings`.
///
/// Each payment is a ledger delta with non-positive entries. An empty result
/// means the cost cannot be paid. When the cost carries an "any" requirement,
/// every multiset of ordinary kinds of that size is tried and identical
/// payments are reported once.
pub fn all_payments(holdings: &Ledger, cost: &Cost) -> Vec<Ledger> {
    if cost.any >= 0 {
        return single_payment(holdings, &cost.exact).into_iter().collect();
    }

    let mut payments: Vec<Ledger> = Vec::new();
    for kinds in multisets(&Resource::ORDINARY, (-cost.any) as usize) {
        let mut fixed = cost.exact;
        for kind in kinds {
            fixed.add(kind, -1);
        }
        if let Some(payment) = single_payment(holdings, &fixed) {
            if !payments.contains(&payment) {
                payments.push(payment);
            }
        }
    }
    payments
}

/// The unique minimal payment of a fixed cost vector, if one exists.
///
/// Each required kind pays as much as is held, up to the requirement; the
/// uncovered remainder of the cube kinds is drawn from gold.
pub fn single_payment(holdings: &Ledger, cost: &Ledger) -> Option<Ledger> {
    let mut payment = Ledger::new();
    let mut shortfall = 0;

    for resource in Resource::ALL {
        let required = -cost.get(resource);
        if required <= 0 {
            continue;
        }
        let paid = holdings.get(resource).max(0).min(required);
        payment.set(resource, -paid);
        let missing = required - paid;
        if missing > 0 {
            if !resource.is_cube() {
                return None;
            }
            shortfall += missing;
        }
    }

    if shortfall > 0 {
        payment.add(Resource::WILD, -shortfall);
        if holdings.get(Resource::WILD) + payment.get(Resource::WILD) < 0 {
            return None;
        }
    }
    Some(payment)
}

/// Combinations with repetition of `items`, of exactly `size` elements, in
/// lexicographic order of positions.
pub fn multisets<T: Copy>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size == 0 {
        return vec![Vec::new()];
    }
    if items.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut indices = vec![0usize; size];
    loop {
        out.push(indices.iter().map(|&i| items[i]).collect());

        // Rightmost position that can still grow
        let Some(pos) = indices.iter().rposition(|&i| i + 1 < items.len()) else {
            break;
        };
        let next = indices[pos] + 1;
        for slot in &mut indices[pos..] {
            *slot = next;
        }
    }
    out
}

/// Multisets of every size from 0 up to `max_size`, smallest first
pub fn multisets_up_to<T: Copy>(items: &[T], max_size: usize) -> Vec<Vec<T>> {
    (0..=max_size)
        .flat_map(|size| multisets(items, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger(food: i32, wood: i32, stone: i32, gold: i32) -> Ledger {
        Ledger::with_amounts(0, food, wood, stone, gold)
    }

    #[test]
    fn test_multisets_counts() {
        assert_eq!(multisets(&[1, 2, 3], 0), vec![Vec::<i32>::new()]);
        assert_eq!(multisets(&[1, 2, 3], 1).len(), 3);
        assert_eq!(
            multisets(&[1, 2, 3], 2),
            vec![
                vec![1, 1],
                vec![1, 2],
                vec![1, 3],
                vec![2, 2],
                vec![2, 3],
                vec![3, 3],
            ]
        );
        assert_eq!(multisets(&[1, 2, 3], 3).len(), 10);
        assert_eq!(multisets_up_to(&['a', 'b'], 2).len(), 1 + 2 + 3);
    }

    #[test]
    fn test_single_payment_uses_gold_only_for_shortfall() {
        let holdings = ledger(3, 2, 3, 3);
        let cost = Ledger::with_amounts(0, -1, -3, 0, -1);
        // wood short by one, so gold pays its own unit plus the missing wood
        assert_eq!(
            single_payment(&holdings, &cost),
            Some(Ledger::with_amounts(0, -1, -2, 0, -2))
        );
    }

    #[test]
    fn test_single_payment_money_is_not_substitutable() {
        let holdings = Ledger::with_amounts(1, 0, 0, 0, 5);
        assert_eq!(single_payment(&holdings, &Ledger::of(Resource::Denier, -2)), None);
    }

    #[test]
    fn test_any_cost_enumerates_distinct_payments() {
        let holdings = ledger(3, 2, 3, 3);
        let cost = Cost::with_any(Ledger::of(Resource::Wood, -1), -1);
        let payments = all_payments(&holdings, &cost);
        assert_eq!(
            payments,
            vec![
                ledger(-1, -1, 0, 0),
                ledger(0, -2, 0, 0),
                ledger(0, -1, -1, 0),
            ]
        );
        // gold is never spent while ordinary cubes can cover the cost
        assert!(payments.iter().all(|p| p.gold == 0));
    }

    #[test]
    fn test_any_cost_infeasible_when_gold_cannot_cover() {
        let holdings = ledger(1, 0, 3, 1);
        let cost = Cost::with_any(Ledger::with_amounts(0, -1, -2, 0, 0), -1);
        assert!(all_payments(&holdings, &cost).is_empty());
    }

    #[test]
    fn test_any_cost_collapses_wild_fallbacks() {
        // Only stone held: substituting onto food or wood both need one gold
        let holdings = ledger(0, 0, 1, 1);
        let cost = Cost::with_any(Ledger::of(Resource::Stone, -1), -1);
        let payments = all_payments(&holdings, &cost);
        assert_eq!(payments, vec![ledger(0, 0, -1, -1)]);
    }

    #[test]
    fn test_free_cost_has_one_empty_payment() {
        let payments = all_payments(&ledger(0, 0, 0, 0), &Cost::default());
        assert_eq!(payments, vec![Ledger::new()]);
    }
}
