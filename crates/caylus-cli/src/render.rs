//! Human-readable rendering of actions and events.

use caylus_core::{
    Catalog, Color, EffectRole, EventSink, GameAction, GameEvent, GameState, IncomeSource, PlayerId,
};
use tracing::info;

/// `1st`, `2nd`, `3rd`, `4th`, ..., `11th`, `21st`
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// One line describing an action, for menus
pub fn describe_action(state: &GameState, action: &GameAction) -> String {
    let catalog = state.catalog();
    match action {
        GameAction::Pass => "pass".to_string(),
        GameAction::DrawCard => format!("draw a card ({} denier)", state.rules().actions.draw_card_cost),
        GameAction::RefillHand => format!(
            "discard your hand and draw as many ({} denier)",
            state.rules().actions.refill_hand_cost
        ),
        GameAction::PlaceWorker { slot } => {
            let building = state.road.slot(*slot).map(|s| catalog.get(s.building).to_string());
            format!(
                "place a worker on slot {} ({})",
                slot,
                building.unwrap_or_default()
            )
        }
        GameAction::ConstructFromHand { building, payment } => {
            format!("build {} paying {}", catalog.get(*building), payment.negated())
        }
        GameAction::ConstructPrestige { building, payment } => {
            format!("build prestige {} paying {}", catalog.get(*building), payment.negated())
        }
        GameAction::UpgradeToPrestige {
            slot,
            building,
            payment,
        } => format!(
            "build prestige {} over slot {} paying {}",
            catalog.get(*building),
            slot,
            payment.negated()
        ),
    }
}

/// Logs every event at `info` level
pub struct TracingSink {
    catalog: Catalog,
    colors: Vec<Color>,
}

impl TracingSink {
    pub fn new(state: &GameState) -> Self {
        Self {
            catalog: state.catalog().clone(),
            colors: state.players.iter().map(|p| p.color).collect(),
        }
    }

    fn who(&self, player: PlayerId) -> String {
        self.colors
            .get(player as usize)
            .map(|c| c.to_string())
            .unwrap_or_else(|| format!("player {player}"))
    }
}

impl EventSink for TracingSink {
    fn emit(&mut self, event: &GameEvent) {
        match event {
            GameEvent::HandsDealt { cards } => info!("{cards} cards dealt to every player"),
            GameEvent::HandRedrawn { player } => info!("{} redraws their hand", self.who(*player)),
            GameEvent::TurnStarted { turn, first_player } => {
                info!("===== {} turn, {} starts =====", ordinal(*turn), self.who(*first_player))
            }
            GameEvent::PhaseStarted { phase } => info!("-- {phase:?}"),
            GameEvent::IncomeReceived {
                player,
                deniers,
                source,
            } => {
                let from = match source {
                    IncomeSource::Stipend => "income".to_string(),
                    IncomeSource::Residence(b) | IncomeSource::Hotel(b) => self.catalog.get(*b).to_string(),
                };
                info!("{} receives {deniers} deniers from {from}", self.who(*player))
            }
            GameEvent::ActionTaken { player, action } => match action {
                GameAction::PlaceWorker { slot } => info!("{} places a worker on slot {slot}", self.who(*player)),
                GameAction::ConstructFromHand { building, .. }
                | GameAction::ConstructPrestige { building, .. }
                | GameAction::UpgradeToPrestige { building, .. } => {
                    info!("{} builds {}", self.who(*player), self.catalog.get(*building))
                }
                GameAction::DrawCard | GameAction::RefillHand | GameAction::Pass => {}
            },
            GameEvent::CardsDrawn { player, cards } => {
                info!("{} draws {} card(s)", self.who(*player), cards.len())
            }
            GameEvent::Passed {
                player,
                position,
                bonus,
            } => info!(
                "{} passes {}{}",
                self.who(*player),
                ordinal(*position as u32 + 1),
                if *bonus > 0 { format!(" and gets {bonus} denier") } else { String::new() }
            ),
            GameEvent::ProvostMoved {
                player,
                delta,
                position,
                cost,
            } => info!(
                "{} moves the provost by {delta} to slot {position} for {cost} deniers",
                self.who(*player)
            ),
            GameEvent::ProvostAdvanced { position } => info!("provost advances to slot {position}"),
            GameEvent::EffectApplied {
                player,
                building,
                role,
                delta,
                prestige_points,
            } => {
                let whose = match role {
                    EffectRole::Primary => "worker",
                    EffectRole::Secondary => "owner",
                };
                if *prestige_points > 0 {
                    info!(
                        "{} {} ({whose}): {delta}, {prestige_points} PP",
                        self.catalog.get(*building),
                        self.who(*player)
                    )
                } else {
                    info!("{} {} ({whose}): {delta}", self.catalog.get(*building), self.who(*player))
                }
            }
            GameEvent::EffectDeclined { player, building, .. } => {
                info!("{} declines {}", self.who(*player), self.catalog.get(*building))
            }
            GameEvent::EffectUnavailable { player, building, .. } => {
                info!("{} cannot use {}", self.who(*player), self.catalog.get(*building))
            }
            GameEvent::ResidenceBuilt { player, slot, replaced } => info!(
                "{} turns {} on slot {slot} into a residence",
                self.who(*player),
                self.catalog.get(*replaced)
            ),
            GameEvent::WorkerReturned { .. } => {}
            GameEvent::BatchesOffered {
                player,
                batches,
                prestige_points,
            } => info!(
                "{} offers {batches} batch(es) to the castle for {prestige_points} PP",
                self.who(*player)
            ),
            GameEvent::CastleBonus {
                player,
                resource,
                amount,
            } => info!("{} offered the most and gets {amount} {resource}", self.who(*player)),
            GameEvent::TokensRemoved {
                count,
                prestige_points,
            } => info!("nobody offered: {count} castle token(s) worth {prestige_points} PP removed"),
            GameEvent::GameEnded { winners, .. } => {
                let names: Vec<String> = winners.iter().map(|w| self.who(*w)).collect();
                info!("game over, won by {}", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(22), "22nd");
    }
}
