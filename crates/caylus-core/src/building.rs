//! Building catalog.
//!
//! Every physical building card of a game gets one immutable `Building`
//! entry. Player-owned buildings and residences are printed once per color,
//! prestige and neutral buildings once per game. Effects are described by a
//! `Behavior` variant that the effect dispatcher matches on.

use crate::data::{ByPlayerCount, GameData};
use crate::player::Color;
use crate::resource::{Cost, Price, Resource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a building in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u16);

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four families of buildings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Prestige,
    Neutral,
    /// Background side of a player card
    Residence,
    Player,
}

/// Income paid to a building's owner during the income phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeHook {
    #[default]
    None,
    Residence,
    Hotel,
}

/// Which cubes an exchange accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeSource {
    /// Any cube, gold included
    AnyCube,
    /// Food, wood or stone
    OrdinaryCube,
}

impl ExchangeSource {
    pub fn kinds(self) -> &'static [Resource] {
        match self {
            ExchangeSource::AnyCube => &Resource::CUBES,
            ExchangeSource::OrdinaryCube => &Resource::ORDINARY,
        }
    }
}

/// What an effect does when it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// Fixed gain, no decision
    Gain { gain: Price },
    /// Fixed gain drawn from the cubes stocked on the building, nothing once
    /// they run out
    AreaGain {
        gain: Price,
        /// Cubes stocked at setup, per player count
        cubes: ByPlayerCount<u32>,
    },
    /// Pay once for a single cube of a chosen kind, or decline
    Buy { cost: Price, gains: Vec<Resource> },
    /// Tier `i` costs `tiers[i]` and yields `i + 1` cubes of chosen kinds
    BuyTiers { tiers: Vec<Price>, gains: Vec<Resource> },
    /// Give one held cube from `from` for a fixed gain
    Exchange {
        from: ExchangeSource,
        gain: Price,
        optional: bool,
    },
    /// Tier `i` costs `tiers[i]` and takes `i + 1` castle tokens
    BuyCastleTokens { tiers: Vec<Price> },
    /// Turn one of the player's road buildings into their residence
    ConstructResidence { cost: Cost },
}

/// An effect descriptor: display text plus behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub text: String,
    #[serde(flatten)]
    pub behavior: Behavior,
}

/// A building card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub name: String,
    pub front_color: String,
    pub prestige_points: u32,
    pub cost: Cost,
    /// Part of the beginner version
    pub beginner: bool,
    /// Can be turned into a residence once on the road
    pub can_be_residence: bool,
    pub income: IncomeHook,
    pub primary: Option<Effect>,
    pub secondary: Option<Effect>,
    /// Printed color, for player buildings and residences
    pub color: Option<Color>,
}

impl Building {
    /// Workers may be placed on neutral and player buildings only
    pub fn allows_worker(&self) -> bool {
        matches!(self.kind, BuildingKind::Neutral | BuildingKind::Player)
    }

    /// Only residences can be covered by a prestige building
    pub fn can_be_prestige(&self) -> bool {
        self.kind == BuildingKind::Residence
    }

    pub fn in_version(&self, beginner: bool) -> bool {
        self.beginner || !beginner
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{} ({})", self.name, color),
            None => f.write_str(&self.name),
        }
    }
}

/// Immutable catalog of every building card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    buildings: Vec<Building>,
}

impl Catalog {
    /// Print every card described by validated game data.
    ///
    /// Player buildings and residences are printed for every color.
    pub fn from_data(data: &GameData) -> Self {
        let mut buildings: Vec<Building> = Vec::new();
        let templates = &data.buildings;

        let mut push = |mut building: Building| {
            building.id = BuildingId(buildings.len() as u16);
            buildings.push(building);
        };

        for t in &templates.prestige {
            push(Building {
                id: BuildingId(0),
                kind: BuildingKind::Prestige,
                name: t.name.clone(),
                front_color: t.front_color.clone(),
                prestige_points: t.prestige_points,
                cost: t.cost,
                beginner: t.beginner,
                can_be_residence: false,
                income: t.income,
                primary: None,
                secondary: None,
                color: None,
            });
        }

        for t in &templates.neutral {
            push(Building {
                id: BuildingId(0),
                kind: BuildingKind::Neutral,
                name: t.name.clone(),
                front_color: t.front_color.clone(),
                prestige_points: 0,
                cost: Cost::default(),
                beginner: t.beginner,
                can_be_residence: false,
                income: IncomeHook::None,
                primary: Some(t.primary.clone()),
                secondary: None,
                color: None,
            });
        }

        for color in Color::ALL {
            let r = &templates.residence;
            push(Building {
                id: BuildingId(0),
                kind: BuildingKind::Residence,
                name: r.name.clone(),
                front_color: r.front_color.clone(),
                prestige_points: r.prestige_points,
                cost: Cost::default(),
                beginner: false,
                can_be_residence: false,
                income: IncomeHook::Residence,
                primary: None,
                secondary: None,
                color: Some(color),
            });

            for t in &templates.player {
                push(Building {
                    id: BuildingId(0),
                    kind: BuildingKind::Player,
                    name: t.name.clone(),
                    front_color: t.front_color.clone(),
                    prestige_points: t.prestige_points,
                    cost: t.cost,
                    beginner: t.beginner,
                    can_be_residence: t.can_be_residence,
                    income: IncomeHook::None,
                    primary: Some(t.primary.clone()),
                    secondary: t.secondary.clone(),
                    color: Some(color),
                });
            }
        }

        Self { buildings }
    }

    /// Look up a building. Ids are only ever handed out by this catalog.
    pub fn get(&self, id: BuildingId) -> &Building {
        &self.buildings[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn of_kind(&self, kind: BuildingKind) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(move |b| b.kind == kind)
    }

    /// First non-colored building with this name
    pub fn find_shared(&self, name: &str) -> Option<&Building> {
        self.buildings
            .iter()
            .find(|b| b.color.is_none() && b.name == name)
    }

    /// The player buildings printed in `color`
    pub fn deck_of(&self, color: Color) -> impl Iterator<Item = &Building> {
        self.buildings
            .iter()
            .filter(move |b| b.kind == BuildingKind::Player && b.color == Some(color))
    }

    pub fn residence_of(&self, color: Color) -> Option<BuildingId> {
        self.buildings
            .iter()
            .find(|b| b.kind == BuildingKind::Residence && b.color == Some(color))
            .map(|b| b.id)
    }
}
