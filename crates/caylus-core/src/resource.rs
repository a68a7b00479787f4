//! Resources and the signed quantities built from them.
//!
//! This module contains:
//! - `Resource`, the five kinds of money and cubes (gold being the single wild kind)
//! - `Ledger`, one signed quantity per resource kind, used for holdings and deltas
//! - `Cost`, a cost vector that may carry an "any ordinary cube" requirement
//! - `Price`, a single (resource, quantity) pair used by building effects

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of money and cubes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Denier,
    Food,
    Wood,
    Stone,
    Gold,
}

impl Resource {
    /// Every kind, money first
    pub const ALL: [Resource; 5] = [
        Resource::Denier,
        Resource::Food,
        Resource::Wood,
        Resource::Stone,
        Resource::Gold,
    ];

    /// Cube kinds, wild included
    pub const CUBES: [Resource; 4] = [
        Resource::Food,
        Resource::Wood,
        Resource::Stone,
        Resource::Gold,
    ];

    /// Cube kinds that are not wild
    pub const ORDINARY: [Resource; 3] = [Resource::Food, Resource::Wood, Resource::Stone];

    /// The wild cube, substitutable for any ordinary cube
    pub const WILD: Resource = Resource::Gold;

    pub fn is_wild(self) -> bool {
        self == Self::WILD
    }

    pub fn is_cube(self) -> bool {
        self != Resource::Denier
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Denier => "denier",
            Resource::Food => "food",
            Resource::Wood => "wood",
            Resource::Stone => "stone",
            Resource::Gold => "gold",
        }
    }

    /// Single letter used by text front ends
    pub fn abbreviation(self) -> char {
        match self {
            Resource::Denier => 'D',
            Resource::Food => 'F',
            Resource::Wood => 'W',
            Resource::Stone => 'S',
            Resource::Gold => 'G',
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One signed quantity per resource kind.
///
/// Holdings are never negative once a mutation completes; payment and cost
/// vectors use negative entries for amounts leaving a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub deniers: i32,
    pub food: i32,
    pub wood: i32,
    pub stone: i32,
    pub gold: i32,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger holding a single entry
    pub fn of(resource: Resource, amount: i32) -> Self {
        let mut ledger = Self::new();
        ledger.set(resource, amount);
        ledger
    }

    pub fn with_amounts(deniers: i32, food: i32, wood: i32, stone: i32, gold: i32) -> Self {
        Self {
            deniers,
            food,
            wood,
            stone,
            gold,
        }
    }

    pub fn get(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Denier => self.deniers,
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Gold => self.gold,
        }
    }

    pub fn set(&mut self, resource: Resource, amount: i32) {
        match resource {
            Resource::Denier => self.deniers = amount,
            Resource::Food => self.food = amount,
            Resource::Wood => self.wood = amount,
            Resource::Stone => self.stone = amount,
            Resource::Gold => self.gold = amount,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: i32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add a signed delta entry by entry
    pub fn apply(&mut self, delta: &Ledger) {
        for resource in Resource::ALL {
            self.add(resource, delta.get(resource));
        }
    }

    /// Whether applying `delta` keeps every entry non-negative
    pub fn can_apply(&self, delta: &Ledger) -> bool {
        Resource::ALL
            .iter()
            .all(|&r| self.get(r) + delta.get(r) >= 0)
    }

    pub fn is_non_negative(&self) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= 0)
    }

    pub fn is_zero(&self) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) == 0)
    }

    /// Sum of the ordinary (non-wild) cubes
    pub fn ordinary_cubes(&self) -> i32 {
        Resource::ORDINARY.iter().map(|&r| self.get(r)).sum()
    }

    /// Entries in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, i32)> + '_ {
        Resource::ALL.iter().map(move |&r| (r, self.get(r)))
    }

    /// The entry-wise negation
    pub fn negated(&self) -> Ledger {
        let mut out = Ledger::new();
        for (resource, amount) in self.iter() {
            out.set(resource, -amount);
        }
        out
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, amount)| *amount != 0)
            .map(|(resource, amount)| format!("{} {}", amount, resource))
            .collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// A signed cost vector.
///
/// `exact` holds the fixed requirements (non-positive entries); `any` is the
/// number of additional cubes payable with any ordinary kind, stored as a
/// non-positive amount as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    #[serde(flatten)]
    pub exact: Ledger,
    #[serde(default)]
    pub any: i32,
}

impl Cost {
    pub fn new(exact: Ledger) -> Self {
        Self { exact, any: 0 }
    }

    pub fn with_any(exact: Ledger, any: i32) -> Self {
        Self { exact, any }
    }

    pub fn is_free(&self) -> bool {
        self.exact.is_zero() && self.any == 0
    }

    /// No entry asks for a positive amount
    pub fn is_well_formed(&self) -> bool {
        self.any <= 0 && Resource::ALL.iter().all(|&r| self.exact.get(r) <= 0)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.any == 0 {
            return write!(f, "{}", self.exact.negated());
        }
        if self.exact.is_zero() {
            write!(f, "{} any", -self.any)
        } else {
            write!(f, "{}, {} any", self.exact.negated(), -self.any)
        }
    }
}

/// A single positive (resource, quantity) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub resource: Resource,
    pub amount: u32,
}

impl Price {
    pub fn new(resource: Resource, amount: u32) -> Self {
        Self { resource, amount }
    }

    /// The ledger delta paying this price
    pub fn as_payment(&self) -> Ledger {
        Ledger::of(self.resource, -(self.amount as i32))
    }

    /// The ledger delta receiving this price
    pub fn as_gain(&self) -> Ledger {
        Ledger::of(self.resource, self.amount as i32)
    }

    pub fn is_affordable(&self, holdings: &Ledger) -> bool {
        holdings.get(self.resource) >= self.amount as i32
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.resource)
    }
}
