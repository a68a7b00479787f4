//! The road: buildings in play, the workers on them and the provost.

use crate::building::BuildingId;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// One building position along the road
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Visible building
    pub building: BuildingId,
    pub worker: Option<PlayerId>,
    /// Building covered this turn while a worker stood on it; its effects
    /// still resolve once
    pub replaced_building: Option<BuildingId>,
}

impl Slot {
    fn new(building: BuildingId) -> Self {
        Self {
            building,
            worker: None,
            replaced_building: None,
        }
    }
}

/// Ordered building slots plus the provost marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    slots: Vec<Slot>,
    /// Index of the provost, standard version only
    provost: Option<usize>,
}

impl Road {
    pub fn new(buildings: impl IntoIterator<Item = BuildingId>) -> Self {
        Self {
            slots: buildings.into_iter().map(Slot::new).collect(),
            provost: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn position_of(&self, building: BuildingId) -> Option<usize> {
        self.slots.iter().position(|s| s.building == building)
    }

    /// Append a newly constructed building
    pub fn push(&mut self, building: BuildingId) {
        self.slots.push(Slot::new(building));
    }

    /// Put a worker on an empty slot. Returns false if the slot is taken or
    /// out of range.
    pub fn place_worker(&mut self, index: usize, player: PlayerId) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.worker.is_none() => {
                slot.worker = Some(player);
                true
            }
            _ => false,
        }
    }

    pub fn take_worker(&mut self, index: usize) -> Option<PlayerId> {
        self.slots.get_mut(index).and_then(|s| s.worker.take())
    }

    /// Replace the visible building in place.
    ///
    /// When a worker stands on the slot the first covered building is kept
    /// so it can still resolve this turn.
    pub fn upgrade(&mut self, index: usize, building: BuildingId) -> Option<BuildingId> {
        let slot = self.slots.get_mut(index)?;
        let previous = slot.building;
        if slot.worker.is_some() && slot.replaced_building.is_none() {
            slot.replaced_building = Some(previous);
        }
        slot.building = building;
        Some(previous)
    }

    /// The building whose effects resolve for this slot, clearing any
    /// remembered replaced building
    pub fn take_resolving_building(&mut self, index: usize) -> Option<BuildingId> {
        let slot = self.slots.get_mut(index)?;
        Some(slot.replaced_building.take().unwrap_or(slot.building))
    }

    pub fn provost(&self) -> Option<usize> {
        self.provost
    }

    /// Place the provost; an index past the end is clamped to the last slot
    pub fn set_provost(&mut self, index: Option<usize>) {
        self.provost = index.map(|i| i.min(self.len().saturating_sub(1)));
    }

    /// Shift the provost by a signed number of slots, staying on the road
    pub fn move_provost(&mut self, delta: i32) {
        if let Some(current) = self.provost {
            let last = self.len().saturating_sub(1) as i64;
            let target = (current as i64 + delta as i64).clamp(0, last);
            self.provost = Some(target as usize);
        }
    }

    /// Whether effects of the slot at `index` resolve this turn.
    ///
    /// Without a provost every slot resolves.
    pub fn is_before_provost(&self, index: usize) -> bool {
        self.provost.map_or(true, |p| index <= p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn road() -> Road {
        Road::new((10..14).map(BuildingId))
    }

    #[test]
    fn test_one_worker_per_slot() {
        let mut r = road();
        assert!(r.place_worker(1, 0));
        assert!(!r.place_worker(1, 1));
        assert!(!r.place_worker(9, 1));
        assert_eq!(r.take_worker(1), Some(0));
        assert_eq!(r.take_worker(1), None);
    }

    #[test]
    fn test_upgrade_keeps_first_replaced_building_under_worker() {
        let mut r = road();
        r.place_worker(2, 1);
        assert_eq!(r.upgrade(2, BuildingId(50)), Some(BuildingId(12)));
        assert_eq!(r.upgrade(2, BuildingId(60)), Some(BuildingId(50)));
        assert_eq!(r.slot(2).unwrap().building, BuildingId(60));
        assert_eq!(r.take_resolving_building(2), Some(BuildingId(12)));
        assert_eq!(r.take_resolving_building(2), Some(BuildingId(60)));
    }

    #[test]
    fn test_upgrade_without_worker_remembers_nothing() {
        let mut r = road();
        r.upgrade(0, BuildingId(50));
        assert_eq!(r.slot(0).unwrap().replaced_building, None);
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn test_provost_stays_on_road() {
        let mut r = road();
        r.set_provost(Some(1));
        r.move_provost(10);
        assert_eq!(r.provost(), Some(3));
        r.move_provost(-10);
        assert_eq!(r.provost(), Some(0));
        assert!(r.is_before_provost(0));
        assert!(!r.is_before_provost(1));
    }
}
