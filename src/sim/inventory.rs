//! Owned weapons and passives for one run

use serde::Serialize;

/// An owned weapon or passive at its current tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedItem {
    pub id: String,
    pub tier: u32,
}

impl OwnedItem {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            tier: 1,
        }
    }
}

/// Capacity-limited, duplicate-free item lists in acquisition order.
///
/// Mutations report success as `bool` and leave the inventory untouched on
/// failure.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    weapons: Vec<OwnedItem>,
    passives: Vec<OwnedItem>,
    weapon_slots: usize,
    passive_slots: usize,
}

impl Inventory {
    pub fn new(weapon_slots: usize, passive_slots: usize) -> Self {
        Self {
            weapons: Vec::with_capacity(weapon_slots),
            passives: Vec::with_capacity(passive_slots),
            weapon_slots,
            passive_slots,
        }
    }

    pub fn weapons(&self) -> &[OwnedItem] {
        &self.weapons
    }

    pub fn passives(&self) -> &[OwnedItem] {
        &self.passives
    }

    pub fn weapon(&self, id: &str) -> Option<&OwnedItem> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn passive(&self, id: &str) -> Option<&OwnedItem> {
        self.passives.iter().find(|p| p.id == id)
    }

    pub fn has_weapon_slot(&self) -> bool {
        self.weapons.len() < self.weapon_slots
    }

    pub fn has_passive_slot(&self) -> bool {
        self.passives.len() < self.passive_slots
    }

    pub fn add_weapon(&mut self, id: &str) -> bool {
        add(&mut self.weapons, self.weapon_slots, id)
    }

    pub fn add_passive(&mut self, id: &str) -> bool {
        add(&mut self.passives, self.passive_slots, id)
    }

    /// Raise a weapon's tier by one, up to `max_tier`
    pub fn upgrade_weapon(&mut self, id: &str, max_tier: u32) -> bool {
        upgrade(&mut self.weapons, id, max_tier)
    }

    pub fn upgrade_passive(&mut self, id: &str, max_tier: u32) -> bool {
        upgrade(&mut self.passives, id, max_tier)
    }

    /// Swap a weapon for another in the same slot, at tier 1
    pub fn replace_weapon(&mut self, old_id: &str, new_id: &str) -> bool {
        if old_id != new_id && self.weapon(new_id).is_some() {
            return false;
        }
        match self.weapons.iter_mut().find(|w| w.id == old_id) {
            Some(slot) => {
                *slot = OwnedItem::new(new_id);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.weapons.clear();
        self.passives.clear();
    }
}

fn add(items: &mut Vec<OwnedItem>, slots: usize, id: &str) -> bool {
    if items.len() >= slots || items.iter().any(|i| i.id == id) {
        return false;
    }
    items.push(OwnedItem::new(id));
    true
}

fn upgrade(items: &mut [OwnedItem], id: &str, max_tier: u32) -> bool {
    match items.iter_mut().find(|i| i.id == id) {
        Some(item) if item.tier < max_tier => {
            item.tier += 1;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_rejects_duplicates() {
        let mut inv = Inventory::new(3, 3);
        assert!(inv.add_weapon("w_whip"));
        assert!(!inv.add_weapon("w_whip"));
        assert_eq!(inv.weapons().len(), 1);
        assert_eq!(inv.weapon("w_whip").unwrap().tier, 1);
    }

    #[test]
    fn test_upgrade_stops_at_max_tier() {
        let mut inv = Inventory::new(3, 3);
        inv.add_passive("p_armor");
        for _ in 0..4 {
            assert!(inv.upgrade_passive("p_armor", 5));
        }
        assert!(!inv.upgrade_passive("p_armor", 5));
        assert_eq!(inv.passive("p_armor").unwrap().tier, 5);
        assert!(!inv.upgrade_passive("p_missing", 5));
    }

    #[test]
    fn test_replace_keeps_slot_order() {
        let mut inv = Inventory::new(3, 3);
        inv.add_weapon("w_knife");
        inv.add_weapon("w_whip");
        inv.upgrade_weapon("w_whip", 5);
        assert!(inv.replace_weapon("w_whip", "w_bloodyTear"));
        assert_eq!(inv.weapons()[1], OwnedItem::new("w_bloodyTear"));
        // Target already owned
        assert!(!inv.replace_weapon("w_knife", "w_bloodyTear"));
        assert!(!inv.replace_weapon("w_missing", "w_other"));
    }

    proptest! {
        #[test]
        fn prop_full_inventory_rejects_adds(slots in 1usize..5, extra in "[a-z]{1,8}") {
            let mut inv = Inventory::new(slots, slots);
            for i in 0..slots {
                let name = format!("w_{i}");
                prop_assert!(inv.add_weapon(&name));
            }
            let before = inv.weapons().to_vec();
            let name = format!("x_{extra}");
            prop_assert!(!inv.add_weapon(&name));
            prop_assert_eq!(inv.weapons(), before.as_slice());
        }
    }
}
