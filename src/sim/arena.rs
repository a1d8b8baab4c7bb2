//! Enemy population
//!
//! Slots are recycled with a bumped generation, so an `EnemyId` held by a hit
//! log or a homing projectile never aliases a later enemy.

use glam::Vec2;
use serde::Serialize;

/// Stable handle to one enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnemyId {
    pub index: u32,
    pub generation: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub radius: f32,
    /// Chase speed in px/s
    pub speed: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub elite: bool,
}

impl Enemy {
    pub fn new(pos: Vec2, radius: f32, speed: f32, hp: f32, elite: bool) -> Self {
        Self {
            pos,
            radius,
            speed,
            hp,
            max_hp: hp,
            elite,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Generational arena of enemies. Iteration is in slot order.
#[derive(Debug, Clone, Default)]
pub struct Enemies {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Enemies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, enemy: Enemy) -> EnemyId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.enemy = Some(enemy);
            return EnemyId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            enemy: Some(enemy),
        });
        EnemyId {
            index,
            generation: 0,
        }
    }

    /// Remove an enemy; stale or unknown ids return `None`
    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let enemy = slot.enemy.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(enemy)
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.enemy.as_ref()
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.enemy.as_mut()
    }

    pub fn contains(&self, id: EnemyId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empty the arena. Old ids stay stale, and slots refill in index order
    /// so iteration matches a fresh arena.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.enemy.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free.clear();
        self.free.extend((0..self.slots.len() as u32).rev());
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.enemy.as_ref().map(|enemy| {
                (
                    EnemyId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    enemy,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EnemyId, &mut Enemy)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.enemy.as_mut().map(|enemy| {
                (
                    EnemyId {
                        index: index as u32,
                        generation,
                    },
                    enemy,
                )
            })
        })
    }

    /// Live enemy closest to `point`
    pub fn nearest(&self, point: Vec2) -> Option<(EnemyId, &Enemy)> {
        self.nearest_where(point, |_, _| true)
    }

    /// Live enemy closest to `point` among those accepted by `filter`.
    /// Ties keep the lowest slot.
    pub fn nearest_where(
        &self,
        point: Vec2,
        mut filter: impl FnMut(EnemyId, &Enemy) -> bool,
    ) -> Option<(EnemyId, &Enemy)> {
        let mut best: Option<(f32, EnemyId, &Enemy)> = None;
        for (id, enemy) in self.iter() {
            if !enemy.is_alive() || !filter(id, enemy) {
                continue;
            }
            let d = enemy.pos.distance_squared(point);
            if best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, id, enemy));
            }
        }
        best.map(|(_, id, enemy)| (id, enemy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt(x: f32) -> Enemy {
        Enemy::new(Vec2::new(x, 0.0), 10.0, 50.0, 20.0, false)
    }

    #[test]
    fn test_removed_id_is_stale_after_reuse() {
        let mut enemies = Enemies::new();
        let a = enemies.insert(grunt(0.0));
        assert!(enemies.remove(a).is_some());
        let b = enemies.insert(grunt(5.0));

        // Same slot, new generation
        assert_eq!(a.index, b.index);
        assert_ne!(a, b);
        assert!(enemies.get(a).is_none());
        assert!(enemies.remove(a).is_none());
        assert_eq!(enemies.get(b).unwrap().pos.x, 5.0);
        assert_eq!(enemies.len(), 1);
    }

    #[test]
    fn test_iteration_skips_holes() {
        let mut enemies = Enemies::new();
        let ids: Vec<_> = (0..4).map(|i| enemies.insert(grunt(i as f32))).collect();
        enemies.remove(ids[1]);
        let seen: Vec<_> = enemies.iter().map(|(id, _)| id).collect();
        assert_eq!(seen, vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn test_nearest_ignores_dead_and_filtered() {
        let mut enemies = Enemies::new();
        let far = enemies.insert(grunt(100.0));
        let near = enemies.insert(grunt(10.0));
        let dead = enemies.insert(grunt(1.0));
        enemies.get_mut(dead).unwrap().hp = 0.0;

        assert_eq!(enemies.nearest(Vec2::ZERO).map(|(id, _)| id), Some(near));
        let skip_near = enemies.nearest_where(Vec2::ZERO, |id, _| id != near);
        assert_eq!(skip_near.map(|(id, _)| id), Some(far));
    }

    #[test]
    fn test_clear_invalidates_ids() {
        let mut enemies = Enemies::new();
        let a = enemies.insert(grunt(0.0));
        enemies.clear();
        assert!(enemies.is_empty());
        assert!(!enemies.contains(a));
        let b = enemies.insert(grunt(0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear_refills_in_slot_order() {
        let mut enemies = Enemies::new();
        let ids: Vec<EnemyId> = (0..3).map(|i| enemies.insert(grunt(i as f32))).collect();
        enemies.remove(ids[0]);
        enemies.clear();
        let refilled: Vec<u32> = (0..4).map(|i| enemies.insert(grunt(i as f32)).index).collect();
        assert_eq!(refilled, vec![0, 1, 2, 3]);
        assert_eq!(enemies.len(), 4);
    }
}
