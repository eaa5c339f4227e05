//! Floor population
//!
//! Picks monster templates by spawn weight, scales their level with the
//! floor danger, rolls whether they start asleep, and surrounds pack
//! leaders with companions. The player's start room is always left empty.

use std::collections::HashSet;

use super::components::Position;
use super::monsters::{Monster, MonsterId};
use crate::combat::{formulas, weighted_choice, Dice};
use crate::data::{MonsterTemplate, MonsterTemplates};
use crate::progression::DangerScaling;
use crate::world::map::NEIGHBOURS;
use crate::world::Map;

/// Hands out monster ids for one session
#[derive(Debug, Clone, Copy, Default)]
pub struct IdAllocator {
    pub next: u32,
}

impl IdAllocator {
    pub fn new(next: u32) -> Self {
        Self { next }
    }

    pub fn allocate(&mut self) -> MonsterId {
        let id = MonsterId(self.next);
        self.next += 1;
        id
    }
}

fn spawn_one<D: Dice + ?Sized>(
    template: &MonsterTemplate,
    scaling: &DangerScaling,
    position: Position,
    ids: &mut IdAllocator,
    dice: &mut D,
) -> Monster {
    let level = scaling.roll_monster_level(dice);
    let mut monster = Monster::from_template(ids.allocate(), template, level, position);
    monster.xp_value = scaling.scale_xp(monster.xp_value);
    monster
}

/// Spawn every monster for a freshly generated floor
pub fn spawn_monsters_for_floor<D: Dice + ?Sized>(
    map: &Map,
    templates: &MonsterTemplates,
    ids: &mut IdAllocator,
    dice: &mut D,
) -> Vec<Monster> {
    let scaling = DangerScaling::new(map.floor_number, map.danger_level);
    let table = templates.spawn_table(map.floor_number);
    if table.is_empty() {
        log::warn!("No monster templates for floor {}", map.floor_number);
        return Vec::new();
    }

    let start_room = map.room_index_at(map.start_pos);
    let allowed = |pos: &Position| {
        *pos != map.start_pos
            && (start_room.is_none() || map.room_index_at(*pos) != start_room)
    };

    let mut free: Vec<Position> = map.walkable_positions().into_iter().filter(|p| allowed(p)).collect();
    let mut occupied: HashSet<Position> = HashSet::new();
    let mut monsters = Vec::new();

    let leaders = scaling.roll_monster_count(dice);
    for _ in 0..leaders {
        // Skip cells taken by pack companions
        free.retain(|p| !occupied.contains(p));
        let Some(idx) = dice.index(free.len()) else {
            break;
        };
        let position = free.swap_remove(idx);
        let Some(template) = weighted_choice(dice, &table).copied() else {
            break;
        };

        let mut leader = spawn_one(template, &scaling, position, ids, dice);
        leader.is_sleeping = dice.chance(formulas::sleep_chance(&leader.stats));
        let asleep = leader.is_sleeping;
        occupied.insert(position);
        monsters.push(leader);

        if !template.spawns_in_packs() {
            continue;
        }
        let (min, max) = template.pack_size;
        let companions = dice.range(min as i32, max as i32);
        for _ in 0..companions {
            let spots: Vec<Position> = NEIGHBOURS
                .iter()
                .map(|(dx, dy)| position.offset(*dx, *dy))
                .filter(|p| map.is_walkable(p.x, p.y) && allowed(p) && !occupied.contains(p))
                .collect();
            let Some(spot) = dice.index(spots.len()).map(|i| spots[i]) else {
                break;
            };
            let mut companion = spawn_one(template, &scaling, spot, ids, dice);
            companion.is_sleeping = asleep;
            occupied.insert(spot);
            monsters.push(companion);
        }
    }

    log::info!(
        "Spawned {} monsters on floor {} ({} leaders rolled)",
        monsters.len(),
        map.floor_number,
        leaders
    );
    monsters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{default_monster_templates, MapSettings};
    use crate::world::generate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn populated(seed: u64, floor: u32) -> (Map, Vec<Monster>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let map = generate(&MapSettings::default(), floor, 1, &mut rng);
        let mut ids = IdAllocator::default();
        let monsters = spawn_monsters_for_floor(&map, &default_monster_templates(), &mut ids, &mut rng);
        (map, monsters)
    }

    #[test]
    fn test_start_room_left_empty() {
        for seed in 0..10 {
            let (map, monsters) = populated(seed, 1);
            let start_room = map.room_index_at(map.start_pos);
            assert!(!monsters.is_empty());
            for monster in &monsters {
                assert_ne!(monster.position, map.start_pos);
                assert_ne!(map.room_index_at(monster.position), start_room, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_no_two_monsters_share_a_cell() {
        for seed in 0..10 {
            let (map, monsters) = populated(seed, 5);
            let cells: HashSet<_> = monsters.iter().map(|m| m.position).collect();
            assert_eq!(cells.len(), monsters.len());
            assert!(monsters.iter().all(|m| map.is_walkable(m.position.x, m.position.y)));
        }
    }

    #[test]
    fn test_ids_unique_and_levels_scaled() {
        let (map, monsters) = populated(3, 4);
        let ids: HashSet<_> = monsters.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), monsters.len());
        let scaling = DangerScaling::new(map.floor_number, map.danger_level);
        for monster in &monsters {
            assert!(monster.level >= scaling.floor);
            assert!(monster.level <= scaling.floor + scaling.danger_level);
        }
    }

    #[test]
    fn test_empty_template_list_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = generate(&MapSettings::default(), 1, 1, &mut rng);
        let mut ids = IdAllocator::default();
        let monsters = spawn_monsters_for_floor(&map, &MonsterTemplates::default(), &mut ids, &mut rng);
        assert!(monsters.is_empty());
        assert_eq!(ids.next, 0);
    }
}
