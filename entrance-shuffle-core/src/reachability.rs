use std::collections::{HashSet, VecDeque};

use crate::world::{Age, EntranceId, Item, LocationId, RegionId, Requirement, World, ROOT_REGION};

/// Reachability snapshot of one world under an assumed item set.
///
/// Answers may be cached; any connect/disconnect in the world graph makes the
/// cache stale, so callers clear it before rebuilding states.
pub trait ExplorationState {
    fn can_reach_location(&mut self, world: &World, location: LocationId) -> bool;

    fn can_reach_entrance(&mut self, world: &World, entrance: EntranceId, age: Age) -> bool;

    fn can_reach_entrance_as_both(&mut self, world: &World, entrance: EntranceId) -> bool {
        Age::BOTH
            .iter()
            .all(|&age| self.can_reach_entrance(world, entrance, age))
    }

    fn clear_cache(&mut self);
}

pub trait ReachabilityOracle {
    type State: ExplorationState;

    /// One state per world, aligned with `worlds`, with every item of `items`
    /// handed to the world that owns it.
    fn build_states(&self, worlds: &[World], items: &[Item]) -> Vec<Self::State>;

    /// A multiworld game is only beaten when every world is.
    fn can_beat_game(&self, worlds: &[World], states: &mut [Self::State]) -> bool;
}

impl Requirement {
    pub fn is_satisfied(&self, age: Age, inventory: &HashSet<String>) -> bool {
        match self {
            Requirement::Free => true,
            Requirement::Never => false,
            Requirement::Item(name) => inventory.contains(name),
            Requirement::Age(required) => *required == age,
            Requirement::All(reqs) => reqs.iter().all(|r| r.is_satisfied(age, inventory)),
            Requirement::Any(reqs) => reqs.iter().any(|r| r.is_satisfied(age, inventory)),
        }
    }
}

/// Breadth-first explorer that assumes the whole inventory is already held.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaximalExplorer;

#[derive(Debug, Clone)]
pub struct MaximalState {
    inventory: HashSet<String>,
    reachable: Option<[HashSet<RegionId>; 2]>,
}

impl MaximalState {
    pub fn new(inventory: HashSet<String>) -> Self {
        Self {
            inventory,
            reachable: None,
        }
    }

    fn reachable_regions(&mut self, world: &World, age: Age) -> &HashSet<RegionId> {
        let inventory = &self.inventory;
        let reachable = self.reachable.get_or_insert_with(|| {
            [
                explore(world, Age::Child, inventory),
                explore(world, Age::Adult, inventory),
            ]
        });
        &reachable[age.index()]
    }
}

fn explore(world: &World, age: Age, inventory: &HashSet<String>) -> HashSet<RegionId> {
    let mut seen = HashSet::new();
    let Some(root) = world.find_region(ROOT_REGION) else {
        return seen;
    };

    let mut queue = VecDeque::from([root]);
    seen.insert(root);
    while let Some(region) = queue.pop_front() {
        for &exit in &world.region(region).exits {
            let entrance = world.entrance(exit);
            let Some(target) = entrance.connected_region else {
                continue;
            };
            if !seen.contains(&target) && entrance.requirement.is_satisfied(age, inventory) {
                seen.insert(target);
                queue.push_back(target);
            }
        }
    }
    seen
}

impl ExplorationState for MaximalState {
    fn can_reach_location(&mut self, world: &World, location: LocationId) -> bool {
        let location = world.location(location);
        Age::BOTH.iter().any(|&age| {
            self.reachable_regions(world, age).contains(&location.region)
                && location.requirement.is_satisfied(age, &self.inventory)
        })
    }

    fn can_reach_entrance(&mut self, world: &World, entrance: EntranceId, age: Age) -> bool {
        let entrance = world.entrance(entrance);
        self.reachable_regions(world, age).contains(&entrance.parent_region)
            && entrance.requirement.is_satisfied(age, &self.inventory)
    }

    fn clear_cache(&mut self) {
        self.reachable = None;
    }
}

impl ReachabilityOracle for MaximalExplorer {
    type State = MaximalState;

    fn build_states(&self, worlds: &[World], items: &[Item]) -> Vec<MaximalState> {
        worlds
            .iter()
            .map(|world| {
                let inventory = items
                    .iter()
                    .filter(|item| item.world == world.id)
                    .map(|item| item.name.clone())
                    .collect();
                MaximalState::new(inventory)
            })
            .collect()
    }

    fn can_beat_game(&self, worlds: &[World], states: &mut [MaximalState]) -> bool {
        worlds.iter().zip(states.iter_mut()).all(|(world, state)| match world.goal {
            Some(goal) => state.can_reach_location(world, goal),
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{complete_itempool, WorldId, WorldSettings};

    struct Fixture {
        world: World,
        bridge: EntranceId,
        tower_door: EntranceId,
        chest: LocationId,
        summit: LocationId,
    }

    fn fixture() -> Fixture {
        let mut world = World::new(WorldId(0), WorldSettings::default());
        let root = world.add_region(ROOT_REGION);
        let field = world.add_region("Field");
        let tower = world.add_region("Tower");
        let bridge = world.add_entrance("Links House -> Field", root, Some(field), Requirement::Free);
        let tower_door = world.add_entrance(
            "Field -> Tower",
            field,
            Some(tower),
            Requirement::All(vec![
                Requirement::Age(Age::Adult),
                Requirement::Item("Hookshot".to_string()),
            ]),
        );
        let chest = world.add_location("Field Chest", field, Requirement::Age(Age::Child));
        let summit = world.add_location("Tower Summit", tower, Requirement::Free);
        world.item_pool.push(Item {
            name: "Hookshot".to_string(),
            world: WorldId(0),
        });
        world.goal = Some(summit);
        world.initialize_entrances();
        Fixture {
            world,
            bridge,
            tower_door,
            chest,
            summit,
        }
    }

    #[test]
    fn explores_per_age_with_inventory() {
        let f = fixture();
        let worlds = vec![f.world];
        let mut states = MaximalExplorer.build_states(&worlds, &complete_itempool(&worlds));
        let state = &mut states[0];

        assert!(state.can_reach_location(&worlds[0], f.chest));
        assert!(state.can_reach_location(&worlds[0], f.summit));
        assert!(state.can_reach_entrance(&worlds[0], f.tower_door, Age::Adult));
        assert!(!state.can_reach_entrance(&worlds[0], f.tower_door, Age::Child));
        assert!(!state.can_reach_entrance_as_both(&worlds[0], f.tower_door));
        assert!(state.can_reach_entrance_as_both(&worlds[0], f.bridge));
    }

    #[test]
    fn missing_item_blocks_goal() {
        let f = fixture();
        let worlds = vec![f.world];
        let mut states = MaximalExplorer.build_states(&worlds, &[]);
        assert!(!states[0].can_reach_location(&worlds[0], f.summit));
        assert!(!MaximalExplorer.can_beat_game(&worlds, &mut states));
    }

    #[test]
    fn cleared_cache_sees_new_topology() {
        let f = fixture();
        let mut worlds = vec![f.world];
        let items = complete_itempool(&worlds);
        let mut states = MaximalExplorer.build_states(&worlds, &items);
        assert!(states[0].can_reach_location(&worlds[0], f.chest));

        worlds[0].disconnect(f.bridge);
        // Stale until cleared.
        assert!(states[0].can_reach_location(&worlds[0], f.chest));
        states[0].clear_cache();
        assert!(!states[0].can_reach_location(&worlds[0], f.chest));
    }

    #[test]
    fn items_go_to_their_owning_world() {
        let mut first = fixture().world;
        let mut second = fixture().world;
        second.id = WorldId(1);
        // World 0 holds world 1's hookshot and vice versa.
        first.item_pool[0].world = WorldId(1);
        second.item_pool[0].world = WorldId(0);
        let worlds = vec![first, second];

        let mut states = MaximalExplorer.build_states(&worlds, &complete_itempool(&worlds));
        assert_eq!(states.len(), 2);
        assert!(MaximalExplorer.can_beat_game(&worlds, &mut states));

        let only_first = vec![worlds[0].get_itempool_with_dungeon_items()[0].clone()];
        let mut states = MaximalExplorer.build_states(&worlds, &only_first);
        assert!(!MaximalExplorer.can_beat_game(&worlds, &mut states));
    }
}
