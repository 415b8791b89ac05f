use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::fmt;

use crate::pool::{EntranceAddresses, PoolType};
use crate::{Result, ShuffleError, ShuffleErrorKind};

/// Region every world starts exploring from. Fill entrances hang off it.
pub const ROOT_REGION: &str = "Links House";

new_key_type! {
    pub struct RegionId;
    pub struct EntranceId;
}

/// Stable player index. Worlds are always stored so that `worlds[id.0].id == id`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub usize);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into [`World::locations`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LocationId(pub usize);

/// A location qualified by the world that owns it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LocationRef {
    pub world: WorldId,
    pub location: LocationId,
}

/// Traversal context. Reachability is evaluated independently for each age.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Age {
    Child,
    Adult,
}

impl Age {
    pub const BOTH: [Age; 2] = [Age::Child, Age::Adult];

    pub(crate) fn index(self) -> usize {
        match self {
            Age::Child => 0,
            Age::Adult => 1,
        }
    }
}

/// Access rule attached to an entrance or location.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    Free,
    Never,
    Item(String),
    Age(Age),
    All(Vec<Requirement>),
    Any(Vec<Requirement>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub shuffle_dungeon_entrances: bool,
    pub open_forest: bool,
    /// Only require the game to stay beatable instead of keeping every
    /// location reachable.
    pub check_beatable_only: bool,
}

#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub exits: Vec<EntranceId>,
    pub addresses: Option<EntranceAddresses>,
}

#[derive(Debug, Clone)]
pub struct Entrance {
    pub name: String,
    pub pool_type: Option<PoolType>,
    pub addresses: Option<EntranceAddresses>,
    pub shuffled: bool,
    pub connected_region: Option<RegionId>,
    pub parent_region: RegionId,
    /// Target restored by [`World::initialize_entrances`].
    pub vanilla_region: Option<RegionId>,
    pub requirement: Requirement,
}

#[derive(Debug, Clone)]
pub struct Location {
    pub name: String,
    pub region: RegionId,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Item {
    pub name: String,
    /// World whose player receives the item.
    pub world: WorldId,
}

#[derive(Debug, Clone)]
pub struct World {
    pub id: WorldId,
    pub settings: WorldSettings,
    regions: SlotMap<RegionId, Region>,
    entrances: SlotMap<EntranceId, Entrance>,
    locations: Vec<Location>,
    pub item_pool: Vec<Item>,
    pub dungeon_items: Vec<Item>,
    /// Location that must be reachable for this world to count as beaten.
    pub goal: Option<LocationId>,
}

impl World {
    pub fn new(id: WorldId, settings: WorldSettings) -> Self {
        Self {
            id,
            settings,
            regions: SlotMap::with_key(),
            entrances: SlotMap::with_key(),
            locations: Vec::new(),
            item_pool: Vec::new(),
            dungeon_items: Vec::new(),
            goal: None,
        }
    }

    pub fn add_region(&mut self, name: impl Into<String>) -> RegionId {
        self.regions.insert(Region {
            name: name.into(),
            exits: Vec::new(),
            addresses: None,
        })
    }

    /// Add an exit of `parent`. The entrance starts disconnected; `vanilla`
    /// is where [`World::initialize_entrances`] points it.
    pub fn add_entrance(
        &mut self,
        name: impl Into<String>,
        parent: RegionId,
        vanilla: Option<RegionId>,
        requirement: Requirement,
    ) -> EntranceId {
        let id = self.entrances.insert(Entrance {
            name: name.into(),
            pool_type: None,
            addresses: None,
            shuffled: false,
            connected_region: None,
            parent_region: parent,
            vanilla_region: vanilla,
            requirement,
        });
        self.regions[parent].exits.push(id);
        id
    }

    /// Delete an entrance and detach it from its parent's exit list.
    pub fn remove_entrance(&mut self, entrance: EntranceId) {
        if let Some(removed) = self.entrances.remove(entrance) {
            if let Some(parent) = self.regions.get_mut(removed.parent_region) {
                parent.exits.retain(|&e| e != entrance);
            }
        }
    }

    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        region: RegionId,
        requirement: Requirement,
    ) -> LocationId {
        self.locations.push(Location {
            name: name.into(),
            region,
            requirement,
        });
        LocationId(self.locations.len() - 1)
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id]
    }

    pub fn region_mut(&mut self, id: RegionId) -> &mut Region {
        &mut self.regions[id]
    }

    pub fn entrance(&self, id: EntranceId) -> &Entrance {
        &self.entrances[id]
    }

    pub fn entrance_mut(&mut self, id: EntranceId) -> &mut Entrance {
        &mut self.entrances[id]
    }

    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.0]
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions.iter()
    }

    pub fn entrances(&self) -> impl Iterator<Item = (EntranceId, &Entrance)> {
        self.entrances.iter()
    }

    pub fn locations(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(idx, loc)| (LocationId(idx), loc))
    }

    pub fn find_region(&self, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .find(|(_, region)| region.name == name)
            .map(|(id, _)| id)
    }

    pub fn find_entrance(&self, name: &str) -> Option<EntranceId> {
        self.entrances
            .iter()
            .find(|(_, entrance)| entrance.name == name)
            .map(|(id, _)| id)
    }

    pub fn find_location(&self, name: &str) -> Option<LocationId> {
        self.locations
            .iter()
            .position(|loc| loc.name == name)
            .map(LocationId)
    }

    pub fn get_region(&self, name: &str) -> Result<RegionId> {
        self.find_region(name).ok_or_else(|| {
            ShuffleError::new(self.id, ShuffleErrorKind::UnknownRegion(name.to_string()))
        })
    }

    pub fn get_entrance(&self, name: &str) -> Result<EntranceId> {
        self.find_entrance(name).ok_or_else(|| {
            ShuffleError::new(self.id, ShuffleErrorKind::UnknownEntrance(name.to_string()))
        })
    }

    /// Point every entrance that has a vanilla target back at it.
    pub fn initialize_entrances(&mut self) {
        for (_, entrance) in self.entrances.iter_mut() {
            if let Some(vanilla) = entrance.vanilla_region {
                entrance.connected_region = Some(vanilla);
            }
        }
    }

    pub fn connect(&mut self, entrance: EntranceId, region: RegionId) {
        self.entrances[entrance].connected_region = Some(region);
    }

    /// Leave `entrance` pointing nowhere and return what it pointed to.
    pub fn disconnect(&mut self, entrance: EntranceId) -> Option<RegionId> {
        self.entrances[entrance].connected_region.take()
    }

    /// Entrances currently connected to `region`, in arena order.
    pub fn entrances_into(&self, region: RegionId) -> impl Iterator<Item = EntranceId> + '_ {
        self.entrances
            .iter()
            .filter(move |(_, entrance)| entrance.connected_region == Some(region))
            .map(|(id, _)| id)
    }

    pub fn get_shuffled_entrances(&self) -> Vec<EntranceId> {
        self.entrances
            .iter()
            .filter(|(_, entrance)| entrance.shuffled)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn get_itempool_with_dungeon_items(&self) -> Vec<Item> {
        self.item_pool
            .iter()
            .chain(self.dungeon_items.iter())
            .cloned()
            .collect()
    }

    pub fn entrance_name(&self, id: EntranceId) -> &str {
        self.entrances.get(id).map_or("<removed entrance>", |e| e.name.as_str())
    }

    pub fn region_name(&self, id: RegionId) -> &str {
        self.regions.get(id).map_or("<unknown region>", |r| r.name.as_str())
    }

    /// Name of the region `entrance` currently leads to, for log lines.
    pub fn target_name(&self, entrance: EntranceId) -> &str {
        self.entrances
            .get(entrance)
            .and_then(|e| e.connected_region)
            .map_or("nowhere", |r| self.region_name(r))
    }
}

/// Items of every world, the pool maximal exploration assumes collected.
pub fn complete_itempool(worlds: &[World]) -> Vec<Item> {
    worlds
        .iter()
        .flat_map(|world| world.get_itempool_with_dungeon_items())
        .collect()
}

/// Worlds and their exploration states are looked up by id, so world `i`
/// must sit at position `i` of the list.
pub fn check_world_positions(worlds: &[World]) -> Result<()> {
    match worlds
        .iter()
        .enumerate()
        .find(|(position, world)| world.id != WorldId(*position))
    {
        Some((position, world)) => Err(ShuffleError::new(
            world.id,
            ShuffleErrorKind::WorldOutOfPlace { position },
        )),
        None => Ok(()),
    }
}

pub fn all_locations(worlds: &[World]) -> Vec<LocationRef> {
    worlds
        .iter()
        .flat_map(|world| {
            world.locations().map(move |(location, _)| LocationRef {
                world: world.id,
                location,
            })
        })
        .collect()
}
