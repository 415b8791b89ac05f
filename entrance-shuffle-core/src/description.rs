use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::world::{Item, Requirement, World, WorldId, WorldSettings};

#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("invalid world description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate region '{0}'")]
    DuplicateRegion(String),
    #[error("duplicate entrance '{0}'")]
    DuplicateEntrance(String),
    #[error("exit '{exit}' leads to unknown region '{region}'")]
    UnknownRegion { exit: String, region: String },
    #[error("goal location '{0}' does not exist")]
    UnknownGoal(String),
}

/// A world graph as written in a JSON world file.
///
/// Exits default to the name `"<from> -> <to>"`, which is how entrance pools
/// refer to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDescription {
    #[serde(default)]
    pub settings: WorldSettings,
    pub regions: Vec<RegionDescription>,
    #[serde(default)]
    pub item_pool: Vec<String>,
    #[serde(default)]
    pub dungeon_items: Vec<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDescription {
    pub name: String,
    #[serde(default)]
    pub exits: Vec<ExitDescription>,
    #[serde(default)]
    pub locations: Vec<LocationDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDescription {
    #[serde(default)]
    pub name: Option<String>,
    pub to: String,
    #[serde(default)]
    pub requires: Requirement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDescription {
    pub name: String,
    #[serde(default)]
    pub requires: Requirement,
}

impl WorldDescription {
    pub fn from_json(src: &str) -> Result<Self, DescriptionError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Build the world graph. Entrances start disconnected; call
    /// [`World::initialize_entrances`] to wire up the vanilla layout.
    pub fn build(&self, id: WorldId) -> Result<World, DescriptionError> {
        let mut world = World::new(id, self.settings.clone());

        for region in &self.regions {
            if world.find_region(&region.name).is_some() {
                return Err(DescriptionError::DuplicateRegion(region.name.clone()));
            }
            world.add_region(region.name.clone());
        }

        let mut entrance_names = HashSet::new();
        for region in &self.regions {
            let Some(parent) = world.find_region(&region.name) else {
                continue;
            };
            for exit in &region.exits {
                let name = exit
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{} -> {}", region.name, exit.to));
                let target = world.find_region(&exit.to).ok_or_else(|| DescriptionError::UnknownRegion {
                    exit: name.clone(),
                    region: exit.to.clone(),
                })?;
                if !entrance_names.insert(name.clone()) {
                    return Err(DescriptionError::DuplicateEntrance(name));
                }
                world.add_entrance(name, parent, Some(target), exit.requires.clone());
            }
            for location in &region.locations {
                world.add_location(location.name.clone(), parent, location.requires.clone());
            }
        }

        let owned = |name: &String| Item {
            name: name.clone(),
            world: id,
        };
        world.item_pool = self.item_pool.iter().map(owned).collect();
        world.dungeon_items = self.dungeon_items.iter().map(owned).collect();

        if let Some(goal) = &self.goal {
            let location = world
                .find_location(goal)
                .ok_or_else(|| DescriptionError::UnknownGoal(goal.clone()))?;
            world.goal = Some(location);
        }

        Ok(world)
    }
}
