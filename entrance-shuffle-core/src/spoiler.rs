use serde::{Deserialize, Serialize};

use crate::pool::{EntranceAddresses, PoolType};
use crate::world::{World, WorldId};

/// Final shuffled connections with their patch addresses, per world.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntranceTable {
    pub worlds: Vec<WorldEntrances>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WorldEntrances {
    pub world: WorldId,
    pub entrances: Vec<ShuffledEntrance>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShuffledEntrance {
    pub entrance: String,
    pub target: Option<String>,
    pub pool: Option<PoolType>,
    /// Addresses of the entrance being rewired.
    pub addresses: Option<EntranceAddresses>,
    /// Addresses of the region it now leads to.
    pub target_addresses: Option<EntranceAddresses>,
}

impl EntranceTable {
    pub fn from_worlds(worlds: &[World]) -> Self {
        let worlds = worlds
            .iter()
            .map(|world| WorldEntrances {
                world: world.id,
                entrances: world
                    .get_shuffled_entrances()
                    .into_iter()
                    .map(|id| {
                        let entrance = world.entrance(id);
                        let target = entrance.connected_region;
                        ShuffledEntrance {
                            entrance: entrance.name.clone(),
                            target: target.map(|r| world.region_name(r).to_string()),
                            pool: entrance.pool_type,
                            addresses: entrance.addresses,
                            target_addresses: target.and_then(|r| world.region(r).addresses),
                        }
                    })
                    .collect(),
            })
            .collect();
        Self { worlds }
    }

    /// Where `entrance` of `world` leads, if it was shuffled.
    pub fn target_of(&self, world: WorldId, entrance: &str) -> Option<&str> {
        self.worlds
            .iter()
            .find(|w| w.world == world)?
            .entrances
            .iter()
            .find(|e| e.entrance == entrance)?
            .target
            .as_deref()
    }
}
