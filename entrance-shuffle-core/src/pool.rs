use serde::{Deserialize, Serialize};

use crate::world::WorldSettings;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    Dungeon,
}

/// Engine-side entrance indices consumed by the patcher. Opaque to the shuffle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntranceAddresses {
    pub forward: u16,
    #[serde(rename = "return")]
    pub return_: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<u16>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EntranceShuffleEntry {
    pub name: &'static str,
    pub pool_type: PoolType,
    pub addresses: EntranceAddresses,
}

/// Closed forest keeps this one vanilla: shuffling it can open a path out of
/// the forest through another dungeon's exit.
pub const DEKU_TREE_ENTRANCE: &str = "Outside Deku Tree -> Deku Tree Lobby";

const fn dungeon(name: &'static str, forward: u16, return_: u16, blue: Option<u16>) -> EntranceShuffleEntry {
    EntranceShuffleEntry {
        name,
        pool_type: PoolType::Dungeon,
        addresses: EntranceAddresses {
            forward,
            return_,
            blue,
        },
    }
}

pub const ENTRANCE_SHUFFLE_TABLE: &[EntranceShuffleEntry] = &[
    dungeon(DEKU_TREE_ENTRANCE, 0x0000, 0x0209, Some(0x0457)),
    dungeon("Dodongos Cavern Entryway -> Dodongos Cavern Beginning", 0x0004, 0x0242, Some(0x047A)),
    dungeon("Zoras Fountain -> Jabu Jabus Belly Beginning", 0x0028, 0x0221, Some(0x010E)),
    dungeon("Sacred Forest Meadow -> Forest Temple Lobby", 0x0169, 0x0215, Some(0x0608)),
    dungeon("Death Mountain Crater Central -> Fire Temple Lower", 0x0165, 0x024A, Some(0x0564)),
    dungeon("Lake Hylia -> Water Temple Lobby", 0x0010, 0x021D, Some(0x060C)),
    dungeon("Desert Colossus -> Spirit Temple Lobby", 0x0082, 0x01E1, Some(0x0610)),
    dungeon("Shadow Temple Warp Region -> Shadow Temple Entryway", 0x0037, 0x0205, Some(0x0580)),
    dungeon("Kakariko Village -> Bottom of the Well", 0x0098, 0x02A6, None),
    dungeon("Zoras Fountain -> Ice Cavern Beginning", 0x0088, 0x03D4, None),
    dungeon("Gerudo Fortress -> Gerudo Training Grounds Lobby", 0x0008, 0x03A8, None),
];

/// Every table entry of the given pool, in table order.
pub fn get_entrance_pool(pool_type: PoolType) -> Vec<EntranceShuffleEntry> {
    ENTRANCE_SHUFFLE_TABLE
        .iter()
        .filter(|entry| entry.pool_type == pool_type)
        .copied()
        .collect()
}

/// The dungeon pool as a world with these settings is allowed to shuffle it.
pub fn dungeon_pool_for(settings: &WorldSettings) -> Vec<EntranceShuffleEntry> {
    let mut pool = get_entrance_pool(PoolType::Dungeon);
    if !settings.open_forest {
        pool.retain(|entry| entry.name != DEKU_TREE_ENTRANCE);
    }
    pool
}
