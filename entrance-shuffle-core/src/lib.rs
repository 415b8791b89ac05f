use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classify;
pub mod description;
pub mod placement;
pub mod pool;
pub mod reachability;
pub mod shuffle;
pub mod spoiler;
pub mod world;

pub use description::{DescriptionError, WorldDescription};
pub use pool::{dungeon_pool_for, get_entrance_pool, EntranceAddresses, EntranceShuffleEntry, PoolType};
pub use reachability::{ExplorationState, MaximalExplorer, ReachabilityOracle};
pub use shuffle::{set_entrances, shuffle_entrances};
pub use spoiler::EntranceTable;
pub use world::{World, WorldId, WorldSettings};

/// Placement attempts the restrictive placer gets per world and pool.
pub const DEFAULT_RESTRICTIVE_RETRIES: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleOptions {
    pub restrictive_retries: usize,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        Self {
            restrictive_retries: DEFAULT_RESTRICTIVE_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ShuffleErrorKind {
    #[error("entrance rando of regions with multiple rando entrances not supported ({region})")]
    UnsupportedMultiEntranceRegion { region: String },
    #[error("fill attempt retry count exceeded")]
    RetriesExhausted,
    #[error("cannot beat game")]
    Unbeatable,
    #[error("ALR is enabled but not all locations are reachable")]
    AlrViolated,
    #[error("unknown entrance '{0}'")]
    UnknownEntrance(String),
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
    #[error("entrance '{0}' is not connected to any region")]
    DisconnectedEntrance(String),
    #[error("world stored at position {position} of the world list")]
    WorldOutOfPlace { position: usize },
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("{kind} [World {world}]")]
pub struct ShuffleError {
    pub world: WorldId,
    pub kind: ShuffleErrorKind,
}

impl ShuffleError {
    pub fn new(world: WorldId, kind: ShuffleErrorKind) -> Self {
        Self { world, kind }
    }
}

pub type Result<T> = std::result::Result<T, ShuffleError>;
