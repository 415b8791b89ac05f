use log::debug;

use crate::reachability::{ExplorationState, ReachabilityOracle};
use crate::world::{check_world_positions, complete_itempool, EntranceId, World, WorldId};
use crate::Result;

/// Split `entrances` (all of world `world`) into restrictive and soft ones.
///
/// Every entrance is disconnected first so that none of them can be what
/// makes another one reachable. An entrance still reachable as both ages in
/// that graph stays reachable whatever the final arrangement is, so it is
/// soft; the rest are restrictive and must be placed with validation.
///
/// The graph is restored before returning.
pub fn split_entrances_by_requirements<O: ReachabilityOracle>(
    worlds: &mut [World],
    oracle: &O,
    world: WorldId,
    entrances: &[EntranceId],
) -> Result<(Vec<EntranceId>, Vec<EntranceId>)> {
    check_world_positions(worlds)?;
    let complete_itempool = complete_itempool(worlds);

    let original_connected_regions: Vec<_> = entrances
        .iter()
        .map(|&entrance| (entrance, worlds[world.0].disconnect(entrance)))
        .collect();

    let mut states = oracle.build_states(worlds, &complete_itempool);
    let graph = &worlds[world.0];
    let state = &mut states[world.0];

    let (restrictive, soft): (Vec<EntranceId>, Vec<EntranceId>) = entrances
        .iter()
        .partition(|&&entrance| !state.can_reach_entrance_as_both(graph, entrance));

    for (entrance, region) in original_connected_regions {
        if let Some(region) = region {
            worlds[world.0].connect(entrance, region);
        }
    }

    debug!(
        "{} restrictive and {} soft entrances [World {}]",
        restrictive.len(),
        soft.len(),
        world
    );
    Ok((restrictive, soft))
}
