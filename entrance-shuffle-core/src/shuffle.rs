use log::{error, info};
use rand::Rng;
use std::collections::HashSet;

use crate::classify::split_entrances_by_requirements;
use crate::placement::{shuffle_entrances_fast, shuffle_entrances_restrictive, TargetSlots};
use crate::pool::{dungeon_pool_for, EntranceShuffleEntry};
use crate::reachability::{ExplorationState, ReachabilityOracle};
use crate::spoiler::EntranceTable;
use crate::world::{
    all_locations, check_world_positions, complete_itempool, EntranceId, LocationRef, RegionId,
    World, WorldId, ROOT_REGION,
};
use crate::{Result, ShuffleError, ShuffleErrorKind, ShuffleOptions};

/// Connect every world's entrances to their vanilla regions, shuffle the
/// enabled pools, then hand the final graph to `set_rules` once.
pub fn set_entrances<O, R, F>(
    worlds: &mut [World],
    oracle: &O,
    rng: &mut R,
    options: &ShuffleOptions,
    set_rules: F,
) -> Result<EntranceTable>
where
    O: ReachabilityOracle,
    R: Rng + ?Sized,
    F: FnOnce(&mut [World]),
{
    check_world_positions(worlds)?;
    for world in worlds.iter_mut() {
        world.initialize_entrances();
    }

    if worlds.first().is_some_and(|w| w.settings.shuffle_dungeon_entrances) {
        shuffle_entrances(worlds, oracle, rng, options)?;
    }

    set_rules(worlds);
    Ok(EntranceTable::from_worlds(worlds))
}

/// Locations no maximal exploration can reach in the current graph.
pub fn unreachable_locations<O: ReachabilityOracle>(
    worlds: &[World],
    oracle: &O,
) -> Result<HashSet<LocationRef>> {
    check_world_positions(worlds)?;
    let mut states = oracle.build_states(worlds, &complete_itempool(worlds));
    Ok(all_locations(worlds)
        .into_iter()
        .filter(|loc| !states[loc.world.0].can_reach_location(&worlds[loc.world.0], loc.location))
        .collect())
}

/// Shuffle every enabled pool in every world and verify the result.
pub fn shuffle_entrances<O, R>(
    worlds: &mut [World],
    oracle: &O,
    rng: &mut R,
    options: &ShuffleOptions,
) -> Result<()>
where
    O: ReachabilityOracle,
    R: Rng + ?Sized,
{
    let Some(lead) = worlds.first() else {
        return Ok(());
    };
    let shuffle_dungeon_entrances = lead.settings.shuffle_dungeon_entrances;
    check_world_positions(worlds)?;

    // Tells locations we made unreachable apart from those that always were.
    let already_unreachable = unreachable_locations(worlds, oracle)?;

    if shuffle_dungeon_entrances {
        let pools: Vec<_> = worlds.iter().map(|w| dungeon_pool_for(&w.settings)).collect();
        shuffle_entrance_pool(worlds, oracle, rng, &pools, &already_unreachable, options)?;
    }

    for world in worlds.iter() {
        check_region_targets(world);
    }

    verify_shuffle(worlds, oracle, &already_unreachable)
}

struct ResolvedPool {
    root: RegionId,
    entrances: Vec<(EntranceId, EntranceShuffleEntry)>,
}

/// Look up every pool entry of `world` and make sure each target region can
/// take address metadata. Nothing is mutated here.
fn resolve_pool(world: &World, pool: &[EntranceShuffleEntry]) -> Result<ResolvedPool> {
    let root = world.get_region(ROOT_REGION)?;
    let mut targets = HashSet::new();
    let mut entrances = Vec::with_capacity(pool.len());

    for entry in pool {
        let entrance = world.get_entrance(entry.name)?;
        let target = world.entrance(entrance).connected_region.ok_or_else(|| {
            ShuffleError::new(
                world.id,
                ShuffleErrorKind::DisconnectedEntrance(entry.name.to_string()),
            )
        })?;
        // Regions only carry one set of addresses for now.
        if world.region(target).addresses.is_some() || !targets.insert(target) {
            return Err(ShuffleError::new(
                world.id,
                ShuffleErrorKind::UnsupportedMultiEntranceRegion {
                    region: world.region_name(target).to_string(),
                },
            ));
        }
        entrances.push((entrance, *entry));
    }

    Ok(ResolvedPool { root, entrances })
}

/// Shuffle `pools[i]` within `worlds[i]`, for every world.
///
/// All pools are resolved and validated before any world is touched.
pub fn shuffle_entrance_pool<O, R>(
    worlds: &mut [World],
    oracle: &O,
    rng: &mut R,
    pools: &[Vec<EntranceShuffleEntry>],
    already_unreachable: &HashSet<LocationRef>,
    options: &ShuffleOptions,
) -> Result<()>
where
    O: ReachabilityOracle,
    R: Rng + ?Sized,
{
    check_world_positions(worlds)?;
    let resolved = worlds
        .iter()
        .zip(pools)
        .map(|(world, pool)| resolve_pool(world, pool))
        .collect::<Result<Vec<_>>>()?;

    for (index, pool) in resolved.into_iter().enumerate() {
        let world_id = worlds[index].id;

        let world = &mut worlds[index];
        let mut entrances_to_shuffle = Vec::with_capacity(pool.entrances.len());
        for (entrance, entry) in pool.entrances {
            if let Some(target) = world.entrance(entrance).connected_region {
                world.region_mut(target).addresses = Some(entry.addresses);
            }
            let e = world.entrance_mut(entrance);
            e.pool_type = Some(entry.pool_type);
            e.addresses = Some(entry.addresses);
            e.shuffled = true;
            entrances_to_shuffle.push(entrance);
        }

        // Constrained entrances go first, while most regions are still free.
        let (mut restrictive, soft) =
            split_entrances_by_requirements(worlds, oracle, world_id, &entrances_to_shuffle)?;

        // Assumed fill: every freed region hangs off the root until claimed.
        let world = &mut worlds[index];
        let target_regions: Vec<RegionId> = entrances_to_shuffle
            .iter()
            .filter_map(|&entrance| world.disconnect(entrance))
            .collect();
        let mut slots = TargetSlots::create(world, pool.root, &target_regions);

        shuffle_entrances_restrictive(
            worlds,
            oracle,
            rng,
            &mut restrictive,
            &mut slots,
            already_unreachable,
            options.restrictive_retries,
        )?;
        shuffle_entrances_fast(&mut worlds[index], rng, &soft, &mut slots);
        debug_assert!(slots.is_empty());

        info!(
            "Shuffled {} entrances ({} restrictive, {} soft) [World {}]",
            entrances_to_shuffle.len(),
            restrictive.len(),
            soft.len(),
            world_id
        );
    }

    Ok(())
}

/// Log every region that does not have exactly one shuffled entrance leading
/// into it. Returns how many problems were found; none of them are fatal.
pub fn check_region_targets(world: &World) -> usize {
    let shuffled = world.get_shuffled_entrances();
    let mut problems = 0;

    for &entrance in &shuffled {
        let Some(region) = world.entrance(entrance).connected_region else {
            error!(
                "{} is not connected after shuffling [World {}]",
                world.entrance_name(entrance),
                world.id
            );
            problems += 1;
            continue;
        };
        let count = world
            .entrances_into(region)
            .filter(|e| shuffled.contains(e))
            .count();
        if count != 1 {
            error!(
                "{} has {} shuffled entrances after shuffling, expected exactly 1 [World {}]",
                world.region_name(region),
                count,
                world.id
            );
            problems += 1;
        }
    }
    problems
}

/// Final checks on a shuffled multiworld: ALR (unless beatable-only) and
/// beatability. Unbeatable takes precedence over an ALR violation.
pub fn verify_shuffle<O: ReachabilityOracle>(
    worlds: &[World],
    oracle: &O,
    already_unreachable: &HashSet<LocationRef>,
) -> Result<()> {
    let Some(lead) = worlds.first() else {
        return Ok(());
    };
    check_world_positions(worlds)?;
    let mut states = oracle.build_states(worlds, &complete_itempool(worlds));

    let mut alr_violation: Option<WorldId> = None;
    if !lead.settings.check_beatable_only {
        for loc in all_locations(worlds) {
            let world = &worlds[loc.world.0];
            if !already_unreachable.contains(&loc)
                && !states[loc.world.0].can_reach_location(world, loc.location)
            {
                error!(
                    "Location now unreachable after shuffling entrances: {} [World {}]",
                    world.location(loc.location).name,
                    loc.world
                );
                alr_violation.get_or_insert(loc.world);
            }
        }
    }

    if !oracle.can_beat_game(worlds, &mut states) {
        return Err(ShuffleError::new(lead.id, ShuffleErrorKind::Unbeatable));
    }

    if let Some(world) = alr_violation {
        return Err(ShuffleError::new(world, ShuffleErrorKind::AlrViolated));
    }

    Ok(())
}
