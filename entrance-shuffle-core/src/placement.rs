use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::reachability::{ExplorationState, ReachabilityOracle};
use crate::world::{
    all_locations, check_world_positions, complete_itempool, EntranceId, LocationRef, RegionId,
    Requirement, World, WorldId,
};
use crate::{Result, ShuffleError, ShuffleErrorKind};

/// Free target regions of one pool shuffle.
///
/// Each free region is held by a synthetic "Root -> <region>" entrance on the
/// root region, so exploration assumes it is reachable until an entrance
/// claims it. Consumed slots are deleted from the world by [`Rollback::commit`].
#[derive(Debug)]
pub struct TargetSlots {
    world: WorldId,
    free: Vec<EntranceId>,
}

impl TargetSlots {
    pub fn create(world: &mut World, root: RegionId, targets: &[RegionId]) -> Self {
        let free = targets
            .iter()
            .map(|&target| {
                let name = format!("Root -> {}", world.region_name(target));
                let slot = world.add_entrance(name, root, None, Requirement::Free);
                world.connect(slot, target);
                slot
            })
            .collect();
        Self {
            world: world.id,
            free,
        }
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn as_slice(&self) -> &[EntranceId] {
        &self.free
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.free.shuffle(rng);
    }

    fn take(&mut self, slot: EntranceId) {
        self.free.retain(|&s| s != slot);
    }

    fn restore(&mut self, slot: EntranceId) {
        self.free.push(slot);
    }
}

/// Move whatever `from` points at over to `to`.
fn transfer(world: &mut World, from: EntranceId, to: EntranceId) {
    if let Some(region) = world.disconnect(from) {
        world.connect(to, region);
    }
}

/// Undo log of accepted placements, as `(slot, entrance)` pairs.
#[derive(Debug, Default)]
pub struct Rollback {
    placements: Vec<(EntranceId, EntranceId)>,
}

impl Rollback {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.placements.len()
    }

    /// Connect `entrance` to the region `slot` holds and remember it.
    pub fn place(&mut self, world: &mut World, slots: &mut TargetSlots, slot: EntranceId, entrance: EntranceId) {
        transfer(world, slot, entrance);
        self.record(slots, slot, entrance);
    }

    /// Remember that `entrance` already took over the region of `slot`.
    pub fn record(&mut self, slots: &mut TargetSlots, slot: EntranceId, entrance: EntranceId) {
        slots.take(slot);
        self.placements.push((slot, entrance));
    }

    /// Give every placed region back to its slot, newest first.
    pub fn undo(self, world: &mut World, slots: &mut TargetSlots) {
        for (slot, entrance) in self.placements.into_iter().rev() {
            transfer(world, entrance, slot);
            slots.restore(slot);
        }
    }

    /// Keep every placement and delete the now empty slots.
    pub fn commit(self, world: &mut World) {
        for (slot, entrance) in self.placements {
            debug!(
                "Connected {} To {} [World {}]",
                world.entrance_name(entrance),
                world.target_name(entrance),
                world.id
            );
            world.remove_entrance(slot);
        }
    }
}

/// Whether the tentative graph keeps the game beatable (beatable-only mode)
/// or keeps every location that was reachable before shuffling reachable.
fn can_connect<O: ReachabilityOracle>(
    worlds: &[World],
    oracle: &O,
    states: &mut [O::State],
    locations: &[LocationRef],
    already_unreachable: &HashSet<LocationRef>,
    entrance: (WorldId, EntranceId),
) -> bool {
    let check_beatable_only = worlds.first().is_some_and(|w| w.settings.check_beatable_only);
    if check_beatable_only && oracle.can_beat_game(worlds, states) {
        return true;
    }

    for loc in locations {
        if already_unreachable.contains(loc) {
            continue;
        }
        let world = &worlds[loc.world.0];
        if !states[loc.world.0].can_reach_location(world, loc.location) {
            let (entrance_world, entrance) = entrance;
            let owner = &worlds[entrance_world.0];
            debug!(
                "Failed to connect {} To {} (because of {}) [World {}]",
                owner.entrance_name(entrance),
                owner.target_name(entrance),
                world.location(loc.location).name,
                entrance_world
            );
            return false;
        }
    }
    true
}

/// Place restrictive entrances one by one, validating every candidate.
///
/// Each attempt shuffles the entrance order, then tries the free slots of
/// each entrance in a fresh random order. A candidate is kept when
/// [`can_connect`] accepts the rebuilt exploration states. If an entrance
/// runs out of candidates the attempt is rolled back entirely and a new one
/// starts, up to `retry_count` attempts.
pub fn shuffle_entrances_restrictive<O, R>(
    worlds: &mut [World],
    oracle: &O,
    rng: &mut R,
    entrances: &mut [EntranceId],
    slots: &mut TargetSlots,
    already_unreachable: &HashSet<LocationRef>,
    retry_count: usize,
) -> Result<()>
where
    O: ReachabilityOracle,
    R: Rng + ?Sized,
{
    if entrances.is_empty() {
        return Ok(());
    }
    check_world_positions(worlds)?;

    let world_id = slots.world();
    let locations = all_locations(worlds);
    let complete_itempool = complete_itempool(worlds);
    let mut states: Vec<O::State> = Vec::new();

    for attempt in 0..retry_count {
        entrances.shuffle(rng);
        let mut rollback = Rollback::new();
        let mut success = true;

        for &entrance in entrances.iter() {
            slots.shuffle(rng);
            let mut accepted = None;

            for &slot in slots.as_slice() {
                transfer(&mut worlds[world_id.0], slot, entrance);

                // Anything cached may be wrong after the rewire.
                for state in states.iter_mut() {
                    state.clear_cache();
                }
                states = oracle.build_states(worlds, &complete_itempool);

                if can_connect(
                    worlds,
                    oracle,
                    &mut states,
                    &locations,
                    already_unreachable,
                    (world_id, entrance),
                ) {
                    accepted = Some(slot);
                    break;
                }

                transfer(&mut worlds[world_id.0], entrance, slot);
            }

            match accepted {
                Some(slot) => rollback.record(slots, slot, entrance),
                None => {
                    success = false;
                    break;
                }
            }
        }

        if success {
            rollback.commit(&mut worlds[world_id.0]);
            return Ok(());
        }

        debug!(
            "Entrance placement attempt {} failed after placing {} of {} entrances [World {}]",
            attempt + 1,
            rollback.len(),
            entrances.len(),
            world_id
        );
        rollback.undo(&mut worlds[world_id.0], slots);
    }

    Err(ShuffleError::new(world_id, ShuffleErrorKind::RetriesExhausted))
}

/// Connect soft entrances to the remaining slots in random order, unchecked.
pub fn shuffle_entrances_fast<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    entrances: &[EntranceId],
    slots: &mut TargetSlots,
) {
    debug_assert_eq!(entrances.len(), slots.len());
    slots.shuffle(rng);
    let mut rollback = Rollback::new();
    for &entrance in entrances {
        let Some(&slot) = slots.as_slice().last() else {
            break;
        };
        rollback.place(world, slots, slot, entrance);
    }
    rollback.commit(world);
}
