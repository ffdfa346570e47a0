//! Proximity and handover tracking
//!
//! Ranks towers by distance from a UE and decides whether a move is a plain
//! position update or a handover. The serving tower is sticky: it keeps
//! serving for as long as it stays among the three nearest towers, even when
//! another tower has become closer.

use ransim_common::{Coordinate, ServingSet, Tower, TowerDistance, UpdateType};

/// Number of towers tracked per UE (serving plus two candidates).
pub const TRACKED_TOWERS: usize = 3;

/// Upper bound of the channel quality indicator.
pub const MAX_CQI: u32 = 15;

/// Result of re-ranking towers after a move.
#[derive(Debug, Clone, PartialEq)]
pub struct Reassignment {
    /// New serving set
    pub cells: ServingSet,
    /// Position-only or tower-changed
    pub update_type: UpdateType,
}

/// Returns up to three towers nearest to `position`, nearest first.
///
/// Equal distances are ordered by tower name so the ranking does not depend on
/// the iteration order of `towers`.
pub fn closest_towers<'a, I>(position: &Coordinate, towers: I) -> Vec<TowerDistance>
where
    I: IntoIterator<Item = &'a Tower>,
{
    let mut ranked: Vec<TowerDistance> = towers
        .into_iter()
        .map(|t| TowerDistance::new(t.name.clone(), position.distance_to(&t.position)))
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TRACKED_TOWERS);
    ranked
}

/// Builds the serving set of a new UE: the nearest tower serves.
///
/// Returns `None` when there are no towers at all.
pub fn initial_serving_set(ranked: &[TowerDistance]) -> Option<ServingSet> {
    let mut iter = ranked.iter().cloned();
    let serving = iter.next()?;
    Some(ServingSet {
        serving,
        second: iter.next(),
        third: iter.next(),
    })
}

/// Re-assigns serving and candidate roles after a move.
///
/// If the previous serving tower is still among `ranked` it keeps serving and
/// the other entries become candidates in ranking order. Otherwise the
/// nearest tower takes over. The move is a handover when the serving tower or
/// either candidate differs from before.
pub fn reassign(previous: &ServingSet, ranked: &[TowerDistance]) -> Option<Reassignment> {
    let cells = match ranked.iter().position(|t| t.name == previous.serving.name) {
        Some(idx) => {
            let mut others = ranked
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, t)| t.clone());
            ServingSet {
                serving: ranked[idx].clone(),
                second: others.next(),
                third: others.next(),
            }
        }
        None => initial_serving_set(ranked)?,
    };

    let update_type = if cells.serving.name != previous.serving.name
        || cells.candidate_names() != previous.candidate_names()
    {
        UpdateType::Tower
    } else {
        UpdateType::Position
    };

    Some(Reassignment { cells, update_type })
}

/// Simplified channel quality: `min(15, floor(0.001 / distance²))`.
pub fn make_cqi(distance: f64) -> u32 {
    let raw = (0.001 / (distance * distance)).floor();
    // NaN and negative values cast to 0, infinity saturates
    (raw as u32).min(MAX_CQI)
}
