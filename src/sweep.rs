use std::collections::HashMap;

use crate::cancel::CancellationToken;
use crate::connection::{ConnectionIdx, Footpath, StopId, TripId};
use crate::error::CoreResult;
use crate::journey::Journey;
use crate::network::{QueryParams, Timetable};
use crate::pointer::{JourneyPointer, PointerFrontier};
use crate::reconstruct;
use crate::utils;

/// Runs the reverse connection scan.
///
/// Sweeps `timetable.connections` — which must already be sorted descending by departure time,
/// `Timetable::new`'s debug-asserted precondition — building, per stop, the latest-deadline
/// pointer chain that reaches `params.destination` by `params.target_arrival`.
///
/// Whenever the source stop is reached at least `params.min_times_to_find_source` times, the
/// frontier built so far is handed to [`reconstruct::find_resulting_paths`]; the sweep returns
/// early the first time at least `params.journeys_to_find` journeys have been recovered. If
/// `cancel` is signalled partway through, the scan stops where it stands and reconstructs
/// whatever journeys the partial frontier already supports instead of failing the query.
pub fn sweep<'t>(timetable: &'t Timetable, params: &QueryParams, cancel: Option<&CancellationToken>) -> CoreResult<Vec<Journey<'t>>> {
    let mut frontier: HashMap<StopId, PointerFrontier> = HashMap::new();
    let mut trip_taken: HashMap<TripId, ConnectionIdx> = HashMap::new();
    let mut trip_connections: HashMap<TripId, Vec<ConnectionIdx>> = HashMap::new();
    let mut source_found = 0usize;

    frontier
        .entry(params.destination)
        .or_insert_with(PointerFrontier::new)
        .append(JourneyPointer::terminal(params.target_arrival, None));

    for &(stop, walk_minutes) in timetable.footpaths.neighbours(params.destination) {
        let walk_time = utils::ceil_minutes(walk_minutes);
        let path = Footpath::new(stop, params.destination, walk_time as u32);
        let deadline = utils::minus_minutes(params.target_arrival, walk_time);
        frontier.entry(stop).or_insert_with(PointerFrontier::new).append(JourneyPointer::terminal(deadline, Some(path)));
    }

    for (raw_idx, c) in timetable.connections.iter().enumerate() {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            log::info!("sweep cancelled after {raw_idx} connections, reconstructing from the partial frontier");
            break;
        }
        let idx = raw_idx as ConnectionIdx;

        // Schedule order (earliest connection first): later loop iterations visit earlier
        // connections since the sweep runs descending by departure time, so each newly-seen
        // connection is prepended here. The reconstructor's mid-trip alternative-exit scan relies
        // on seeing entry before exit, which only holds if this list is in schedule order.
        trip_connections.entry(c.trip_id.clone()).or_default().insert(0, idx);

        let trip_can_be_taken = trip_taken.get(&c.trip_id).copied();
        let arr_stop_admits = frontier.get(&c.arr_stop).and_then(PointerFrontier::head).is_some_and(|p| p.deadline >= c.arr_time);

        if trip_can_be_taken.is_none() && !arr_stop_admits {
            continue;
        }

        let exit_idx = *trip_taken.entry(c.trip_id.clone()).or_insert(idx);

        let dep_deadline = utils::minus_minutes(c.dep_time, utils::ceil_minutes(params.time_per_connection));
        frontier
            .entry(c.dep_stop)
            .or_insert_with(PointerFrontier::new)
            .append_capped(JourneyPointer::boarding(dep_deadline, idx, exit_idx, None), params.journeys_per_stop);

        if c.dep_stop == params.source {
            source_found += 1;
            if source_found >= params.min_times_to_find_source {
                let found = reconstruct::find_resulting_paths(timetable, params, &frontier, &trip_connections, cancel)?;
                if found.len() >= params.journeys_to_find {
                    return Ok(found);
                }
            }
        }

        for &(neighbour, walk_minutes) in timetable.footpaths.neighbours(c.dep_stop) {
            let walk_time = utils::ceil_minutes(walk_minutes + params.time_per_connection);
            let path = Footpath::new(neighbour, c.dep_stop, walk_time as u32);
            let deadline = utils::minus_minutes(c.dep_time, walk_time);

            frontier
                .entry(neighbour)
                .or_insert_with(PointerFrontier::new)
                .append_capped(JourneyPointer::boarding(deadline, idx, exit_idx, Some(path)), params.journeys_per_stop);

            if neighbour == params.source {
                source_found += 1;
                if source_found >= params.min_times_to_find_source {
                    let found = reconstruct::find_resulting_paths(timetable, params, &frontier, &trip_connections, cancel)?;
                    if found.len() >= params.journeys_to_find {
                        return Ok(found);
                    }
                }
            }
        }
    }

    let found = reconstruct::find_resulting_paths(timetable, params, &frontier, &trip_connections, cancel)?;
    log::info!(
        "sweep over {} connections touched {} stops, {} trips; reconstructed {} journeys.",
        timetable.connections.len(),
        frontier.len(),
        trip_connections.len(),
        found.len()
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::network::FootpathAdjacency;
    use crate::utils::test_time;

    /// Six connections across three trips, two symmetric footpaths, source 5, destination 3,
    /// target arrival at minute 20.
    fn baseline_timetable() -> Timetable {
        let connections = vec![
            Connection::new("t3", "bus", 4, 3, test_time(16), test_time(18), 0),
            Connection::new("t2", "bus", 6, 4, test_time(12), test_time(14), 0),
            Connection::new("t2", "bus", 1, 6, test_time(8), test_time(10), 0),
            Connection::new("t1", "bus", 5, 2, test_time(6), test_time(9), 0),
            Connection::new("t1", "bus", 0, 5, test_time(2), test_time(4), 0),
            Connection::new("t0", "bus", 5, 1, test_time(0), test_time(1), 0),
        ];
        let mut footpaths = FootpathAdjacency::new();
        footpaths.insert_symmetric(2, 3, 2.0);
        footpaths.insert_symmetric(5, 6, 2.0);
        Timetable::new(connections, footpaths, HashMap::new())
    }

    #[test]
    fn sweep_finds_a_journey_from_source_to_destination() {
        let tt = baseline_timetable();
        let mut params = QueryParams::new(5, 3, test_time(20));
        params.time_per_connection = 1.0;
        params.journeys_per_stop = 2;
        params.journeys_to_find = 5;
        params.min_times_to_find_source = 1;
        params.min_chance_of_success = 0.0;

        let journeys = sweep(&tt, &params, None).unwrap();
        assert!(!journeys.is_empty());
        assert!(journeys.iter().all(Journey::reached_destination));
    }

    #[test]
    fn cancelling_before_the_sweep_starts_yields_a_partial_result_not_an_error() {
        let tt = baseline_timetable();
        let params = QueryParams::new(5, 3, test_time(20));
        let token = CancellationToken::new();
        token.cancel();
        // The scan never gets to look at a single connection, so the frontier only holds the
        // destination's own initialisation pointers; the source is unreached.
        let journeys = sweep(&tt, &params, Some(&token)).unwrap();
        assert!(journeys.is_empty());
    }
}
