use std::collections::HashMap;

use arrayvec::ArrayVec;

use crate::cancel::CancellationToken;
use crate::connection::{ConnectionIdx, Segment, StopId, TripId, TripSegment};
use crate::error::{CoreError, CoreResult};
use crate::journey::Journey;
use crate::network::{QueryParams, Timetable};
use crate::pointer::PointerFrontier;
use crate::utils;

/// Upper bound on distinct trips recorded as "already ridden" while following one reconstruction
/// branch. Matches `QueryParams::DEFAULT_MAX_SEGMENTS`, since a journey can never ride more trips
/// than it has segments.
const MAX_RIDDEN_TRIPS: usize = 8;

type RiddenTrips = ArrayVec<TripId, MAX_RIDDEN_TRIPS>;

/// One unit of pending work: a partial journey and the trip-ids it has already ridden.
struct Frame<'t> {
    journey: Journey<'t>,
    ridden_trips: RiddenTrips,
}

/// Walks the pointer frontier built by [`crate::sweep::sweep`] from `params.source`, producing
/// every complete journey to `params.destination` that clears `params.min_chance_of_success`,
/// sorted by [`journey_order`].
///
/// The search is depth-first and bounded by `max_segments`, but the branching factor at each node
/// is not (a stop's frontier can hold several pointers, and a trip segment can itself branch into
/// several alternative-exit candidates), so it is driven by an explicit stack of [`Frame`]s rather
/// than native recursion. If `cancel` fires partway through, the walk stops expanding further
/// frames and returns whatever complete journeys it had already collected.
pub fn find_resulting_paths<'t>(
    timetable: &'t Timetable,
    params: &QueryParams,
    frontier: &HashMap<StopId, PointerFrontier>,
    trip_connections: &HashMap<TripId, Vec<ConnectionIdx>>,
    cancel: Option<&CancellationToken>,
) -> CoreResult<Vec<Journey<'t>>> {
    let start = Journey::empty(timetable, params.source, params.destination, params.target_arrival);
    let mut found = Vec::new();
    let mut stack = vec![Frame { journey: start, ridden_trips: RiddenTrips::new() }];

    while let Some(Frame { journey: journey_so_far, ridden_trips: previous_trips_taken }) = stack.pop() {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            log::info!("reconstruction cancelled with {} branch(es) left to expand", stack.len());
            break;
        }

        if journey_so_far.success_probability() < params.min_chance_of_success {
            log::trace!(
                "pruned branch at stop {}: success probability {:.4} below threshold {:.4}",
                journey_so_far.current_arrival_stop(),
                journey_so_far.success_probability(),
                params.min_chance_of_success
            );
            continue;
        }
        if journey_so_far.len() > params.max_segments {
            log::trace!("pruned branch at stop {}: exceeded max_segments", journey_so_far.current_arrival_stop());
            continue;
        }
        if journey_so_far.reached_destination() {
            found.push(journey_so_far);
            continue;
        }

        let starting_stop = journey_so_far.current_arrival_stop();
        let arrival_time_at_starting_stop = journey_so_far.current_arrival_time();

        let Some(possible_paths) = frontier.get(&starting_stop) else { continue };

        for p in possible_paths.iter() {
            let time_admissible = match arrival_time_at_starting_stop {
                None => true,
                Some(t) => t <= p.deadline,
            };
            let trip_admissible = match p.enter {
                None => true,
                Some(enter) => !previous_trips_taken.contains(&timetable.connection(enter).trip_id),
            };
            if !time_admissible || !trip_admissible {
                continue;
            }

            let mut new_journey = journey_so_far.clone();
            let mut walked_to_end = false;

            if let Some(footpath) = p.footpath {
                new_journey = new_journey.extend(Segment::Footpath(footpath))?;
                if footpath.arr_stop == params.destination {
                    found.push(new_journey.clone());
                    walked_to_end = true;
                }
            }

            if walked_to_end || p.enter.is_none() {
                continue;
            }

            let enter = p.enter.unwrap();
            let exit = p.exit.unwrap();
            let trip_id = timetable.connection(enter).trip_id.clone();

            let mut updated_trips_taken = previous_trips_taken.clone();
            let _ = updated_trips_taken.try_push(trip_id.clone());

            let Some(connections) = trip_connections.get(&trip_id) else {
                return Err(CoreError::MissingTripConnections { trip_id });
            };

            let mut found_entry_connection = false;
            let mut found_exit_connection = false;
            for &c_idx in connections {
                if c_idx == exit {
                    found_exit_connection = true;
                }

                if found_entry_connection && !found_exit_connection {
                    let c = timetable.connection(c_idx);
                    if let Some(alt_pointers) = frontier.get(&c.arr_stop) {
                        if alt_pointers.len() > 1 {
                            for alt_p in alt_pointers.iter() {
                                let alt_on_another_line = match alt_p.enter {
                                    None => true,
                                    Some(e) => timetable.connection(e).trip_id != c.trip_id,
                                };

                                let alt_starts_with_walk = alt_p.footpath.is_some();
                                let mut time_to_alt_stop = utils::ceil_minutes(params.time_per_connection);
                                if let Some(fp) = alt_p.footpath {
                                    time_to_alt_stop += fp.walk_minutes as i64;
                                }

                                let alt_can_be_taken = match alt_p.enter {
                                    None => true,
                                    Some(alt_enter) => timetable.connection(alt_enter).dep_time >= utils::plus_minutes(c.arr_time, time_to_alt_stop),
                                };

                                if alt_on_another_line && alt_can_be_taken {
                                    let alt_trip_segment = TripSegment::new(enter, c_idx, &timetable.connections);
                                    let mut alt_journey = new_journey.extend(Segment::Trip(alt_trip_segment))?;
                                    if alt_starts_with_walk {
                                        alt_journey = alt_journey.extend(Segment::Footpath(alt_p.footpath.unwrap()))?;
                                    }

                                    let mut alt_previous_trips = updated_trips_taken.clone();
                                    if let Some(alt_enter) = alt_p.enter {
                                        let alt_exit = alt_p.exit.unwrap();
                                        let alt_train_segment = TripSegment::new(alt_enter, alt_exit, &timetable.connections);
                                        alt_journey = alt_journey.extend(Segment::Trip(alt_train_segment))?;
                                        let _ = alt_previous_trips.try_push(timetable.connection(alt_enter).trip_id.clone());
                                    }

                                    stack.push(Frame { journey: alt_journey, ridden_trips: alt_previous_trips });
                                }
                            }
                        }
                    }
                }

                if c_idx == enter {
                    found_entry_connection = true;
                }
            }

            let trip_segment = TripSegment::new(enter, exit, &timetable.connections);
            let continued_journey = new_journey.extend(Segment::Trip(trip_segment))?;
            stack.push(Frame { journey: continued_journey, ridden_trips: updated_trips_taken });
        }
    }

    found.sort_by(journey_order);
    Ok(found)
}

/// Sorts journeys by latest departure time first, then by fewest segments.
fn journey_order(a: &Journey, b: &Journey) -> std::cmp::Ordering {
    b.departure_time().cmp(&a.departure_time()).then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::network::FootpathAdjacency;
    use crate::pointer::JourneyPointer;
    use crate::utils::test_time;

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
    fn terminal_pointer_reaches_destination_directly() {
        let tt = baseline_timetable();
        let params = QueryParams::new(2, 3, test_time(20));
        let mut frontier = HashMap::new();
        frontier.entry(3u32).or_insert_with(PointerFrontier::new).append(JourneyPointer::terminal(test_time(20), None));
        frontier
            .entry(2u32)
            .or_insert_with(PointerFrontier::new)
            .append(JourneyPointer::terminal(test_time(18), Some(crate::connection::Footpath::new(2, 3, 2))));

        let journeys = find_resulting_paths(&tt, &params, &frontier, &HashMap::new(), None).unwrap();
        assert_eq!(journeys.len(), 1);
        assert!(journeys[0].reached_destination());
    }

    #[test]
    fn unreachable_source_yields_no_journeys() {
        let tt = baseline_timetable();
        let params = QueryParams::new(99, 3, test_time(20));
        let journeys = find_resulting_paths(&tt, &params, &HashMap::new(), &HashMap::new(), None).unwrap();
        assert!(journeys.is_empty());
    }

    #[test]
    fn cancelling_before_the_walk_starts_yields_a_partial_result_not_an_error() {
        let tt = baseline_timetable();
        let params = QueryParams::new(2, 3, test_time(20));
        let mut frontier = HashMap::new();
        frontier
            .entry(2u32)
            .or_insert_with(PointerFrontier::new)
            .append(JourneyPointer::terminal(test_time(18), Some(crate::connection::Footpath::new(2, 3, 2))));

        let token = crate::cancel::CancellationToken::new();
        token.cancel();
        let journeys = find_resulting_paths(&tt, &params, &frontier, &HashMap::new(), Some(&token)).unwrap();
        assert!(journeys.is_empty());
    }
}
