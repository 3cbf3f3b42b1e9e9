use std::collections::HashMap;

use connection_scan::distribution::Distribution;
use connection_scan::network::{FootpathAdjacency, QueryParams, Timetable};
use connection_scan::utils::test_time;
use connection_scan::Connection;

/// A small fixed scenario: six connections across two lines, two symmetric footpaths, a traveller
/// going from stop 5 to stop 3 who must arrive by minute 20 of the epoch
/// (`connection_scan::utils::baseline_epoch`).
///
/// The two delay distributions are fixed tables rather than freshly sampled on every run, so tests
/// and benches stay reproducible.
pub fn baseline_scenario() -> (Timetable, QueryParams) {
    let connections = vec![
        Connection::new("||", "bus", 1, 3, test_time(15), test_time(18), 0),
        Connection::new("| ", "train", 1, 2, test_time(13), test_time(15), 1),
        Connection::new("||", "bus", 0, 1, test_time(10), test_time(15), 0),
        Connection::new("| ", "train", 4, 1, test_time(9), test_time(13), 1),
        Connection::new("||", "bus", 6, 0, test_time(8), test_time(10), 0),
        Connection::new("| ", "train", 5, 4, test_time(7), test_time(12), 1),
    ];

    let mut footpaths = FootpathAdjacency::new();
    footpaths.insert_symmetric(2, 3, 2.0);
    footpaths.insert_symmetric(5, 6, 2.0);

    let mut distributions = HashMap::new();
    distributions.insert(0, baseline_bus_distribution());
    distributions.insert(1, baseline_train_distribution());

    let timetable = Timetable::new(connections, footpaths, distributions);

    let mut params = QueryParams::new(5, 3, test_time(20));
    params.time_per_connection = 1.0;
    params.journeys_to_find = 5;
    params.min_chance_of_success = 0.5;
    params.journeys_per_stop = 2;

    (timetable, params)
}

/// Buses tend to run close to schedule: most of the mass sits on 0-2 minutes of delay.
fn baseline_bus_distribution() -> Distribution {
    let times: Vec<i64> = (0..20).collect();
    let mut probas = vec![0.0; 20];
    probas[0] = 0.55;
    probas[1] = 0.25;
    probas[2] = 0.10;
    probas[3] = 0.05;
    probas[5] = 0.03;
    probas[10] = 0.02;
    Distribution::new(&times, &probas, 0).expect("fixed table, lengths always agree")
}

/// Trains spread out a little further into the tail.
fn baseline_train_distribution() -> Distribution {
    let times: Vec<i64> = (0..20).collect();
    let mut probas = vec![0.0; 20];
    probas[0] = 0.35;
    probas[1] = 0.25;
    probas[2] = 0.15;
    probas[4] = 0.10;
    probas[6] = 0.08;
    probas[10] = 0.05;
    probas[15] = 0.02;
    Distribution::new(&times, &probas, 1).expect("fixed table, lengths always agree")
}

/// Builds a larger synthetic timetable for the `criterion` benches: `num_trips` trips of
/// `stops_per_trip` consecutive stops each, chained loosely through shared intermediate stops so
/// the sweep has real transfer opportunities, generated from `seed` for reproducible benchmark
/// runs.
pub fn synthetic_scenario(num_trips: u32, stops_per_trip: u32, seed: u64) -> (Timetable, QueryParams) {
    let rng = fastrand::Rng::with_seed(seed);
    let mut connections = Vec::new();
    let mut footpaths = FootpathAdjacency::new();
    let mut distributions = HashMap::new();
    distributions.insert(0, Distribution::certain(0));

    let total_stops = num_trips * stops_per_trip;
    let base = test_time(0);

    for trip in 0..num_trips {
        let trip_id = format!("synthetic-{trip}");
        let start_stop = trip * stops_per_trip;
        let mut dep = connection_scan::utils::plus_minutes(base, rng.i64(0..120));
        for hop in 0..(stops_per_trip.saturating_sub(1)) {
            let dep_stop = start_stop + hop;
            let arr_stop = start_stop + hop + 1;
            let travel = rng.i64(3..15);
            let arr = connection_scan::utils::plus_minutes(dep, travel);
            connections.push(Connection::new(trip_id.clone(), "bus", dep_stop, arr_stop, dep, arr, 0));
            dep = connection_scan::utils::plus_minutes(arr, rng.i64(1..5));
        }
        if trip > 0 {
            footpaths.insert_symmetric(start_stop, start_stop.saturating_sub(1), 2.0);
        }
    }

    connections.sort_by(|a, b| b.dep_time.cmp(&a.dep_time));

    let timetable = Timetable::new(connections, footpaths, distributions);
    let source = 0;
    let destination = total_stops.saturating_sub(1).max(1);
    let params = QueryParams::new(source, destination, connection_scan::utils::plus_minutes(base, 400));

    (timetable, params)
}
