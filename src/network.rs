use std::collections::HashMap;

use crate::connection::{Connection, ConnectionIdx, Coord, StopId};
use crate::distribution::{Distribution, DistributionId};

/// Absolute wall-clock timestamp a connection departs or arrives at.
pub type Timestamp = chrono::NaiveDateTime;

/// Sparse footpath adjacency: `adjacency[i]` yields every `(j, walk_minutes)` reachable on foot
/// from stop `i`. Assembled by the caller; the core only reads it.
#[derive(Debug, Clone, Default)]
pub struct FootpathAdjacency {
    edges: HashMap<StopId, Vec<(StopId, f64)>>,
}

impl FootpathAdjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directed walking edge. `walk_minutes` is the raw (un-ceiled) float minutes; ceiling
    /// happens at the point of use.
    pub fn insert(&mut self, from: StopId, to: StopId, walk_minutes: f64) {
        debug_assert!(from != to, "footpaths must not be self-loops");
        self.edges.entry(from).or_default().push((to, walk_minutes));
    }

    /// Adds both directions of a symmetric footpath — a convenience for the common case of two
    /// stops within walking distance of each other.
    pub fn insert_symmetric(&mut self, a: StopId, b: StopId, walk_minutes: f64) {
        self.insert(a, b, walk_minutes);
        self.insert(b, a, walk_minutes);
    }

    pub fn neighbours(&self, from: StopId) -> &[(StopId, f64)] {
        self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The caller-assembled, per-query-immutable aggregate of connections, footpaths and
/// distributions that the sweep and reconstructor borrow for the duration of one query.
///
/// `Timetable` performs no ingestion or parsing of its own; it is the seam where the caller hands
/// already-assembled data to the core.
pub struct Timetable {
    /// Sorted descending by `dep_time`, pre-filtered so no connection arrives after the query's
    /// `target_arrival`. Required precondition of [`crate::sweep::sweep`].
    pub connections: Vec<Connection>,
    pub footpaths: FootpathAdjacency,
    pub distributions: HashMap<DistributionId, Distribution>,
}

impl Timetable {
    pub fn new(connections: Vec<Connection>, footpaths: FootpathAdjacency, distributions: HashMap<DistributionId, Distribution>) -> Self {
        debug_assert!(
            connections.windows(2).all(|w| w[0].dep_time >= w[1].dep_time),
            "connections must be sorted descending by departure time"
        );
        Self { connections, footpaths, distributions }
    }

    pub fn connection(&self, idx: ConnectionIdx) -> &Connection {
        &self.connections[idx as usize]
    }

    pub fn distribution(&self, id: DistributionId) -> Option<&Distribution> {
        self.distributions.get(&id)
    }

    pub fn stop_coord(&self, stop: StopId) -> Coord {
        for c in &self.connections {
            if c.dep_stop == stop {
                if let Some(coord) = c.dep_coord {
                    return coord;
                }
            }
            if c.arr_stop == stop {
                if let Some(coord) = c.arr_coord {
                    return coord;
                }
            }
        }
        Coord::default()
    }
}

/// The scalar configuration of one query, bundled into one record rather than threaded as a long,
/// error-prone parameter list.
#[derive(Debug, Clone, Copy)]
pub struct QueryParams {
    pub source: StopId,
    pub destination: StopId,
    pub target_arrival: Timestamp,
    /// Minutes of guaranteed transfer slack added at every boarding/walk, before ceiling.
    pub time_per_connection: f64,
    pub journeys_to_find: usize,
    pub min_chance_of_success: f64,
    pub journeys_per_stop: usize,
    pub min_times_to_find_source: usize,
    pub max_segments: usize,
}

impl QueryParams {
    pub const DEFAULT_MAX_SEGMENTS: usize = 8;

    pub fn new(source: StopId, destination: StopId, target_arrival: Timestamp) -> Self {
        Self {
            source,
            destination,
            target_arrival,
            time_per_connection: 0.0,
            journeys_to_find: usize::MAX,
            min_chance_of_success: 0.0,
            journeys_per_stop: 2,
            min_times_to_find_source: 1,
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_symmetric_insert_is_bidirectional() {
        let mut adj = FootpathAdjacency::new();
        adj.insert_symmetric(2, 3, 2.0);
        assert_eq!(adj.neighbours(2), &[(3, 2.0)]);
        assert_eq!(adj.neighbours(3), &[(2, 2.0)]);
    }

    #[test]
    fn query_params_defaults_match_spec() {
        let p = QueryParams::new(0, 1, crate::utils::test_time(20));
        assert_eq!(p.max_segments, 8);
        assert_eq!(p.journeys_per_stop, 2);
    }
}
