use std::sync::Arc;

use crate::distribution::DistributionId;

/// A stop is opaque to the core: a dense non-negative integer index. Coordinates travel through
/// only as metadata attached to connections/journeys.
pub type StopId = u32;

/// Index into the caller-owned, descending-by-`dep_time`-sorted connection arena. Every pointer,
/// trip-segment and reconstruction-state value refers to a connection by this index rather than
/// by copy.
pub type ConnectionIdx = u32;

/// Interned trip identifier. Cloned onto every pointer and segment derived from one of the trip's
/// connections, so it is cheap to clone and to hash.
pub type TripId = Arc<str>;

/// Latitude/longitude pair. Carried through as opaque metadata; the core performs no geographic
/// computation of its own (geographic routing beyond pre-supplied footpaths is a non-goal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f32,
    pub lon: f32,
}

impl Default for Coord {
    fn default() -> Self {
        Coord { lat: 0.0, lon: 0.0 }
    }
}

/// One scheduled non-stop hop of a public-transit vehicle.
///
/// Invariant: `dep_time <= arr_time`. This is an input invariant (the connections table is
/// assembled by an out-of-scope ingestion collaborator); the core only asserts it in debug
/// builds rather than treating a violation as a query-time error.
#[derive(Debug, Clone)]
pub struct Connection {
    pub trip_id: TripId,
    pub mode: Arc<str>,
    pub dep_stop: StopId,
    pub arr_stop: StopId,
    pub dep_time: crate::network::Timestamp,
    pub arr_time: crate::network::Timestamp,
    pub distribution_id: DistributionId,
    pub dep_coord: Option<Coord>,
    pub arr_coord: Option<Coord>,
}

impl Connection {
    pub fn new(
        trip_id: impl Into<TripId>,
        mode: impl Into<Arc<str>>,
        dep_stop: StopId,
        arr_stop: StopId,
        dep_time: crate::network::Timestamp,
        arr_time: crate::network::Timestamp,
        distribution_id: DistributionId,
    ) -> Self {
        let c = Self {
            trip_id: trip_id.into(),
            mode: mode.into(),
            dep_stop,
            arr_stop,
            dep_time,
            arr_time,
            distribution_id,
            dep_coord: None,
            arr_coord: None,
        };
        debug_assert!(c.dep_time <= c.arr_time, "connection departs after it arrives");
        c
    }

    pub fn with_coords(mut self, dep_coord: Coord, arr_coord: Coord) -> Self {
        self.dep_coord = Some(dep_coord);
        self.arr_coord = Some(arr_coord);
        self
    }
}

/// A walking edge between two stops. `walk_minutes` is always the ceiling of the caller-supplied
/// float minutes (see [`crate::utils::ceil_minutes`]); no self-loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footpath {
    pub dep_stop: StopId,
    pub arr_stop: StopId,
    pub walk_minutes: u32,
}

impl Footpath {
    pub fn new(dep_stop: StopId, arr_stop: StopId, walk_minutes: u32) -> Self {
        debug_assert!(dep_stop != arr_stop, "footpaths must not be self-loops");
        Self { dep_stop, arr_stop, walk_minutes }
    }
}

/// A contiguous sub-sequence of one trip that the traveller rides: board at `enter`, alight at
/// `exit`. Both endpoints are arena indices into the same connections table.
#[derive(Debug, Clone, Copy)]
pub struct TripSegment {
    pub enter: ConnectionIdx,
    pub exit: ConnectionIdx,
    pub departure_time: crate::network::Timestamp,
    pub arrival_time: crate::network::Timestamp,
}

impl TripSegment {
    /// Builds a segment from the two boundary connections. `enter`/`exit` must belong to the same
    /// trip; this is an internal invariant maintained by the sweep/reconstructor, not re-checked
    /// here (checking it is the reconstructor's `MissingTripConnections`/ridden-trip bookkeeping).
    pub fn new(enter: ConnectionIdx, exit: ConnectionIdx, connections: &[Connection]) -> Self {
        let enter_conn = &connections[enter as usize];
        let exit_conn = &connections[exit as usize];
        debug_assert_eq!(enter_conn.trip_id, exit_conn.trip_id, "trip segment spans two trips");
        Self {
            enter,
            exit,
            departure_time: enter_conn.dep_time,
            arrival_time: exit_conn.arr_time,
        }
    }

    pub fn trip_id<'a>(&self, connections: &'a [Connection]) -> &'a TripId {
        &connections[self.enter as usize].trip_id
    }

    pub fn entry_stop(&self, connections: &[Connection]) -> StopId {
        connections[self.enter as usize].dep_stop
    }

    pub fn exit_stop(&self, connections: &[Connection]) -> StopId {
        connections[self.exit as usize].arr_stop
    }
}

/// Either kind of leg making up a [`crate::journey::Journey`].
#[derive(Debug, Clone, Copy)]
pub enum Segment {
    Footpath(Footpath),
    Trip(TripSegment),
}

impl Segment {
    pub fn is_footpath(&self) -> bool {
        matches!(self, Segment::Footpath(_))
    }
}
