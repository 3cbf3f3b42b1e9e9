pub mod cancel;
pub mod connection;
pub mod distribution;
pub mod error;
pub mod journey;
pub mod network;
pub mod pointer;
pub mod reconstruct;
pub mod sweep;
pub mod utils;

pub use cancel::CancellationToken;
pub use connection::{Connection, ConnectionIdx, Coord, Footpath, Segment, StopId, TripId, TripSegment};
pub use distribution::{Distribution, DistributionId};
pub use error::{CoreError, CoreResult};
pub use journey::Journey;
pub use network::{FootpathAdjacency, QueryParams, Timetable};

/// Runs one point-to-point query end to end: sweeps `timetable` backwards from
/// `params.target_arrival` and reconstructs every journey from `params.source` to
/// `params.destination` that clears `params.min_chance_of_success`.
///
/// This is the single entry point a caller needs; `sweep`/`reconstruct` are exposed separately
/// for callers who want to reuse one sweep's frontier across several reconstruction passes.
pub fn query<'t>(timetable: &'t Timetable, params: &QueryParams, cancel: Option<&CancellationToken>) -> CoreResult<Vec<Journey<'t>>> {
    sweep::sweep(timetable, params, cancel)
}
