use std::sync::Arc;

/// Fatal error conditions raised by the sweep or the reconstructor.
///
/// All of these indicate either malformed input or corrupted internal state; the core never
/// retries, it is up to the caller to decide whether to abort the query.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("CDF queried with a negative delay ({delay} min).")]
    InvalidDelay { delay: i64 },

    #[error("Distribution has {times_len} times but {probas_len} probabilities.")]
    DistributionMismatch { times_len: usize, probas_len: usize },

    #[error("Reconstructor encountered trip {trip_id:?} with no recorded connections (corrupt sweep state).")]
    MissingTripConnections { trip_id: Arc<str> },

    #[error("Journey has two adjacent footpaths.")]
    MalformedJourney,
}

pub type CoreResult<T> = Result<T, CoreError>;
