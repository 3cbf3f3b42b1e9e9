use crate::error::{CoreError, CoreResult};

/// Identifies a [`Distribution`] in the catalogue handed to the core by the caller.
pub type DistributionId = u32;

/// An immutable discrete delay distribution: `probas[i]` is the probability that the realized
/// delay equals `times[i]` minutes.
///
/// Constructed once by the caller and never mutated afterwards. Internally the points are sorted
/// by `times` ascending and a cumulative-sum table is precomputed, so [`Distribution::cdf`] is a
/// binary search rather than a linear scan.
#[derive(Debug, Clone)]
pub struct Distribution {
    id: DistributionId,
    times: Vec<i64>,
    cumulative: Vec<f64>,
}

impl Distribution {
    /// Builds a distribution from parallel `times`/`probas` lists.
    ///
    /// # Errors
    /// Returns [`CoreError::DistributionMismatch`] if the lists differ in length.
    pub fn new(times: &[i64], probas: &[f64], id: DistributionId) -> CoreResult<Self> {
        if times.len() != probas.len() {
            return Err(CoreError::DistributionMismatch {
                times_len: times.len(),
                probas_len: probas.len(),
            });
        }

        let mut points: Vec<(i64, f64)> = times.iter().copied().zip(probas.iter().copied()).collect();
        points.sort_unstable_by_key(|&(t, _)| t);

        let mut sorted_times = Vec::with_capacity(points.len());
        let mut cumulative = Vec::with_capacity(points.len());
        let mut running = 0.0;
        for (t, p) in points {
            running += p;
            sorted_times.push(t);
            cumulative.push(running);
        }

        Ok(Self { id, times: sorted_times, cumulative })
    }

    /// A distribution with a single point at zero delay, probability 1 — every connection always
    /// runs exactly on time. Useful as a test fixture and as a neutral default.
    pub fn certain(id: DistributionId) -> Self {
        // unwrap: times/probas always agree in length here.
        Self::new(&[0], &[1.0], id).unwrap()
    }

    pub fn id(&self) -> DistributionId {
        self.id
    }

    /// `max(times)`, or `None` if the distribution has no points.
    pub fn max_delay(&self) -> Option<i64> {
        self.times.last().copied()
    }

    /// The probability that the realized delay is `<= delay` minutes.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDelay`] if `delay < 0`.
    pub fn cdf(&self, delay: i64) -> CoreResult<f64> {
        if delay < 0 {
            return Err(CoreError::InvalidDelay { delay });
        }
        // Index of the first time strictly greater than `delay`; everything before it qualifies.
        let idx = self.times.partition_point(|&t| t <= delay);
        Ok(if idx == 0 { 0.0 } else { self.cumulative[idx - 1] })
    }
}
