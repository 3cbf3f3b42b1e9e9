use std::cell::OnceCell;
use std::fmt::Display;

use crate::connection::{Coord, Segment, StopId, TripSegment};
use crate::error::{CoreError, CoreResult};
use crate::network::{Timestamp, Timetable};
use crate::utils::{self, get_time_str};

/// A user-visible itinerary: an ordered mix of footpaths and trip-segments from `source` to
/// `destination`.
///
/// `Journey` is a pure value with functional extension: [`Journey::extend`] borrows `self` and
/// returns a new, independent `Journey` with one more segment; the original is left untouched.
/// Derived fields that aren't needed on the hot reconstruction path ([`Journey::departure_time`],
/// [`Journey::changes`]) are memoised lazily on first access.
#[derive(Clone)]
pub struct Journey<'t> {
    timetable: &'t Timetable,
    segments: Vec<Segment>,
    source: StopId,
    destination: StopId,
    target_arrival: Timestamp,
    success_probability: f64,
    current_arrival_time_cache: OnceCell<Option<Timestamp>>,
    departure_time_cache: OnceCell<Option<Timestamp>>,
    changes_cache: OnceCell<Vec<(TripSegment, i64)>>,
}

impl<'t> Journey<'t> {
    /// The empty journey sitting at `source`, with a success probability of 1 (nothing can yet
    /// have gone wrong).
    pub fn empty(timetable: &'t Timetable, source: StopId, destination: StopId, target_arrival: Timestamp) -> Self {
        Self {
            timetable,
            segments: Vec::new(),
            source,
            destination,
            target_arrival,
            success_probability: 1.0,
            current_arrival_time_cache: OnceCell::new(),
            departure_time_cache: OnceCell::new(),
            changes_cache: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn source(&self) -> StopId {
        self.source
    }

    pub fn destination(&self) -> StopId {
        self.destination
    }

    pub fn target_arrival(&self) -> Timestamp {
        self.target_arrival
    }

    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }

    /// The stop this (possibly partial) journey currently ends at — `source` if no segments have
    /// been added yet.
    pub fn current_arrival_stop(&self) -> StopId {
        match self.segments.last() {
            None => self.source,
            Some(Segment::Footpath(f)) => f.arr_stop,
            Some(Segment::Trip(t)) => t.exit_stop(&self.timetable.connections),
        }
    }

    pub fn reached_destination(&self) -> bool {
        self.current_arrival_stop() == self.destination
    }

    pub fn src_coord(&self) -> Coord {
        self.timetable.stop_coord(self.source)
    }

    pub fn dst_coord(&self) -> Coord {
        self.timetable.stop_coord(self.destination)
    }

    /// The time at which the traveller arrives at [`Journey::current_arrival_stop`], or `None`
    /// if that time isn't yet pinned down (an empty journey, or one whose last segment is a
    /// footpath that doesn't reach the destination — the moment of the *next* boarding is what
    /// fixes it).
    pub fn current_arrival_time(&self) -> Option<Timestamp> {
        *self.current_arrival_time_cache.get_or_init(|| self.compute_current_arrival_time())
    }

    fn compute_current_arrival_time(&self) -> Option<Timestamp> {
        match self.segments.last() {
            None => None,
            Some(Segment::Trip(t)) => Some(t.arrival_time),
            Some(Segment::Footpath(fp)) => {
                if self.segments.len() == 1 {
                    if fp.arr_stop == self.destination {
                        Some(self.target_arrival)
                    } else {
                        None
                    }
                } else {
                    // Invariant (enforced by `extend`): a footpath is never preceded by another
                    // footpath, so the second-to-last segment here is always a trip.
                    match self.segments[self.segments.len() - 2] {
                        Segment::Trip(prev) => Some(utils::plus_minutes(prev.arrival_time, fp.walk_minutes as i64)),
                        Segment::Footpath(_) => unreachable!("two adjacent footpaths"),
                    }
                }
            }
        }
    }

    /// The time at which the traveller must leave `source`, or `None` if the journey is empty.
    pub fn departure_time(&self) -> Option<Timestamp> {
        *self.departure_time_cache.get_or_init(|| self.compute_departure_time())
    }

    fn compute_departure_time(&self) -> Option<Timestamp> {
        match self.segments.first() {
            None => None,
            Some(Segment::Trip(t)) => Some(t.departure_time),
            Some(Segment::Footpath(fp)) => {
                if self.segments.len() == 1 {
                    Some(utils::minus_minutes(self.target_arrival, fp.walk_minutes as i64))
                } else {
                    match self.segments[1] {
                        Segment::Trip(next) => Some(utils::minus_minutes(next.departure_time, fp.walk_minutes as i64)),
                        Segment::Footpath(_) => unreachable!("two adjacent footpaths"),
                    }
                }
            }
        }
    }

    /// Minutes between [`Journey::departure_time`] and [`Journey::current_arrival_time`], or
    /// `None` if either end is undetermined.
    pub fn duration_min(&self) -> Option<i64> {
        match (self.departure_time(), self.current_arrival_time()) {
            (Some(dep), Some(arr)) => Some(utils::whole_minutes(dep, arr)),
            _ => None,
        }
    }

    /// Total minutes spent walking across every footpath segment.
    pub fn walk_time_min(&self) -> u32 {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Footpath(f) => Some(f.walk_minutes),
                Segment::Trip(_) => None,
            })
            .sum()
    }

    /// Returns a new journey with `segment` appended; `self` is left untouched.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedJourney`] if `segment` is a footpath directly following
    /// another footpath, and propagates any [`CoreError::InvalidDelay`] raised while consulting a
    /// delay distribution for the incremental probability update.
    pub fn extend(&self, segment: Segment) -> CoreResult<Journey<'t>> {
        if segment.is_footpath() && self.segments.last().is_some_and(Segment::is_footpath) {
            return Err(CoreError::MalformedJourney);
        }

        let prior_arrival = self.current_arrival_time();
        let mut probability = self.success_probability;

        match segment {
            Segment::Footpath(fp) if fp.arr_stop == self.destination => {
                if let (Some(t), Some(Segment::Trip(prev_trip))) = (prior_arrival, self.segments.last()) {
                    let arrive_at = utils::plus_minutes(t, fp.walk_minutes as i64);
                    let max_delay = utils::whole_minutes(arrive_at, self.target_arrival);
                    probability *= self.distribution_cdf(prev_trip, max_delay)?;
                }
            }
            Segment::Footpath(_) => {}
            Segment::Trip(new_trip) => {
                if let Some(t) = prior_arrival {
                    let prev_trip = match self.segments.last() {
                        Some(Segment::Trip(pt)) => Some(*pt),
                        Some(Segment::Footpath(_)) => match self.segments.get(self.segments.len().wrapping_sub(2)) {
                            Some(Segment::Trip(pt)) => Some(*pt),
                            _ => None,
                        },
                        None => None,
                    };
                    if let Some(prev_trip) = prev_trip {
                        let max_delay = utils::whole_minutes(t, new_trip.departure_time);
                        probability *= self.distribution_cdf(&prev_trip, max_delay)?;
                    }
                }
            }
        }

        let mut segments = self.segments.clone();
        segments.push(segment);

        Ok(Journey {
            timetable: self.timetable,
            segments,
            source: self.source,
            destination: self.destination,
            target_arrival: self.target_arrival,
            success_probability: probability,
            current_arrival_time_cache: OnceCell::new(),
            departure_time_cache: OnceCell::new(),
            changes_cache: OnceCell::new(),
        })
    }

    fn distribution_cdf(&self, trip: &TripSegment, max_delay: i64) -> CoreResult<f64> {
        let dist_id = self.timetable.connection(trip.exit).distribution_id;
        match self.timetable.distribution(dist_id) {
            Some(dist) => dist.cdf(max_delay),
            // A distribution id with no catalogue entry is treated as a certain (no-delay) trip:
            // there is nothing more conservative the core can assume about an uncatalogued mode.
            None => {
                log::warn!("no distribution catalogued for id {dist_id}, treating connection as certain");
                Ok(1.0)
            }
        }
    }

    /// Every trip-segment in the journey paired with the maximum tolerable delay (in minutes)
    /// before the traveller misses their next connection (or the target arrival time).
    pub fn changes(&self) -> &[(TripSegment, i64)] {
        self.changes_cache.get_or_init(|| self.compute_changes())
    }

    fn compute_changes(&self) -> Vec<(TripSegment, i64)> {
        let mut changes = Vec::new();
        let last_idx = self.segments.len().saturating_sub(1);
        for (i, segment) in self.segments.iter().enumerate() {
            let Segment::Trip(trip) = segment else { continue };

            let max_delay = if i == last_idx {
                utils::whole_minutes(trip.arrival_time, self.target_arrival)
            } else if i == last_idx.wrapping_sub(1) && matches!(self.segments.last(), Some(Segment::Footpath(_))) {
                let Segment::Footpath(fp) = self.segments[last_idx] else { unreachable!() };
                let arrive_at = utils::plus_minutes(trip.arrival_time, fp.walk_minutes as i64);
                utils::whole_minutes(arrive_at, self.target_arrival)
            } else {
                let mut next_arrival = trip.arrival_time;
                let mut next_idx = i + 1;
                if let Segment::Footpath(fp) = self.segments[next_idx] {
                    next_arrival = utils::plus_minutes(next_arrival, fp.walk_minutes as i64);
                    next_idx += 1;
                }
                let Segment::Trip(next_trip) = self.segments[next_idx] else {
                    unreachable!("a footpath is always followed by a trip segment")
                };
                utils::whole_minutes(next_arrival, next_trip.departure_time)
            };

            changes.push((*trip, max_delay));
        }
        changes
    }
}

impl Display for Journey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-----------------------------------------------")?;
        if self.segments.is_empty() {
            writeln!(f, "No journey found.")?;
        } else {
            for segment in &self.segments {
                match segment {
                    Segment::Footpath(fp) => {
                        writeln!(f, "Walk from stop {} to stop {} ({} min).", fp.dep_stop, fp.arr_stop, fp.walk_minutes)?;
                    }
                    Segment::Trip(trip) => {
                        let enter = self.timetable.connection(trip.enter);
                        let exit = self.timetable.connection(trip.exit);
                        writeln!(
                            f,
                            "Board trip {} ({}) at stop {} at {}.",
                            enter.trip_id,
                            enter.mode,
                            enter.dep_stop,
                            get_time_str(trip.departure_time)
                        )?;
                        writeln!(f, "Alight at stop {} at {}.", exit.arr_stop, get_time_str(trip.arrival_time))?;
                    }
                }
            }
            if let Some(duration) = self.duration_min() {
                writeln!(f, "Total journey time: {duration} minutes.")?;
            }
            writeln!(f, "Success probability: {:.1}%.", self.success_probability * 100.0)?;
        }
        write!(f, "-----------------------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Connection, Footpath};
    use crate::distribution::Distribution;
    use crate::network::FootpathAdjacency;
    use crate::utils::test_time;
    use std::collections::HashMap;

    fn timetable_with(connections: Vec<Connection>, distributions: HashMap<u32, Distribution>) -> Timetable {
        Timetable::new(connections, FootpathAdjacency::new(), distributions)
    }

    #[test]
    fn empty_journey_has_no_arrival_or_departure() {
        let tt = timetable_with(vec![], HashMap::new());
        let j = Journey::empty(&tt, 0, 1, test_time(20));
        assert_eq!(j.current_arrival_time(), None);
        assert_eq!(j.departure_time(), None);
        assert_eq!(j.success_probability(), 1.0);
    }

    #[test]
    fn direct_footpath_to_destination_is_certain() {
        let tt = timetable_with(vec![], HashMap::new());
        let j = Journey::empty(&tt, 5, 3, test_time(20));
        let j2 = j.extend(Segment::Footpath(Footpath::new(5, 3, 4))).unwrap();
        assert!(j2.reached_destination());
        assert_eq!(j2.success_probability(), 1.0);
        assert_eq!(j2.current_arrival_time(), Some(test_time(20)));
        assert_eq!(j2.departure_time(), Some(test_time(16)));
    }

    #[test]
    fn two_adjacent_footpaths_is_malformed() {
        let tt = timetable_with(vec![], HashMap::new());
        let j = Journey::empty(&tt, 5, 3, test_time(20));
        let j2 = j.extend(Segment::Footpath(Footpath::new(5, 6, 2))).unwrap();
        let err = j2.extend(Segment::Footpath(Footpath::new(6, 3, 2))).unwrap_err();
        assert!(matches!(err, CoreError::MalformedJourney));
    }

    #[test]
    fn trip_then_footpath_updates_probability_via_cdf() {
        let conn = Connection::new("||", "bus", 6, 0, test_time(8), test_time(10), 0);
        let mut dists = HashMap::new();
        dists.insert(0, Distribution::new(&[0, 5], &[0.5, 0.5], 0).unwrap());
        let tt = timetable_with(vec![conn], dists);
        let j = Journey::empty(&tt, 6, 0, test_time(12));
        let j2 = j.extend(Segment::Trip(TripSegment::new(0, 0, &tt.connections))).unwrap();
        assert_eq!(j2.success_probability(), 1.0); // no prior trip, no deduction yet
        let j3 = j2.extend(Segment::Footpath(Footpath::new(0, 2, 1))).unwrap();
        // arrival at destination 2 isn't reached (2 != destination 0), so this is a pass-through
        // footpath and probability is untouched by this extension alone.
        assert_eq!(j3.success_probability(), 1.0);
    }

    #[test]
    fn changes_reports_slack_to_target_arrival() {
        let conn = Connection::new("||", "bus", 6, 0, test_time(8), test_time(10), 0);
        let tt = timetable_with(vec![conn], HashMap::new());
        let j = Journey::empty(&tt, 6, 0, test_time(20));
        let j2 = j.extend(Segment::Trip(TripSegment::new(0, 0, &tt.connections))).unwrap();
        let changes = j2.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].1, 10); // target(20) - arrival(10) = 10 minutes slack
    }
}
