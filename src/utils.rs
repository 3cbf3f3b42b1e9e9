use chrono::{Duration, NaiveDateTime};

/// Ceils a float number of minutes to an integer. Walk times are always rounded up, never down.
pub fn ceil_minutes(minutes: f64) -> i64 {
    minutes.ceil() as i64
}

/// Whole minutes between `from` and `to` (`to - from`).
pub fn whole_minutes(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(60)
}

/// `t - minutes`, used throughout the sweep for pointer deadlines.
pub fn minus_minutes(t: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    t - Duration::minutes(minutes)
}

pub fn plus_minutes(t: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    t + Duration::minutes(minutes)
}

/// `HH:MM:SS` rendering of a timestamp's time-of-day.
pub fn get_time_str(t: NaiveDateTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// The fixed epoch used throughout this crate's unit tests and fixtures: `2021-05-28T12:00`.
pub fn baseline_epoch() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2021, 5, 28).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

/// `baseline_epoch() + minutes`, a terse way to build timestamps in tests and fixtures.
pub fn test_time(minutes: i64) -> NaiveDateTime {
    plus_minutes(baseline_epoch(), minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_minutes_rounds_up() {
        assert_eq!(ceil_minutes(2.0), 2);
        assert_eq!(ceil_minutes(2.1), 3);
        assert_eq!(ceil_minutes(0.0), 0);
    }

    #[test]
    fn whole_minutes_matches_duration() {
        let a = test_time(0);
        let b = test_time(5);
        assert_eq!(whole_minutes(a, b), 5);
    }
}
