use thiserror::Error;
use time::{macros::format_description, Duration, Time};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("time is empty")]
    Empty,
    #[error("'{0}' is not in HH:MM form")]
    Shape(String),
    #[error("hour {0} is out of range (0-23)")]
    Hour(u8),
    #[error("minute {0} is out of range (0-59)")]
    Minute(u8),
}

/// Parses a wall-clock `H:MM` / `HH:MM` string into a time of day.
///
/// The hour takes one or two digits, the minute exactly two. Seconds are
/// never accepted; surrounding whitespace is the caller's problem.
pub fn parse_time_of_day(raw: &str) -> Result<Time, TimeParseError> {
    if raw.is_empty() {
        return Err(TimeParseError::Empty);
    }
    let shape = || TimeParseError::Shape(raw.to_owned());
    let (hour, minute) = raw.split_once(':').ok_or_else(shape)?;
    if hour.is_empty()
        || hour.len() > 2
        || minute.len() != 2
        || !hour.bytes().all(|b| b.is_ascii_digit())
        || !minute.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(shape());
    }
    let hour: u8 = hour.parse().map_err(|_| shape())?;
    let minute: u8 = minute.parse().map_err(|_| shape())?;
    if hour > 23 {
        return Err(TimeParseError::Hour(hour));
    }
    if minute > 59 {
        return Err(TimeParseError::Minute(minute));
    }
    Time::from_hms(hour, minute, 0).map_err(|_| shape())
}

pub fn format_time_of_day(time: Time) -> String {
    time.format(format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| format!("{:02}:{:02}", time.hour(), time.minute()))
}

/// Minutes since midnight, seconds dropped.
pub fn minute_of_day(time: Time) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Signed span from `start` to `end` in whole minutes. Negative when the
/// interval is inverted; no wrap past midnight is assumed.
pub fn minutes_between(start: Time, end: Time) -> i64 {
    minute_of_day(end) - minute_of_day(start)
}

/// Moves a time of day by `minutes`, wrapping around midnight.
pub fn shift_time_of_day(time: Time, minutes: i64) -> Time {
    time + Duration::minutes(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn parses_padded_and_unpadded_hours() {
        assert_eq!(parse_time_of_day("07:00"), Ok(time!(7:00)));
        assert_eq!(parse_time_of_day("7:05"), Ok(time!(7:05)));
        assert_eq!(parse_time_of_day("23:59"), Ok(time!(23:59)));
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(parse_time_of_day(""), Err(TimeParseError::Empty));
        assert!(matches!(parse_time_of_day("12"), Err(TimeParseError::Shape(_))));
        assert!(matches!(parse_time_of_day("12:5"), Err(TimeParseError::Shape(_))));
        assert!(matches!(parse_time_of_day("1a:00"), Err(TimeParseError::Shape(_))));
        assert!(matches!(parse_time_of_day(" 9:00"), Err(TimeParseError::Shape(_))));
        assert!(matches!(parse_time_of_day("12:00:00"), Err(TimeParseError::Shape(_))));
        assert_eq!(parse_time_of_day("24:00"), Err(TimeParseError::Hour(24)));
        assert_eq!(parse_time_of_day("10:60"), Err(TimeParseError::Minute(60)));
        assert!(matches!(parse_time_of_day("noon"), Err(TimeParseError::Shape(_))));
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_time_of_day(time!(7:05)), "07:05");
        assert_eq!(format_time_of_day(time!(0:00)), "00:00");
    }

    #[test]
    fn minutes_between_ignores_seconds_and_keeps_sign() {
        assert_eq!(minutes_between(time!(7:00), time!(8:30)), 90);
        assert_eq!(minutes_between(time!(7:00:59), time!(7:10)), 10);
        assert_eq!(minutes_between(time!(10:00), time!(9:00)), -60);
    }

    #[test]
    fn shifting_wraps_around_midnight() {
        assert_eq!(shift_time_of_day(time!(23:50), 15), time!(0:05));
        assert_eq!(shift_time_of_day(time!(0:10), -15), time!(23:55));
    }
}
