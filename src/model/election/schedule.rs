use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stored date format, as submitted by the admin frontend.
const DATE_FORMAT: &str = "%Y-%m-%d";
/// Stored time format, as submitted by the admin frontend.
const TIME_FORMAT: &str = "%H:%M";

/// Minimum gap between an election's start and end, enforced at creation.
pub const MIN_DURATION_SECONDS: i64 = 5 * 60;

/// Where an election currently sits in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// The voting window has not opened yet.
    Upcoming,
    /// The voting window is open.
    Ongoing,
    /// The voting window has closed.
    Completed,
}

/// An election's voting window, stored exactly as the admin submitted it:
/// separate date and time strings. Parsing therefore happens on read, and a
/// corrupt schedule is an explicit error rather than silently "not ongoing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

impl Schedule {
    /// The instant the voting window opens.
    pub fn start_at(&self) -> Result<DateTime<Utc>, InvalidSchedule> {
        parse_datetime(&self.start_date, &self.start_time)
    }

    /// The instant the voting window closes.
    pub fn end_at(&self) -> Result<DateTime<Utc>, InvalidSchedule> {
        parse_datetime(&self.end_date, &self.end_time)
    }

    /// Classify `now` against this window.
    ///
    /// The window is half-open: the start instant is already `Ongoing`,
    /// the end instant is already `Completed`. The three phases partition
    /// time with no gaps.
    pub fn phase(&self, now: DateTime<Utc>) -> Result<ElectionPhase, InvalidSchedule> {
        let start = self.start_at()?;
        let end = self.end_at()?;
        Ok(if now < start {
            ElectionPhase::Upcoming
        } else if now < end {
            ElectionPhase::Ongoing
        } else {
            ElectionPhase::Completed
        })
    }

    /// Validate this schedule for election creation: both endpoints must
    /// parse and the end must be at least [`MIN_DURATION_SECONDS`] after
    /// the start. Not re-validated after creation.
    pub fn validate(&self) -> Result<(), InvalidSchedule> {
        let start = self.start_at()?;
        let end = self.end_at()?;
        if (end - start).num_seconds() < MIN_DURATION_SECONDS {
            return Err(InvalidSchedule::TooShort {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(())
    }
}

fn parse_datetime(date: &str, time: &str) -> Result<DateTime<Utc>, InvalidSchedule> {
    let date_part =
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| InvalidSchedule::BadDate {
            value: date.to_string(),
        })?;
    let time_part =
        NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| InvalidSchedule::BadTime {
            value: time.to_string(),
        })?;
    Ok(Utc.from_utc_datetime(&date_part.and_time(time_part)))
}

/// A schedule that cannot be classified. Fatal to the request that touched
/// the broken election only; other elections are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSchedule {
    #[error("Unparseable election date {value:?}")]
    BadDate { value: String },
    #[error("Unparseable election time {value:?}")]
    BadTime { value: String },
    #[error("Election window from {start} to {end} is shorter than the minimum duration")]
    TooShort { start: String, end: String },
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn window() -> Schedule {
        Schedule {
            start_date: "2026-03-01".to_string(),
            start_time: "09:00".to_string(),
            end_date: "2026-03-01".to_string(),
            end_time: "17:00".to_string(),
        }
    }

    #[test]
    fn phases_partition_time() {
        let schedule = window();
        let start = schedule.start_at().unwrap();
        let end = schedule.end_at().unwrap();

        // Sweep across the window; every instant gets exactly one phase.
        let mut now = start - Duration::hours(2);
        let mut seen = vec![];
        while now < end + Duration::hours(2) {
            seen.push(schedule.phase(now).unwrap());
            now = now + Duration::minutes(30);
        }
        assert!(seen.starts_with(&[ElectionPhase::Upcoming]));
        assert!(seen.contains(&ElectionPhase::Ongoing));
        assert!(seen.ends_with(&[ElectionPhase::Completed]));
        // Phases never go backwards.
        let mut sorted = seen.clone();
        sorted.sort_by_key(|p| *p as u8);
        assert_eq!(seen, sorted);
    }

    #[test]
    fn window_is_half_open() {
        let schedule = window();
        let start = schedule.start_at().unwrap();
        let end = schedule.end_at().unwrap();

        assert_eq!(
            schedule.phase(start - Duration::seconds(1)).unwrap(),
            ElectionPhase::Upcoming
        );
        // The start instant itself is ongoing.
        assert_eq!(schedule.phase(start).unwrap(), ElectionPhase::Ongoing);
        assert_eq!(
            schedule.phase(end - Duration::seconds(1)).unwrap(),
            ElectionPhase::Ongoing
        );
        // The end instant itself is completed.
        assert_eq!(schedule.phase(end).unwrap(), ElectionPhase::Completed);
    }

    #[test]
    fn corrupt_schedule_is_an_error_not_a_phase() {
        let mut schedule = window();
        schedule.end_date = "not-a-date".to_string();
        let err = schedule.phase(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            InvalidSchedule::BadDate {
                value: "not-a-date".to_string()
            }
        );

        let mut schedule = window();
        schedule.start_time = "25:99".to_string();
        assert!(matches!(
            schedule.phase(Utc::now()),
            Err(InvalidSchedule::BadTime { .. })
        ));
    }

    #[test]
    fn validate_enforces_minimum_duration() {
        let mut schedule = window();
        assert!(schedule.validate().is_ok());

        schedule.end_time = "09:04".to_string();
        assert!(matches!(
            schedule.validate(),
            Err(InvalidSchedule::TooShort { .. })
        ));

        // Exactly five minutes is allowed.
        schedule.end_time = "09:05".to_string();
        assert!(schedule.validate().is_ok());

        // End before start is also too short.
        schedule.end_date = "2026-02-28".to_string();
        assert!(matches!(
            schedule.validate(),
            Err(InvalidSchedule::TooShort { .. })
        ));
    }
}
