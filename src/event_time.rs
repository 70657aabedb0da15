use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Which bound of the event the composed instant represents. The two roles
/// have different fallback times when the form leaves the time field blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFieldError {
    #[error("invalid date `{0}`: expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time `{0}`: expected HH:MM")]
    InvalidTime(String),
    #[error("invalid instant `{0}`: expected an ISO-8601 timestamp")]
    InvalidInstant(String),
}

/// Date and time strings in the shape the edit form's fields hold them.
/// `time` is empty for all-day events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDateTime {
    pub date: String,
    pub time: String,
}

fn validate_date(s: &str) -> Result<(), TimeFieldError> {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) if d.format("%Y-%m-%d").to_string() == s => Ok(()),
        _ => Err(TimeFieldError::InvalidDate(s.to_string())),
    }
}

fn validate_time(s: &str) -> Result<(), TimeFieldError> {
    match NaiveTime::parse_from_str(s, "%H:%M") {
        Ok(t) if t.format("%H:%M").to_string() == s => Ok(()),
        _ => Err(TimeFieldError::InvalidTime(s.to_string())),
    }
}

/// Composes one ISO-8601 UTC instant from the form's separate date and time
/// fields.
///
/// The fields are taken verbatim and suffixed with a literal `Z` — no
/// local-to-UTC conversion. The system this replaces stored instants that
/// way, and converting now would shift every existing event.
pub fn normalize_instant(
    date: &str,
    time: Option<&str>,
    all_day: bool,
    role: Role,
) -> Result<String, TimeFieldError> {
    validate_date(date)?;

    if all_day {
        return Ok(match role {
            Role::Start => format!("{date}T00:00:00.000Z"),
            Role::End => format!("{date}T23:59:59.999Z"),
        });
    }

    let time = match time {
        Some(t) => {
            validate_time(t)?;
            t
        }
        None => match role {
            Role::Start => "00:00",
            Role::End => "23:59",
        },
    };
    Ok(format!("{date}T{time}:00.000Z"))
}

/// Last calendar date on which a recurring event's instances are generated,
/// widened to the end of that day. Blank input means the recurrence has no
/// end.
pub fn normalize_recurrence_end(
    end_recurring: Option<&str>,
) -> Result<Option<String>, TimeFieldError> {
    let Some(raw) = end_recurring else {
        return Ok(None);
    };
    let date = raw.trim();
    if date.is_empty() {
        return Ok(None);
    }
    validate_date(date)?;
    Ok(Some(format!("{date}T23:59:59.999Z")))
}

/// Seeds the edit form's date/time fields from a previously stored instant,
/// or from `now` in create mode. The stored instant's UTC face value is what
/// the form shows, mirroring how `normalize_instant` labeled it on the way
/// in.
pub fn derive_default_date_time(
    existing: Option<&str>,
    all_day: bool,
    now: NaiveDateTime,
) -> Result<FormDateTime, TimeFieldError> {
    let Some(instant) = existing else {
        return Ok(FormDateTime {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
        });
    };

    let parsed = DateTime::parse_from_rfc3339(instant)
        .map_err(|_| TimeFieldError::InvalidInstant(instant.to_string()))?
        .with_timezone(&Utc);
    Ok(FormDateTime {
        date: parsed.format("%Y-%m-%d").to_string(),
        time: if all_day {
            String::new()
        } else {
            parsed.format("%H:%M").to_string()
        },
    })
}
