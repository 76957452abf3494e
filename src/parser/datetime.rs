//! Resolution of calendar date/time tokens into absolute instants.
//!
//! Tokens are tried in a fixed order:
//! - `...Z` suffixed values are UTC, regardless of any zone parameter
//! - exactly eight digits (`YYYYMMDD`) is a date-only value at floating midnight
//! - anything else is parsed as an ISO-8601-like date-time
//!
//! Values without an explicit offset are localized into the supplied zone
//! identifier, or assumed to be UTC when there is none or it is unknown.

use crate::error::{date_parse_error, FeedResult};
use crate::utils::time::parse_timezone;
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

/// Date-time layouts accepted for values without an offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts that carry a numeric offset
const OFFSET_FORMATS: &[&str] = &["%Y%m%dT%H%M%S%z", "%Y-%m-%d %H:%M:%S%z"];

/// A resolved token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDateTime {
    /// The absolute instant, carrying the offset it was resolved in
    pub instant: DateTime<FixedOffset>,
    /// True when the token was a bare `YYYYMMDD` date
    pub date_only: bool,
}

/// Returns true for tokens of exactly eight ASCII digits
pub fn is_date_only(token: &str) -> bool {
    token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a raw token, with an optional `TZID`-style zone name, into an instant
pub fn resolve(token: &str, tzid: Option<&str>) -> FeedResult<ResolvedDateTime> {
    let token = token.trim();
    if token.is_empty() {
        return Err(date_parse_error(token, "empty value"));
    }

    if let Some(stripped) = token.strip_suffix('Z') {
        let instant = parse_utc(token, stripped)?;
        return Ok(ResolvedDateTime {
            instant,
            date_only: false,
        });
    }

    if is_date_only(token) {
        let date = NaiveDate::parse_from_str(token, "%Y%m%d")
            .map_err(|e| date_parse_error(token, &e.to_string()))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| date_parse_error(token, "invalid midnight"))?;
        return Ok(ResolvedDateTime {
            instant: localize(&midnight, tzid),
            date_only: true,
        });
    }

    Ok(ResolvedDateTime {
        instant: parse_general(token, tzid)?,
        date_only: false,
    })
}

/// Attach a zone to a floating date-time.
///
/// Unknown zones and local times skipped by a DST transition degrade to UTC.
/// Times repeated by a DST transition resolve to the earlier instant.
pub fn localize(naive: &NaiveDateTime, tzid: Option<&str>) -> DateTime<FixedOffset> {
    let utc = || Utc.from_utc_datetime(naive).fixed_offset();

    let Some(name) = tzid else {
        return utc();
    };

    match parse_timezone(name) {
        Ok(zone) => match zone.from_local_datetime(naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
            LocalResult::None => {
                debug!(zone = %name, time = %naive, "Local time does not exist, assuming UTC");
                utc()
            }
        },
        Err(e) => {
            debug!(error = %e, "Falling back to UTC");
            utc()
        }
    }
}

fn parse_utc(token: &str, stripped: &str) -> FeedResult<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Ok(dt.with_timezone(&Utc).fixed_offset());
    }

    parse_naive(stripped)
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
        .ok_or_else(|| date_parse_error(token, "not a recognised UTC date-time"))
}

fn parse_general(token: &str, tzid: Option<&str>) -> FeedResult<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Ok(dt);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(token, format) {
            return Ok(dt);
        }
    }

    parse_naive(token)
        .map(|naive| localize(&naive, tzid))
        .ok_or_else(|| date_parse_error(token, "not a recognised date-time"))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
