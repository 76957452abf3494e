use crate::error::{zone_error, FeedResult};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Look up an IANA zone name such as `Europe/Helsinki`
pub fn parse_timezone(name: &str) -> FeedResult<Tz> {
    name.trim().parse::<Tz>().map_err(|_| zone_error(name))
}

/// Compute the `[now - lookback, now + horizon]` window requested from the parser
pub fn feed_window(
    now: DateTime<Utc>,
    lookback_days: i64,
    horizon_days: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .checked_sub_signed(Duration::days(lookback_days))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = now
        .checked_add_signed(Duration::days(horizon_days))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Render a local instant as ISO-8601 text, omitting zero fractional seconds
pub fn to_iso<Z: TimeZone>(dt: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Midnight at the start of the local day following `dt`
pub fn next_local_midnight(dt: &DateTime<Tz>) -> DateTime<Tz> {
    let zone = dt.timezone();
    dt.date_naive()
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| zone.from_local_datetime(&midnight).earliest())
        // Midnight skipped by a DST transition: a plain day is the closest span
        .unwrap_or_else(|| *dt + Duration::days(1))
}
