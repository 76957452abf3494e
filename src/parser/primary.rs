//! Structured parsing of well-formed feeds with the `icalendar` crate.

use super::datetime::{localize, resolve};
use super::{EventSource, FeedWindow};
use crate::error::{Error, FeedResult};
use crate::pipeline::models::{RawEventRecord, SourceTag};
use chrono::{DateTime, FixedOffset, NaiveTime};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use tracing::debug;

/// Structured parser event source
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimarySource;

impl EventSource for PrimarySource {
    fn tag(&self) -> SourceTag {
        SourceTag::Primary
    }

    fn extract(&self, raw_text: &str, window: &FeedWindow) -> FeedResult<Vec<RawEventRecord>> {
        let calendar = raw_text
            .parse::<Calendar>()
            .map_err(|e| Error::PrimaryParse(e.to_string()))?;

        let events: Vec<&Event> = calendar
            .iter()
            .filter_map(|component| match component {
                CalendarComponent::Event(event) => Some(event),
                _ => None,
            })
            .collect();

        // A feed with event blocks we could not see is not a successful parse
        if events.is_empty() && raw_text.to_ascii_uppercase().contains("BEGIN:VEVENT") {
            return Err(Error::PrimaryParse(
                "feed contains VEVENT blocks but none were recognised".to_string(),
            ));
        }

        Ok(events
            .into_iter()
            .filter_map(convert_event)
            .filter(|record| window.overlaps(&record.start, &record.end))
            .collect())
    }
}

fn convert_event(event: &Event) -> Option<RawEventRecord> {
    let Some((start, all_day)) = date_time_property(event, "DTSTART", event.get_start(), None)
    else {
        debug!(uid = ?event.get_uid(), "Skipping event without a readable DTSTART");
        return None;
    };

    let start_tzid = tzid_param(event, "DTSTART");
    let end = date_time_property(event, "DTEND", event.get_end(), start_tzid).map(|(end, _)| end);

    let owned = |value: Option<&str>| value.map(str::to_string);
    let timestamp = |name: &str| {
        event
            .property_value(name)
            .and_then(|value| resolve(value, None).ok())
            .map(|resolved| resolved.instant)
    };

    let mut record = RawEventRecord::new(start, end, SourceTag::Primary);
    record.all_day = all_day;
    record.summary = owned(event.get_summary());
    record.uid = owned(event.get_uid());
    record.description = owned(event.get_description());
    record.location = owned(event.get_location());
    record.status = owned(event.property_value("STATUS"));
    record.url = owned(event.property_value("URL"));
    record.recurrence_id = owned(event.property_value("RECURRENCE-ID"));
    record.created = timestamp("CREATED");
    record.last_modified = timestamp("LAST-MODIFIED");

    Some(record)
}

/// Read a date-time property, re-resolving values the structured parser left unread.
///
/// `icalendar` only accepts a bare `YYYYMMDD` when `VALUE=DATE` is given and
/// rejects ISO-style values, so those go through the resolver instead.
fn date_time_property(
    event: &Event,
    name: &str,
    parsed: Option<DatePerhapsTime>,
    inherited_tzid: Option<&str>,
) -> Option<(DateTime<FixedOffset>, bool)> {
    if let Some(value) = parsed {
        return Some(convert_date_time(value));
    }

    let property = event.properties().get(name)?;
    let tzid = tzid_param(event, name).or(inherited_tzid);
    match resolve(property.value(), tzid) {
        Ok(resolved) => Some((resolved.instant, resolved.date_only)),
        Err(e) => {
            debug!(error = %e, property = name, "Ignoring unreadable date-time");
            None
        }
    }
}

fn tzid_param<'a>(event: &'a Event, name: &str) -> Option<&'a str> {
    event
        .properties()
        .get(name)
        .and_then(|property| property.params().get("TZID"))
        .map(|param| param.value().trim_matches('"'))
}

/// Convert to an absolute instant, reporting whether the value was date-only
fn convert_date_time(value: DatePerhapsTime) -> (DateTime<FixedOffset>, bool) {
    match value {
        DatePerhapsTime::Date(date) => (localize(&date.and_time(NaiveTime::MIN), None), true),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => (dt.fixed_offset(), false),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            (localize(&naive, None), false)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            (localize(&date_time, Some(&tzid)), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> FeedWindow {
        FeedWindow::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
        )
    }

    fn sample_ics() -> &'static str {
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//Test//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:review-1@example.com\r\n\
         DTSTART:20240605T100000Z\r\n\
         DTEND:20240605T110000Z\r\n\
         SUMMARY:Design Review\r\n\
         DESCRIPTION:Quarterly review\r\n\
         LOCATION:Conference Room A\r\n\
         STATUS:CONFIRMED\r\n\
         URL:https://example.com/review\r\n\
         END:VEVENT\r\n\
         BEGIN:VEVENT\r\n\
         UID:holiday-1@example.com\r\n\
         DTSTART;VALUE=DATE:20240610\r\n\
         DTEND;VALUE=DATE:20240611\r\n\
         SUMMARY:Company Holiday\r\n\
         END:VEVENT\r\n\
         BEGIN:VEVENT\r\n\
         UID:zoned-1@example.com\r\n\
         DTSTART;TZID=Europe/Helsinki:20240612T090000\r\n\
         SUMMARY:Zoned\r\n\
         END:VEVENT\r\n\
         BEGIN:VEVENT\r\n\
         UID:old-1@example.com\r\n\
         DTSTART:20230105T100000Z\r\n\
         DTEND:20230105T110000Z\r\n\
         SUMMARY:Long Gone\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    }

    #[test]
    fn test_parse_well_formed_feed() {
        let events = PrimarySource.extract(sample_ics(), &window()).unwrap();
        assert_eq!(events.len(), 3);

        let review = events
            .iter()
            .find(|e| e.uid.as_deref() == Some("review-1@example.com"))
            .unwrap();
        assert_eq!(review.summary.as_deref(), Some("Design Review"));
        assert_eq!(review.description.as_deref(), Some("Quarterly review"));
        assert_eq!(review.location.as_deref(), Some("Conference Room A"));
        assert_eq!(review.status.as_deref(), Some("CONFIRMED"));
        assert_eq!(review.url.as_deref(), Some("https://example.com/review"));
        assert_eq!(review.start, Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap());
        assert_eq!(review.end, Utc.with_ymd_and_hms(2024, 6, 5, 11, 0, 0).unwrap());
        assert!(!review.all_day);
        assert_eq!(review.source, SourceTag::Primary);
    }

    #[test]
    fn test_all_day_and_zoned_events() {
        let events = PrimarySource.extract(sample_ics(), &window()).unwrap();

        let holiday = events
            .iter()
            .find(|e| e.uid.as_deref() == Some("holiday-1@example.com"))
            .unwrap();
        assert!(holiday.all_day);
        assert_eq!(holiday.start, Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
        assert_eq!(holiday.end, Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap());

        let zoned = events
            .iter()
            .find(|e| e.uid.as_deref() == Some("zoned-1@example.com"))
            .unwrap();
        assert_eq!(zoned.start, Utc.with_ymd_and_hms(2024, 6, 12, 6, 0, 0).unwrap());
        // No DTEND: the end collapses onto the start
        assert_eq!(zoned.end, zoned.start);
    }

    #[test]
    fn test_events_outside_window_are_dropped() {
        let events = PrimarySource.extract(sample_ics(), &window()).unwrap();
        assert!(events.iter().all(|e| e.summary.as_deref() != Some("Long Gone")));
    }

    #[test]
    fn test_values_the_structured_parser_leaves_unread() {
        let feed = "BEGIN:VCALENDAR\r\n\
                    VERSION:2.0\r\n\
                    PRODID:-//Test//Test//EN\r\n\
                    BEGIN:VEVENT\r\n\
                    UID:bare-date\r\n\
                    DTSTART:20240601\r\n\
                    END:VEVENT\r\n\
                    BEGIN:VEVENT\r\n\
                    UID:zoned-date\r\n\
                    DTSTART;TZID=Europe/Helsinki:20240601\r\n\
                    END:VEVENT\r\n\
                    BEGIN:VEVENT\r\n\
                    UID:extended\r\n\
                    DTSTART:2024-06-03T09:00:00Z\r\n\
                    DTEND:2024-06-03T10:30:00Z\r\n\
                    END:VEVENT\r\n\
                    END:VCALENDAR\r\n";
        let events = PrimarySource.extract(feed, &window()).unwrap();
        assert_eq!(events.len(), 3);

        let find = |uid: &str| events.iter().find(|e| e.uid.as_deref() == Some(uid)).unwrap();

        let bare = find("bare-date");
        assert!(bare.all_day);
        assert_eq!(bare.start, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(bare.end, bare.start);

        let zoned = find("zoned-date");
        assert!(zoned.all_day);
        assert_eq!(zoned.start, Utc.with_ymd_and_hms(2024, 5, 31, 21, 0, 0).unwrap());

        let extended = find("extended");
        assert!(!extended.all_day);
        assert_eq!(extended.start, Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap());
        assert_eq!(extended.end, Utc.with_ymd_and_hms(2024, 6, 3, 10, 30, 0).unwrap());
    }
}
