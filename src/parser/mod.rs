pub mod datetime;
pub mod fallback;
pub mod primary;

pub use fallback::FallbackSource;
pub use primary::PrimarySource;

use crate::error::{Error, FeedResult};
use crate::pipeline::models::{RawEventRecord, SourceTag};
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, warn};

/// The instant range occurrences are requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FeedWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether a `[start, end]` span touches the window
    pub fn overlaps(&self, start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> bool {
        end.with_timezone(&Utc) >= self.start && start.with_timezone(&Utc) <= self.end
    }
}

/// Something that can turn raw calendar text into event records
pub trait EventSource {
    /// Tag stamped on every record this source produces
    fn tag(&self) -> SourceTag;

    /// Extract the events of `raw_text` relevant to `window`
    fn extract(&self, raw_text: &str, window: &FeedWindow) -> FeedResult<Vec<RawEventRecord>>;
}

/// Extract events with the structured parser, falling back to block scanning
pub fn extract_events(raw_text: &str, window: &FeedWindow) -> FeedResult<Vec<RawEventRecord>> {
    extract_with(&PrimarySource, &FallbackSource, raw_text, window)
}

/// Run `primary`, and `fallback` on the same text if `primary` fails.
///
/// Fails only when the fallback also comes back empty.
pub fn extract_with(
    primary: &dyn EventSource,
    fallback: &dyn EventSource,
    raw_text: &str,
    window: &FeedWindow,
) -> FeedResult<Vec<RawEventRecord>> {
    match primary.extract(raw_text, window) {
        Ok(events) => {
            debug!(count = events.len(), source = %primary.tag(), "Extracted events");
            Ok(events)
        }
        Err(e) => {
            warn!(error = %e, "Primary parser failed, scanning event blocks instead");

            let events = fallback.extract(raw_text, window)?;
            if events.is_empty() {
                return Err(Error::NoUsableEvents);
            }

            debug!(count = events.len(), source = %fallback.tag(), "Extracted events");
            Ok(events)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;

    struct FailingSource;

    impl EventSource for FailingSource {
        fn tag(&self) -> SourceTag {
            SourceTag::Primary
        }

        fn extract(&self, _raw_text: &str, _window: &FeedWindow) -> FeedResult<Vec<RawEventRecord>> {
            Err(Error::PrimaryParse("unexpected end of input".to_string()))
        }
    }

    struct EmptySource;

    impl EventSource for EmptySource {
        fn tag(&self) -> SourceTag {
            SourceTag::Primary
        }

        fn extract(&self, _raw_text: &str, _window: &FeedWindow) -> FeedResult<Vec<RawEventRecord>> {
            Ok(Vec::new())
        }
    }

    fn window() -> FeedWindow {
        FeedWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    const BROKEN_FEED: &str = "BEGIN:VEVENT\nDTSTART:20240601T100000Z\nSUMMARY:Kept\nEND:VEVENT\n";

    #[test]
    fn test_primary_failure_triggers_fallback() {
        let events = extract_with(&FailingSource, &FallbackSource, BROKEN_FEED, &window()).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, SourceTag::Fallback);
        assert_eq!(events[0].summary.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let events = extract_with(&EmptySource, &FallbackSource, BROKEN_FEED, &window()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_both_parsers_empty_is_an_error() {
        let result = extract_with(&FailingSource, &FallbackSource, "<html>503</html>", &window());
        assert!(matches!(result, Err(Error::NoUsableEvents)));
    }

    #[test]
    fn test_window_overlap() {
        let window = window();
        let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().fixed_offset();

        assert!(window.overlaps(&at(2024, 6, 1), &at(2024, 6, 2)));
        // Spans that straddle either edge still count
        assert!(window.overlaps(&at(2023, 12, 31), &at(2024, 1, 2)));
        assert!(window.overlaps(&at(2024, 12, 31), &at(2025, 1, 2)));
        assert!(!window.overlaps(&at(2023, 6, 1), &at(2023, 6, 2)));
        assert!(!window.overlaps(&at(2025, 6, 1), &at(2025, 6, 2)));
    }
}
