use crate::components::feed_fetcher::{BasicAuth, FeedFetcherHandle, FeedRequest};
use crate::config::{DEFAULT_HORIZON_DAYS, DEFAULT_LOOKBACK_DAYS};
use crate::error::FeedResult;
use crate::parser::FeedWindow;
use crate::pipeline::{run_pipeline, EventView, PipelineParams};
use crate::utils::time::{feed_window, parse_timezone};
use chrono::Utc;
use chrono_tz::Tz;
use tracing::info;

/// What a caller asks for in one request
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub url: String,
    pub auth: Option<BasicAuth>,
    pub lookback_days: i64,
    pub horizon_days: i64,
    pub limit: Option<usize>,
    pub include_ended: bool,
    /// Overrides the service zone when set
    pub timezone: Option<String>,
}

impl EventQuery {
    /// A query with the default window and no limit
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            horizon_days: DEFAULT_HORIZON_DAYS,
            limit: None,
            include_ended: false,
            timezone: None,
        }
    }
}

/// Sequences fetch, parse, normalize and filter for each request
#[derive(Clone)]
pub struct EventService {
    fetcher: FeedFetcherHandle,
    local_zone: Tz,
}

impl EventService {
    pub fn new(fetcher: FeedFetcherHandle, local_zone: Tz) -> Self {
        Self {
            fetcher,
            local_zone,
        }
    }

    /// The zone used when a query does not name one
    pub fn local_zone(&self) -> Tz {
        self.local_zone
    }

    /// Fetch a feed and return its upcoming events
    pub async fn get_events(&self, query: EventQuery) -> FeedResult<Vec<EventView>> {
        let local_zone = match query.timezone.as_deref() {
            Some(name) => parse_timezone(name)?,
            None => self.local_zone,
        };
        let request = FeedRequest::parse(&query.url, query.auth)?;

        let now = Utc::now();
        let (window_start, window_end) = feed_window(now, query.lookback_days, query.horizon_days);

        let raw_text = self.fetcher.fetch(request).await?;

        let params = PipelineParams {
            window: FeedWindow::new(window_start, window_end),
            local_zone,
            now,
            include_ended: query.include_ended,
            limit: query.limit,
        };
        let events = run_pipeline(&raw_text, &params)?;

        info!(count = events.len(), zone = %local_zone, "Prepared events");
        Ok(events)
    }

    /// Release the fetcher
    pub async fn shutdown(&self) -> FeedResult<()> {
        self.fetcher.shutdown().await
    }
}
