// Long-lived components owned by the process
pub mod feed_fetcher;

// Re-export the fetcher handle
pub use feed_fetcher::FeedFetcherHandle;
