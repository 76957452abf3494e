mod actor;
mod handle;
pub mod models;

pub use handle::FeedFetcherHandle;
pub use models::{BasicAuth, FeedRequest};
