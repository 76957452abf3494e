use super::actor::FeedFetcherActorHandle;
use super::models::FeedRequest;
use crate::error::FeedResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle for interacting with the feed fetcher actor
#[derive(Clone)]
pub struct FeedFetcherHandle {
    actor_handle: FeedFetcherActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl FeedFetcherHandle {
    /// Create a new FeedFetcherHandle and spawn the actor
    pub fn new(timeout: Duration) -> FeedResult<Self> {
        use super::actor::FeedFetcherActor;

        // Create the actor and get its handle
        let (mut actor, handle) = FeedFetcherActor::new(timeout)?;

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Download a feed
    pub async fn fetch(&self, request: FeedRequest) -> FeedResult<String> {
        self.actor_handle.fetch(request).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> FeedResult<()> {
        self.actor_handle.shutdown().await
    }
}
