use super::models::FeedRequest;
use crate::error::{fetch_error, FeedResult};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The feed fetcher actor, owner of the pooled HTTP client
pub struct FeedFetcherActor {
    client: Client,
    command_rx: mpsc::Receiver<FeedFetcherCommand>,
}

/// Commands that can be sent to the feed fetcher actor
pub enum FeedFetcherCommand {
    Fetch(FeedRequest, mpsc::Sender<FeedResult<String>>),
    Shutdown,
}

/// Handle for communicating with the feed fetcher actor
#[derive(Clone)]
pub struct FeedFetcherActorHandle {
    command_tx: mpsc::Sender<FeedFetcherCommand>,
}

impl FeedFetcherActorHandle {
    /// Download a feed and return its body as text
    pub async fn fetch(&self, request: FeedRequest) -> FeedResult<String> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedFetcherCommand::Fetch(request, response_tx))
            .await
            .map_err(|e| fetch_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| fetch_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> FeedResult<()> {
        let _ = self.command_tx.send(FeedFetcherCommand::Shutdown).await;
        Ok(())
    }
}

impl FeedFetcherActor {
    /// Create a new actor and return its handle
    pub fn new(timeout: Duration) -> FeedResult<(Self, FeedFetcherActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ics-feed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let actor = Self { client, command_rx };
        let handle = FeedFetcherActorHandle { command_tx };

        Ok((actor, handle))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Feed fetcher actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                FeedFetcherCommand::Fetch(request, response_tx) => {
                    // Each download runs on its own task; the client is shared
                    let client = self.client.clone();
                    tokio::spawn(async move {
                        let result = Self::fetch_feed(client, request).await;
                        let _ = response_tx.send(result).await;
                    });
                }
                FeedFetcherCommand::Shutdown => {
                    info!("Feed fetcher actor shutting down");
                    break;
                }
            }
        }

        info!("Feed fetcher actor shut down");
    }

    /// Perform the GET and decode the body, replacing invalid UTF-8
    pub async fn fetch_feed(client: Client, request: FeedRequest) -> FeedResult<String> {
        let host = request.url.host_str().unwrap_or("unknown").to_string();
        debug!(host = %host, authenticated = request.auth.is_some(), "Fetching feed");

        let mut builder = client.get(request.url);
        if let Some(auth) = &request.auth {
            builder = builder.basic_auth(&auth.username, auth.password.as_deref());
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(fetch_error(&format!(
                "HTTP {} from {}",
                response.status(),
                host
            )));
        }

        let body = response.bytes().await?;
        debug!(host = %host, bytes = body.len(), "Fetched feed");

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
