use crate::api::{self, AppState};
use crate::components::FeedFetcherHandle;
use crate::config::Config;
use crate::error::Error;
use crate::service::EventService;
use crate::shutdown;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => {
            info!(
                "Loaded configuration: timezone={}, fetch timeout={}s",
                config.timezone, config.fetch_timeout_secs
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the service and serve the API until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let local_zone = config.local_zone()?;

    // One pooled client for the whole process
    let fetcher = FeedFetcherHandle::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let service = EventService::new(fetcher, local_zone);

    let state = AppState {
        service: service.clone(),
        default_lookback_days: config.default_lookback_days,
        default_horizon_days: config.default_horizon_days,
    };
    let app = api::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(Error::from)?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    shutdown::release(&service).await;
    Ok(())
}
