pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod service;
pub mod shutdown;
pub mod startup;
pub mod utils;

pub use error::{Error, FeedResult};
pub use pipeline::{run_pipeline, EventView, PipelineParams};
pub use service::{EventQuery, EventService};
