pub mod app;
pub mod batch;
pub mod bridge;
pub mod config;
pub mod csv_codec;
pub mod errors;
pub mod gateway;
pub mod logger;
pub mod metrics;
pub mod model_metrics;
pub mod models;
pub mod progress;
pub mod render;
pub mod samples;
pub mod single;
