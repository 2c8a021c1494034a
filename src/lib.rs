pub mod acquisition;
pub mod analysis;
pub mod api;
pub mod app_state;
pub mod config;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod jobs;
pub mod telemetry;
