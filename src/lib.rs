pub mod aggregate;
pub mod app;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod sources;
pub mod state;
pub mod ui;
pub mod window;

#[cfg(test)]
mod test_support;

pub use app::router;
pub use client::RemoteDataClient;
pub use config::AppConfig;
pub use state::AppState;
