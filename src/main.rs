mod app;
mod auth;
mod config;
mod db;
mod error;
mod links;
mod meetings;
#[cfg(test)]
mod memory;
mod registrations;
mod state;
mod telemetry;
mod validation;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    telemetry::init_tracing();

    let config = AppConfig::from_env()?;
    let state = AppState::init(config).await?;
    let config = state.config.clone();

    app::serve(app::build_app(state), &config).await
}
