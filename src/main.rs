// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod account;
mod account_manager;
mod config;
mod flow;
mod http_server;
mod interaction_log;
mod llm_client;
mod planner;
mod prompts;
mod session;
mod trip_service;
mod validate;
mod weather_client;

use account::store::CredentialStore;
use account_manager::AccountManager;
use config::AppConfig;
use flow::FlowController;
use http_server::AppState;
use interaction_log::InteractionLogger;
use llm_client::GroqClient;
use trip_service::TripService;
use weather_client::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    tracing::info!(path = %config.database_path.display(), "opening credential store");
    let store = CredentialStore::open(&config.database_path)?;
    let accounts = AccountManager::new(store);

    let llm = Arc::new(GroqClient::new(
        config.groq_api_url.clone(),
        config.groq_api_key.clone(),
        config.groq_model.clone(),
        config.groq_temperature,
    ));
    let weather = Arc::new(WeatherClient::new(
        config.weather_api_url.clone(),
        config.weather_api_key.clone(),
    ));
    let logger = Arc::new(InteractionLogger::open(&config.interaction_log_path)?);

    let trips = TripService::new(llm, weather, logger);
    let flow = FlowController::new(accounts, trips);
    let state = AppState::new(Arc::new(flow));

    http_server::run_server(state, config.http_addr).await
}
