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
//! Application configuration loaded from environment variables.
//!
//! All settings have defaults so the server can start with zero
//! configuration for local development; the two API keys default to empty
//! strings and their backends will reject calls until they are set.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address for the HTTP server.
    /// Env: `HTTP_ADDR`, default `127.0.0.1:3000`.
    pub http_addr: SocketAddr,

    /// Path of the SQLite account store.
    /// Env: `DATABASE_PATH`, default `./safar.db`.
    pub database_path: PathBuf,

    /// Groq API key. Env: `GROQ_API_KEY`.
    pub groq_api_key: String,

    /// Base URL of the OpenAI-compatible completion endpoint.
    /// Env: `GROQ_API_URL`, default `https://api.groq.com/openai/v1`.
    pub groq_api_url: String,

    /// Model identifier. Env: `GROQ_MODEL`,
    /// default `llama-3.3-70b-versatile`.
    pub groq_model: String,

    /// Sampling temperature. Env: `GROQ_TEMPERATURE`, default `0.7`.
    pub groq_temperature: f32,

    /// weatherapi.com API key. Env: `WEATHER_API_KEY`.
    pub weather_api_key: String,

    /// Base URL of the weather service.
    /// Env: `WEATHER_API_URL`, default `http://api.weatherapi.com/v1`.
    pub weather_api_url: String,

    /// Path of the append-only interaction log.
    /// Env: `INTERACTION_LOG`, default `system_interaction.log`.
    pub interaction_log_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: ([127, 0, 0, 1], 3000).into(),
            database_path: PathBuf::from("./safar.db"),
            groq_api_key: String::new(),
            groq_api_url: "https://api.groq.com/openai/v1".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
            groq_temperature: 0.7,
            weather_api_key: String::new(),
            weather_api_url: "http://api.weatherapi.com/v1".to_string(),
            interaction_log_path: PathBuf::from("system_interaction.log"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            config.groq_api_key = key;
        }

        if let Ok(url) = std::env::var("GROQ_API_URL") {
            config.groq_api_url = url;
        }

        if let Ok(model) = std::env::var("GROQ_MODEL") {
            config.groq_model = model;
        }

        if let Ok(val) = std::env::var("GROQ_TEMPERATURE") {
            if let Ok(t) = val.parse::<f32>() {
                config.groq_temperature = t;
            } else {
                tracing::warn!(value = %val, "Invalid GROQ_TEMPERATURE, using default");
            }
        }

        if let Ok(key) = std::env::var("WEATHER_API_KEY") {
            config.weather_api_key = key;
        }

        if let Ok(url) = std::env::var("WEATHER_API_URL") {
            config.weather_api_url = url;
        }

        if let Ok(path) = std::env::var("INTERACTION_LOG") {
            config.interaction_log_path = PathBuf::from(path);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so it is not stored here.

        config
    }
}
