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
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Returned when the response parses but lacks the expected field.
pub const WEATHER_UNAVAILABLE: &str = "Weather data unavailable.";
/// Returned when the request fails or the response cannot be parsed.
pub const WEATHER_FETCH_ERROR: &str = "Error fetching weather.";

/// Seam over the weather lookup. Implementations never fail; transport and
/// parse problems degrade to one of the two fixed fallback strings.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> String;
}

/// Client for the weatherapi.com `current.json` endpoint. The city is sent
/// as plain text, not geocoded.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch(&self, city: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(format!("{}/current.json", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await?
            .json::<Value>()
            .await
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current(&self, city: &str) -> String {
        match self.fetch(city).await {
            Ok(data) => summarize_current(city, &data),
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "weather lookup failed");
                WEATHER_FETCH_ERROR.to_string()
            }
        }
    }
}

/// Render a one-line summary from a parsed `current.json` body, or the
/// unavailable fallback when the `current` field is missing or malformed.
fn summarize_current(city: &str, data: &Value) -> String {
    let current = &data["current"];
    match (current["condition"]["text"].as_str(), current["temp_c"].as_f64()) {
        (Some(desc), Some(temp)) => format!("Current weather in {city}: {desc}, {temp}°C"),
        _ => WEATHER_UNAVAILABLE.to_string(),
    }
}
