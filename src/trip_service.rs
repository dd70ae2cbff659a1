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

use crate::interaction_log::InteractionLogger;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::planner::PlannerState;
use crate::prompts::{fun_fact_prompt, itinerary_prompt};
use crate::weather_client::WeatherProvider;
use std::sync::Arc;

/// Aggregated result of one itinerary request.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub itinerary: String,
    pub weather: String,
    pub fun_fact: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("city and interests are both required")]
    MissingInput,
    #[error("itinerary service failed: {0}")]
    Completion(#[from] LlmError),
}

/// Orchestrates one itinerary request: two completion calls (day plan and
/// fun fact), one weather lookup, and a single combined interaction-log
/// entry. The weather provider degrades internally and never fails; a
/// completion failure is caught here and surfaced as a recoverable
/// [`TripError`], and no log entry is written for the failed request.
pub struct TripService {
    llm: Arc<dyn CompletionBackend>,
    weather: Arc<dyn WeatherProvider>,
    logger: Arc<InteractionLogger>,
}

impl TripService {
    pub fn new(
        llm: Arc<dyn CompletionBackend>,
        weather: Arc<dyn WeatherProvider>,
        logger: Arc<InteractionLogger>,
    ) -> Self {
        Self { llm, weather, logger }
    }

    pub async fn plan_trip(&self, city: &str, interests_raw: &str) -> Result<TripPlan, TripError> {
        let state = PlannerState::new()
            .with_city(city)
            .with_interests(interests_raw);
        if !state.is_ready() {
            return Err(TripError::MissingInput);
        }

        // The three external calls are independent and issued sequentially,
        // sharing only the city value.
        let itinerary = self
            .llm
            .complete(&itinerary_prompt(&state.city, &state.interests))
            .await?;
        let weather = self.weather.current(city).await;
        let fact = self.llm.complete(&fun_fact_prompt(city)).await?;
        let fun_fact = format!("Fun Fact: {fact}");

        let state = state.with_itinerary(&itinerary);
        tracing::info!(city = %city, messages = state.messages.len(), "itinerary generated");

        self.logger.log(
            &format!("City: {city}, Interests: {interests_raw}"),
            &format!("Itinerary: {itinerary} | Weather: {weather} | Fun Fact: {fun_fact}"),
        );

        Ok(TripPlan { itinerary: state.itinerary, weather, fun_fact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::Prompt;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubLlm {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubLlm {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }
    }

    #[async_trait]
    impl CompletionBackend for StubLlm {
        async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::EmptyResponse);
            }
            Ok(format!("generated for: {}", prompt.human))
        }
    }

    struct StubWeather {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn current(&self, city: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("Current weather in {city}: Sunny, 21°C")
        }
    }

    fn service_with(
        llm: Arc<StubLlm>,
        weather: Arc<StubWeather>,
    ) -> (TripService, std::path::PathBuf, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.log");
        let logger = Arc::new(InteractionLogger::open(&path).unwrap());
        (TripService::new(llm, weather, logger), path, dir)
    }

    #[tokio::test]
    async fn test_plan_trip_invokes_two_completions_and_one_weather_lookup() {
        let llm = Arc::new(StubLlm::ok());
        let weather = Arc::new(StubWeather { calls: AtomicUsize::new(0) });
        let (service, log_path, _dir) = service_with(llm.clone(), weather.clone());

        let plan = service.plan_trip("Paris", "Food, Art").await.unwrap();

        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
        assert!(plan.itinerary.contains("Plan my perfect trip"));
        assert_eq!(plan.weather, "Current weather in Paris: Sunny, 21°C");
        assert!(plan.fun_fact.starts_with("Fun Fact: "));

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("City: Paris, Interests: Food, Art"));
    }

    struct UnreachableWeather;

    #[async_trait]
    impl WeatherProvider for UnreachableWeather {
        async fn current(&self, _city: &str) -> String {
            crate::weather_client::WEATHER_FETCH_ERROR.to_string()
        }
    }

    #[tokio::test]
    async fn test_degraded_weather_does_not_abort_the_plan() {
        let llm = Arc::new(StubLlm::ok());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.log");
        let logger = Arc::new(InteractionLogger::open(&path).unwrap());
        let service = TripService::new(llm, Arc::new(UnreachableWeather), logger);

        let plan = service.plan_trip("Paris", "Food").await.unwrap();
        assert_eq!(plan.weather, crate::weather_client::WEATHER_FETCH_ERROR);
        assert!(plan.itinerary.contains("Plan my perfect trip"));
        assert!(plan.fun_fact.starts_with("Fun Fact: "));

        let log = std::fs::read_to_string(&path).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("Weather: Error fetching weather."));
    }

    #[tokio::test]
    async fn test_missing_city_or_interests_rejected_before_any_call() {
        let llm = Arc::new(StubLlm::ok());
        let weather = Arc::new(StubWeather { calls: AtomicUsize::new(0) });
        let (service, _log_path, _dir) = service_with(llm.clone(), weather.clone());

        let err = service.plan_trip("", "Food").await.unwrap_err();
        assert!(matches!(err, TripError::MissingInput));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_completion_failure_is_caught_and_not_logged() {
        let llm = Arc::new(StubLlm::failing());
        let weather = Arc::new(StubWeather { calls: AtomicUsize::new(0) });
        let (service, log_path, _dir) = service_with(llm, weather);

        let err = service.plan_trip("Paris", "Food").await.unwrap_err();
        assert!(matches!(err, TripError::Completion(_)));

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.is_empty());
    }
}
