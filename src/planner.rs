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

/// One entry in the planner's message log.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Text originating from the user (city and interest inputs).
    User(String),
    /// Text originating from the system (the generated itinerary).
    System(String),
}

/// Transient value describing one itinerary request in progress.
///
/// Constructed fresh for every generate action and discarded afterwards.
/// Built by sequential transformation functions; the message log preserves
/// the order in which fields were recorded (city first, interests second).
#[derive(Debug, Clone, Default)]
pub struct PlannerState {
    pub messages: Vec<Message>,
    pub city: String,
    pub interests: Vec<String>,
    pub itinerary: String,
}

impl PlannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the target city.
    pub fn with_city(mut self, city: &str) -> Self {
        self.city = city.to_string();
        self.messages.push(Message::User(format!("City: {city}")));
        self
    }

    /// Record the interest list, split from a raw comma-separated string
    /// with whitespace trimmed from each piece, order preserved.
    pub fn with_interests(mut self, raw: &str) -> Self {
        self.interests = split_interests(raw);
        self.messages.push(Message::User(format!(
            "Interests: {}",
            self.interests.join(", ")
        )));
        self
    }

    /// Record the generated itinerary text.
    pub fn with_itinerary(mut self, text: &str) -> Self {
        self.itinerary = text.to_string();
        self.messages.push(Message::System(text.to_string()));
        self
    }

    /// City and interests must both be set before generation is attempted.
    /// A raw interest string of only commas and whitespace does not count.
    pub fn is_ready(&self) -> bool {
        !self.city.is_empty() && self.interests.iter().any(|i| !i.is_empty())
    }
}

pub fn split_interests(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_interests_trims_and_preserves_order() {
        assert_eq!(
            split_interests("Food, Culture,  Adventure"),
            vec!["Food", "Culture", "Adventure"]
        );
    }

    #[test]
    fn test_message_log_orders_city_before_interests() {
        let state = PlannerState::new()
            .with_city("Paris")
            .with_interests("Food, Art");

        assert_eq!(state.city, "Paris");
        assert_eq!(state.interests, vec!["Food", "Art"]);
        assert_eq!(
            state.messages,
            vec![
                Message::User("City: Paris".to_string()),
                Message::User("Interests: Food, Art".to_string()),
            ]
        );
    }

    #[test]
    fn test_readiness_requires_city_and_interests() {
        assert!(!PlannerState::new().is_ready());
        assert!(!PlannerState::new().with_interests("Food").is_ready());
        assert!(!PlannerState::new().with_city("Paris").with_interests(" , ").is_ready());
        assert!(PlannerState::new().with_city("Paris").with_interests("Food").is_ready());
    }

    #[test]
    fn test_itinerary_recorded_as_system_message() {
        let state = PlannerState::new()
            .with_city("Paris")
            .with_interests("Food")
            .with_itinerary("Day plan");
        assert_eq!(state.itinerary, "Day plan");
        assert_eq!(state.messages.last(), Some(&Message::System("Day plan".to_string())));
    }
}
