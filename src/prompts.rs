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
//! Prompt composition for the completion backend.
//!
//! Pure functions of their inputs; each composition is independent and
//! idempotent for identical (city, interests) input.

/// A system instruction paired with a fixed human turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub human: String,
}

/// Day-trip itinerary request for a city, tailored to the given interests.
pub fn itinerary_prompt(city: &str, interests: &[String]) -> Prompt {
    let interests = interests.join(", ");
    Prompt {
        system: format!(
            "You are a smart travel agent who creates engaging, fun, and optimized \
             day trip itineraries for {city}. Tailor recommendations based on the \
             user's interests: {interests}. Include hidden gems, famous spots, and \
             local cuisine. Keep it structured, with timestamps. Suggest budget \
             ranging from affordable to luxurious accommodations near the city, \
             along with their approximate price range. Also, provide the best \
             season to visit this place for the best experience."
        ),
        human: "Plan my perfect trip, including budget stays and best season recommendations!"
            .to_string(),
    }
}

/// One notable, lesser-known fact about a city.
pub fn fun_fact_prompt(city: &str) -> Prompt {
    Prompt {
        system: format!(
            "You are a knowledgeable travel guide. Share an interesting and unique \
             fun fact about {city} that most travelers don't know."
        ),
        human: format!("Tell me a fun fact about {city}!"),
    }
}
