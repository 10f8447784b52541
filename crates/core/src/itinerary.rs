//! Typed itinerary payload attached to a trip.
//!
//! The itinerary is produced by an external AI collaborator and arrives as
//! JSON text. It is parsed into explicit day/activity structures and
//! validated before it can reach storage, so malformed payloads are
//! rejected up front instead of surfacing later as missing fields.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::validation::{optional_non_negative, require_non_empty};

/// A full multi-day itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub days: Vec<ItineraryDay>,
    #[serde(default)]
    pub total_estimated_cost: Option<f64>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// One day of an itinerary. `day` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub activities: Vec<ItineraryActivity>,
}

/// A suggested activity within an itinerary day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryActivity {
    #[serde(default)]
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Itinerary {
    /// Check structural rules: days numbered from 1 in strictly increasing
    /// order, non-empty activity titles, non-negative costs.
    pub fn validate(&self) -> Result<(), CoreError> {
        optional_non_negative("total_estimated_cost", self.total_estimated_cost)?;

        let mut previous = 0u32;
        for day in &self.days {
            if day.day == 0 {
                return Err(CoreError::Validation(
                    "Itinerary day numbers are 1-based".into(),
                ));
            }
            if day.day <= previous {
                return Err(CoreError::Validation(format!(
                    "Itinerary day {} is duplicated or out of order",
                    day.day
                )));
            }
            previous = day.day;

            for activity in &day.activities {
                require_non_empty("activity title", &activity.title)?;
                optional_non_negative("activity cost", activity.cost)?;
            }
        }
        Ok(())
    }

    /// Parse the raw text returned by the itinerary generator.
    ///
    /// Accepts bare JSON, JSON inside a fenced code block, or JSON embedded
    /// in surrounding prose. The result is validated before it is returned.
    pub fn parse_generated(raw: &str) -> Result<Self, CoreError> {
        let body = extract_json_object(raw)
            .ok_or_else(|| CoreError::Validation("Itinerary response contains no JSON object".into()))?;

        let itinerary: Itinerary = serde_json::from_str(body)
            .map_err(|e| CoreError::Validation(format!("Malformed itinerary: {e}")))?;
        itinerary.validate()?;
        Ok(itinerary)
    }
}

/// Slice out the outermost `{ ... }` of a generator response.
fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.trim_end().strip_suffix("```").unwrap_or(rest)
        }
        None => trimmed,
    };
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    (end > start).then(|| &unfenced[start..=end])
}
