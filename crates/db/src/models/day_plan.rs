//! Day plan and activity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayfarer_core::types::{Date, RecordId, Timestamp};

/// A day plan row from the `day_plans` table.
///
/// `activities` is stored as a JSONB array remotely; activity ids are only
/// unique within one plan.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DayPlan {
    pub id: RecordId,
    pub trip_id: RecordId,
    /// 1-based, unique per trip.
    pub day_number: i32,
    pub date: Date,
    #[sqlx(json)]
    pub activities: Vec<Activity>,
    pub notes: Option<String>,
    pub budget: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One scheduled activity inside a [`DayPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: RecordId,
    /// Free-form time label, e.g. `"09:30"` or `"Morning"`.
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
    #[serde(default)]
    pub completed: bool,
}

/// DTO for creating a new day plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDayPlan {
    pub trip_id: RecordId,
    pub day_number: i32,
    pub date: Date,
    #[serde(default)]
    pub activities: Vec<CreateActivity>,
    pub notes: Option<String>,
    pub budget: Option<f64>,
}

/// DTO for updating an existing day plan. All fields are optional.
///
/// `activities` replaces the whole list; use the activity helpers for
/// single-activity edits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDayPlan {
    pub day_number: Option<i32>,
    pub date: Option<Date>,
    pub activities: Option<Vec<Activity>>,
    pub notes: Option<String>,
    pub budget: Option<f64>,
}

/// DTO for adding an activity. The id is assigned on insert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActivity {
    #[serde(default)]
    pub time: String,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub cost: Option<f64>,
    pub location: Option<String>,
}

/// DTO for editing one activity. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateActivity {
    pub time: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub cost: Option<f64>,
    pub location: Option<String>,
    pub completed: Option<bool>,
}
