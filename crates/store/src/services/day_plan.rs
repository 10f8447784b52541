//! Day plan entity service and activity helpers.
//!
//! Activities live inside their plan, so every activity helper is a
//! read-modify-write of the whole plan: `get_by_id`, edit the list, then
//! the same conditional write `update` uses.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Days;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::itinerary::Itinerary;
use wayfarer_core::types::Date;
use wayfarer_core::validation::{optional_non_negative, require_at_least, require_non_empty};
use wayfarer_core::{clock, ids};
use wayfarer_db::models::day_plan::{
    Activity, CreateActivity, CreateDayPlan, DayPlan, UpdateActivity, UpdateDayPlan,
};

use crate::store::DayPlanStore;

fn check_activity_input(input: &CreateActivity) -> CoreResult<()> {
    require_non_empty("activity title", &input.title)?;
    optional_non_negative("activity cost", input.cost)
}

fn check_activities(activities: &[Activity]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for activity in activities {
        require_non_empty("activity title", &activity.title)?;
        optional_non_negative("activity cost", activity.cost)?;
        if !seen.insert(activity.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate activity id {}",
                activity.id
            )));
        }
    }
    Ok(())
}

/// Give `input` an id unique among `existing`.
fn new_activity(existing: &[Activity], input: CreateActivity) -> Activity {
    Activity {
        id: ids::activity_id(existing.iter().map(|a| a.id.as_str())),
        time: input.time,
        title: input.title.trim().to_string(),
        description: input.description,
        duration: input.duration,
        cost: input.cost,
        location: input.location,
        completed: false,
    }
}

fn activity_not_found(plan_id: &str, activity_id: &str) -> CoreError {
    CoreError::not_found("Activity", format!("{plan_id}/{activity_id}"))
}

pub struct DayPlanService {
    store: Arc<dyn DayPlanStore>,
}

impl DayPlanService {
    pub fn new(store: Arc<dyn DayPlanStore>) -> Self {
        Self { store }
    }

    /// Plans of a trip ordered by day number.
    pub async fn get_by_trip(&self, trip_id: &str) -> CoreResult<Vec<DayPlan>> {
        self.store.list_by_trip(trip_id).await
    }

    pub async fn get_by_id(&self, id: &str) -> CoreResult<DayPlan> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found("DayPlan", id))
    }

    pub async fn get_by_number(&self, trip_id: &str, day_number: i32) -> CoreResult<Option<DayPlan>> {
        self.store.find_by_number(trip_id, day_number).await
    }

    /// Fails with `NotFound` for an unknown trip and `Conflict` when the
    /// trip already has a plan for `day_number`.
    pub async fn create(&self, input: CreateDayPlan) -> CoreResult<DayPlan> {
        require_at_least("day_number", input.day_number, 1)?;
        optional_non_negative("budget", input.budget)?;
        for activity in &input.activities {
            check_activity_input(activity)?;
        }

        let mut activities = Vec::with_capacity(input.activities.len());
        for activity in input.activities {
            let activity = new_activity(&activities, activity);
            activities.push(activity);
        }

        let now = clock::now();
        let plan = DayPlan {
            id: self.store.new_id(),
            trip_id: input.trip_id,
            day_number: input.day_number,
            date: input.date,
            activities,
            notes: input.notes,
            budget: input.budget,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(plan).await?;
        tracing::debug!(plan_id = %created.id, trip_id = %created.trip_id, day = created.day_number, "Day plan created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, changes: UpdateDayPlan) -> CoreResult<DayPlan> {
        let current = self.get_by_id(id).await?;
        self.write(current, changes).await
    }

    /// Merge `changes` into `current` and write it back, conditional on
    /// `current.updated_at` still being the stored value.
    async fn write(&self, current: DayPlan, changes: UpdateDayPlan) -> CoreResult<DayPlan> {
        if let Some(day_number) = changes.day_number {
            require_at_least("day_number", day_number, 1)?;
        }
        optional_non_negative("budget", changes.budget)?;
        if let Some(activities) = &changes.activities {
            check_activities(activities)?;
        }

        let expected = current.updated_at;
        let mut plan = current;
        if let Some(day_number) = changes.day_number {
            plan.day_number = day_number;
        }
        if let Some(date) = changes.date {
            plan.date = date;
        }
        if let Some(activities) = changes.activities {
            plan.activities = activities;
        }
        if let Some(notes) = changes.notes {
            plan.notes = Some(notes);
        }
        if let Some(budget) = changes.budget {
            plan.budget = Some(budget);
        }

        plan.updated_at = clock::after(expected);
        self.store.replace(plan, expected).await
    }

    /// Write a new activity list over an already read plan.
    async fn write_activities(&self, plan: DayPlan, activities: Vec<Activity>) -> CoreResult<DayPlan> {
        self.write(
            plan,
            UpdateDayPlan {
                activities: Some(activities),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        if !self.store.delete(id).await? {
            return Err(CoreError::not_found("DayPlan", id));
        }
        Ok(())
    }

    /// Remove every plan of a trip. Returns how many were removed.
    pub async fn delete_by_trip(&self, trip_id: &str) -> CoreResult<u64> {
        let removed = self.store.delete_by_trip(trip_id).await?;
        tracing::debug!(trip_id, removed, "Day plans removed with trip");
        Ok(removed)
    }

    /// Turn each itinerary day into a plan dated `start_date + day - 1`.
    ///
    /// Stops at the first failure; plans created before it are kept.
    pub async fn create_from_itinerary(
        &self,
        trip_id: &str,
        start_date: Date,
        itinerary: &Itinerary,
    ) -> CoreResult<Vec<DayPlan>> {
        itinerary.validate()?;

        let mut created = Vec::with_capacity(itinerary.days.len());
        for day in &itinerary.days {
            let date = start_date
                .checked_add_days(Days::new(u64::from(day.day - 1)))
                .ok_or_else(|| CoreError::Validation(format!("Day {} is out of range", day.day)))?;
            let day_number = i32::try_from(day.day)
                .map_err(|_| CoreError::Validation(format!("Day {} is out of range", day.day)))?;

            let input = CreateDayPlan {
                trip_id: trip_id.to_string(),
                day_number,
                date,
                activities: day
                    .activities
                    .iter()
                    .map(|a| CreateActivity {
                        time: a.time.clone(),
                        title: a.title.clone(),
                        description: a.description.clone(),
                        duration: a.duration.clone(),
                        cost: a.cost,
                        location: a.location.clone(),
                    })
                    .collect(),
                notes: day.title.clone(),
                budget: None,
            };
            created.push(self.create(input).await?);
        }
        tracing::info!(trip_id, days = created.len(), "Day plans created from itinerary");
        Ok(created)
    }

    /// Public read of the plans behind a share token.
    pub async fn get_shared(&self, share_token: &str) -> CoreResult<Vec<DayPlan>> {
        self.store.list_shared(share_token).await
    }

    // -- Activities ----------------------------------------------------------

    pub async fn add_activity(&self, plan_id: &str, input: CreateActivity) -> CoreResult<DayPlan> {
        check_activity_input(&input)?;
        let plan = self.get_by_id(plan_id).await?;
        let mut activities = plan.activities.clone();
        let activity = new_activity(&activities, input);
        activities.push(activity);
        self.write_activities(plan, activities).await
    }

    pub async fn update_activity(
        &self,
        plan_id: &str,
        activity_id: &str,
        changes: UpdateActivity,
    ) -> CoreResult<DayPlan> {
        let plan = self.get_by_id(plan_id).await?;
        let mut activities = plan.activities.clone();
        let activity = activities
            .iter_mut()
            .find(|a| a.id == activity_id)
            .ok_or_else(|| activity_not_found(plan_id, activity_id))?;

        if let Some(time) = changes.time {
            activity.time = time;
        }
        if let Some(title) = changes.title {
            activity.title = title.trim().to_string();
        }
        if let Some(description) = changes.description {
            activity.description = Some(description);
        }
        if let Some(duration) = changes.duration {
            activity.duration = Some(duration);
        }
        if let Some(cost) = changes.cost {
            activity.cost = Some(cost);
        }
        if let Some(location) = changes.location {
            activity.location = Some(location);
        }
        if let Some(completed) = changes.completed {
            activity.completed = completed;
        }
        self.write_activities(plan, activities).await
    }

    pub async fn delete_activity(&self, plan_id: &str, activity_id: &str) -> CoreResult<DayPlan> {
        let plan = self.get_by_id(plan_id).await?;
        let mut activities = plan.activities.clone();
        let before = activities.len();
        activities.retain(|a| a.id != activity_id);
        if activities.len() == before {
            return Err(activity_not_found(plan_id, activity_id));
        }
        self.write_activities(plan, activities).await
    }

    /// Flip an activity's `completed` flag.
    pub async fn toggle_activity(&self, plan_id: &str, activity_id: &str) -> CoreResult<DayPlan> {
        let plan = self.get_by_id(plan_id).await?;
        let mut activities = plan.activities.clone();
        let activity = activities
            .iter_mut()
            .find(|a| a.id == activity_id)
            .ok_or_else(|| activity_not_found(plan_id, activity_id))?;
        activity.completed = !activity.completed;
        self.write_activities(plan, activities).await
    }
}
