//! Repository for the `day_plans` table.
//!
//! Day plans carry no owner column; every query restricts `trip_id` to
//! trips owned by the caller.

use sqlx::types::Json;
use sqlx::PgPool;
use wayfarer_core::types::Timestamp;

use crate::models::day_plan::DayPlan;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, trip_id, day_number, date, activities, notes, budget, created_at, updated_at";

/// Provides owner-scoped CRUD operations for day plans.
pub struct DayPlanRepo;

impl DayPlanRepo {
    /// Insert a day plan under one of the owner's trips.
    ///
    /// Returns `None` if the parent trip does not exist or belongs to
    /// someone else. A duplicate `(trip_id, day_number)` fails with the
    /// `uq_day_plans_trip_day` unique violation.
    pub async fn insert(
        pool: &PgPool,
        plan: &DayPlan,
        user_id: &str,
    ) -> Result<Option<DayPlan>, sqlx::Error> {
        let query = format!(
            "INSERT INTO day_plans (id, trip_id, day_number, date, activities, notes, budget,
                                    created_at, updated_at)
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
             WHERE EXISTS (SELECT 1 FROM trips WHERE id = $2 AND user_id = $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DayPlan>(&query)
            .bind(&plan.id)
            .bind(&plan.trip_id)
            .bind(plan.day_number)
            .bind(plan.date)
            .bind(Json(&plan.activities))
            .bind(&plan.notes)
            .bind(plan.budget)
            .bind(plan.created_at)
            .bind(plan.updated_at)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the day plans of one trip ordered by day number.
    pub async fn list_by_trip(
        pool: &PgPool,
        trip_id: &str,
        user_id: &str,
    ) -> Result<Vec<DayPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM day_plans
             WHERE trip_id = $1
               AND trip_id IN (SELECT id FROM trips WHERE user_id = $2)
             ORDER BY day_number ASC"
        );
        sqlx::query_as::<_, DayPlan>(&query)
            .bind(trip_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a day plan by id.
    pub async fn find(
        pool: &PgPool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<DayPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM day_plans
             WHERE id = $1
               AND trip_id IN (SELECT id FROM trips WHERE user_id = $2)"
        );
        sqlx::query_as::<_, DayPlan>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the plan for day `day_number` of a trip.
    pub async fn find_by_number(
        pool: &PgPool,
        trip_id: &str,
        day_number: i32,
        user_id: &str,
    ) -> Result<Option<DayPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM day_plans
             WHERE trip_id = $1 AND day_number = $2
               AND trip_id IN (SELECT id FROM trips WHERE user_id = $3)"
        );
        sqlx::query_as::<_, DayPlan>(&query)
            .bind(trip_id)
            .bind(day_number)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a day plan's mutable columns if `updated_at` still equals
    /// `expected_updated_at`. Returns `None` if missing, foreign, or stale.
    pub async fn update_if_unchanged(
        pool: &PgPool,
        plan: &DayPlan,
        expected_updated_at: Timestamp,
        user_id: &str,
    ) -> Result<Option<DayPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE day_plans SET
                day_number = $2,
                date = $3,
                activities = $4,
                notes = $5,
                budget = $6,
                updated_at = $7
             WHERE id = $1 AND updated_at = $8
               AND trip_id IN (SELECT id FROM trips WHERE user_id = $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DayPlan>(&query)
            .bind(&plan.id)
            .bind(plan.day_number)
            .bind(plan.date)
            .bind(Json(&plan.activities))
            .bind(&plan.notes)
            .bind(plan.budget)
            .bind(plan.updated_at)
            .bind(expected_updated_at)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a day plan. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM day_plans
             WHERE id = $1
               AND trip_id IN (SELECT id FROM trips WHERE user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every day plan of a trip. Returns the number of rows removed.
    pub async fn delete_by_trip(
        pool: &PgPool,
        trip_id: &str,
        user_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM day_plans
             WHERE trip_id = $1
               AND trip_id IN (SELECT id FROM trips WHERE user_id = $2)",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Day plans of a publicly shared trip, ordered by day number.
    pub async fn list_shared(pool: &PgPool, share_token: &str) -> Result<Vec<DayPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM day_plans
             WHERE trip_id IN (SELECT id FROM trips WHERE share_token = $1)
             ORDER BY day_number ASC"
        );
        sqlx::query_as::<_, DayPlan>(&query)
            .bind(share_token)
            .fetch_all(pool)
            .await
    }
}
