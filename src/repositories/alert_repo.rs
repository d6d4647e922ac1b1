//! Alert repository. Every user-facing query is scoped by owner.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::Timestamp;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{Alert, AlertTriggerUpdate, NewAlert, UpdateAlert};
use crate::schema::alerts;

#[derive(Clone)]
pub struct AlertRepository {
    pool: AsyncDbPool,
}

impl AlertRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_alert: NewAlert) -> Result<Alert, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(alerts::table)
            .values(&new_alert)
            .returning(Alert::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Alert>, AppError> {
        let mut conn = self.pool.get().await?;

        alerts::table
            .filter(alerts::user_id.eq(user_id))
            .order((alerts::created_at.desc(), alerts::id.desc()))
            .select(Alert::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<i64, AppError> {
        let mut conn = self.pool.get().await?;

        alerts::table
            .filter(alerts::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_for_user(
        &self,
        user_id: i32,
        alert_id: i32,
    ) -> Result<Option<Alert>, AppError> {
        let mut conn = self.pool.get().await?;

        alerts::table
            .find(alert_id)
            .filter(alerts::user_id.eq(user_id))
            .select(Alert::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn update_for_user(
        &self,
        user_id: i32,
        alert_id: i32,
        update: UpdateAlert,
    ) -> Result<Option<Alert>, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(
            alerts::table
                .find(alert_id)
                .filter(alerts::user_id.eq(user_id)),
        )
        .set((
            &update,
            alerts::updated_at.eq(Timestamp::from(jiff::Timestamp::now())),
        ))
        .returning(Alert::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(AppError::from)
    }

    /// Returns whether a row was removed.
    pub async fn delete_for_user(&self, user_id: i32, alert_id: i32) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;

        let removed = diesel::delete(
            alerts::table
                .find(alert_id)
                .filter(alerts::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(removed > 0)
    }

    /// Active alerts whose next trigger is unset or due at `now`.
    pub async fn find_ready_to_trigger(
        &self,
        now: jiff::Timestamp,
    ) -> Result<Vec<Alert>, AppError> {
        let mut conn = self.pool.get().await?;

        alerts::table
            .filter(alerts::is_active.eq(true))
            .filter(
                alerts::next_trigger
                    .is_null()
                    .or(alerts::next_trigger.le(Timestamp::from(now))),
            )
            .order(alerts::id.asc())
            .select(Alert::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn record_trigger(&self, alert: &Alert) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(alerts::table.find(alert.id))
            .set((
                AlertTriggerUpdate::from(alert),
                alerts::updated_at.eq(Timestamp::from(jiff::Timestamp::now())),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
