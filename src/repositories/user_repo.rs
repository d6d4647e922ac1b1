//! User repository for async database operations.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{NewUser, UpdateProfile, User};
use crate::schema::users;

/// User repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap
/// (just reference count increment). No need for `Arc<UserRepository>`.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

fn now() -> Timestamp {
    Timestamp::from(jiff::Timestamp::now())
}

impl UserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. The email must already be lowercased.
    pub async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Case-insensitive lookup; emails are stored lowercased.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        update: UpdateProfile,
    ) -> Result<User, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(user_id))
            .set((&update, users::updated_at.eq(now())))
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn update_preferences(
        &self,
        user_id: i32,
        preferences: JsonValue,
    ) -> Result<User, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(user_id))
            .set((
                users::preferences.eq(preferences),
                users::updated_at.eq(now()),
            ))
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn update_password(&self, user_id: i32, password_hash: String) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(user_id))
            .set((
                users::password.eq(password_hash),
                users::updated_at.eq(now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn record_login(&self, user_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(user_id))
            .set(users::last_login.eq(Some(now())))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn deactivate(&self, user_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(user_id))
            .set((users::is_active.eq(false), users::updated_at.eq(now())))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
