//! Account service: registration, login, profile and preferences.

use crate::api::dto::{
    AuthResponse, ChangePasswordRequest, DeactivateRequest, LoginRequest, RegisterRequest,
    UpdatePreferencesRequest, UpdateProfileRequest, UserResponse, UserStatsResponse,
    normalize_skills,
};
use crate::cache::{CacheManager, keys};
use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::repositories::{AlertRepository, UserJobRepository, UserRepository};
use crate::utils::jwt::generate_token;
use crate::utils::password::{hash_password, verify_password};

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const BAD_CREDENTIALS: &str = "Invalid email or password";

fn ensure_email_free(existing: Option<User>) -> AppResult<()> {
    match existing {
        Some(_) => Err(AppError::bad_request(DUPLICATE_EMAIL)),
        None => Ok(()),
    }
}

/// A registration that lost the race on the unique email index gets the
/// same answer as the pre-check.
fn created_account(result: AppResult<User>) -> AppResult<User> {
    match result {
        Err(AppError::Duplicate { .. }) => Err(AppError::bad_request(DUPLICATE_EMAIL)),
        other => other,
    }
}

/// Unknown email and wrong password share one message. Deactivated accounts
/// are refused before the password is checked.
fn check_login(
    account: Option<User>,
    password_matches: impl FnOnce(&User) -> AppResult<bool>,
) -> AppResult<User> {
    let user = account.ok_or_else(|| AppError::unauthorized(BAD_CREDENTIALS))?;

    if !user.is_active {
        return Err(AppError::unauthorized("Account is deactivated"));
    }
    if !password_matches(&user)? {
        tracing::debug!(user_id = user.id, "rejected login with wrong password");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }
    Ok(user)
}

/// User service for account-level business rules.
///
/// Cloning is cheap: repositories share the pool and the cache is behind
/// an `Arc`.
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    user_jobs: UserJobRepository,
    alerts: AlertRepository,
    cache: CacheManager,
    jwt: JwtConfig,
}

impl UserService {
    pub fn new(
        users: UserRepository,
        user_jobs: UserJobRepository,
        alerts: AlertRepository,
        cache: CacheManager,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            users,
            user_jobs,
            alerts,
            cache,
            jwt,
        }
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        generate_token(
            user.id,
            user.email.clone(),
            &self.jwt.secret,
            self.jwt.expiration_hours,
        )
    }

    /// Creates the account and signs the caller in.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        ensure_email_free(self.users.find_by_email(&email).await?)?;

        let location = request.location.unwrap_or_default();
        let new_user = NewUser {
            email,
            password: hash_password(&request.password)?,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            skills: normalize_skills(&request.skills),
            experience: request.experience,
            location_city: location.city,
            location_state: location.state,
            location_country: location.country,
            remote_preference: request.remote_preference,
            bio: request.bio,
        };

        let user = created_account(self.users.create(new_user).await)?;
        tracing::info!(user_id = user.id, "user registered");

        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let account = self.users.find_by_email(&request.email).await?;
        let mut user = check_login(account, |user| {
            verify_password(&request.password, &user.password)
        })?;

        self.users.record_login(user.id).await?;
        user.last_login = Some(jiff::Timestamp::now().into());
        // Only the user's own views show last_login; listings are untouched.
        self.cache.invalidate_pattern(&keys::user_pattern(user.id)).await;
        tracing::info!(user_id = user.id, "user logged in");

        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    /// Resolves a token subject; only existing, active users qualify.
    pub async fn authenticate(&self, user_id: i32) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid token. User not found."))?;

        if !user.is_active {
            return Err(AppError::unauthorized("Account is deactivated."));
        }
        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))
    }

    pub async fn profile(&self, user_id: i32) -> AppResult<(UserResponse, bool)> {
        self.cache
            .get_or_compute(&keys::user(user_id, "profile"), None, async {
                Ok(UserResponse::from(self.get_user(user_id).await?))
            })
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = self
            .users
            .update_profile(user_id, request.into_changeset())
            .await?;
        self.cache.invalidate_user(user_id).await;
        tracing::info!(user_id, "profile updated");
        Ok(user.into())
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = self.get_user(user_id).await?;
        if !verify_password(&request.current_password, &user.password)? {
            return Err(AppError::bad_request("Current password is incorrect"));
        }

        self.users
            .update_password(user_id, hash_password(&request.new_password)?)
            .await?;
        tracing::info!(user_id, "password changed");
        Ok(())
    }

    pub async fn update_preferences(
        &self,
        user_id: i32,
        request: UpdatePreferencesRequest,
    ) -> AppResult<UserResponse> {
        let user = self.get_user(user_id).await?;
        let merged = request.merge_into(user.preferences());
        let document = serde_json::to_value(&merged).map_err(anyhow::Error::from)?;

        let user = self.users.update_preferences(user_id, document).await?;
        self.cache.invalidate_user(user_id).await;
        Ok(user.into())
    }

    pub async fn stats(&self, user_id: i32) -> AppResult<(UserStatsResponse, bool)> {
        self.cache
            .get_or_compute(&keys::user(user_id, "stats"), None, async {
                let user = self.get_user(user_id).await?;
                let (saved, applied) = self.user_jobs.counts(user_id).await?;
                let alerts = self.alerts.count_for_user(user_id).await?;

                Ok(UserStatsResponse {
                    saved_jobs_count: saved,
                    applied_jobs_count: applied,
                    alerts_count: alerts,
                    profile_completion: user.profile_completion(),
                    last_login: user.last_login.map(|t| t.to_jiff()),
                    member_since: user.created_at.to_jiff(),
                })
            })
            .await
    }

    pub async fn deactivate(&self, user_id: i32, request: DeactivateRequest) -> AppResult<()> {
        let user = self.get_user(user_id).await?;
        if !verify_password(&request.password, &user.password)? {
            return Err(AppError::bad_request("Password is incorrect"));
        }

        self.users.deactivate(user_id).await?;
        self.cache.invalidate_user(user_id).await;
        tracing::info!(user_id, "account deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::error_to_status_code;
    use crate::models::fixtures::user;
    use axum::http::StatusCode;

    fn message(err: AppError) -> String {
        match err {
            AppError::Unauthorized { message } | AppError::BadRequest { message } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_login_accepts_active_user_with_matching_password() {
        let account = check_login(Some(user()), |_| Ok(true)).unwrap();
        assert_eq!(account.id, 7);
    }

    #[test]
    fn test_login_refuses_deactivated_user_even_with_correct_password() {
        let mut deactivated = user();
        deactivated.is_active = false;

        let err = check_login(Some(deactivated), |_| Ok(true)).unwrap_err();
        assert_eq!(error_to_status_code(&err), StatusCode::UNAUTHORIZED);
        assert_eq!(message(err), "Account is deactivated");
    }

    #[test]
    fn test_deactivated_user_never_reaches_password_check() {
        let mut deactivated = user();
        deactivated.is_active = false;

        let result = check_login(Some(deactivated), |_| -> AppResult<bool> {
            panic!("password must not be checked")
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_email_and_wrong_password_look_the_same() {
        let unknown = check_login(None, |_| Ok(true)).unwrap_err();
        let wrong = check_login(Some(user()), |_| Ok(false)).unwrap_err();
        assert_eq!(message(unknown), BAD_CREDENTIALS);
        assert_eq!(message(wrong), BAD_CREDENTIALS);
    }

    #[test]
    fn test_registered_email_is_rejected_before_insert() {
        let err = ensure_email_free(Some(user())).unwrap_err();
        assert_eq!(error_to_status_code(&err), StatusCode::BAD_REQUEST);
        assert_eq!(message(err), DUPLICATE_EMAIL);
        assert!(ensure_email_free(None).is_ok());
    }

    #[test]
    fn test_unique_violation_on_insert_maps_to_duplicate_email() {
        let raced = created_account(Err(AppError::Duplicate {
            entity: "users".to_string(),
            field: "email".to_string(),
            value: "jane@example.com".to_string(),
        }))
        .unwrap_err();
        assert_eq!(error_to_status_code(&raced), StatusCode::BAD_REQUEST);
        assert_eq!(message(raced), DUPLICATE_EMAIL);

        assert_eq!(created_account(Ok(user())).unwrap().id, 7);
    }
}
