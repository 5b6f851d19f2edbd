//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        CreateUser, PermissionSet, UpdateUser, User, UserClaims, UserDetails,
    },
    repository::Repository,
};

/// Minimum length accepted when choosing a new password
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password.
    ///
    /// Returns `(Some(token), user)` for a completed login. When the
    /// account's `force_password_change` flag is raised the token is `None`:
    /// the only operation open to the caller is `change_password`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<(Option<String>, UserDetails)> {
        let user = self
            .repository
            .users_get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let details = self.user_details(user.clone()).await?;

        if user.force_password_change {
            // No token until a new password has been chosen
            return Ok((None, details));
        }

        let token = self.create_token(&user, &details.permissions)?;
        Ok((Some(token), details))
    }

    /// Complete a forced password change (or change one's own password),
    /// then log in. This is the only transition out of the
    /// forced-password-change state.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<(String, UserDetails)> {
        let user = self
            .repository
            .users_get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, current_password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if new_password != confirm_password {
            return Err(AppError::Validation(
                "Password confirmation does not match".to_string(),
            ));
        }

        let hash = self.hash_password(new_password)?;
        self.repository
            .users_set_password(user.id, &hash, false)
            .await?;

        let user = self.repository.users_get_by_id(user.id).await?;
        let details = self.user_details(user.clone()).await?;
        let token = self.create_token(&user, &details.permissions)?;
        Ok((token, details))
    }

    /// Reset a user's password to the configured initial one and force a
    /// change at next login
    pub async fn reset_password(&self, claims: &UserClaims, user_id: i64) -> AppResult<()> {
        claims.require_manage_users()?;

        self.repository.users_get_by_id(user_id).await?;
        let hash = self.hash_password(&self.config.initial_password)?;
        self.repository
            .users_set_password(user_id, &hash, true)
            .await
    }

    /// Current session's account
    pub async fn me(&self, claims: &UserClaims) -> AppResult<UserDetails> {
        let user = self.repository.users_get_by_id(claims.user_id).await?;
        self.user_details(user).await
    }

    /// List all users
    pub async fn list(&self, claims: &UserClaims) -> AppResult<Vec<User>> {
        claims.require_manage_users()?;
        self.repository.users_list().await
    }

    /// Get one user with their permission flags
    pub async fn get_by_id(&self, claims: &UserClaims, id: i64) -> AppResult<UserDetails> {
        claims.require_manage_users()?;
        let user = self.repository.users_get_by_id(id).await?;
        self.user_details(user).await
    }

    /// Create a new user; the role decides the initial permission flags
    pub async fn create_user(&self, claims: &UserClaims, data: CreateUser) -> AppResult<UserDetails> {
        claims.require_manage_users()?;
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .repository
            .users_username_exists(&data.username, None)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = self.hash_password(&data.password)?;
        let user = self
            .repository
            .users_create(&data.username, &hash, data.role)
            .await?;
        self.user_details(user).await
    }

    /// Update username/role; stored permission flags are untouched
    pub async fn update_user(
        &self,
        claims: &UserClaims,
        id: i64,
        data: UpdateUser,
    ) -> AppResult<UserDetails> {
        claims.require_manage_users()?;
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref username) = data.username {
            if self
                .repository
                .users_username_exists(username, Some(id))
                .await?
            {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }

        let user = self.repository.users_update(id, &data).await?;
        self.user_details(user).await
    }

    /// Delete a user
    pub async fn delete_user(&self, claims: &UserClaims, id: i64) -> AppResult<()> {
        claims.require_manage_users()?;
        if claims.user_id == id {
            return Err(AppError::Validation(
                "Cannot delete the account of the current session".to_string(),
            ));
        }
        self.repository.users_delete(id).await
    }

    /// Overwrite a user's permission flags (admin override path)
    pub async fn update_permissions(
        &self,
        claims: &UserClaims,
        user_id: i64,
        flags: PermissionSet,
    ) -> AppResult<PermissionSet> {
        claims.require_manage_users()?;
        self.repository.users_get_by_id(user_id).await?;
        self.repository
            .users_update_permissions(user_id, &flags)
            .await
    }

    async fn user_details(&self, user: User) -> AppResult<UserDetails> {
        let permissions = self.repository.users_get_permissions(user.id).await?;
        Ok(UserDetails {
            id: user.id,
            username: user.username,
            role: user.role,
            force_password_change: user.force_password_change,
            permissions,
        })
    }

    fn create_token(&self, user: &User, permissions: &PermissionSet) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            permissions: *permissions,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
