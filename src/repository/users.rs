//! User and permission methods on Repository

use sqlx::{Sqlite, Transaction};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::user::{PermissionSet, Role, UpdateUser, User},
};

async fn insert_permissions(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    flags: &PermissionSet,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO permissions
            (user_id, can_view_interventions, can_add_interventions, can_edit_interventions,
             can_delete_interventions, can_view_stock, can_add_stock, can_edit_stock,
             can_delete_stock, can_manage_users)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(flags.can_view_interventions)
    .bind(flags.can_add_interventions)
    .bind(flags.can_edit_interventions)
    .bind(flags.can_delete_interventions)
    .bind(flags.can_view_stock)
    .bind(flags.can_add_stock)
    .bind(flags.can_edit_stock)
    .bind(flags.can_delete_stock)
    .bind(flags.can_manage_users)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

impl Repository {
    /// List all users
    pub async fn users_list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get user by ID
    pub async fn users_get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user by username, if any
    pub async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check whether a username is already taken
    pub async fn users_username_exists(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        let exists: bool = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? AND id != ?)",
                )
                .bind(username)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                    .bind(username)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(exists)
    }

    /// Create a user and their permission row (role defaults) in one
    /// transaction
    pub async fn users_create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<User> {
        let flags = PermissionSet::for_role(role);

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role, force_password_change)
            VALUES (?, ?, ?, 0)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        insert_permissions(&mut tx, user.id, &flags).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Seed the default admin account if the users table is empty.
    /// The account starts with `force_password_change` raised.
    pub async fn users_seed_admin(&self, password_hash: &str) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, role, force_password_change)
            VALUES ('admin', ?, ?, 1)
            RETURNING id
            "#,
        )
        .bind(password_hash)
        .bind(Role::Admin)
        .fetch_one(&mut *tx)
        .await?;

        insert_permissions(&mut tx, user_id, &PermissionSet::for_role(Role::Admin)).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Resolved permission flags for a user
    pub async fn users_get_permissions(&self, user_id: i64) -> AppResult<PermissionSet> {
        let flags = sqlx::query_as::<_, PermissionSet>(
            r#"
            SELECT can_view_interventions, can_add_interventions, can_edit_interventions,
                   can_delete_interventions, can_view_stock, can_add_stock, can_edit_stock,
                   can_delete_stock, can_manage_users
            FROM permissions
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(flags.unwrap_or_else(PermissionSet::none))
    }

    /// Overwrite a user's permission flags (admin override path)
    pub async fn users_update_permissions(
        &self,
        user_id: i64,
        flags: &PermissionSet,
    ) -> AppResult<PermissionSet> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET can_view_interventions = ?, can_add_interventions = ?, can_edit_interventions = ?,
                can_delete_interventions = ?, can_view_stock = ?, can_add_stock = ?,
                can_edit_stock = ?, can_delete_stock = ?, can_manage_users = ?
            WHERE user_id = ?
            "#,
        )
        .bind(flags.can_view_interventions)
        .bind(flags.can_add_interventions)
        .bind(flags.can_edit_interventions)
        .bind(flags.can_delete_interventions)
        .bind(flags.can_view_stock)
        .bind(flags.can_add_stock)
        .bind(flags.can_edit_stock)
        .bind(flags.can_delete_stock)
        .bind(flags.can_manage_users)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Permissions for user {} not found",
                user_id
            )));
        }
        Ok(*flags)
    }

    /// Update username and/or role; the stored flags are left untouched,
    /// role changes do not re-derive them
    pub async fn users_update(&self, id: i64, data: &UpdateUser) -> AppResult<User> {
        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(concat!($name, " = ?"));
                }
            };
        }

        add_field!(data.username, "username");
        add_field!(data.role, "role");

        if sets.is_empty() {
            return self.users_get_by_id(id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, User>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.username);
        bind_field!(data.role);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Replace a user's password hash and set the forced-change flag
    pub async fn users_set_password(
        &self,
        user_id: i64,
        password_hash: &str,
        force_password_change: bool,
    ) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?, force_password_change = ? WHERE id = ?")
                .bind(password_hash)
                .bind(force_password_change)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    /// Delete a user and their permission row
    pub async fn users_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM permissions WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
