//! User repository implementation.

use chrono::Utc;
use sqlx::PgPool;

use waddle_core::error::{AppError, ErrorKind};
use waddle_core::result::AppResult;
use waddle_core::types::{Identity, PageRequest, PageResponse};
use waddle_entity::user::{CreateUser, UpdateUser, User};

const USER_COLUMNS: &str = "id, name, email, password, online, files, created, updated";

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by identity.
    pub async fn find_by_id(&self, id: &Identity) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (exact match).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by email", e))
    }

    /// List users, newest first.
    pub async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created DESC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page, total.max(0) as u64))
    }

    /// Insert a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password, online, files, created, updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.online)
        .bind(&data.files)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Failed to create user"))
    }

    /// Replace a user's profile fields.
    pub async fn update(&self, data: &UpdateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, email = $3, online = $4, files = $5, updated = $6 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.online)
        .bind(&data.files)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", data.id)))
    }

    /// Replace a user's password hash.
    pub async fn update_password(&self, id: &Identity, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password = $2, updated = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update password", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Delete a user. Returns whether a row was removed.
    pub async fn delete(&self, id: &Identity) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map unique-constraint violations to [`ErrorKind::Conflict`].
fn map_unique_violation(err: sqlx::Error, context: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.constraint() {
            Some("users_pkey") | Some("users_email_key") => {
                return AppError::conflict("Email already in use");
            }
            Some("users_name_key") => return AppError::conflict("Name already in use"),
            _ => {}
        }
    }
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
