//! SQLite user, profile, and API key repository implementation.
//!
//! Implements `UserRepository` from `tally-core`. Usernames are unique
//! case-insensitively (`COLLATE NOCASE`); API keys are stored by their
//! SHA-256 digest only.

use chrono::{DateTime, Utc};
use sqlx::Row;

use tally_core::repository::user::UserRepository;
use tally_types::error::RepositoryError;
use tally_types::user::{User, UserId, UserProfile};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain User.
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: parse_user_id(&self.id)?,
            username: self.username,
            password_hash: self.password_hash,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain UserProfile.
struct ProfileRow {
    user_id: String,
    first_name: String,
    last_name: String,
    email: String,
    updated_at: Option<String>,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, RepositoryError> {
        Ok(UserProfile {
            user_id: parse_user_id(&self.user_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            updated_at: self.updated_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

fn parse_user_id(s: &str) -> Result<UserId, RepositoryError> {
    s.parse::<UserId>()
        .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User, profile: &UserProfile) -> Result<User, RepositoryError> {
        // User and empty profile are created together or not at all.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(format_datetime(&user.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("UNIQUE") {
                    return RepositoryError::Conflict(format!(
                        "username '{}' already exists",
                        user.username
                    ));
                }
            }
            RepositoryError::Query(e.to_string())
        })?;

        sqlx::query(
            "INSERT INTO user_profiles (user_id, first_name, last_name, email, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(profile.updated_at.as_ref().map(format_datetime))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        // The column collation makes this comparison case-insensitive.
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let profile_row = ProfileRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(profile_row.into_profile()?))
            }
            None => Ok(None),
        }
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile, RepositoryError> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id, first_name, last_name, email, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                updated_at = excluded.updated_at",
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(profile.updated_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("FOREIGN KEY") {
                    return RepositoryError::NotFound;
                }
            }
            RepositoryError::Query(e.to_string())
        })?;

        Ok(profile.clone())
    }

    async fn store_api_key(
        &self,
        user_id: &UserId,
        key_hash: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO api_keys (key_hash, user_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(key_hash)
            .bind(user_id.to_string())
            .bind(name)
            .bind(format_datetime(&Utc::now()))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn find_api_key(&self, key_hash: &str) -> Result<Option<UserId>, RepositoryError> {
        let row = sqlx::query("SELECT user_id FROM api_keys WHERE key_hash = ?")
            .bind(key_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_id: String = row
                    .try_get("user_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(parse_user_id(&user_id)?))
            }
            None => Ok(None),
        }
    }

    async fn touch_api_key(&self, key_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE key_hash = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(key_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn revoke_api_key(&self, key_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE key_hash = ?")
            .bind(key_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
