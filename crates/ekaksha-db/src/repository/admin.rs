//! # Admin Repository
//!
//! Admin credential checks for the back-office login.
//!
//! Passwords are stored and compared as plain text. This mirrors the
//! storefront's existing admin table and is not meant to be hardened here.

use chrono::{DateTime, Utc};
use ekaksha_core::validation::validate_email;
use ekaksha_core::{AdminSession, MIN_PASSWORD_LEN};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: String,
    email: String,
    password: String,
    role: String,
}

#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    /// Creates an admin account. Returns its id.
    pub async fn insert(&self, email: &str, password: &str, role: &str) -> DbResult<String> {
        let email = email.trim();
        validate_email(email)?;
        check_password_length(password)?;

        let id = Uuid::new_v4().to_string();
        debug!(email = %email, role = %role, "Inserting admin");

        sqlx::query(
            "INSERT INTO admins (id, email, password, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password)
        .bind(role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(email))?;

        Ok(id)
    }

    /// Checks an email/password pair. On a match, stamps `last_login` and
    /// returns the session to keep; otherwise `None`.
    ///
    /// Email matching ignores case, the password does not.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> DbResult<Option<AdminSession>> {
        let email = email.trim();
        debug!(email = %email, "Verifying admin credentials");

        let row: Option<AdminRow> =
            sqlx::query_as("SELECT id, email, password, role FROM admins WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row.filter(|r| r.password == password) else {
            info!(email = %email, "Admin login rejected");
            return Ok(None);
        };

        let now = Utc::now();
        self.touch_last_login(&row.id, now).await?;

        Ok(Some(AdminSession {
            id: row.id,
            email: row.email,
            role: row.role,
            last_login: now,
        }))
    }

    /// Replaces the password of the admin with `email`.
    pub async fn update_password(&self, email: &str, new_password: &str) -> DbResult<()> {
        check_password_length(new_password)?;
        let email = email.trim();
        debug!(email = %email, "Updating admin password");

        let result = sqlx::query("UPDATE admins SET password = ? WHERE email = ?")
            .bind(new_password)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Admin", email));
        }
        info!(email = %email, "Admin password changed");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE admins SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn check_password_length(password: &str) -> DbResult<()> {
    if password.trim().chars().count() < MIN_PASSWORD_LEN {
        return Err(DbError::InvalidData(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.admins()
            .insert("admin@ekaksha.in", "secret123", "admin")
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let db = setup().await;

        let session = db
            .admins()
            .verify_credentials("ADMIN@ekaksha.in", "secret123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.email, "admin@ekaksha.in");
        assert_eq!(session.role, "admin");

        let last_login: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT last_login FROM admins WHERE id = ?")
                .bind(&session.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert!(last_login.is_some());

        assert!(db
            .admins()
            .verify_credentials("admin@ekaksha.in", "SECRET123")
            .await
            .unwrap()
            .is_none());
        assert!(db
            .admins()
            .verify_credentials("nobody@ekaksha.in", "secret123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = setup().await;
        db.admins()
            .update_password("admin@ekaksha.in", "newpass99")
            .await
            .unwrap();

        assert!(db
            .admins()
            .verify_credentials("admin@ekaksha.in", "secret123")
            .await
            .unwrap()
            .is_none());
        assert!(db
            .admins()
            .verify_credentials("admin@ekaksha.in", "newpass99")
            .await
            .unwrap()
            .is_some());

        let err = db
            .admins()
            .update_password("admin@ekaksha.in", "123")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidData(_)));

        let err = db
            .admins()
            .update_password("ghost@ekaksha.in", "longenough")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = setup().await;
        let err = db
            .admins()
            .insert("Admin@Ekaksha.in", "another1", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(db.admins().count().await.unwrap(), 1);
    }
}
