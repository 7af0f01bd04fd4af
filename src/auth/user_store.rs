//! User Storage
//! Mission: Store login credentials with bcrypt hashing in SQLite

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::models::User;

/// Credential store with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize the database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.seed_default_user(&conn)?;

        Ok(())
    }

    /// Seed a known user for initial setup when the table is empty.
    fn seed_default_user(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .context("Failed to count users")?;

        if count == 0 {
            let password_hash =
                hash("password123", DEFAULT_COST).context("Failed to hash password")?;

            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    "user@example.com",
                    password_hash,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("Failed to insert default user")?;

            info!("Default user created (email: user@example.com)");
            warn!("Default credentials active; replace them outside of development");
        }

        Ok(())
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
        )?;

        let user_result = stmt.query_row(params![email], |row| {
            let id: String = row.get(0)?;
            Ok(User {
                id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::nil()),
                email: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        });

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify email and password
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        match self.get_user_by_email(email)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            None => Ok(false),
        }
    }

    /// Create a new user
    pub fn create_user(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.email,
                user.password_hash,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("Created user: {}", user.email);

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_default_user_seeded() {
        let (store, _temp) = create_test_store();

        let user = store.get_user_by_email("user@example.com").unwrap();
        assert!(user.is_some());
    }

    #[test]
    fn test_password_verification() {
        let (store, _temp) = create_test_store();

        assert!(store
            .verify_password("user@example.com", "password123")
            .unwrap());
        assert!(!store
            .verify_password("user@example.com", "wrongpassword")
            .unwrap());
        assert!(!store.verify_password("nonexistent@example.com", "x").unwrap());
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let created = store.create_user("alice@example.com", "hunter22").unwrap();
        assert_eq!(created.email, "alice@example.com");

        let retrieved = store.get_user_by_email("alice@example.com").unwrap();
        assert_eq!(retrieved.map(|u| u.id), Some(created.id));

        assert!(store.verify_password("alice@example.com", "hunter22").unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        store.create_user("bob@example.com", "pass").unwrap();
        assert!(store.create_user("bob@example.com", "pass").is_err());
    }
}
