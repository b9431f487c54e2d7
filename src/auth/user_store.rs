//! Credential Storage
//! Mission: Securely store and look up user accounts with SQLite

use crate::auth::models::{Role, User};
use crate::auth::password;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{info, warn};

/// Read-side capability the auth layer depends on.
///
/// Injected so the auth logic is independent of the backing persistence.
pub trait CredentialStore: Send + Sync {
    /// Exact-match, case-sensitive username lookup.
    fn lookup(&self, username: &str) -> Result<Option<User>>;

    /// Check a username/password pair.
    ///
    /// Unknown username and wrong password yield the same `None`; callers
    /// cannot tell which one failed.
    fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>>;
}

/// User storage with SQLite backend
pub struct SqliteUserStore {
    db_path: String,
    // Verified against when the username does not exist, so a miss costs
    // one bcrypt check either way.
    fallback_hash: String,
}

impl SqliteUserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
            fallback_hash: password::hash_password("fallback")?,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                full_name TEXT,
                password_hash TEXT NOT NULL,
                disabled INTEGER NOT NULL DEFAULT 0,
                role TEXT NOT NULL
            )",
            [],
        )?;

        self.seed_default_users(&conn)?;

        Ok(())
    }

    /// Seed the static default users on first start
    fn seed_default_users(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .context("Failed to count users")?;

        if count == 0 {
            self.insert_user(conn, "admin", Some("Admin User"), "admin12345", Role::Admin)?;
            self.insert_user(
                conn,
                "basicuser",
                Some("Basic User"),
                "basicuser12345",
                Role::Basic,
            )?;

            info!("🔐 Seeded credential store with default users (admin, basicuser)");
            warn!("⚠️  CHANGE DEFAULT PASSWORDS IN PRODUCTION!");
        }

        Ok(())
    }

    fn insert_user(
        &self,
        conn: &Connection,
        username: &str,
        full_name: Option<&str>,
        plain_password: &str,
        role: Role,
    ) -> Result<User> {
        let user = User {
            username: username.to_string(),
            full_name: full_name.map(str::to_string),
            password_hash: password::hash_password(plain_password)?,
            disabled: false,
            role,
        };

        conn.execute(
            "INSERT INTO users (username, full_name, password_hash, disabled, role)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.username,
                user.full_name,
                user.password_hash,
                user.disabled,
                user.role.as_str(),
            ],
        )
        .context("Failed to insert user")?;

        Ok(user)
    }

    /// Create a new user
    pub fn create_user(
        &self,
        username: &str,
        full_name: Option<&str>,
        password: &str,
        role: Role,
    ) -> Result<User> {
        let conn = Connection::open(&self.db_path)?;
        let user = self.insert_user(&conn, username, full_name, password, role)?;

        info!("✅ Created user: {} ({})", user.username, user.role.as_str());

        Ok(user)
    }

    /// Flip the disabled flag on an account
    pub fn set_disabled(&self, username: &str, disabled: bool) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn.execute(
            "UPDATE users SET disabled = ?1 WHERE username = ?2",
            params![disabled, username],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        Ok(())
    }

    /// Delete a user by username
    pub fn delete_user(&self, username: &str) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected =
            conn.execute("DELETE FROM users WHERE username = ?1", params![username])?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        info!("🗑️  Deleted user: {}", username);
        Ok(())
    }
}

impl CredentialStore for SqliteUserStore {
    fn lookup(&self, username: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT username, full_name, password_hash, disabled, role
             FROM users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], |row| {
            let role_str: String = row.get(4)?;
            Ok(User {
                username: row.get(0)?,
                full_name: row.get(1)?,
                password_hash: row.get(2)?,
                disabled: row.get(3)?,
                role: Role::from_str(&role_str).unwrap_or(Role::Basic),
            })
        });

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.lookup(username)? {
            Some(user) if password::verify_password(password, &user.password_hash) => {
                Ok(Some(user))
            }
            Some(_) => Ok(None),
            None => {
                // Burn a verification so a missing user costs the same as a
                // wrong password.
                let _ = password::verify_password(password, &self.fallback_hash);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (SqliteUserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = SqliteUserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_default_users_seeded() {
        let (store, _temp) = create_test_store();

        let admin = store.lookup("admin").unwrap().unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.full_name.as_deref(), Some("Admin User"));
        assert_eq!(admin.role, Role::Admin);
        assert!(!admin.disabled);

        let basic = store.lookup("basicuser").unwrap().unwrap();
        assert_eq!(basic.role, Role::Basic);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let (store, _temp) = create_test_store();

        assert!(store.lookup("admin").unwrap().is_some());
        assert!(store.lookup("Admin").unwrap().is_none());
        assert!(store.lookup("ADMIN").unwrap().is_none());
    }

    #[test]
    fn test_authenticate_success_matches_store_role() {
        let (store, _temp) = create_test_store();

        let admin = store.authenticate("admin", "admin12345").unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);

        let basic = store
            .authenticate("basicuser", "basicuser12345")
            .unwrap()
            .unwrap();
        assert_eq!(basic.role, Role::Basic);
    }

    #[test]
    fn test_authenticate_failures_are_identical() {
        let (store, _temp) = create_test_store();

        // Wrong password and unknown username produce the same outcome
        let wrong_password = store.authenticate("admin", "wrongpassword").unwrap();
        let unknown_user = store.authenticate("nobody", "wrongpassword").unwrap();

        assert!(wrong_password.is_none());
        assert!(unknown_user.is_none());
    }

    #[test]
    fn test_create_and_delete_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create_user("coach", Some("Coach User"), "coach12345", Role::Basic)
            .unwrap();
        assert_eq!(user.username, "coach");

        assert!(store.authenticate("coach", "coach12345").unwrap().is_some());

        store.delete_user("coach").unwrap();
        assert!(store.lookup("coach").unwrap().is_none());
        assert!(store.delete_user("coach").is_err());
    }

    #[test]
    fn test_set_disabled_reflected_in_lookup() {
        let (store, _temp) = create_test_store();

        store.set_disabled("basicuser", true).unwrap();
        let user = store.lookup("basicuser").unwrap().unwrap();
        assert!(user.disabled);

        store.set_disabled("basicuser", false).unwrap();
        let user = store.lookup("basicuser").unwrap().unwrap();
        assert!(!user.disabled);
    }
}
