//! User MCP Tools
//!
//! Registration and lookup. There are no credentials: the returned user id
//! is the identity callers pass to every list and comparison tool.

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{User, UserCreate};

/// Response for register_user
#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

/// Trim and lower-case an email, rejecting obviously malformed input
fn normalize_email(email: &str) -> Result<String, String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err("email cannot be empty".to_string());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(format!("'{}' is not a valid email address", email)),
    }
}

/// Register a new user
pub fn register_user(
    db: &Database,
    email: &str,
    display_name: Option<&str>,
) -> Result<RegisterUserResponse, String> {
    let email = normalize_email(email)?;
    let display_name = display_name
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = User::get_by_email(&conn, &email)
        .map_err(|e| format!("Failed to look up user: {}", e))?;
    if existing.is_some() {
        return Err(format!("Email already registered: {}", email));
    }

    let user = User::create(&conn, &UserCreate { email, display_name })
        .map_err(|e| format!("Failed to register user: {}", e))?;

    info!(user_id = user.id, "Registered user");

    Ok(RegisterUserResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        created_at: user.created_at,
    })
}

/// Get a user by ID
pub fn get_user(db: &Database, id: i64) -> Result<Option<User>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::get_by_id(&conn, id).map_err(|e| format!("Failed to get user: {}", e))
}

/// Find a user by email (case-insensitive)
pub fn find_user_by_email(db: &Database, email: &str) -> Result<Option<User>, String> {
    let email = normalize_email(email)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::get_by_email(&conn, &email).map_err(|e| format!("Failed to get user: {}", e))
}

/// Fail unless the caller-supplied user id refers to a registered user
pub(crate) fn ensure_user(conn: &Connection, user_id: i64) -> Result<(), String> {
    let exists = User::exists(conn, user_id).map_err(|e| format!("Database error: {}", e))?;
    if exists {
        Ok(())
    } else {
        Err(format!("User not found with id: {}", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), Ok("ana@example.com".to_string()));
        assert!(normalize_email("").is_err());
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@b@c").is_err());
    }

    #[test]
    fn test_register_and_lookup() {
        let (_dir, db) = test_database();

        let registered = register_user(&db, "Ana@Example.com", Some(" Ana ")).unwrap();
        assert_eq!(registered.email, "ana@example.com");
        assert_eq!(registered.display_name.as_deref(), Some("Ana"));

        let by_id = get_user(&db, registered.id).unwrap().unwrap();
        assert_eq!(by_id.email, "ana@example.com");

        let by_email = find_user_by_email(&db, "ANA@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, registered.id);

        assert!(get_user(&db, registered.id + 1).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, db) = test_database();

        register_user(&db, "bruno@example.com", None).unwrap();
        let err = register_user(&db, "BRUNO@example.com", None).unwrap_err();
        assert!(err.contains("already registered"));
    }

    #[test]
    fn test_ensure_user() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "carla@example.com", None).unwrap();

        let conn = db.get_conn().unwrap();
        assert!(ensure_user(&conn, user.id).is_ok());
        assert!(ensure_user(&conn, 999).is_err());
    }
}
