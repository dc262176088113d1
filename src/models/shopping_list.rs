//! Shopping List model
//!
//! A named list owned by one user. Items live in `shopping_items`.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ShoppingList {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, user_id: i64, title: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO shopping_lists (user_id, title) VALUES (?1, ?2)",
            params![user_id, title],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_lists WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(list) => Ok(Some(list)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a list only if it belongs to the given user
    pub fn get_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM shopping_lists WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(list) => Ok(Some(list)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All lists of a user, oldest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM shopping_lists WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;

        let lists = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lists)
    }

    pub fn rename(conn: &Connection, id: i64, title: &str) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE shopping_lists SET title = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![title, id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Bump `updated_at` after the list's items change
    pub fn touch(conn: &Connection, id: i64) -> DbResult<()> {
        conn.execute(
            "UPDATE shopping_lists SET updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Delete a list and, by cascade, its items.
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM shopping_lists WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM shopping_lists", [], |row| row.get(0))?;
        Ok(count)
    }
}
