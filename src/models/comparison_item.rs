//! Comparison Item model
//!
//! A candidate product in a user's price comparison basket.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::pricing::{PricedItem, Unit};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonItem {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: Unit,
    pub created_at: String,
}

/// Data for adding a candidate to the basket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonItemCreate {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: Unit,
}

impl ComparisonItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn to_priced(&self) -> PricedItem {
        PricedItem {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            quantity: self.quantity,
            unit: self.unit,
        }
    }

    pub fn create(conn: &Connection, user_id: i64, data: &ComparisonItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO comparison_items (user_id, name, price, quantity, unit)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![user_id, data.name, data.price, data.quantity, data.unit],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_for_user(conn, user_id, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM comparison_items WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Basket contents in the order they were added
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM comparison_items WHERE user_id = ?1 ORDER BY id ASC")?;

        let items = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Returns Ok(true) if deleted, Ok(false) if not found for this user
    pub fn delete_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM comparison_items WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows > 0)
    }

    pub fn clear_for_user(conn: &Connection, user_id: i64) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM comparison_items WHERE user_id = ?1", [user_id])?;
        Ok(rows)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM comparison_items", [], |row| row.get(0))?;
        Ok(count)
    }
}
