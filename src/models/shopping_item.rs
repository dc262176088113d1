//! Shopping Item model
//!
//! One line of a shopping list. When `unit` is grams the stored price is
//! per kilogram; for every other unit it is per unit of that unit.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::pricing::{line_total, PricingResult, Unit};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: i64,
    pub list_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub price: Option<f64>,
    pub purchased: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding an item to a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItemCreate {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub price: Option<f64>,
}

/// Data for updating an item. `price: Some(None)` clears the price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    pub price: Option<Option<f64>>,
    pub purchased: Option<bool>,
}

impl ShoppingItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            list_id: row.get("list_id")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
            price: row.get("price")?,
            purchased: row.get::<_, i32>("purchased")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Total for this line, or None when the item has no price
    pub fn line_total(&self) -> PricingResult<Option<f64>> {
        self.price
            .map(|price| line_total(price, self.quantity, self.unit))
            .transpose()
    }

    pub fn create(conn: &Connection, list_id: i64, data: &ShoppingItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO shopping_items (list_id, name, quantity, unit, price)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![list_id, data.name, data.quantity, data.unit, data.price],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_items WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get an item only if its list belongs to the given user
    pub fn get_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT si.* FROM shopping_items si
            INNER JOIN shopping_lists sl ON sl.id = si.list_id
            WHERE si.id = ?1 AND sl.user_id = ?2
            "#,
        )?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Items of a list in insertion order
    pub fn list_for_list(conn: &Connection, list_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM shopping_items WHERE list_id = ?1 ORDER BY id ASC")?;

        let items = stmt
            .query_map([list_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn update(conn: &Connection, id: i64, data: &ShoppingItemUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(quantity, "quantity");
        add_update!(unit, "unit");
        add_update!(price, "price");

        if let Some(purchased) = data.purchased {
            updates.push(format!("purchased = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(purchased as i32));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE shopping_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    pub fn toggle_purchased(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        conn.execute(
            r#"
            UPDATE shopping_items
            SET purchased = 1 - purchased, updated_at = datetime('now')
            WHERE id = ?1
            "#,
            [id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM shopping_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Remove every item of a list, returning how many were removed
    pub fn clear_list(conn: &Connection, list_id: i64) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM shopping_items WHERE list_id = ?1", [list_id])?;
        Ok(rows)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM shopping_items", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Aggregates over the items of one list. Unpriced items add nothing to
/// `total_amount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListTotals {
    pub item_count: usize,
    pub pending_count: usize,
    pub purchased_count: usize,
    pub priced_count: usize,
    pub total_amount: f64,
}

impl ListTotals {
    pub fn from_items(items: &[ShoppingItem]) -> PricingResult<Self> {
        let mut totals = ListTotals {
            item_count: items.len(),
            ..Default::default()
        };

        for item in items {
            if item.purchased {
                totals.purchased_count += 1;
            } else {
                totals.pending_count += 1;
            }
            if let Some(amount) = item.line_total()? {
                totals.priced_count += 1;
                totals.total_amount += amount;
            }
        }

        Ok(totals)
    }
}
