//! Shopping Item MCP Tools
//!
//! Adding, editing, removing and checking off items of a shopping list.

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::Database;
use crate::models::{ShoppingItem, ShoppingItemCreate, ShoppingItemUpdate, ShoppingList};
use crate::pricing::{format_brl, price_unit_label, PricingError, Unit};

/// Raw item fields as supplied by a caller
#[derive(Debug, Clone)]
pub struct NewItemInput {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub price: Option<f64>,
}

/// Partial edit of an item. A supplied price <= 0 clears the price.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub purchased: Option<bool>,
}

/// An item with its derived line total
#[derive(Debug, Serialize)]
pub struct ShoppingItemView {
    pub id: i64,
    pub list_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub price: Option<f64>,
    /// Unit the price refers to (Kg for gram items)
    pub price_unit: &'static str,
    pub purchased: bool,
    pub line_total: Option<f64>,
    pub line_total_display: Option<String>,
}

impl ShoppingItemView {
    pub fn from_item(item: ShoppingItem) -> Result<Self, String> {
        let line_total = item.line_total().map_err(|e| {
            format!("Invalid stored values for item {}: {}", item.id, e)
        })?;

        Ok(Self {
            id: item.id,
            list_id: item.list_id,
            price_unit: price_unit_label(item.unit),
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            price: item.price,
            purchased: item.purchased,
            line_total,
            line_total_display: line_total.map(format_brl),
        })
    }
}

/// Response for remove_item
#[derive(Debug, Serialize)]
pub struct RemoveItemResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Item name cannot be empty".to_string());
    }
    Ok(name.to_string())
}

fn validate_quantity(quantity: f64) -> Result<f64, String> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(PricingError::InvalidQuantity { quantity }.to_string());
    }
    Ok(quantity)
}

fn parse_unit(unit: &str) -> Result<Unit, String> {
    unit.parse::<Unit>().map_err(|e| e.to_string())
}

/// Prices that are missing, zero, negative or not finite mean "no price"
fn effective_price(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p > 0.0)
}

/// Validate caller input into a row ready for insertion
pub fn validate_new_item(input: &NewItemInput) -> Result<ShoppingItemCreate, String> {
    Ok(ShoppingItemCreate {
        name: validate_name(&input.name)?,
        quantity: validate_quantity(input.quantity)?,
        unit: parse_unit(&input.unit)?,
        price: effective_price(input.price),
    })
}

fn owned_list(conn: &Connection, user_id: i64, list_id: i64) -> Result<ShoppingList, String> {
    ShoppingList::get_for_user(conn, user_id, list_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Shopping list not found with id: {}", list_id))
}

fn owned_item(conn: &Connection, user_id: i64, item_id: i64) -> Result<ShoppingItem, String> {
    ShoppingItem::get_for_user(conn, user_id, item_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Shopping item not found with id: {}", item_id))
}

/// Add an item to one of the user's lists
pub fn add_item(
    db: &Database,
    user_id: i64,
    list_id: i64,
    input: NewItemInput,
) -> Result<ShoppingItemView, String> {
    let data = validate_new_item(&input).map_err(|e| {
        warn!(user_id, list_id, error = %e, "Rejected new item");
        e
    })?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let list = owned_list(&conn, user_id, list_id)?;

    let item = ShoppingItem::create(&conn, list.id, &data)
        .map_err(|e| format!("Failed to add item: {}", e))?;
    ShoppingList::touch(&conn, list.id).map_err(|e| format!("Database error: {}", e))?;

    debug!(list_id = list.id, item_id = item.id, "Added item");
    ShoppingItemView::from_item(item)
}

/// Apply a partial edit to an item
pub fn update_item(
    db: &Database,
    user_id: i64,
    item_id: i64,
    changes: ItemChanges,
) -> Result<ShoppingItemView, String> {
    let update = ShoppingItemUpdate {
        name: changes.name.as_deref().map(validate_name).transpose()?,
        quantity: changes.quantity.map(validate_quantity).transpose()?,
        unit: changes.unit.as_deref().map(parse_unit).transpose()?,
        price: changes.price.map(|p| effective_price(Some(p))),
        purchased: changes.purchased,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = owned_item(&conn, user_id, item_id)?;

    let updated = ShoppingItem::update(&conn, item.id, &update)
        .map_err(|e| format!("Failed to update item: {}", e))?
        .ok_or_else(|| format!("Shopping item not found with id: {}", item_id))?;
    ShoppingList::touch(&conn, updated.list_id).map_err(|e| format!("Database error: {}", e))?;

    ShoppingItemView::from_item(updated)
}

/// Remove an item from its list
pub fn remove_item(db: &Database, user_id: i64, item_id: i64) -> Result<RemoveItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = owned_item(&conn, user_id, item_id)?;

    ShoppingItem::delete(&conn, item.id).map_err(|e| format!("Failed to remove item: {}", e))?;
    ShoppingList::touch(&conn, item.list_id).map_err(|e| format!("Database error: {}", e))?;

    Ok(RemoveItemResponse {
        success: true,
        deleted_id: item.id,
    })
}

/// Flip an item's purchased flag
pub fn toggle_purchased(db: &Database, user_id: i64, item_id: i64) -> Result<ShoppingItemView, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = owned_item(&conn, user_id, item_id)?;

    let toggled = ShoppingItem::toggle_purchased(&conn, item.id)
        .map_err(|e| format!("Failed to toggle item: {}", e))?
        .ok_or_else(|| format!("Shopping item not found with id: {}", item_id))?;
    ShoppingList::touch(&conn, toggled.list_id).map_err(|e| format!("Database error: {}", e))?;

    ShoppingItemView::from_item(toggled)
}
