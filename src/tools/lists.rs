//! Shopping List MCP Tools
//!
//! Creating, reading, renaming, clearing and deleting a user's lists.
//! Every call is scoped by `user_id`; lists of other users read as missing.

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{ListTotals, ShoppingItem, ShoppingList, User};
use crate::pricing::format_brl;

use super::items::{validate_new_item, NewItemInput, ShoppingItemView};
use super::users::ensure_user;

/// Summary of a list for overview results
#[derive(Debug, Serialize)]
pub struct ListSummary {
    pub id: i64,
    pub title: String,
    pub item_count: usize,
    pub pending_count: usize,
    pub total_amount: f64,
    pub total_display: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Full list with items and totals
#[derive(Debug, Serialize)]
pub struct ListDetail {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub items: Vec<ShoppingItemView>,
    pub totals: ListTotals,
    pub total_display: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Response for list_lists
#[derive(Debug, Serialize)]
pub struct ListListsResponse {
    pub lists: Vec<ListSummary>,
    pub count: usize,
}

/// Response for delete_list
#[derive(Debug, Serialize)]
pub struct DeleteListResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for clear_list
#[derive(Debug, Serialize)]
pub struct ClearListResponse {
    pub list_id: i64,
    pub items_removed: usize,
}

fn load_totals(conn: &Connection, list_id: i64) -> Result<(Vec<ShoppingItem>, ListTotals), String> {
    let items = ShoppingItem::list_for_list(conn, list_id)
        .map_err(|e| format!("Failed to load items: {}", e))?;
    let totals = ListTotals::from_items(&items)
        .map_err(|e| format!("Invalid stored values in list {}: {}", list_id, e))?;
    Ok((items, totals))
}

fn build_summary(conn: &Connection, list: ShoppingList) -> Result<ListSummary, String> {
    let (_, totals) = load_totals(conn, list.id)?;

    Ok(ListSummary {
        id: list.id,
        title: list.title,
        item_count: totals.item_count,
        pending_count: totals.pending_count,
        total_amount: totals.total_amount,
        total_display: format_brl(totals.total_amount),
        created_at: list.created_at,
        updated_at: list.updated_at,
    })
}

fn build_detail(conn: &Connection, list: ShoppingList) -> Result<ListDetail, String> {
    let (items, totals) = load_totals(conn, list.id)?;
    let items = items
        .into_iter()
        .map(ShoppingItemView::from_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListDetail {
        id: list.id,
        user_id: list.user_id,
        title: list.title,
        items,
        total_display: format_brl(totals.total_amount),
        totals,
        created_at: list.created_at,
        updated_at: list.updated_at,
    })
}

/// Create a list, optionally with initial items
pub fn create_list(
    db: &Database,
    user_id: i64,
    title: &str,
    items: Vec<NewItemInput>,
) -> Result<ListDetail, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("List title cannot be empty".to_string());
    }

    let items = items
        .iter()
        .map(validate_new_item)
        .collect::<Result<Vec<_>, _>>()?;

    let created = db
        .with_conn_mut(|conn| {
            if !User::exists(conn, user_id)? {
                return Ok(None);
            }

            let tx = conn.transaction()?;
            let list = ShoppingList::create(&tx, user_id, title)?;
            for item in &items {
                ShoppingItem::create(&tx, list.id, item)?;
            }
            tx.commit()?;

            Ok(Some(list))
        })
        .map_err(|e| format!("Failed to create list: {}", e))?;

    let list = created.ok_or_else(|| format!("User not found with id: {}", user_id))?;
    info!(user_id, list_id = list.id, items = items.len(), "Created shopping list");

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    build_detail(&conn, list)
}

/// All lists of a user with their totals
pub fn list_lists(db: &Database, user_id: i64) -> Result<ListListsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ensure_user(&conn, user_id)?;

    let lists = ShoppingList::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list shopping lists: {}", e))?;

    let summaries = lists
        .into_iter()
        .map(|list| build_summary(&conn, list))
        .collect::<Result<Vec<_>, _>>()?;
    let count = summaries.len();

    Ok(ListListsResponse {
        lists: summaries,
        count,
    })
}

/// Get a list with its items, or None if the user has no such list
pub fn get_list(db: &Database, user_id: i64, list_id: i64) -> Result<Option<ListDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = ShoppingList::get_for_user(&conn, user_id, list_id)
        .map_err(|e| format!("Failed to get shopping list: {}", e))?;

    list.map(|list| build_detail(&conn, list)).transpose()
}

/// Rename a list. An empty title keeps the current one.
pub fn rename_list(
    db: &Database,
    user_id: i64,
    list_id: i64,
    title: &str,
) -> Result<ListSummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = ShoppingList::get_for_user(&conn, user_id, list_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Shopping list not found with id: {}", list_id))?;

    let title = title.trim();
    let list = if title.is_empty() {
        list
    } else {
        ShoppingList::rename(&conn, list.id, title)
            .map_err(|e| format!("Failed to rename list: {}", e))?
            .ok_or_else(|| format!("Shopping list not found with id: {}", list_id))?
    };

    build_summary(&conn, list)
}

/// Delete a list and all of its items
pub fn delete_list(db: &Database, user_id: i64, list_id: i64) -> Result<DeleteListResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = ShoppingList::get_for_user(&conn, user_id, list_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Shopping list not found with id: {}", list_id))?;

    ShoppingList::delete(&conn, list.id).map_err(|e| format!("Failed to delete list: {}", e))?;
    info!(user_id, list_id, "Deleted shopping list");

    Ok(DeleteListResponse {
        success: true,
        deleted_id: list.id,
    })
}

/// Remove every item from a list, keeping the list itself
pub fn clear_list(db: &Database, user_id: i64, list_id: i64) -> Result<ClearListResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = ShoppingList::get_for_user(&conn, user_id, list_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Shopping list not found with id: {}", list_id))?;

    let items_removed = ShoppingItem::clear_list(&conn, list.id)
        .map_err(|e| format!("Failed to clear list: {}", e))?;
    ShoppingList::touch(&conn, list.id).map_err(|e| format!("Database error: {}", e))?;

    Ok(ClearListResponse {
        list_id: list.id,
        items_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::tools::items::{add_item, toggle_purchased};
    use crate::tools::users::register_user;

    fn input(name: &str, quantity: f64, unit: &str, price: Option<f64>) -> NewItemInput {
        NewItemInput {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            price,
        }
    }

    #[test]
    fn test_create_list_with_items() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "fabio@example.com", None).unwrap();

        let items = vec![
            input("Queijo", 500.0, "g", Some(10.0)),
            input("Leite", 2.0, "L", Some(3.5)),
            input("Ovos", 12.0, "un", None),
        ];
        let detail = create_list(&db, user.id, " Mercado ", items).unwrap();

        assert_eq!(detail.title, "Mercado");
        assert_eq!(detail.items.len(), 3);
        assert_eq!(detail.items[0].name, "Queijo");
        assert_eq!(detail.totals.pending_count, 3);
        assert_eq!(detail.totals.priced_count, 2);
        assert!((detail.totals.total_amount - 12.0).abs() < 1e-9);
        assert_eq!(detail.total_display, "R$ 12,00");
    }

    #[test]
    fn test_create_list_validation() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "gabi@example.com", None).unwrap();

        assert!(create_list(&db, user.id, "   ", Vec::new()).is_err());
        assert!(create_list(&db, user.id + 100, "Feira", Vec::new()).is_err());

        // One bad item rejects the whole list
        let items = vec![input("Arroz", 5.0, "Kg", None), input("Água", 0.0, "L", None)];
        assert!(create_list(&db, user.id, "Feira", items).is_err());
        assert_eq!(list_lists(&db, user.id).unwrap().count, 0);
    }

    #[test]
    fn test_list_lists_summaries() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "hugo@example.com", None).unwrap();

        let first = create_list(&db, user.id, "Semana", Vec::new()).unwrap();
        create_list(&db, user.id, "Churrasco", vec![input("Carvão", 1.0, "un", Some(25.0))]).unwrap();

        let item = add_item(&db, user.id, first.id, input("Café", 500.0, "g", Some(40.0))).unwrap();
        toggle_purchased(&db, user.id, item.id).unwrap();

        let response = list_lists(&db, user.id).unwrap();
        assert_eq!(response.count, 2);
        assert_eq!(response.lists[0].title, "Semana");
        assert_eq!(response.lists[0].pending_count, 0);
        assert!((response.lists[0].total_amount - 20.0).abs() < 1e-9);
        assert_eq!(response.lists[1].total_display, "R$ 25,00");
    }

    #[test]
    fn test_lists_are_scoped_by_user() {
        let (_dir, db) = test_database();
        let owner = register_user(&db, "ines@example.com", None).unwrap();
        let other = register_user(&db, "joao@example.com", None).unwrap();
        let list = create_list(&db, owner.id, "Privada", Vec::new()).unwrap();

        assert!(get_list(&db, other.id, list.id).unwrap().is_none());
        assert!(rename_list(&db, other.id, list.id, "Minha").is_err());
        assert!(clear_list(&db, other.id, list.id).is_err());
        assert!(delete_list(&db, other.id, list.id).is_err());
        assert!(get_list(&db, owner.id, list.id).unwrap().is_some());
    }

    #[test]
    fn test_rename_keeps_title_when_empty() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "karla@example.com", None).unwrap();
        let list = create_list(&db, user.id, "Antiga", Vec::new()).unwrap();

        assert_eq!(rename_list(&db, user.id, list.id, "").unwrap().title, "Antiga");
        assert_eq!(rename_list(&db, user.id, list.id, "Nova").unwrap().title, "Nova");
    }

    #[test]
    fn test_clear_and_delete() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "leo@example.com", None).unwrap();
        let items = vec![input("Sal", 1.0, "Kg", Some(3.0)), input("Óleo", 0.9, "L", Some(8.0))];
        let list = create_list(&db, user.id, "Despensa", items).unwrap();

        let cleared = clear_list(&db, user.id, list.id).unwrap();
        assert_eq!(cleared.items_removed, 2);
        let detail = get_list(&db, user.id, list.id).unwrap().unwrap();
        assert!(detail.items.is_empty());
        assert_eq!(detail.totals.total_amount, 0.0);

        assert!(delete_list(&db, user.id, list.id).unwrap().success);
        assert!(get_list(&db, user.id, list.id).unwrap().is_none());
    }
}
