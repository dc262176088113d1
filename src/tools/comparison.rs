//! Price Comparison MCP Tools
//!
//! A per-user basket of candidate products ranked by price per liter or
//! per kilogram, plus stateless ranking and line-total calculators.

use serde::Serialize;
use tracing::{debug, info};

use crate::db::Database;
use crate::models::{ComparisonItem, ComparisonItemCreate};
use crate::pricing::{
    best_by_dimension, format_brl, line_total, price_unit_label, rank, Dimension,
    NormalizedItem, PricedItem, PricingError, Unit,
};

use super::users::ensure_user;

/// Raw comparison candidate as supplied by a caller
#[derive(Debug, Clone)]
pub struct ComparisonInput {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
}

/// One ranked entry; `rank` starts at 1
#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub best_value: bool,
    #[serde(flatten)]
    pub item: NormalizedItem,
    /// e.g. "R$ 4,00 / L"
    pub normalized_price_display: String,
}

/// Cheapest candidate of one dimension
#[derive(Debug, Serialize)]
pub struct BestValue {
    pub dimension: Dimension,
    pub id: i64,
    pub name: String,
    pub base_unit: Unit,
    pub normalized_price: f64,
}

/// Response for rank_comparison and compare_prices
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub items: Vec<RankedEntry>,
    pub count: usize,
    pub best_by_dimension: Vec<BestValue>,
}

/// Response for clear_comparison
#[derive(Debug, Serialize)]
pub struct ClearComparisonResponse {
    pub items_removed: usize,
}

/// Response for remove_comparison_item
#[derive(Debug, Serialize)]
pub struct RemoveComparisonItemResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for calculate_line_total
#[derive(Debug, Serialize)]
pub struct LineTotalResponse {
    pub price: f64,
    pub quantity: f64,
    pub unit: Unit,
    /// Unit the price refers to (Kg for gram items)
    pub price_unit: &'static str,
    pub total: f64,
    pub total_display: String,
}

/// Validate caller input into a basket row
pub fn validate_comparison_input(input: &ComparisonInput) -> Result<ComparisonItemCreate, String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err("Product name cannot be empty".to_string());
    }
    if !input.price.is_finite() || input.price <= 0.0 {
        return Err(PricingError::InvalidPrice { price: input.price }.to_string());
    }
    if !input.quantity.is_finite() || input.quantity <= 0.0 {
        return Err(PricingError::InvalidQuantity { quantity: input.quantity }.to_string());
    }

    let unit = input.unit.parse::<Unit>().map_err(|e| e.to_string())?;
    if !unit.is_comparable() {
        return Err(format!(
            "Unit '{}' cannot be used in a price comparison (use L, Kg or g)",
            unit
        ));
    }

    Ok(ComparisonItemCreate {
        name: name.to_string(),
        price: input.price,
        quantity: input.quantity,
        unit,
    })
}

fn build_ranking(items: &[PricedItem]) -> Result<RankingResponse, String> {
    let ranked = rank(items).map_err(|e| format!("Cannot rank items: {}", e))?;

    let best_by_dimension = best_by_dimension(&ranked)
        .into_iter()
        .map(|n| BestValue {
            dimension: n.dimension(),
            id: n.item.id,
            name: n.item.name.clone(),
            base_unit: n.base_unit,
            normalized_price: n.normalized_price,
        })
        .collect();

    let items: Vec<RankedEntry> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, item)| RankedEntry {
            rank: i + 1,
            best_value: i == 0,
            normalized_price_display: format!(
                "{} / {}",
                format_brl(item.normalized_price),
                item.base_unit
            ),
            item,
        })
        .collect();
    let count = items.len();

    Ok(RankingResponse {
        items,
        count,
        best_by_dimension,
    })
}

/// Add a candidate to the user's basket
pub fn add_comparison_item(
    db: &Database,
    user_id: i64,
    input: ComparisonInput,
) -> Result<ComparisonItem, String> {
    let data = validate_comparison_input(&input)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ensure_user(&conn, user_id)?;

    let item = ComparisonItem::create(&conn, user_id, &data)
        .map_err(|e| format!("Failed to add comparison item: {}", e))?;

    debug!(user_id, item_id = item.id, "Added comparison item");
    Ok(item)
}

/// Remove one candidate from the user's basket
pub fn remove_comparison_item(
    db: &Database,
    user_id: i64,
    item_id: i64,
) -> Result<RemoveComparisonItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = ComparisonItem::delete_for_user(&conn, user_id, item_id)
        .map_err(|e| format!("Failed to remove comparison item: {}", e))?;
    if !deleted {
        return Err(format!("Comparison item not found with id: {}", item_id));
    }

    Ok(RemoveComparisonItemResponse {
        success: true,
        deleted_id: item_id,
    })
}

/// Empty the user's basket
pub fn clear_comparison(db: &Database, user_id: i64) -> Result<ClearComparisonResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ensure_user(&conn, user_id)?;

    let items_removed = ComparisonItem::clear_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to clear comparison: {}", e))?;

    info!(user_id, items_removed, "Cleared comparison basket");
    Ok(ClearComparisonResponse { items_removed })
}

/// Rank the user's basket, best value first
pub fn rank_comparison(db: &Database, user_id: i64) -> Result<RankingResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ensure_user(&conn, user_id)?;

    let items = ComparisonItem::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to load comparison items: {}", e))?;
    let priced: Vec<PricedItem> = items.iter().map(ComparisonItem::to_priced).collect();

    build_ranking(&priced)
}

/// Rank inline candidates without storing them. Ids are input positions
/// starting at 1.
pub fn compare_prices(inputs: &[ComparisonInput]) -> Result<RankingResponse, String> {
    let priced = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| -> Result<PricedItem, String> {
            let data = validate_comparison_input(input)
                .map_err(|e| format!("Item {}: {}", i + 1, e))?;
            Ok(PricedItem {
                id: i as i64 + 1,
                name: data.name,
                price: data.price,
                quantity: data.quantity,
                unit: data.unit,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    build_ranking(&priced)
}

/// Total for one shopping-list line (gram prices are per kilogram)
pub fn calculate_line_total(price: f64, quantity: f64, unit: &str) -> Result<LineTotalResponse, String> {
    let unit = unit.parse::<Unit>().map_err(|e| e.to_string())?;
    let total = line_total(price, quantity, unit).map_err(|e| e.to_string())?;

    Ok(LineTotalResponse {
        price,
        quantity,
        unit,
        price_unit: price_unit_label(unit),
        total,
        total_display: format_brl(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::tools::users::register_user;

    fn input(name: &str, price: f64, quantity: f64, unit: &str) -> ComparisonInput {
        ComparisonInput {
            name: name.to_string(),
            price,
            quantity,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_counted_items() {
        let err = validate_comparison_input(&input("Ovos", 12.0, 12.0, "un")).unwrap_err();
        assert!(err.contains("cannot be used"));
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        assert!(validate_comparison_input(&input("Leite", 0.0, 1.0, "L")).is_err());
        assert!(validate_comparison_input(&input("Leite", 4.0, 0.0, "L")).is_err());
        assert!(validate_comparison_input(&input("", 4.0, 1.0, "L")).is_err());
        assert!(validate_comparison_input(&input("Leite", 4.0, 1.0, "gal")).is_err());
    }

    #[test]
    fn test_compare_prices_orders_best_first() {
        let inputs = vec![input("Leite 1L", 4.0, 1.0, "L"), input("Leite 500ml", 3.0, 0.5, "L")];
        let response = compare_prices(&inputs).unwrap();

        assert_eq!(response.count, 2);
        assert_eq!(response.items[0].item.item.name, "Leite 1L");
        assert!(response.items[0].best_value);
        assert!(!response.items[1].best_value);
        assert_eq!(response.items[1].rank, 2);
        assert!((response.items[1].item.normalized_price - 6.0).abs() < 1e-9);
        assert_eq!(response.items[0].normalized_price_display, "R$ 4,00 / L");
    }

    #[test]
    fn test_compare_prices_empty() {
        let response = compare_prices(&[]).unwrap();
        assert_eq!(response.count, 0);
        assert!(response.best_by_dimension.is_empty());
    }

    #[test]
    fn test_compare_prices_reports_offending_item() {
        let inputs = vec![input("Arroz", 25.0, 5.0, "Kg"), input("Feijão", 8.0, -1.0, "Kg")];
        let err = compare_prices(&inputs).unwrap_err();
        assert!(err.starts_with("Item 2:"));
    }

    #[test]
    fn test_basket_round_trip() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "mara@example.com", None).unwrap();

        let a = add_comparison_item(&db, user.id, input("Café 500g", 20.0, 500.0, "g")).unwrap();
        let b = add_comparison_item(&db, user.id, input("Café 1Kg", 36.0, 1.0, "Kg")).unwrap();
        add_comparison_item(&db, user.id, input("Suco 1L", 9.0, 1.0, "L")).unwrap();

        let ranking = rank_comparison(&db, user.id).unwrap();
        let ids: Vec<i64> = ranking.items.iter().map(|e| e.item.item.id).collect();
        // 9/L, 36/Kg, 40/Kg
        assert_eq!(ids[1], b.id);
        assert_eq!(ids[2], a.id);
        assert_eq!(ranking.best_by_dimension.len(), 2);
        assert_eq!(ranking.best_by_dimension[1].id, b.id);

        remove_comparison_item(&db, user.id, a.id).unwrap();
        assert_eq!(rank_comparison(&db, user.id).unwrap().count, 2);
        assert!(remove_comparison_item(&db, user.id, a.id).is_err());

        assert_eq!(clear_comparison(&db, user.id).unwrap().items_removed, 2);
        assert_eq!(rank_comparison(&db, user.id).unwrap().count, 0);
    }

    #[test]
    fn test_basket_is_scoped_by_user() {
        let (_dir, db) = test_database();
        let owner = register_user(&db, "nina@example.com", None).unwrap();
        let other = register_user(&db, "otto@example.com", None).unwrap();

        let item = add_comparison_item(&db, owner.id, input("Azeite", 30.0, 0.5, "L")).unwrap();

        assert_eq!(rank_comparison(&db, other.id).unwrap().count, 0);
        assert!(remove_comparison_item(&db, other.id, item.id).is_err());
        assert!(add_comparison_item(&db, 999, input("Azeite", 30.0, 0.5, "L")).is_err());
    }

    #[test]
    fn test_calculate_line_total() {
        let response = calculate_line_total(10.0, 500.0, "g").unwrap();
        assert!((response.total - 5.0).abs() < 1e-9);
        assert_eq!(response.price_unit, "Kg");
        assert_eq!(response.total_display, "R$ 5,00");

        let response = calculate_line_total(3.5, 2.0, "L").unwrap();
        assert!((response.total - 7.0).abs() < 1e-9);

        assert!(calculate_line_total(3.5, 2.0, "cup").is_err());
        assert!(calculate_line_total(3.5, 0.0, "L").is_err());
    }
}
