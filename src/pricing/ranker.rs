//! Best-value ranking
//!
//! Computes the price per base unit (per liter, per kilogram, per item) of
//! each candidate and orders candidates from best to worst value.

use serde::{Deserialize, Serialize};

use super::error::{PricingError, PricingResult};
use super::normalizer::normalize;
use super::units::{Dimension, Unit};

/// A candidate product with its shelf price and package size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: Unit,
}

/// A priced item with its derived per-base-unit price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedItem {
    #[serde(flatten)]
    pub item: PricedItem,
    pub base_unit: Unit,
    pub normalized_quantity: f64,
    pub normalized_price: f64,
    /// Same value as `normalized_price`; older consumers read this name
    pub price_per_base_unit: f64,
}

impl NormalizedItem {
    pub fn dimension(&self) -> Dimension {
        self.base_unit.dimension()
    }
}

/// Derive the normalized quantity and price of a single item
pub fn normalize_item(item: &PricedItem) -> PricingResult<NormalizedItem> {
    if !item.price.is_finite() || item.price <= 0.0 {
        return Err(PricingError::InvalidPrice { price: item.price });
    }

    let base = normalize(item.quantity, item.unit)?;
    let normalized_price = item.price / base.quantity;

    // A subnormal quantity can still overflow the division
    if !normalized_price.is_finite() {
        return Err(PricingError::InvalidQuantity { quantity: item.quantity });
    }

    Ok(NormalizedItem {
        item: item.clone(),
        base_unit: base.unit,
        normalized_quantity: base.quantity,
        normalized_price,
        price_per_base_unit: normalized_price,
    })
}

/// Rank items by normalized price, best value first.
///
/// The sort is stable: items with equal normalized prices keep their input
/// order. Fails on the first item with an invalid quantity or price.
pub fn rank(items: &[PricedItem]) -> PricingResult<Vec<NormalizedItem>> {
    let mut normalized = items
        .iter()
        .map(normalize_item)
        .collect::<PricingResult<Vec<_>>>()?;

    normalized.sort_by(|a, b| a.normalized_price.total_cmp(&b.normalized_price));

    Ok(normalized)
}

/// The best item of each dimension present in an already ranked sequence,
/// in ranking order
pub fn best_by_dimension(ranked: &[NormalizedItem]) -> Vec<&NormalizedItem> {
    let mut seen: Vec<Dimension> = Vec::with_capacity(3);
    let mut best = Vec::new();

    for item in ranked {
        let dimension = item.dimension();
        if !seen.contains(&dimension) {
            seen.push(dimension);
            best.push(item);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, price: f64, quantity: f64, unit: Unit) -> PricedItem {
        PricedItem {
            id,
            name: format!("item {}", id),
            price,
            quantity,
            unit,
        }
    }

    #[test]
    fn test_rank_empty() {
        assert_eq!(rank(&[]).unwrap(), Vec::new());
    }

    #[test]
    fn test_rank_liters() {
        let items = vec![item(1, 4.0, 1.0, Unit::Liter), item(2, 3.0, 0.5, Unit::Liter)];
        let ranked = rank(&items).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.id, 1);
        assert_eq!(ranked[1].item.id, 2);
        assert!((ranked[0].normalized_price - 4.0).abs() < 1e-9);
        assert!((ranked[1].normalized_price - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_grams_against_kilograms() {
        // 500g for 5.00 is 10/Kg, 1Kg for 9.00 is 9/Kg
        let items = vec![item(1, 5.0, 500.0, Unit::Gram), item(2, 9.0, 1.0, Unit::Kilogram)];
        let ranked = rank(&items).unwrap();

        assert_eq!(ranked[0].item.id, 2);
        assert_eq!(ranked[1].item.id, 1);
        assert_eq!(ranked[1].base_unit, Unit::Kilogram);
        assert!((ranked[1].normalized_quantity - 0.5).abs() < 1e-9);
        assert!((ranked[1].normalized_price - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let items = vec![
            item(1, 2.0, 1.0, Unit::Liter),
            item(2, 1.0, 1.0, Unit::Liter),
            item(3, 2.0, 1.0, Unit::Liter),
            item(4, 2.0, 1000.0, Unit::Gram),
            item(5, 2.0, 1.0, Unit::Liter),
        ];
        let ranked = rank(&items).unwrap();
        let ids: Vec<i64> = ranked.iter().map(|n| n.item.id).collect();

        assert_eq!(ids, vec![2, 1, 3, 4, 5]);
    }

    #[test]
    fn test_rank_gram_and_kilogram_twins_keep_input_order() {
        let items = vec![item(1, 9.0, 0.009, Unit::Kilogram), item(2, 9.0, 9.0, Unit::Gram)];
        let ranked = rank(&items).unwrap();
        let ids: Vec<i64> = ranked.iter().map(|n| n.item.id).collect();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(ranked[0].normalized_price, ranked[1].normalized_price);

        let reversed = vec![item(1, 9.0, 9.0, Unit::Gram), item(2, 9.0, 0.009, Unit::Kilogram)];
        let ids: Vec<i64> = rank(&reversed).unwrap().iter().map(|n| n.item.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_rank_output_is_sorted_and_length_preserving() {
        let items = vec![
            item(1, 12.9, 2.0, Unit::Liter),
            item(2, 3.49, 350.0, Unit::Gram),
            item(3, 21.0, 5.0, Unit::Kilogram),
            item(4, 0.99, 90.0, Unit::Gram),
            item(5, 7.5, 0.9, Unit::Liter),
        ];
        let ranked = rank(&items).unwrap();

        assert_eq!(ranked.len(), items.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].normalized_price <= pair[1].normalized_price);
        }
        for n in &ranked {
            assert_eq!(n.normalized_price, n.price_per_base_unit);
        }
    }

    #[test]
    fn test_rank_rejects_zero_quantity() {
        let items = vec![item(1, 4.0, 1.0, Unit::Liter), item(2, 3.0, 0.0, Unit::Liter)];
        assert_eq!(
            rank(&items),
            Err(PricingError::InvalidQuantity { quantity: 0.0 })
        );
    }

    #[test]
    fn test_rank_rejects_invalid_price() {
        let items = vec![item(1, 0.0, 1.0, Unit::Liter)];
        assert_eq!(rank(&items), Err(PricingError::InvalidPrice { price: 0.0 }));

        let items = vec![item(1, f64::INFINITY, 1.0, Unit::Liter)];
        assert!(rank(&items).is_err());
    }

    #[test]
    fn test_rank_never_yields_non_finite_prices() {
        let items = vec![item(1, 1.0e300, 1.0e-300, Unit::Gram)];
        assert!(matches!(
            rank(&items),
            Err(PricingError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_best_by_dimension() {
        let items = vec![
            item(1, 8.0, 1.0, Unit::Liter),
            item(2, 5.0, 500.0, Unit::Gram),
            item(3, 6.0, 1.0, Unit::Liter),
            item(4, 20.0, 1.0, Unit::Kilogram),
        ];
        let ranked = rank(&items).unwrap();
        let best = best_by_dimension(&ranked);
        let ids: Vec<i64> = best.iter().map(|n| n.item.id).collect();

        // ranked: 3 (6/L), 1 (8/L), 2 (10/Kg), 4 (20/Kg)
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(best[0].dimension(), Dimension::Volume);
        assert_eq!(best[1].dimension(), Dimension::Mass);
    }

    #[test]
    fn test_normalized_item_serializes_flat() {
        let normalized = normalize_item(&item(7, 3.0, 0.5, Unit::Liter)).unwrap();
        let value = serde_json::to_value(&normalized).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["unit"], "L");
        assert_eq!(value["base_unit"], "L");
        assert_eq!(value["normalized_price"], value["price_per_base_unit"]);
    }
}
