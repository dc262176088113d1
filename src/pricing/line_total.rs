//! Shopping-list line totals
//!
//! Prices of gram items are entered per kilogram, so a gram line is
//! charged for `quantity / 1000` kilograms. Every other unit is charged
//! per unit of itself.

use super::error::{PricingError, PricingResult};
use super::units::{Unit, GRAMS_PER_KILOGRAM};

/// Monetary total of one shopping-list line. No rounding is applied.
pub fn line_total(price: f64, quantity: f64, unit: Unit) -> PricingResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PricingError::InvalidPrice { price });
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(PricingError::InvalidQuantity { quantity });
    }

    let total = match unit {
        Unit::Gram => price * (quantity / GRAMS_PER_KILOGRAM),
        Unit::Kilogram | Unit::Liter | Unit::Count => price * quantity,
    };

    // Finite inputs can still overflow the product
    if !total.is_finite() {
        return Err(PricingError::InvalidQuantity { quantity });
    }

    Ok(total)
}
