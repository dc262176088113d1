//! Unit normalization
//!
//! Converts a quantity into its dimension's base unit: grams become
//! kilograms, everything else is already a base unit.

use serde::{Deserialize, Serialize};

use super::error::{PricingError, PricingResult};
use super::units::Unit;

/// A quantity expressed in its dimension's base unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseQuantity {
    pub quantity: f64,
    pub unit: Unit,
}

/// Normalize a quantity to its base unit.
///
/// Rejects zero, negative and non-finite quantities so that nothing
/// downstream divides by zero.
pub fn normalize(quantity: f64, unit: Unit) -> PricingResult<BaseQuantity> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(PricingError::InvalidQuantity { quantity });
    }

    Ok(BaseQuantity {
        quantity: unit.to_base(quantity),
        unit: unit.base_unit(),
    })
}
