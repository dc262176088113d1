//! Pricing error types

use thiserror::Error;

/// Errors raised by the pricing core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("quantity must be a positive number, got {quantity}")]
    InvalidQuantity { quantity: f64 },

    #[error("price must be a positive number, got {price}")]
    InvalidPrice { price: f64 },

    #[error("unrecognized unit '{0}' (expected one of: L, Kg, g, un)")]
    UnrecognizedUnit(String),
}

pub type PricingResult<T> = Result<T, PricingError>;
