//! Pricing module
//!
//! Unit normalization, best-value ranking and shopping-list line totals.
//! Everything here is pure: no I/O, no shared state.

pub mod error;
pub mod labels;
pub mod line_total;
pub mod normalizer;
pub mod ranker;
pub mod units;

pub use error::{PricingError, PricingResult};
pub use labels::{format_brl, price_label, price_unit_label};
pub use line_total::line_total;
pub use normalizer::{normalize, BaseQuantity};
pub use ranker::{best_by_dimension, normalize_item, rank, NormalizedItem, PricedItem};
pub use units::{Dimension, Unit, GRAMS_PER_KILOGRAM};
