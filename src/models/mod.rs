//! Data models
//!
//! Rust structs representing database entities.

mod comparison_item;
mod shopping_item;
mod shopping_list;
mod unit_column;
mod user;

pub use comparison_item::{ComparisonItem, ComparisonItemCreate};
pub use shopping_item::{ListTotals, ShoppingItem, ShoppingItemCreate, ShoppingItemUpdate};
pub use shopping_list::ShoppingList;
pub use user::{User, UserCreate};
