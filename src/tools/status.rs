//! Cartwise Status Tool
//!
//! Runtime status of the service and the usage guide served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database, DbResult};
use crate::models::{ComparisonItem, ShoppingItem, ShoppingList, User};

/// Usage guide for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# Cartwise Usage Instructions

Cartwise keeps shopping lists and compares unit prices of products.

## Identity

Every list and comparison tool takes a `user_id`.
1. `register_user` with an email once; keep the returned `id`.
2. `find_user_by_email` when the id is not known.

## Units

| Tag  | Meaning   | Shopping lists | Price comparison |
|------|-----------|----------------|------------------|
| `L`  | liters    | yes            | yes              |
| `Kg` | kilograms | yes            | yes              |
| `g`  | grams     | yes            | yes              |
| `un` | units     | yes            | **no**           |

## CRITICAL: gram prices are per kilogram

On a shopping list, an item in grams is priced **per Kg**.
- 500 g of cheese at R$ 10,00/Kg -> `quantity: 500, unit: "g", price: 10` -> line total R$ 5,00
- Never enter the price of the 500 g package for a gram item; enter its price per Kg,
  or record the item as `quantity: 1, unit: "un"` with the package price.

Every other unit is priced per unit of itself (per liter, per Kg, per item).

## Shopping lists

- `create_list` (optionally with items), `list_lists`, `get_list`
- `rename_list` (empty title keeps the old one), `clear_list`, `delete_list`
- `add_item`, `update_item`, `remove_item`, `toggle_purchased`
- A price of 0 (or none) means "no price": the item adds nothing to the total.
- `update_item` with `price: 0` removes an item's price.

## Price comparison

- `add_comparison_item` with the shelf price and package size (e.g. R$ 3,00 for 0.5 L).
- `rank_comparison` lists the basket best value first (price per L or per Kg).
  Liters and kilograms are ranked together; `best_by_dimension` gives the winner of each.
- `remove_comparison_item`, `clear_comparison`
- `compare_prices` ranks inline items without saving them.
- `calculate_line_total` computes a single line total.
"#;

/// Row counts for the status report
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub schema_version: i32,
    pub users: i64,
    pub shopping_lists: i64,
    pub shopping_items: i64,
    pub comparison_items: i64,
}

impl DatabaseStats {
    pub fn collect(db: &Database) -> DbResult<Self> {
        db.with_conn(|conn| {
            Ok(Self {
                schema_version: migrations::get_schema_version(conn)?,
                users: User::count(conn)?,
                shopping_lists: ShoppingList::count(conn)?,
                shopping_items: ShoppingItem::count(conn)?,
                comparison_items: ComparisonItem::count(conn)?,
            })
        })
    }
}

/// Runtime status of the Cartwise service
#[derive(Debug, Clone, Serialize)]
pub struct CartwiseStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    /// None when the database could not be queried
    pub database_stats: Option<DatabaseStats>,

    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            database_path,
        }
    }

    pub fn get_status(&self, db: &Database) -> CartwiseStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let database_stats = match DatabaseStats::collect(db) {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("Could not collect database stats: {}", e);
                None
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CartwiseStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            database_stats,
            started_at: self.started_at,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::tools::lists::create_list;
    use crate::tools::users::register_user;

    #[test]
    fn test_database_stats() {
        let (_dir, db) = test_database();
        let user = register_user(&db, "pedro@example.com", None).unwrap();
        create_list(&db, user.id, "Feira", Vec::new()).unwrap();

        let stats = DatabaseStats::collect(&db).unwrap();
        assert_eq!(stats.schema_version, 1);
        assert_eq!(stats.users, 1);
        assert_eq!(stats.shopping_lists, 1);
        assert_eq!(stats.shopping_items, 0);
        assert_eq!(stats.comparison_items, 0);
    }

    #[test]
    fn test_status_reports_database() {
        let (dir, db) = test_database();
        let tracker = StatusTracker::new(dir.path().join("test.db"));

        let status = tracker.get_status(&db);
        assert!(status.database_size_bytes.is_some());
        assert!(status.database_stats.is_some());
        assert_eq!(status.process_id, std::process::id());
    }
}
