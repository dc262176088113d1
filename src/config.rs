//! Runtime configuration
//!
//! Read from the environment at startup:
//! - `CARTWISE_DATABASE_PATH`: SQLite file (default `<project>/data/cartwise.db`)
//! - `CARTWISE_POOL_SIZE`: connection pool size (default 10)
//! - `RUST_LOG`: log filter (default `cartwise=info`)

use std::path::PathBuf;

pub const DATABASE_PATH_VAR: &str = "CARTWISE_DATABASE_PATH";
pub const POOL_SIZE_VAR: &str = "CARTWISE_POOL_SIZE";
pub const DEFAULT_LOG_DIRECTIVE: &str = "cartwise=info";
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let pool_size = std::env::var(POOL_SIZE_VAR)
            .ok()
            .and_then(|v| parse_pool_size(&v))
            .unwrap_or(DEFAULT_POOL_SIZE);

        Self {
            database_path,
            pool_size,
        }
    }
}

fn parse_pool_size(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// `data/cartwise.db` next to the project root, stepping out of
/// `target/release` or `target/debug` when run from a cargo build
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("cartwise.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pool_size() {
        assert_eq!(parse_pool_size("4"), Some(4));
        assert_eq!(parse_pool_size(" 16 "), Some(16));
        assert_eq!(parse_pool_size("0"), None);
        assert_eq!(parse_pool_size("many"), None);
    }

    #[test]
    fn test_default_database_path_file_name() {
        let path = default_database_path();
        assert!(path.ends_with("data/cartwise.db"));
    }
}
