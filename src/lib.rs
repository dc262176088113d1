//! Cartwise Library
//!
//! Shopping lists and unit-price comparison: pricing core, SQLite storage
//! and the MCP tool surface.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod pricing;
pub mod tools;
