//! Cartwise Tools module
//!
//! Tool implementations behind the MCP server. Each returns a serializable
//! response or a message describing why the request was rejected.

pub mod comparison;
pub mod items;
pub mod lists;
pub mod status;
pub mod users;
