//! Cartwise MCP Server Implementation

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::db::Database;
use crate::tools::comparison::{self, ComparisonInput};
use crate::tools::items::{self, ItemChanges, NewItemInput};
use crate::tools::lists;
use crate::tools::status::StatusTracker;
use crate::tools::users;

/// Cartwise MCP Service
#[derive(Clone)]
pub struct CartwiseService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<CartwiseService>,
}

impl CartwiseService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(kind: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        kind, id
    ))]))
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterUserParams {
    /// Email address (case-insensitive, must be unique)
    pub email: String,
    /// Optional name to show
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUserParams {
    /// User ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindUserParams {
    /// Email address
    pub email: String,
}

// ============================================================================
// Shopping List Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ItemParam {
    /// Product name
    pub name: String,
    /// Quantity in the given unit (must be > 0)
    pub quantity: f64,
    /// Unit: L, Kg, g, un
    pub unit: String,
    /// Price per unit; for g items the price is per Kg. Omit or 0 for no price.
    pub price: Option<f64>,
}

impl From<ItemParam> for NewItemInput {
    fn from(p: ItemParam) -> Self {
        NewItemInput {
            name: p.name,
            quantity: p.quantity,
            unit: p.unit,
            price: p.price,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateListParams {
    /// Owner user ID
    pub user_id: i64,
    /// List title
    pub title: String,
    /// Initial items (optional)
    #[serde(default)]
    pub items: Vec<ItemParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserScopeParams {
    /// Owner user ID
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRefParams {
    /// Owner user ID
    pub user_id: i64,
    /// Shopping list ID
    pub list_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenameListParams {
    /// Owner user ID
    pub user_id: i64,
    /// Shopping list ID
    pub list_id: i64,
    /// New title (empty keeps the current title)
    pub title: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddItemParams {
    /// Owner user ID
    pub user_id: i64,
    /// Shopping list ID
    pub list_id: i64,
    /// Product name
    pub name: String,
    /// Quantity in the given unit (must be > 0)
    pub quantity: f64,
    /// Unit: L, Kg, g, un
    pub unit: String,
    /// Price per unit; for g items the price is per Kg. Omit or 0 for no price.
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateItemParams {
    /// Owner user ID
    pub user_id: i64,
    /// Shopping item ID
    pub item_id: i64,
    /// New name
    pub name: Option<String>,
    /// New quantity (must be > 0)
    pub quantity: Option<f64>,
    /// New unit: L, Kg, g, un
    pub unit: Option<String>,
    /// New price; 0 removes the price
    pub price: Option<f64>,
    /// New purchased flag
    pub purchased: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ItemRefParams {
    /// Owner user ID
    pub user_id: i64,
    /// Shopping item ID
    pub item_id: i64,
}

// ============================================================================
// Comparison Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ComparisonItemParam {
    /// Product name
    pub name: String,
    /// Shelf price of the package (must be > 0)
    pub price: f64,
    /// Package size in the given unit (must be > 0)
    pub quantity: f64,
    /// Unit: L, Kg, g (un is not comparable)
    pub unit: String,
}

impl From<ComparisonItemParam> for ComparisonInput {
    fn from(p: ComparisonItemParam) -> Self {
        ComparisonInput {
            name: p.name,
            price: p.price,
            quantity: p.quantity,
            unit: p.unit,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddComparisonItemParams {
    /// Owner user ID
    pub user_id: i64,
    /// Product name
    pub name: String,
    /// Shelf price of the package (must be > 0)
    pub price: f64,
    /// Package size in the given unit (must be > 0)
    pub quantity: f64,
    /// Unit: L, Kg, g (un is not comparable)
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ComparisonItemRefParams {
    /// Owner user ID
    pub user_id: i64,
    /// Comparison item ID
    pub item_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ComparePricesParams {
    /// Candidates to rank; nothing is saved
    pub items: Vec<ComparisonItemParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateLineTotalParams {
    /// Price per unit; for g the price is per Kg
    pub price: f64,
    /// Quantity in the given unit
    pub quantity: f64,
    /// Unit: L, Kg, g, un
    pub unit: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl CartwiseService {
    // --- Status ---

    #[tool(description = "Get the current status of the Cartwise service including build info, database status, and process information")]
    async fn cartwise_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for using Cartwise: units, gram prices per Kg, lists and price comparison. Call this when starting a session or when unsure how to use the tools.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Users ---

    #[tool(description = "Register a user by email. Returns the user id that every list and comparison tool takes.")]
    fn register_user(&self, Parameters(p): Parameters<RegisterUserParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "register_user", "Tool call");
        let result = users::register_user(&self.database, &p.email, p.display_name.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a user by ID")]
    fn get_user(&self, Parameters(p): Parameters<GetUserParams>) -> Result<CallToolResult, McpError> {
        match users::get_user(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(user) => to_json(&user),
            None => not_found("User", p.id),
        }
    }

    #[tool(description = "Find a user by email (case-insensitive)")]
    fn find_user_by_email(&self, Parameters(p): Parameters<FindUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::find_user_by_email(&self.database, &p.email)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(user) => to_json(&user),
            None => to_json(&serde_json::json!({
                "error": "User not found",
                "email": p.email.trim(),
            })),
        }
    }

    // --- Shopping Lists ---

    #[tool(description = "Create a shopping list, optionally with initial items. Items in g are priced per Kg.")]
    fn create_list(&self, Parameters(p): Parameters<CreateListParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "create_list", user_id = p.user_id, items = p.items.len(), "Tool call");
        let items = p.items.into_iter().map(NewItemInput::from).collect();
        let result = lists::create_list(&self.database, p.user_id, &p.title, items)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's shopping lists with item counts and totals")]
    fn list_lists(&self, Parameters(p): Parameters<UserScopeParams>) -> Result<CallToolResult, McpError> {
        let result = lists::list_lists(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a shopping list with its items, line totals and list total")]
    fn get_list(&self, Parameters(p): Parameters<ListRefParams>) -> Result<CallToolResult, McpError> {
        match lists::get_list(&self.database, p.user_id, p.list_id).map_err(|e| McpError::internal_error(e, None))? {
            Some(list) => to_json(&list),
            None => not_found("Shopping list", p.list_id),
        }
    }

    #[tool(description = "Rename a shopping list. An empty title keeps the current one.")]
    fn rename_list(&self, Parameters(p): Parameters<RenameListParams>) -> Result<CallToolResult, McpError> {
        let result = lists::rename_list(&self.database, p.user_id, p.list_id, &p.title)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a shopping list and all of its items")]
    fn delete_list(&self, Parameters(p): Parameters<ListRefParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "delete_list", user_id = p.user_id, list_id = p.list_id, "Tool call");
        let result = lists::delete_list(&self.database, p.user_id, p.list_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove every item from a shopping list, keeping the list")]
    fn clear_list(&self, Parameters(p): Parameters<ListRefParams>) -> Result<CallToolResult, McpError> {
        let result = lists::clear_list(&self.database, p.user_id, p.list_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Shopping Items ---

    #[tool(description = "Add an item to a shopping list. Items in g are priced per Kg; price 0 or omitted means no price.")]
    fn add_item(&self, Parameters(p): Parameters<AddItemParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "add_item", user_id = p.user_id, list_id = p.list_id, "Tool call");
        let input = NewItemInput {
            name: p.name,
            quantity: p.quantity,
            unit: p.unit,
            price: p.price,
        };
        let result = items::add_item(&self.database, p.user_id, p.list_id, input)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update fields of a shopping item. Only supplied fields change; price 0 removes the price.")]
    fn update_item(&self, Parameters(p): Parameters<UpdateItemParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "update_item", user_id = p.user_id, item_id = p.item_id, "Tool call");
        let changes = ItemChanges {
            name: p.name,
            quantity: p.quantity,
            unit: p.unit,
            price: p.price,
            purchased: p.purchased,
        };
        let result = items::update_item(&self.database, p.user_id, p.item_id, changes)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove an item from its shopping list")]
    fn remove_item(&self, Parameters(p): Parameters<ItemRefParams>) -> Result<CallToolResult, McpError> {
        let result = items::remove_item(&self.database, p.user_id, p.item_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Check or uncheck a shopping item as purchased")]
    fn toggle_purchased(&self, Parameters(p): Parameters<ItemRefParams>) -> Result<CallToolResult, McpError> {
        let result = items::toggle_purchased(&self.database, p.user_id, p.item_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Price Comparison ---

    #[tool(description = "Add a product to the user's price comparison basket (units L, Kg or g)")]
    fn add_comparison_item(&self, Parameters(p): Parameters<AddComparisonItemParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "add_comparison_item", user_id = p.user_id, "Tool call");
        let input = ComparisonInput {
            name: p.name,
            price: p.price,
            quantity: p.quantity,
            unit: p.unit,
        };
        let result = comparison::add_comparison_item(&self.database, p.user_id, input)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove a product from the user's price comparison basket")]
    fn remove_comparison_item(&self, Parameters(p): Parameters<ComparisonItemRefParams>) -> Result<CallToolResult, McpError> {
        let result = comparison::remove_comparison_item(&self.database, p.user_id, p.item_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Empty the user's price comparison basket")]
    fn clear_comparison(&self, Parameters(p): Parameters<UserScopeParams>) -> Result<CallToolResult, McpError> {
        let result = comparison::clear_comparison(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Rank the user's comparison basket by price per L or per Kg, best value first")]
    fn rank_comparison(&self, Parameters(p): Parameters<UserScopeParams>) -> Result<CallToolResult, McpError> {
        let result = comparison::rank_comparison(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Rank products by price per L or per Kg without saving them")]
    fn compare_prices(&self, Parameters(p): Parameters<ComparePricesParams>) -> Result<CallToolResult, McpError> {
        debug!(tool = "compare_prices", items = p.items.len(), "Tool call");
        let inputs: Vec<ComparisonInput> = p.items.into_iter().map(ComparisonInput::from).collect();
        let result = comparison::compare_prices(&inputs)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Compute a shopping-list line total. For g the price is per Kg (500 g at 10 = 5).")]
    fn calculate_line_total(&self, Parameters(p): Parameters<CalculateLineTotalParams>) -> Result<CallToolResult, McpError> {
        let result = comparison::calculate_line_total(p.price, p.quantity, &p.unit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for CartwiseService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cartwise".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Cartwise".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Cartwise - Shopping lists and unit-price comparison. \
                 IMPORTANT: Call usage_instructions first. Items in g are priced per Kg. \
                 Users: register_user, get_user, find_user_by_email. \
                 Lists: create/list/get/rename/delete/clear_list (all take user_id). \
                 Items: add/update/remove_item, toggle_purchased. \
                 Comparison: add/remove_comparison_item, clear_comparison, rank_comparison, \
                 compare_prices (stateless), calculate_line_total."
                    .into(),
            ),
        }
    }
}
