// kintone tools exposed over MCP, one struct per operation

pub mod apps;
pub mod comments;
pub mod files;
pub mod query_doc;
pub mod records;
mod registry;
pub mod statuses;

pub use apps::{GetAppTool, GetAppsTool, GetFormFieldsTool};
pub use comments::{AddCommentTool, GetCommentsTool};
pub use files::{DownloadFileTool, UploadFileTool};
pub use query_doc::QueryLanguageDocTool;
pub use records::{
    AddRecordTool, AddRecordsTool, GetAllRecordsTool, GetRecordTool, GetRecordsTool,
    UpdateRecordTool, UpdateRecordsTool,
};
pub use registry::{
    json_schema_array, json_schema_boolean, json_schema_enum, json_schema_free_object,
    json_schema_integer, json_schema_object, json_schema_string, Tool, ToolRegistry,
};
pub use statuses::{UpdateStatusTool, UpdateStatusesTool};

use crate::protocol::CallToolResult;
use anyhow::{Context, Result};
use kintone_sdk::{KintoneClient, KintoneError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Register every kintone tool against one shared client.
pub fn register_all(registry: &mut ToolRegistry, client: Arc<KintoneClient>) {
    registry.register(Arc::new(GetRecordsTool::new(client.clone())));
    registry.register(Arc::new(GetAllRecordsTool::new(client.clone())));
    registry.register(Arc::new(GetAppsTool::new(client.clone())));
    registry.register(Arc::new(GetRecordTool::new(client.clone())));
    registry.register(Arc::new(AddRecordTool::new(client.clone())));
    registry.register(Arc::new(AddRecordsTool::new(client.clone())));
    registry.register(Arc::new(UpdateRecordTool::new(client.clone())));
    registry.register(Arc::new(UpdateRecordsTool::new(client.clone())));
    registry.register(Arc::new(GetCommentsTool::new(client.clone())));
    registry.register(Arc::new(AddCommentTool::new(client.clone())));
    registry.register(Arc::new(UpdateStatusTool::new(client.clone())));
    registry.register(Arc::new(UpdateStatusesTool::new(client.clone())));
    registry.register(Arc::new(UploadFileTool::new(client.clone())));
    registry.register(Arc::new(DownloadFileTool::new(client.clone())));
    registry.register(Arc::new(GetAppTool::new(client.clone())));
    registry.register(Arc::new(GetFormFieldsTool::new(client)));
    registry.register(Arc::new(QueryLanguageDocTool));
}

/// Decode tool arguments; absent arguments count as `{}`.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).with_context(|| format!("Invalid arguments for {}", tool))
}

/// Render a failed tool call as an `isError` result.
pub fn error_result(err: &anyhow::Error) -> CallToolResult {
    match err.downcast_ref::<KintoneError>() {
        Some(e) => CallToolResult::error(format_kintone_error(e)),
        None => CallToolResult::error(format!("Error: {:#}", err)),
    }
}

/// Platform failures carry their code and field-level details; local ones
/// (validation, network, I/O) are reported as plain errors.
pub fn format_kintone_error(err: &KintoneError) -> String {
    if err.status().is_none() {
        return format!("Error: {}", err);
    }

    let mut text = format!("kintone API error: {}", err);
    if let Some(code) = err.code() {
        text.push_str(&format!(" (code: {})", code));
    }
    if let Some(details) = err.details() {
        text.push_str(&format!("\nDetails: {}", details));
    }
    text
}
