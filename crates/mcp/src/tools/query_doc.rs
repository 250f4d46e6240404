// Static reference for the kintone query language

use super::{json_schema_object, Tool};
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use serde_json::json;

pub const QUERY_LANGUAGE_DOC: &str = include_str!("query_language.md");

/// Returns the query language reference; makes no API calls.
pub struct QueryLanguageDocTool;

#[async_trait::async_trait]
impl Tool for QueryLanguageDocTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_query_language_doc".to_string(),
            description: "Get comprehensive documentation about kintone query language syntax"
                .to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
        Ok(CallToolResult::json(&json!({ "documentation": QUERY_LANGUAGE_DOC }))?)
    }
}
