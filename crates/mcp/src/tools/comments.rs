// Comment tools

use super::{
    json_schema_array, json_schema_enum, json_schema_integer, json_schema_object,
    json_schema_string, parse_args, Tool,
};
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use kintone_sdk::api::comments::MAX_COMMENTS_PER_PAGE;
use kintone_sdk::{CommentOrder, CommentsQuery, Id, KintoneClient, Mention, NewComment};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub struct GetCommentsTool {
    client: Arc<KintoneClient>,
}

impl GetCommentsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetCommentsArgs {
    app: Id,
    record: Id,
    #[serde(default)]
    order: CommentOrder,
    #[serde(default)]
    offset: u32,
    #[serde(default)]
    limit: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for GetCommentsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_comments".to_string(),
            description: "Get comments for a record".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "record": json_schema_integer("The record ID"),
                    "order": json_schema_enum(&["asc", "desc"], "Sort order (default: desc)"),
                    "offset": json_schema_integer("Offset for pagination (default: 0)"),
                    "limit": json_schema_integer(&format!(
                        "Number of comments to retrieve (default: {max}, max: {max})",
                        max = MAX_COMMENTS_PER_PAGE
                    ))
                }),
                vec!["app", "record"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetCommentsArgs = parse_args("get_comments", arguments)?;
        let query = CommentsQuery::new(args.app, args.record)
            .order(args.order)
            .offset(args.offset)
            .limit(args.limit.unwrap_or(MAX_COMMENTS_PER_PAGE));

        let page = self.client.comments().list(&query).await?;
        Ok(CallToolResult::json(&page)?)
    }
}

pub struct AddCommentTool {
    client: Arc<KintoneClient>,
}

impl AddCommentTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct AddCommentArgs {
    app: Id,
    record: Id,
    text: String,
    #[serde(default)]
    mentions: Vec<Mention>,
}

#[async_trait::async_trait]
impl Tool for AddCommentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_comment".to_string(),
            description: "Add a comment to a record".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "record": json_schema_integer("The record ID"),
                    "text": json_schema_string("Comment text"),
                    "mentions": json_schema_array(
                        json_schema_object(
                            json!({
                                "code": json_schema_string("User, group or organization code"),
                                "type": json_schema_enum(
                                    &["USER", "GROUP", "ORGANIZATION"],
                                    "Kind of entity mentioned"
                                )
                            }),
                            vec!["code", "type"],
                        ),
                        "Entities to mention (optional)"
                    )
                }),
                vec!["app", "record", "text"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: AddCommentArgs = parse_args("add_comment", arguments)?;
        let comment = NewComment {
            text: args.text,
            mentions: args.mentions,
        };

        let response = self
            .client
            .comments()
            .add(args.app, args.record, &comment)
            .await?;
        Ok(CallToolResult::json(&response)?)
    }
}
