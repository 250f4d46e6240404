// Process management tools

use super::{
    json_schema_array, json_schema_integer, json_schema_object, json_schema_string, parse_args,
    Tool,
};
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use kintone_sdk::{Id, KintoneClient, StatusUpdate, MAX_BATCH_RECORDS};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub struct UpdateStatusTool {
    client: Arc<KintoneClient>,
}

impl UpdateStatusTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateStatusArgs {
    app: Id,
    id: Id,
    action: String,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    revision: Option<i64>,
}

#[async_trait::async_trait]
impl Tool for UpdateStatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_status".to_string(),
            description: "Update the status of a record".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "id": json_schema_integer("The record ID"),
                    "action": json_schema_string("The action name"),
                    "assignee": json_schema_string("The login name of the assignee (optional)"),
                    "revision": json_schema_integer("Expected revision number (optional)")
                }),
                vec!["app", "id", "action"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UpdateStatusArgs = parse_args("update_status", arguments)?;
        let response = self
            .client
            .statuses()
            .update(
                args.app,
                args.id,
                &args.action,
                args.assignee.as_deref(),
                args.revision,
            )
            .await?;
        Ok(CallToolResult::json(&response)?)
    }
}

pub struct UpdateStatusesTool {
    client: Arc<KintoneClient>,
}

impl UpdateStatusesTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateStatusesArgs {
    app: Id,
    records: Vec<StatusUpdate>,
}

#[async_trait::async_trait]
impl Tool for UpdateStatusesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_statuses".to_string(),
            description: format!(
                "Update the status of multiple records (max {} records)",
                MAX_BATCH_RECORDS
            ),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "records": json_schema_array(
                        json_schema_object(
                            json!({
                                "id": json_schema_integer("The record ID"),
                                "action": json_schema_string("The action name"),
                                "assignee": json_schema_string("The login name of the assignee (optional)"),
                                "revision": json_schema_integer("Expected revision number (optional)")
                            }),
                            vec!["id", "action"],
                        ),
                        &format!("Array of status update data (max {})", MAX_BATCH_RECORDS)
                    )
                }),
                vec!["app", "records"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UpdateStatusesArgs = parse_args("update_statuses", arguments)?;
        let response = self
            .client
            .statuses()
            .update_batch(args.app, &args.records)
            .await?;
        Ok(CallToolResult::json(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::error_result;
    use crate::tools::test_support::{client_for, offline_client};
    use serde_json::Value;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_update_status_result_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/record/status.json"))
            .and(header("X-HTTP-Method-Override", "PUT"))
            .and(body_json(json!({"app": 1, "id": 4, "action": "Start"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"revision": "3"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = UpdateStatusTool::new(client_for(&server))
            .execute(json!({"app": 1, "id": 4, "action": "Start"}))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&result.text()).unwrap();
        assert_eq!(value, json!({"revision": "3"}));
    }

    #[tokio::test]
    async fn test_update_statuses_over_limit() {
        let records: Vec<Value> = (1..=101)
            .map(|id| json!({"id": id, "action": "Approve"}))
            .collect();
        let err = UpdateStatusesTool::new(offline_client())
            .execute(json!({"app": 1, "records": records}))
            .await
            .unwrap_err();
        assert!(error_result(&err).text().contains("Validation error"));
    }
}
