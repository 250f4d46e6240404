// App metadata tools

use super::{
    json_schema_array, json_schema_integer, json_schema_object, json_schema_string, parse_args,
    Tool,
};
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use kintone_sdk::api::apps::MAX_APPS_PER_PAGE;
use kintone_sdk::{AppsQuery, Id, KintoneClient};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub struct GetAppTool {
    client: Arc<KintoneClient>,
}

impl GetAppTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetAppArgs {
    id: Id,
}

#[async_trait::async_trait]
impl Tool for GetAppTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_app".to_string(),
            description: "Get app information".to_string(),
            input_schema: json_schema_object(
                json!({ "id": json_schema_integer("The app ID") }),
                vec!["id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetAppArgs = parse_args("get_app", arguments)?;
        let app = self.client.apps().get(args.id).await?;
        Ok(CallToolResult::json(&app)?)
    }
}

pub struct GetAppsTool {
    client: Arc<KintoneClient>,
}

impl GetAppsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetAppsArgs {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    ids: Vec<Id>,
    #[serde(default)]
    codes: Vec<String>,
    #[serde(default)]
    space_ids: Vec<Id>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: u32,
}

#[async_trait::async_trait]
impl Tool for GetAppsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_apps".to_string(),
            description: "Get kintone apps information by name or other filters".to_string(),
            input_schema: json_schema_object(
                json!({
                    "name": json_schema_string("Partial match for app name (case-insensitive)"),
                    "ids": json_schema_array(
                        json!({"type": "integer"}),
                        "List of app IDs to retrieve"
                    ),
                    "codes": json_schema_array(
                        json!({"type": "string"}),
                        "List of app codes to retrieve (exact match, case-sensitive)"
                    ),
                    "space_ids": json_schema_array(
                        json!({"type": "integer"}),
                        "List of space IDs to filter apps"
                    ),
                    "limit": json_schema_integer(&format!(
                        "Maximum number of apps to retrieve (default: {max}, max: {max})",
                        max = MAX_APPS_PER_PAGE
                    )),
                    "offset": json_schema_integer("Offset for pagination (default: 0)")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetAppsArgs = parse_args("get_apps", arguments)?;
        let mut query = AppsQuery::new()
            .ids(args.ids)
            .codes(args.codes)
            .space_ids(args.space_ids)
            .limit(args.limit.unwrap_or(MAX_APPS_PER_PAGE))
            .offset(args.offset);
        if let Some(name) = args.name {
            query = query.name(name);
        }

        let response = self.client.apps().list(&query).await?;
        let count = response.apps.len();
        Ok(CallToolResult::json(&json!({
            "apps": response.apps,
            "count": count
        }))?)
    }
}

pub struct GetFormFieldsTool {
    client: Arc<KintoneClient>,
}

impl GetFormFieldsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetFormFieldsArgs {
    app: Id,
    #[serde(default)]
    lang: Option<String>,
}

#[async_trait::async_trait]
impl Tool for GetFormFieldsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_form_fields".to_string(),
            description: "Get form fields configuration of an app".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "lang": json_schema_string(
                        "Language for field names: default, en, zh, ja or user (optional)"
                    )
                }),
                vec!["app"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetFormFieldsArgs = parse_args("get_form_fields", arguments)?;
        let fields = self
            .client
            .apps()
            .form_fields(args.app, args.lang.as_deref())
            .await?;
        Ok(CallToolResult::json(&fields)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::client_for;
    use serde_json::Value;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_json() -> Value {
        json!({
            "appId": "4",
            "code": "TASKS",
            "name": "Tasks",
            "description": "Team tasks",
            "spaceId": null,
            "threadId": null,
            "createdAt": "2024-01-01T00:00:00.000Z",
            "creator": {"code": "alice", "name": "Alice"},
            "modifiedAt": "2024-02-01T00:00:00.000Z",
            "modifier": {"code": "bob", "name": "Bob"}
        })
    }

    #[tokio::test]
    async fn test_get_apps_counts_and_maps_space_ids() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/apps.json"))
            .and(body_json(json!({"spaceIds": [3], "limit": 100, "offset": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apps": [app_json()]})))
            .expect(1)
            .mount(&server)
            .await;

        let result = GetAppsTool::new(client_for(&server))
            .execute(json!({"space_ids": [3]}))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&result.text()).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["apps"][0]["appId"], "4");
    }

    #[tokio::test]
    async fn test_get_app_returns_app_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/app.json"))
            .and(body_json(json!({"id": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(app_json()))
            .expect(1)
            .mount(&server)
            .await;

        let result = GetAppTool::new(client_for(&server))
            .execute(json!({"id": 4}))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&result.text()).unwrap();
        assert_eq!(value["name"], "Tasks");
        assert_eq!(value["creator"]["code"], "alice");
    }

    #[tokio::test]
    async fn test_get_form_fields_result_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/app/form/fields.json"))
            .and(body_json(json!({"app": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"title": {"type": "SINGLE_LINE_TEXT"}},
                "revision": "2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = GetFormFieldsTool::new(client_for(&server))
            .execute(json!({"app": 4}))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&result.text()).unwrap();
        assert_eq!(value["revision"], "2");
        assert_eq!(value["properties"]["title"]["type"], "SINGLE_LINE_TEXT");
    }
}
