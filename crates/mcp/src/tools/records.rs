// Record tools: read, page, add and update

use super::{
    json_schema_array, json_schema_boolean, json_schema_free_object, json_schema_integer,
    json_schema_object, json_schema_string, parse_args, Tool,
};
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use kintone_sdk::{Id, KintoneClient, Record, RecordTarget, RecordUpdate, RecordsQuery, UpdateKey};
use kintone_sdk::{DEFAULT_RECORDS_LIMIT, MAX_BATCH_RECORDS, MAX_RECORDS_PER_PAGE};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Get a single record
pub struct GetRecordTool {
    client: Arc<KintoneClient>,
}

impl GetRecordTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetRecordArgs {
    app: Id,
    id: Id,
}

#[async_trait::async_trait]
impl Tool for GetRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_record".to_string(),
            description: "Get a single record from a kintone app".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "id": json_schema_integer("The record ID")
                }),
                vec!["app", "id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetRecordArgs = parse_args("get_record", arguments)?;
        let record = self.client.records().get(args.app, args.id).await?;
        Ok(CallToolResult::json(&json!({ "record": record }))?)
    }
}

/// Get one page of records
pub struct GetRecordsTool {
    client: Arc<KintoneClient>,
}

impl GetRecordsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetRecordsArgs {
    app: Id,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    total_count: bool,
}

#[async_trait::async_trait]
impl Tool for GetRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_records".to_string(),
            description: "Get records from a kintone app".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "query": json_schema_string(
                        "Query string to filter records (optional). May end with order by / limit / offset clauses"
                    ),
                    "fields": json_schema_array(
                        json!({"type": "string"}),
                        "List of field codes to retrieve (optional)"
                    ),
                    "limit": json_schema_integer(&format!(
                        "Maximum number of records to retrieve (default: {}, max: {})",
                        DEFAULT_RECORDS_LIMIT, MAX_RECORDS_PER_PAGE
                    )),
                    "offset": json_schema_integer("Offset for pagination (default: 0)"),
                    "total_count": json_schema_boolean(
                        "Also return the total number of matching records (default: false)"
                    )
                }),
                vec!["app"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetRecordsArgs = parse_args("get_records", arguments)?;

        let mut request = RecordsQuery::new(args.app)
            .fields(args.fields)
            .limit(args.limit.unwrap_or(DEFAULT_RECORDS_LIMIT))
            .offset(args.offset.unwrap_or(0))
            .total_count(args.total_count);
        if let Some(query) = args.query {
            request = request.query(query);
        }

        let page = self.client.records().get_page(&request).await?;
        Ok(CallToolResult::json(&json!({
            "records": page.records,
            "totalCount": page.total_count
        }))?)
    }
}

/// Get every matching record, paging automatically
pub struct GetAllRecordsTool {
    client: Arc<KintoneClient>,
}

impl GetAllRecordsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetAllRecordsArgs {
    app: Id,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    fields: Vec<String>,
}

#[async_trait::async_trait]
impl Tool for GetAllRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_all_records".to_string(),
            description: "Get all records from a kintone app (handles pagination automatically)"
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "query": json_schema_string(
                        "Query string to filter records (optional). limit / offset clauses are ignored"
                    ),
                    "fields": json_schema_array(
                        json!({"type": "string"}),
                        "List of field codes to retrieve (optional)"
                    )
                }),
                vec!["app"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetAllRecordsArgs = parse_args("get_all_records", arguments)?;
        let records = self
            .client
            .records()
            .get_all(args.app, args.query.as_deref(), &args.fields)
            .await?;

        let total = records.len();
        Ok(CallToolResult::json(&json!({
            "records": records,
            "totalCount": total
        }))?)
    }
}

/// Add a single record
pub struct AddRecordTool {
    client: Arc<KintoneClient>,
}

impl AddRecordTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct AddRecordArgs {
    app: Id,
    record: Record,
}

#[async_trait::async_trait]
impl Tool for AddRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_record".to_string(),
            description: "Add a single record to a kintone app".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "record": json_schema_free_object(
                        "Record data with field codes as keys and objects with 'value' property"
                    )
                }),
                vec!["app", "record"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: AddRecordArgs = parse_args("add_record", arguments)?;
        let response = self.client.records().add(args.app, &args.record).await?;
        Ok(CallToolResult::json(&response)?)
    }
}

/// Add up to 100 records at once
pub struct AddRecordsTool {
    client: Arc<KintoneClient>,
}

impl AddRecordsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct AddRecordsArgs {
    app: Id,
    records: Vec<Record>,
}

#[async_trait::async_trait]
impl Tool for AddRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_records".to_string(),
            description: format!(
                "Add multiple records to a kintone app (max {} records)",
                MAX_BATCH_RECORDS
            ),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "records": json_schema_array(
                        json!({"type": "object"}),
                        &format!("Array of record data (max {})", MAX_BATCH_RECORDS)
                    )
                }),
                vec!["app", "records"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: AddRecordsArgs = parse_args("add_records", arguments)?;
        let response = self
            .client
            .records()
            .add_batch(args.app, &args.records)
            .await?;
        Ok(CallToolResult::json(&response)?)
    }
}

/// Update a single record by id or update key
pub struct UpdateRecordTool {
    client: Arc<KintoneClient>,
}

impl UpdateRecordTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateRecordArgs {
    app: Id,
    #[serde(default)]
    id: Option<Id>,
    #[serde(default)]
    update_key: Option<UpdateKey>,
    record: Record,
    #[serde(default)]
    revision: Option<i64>,
}

#[async_trait::async_trait]
impl Tool for UpdateRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_record".to_string(),
            description: "Update a single record in a kintone app".to_string(),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "id": json_schema_integer("The record ID (either id or update_key required)"),
                    "update_key": update_key_schema(),
                    "record": json_schema_free_object("Record data with field codes to update"),
                    "revision": json_schema_integer(
                        "Expected revision number (optional, for optimistic locking)"
                    )
                }),
                vec!["app", "record"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UpdateRecordArgs = parse_args("update_record", arguments)?;
        let target = RecordTarget::from_parts(args.id, args.update_key)?;
        let response = self
            .client
            .records()
            .update(args.app, &target, &args.record, args.revision)
            .await?;
        Ok(CallToolResult::json(&response)?)
    }
}

/// Update up to 100 records at once
pub struct UpdateRecordsTool {
    client: Arc<KintoneClient>,
}

impl UpdateRecordsTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateRecordsArgs {
    app: Id,
    records: Vec<UpdateItem>,
}

/// One batch entry as callers write it: `updateKey` or `update_key` both work.
#[derive(Debug, Deserialize)]
struct UpdateItem {
    #[serde(default)]
    id: Option<Id>,
    #[serde(default, rename = "updateKey", alias = "update_key")]
    update_key: Option<UpdateKey>,
    record: Record,
    #[serde(default)]
    revision: Option<i64>,
}

impl UpdateItem {
    fn into_update(self) -> kintone_sdk::KintoneResult<RecordUpdate> {
        Ok(RecordUpdate {
            target: RecordTarget::from_parts(self.id, self.update_key)?,
            record: self.record,
            revision: self.revision,
        })
    }
}

#[async_trait::async_trait]
impl Tool for UpdateRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_records".to_string(),
            description: format!(
                "Update multiple records in a kintone app (max {} records)",
                MAX_BATCH_RECORDS
            ),
            input_schema: json_schema_object(
                json!({
                    "app": json_schema_integer("The app ID"),
                    "records": json_schema_array(
                        json_schema_object(
                            json!({
                                "id": json_schema_integer("The record ID (either id or updateKey required)"),
                                "updateKey": update_key_schema(),
                                "record": json_schema_free_object("Record data to update"),
                                "revision": json_schema_integer("Expected revision number (optional)")
                            }),
                            vec!["record"],
                        ),
                        &format!("Array of update data (max {})", MAX_BATCH_RECORDS)
                    )
                }),
                vec!["app", "records"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UpdateRecordsArgs = parse_args("update_records", arguments)?;
        let updates = args
            .records
            .into_iter()
            .map(UpdateItem::into_update)
            .collect::<kintone_sdk::KintoneResult<Vec<_>>>()?;

        let response = self
            .client
            .records()
            .update_batch(args.app, &updates)
            .await?;
        Ok(CallToolResult::json(&response)?)
    }
}

fn update_key_schema() -> serde_json::Value {
    json_schema_object(
        json!({
            "field": json_schema_string("Field code of a unique-value field"),
            "value": {"description": "Value identifying the record"}
        }),
        vec!["field", "value"],
    )
}
