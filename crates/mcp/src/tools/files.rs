// File tools. Both touch the local filesystem, so paths are checked first.

use super::{json_schema_object, json_schema_string, parse_args, Tool};
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::{bail, Context, Result};
use kintone_sdk::KintoneClient;
use serde::Deserialize;
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Accept only absolute paths without `..` components.
pub(crate) fn checked_path(name: &str, raw: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    if raw.trim().is_empty() {
        bail!("{} must not be empty", name);
    }
    if !path.is_absolute() {
        bail!("{} must be an absolute path: {}", name, raw);
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        bail!("{} must not contain '..': {}", name, raw);
    }
    Ok(path.to_path_buf())
}

pub struct UploadFileTool {
    client: Arc<KintoneClient>,
}

impl UploadFileTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UploadFileArgs {
    file_path: String,
}

#[async_trait::async_trait]
impl Tool for UploadFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "upload_file".to_string(),
            description: "Upload a file to kintone (max 10 MB). Returns a fileKey to attach to a record"
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "file_path": json_schema_string("Absolute path of the file to upload")
                }),
                vec!["file_path"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UploadFileArgs = parse_args("upload_file", arguments)?;
        let path = checked_path("file_path", &args.file_path)?;

        let response = self.client.files().upload(&path).await?;
        Ok(CallToolResult::json(&response)?)
    }
}

pub struct DownloadFileTool {
    client: Arc<KintoneClient>,
}

impl DownloadFileTool {
    pub fn new(client: Arc<KintoneClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DownloadFileArgs {
    file_key: String,
    save_path: String,
}

#[async_trait::async_trait]
impl Tool for DownloadFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "download_file".to_string(),
            description: "Download a file from kintone and save it locally".to_string(),
            input_schema: json_schema_object(
                json!({
                    "file_key": json_schema_string("The file key from a file field value"),
                    "save_path": json_schema_string("Absolute path to write the file to")
                }),
                vec!["file_key", "save_path"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: DownloadFileArgs = parse_args("download_file", arguments)?;
        let path = checked_path("save_path", &args.save_path)?;

        let data = self.client.files().download(&args.file_key).await?;
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), size = data.len(), "saved downloaded file");
        Ok(CallToolResult::json(&json!({
            "saved_to": args.save_path,
            "size": data.len()
        }))?)
    }
}
