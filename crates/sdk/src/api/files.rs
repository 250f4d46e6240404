//! File upload and download.
//!
//! Uploads return a `fileKey` that is only useful when attached to a record
//! in a subsequent add/update. Downloads take the key found in a file field.

use super::ensure_not_blank;
use crate::client::KintoneClient;
use crate::error::{KintoneError, KintoneResult};
use crate::models::FileUploadResponse;
use reqwest::{multipart, Method};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;

/// Largest file accepted for upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub struct FilesApi<'a> {
    client: &'a KintoneClient,
}

#[derive(Serialize)]
struct DownloadBody<'b> {
    #[serde(rename = "fileKey")]
    file_key: &'b str,
}

impl<'a> FilesApi<'a> {
    pub(crate) fn new(client: &'a KintoneClient) -> Self {
        Self { client }
    }

    /// Upload a local file.
    pub async fn upload(&self, path: impl AsRef<Path>) -> KintoneResult<FileUploadResponse> {
        let path = path.as_ref();
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(KintoneError::validation(format!(
                    "file not found: {}",
                    path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(KintoneError::validation(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        ensure_size(metadata.len())?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let data = tokio::fs::read(path).await?;
        self.upload_bytes(&file_name, data).await
    }

    /// Upload in-memory content under `file_name`.
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        data: Vec<u8>,
    ) -> KintoneResult<FileUploadResponse> {
        ensure_not_blank("file name", file_name)?;
        ensure_size(data.len() as u64)?;

        tracing::debug!(file_name = file_name, size = data.len(), "uploading file");
        let part = multipart::Part::bytes(data).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        self.client.http.send_multipart("file", form).await
    }

    /// Download a file's raw bytes by key.
    pub async fn download(&self, file_key: &str) -> KintoneResult<Vec<u8>> {
        ensure_not_blank("fileKey", file_key)?;
        self.client
            .http
            .send_raw(Method::GET, "file", &DownloadBody { file_key })
            .await
    }
}

fn ensure_size(len: u64) -> KintoneResult<()> {
    if len > MAX_UPLOAD_BYTES {
        return Err(KintoneError::validation(format!(
            "file is {} bytes, larger than the {} byte upload limit",
            len, MAX_UPLOAD_BYTES
        )));
    }
    Ok(())
}
