//! Process management: moving records through their workflow.

use super::{ensure_batch, ensure_id, ensure_not_blank};
use crate::client::KintoneClient;
use crate::error::KintoneResult;
use crate::models::{Id, RecordRevisionsResponse, RevisionResponse, StatusUpdate};
use reqwest::Method;
use serde::Serialize;

pub struct StatusesApi<'a> {
    client: &'a KintoneClient,
}

#[derive(Serialize)]
struct UpdateStatusBody<'b> {
    app: Id,
    id: Id,
    action: &'b str,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<i64>,
}

#[derive(Serialize)]
struct UpdateStatusesBody<'b> {
    app: Id,
    records: &'b [StatusUpdate],
}

impl<'a> StatusesApi<'a> {
    pub(crate) fn new(client: &'a KintoneClient) -> Self {
        Self { client }
    }

    /// Run a workflow action on one record.
    pub async fn update(
        &self,
        app: Id,
        id: Id,
        action: &str,
        assignee: Option<&str>,
        revision: Option<i64>,
    ) -> KintoneResult<RevisionResponse> {
        ensure_id("app", app)?;
        ensure_id("id", id)?;
        ensure_not_blank("action", action)?;

        let body = UpdateStatusBody {
            app,
            id,
            action,
            assignee,
            revision,
        };
        self.client.http.send(Method::PUT, "record/status", &body).await
    }

    /// Run workflow actions on up to 100 records, all or nothing.
    pub async fn update_batch(
        &self,
        app: Id,
        records: &[StatusUpdate],
    ) -> KintoneResult<RecordRevisionsResponse> {
        ensure_id("app", app)?;
        ensure_batch("status update", records)?;
        for update in records {
            ensure_id("id", update.id)?;
            ensure_not_blank("action", &update.action)?;
        }

        self.client
            .http
            .send(Method::PUT, "records/status", &UpdateStatusesBody { app, records })
            .await
    }
}
