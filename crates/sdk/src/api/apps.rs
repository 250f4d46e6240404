//! App metadata and form layout.

use super::{ensure_id, ensure_range};
use crate::client::KintoneClient;
use crate::error::KintoneResult;
use crate::models::{AppInfo, GetAppsResponse, GetFormFieldsResponse, Id};
use reqwest::Method;
use serde::Serialize;

/// Most apps the platform returns per request.
pub const MAX_APPS_PER_PAGE: u32 = 100;

pub struct AppsApi<'a> {
    client: &'a KintoneClient,
}

/// Filters for listing apps. Empty filters are left out of the request.
#[derive(Debug, Clone, Serialize)]
pub struct AppsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub codes: Vec<String>,
    #[serde(rename = "spaceIds", skip_serializing_if = "Vec::is_empty")]
    pub space_ids: Vec<Id>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for AppsQuery {
    fn default() -> Self {
        Self {
            name: None,
            ids: Vec::new(),
            codes: Vec::new(),
            space_ids: Vec::new(),
            limit: MAX_APPS_PER_PAGE,
            offset: 0,
        }
    }
}

impl AppsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partial, case-insensitive match on the app name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn ids(mut self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.ids = ids.into_iter().collect();
        self
    }

    pub fn codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn space_ids(mut self, space_ids: impl IntoIterator<Item = Id>) -> Self {
        self.space_ids = space_ids.into_iter().collect();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Serialize)]
struct GetAppBody {
    id: Id,
}

#[derive(Serialize)]
struct FormFieldsBody<'b> {
    app: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<&'b str>,
}

impl<'a> AppsApi<'a> {
    pub(crate) fn new(client: &'a KintoneClient) -> Self {
        Self { client }
    }

    /// Get one app's metadata.
    pub async fn get(&self, id: Id) -> KintoneResult<AppInfo> {
        ensure_id("id", id)?;
        self.client
            .http
            .send(Method::GET, "app", &GetAppBody { id })
            .await
    }

    /// List apps visible to the caller.
    pub async fn list(&self, query: &AppsQuery) -> KintoneResult<GetAppsResponse> {
        ensure_range("limit", query.limit, 1, MAX_APPS_PER_PAGE)?;
        for id in query.ids.iter().chain(&query.space_ids) {
            ensure_id("id", *id)?;
        }
        self.client.http.send(Method::GET, "apps", query).await
    }

    /// Field definitions of an app's form, keyed by field code.
    pub async fn form_fields(
        &self,
        app: Id,
        lang: Option<&str>,
    ) -> KintoneResult<GetFormFieldsResponse> {
        ensure_id("app", app)?;
        self.client
            .http
            .send(Method::GET, "app/form/fields", &FormFieldsBody { app, lang })
            .await
    }
}
