//! Records API endpoints.

use super::{ensure_batch, ensure_id, ensure_range};
use crate::client::KintoneClient;
use crate::error::{KintoneError, KintoneResult};
use crate::models::{
    AddRecordResponse, AddRecordsResponse, GetRecordResponse, GetRecordsResponse, Id, Record,
    RecordRevisionsResponse, RecordTarget, RecordUpdate, RevisionResponse, UpdateKey,
};
use crate::pagination::RecordPager;
use crate::query::QueryParts;
use futures_util::Stream;
use reqwest::Method;
use serde::Serialize;

/// Largest page the records endpoint returns.
pub const MAX_RECORDS_PER_PAGE: u32 = 500;

/// Page size used when the caller does not pick one.
pub const DEFAULT_RECORDS_LIMIT: u32 = 100;

/// Records API for reading and writing app records.
pub struct RecordsApi<'a> {
    client: &'a KintoneClient,
}

/// Parameters for a single page of records.
#[derive(Debug, Clone)]
pub struct RecordsQuery {
    pub app: Id,
    pub query: Option<String>,
    pub fields: Vec<String>,
    pub limit: u32,
    pub offset: u32,
    pub total_count: bool,
}

impl RecordsQuery {
    pub fn new(app: Id) -> Self {
        Self {
            app,
            query: None,
            fields: Vec::new(),
            limit: DEFAULT_RECORDS_LIMIT,
            offset: 0,
            total_count: false,
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
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

    pub fn total_count(mut self, total_count: bool) -> Self {
        self.total_count = total_count;
        self
    }
}

#[derive(Serialize)]
pub(crate) struct GetRecordsBody<'b> {
    pub app: Id,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'b [String]>,
    #[serde(rename = "totalCount", skip_serializing_if = "std::ops::Not::not")]
    pub total_count: bool,
}

#[derive(Serialize)]
struct GetRecordBody {
    app: Id,
    id: Id,
}

#[derive(Serialize)]
struct AddRecordBody<'b> {
    app: Id,
    record: &'b Record,
}

#[derive(Serialize)]
struct AddRecordsBody<'b> {
    app: Id,
    records: &'b [Record],
}

#[derive(Serialize)]
struct UpdateRecordBody<'b> {
    app: Id,
    #[serde(flatten)]
    target: &'b RecordTarget,
    record: &'b Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<i64>,
}

#[derive(Serialize)]
struct UpdateRecordsBody<'b> {
    app: Id,
    records: &'b [RecordUpdate],
}

impl RecordTarget {
    /// Resolve optional `id` / `updateKey` arguments; exactly one must be set.
    pub fn from_parts(id: Option<Id>, update_key: Option<UpdateKey>) -> KintoneResult<Self> {
        match (id, update_key) {
            (Some(id), None) => {
                ensure_id("id", id)?;
                Ok(Self::Id(id))
            }
            (None, Some(key)) => {
                super::ensure_not_blank("updateKey.field", &key.field)?;
                Ok(Self::UpdateKey(key))
            }
            (None, None) => Err(KintoneError::validation(
                "either id or update_key must be specified",
            )),
            (Some(_), Some(_)) => Err(KintoneError::validation(
                "specify only one of id or update_key",
            )),
        }
    }

    fn validate(&self) -> KintoneResult<()> {
        match self {
            Self::Id(id) => ensure_id("id", *id),
            Self::UpdateKey(key) => super::ensure_not_blank("updateKey.field", &key.field),
        }
    }
}

impl<'a> RecordsApi<'a> {
    pub(crate) fn new(client: &'a KintoneClient) -> Self {
        Self { client }
    }

    /// Get a single record.
    pub async fn get(&self, app: Id, id: Id) -> KintoneResult<Record> {
        ensure_id("app", app)?;
        ensure_id("id", id)?;

        let response: GetRecordResponse = self
            .client
            .http
            .send(Method::GET, "record", &GetRecordBody { app, id })
            .await?;
        Ok(response.record)
    }

    /// Get one page of records.
    pub async fn get_page(&self, request: &RecordsQuery) -> KintoneResult<GetRecordsResponse> {
        ensure_id("app", request.app)?;
        ensure_range("limit", request.limit, 1, MAX_RECORDS_PER_PAGE)?;

        let parts = QueryParts::parse(request.query.as_deref(), Some(request.limit), request.offset);
        let limit = parts.limit.unwrap_or(request.limit);
        // A `limit` clause in the query can still pull it below 1
        ensure_range("limit", limit, 1, MAX_RECORDS_PER_PAGE)?;

        let body = GetRecordsBody {
            app: request.app,
            query: parts.with_paging(limit, parts.offset),
            fields: (!request.fields.is_empty()).then_some(request.fields.as_slice()),
            total_count: request.total_count,
        };
        self.client.http.send(Method::GET, "records", &body).await
    }

    /// Lazy page-by-page cursor over every matching record.
    ///
    /// Any `limit`/`offset` clause in `query` is ignored; the cursor drives
    /// its own paging at [`MAX_RECORDS_PER_PAGE`].
    pub fn pages(&self, app: Id, query: Option<&str>, fields: &[String]) -> KintoneResult<RecordPager> {
        ensure_id("app", app)?;
        let parts = QueryParts::parse(query, None, 0);
        Ok(RecordPager::new(
            self.client.clone(),
            app,
            parts.without_paging(),
            fields.to_vec(),
            MAX_RECORDS_PER_PAGE,
        ))
    }

    /// Every matching record as a stream, one page in flight at a time.
    pub fn stream_all(
        &self,
        app: Id,
        query: Option<&str>,
        fields: &[String],
    ) -> KintoneResult<impl Stream<Item = KintoneResult<Record>>> {
        Ok(self.pages(app, query, fields)?.into_stream())
    }

    /// Every matching record, collected.
    pub async fn get_all(
        &self,
        app: Id,
        query: Option<&str>,
        fields: &[String],
    ) -> KintoneResult<Vec<Record>> {
        let mut pager = self.pages(app, query, fields)?;
        let mut records = Vec::new();
        while let Some(page) = pager.next_page().await? {
            records.extend(page);
        }
        tracing::debug!(app = app, total = records.len(), "fetched all records");
        Ok(records)
    }

    /// Add a single record.
    pub async fn add(&self, app: Id, record: &Record) -> KintoneResult<AddRecordResponse> {
        ensure_id("app", app)?;
        self.client
            .http
            .send(Method::POST, "record", &AddRecordBody { app, record })
            .await
    }

    /// Add up to 100 records in one all-or-nothing request.
    pub async fn add_batch(&self, app: Id, records: &[Record]) -> KintoneResult<AddRecordsResponse> {
        ensure_id("app", app)?;
        ensure_batch("record", records)?;
        self.client
            .http
            .send(Method::POST, "records", &AddRecordsBody { app, records })
            .await
    }

    /// Update a single record.
    pub async fn update(
        &self,
        app: Id,
        target: &RecordTarget,
        record: &Record,
        revision: Option<i64>,
    ) -> KintoneResult<RevisionResponse> {
        ensure_id("app", app)?;
        target.validate()?;
        let body = UpdateRecordBody {
            app,
            target,
            record,
            revision,
        };
        self.client.http.send(Method::PUT, "record", &body).await
    }

    /// Update up to 100 records in one all-or-nothing request.
    pub async fn update_batch(
        &self,
        app: Id,
        updates: &[RecordUpdate],
    ) -> KintoneResult<RecordRevisionsResponse> {
        ensure_id("app", app)?;
        ensure_batch("record", updates)?;
        for update in updates {
            update.target.validate()?;
        }
        self.client
            .http
            .send(Method::PUT, "records", &UpdateRecordsBody { app, records: updates })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{client_for, offline_client};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(title: &str) -> Record {
        json!({"title": {"value": title}}).as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_get_record() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/record.json"))
            .and(header("X-HTTP-Method-Override", "GET"))
            .and(body_json(json!({"app": 12, "id": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"$id": {"type": "__ID__", "value": "3"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).records().get(12, 3).await.unwrap();
        assert_eq!(record["$id"]["value"], "3");
    }

    #[tokio::test]
    async fn test_get_record_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/record.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "GAIA_RE01",
                "message": "The specified record (ID: 99) is not found."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).records().get(12, 99).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some("GAIA_RE01"));
    }

    #[tokio::test]
    async fn test_get_page_builds_query() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/records.json"))
            .and(header("X-HTTP-Method-Override", "GET"))
            .and(body_json(json!({
                "app": 5,
                "query": "status = \"open\" order by $id asc limit 500 offset 20",
                "fields": ["$id", "title"],
                "totalCount": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("a"), record("b")],
                "totalCount": "2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = RecordsQuery::new(5)
            .query("status = \"open\" order by $id asc")
            .fields(["$id", "title"])
            .limit(500)
            .offset(20)
            .total_count(true);
        let page = client_for(&server).records().get_page(&request).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.total_count.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_get_page_limit_above_max_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .records()
            .get_page(&RecordsQuery::new(1).limit(501))
            .await
            .unwrap_err();
        assert!(matches!(err, KintoneError::Validation(_)));

        let err = client
            .records()
            .get_page(&RecordsQuery::new(1).limit(0))
            .await
            .unwrap_err();
        assert!(matches!(err, KintoneError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_page_query_limit_zero_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .records()
            .get_page(&RecordsQuery::new(1).query("x = 1 limit 0").limit(100))
            .await
            .unwrap_err();
        assert!(matches!(err, KintoneError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_page_limit_at_max_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({"query": "limit 500 offset 0"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .records()
            .get_page(&RecordsQuery::new(1).limit(500))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_batch_of_100_is_one_request() {
        let server = MockServer::start().await;
        let records: Vec<Record> = (0..100).map(|i| record(&format!("r{}", i))).collect();

        Mock::given(method("POST"))
            .and(path("/k/v1/records.json"))
            .and(body_json(json!({"app": 1, "records": records})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ids": (1..=100).map(|i| i.to_string()).collect::<Vec<_>>(),
                "revisions": vec!["1"; 100]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .records()
            .add_batch(1, &records)
            .await
            .unwrap();
        assert_eq!(response.ids.len(), 100);
    }

    #[tokio::test]
    async fn test_add_batch_of_101_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let records: Vec<Record> = (0..101).map(|i| record(&format!("r{}", i))).collect();
        let err = client_for(&server)
            .records()
            .add_batch(1, &records)
            .await
            .unwrap_err();
        assert!(matches!(err, KintoneError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_record_is_plain_post() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/record.json"))
            .and(body_json(json!({"app": 4, "record": {"title": {"value": "hello"}}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "10", "revision": "1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .records()
            .add(4, &record("hello"))
            .await
            .unwrap();
        assert_eq!(response.id, "10");
    }

    #[tokio::test]
    async fn test_update_by_update_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/record.json"))
            .and(header("X-HTTP-Method-Override", "PUT"))
            .and(body_json(json!({
                "app": 4,
                "updateKey": {"field": "code", "value": "A-1"},
                "record": {"title": {"value": "new"}},
                "revision": 7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"revision": "8"})))
            .expect(1)
            .mount(&server)
            .await;

        let target = RecordTarget::from_parts(
            None,
            Some(UpdateKey {
                field: "code".to_string(),
                value: json!("A-1"),
            }),
        )
        .unwrap();
        let response = client_for(&server)
            .records()
            .update(4, &target, &record("new"), Some(7))
            .await
            .unwrap();
        assert_eq!(response.revision, "8");
    }

    #[tokio::test]
    async fn test_update_batch_sends_flattened_targets() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/k/v1/records.json"))
            .and(header("X-HTTP-Method-Override", "PUT"))
            .and(body_json(json!({
                "app": 4,
                "records": [{"id": 1, "record": {"title": {"value": "x"}}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "1", "revision": "3"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updates = vec![RecordUpdate {
            target: RecordTarget::Id(1),
            record: record("x"),
            revision: None,
        }];
        let response = client_for(&server)
            .records()
            .update_batch(4, &updates)
            .await
            .unwrap();
        assert_eq!(response.records[0].revision, "3");
    }

    #[test]
    fn test_record_target_requires_exactly_one() {
        assert!(matches!(
            RecordTarget::from_parts(None, None),
            Err(KintoneError::Validation(_))
        ));
        let key = UpdateKey {
            field: "code".to_string(),
            value: json!("x"),
        };
        assert!(RecordTarget::from_parts(Some(1), Some(key)).is_err());
        assert_eq!(RecordTarget::from_parts(Some(1), None).unwrap(), RecordTarget::Id(1));
    }

    #[tokio::test]
    async fn test_invalid_ids_fail_before_network() {
        let client = offline_client();
        assert!(matches!(
            client.records().get(0, 1).await,
            Err(KintoneError::Validation(_))
        ));
        assert!(matches!(
            client.records().update_batch(1, &[]).await,
            Err(KintoneError::Validation(_))
        ));
        assert!(matches!(
            client.records().get_all(0, None, &[]).await,
            Err(KintoneError::Validation(_))
        ));
    }
}
