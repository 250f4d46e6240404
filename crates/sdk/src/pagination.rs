//! Offset-driven iteration over every record matching a query.
//!
//! The records endpoint gives no reliable "more" marker, so the cursor keeps
//! asking while pages come back full and stops at the first short page.
//! When the total is an exact multiple of the page size that means one
//! extra request returning zero records.

use crate::api::records::GetRecordsBody;
use crate::client::KintoneClient;
use crate::error::{KintoneError, KintoneResult};
use crate::models::{GetRecordsResponse, Id, Record};
use crate::query::QueryParts;
use futures_util::{stream, Stream, TryStreamExt};
use reqwest::Method;
use tracing::debug;

/// Cursor over the pages of one "get all" call.
///
/// Holds at most one page at a time. Finite: it ends after the first short
/// page or the first error, and cannot be resumed once finished.
#[derive(Debug)]
pub struct RecordPager {
    client: KintoneClient,
    app: Id,
    query: QueryParts,
    fields: Vec<String>,
    page_size: u32,
    offset: u32,
    requests: u32,
    done: bool,
}

impl RecordPager {
    pub(crate) fn new(
        client: KintoneClient,
        app: Id,
        base_query: String,
        fields: Vec<String>,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            app,
            query: QueryParts::parse(Some(&base_query), None, 0),
            fields,
            page_size,
            offset: 0,
            requests: 0,
            done: false,
        }
    }

    /// Offset the next request will use.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of page requests issued so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Fetch the next page. `Ok(None)` once the records are exhausted.
    pub async fn next_page(&mut self) -> KintoneResult<Option<Vec<Record>>> {
        if self.done {
            return Ok(None);
        }

        let body = GetRecordsBody {
            app: self.app,
            query: self.query.with_paging(self.page_size, self.offset),
            fields: (!self.fields.is_empty()).then_some(self.fields.as_slice()),
            total_count: false,
        };
        self.requests += 1;

        let response: GetRecordsResponse =
            match self.client.http.send(Method::GET, "records", &body).await {
                Ok(response) => response,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            };

        let fetched = response.records.len();
        debug!(
            app = self.app,
            offset = self.offset,
            fetched = fetched,
            "fetched record page"
        );

        if fetched < self.page_size as usize {
            self.done = true;
        }
        self.offset = self.offset.saturating_add(self.page_size);

        if fetched == 0 {
            return Ok(None);
        }
        Ok(Some(response.records))
    }

    /// Flatten the remaining pages into a stream of records.
    pub fn into_stream(self) -> impl Stream<Item = KintoneResult<Record>> {
        stream::try_unfold(self, |mut pager| async move {
            Ok::<_, KintoneError>(pager.next_page().await?.map(|page| (page, pager)))
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, KintoneError>)))
        .try_flatten()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::client_for;
    use crate::error::KintoneError;
    use futures_util::TryStreamExt;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page(start: usize, len: usize) -> Value {
        let records: Vec<Value> = (start..start + len)
            .map(|i| json!({"$id": {"type": "__ID__", "value": i.to_string()}}))
            .collect();
        json!({ "records": records })
    }

    async fn mount_page(server: &MockServer, offset: usize, len: usize) {
        Mock::given(method("POST"))
            .and(path("/k/v1/records.json"))
            .and(header("X-HTTP-Method-Override", "GET"))
            .and(body_partial_json(json!({
                "query": format!("limit 500 offset {}", offset)
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(offset, len)))
            .expect(1)
            .mount(server)
            .await;
    }

    fn ids(records: &[crate::models::Record]) -> Vec<usize> {
        records
            .iter()
            .map(|r| r["$id"]["value"].as_str().unwrap().parse().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_short_final_page_stops() {
        let server = MockServer::start().await;
        mount_page(&server, 0, 500).await;
        mount_page(&server, 500, 500).await;
        mount_page(&server, 1000, 137).await;

        let client = client_for(&server);
        let records = client.records().get_all(1, None, &[]).await.unwrap();

        assert_eq!(records.len(), 1137);
        assert_eq!(ids(&records), (0..1137).collect::<Vec<_>>());
        // expect(1) on each mock is verified when the server drops
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_more_request() {
        let server = MockServer::start().await;
        mount_page(&server, 0, 500).await;
        mount_page(&server, 500, 500).await;
        mount_page(&server, 1000, 500).await;
        mount_page(&server, 1500, 0).await;

        let client = client_for(&server);
        let mut pager = client.records().pages(1, None, &[]).unwrap();
        assert_eq!(pager.offset(), 0);

        let mut total = 0;
        while let Some(page) = pager.next_page().await.unwrap() {
            assert_eq!(page.len(), 500);
            total += page.len();
            assert_eq!(pager.offset() as usize, total);
        }

        assert_eq!(total, 1500);
        assert_eq!(pager.requests(), 4);
        assert_eq!(pager.offset(), 2000);
        assert!(pager.is_done());

        // Exhausted cursors stay exhausted
        assert!(pager.next_page().await.unwrap().is_none());
        assert_eq!(pager.requests(), 4);
        assert_eq!(pager.offset(), 2000);
    }

    #[tokio::test]
    async fn test_empty_app() {
        let server = MockServer::start().await;
        mount_page(&server, 0, 0).await;

        let records = client_for(&server)
            .records()
            .get_all(1, None, &[])
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_stream_preserves_order() {
        let server = MockServer::start().await;
        mount_page(&server, 0, 500).await;
        mount_page(&server, 500, 3).await;

        let client = client_for(&server);
        let records: Vec<_> = client
            .records()
            .stream_all(1, None, &[])
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(ids(&records), (0..503).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_user_paging_clauses_are_replaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "query": "status = \"open\" order by $id asc limit 500 offset 0",
                "fields": ["$id"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 2)))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server)
            .records()
            .get_all(
                1,
                Some("status = \"open\" order by $id asc limit 10 offset 30"),
                &["$id".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_error_mid_way_ends_the_stream() {
        let server = MockServer::start().await;
        mount_page(&server, 0, 500).await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({"query": "limit 500 offset 500"})))
            .respond_with(ResponseTemplate::new(520).set_body_string("bad gateway"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut pager = client.records().pages(1, None, &[]).unwrap();

        assert_eq!(pager.next_page().await.unwrap().unwrap().len(), 500);
        let err = pager.next_page().await.unwrap_err();
        assert!(matches!(err, KintoneError::Api { status: 520, .. }));
        assert!(pager.next_page().await.unwrap().is_none());
    }
}
