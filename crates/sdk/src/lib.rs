//! # kintone SDK
//!
//! Async Rust client for the kintone REST API.
//!
//! Every call is a POST to `https://{domain}/k/v1/{resource}.json` with the
//! logical method carried in `X-HTTP-Method-Override`. Failures come back as
//! one closed [`KintoneError`] enum; nothing is retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kintone_sdk::{KintoneClient, KintoneResult, RecordsQuery};
//!
//! #[tokio::main]
//! async fn main() -> KintoneResult<()> {
//!     let client = KintoneClient::builder()
//!         .domain("example.cybozu.com")
//!         .api_token("your-api-token")
//!         .build()?;
//!
//!     // One page
//!     let page = client
//!         .records()
//!         .get_page(&RecordsQuery::new(1).query("status = \"open\"").limit(50))
//!         .await?;
//!     println!("Got {} records", page.records.len());
//!
//!     // Everything, 500 at a time
//!     let all = client.records().get_all(1, Some("order by $id asc"), &[]).await?;
//!     println!("App holds {} records", all.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use futures_util::TryStreamExt;
//! # async fn example(client: kintone_sdk::KintoneClient) -> kintone_sdk::KintoneResult<()> {
//! let mut records = Box::pin(client.records().stream_all(1, None, &[])?);
//! while let Some(record) = records.try_next().await? {
//!     println!("{:?}", record.get("$id"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod transport;

pub use api::{
    AppsQuery, CommentsQuery, RecordsQuery, MAX_BATCH_RECORDS,
};
pub use api::files::MAX_UPLOAD_BYTES;
pub use api::records::{DEFAULT_RECORDS_LIMIT, MAX_RECORDS_PER_PAGE};
pub use auth::{resolve_auth_type, Auth, AuthContext, AuthType, Credentials};
pub use client::{KintoneClient, KintoneClientBuilder};
pub use config::ClientConfig;
pub use error::{ErrorKind, KintoneError, KintoneResult};
pub use models::*;
pub use pagination::RecordPager;
pub use query::QueryParts;
