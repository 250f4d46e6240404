//! Record comments.

use super::{ensure_id, ensure_not_blank, ensure_range};
use crate::client::KintoneClient;
use crate::error::KintoneResult;
use crate::models::{AddCommentResponse, CommentOrder, GetCommentsResponse, Id, NewComment};
use reqwest::Method;
use serde::Serialize;

/// Most comments the platform returns per request.
pub const MAX_COMMENTS_PER_PAGE: u32 = 10;

pub struct CommentsApi<'a> {
    client: &'a KintoneClient,
}

/// Parameters for listing a record's comments.
#[derive(Debug, Clone, Serialize)]
pub struct CommentsQuery {
    pub app: Id,
    pub record: Id,
    pub order: CommentOrder,
    pub offset: u32,
    pub limit: u32,
}

impl CommentsQuery {
    pub fn new(app: Id, record: Id) -> Self {
        Self {
            app,
            record,
            order: CommentOrder::default(),
            offset: 0,
            limit: MAX_COMMENTS_PER_PAGE,
        }
    }

    pub fn order(mut self, order: CommentOrder) -> Self {
        self.order = order;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Serialize)]
struct AddCommentBody<'b> {
    app: Id,
    record: Id,
    comment: &'b NewComment,
}

impl<'a> CommentsApi<'a> {
    pub(crate) fn new(client: &'a KintoneClient) -> Self {
        Self { client }
    }

    /// List comments on a record, newest first by default.
    pub async fn list(&self, query: &CommentsQuery) -> KintoneResult<GetCommentsResponse> {
        ensure_id("app", query.app)?;
        ensure_id("record", query.record)?;
        ensure_range("limit", query.limit, 1, MAX_COMMENTS_PER_PAGE)?;

        self.client
            .http
            .send(Method::GET, "record/comments", query)
            .await
    }

    /// Post a comment, optionally mentioning users, groups or organizations.
    pub async fn add(
        &self,
        app: Id,
        record: Id,
        comment: &NewComment,
    ) -> KintoneResult<AddCommentResponse> {
        ensure_id("app", app)?;
        ensure_id("record", record)?;
        ensure_not_blank("comment text", &comment.text)?;
        for mention in &comment.mentions {
            ensure_not_blank("mention code", &mention.code)?;
        }

        let body = AddCommentBody {
            app,
            record,
            comment,
        };
        self.client.http.send(Method::POST, "record/comment", &body).await
    }
}
