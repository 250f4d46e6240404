//! Wire types for the kintone REST API.
//!
//! Field names follow the platform exactly (`totalCount`, `updateKey`,
//! `spaceId`, ...). Identifiers and revisions come back as strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record: field code to `{"type": ..., "value": ...}` (or just
/// `{"value": ...}` when writing).
pub type Record = Map<String, Value>;

/// App or record identifier as sent in request bodies.
pub type Id = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecordResponse {
    pub record: Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecordsResponse {
    pub records: Vec<Record>,
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRecordResponse {
    pub id: String,
    pub revision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRecordsResponse {
    pub ids: Vec<String>,
    pub revisions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionResponse {
    pub revision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRevision {
    pub id: String,
    pub revision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRevisionsResponse {
    pub records: Vec<RecordRevision>,
}

/// Unique-field key identifying a record in place of its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateKey {
    pub field: String,
    pub value: Value,
}

/// How an update addresses its record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordTarget {
    #[serde(rename = "id")]
    Id(Id),
    #[serde(rename = "updateKey")]
    UpdateKey(UpdateKey),
}

/// One entry of a batch update.
#[derive(Debug, Clone, Serialize)]
pub struct RecordUpdate {
    #[serde(flatten)]
    pub target: RecordTarget,
    pub record: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MentionType {
    User,
    Group,
    Organization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub code: String,
    #[serde(rename = "type")]
    pub mention_type: MentionType,
}

/// Body of a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub creator: UserRef,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCommentsResponse {
    pub comments: Vec<Comment>,
    pub older: bool,
    pub newer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentResponse {
    pub id: String,
}

/// One entry of a batch status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: Id,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    pub file_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub app_id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub created_at: String,
    pub creator: UserRef,
    pub modified_at: String,
    pub modifier: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAppsResponse {
    pub apps: Vec<AppInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetFormFieldsResponse {
    pub properties: Map<String, Value>,
    pub revision: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_update_flattens_target() {
        let by_id = RecordUpdate {
            target: RecordTarget::Id(3),
            record: json!({"title": {"value": "x"}}).as_object().unwrap().clone(),
            revision: Some(2),
        };
        assert_eq!(
            serde_json::to_value(&by_id).unwrap(),
            json!({"id": 3, "record": {"title": {"value": "x"}}, "revision": 2})
        );

        let by_key = RecordUpdate {
            target: RecordTarget::UpdateKey(UpdateKey {
                field: "code".to_string(),
                value: json!("A-1"),
            }),
            record: Record::new(),
            revision: None,
        };
        assert_eq!(
            serde_json::to_value(&by_key).unwrap(),
            json!({"updateKey": {"field": "code", "value": "A-1"}, "record": {}})
        );
    }

    #[test]
    fn test_mentions_wire_shape() {
        let comment = NewComment {
            text: "hi".to_string(),
            mentions: vec![Mention {
                code: "sales".to_string(),
                mention_type: MentionType::Group,
            }],
        };
        assert_eq!(
            serde_json::to_value(&comment).unwrap(),
            json!({"text": "hi", "mentions": [{"code": "sales", "type": "GROUP"}]})
        );
    }

    #[test]
    fn test_app_info_from_platform_json() {
        let app: AppInfo = serde_json::from_value(json!({
            "appId": "1",
            "code": "TASKS",
            "name": "Tasks",
            "description": "",
            "spaceId": null,
            "threadId": null,
            "createdAt": "2024-01-01T00:00:00.000Z",
            "creator": {"code": "alice", "name": "Alice"},
            "modifiedAt": "2024-01-02T00:00:00.000Z",
            "modifier": {"code": "bob", "name": "Bob"}
        }))
        .unwrap();
        assert_eq!(app.app_id, "1");
        assert!(app.space_id.is_none());
        assert_eq!(app.modifier.code, "bob");
    }
}
