use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityRef {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default, rename = "uniqueName")]
    pub unique_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GitRepositoryListResponse {
    pub value: Vec<GitRepository>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GitRepository {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestListResponse {
    pub value: Vec<PullRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "pullRequestId")]
    pub pull_request_id: u32,
    pub title: String,
    pub status: String,
    #[serde(rename = "createdBy")]
    pub created_by: IdentityRef,
    #[serde(default)]
    pub repository: Option<GitRepository>,
    #[serde(default, rename = "sourceRefName")]
    pub source_ref_name: Option<String>,
    #[serde(default, rename = "targetRefName")]
    pub target_ref_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "_links")]
    pub links: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IterationListResponse {
    pub value: Vec<PullRequestIteration>,
}

/// One snapshot of a PR's diff; ids are assigned by the service and the
/// listing comes back oldest-first.
#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestIteration {
    pub id: i64,
}

/// Change listing for one iteration. Depending on the api-version the
/// service keys the entries as `changeEntries` or `changes`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct IterationChangeList {
    #[serde(default, rename = "changeEntries")]
    pub change_entries: Option<Vec<ChangeEntry>>,
    #[serde(default)]
    pub changes: Option<Vec<ChangeEntry>>,
}

impl IterationChangeList {
    pub fn into_entries(self) -> Vec<ChangeEntry> {
        self.change_entries.or(self.changes).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ChangeEntry {
    #[serde(default)]
    pub item: Option<ChangeItem>,
    #[serde(default, rename = "changeType")]
    pub change_type: Option<String>,
}

/// At most one of the two object ids is absent: deletes carry only
/// `originalObjectId`, adds only `objectId`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ChangeItem {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, rename = "originalObjectId")]
    pub original_object_id: Option<String>,
    #[serde(default, rename = "objectId")]
    pub object_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadListResponse {
    pub value: Vec<CommentThread>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CommentThread {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "threadContext")]
    pub thread_context: Option<ThreadContext>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ThreadContext {
    #[serde(default, rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(default, rename = "rightFileStart")]
    pub right_file_start: Option<FilePosition>,
    #[serde(default, rename = "leftFileStart")]
    pub left_file_start: Option<FilePosition>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FilePosition {
    #[serde(default)]
    pub line: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<IdentityRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u32,
    pub fields: HashMap<String, serde_json::Value>,
    #[serde(default, rename = "_links")]
    pub links: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItemTypeListResponse {
    pub value: Vec<WorkItemType>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItemType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<WorkItemTypeIcon>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItemTypeIcon {
    #[serde(default)]
    pub url: Option<String>,
}
