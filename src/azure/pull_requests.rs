use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{
    ChangeEntry, CommentThread, IterationChangeList, IterationListResponse, PullRequest,
    PullRequestIteration, PullRequestListResponse, ThreadListResponse,
};
use crate::azure::{projects, work_items};
use serde::Serialize;
use serde_json::json;

/// Reduced PR metadata handed back to the LLM, one entry per listed PR.
#[derive(Debug, Serialize)]
pub struct PullRequestSummary {
    pub id: u32,
    pub title: String,
    pub status: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(rename = "repoName")]
    pub repo_name: String,
    #[serde(rename = "sourceBranch")]
    pub source_branch: String,
    #[serde(rename = "targetBranch")]
    pub target_branch: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedPullRequest {
    pub id: u32,
    pub url: Option<String>,
    pub title: String,
    pub status: String,
    #[serde(rename = "sourceBranch")]
    pub source_branch: Option<String>,
    #[serde(rename = "targetBranch")]
    pub target_branch: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedPullRequest {
    pub id: u32,
    pub status: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkItemLinkResult {
    pub success: bool,
    #[serde(rename = "workItemId")]
    pub work_item_id: u32,
    #[serde(rename = "prId")]
    pub pr_id: u32,
    pub message: String,
}

/// One flattened review comment; a thread with N comments yields N of these
/// sharing the thread-level fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewComment {
    pub file: Option<String>,
    pub line: Option<i64>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "threadId")]
    pub thread_id: Option<i64>,
    #[serde(rename = "commentId")]
    pub comment_id: Option<i64>,
}

/// The assembled review payload: a whole-file before/after "diff" text plus
/// every comment on the PR, flattened.
#[derive(Debug, PartialEq, Serialize)]
pub struct PullRequestReview {
    pub diff: String,
    pub comments: Vec<ReviewComment>,
}

/// Outcome of a single blob fetch. `Absent` (no object id) and `FetchFailed`
/// both render as empty text in the diff, but stay distinguishable here so a
/// transport error is not silently conflated with an empty file.
#[derive(Debug, Clone, PartialEq)]
pub enum BlobText {
    Present(String),
    Absent,
    FetchFailed(String),
}

impl BlobText {
    pub fn rendered(&self) -> &str {
        match self {
            BlobText::Present(text) => text,
            BlobText::Absent | BlobText::FetchFailed(_) => "",
        }
    }
}

pub async fn list_pull_requests(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    status: &str,
    top: u32,
) -> Result<Vec<PullRequestSummary>, AzureError> {
    let path = format!(
        "git/repositories/{}/pullrequests?searchCriteria.status={}&$top={}&api-version=7.1-preview.1",
        repo_id, status, top
    );
    let response: PullRequestListResponse = client.get(project, &path).await?;

    Ok(response
        .value
        .into_iter()
        .map(|pr| PullRequestSummary {
            id: pr.pull_request_id,
            title: pr.title,
            status: pr.status,
            created_by: pr.created_by.display_name,
            repo_name: pr.repository.map(|r| r.name).unwrap_or_default(),
            source_branch: pr.source_ref_name.unwrap_or_default(),
            target_branch: pr.target_ref_name.unwrap_or_default(),
        })
        .collect())
}

pub async fn get_pull_request(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    pr_id: u32,
) -> Result<String, AzureError> {
    let path = format!(
        "git/repositories/{}/pullrequests/{}?api-version=7.1-preview.1",
        repo_id, pr_id
    );
    let pr: PullRequest = client.get(project, &path).await?;

    Ok(format_pull_request(&pr))
}

fn format_pull_request(pr: &PullRequest) -> String {
    format!(
        "PR #{}: {}\n\
         Status: {}\n\
         CreatedBy: {} ({})\n\
         SourceBranch: {}\n\
         TargetBranch: {}\n\
         Description:\n{}\n",
        pr.pull_request_id,
        pr.title,
        pr.status,
        pr.created_by.display_name,
        pr.created_by.unique_name.as_deref().unwrap_or(""),
        pr.source_ref_name.as_deref().unwrap_or(""),
        pr.target_ref_name.as_deref().unwrap_or(""),
        pr.description.as_deref().unwrap_or(""),
    )
}

/// Id of the most recent iteration of a PR.
///
/// The listing comes back oldest-first; the last element is taken as-is
/// rather than searching for the maximum id.
pub async fn latest_iteration_id(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    pr_id: u32,
) -> Result<i64, AzureError> {
    let path = format!(
        "git/repositories/{}/pullRequests/{}/iterations?api-version=7.1-preview.1",
        repo_id, pr_id
    );
    let response: IterationListResponse = client.get(project, &path).await?;

    pick_latest_iteration(&response.value)
        .ok_or_else(|| AzureError::NotFound(format!("No iterations found for PR #{}", pr_id)))
}

fn pick_latest_iteration(iterations: &[PullRequestIteration]) -> Option<i64> {
    iterations.last().map(|iteration| iteration.id)
}

/// Fetch the raw text of a blob by object id. A missing id or a failed
/// fetch is not fatal to diff assembly; the failure reason is retained.
pub async fn fetch_blob_text(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    object_id: Option<&str>,
) -> BlobText {
    let Some(id) = object_id else {
        return BlobText::Absent;
    };

    let path = format!(
        "git/repositories/{}/blobs/{}?api-version=7.1-preview.1&download=true&$format=text",
        repo_id, id
    );
    match client.get_text(project, &path).await {
        Ok(text) => BlobText::Present(text),
        Err(e) => {
            log::debug!("Blob fetch failed for {}: {}", id, e);
            BlobText::FetchFailed(e.to_string())
        }
    }
}

fn render_change_block(
    path: &str,
    change_type: &str,
    original: &BlobText,
    modified: &BlobText,
) -> String {
    format!(
        "--- a{path}\n\
         +++ b{path}\n\
         @@ {change_type} {path} @@\n\
         --- ORIGINAL ---\n{original}\n\
         --- MODIFIED ---\n{modified}\n",
        path = path,
        change_type = change_type,
        original = original.rendered(),
        modified = modified.rendered(),
    )
}

fn assemble_diff(pr_id: u32, blocks: &[String]) -> String {
    if blocks.is_empty() {
        // Sentinel for callers, not parseable diff content.
        format!("No change entries found for PR #{}.", pr_id)
    } else {
        blocks.join("\n")
    }
}

/// Flatten nested comment threads into one record per comment, in upstream
/// order. The line anchor prefers the right (new-file) side over the left;
/// unanchored threads keep file and line as null. Nothing is filtered:
/// active, resolved and general comments are all included.
pub fn flatten_threads(threads: &[CommentThread]) -> Vec<ReviewComment> {
    let mut out = Vec::new();

    for thread in threads {
        let context = thread.thread_context.as_ref();
        let file = context.and_then(|c| c.file_path.clone());
        let line = context.and_then(|c| {
            c.right_file_start
                .as_ref()
                .and_then(|p| p.line)
                .or_else(|| c.left_file_start.as_ref().and_then(|p| p.line))
        });

        for comment in &thread.comments {
            out.push(ReviewComment {
                file: file.clone(),
                line,
                content: comment.content.clone(),
                author: comment.author.as_ref().map(|a| a.display_name.clone()),
                status: thread.status.clone(),
                thread_id: thread.id,
                comment_id: comment.id,
            });
        }
    }

    out
}

/// Assemble the full review payload for the latest iteration of a PR:
/// whole-file before/after content for every changed file, plus all comment
/// threads flattened.
///
/// The three structural fetches (iterations, changes, threads) are fatal on
/// failure; individual blob fetches degrade to empty sections instead.
pub async fn get_full_diff(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    pr_id: u32,
) -> Result<PullRequestReview, AzureError> {
    let iteration_id = latest_iteration_id(client, project, repo_id, pr_id).await?;

    let changes_path = format!(
        "git/repositories/{}/pullRequests/{}/iterations/{}/changes?api-version=7.1-preview.1&$top=1000",
        repo_id, pr_id, iteration_id
    );
    let change_list: IterationChangeList = client.get(project, &changes_path).await?;
    let entries: Vec<ChangeEntry> = change_list.into_entries();

    let mut blocks = Vec::with_capacity(entries.len());
    for entry in &entries {
        let item = entry.item.as_ref();
        let path = item
            .and_then(|i| i.path.as_deref())
            .unwrap_or("<unknown-path>");
        let change_type = entry.change_type.as_deref().unwrap_or("?");

        let original = fetch_blob_text(
            client,
            project,
            repo_id,
            item.and_then(|i| i.original_object_id.as_deref()),
        )
        .await;
        let modified = fetch_blob_text(
            client,
            project,
            repo_id,
            item.and_then(|i| i.object_id.as_deref()),
        )
        .await;

        blocks.push(render_change_block(path, change_type, &original, &modified));
    }

    let diff = assemble_diff(pr_id, &blocks);

    let threads_path = format!(
        "git/repositories/{}/pullRequests/{}/threads?api-version=7.1-preview.1",
        repo_id, pr_id
    );
    let threads: ThreadListResponse = client.get(project, &threads_path).await?;
    let comments = flatten_threads(&threads.value);

    Ok(PullRequestReview { diff, comments })
}

/// Post a comment thread on a PR. With both `file_path` and `line` the
/// thread anchors to that line on the right (modified) side; otherwise it is
/// a top-level PR thread.
pub async fn add_comment(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    pr_id: u32,
    comment: &str,
    file_path: Option<&str>,
    line: Option<i64>,
) -> Result<String, AzureError> {
    let path = format!(
        "git/repositories/{}/pullRequests/{}/threads?api-version=7.1-preview.1",
        repo_id, pr_id
    );

    let mut payload = json!({
        "comments": [
            {
                "parentCommentId": 0,
                "content": comment,
                "commentType": 1,
            }
        ],
        "status": 1,
    });

    if let Some(context) = inline_thread_context(file_path, line) {
        payload["threadContext"] = context;
    }

    let thread: CommentThread = client.post(project, &path, &payload).await?;
    let thread_id = thread
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".to_string());

    Ok(format!("Comment posted in thread id {}", thread_id))
}

fn inline_thread_context(file_path: Option<&str>, line: Option<i64>) -> Option<serde_json::Value> {
    let (file_path, line) = file_path.zip(line)?;
    Some(json!({
        "filePath": file_path,
        "rightFileStart": { "line": line, "offset": 1 },
        "rightFileEnd": { "line": line, "offset": 1 },
    }))
}

fn qualify_branch(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{}", branch)
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn create_pull_request(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    source_branch: &str,
    target_branch: &str,
    title: &str,
    description: Option<&str>,
    reviewers: &[String],
    is_draft: bool,
) -> Result<CreatedPullRequest, AzureError> {
    let path = format!(
        "git/repositories/{}/pullrequests?api-version=7.1-preview.1",
        repo_id
    );

    let mut payload = json!({
        "sourceRefName": qualify_branch(source_branch),
        "targetRefName": qualify_branch(target_branch),
        "title": title,
    });
    if let Some(description) = description {
        payload["description"] = json!(description);
    }
    if is_draft {
        payload["isDraft"] = json!(true);
    }
    if !reviewers.is_empty() {
        payload["reviewers"] = json!(
            reviewers
                .iter()
                .map(|reviewer| json!({ "id": reviewer, "isRequired": true }))
                .collect::<Vec<_>>()
        );
    }

    let pr: PullRequest = client.post(project, &path, &payload).await?;
    let url = pr
        .links
        .as_ref()
        .and_then(|links| links.pointer("/web/href"))
        .and_then(|href| href.as_str())
        .map(|href| href.to_string());

    Ok(CreatedPullRequest {
        id: pr.pull_request_id,
        url,
        title: pr.title,
        status: pr.status,
        source_branch: pr.source_ref_name,
        target_branch: pr.target_ref_name,
    })
}

pub async fn set_description(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    pr_id: u32,
    description_markdown: &str,
) -> Result<UpdatedPullRequest, AzureError> {
    let path = format!(
        "git/repositories/{}/pullRequests/{}?api-version=7.1-preview.1",
        repo_id, pr_id
    );
    let payload = json!({ "description": description_markdown });

    let pr: PullRequest = client.patch(project, &path, &payload).await?;

    Ok(UpdatedPullRequest {
        id: pr.pull_request_id,
        status: pr.status,
        title: pr.title,
        description: pr.description,
    })
}

/// Link a PR to a work item through an ArtifactLink relation, making the PR
/// visible in the work item's Development section.
pub async fn link_to_work_item(
    client: &AzureDevOpsClient,
    project: &str,
    repo_id: &str,
    pr_id: u32,
    work_item_id: u32,
) -> Result<WorkItemLinkResult, AzureError> {
    let project_info = projects::get_project(client, project).await?;

    // vstfs artifact URI, with '/' separators percent-encoded
    let artifact_uri = format!(
        "vstfs:///Git/PullRequestId/{}%2F{}%2F{}",
        project_info.id, repo_id, pr_id
    );

    work_items::add_artifact_link(client, project, work_item_id, &artifact_uri, "Pull Request")
        .await?;

    Ok(WorkItemLinkResult {
        success: true,
        work_item_id,
        pr_id,
        message: format!(
            "Successfully linked PR #{} to work item #{}",
            pr_id, work_item_id
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::models::{Comment, FilePosition, IdentityRef, ThreadContext};

    fn iteration(id: i64) -> PullRequestIteration {
        PullRequestIteration { id }
    }

    #[test]
    fn latest_iteration_trusts_listing_order() {
        // Deliberately not the maximum id: the last listed element wins.
        let iterations = vec![iteration(3), iteration(9), iteration(7)];
        assert_eq!(pick_latest_iteration(&iterations), Some(7));
    }

    #[test]
    fn empty_iteration_listing_yields_none() {
        assert_eq!(pick_latest_iteration(&[]), None);
    }

    #[test]
    fn empty_change_list_renders_sentinel() {
        assert_eq!(
            assemble_diff(42, &[]),
            "No change entries found for PR #42."
        );
    }

    #[test]
    fn change_block_contains_both_sections() {
        let block = render_change_block(
            "/src/a.py",
            "edit",
            &BlobText::Present("old".to_string()),
            &BlobText::Present("new".to_string()),
        );

        assert_eq!(
            block,
            "--- a/src/a.py\n\
             +++ b/src/a.py\n\
             @@ edit /src/a.py @@\n\
             --- ORIGINAL ---\nold\n\
             --- MODIFIED ---\nnew\n"
        );
    }

    #[test]
    fn added_file_has_empty_original_section() {
        let block = render_change_block(
            "/src/new.py",
            "add",
            &BlobText::Absent,
            &BlobText::Present("content".to_string()),
        );

        assert!(block.contains("--- ORIGINAL ---\n\n"));
        assert!(block.contains("--- MODIFIED ---\ncontent\n"));
    }

    #[test]
    fn deleted_file_has_empty_modified_section() {
        let block = render_change_block(
            "/src/gone.py",
            "delete",
            &BlobText::Present("content".to_string()),
            &BlobText::Absent,
        );

        assert!(block.contains("--- ORIGINAL ---\ncontent\n"));
        assert!(block.contains("--- MODIFIED ---\n\n"));
    }

    #[test]
    fn failed_fetch_renders_as_empty_text() {
        let failed = BlobText::FetchFailed("API error (404): gone".to_string());
        assert_eq!(failed.rendered(), "");

        let block = render_change_block("/src/a.py", "edit", &failed, &BlobText::Absent);
        assert!(block.contains("--- ORIGINAL ---\n\n"));
    }

    #[test]
    fn example_scenario_single_edit() {
        // PR #42, one edit of /src/a.py, contents "old" -> "new", no threads.
        let blocks = vec![render_change_block(
            "/src/a.py",
            "edit",
            &BlobText::Present("old".to_string()),
            &BlobText::Present("new".to_string()),
        )];
        let review = PullRequestReview {
            diff: assemble_diff(42, &blocks),
            comments: flatten_threads(&[]),
        };

        assert!(review.diff.starts_with("--- a/src/a.py\n+++ b/src/a.py\n"));
        assert!(review.diff.contains("@@ edit /src/a.py @@"));
        assert!(review.diff.contains("--- ORIGINAL ---\nold\n"));
        assert!(review.diff.contains("--- MODIFIED ---\nnew\n"));
        assert!(review.comments.is_empty());
    }

    fn author(name: &str) -> IdentityRef {
        IdentityRef {
            display_name: name.to_string(),
            unique_name: None,
        }
    }

    fn comment(id: i64, content: &str, by: &str) -> Comment {
        Comment {
            id: Some(id),
            content: Some(content.to_string()),
            author: Some(author(by)),
        }
    }

    fn position(line: i64) -> Option<FilePosition> {
        Some(FilePosition {
            line: Some(line),
            offset: Some(1),
        })
    }

    #[test]
    fn right_side_line_wins_over_left() {
        let thread = CommentThread {
            id: Some(1),
            status: Some("active".to_string()),
            thread_context: Some(ThreadContext {
                file_path: Some("/src/a.py".to_string()),
                right_file_start: position(12),
                left_file_start: position(8),
            }),
            comments: vec![comment(100, "check this", "Alice")],
        };

        let flat = flatten_threads(&[thread]);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].line, Some(12));
        assert_eq!(flat[0].file.as_deref(), Some("/src/a.py"));
    }

    #[test]
    fn left_side_line_used_when_right_missing() {
        let thread = CommentThread {
            id: Some(2),
            status: Some("active".to_string()),
            thread_context: Some(ThreadContext {
                file_path: Some("/src/a.py".to_string()),
                right_file_start: None,
                left_file_start: position(8),
            }),
            comments: vec![comment(101, "removed line", "Bob")],
        };

        let flat = flatten_threads(&[thread]);
        assert_eq!(flat[0].line, Some(8));
    }

    #[test]
    fn general_thread_has_no_anchor() {
        let thread = CommentThread {
            id: Some(3),
            status: Some("active".to_string()),
            thread_context: None,
            comments: vec![comment(102, "overall looks good", "Carol")],
        };

        let flat = flatten_threads(&[thread]);
        assert_eq!(flat[0].file, None);
        assert_eq!(flat[0].line, None);
    }

    #[test]
    fn thread_with_n_comments_yields_n_records() {
        let thread = CommentThread {
            id: Some(4),
            status: Some("fixed".to_string()),
            thread_context: Some(ThreadContext {
                file_path: Some("/src/b.py".to_string()),
                right_file_start: position(3),
                left_file_start: None,
            }),
            comments: vec![
                comment(10, "first", "Alice"),
                comment(11, "second", "Bob"),
                comment(12, "third", "Alice"),
            ],
        };

        let flat = flatten_threads(&[thread]);
        assert_eq!(flat.len(), 3);
        for record in &flat {
            assert_eq!(record.file.as_deref(), Some("/src/b.py"));
            assert_eq!(record.line, Some(3));
            assert_eq!(record.status.as_deref(), Some("fixed"));
            assert_eq!(record.thread_id, Some(4));
        }
        assert_eq!(flat[0].comment_id, Some(10));
        assert_eq!(flat[1].comment_id, Some(11));
        assert_eq!(flat[2].comment_id, Some(12));
        assert_ne!(flat[0].author, flat[1].author);
    }

    #[test]
    fn flattening_is_idempotent() {
        let threads = vec![CommentThread {
            id: Some(5),
            status: Some("active".to_string()),
            thread_context: None,
            comments: vec![comment(20, "a", "Alice"), comment(21, "b", "Bob")],
        }];

        assert_eq!(flatten_threads(&threads), flatten_threads(&threads));
    }

    #[test]
    fn thread_order_and_comment_order_preserved() {
        let threads = vec![
            CommentThread {
                id: Some(7),
                comments: vec![comment(1, "t7c1", "A"), comment(2, "t7c2", "B")],
                ..Default::default()
            },
            CommentThread {
                id: Some(6),
                comments: vec![comment(3, "t6c1", "C")],
                ..Default::default()
            },
        ];

        let flat = flatten_threads(&threads);
        let ids: Vec<_> = flat.iter().map(|c| (c.thread_id, c.comment_id)).collect();
        assert_eq!(
            ids,
            vec![(Some(7), Some(1)), (Some(7), Some(2)), (Some(6), Some(3))]
        );
    }

    #[test]
    fn short_branch_names_get_refs_heads_prefix() {
        assert_eq!(qualify_branch("feature/login"), "refs/heads/feature/login");
        assert_eq!(qualify_branch("refs/heads/main"), "refs/heads/main");
        assert_eq!(qualify_branch("refs/tags/v1"), "refs/tags/v1");
    }

    #[test]
    fn inline_context_requires_both_file_and_line() {
        assert!(inline_thread_context(Some("/src/a.py"), None).is_none());
        assert!(inline_thread_context(None, Some(3)).is_none());

        let context = inline_thread_context(Some("/src/a.py"), Some(3)).unwrap();
        assert_eq!(context["filePath"], "/src/a.py");
        assert_eq!(context["rightFileStart"]["line"], 3);
        assert_eq!(context["rightFileEnd"]["offset"], 1);
    }

    #[test]
    fn change_list_accepts_either_entry_key() {
        let with_entries: IterationChangeList = serde_json::from_value(serde_json::json!({
            "changeEntries": [{ "changeType": "edit", "item": { "path": "/a" } }]
        }))
        .unwrap();
        assert_eq!(with_entries.into_entries().len(), 1);

        let with_changes: IterationChangeList = serde_json::from_value(serde_json::json!({
            "changes": [{ "changeType": "add" }, { "changeType": "delete" }]
        }))
        .unwrap();
        assert_eq!(with_changes.into_entries().len(), 2);

        let neither: IterationChangeList = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(neither.into_entries().is_empty());
    }

    #[test]
    fn review_comment_serializes_with_wire_names() {
        let record = ReviewComment {
            file: Some("/src/a.py".to_string()),
            line: Some(5),
            content: Some("hm".to_string()),
            author: Some("Alice".to_string()),
            status: Some("active".to_string()),
            thread_id: Some(9),
            comment_id: Some(90),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["threadId"], 9);
        assert_eq!(value["commentId"], 90);
        assert_eq!(value["file"], "/src/a.py");
    }
}
