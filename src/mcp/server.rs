use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::{classification_nodes, projects, pull_requests, repositories, work_items};
use crate::mcp::policies;
use crate::mcp::support::deserialize_non_empty_string;
use rmcp::{
    ErrorData as McpError,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        AnnotateAble, CallToolResult, Content, ErrorCode, Implementation, ListResourcesResult,
        PaginatedRequestParam, RawResource, ReadResourceRequestParam, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    schemars,
    schemars::JsonSchema,
    serde::Deserialize,
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

fn azure_error(e: AzureError) -> McpError {
    McpError {
        code: ErrorCode(-32000),
        message: e.to_string().into(),
        data: None,
    }
}

#[derive(Clone)]
pub struct AdoMcpServer {
    client: Arc<AzureDevOpsClient>,
    tool_router: ToolRouter<Self>,
}

#[derive(Deserialize, JsonSchema)]
struct ResolveRepoIdArgs {
    /// Repository name (e.g. "road-api") or GUID; GUIDs pass through as-is
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_key: String,
}

#[derive(Deserialize, JsonSchema)]
struct ListPullRequestsArgs {
    /// Repository GUID (use azdo_resolve_repo_id first)
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_id: String,
    /// PR status filter: "active" (default), "completed" or "abandoned"
    #[serde(default)]
    status: Option<String>,
    /// Maximum number of PRs to return (default 10)
    #[serde(default)]
    top: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
struct GetPullRequestArgs {
    /// Repository GUID
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_id: String,
    /// Numeric pull request ID
    pr_id: u32,
}

#[derive(Deserialize, JsonSchema)]
struct AddPullRequestCommentArgs {
    /// Repository GUID
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_id: String,
    /// Numeric pull request ID
    pr_id: u32,
    /// Comment text
    comment: String,
    /// File path for an inline comment (requires line)
    #[serde(default)]
    file_path: Option<String>,
    /// Line number on the new (right) side for an inline comment
    #[serde(default)]
    line: Option<i64>,
}

#[derive(Deserialize, JsonSchema)]
struct CreatePullRequestArgs {
    /// Repository GUID
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_id: String,
    /// Source branch, full ref or short name (auto-prefixed with refs/heads/)
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    source_branch: String,
    /// Target branch, full ref or short name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    target_branch: String,
    /// Pull request title
    title: String,
    /// Description/body (Markdown); use azdo_set_pull_request_description to
    /// fill it in per the guide afterwards
    #[serde(default)]
    description: Option<String>,
    /// Reviewer emails or display names, added as required reviewers
    #[serde(default)]
    reviewers: Vec<String>,
    /// Create as a draft PR
    #[serde(default)]
    is_draft: bool,
}

#[derive(Deserialize, JsonSchema)]
struct SetPullRequestDescriptionArgs {
    /// Repository GUID
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_id: String,
    /// Numeric pull request ID
    pr_id: u32,
    /// New description in Markdown, structured per the PR description guide
    description_markdown: String,
}

#[derive(Deserialize, JsonSchema)]
struct LinkPullRequestToWorkItemArgs {
    /// Project name where the work item lives
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    project: String,
    /// Repository GUID
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    repo_id: String,
    /// Numeric pull request ID
    pr_id: u32,
    /// Work item ID to link the PR to
    work_item_id: u32,
}

#[derive(Deserialize, JsonSchema)]
struct ListWorkItemTypesArgs {
    /// Project name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    project: String,
}

#[derive(Deserialize, JsonSchema)]
struct ListClassificationPathsArgs {
    /// Project name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    project: String,
    /// How many levels deep to retrieve (default 3)
    #[serde(default)]
    depth: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
struct CreateWorkItemArgs {
    /// Project name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    project: String,
    /// Work item type exactly as returned by azdo_list_work_item_types
    /// (e.g. "Bug", "Product Backlog Item", "Task")
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    work_item_type: String,
    /// Work item title
    title: String,
    /// Email or display name of the assignee
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    assigned_to: String,
    /// Description (HTML supported)
    #[serde(default)]
    description: Option<String>,
    /// Area path (e.g. "MyProject\\Team A\\Frontend")
    #[serde(default)]
    area_path: Option<String>,
    /// Iteration/sprint path (e.g. "MyProject\\Sprint 1")
    #[serde(default)]
    iteration_path: Option<String>,
    /// Priority (1-4, where 1 is highest)
    #[serde(default)]
    priority: Option<u32>,
    /// Semicolon-separated tags
    #[serde(default)]
    tags: Option<String>,
    /// Extra field reference names to values, as a JSON object string
    /// (for project-specific required fields)
    #[serde(default)]
    custom_fields: Option<String>,
}

#[tool_router]
impl AdoMcpServer {
    pub fn new(client: AzureDevOpsClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Resolve a repository name into its GUID. Other tools expect the GUID; call this first when the user mentions a repo by name."
    )]
    async fn azdo_resolve_repo_id(
        &self,
        args: Parameters<ResolveRepoIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_resolve_repo_id(repo_key={})",
            args.0.repo_key
        );
        let repo_id =
            repositories::resolve_repo_id(&self.client, self.client.project(), &args.0.repo_key)
                .await
                .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(repo_id)]))
    }

    #[tool(
        description = "List pull requests for a repository, filtered by status (active/completed/abandoned). Returns id, title, status, author and branches per PR."
    )]
    async fn azdo_list_pull_requests(
        &self,
        args: Parameters<ListPullRequestsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let status = args.0.status.as_deref().unwrap_or("active");
        let top = args.0.top.unwrap_or(10);
        log::info!(
            "Tool invoked: azdo_list_pull_requests(repo_id={}, status={}, top={})",
            args.0.repo_id,
            status,
            top
        );

        let prs = pull_requests::list_pull_requests(
            &self.client,
            self.client.project(),
            &args.0.repo_id,
            status,
            top,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&prs).unwrap(),
        )]))
    }

    #[tool(
        description = "Get detailed, human-readable information about a pull request: title, status, author, branches and description."
    )]
    async fn azdo_get_pull_request(
        &self,
        args: Parameters<GetPullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_get_pull_request(repo_id={}, pr_id={})",
            args.0.repo_id,
            args.0.pr_id
        );
        let details = pull_requests::get_pull_request(
            &self.client,
            self.client.project(),
            &args.0.repo_id,
            args.0.pr_id,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(details)]))
    }

    #[tool(
        description = "Fetch the full diff (whole-file ORIGINAL/MODIFIED content per changed file, latest iteration) and every review comment of a pull request. Load the policy://review resource before reviewing."
    )]
    async fn azdo_get_pull_request_full_diff(
        &self,
        args: Parameters<GetPullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_get_pull_request_full_diff(repo_id={}, pr_id={})",
            args.0.repo_id,
            args.0.pr_id
        );
        let review = pull_requests::get_full_diff(
            &self.client,
            self.client.project(),
            &args.0.repo_id,
            args.0.pr_id,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&review).unwrap(),
        )]))
    }

    #[tool(
        description = "Add a comment to a pull request. With file_path and line it becomes an inline thread on the new side of the diff; otherwise a top-level PR thread."
    )]
    async fn azdo_add_pull_request_comment(
        &self,
        args: Parameters<AddPullRequestCommentArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_add_pull_request_comment(repo_id={}, pr_id={}, file_path={:?}, line={:?})",
            args.0.repo_id,
            args.0.pr_id,
            args.0.file_path,
            args.0.line
        );
        let message = pull_requests::add_comment(
            &self.client,
            self.client.project(),
            &args.0.repo_id,
            args.0.pr_id,
            &args.0.comment,
            args.0.file_path.as_deref(),
            args.0.line,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(message)]))
    }

    #[tool(
        description = "Create a new pull request; short branch names are auto-prefixed with refs/heads/ and reviewers are added as required."
    )]
    async fn azdo_create_pull_request(
        &self,
        args: Parameters<CreatePullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_create_pull_request(repo_id={}, source={}, target={}, draft={})",
            args.0.repo_id,
            args.0.source_branch,
            args.0.target_branch,
            args.0.is_draft
        );
        let pr = pull_requests::create_pull_request(
            &self.client,
            self.client.project(),
            &args.0.repo_id,
            &args.0.source_branch,
            &args.0.target_branch,
            &args.0.title,
            args.0.description.as_deref(),
            &args.0.reviewers,
            args.0.is_draft,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&pr).unwrap(),
        )]))
    }

    #[tool(
        description = "Replace a pull request's description with the given Markdown. Read the policy://pr-description-guide resource and the full diff first, then follow the guide's structure."
    )]
    async fn azdo_set_pull_request_description(
        &self,
        args: Parameters<SetPullRequestDescriptionArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_set_pull_request_description(repo_id={}, pr_id={})",
            args.0.repo_id,
            args.0.pr_id
        );
        let pr = pull_requests::set_description(
            &self.client,
            self.client.project(),
            &args.0.repo_id,
            args.0.pr_id,
            &args.0.description_markdown,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&pr).unwrap(),
        )]))
    }

    #[tool(
        description = "Link a pull request to a work item (ArtifactLink), making the PR visible in the work item's Development section."
    )]
    async fn azdo_link_pull_request_to_work_item(
        &self,
        args: Parameters<LinkPullRequestToWorkItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_link_pull_request_to_work_item(project={}, repo_id={}, pr_id={}, work_item_id={})",
            args.0.project,
            args.0.repo_id,
            args.0.pr_id,
            args.0.work_item_id
        );
        let result = pull_requests::link_to_work_item(
            &self.client,
            &args.0.project,
            &args.0.repo_id,
            args.0.pr_id,
            args.0.work_item_id,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&result).unwrap(),
        )]))
    }

    #[tool(description = "List all projects in the organization")]
    async fn azdo_list_projects(&self) -> Result<CallToolResult, McpError> {
        log::info!("Tool invoked: azdo_list_projects");
        let projects = projects::list_projects(&self.client)
            .await
            .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&projects).unwrap(),
        )]))
    }

    #[tool(
        description = "List the work item types available in a project (Bug, Product Backlog Item, Task, ...)"
    )]
    async fn azdo_list_work_item_types(
        &self,
        args: Parameters<ListWorkItemTypesArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_list_work_item_types(project={})",
            args.0.project
        );
        let types = work_items::list_work_item_types(&self.client, &args.0.project)
            .await
            .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&types).unwrap(),
        )]))
    }

    #[tool(description = "List area paths of a project, flattened depth-first")]
    async fn azdo_list_area_paths(
        &self,
        args: Parameters<ListClassificationPathsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let depth = args.0.depth.unwrap_or(3);
        log::info!(
            "Tool invoked: azdo_list_area_paths(project={}, depth={})",
            args.0.project,
            depth
        );
        let paths = classification_nodes::list_area_paths(&self.client, &args.0.project, depth)
            .await
            .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&paths).unwrap(),
        )]))
    }

    #[tool(description = "List iteration (sprint) paths of a project, flattened depth-first")]
    async fn azdo_list_iteration_paths(
        &self,
        args: Parameters<ListClassificationPathsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let depth = args.0.depth.unwrap_or(3);
        log::info!(
            "Tool invoked: azdo_list_iteration_paths(project={}, depth={})",
            args.0.project,
            depth
        );
        let paths =
            classification_nodes::list_iteration_paths(&self.client, &args.0.project, depth)
                .await
                .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&paths).unwrap(),
        )]))
    }

    #[tool(
        description = "Create a work item of any type. Use azdo_list_work_item_types to discover valid types; project-specific required fields go in custom_fields as a JSON object string."
    )]
    async fn azdo_create_work_item(
        &self,
        args: Parameters<CreateWorkItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        log::info!(
            "Tool invoked: azdo_create_work_item(project={}, work_item_type={}, title={})",
            args.0.project,
            args.0.work_item_type,
            args.0.title
        );

        let mut fields: Vec<(String, serde_json::Value)> = vec![
            ("System.Title".to_string(), serde_json::json!(args.0.title)),
            (
                "System.AssignedTo".to_string(),
                serde_json::json!(args.0.assigned_to),
            ),
        ];

        if let Some(description) = &args.0.description {
            fields.push((
                "System.Description".to_string(),
                serde_json::json!(description),
            ));
        }
        if let Some(area_path) = &args.0.area_path {
            fields.push(("System.AreaPath".to_string(), serde_json::json!(area_path)));
        }
        if let Some(iteration_path) = &args.0.iteration_path {
            fields.push((
                "System.IterationPath".to_string(),
                serde_json::json!(iteration_path),
            ));
        }
        if let Some(priority) = args.0.priority {
            fields.push((
                "Microsoft.VSTS.Common.Priority".to_string(),
                serde_json::json!(priority),
            ));
        }
        if let Some(tags) = &args.0.tags {
            fields.push(("System.Tags".to_string(), serde_json::json!(tags)));
        }

        if let Some(extra) = &args.0.custom_fields {
            if let Ok(extra_json) =
                serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(extra)
            {
                for (k, v) in extra_json {
                    fields.push((k, v));
                }
            } else {
                return Err(McpError {
                    code: ErrorCode(-32602),
                    message: "Invalid JSON in custom_fields".into(),
                    data: None,
                });
            }
        }

        let work_item = work_items::create_work_item(
            &self.client,
            &args.0.project,
            &args.0.work_item_type,
            &fields,
        )
        .await
        .map_err(azure_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&work_item).unwrap(),
        )]))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for AdoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "azure-devops-repos-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Use these tools to inspect and review Azure DevOps pull requests and to \
                 manage repositories and work items. Before reviewing a PR, read the \
                 policy://review resource; before writing a PR description, read \
                 policy://pr-description-guide."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut review = RawResource::new(policies::REVIEW_POLICY_URI, "Review Policy");
        review.description = Some(
            "Lightweight PR review policy that keeps feedback focused and avoids over-reviewing."
                .to_string(),
        );
        review.mime_type = Some("text/plain".to_string());

        let mut guide = RawResource::new(
            policies::PR_DESCRIPTION_GUIDE_URI,
            "PR Description Guide",
        );
        guide.description = Some(
            "Structure and rules for concise, high-level pull request descriptions.".to_string(),
        );
        guide.mime_type = Some("text/plain".to_string());

        Ok(ListResourcesResult {
            resources: vec![review.no_annotation(), guide.no_annotation()],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        log::info!("Resource read: {}", request.uri);
        let text = match request.uri.as_str() {
            policies::REVIEW_POLICY_URI => policies::REVIEW_POLICY,
            policies::PR_DESCRIPTION_GUIDE_URI => policies::PR_DESCRIPTION_GUIDE,
            uri => {
                return Err(McpError {
                    code: ErrorCode(-32002),
                    message: format!("Unknown resource: {}", uri).into(),
                    data: None,
                });
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
