use crate::azure::client::{AzureDevOpsClient, AzureError};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub value: Vec<Project>,
}

/// List all projects in the organization
pub async fn list_projects(client: &AzureDevOpsClient) -> Result<Vec<String>, AzureError> {
    let path = "projects?api-version=7.1-preview.4";
    let response: ProjectListResponse = client
        .org_request(Method::GET, path, None::<&String>)
        .await?;

    Ok(response
        .value
        .into_iter()
        .map(|project| project.name)
        .collect())
}

/// Fetch one project by name or id (needed for artifact URIs, which use the
/// project GUID rather than its name).
pub async fn get_project(
    client: &AzureDevOpsClient,
    project: &str,
) -> Result<Project, AzureError> {
    let path = format!("projects/{}?api-version=7.1-preview.4", project);
    client.org_request(Method::GET, &path, None::<&String>).await
}
