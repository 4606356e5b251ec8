use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{WorkItem, WorkItemType, WorkItemTypeListResponse};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct JsonPatchOperation {
    pub op: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl JsonPatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }
}

/// Reduced view of a created work item handed back to the LLM.
#[derive(Debug, Serialize)]
pub struct CreatedWorkItem {
    pub id: u32,
    pub url: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "workItemType")]
    pub work_item_type: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<String>,
    #[serde(rename = "areaPath")]
    pub area_path: Option<String>,
    #[serde(rename = "iterationPath")]
    pub iteration_path: Option<String>,
}

pub async fn list_work_item_types(
    client: &AzureDevOpsClient,
    project: &str,
) -> Result<Vec<WorkItemType>, AzureError> {
    let path = "wit/workitemtypes?api-version=7.1-preview.2";
    let response: WorkItemTypeListResponse = client.get(project, path).await?;
    Ok(response.value)
}

/// Create a work item of any type from a JSON Patch field document.
///
/// `fields` maps field reference names (e.g. `System.Title`) to values;
/// project-specific required fields go through the same document.
pub async fn create_work_item(
    client: &AzureDevOpsClient,
    project: &str,
    work_item_type: &str,
    fields: &[(String, Value)],
) -> Result<CreatedWorkItem, AzureError> {
    let operations: Vec<JsonPatchOperation> = fields
        .iter()
        .map(|(name, value)| JsonPatchOperation::add(format!("/fields/{}", name), value.clone()))
        .collect();

    let path = format!(
        "wit/workitems/${}?api-version=7.1-preview.3",
        urlencoding::encode(work_item_type)
    );
    let work_item: WorkItem = client.post_patch(project, &path, &operations).await?;

    Ok(summarize_created(work_item))
}

fn summarize_created(work_item: WorkItem) -> CreatedWorkItem {
    let field_str = |name: &str| {
        work_item
            .fields
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };
    let assigned_to = work_item
        .fields
        .get("System.AssignedTo")
        .and_then(|v| v.get("displayName"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let url = work_item
        .links
        .as_ref()
        .and_then(|links| links.pointer("/html/href"))
        .and_then(|href| href.as_str())
        .map(|href| href.to_string());

    CreatedWorkItem {
        id: work_item.id,
        url,
        title: field_str("System.Title"),
        state: field_str("System.State"),
        work_item_type: field_str("System.WorkItemType"),
        assigned_to,
        area_path: field_str("System.AreaPath"),
        iteration_path: field_str("System.IterationPath"),
    }
}

/// Attach an external artifact (e.g. a pull request) to a work item.
pub async fn add_artifact_link(
    client: &AzureDevOpsClient,
    project: &str,
    work_item_id: u32,
    artifact_uri: &str,
    link_name: &str,
) -> Result<WorkItem, AzureError> {
    let operations = vec![JsonPatchOperation::add(
        "/relations/-",
        serde_json::json!({
            "rel": "ArtifactLink",
            "url": artifact_uri,
            "attributes": { "name": link_name },
        }),
    )];

    let path = format!("wit/workitems/{}?api-version=7.1-preview.3", work_item_id);
    client.patch_patch(project, &path, &operations).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn patch_operation_skips_absent_fields() {
        let op = JsonPatchOperation::add("/fields/System.Title", json!("Add login"));
        let value = serde_json::to_value(&op).unwrap();

        assert_eq!(value["op"], "add");
        assert_eq!(value["path"], "/fields/System.Title");
        assert_eq!(value["value"], "Add login");
        assert!(value.get("from").is_none());
    }

    #[test]
    fn created_summary_pulls_identity_display_name() {
        let mut fields = HashMap::new();
        fields.insert("System.Title".to_string(), json!("Fix login"));
        fields.insert("System.State".to_string(), json!("New"));
        fields.insert("System.WorkItemType".to_string(), json!("Bug"));
        fields.insert(
            "System.AssignedTo".to_string(),
            json!({ "displayName": "Jane Doe", "uniqueName": "jane@example.com" }),
        );

        let summary = summarize_created(WorkItem {
            id: 456,
            fields,
            links: Some(json!({ "html": { "href": "https://example/wi/456" } })),
        });

        assert_eq!(summary.id, 456);
        assert_eq!(summary.title.as_deref(), Some("Fix login"));
        assert_eq!(summary.assigned_to.as_deref(), Some("Jane Doe"));
        assert_eq!(summary.url.as_deref(), Some("https://example/wi/456"));
        assert_eq!(summary.work_item_type.as_deref(), Some("Bug"));
    }

    #[test]
    fn artifact_link_document_shape() {
        let op = JsonPatchOperation::add(
            "/relations/-",
            json!({
                "rel": "ArtifactLink",
                "url": "vstfs:///Git/PullRequestId/p%2Fr%2F1",
                "attributes": { "name": "Pull Request" },
            }),
        );
        let value = serde_json::to_value(&[op]).unwrap();

        assert_eq!(value[0]["path"], "/relations/-");
        assert_eq!(value[0]["value"]["rel"], "ArtifactLink");
        assert_eq!(value[0]["value"]["attributes"]["name"], "Pull Request");
    }
}
