use crate::azure::client::{AzureDevOpsClient, AzureError};
use serde::{Deserialize, Serialize};

/// A node of the area/iteration tree; `children` is present up to the
/// `$depth` requested.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ClassificationNode {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub children: Option<Vec<ClassificationNode>>,
}

/// Flat record per node, in depth-first order.
#[derive(Debug, Serialize, PartialEq)]
pub struct ClassificationPath {
    pub path: String,
    pub name: String,
    pub id: Option<i64>,
}

/// Flatten a classification node tree into a depth-first list.
pub fn flatten_nodes(node: &ClassificationNode, result: &mut Vec<ClassificationPath>) {
    result.push(ClassificationPath {
        path: node.path.clone(),
        name: node.name.clone(),
        id: node.id,
    });
    if let Some(children) = &node.children {
        for child in children {
            flatten_nodes(child, result);
        }
    }
}

pub async fn list_area_paths(
    client: &AzureDevOpsClient,
    project: &str,
    depth: u32,
) -> Result<Vec<ClassificationPath>, AzureError> {
    let path = format!(
        "wit/classificationnodes/Areas?$depth={}&api-version=7.1-preview.2",
        depth
    );
    let root: ClassificationNode = client.get(project, &path).await?;

    let mut result = Vec::new();
    flatten_nodes(&root, &mut result);
    Ok(result)
}

pub async fn list_iteration_paths(
    client: &AzureDevOpsClient,
    project: &str,
    depth: u32,
) -> Result<Vec<ClassificationPath>, AzureError> {
    let path = format!(
        "wit/classificationnodes/Iterations?$depth={}&api-version=7.1-preview.2",
        depth
    );
    let root: ClassificationNode = client.get(project, &path).await?;

    let mut result = Vec::new();
    flatten_nodes(&root, &mut result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, name: &str, path: &str, children: Vec<ClassificationNode>) -> ClassificationNode {
        ClassificationNode {
            id: Some(id),
            name: name.to_string(),
            path: path.to_string(),
            children: if children.is_empty() {
                None
            } else {
                Some(children)
            },
        }
    }

    #[test]
    fn tree_flattens_depth_first() {
        let root = node(
            1,
            "MyProject",
            "MyProject",
            vec![
                node(
                    2,
                    "Team A",
                    "MyProject\\Team A",
                    vec![node(4, "Frontend", "MyProject\\Team A\\Frontend", vec![])],
                ),
                node(3, "Team B", "MyProject\\Team B", vec![]),
            ],
        );

        let mut flat = Vec::new();
        flatten_nodes(&root, &mut flat);

        let paths: Vec<_> = flat.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "MyProject",
                "MyProject\\Team A",
                "MyProject\\Team A\\Frontend",
                "MyProject\\Team B",
            ]
        );
        assert_eq!(flat[2].name, "Frontend");
        assert_eq!(flat[2].id, Some(4));
    }
}
