use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::GitRepositoryListResponse;
use once_cell::sync::Lazy;
use regex::Regex;

static GUID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F-]{36}$").unwrap());

/// Loose GUID check, same shape the service hands out for repository ids.
pub fn looks_like_guid(value: &str) -> bool {
    GUID_RE.is_match(value)
}

/// Resolve a repository name or GUID into the canonical repository GUID.
///
/// A value that already looks like a GUID is passed through unchanged;
/// otherwise the project's repository listing is searched for an exact name
/// match.
pub async fn resolve_repo_id(
    client: &AzureDevOpsClient,
    project: &str,
    repo_key: &str,
) -> Result<String, AzureError> {
    if looks_like_guid(repo_key) {
        return Ok(repo_key.to_string());
    }

    let response: GitRepositoryListResponse = client
        .get(project, "git/repositories?api-version=7.1-preview.1")
        .await?;

    response
        .value
        .into_iter()
        .find(|repo| repo.name == repo_key)
        .map(|repo| repo.id)
        .ok_or_else(|| {
            AzureError::NotFound(format!(
                "Could not find repository with name '{}' in project '{}'",
                repo_key, project
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_is_recognized() {
        assert!(looks_like_guid("7c9a1f2e-1234-4d5e-9abc-0f1122334455"));
        assert!(looks_like_guid("7C9A1F2E-1234-4D5E-9ABC-0F1122334455"));
    }

    #[test]
    fn names_are_not_guids() {
        assert!(!looks_like_guid("road-api"));
        assert!(!looks_like_guid("7c9a1f2e-1234"));
        assert!(!looks_like_guid("7c9a1f2e-1234-4d5e-9abc-0f1122334455-extra"));
    }
}
