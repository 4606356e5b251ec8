use crate::config::Config;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("{0}")]
    NotFound(String),
}

/// Thin wrapper over reqwest with PAT basic authentication.
///
/// All JSON endpoints go through the request helpers below; api-version
/// pinning stays in each caller's path so the wire format of the upstream
/// REST API is visible at the call site.
pub struct AzureDevOpsClient {
    client: Client,
    config: Config,
}

impl AzureDevOpsClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// The project all git/PR requests are scoped to.
    pub fn project(&self) -> &str {
        &self.config.project
    }

    fn project_url(&self, project: &str, path: &str) -> String {
        format!("{}/{}/_apis/{}", self.config.org_url, project, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<&(impl Serialize + ?Sized)>,
        content_type: &str,
    ) -> Result<T, AzureError> {
        log::debug!("Request: {} {}", method, url);
        if let Some(b) = &body
            && let Ok(json) = serde_json::to_string_pretty(b)
        {
            log::debug!("Request body: {}", json);
        }

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth("", Some(&self.config.pat))
            .header("Content-Type", content_type);

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();

        log::debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::debug!("Error response: {}", error_text);
            return Err(AzureError::ApiError {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_text = response.text().await?;
        log::debug!("Response body: {}", response_text);

        let data = serde_json::from_str(&response_text)?;
        Ok(data)
    }

    pub async fn request_with_content_type<T: DeserializeOwned>(
        &self,
        project: &str,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
        content_type: &str,
    ) -> Result<T, AzureError> {
        let url = self.project_url(project, path);
        self.send_json(method, url, body, content_type).await
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        project: &str,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, AzureError> {
        self.request_with_content_type(project, method, path, body, "application/json")
            .await
    }

    /// Make a request at the organization level (not project-scoped)
    pub async fn org_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, AzureError> {
        let url = format!("{}/_apis/{}", self.config.org_url, path);
        self.send_json(method, url, body, "application/json").await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        project: &str,
        path: &str,
    ) -> Result<T, AzureError> {
        self.request(project, Method::GET, path, None::<&String>)
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        project: &str,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request(project, Method::POST, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        project: &str,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request(project, Method::PATCH, path, Some(body)).await
    }

    /// POST with `application/json-patch+json` (work item creation)
    pub async fn post_patch<T: DeserializeOwned>(
        &self,
        project: &str,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_with_content_type(
            project,
            Method::POST,
            path,
            Some(body),
            "application/json-patch+json",
        )
        .await
    }

    /// PATCH with `application/json-patch+json` (work item updates/links)
    pub async fn patch_patch<T: DeserializeOwned>(
        &self,
        project: &str,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_with_content_type(
            project,
            Method::PATCH,
            path,
            Some(body),
            "application/json-patch+json",
        )
        .await
    }

    /// GET a raw text body (blob download). Non-2xx is an error; the caller
    /// decides whether that is fatal.
    pub async fn get_text(&self, project: &str, path: &str) -> Result<String, AzureError> {
        let url = self.project_url(project, path);

        log::debug!("Request: GET {} (text)", url);

        let response = self
            .client
            .get(&url)
            .basic_auth("", Some(&self.config.pat))
            .send()
            .await?;
        let status = response.status();

        log::debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(AzureError::ApiError {
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(response.text().await?)
    }
}
