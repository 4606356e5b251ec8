use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
}

/// Connection settings for one Azure DevOps organization/project.
///
/// Loaded once at startup and injected into the client; the PAT needs
/// Code (read/write) and Work Items (read/write) scopes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Organization base URL, e.g. `https://dev.azure.com/myorg`
    pub org_url: String,
    /// Project that scopes all git/PR addressing
    pub project: String,
    /// Personal Access Token
    pub pat: String,
}

impl Config {
    /// Read `ADO_ORG_URL`, `ADO_PROJECT` and `ADO_PAT` from the environment,
    /// honoring a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let var = |name: &'static str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        Ok(Self {
            org_url: var("ADO_ORG_URL")?.trim_end_matches('/').to_string(),
            project: var("ADO_PROJECT")?,
            pat: var("ADO_PAT")?,
        })
    }
}
