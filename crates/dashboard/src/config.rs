//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GRAPHURA_API_URL` - API base URL (default: http://localhost:5000)
//! - `GRAPHURA_TOKEN_PATH` - File holding the persisted token (CLI only)
//! - `GRAPHURA_LANDING_MANAGER` - Landing page for managers (default: /dashboard)
//! - `GRAPHURA_LANDING_TEAM_LEAD` - Landing page for team leads (default: /dashboard)
//! - `GRAPHURA_LANDING_EXECUTIVE` - Landing page for executives (default: /my-projects)

use std::path::PathBuf;

use graphura_auth::{Role, RoutePermissionTable, TableError, normalize_path};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub const API_URL_VAR: &str = "GRAPHURA_API_URL";
pub const TOKEN_PATH_VAR: &str = "GRAPHURA_TOKEN_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {var}: {source}")]
    Landing {
        var: String,
        #[source]
        source: TableError,
    },
    #[error("Invalid environment variable GRAPHURA_API_URL: '{0}' is not an http(s) URL")]
    ApiUrl(String),
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// API base URL, without a trailing `/`.
    pub api_url: String,
    /// Explicit token file; `None` means the platform default.
    pub token_path: Option<PathBuf>,
    /// Role-Permission Table with any landing overrides applied.
    pub permissions: RoutePermissionTable,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_path: None,
            permissions: RoutePermissionTable::standard(),
        }
    }
}

/// `GRAPHURA_LANDING_<ROLE>`, e.g. `GRAPHURA_LANDING_TEAM_LEAD`.
pub fn landing_var(role: Role) -> String {
    format!("GRAPHURA_LANDING_{}", role.as_str().to_ascii_uppercase())
}

impl DashboardConfig {
    /// Load `.env` (if present) and read the process environment.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = match get(API_URL_VAR) {
            Some(raw) => {
                if !(raw.starts_with("http://") || raw.starts_with("https://")) {
                    return Err(ConfigError::ApiUrl(raw));
                }
                raw.trim_end_matches('/').to_string()
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let mut permissions = RoutePermissionTable::standard();
        for role in Role::ALL {
            let var = landing_var(role);
            if let Some(raw) = get(&var) {
                permissions = permissions
                    .with_default_path(role, &normalize_path(&raw))
                    .map_err(|source| ConfigError::Landing { var, source })?;
            }
        }

        Ok(Self {
            api_url,
            token_path: get(TOKEN_PATH_VAR).map(PathBuf::from),
            permissions,
        })
    }

    /// File-backed token store at the configured (or default) location.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn token_store(&self) -> Result<graphura_client::FileTokenStore, graphura_client::StoreError> {
        match &self.token_path {
            Some(path) => Ok(graphura_client::FileTokenStore::new(path)),
            None => graphura_client::FileTokenStore::default_location(),
        }
    }
}
