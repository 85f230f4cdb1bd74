// relsync-common/src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{RelsyncError, Result};
use crate::model::target::Target;

const DEFAULT_REPO: &str = "easydiffusion/sdkit";
const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
const CREDENTIALS_FILENAME: &str = ".creds.json";
const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

pub const RELEASE_ARTIFACTS_DIRNAME: &str = "release_artifacts";

#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub repo: String,
    pub api_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading relsync configuration");

        let project_root = match env::var("RELSYNC_PROJECT_ROOT").ok().filter(|s| !s.is_empty()) {
            Some(root) => PathBuf::from(root),
            None => env::current_dir().map_err(|e| {
                RelsyncError::Config(format!("Could not determine current directory: {e}"))
            })?,
        };
        debug!("Effective project root: {}", project_root.display());

        let repo = env::var("RELSYNC_REPO")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_REPO.to_string());

        let api_base_url = env::var("RELSYNC_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        debug!("Configuration loaded successfully.");
        Ok(Self {
            project_root,
            repo,
            api_base_url,
        })
    }

    pub fn with_repo(mut self, repo: Option<&str>) -> Self {
        if let Some(repo) = repo {
            self.repo = repo.to_string();
        }
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn build_root(&self) -> PathBuf {
        self.project_root.join("build")
    }

    pub fn build_dir(&self, target: &Target) -> PathBuf {
        self.build_root().join(target.to_string())
    }

    pub fn artifacts_dir(&self, target: &Target) -> PathBuf {
        self.build_dir(target).join(RELEASE_ARTIFACTS_DIRNAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.build_root().join("logs")
    }

    pub fn cmake_lists_path(&self) -> PathBuf {
        self.project_root.join("CMakeLists.txt")
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    github_token: Option<String>,
}

/// Bearer token for the release API.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Reads `.creds.json` in `dir`, then falls back to `GITHUB_TOKEN`.
    pub fn resolve(dir: &Path) -> Result<Self> {
        Self::resolve_with(dir, env::var(TOKEN_ENV_VAR).ok())
    }

    fn resolve_with(dir: &Path, env_token: Option<String>) -> Result<Self> {
        let creds_path = dir.join(CREDENTIALS_FILENAME);
        if creds_path.is_file() {
            match fs::read(&creds_path)
                .map_err(RelsyncError::from)
                .and_then(|bytes| {
                    serde_json::from_slice::<CredentialsFile>(&bytes).map_err(RelsyncError::from)
                }) {
                Ok(CredentialsFile {
                    github_token: Some(token),
                }) if !token.is_empty() => {
                    debug!("Using token from {}", creds_path.display());
                    return Ok(Self::new(token));
                }
                Ok(_) => {
                    debug!("{} has no github_token entry", creds_path.display());
                }
                Err(e) => {
                    warn!("Could not read {}: {}", creds_path.display(), e);
                }
            }
        }

        match env_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                debug!("Using token from {TOKEN_ENV_VAR}");
                Ok(Self::new(token))
            }
            None => Err(RelsyncError::MissingCredentials(format!(
                "create {} in {} with {{\"github_token\": \"...\"}} or set {}",
                CREDENTIALS_FILENAME,
                dir.display(),
                TOKEN_ENV_VAR
            ))),
        }
    }
}
