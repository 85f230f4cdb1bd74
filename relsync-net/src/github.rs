// relsync-net/src/github.rs
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use relsync_common::config::{Config, Credentials};
use relsync_common::error::{RelsyncError, Result};
use relsync_common::model::manifest::is_manifest_file_name;
use relsync_common::model::{Release, RemoteAsset};
use relsync_common::store::ReleaseStore;
use reqwest::blocking::{Body, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::validation::{strip_uri_template, validate_url};

const REQUEST_TIMEOUT_SECS: u64 = 300;
const UPLOAD_TIMEOUT_SECS: u64 = 3600;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const ASSETS_PER_PAGE: usize = 100;
const USER_AGENT_STRING: &str = "relsync release uploader (Rust)";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// `ReleaseStore` backed by the GitHub REST API.
pub struct GithubReleaseClient {
    client: Client,
    api_base_url: String,
    repo: String,
}

impl GithubReleaseClient {
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        validate_url(&config.api_base_url)?;
        if config.repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(RelsyncError::Config(format!(
                "Repository must be in owner/repo form, got '{}'",
                config.repo
            )));
        }
        Ok(Self {
            client: build_http_client(credentials)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_base_url, self.repo, path)
    }

    /// Tag lookup endpoint. The tag is a single path segment, so `/` and other
    /// reserved characters in it are percent-encoded.
    fn release_tag_url(&self, tag: &str) -> Result<Url> {
        let mut url = validate_url(&self.repo_url("releases/tags"))?;
        url.path_segments_mut()
            .map_err(|_| RelsyncError::Config("API base URL cannot have path segments".into()))?
            .push(tag);
        Ok(url)
    }

    /// Asset endpoint; with `Accept: application/octet-stream` it serves the
    /// asset bytes, including for private repositories.
    fn asset_url(&self, asset: &RemoteAsset) -> String {
        self.repo_url(&format!("releases/assets/{}", asset.id))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| {
            debug!("HTTP request failed for {url}: {e}");
            RelsyncError::HttpError(format!("HTTP request failed for {url}: {e}"))
        })?;
        Ok(ensure_success(response, url)?.json()?)
    }
}

fn build_http_client(credentials: &Credentials) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static(GITHUB_API_VERSION),
    );
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.token()))
        .map_err(|e| RelsyncError::Config(format!("Token is not a valid header value: {e}")))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| RelsyncError::HttpError(format!("Failed to build HTTP client: {e}")))
}

fn ensure_success(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|_| "Failed to read response body".to_string());
    error!("HTTP error {} for URL {}: {}", status, url, body);
    Err(RelsyncError::ApiStatus {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

fn content_type_for(name: &str) -> &'static str {
    if is_manifest_file_name(name) {
        "application/json"
    } else {
        "application/gzip"
    }
}

impl ReleaseStore for GithubReleaseClient {
    fn repo(&self) -> &str {
        &self.repo
    }

    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let url = self.release_tag_url(tag)?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| RelsyncError::HttpError(format!("HTTP request failed for {url}: {e}")))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No release tagged '{}' in {}", tag, self.repo);
            return Ok(None);
        }
        Ok(Some(ensure_success(response, url.as_str())?.json()?))
    }

    fn list_assets(&self, release: &Release) -> Result<Vec<RemoteAsset>> {
        let mut assets = Vec::new();
        let mut page = 1;
        loop {
            let url = self.repo_url(&format!(
                "releases/{}/assets?per_page={ASSETS_PER_PAGE}&page={page}",
                release.id
            ));
            let batch: Vec<RemoteAsset> = self.get_json(&url)?;
            let done = batch.len() < ASSETS_PER_PAGE;
            assets.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        debug!("Release {} has {} assets", release.id, assets.len());
        Ok(assets)
    }

    fn fetch_asset(&self, asset: &RemoteAsset) -> Result<Vec<u8>> {
        let url = &self.asset_url(asset);
        debug!("Downloading asset {} from {}", asset.name, url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .map_err(|e| RelsyncError::HttpError(format!("HTTP request failed for {url}: {e}")))?;
        let bytes = ensure_success(response, url)?
            .bytes()
            .map_err(|e| RelsyncError::HttpError(format!("Failed to read response body bytes: {e}")))?;
        Ok(bytes.to_vec())
    }

    fn upload_asset(&self, release: &Release, path: &Path, name: &str) -> Result<RemoteAsset> {
        let upload_url = strip_uri_template(&release.upload_url);
        let mut url = validate_url(upload_url)?;
        url.query_pairs_mut().append_pair("name", name);

        let file = File::open(path)?;
        let len = file.metadata()?.len();
        debug!("POST {} ({} bytes from {})", url, len, path.display());

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, content_type_for(name))
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .body(Body::sized(file, len))
            .send()
            .map_err(|e| RelsyncError::HttpError(format!("Upload of {name} failed: {e}")))?;
        Ok(ensure_success(response, url.as_str())?.json()?)
    }

    fn delete_asset(&self, asset: &RemoteAsset) -> Result<()> {
        let url = self.asset_url(asset);
        debug!("DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .send()
            .map_err(|e| RelsyncError::HttpError(format!("HTTP request failed for {url}: {e}")))?;
        ensure_success(response, &url)?;
        Ok(())
    }
}
