//! Zotero web API (v3) client.

use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::ZoteroConfig;
use crate::models::ItemRecord;
use crate::sync::source::{FetchError, ItemSource, PageRequest, PageResponse};
use crate::util::error_excerpt;
use crate::{Error, Result};

const API_VERSION_HEADER: &str = "Zotero-API-Version";
const API_VERSION: &str = "3";
const IF_MODIFIED_SINCE_VERSION: &str = "If-Modified-Since-Version";
const LAST_MODIFIED_VERSION: &str = "Last-Modified-Version";
const HTTP_TIMEOUT_SECS: u64 = 30;

/// HTTP client bound to one Zotero library.
#[derive(Debug, Clone)]
pub struct ZoteroClient {
    library_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ZoteroClient {
    /// Build a client; fails when the library prefix is not configured.
    pub fn new(config: &ZoteroConfig) -> Result<Self> {
        let prefix = config.require_library_prefix()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            library_url: format!("{}/{prefix}", config.api_base_url()),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Items listing endpoint of the library.
    pub fn items_url(&self) -> String {
        format!("{}/items", self.library_url)
    }

    /// Download the stored file of an attachment item.
    pub async fn download_attachment(&self, attachment_key: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/items/{}/file",
            self.library_url,
            urlencoding::encode(attachment_key)
        );
        let response = self.authorized(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "attachment {attachment_key} returned HTTP {status}: {}",
                error_excerpt(&body)
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(API_VERSION_HEADER, API_VERSION);
        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }
}

impl ItemSource for ZoteroClient {
    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<PageResponse, FetchError> {
        debug!(offset = request.offset, "GET {}", self.items_url());
        let response = self
            .authorized(self.client.get(self.items_url()))
            .header(ACCEPT, "application/json")
            .header(IF_MODIFIED_SINCE_VERSION, request.min_version.to_string())
            .query(&page_query(request))
            .send()
            .await
            .map_err(|error| FetchError::Transport(error.to_string()))?;

        let status = response.status();
        let version = last_modified_version(response.headers());
        let body = response
            .text()
            .await
            .map_err(|error| FetchError::Transport(error.to_string()))?;

        interpret_page(status, version, &body)
    }
}

fn page_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("sort", "date".to_string()),
        ("format", "json".to_string()),
        ("include", "data,biblatex".to_string()),
        ("start", request.offset.to_string()),
        ("limit", request.limit.to_string()),
    ];
    if let Some(tag) = &request.tag {
        query.push(("tag", tag.clone()));
    }
    query
}

fn last_modified_version(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(LAST_MODIFIED_VERSION)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn interpret_page(
    status: StatusCode,
    version: Option<u64>,
    body: &str,
) -> std::result::Result<PageResponse, FetchError> {
    if status == StatusCode::NOT_MODIFIED {
        return Ok(PageResponse::NotModified);
    }
    if !status.is_success() {
        let message = error_excerpt(body);
        return Err(FetchError::Remote {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                message
            },
        });
    }

    let records = serde_json::from_str::<Vec<ItemRecord>>(body)
        .map_err(|error| FetchError::InvalidPayload(error.to_string()))?;
    Ok(PageResponse::Modified { version, records })
}
