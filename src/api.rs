use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

const ODATA_VERBOSE: &str = "application/json; odata=verbose";
const JSON_UTF8: &str = "application/json; charset=utf-8";
const FOLDER_EXPAND_QUERY: &str = "$select=*&$expand=Folders,Files,Files/ModifiedBy";

/// Failure talking to the SharePoint REST API
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("unexpected response shape from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// The default view of a list, used to build navigation links
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListViewDetails {
    pub id: String,
    pub server_relative_url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Author {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderSummary {
    pub unique_id: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
    pub server_relative_url: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub item_count: u64,
    #[serde(default)]
    pub time_last_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileEntry {
    pub unique_id: String,
    pub name: String,
    pub server_relative_url: String,
    #[serde(default, deserialize_with = "deserialize_length")]
    pub length: u64,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub time_last_modified: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub modified_by: Author,
}

/// One folder with its immediate children, as returned by `getFolderById`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub unique_id: String,
    pub name: String,
    pub server_relative_url: String,
    pub folders: Vec<FolderSummary>,
    pub files: Vec<FileEntry>,
}

/// Verbose OData wraps every payload in `{"d": ...}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    d: T,
}

/// Collections (top level and expanded) carry their items in `results`
#[derive(Debug, Deserialize)]
struct Collection<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FolderNodeWire {
    unique_id: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    name: String,
    server_relative_url: String,
    folders: Collection<FolderSummary>,
    files: Collection<FileEntry>,
}

impl From<FolderNodeWire> for FolderNode {
    fn from(wire: FolderNodeWire) -> Self {
        FolderNode {
            unique_id: wire.unique_id,
            name: wire.name,
            server_relative_url: wire.server_relative_url,
            folders: wire.folders.results,
            files: wire.files.results,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    error: ODataError,
}

#[derive(Debug, Deserialize)]
struct ODataError {
    message: ODataMessage,
}

#[derive(Debug, Deserialize)]
struct ODataMessage {
    value: String,
}

/// `Length` is a string in verbose OData, a number in some proxies
fn deserialize_length<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Length {
        Number(u64),
        Text(String),
    }

    match Option::<Length>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Length::Number(n)) => Ok(n),
        Some(Length::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Explicit nulls decode as the field's default, like a missing field.
/// Deferred authors (`{"__deferred": ...}`) have no fields and end up empty too.
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Quote a value as an OData string literal and percent-encode it for a path
fn odata_literal(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    format!("'{}'", urlencoding::encode(&escaped))
}

pub fn default_view_url(base_url: &str, list_name: &str) -> String {
    format!(
        "{}/_api/web/lists/getByTitle({})/DefaultView",
        base_url,
        odata_literal(list_name)
    )
}

pub fn root_folders_url(base_url: &str, list_name: &str) -> String {
    format!(
        "{}/_api/web/lists/getByTitle({})/rootFolder/Folders",
        base_url,
        odata_literal(list_name)
    )
}

pub fn folder_url(base_url: &str, folder_id: &str) -> String {
    format!(
        "{}/_api/Web/getFolderById({})?{}",
        base_url,
        odata_literal(folder_id),
        FOLDER_EXPAND_QUERY
    )
}

/// Decode a `{"d": T}` body, failing when the envelope is missing
pub fn decode_entity<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, RequestError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.d)
        .map_err(|source| RequestError::Decode {
            url: url.to_string(),
            source,
        })
}

/// Decode a `{"d": {"results": [T]}}` body
pub fn decode_collection<T: DeserializeOwned>(
    url: &str,
    body: &str,
) -> Result<Vec<T>, RequestError> {
    decode_entity::<Collection<T>>(url, body).map(|collection| collection.results)
}

pub fn decode_folder(url: &str, body: &str) -> Result<FolderNode, RequestError> {
    decode_entity::<FolderNodeWire>(url, body).map(FolderNode::from)
}

/// Pull the human-readable message out of an OData error body
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ODataErrorBody>(body) {
        Ok(parsed) => parsed.error.message.value,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn require_identifier(value: &str) -> Result<(), RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError::EmptyIdentifier);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub access_token: Option<String>,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            access_token: None,
        }
    }
}

/// Read-only client for one SharePoint site
#[derive(Clone)]
pub struct SharePointClient {
    base_url: String,
    access_token: Option<String>,
    client: Client,
}

impl SharePointClient {
    pub fn new(settings: ClientSettings) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_VERBOSE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            access_token: settings.access_token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and return the body of a successful response
    async fn get_text(&self, url: &str) -> Result<String, RequestError> {
        tracing::debug!(url, "GET");

        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(RequestError::Status {
                url: url.to_string(),
                status,
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    pub async fn fetch_default_view(
        &self,
        list_name: &str,
    ) -> Result<ListViewDetails, RequestError> {
        let result: Result<ListViewDetails, RequestError> = async {
            require_identifier(list_name)?;
            let url = default_view_url(&self.base_url, list_name);
            let body = self.get_text(&url).await?;
            decode_entity(&url, &body)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Error retrieving default view for list '{}': {}", list_name, e);
        }
        result
    }

    pub async fn fetch_root_folders(
        &self,
        list_name: &str,
    ) -> Result<Vec<FolderSummary>, RequestError> {
        let result: Result<Vec<FolderSummary>, RequestError> = async {
            require_identifier(list_name)?;
            let url = root_folders_url(&self.base_url, list_name);
            let body = self.get_text(&url).await?;
            decode_collection(&url, &body)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Error retrieving root folders for list '{}': {}", list_name, e);
        }
        result
    }

    /// Fetch a folder's immediate sub-folders and files (with `ModifiedBy` expanded)
    pub async fn fetch_folder(&self, folder_id: &str) -> Result<FolderNode, RequestError> {
        let result: Result<FolderNode, RequestError> = async {
            require_identifier(folder_id)?;
            let url = folder_url(&self.base_url, folder_id);
            let body = self.get_text(&url).await?;
            decode_folder(&url, &body)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Error retrieving files from folder '{}': {}", folder_id, e);
        }
        result
    }
}
