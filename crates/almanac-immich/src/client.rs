//! Async HTTP client for the Immich JSON API.

use std::time::Duration;

use almanac_core::{
  person::Person,
  repository::{Album, AssetRepository, PeoplePage},
};
use reqwest::{
  Client, Method, StatusCode,
  header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{Error, Result, url::normalize_base_url};

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for an Immich server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Server or API base URL; see [`normalize_base_url`].
  pub base_url: String,
  pub api_key:  String,
  pub timeout:  Duration,
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      api_key:  api_key.into(),
      timeout:  DEFAULT_TIMEOUT,
    }
  }
}

/// Async HTTP client for the Immich REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ImmichClient {
  client:   Client,
  base_url: String,
}

// ─── Response shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  assets: SearchAssets,
}

#[derive(Debug, Default, Deserialize)]
struct SearchAssets {
  #[serde(default)]
  items: Vec<AssetItem>,
}

#[derive(Debug, Deserialize)]
struct AssetItem {
  id: Uuid,
}

fn decode<T: DeserializeOwned>(url: String, text: &str) -> Result<T> {
  serde_json::from_str(text).map_err(|source| Error::Decode { url, source })
}

// ─── Client ──────────────────────────────────────────────────────────────────

impl ImmichClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let base_url = normalize_base_url(&config.base_url)?;
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
      return Err(Error::Configuration("API key is required".into()));
    }

    let mut key = HeaderValue::from_str(api_key).map_err(|_| {
      Error::Configuration("API key contains invalid characters".into())
    })?;
    key.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", key);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
      .timeout(config.timeout)
      .default_headers(headers)
      .build()?;
    Ok(Self { client, base_url })
  }

  /// The normalised API base URL requests are sent to.
  pub fn base_url(&self) -> &str { &self.base_url }

  fn url(&self, path: &str) -> String { format!("{}{path}", self.base_url) }

  /// Send one request and return the body of a successful response.
  async fn call(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<&Value>,
  ) -> Result<String> {
    let url = self.url(path);
    match body {
      Some(payload) => {
        tracing::debug!(%method, %url, ?query, %payload, "sending request")
      }
      None => tracing::debug!(%method, %url, ?query, "sending request"),
    }

    let mut req = self.client.request(method.clone(), &url);
    if !query.is_empty() {
      req = req.query(query);
    }
    if let Some(payload) = body {
      req = req.json(payload);
    }

    let resp = req.send().await.inspect_err(|e| {
      tracing::warn!(%method, %url, error = %e, "request failed");
    })?;
    let status = resp.status();
    tracing::debug!(%method, %url, %status, "received response");
    let text = resp.text().await?;

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
      tracing::warn!(%method, %url, %status, "API key rejected");
      return Err(Error::Authentication {
        method,
        url,
        status,
      });
    }
    if !status.is_success() {
      tracing::warn!(
        %method, %url, %status, body = %text, "request unsuccessful"
      );
      return Err(Error::Status {
        method,
        url,
        status,
        body: text,
      });
    }
    Ok(text)
  }

  async fn get<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let text = self.call(Method::GET, path, query, None).await?;
    decode(self.url(path), &text)
  }

  async fn send<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: &Value,
  ) -> Result<T> {
    let text = self.call(method, path, &[], Some(body)).await?;
    decode(self.url(path), &text)
  }
}

impl AssetRepository for ImmichClient {
  type Error = Error;

  // ── Albums ────────────────────────────────────────────────────────────────

  /// `GET /albums`
  async fn list_albums(&self) -> Result<Vec<Album>> {
    self.get("/albums", &[]).await
  }

  /// `POST /albums` with `{albumName, assetIds: []}`
  async fn create_album(&self, name: &str) -> Result<Album> {
    let body = json!({ "albumName": name, "assetIds": [] });
    self.send(Method::POST, "/albums", &body).await
  }

  /// `PUT /albums/{id}/assets` with `{ids}`. The per-asset results in the
  /// response are not inspected.
  async fn add_assets(&self, album_id: Uuid, asset_ids: &[Uuid]) -> Result<()> {
    let body = json!({ "ids": asset_ids });
    self
      .call(
        Method::PUT,
        &format!("/albums/{album_id}/assets"),
        &[],
        Some(&body),
      )
      .await?;
    Ok(())
  }

  // ── People ────────────────────────────────────────────────────────────────

  /// `GET /search/person?name=&withHidden=`
  async fn search_people(
    &self,
    name: &str,
    with_hidden: bool,
  ) -> Result<Vec<Person>> {
    self
      .get("/search/person", &[
        ("name", name.to_owned()),
        ("withHidden", with_hidden.to_string()),
      ])
      .await
  }

  /// `GET /people?page=&size=&withHidden=`
  async fn list_people(
    &self,
    page: u32,
    size: u32,
    with_hidden: bool,
  ) -> Result<PeoplePage> {
    self
      .get("/people", &[
        ("page", page.to_string()),
        ("size", size.to_string()),
        ("withHidden", with_hidden.to_string()),
      ])
      .await
  }

  // ── Assets ────────────────────────────────────────────────────────────────

  /// `POST /search/metadata`
  async fn search_assets(
    &self,
    payload: &Map<String, Value>,
  ) -> Result<Vec<Uuid>> {
    let body = Value::Object(payload.clone());
    let found: SearchResponse =
      self.send(Method::POST, "/search/metadata", &body).await?;
    Ok(found.assets.items.into_iter().map(|a| a.id).collect())
  }
}
