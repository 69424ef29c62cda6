//! Firebase Storage provider
//!
//! Talks to the Google Cloud Storage JSON API of the Firebase bucket.
//! Requests are authorized with an OAuth access token minted from a service
//! account key (RS256 JWT bearer grant), or with a static token when running
//! against the storage emulator. Uploaded objects get a
//! `firebaseStorageDownloadTokens` metadata entry so that the public
//! `firebasestorage.googleapis.com` download link works without auth.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::StorageConfig;
use crate::models::StoredObject;
use crate::storage::ObjectStorage;
use crate::utils::errors::{PageDropError, Result, StorageError, StorageResult};
use crate::utils::logging::log_storage_operation;

const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DOWNLOAD_TOKEN_KEY: &str = "firebaseStorageDownloadTokens";
/// Tokens are refreshed this long before Google says they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The subset of a Google service account key file we need
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug, Clone)]
enum TokenSource {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        cached: Arc<Mutex<Option<CachedToken>>>,
    },
}

/// Object resource as returned by the JSON API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    name: String,
    /// The API encodes 64-bit sizes as strings
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    updated: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

impl ObjectResource {
    fn into_stored_object(self) -> StoredObject {
        let download_token = self.metadata.as_ref().and_then(|m| m.get(DOWNLOAD_TOKEN_KEY)).and_then(|tokens| {
            // Several comma-separated tokens may exist; any of them works
            tokens.split(',').next().map(|t| t.trim().to_string())
        });

        StoredObject {
            size: self.size.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0),
            path: self.name,
            content_type: self.content_type,
            download_token,
            updated_at: self.updated,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Firebase Storage bucket client
#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: Client,
    bucket: String,
    api_url: String,
    download_url: String,
    tokens: TokenSource,
}

impl FirebaseStorage {
    /// Build a client from the storage settings
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("PageDrop-Bot/1.0")
            .build()?;

        let tokens = if let Some(token) = &config.emulator_token {
            info!("Using static storage token (emulator mode)");
            TokenSource::Static(token.clone())
        } else {
            let raw = match (&config.credentials_json, &config.credentials_path) {
                (Some(json), _) => json.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => {
                    return Err(PageDropError::Config(
                        "Firebase storage needs credentials_json, credentials_path or emulator_token".to_string(),
                    ))
                }
            };
            let key: ServiceAccountKey = serde_json::from_str(&raw)
                .map_err(|e| StorageError::Credentials(format!("unreadable service account key: {}", e)))?;
            TokenSource::ServiceAccount {
                key,
                cached: Arc::new(Mutex::new(None)),
            }
        };

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            download_url: config.download_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Current access token, minting a new one when the cached token is stale
    async fn access_token(&self) -> StorageResult<String> {
        match &self.tokens {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount { key, cached } => {
                let mut cached = cached.lock().await;
                if let Some(token) = cached.as_ref() {
                    if Instant::now() < token.refresh_at {
                        return Ok(token.value.clone());
                    }
                }

                let fresh = self.fetch_token(key).await?;
                let value = fresh.value.clone();
                *cached = Some(fresh);
                Ok(value)
            }
        }
    }

    async fn fetch_token(&self, key: &ServiceAccountKey) -> StorageResult<CachedToken> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            iss: &key.client_email,
            scope: STORAGE_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StorageError::Credentials(e.to_string()))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| StorageError::Credentials(e.to_string()))?;

        debug!(client_email = %key.client_email, "Requesting storage access token");

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Unauthorized(format!("token endpoint returned HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_url,
            self.bucket,
            urlencoding::encode(path)
        )
    }

    async fn upload_media(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_url, self.bucket);
        let token = self.access_token().await?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("uploadType", "media"), ("name", path)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(request_error)?;

        check_status(response, path).await?;
        Ok(())
    }

    /// Make the object publicly downloadable and disable edge caching
    async fn publish(&self, path: &str, content_type: &str) -> StorageResult<ObjectResource> {
        let token = self.access_token().await?;
        let download_token = Uuid::new_v4().to_string();
        let body = serde_json::json!({
            "cacheControl": "no-cache",
            "contentType": content_type,
            "metadata": { DOWNLOAD_TOKEN_KEY: download_token },
        });

        let response = self
            .client
            .patch(self.object_url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        check_status(response, path)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    fn provider_type(&self) -> &str {
        "firebase"
    }

    async fn put_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<StoredObject> {
        let start = Instant::now();
        let size = bytes.len();

        let result = async {
            self.upload_media(path, bytes, content_type).await?;
            self.publish(path, content_type).await
        }
        .await;

        log_storage_operation("put", path, start.elapsed().as_millis() as u64, result.is_ok());
        let object = result?.into_stored_object();
        debug!(path = path, size = size, "Object stored");
        Ok(object)
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        let start = Instant::now();
        let url = format!("{}/storage/v1/b/{}/o", self.api_url, self.bucket);
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.access_token().await?;
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(&[("prefix", prefix)]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await.map_err(request_error)?;
            let page: ObjectList = check_status(response, prefix)
                .await?
                .json()
                .await
                .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

            objects.extend(page.items.into_iter().map(ObjectResource::into_stored_object));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        log_storage_operation("list", prefix, start.elapsed().as_millis() as u64, true);
        Ok(objects)
    }

    async fn delete_object(&self, path: &str) -> StorageResult<()> {
        let start = Instant::now();
        let token = self.access_token().await?;

        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_error)?;

        let result = check_status(response, path).await.map(|_| ());
        log_storage_operation("delete", path, start.elapsed().as_millis() as u64, result.is_ok());
        result
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(self.object_url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_error)?;

        match check_status(response, path).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn public_url(&self, object: &StoredObject) -> String {
        let mut url = format!(
            "{}/v0/b/{}/o/{}?alt=media",
            self.download_url,
            self.bucket,
            urlencoding::encode(&object.path)
        );
        if let Some(token) = &object.download_token {
            url.push_str("&token=");
            url.push_str(token);
        }
        url
    }
}

fn request_error(e: reqwest::Error) -> StorageError {
    if e.is_timeout() {
        StorageError::RequestFailed("request timed out".to_string())
    } else if e.is_connect() {
        StorageError::RequestFailed(format!("storage unreachable: {}", e))
    } else {
        StorageError::RequestFailed(e.to_string())
    }
}

/// Map non-success statuses to storage errors
async fn check_status(response: Response, path: &str) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(StorageError::NotFound(path.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(StorageError::Unauthorized(format!("HTTP {}: {}", status, body)))
        }
        _ => Err(StorageError::RequestFailed(format!("HTTP {}: {}", status, body))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> FirebaseStorage {
        let mut config = crate::config::Settings::default().storage;
        config.bucket = "demo.appspot.com".to_string();
        config.emulator_token = Some("owner".to_string());
        FirebaseStorage::from_config(&config).unwrap()
    }

    #[test]
    fn test_public_url_encodes_path_and_token() {
        let storage = storage();
        let object = StoredObject {
            path: "uploads/42/my site.html".to_string(),
            size: 10,
            content_type: None,
            download_token: Some("abc".to_string()),
            updated_at: None,
        };

        assert_eq!(
            storage.public_url(&object),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/uploads%2F42%2Fmy%20site.html?alt=media&token=abc"
        );
    }

    #[test]
    fn test_object_resource_conversion() {
        let resource: ObjectResource = serde_json::from_value(serde_json::json!({
            "name": "uploads/1/a.zip",
            "size": "2048",
            "contentType": "application/zip",
            "metadata": { "firebaseStorageDownloadTokens": "t1,t2" }
        }))
        .unwrap();

        let object = resource.into_stored_object();
        assert_eq!(object.size, 2048);
        assert_eq!(object.download_token.as_deref(), Some("t1"));
        assert_eq!(object.file_name(), "a.zip");
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let mut config = crate::config::Settings::default().storage;
        config.bucket = "demo".to_string();
        assert!(matches!(FirebaseStorage::from_config(&config), Err(PageDropError::Config(_))));
    }
}
