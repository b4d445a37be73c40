// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google Drive upload client.
//!
//! Access tokens are obtained either from a long-lived refresh token or from
//! a service account key (RS256 JWT bearer grant). A fresh token is fetched
//! for every upload.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{http_client, BlobStorage, ProviderError, StoredBlob, UploadRequest};
use crate::config::{DriveConfig, DriveCredentials};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const UPLOAD_FIELDS: &str = "id,name,mimeType,webViewLink";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;

/// Service account key as downloaded from the Google Cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<[&'a str; 1]>,
}

#[derive(Clone)]
pub struct DriveClient {
    credentials: DriveCredentials,
    http: Client,
}

impl DriveClient {
    pub fn new(config: &DriveConfig) -> Result<Self, ProviderError> {
        match &config.credentials {
            DriveCredentials::RefreshToken { .. } => info!("Drive uploads use a refresh token"),
            DriveCredentials::ServiceAccount(key) => {
                info!(client_email = %key.client_email, "Drive uploads use a service account")
            }
        }
        Ok(Self {
            credentials: config.credentials.clone(),
            http: http_client()?,
        })
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let (token_uri, form): (&str, Vec<(&str, String)>) = match &self.credentials {
            DriveCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => (
                DEFAULT_TOKEN_URI,
                vec![
                    ("grant_type", "refresh_token".to_string()),
                    ("refresh_token", refresh_token.clone()),
                    ("client_id", client_id.clone()),
                    ("client_secret", client_secret.clone()),
                ],
            ),
            DriveCredentials::ServiceAccount(key) => (
                key.token_uri.as_str(),
                vec![
                    ("grant_type", JWT_BEARER_GRANT.to_string()),
                    ("assertion", sign_assertion(key, Utc::now().timestamp())?),
                ],
            ),
        };

        let response = self
            .http
            .post(token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::UploadFailed(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UploadFailed(format!(
                "token request returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::UploadFailed(format!("invalid token response: {e}")))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl BlobStorage for DriveClient {
    async fn upload(&self, request: UploadRequest) -> Result<StoredBlob, ProviderError> {
        if request.parent_folder_id.is_none() {
            warn!("GOOGLE_DRIVE_FOLDER_ID not set, uploading to the drive root");
        }

        let token = self.access_token().await?;
        let boundary = format!("upload-{}", Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &request)?;

        let response = self
            .http
            .post(UPLOAD_URL)
            .query(&[("uploadType", "multipart"), ("fields", UPLOAD_FIELDS)])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::UploadFailed(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UploadFailed(format!(
                "upload returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::UploadFailed(format!("invalid upload response: {e}")))
    }
}

/// Sign the JWT used for the service account bearer grant.
fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, ProviderError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: DRIVE_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_TTL_SECS,
    };
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| ProviderError::UploadFailed(format!("invalid service account key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| ProviderError::UploadFailed(format!("assertion signing failed: {e}")))
}

/// Build a `multipart/related` body: JSON metadata part, then the media part.
fn multipart_related_body(boundary: &str, request: &UploadRequest) -> Result<Vec<u8>, ProviderError> {
    let metadata = FileMetadata {
        name: &request.filename,
        parents: request.parent_folder_id.as_deref().map(|id| [id]),
    };
    let metadata = serde_json::to_string(&metadata)
        .map_err(|e| ProviderError::UploadFailed(format!("metadata encoding failed: {e}")))?;

    let mut body = Vec::with_capacity(request.bytes.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: {}\r\n\r\n", request.content_type).as_bytes(),
    );
    body.extend_from_slice(&request.bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}
