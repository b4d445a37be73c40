// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Third-party collaborators: Google sign-in and Google Drive uploads.
//!
//! Handlers only see the [`IdentityProvider`] and [`BlobStorage`] traits so
//! tests can swap in stubs without network access.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod drive;
pub mod google;

pub use drive::DriveClient;
pub use google::GoogleOAuthClient;

/// Timeout applied to every outbound provider request.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("provider client could not be built: {0}")]
    Client(String),
}

/// Profile returned by the identity provider after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Provider-side account identifier.
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// OAuth2 identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page URL carrying the given anti-forgery `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the signed-in user's profile.
    async fn exchange(&self, code: &str) -> Result<IdentityProfile, ProviderError>;
}

/// A file to store remotely.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub parent_folder_id: Option<String>,
}

/// Metadata of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub web_view_link: String,
}

/// Remote blob storage.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<StoredBlob, ProviderError>;
}

pub(crate) fn http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::Client(format!("failed to build HTTP client: {e}")))
}
