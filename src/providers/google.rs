// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google OAuth2 sign-in.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{http_client, IdentityProfile, IdentityProvider, ProviderError};
use crate::config::GoogleOAuthConfig;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: Client,
}

impl GoogleOAuthClient {
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, ProviderError> {
        info!(redirect_url = %config.redirect_url, "Google OAuth initialized");
        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            http: http_client()?,
        })
    }

    async fn access_token(&self, code: &str) -> Result<String, ProviderError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
        ];

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::ExchangeFailed(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ExchangeFailed(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ExchangeFailed(format!("invalid token response: {e}")))?;

        if token.access_token.trim().is_empty() {
            return Err(ProviderError::ExchangeFailed(
                "token response did not include access_token".to_string(),
            ));
        }

        Ok(token.access_token)
    }

    async fn profile(&self, access_token: &str) -> Result<IdentityProfile, ProviderError> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::ProfileFetchFailed(format!("userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ProfileFetchFailed(format!(
                "userinfo returned {status}: {body}"
            )));
        }

        let profile: IdentityProfile = response
            .json()
            .await
            .map_err(|e| ProviderError::ProfileFetchFailed(format!("invalid userinfo: {e}")))?;

        if profile.id.is_empty() || profile.email.is_empty() {
            return Err(ProviderError::ProfileFetchFailed(
                "userinfo is missing id or email".to_string(),
            ));
        }

        Ok(profile)
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorize_url(&self, state: &str) -> String {
        build_authorize_url(&self.client_id, &self.redirect_url, state)
    }

    async fn exchange(&self, code: &str) -> Result<IdentityProfile, ProviderError> {
        let access_token = self.access_token(code).await?;
        self.profile(&access_token).await
    }
}

fn build_authorize_url(client_id: &str, redirect_url: &str, state: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_url)
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("state", state)
        .append_pair("access_type", "offline")
        .finish();
    format!("{AUTH_URL}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn authorize_url_carries_client_state_and_scopes() {
        let url = build_authorize_url(
            "client-123",
            "http://localhost:8080/auth/google/callback",
            "state-abc",
        );
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with(AUTH_URL));
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(
            pairs["redirect_uri"],
            "http://localhost:8080/auth/google/callback"
        );
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["state"], "state-abc");
        assert_eq!(pairs["access_type"], "offline");
        assert!(pairs["scope"].contains("userinfo.email"));
        assert!(pairs["scope"].contains("userinfo.profile"));
    }

    #[test]
    fn client_uses_configured_redirect() {
        let client = GoogleOAuthClient::new(&GoogleOAuthConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "https://api.example/cb".to_string(),
        })
        .unwrap();
        assert!(client
            .authorize_url("s")
            .contains("redirect_uri=https%3A%2F%2Fapi.example%2Fcb"));
    }

    #[test]
    fn userinfo_payload_deserializes() {
        let profile: IdentityProfile = serde_json::from_str(
            r#"{"id":"1170","email":"amy@example.com","verified_email":true,"name":"Amy","picture":"https://p"}"#,
        )
        .unwrap();
        assert_eq!(profile.id, "1170");
        assert_eq!(profile.name, "Amy");
    }
}
