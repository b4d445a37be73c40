// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token codec.
//!
//! Verification order: decode the payload, reject expired tokens, then check
//! the header algorithm and signature. An expired token therefore always
//! reports [`TokenError::Expired`], whatever its signature, while claims are
//! only ever returned after the signature has verified.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use super::claims::{Claims, ExpiryProbe, StateClaims};

/// Session token lifetime (7 days).
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// OAuth `state` lifetime (10 minutes).
pub const STATE_TTL_SECS: i64 = 10 * 60;

const STATE_PURPOSE: &str = "oauth_state";
const ACCEPTED_ALG: &str = "HS256";

/// Header `alg` as written by the client, including values such as `none`
/// that `jsonwebtoken::Algorithm` cannot represent.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    MissingSecret,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature or algorithm does not match")]
    SignatureMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token could not be signed: {0}")]
    Encoding(String),
}

/// Issues and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    has_secret: bool,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("has_secret", &self.has_secret)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            has_secret: !secret.is_empty(),
        }
    }

    pub fn issue(&self, user_id: i64, email: &str, google_id: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, google_id, Utc::now().timestamp())
    }

    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        google_id: &str,
        now: i64,
    ) -> Result<String, TokenError> {
        self.sign(&Claims {
            user_id,
            email: email.to_string(),
            google_id: google_id.to_string(),
            iat: now,
            exp: now + SESSION_TTL_SECS,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        self.decode_checked(token, now)
    }

    /// Signed, short-lived OAuth `state` value.
    pub fn issue_state(&self) -> Result<String, TokenError> {
        self.issue_state_at(Utc::now().timestamp())
    }

    pub fn issue_state_at(&self, now: i64) -> Result<String, TokenError> {
        self.sign(&StateClaims {
            purpose: STATE_PURPOSE.to_string(),
            nonce: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + STATE_TTL_SECS,
        })
    }

    pub fn verify_state(&self, state: &str) -> Result<(), TokenError> {
        self.verify_state_at(state, Utc::now().timestamp())
    }

    pub fn verify_state_at(&self, state: &str, now: i64) -> Result<(), TokenError> {
        let claims: StateClaims = self.decode_checked(state, now)?;
        if claims.purpose != STATE_PURPOSE {
            return Err(TokenError::Malformed);
        }
        Ok(())
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        if !self.has_secret {
            return Err(TokenError::MissingSecret);
        }
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn decode_checked<T: DeserializeOwned>(&self, token: &str, now: i64) -> Result<T, TokenError> {
        if !self.has_secret {
            return Err(TokenError::MissingSecret);
        }

        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };
        let header: RawHeader = decode_segment(header)?;
        let probe: ExpiryProbe = decode_segment(payload)?;

        if now >= probe.exp {
            return Err(TokenError::Expired);
        }
        if header.alg != ACCEPTED_ALG {
            return Err(TokenError::SignatureMismatch);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::SignatureMismatch,
                _ => TokenError::Malformed,
            })
    }
}

/// Decode one unverified base64url JSON segment.
fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret")
    }

    #[test]
    fn issued_token_round_trips() {
        let token = codec().issue_at(7, "amy@example.com", "g-7", NOW).unwrap();
        let claims = codec().verify_at(&token, NOW + 60).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "amy@example.com");
        assert_eq!(claims.google_id, "g-7");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + SESSION_TTL_SECS);
    }

    #[test]
    fn token_expires_exactly_at_exp() {
        let token = codec().issue_at(7, "amy@example.com", "g-7", NOW).unwrap();
        assert!(codec().verify_at(&token, NOW + SESSION_TTL_SECS - 1).is_ok());
        assert_eq!(
            codec().verify_at(&token, NOW + SESSION_TTL_SECS),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn expired_token_with_wrong_signature_reports_expired() {
        let token = TokenCodec::new("other-secret")
            .issue_at(7, "amy@example.com", "g-7", NOW)
            .unwrap();
        assert_eq!(
            codec().verify_at(&token, NOW + SESSION_TTL_SECS + 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn other_secret_never_verifies() {
        let token = TokenCodec::new("other-secret")
            .issue_at(7, "amy@example.com", "g-7", NOW)
            .unwrap();
        assert_eq!(
            codec().verify_at(&token, NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let claims = Claims {
            user_id: 7,
            email: "amy@example.com".to_string(),
            google_id: "g-7".to_string(),
            iat: NOW,
            exp: NOW + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(
            codec().verify_at(&token, NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    fn unsigned_token(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            format!(
                r#"{{"user_id":7,"email":"amy@example.com","google_id":"g-7","iat":{NOW},"exp":{exp}}}"#
            )
            .as_bytes(),
        );
        format!("{header}.{payload}.")
    }

    #[test]
    fn alg_none_is_a_signature_mismatch() {
        assert_eq!(
            codec().verify_at(&unsigned_token(NOW + 60), NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn expired_alg_none_still_reports_expired() {
        assert_eq!(
            codec().verify_at(&unsigned_token(NOW - 1), NOW),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let token = codec().issue_at(7, "amy@example.com", "g-7", NOW).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            format!(
                r#"{{"user_id":1,"email":"amy@example.com","google_id":"g-7","iat":{NOW},"exp":{}}}"#,
                NOW + 60
            )
            .as_bytes(),
        );
        parts[1] = &forged;
        assert_eq!(
            codec().verify_at(&parts.join("."), NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(codec().verify_at("not-a-token", NOW), Err(TokenError::Malformed));
        assert_eq!(codec().verify_at("a.b.c", NOW), Err(TokenError::Malformed));
        assert_eq!(codec().verify_at("", NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn empty_secret_cannot_issue_or_verify() {
        let empty = TokenCodec::new("");
        assert_eq!(
            empty.issue_at(7, "amy@example.com", "g-7", NOW),
            Err(TokenError::MissingSecret)
        );
        let token = codec().issue_at(7, "amy@example.com", "g-7", NOW).unwrap();
        assert_eq!(empty.verify_at(&token, NOW), Err(TokenError::MissingSecret));
    }

    #[test]
    fn state_round_trips_and_expires() {
        let state = codec().issue_state_at(NOW).unwrap();
        assert!(codec().verify_state_at(&state, NOW + STATE_TTL_SECS - 1).is_ok());
        assert_eq!(
            codec().verify_state_at(&state, NOW + STATE_TTL_SECS),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn state_and_session_tokens_are_not_interchangeable() {
        let state = codec().issue_state_at(NOW).unwrap();
        let session = codec().issue_at(7, "amy@example.com", "g-7", NOW).unwrap();

        assert_eq!(codec().verify_at(&state, NOW), Err(TokenError::Malformed));
        assert_eq!(
            codec().verify_state_at(&session, NOW),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn debug_hides_key_material() {
        let debug = format!("{:?}", codec());
        assert!(!debug.contains("test-secret"));
    }
}
