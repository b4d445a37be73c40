// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::auth::TokenCodec;
use crate::cors::OriginPolicy;
use crate::providers::{BlobStorage, IdentityProvider};
use crate::storage::{ArticleStore, UserStore};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenCodec,
    pub origin_policy: Arc<OriginPolicy>,
    /// Google sign-in; `None` when OAuth is not configured.
    pub identity: Option<Arc<dyn IdentityProvider>>,
    /// Drive uploads; `None` when no Drive credentials are configured.
    pub blobs: Option<Arc<dyn BlobStorage>>,
    pub upload_folder_id: Option<String>,
    pub frontend_url: String,
    hits: Arc<AtomicU64>,
}

impl AppState {
    /// State over a store serving both articles and users.
    pub fn new<S>(store: Arc<S>, tokens: TokenCodec) -> Self
    where
        S: ArticleStore + UserStore + 'static,
    {
        Self {
            articles: store.clone(),
            users: store,
            tokens,
            origin_policy: Arc::new(OriginPolicy::allow_all()),
            identity: None,
            blobs: None,
            upload_folder_id: None,
            frontend_url: "http://localhost:3000".to_string(),
            hits: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.origin_policy = Arc::new(policy);
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_blobs(mut self, blobs: Arc<dyn BlobStorage>, folder_id: Option<String>) -> Self {
        self.blobs = Some(blobs);
        self.upload_folder_id = folder_id;
        self
    }

    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Count one hello request and return the new total.
    pub fn record_hit(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
impl AppState {
    /// Memory-backed state with a fixed secret.
    pub(crate) fn for_tests() -> Self {
        Self::new(
            Arc::new(crate::storage::MemoryStore::new()),
            TokenCodec::new("test-secret"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_are_counted_across_clones() {
        let state = AppState::for_tests();
        let clone = state.clone();
        assert_eq!(state.record_hit(), 1);
        assert_eq!(clone.record_hit(), 2);
        assert_eq!(state.hits(), 2);
    }

    #[test]
    fn frontend_url_drops_trailing_slash() {
        let state = AppState::for_tests().with_frontend_url("https://app.example/");
        assert_eq!(state.frontend_url, "https://app.example");
    }
}
