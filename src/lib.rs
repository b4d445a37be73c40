// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Personalnote API Server
//!
//! Article CRUD and keyword search over MySQL, Google sign-in issuing HS256
//! bearer tokens, and file uploads passed through to Google Drive.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, router and OpenAPI document (Axum)
//! - `auth` - Session tokens, bearer extraction and the auth middleware
//! - `cors` - Origin allow-list middleware
//! - `providers` - Google OAuth and Google Drive clients
//! - `storage` - Article and user stores (MySQL, in-memory)

pub mod api;
pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
pub mod telemetry;
