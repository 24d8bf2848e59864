// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API access and client-side business logic.

pub mod api;
pub mod auth;
pub mod session;
pub mod trips;

pub use api::{ApiClient, HealthResponse};
pub use auth::{AuthService, Landing};
pub use session::{FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenClaims, TokenStore};
pub use trips::{ActionOutcome, TripService, TripView};
