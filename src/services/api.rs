// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport Match API client.
//!
//! Handles:
//! - Bearer token attachment from the token store
//! - JSON and form-encoded request bodies
//! - Status-based error classification (401 clears the stored token)
//! - Request timeout

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::lifecycle::TripAction;
use crate::models::{
    LoginForm, NewTrip, SignupRequest, TokenResponse, Trip, TripDetail, UserPublic,
};
use crate::services::session::{load_live_token, SharedTokenStore, TokenStore};
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Low-level API client: one method per backend endpoint.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: SharedTokenStore,
}

impl ApiClient {
    /// Create a client for the given base URL with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration, tokens: SharedTokenStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("transport-match/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &Config, tokens: SharedTokenStore) -> Result<Self> {
        Self::new(&config.api_base_url, config.timeout, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &SharedTokenStore {
        &self.tokens
    }

    // ─── Auth ────────────────────────────────────────────────────

    /// Create an account. Does not store the returned token.
    pub async fn signup(&self, request: &SignupRequest) -> Result<TokenResponse> {
        self.send_json(self.public_request(Method::POST, "/auth/signup").json(request))
            .await
    }

    /// Exchange credentials for a token. Does not store the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let form = LoginForm {
            username: email.to_string(),
            password: password.to_string(),
        };
        self.send_json(self.public_request(Method::POST, "/auth/login").form(&form))
            .await
    }

    /// Get the user behind the stored token.
    pub async fn me(&self) -> Result<UserPublic> {
        self.get_json("/me").await
    }

    // ─── Trips ───────────────────────────────────────────────────

    /// List open trips (public).
    pub async fn list_open_trips(&self) -> Result<Vec<Trip>> {
        self.get_json("/trips").await
    }

    /// Trips owned (company) or reserved (driver) by the caller.
    pub async fn my_trips(&self) -> Result<Vec<Trip>> {
        self.get_json("/trips/mine").await
    }

    pub async fn get_trip(&self, trip_id: i64) -> Result<TripDetail> {
        self.get_json(&format!("/trips/{trip_id}")).await
    }

    pub async fn create_trip(&self, trip: &NewTrip) -> Result<Trip> {
        self.send_json(self.request(Method::POST, "/trips")?.json(trip))
            .await
    }

    /// Request a lifecycle transition. The response body is ignored.
    pub async fn trip_action(&self, action: TripAction, trip_id: i64) -> Result<()> {
        let (method, path) = action.endpoint(trip_id);
        let mut builder = self.request(method.clone(), &path)?;
        if method == Method::POST {
            builder = builder.json(&serde_json::json!({}));
        }
        self.send(builder).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/health").await
    }

    // ─── Plumbing ────────────────────────────────────────────────

    /// Start a request without credentials.
    fn public_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Start a request, attaching the stored token if there is one.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let builder = self.public_request(method, path);

        Ok(match load_live_token(self.tokens.as_ref())? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::GET, path)?).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        if !is_json(&response) {
            return Err(ClientError::Decode(format!(
                "expected a JSON body from {}",
                response.url().path()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("JSON parse error: {}", e)))
    }

    /// Send a request and check the response status.
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let request = builder
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let sent_token = request.headers().contains_key(header::AUTHORIZATION);
        let started = Instant::now();

        let response = self.http.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(%method, %path, "Request timed out");
                ClientError::Timeout {
                    base_url: self.base_url.clone(),
                }
            } else {
                ClientError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        tracing::debug!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "API request finished"
        );

        self.check_response(response, sent_token).await
    }

    /// Check response status and return error if not successful.
    ///
    /// A 401 only says something about the stored token when the request
    /// carried it. A failed login leaves the current session alone.
    async fn check_response(
        &self,
        response: reqwest::Response,
        sent_token: bool,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        // Expired or invalid token: drop it so the next run starts logged out
        if status == StatusCode::UNAUTHORIZED && sent_token {
            tracing::info!("Server rejected session token (401), clearing it");
            self.tokens.clear()?;
        }

        Err(ClientError::from_status(status, &body))
    }
}

/// Whether a response carries a JSON body.
fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}
