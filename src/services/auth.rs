// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup, login and session restore.

use crate::error::{ClientError, Result};
use crate::models::{SignupRequest, UserPublic, UserRole};
use crate::services::api::ApiClient;
use crate::services::session::{load_live_token, TokenStore};
use validator::Validate;

/// Where a freshly authenticated user naturally goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Browse open trips
    Explore,
    /// Post a new trip
    CreateTrip,
}

impl Landing {
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Driver => Landing::Explore,
            UserRole::Company => Landing::CreateTrip,
        }
    }

    /// Command that leads there.
    pub fn hint(&self) -> &'static str {
        match self {
            Landing::Explore => "transport-match trips list",
            Landing::CreateTrip => "transport-match trips create",
        }
    }
}

/// Session management on top of [`ApiClient`].
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create an account, store its token and return the new user.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<UserPublic> {
        let request = SignupRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            role,
        };
        request.validate()?;

        let token = self.api.signup(&request).await?;
        let user = self.finish(&token.access_token).await?;
        tracing::info!(user_id = user.id, role = %user.role, "Signed up");
        Ok(user)
    }

    /// Log in with email and password, store the token and return the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserPublic> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let token = self.api.login(email.trim(), password).await?;
        let user = self.finish(&token.access_token).await?;
        tracing::info!(user_id = user.id, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Forget the stored token.
    pub fn logout(&self) -> Result<()> {
        self.api.tokens().clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Resume the stored session, if any.
    ///
    /// A 401 means the token is dead: it has already been cleared and
    /// `None` is returned. Other failures leave the token in place.
    pub async fn restore(&self) -> Result<Option<UserPublic>> {
        if load_live_token(self.api.tokens().as_ref())?.is_none() {
            return Ok(None);
        }

        match self.api.me().await {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The current user, who must have the given role.
    pub async fn require_role(&self, role: UserRole) -> Result<UserPublic> {
        let user = self.restore().await?.ok_or(ClientError::NotLoggedIn)?;
        if user.role != role {
            return Err(ClientError::WrongRole {
                required: role,
                actual: user.role,
            });
        }
        Ok(user)
    }

    /// Store the token and resolve it to a user.
    async fn finish(&self, token: &str) -> Result<UserPublic> {
        self.api.tokens().save(token)?;
        self.api.me().await
    }
}
