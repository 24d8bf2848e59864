// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip browsing and lifecycle actions.

use crate::error::{ClientError, Result};
use crate::lifecycle::{available_actions, project_detail, TripAction, Viewer};
use crate::models::{NewTrip, Trip, TripDetail, TripFilter, UserRole};
use crate::services::api::ApiClient;
use crate::services::auth::AuthService;
use serde::Serialize;

/// A trip detail as seen by a particular viewer.
#[derive(Debug, Clone, Serialize)]
pub struct TripView {
    #[serde(flatten)]
    pub detail: TripDetail,
    /// Actions this viewer may request
    pub actions: Vec<TripAction>,
}

/// Result of a lifecycle action, after reloading the trip.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action: TripAction,
    /// Trip state as reported by the server after the action
    pub view: TripView,
}

/// High-level trip operations.
#[derive(Clone)]
pub struct TripService {
    api: ApiClient,
    auth: AuthService,
}

impl TripService {
    pub fn new(api: ApiClient) -> Self {
        let auth = AuthService::new(api.clone());
        Self { api, auth }
    }

    /// Open trips, narrowed by the filter.
    pub async fn explore(&self, filter: &TripFilter) -> Result<Vec<Trip>> {
        let trips = self.api.list_open_trips().await?;
        let total = trips.len();
        let trips = filter.apply(trips);
        tracing::debug!(total, shown = trips.len(), "Loaded open trips");
        Ok(trips)
    }

    /// Trips owned or reserved by the logged-in user.
    pub async fn mine(&self) -> Result<Vec<Trip>> {
        if self.auth.restore().await?.is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        self.api.my_trips().await
    }

    /// Who is asking: anonymous, or the user plus the ids of their trips.
    pub async fn viewer(&self) -> Result<Viewer> {
        match self.auth.restore().await? {
            None => Ok(Viewer::Anonymous),
            Some(user) => {
                let mine = self.api.my_trips().await?;
                Ok(Viewer::user(user, mine.into_iter().map(|t| t.id)))
            }
        }
    }

    /// Load a trip for the current viewer.
    pub async fn detail(&self, trip_id: i64) -> Result<TripView> {
        let viewer = self.viewer().await?;
        self.detail_for(&viewer, trip_id).await
    }

    async fn detail_for(&self, viewer: &Viewer, trip_id: i64) -> Result<TripView> {
        let detail = project_detail(viewer, self.api.get_trip(trip_id).await?);
        let actions = available_actions(viewer, &detail.trip);
        Ok(TripView { detail, actions })
    }

    /// Post a new trip. Only companies may do this.
    pub async fn create(&self, trip: NewTrip) -> Result<Trip> {
        let trip = trip.normalized();
        trip.check()?;
        self.auth.require_role(UserRole::Company).await?;

        let created = self.api.create_trip(&trip).await?;
        tracing::info!(
            trip_id = created.id,
            origin = %created.origin,
            destination = %created.destination,
            "Trip created"
        );
        Ok(created)
    }

    /// Request a lifecycle transition and reload the trip.
    ///
    /// The action is checked against the freshly loaded trip first. The
    /// server may still reject it (another driver got there first). The
    /// trip is then reloaded and returned inside [`ClientError::Rejected`].
    pub async fn perform(&self, action: TripAction, trip_id: i64) -> Result<ActionOutcome> {
        let viewer = self.viewer().await?;
        let Some(role) = viewer.role() else {
            return Err(ClientError::NotLoggedIn);
        };
        if role != action.role() {
            return Err(ClientError::WrongRole {
                required: action.role(),
                actual: role,
            });
        }

        let before = self.detail_for(&viewer, trip_id).await?;
        if !before.actions.contains(&action) {
            return Err(ClientError::ActionNotAvailable { action, trip_id });
        }

        if let Err(e) = self.api.trip_action(action, trip_id).await {
            tracing::warn!(%action, trip_id, error = %e, "Trip action rejected");
            return Err(match self.detail(trip_id).await {
                Ok(view) => ClientError::Rejected {
                    action,
                    trip_id,
                    error: Box::new(e),
                    view: Box::new(view),
                },
                Err(reload) => {
                    tracing::warn!(trip_id, error = %reload, "Reload after rejection failed");
                    e
                }
            });
        }

        // Ownership may have changed (reserve/unreserve), so rebuild the viewer
        let view = self.detail(trip_id).await?;

        if view.detail.trip.status != action.target() {
            tracing::warn!(
                %action,
                trip_id,
                status = %view.detail.trip.status,
                "Trip is not in the expected state after action"
            );
        } else {
            tracing::info!(%action, trip_id, status = %view.detail.trip.status, "Trip updated");
        }

        Ok(ActionOutcome { action, view })
    }
}
