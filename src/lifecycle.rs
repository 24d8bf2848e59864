// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role- and status-gated trip actions.
//!
//! The server is the sole arbiter of trip transitions. This module decides
//! which actions are worth offering to a given viewer, so that a company is
//! never shown "reserve" and a driver never sees "complete".

use crate::models::{Trip, TripDetail, TripStatus, UserPublic, UserRole};
use reqwest::Method;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A state transition a user can request on a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TripAction {
    Reserve,
    Unreserve,
    Complete,
    Cancel,
}

impl TripAction {
    pub const ALL: [TripAction; 4] = [
        TripAction::Reserve,
        TripAction::Unreserve,
        TripAction::Complete,
        TripAction::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripAction::Reserve => "reserve",
            TripAction::Unreserve => "unreserve",
            TripAction::Complete => "complete",
            TripAction::Cancel => "cancel",
        }
    }

    /// The role allowed to perform this action.
    pub fn role(&self) -> UserRole {
        match self {
            TripAction::Reserve | TripAction::Unreserve => UserRole::Driver,
            TripAction::Complete | TripAction::Cancel => UserRole::Company,
        }
    }

    /// Whether the action is only available on trips tied to the viewer
    /// (owned by the company, or held by the driver).
    pub fn requires_ownership(&self) -> bool {
        !matches!(self, TripAction::Reserve)
    }

    /// Status the trip must be in for the action to apply.
    pub fn applies_to(&self, status: TripStatus) -> bool {
        status.can_transition_to(self.target())
            && match self {
                TripAction::Reserve => status == TripStatus::Open,
                TripAction::Unreserve => status == TripStatus::Reserved,
                TripAction::Complete => status == TripStatus::Reserved,
                TripAction::Cancel => true,
            }
    }

    /// Status the server moves the trip to on success.
    pub fn target(&self) -> TripStatus {
        match self {
            TripAction::Reserve => TripStatus::Reserved,
            TripAction::Unreserve => TripStatus::Open,
            TripAction::Complete => TripStatus::Completed,
            TripAction::Cancel => TripStatus::Cancelled,
        }
    }

    /// HTTP method and path of the endpoint for this action.
    pub fn endpoint(&self, trip_id: i64) -> (Method, String) {
        match self {
            TripAction::Reserve => (Method::POST, format!("/trips/{trip_id}/reserve")),
            TripAction::Unreserve => (Method::DELETE, format!("/trips/{trip_id}/reserve")),
            TripAction::Complete => (Method::POST, format!("/trips/{trip_id}/complete")),
            TripAction::Cancel => (Method::POST, format!("/trips/{trip_id}/cancel")),
        }
    }
}

impl fmt::Display for TripAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is looking at a trip.
#[derive(Debug, Clone, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User {
        user: UserPublic,
        /// Ids from `GET /trips/mine`: owned trips for a company,
        /// held reservations for a driver.
        my_trips: HashSet<i64>,
    },
}

impl Viewer {
    pub fn user(user: UserPublic, my_trips: impl IntoIterator<Item = i64>) -> Self {
        Viewer::User {
            user,
            my_trips: my_trips.into_iter().collect(),
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User { user, .. } => Some(user.role),
        }
    }

    /// Whether the trip is tied to this viewer.
    pub fn is_mine(&self, trip_id: i64) -> bool {
        match self {
            Viewer::Anonymous => false,
            Viewer::User { my_trips, .. } => my_trips.contains(&trip_id),
        }
    }

    /// Whether the action is offered to this viewer for this trip.
    pub fn can(&self, action: TripAction, trip: &Trip) -> bool {
        self.role() == Some(action.role())
            && action.applies_to(trip.status)
            && (!action.requires_ownership() || self.is_mine(trip.id))
    }
}

/// Actions the viewer may perform on the trip, in display order.
pub fn available_actions(viewer: &Viewer, trip: &Trip) -> Vec<TripAction> {
    TripAction::ALL
        .into_iter()
        .filter(|action| viewer.can(*action, trip))
        .collect()
}

/// The reserving driver, if this viewer is allowed to see it.
///
/// Only the owning company sees the driver, and only once the trip is
/// reserved or completed. Anything the server sends outside that window is
/// dropped.
pub fn visible_reserved_driver<'a>(
    viewer: &Viewer,
    detail: &'a TripDetail,
) -> Option<&'a UserPublic> {
    let allowed = viewer.role() == Some(UserRole::Company)
        && viewer.is_mine(detail.trip.id)
        && detail.trip.status.has_driver();

    if allowed {
        detail.reserved_driver.as_ref()
    } else {
        None
    }
}

/// Copy of the detail with `reserved_driver` redacted for this viewer.
pub fn project_detail(viewer: &Viewer, detail: TripDetail) -> TripDetail {
    let reserved_driver = visible_reserved_driver(viewer, &detail).cloned();
    TripDetail {
        trip: detail.trip,
        reserved_driver,
    }
}
