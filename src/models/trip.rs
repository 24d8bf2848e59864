//! Trip model and its status machine.

use crate::error::{ClientError, Result};
use crate::models::UserPublic;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Lifecycle status of a trip.
///
/// OPEN → RESERVED → COMPLETED, with RESERVED → OPEN on release and
/// OPEN/RESERVED → CANCELLED. COMPLETED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TripStatus {
    Open,
    Reserved,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Open,
        TripStatus::Reserved,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Open => "OPEN",
            TripStatus::Reserved => "RESERVED",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            TripStatus::Open => "Open",
            TripStatus::Reserved => "Reserved",
            TripStatus::Completed => "Completed",
            TripStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    /// Whether the server may move a trip from `self` to `next`.
    pub fn can_transition_to(&self, next: TripStatus) -> bool {
        use TripStatus::*;
        matches!(
            (self, next),
            (Open, Reserved)
                | (Open, Cancelled)
                | (Reserved, Open)
                | (Reserved, Completed)
                | (Reserved, Cancelled)
        )
    }

    /// Statuses in which the reserving driver is part of the trip record.
    pub fn has_driver(&self) -> bool {
        matches!(self, TripStatus::Reserved | TripStatus::Completed)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport job posted by a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    /// Date as `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// Free-form pickup window, e.g. "08-12"
    #[serde(default)]
    pub time_window: Option<String>,
    pub compensation_sek: f64,
    #[serde(default)]
    pub vehicle_info: Option<String>,
    pub status: TripStatus,
}

/// Response of `GET /trips/{id}`.
///
/// `reserved_driver` is only filled in by the server for the owning company
/// once the trip is reserved or completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDetail {
    pub trip: Trip,
    #[serde(default)]
    pub reserved_driver: Option<UserPublic>,
}

/// Body of `POST /trips`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewTrip {
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub origin: String,
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[validate(length(max = 200, message = "is too long"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
    pub compensation_sek: f64,
    #[validate(length(max = 200, message = "is too long"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_info: Option<String>,
}

impl NewTrip {
    /// Trim text fields, turning blank optional fields into `None`.
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.origin = self.origin.trim().to_string();
        self.destination = self.destination.trim().to_string();
        self.date = blank_to_none(self.date);
        self.time_window = blank_to_none(self.time_window);
        self.vehicle_info = blank_to_none(self.vehicle_info);
        self
    }

    /// Check the payload before sending it.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if !self.compensation_sek.is_finite() || self.compensation_sek < 0.0 {
            return Err(ClientError::Validation(format!(
                "compensation_sek: must be a non-negative number (got {})",
                self.compensation_sek
            )));
        }

        if let Some(date) = &self.date {
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                ClientError::Validation(format!("date: expected YYYY-MM-DD (got '{date}')"))
            })?;
        }

        Ok(())
    }
}

/// Client-side search over the public trip list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    /// Case-insensitive substring of the origin
    pub origin: Option<String>,
    /// Case-insensitive substring of the destination
    pub destination: Option<String>,
    /// Exact `YYYY-MM-DD` match
    pub date: Option<String>,
}

impl TripFilter {
    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.destination.is_none() && self.date.is_none()
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
            }
        }

        if !contains(&trip.origin, &self.origin) || !contains(&trip.destination, &self.destination)
        {
            return false;
        }

        match self.date.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(d) => trip.date.as_deref() == Some(d),
        }
    }

    pub fn apply(&self, trips: Vec<Trip>) -> Vec<Trip> {
        trips.into_iter().filter(|t| self.matches(t)).collect()
    }
}
