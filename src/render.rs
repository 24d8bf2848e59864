// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plain-text rendering of trips and users for the terminal.

use crate::models::{Trip, UserPublic};
use crate::services::TripView;
use std::fmt::Write as _;

/// Compensation in whole kronor when there is no fractional part.
pub fn format_sek(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0} SEK")
    } else {
        format!("{amount:.2} SEK")
    }
}

pub fn user_line(user: &UserPublic) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

/// One-line summary used in listings.
pub fn trip_line(trip: &Trip) -> String {
    format!(
        "#{} {} → {}  {}  {}  [{}]",
        trip.id,
        trip.origin,
        trip.destination,
        trip.date.as_deref().unwrap_or("-"),
        format_sek(trip.compensation_sek),
        trip.status.label()
    )
}

/// Multi-line description of a single trip.
pub fn trip_card(trip: &Trip) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {} → {}", trip.id, trip.origin, trip.destination);
    let _ = writeln!(
        out,
        "Date: {} | Time: {}",
        trip.date.as_deref().unwrap_or("-"),
        trip.time_window.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "Compensation: {}", format_sek(trip.compensation_sek));
    let _ = writeln!(out, "Status: {}", trip.status);
    if let Some(vehicle) = &trip.vehicle_info {
        let _ = writeln!(out, "Vehicle: {vehicle}");
    }
    out
}

pub fn trip_list(trips: &[Trip], empty_message: &str) -> String {
    if trips.is_empty() {
        return format!("{empty_message}\n");
    }
    trips.iter().map(|t| trip_line(t) + "\n").collect()
}

/// Trip detail with the driver (when visible) and the offered actions.
pub fn trip_view(view: &TripView) -> String {
    let mut out = trip_card(&view.detail.trip);
    out.push('\n');

    match &view.detail.reserved_driver {
        Some(driver) => {
            let _ = writeln!(out, "Reserved by: {}", user_line(driver));
        }
        None => {
            let _ = writeln!(out, "No driver visible (trip is open, or not yours).");
        }
    }

    if view.actions.is_empty() {
        let _ = writeln!(out, "Actions: none");
    } else {
        let names: Vec<&str> = view.actions.iter().map(|a| a.as_str()).collect();
        let _ = writeln!(out, "Actions: {}", names.join(", "));
    }
    out
}
