// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models shared with the Transport Match API.

pub mod trip;
pub mod user;

pub use trip::{NewTrip, Trip, TripDetail, TripFilter, TripStatus};
pub use user::{LoginForm, SignupRequest, TokenResponse, UserPublic, UserRole};
