// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Transport Match: companies post transport trips, drivers reserve them.
//!
//! This crate is a client for the Transport Match API. It keeps the
//! session token, wraps every endpoint, and decides which trip actions
//! (reserve, unreserve, complete, cancel) to offer a given user. The
//! server remains the authority on every transition.

pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod render;
pub mod services;
pub mod time_utils;

pub use error::{ClientError, Result};
