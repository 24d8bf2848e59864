// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the Transport Match API.
//!
//! Enforces the same role and status rules as the real backend so client
//! behavior can be exercised end to end over HTTP.

#![allow(dead_code)]

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tower_http::trace::TraceLayer;
use transport_match::models::{Trip, TripStatus, UserPublic, UserRole};
use transport_match::services::{ApiClient, MemoryTokenStore, SharedTokenStore, TokenStore};

pub const SIGNING_KEY: &[u8] = b"mock_backend_signing_key_32bytes";
pub const PASSWORD: &str = "secret123";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Create a token the mock backend accepts.
pub fn token_for(user_id: i64, ttl_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + ttl_secs).max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap()
}

struct UserRecord {
    public: UserPublic,
    password: String,
}

struct TripRecord {
    trip: Trip,
    company_id: i64,
    driver_id: Option<i64>,
}

#[derive(Default)]
struct Data {
    users: Vec<UserRecord>,
    trips: HashMap<i64, TripRecord>,
    next_trip_id: i64,
}

/// Shared state of the mock backend, with knobs for misbehavior.
#[derive(Default)]
pub struct MockBackend {
    data: Mutex<Data>,
    /// Delay applied to every request, in milliseconds
    pub delay_ms: AtomicU64,
    /// Send reserved_driver to everyone, regardless of ownership
    pub overshare_driver: AtomicBool,
    /// Total requests served
    pub requests: AtomicU64,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn reject(status: StatusCode, detail: &str) -> ApiError {
    (status, Json(json!({ "detail": detail })))
}

impl MockBackend {
    /// Insert a user directly and return it.
    pub fn add_user(&self, name: &str, email: &str, role: UserRole) -> UserPublic {
        let mut data = self.data.lock().unwrap();
        let public = UserPublic {
            id: data.users.len() as i64 + 1,
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        data.users.push(UserRecord {
            public: public.clone(),
            password: PASSWORD.to_string(),
        });
        public
    }

    /// Insert an OPEN trip owned by `company_id` and return its id.
    pub fn add_trip(&self, company_id: i64, origin: &str, destination: &str) -> i64 {
        let mut data = self.data.lock().unwrap();
        data.next_trip_id += 1;
        let id = data.next_trip_id;
        data.trips.insert(
            id,
            TripRecord {
                trip: Trip {
                    id,
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    date: Some("2025-12-23".to_string()),
                    time_window: Some("08-12".to_string()),
                    compensation_sek: 500.0,
                    vehicle_info: None,
                    status: TripStatus::Open,
                },
                company_id,
                driver_id: None,
            },
        );
        id
    }

    pub fn status_of(&self, trip_id: i64) -> TripStatus {
        self.data.lock().unwrap().trips[&trip_id].trip.status
    }

    pub fn driver_of(&self, trip_id: i64) -> Option<i64> {
        self.data.lock().unwrap().trips[&trip_id].driver_id
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<UserPublic, ApiError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(SIGNING_KEY),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid token"))?
        .claims;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid token"))?;

        let data = self.data.lock().unwrap();
        data.users
            .iter()
            .find(|u| u.public.id == user_id)
            .map(|u| u.public.clone())
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "User not found"))
    }
}

#[derive(Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
    role: UserRole,
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct NewTripBody {
    origin: String,
    destination: String,
    date: Option<String>,
    time_window: Option<String>,
    compensation_sek: f64,
    vehicle_info: Option<String>,
}

async fn signup(
    State(mock): State<Arc<MockBackend>>,
    Json(body): Json<SignupBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let exists = mock
        .data
        .lock()
        .unwrap()
        .users
        .iter()
        .any(|u| u.public.email == body.email);
    if exists {
        return Err(reject(StatusCode::BAD_REQUEST, "Email already registered"));
    }

    let user = mock.add_user(&body.name, &body.email, body.role);
    if let Some(record) = mock
        .data
        .lock()
        .unwrap()
        .users
        .iter_mut()
        .find(|u| u.public.id == user.id)
    {
        record.password = body.password;
    }

    Ok(Json(json!({
        "access_token": token_for(user.id, 3600),
        "token_type": "bearer",
        "user": user,
    })))
}

async fn login(
    State(mock): State<Arc<MockBackend>>,
    Form(body): Form<LoginBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = mock
        .data
        .lock()
        .unwrap()
        .users
        .iter()
        .find(|u| u.public.email == body.username && u.password == body.password)
        .map(|u| u.public.id)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Wrong email or password"))?;

    Ok(Json(json!({
        "access_token": token_for(user_id, 3600),
        "token_type": "bearer",
    })))
}

async fn me(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
) -> Result<Json<UserPublic>, ApiError> {
    mock.authenticate(&headers).map(Json)
}

async fn list_open(State(mock): State<Arc<MockBackend>>) -> Json<Vec<Trip>> {
    let data = mock.data.lock().unwrap();
    let mut trips: Vec<Trip> = data
        .trips
        .values()
        .filter(|r| r.trip.status == TripStatus::Open)
        .map(|r| r.trip.clone())
        .collect();
    trips.sort_by_key(|t| t.id);
    Json(trips)
}

async fn create_trip(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<NewTripBody>,
) -> Result<Json<Trip>, ApiError> {
    let user = mock.authenticate(&headers)?;
    if user.role != UserRole::Company {
        return Err(reject(StatusCode::FORBIDDEN, "Only companies can create trips"));
    }
    if body.compensation_sek < 0.0 {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Negative compensation"));
    }

    let id = mock.add_trip(user.id, &body.origin, &body.destination);
    let mut data = mock.data.lock().unwrap();
    let record = data.trips.get_mut(&id).unwrap();
    record.trip.date = body.date;
    record.trip.time_window = body.time_window;
    record.trip.compensation_sek = body.compensation_sek;
    record.trip.vehicle_info = body.vehicle_info;
    Ok(Json(record.trip.clone()))
}

async fn my_trips(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Trip>>, ApiError> {
    let user = mock.authenticate(&headers)?;
    let data = mock.data.lock().unwrap();
    let mut trips: Vec<Trip> = data
        .trips
        .values()
        .filter(|r| match user.role {
            UserRole::Company => r.company_id == user.id,
            UserRole::Driver => r.driver_id == Some(user.id),
        })
        .map(|r| r.trip.clone())
        .collect();
    trips.sort_by_key(|t| t.id);
    Ok(Json(trips))
}

async fn trip_detail(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let viewer = mock.authenticate(&headers).ok();
    let data = mock.data.lock().unwrap();
    let record = data
        .trips
        .get(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Trip not found"))?;

    let is_owner = viewer.as_ref().is_some_and(|v| v.id == record.company_id);
    let show_driver = mock.overshare_driver.load(Ordering::SeqCst)
        || (is_owner
            && matches!(
                record.trip.status,
                TripStatus::Reserved | TripStatus::Completed
            ));

    let reserved_driver = if show_driver {
        record.driver_id.and_then(|driver_id| {
            data.users
                .iter()
                .find(|u| u.public.id == driver_id)
                .map(|u| u.public.clone())
        })
    } else {
        None
    };

    Ok(Json(json!({
        "trip": record.trip,
        "reserved_driver": reserved_driver,
    })))
}

/// Apply a transition after checking role, ownership and status.
fn transition(
    mock: &MockBackend,
    headers: &HeaderMap,
    id: i64,
    apply: impl FnOnce(&UserPublic, &mut TripRecord) -> Result<(), ApiError>,
) -> Result<Json<Trip>, ApiError> {
    let user = mock.authenticate(headers)?;
    let mut data = mock.data.lock().unwrap();
    let record = data
        .trips
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Trip not found"))?;
    apply(&user, record)?;
    Ok(Json(record.trip.clone()))
}

async fn reserve(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Trip>, ApiError> {
    transition(&mock, &headers, id, |user, record| {
        if user.role != UserRole::Driver {
            return Err(reject(StatusCode::FORBIDDEN, "Only drivers can reserve"));
        }
        if record.trip.status != TripStatus::Open {
            return Err(reject(StatusCode::CONFLICT, "Trip is not open"));
        }
        record.trip.status = TripStatus::Reserved;
        record.driver_id = Some(user.id);
        Ok(())
    })
}

async fn unreserve(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Trip>, ApiError> {
    transition(&mock, &headers, id, |user, record| {
        if record.driver_id != Some(user.id) || record.trip.status != TripStatus::Reserved {
            return Err(reject(StatusCode::FORBIDDEN, "Not your reservation"));
        }
        record.trip.status = TripStatus::Open;
        record.driver_id = None;
        Ok(())
    })
}

async fn complete(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Trip>, ApiError> {
    transition(&mock, &headers, id, |user, record| {
        if record.company_id != user.id {
            return Err(reject(StatusCode::FORBIDDEN, "Not your trip"));
        }
        if record.trip.status != TripStatus::Reserved {
            return Err(reject(StatusCode::CONFLICT, "Trip is not reserved"));
        }
        record.trip.status = TripStatus::Completed;
        Ok(())
    })
}

async fn cancel(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Trip>, ApiError> {
    transition(&mock, &headers, id, |user, record| {
        if record.company_id != user.id {
            return Err(reject(StatusCode::FORBIDDEN, "Not your trip"));
        }
        if record.trip.status.is_terminal() {
            return Err(reject(StatusCode::CONFLICT, "Trip is already closed"));
        }
        record.trip.status = TripStatus::Cancelled;
        Ok(())
    })
}

async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn slow_down(State(mock): State<Arc<MockBackend>>, request: Request, next: Next) -> Response {
    mock.requests.fetch_add(1, Ordering::SeqCst);
    let delay = mock.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    next.run(request).await
}

fn router(mock: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/me", get(me))
        .route("/trips", get(list_open).post(create_trip))
        .route("/trips/mine", get(my_trips))
        .route("/trips/{id}", get(trip_detail))
        .route("/trips/{id}/reserve", post(reserve).delete(unreserve))
        .route("/trips/{id}/complete", post(complete))
        .route("/trips/{id}/cancel", post(cancel))
        .layer(middleware::from_fn_with_state(mock.clone(), slow_down))
        .layer(TraceLayer::new_for_http())
        .with_state(mock)
}

/// A running mock backend.
pub struct TestServer {
    pub base_url: String,
    pub mock: Arc<MockBackend>,
}

impl TestServer {
    pub async fn start() -> Self {
        let mock = Arc::new(MockBackend::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().unwrap();
        let app = router(mock.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            mock,
        }
    }

    /// Client with an empty in-memory token store.
    pub fn client(&self) -> (ApiClient, SharedTokenStore) {
        self.client_with_timeout(Duration::from_secs(5))
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> (ApiClient, SharedTokenStore) {
        let tokens: SharedTokenStore = Arc::new(MemoryTokenStore::new());
        let api = ApiClient::new(&self.base_url, timeout, tokens.clone()).unwrap();
        (api, tokens)
    }

    /// Client already logged in as the given user.
    pub fn client_as(&self, user: &UserPublic) -> (ApiClient, SharedTokenStore) {
        let (api, tokens) = self.client();
        tokens.save(&token_for(user.id, 3600)).unwrap();
        (api, tokens)
    }
}
