//! Test support: an in-process stub of the Tiffin backend API.
//!
//! The stub implements the backend's endpoint table over in-memory state,
//! wraps responses in the `{success, data}` envelope, issues and checks
//! bearer tokens, and records every request (method, path, query,
//! auth-header presence) so tests can assert on the exact traffic the
//! client produced.
//!
//! Failure injection flags on [`BackendState`] let tests force specific
//! slices to fail (identity fetch, logout, the popular listing) without
//! touching the rest of the surface.

// Test support code; unwraps are fine here.
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde_json::{Value, json};

use tiffin_client::{ApiClient, Config, MemoryCredentialStore};

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorized: bool,
}

/// In-memory backend state, exposed for seeding and assertions.
#[derive(Debug, Default)]
pub struct BackendState {
    pub requests: Vec<RecordedRequest>,

    /// Token pair issued by the last login.
    pub issued_access: Option<String>,
    pub issued_refresh: Option<String>,

    /// The single test identity.
    pub user: Value,

    /// Failure injection.
    pub fail_identity: bool,
    pub fail_logout: bool,
    pub fail_popular: bool,

    /// Public listings.
    pub restaurants: Vec<Value>,
    pub popular: Vec<Value>,
    pub new_arrivals: Vec<Value>,
    pub nearby: Vec<Value>,

    /// Owner data.
    pub my_restaurant: Option<Value>,
    pub categories: Vec<Value>,
    pub menu_items: Vec<Value>,
    pub specials: Vec<Value>,
    /// When set, the specials save echoes these ids instead of the request.
    pub specials_override: Option<Vec<i64>>,

    /// Customer addresses.
    pub addresses: Vec<Value>,

    pub next_id: i64,
}

type Shared = Arc<Mutex<BackendState>>;

/// A running stub backend on an ephemeral local port.
pub struct StubBackend {
    state: Shared,
    addr: SocketAddr,
}

impl StubBackend {
    /// Start the stub on `127.0.0.1:0`.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            user: default_user(),
            next_id: 100,
            ..BackendState::default()
        }));

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/logout", post(logout))
            .route("/user/me", get(get_me).patch(patch_me))
            .route("/user/me/addresses", get(get_addresses).post(create_address))
            .route(
                "/user/me/addresses/{id}",
                axum::routing::patch(update_address).delete(delete_address),
            )
            .route(
                "/owner/restaurant",
                get(get_my_restaurant).post(upsert_restaurant),
            )
            .route("/owner/restaurant/upload-image", post(upload_restaurant_image))
            .route(
                "/owner/restaurant/categories",
                get(get_categories).post(create_category),
            )
            .route(
                "/owner/restaurant/categories/{id}",
                axum::routing::patch(update_category).delete(delete_category),
            )
            .route(
                "/owner/restaurant/categories/{id}/upload-image",
                post(upload_category_image),
            )
            .route("/owner/restaurant/menu", get(get_menu).post(create_menu_item))
            .route(
                "/owner/restaurant/menu/{id}",
                axum::routing::patch(update_menu_item).delete(delete_menu_item),
            )
            .route(
                "/owner/restaurant/menu/{id}/upload-image",
                post(upload_menu_item_image),
            )
            .route(
                "/owner/restaurant/specials",
                get(get_specials).post(update_specials),
            )
            .route("/restaurants", get(list_restaurants))
            .route("/restaurants/{id}", get(get_restaurant))
            .route("/search/nearby", get(search_nearby))
            .route("/search/code/{code}", get(search_by_code))
            .route("/search/popular", get(search_popular))
            .route("/search/new", get(search_new))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    /// Base URL of the running stub.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client config pointing at the stub.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            base_url: url::Url::parse(&self.base_url()).unwrap(),
            debug: false,
            default_search_radius_km: 5.0,
            max_page_size: 20,
            request_timeout: std::time::Duration::from_secs(5),
        }
    }

    /// An API client over a fresh in-memory credential store.
    #[must_use]
    pub fn client(&self) -> (ApiClient, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let api = ApiClient::new(&self.config(), store.clone());
        (api, store)
    }

    /// Direct access to the backend state for seeding and assertions.
    #[must_use]
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// All recorded requests.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Recorded requests whose path matches exactly.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

// =============================================================================
// Record builders
// =============================================================================

/// The stub's single test identity.
#[must_use]
pub fn default_user() -> Value {
    json!({
        "id": 1,
        "email": "user@example.com",
        "username": "user1",
        "full_name": "Test User",
        "phone_number": "9999999999",
        "role": "customer",
        "roles": ["customer"],
        "is_active": true,
        "is_verified": false,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": null
    })
}

/// A complete restaurant record.
#[must_use]
pub fn restaurant_json(id: i64, name: &str, code: &str, city: &str, cuisine: &str) -> Value {
    json!({
        "id": id,
        "owner_id": 1,
        "name": name,
        "description": "A test restaurant",
        "cuisine_type": cuisine,
        "phone_number": "9999999999",
        "email": null,
        "image_url": null,
        "unique_code": code,
        "store_size": "medium",
        "address_line1": "12 MG Road",
        "address_line2": null,
        "city": city,
        "state": "KA",
        "postal_code": "560001",
        "latitude": 12.97,
        "longitude": 77.59,
        "opening_time": "09:00",
        "closing_time": "22:00",
        "is_open": true,
        "opened_on": "2023-06-01",
        "delivery_radius": 5.0,
        "delivery_fee": 2.5,
        "minimum_order_amount": 10.0,
        "is_active": true,
        "rating": 4.2,
        "total_reviews": 7,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": null
    })
}

/// A complete category record.
#[must_use]
pub fn category_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "image_url": null,
        "is_active": true,
        "created_at": "2024-01-01T00:00:00Z"
    })
}

/// A complete menu item record.
#[must_use]
pub fn menu_item_json(id: i64, category_id: i64, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "restaurant_id": 1,
        "category_id": category_id,
        "name": name,
        "description": null,
        "price": price,
        "image_url": null,
        "is_vegetarian": false,
        "is_available": true,
        "preparation_time": null,
        "calories": null,
        "ingredients": [],
        "allergens": [],
        "rating": 0.0,
        "total_reviews": 0,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": null
    })
}

// =============================================================================
// Plumbing
// =============================================================================

async fn record_request(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(ToString::to_string),
        authorized: request.headers().contains_key(header::AUTHORIZATION),
    };
    state.lock().unwrap().requests.push(recorded);
    next.run(request).await
}

fn ok(data: Value) -> Response {
    (StatusCode::OK, Json(json!({"success": true, "data": data}))).into_response()
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({"detail": detail}))).into_response()
}

fn bearer_matches(headers: &HeaderMap, state: &BackendState) -> bool {
    let Some(expected) = &state.issued_access else {
        return false;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {expected}"))
}

fn require_auth(headers: &HeaderMap, state: &BackendState) -> Result<(), Response> {
    if bearer_matches(headers, state) {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();

    let user_type = body
        .get("user_type")
        .and_then(Value::as_str)
        .unwrap_or("customer")
        .to_owned();
    let roles = if user_type == "restaurant_owner" {
        json!(["customer", "restaurant_owner"])
    } else {
        json!(["customer"])
    };

    state.issued_access = Some("access-1".to_owned());
    state.issued_refresh = Some("refresh-1".to_owned());
    state.user["role"] = json!(user_type);
    state.user["roles"] = roles.clone();
    if let Some(phone) = body.get("phone_number") {
        state.user["phone_number"] = phone.clone();
    }

    ok(json!({
        "user_id": 1,
        "active_role": user_type,
        "roles": roles,
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "profile_incomplete": false
    }))
}

async fn logout(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    if state.fail_logout {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "logout failed");
    }
    state.issued_access = None;
    state.issued_refresh = None;
    ok(Value::Null)
}

async fn get_me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if state.fail_identity {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    ok(state.user.clone())
}

async fn patch_me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    if let Some(updates) = body.as_object() {
        for (key, value) in updates {
            state.user[key] = value.clone();
        }
    }
    // Server-side computed fields, visible only after a re-fetch
    state.user["is_verified"] = json!(true);
    state.user["updated_at"] = json!("2024-02-01T00:00:00Z");
    let user = state.user.clone();
    ok(user)
}

// =============================================================================
// Address handlers
// =============================================================================

async fn get_addresses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    ok(json!(state.addresses))
}

async fn create_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }

    let id = state.next_id;
    state.next_id += 1;

    // The first address is always the default, whatever the client sent.
    let is_default = state.addresses.is_empty()
        || body.get("is_default").and_then(Value::as_bool).unwrap_or(false);

    let mut address = json!({
        "id": id,
        "user_id": 1,
        "title": "",
        "address_line2": null,
        "latitude": null,
        "longitude": null,
        "created_at": "2024-01-01T00:00:00Z"
    });
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            address[key] = value.clone();
        }
    }
    address["id"] = json!(id);
    address["user_id"] = json!(1);
    address["is_default"] = json!(is_default);

    state.addresses.push(address.clone());
    ok(address)
}

async fn update_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    let Some(address) = state
        .addresses
        .iter_mut()
        .find(|address| address["id"] == json!(id))
    else {
        return error(StatusCode::NOT_FOUND, "Address not found");
    };
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            address[key] = value.clone();
        }
    }
    address["id"] = json!(id);
    let updated = address.clone();
    ok(updated)
}

async fn delete_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    if !state.addresses.iter().any(|address| address["id"] == json!(id)) {
        return error(StatusCode::NOT_FOUND, "Address not found");
    }
    state.addresses.retain(|address| address["id"] != json!(id));
    ok(Value::Null)
}

// =============================================================================
// Owner restaurant handlers
// =============================================================================

async fn get_my_restaurant(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    match &state.my_restaurant {
        Some(restaurant) => ok(restaurant.clone()),
        None => error(StatusCode::NOT_FOUND, "Restaurant not found"),
    }
}

async fn upsert_restaurant(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }

    let mut record = state
        .my_restaurant
        .clone()
        .unwrap_or_else(|| restaurant_json(1000, "", "REST001", "", ""));
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            record[key] = value.clone();
        }
    }
    record["updated_at"] = json!("2024-02-01T00:00:00Z");

    state.my_restaurant = Some(record.clone());
    ok(record)
}

async fn upload_restaurant_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let file_name = match read_image_field(multipart).await {
        Ok(file_name) => file_name,
        Err(response) => return response,
    };

    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    let Some(restaurant) = state.my_restaurant.as_mut() else {
        return error(StatusCode::NOT_FOUND, "Restaurant not found");
    };
    restaurant["image_url"] = json!(format!("/static/uploads/{file_name}"));
    let updated = restaurant.clone();
    ok(updated)
}

// =============================================================================
// Category handlers
// =============================================================================

async fn get_categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    ok(json!(state.categories))
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }

    let id = state.next_id;
    state.next_id += 1;

    let mut category = category_json(id, "");
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            category[key] = value.clone();
        }
    }
    category["id"] = json!(id);

    state.categories.push(category.clone());
    ok(category)
}

async fn update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    let Some(category) = state
        .categories
        .iter_mut()
        .find(|category| category["id"] == json!(id))
    else {
        return error(StatusCode::NOT_FOUND, "Category not found");
    };
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            category[key] = value.clone();
        }
    }
    category["id"] = json!(id);
    let updated = category.clone();
    ok(updated)
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    if !state.categories.iter().any(|category| category["id"] == json!(id)) {
        return error(StatusCode::NOT_FOUND, "Category not found");
    }
    state.categories.retain(|category| category["id"] != json!(id));
    ok(Value::Null)
}

async fn upload_category_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let file_name = match read_image_field(multipart).await {
        Ok(file_name) => file_name,
        Err(response) => return response,
    };

    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    let Some(category) = state
        .categories
        .iter_mut()
        .find(|category| category["id"] == json!(id))
    else {
        return error(StatusCode::NOT_FOUND, "Category not found");
    };
    category["image_url"] = json!(format!("/static/uploads/{file_name}"));
    let updated = category.clone();
    ok(updated)
}

// =============================================================================
// Menu handlers
// =============================================================================

async fn get_menu(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    ok(json!(state.menu_items))
}

async fn create_menu_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }

    let id = state.next_id;
    state.next_id += 1;

    let mut item = menu_item_json(id, 0, "", 0.0);
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            item[key] = value.clone();
        }
    }
    item["id"] = json!(id);

    state.menu_items.push(item.clone());
    ok(item)
}

async fn update_menu_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    let Some(item) = state
        .menu_items
        .iter_mut()
        .find(|item| item["id"] == json!(id))
    else {
        return error(StatusCode::NOT_FOUND, "Menu item not found");
    };
    if let Some(input) = body.as_object() {
        for (key, value) in input {
            item[key] = value.clone();
        }
    }
    item["id"] = json!(id);
    let updated = item.clone();
    ok(updated)
}

async fn delete_menu_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    if !state.menu_items.iter().any(|item| item["id"] == json!(id)) {
        return error(StatusCode::NOT_FOUND, "Menu item not found");
    }
    state.menu_items.retain(|item| item["id"] != json!(id));
    state.specials.retain(|item| item["id"] != json!(id));
    ok(Value::Null)
}

async fn upload_menu_item_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let file_name = match read_image_field(multipart).await {
        Ok(file_name) => file_name,
        Err(response) => return response,
    };

    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    let Some(item) = state
        .menu_items
        .iter_mut()
        .find(|item| item["id"] == json!(id))
    else {
        return error(StatusCode::NOT_FOUND, "Menu item not found");
    };
    item["image_url"] = json!(format!("/static/uploads/{file_name}"));
    let updated = item.clone();
    ok(updated)
}

// =============================================================================
// Specials handlers
// =============================================================================

async fn get_specials(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }
    ok(json!(state.specials))
}

async fn update_specials(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(requested): Json<Vec<i64>>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_auth(&headers, &state) {
        return response;
    }

    // The backend is authoritative over the resulting set.
    let ids = state.specials_override.clone().unwrap_or(requested);
    let specials: Vec<Value> = ids
        .iter()
        .filter_map(|id| {
            state
                .menu_items
                .iter()
                .find(|item| item["id"] == json!(id))
                .cloned()
        })
        .collect();

    state.specials = specials.clone();
    ok(json!(specials))
}

// =============================================================================
// Public listing and search handlers
// =============================================================================

async fn list_restaurants(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    let matches: Vec<Value> = state
        .restaurants
        .iter()
        .filter(|restaurant| {
            params
                .get("city")
                .is_none_or(|city| restaurant["city"] == json!(city))
                && params
                    .get("cuisine_type")
                    .is_none_or(|cuisine| restaurant["cuisine_type"] == json!(cuisine))
        })
        .cloned()
        .collect();
    ok(json!(matches))
}

async fn get_restaurant(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let state = state.lock().unwrap();
    match state
        .restaurants
        .iter()
        .find(|restaurant| restaurant["id"] == json!(id))
    {
        Some(restaurant) => ok(restaurant.clone()),
        None => error(StatusCode::NOT_FOUND, "Restaurant not found"),
    }
}

async fn search_nearby(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    ok(json!(state.nearby))
}

async fn search_by_code(State(state): State<Shared>, Path(code): Path<String>) -> Response {
    let state = state.lock().unwrap();
    match state
        .restaurants
        .iter()
        .find(|restaurant| restaurant["unique_code"] == json!(code))
    {
        Some(restaurant) => ok(restaurant.clone()),
        None => error(StatusCode::NOT_FOUND, "Restaurant not found"),
    }
}

async fn search_popular(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if state.fail_popular {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "ranking unavailable");
    }
    ok(json!(state.popular))
}

async fn search_new(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    ok(json!(state.new_arrivals))
}

/// Pull the single `image` part out of a multipart upload.
async fn read_image_field(mut multipart: Multipart) -> Result<String, Response> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let file_name = field.file_name().unwrap_or("upload.bin").to_owned();
            // Drain the body
            let _ = field.bytes().await;
            return Ok(file_name);
        }
    }
    Err(error(StatusCode::UNPROCESSABLE_ENTITY, "missing image field"))
}
