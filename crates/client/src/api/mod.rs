//! Backend API client.
//!
//! One operation per backend endpoint. Every authenticated call reads the
//! bearer token from the credential store at call time - the header is
//! never cached, so a login or logout is picked up by the next request.
//!
//! Successful responses arrive in a `{success, data}` envelope and are
//! unwrapped centrally; if the envelope is absent the raw body is parsed
//! as-is. Non-success statuses raise [`ApiError::Status`] carrying the
//! backend's `detail`/`error` string when present. There are no retries
//! and no caching; the only timeout is the one configured on the
//! underlying HTTP client.

pub mod types;

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use tiffin_core::{AddressId, CategoryId, MenuItemId, Phone, RestaurantId, Role};

use crate::config::Config;
use crate::credentials::{CredentialStore, TokenPair};
use crate::error::ApiError;

use types::{
    Address, AddressInput, AuthResponse, Category, CategoryInput, MenuItem, MenuItemInput,
    Restaurant, RestaurantFilters, RestaurantInput, User, UserUpdate,
};

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Tiffin backend API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// The request timeout from the config is applied to every call; a
    /// hung backend fails the call instead of hanging the view forever.
    #[must_use]
    pub fn new(config: &Config, credentials: Arc<dyn CredentialStore>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                credentials,
            }),
        }
    }

    /// Whether a token pair is currently persisted.
    ///
    /// Presence of a stored pair is the sole signal used to attempt a
    /// silent session restore at startup.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        matches!(self.inner.credentials.load(), Ok(Some(_)))
    }

    /// Resolve an image path from the backend against the base URL.
    ///
    /// Absolute URLs pass through unchanged; relative paths are joined
    /// onto the configured base.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        self.inner
            .base_url
            .join(path)
            .map_or_else(|_| path.to_owned(), |url| url.to_string())
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Attach the bearer token if one is stored.
    ///
    /// Unauthenticated calls go out without the header and let the
    /// backend answer 401; the client adds no gate of its own.
    fn authed(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.inner.credentials.load()? {
            Some(pair) => Ok(request.bearer_auth(pair.access.expose_secret())),
            None => Ok(request),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_detail(&body, status.as_u16()),
            });
        }

        unwrap_envelope(&body)
    }

    /// Like [`Self::execute`] but discards the response body.
    async fn execute_no_content(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_detail(&body, status.as_u16()),
            });
        }

        Ok(())
    }

    async fn upload_image<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<T, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("image", part);
        let url = self.endpoint(path)?;
        let request = self.authed(self.inner.http.post(url))?.multipart(form);
        self.execute(request).await
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange a phone number and requested role for a token pair.
    ///
    /// Both tokens are persisted to the credential store before this
    /// returns, so the subsequent identity fetch can authenticate.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the tokens cannot be
    /// persisted.
    #[instrument(skip(self, phone))]
    pub async fn login(&self, phone: &Phone, role: Role) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("/auth/login")?;
        let body = serde_json::json!({
            "phone_number": phone.as_str(),
            "user_type": role,
        });

        let auth: AuthResponse = self.execute(self.inner.http.post(url).json(&body)).await?;

        self.inner
            .credentials
            .store(&TokenPair::new(&auth.access_token, &auth.refresh_token))?;
        tracing::debug!(user_id = %auth.user_id, "tokens persisted after login");

        Ok(auth)
    }

    /// Notify the backend and clear the persisted tokens.
    ///
    /// Always succeeds locally: a failed backend call is logged and
    /// swallowed so the user can sign out while offline, and the local
    /// tokens are cleared unconditionally.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let refresh = self
            .inner
            .credentials
            .load()
            .ok()
            .flatten()
            .map(|pair| pair.refresh.expose_secret().to_owned());

        let notify = async {
            let url = self.endpoint("/auth/logout")?;
            let body = serde_json::json!({ "refresh_token": refresh });
            let request = self.authed(self.inner.http.post(url).json(&body))?;
            self.execute_no_content(request).await
        };
        if let Err(err) = notify.await {
            tracing::debug!(error = %err, "logout notification failed; clearing tokens anyway");
        }

        if let Err(err) = self.inner.credentials.clear() {
            tracing::error!(error = %err, "failed to clear persisted tokens");
        }
    }

    /// Fetch the authenticated identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing, invalid, or expired.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        let url = self.endpoint("/user/me")?;
        let request = self.authed(self.inner.http.get(url))?;
        self.execute(request).await
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let url = self.endpoint("/user/me")?;
        let request = self.authed(self.inner.http.patch(url).json(update))?;
        self.execute(request).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the customer's addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoint("/user/me/addresses")?;
        let request = self.authed(self.inner.http.get(url))?;
        self.execute(request).await
    }

    /// Create an address.
    ///
    /// The backend owns the default-flag semantics; callers should
    /// re-fetch the list to see which address ended up as the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        let url = self.endpoint("/user/me/addresses")?;
        let request = self.authed(self.inner.http.post(url).json(input))?;
        self.execute(request).await
    }

    /// Update an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        let url = self.endpoint(&format!("/user/me/addresses/{id}"))?;
        let request = self.authed(self.inner.http.patch(url).json(input))?;
        self.execute(request).await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/user/me/addresses/{id}"))?;
        let request = self.authed(self.inner.http.delete(url))?;
        self.execute_no_content(request).await
    }

    // =========================================================================
    // Owner restaurant
    // =========================================================================

    /// Fetch the authenticated owner's restaurant.
    ///
    /// # Errors
    ///
    /// Returns an error if no restaurant exists yet or the request fails.
    #[instrument(skip(self))]
    pub async fn get_my_restaurant(&self) -> Result<Restaurant, ApiError> {
        let url = self.endpoint("/owner/restaurant")?;
        let request = self.authed(self.inner.http.get(url))?;
        self.execute(request).await
    }

    /// Create or update the owner's restaurant (upsert keyed by owner).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn upsert_restaurant(&self, input: &RestaurantInput) -> Result<Restaurant, ApiError> {
        let url = self.endpoint("/owner/restaurant")?;
        let request = self.authed(self.inner.http.post(url).json(input))?;
        self.execute(request).await
    }

    /// Upload the restaurant cover image; returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, bytes))]
    pub async fn upload_restaurant_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Restaurant, ApiError> {
        self.upload_image("/owner/restaurant/upload-image", file_name, bytes)
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List the owner's menu categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint("/owner/restaurant/categories")?;
        let request = self.authed(self.inner.http.get(url))?;
        self.execute(request).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let url = self.endpoint("/owner/restaurant/categories")?;
        let request = self.authed(self.inner.http.post(url).json(input))?;
        self.execute(request).await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let url = self.endpoint(&format!("/owner/restaurant/categories/{id}"))?;
        let request = self.authed(self.inner.http.patch(url).json(input))?;
        self.execute(request).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/owner/restaurant/categories/{id}"))?;
        let request = self.authed(self.inner.http.delete(url))?;
        self.execute_no_content(request).await
    }

    /// Upload a category image; returns the updated category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, bytes))]
    pub async fn upload_category_image(
        &self,
        id: CategoryId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Category, ApiError> {
        self.upload_image(
            &format!("/owner/restaurant/categories/{id}/upload-image"),
            file_name,
            bytes,
        )
        .await
    }

    // =========================================================================
    // Menu items
    // =========================================================================

    /// List the owner's menu items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_menu_items(&self) -> Result<Vec<MenuItem>, ApiError> {
        let url = self.endpoint("/owner/restaurant/menu")?;
        let request = self.authed(self.inner.http.get(url))?;
        self.execute(request).await
    }

    /// Create a menu item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn create_menu_item(&self, input: &MenuItemInput) -> Result<MenuItem, ApiError> {
        let url = self.endpoint("/owner/restaurant/menu")?;
        let request = self.authed(self.inner.http.post(url).json(input))?;
        self.execute(request).await
    }

    /// Update a menu item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        input: &MenuItemInput,
    ) -> Result<MenuItem, ApiError> {
        let url = self.endpoint(&format!("/owner/restaurant/menu/{id}"))?;
        let request = self.authed(self.inner.http.patch(url).json(input))?;
        self.execute(request).await
    }

    /// Delete a menu item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/owner/restaurant/menu/{id}"))?;
        let request = self.authed(self.inner.http.delete(url))?;
        self.execute_no_content(request).await
    }

    /// Upload a menu item image; returns the updated item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, bytes))]
    pub async fn upload_menu_item_image(
        &self,
        id: MenuItemId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<MenuItem, ApiError> {
        self.upload_image(
            &format!("/owner/restaurant/menu/{id}/upload-image"),
            file_name,
            bytes,
        )
        .await
    }

    // =========================================================================
    // Specials
    // =========================================================================

    /// Fetch the restaurant's current specials.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_specials(&self) -> Result<Vec<MenuItem>, ApiError> {
        let url = self.endpoint("/owner/restaurant/specials")?;
        let request = self.authed(self.inner.http.get(url))?;
        self.execute(request).await
    }

    /// Replace the specials set with the given item ids.
    ///
    /// The backend returns the authoritative resulting set, which callers
    /// must adopt wholesale rather than merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, item_ids))]
    pub async fn update_specials(&self, item_ids: &[MenuItemId]) -> Result<Vec<MenuItem>, ApiError> {
        let url = self.endpoint("/owner/restaurant/specials")?;
        let request = self.authed(self.inner.http.post(url).json(&item_ids))?;
        self.execute(request).await
    }

    // =========================================================================
    // Public listings and search
    // =========================================================================

    /// List restaurants, optionally filtered by city and cuisine.
    ///
    /// Unset filters are omitted from the query string entirely, so an
    /// empty filter set reproduces the unfiltered request byte for byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filters))]
    pub async fn get_restaurants(
        &self,
        filters: &RestaurantFilters,
    ) -> Result<Vec<Restaurant>, ApiError> {
        let mut url = self.endpoint("/restaurants")?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            if let Some(city) = &filters.city {
                pairs.append_pair("city", city);
            }
            if let Some(cuisine) = &filters.cuisine_type {
                pairs.append_pair("cuisine_type", cuisine);
            }
        }
        self.execute(self.inner.http.get(url)).await
    }

    /// Fetch a single restaurant by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the restaurant does not exist or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_restaurant(&self, id: RestaurantId) -> Result<Restaurant, ApiError> {
        let url = self.endpoint(&format!("/restaurants/{id}"))?;
        self.execute(self.inner.http.get(url)).await
    }

    /// Geospatial search around a coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
    ) -> Result<Vec<Restaurant>, ApiError> {
        let mut url = self.endpoint("/search/nearby")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lng", &lng.to_string())
            .append_pair("radius_km", &radius_km.to_string());
        self.execute(self.inner.http.get(url)).await
    }

    /// Exact lookup by a restaurant's unique code.
    ///
    /// # Errors
    ///
    /// Returns an error if no restaurant carries the code or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn search_by_code(&self, code: &str) -> Result<Restaurant, ApiError> {
        let url = self.endpoint(&format!("/search/code/{code}"))?;
        self.execute(self.inner.http.get(url)).await
    }

    /// Ranked listing of popular restaurants.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_popular_restaurants(&self, limit: u32) -> Result<Vec<Restaurant>, ApiError> {
        let mut url = self.endpoint("/search/popular")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.execute(self.inner.http.get(url)).await
    }

    /// Recency listing of newly opened restaurants.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_new_restaurants(&self, limit: u32) -> Result<Vec<Restaurant>, ApiError> {
        let mut url = self.endpoint("/search/new")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.execute(self.inner.http.get(url)).await
    }
}

// =============================================================================
// Envelope handling
// =============================================================================

/// Unwrap the backend's `{success, data}` envelope.
///
/// If the body is not in envelope form, it is parsed as `T` directly
/// (defensive fallback for non-standard responses).
fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    if let Some(object) = value.as_object()
        && object.get("success").and_then(serde_json::Value::as_bool) == Some(true)
        && let Some(data) = object.get("data")
    {
        return Ok(serde_json::from_value(data.clone())?);
    }

    Ok(serde_json::from_value(value)?)
}

/// Extract a human-readable message from an error body.
///
/// Prefers the backend's structured `detail`, then `error`, then falls
/// back to a generic message carrying the status code.
fn error_detail(body: &str, status: u16) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail.or(parsed.error))
        .unwrap_or_else(|| format!("HTTP error: status {status}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        name: String,
    }

    #[test]
    fn test_unwrap_envelope_success() {
        let widget: Widget =
            unwrap_envelope(r#"{"success": true, "data": {"name": "dosa"}}"#).unwrap();
        assert_eq!(widget.name, "dosa");
    }

    #[test]
    fn test_unwrap_envelope_fallback_raw_body() {
        // Non-standard response without the envelope shape
        let widget: Widget = unwrap_envelope(r#"{"name": "idli"}"#).unwrap();
        assert_eq!(widget.name, "idli");
    }

    #[test]
    fn test_unwrap_envelope_success_false_falls_back() {
        // success=false means the envelope is not unwrapped; the raw body
        // fails to parse as the target type
        let result: Result<Widget, _> =
            unwrap_envelope(r#"{"success": false, "data": {"name": "vada"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unwrap_envelope_list() {
        let widgets: Vec<Widget> =
            unwrap_envelope(r#"{"success": true, "data": [{"name": "a"}, {"name": "b"}]}"#)
                .unwrap();
        assert_eq!(widgets.len(), 2);
    }

    #[test]
    fn test_error_detail_prefers_detail() {
        let message = error_detail(r#"{"detail": "Restaurant not found"}"#, 404);
        assert_eq!(message, "Restaurant not found");
    }

    #[test]
    fn test_error_detail_falls_back_to_error_field() {
        let message = error_detail(r#"{"error": "bad input"}"#, 422);
        assert_eq!(message, "bad input");
    }

    #[test]
    fn test_error_detail_generic_for_unstructured_body() {
        let message = error_detail("<html>gateway timeout</html>", 504);
        assert_eq!(message, "HTTP error: status 504");
    }

    #[test]
    fn test_public_url_passthrough_and_join() {
        let config = Config {
            base_url: Url::parse("http://127.0.0.1:8000").unwrap(),
            debug: false,
            default_search_radius_km: 5.0,
            max_page_size: 20,
            request_timeout: std::time::Duration::from_secs(10),
        };
        let client = ApiClient::new(
            &config,
            Arc::new(crate::credentials::MemoryCredentialStore::new()),
        );

        assert_eq!(
            client.public_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            client.public_url("/static/uploads/a.png"),
            "http://127.0.0.1:8000/static/uploads/a.png"
        );
    }
}
