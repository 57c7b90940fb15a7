//! Wire types for the backend API.
//!
//! Records are value snapshots of backend state; the client holds no
//! durable cache, so every view reload re-fetches. Optional fields are
//! modeled as `Option<T>` rather than empty-string fallbacks. Money fields
//! travel as JSON numbers and are held as `Decimal`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffin_core::{AddressId, CategoryId, MenuItemId, RestaurantId, Role, StoreSize, UserId};

// =============================================================================
// Authentication
// =============================================================================

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    /// Role the session was opened with.
    pub active_role: Role,
    /// All roles assigned to this identity.
    pub roles: Vec<Role>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Set by the backend when the account still needs profile details.
    pub profile_incomplete: Option<bool>,
}

/// The authenticated identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    /// Role this session is acting as.
    pub role: Role,
    /// All roles assigned to this identity.
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this identity carries the given role.
    ///
    /// Role checks only gate which views are shown; the backend re-checks
    /// authorization on every owner-scoped call.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Partial profile update for `PATCH /user/me`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// =============================================================================
// Addresses
// =============================================================================

/// A customer delivery address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub title: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// At most one address per customer is the default; the backend
    /// enforces uniqueness, the client only displays it.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating an address.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressInput {
    pub title: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub is_default: bool,
}

// =============================================================================
// Restaurants
// =============================================================================

/// A restaurant record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub cuisine_type: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    /// Human-shareable lookup code, distinct from the numeric id.
    pub unique_code: String,
    #[serde(default)]
    pub store_size: StoreSize,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// "HH:MM" wall-clock times as the backend sends them.
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub is_open: bool,
    pub opened_on: Option<NaiveDate>,
    pub delivery_radius: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_order_amount: Decimal,
    pub is_active: bool,
    pub rating: f64,
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for the owner's create-or-update restaurant call.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<String>,
    pub delivery_radius: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_order_amount: Decimal,
}

/// Staged listing filters for the public restaurant list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantFilters {
    pub city: Option<String>,
    pub cuisine_type: Option<String>,
}

impl RestaurantFilters {
    /// Whether any filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.cuisine_type.is_none()
    }
}

// =============================================================================
// Categories
// =============================================================================

/// A named grouping of menu items, scoped to one restaurant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating a category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================================
// Menu Items
// =============================================================================

/// A menu item, belonging to one category and one restaurant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_vegetarian: bool,
    pub is_available: bool,
    /// Minutes, when the kitchen reports one.
    pub preparation_time: Option<u32>,
    pub calories: Option<u32>,
    /// Rendered in insertion order; effectively an unordered set.
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating a menu item.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_vegetarian: bool,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub restaurant_id: RestaurantId,
    pub category_id: CategoryId,
}
