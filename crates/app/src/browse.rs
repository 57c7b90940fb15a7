//! Customer browse controller.
//!
//! Populates and filters restaurant listings across four mutually
//! exclusive tabs - all, popular, new, nearby - each backed by its own
//! server call and its own result list. Switching tabs never clears
//! another tab's results; each list is an independent snapshot of server
//! truth, with no de-duplication across tabs.
//!
//! Fetch failures degrade per slice: the failed list becomes empty, a
//! warning is logged, and the sibling lists are untouched. A per-list
//! generation counter guarantees a stale completion can never overwrite
//! the result of a newer request.

use std::sync::Arc;

use tiffin_client::{ApiClient, ApiError, Config, Restaurant, RestaurantFilters};

use crate::location::LocationProvider;
use crate::status::StatusMessage;

/// The four listing tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseTab {
    #[default]
    All,
    Popular,
    New,
    Nearby,
}

/// Monotonic counter guarding one result list.
///
/// Fetches record the generation at request start and commit only if no
/// newer fetch for the same list has begun since.
#[derive(Debug, Default)]
struct Generation(u64);

impl Generation {
    fn begin(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    const fn is_current(&self, token: u64) -> bool {
        self.0 == token
    }
}

/// Customer discovery view state.
pub struct BrowseController {
    api: ApiClient,
    location: Arc<dyn LocationProvider>,
    default_radius_km: f64,
    page_size: u32,

    active_tab: BrowseTab,
    filters: RestaurantFilters,
    restaurants: Vec<Restaurant>,
    popular: Vec<Restaurant>,
    new_arrivals: Vec<Restaurant>,
    nearby: Vec<Restaurant>,
    location_warning: Option<String>,
    status: Option<StatusMessage>,

    all_generation: Generation,
    popular_generation: Generation,
    new_generation: Generation,
    nearby_generation: Generation,
}

impl BrowseController {
    /// Create a controller with empty lists and no filters.
    #[must_use]
    pub fn new(api: ApiClient, config: &Config, location: Arc<dyn LocationProvider>) -> Self {
        Self {
            api,
            location,
            default_radius_km: config.default_search_radius_km,
            page_size: config.max_page_size,
            active_tab: BrowseTab::default(),
            filters: RestaurantFilters::default(),
            restaurants: Vec::new(),
            popular: Vec::new(),
            new_arrivals: Vec::new(),
            nearby: Vec::new(),
            location_warning: None,
            status: None,
            all_generation: Generation::default(),
            popular_generation: Generation::default(),
            new_generation: Generation::default(),
            nearby_generation: Generation::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The active tab.
    #[must_use]
    pub const fn active_tab(&self) -> BrowseTab {
        self.active_tab
    }

    /// Results backing the active tab.
    #[must_use]
    pub fn current_restaurants(&self) -> &[Restaurant] {
        match self.active_tab {
            BrowseTab::All => &self.restaurants,
            BrowseTab::Popular => &self.popular,
            BrowseTab::New => &self.new_arrivals,
            BrowseTab::Nearby => &self.nearby,
        }
    }

    /// The "all" listing (also holds a code-search hit).
    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    /// The popular listing.
    #[must_use]
    pub fn popular(&self) -> &[Restaurant] {
        &self.popular
    }

    /// The new-arrivals listing.
    #[must_use]
    pub fn new_arrivals(&self) -> &[Restaurant] {
        &self.new_arrivals
    }

    /// The nearby listing.
    #[must_use]
    pub fn nearby(&self) -> &[Restaurant] {
        &self.nearby
    }

    /// Staged filters.
    #[must_use]
    pub const fn filters(&self) -> &RestaurantFilters {
        &self.filters
    }

    /// Warning from a failed location read, if any.
    #[must_use]
    pub fn location_warning(&self) -> Option<&str> {
        self.location_warning.as_deref()
    }

    /// Outcome of the last action, if any.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Initial load: fetch the all/popular/new listings concurrently.
    ///
    /// The "all" fetch honors the staged filters. Each slice degrades to
    /// an empty list on failure without disturbing the others.
    pub async fn load(&mut self) {
        let all_token = self.all_generation.begin();
        let popular_token = self.popular_generation.begin();
        let new_token = self.new_generation.begin();

        let (all, popular, new_arrivals) = tokio::join!(
            self.api.get_restaurants(&self.filters),
            self.api.get_popular_restaurants(self.page_size),
            self.api.get_new_restaurants(self.page_size),
        );

        if self.all_generation.is_current(all_token) {
            self.restaurants = slice_or_empty(all, "restaurants");
        }
        if self.popular_generation.is_current(popular_token) {
            self.popular = slice_or_empty(popular, "popular restaurants");
        }
        if self.new_generation.is_current(new_token) {
            self.new_arrivals = slice_or_empty(new_arrivals, "new restaurants");
        }
    }

    /// Re-fetch the "all" listing with the staged filters.
    async fn load_all(&mut self) {
        let token = self.all_generation.begin();
        let result = self.api.get_restaurants(&self.filters).await;
        if self.all_generation.is_current(token) {
            self.restaurants = slice_or_empty(result, "restaurants");
        }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Stage a city filter. An empty string clears it.
    pub fn set_city(&mut self, city: &str) {
        self.filters.city = non_empty(city);
    }

    /// Stage a cuisine filter. An empty string clears it.
    pub fn set_cuisine_type(&mut self, cuisine: &str) {
        self.filters.cuisine_type = non_empty(cuisine);
    }

    /// Apply the staged filters by re-fetching the "all" listing.
    pub async fn apply_filters(&mut self) {
        self.load_all().await;
    }

    /// Reset the filters and re-fetch.
    ///
    /// The resulting request is identical to the initial unfiltered one -
    /// no residual filter state leaks through.
    pub async fn clear_filters(&mut self) {
        self.filters = RestaurantFilters::default();
        self.load_all().await;
    }

    // =========================================================================
    // Tabs and nearby
    // =========================================================================

    /// Switch tabs. Selecting `Nearby` triggers a location-gated fetch.
    pub async fn select_tab(&mut self, tab: BrowseTab) {
        self.active_tab = tab;
        if tab == BrowseTab::Nearby {
            self.load_nearby().await;
        }
    }

    /// Fetch restaurants around the current location.
    ///
    /// A failed location read stores a user-visible warning and leaves
    /// the nearby list empty; the other tabs are unaffected.
    pub async fn load_nearby(&mut self) {
        self.location_warning = None;

        let coordinates = match self.location.current_location().await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                tracing::warn!(error = %err, "location read failed");
                self.location_warning = Some(err.to_string());
                return;
            }
        };

        let token = self.nearby_generation.begin();
        let result = self
            .api
            .search_nearby(
                coordinates.latitude,
                coordinates.longitude,
                self.default_radius_km,
            )
            .await;
        if self.nearby_generation.is_current(token) {
            self.nearby = slice_or_empty(result, "nearby restaurants");
        }
    }

    // =========================================================================
    // Code search
    // =========================================================================

    /// Look up one restaurant by its unique code.
    ///
    /// Input is uppercased; blank input is a no-op. A hit replaces the
    /// "all" listing with the single match and activates the All tab. A
    /// miss records a status error and leaves every list untouched.
    pub async fn search_by_code(&mut self, code: &str) {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return;
        }

        self.status = None;
        let token = self.all_generation.begin();
        match self.api.search_by_code(&code).await {
            Ok(restaurant) => {
                if self.all_generation.is_current(token) {
                    self.restaurants = vec![restaurant];
                    self.active_tab = BrowseTab::All;
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, code = %code, "code search missed");
                self.status = Some(StatusMessage::error("Restaurant not found"));
            }
        }
    }
}

/// Degrade a failed slice to an empty list, keeping the error in the log.
fn slice_or_empty(result: Result<Vec<Restaurant>, ApiError>, what: &str) -> Vec<Restaurant> {
    match result {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load {what}");
            Vec::new()
        }
    }
}

/// Map an empty or whitespace-only string to `None`.
fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_guard() {
        let mut generation = Generation::default();
        let first = generation.begin();
        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" Bangalore "), Some("Bangalore".to_string()));
    }
}
