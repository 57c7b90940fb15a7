//! Owner management controller.
//!
//! Four sub-views over one owner's restaurant: profile info, categories,
//! menu items, and specials. Every mutating action follows the same
//! shape: clear the previous status message, validate locally, call the
//! API, and on success update local state and record a success message;
//! on failure record the error without reverting other in-progress
//! edits. Destructive operations expect the caller to have confirmed.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use tiffin_client::{
    ApiClient, Category, CategoryInput, MenuItem, MenuItemInput, Restaurant, RestaurantInput,
};
use tiffin_core::{CategoryId, MenuItemId};

use crate::error::AppError;
use crate::status::StatusMessage;

const RESTAURANT_SAVED: &str = "Restaurant updated successfully!";
const CATEGORY_CREATED: &str = "Category created successfully!";
const MENU_ITEM_CREATED: &str = "Menu item created successfully!";
const SPECIALS_SAVED: &str = "Special items updated successfully!";
const IMAGE_UPLOADED: &str = "Image uploaded successfully";

/// The four management sub-views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerTab {
    #[default]
    Restaurant,
    Categories,
    Menu,
    Specials,
}

// =============================================================================
// Forms
// =============================================================================

/// Staged restaurant edit.
///
/// Text fields hold raw input; empty optional fields become `None` on
/// submission rather than traveling as empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantForm {
    pub name: String,
    pub description: String,
    pub cuisine_type: String,
    pub phone_number: String,
    pub email: String,
    pub image_url: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_time: String,
    pub closing_time: String,
    pub delivery_radius: f64,
    pub delivery_fee: Decimal,
    pub minimum_order_amount: Decimal,
}

impl Default for RestaurantForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            cuisine_type: String::new(),
            phone_number: String::new(),
            email: String::new(),
            image_url: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            latitude: None,
            longitude: None,
            opening_time: String::new(),
            closing_time: String::new(),
            delivery_radius: 5.0,
            delivery_fee: Decimal::ZERO,
            minimum_order_amount: Decimal::ZERO,
        }
    }
}

impl RestaurantForm {
    /// Refill the form from a saved record.
    pub fn fill_from(&mut self, restaurant: &Restaurant) {
        *self = Self {
            name: restaurant.name.clone(),
            description: restaurant.description.clone().unwrap_or_default(),
            cuisine_type: restaurant.cuisine_type.clone().unwrap_or_default(),
            phone_number: restaurant.phone_number.clone().unwrap_or_default(),
            email: restaurant.email.clone().unwrap_or_default(),
            image_url: restaurant.image_url.clone().unwrap_or_default(),
            address_line1: restaurant.address_line1.clone(),
            address_line2: restaurant.address_line2.clone().unwrap_or_default(),
            city: restaurant.city.clone(),
            state: restaurant.state.clone(),
            postal_code: restaurant.postal_code.clone(),
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            opening_time: restaurant.opening_time.clone().unwrap_or_default(),
            closing_time: restaurant.closing_time.clone().unwrap_or_default(),
            delivery_radius: restaurant.delivery_radius,
            delivery_fee: restaurant.delivery_fee,
            minimum_order_amount: restaurant.minimum_order_amount,
        };
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Restaurant name is required"));
        }
        if self.address_line1.trim().is_empty() {
            return Err(AppError::validation("Address is required"));
        }
        if self.city.trim().is_empty() {
            return Err(AppError::validation("City is required"));
        }
        if self.state.trim().is_empty() {
            return Err(AppError::validation("State is required"));
        }
        if self.postal_code.trim().is_empty() {
            return Err(AppError::validation("Postal code is required"));
        }
        Ok(())
    }

    fn to_input(&self) -> RestaurantInput {
        RestaurantInput {
            name: self.name.trim().to_owned(),
            description: optional(&self.description),
            cuisine_type: optional(&self.cuisine_type),
            phone_number: optional(&self.phone_number),
            email: optional(&self.email),
            image_url: optional(&self.image_url),
            address_line1: self.address_line1.trim().to_owned(),
            address_line2: optional(&self.address_line2),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            latitude: self.latitude,
            longitude: self.longitude,
            opening_time: optional(&self.opening_time),
            closing_time: optional(&self.closing_time),
            delivery_radius: self.delivery_radius,
            delivery_fee: self.delivery_fee,
            minimum_order_amount: self.minimum_order_amount,
        }
    }
}

/// Staged category creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

impl CategoryForm {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Category name is required"));
        }
        Ok(())
    }

    fn to_input(&self) -> CategoryInput {
        CategoryInput {
            name: self.name.trim().to_owned(),
            description: optional(&self.description),
            image_url: optional(&self.image_url),
        }
    }
}

/// Staged menu item creation.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemForm {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub is_vegetarian: bool,
    pub is_available: bool,
    pub preparation_time: Option<u32>,
    pub calories: Option<u32>,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub category_id: Option<CategoryId>,
}

impl Default for MenuItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: Decimal::ZERO,
            image_url: String::new(),
            is_vegetarian: false,
            is_available: true,
            preparation_time: None,
            calories: None,
            ingredients: Vec::new(),
            allergens: Vec::new(),
            category_id: None,
        }
    }
}

impl MenuItemForm {
    /// Stage the ingredient list from comma-separated input.
    ///
    /// Entries are trimmed and empty entries dropped, so
    /// `"Chicken, Rice, Spices"` stages `["Chicken", "Rice", "Spices"]`.
    pub fn set_ingredients_csv(&mut self, input: &str) {
        self.ingredients = split_csv(input);
    }

    /// Stage the allergen list from comma-separated input.
    pub fn set_allergens_csv(&mut self, input: &str) {
        self.allergens = split_csv(input);
    }

    /// Staged ingredients rendered back as comma-separated text.
    #[must_use]
    pub fn ingredients_csv(&self) -> String {
        self.ingredients.join(", ")
    }

    fn validate(&self) -> Result<CategoryId, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Menu item name is required"));
        }
        let category_id = self
            .category_id
            .ok_or_else(|| AppError::validation("Please select a category"))?;
        if self.price <= Decimal::ZERO {
            return Err(AppError::validation("Price must be greater than 0"));
        }
        Ok(category_id)
    }
}

/// Split comma-separated input into trimmed, non-empty entries.
fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Map empty or whitespace-only input to `None`.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Owner management view state.
pub struct OwnerController {
    api: ApiClient,
    active_tab: OwnerTab,
    restaurant: Option<Restaurant>,
    categories: Vec<Category>,
    menu_items: Vec<MenuItem>,
    specials: Vec<MenuItem>,
    selected_specials: BTreeSet<MenuItemId>,
    pub restaurant_form: RestaurantForm,
    pub category_form: CategoryForm,
    pub menu_item_form: MenuItemForm,
    status: Option<StatusMessage>,
}

impl OwnerController {
    /// Create a controller with nothing loaded.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            active_tab: OwnerTab::default(),
            restaurant: None,
            categories: Vec::new(),
            menu_items: Vec::new(),
            specials: Vec::new(),
            selected_specials: BTreeSet::new(),
            restaurant_form: RestaurantForm::default(),
            category_form: CategoryForm::default(),
            menu_item_form: MenuItemForm::default(),
            status: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The active sub-view.
    #[must_use]
    pub const fn active_tab(&self) -> OwnerTab {
        self.active_tab
    }

    /// Switch sub-views. Sub-view data is loaded once up front, so
    /// switching is purely local.
    pub fn select_tab(&mut self, tab: OwnerTab) {
        self.active_tab = tab;
    }

    /// The owner's restaurant, if one exists yet.
    #[must_use]
    pub const fn restaurant(&self) -> Option<&Restaurant> {
        self.restaurant.as_ref()
    }

    /// The owner's categories.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The owner's menu items.
    #[must_use]
    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    /// The current specials, as last confirmed by the backend.
    #[must_use]
    pub fn specials(&self) -> &[MenuItem] {
        &self.specials
    }

    /// The staged specials selection.
    #[must_use]
    pub const fn selected_specials(&self) -> &BTreeSet<MenuItemId> {
        &self.selected_specials
    }

    /// Outcome of the last mutating action, if any.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch restaurant, categories, menu, and specials concurrently.
    ///
    /// Each slice is independently fault-tolerant: an absent restaurant
    /// degrades to `None`, a failed list to empty, and no failure
    /// disturbs the other slices.
    pub async fn load(&mut self) {
        let (restaurant, categories, menu_items, specials) = tokio::join!(
            self.api.get_my_restaurant(),
            self.api.get_categories(),
            self.api.get_menu_items(),
            self.api.get_specials(),
        );

        self.restaurant = match restaurant {
            Ok(restaurant) => Some(restaurant),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load restaurant");
                None
            }
        };
        if let Some(restaurant) = &self.restaurant {
            self.restaurant_form.fill_from(restaurant);
        }

        self.categories = list_or_empty(categories, "categories");
        self.menu_items = list_or_empty(menu_items, "menu items");
        self.specials = list_or_empty(specials, "specials");
        self.selected_specials = self.specials.iter().map(|item| item.id).collect();
    }

    // =========================================================================
    // Restaurant
    // =========================================================================

    /// Validate and submit the restaurant form (create-or-update).
    ///
    /// The backend's returned canonical record replaces local state and
    /// refills the form.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call, or the API
    /// error on backend failure. Either way the failure is also recorded
    /// in [`Self::status`].
    pub async fn save_restaurant(&mut self) -> Result<(), AppError> {
        self.status = None;
        let result = self.save_restaurant_inner().await;
        self.record(&result, RESTAURANT_SAVED);
        result
    }

    async fn save_restaurant_inner(&mut self) -> Result<(), AppError> {
        self.restaurant_form.validate()?;
        let saved = self
            .api
            .upsert_restaurant(&self.restaurant_form.to_input())
            .await?;
        self.restaurant_form.fill_from(&saved);
        self.restaurant = Some(saved);
        Ok(())
    }

    /// Upload a new restaurant cover image.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn upload_restaurant_image(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        self.status = None;
        let result = async {
            let updated = self.api.upload_restaurant_image(file_name, bytes).await?;
            self.restaurant_form.image_url = updated.image_url.clone().unwrap_or_default();
            self.restaurant = Some(updated);
            Ok(())
        }
        .await;
        self.record(&result, IMAGE_UPLOADED);
        result
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Validate and submit the category form.
    ///
    /// The new record is appended to local state and the form reset.
    ///
    /// # Errors
    ///
    /// Returns a validation or API error; also recorded in [`Self::status`].
    pub async fn create_category(&mut self) -> Result<(), AppError> {
        self.status = None;
        let result = async {
            self.category_form.validate()?;
            let created = self.api.create_category(&self.category_form.to_input()).await?;
            self.categories.push(created);
            self.category_form = CategoryForm::default();
            Ok(())
        }
        .await;
        self.record(&result, CATEGORY_CREATED);
        result
    }

    /// Delete a category. The caller confirms first.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn delete_category(&mut self, id: CategoryId) -> Result<(), AppError> {
        self.status = None;
        match self.api.delete_category(id).await {
            Ok(()) => {
                self.categories.retain(|category| category.id != id);
                Ok(())
            }
            Err(err) => {
                self.status = Some(StatusMessage::error("Failed to delete category"));
                Err(err.into())
            }
        }
    }

    /// Upload a category image; the updated record replaces the local one.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn upload_category_image(
        &mut self,
        id: CategoryId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        self.status = None;
        let result = async {
            let updated = self.api.upload_category_image(id, file_name, bytes).await?;
            if let Some(category) = self.categories.iter_mut().find(|category| category.id == id)
            {
                *category = updated;
            }
            Ok(())
        }
        .await;
        self.record(&result, IMAGE_UPLOADED);
        result
    }

    // =========================================================================
    // Menu items
    // =========================================================================

    /// Validate and submit the menu item form.
    ///
    /// Requires a restaurant, a selected category, and a strictly
    /// positive price. The new item is appended and the form reset.
    ///
    /// # Errors
    ///
    /// Returns a validation or API error; also recorded in [`Self::status`].
    pub async fn create_menu_item(&mut self) -> Result<(), AppError> {
        self.status = None;
        let result = self.create_menu_item_inner().await;
        self.record(&result, MENU_ITEM_CREATED);
        result
    }

    async fn create_menu_item_inner(&mut self) -> Result<(), AppError> {
        let category_id = self.menu_item_form.validate()?;
        let restaurant_id = self
            .restaurant
            .as_ref()
            .map(|restaurant| restaurant.id)
            .ok_or_else(|| AppError::validation("Create your restaurant first"))?;

        let form = &self.menu_item_form;
        let input = MenuItemInput {
            name: form.name.trim().to_owned(),
            description: optional(&form.description),
            price: form.price,
            image_url: optional(&form.image_url),
            is_vegetarian: form.is_vegetarian,
            is_available: form.is_available,
            preparation_time: form.preparation_time,
            calories: form.calories,
            ingredients: form.ingredients.clone(),
            allergens: form.allergens.clone(),
            restaurant_id,
            category_id,
        };

        let created = self.api.create_menu_item(&input).await?;
        self.menu_items.push(created);
        self.menu_item_form = MenuItemForm::default();
        Ok(())
    }

    /// Delete a menu item. The caller confirms first.
    ///
    /// The item is removed from the menu list, the specials list, and the
    /// staged specials selection - even before any specials save.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn delete_menu_item(&mut self, id: MenuItemId) -> Result<(), AppError> {
        self.status = None;
        match self.api.delete_menu_item(id).await {
            Ok(()) => {
                self.menu_items.retain(|item| item.id != id);
                self.specials.retain(|item| item.id != id);
                self.selected_specials.remove(&id);
                Ok(())
            }
            Err(err) => {
                self.status = Some(StatusMessage::error("Failed to delete menu item"));
                Err(err.into())
            }
        }
    }

    /// Upload a menu item image; the updated record replaces the local one.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn upload_menu_item_image(
        &mut self,
        id: MenuItemId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        self.status = None;
        let result = async {
            let updated = self.api.upload_menu_item_image(id, file_name, bytes).await?;
            if let Some(item) = self.menu_items.iter_mut().find(|item| item.id == id) {
                *item = updated;
            }
            Ok(())
        }
        .await;
        self.record(&result, IMAGE_UPLOADED);
        result
    }

    // =========================================================================
    // Specials
    // =========================================================================

    /// Toggle an item in the staged specials selection.
    pub fn toggle_special(&mut self, id: MenuItemId) {
        if !self.selected_specials.remove(&id) {
            self.selected_specials.insert(id);
        }
    }

    /// Replace the specials set with the staged selection.
    ///
    /// The whole set is sent (no incremental add/remove); the backend's
    /// echoed authoritative set replaces both the specials list and the
    /// staged selection - never merged.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn save_specials(&mut self) -> Result<(), AppError> {
        self.status = None;
        let ids: Vec<MenuItemId> = self.selected_specials.iter().copied().collect();
        let result = async {
            let confirmed = self.api.update_specials(&ids).await?;
            self.selected_specials = confirmed.iter().map(|item| item.id).collect();
            self.specials = confirmed;
            Ok(())
        }
        .await;
        self.record(&result, SPECIALS_SAVED);
        result
    }

    fn record(&mut self, result: &Result<(), AppError>, success: &str) {
        self.status = Some(match result {
            Ok(()) => StatusMessage::success(success),
            Err(err) => StatusMessage::error(err.to_string()),
        });
    }
}

/// Degrade a failed list fetch to empty, keeping the error in the log.
fn list_or_empty<T>(result: Result<Vec<T>, tiffin_client::ApiError>, what: &str) -> Vec<T> {
    match result {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load {what}");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv_trims_and_drops_empties() {
        assert_eq!(
            split_csv("Chicken, Rice, Spices"),
            vec!["Chicken", "Rice", "Spices"]
        );
        assert_eq!(split_csv("a,,b, ,c"), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ,").is_empty());
    }

    #[test]
    fn test_ingredients_csv_roundtrip() {
        let mut form = MenuItemForm::default();
        form.set_ingredients_csv("Chicken, Rice, Spices");
        assert_eq!(form.ingredients, vec!["Chicken", "Rice", "Spices"]);
        assert_eq!(form.ingredients_csv(), "Chicken, Rice, Spices");
    }

    #[test]
    fn test_menu_item_form_rejects_zero_price() {
        let mut form = MenuItemForm {
            name: "Dal".to_string(),
            category_id: Some(CategoryId::new(1)),
            ..MenuItemForm::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Price must be greater than 0");

        form.price = Decimal::new(1, 2); // 0.01
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_menu_item_form_requires_category() {
        let form = MenuItemForm {
            name: "Dal".to_string(),
            price: Decimal::ONE,
            ..MenuItemForm::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please select a category");
    }

    #[test]
    fn test_restaurant_form_required_fields() {
        let mut form = RestaurantForm::default();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Restaurant name is required"
        );

        form.name = "Spice Villa".to_string();
        assert_eq!(form.validate().unwrap_err().to_string(), "Address is required");

        form.address_line1 = "12 MG Road".to_string();
        form.city = "Bangalore".to_string();
        form.state = "KA".to_string();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Postal code is required"
        );

        form.postal_code = "560001".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_restaurant_form_to_input_drops_empty_optionals() {
        let form = RestaurantForm {
            name: "Spice Villa".to_string(),
            address_line1: "12 MG Road".to_string(),
            city: "Bangalore".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
            ..RestaurantForm::default()
        };
        let input = form.to_input();
        assert!(input.description.is_none());
        assert!(input.opening_time.is_none());
        assert!((input.delivery_radius - 5.0).abs() < f64::EPSILON);
    }
}
