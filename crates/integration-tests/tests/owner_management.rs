//! Owner management: restaurant upsert, categories, menu, specials.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use tiffin_app::OwnerController;
use tiffin_client::ApiClient;
use tiffin_core::{CategoryId, MenuItemId, Phone, Role};
use tiffin_integration_tests::{StubBackend, category_json, menu_item_json, restaurant_json};

/// Spawn a stub, sign in as an owner, and return a ready client.
async fn owner_backend() -> (StubBackend, ApiClient) {
    let backend = StubBackend::spawn().await;
    let (api, _store) = backend.client();
    api.login(&Phone::parse("9999999999").unwrap(), Role::RestaurantOwner)
        .await
        .unwrap();
    (backend, api)
}

#[tokio::test]
async fn load_degrades_each_slice_independently() {
    let (backend, api) = owner_backend().await;
    // No restaurant yet, but categories exist
    backend.state().categories = vec![category_json(1, "Starters")];

    let mut owner = OwnerController::new(api);
    owner.load().await;

    assert!(owner.restaurant().is_none());
    assert_eq!(owner.categories().len(), 1);
    assert!(owner.menu_items().is_empty());
    assert!(owner.specials().is_empty());
}

#[tokio::test]
async fn save_restaurant_validates_required_fields_before_any_call() {
    let (backend, api) = owner_backend().await;
    let mut owner = OwnerController::new(api);
    owner.load().await;

    let err = owner.save_restaurant().await.unwrap_err();
    assert_eq!(err.to_string(), "Restaurant name is required");
    assert_eq!(owner.status().unwrap().text(), "Restaurant name is required");

    // Only the initial GET from load() reached the restaurant endpoint
    assert!(
        backend
            .requests_to("/owner/restaurant")
            .iter()
            .all(|request| request.method == "GET")
    );
}

#[tokio::test]
async fn save_restaurant_adopts_the_canonical_server_record() {
    let (backend, api) = owner_backend().await;
    let mut owner = OwnerController::new(api);
    owner.load().await;

    owner.restaurant_form.name = "Spice Villa".to_string();
    owner.restaurant_form.address_line1 = "12 MG Road".to_string();
    owner.restaurant_form.city = "Bangalore".to_string();
    owner.restaurant_form.state = "KA".to_string();
    owner.restaurant_form.postal_code = "560001".to_string();

    owner.save_restaurant().await.unwrap();

    let restaurant = owner.restaurant().unwrap();
    assert_eq!(restaurant.name, "Spice Villa");
    // Server-assigned fields came back with the canonical record
    assert_eq!(restaurant.unique_code, "REST001");
    assert!(!owner.status().unwrap().is_error());

    // The form was refilled from the saved record
    assert_eq!(owner.restaurant_form.name, "Spice Villa");
}

#[tokio::test]
async fn create_category_appends_and_resets_the_form() {
    let (_backend, api) = owner_backend().await;
    let mut owner = OwnerController::new(api);
    owner.load().await;

    owner.category_form.name = "Starters".to_string();
    owner.category_form.description = "Small plates".to_string();
    owner.create_category().await.unwrap();

    assert_eq!(owner.categories().len(), 1);
    assert_eq!(owner.categories()[0].name, "Starters");
    assert!(owner.category_form.name.is_empty());
    assert_eq!(
        owner.status().unwrap().text(),
        "Category created successfully!"
    );
}

#[tokio::test]
async fn create_category_requires_a_name() {
    let (backend, api) = owner_backend().await;
    let mut owner = OwnerController::new(api);
    owner.load().await;

    let err = owner.create_category().await.unwrap_err();
    assert_eq!(err.to_string(), "Category name is required");
    assert!(
        backend
            .requests_to("/owner/restaurant/categories")
            .iter()
            .all(|request| request.method == "GET")
    );
}

#[tokio::test]
async fn zero_price_menu_item_is_rejected_locally() {
    let (backend, api) = owner_backend().await;
    backend.state().my_restaurant =
        Some(restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian"));
    backend.state().categories = vec![category_json(1, "Mains")];

    let mut owner = OwnerController::new(api);
    owner.load().await;

    owner.menu_item_form.name = "Dal".to_string();
    owner.menu_item_form.category_id = Some(CategoryId::new(1));
    owner.menu_item_form.price = Decimal::ZERO;

    let err = owner.create_menu_item().await.unwrap_err();
    assert_eq!(err.to_string(), "Price must be greater than 0");
    assert_eq!(
        owner.status().unwrap().text(),
        "Price must be greater than 0"
    );

    // The rejection never reached the network
    assert!(
        backend
            .requests_to("/owner/restaurant/menu")
            .iter()
            .all(|request| request.method == "GET")
    );
}

#[tokio::test]
async fn menu_item_ingredients_roundtrip_from_comma_separated_input() {
    let (backend, api) = owner_backend().await;
    backend.state().my_restaurant =
        Some(restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian"));
    backend.state().categories = vec![category_json(1, "Mains")];

    let mut owner = OwnerController::new(api);
    owner.load().await;

    owner.menu_item_form.name = "Chicken Biryani".to_string();
    owner.menu_item_form.category_id = Some(CategoryId::new(1));
    owner.menu_item_form.price = Decimal::new(125, 1); // 12.5
    owner.menu_item_form.set_ingredients_csv("Chicken, Rice, Spices");

    owner.create_menu_item().await.unwrap();

    // The submitted payload carried the trimmed list
    let submitted = backend.state().menu_items.last().unwrap().clone();
    assert_eq!(
        submitted["ingredients"],
        serde_json::json!(["Chicken", "Rice", "Spices"])
    );

    // And the echoed record renders the same three items
    let created = owner.menu_items().last().unwrap();
    assert_eq!(created.ingredients.join(", "), "Chicken, Rice, Spices");

    // Form reset for the next entry
    assert!(owner.menu_item_form.name.is_empty());
    assert!(owner.menu_item_form.ingredients.is_empty());
}

#[tokio::test]
async fn deleting_a_selected_special_evicts_it_everywhere_before_any_save() {
    let (backend, api) = owner_backend().await;
    {
        let mut state = backend.state();
        state.my_restaurant =
            Some(restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian"));
        state.menu_items = vec![
            menu_item_json(3, 1, "Dal", 4.5),
            menu_item_json(5, 1, "Biryani", 12.5),
            menu_item_json(7, 1, "Naan", 2.0),
        ];
        state.specials = vec![menu_item_json(5, 1, "Biryani", 12.5)];
    }

    let mut owner = OwnerController::new(api);
    owner.load().await;
    assert!(owner.selected_specials().contains(&MenuItemId::new(5)));

    owner.delete_menu_item(MenuItemId::new(5)).await.unwrap();

    assert!(owner.menu_items().iter().all(|item| item.id != MenuItemId::new(5)));
    assert!(owner.specials().iter().all(|item| item.id != MenuItemId::new(5)));
    assert!(!owner.selected_specials().contains(&MenuItemId::new(5)));
    // No specials save happened - the eviction is purely local
    assert!(
        backend
            .requests_to("/owner/restaurant/specials")
            .iter()
            .all(|request| request.method == "GET")
    );
}

#[tokio::test]
async fn saving_specials_adopts_exactly_the_backend_echo() {
    let (backend, api) = owner_backend().await;
    {
        let mut state = backend.state();
        state.my_restaurant =
            Some(restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian"));
        state.menu_items = vec![
            menu_item_json(3, 1, "Dal", 4.5),
            menu_item_json(7, 1, "Naan", 2.0),
            menu_item_json(9, 1, "Kulfi", 3.0),
        ];
        // The backend gets the last word on the resulting set
        state.specials_override = Some(vec![7, 9]);
    }

    let mut owner = OwnerController::new(api);
    owner.load().await;

    owner.toggle_special(MenuItemId::new(3));
    owner.toggle_special(MenuItemId::new(7));
    owner.save_specials().await.unwrap();

    let special_ids: Vec<MenuItemId> = owner.specials().iter().map(|item| item.id).collect();
    assert_eq!(special_ids, vec![MenuItemId::new(7), MenuItemId::new(9)]);
    // The staged selection was replaced too, not merged
    assert_eq!(
        owner.selected_specials().iter().copied().collect::<Vec<_>>(),
        vec![MenuItemId::new(7), MenuItemId::new(9)]
    );
}

#[tokio::test]
async fn toggling_a_special_twice_restores_the_selection() {
    let (_backend, api) = owner_backend().await;
    let mut owner = OwnerController::new(api);

    owner.toggle_special(MenuItemId::new(3));
    owner.toggle_special(MenuItemId::new(3));
    assert!(owner.selected_specials().is_empty());
}

#[tokio::test]
async fn restaurant_image_upload_adopts_the_updated_record() {
    let (backend, api) = owner_backend().await;
    backend.state().my_restaurant =
        Some(restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian"));

    let mut owner = OwnerController::new(api);
    owner.load().await;

    owner
        .upload_restaurant_image("cover.png", vec![0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();

    assert_eq!(
        owner.restaurant().unwrap().image_url.as_deref(),
        Some("/static/uploads/cover.png")
    );
    assert_eq!(owner.restaurant_form.image_url, "/static/uploads/cover.png");
}
