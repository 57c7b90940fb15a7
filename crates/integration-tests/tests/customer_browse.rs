//! Customer browse: tabs, filters, code search, nearby.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tiffin_app::location::{LocationDenied, LocationUnavailable};
use tiffin_app::{BrowseController, BrowseTab, FixedLocation};
use tiffin_integration_tests::{StubBackend, restaurant_json};

async fn seeded_backend() -> StubBackend {
    let backend = StubBackend::spawn().await;
    {
        let mut state = backend.state();
        state.restaurants = vec![
            restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian"),
            restaurant_json(2, "Pasta Place", "REST002", "Mumbai", "Italian"),
        ];
        state.popular = vec![restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian")];
        state.new_arrivals =
            vec![restaurant_json(2, "Pasta Place", "REST002", "Mumbai", "Italian")];
        state.nearby = vec![restaurant_json(1, "Spice Villa", "REST001", "Bangalore", "Indian")];
    }
    backend
}

fn browse_with_unavailable_location(backend: &StubBackend) -> BrowseController {
    let (api, _store) = backend.client();
    BrowseController::new(api, &backend.config(), Arc::new(LocationUnavailable))
}

#[tokio::test]
async fn initial_load_populates_the_three_listing_tabs() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;

    assert_eq!(browse.restaurants().len(), 2);
    assert_eq!(browse.popular().len(), 1);
    assert_eq!(browse.new_arrivals().len(), 1);
    assert_eq!(browse.active_tab(), BrowseTab::All);
    assert_eq!(browse.current_restaurants().len(), 2);

    // The popular/new listings are bounded by the configured page size
    let popular = &backend.requests_to("/search/popular")[0];
    assert_eq!(popular.query.as_deref(), Some("limit=20"));
}

#[tokio::test]
async fn a_failed_slice_degrades_to_empty_without_disturbing_the_others() {
    let backend = seeded_backend().await;
    backend.state().fail_popular = true;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;

    assert!(browse.popular().is_empty());
    assert_eq!(browse.restaurants().len(), 2);
    assert_eq!(browse.new_arrivals().len(), 1);
}

#[tokio::test]
async fn switching_tabs_does_not_clear_other_tabs() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.select_tab(BrowseTab::Popular).await;

    assert_eq!(browse.current_restaurants().len(), 1);
    assert_eq!(browse.restaurants().len(), 2);
    assert_eq!(browse.new_arrivals().len(), 1);
}

#[tokio::test]
async fn applied_filters_narrow_the_all_listing() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.set_city("Bangalore");
    browse.apply_filters().await;

    assert_eq!(browse.restaurants().len(), 1);
    assert_eq!(browse.restaurants()[0].city, "Bangalore");
}

#[tokio::test]
async fn clearing_filters_reproduces_the_initial_request() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.set_city("Bangalore");
    browse.set_cuisine_type("Indian");
    browse.apply_filters().await;
    browse.clear_filters().await;

    assert_eq!(browse.restaurants().len(), 2);

    let requests = backend.requests_to("/restaurants");
    assert_eq!(requests.len(), 3);
    // No residual filter leakage: clearing produces the same request as
    // the initial mount
    assert_eq!(requests[0].query, None);
    assert!(requests[1].query.is_some());
    assert_eq!(requests[2].query, requests[0].query);
}

#[tokio::test]
async fn staged_filters_take_effect_only_when_applied() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.set_city("Bangalore");

    // Staging alone triggers no fetch
    assert_eq!(backend.requests_to("/restaurants").len(), 1);
    assert_eq!(browse.restaurants().len(), 2);
}

#[tokio::test]
async fn code_search_replaces_the_all_list_and_activates_the_all_tab() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.select_tab(BrowseTab::Popular).await;

    // Lowercase input is normalized to uppercase before the lookup
    browse.search_by_code("rest002").await;

    assert_eq!(browse.active_tab(), BrowseTab::All);
    assert_eq!(browse.restaurants().len(), 1);
    assert_eq!(browse.restaurants()[0].unique_code, "REST002");
    assert!(browse.status().is_none());
}

#[tokio::test]
async fn code_search_miss_surfaces_an_error_and_leaves_lists_untouched() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.search_by_code("NOPE").await;

    let status = browse.status().unwrap();
    assert!(status.is_error());
    assert_eq!(status.text(), "Restaurant not found");
    assert_eq!(browse.restaurants().len(), 2);
}

#[tokio::test]
async fn blank_code_search_is_a_no_op() {
    let backend = seeded_backend().await;
    let mut browse = browse_with_unavailable_location(&backend);

    browse.load().await;
    browse.search_by_code("   ").await;

    assert!(backend.requests().iter().all(|r| !r.path.starts_with("/search/code")));
}

#[tokio::test]
async fn nearby_with_denied_location_warns_and_leaves_other_tabs_populated() {
    let backend = seeded_backend().await;
    let (api, _store) = backend.client();
    let mut browse = BrowseController::new(api, &backend.config(), Arc::new(LocationDenied));

    browse.load().await;
    browse.select_tab(BrowseTab::Nearby).await;

    assert!(browse.nearby().is_empty());
    assert!(browse.current_restaurants().is_empty());
    assert!(
        browse
            .location_warning()
            .unwrap()
            .contains("enable location services")
    );
    // The other tabs keep their initial-load results
    assert_eq!(browse.restaurants().len(), 2);
    assert_eq!(browse.popular().len(), 1);
    // No nearby request was ever made
    assert!(backend.requests_to("/search/nearby").is_empty());
}

#[tokio::test]
async fn nearby_with_location_searches_within_the_default_radius() {
    let backend = seeded_backend().await;
    let (api, _store) = backend.client();
    let mut browse = BrowseController::new(
        api,
        &backend.config(),
        Arc::new(FixedLocation::new(12.97, 77.59)),
    );

    browse.load().await;
    browse.select_tab(BrowseTab::Nearby).await;

    assert!(browse.location_warning().is_none());
    assert_eq!(browse.nearby().len(), 1);

    let request = &backend.requests_to("/search/nearby")[0];
    let query = request.query.as_deref().unwrap();
    assert!(query.contains("lat=12.97"));
    assert!(query.contains("lng=77.59"));
    assert!(query.contains("radius_km=5"));
}
