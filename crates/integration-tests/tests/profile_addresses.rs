//! Profile and address book.

#![allow(clippy::unwrap_used)]

use tiffin_app::ProfileController;
use tiffin_client::Session;
use tiffin_core::{AddressId, Role};
use tiffin_integration_tests::StubBackend;

async fn signed_in_profile() -> (StubBackend, Session, ProfileController) {
    let backend = StubBackend::spawn().await;
    let (api, _store) = backend.client();
    let session = Session::new(api);
    session.restore().await;
    session.login("9999999999", Role::Customer).await.unwrap();

    let mut profile = ProfileController::new(session.clone());
    profile.load().await;
    (backend, session, profile)
}

#[tokio::test]
async fn load_fills_the_form_from_the_identity() {
    let (_backend, _session, profile) = signed_in_profile().await;

    assert_eq!(profile.profile_form.full_name, "Test User");
    assert_eq!(profile.profile_form.email, "user@example.com");
    assert_eq!(profile.profile_form.username, "user1");
}

#[tokio::test]
async fn load_is_a_no_op_while_unauthenticated() {
    let backend = StubBackend::spawn().await;
    let (api, _store) = backend.client();
    let session = Session::new(api);
    session.restore().await;

    let mut profile = ProfileController::new(session);
    profile.load().await;

    assert!(profile.addresses().is_empty());
    assert!(backend.requests_to("/user/me/addresses").is_empty());
}

#[tokio::test]
async fn saving_the_profile_forces_a_full_identity_refetch() {
    let (backend, session, mut profile) = signed_in_profile().await;

    profile.profile_form.full_name = "Asha Rao".to_string();
    profile.save_profile().await.unwrap();

    // PATCH followed by a fresh GET of the identity
    let me_requests = backend.requests_to("/user/me");
    let methods: Vec<&str> = me_requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods.last(), Some(&"GET"));
    assert!(methods.contains(&"PATCH"));

    // Server-side computed fields are only visible because of the refetch
    let user = session.current_user().unwrap();
    assert_eq!(user.full_name.as_deref(), Some("Asha Rao"));
    assert!(user.is_verified);
    assert_eq!(
        profile.status().unwrap().text(),
        "Profile updated successfully!"
    );
}

#[tokio::test]
async fn adding_an_address_refetches_the_list_for_the_server_default() {
    let (backend, _session, mut profile) = signed_in_profile().await;

    profile.address_form.title = "Home".to_string();
    profile.address_form.address_line1 = "12 MG Road".to_string();
    profile.address_form.city = "Bangalore".to_string();
    profile.address_form.state = "KA".to_string();
    profile.address_form.postal_code = "560001".to_string();
    // The form did not ask for default status...
    assert!(!profile.address_form.is_default);

    profile.add_address().await.unwrap();

    // ...but the backend made the first address the default, and the
    // re-fetch (not a local append) picked that up
    assert_eq!(profile.addresses().len(), 1);
    assert!(profile.addresses()[0].is_default);

    let methods: Vec<String> = backend
        .requests_to("/user/me/addresses")
        .iter()
        .map(|request| request.method.clone())
        .collect();
    assert_eq!(methods.last().map(String::as_str), Some("GET"));
    assert!(methods.contains(&"POST".to_string()));

    // The form reset to its defaults
    assert!(profile.address_form.title.is_empty());
    assert_eq!(profile.address_form.country, "India");
}

#[tokio::test]
async fn deleting_an_address_removes_it_locally_without_a_refetch() {
    let (backend, _session, mut profile) = signed_in_profile().await;

    for title in ["Home", "Office"] {
        profile.address_form.title = title.to_string();
        profile.address_form.address_line1 = "12 MG Road".to_string();
        profile.address_form.city = "Bangalore".to_string();
        profile.address_form.state = "KA".to_string();
        profile.address_form.postal_code = "560001".to_string();
        profile.add_address().await.unwrap();
    }
    assert_eq!(profile.addresses().len(), 2);
    let victim = profile.addresses()[0].id;
    let list_fetches_before = backend
        .requests_to("/user/me/addresses")
        .iter()
        .filter(|request| request.method == "GET")
        .count();

    profile.delete_address(victim).await.unwrap();

    assert_eq!(profile.addresses().len(), 1);
    assert!(profile.addresses().iter().all(|address| address.id != victim));
    let list_fetches_after = backend
        .requests_to("/user/me/addresses")
        .iter()
        .filter(|request| request.method == "GET")
        .count();
    assert_eq!(list_fetches_after, list_fetches_before);
}

#[tokio::test]
async fn deleting_a_missing_address_surfaces_the_error() {
    let (_backend, _session, mut profile) = signed_in_profile().await;

    let err = profile.delete_address(AddressId::new(999)).await.unwrap_err();
    assert!(!err.to_string().is_empty());
    assert!(profile.status().unwrap().is_error());
}
