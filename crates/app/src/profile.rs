//! Profile controller.
//!
//! Displays the identity fields and the customer's address book. Profile
//! edits submit a partial update and then force a full identity re-fetch
//! so server-side computed fields are picked up. Address creation
//! re-fetches the whole list (the backend owns the default-flag
//! semantics); address deletion removes locally by id.

use tiffin_client::{Address, AddressInput, Session, UserUpdate};
use tiffin_core::AddressId;

use crate::error::AppError;
use crate::status::StatusMessage;

const PROFILE_SAVED: &str = "Profile updated successfully!";
const ADDRESS_ADDED: &str = "Address added successfully!";

/// Staged profile edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub username: String,
}

impl ProfileForm {
    fn to_update(&self) -> UserUpdate {
        UserUpdate {
            full_name: Some(self.full_name.clone()),
            email: Some(self.email.clone()),
            username: Some(self.username.clone()),
        }
    }
}

/// Staged address creation.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressForm {
    pub title: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: "India".to_string(),
            is_default: false,
        }
    }
}

impl AddressForm {
    fn to_input(&self) -> AddressInput {
        AddressInput {
            title: self.title.trim().to_owned(),
            address_line1: self.address_line1.trim().to_owned(),
            address_line2: optional(&self.address_line2),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
            latitude: None,
            longitude: None,
            is_default: self.is_default,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Profile and address-book view state.
pub struct ProfileController {
    session: Session,
    addresses: Vec<Address>,
    pub profile_form: ProfileForm,
    pub address_form: AddressForm,
    status: Option<StatusMessage>,
}

impl ProfileController {
    /// Create a controller over the given session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            addresses: Vec::new(),
            profile_form: ProfileForm::default(),
            address_form: AddressForm::default(),
            status: None,
        }
    }

    /// The loaded addresses.
    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Outcome of the last mutating action, if any.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Fill the form from the current identity and load the addresses.
    ///
    /// A no-op while unauthenticated.
    pub async fn load(&mut self) {
        let Some(user) = self.session.current_user() else {
            return;
        };

        self.profile_form = ProfileForm {
            full_name: user.full_name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
        };
        self.load_addresses().await;
    }

    /// Re-fetch the address list.
    pub async fn load_addresses(&mut self) {
        match self.session.api().get_addresses().await {
            Ok(addresses) => self.addresses = addresses,
            Err(err) => tracing::warn!(error = %err, "failed to load addresses"),
        }
    }

    /// Submit the profile form, then force an identity re-fetch.
    ///
    /// # Errors
    ///
    /// Returns the API or session error on failure; also recorded in
    /// [`Self::status`].
    pub async fn save_profile(&mut self) -> Result<(), AppError> {
        self.status = None;
        let result = async {
            self.session
                .api()
                .update_user(&self.profile_form.to_update())
                .await?;
            // Pick up server-side computed fields
            self.session.refresh_user().await?;
            if let Some(user) = self.session.current_user() {
                self.profile_form = ProfileForm {
                    full_name: user.full_name.unwrap_or_default(),
                    email: user.email.unwrap_or_default(),
                    username: user.username.unwrap_or_default(),
                };
            }
            Ok(())
        }
        .await;
        self.record(&result, PROFILE_SAVED);
        result
    }

    /// Submit the address form.
    ///
    /// On success the whole list is re-fetched - not appended locally -
    /// so the server-assigned default flag is reflected. The form resets.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn add_address(&mut self) -> Result<(), AppError> {
        self.status = None;
        let result = async {
            self.session
                .api()
                .create_address(&self.address_form.to_input())
                .await?;
            self.load_addresses().await;
            self.address_form = AddressForm::default();
            Ok(())
        }
        .await;
        self.record(&result, ADDRESS_ADDED);
        result
    }

    /// Delete an address. The caller confirms first.
    ///
    /// The address is removed from local state by id without a re-fetch.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; also recorded in [`Self::status`].
    pub async fn delete_address(&mut self, id: AddressId) -> Result<(), AppError> {
        self.status = None;
        match self.session.api().delete_address(id).await {
            Ok(()) => {
                self.addresses.retain(|address| address.id != id);
                Ok(())
            }
            Err(err) => {
                self.status = Some(StatusMessage::error("Failed to delete address"));
                Err(err.into())
            }
        }
    }

    fn record(&mut self, result: &Result<(), AppError>, success: &str) {
        self.status = Some(match result {
            Ok(()) => StatusMessage::success(success),
            Err(err) => StatusMessage::error(err.to_string()),
        });
    }
}
