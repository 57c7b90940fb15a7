//! Stateless text rendering of records.
//!
//! The terminal analog of the original's restaurant card: pure functions
//! from a record to display text, with no state and no I/O.

use tiffin_client::{MenuItem, Restaurant};
use tiffin_core::{Role, StoreSize};

/// Render a restaurant summary card.
///
/// Name, code, and rating on the first line; description, address,
/// phone, and hours on the following lines when present; the open/closed
/// badge and review count last.
#[must_use]
pub fn restaurant_summary(restaurant: &Restaurant) -> String {
    let mut lines = Vec::new();

    let mut header = format!("{} [{}]", restaurant.name, restaurant.unique_code);
    if restaurant.rating > 0.0 {
        header.push_str(&format!("  rated {:.1}", restaurant.rating));
    }
    lines.push(header);

    if let Some(description) = &restaurant.description {
        lines.push(format!("  {description}"));
    }

    let mut address = format!("  {}", restaurant.address_line1);
    if let Some(line2) = &restaurant.address_line2 {
        address.push_str(&format!(", {line2}"));
    }
    address.push_str(&format!(", {}", restaurant.city));
    lines.push(address);

    if let Some(phone) = &restaurant.phone_number {
        lines.push(format!("  phone {phone}"));
    }

    if let (Some(open), Some(close)) = (&restaurant.opening_time, &restaurant.closing_time) {
        lines.push(format!("  hours {open} - {close}"));
    }

    let badge = if restaurant.is_active { "Open Now" } else { "Closed" };
    let mut footer = format!("  {badge}");
    if restaurant.total_reviews > 0 {
        footer.push_str(&format!("  ({} reviews)", restaurant.total_reviews));
    }
    lines.push(footer);

    lines.join("\n")
}

/// Render a one-line menu item summary.
#[must_use]
pub fn menu_item_summary(item: &MenuItem) -> String {
    let mut line = format!("{} - {:.2}", item.name, item.price);
    if item.is_vegetarian {
        line.push_str("  [veg]");
    }
    if !item.is_available {
        line.push_str("  [unavailable]");
    }
    if let Some(minutes) = item.preparation_time {
        line.push_str(&format!("  [{minutes} min]"));
    }
    if !item.ingredients.is_empty() {
        line.push_str(&format!("  ({})", join_list(&item.ingredients)));
    }
    line
}

/// Human-readable role label.
#[must_use]
pub const fn role_label(role: Role) -> &'static str {
    match role {
        Role::Customer => "Customer",
        Role::RestaurantOwner => "Restaurant Owner",
    }
}

/// Human-readable store size label.
#[must_use]
pub const fn store_size_label(size: StoreSize) -> &'static str {
    match size {
        StoreSize::Small => "Small (1-10 seats)",
        StoreSize::Medium => "Medium (11-30 seats)",
        StoreSize::Large => "Large (31+ seats)",
    }
}

/// Join list entries with commas, in insertion order.
#[must_use]
pub fn join_list(entries: &[String]) -> String {
    entries.join(", ")
}
