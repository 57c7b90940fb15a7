//! Role and store-size enums.

use serde::{Deserialize, Serialize};

/// A user role.
///
/// Roles gate which views are reachable in the client. They are not a
/// security boundary - the backend is the actual authority and re-checks
/// every owner-scoped call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    RestaurantOwner,
}

impl Role {
    /// Wire name of the role, as the backend spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::RestaurantOwner => "restaurant_owner",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Seating-capacity bracket of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreSize {
    #[default]
    Small,
    Medium,
    Large,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::RestaurantOwner).unwrap(),
            "\"restaurant_owner\""
        );
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"customer\"");
    }

    #[test]
    fn test_role_parse() {
        let role: Role = serde_json::from_str("\"restaurant_owner\"").unwrap();
        assert_eq!(role, Role::RestaurantOwner);
    }

    #[test]
    fn test_store_size_wire_names() {
        assert_eq!(serde_json::to_string(&StoreSize::Medium).unwrap(), "\"medium\"");
        let size: StoreSize = serde_json::from_str("\"large\"").unwrap();
        assert_eq!(size, StoreSize::Large);
    }
}
