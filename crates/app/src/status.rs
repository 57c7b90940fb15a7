//! Per-view status messages.

/// Outcome of the most recent mutating action in a view.
///
/// Every mutating action clears the previous message at the start of the
/// next attempt, then records its own success or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Error(String),
}

impl StatusMessage {
    /// Build a success message.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    /// Build an error message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    /// Whether this is an error message.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The message text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let ok = StatusMessage::success("saved");
        assert!(!ok.is_error());
        assert_eq!(ok.text(), "saved");

        let err = StatusMessage::error("nope");
        assert!(err.is_error());
        assert_eq!(err.text(), "nope");
    }
}
