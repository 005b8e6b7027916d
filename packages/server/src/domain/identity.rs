//! Verified identity of a connection.

use serde::Serialize;

use super::UserId;

/// The principal a connection was found to represent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        if !display_name.trim().is_empty() {
            self.display_name = Some(display_name);
        }
        self
    }

    /// Label used to attribute broadcast messages: the display name when one
    /// is known, the user key otherwise.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.user_id.as_str())
    }
}
