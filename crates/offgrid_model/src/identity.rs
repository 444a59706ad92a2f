//! Active identity for owner-scoped vaults.

use serde::{Deserialize, Serialize};

/// The active session identity.
///
/// Opaque to the engine beyond its `id`, which scopes which stored
/// records are visible and stamps ownership onto new writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identity id.
    pub id: String,
    /// Display name for presentation.
    pub display_name: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
