//! OpenSea account lookup response.

use serde::{Deserialize, Serialize};

/// `GET /api/v2/accounts/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl Account {
    /// The username if one is set and not blank.
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
