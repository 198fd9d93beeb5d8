use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::offer::Mode;

/// A ticket seller whose offers are shown in search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    /// Stable identifier, referenced by offers.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Transport mode this provider sells.
    pub mode: Mode,
    /// Logo image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Provider home page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    /// Inactive providers are kept but excluded from searches.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewProvider {
    pub id: String,
    pub name: String,
    pub mode: Mode,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewProvider {
    pub fn new(id: impl Into<String>, name: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode,
            logo_url: None,
            website_url: None,
            active: true,
        }
    }

    pub fn with_logo(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Filter for listing providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderFilter {
    /// Only providers of this mode.
    pub mode: Option<Mode>,
    /// Skip inactive providers.
    pub active_only: bool,
}

impl ProviderFilter {
    /// Active providers of any mode.
    pub fn active() -> Self {
        Self {
            mode: None,
            active_only: true,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}
