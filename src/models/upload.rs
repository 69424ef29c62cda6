//! Hosted file model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An object held by the storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Full storage path, e.g. `uploads/42/index.html`
    pub path: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub download_token: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredObject {
    /// File name without the user prefix
    pub fn file_name(&self) -> &str {
        crate::utils::helpers::display_name(&self.path)
    }
}
