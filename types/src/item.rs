//! Reference handles and the items they are enriched into.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pointer to a remotely retrievable record, as returned by a listing page.
///
/// Both fields are guaranteed non-empty (after trimming). The URL is not
/// parsed here; an unreachable or malformed address is a per-item retrieval
/// failure, not a construction error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawHandle")]
pub struct ReferenceHandle {
    name: String,
    url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("reference handle name must not be empty")]
    EmptyName,
    #[error("reference handle url must not be empty (name: {name})")]
    EmptyUrl { name: String },
}

#[derive(Deserialize)]
struct RawHandle {
    name: String,
    url: String,
}

impl TryFrom<RawHandle> for ReferenceHandle {
    type Error = HandleError;

    fn try_from(raw: RawHandle) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.url)
    }
}

impl ReferenceHandle {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self, HandleError> {
        let name = name.into();
        let url = url.into();
        if name.trim().is_empty() {
            return Err(HandleError::EmptyName);
        }
        if url.trim().is_empty() {
            return Err(HandleError::EmptyUrl { name });
        }
        Ok(Self { name, url })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A reference handle augmented with its resolved display attribute.
///
/// `image` is `None` exactly when retrieval failed or timed out.
/// `is_loading` is only ever `true` on placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedItem {
    pub name: String,
    pub url: String,
    pub image: Option<String>,
    pub is_loading: bool,
}

impl EnrichedItem {
    /// Placeholder shown while the batch is still in flight.
    #[must_use]
    pub fn placeholder(handle: &ReferenceHandle) -> Self {
        Self {
            name: handle.name.clone(),
            url: handle.url.clone(),
            image: None,
            is_loading: true,
        }
    }

    #[must_use]
    pub fn resolved(handle: &ReferenceHandle, image: String) -> Self {
        Self {
            name: handle.name.clone(),
            url: handle.url.clone(),
            image: Some(image),
            is_loading: false,
        }
    }

    #[must_use]
    pub fn degraded(handle: &ReferenceHandle) -> Self {
        Self {
            name: handle.name.clone(),
            url: handle.url.clone(),
            image: None,
            is_loading: false,
        }
    }

    /// Settled without a display attribute.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.is_loading && self.image.is_none()
    }
}
