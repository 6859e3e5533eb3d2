//! Read-only access to the externally owned cached-token document.
//!
//! The on-disk cached-token JSON belongs to another component. This module
//! reads exactly one member of it, `dpopKey` (a PEM text block), and never
//! touches the rest.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct CachedToken {
    #[serde(rename = "dpopKey")]
    dpop_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenCacheError {
    #[error("cached token is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cached token has no dpopKey field")]
    MissingDpopKey,
}

/// Extract the DPoP key PEM from a cached-token JSON document. An absent
/// field is an explicit error, never a silent default.
pub fn read_dpop_key(json: &str) -> Result<String, TokenCacheError> {
    let token: CachedToken = serde_json::from_str(json)?;
    token.dpop_key.ok_or(TokenCacheError::MissingDpopKey)
}
