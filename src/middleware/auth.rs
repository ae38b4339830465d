//! Device credential extraction.
//!
//! Scan devices authenticate with a static API key in the `x-api-key`
//! header. Extraction never rejects: the scan flow must validate the body
//! before it looks at the credential, so a missing key is handed to the
//! service as `None` and rejected there.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the device API key.
pub const DEVICE_KEY_HEADER: &str = "x-api-key";

/// Device API key taken from the request headers.
///
/// `None` when the header is absent, empty, or not valid visible ASCII.
#[derive(Debug, Clone)]
pub struct DeviceCredential(pub Option<String>);

impl DeviceCredential {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for DeviceCredential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(DEVICE_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(DeviceCredential(api_key))
    }
}
