//! Caller identity extraction.
//!
//! OAuth itself terminates at the reverse proxy in front of this service;
//! the proxy asserts the verified account email in the
//! `x-auth-request-email` header (the oauth2-proxy convention). A present,
//! non-empty header is "signed in"; authorization beyond that is the
//! policy's job.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use larder_core::Identity;

/// Header set by the authenticating proxy.
pub const IDENTITY_HEADER: &str = "x-auth-request-email";

/// Extractor for the optional caller identity. Never rejects; absence is a
/// policy decision, not a transport error.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Option<Identity>);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(Identity::new);
        Ok(CallerIdentity(identity))
    }
}
