use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    AppState,
    credentials::{CredentialDigest, HasherState},
    error::{AppError, Result},
    identity::IdentityState,
    policy::{Decision, DenyReason},
};

/// Principal
///
/// The authenticated identity attached to one request. Built fresh by `AuthService` for
/// every request and carried in the request extensions; there is no process-wide slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, R>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// AuthService
///
/// Verifies credentials against the identity store. Every failure is reported as
/// `InvalidCredentials`; an unknown username still pays for one verification against a
/// decoy digest so both failure paths look alike from the outside.
pub struct AuthService {
    identity: IdentityState,
    hasher: HasherState,
    decoy: CredentialDigest,
}

/// AuthState
pub type AuthState = Arc<AuthService>;

impl AuthService {
    pub fn new(identity: IdentityState, hasher: HasherState) -> Result<Self> {
        let decoy = hasher.hash("decoy-credential-for-unknown-users")?;
        Ok(Self {
            identity,
            hasher,
            decoy,
        })
    }

    pub async fn authenticate(&self, username: &str, secret: &str) -> Result<Principal> {
        match self.identity.find_by_username(username).await {
            Some(user) if self.hasher.verify(secret, &user.credential_digest) => {
                tracing::debug!(username = %username, "credentials accepted");
                Ok(Principal::new(user.username.clone(), user.role_names()))
            }
            Some(_) => {
                tracing::warn!(username = %username, "authentication failed");
                Err(AppError::InvalidCredentials)
            }
            None => {
                let _ = self.hasher.verify(secret, &self.decoy);
                tracing::warn!(username = %username, "authentication failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}

/// basic_credentials
///
/// Extracts `(username, secret)` from an `Authorization: Basic ...` header.
/// Returns `Ok(None)` when no header is present; any malformed or non-Basic header is
/// an `InvalidCredentials` failure rather than an anonymous request.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AppError::InvalidCredentials)?;
    let (scheme, encoded) = value
        .trim()
        .split_once(' ')
        .ok_or(AppError::InvalidCredentials)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AppError::InvalidCredentials);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::InvalidCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AppError::InvalidCredentials)?;
    let (username, secret) = decoded
        .split_once(':')
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Some((username.to_string(), secret.to_string())))
}

/// access_control
///
/// Runs on every request: resolves the caller's `Principal` (if any credentials were sent),
/// asks the `AccessPolicy` for a decision on the request path, and on `Permit` attaches the
/// principal to the request so handlers can extract it.
pub async fn access_control(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let principal = match basic_credentials(request.headers())? {
        Some((username, secret)) => Some(state.auth.authenticate(&username, &secret).await?),
        None => None,
    };

    let path = request.uri().path();
    match state.policy.decide(path, principal.as_ref()) {
        Decision::Permit => {}
        Decision::Deny(reason) => {
            tracing::warn!(
                path = %path,
                user = principal.as_ref().map(|p| p.username.as_str()).unwrap_or("<anonymous>"),
                ?reason,
                "access denied"
            );
            return Err(match reason {
                DenyReason::Unauthenticated => AppError::Unauthenticated,
                DenyReason::Forbidden => AppError::Forbidden,
            });
        }
    }

    if let Some(principal) = principal {
        request.extensions_mut().insert(principal);
    }
    Ok(next.run(request).await)
}

/// Principal Extractor
///
/// Handlers behind an `Authenticated` or `RequiresRole` rule take `Principal` as an
/// argument. Rejects with `Unauthenticated` if the middleware attached none.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
