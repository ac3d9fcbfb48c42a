//! Caller identity and write authorization.
//!
//! Tokens are issued elsewhere; this module only verifies them (HS256 with a
//! shared secret) and exposes the claims as a [`Caller`] request extension.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::{
    AppState,
    error::{AppError, AppResult},
};

pub const ADMIN_ROLE: &str = "admin";

/// Claims read from a verified token.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Create, update and delete catalog records.
    ManageCatalog,
}

impl Capability {
    fn describe(self) -> &'static str {
        match self {
            Capability::ManageCatalog => "manage movies",
        }
    }
}

impl Caller {
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageCatalog => self.role.as_deref() == Some(ADMIN_ROLE),
        }
    }

    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            return Ok(());
        }
        tracing::warn!(
            user_id = ?self.user_id,
            role = ?self.role,
            capability = ?capability,
            "caller lacks capability"
        );
        Err(AppError::Forbidden(format!("Forbidden: Only admins can {}", capability.describe())))
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.user_id, role: claims.role }
    }
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> AppResult<Caller> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected bearer token");
                AppError::Unauthorized
            })
    }
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request.headers().get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Verifies the bearer token and attaches the [`Caller`] to the request.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let caller = state.tokens.verify(token)?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Rejects callers lacking [`Capability::ManageCatalog`] before the body is read.
/// Must run inside [`authenticate`].
pub async fn require_catalog_manager(request: Request<Body>, next: Next) -> AppResult<Response> {
    let caller = request.extensions().get::<Caller>().ok_or(AppError::Unauthorized)?;
    caller.require(Capability::ManageCatalog)?;
    Ok(next.run(request).await)
}
