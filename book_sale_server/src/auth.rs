//! Identity verification for incoming requests.
//!
//! Requests identify their caller with an `Authorization: Bearer <token>` header. The token is checked by an
//! [`IdentityVerifier`] registered as app data, and the result is handed to route handlers as an [`IdentityOutcome`].
//!
//! Verification is fail-open. A missing, malformed, expired or forged token does not reject the request; the handler
//! simply receives [`IdentityOutcome::Unverified`] and decides for itself whether that matters. Only the admin-grant
//! route does.
use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use book_sale_engine::db_types::Principal;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, LocalBoxFuture};
use log::*;
use serde::{Deserialize, Serialize};
use tari_jwt::{
    jwt_compact::{AlgorithmExt, Token, UntrustedToken},
    Ristretto256,
    Ristretto256VerifyingKey,
};

use crate::{config::AuthConfig, errors::AuthError};

/// The custom claims an identity token must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub email: Option<String>,
}

impl IdentityClaims {
    pub fn new<S: Into<String>>(email: S) -> Self {
        Self { email: Some(email.into()) }
    }
}

/// Turns a bearer token into a verified [`Principal`].
///
/// Implementations must be shareable across worker threads, since a single verifier is registered for the whole app.
pub trait IdentityVerifier: Send + Sync {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Principal, AuthError>>;
}

/// Verifies compact JWTs signed with the Ristretto256 scheme.
#[derive(Clone, Debug)]
pub struct JwtIdentityVerifier {
    verification_key: Ristretto256VerifyingKey,
}

impl JwtIdentityVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { verification_key: config.verification_key.clone() }
    }

    pub fn check_token(&self, token: &str) -> Result<Principal, AuthError> {
        let untrusted_token =
            UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e}")))?;
        let token: Token<IdentityClaims> = Ristretto256
            .validator(&self.verification_key)
            .validate(&untrusted_token)
            .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        let claims = token.claims();
        match claims.expiration {
            Some(expiry) if expiry > Utc::now() => {},
            Some(expiry) => return Err(AuthError::Expired(format!("Token expired at {expiry}"))),
            None => return Err(AuthError::Expired("No exp claim".into())),
        }
        match claims.custom.email.as_deref() {
            Some(email) if !email.trim().is_empty() => Ok(Principal::new(email)),
            _ => Err(AuthError::MissingEmail),
        }
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Principal, AuthError>> {
        futures::future::ready(self.check_token(token)).boxed()
    }
}

/// The identity of the caller, as far as it could be established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityOutcome {
    Verified(Principal),
    Unverified,
}

impl IdentityOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Verified(p) => Some(p),
            Self::Unverified => None,
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header, if there is one.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl FromRequest for IdentityOutcome {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let verifier = req.app_data::<web::Data<dyn IdentityVerifier>>().cloned();
        async move {
            let Some(token) = token else {
                trace!("🔐️ No bearer token in request");
                return Ok(IdentityOutcome::Unverified);
            };
            let Some(verifier) = verifier else {
                warn!("🔐️ A bearer token was supplied, but no identity verifier is configured");
                return Ok(IdentityOutcome::Unverified);
            };
            match verifier.verify(&token).await {
                Ok(principal) => {
                    debug!("🔐️ Request identified as {principal}");
                    Ok(IdentityOutcome::Verified(principal))
                },
                Err(e) => {
                    debug!("🔐️ Bearer token could not be verified. {e}");
                    Ok(IdentityOutcome::Unverified)
                },
            }
        }
        .boxed_local()
    }
}
