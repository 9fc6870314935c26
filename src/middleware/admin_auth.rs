use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use log::warn;
use sha2::{Digest, Sha256};

use crate::{config::AdminConfig, errors::AppError};

/// Compares digests rather than raw strings so the comparison does not stop
/// at the first differing byte.
pub fn passwords_match(config: &AdminConfig, candidate: &str) -> bool {
    if !config.is_enabled() {
        return false;
    }

    let expected = Sha256::digest(config.password.as_bytes());
    let given = Sha256::digest(candidate.as_bytes());
    expected
        .iter()
        .zip(given.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Accepts the admin password from an `Authorization: Bearer` header, or
/// from `fallback` (a password field in the request body) when no header
/// was sent.
pub fn authorize(req: &HttpRequest, fallback: Option<&str>) -> Result<(), AppError> {
    let config = req
        .app_data::<web::Data<AdminConfig>>()
        .ok_or_else(|| AppError::Internal("Admin configuration is not registered".to_string()))?;

    let candidate = bearer_token(req).or(fallback).unwrap_or_default();
    if passwords_match(config, candidate) {
        return Ok(());
    }

    warn!(
        "Rejected admin request to {} from {}",
        req.path(),
        req.connection_info().realip_remote_addr().unwrap_or("unknown")
    );
    Err(AppError::Forbidden("Invalid admin password".to_string()))
}

/// Extractor for handlers that require the admin password as a bearer token.
pub struct AdminGuard;

impl FromRequest for AdminGuard {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorize(req, None).map(|_| AdminGuard))
    }
}
