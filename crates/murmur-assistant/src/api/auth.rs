//! HTTP Basic-auth extractor, verifier and hash helper.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{FromRef, FromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;

use super::error::ApiError;
use crate::{Error, Result};

/// Credentials accepted by the operator API.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`. When `None`
  /// every request is refused.
  pub password_hash: Option<String>,
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

/// Verify credentials directly from headers.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  let hash = config.password_hash.as_deref().ok_or(ApiError::Unauthorized)?;

  let encoded = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;
  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    return Err(ApiError::Unauthorized);
  }

  let parsed = PasswordHash::new(hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)
}

impl<S> FromRequestParts<S> for Authenticated
where
  Arc<AuthConfig>: FromRef<S>,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let config = Arc::<AuthConfig>::from_ref(state);
    verify_auth(&parts.headers, &config)?;
    Ok(Authenticated)
  }
}

/// Produce an argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::Request};

  use super::*;

  fn config(password: &str) -> AuthConfig {
    AuthConfig {
      username:      "operator".to_string(),
      password_hash: Some(hash_password(password).unwrap()),
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn extract(req: Request<Body>, config: AuthConfig) -> Result<Authenticated, ApiError> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, &Arc::new(config)).await
  }

  #[tokio::test]
  async fn correct_credentials() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("operator", "secret"))
      .body(Body::empty())
      .unwrap();
    assert!(extract(req, config("secret")).await.is_ok());
  }

  #[tokio::test]
  async fn wrong_password() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("operator", "wrong"))
      .body(Body::empty())
      .unwrap();
    assert!(matches!(extract(req, config("secret")).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn wrong_user() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("root", "secret"))
      .body(Body::empty())
      .unwrap();
    assert!(matches!(extract(req, config("secret")).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let req = Request::builder().body(Body::empty()).unwrap();
    assert!(matches!(extract(req, config("secret")).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn bearer_scheme_is_rejected() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Bearer abc")
      .body(Body::empty())
      .unwrap();
    assert!(matches!(extract(req, config("secret")).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn no_configured_hash_refuses_everyone() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("operator", ""))
      .body(Body::empty())
      .unwrap();
    let cfg = AuthConfig { username: "operator".into(), password_hash: None };
    assert!(matches!(extract(req, cfg).await, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn hash_is_phc_string() {
    let hash = hash_password("secret").unwrap();
    assert!(hash.starts_with("$argon2"), "{hash}");
    assert_ne!(hash, hash_password("secret").unwrap(), "salts must differ");
  }
}
