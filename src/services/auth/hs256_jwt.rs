use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};

// Errors returned by access-token verification + claim checks.
#[derive(Debug)]
pub enum AccessJwtError {
    SecretNotConfigured,
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretNotConfigured => write!(f, "jwt secret not configured"),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Supabase access token claims.
///
/// Only `sub` and `exp` are required; `role` is informational.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub role: Option<String>,
}

/// HS256 verifier keyed by the project's shared JWT secret.
///
/// Built without a secret it rejects every token with `SecretNotConfigured`.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("configured", &self.decoding_key.is_some())
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(secret: Option<&str>, audience: Option<&str>, leeway_seconds: u64) -> Self {
        let decoding_key = secret.map(|s| DecodingKey::from_secret(s.as_bytes()));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_nbf = true;
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            // Supabase tokens carry `aud: authenticated`; only check it when asked to.
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify signature + exp/nbf (+ aud when configured) and require a non-empty `sub`.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or(AccessJwtError::SecretNotConfigured)?;

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, key, &self.validation)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }

        Ok(claims)
    }
}
