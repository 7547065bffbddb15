use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("jwt encoding failed")]
    JwtEncoding,
    #[error("jwt decoding failed")]
    JwtDecoding,
    #[error("token subject is empty")]
    EmptySubject,
    #[error("unsupported jwt algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// `sub` is the user id resolved through the store on every request.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

struct Keys {
    algorithm: Algorithm,
    secret: Vec<u8>,
}

impl Keys {
    fn from_settings(settings: &Settings) -> Result<Self, SecurityError> {
        let security = settings.security();
        let algorithm = match security.algorithm.to_ascii_uppercase().as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(SecurityError::UnsupportedAlgorithm(other.to_string())),
        };
        Ok(Self { algorithm, secret: security.secret_key.as_bytes().to_vec() })
    }
}

pub(crate) fn create_access_token(
    subject: &str,
    settings: &Settings,
    expires_in: Option<Duration>,
) -> Result<String, SecurityError> {
    if subject.trim().is_empty() {
        return Err(SecurityError::EmptySubject);
    }

    let keys = Keys::from_settings(settings)?;
    let lifetime = expires_in.unwrap_or_else(|| {
        let minutes = i64::try_from(settings.security().access_token_expire_minutes)
            .unwrap_or(i64::MAX / 60);
        Duration::minutes(minutes)
    });
    let issued_at = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: subject.to_string(),
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + lifetime).unix_timestamp(),
    };

    encode(&Header::new(keys.algorithm), &claims, &EncodingKey::from_secret(&keys.secret))
        .map_err(|_| SecurityError::JwtEncoding)
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Claims, SecurityError> {
    let keys = Keys::from_settings(settings)?;
    let mut validation = Validation::new(keys.algorithm);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(&keys.secret), &validation)
        .map(|data| data.claims)
        .map_err(|_| SecurityError::JwtDecoding)?;

    if claims.sub.trim().is_empty() {
        return Err(SecurityError::EmptySubject);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    async fn settings() -> (tokio::sync::OwnedMutexGuard<()>, Settings) {
        let guard = test_support::env_lock().await;
        test_support::set_test_env();
        (guard, Settings::load().expect("settings"))
    }

    #[tokio::test]
    async fn issued_token_carries_subject_and_lifetime() {
        let (_guard, settings) = settings().await;

        let token = create_access_token("u1", &settings, Some(Duration::minutes(5))).expect("token");
        let claims = verify_token(&token, &settings).expect("claims");

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[tokio::test]
    async fn expired_or_foreign_tokens_are_rejected() {
        let (_guard, settings) = settings().await;

        let expired =
            create_access_token("u1", &settings, Some(Duration::minutes(-10))).expect("token");
        assert!(matches!(verify_token(&expired, &settings), Err(SecurityError::JwtDecoding)));

        let token = create_access_token("u1", &settings, None).expect("token");
        std::env::set_var("SECRET_KEY", "another-secret");
        let other = Settings::load().expect("settings");
        test_support::set_test_env();
        assert!(verify_token(&token, &other).is_err());

        assert!(verify_token("not-a-jwt", &settings).is_err());
    }

    #[tokio::test]
    async fn blank_subjects_are_refused() {
        let (_guard, settings) = settings().await;
        assert!(matches!(
            create_access_token("  ", &settings, None),
            Err(SecurityError::EmptySubject)
        ));
    }
}
