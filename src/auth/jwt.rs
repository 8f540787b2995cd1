use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload: the user id plus the issue/expiry instants. There is no
/// server-side revocation; a signed token stays valid until `exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    /// Signs claims directly so tests can place `exp` anywhere in time.
    fn sign_raw(keys: &JwtKeys, sub: Uuid, iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub,
            iat: iat as usize,
            exp: exp as usize,
        };
        encode(&Header::default(), &claims, &keys.encoding).expect("sign raw claims")
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 20 * 60);
    }

    #[tokio::test]
    async fn accepts_token_inside_its_lifetime() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        // Issued 19 minutes ago with a 20 minute lifetime
        let token = sign_raw(&keys, Uuid::new_v4(), now - 19 * 60, now + 60);
        assert!(keys.verify(&token).is_ok());
    }

    #[tokio::test]
    async fn rejects_token_past_its_lifetime() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        // Issued 21 minutes ago with a 20 minute lifetime
        let token = sign_raw(&keys, Uuid::new_v4(), now - 21 * 60, now - 60);
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn rejects_token_signed_with_another_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"some-other-secret"),
            decoding: DecodingKey::from_secret(b"some-other-secret"),
            ttl: Duration::from_secs(20 * 60),
        };
        let token = other.sign(Uuid::new_v4()).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let keys = make_keys();
        assert!(keys.verify("not.a.jwt").is_err());
    }
}
