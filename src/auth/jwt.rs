use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use super::claims::{Claims, Principal, Role};
use crate::{config::JwtConfig, state::AppState};

/// Source of "now" for token expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies HS256 session tokens with the process-wide secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl TokenCodec {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::minutes(cfg.ttl_minutes),
            clock,
        }
    }

    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            id: user_id,
            role,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Sign)?;
        debug!(user_id, role = %role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        // Expiry is checked against `self.clock` below, not the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            let err = match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            };
            warn!(error = %e, kind = %err, "jwt rejected");
            err
        })?;

        if self.clock.now().unix_timestamp() >= data.claims.exp {
            warn!(user_id = data.claims.id, exp = data.claims.exp, "jwt expired");
            return Err(TokenError::Expired);
        }

        debug!(user_id = data.claims.id, role = %data.claims.role, "jwt verified");
        Ok(Principal::from(&data.claims))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{jwt_config, ManualClock};
    use super::*;

    const T0: i64 = 1_700_000_000;

    #[test]
    fn issue_and_verify() {
        let codec = TokenCodec::new(&jwt_config("dev-secret"));
        let token = codec.issue(42, Role::User).expect("sign");
        let principal = codec.verify(&token).expect("verify");
        assert_eq!(principal.subject_id, 42);
        assert_eq!(principal.role, Role::User);
    }

    #[test]
    fn expires_after_seven_days() {
        let clock = ManualClock::at(T0);
        let codec = TokenCodec::with_clock(&jwt_config("dev-secret"), clock.clone());
        let token = codec.issue(1, Role::Admin).unwrap();

        clock.advance(Duration::days(7) - Duration::seconds(1));
        assert!(codec.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn claims_carry_seven_day_window() {
        let clock = ManualClock::at(T0);
        let codec = TokenCodec::with_clock(&jwt_config("s"), clock);
        let token = codec.issue(3, Role::User).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data =
            decode::<Claims>(&token, &DecodingKey::from_secret(b"s"), &validation).unwrap();
        assert_eq!(data.claims.iat, T0);
        assert_eq!(data.claims.exp - data.claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn rejects_other_secret() {
        let ours = TokenCodec::new(&jwt_config("secret-a"));
        let theirs = TokenCodec::new(&jwt_config("secret-b"));
        let token = theirs.issue(1, Role::Admin).unwrap();
        assert!(matches!(ours.verify(&token), Err(TokenError::BadSignature)));
    }

    #[test]
    fn rejects_garbage() {
        let codec = TokenCodec::new(&jwt_config("dev-secret"));
        assert!(matches!(codec.verify(""), Err(TokenError::Malformed)));
        assert!(matches!(codec.verify("a.b.c"), Err(TokenError::Malformed)));
        assert!(matches!(codec.verify("not a token"), Err(TokenError::Malformed)));
    }

    #[test]
    fn any_signature_byte_flip_is_rejected() {
        let codec = TokenCodec::new(&jwt_config("dev-secret"));
        let token = codec.issue(9, Role::User).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for i in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(codec.verify(&tampered).is_err(), "byte {i} accepted");
        }
    }

    #[test]
    fn rejects_tampered_payload() {
        let codec = TokenCodec::new(&jwt_config("dev-secret"));
        let token = codec.issue(9, Role::User).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged = TokenCodec::new(&jwt_config("other")).issue(9, Role::Admin).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let spliced = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(matches!(codec.verify(&spliced), Err(TokenError::BadSignature)));
    }
}
