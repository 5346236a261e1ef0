//! Émission et validation des tokens d'identité (JWT signés HMAC).
//!
//! Un token embarque l'identifiant et le rôle de l'utilisateur et expire
//! 24 heures après son émission. Il n'est stocké nulle part côté serveur :
//! sa validité ne dépend que de la signature et de l'heure courante.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TOKEN_LIFETIME_HOURS;
use crate::models::{Role, UserID};
use crate::utils::clock::Clock;

const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Contenu d'un token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserID,
    /// Rôle au moment de l'émission ; indicatif seulement
    pub role: Role,
    /// Identifiant de l'utilisateur en texte
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Service de tokens. La clé est fournie à la construction.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
            clock,
        }
    }

    /// Émet un token pour un utilisateur
    pub fn issue(&self, user_id: UserID, role: Role) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            user_id,
            role,
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Valide la signature, la forme et l'expiration d'un token
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant is accepted; anything else is a signature failure
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ if announces_foreign_algorithm(token) => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.sub != claims.user_id.to_string() {
            return Err(TokenError::Malformed);
        }

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Vrai si l'en-tête est lisible mais annonce un algorithme autre que HMAC,
/// y compris un nom que jsonwebtoken ne connaît pas (`none`, ...)
fn announces_foreign_algorithm(token: &str) -> bool {
    #[derive(Deserialize)]
    struct RawHeader {
        alg: String,
    }

    let Some(encoded) = token.split('.').next() else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(encoded) else {
        return false;
    };
    match serde_json::from_slice::<RawHeader>(&bytes) {
        Ok(header) => !matches!(
            header.alg.parse::<Algorithm>(),
            Ok(alg) if ACCEPTED_ALGORITHMS.contains(&alg)
        ),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::{ManualClock, SystemClock};
    use chrono::{TimeZone, Utc};

    const SECRET: &str = "test-secret";

    fn manual_service() -> (TokenService, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        (TokenService::new(SECRET, clock.clone()), clock)
    }

    #[test]
    fn test_token_creation_and_validation() {
        let (service, _) = manual_service();
        let token = service.issue(UserID(7), Role::Doctor).unwrap();

        // Compact three-part shape
        assert_eq!(token.split('.').count(), 3);

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.user_id, UserID(7));
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_HOURS * 3600);
    }

    #[test]
    fn test_expired_token() {
        let (service, clock) = manual_service();
        let token = service.issue(UserID(1), Role::Receptionist).unwrap();

        clock.advance(Duration::hours(TOKEN_LIFETIME_HOURS) - Duration::seconds(1));
        assert!(service.validate(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_key_is_invalid_signature() {
        let other = TokenService::new("another-secret", Arc::new(SystemClock));
        let service = TokenService::new(SECRET, Arc::new(SystemClock));

        let token = other.issue(UserID(1), Role::Doctor).unwrap();
        assert_eq!(service.validate(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_non_hmac_algorithm_is_rejected() {
        let service = TokenService::new(SECRET, Arc::new(SystemClock));
        let token = service.issue(UserID(1), Role::Doctor).unwrap();

        // Same claims and signature, header swapped for {"alg":"RS256","typ":"JWT"}
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[0] = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
        let forged = parts.join(".");

        assert_eq!(service.validate(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_unsigned_token_is_invalid_signature() {
        let service = TokenService::new(SECRET, Arc::new(SystemClock));
        let token = service.issue(UserID(1), Role::Doctor).unwrap();

        // {"alg":"none","typ":"JWT"}, with and without a signature part
        let parts: Vec<&str> = token.split('.').collect();
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", parts[1]);
        let resigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.{}", parts[1], parts[2]);

        assert_eq!(service.validate(&unsigned), Err(TokenError::InvalidSignature));
        assert_eq!(service.validate(&resigned), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_hmac_variant_is_accepted() {
        let service = TokenService::new(SECRET, Arc::new(SystemClock));
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: UserID(4),
            role: Role::Receptionist,
            sub: "4".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.validate(&token).unwrap(), claims);
    }

    #[test]
    fn test_malformed_tokens() {
        let service = TokenService::new(SECRET, Arc::new(SystemClock));
        assert_eq!(service.validate(""), Err(TokenError::Malformed));
        assert_eq!(service.validate("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(service.validate("garbage"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_unknown_role_claim_is_malformed() {
        let service = TokenService::new(SECRET, Arc::new(SystemClock));
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "user_id": 1,
            "role": "admin",
            "sub": "1",
            "iat": now,
            "exp": now + 60,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_subject_must_match_user_id() {
        let service = TokenService::new(SECRET, Arc::new(SystemClock));
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: UserID(1),
            role: Role::Doctor,
            sub: "2".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.validate(&token), Err(TokenError::Malformed));
    }
}
