//! Access token issuance and validation, refresh token generation
//!
//! Access tokens are HMAC-SHA512 signed JWTs carrying the principal's id,
//! role tag, name, and email. Refresh tokens are opaque random UUID strings
//! whose validity lives entirely in the session store.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nearby_core::{AuthConfig, Principal, Role};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// JWT Claims structure
///
/// These claims are embedded in the access token and extracted during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - numeric principal id
    pub sub: String,
    /// Principal role tag ("user" or "admin")
    pub role: String,
    /// JWT ID - makes every issued token string unique
    pub jti: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    /// Display name (username for administrators)
    pub name: String,
    /// Email address (empty for administrators)
    #[serde(default)]
    pub email: String,
}

impl Claims {
    /// Numeric principal id carried in `sub`
    pub fn subject_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidClaims(format!("subject is not numeric: {}", self.sub)))
    }

    /// Role tag carried in `role`
    pub fn role(&self) -> Result<Role, JwtError> {
        self.role
            .parse()
            .map_err(|_| JwtError::InvalidClaims(format!("unknown role: {}", self.role)))
    }
}

/// Token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to sign JWT: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Entropy source failed: {0}")]
    Entropy(String),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

/// Mints and verifies access tokens
///
/// Holds only the signing material and TTL it was constructed with; every
/// time-dependent operation has an `_at` variant taking the clock reading.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
    issuer: String,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.access_token_ttl_secs,
            issuer: config.issuer.clone(),
        }
    }

    /// Access token lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Generate a signed access token for `principal`, expiring `ttl` from now
    pub fn generate_access_token(&self, principal: &Principal) -> Result<String, JwtError> {
        self.generate_access_token_at(principal, Utc::now().timestamp())
    }

    pub fn generate_access_token_at(
        &self,
        principal: &Principal,
        now: i64,
    ) -> Result<String, JwtError> {
        let exp = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                JwtError::InvalidClaims(format!("expiry overflows for ttl {}s", self.ttl_secs))
            })?;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: principal.id().to_string(),
            role: principal.role().as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp,
            name: principal.name().to_string(),
            email: principal.email().to_string(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Generate an opaque refresh token: 128 random bits formatted as a UUID
    pub fn generate_refresh_token(&self) -> Result<String, JwtError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| JwtError::Entropy(e.to_string()))?;

        Ok(uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string())
    }

    /// Validate signature, issuer, and expiry against the current time
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token_at(token, Utc::now().timestamp())
    }

    /// Validate signature, issuer, and expiry against `now`
    ///
    /// A token is expired once `now >= exp`.
    pub fn validate_token_at(&self, token: &str, now: i64) -> Result<Claims, JwtError> {
        let claims = self.verify_signature(token)?;
        if now >= claims.exp {
            return Err(JwtError::ExpiredToken);
        }
        Ok(claims)
    }

    /// Verify signature and issuer only, tolerating an elapsed `exp`
    ///
    /// Used by refresh, whose purpose is to replace expired access tokens.
    pub fn verify_signature(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_core::{Admin, User};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::default())
    }

    fn alice() -> Principal {
        Principal::User(User {
            id: 42,
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            image: String::new(),
        })
    }

    fn root_admin() -> Principal {
        Principal::Admin(Admin {
            id: 42,
            username: "root".to_string(),
            password_hash: String::new(),
            role: "superadmin".to_string(),
        })
    }

    #[test]
    fn test_oversized_ttl_is_an_error_not_a_wrapped_expiry() {
        let issuer = TokenIssuer::new(&AuthConfig {
            access_token_ttl_secs: u64::MAX,
            ..AuthConfig::default()
        });
        assert!(matches!(
            issuer.generate_access_token_at(&alice(), 1_000),
            Err(JwtError::InvalidClaims(_))
        ));

        let issuer = TokenIssuer::new(&AuthConfig {
            access_token_ttl_secs: i64::MAX as u64,
            ..AuthConfig::default()
        });
        assert!(matches!(
            issuer.generate_access_token_at(&alice(), 1_000),
            Err(JwtError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_generate_and_validate_token() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let token = issuer.generate_access_token_at(&alice(), now).unwrap();

        let claims = issuer.validate_token_at(&token, now).unwrap();
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.subject_id().unwrap(), 42);
        assert_eq!(claims.role().unwrap(), Role::User);
        assert_eq!(claims.iat, now);
        assert_eq!(claims.exp - claims.iat, issuer.ttl_secs() as i64);
        assert_eq!(claims.iss, "nearby");
    }

    #[test]
    fn test_token_is_three_segments() {
        let token = issuer().generate_access_token(&alice()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_admin_role_is_carried() {
        let issuer = issuer();
        let token = issuer.generate_access_token(&root_admin()).unwrap();
        let claims = issuer.validate_token(&token).unwrap();

        assert_eq!(claims.role().unwrap(), Role::Admin);
        assert_eq!(claims.name, "root");
        assert_eq!(claims.email, "");
    }

    #[test]
    fn test_invalid_token() {
        let result = issuer().validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer1 = TokenIssuer::new(&AuthConfig {
            jwt_secret: "secret1".to_string(),
            ..Default::default()
        });
        let issuer2 = TokenIssuer::new(&AuthConfig {
            jwt_secret: "secret2".to_string(),
            ..Default::default()
        });

        let token = issuer1.generate_access_token(&alice()).unwrap();
        let result = issuer2.validate_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let issued = Utc::now().timestamp() - 3600;
        let token = issuer.generate_access_token_at(&alice(), issued).unwrap();

        let result = issuer.validate_token(&token);
        assert!(matches!(result, Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = issuer();
        let now = 1_700_000_000;
        let token = issuer.generate_access_token_at(&alice(), now).unwrap();
        let ttl = issuer.ttl_secs() as i64;

        assert!(issuer.validate_token_at(&token, now + ttl - 1).is_ok());
        assert!(matches!(
            issuer.validate_token_at(&token, now + ttl),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_verify_signature_tolerates_expiry() {
        let issuer = issuer();
        let token = issuer.generate_access_token_at(&alice(), 1_000).unwrap();

        let claims = issuer.verify_signature(&token).unwrap();
        assert_eq!(claims.subject_id().unwrap(), 42);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let other = TokenIssuer::new(&AuthConfig {
            issuer: "someone-else".to_string(),
            ..Default::default()
        });
        let token = other.generate_access_token(&alice()).unwrap();
        assert!(matches!(
            issuer().validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_refresh_token_is_uuid() {
        let issuer = issuer();
        let token = issuer.generate_refresh_token().unwrap();

        assert_eq!(token.len(), 36);
        let parsed = Uuid::parse_str(&token).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(token, issuer.generate_refresh_token().unwrap());
    }

    #[test]
    fn test_claims_with_bad_subject() {
        let claims = Claims {
            iss: "nearby".to_string(),
            sub: "users:abc".to_string(),
            role: "viewer".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp: 60,
            name: "x".to_string(),
            email: String::new(),
        };
        assert!(matches!(claims.subject_id(), Err(JwtError::InvalidClaims(_))));
        assert!(matches!(claims.role(), Err(JwtError::InvalidClaims(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tampered_signature_is_rejected(
                name in "[A-Za-z ]{1,24}",
                email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
                id in 1i64..1_000_000,
                position in any::<prop::sample::Index>(),
            ) {
                let issuer = issuer();
                let principal = Principal::User(User { id, name, email, image: String::new() });
                let token = issuer.generate_access_token(&principal).unwrap();

                let (head, signature) = token.rsplit_once('.').unwrap();
                let mut sig: Vec<char> = signature.chars().collect();
                let i = position.index(sig.len());
                sig[i] = if sig[i] == 'A' { 'B' } else { 'A' };
                let tampered = format!("{head}.{}", sig.into_iter().collect::<String>());

                prop_assert!(issuer.validate_token(&tampered).is_err());
                prop_assert!(issuer.verify_signature(&tampered).is_err());
            }
        }
    }
}
