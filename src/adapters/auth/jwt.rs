//! HS256 JWT implementation of the `TokenCodec` port.
//!
//! Validates signature, algorithm and issuer. The `exp` claim is carried
//! but NOT enforced here: the session record's `expires_at` decides expiry,
//! so an expired session surfaces as `ExpiredSession` instead of
//! `InvalidToken`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{AuthError, DomainError, ErrorCode};
use crate::domain::session::SessionClaims;
use crate::ports::TokenCodec;

/// Signs and verifies session tokens with a shared secret.
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    pub fn new(secret: SecretString, issuer: &str) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Failed to sign token: {}", e))
        })
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::InvalidIssuer => tracing::warn!("Invalid issuer in token"),
                    ErrorKind::InvalidSignature => tracing::warn!("Invalid token signature"),
                    _ => tracing::debug!("Token decode failed: {}", e),
                }
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};

    const SECRET: &str = "jwt-codec-test-secret-of-32-bytes!";

    fn codec(secret: &str, issuer: &str) -> JwtTokenCodec {
        JwtTokenCodec::new(SecretString::new(secret.to_string()), issuer)
    }

    fn claims(issuer: &str) -> SessionClaims {
        SessionClaims::new(
            &UserId::new(),
            Timestamp::from_unix_secs(1_704_067_200).unwrap(),
            3600,
            issuer,
        )
    }

    #[test]
    fn encodes_and_decodes_claims() {
        let codec = codec(SECRET, "saas-core");
        let original = claims("saas-core");

        let token = codec.encode(&original).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), original);
    }

    #[test]
    fn long_expired_claims_still_decode() {
        // 2024 claims are far in the past; expiry belongs to the session record.
        let codec = codec(SECRET, "saas-core");
        let token = codec.encode(&claims("saas-core")).unwrap();
        assert!(codec.decode(&token).is_ok());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = codec(SECRET, "saas-core").encode(&claims("saas-core")).unwrap();
        let other = codec("another-secret-entirely-32-bytes!!", "saas-core");
        assert_eq!(other.decode(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let codec = codec(SECRET, "saas-core");
        let token = codec.encode(&claims("someone-else")).unwrap();
        assert_eq!(codec.decode(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let codec = codec(SECRET, "saas-core");
        let mut token = codec.encode(&claims("saas-core")).unwrap();
        token.push('x');
        assert_eq!(codec.decode(&token), Err(AuthError::InvalidToken));
    }
}
