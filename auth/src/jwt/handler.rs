use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow services to define their own token payload.
/// Uses HS256 (HMAC with SHA-256) algorithm.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// The signature, the algorithm and the `exp` claim are always checked,
    /// with no leeway. Nothing is returned unless every check passes.
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is in the past
    /// * `InvalidToken` - Malformed token, bad signature, wrong algorithm or missing claims
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::jwt::SessionClaims;

    fn claims_valid_for(ttl: Duration) -> SessionClaims {
        SessionClaims::issue("user123", "ana@x.cl", "doctor", Utc::now(), ttl)
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let claims = claims_valid_for(Duration::hours(1));

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: SessionClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = handler.decode::<SessionClaims>("invalid.token.here");
        assert_eq!(result.unwrap_err(), JwtError::InvalidToken);
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .encode(&claims_valid_for(Duration::hours(1)))
            .expect("Failed to encode token");

        let result = handler2.decode::<SessionClaims>(&token);
        assert_eq!(result.unwrap_err(), JwtError::InvalidToken);
    }

    #[test]
    fn test_decode_expired_token() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let claims = SessionClaims::issue(
            "user123",
            "ana@x.cl",
            "doctor",
            Utc::now() - Duration::hours(2),
            Duration::hours(1),
        );

        let token = handler.encode(&claims).expect("Failed to encode token");

        let result = handler.decode::<SessionClaims>(&token);
        assert_eq!(result.unwrap_err(), JwtError::TokenExpired);
    }

    #[test]
    fn test_decode_rejects_token_without_expiration() {
        #[derive(Serialize)]
        struct NoExpiry {
            sub: String,
        }

        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = handler
            .encode(&NoExpiry {
                sub: "user123".to_string(),
            })
            .expect("Failed to encode token");

        let result = handler.decode::<SessionClaims>(&token);
        assert_eq!(result.unwrap_err(), JwtError::InvalidToken);
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = handler
            .encode(&claims_valid_for(Duration::hours(1)))
            .expect("Failed to encode token");
        let forged = handler
            .encode(&SessionClaims::issue(
                "user123",
                "ana@x.cl",
                "doctor",
                Utc::now(),
                Duration::days(365),
            ))
            .expect("Failed to encode token");

        // Graft the longer-lived payload onto the original signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        let result = handler.decode::<SessionClaims>(&tampered);
        assert_eq!(result.unwrap_err(), JwtError::InvalidToken);
    }
}
