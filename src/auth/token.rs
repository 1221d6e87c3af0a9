// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token encoding and verification.
//!
//! Tokens are compact JWTs signed with a single shared HMAC secret. The
//! codec is built once at startup from [`JwtSettings`] and shared read-only
//! across requests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;
use crate::config::{JwtSettings, SecretEncoding};

/// Algorithm used for newly issued tokens.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted on verification. All are keyed by the shared secret.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token algorithm is not accepted")]
    UnsupportedAlgorithm,

    #[error("token is malformed")]
    Malformed,

    #[error("signing key is invalid: {0}")]
    InvalidKey(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Signs and verifies bearer tokens with the shared secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: Duration,
}

impl TokenCodec {
    /// Create a codec from raw secret bytes.
    pub fn new(secret: &[u8], expiration: Duration) -> Self {
        Self::from_keys(
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
            expiration,
        )
    }

    /// Create a codec from configuration.
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, TokenError> {
        match settings.encoding {
            SecretEncoding::Text => Ok(Self::new(settings.secret.as_bytes(), settings.expiration)),
            SecretEncoding::Base64 => {
                let encoding_key = EncodingKey::from_base64_secret(&settings.secret)
                    .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
                let decoding_key = DecodingKey::from_base64_secret(&settings.secret)
                    .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
                Ok(Self::from_keys(encoding_key, decoding_key, settings.expiration))
            }
        }
    }

    fn from_keys(encoding_key: EncodingKey, decoding_key: DecodingKey, expiration: Duration) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // No clock skew tolerance: a past `exp` is expired.
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            expiration,
        }
    }

    /// Lifetime of newly issued tokens.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Issue a token for `username`, valid from `issued_at` for the
    /// configured lifetime.
    pub fn encode(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let lifetime = chrono::Duration::from_std(self.expiration)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        let claims = Claims::new(username, issued_at, issued_at + lifetime);
        self.encode_claims(&claims)
    }

    /// Sign arbitrary claims.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning all claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }

    /// Verify a token and return its subject.
    pub fn decode(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::Duration as ChronoDuration;

    const SECRET: &[u8] = b"test-secret-with-enough-entropy";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, Duration::from_secs(3600))
    }

    #[test]
    fn encode_then_decode_returns_subject() {
        let codec = codec();
        let token = codec.encode("alice", Utc::now()).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), "alice");
    }

    #[test]
    fn decoding_is_repeatable() {
        let codec = codec();
        let token = codec.encode("alice", Utc::now()).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), codec.decode(&token).unwrap());
    }

    #[test]
    fn expiry_is_issued_at_plus_lifetime() {
        let codec = codec();
        let issued = Utc::now();
        let token = codec.encode("alice", issued).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.iat, issued.timestamp());
        assert_eq!(claims.exp, issued.timestamp() + 3600);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenCodec::new(b"another-secret", Duration::from_secs(3600))
            .encode("alice", Utc::now())
            .unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let issued = Utc::now() - ChronoDuration::hours(2);
        let token = codec.encode("alice", issued).unwrap();
        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_expired_one_second_ago_is_rejected() {
        let codec = codec();
        let now = Utc::now();
        let claims = Claims::new("alice", now - ChronoDuration::hours(1), now - ChronoDuration::seconds(1));
        let token = codec.encode_claims(&claims).unwrap();
        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(codec().decode("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(codec().decode(""), Err(TokenError::Malformed));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"alice","exp":9999999999}"#);
        let token = format!("{header}.{claims}.");
        assert!(codec().decode(&token).is_err());
    }

    fn sign_with(algorithm: Algorithm, subject: &str) -> String {
        let now = Utc::now();
        let claims = Claims::new(subject, now, now + ChronoDuration::hours(1));
        encode(&Header::new(algorithm), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    #[test]
    fn hs384_with_shared_secret_is_accepted() {
        let token = sign_with(Algorithm::HS384, "alice");
        assert_eq!(codec().decode(&token).unwrap(), "alice");
    }

    #[test]
    fn hs512_with_shared_secret_is_accepted() {
        let token = sign_with(Algorithm::HS512, "alice");
        assert_eq!(codec().decode(&token).unwrap(), "alice");
    }

    #[test]
    fn asymmetric_algorithms_are_rejected() {
        let exp = (Utc::now() + ChronoDuration::hours(1)).timestamp();
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"alice","exp":{exp}}}"#));
        let signature = URL_SAFE_NO_PAD.encode(b"not-a-real-signature");

        for alg in ["RS256", "ES256", "PS256", "EdDSA"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#));
            let token = format!("{header}.{claims}.{signature}");
            assert_eq!(
                codec().decode(&token),
                Err(TokenError::UnsupportedAlgorithm),
                "{alg}"
            );
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.encode("alice", Utc::now()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"mallory","exp":9999999999}"#);
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert_eq!(codec.decode(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn empty_subject_is_malformed() {
        let codec = codec();
        let now = Utc::now();
        let claims = Claims::new("", now, now + ChronoDuration::hours(1));
        let token = codec.encode_claims(&claims).unwrap();
        assert_eq!(codec.decode(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn base64_secret_matches_decoded_bytes() {
        let settings = JwtSettings {
            secret: "c2hhcmVkLXNlY3JldA==".to_string(),
            encoding: SecretEncoding::Base64,
            expiration: Duration::from_secs(60),
        };
        let from_settings = TokenCodec::from_settings(&settings).unwrap();
        let raw = TokenCodec::new(b"shared-secret", Duration::from_secs(60));

        let token = raw.encode("alice", Utc::now()).unwrap();
        assert_eq!(from_settings.decode(&token).unwrap(), "alice");
    }

    #[test]
    fn invalid_base64_secret_fails() {
        let settings = JwtSettings {
            secret: "%%%".to_string(),
            encoding: SecretEncoding::Base64,
            expiration: Duration::from_secs(60),
        };
        assert!(matches!(
            TokenCodec::from_settings(&settings),
            Err(TokenError::InvalidKey(_))
        ));
    }
}
