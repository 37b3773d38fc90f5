use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::services::token::codec::{CodecError, TokenCodec};

/// JWT codec (jsonwebtoken).
///
/// - HS256/HS384/HS512 with a shared secret, or EdDSA with an Ed25519 PEM pair.
/// - `decode` checks signature, structure, algorithm and (when configured)
///   `iss`/`aud`. `exp` must be present but is not judged here.
/// - A codec built without signing material can verify but not `sign`.
/// - Key material is not printable via Debug.
#[derive(Clone)]
pub struct JwtCodec {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    encoding_key: Option<EncodingKey>,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .field("can_sign", &self.encoding_key.is_some())
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtCodec {
    /// HMAC codec. `algorithm` must be one of HS256/HS384/HS512.
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Result<Self, CodecError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(CodecError::InvalidKey(format!(
                "{algorithm:?} is not an HMAC algorithm"
            )));
        }
        if secret.is_empty() {
            return Err(CodecError::InvalidKey("empty HMAC secret".to_string()));
        }

        Ok(Self::from_keys(
            algorithm,
            DecodingKey::from_secret(secret),
            Some(EncodingKey::from_secret(secret)),
        ))
    }

    /// EdDSA codec. `private_key_pem` (PKCS#8) is only needed for signing.
    pub fn ed25519(public_key_pem: &str, private_key_pem: Option<&str>) -> Result<Self, CodecError> {
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse JWT public key PEM (expected Ed25519)");
            CodecError::InvalidKey(format!("invalid ed25519 public key pem: {e}"))
        })?;

        let encoding_key = private_key_pem
            .map(|pem| {
                EncodingKey::from_ed_pem(pem.as_bytes()).map_err(|e| {
                    warn!(error = %e, "failed to parse JWT private key PEM (expected Ed25519 PKCS#8)");
                    CodecError::InvalidKey(format!("invalid ed25519 private key pem: {e}"))
                })
            })
            .transpose()?;

        Ok(Self::from_keys(Algorithm::EdDSA, decoding_key, encoding_key))
    }

    fn from_keys(
        algorithm: Algorithm,
        decoding_key: DecodingKey,
        encoding_key: Option<EncodingKey>,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry is checked by the gate after the revocation lookup.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            algorithm,
            decoding_key,
            encoding_key,
            validation,
            issuer: None,
            audience: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        self.validation.set_issuer(&[issuer.as_str()]);
        self.issuer = Some(issuer);
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        let audience = audience.into();
        self.validation.set_audience(&[audience.as_str()]);
        self.validation.validate_aud = true;
        self.audience = Some(audience);
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, CodecError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| CodecError::Unavailable("no signing key configured".to_string()))?;

        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            CodecError::Unavailable(format!("signing failed: {e}"))
        })
    }
}

impl TokenCodec for JwtCodec {
    fn decode(&self, token: &str) -> Result<Map<String, Value>, CodecError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| CodecError::Invalid(describe(e.kind(), &e)))?;

        Ok(data.claims)
    }
}

fn describe(kind: &ErrorKind, err: &jsonwebtoken::errors::Error) -> String {
    match kind {
        ErrorKind::InvalidSignature => "signature verification failed".to_string(),
        ErrorKind::InvalidAlgorithm => "algorithm not allowed".to_string(),
        ErrorKind::InvalidIssuer => "unexpected issuer".to_string(),
        ErrorKind::InvalidAudience => "unexpected audience".to_string(),
        ErrorKind::MissingRequiredClaim(claim) => format!("missing '{claim}' claim"),
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => "malformed token".to_string(),
        _ => err.to_string(),
    }
}
