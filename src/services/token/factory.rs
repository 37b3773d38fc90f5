//! Factory: build the `JwtCodec` from application `Config`.
use crate::config::{Config, JwtKeyConfig};
use crate::services::token::{codec::CodecError, jwt::JwtCodec};

pub fn build_jwt_codec(config: &Config) -> Result<JwtCodec, CodecError> {
    let codec = match &config.jwt_keys {
        JwtKeyConfig::Hmac { algorithm, secret } => JwtCodec::hmac(*algorithm, secret.as_bytes())?,
        JwtKeyConfig::Ed25519 {
            public_key_pem,
            private_key_pem,
        } => JwtCodec::ed25519(public_key_pem, private_key_pem.as_deref())?,
    };

    let codec = match &config.auth_issuer {
        Some(iss) => codec.with_issuer(iss.clone()),
        None => codec,
    };

    Ok(match &config.auth_audience {
        Some(aud) => codec.with_audience(aud.clone()),
        None => codec,
    })
}
