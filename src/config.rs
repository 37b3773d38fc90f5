/*
 * Responsibility
 * - Load settings from the environment (.env supported): listen address, JWT keys,
 *   token lifetimes, exclusion rules, revocation backend
 * - Validate them (missing / invalid values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::middleware::auth::exclusion::ExclusionRule;

pub const DEFAULT_EXCLUDED_ROUTES: &str = r#"["/api/v1/health", "/api/v1/auth/token"]"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Key material for the JWT codec.
#[derive(Clone)]
pub enum JwtKeyConfig {
    Hmac {
        algorithm: Algorithm,
        secret: String,
    },
    Ed25519 {
        public_key_pem: String,
        private_key_pem: Option<String>,
    },
}

impl fmt::Debug for JwtKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Hmac { algorithm, .. } => f
                .debug_struct("Hmac")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            Self::Ed25519 {
                private_key_pem, ..
            } => f
                .debug_struct("Ed25519")
                .field("can_sign", &private_key_pem.is_some())
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub jwt_keys: JwtKeyConfig,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,
    pub excluded_routes: Vec<ExclusionRule>,
    pub token_issue_enabled: bool,

    // Valkey/Redis for the revocation registry; in-process memory when unset
    pub redis_url: Option<String>,
    pub revocation_key_prefix: String,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = parse_var(&var, "PORT", 3000)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let jwt_keys = jwt_keys_from(&var)?;

        let auth_issuer = var("AUTH_ISSUER");
        let auth_audience = var("AUTH_AUDIENCE");

        let access_token_ttl_seconds: u64 = parse_var(&var, "ACCESS_TOKEN_TTL_SECONDS", 3600)?;
        if access_token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }

        let access_token_leeway_seconds: u64 =
            parse_var(&var, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        let excluded_routes = match var("AUTH_EXCLUDED_ROUTES") {
            Some(raw) => parse_excluded_routes(&raw)?,
            None => parse_excluded_routes(DEFAULT_EXCLUDED_ROUTES)?,
        };

        // Issuance signs tokens for any subject, so it is opt-in.
        let token_issue_enabled = match var("TOKEN_ISSUE_ENABLED") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("TOKEN_ISSUE_ENABLED"))?,
            None => false,
        };

        let redis_url = var("REDIS_URL");
        let revocation_key_prefix =
            var("REVOCATION_KEY_PREFIX").unwrap_or_else(|| "auth:revoked".to_string());

        let request_timeout_seconds: u64 = parse_var(&var, "REQUEST_TIMEOUT_SECONDS", 30)?;
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        let request_body_limit_bytes: usize =
            parse_var(&var, "REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            jwt_keys,
            auth_issuer,
            auth_audience,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            excluded_routes,
            token_issue_enabled,
            redis_url,
            revocation_key_prefix,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

// Unset means `default`; a value that does not parse is a startup error.
fn parse_var<T, V>(var: &V, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn jwt_keys_from<V>(var: &V) -> Result<JwtKeyConfig, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    let algorithm = var("JWT_ALGORITHM")
        .map(|v| Algorithm::from_str(&v).map_err(|_| ConfigError::Invalid("JWT_ALGORITHM")))
        .transpose()?
        .unwrap_or(Algorithm::HS256);

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            let secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
            Ok(JwtKeyConfig::Hmac { algorithm, secret })
        }
        Algorithm::EdDSA => {
            let public_key_pem = var("JWT_PUBLIC_KEY_PEM")
                .ok_or(ConfigError::Missing("JWT_PUBLIC_KEY_PEM"))?
                .replace("\\n", "\n");
            let private_key_pem = var("JWT_PRIVATE_KEY_PEM").map(|pem| pem.replace("\\n", "\n"));
            Ok(JwtKeyConfig::Ed25519 {
                public_key_pem,
                private_key_pem,
            })
        }
        _ => Err(ConfigError::Invalid("JWT_ALGORITHM")),
    }
}

/// Parse a JSON array of exclusion rules (strings or `{path, methods}` objects).
pub fn parse_excluded_routes(raw: &str) -> Result<Vec<ExclusionRule>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::warn!(error = %e, "invalid AUTH_EXCLUDED_ROUTES");
        ConfigError::Invalid("AUTH_EXCLUDED_ROUTES")
    })
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use std::collections::HashMap;

    #[test]
    fn default_exclusions_parse() {
        let rules = parse_excluded_routes(DEFAULT_EXCLUDED_ROUTES).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].matches(&Method::GET, "/api/v1/health"));
        assert!(rules[1].matches(&Method::POST, "/api/v1/auth/token"));
    }

    #[test]
    fn mixed_rule_shapes_parse() {
        let rules = parse_excluded_routes(
            r#"["/public/*", {"path": "/api/users", "methods": ["get"]}, {"path": "/api/posts"}]"#,
        )
        .unwrap();

        assert!(rules[0].matches(&Method::PATCH, "/public/a/b"));
        assert!(rules[1].matches(&Method::GET, "/api/users"));
        assert!(!rules[1].matches(&Method::DELETE, "/api/users"));
        assert!(rules[2].matches(&Method::PUT, "/api/posts"));
        assert!(!rules[2].matches(&Method::PATCH, "/api/posts"));
    }

    #[test]
    fn bad_rules_are_config_errors() {
        assert!(matches!(
            parse_excluded_routes(r#"{"path": "/x"}"#),
            Err(ConfigError::Invalid("AUTH_EXCLUDED_ROUTES"))
        ));
        assert!(matches!(
            parse_excluded_routes(r#"[{"path": "/x", "methods": ["NOT A METHOD"]}]"#),
            Err(ConfigError::Invalid("AUTH_EXCLUDED_ROUTES"))
        ));
    }

    fn lookup(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_a_secret() {
        let config = lookup(&[("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.access_token_ttl_seconds, 3600);
        assert_eq!(config.access_token_leeway_seconds, 0);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.request_body_limit_bytes, 1024 * 1024);
        assert_eq!(config.excluded_routes.len(), 2);
        assert_eq!(config.revocation_key_prefix, "auth:revoked");
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn token_issuance_is_opt_in() {
        assert!(!lookup(&[("JWT_SECRET", "s")]).unwrap().token_issue_enabled);
        assert!(
            !lookup(&[("JWT_SECRET", "s"), ("APP_ENV", "development")])
                .unwrap()
                .token_issue_enabled
        );
        assert!(
            lookup(&[("JWT_SECRET", "s"), ("TOKEN_ISSUE_ENABLED", "true")])
                .unwrap()
                .token_issue_enabled
        );
        assert!(matches!(
            lookup(&[("JWT_SECRET", "s"), ("TOKEN_ISSUE_ENABLED", "sometimes")]),
            Err(ConfigError::Invalid("TOKEN_ISSUE_ENABLED"))
        ));
    }

    #[test]
    fn unparsable_numbers_fail_startup() {
        let cases = [
            ("PORT", "eighty"),
            ("PORT", "70000"),
            ("ACCESS_TOKEN_TTL_SECONDS", "1h"),
            ("ACCESS_TOKEN_TTL_SECONDS", "0"),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", "-5"),
            ("REQUEST_TIMEOUT_SECONDS", "soon"),
            ("REQUEST_TIMEOUT_SECONDS", "0"),
            ("REQUEST_BODY_LIMIT_BYTES", "1MB"),
        ];

        for (key, value) in cases {
            let result = lookup(&[("JWT_SECRET", "s"), (key, value)]);
            assert!(
                matches!(result, Err(ConfigError::Invalid(k)) if k == key),
                "{key}={value} gave {result:?}"
            );
        }
    }

    #[test]
    fn numbers_are_read_when_valid() {
        let config = lookup(&[
            ("JWT_SECRET", "s"),
            ("PORT", " 8080 "),
            ("ACCESS_TOKEN_TTL_SECONDS", "60"),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", "5"),
            ("REQUEST_TIMEOUT_SECONDS", "10"),
            ("REQUEST_BODY_LIMIT_BYTES", "2048"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.access_token_ttl_seconds, 60);
        assert_eq!(config.access_token_leeway_seconds, 5);
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.request_body_limit_bytes, 2048);
    }

    #[test]
    fn key_material_is_required() {
        assert!(matches!(lookup(&[]), Err(ConfigError::Missing("JWT_SECRET"))));
        assert!(matches!(
            lookup(&[("JWT_ALGORITHM", "EdDSA")]),
            Err(ConfigError::Missing("JWT_PUBLIC_KEY_PEM"))
        ));
        assert!(matches!(
            lookup(&[("JWT_ALGORITHM", "RS256"), ("JWT_SECRET", "s")]),
            Err(ConfigError::Invalid("JWT_ALGORITHM"))
        ));
    }

    #[test]
    fn app_env_recognises_production_aliases() {
        assert_eq!(AppEnv::parse(Some("PROD")), AppEnv::Production);
        assert_eq!(AppEnv::parse(Some(" production ")), AppEnv::Production);
        assert_eq!(AppEnv::parse(Some("staging")), AppEnv::Development);
        assert_eq!(AppEnv::parse(None), AppEnv::Development);
    }

    #[test]
    fn bools_parse_leniently() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
