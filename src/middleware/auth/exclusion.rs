//! Routes exempt from bearer authentication.
//!
//! A rule is either a bare path pattern (any method) or a path pattern plus a
//! method set. In patterns `*` matches any sequence of characters (slashes
//! included); everything else is literal. Matching is case-insensitive and
//! anchored at both ends.

use axum::http::Method;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Methods an object rule covers when it lists none.
///
/// `HEAD` is not included even though axum answers it on GET routes: a
/// `{path}` rule leaves `HEAD` gated. List it explicitly to exempt it.
pub const DEFAULT_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("empty path pattern")]
    EmptyPattern,
    #[error("invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid HTTP method '{0}'")]
    Method(String),
}

#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = RegexBuilder::new(&format!("^{body}$"))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| RuleError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRule")]
pub enum ExclusionRule {
    /// Path only, any method.
    Path(PathPattern),
    /// Path restricted to a method set.
    Route {
        path: PathPattern,
        methods: Vec<Method>,
    },
}

impl ExclusionRule {
    pub fn path(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self::Path(PathPattern::new(pattern)?))
    }

    /// `methods` empty means `DEFAULT_METHODS`.
    pub fn route<I, M>(pattern: &str, methods: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        let mut parsed = methods
            .into_iter()
            .map(|m| parse_method(m.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            parsed = DEFAULT_METHODS.to_vec();
        }

        Ok(Self::Route {
            path: PathPattern::new(pattern)?,
            methods: parsed,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        match self {
            Self::Path(p) | Self::Route { path: p, .. } => p,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        match self {
            Self::Path(pattern) => pattern.matches(path),
            Self::Route {
                path: pattern,
                methods,
            } => methods.contains(method) && pattern.matches(path),
        }
    }
}

/// First match wins.
pub fn find_match<'a>(
    rules: &'a [ExclusionRule],
    method: &Method,
    path: &str,
) -> Option<&'a ExclusionRule> {
    rules.iter().find(|rule| rule.matches(method, path))
}

fn parse_method(raw: &str) -> Result<Method, RuleError> {
    let upper = raw.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| RuleError::Method(raw.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRule {
    Path(String),
    Route {
        path: String,
        #[serde(default)]
        methods: Vec<String>,
    },
}

impl TryFrom<RawRule> for ExclusionRule {
    type Error = RuleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        match raw {
            RawRule::Path(path) => Self::path(&path),
            RawRule::Route { path, methods } => Self::route(&path, methods),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_patterns_are_anchored() {
        let p = PathPattern::new("/api/status").unwrap();
        assert!(p.matches("/api/status"));
        assert!(!p.matches("/api/status/extra"));
        assert!(!p.matches("/v2/api/status"));
    }

    #[test]
    fn matching_ignores_case() {
        let p = PathPattern::new("/API/Status").unwrap();
        assert!(p.matches("/api/status"));
        assert!(p.matches("/Api/STATUS"));
    }

    #[test]
    fn wildcard_spans_segments() {
        let p = PathPattern::new("/public/*").unwrap();
        assert!(p.matches("/public/"));
        assert!(p.matches("/public/a"));
        assert!(p.matches("/public/a/b/c"));
        assert!(!p.matches("/public"));

        let mid = PathPattern::new("/api/*/profile").unwrap();
        assert!(mid.matches("/api/users/7/profile"));
        assert!(!mid.matches("/api/users/7/settings"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = PathPattern::new("/files/a.b+(c)").unwrap();
        assert!(p.matches("/files/a.b+(c)"));
        assert!(!p.matches("/files/aXbb(c)"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(matches!(PathPattern::new("  "), Err(RuleError::EmptyPattern)));
    }

    #[test]
    fn string_rules_match_any_method() {
        let rule = ExclusionRule::path("/api/status").unwrap();
        assert!(rule.matches(&Method::GET, "/api/status"));
        assert!(rule.matches(&Method::PATCH, "/api/status"));
        assert!(rule.matches(&Method::OPTIONS, "/api/status"));
    }

    #[test]
    fn route_rules_check_method() {
        let rule = ExclusionRule::route("/api/users", ["GET"]).unwrap();
        assert!(rule.matches(&Method::GET, "/api/users"));
        assert!(!rule.matches(&Method::DELETE, "/api/users"));
    }

    #[test]
    fn route_rules_default_methods() {
        let rule = ExclusionRule::route("/api/users", Vec::<String>::new()).unwrap();
        for m in DEFAULT_METHODS {
            assert!(rule.matches(&m, "/api/users"));
        }
        assert!(!rule.matches(&Method::PATCH, "/api/users"));
        assert!(!rule.matches(&Method::HEAD, "/api/users"));
    }

    #[test]
    fn head_is_exempt_only_when_listed() {
        let rule = ExclusionRule::route("/api/users", ["GET", "HEAD"]).unwrap();
        assert!(rule.matches(&Method::HEAD, "/api/users"));
        assert!(!rule.matches(&Method::POST, "/api/users"));
    }

    #[test]
    fn method_names_are_case_insensitive() {
        let rule = ExclusionRule::route("/x", ["post", " Put "]).unwrap();
        assert!(rule.matches(&Method::POST, "/x"));
        assert!(rule.matches(&Method::PUT, "/x"));
        assert!(matches!(
            ExclusionRule::route("/x", ["NO SUCH"]),
            Err(RuleError::Method(_))
        ));
    }

    #[test]
    fn first_match_wins() {
        let rules = vec![
            ExclusionRule::route("/api/*", ["GET"]).unwrap(),
            ExclusionRule::path("/api/users").unwrap(),
        ];
        let hit = find_match(&rules, &Method::GET, "/api/users").unwrap();
        assert_eq!(hit, &rules[0]);
        let hit = find_match(&rules, &Method::POST, "/api/users").unwrap();
        assert_eq!(hit, &rules[1]);
        assert!(find_match(&rules, &Method::POST, "/api/posts").is_none());
    }

    #[test]
    fn rules_deserialize_from_json() {
        let rules: Vec<ExclusionRule> = serde_json::from_str(
            r#"["/api/status", {"path": "/api/users", "methods": ["GET"]}]"#,
        )
        .unwrap();

        assert_eq!(rules[0], ExclusionRule::path("/api/status").unwrap());
        assert_eq!(rules[1], ExclusionRule::route("/api/users", ["GET"]).unwrap());
    }
}
