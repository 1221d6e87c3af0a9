// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route authorization rules.
//!
//! ## Pattern Syntax
//!
//! Patterns are Ant-style path globs compiled with the `glob` crate:
//!
//! - `?` matches exactly one character within a segment
//! - `*` matches zero or more characters within a segment
//! - `**` as a whole segment matches zero or more segments
//!
//! `/webjars/**` therefore matches `/webjars`, `/webjars/` and everything
//! below it, while `/swagger-ui.html` matches only itself.
//!
//! ## Decision
//!
//! A path matching any public rule is allowed without a principal. Every
//! other path, including paths no rule mentions, requires one.

use glob::{MatchOptions, Pattern, PatternError};

use super::{AuthError, SecurityContext};

/// A static route rule, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAuthRule {
    pub path_pattern: String,
    pub requires_auth: bool,
}

impl RouteAuthRule {
    pub fn public(path_pattern: impl Into<String>) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            requires_auth: false,
        }
    }

    pub fn protected(path_pattern: impl Into<String>) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            requires_auth: true,
        }
    }
}

/// Glob options for URL paths: wildcards never cross a `/`.
const PATH_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, thiserror::Error)]
#[error("invalid path pattern '{pattern}': {source}")]
pub struct PolicyError {
    pub pattern: String,
    #[source]
    pub source: PatternError,
}

/// Compiled form of a rule's pattern.
#[derive(Debug, Clone)]
struct PathPattern {
    glob: Pattern,
    /// For `/x/**`, the pattern `/x` so the directory itself matches too.
    base: Option<Pattern>,
}

impl PathPattern {
    fn compile(pattern: &str) -> Result<Self, PolicyError> {
        let compile = |raw: &str| {
            Pattern::new(raw).map_err(|source| PolicyError {
                pattern: pattern.to_string(),
                source,
            })
        };
        let base = match pattern.strip_suffix("/**") {
            Some(base) if !base.is_empty() => Some(compile(base)?),
            _ => None,
        };
        Ok(Self {
            glob: compile(pattern)?,
            base,
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.glob.matches_with(path, PATH_MATCH_OPTIONS)
            || self
                .base
                .as_ref()
                .is_some_and(|base| base.matches_with(path, PATH_MATCH_OPTIONS))
    }
}

/// Dot segments are never treated as public.
fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|s| s == "." || s == "..")
}

/// Ordered, immutable list of route rules.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<(RouteAuthRule, PathPattern)>,
}

impl AuthorizationPolicy {
    /// Compile every rule, failing on the first invalid pattern.
    pub fn new(rules: impl IntoIterator<Item = RouteAuthRule>) -> Result<Self, PolicyError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let pattern = PathPattern::compile(&rule.path_pattern)?;
                Ok((rule, pattern))
            })
            .collect::<Result<_, PolicyError>>()?;
        Ok(Self { rules })
    }

    /// A policy whose only rules are the given public patterns.
    pub fn with_public_paths<I, S>(paths: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(paths.into_iter().map(RouteAuthRule::public))
    }

    pub fn rules(&self) -> impl Iterator<Item = &RouteAuthRule> {
        self.rules.iter().map(|(rule, _)| rule)
    }

    /// Whether `path` may be served without a principal.
    pub fn is_public(&self, path: &str) -> bool {
        if has_dot_segment(path) {
            return false;
        }
        self.rules
            .iter()
            .any(|(rule, pattern)| !rule.requires_auth && pattern.matches(path))
    }

    pub fn requires_auth(&self, path: &str) -> bool {
        !self.is_public(path)
    }

    /// Allow or reject a request given its security context.
    pub fn authorize(&self, path: &str, context: &SecurityContext) -> Result<(), AuthError> {
        if self.is_public(path) || context.is_authenticated() {
            Ok(())
        } else {
            Err(AuthError::AuthenticationRequired)
        }
    }
}
