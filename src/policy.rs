//! Route-level access control.
//!
//! An ordered table of `(pattern, requirement)` rules. The first rule whose pattern
//! matches the request path decides; unmatched paths require an authenticated caller.

use crate::auth::Principal;
use crate::models::ADMIN_ROLE;

/// What a route demands of its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    RequiresRole(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny(DenyReason),
}

/// PathPattern
///
/// Either an exact path, or `prefix/**` which matches `prefix` itself and anything below it
/// on a segment boundary (`/api/destinations/**` does not match `/api/destinationsX`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Subtree(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Subtree(prefix.trim_end_matches('/').to_string()),
            None => PathPattern::Exact(normalize(pattern).to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        match self {
            PathPattern::Exact(exact) => path == exact.as_str(),
            PathPattern::Subtree(prefix) if prefix.is_empty() => true,
            PathPattern::Subtree(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// Trailing slashes are not significant; an all-slash path is the root.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

/// AccessPolicy
///
/// Rules are evaluated in declaration order, so narrower patterns must be listed before
/// the broader ones that would otherwise shadow them.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<Rule>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
            .rule("/health", Requirement::Public)
            .rule("/swagger-ui/**", Requirement::Public)
            .rule("/api-docs/**", Requirement::Public)
            .rule("/api/auth/login", Requirement::Public)
            .rule("/api/auth/**", Requirement::RequiresRole(ADMIN_ROLE.to_string()))
            .rule("/api/destinations/public/**", Requirement::Public)
            .rule("/api/destinations/**", Requirement::Authenticated)
    }
}

impl AccessPolicy {
    /// An empty table: every path falls back to `Authenticated`.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule after the existing ones.
    pub fn rule(mut self, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(Rule {
            pattern: PathPattern::parse(pattern),
            requirement,
        });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The requirement of the first matching rule, or `Authenticated` when none matches.
    pub fn requirement_for(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.requirement.clone())
            .unwrap_or(Requirement::Authenticated)
    }

    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.requirement_for(path), principal) {
            (Requirement::Public, _) => Decision::Permit,
            (_, None) => Decision::Deny(DenyReason::Unauthenticated),
            (Requirement::Authenticated, Some(_)) => Decision::Permit,
            (Requirement::RequiresRole(role), Some(principal)) => {
                if principal.has_role(&role) {
                    Decision::Permit
                } else {
                    Decision::Deny(DenyReason::Forbidden)
                }
            }
        }
    }
}
