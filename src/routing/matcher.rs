//! Request matching logic.
//!
//! # Responsibilities
//! - Match HTTP method (case-insensitive)
//! - Match tenant host after stripping the shared platform suffix
//! - Match path against a compiled template and return its bindings
//!
//! # Design Decisions
//! - One capability, `matches`, returning the bound parameters or `None`
//! - Host comparison is ASCII case-insensitive (per HTTP spec)
//! - Path matching is case-sensitive

use crate::routing::pattern::{Params, PathPattern};

/// The request attributes the routing layer looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
}

impl<'a> RequestTarget<'a> {
    pub fn new(method: &'a str, host: &'a str, path: &'a str) -> Self {
        Self { method, host, path }
    }
}

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the parameters bound by this condition if the request matches.
    fn matches(&self, req: &RequestTarget<'_>) -> Option<Params>;
}

/// Matches the request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatcher {
    method: String,
}

impl MethodMatcher {
    /// The method is normalized to uppercase.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> Option<Params> {
        req.method
            .eq_ignore_ascii_case(&self.method)
            .then(Params::new)
    }
}

/// Matches the tenant part of the Host header.
///
/// `foo.asyncyapp.com.storyscriptapp.com` is compared as `foo.asyncyapp.com`
/// when the primary domain is `storyscriptapp.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatcher {
    tenant_host: String,
    primary_domain_len: usize,
}

impl HostMatcher {
    pub fn new(tenant_host: impl Into<String>, primary_domain_len: usize) -> Self {
        Self {
            tenant_host: tenant_host.into(),
            primary_domain_len,
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> Option<Params> {
        strip_platform_suffix(req.host, self.primary_domain_len)
            .filter(|candidate| candidate.eq_ignore_ascii_case(&self.tenant_host))
            .map(|_| Params::new())
    }
}

/// Removes the primary domain and its leading dot from a request host.
///
/// Returns `None` when the host is too short to carry the suffix.
pub fn strip_platform_suffix(host: &str, primary_domain_len: usize) -> Option<&str> {
    let cut = host.len().checked_sub(primary_domain_len + 1)?;
    host.get(..cut)
}

impl Matcher for PathPattern {
    fn matches(&self, req: &RequestTarget<'_>) -> Option<Params> {
        PathPattern::matches(self, req.path)
    }
}

/// Tenant host gate followed by a path template.
#[derive(Debug, Clone)]
pub struct HostAndPathMatcher {
    host: HostMatcher,
    pattern: PathPattern,
}

impl HostAndPathMatcher {
    pub fn new(host: HostMatcher, pattern: PathPattern) -> Self {
        Self { host, pattern }
    }
}

impl Matcher for HostAndPathMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> Option<Params> {
        // A different tenant never reaches the path check.
        self.host.matches(req)?;
        Matcher::matches(&self.pattern, req)
    }
}
