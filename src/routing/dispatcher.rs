//! Request dispatch.
//!
//! # Responsibilities
//! - Hold the compiled rules for every registered method
//! - Resolve a request to its endpoint and bound parameters
//! - Return an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction; a table mutation builds a new one
//! - Two levels: method first, then host + path in registration order
//! - First match wins

use serde::Serialize;

use crate::routing::matcher::{HostAndPathMatcher, HostMatcher, Matcher, MethodMatcher, RequestTarget};
use crate::routing::pattern::Params;
use crate::routing::table::MethodRoutes;

/// A resolved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub endpoint: String,
    pub params: Params,
}

#[derive(Debug)]
struct PathRule {
    matcher: HostAndPathMatcher,
    endpoint: String,
}

#[derive(Debug)]
struct MethodRules {
    matcher: MethodMatcher,
    rules: Vec<PathRule>,
}

/// Compiled snapshot of the route table.
#[derive(Debug, Default)]
pub struct Dispatcher {
    methods: Vec<MethodRules>,
}

impl Dispatcher {
    /// A dispatcher that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn build(routes: &MethodRoutes, primary_domain_len: usize) -> Self {
        let methods = routes
            .iter()
            .map(|(method, entries)| MethodRules {
                matcher: MethodMatcher::new(method.as_str()),
                rules: entries
                    .iter()
                    .map(|entry| PathRule {
                        matcher: HostAndPathMatcher::new(
                            HostMatcher::new(entry.route.host.as_str(), primary_domain_len),
                            entry.pattern.clone(),
                        ),
                        endpoint: entry.route.endpoint.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { methods }
    }

    /// Resolve a request against this snapshot.
    pub fn resolve(&self, req: &RequestTarget<'_>) -> Option<Resolution> {
        // Methods are unique, so only one group can apply.
        let group = self
            .methods
            .iter()
            .find(|group| group.matcher.matches(req).is_some())?;

        group.rules.iter().find_map(|rule| {
            rule.matcher.matches(req).map(|params| Resolution {
                endpoint: rule.endpoint.clone(),
                params,
            })
        })
    }

    /// Number of compiled rules across all methods.
    pub fn rule_count(&self) -> usize {
        self.methods.iter().map(|m| m.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}
