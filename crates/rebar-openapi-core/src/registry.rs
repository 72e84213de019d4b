//! Handler registry: which authenticators guard which handlers.
//!
//! A trimmed-down view of an application's route table that carries only
//! what security documentation needs: paths, methods and authenticators.

use std::sync::Arc;

use crate::Authenticator;

/// Authenticator selection for a single handler.
#[derive(Debug, Clone, Default)]
pub enum HandlerAuth {
    /// Use the registry's default authenticators.
    #[default]
    UseDefault,
    /// Use exactly these authenticators (empty means public).
    Explicit(Vec<Arc<dyn Authenticator>>),
}

/// A registered handler.
#[derive(Debug, Clone)]
pub struct HandlerSpec {
    /// Framework route rule (e.g., `/projects/<uuid:project_uid>`).
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
    /// Authenticators for this handler.
    pub auth: HandlerAuth,
}

/// Collection of handlers plus the authenticators they default to.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    default_authenticators: Vec<Arc<dyn Authenticator>>,
    handlers: Vec<HandlerSpec>,
}

impl HandlerRegistry {
    /// Create a registry with the given default authenticators.
    #[must_use]
    pub fn new(default_authenticators: Vec<Arc<dyn Authenticator>>) -> Self {
        Self {
            default_authenticators,
            handlers: Vec::new(),
        }
    }

    /// Register a handler.
    #[must_use]
    pub fn handler(mut self, path: &str, method: &str, auth: HandlerAuth) -> Self {
        self.handlers.push(HandlerSpec {
            path: path.to_string(),
            method: method.to_ascii_lowercase(),
            auth,
        });
        self
    }

    /// Default authenticators, in registration order.
    #[must_use]
    pub fn default_authenticators(&self) -> &[Arc<dyn Authenticator>] {
        &self.default_authenticators
    }

    /// Registered handlers, in registration order.
    #[must_use]
    pub fn handlers(&self) -> &[HandlerSpec] {
        &self.handlers
    }

    /// Every distinct authenticator referenced by the registry.
    ///
    /// Defaults come first, then handler-specific authenticators in
    /// registration order. Identity is pointer identity: two equal but
    /// separately allocated authenticators are both returned.
    #[must_use]
    pub fn authenticators(&self) -> Vec<Arc<dyn Authenticator>> {
        let explicit = self
            .handlers
            .iter()
            .filter_map(|h| match &h.auth {
                HandlerAuth::UseDefault => None,
                HandlerAuth::Explicit(auths) => Some(auths),
            })
            .flatten();

        let mut seen: Vec<Arc<dyn Authenticator>> = Vec::new();
        for auth in self.default_authenticators.iter().chain(explicit) {
            if !seen.iter().any(|s| Arc::ptr_eq(s, auth)) {
                seen.push(Arc::clone(auth));
            }
        }
        seen
    }
}
