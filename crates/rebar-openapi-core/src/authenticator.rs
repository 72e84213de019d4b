//! Authenticator variants and their dispatch chain.
//!
//! Security scheme conversion dispatches on a *variant tag* rather than on
//! the Rust type. Each authenticator reports an ordered chain of tags, most
//! specific first, ending in [`AUTHENTICATOR_VARIANT`]. A converter registered
//! for any tag in the chain applies to the authenticator, which lets a
//! specialised authenticator reuse its parent's converter until it registers
//! its own.

use std::any::Any;
use std::fmt;

/// Root variant tag shared by every authenticator.
pub const AUTHENTICATOR_VARIANT: &str = "Authenticator";

/// Default scheme name for [`HeaderApiKeyAuthenticator`].
pub const DEFAULT_API_KEY_SCHEME_NAME: &str = "sharedSecret";

/// An authentication strategy guarding one or more handlers.
///
/// Only the declarative description is modelled here; no request is ever
/// authenticated by this crate.
pub trait Authenticator: Any + Send + Sync + fmt::Debug {
    /// Variant tags from most to least specific.
    ///
    /// The last entry should be [`AUTHENTICATOR_VARIANT`].
    fn variant_chain(&self) -> &[&'static str];

    /// Upcast for converters that need the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// The most specific variant tag.
    fn variant(&self) -> &'static str {
        self.variant_chain()
            .first()
            .copied()
            .unwrap_or(AUTHENTICATOR_VARIANT)
    }
}

/// Authenticates with a shared secret passed in a request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderApiKeyAuthenticator {
    header: String,
    name: String,
}

impl HeaderApiKeyAuthenticator {
    /// Variant tag used to register converters for this authenticator.
    pub const VARIANT: &'static str = "HeaderApiKeyAuthenticator";

    const CHAIN: &'static [&'static str] = &[Self::VARIANT, AUTHENTICATOR_VARIANT];

    /// Create an authenticator reading the key from `header`.
    ///
    /// The scheme name defaults to `sharedSecret`.
    #[must_use]
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
            name: DEFAULT_API_KEY_SCHEME_NAME.to_string(),
        }
    }

    /// Override the scheme name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Header carrying the key (e.g., `X-Api-Key`).
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Scheme name used in `securityDefinitions` / `securitySchemes`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Authenticator for HeaderApiKeyAuthenticator {
    fn variant_chain(&self) -> &[&'static str] {
        Self::CHAIN
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
