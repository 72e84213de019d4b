//! Project-level configuration loaded from YAML or TOML.
//!
//! Keeps project-specific knobs (target OpenAPI version, `$ref` base, default
//! authenticators) next to the schemas instead of hardcoding them.
//!
//! # File format
//!
//! ```yaml
//! # api/openapi/config.yaml
//! # v2 → "#/definitions", v3 → "#/components/schemas"
//! openapi_version: v3
//!
//! # Explicit `$ref` base; overrides the one implied by `openapi_version`.
//! ref_base: "#/components/schemas"
//!
//! # Keep a titled root schema inline instead of extracting it.
//! inline_root: false
//!
//! # Default authenticators described under `securitySchemes`.
//! authenticators:
//!   - kind: header_api_key
//!     header: X-Api-Key
//!     name: sharedSecret
//! ```
//!
//! The same keys are accepted in a `.toml` file.

use std::path::Path;
use std::sync::Arc;

use rebar_openapi_core::{Authenticator, HandlerRegistry, HeaderApiKeyAuthenticator};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::flatten::{COMPONENTS_REF_BASE, DEFINITIONS_REF_BASE, Flattener};

/// Target OpenAPI major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenApiVersion {
    /// Swagger 2.0: `definitions`, `securityDefinitions`.
    #[default]
    V2,
    /// OpenAPI 3.x: `components.schemas`, `components.securitySchemes`.
    V3,
}

impl OpenApiVersion {
    /// `$ref` base for extracted schema definitions.
    #[must_use]
    pub fn ref_base(self) -> &'static str {
        match self {
            Self::V2 => DEFINITIONS_REF_BASE,
            Self::V3 => COMPONENTS_REF_BASE,
        }
    }

    /// Document key holding security scheme definitions.
    #[must_use]
    pub fn security_schemes_key(self) -> &'static str {
        match self {
            Self::V2 => "securityDefinitions",
            Self::V3 => "securitySchemes",
        }
    }
}

/// Project-level generation config.
///
/// Loaded from a file via [`ProjectConfig::load`]; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Target OpenAPI version.
    pub openapi_version: OpenApiVersion,

    /// Explicit `$ref` base, overriding the version default.
    pub ref_base: Option<String>,

    /// Keep a titled root schema inline.
    pub inline_root: bool,

    /// Default authenticators for the handler registry.
    pub authenticators: Vec<AuthenticatorEntry>,
}

/// A declared authenticator.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatorEntry {
    /// Authenticator kind (currently `header_api_key`).
    pub kind: String,
    /// Header carrying the key.
    pub header: Option<String>,
    /// Scheme name; defaults per kind.
    pub name: Option<String>,
}

impl ProjectConfig {
    /// Load config from a YAML or TOML file, chosen by extension.
    ///
    /// `.toml` files are parsed as TOML; anything else as YAML (which also
    /// accepts JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config: Self = if is_toml {
            toml::from_str(&content)?
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        Ok(config)
    }

    /// Effective `$ref` base: explicit override or the version default.
    #[must_use]
    pub fn ref_base(&self) -> &str {
        self.ref_base
            .as_deref()
            .unwrap_or_else(|| self.openapi_version.ref_base())
    }

    /// Flattener configured from this project.
    #[must_use]
    pub fn flattener(&self) -> Flattener {
        Flattener::new(self.ref_base()).inline_root(self.inline_root)
    }

    /// Build a handler registry whose defaults are the declared authenticators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAuthenticatorKind`] for an unrecognized `kind`.
    pub fn handler_registry(&self) -> Result<HandlerRegistry> {
        let defaults = self
            .authenticators
            .iter()
            .map(AuthenticatorEntry::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(HandlerRegistry::new(defaults))
    }
}

impl AuthenticatorEntry {
    /// Instantiate the declared authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAuthenticatorKind`] for an unrecognized `kind`.
    pub fn build(&self) -> Result<Arc<dyn Authenticator>> {
        match self.kind.as_str() {
            "header_api_key" => {
                let header = self.header.as_deref().unwrap_or("X-Api-Key");
                let mut auth = HeaderApiKeyAuthenticator::new(header);
                if let Some(name) = &self.name {
                    auth = auth.with_name(name);
                }
                Ok(Arc::new(auth))
            }
            other => Err(Error::UnknownAuthenticatorKind {
                kind: other.to_string(),
            }),
        }
    }
}
