//! Typed error enum for the `rebar-openapi` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary for richer
//! context messages.
//!
//! Schema flattening and path formatting are infallible: unrecognized shapes
//! pass through unchanged. Only file loading and security scheme conversion
//! can fail.

/// Errors produced by `rebar-openapi` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading config or schema files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML (or JSON) parsing or serialization failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TOML config parsing failure.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// No converter is registered for any variant in the authenticator's chain.
    ///
    /// Register one with [`AuthenticatorConverter::register`](crate::AuthenticatorConverter::register)
    /// before generating documents.
    #[error(
        "no security scheme converter registered for authenticator variant '{variant}' \
         (searched: {chain:?})"
    )]
    UnregisteredAuthenticator {
        /// The most specific variant of the authenticator.
        variant: String,
        /// Every variant tag that was searched.
        chain: Vec<String>,
    },

    /// A converter received an authenticator it cannot describe.
    ///
    /// Typically a converter registered for a parent variant that needs the
    /// concrete type of a sibling.
    #[error("converter for '{expected}' cannot describe authenticator variant '{actual}'")]
    AuthenticatorMismatch {
        /// Concrete type the converter expects.
        expected: &'static str,
        /// Most specific variant of the authenticator it received.
        actual: String,
    },

    /// A config file declares an authenticator kind this crate does not know.
    #[error("unknown authenticator kind '{kind}' in config")]
    UnknownAuthenticatorKind {
        /// The unrecognized kind.
        kind: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
