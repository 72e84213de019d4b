#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod flatten;
mod helpers;
mod path;
mod security;

pub use config::{AuthenticatorEntry, OpenApiVersion, ProjectConfig};
pub use error::{Error, Result};
pub use flatten::{COMPONENTS_REF_BASE, DEFINITIONS_REF_BASE, Flattener, flatten};
pub use path::{DEFAULT_CONVERTER, PathArgument, format_path_for_swagger};
pub use security::{
    AuthenticatorConverter, ContextualArity, Converter, ConverterContext, DeprecationWarning,
    IntoConverter, LegacyArity, SecurityScheme, convert_header_api_key_authenticator,
};

pub use rebar_openapi_core::{
    AUTHENTICATOR_VARIANT, Authenticator, DEFAULT_API_KEY_SCHEME_NAME, HandlerAuth,
    HandlerRegistry, HandlerSpec, HeaderApiKeyAuthenticator,
};
