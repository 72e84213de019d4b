//! Shared authenticator types for the rebar-openapi ecosystem.
//!
//! This crate provides the [`Authenticator`] trait with its explicit
//! variant chain, the built-in [`HeaderApiKeyAuthenticator`], and the
//! [`HandlerRegistry`] that records which authenticators guard which handlers.
//!
//! `rebar-openapi` consumes these types when describing security schemes.
//! You should not need to depend on this crate directly; use the
//! higher-level crate instead, which re-exports everything here.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod authenticator;
pub mod registry;

pub use authenticator::{
    AUTHENTICATOR_VARIANT, Authenticator, DEFAULT_API_KEY_SCHEME_NAME, HeaderApiKeyAuthenticator,
};
pub use registry::{HandlerAuth, HandlerRegistry, HandlerSpec};
