//! Authenticator → security scheme conversion.
//!
//! [`AuthenticatorConverter`] is a dispatch table from authenticator variant
//! tags to converter functions. A converter turns one authenticator into a
//! `(scheme_name, scheme_definition)` pair for `securityDefinitions` (v2) or
//! `components.securitySchemes` (v3).
//!
//! Dispatch walks the authenticator's [variant chain](Authenticator::variant_chain)
//! from most to least specific and uses the first registered converter, so a
//! specialised authenticator inherits its parent's converter until one is
//! registered for it directly.
//!
//! Converters take the authenticator plus a [`ConverterContext`]. The older
//! one-argument form (authenticator only) is still accepted; registering one
//! records a [`DeprecationWarning`] and logs it through `tracing`.

use std::collections::HashMap;
use std::fmt;

use rebar_openapi_core::{Authenticator, HandlerRegistry, HeaderApiKeyAuthenticator};
use serde_yaml_ng::{Mapping, Value};

use crate::config::OpenApiVersion;
use crate::error::{Error, Result};
use crate::helpers::{security_requirement, val_s};

/// A converted security scheme: `(scheme_name, scheme_definition)`.
pub type SecurityScheme = (String, Value);

/// Information handed to two-argument converters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConverterContext {
    /// Version of the document being generated.
    pub openapi_version: OpenApiVersion,
}

type LegacyFn = dyn Fn(&dyn Authenticator) -> Result<SecurityScheme> + Send + Sync;
type ContextualFn =
    dyn Fn(&dyn Authenticator, &ConverterContext) -> Result<SecurityScheme> + Send + Sync;

/// A registered converter, tagged by arity.
pub enum Converter {
    /// Deprecated one-argument converter (authenticator only).
    Legacy(Box<LegacyFn>),
    /// Converter receiving the authenticator and a [`ConverterContext`].
    Contextual(Box<ContextualFn>),
}

impl Converter {
    /// Run the converter.
    ///
    /// # Errors
    ///
    /// Propagates the converter's own error.
    pub fn convert(
        &self,
        authenticator: &dyn Authenticator,
        context: &ConverterContext,
    ) -> Result<SecurityScheme> {
        match self {
            Self::Legacy(f) => f(authenticator),
            Self::Contextual(f) => f(authenticator, context),
        }
    }

    /// Whether this is the deprecated one-argument form.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy(_) => f.write_str("Converter::Legacy(..)"),
            Self::Contextual(_) => f.write_str("Converter::Contextual(..)"),
        }
    }
}

/// Marker for one-argument converters.
#[derive(Debug)]
pub enum LegacyArity {}

/// Marker for two-argument converters.
#[derive(Debug)]
pub enum ContextualArity {}

/// Conversion of a function into a [`Converter`], selecting the variant
/// from the function's parameter count.
///
/// Implemented for `Fn(&dyn Authenticator) -> Result<SecurityScheme>` and
/// `Fn(&dyn Authenticator, &ConverterContext) -> Result<SecurityScheme>`.
pub trait IntoConverter<Arity> {
    /// Wrap `self` in the matching [`Converter`] variant.
    fn into_converter(self) -> Converter;
}

impl<F> IntoConverter<LegacyArity> for F
where
    F: Fn(&dyn Authenticator) -> Result<SecurityScheme> + Send + Sync + 'static,
{
    fn into_converter(self) -> Converter {
        Converter::Legacy(Box::new(self))
    }
}

impl<F> IntoConverter<ContextualArity> for F
where
    F: Fn(&dyn Authenticator, &ConverterContext) -> Result<SecurityScheme> + Send + Sync + 'static,
{
    fn into_converter(self) -> Converter {
        Converter::Contextual(Box::new(self))
    }
}

impl IntoConverter<Converter> for Converter {
    fn into_converter(self) -> Converter {
        self
    }
}

/// Notice that a deprecated one-argument converter was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationWarning {
    /// Variant the converter was registered for.
    pub variant: String,
}

impl fmt::Display for DeprecationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "converter for '{}' takes only the authenticator; one-argument converters are \
             deprecated, accept a ConverterContext as the second argument",
            self.variant
        )
    }
}

/// Dispatch table from authenticator variants to security scheme converters.
///
/// Populate once at startup through `&mut self`, then share by reference
/// while generating documents.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use rebar_openapi::{
///     Authenticator, AuthenticatorConverter, HandlerRegistry, HeaderApiKeyAuthenticator,
/// };
///
/// let converter = AuthenticatorConverter::with_defaults();
/// let auth: Arc<dyn Authenticator> = Arc::new(HeaderApiKeyAuthenticator::new("X-Api-Key"));
/// let registry = HandlerRegistry::new(vec![auth]);
///
/// let schemes = converter.get_security_schemes(&registry).unwrap();
/// let scheme = schemes.get("sharedSecret").unwrap();
/// assert_eq!(scheme["in"].as_str(), Some("header"));
/// ```
#[derive(Debug, Default)]
pub struct AuthenticatorConverter {
    converters: HashMap<String, Converter>,
    context: ConverterContext,
    deprecations: Vec<DeprecationWarning>,
}

impl AuthenticatorConverter {
    /// Create an empty converter table targeting OpenAPI 2.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the built-in converters registered:
    /// [`HeaderApiKeyAuthenticator`] → [`convert_header_api_key_authenticator`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut converter = Self::new();
        converter.register(
            HeaderApiKeyAuthenticator::VARIANT,
            convert_header_api_key_authenticator,
        );
        converter
    }

    /// Set the OpenAPI version passed to two-argument converters.
    #[must_use]
    pub fn openapi_version(mut self, version: OpenApiVersion) -> Self {
        self.context.openapi_version = version;
        self
    }

    /// Context passed to two-argument converters.
    #[must_use]
    pub fn context(&self) -> &ConverterContext {
        &self.context
    }

    /// Register (or replace) the converter for `variant`.
    ///
    /// Accepts both converter arities. A one-argument converter is accepted
    /// for backward compatibility and records a [`DeprecationWarning`].
    pub fn register<Arity>(
        &mut self,
        variant: &str,
        converter: impl IntoConverter<Arity>,
    ) -> &mut Self {
        let converter = converter.into_converter();
        if converter.is_legacy() {
            let warning = DeprecationWarning {
                variant: variant.to_string(),
            };
            tracing::warn!(variant, "{warning}");
            self.deprecations.push(warning);
        }
        self.converters.insert(variant.to_string(), converter);
        self
    }

    /// Whether a converter is registered directly for `variant`.
    #[must_use]
    pub fn is_registered(&self, variant: &str) -> bool {
        self.converters.contains_key(variant)
    }

    /// Deprecation warnings recorded so far, in registration order.
    #[must_use]
    pub fn deprecation_warnings(&self) -> &[DeprecationWarning] {
        &self.deprecations
    }

    /// Find the converter for an authenticator by walking its variant chain.
    ///
    /// Returns the matched variant alongside the converter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredAuthenticator`] when no variant in the
    /// chain has a converter.
    pub fn converter_for(
        &self,
        authenticator: &dyn Authenticator,
    ) -> Result<(&'static str, &Converter)> {
        let chain = authenticator.variant_chain();
        chain
            .iter()
            .find_map(|variant| self.converters.get(*variant).map(|c| (*variant, c)))
            .ok_or_else(|| Error::UnregisteredAuthenticator {
                variant: authenticator.variant().to_string(),
                chain: chain.iter().map(ToString::to_string).collect(),
            })
    }

    /// Convert one authenticator into `(scheme_name, scheme_definition)`.
    ///
    /// # Errors
    ///
    /// Returns an error if no converter is registered along the variant
    /// chain, or the converter itself fails.
    pub fn get_security_scheme(&self, authenticator: &dyn Authenticator) -> Result<SecurityScheme> {
        let (matched, converter) = self.converter_for(authenticator)?;
        let scheme = converter.convert(authenticator, &self.context)?;
        tracing::debug!(
            variant = authenticator.variant(),
            matched,
            scheme = %scheme.0,
            "converted authenticator"
        );
        Ok(scheme)
    }

    /// Security requirement list for an operation guarded by `authenticator`:
    /// `[{scheme_name: []}]`.
    ///
    /// # Errors
    ///
    /// Same as [`get_security_scheme`](Self::get_security_scheme).
    pub fn get_security_requirement(&self, authenticator: &dyn Authenticator) -> Result<Value> {
        let (name, _) = self.get_security_scheme(authenticator)?;
        Ok(security_requirement(&name))
    }

    /// All security scheme definitions for a handler registry.
    ///
    /// Converts every distinct authenticator referenced by the registry
    /// (defaults first, then handler-specific ones). When two authenticators
    /// produce the same scheme name, the later one wins.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error encountered.
    pub fn get_security_schemes(&self, registry: &HandlerRegistry) -> Result<Mapping> {
        let mut schemes = Mapping::new();
        for authenticator in registry.authenticators() {
            let (name, definition) = self.get_security_scheme(authenticator.as_ref())?;
            schemes.insert(val_s(&name), definition);
        }
        Ok(schemes)
    }
}

/// Built-in converter for [`HeaderApiKeyAuthenticator`].
///
/// Produces `(name, {type: apiKey, in: header, name: <header>})`.
///
/// # Errors
///
/// Returns [`Error::AuthenticatorMismatch`] if the authenticator does not
/// expose a [`HeaderApiKeyAuthenticator`] through
/// [`as_any`](Authenticator::as_any).
pub fn convert_header_api_key_authenticator(
    authenticator: &dyn Authenticator,
    _context: &ConverterContext,
) -> Result<SecurityScheme> {
    let auth = authenticator
        .as_any()
        .downcast_ref::<HeaderApiKeyAuthenticator>()
        .ok_or_else(|| Error::AuthenticatorMismatch {
            expected: HeaderApiKeyAuthenticator::VARIANT,
            actual: authenticator.variant().to_string(),
        })?;

    let mut definition = Mapping::new();
    definition.insert(val_s("type"), val_s("apiKey"));
    definition.insert(val_s("in"), val_s("header"));
    definition.insert(val_s("name"), val_s(auth.header()));

    Ok((auth.name().to_string(), Value::Mapping(definition)))
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use rebar_openapi_core::HandlerAuth;

    use super::*;

    #[derive(Debug)]
    struct BasicAuthenticator;

    impl Authenticator for BasicAuthenticator {
        fn variant_chain(&self) -> &[&'static str] {
            &["BasicAuthenticator", "Authenticator"]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Specialisation that exposes its parent to converters.
    #[derive(Debug)]
    struct TenantKeyAuthenticator {
        inner: HeaderApiKeyAuthenticator,
    }

    impl Authenticator for TenantKeyAuthenticator {
        fn variant_chain(&self) -> &[&'static str] {
            &[
                "TenantKeyAuthenticator",
                HeaderApiKeyAuthenticator::VARIANT,
                "Authenticator",
            ]
        }

        fn as_any(&self) -> &dyn Any {
            &self.inner
        }
    }

    #[allow(clippy::unnecessary_wraps)]
    fn convert_basic(_auth: &dyn Authenticator) -> Result<SecurityScheme> {
        Ok(("basicAuth".to_string(), serde_yaml_ng::from_str("type: basic").unwrap()))
    }

    #[allow(clippy::unnecessary_wraps, clippy::trivially_copy_pass_by_ref)]
    fn convert_versioned(
        _auth: &dyn Authenticator,
        context: &ConverterContext,
    ) -> Result<SecurityScheme> {
        let definition = match context.openapi_version {
            OpenApiVersion::V2 => "type: basic",
            OpenApiVersion::V3 => "{type: http, scheme: basic}",
        };
        Ok(("basicAuth".to_string(), serde_yaml_ng::from_str(definition).unwrap()))
    }

    fn yaml(s: &str) -> Value {
        serde_yaml_ng::from_str(s).unwrap()
    }

    #[test]
    fn header_api_key_scheme() {
        let converter = AuthenticatorConverter::with_defaults();
        let auth = HeaderApiKeyAuthenticator::new("X-Test-Header");

        let (name, definition) = converter.get_security_scheme(&auth).unwrap();
        assert_eq!(name, "sharedSecret");
        assert_eq!(
            definition,
            yaml("{type: apiKey, in: header, name: X-Test-Header}")
        );
        assert!(converter.deprecation_warnings().is_empty());
    }

    #[test]
    fn legacy_converter_records_warning() {
        let mut converter = AuthenticatorConverter::with_defaults();
        converter.register("BasicAuthenticator", convert_basic);

        assert_eq!(
            converter.deprecation_warnings(),
            [DeprecationWarning {
                variant: "BasicAuthenticator".to_string()
            }]
        );
        assert!(converter.deprecation_warnings()[0]
            .to_string()
            .contains("deprecated"));
        assert_eq!(
            converter.get_security_requirement(&BasicAuthenticator).unwrap(),
            yaml("- basicAuth: []")
        );
    }

    #[test]
    fn contextual_converter_sees_version() {
        let mut converter = AuthenticatorConverter::new().openapi_version(OpenApiVersion::V3);
        converter.register("BasicAuthenticator", convert_versioned);

        let (_, definition) = converter.get_security_scheme(&BasicAuthenticator).unwrap();
        assert_eq!(definition, yaml("{type: http, scheme: basic}"));
        assert!(converter.deprecation_warnings().is_empty());
        assert_eq!(converter.context().openapi_version, OpenApiVersion::V3);
    }

    #[test]
    fn register_replaces_existing() {
        let mut converter = AuthenticatorConverter::new();
        converter
            .register("BasicAuthenticator", convert_basic)
            .register("BasicAuthenticator", convert_versioned);

        let (_, definition) = converter.get_security_scheme(&BasicAuthenticator).unwrap();
        assert_eq!(definition, yaml("type: basic"));
        assert!(!converter
            .converter_for(&BasicAuthenticator)
            .unwrap()
            .1
            .is_legacy());
    }

    #[test]
    fn closures_accepted() {
        let mut converter = AuthenticatorConverter::new();
        converter.register(
            "BasicAuthenticator",
            |_auth: &dyn Authenticator, _ctx: &ConverterContext| -> Result<SecurityScheme> {
                Ok(("closure".to_string(), Value::Mapping(Mapping::new())))
            },
        );
        let (name, _) = converter.get_security_scheme(&BasicAuthenticator).unwrap();
        assert_eq!(name, "closure");
    }

    #[test]
    fn prebuilt_converter_accepted() {
        let mut converter = AuthenticatorConverter::new().openapi_version(OpenApiVersion::V3);
        converter.register(
            "BasicAuthenticator",
            Converter::Contextual(Box::new(convert_versioned)),
        );

        let (matched, registered) = converter.converter_for(&BasicAuthenticator).unwrap();
        assert_eq!(matched, "BasicAuthenticator");
        assert!(!registered.is_legacy());

        let (name, definition) = converter.get_security_scheme(&BasicAuthenticator).unwrap();
        assert_eq!(name, "basicAuth");
        assert_eq!(definition, yaml("{type: http, scheme: basic}"));
        assert!(converter.deprecation_warnings().is_empty());
    }

    #[test]
    fn registered_variants() {
        let converter = AuthenticatorConverter::with_defaults();
        assert!(converter.is_registered(HeaderApiKeyAuthenticator::VARIANT));
        assert!(!converter.is_registered("TenantKeyAuthenticator"));
        assert!(!AuthenticatorConverter::new().is_registered(HeaderApiKeyAuthenticator::VARIANT));
    }

    #[test]
    fn unregistered_variant_errors() {
        let converter = AuthenticatorConverter::with_defaults();
        let err = converter
            .get_security_requirement(&BasicAuthenticator)
            .unwrap_err();
        match err {
            Error::UnregisteredAuthenticator { variant, chain } => {
                assert_eq!(variant, "BasicAuthenticator");
                assert_eq!(chain, vec!["BasicAuthenticator", "Authenticator"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn variant_chain_inherits_parent_converter() {
        let converter = AuthenticatorConverter::with_defaults();
        let auth = TenantKeyAuthenticator {
            inner: HeaderApiKeyAuthenticator::new("X-Tenant-Key").with_name("tenantKey"),
        };

        let (matched, _) = converter.converter_for(&auth).unwrap();
        assert_eq!(matched, HeaderApiKeyAuthenticator::VARIANT);
        assert_eq!(
            converter.get_security_requirement(&auth).unwrap(),
            yaml("- tenantKey: []")
        );
    }

    #[test]
    fn variant_chain_prefers_most_specific() {
        let mut converter = AuthenticatorConverter::with_defaults();
        converter.register(
            "TenantKeyAuthenticator",
            |_auth: &dyn Authenticator, _ctx: &ConverterContext| -> Result<SecurityScheme> {
                Ok(("tenant".to_string(), Value::Mapping(Mapping::new())))
            },
        );
        let auth = TenantKeyAuthenticator {
            inner: HeaderApiKeyAuthenticator::new("X-Tenant-Key"),
        };
        let (matched, _) = converter.converter_for(&auth).unwrap();
        assert_eq!(matched, "TenantKeyAuthenticator");
    }

    #[test]
    fn root_variant_catches_everything() {
        let mut converter = AuthenticatorConverter::new();
        converter.register(
            rebar_openapi_core::AUTHENTICATOR_VARIANT,
            |auth: &dyn Authenticator, _ctx: &ConverterContext| -> Result<SecurityScheme> {
                Ok((auth.variant().to_string(), Value::Mapping(Mapping::new())))
            },
        );
        let (name, _) = converter.get_security_scheme(&BasicAuthenticator).unwrap();
        assert_eq!(name, "BasicAuthenticator");
    }

    #[test]
    fn header_converter_rejects_other_types() {
        let mut converter = AuthenticatorConverter::new();
        converter.register("BasicAuthenticator", convert_header_api_key_authenticator);
        let err = converter
            .get_security_scheme(&BasicAuthenticator)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AuthenticatorMismatch { expected: "HeaderApiKeyAuthenticator", ref actual }
                if actual == "BasicAuthenticator"
        ));
    }

    #[test]
    fn schemes_include_handler_authenticators() {
        let mut converter = AuthenticatorConverter::with_defaults();
        converter.register("BasicAuthenticator", convert_basic);

        let api_key: Arc<dyn Authenticator> = Arc::new(HeaderApiKeyAuthenticator::new("X-Key"));
        let basic: Arc<dyn Authenticator> = Arc::new(BasicAuthenticator);
        let registry = HandlerRegistry::new(vec![api_key]).handler(
            "/admin",
            "get",
            HandlerAuth::Explicit(vec![basic]),
        );

        let schemes = converter.get_security_schemes(&registry).unwrap();
        let expected: Mapping = serde_yaml_ng::from_str(
            r"
sharedSecret:
  type: apiKey
  in: header
  name: X-Key
basicAuth:
  type: basic
",
        )
        .unwrap();
        assert_eq!(schemes, expected);
    }

    #[test]
    fn duplicate_scheme_names_last_write_wins() {
        let converter = AuthenticatorConverter::with_defaults();
        let first: Arc<dyn Authenticator> = Arc::new(HeaderApiKeyAuthenticator::new("X-First"));
        let second: Arc<dyn Authenticator> = Arc::new(HeaderApiKeyAuthenticator::new("X-Second"));
        let registry = HandlerRegistry::new(vec![first, second]);

        let schemes = converter.get_security_schemes(&registry).unwrap();
        assert_eq!(schemes.len(), 1);
        assert_eq!(
            schemes.get("sharedSecret").unwrap()["name"].as_str(),
            Some("X-Second")
        );
    }

    #[test]
    fn schemes_fail_on_unregistered_authenticator() {
        let converter = AuthenticatorConverter::with_defaults();
        let basic: Arc<dyn Authenticator> = Arc::new(BasicAuthenticator);
        let registry = HandlerRegistry::new(vec![basic]);
        assert!(converter.get_security_schemes(&registry).is_err());
    }
}
