//! Route rule → OpenAPI path template conversion.
//!
//! Framework rules mark path arguments with angle brackets and an optional
//! converter: `/projects/<uuid:project_uid>/foos/<foo_uid>`. OpenAPI uses
//! braces: `/projects/{project_uid}/foos/{foo_uid}`.

use std::fmt;

/// Converter assumed when a rule argument names none (`<foo_uid>`).
pub const DEFAULT_CONVERTER: &str = "string";

/// A typed argument extracted from a route rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathArgument {
    /// Argument name (`project_uid`).
    pub name: String,
    /// Converter type (`uuid`, `int`, `string`, `string(length=2)`, …).
    pub converter: String,
}

impl PathArgument {
    /// Create a path argument.
    #[must_use]
    pub fn new(name: &str, converter: &str) -> Self {
        Self {
            name: name.to_string(),
            converter: converter.to_string(),
        }
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.converter)
    }
}

/// Rewrite a route rule into an OpenAPI path template.
///
/// Returns the template and the arguments in the order they appear. Input
/// that is not a well-formed argument (an unclosed `<`, an empty `<>`) is
/// copied through unchanged; converter names are not validated.
///
/// ```
/// use rebar_openapi::{format_path_for_swagger, PathArgument};
///
/// let (path, args) = format_path_for_swagger("/projects/<uuid:project_uid>/foos/<foo_uid>");
/// assert_eq!(path, "/projects/{project_uid}/foos/{foo_uid}");
/// assert_eq!(
///     args,
///     vec![
///         PathArgument::new("project_uid", "uuid"),
///         PathArgument::new("foo_uid", "string"),
///     ]
/// );
/// ```
#[must_use]
pub fn format_path_for_swagger(path: &str) -> (String, Vec<PathArgument>) {
    let mut result = String::with_capacity(path.len());
    let mut args = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find('<') {
        let Some(end) = rest[start..].find('>') else {
            break;
        };
        result.push_str(&rest[..start]);

        let inner = &rest[start + 1..start + end];
        match parse_argument(inner) {
            Some(arg) => {
                result.push('{');
                result.push_str(&arg.name);
                result.push('}');
                args.push(arg);
            }
            None => result.push_str(&rest[start..=start + end]),
        }
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);

    (result, args)
}

/// Parse the inside of `<...>`: `converter:name` or `name`.
///
/// The converter is everything up to the first `:`; a converter may carry
/// its own arguments (`string(length=2):code`).
fn parse_argument(inner: &str) -> Option<PathArgument> {
    let (converter, name) = match inner.split_once(':') {
        Some((converter, name)) => (converter, name),
        None => (DEFAULT_CONVERTER, inner),
    };

    if name.is_empty() || converter.is_empty() {
        return None;
    }
    Some(PathArgument::new(name, converter))
}
