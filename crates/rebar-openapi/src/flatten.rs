//! Schema flattening: inline JSON Schema → `$ref` pointers + definitions.
//!
//! Marshalling layers emit fully-inlined schemas where every nested object
//! carries a `title` derived from its type name. OpenAPI documents want those
//! objects hoisted into `definitions` (v2) or `components.schemas` (v3) and
//! referenced by pointer. [`flatten`] performs that rewrite:
//!
//! - **Objects** with a string `title` and non-empty `properties` are stored
//!   in the definitions table under their title and replaced by
//!   `{$ref: <base>/<title>}`.
//! - **Arrays** stay inline, even when titled; their `items` are flattened.
//! - **Combinators** (`anyOf`, `oneOf`, `allOf`) have every branch flattened
//!   in order.
//! - Anything else passes through unchanged. The flattener is permissive, not
//!   validating: a node it does not recognize is never an error.
//!
//! Children are always flattened before their parent is stored, so the
//! definitions table is flat. Duplicate titles overwrite earlier entries
//! (last write wins).

use serde_yaml_ng::{Mapping, Value};

use crate::helpers::{ref_node, str_field, val_s};

/// Reference base for OpenAPI 2 (`definitions`).
pub const DEFINITIONS_REF_BASE: &str = "#/definitions";

/// Reference base for OpenAPI 3 (`components.schemas`).
pub const COMPONENTS_REF_BASE: &str = "#/components/schemas";

/// Keys holding ordered lists of subschemas.
const COMBINATOR_KEYS: &[&str] = &["anyOf", "oneOf", "allOf"];

/// Flatten `schema`, pointing extracted definitions at `base`.
///
/// Returns the rewritten schema and the definitions table keyed by title.
///
/// A titled root object is extracted like any nested one, so the returned
/// schema is then a bare `$ref` (`{"$ref": "#/definitions/<title>"}`). This
/// is the established output that generated documents depend on; it is not
/// a special case. Use [`Flattener::inline_root`] to keep the root literal
/// while still flattening its children.
///
/// # Example
///
/// ```
/// use rebar_openapi::flatten;
/// use serde_yaml_ng::Value;
///
/// let schema: Value = serde_yaml_ng::from_str(
///     "type: array\nitems: {type: object, title: Foo, properties: {a: {type: string}}}",
/// )
/// .unwrap();
///
/// let (flat, definitions) = flatten(&schema, "#/definitions");
/// assert_eq!(flat["items"]["$ref"].as_str(), Some("#/definitions/Foo"));
/// assert!(definitions.contains_key("Foo"));
/// ```
#[must_use]
pub fn flatten(schema: &Value, base: &str) -> (Value, Mapping) {
    Flattener::new(base).flatten(schema)
}

/// Configurable schema flattener.
///
/// # Example
///
/// ```
/// use rebar_openapi::{Flattener, COMPONENTS_REF_BASE};
/// use serde_yaml_ng::Value;
///
/// let schema: Value = serde_yaml_ng::from_str(
///     "type: object\ntitle: Root\nproperties: {a: {type: string}}",
/// )
/// .unwrap();
///
/// let (flat, definitions) = Flattener::new(COMPONENTS_REF_BASE)
///     .inline_root(true)
///     .flatten(&schema);
/// assert_eq!(flat, schema);
/// assert!(definitions.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Flattener {
    /// Prefix for generated `$ref` values, without trailing slash.
    base: String,

    /// Keep a titled root object inline instead of extracting it.
    inline_root: bool,
}

impl Flattener {
    /// Create a flattener producing `$ref`s under `base`.
    ///
    /// A trailing `/` on `base` is ignored.
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            inline_root: false,
        }
    }

    /// Keep a titled root object inline (default: `false`).
    ///
    /// When enabled the caller always receives a literal schema at the top
    /// level, and the root is not added to the definitions table.
    #[must_use]
    pub fn inline_root(mut self, enabled: bool) -> Self {
        self.inline_root = enabled;
        self
    }

    /// Reference base in use.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Flatten `schema`, returning the rewritten schema and definitions table.
    #[must_use]
    pub fn flatten(&self, schema: &Value) -> (Value, Mapping) {
        let mut definitions = Mapping::new();
        let flat = self.flatten_node(schema, &mut definitions, self.inline_root);
        (flat, definitions)
    }

    /// Rebuild one node, recording extracted objects in `definitions`.
    ///
    /// Entries are visited in document order so extraction order (and
    /// therefore which duplicate title wins) follows document order.
    fn flatten_node(&self, node: &Value, definitions: &mut Mapping, keep_inline: bool) -> Value {
        let Some(map) = node.as_mapping() else {
            return node.clone();
        };

        let schema_type = str_field(map, "type");

        let rebuilt: Mapping = map
            .iter()
            .map(|(key, value)| {
                let flattened = match (schema_type, key.as_str()) {
                    (Some("object"), Some("properties")) => {
                        self.flatten_properties(value, definitions)
                    }
                    (Some("array"), Some("items")) => self.flatten_node(value, definitions, false),
                    (_, Some(k)) if COMBINATOR_KEYS.contains(&k) => {
                        self.flatten_branches(value, definitions)
                    }
                    _ => value.clone(),
                };
                (key.clone(), flattened)
            })
            .collect();

        match extractable_title(map) {
            Some(title) if !keep_inline => {
                let previous = definitions.insert(val_s(title), Value::Mapping(rebuilt));
                if previous.is_some() {
                    tracing::debug!(title, "duplicate schema title, keeping the later definition");
                }
                ref_node(&format!("{}/{title}", self.base))
            }
            _ => Value::Mapping(rebuilt),
        }
    }

    /// Flatten every value of a `properties` mapping.
    fn flatten_properties(&self, properties: &Value, definitions: &mut Mapping) -> Value {
        let Some(props) = properties.as_mapping() else {
            return properties.clone();
        };

        Value::Mapping(
            props
                .iter()
                .map(|(name, prop)| (name.clone(), self.flatten_node(prop, definitions, false)))
                .collect(),
        )
    }

    /// Flatten every branch of a combinator sequence, preserving order.
    fn flatten_branches(&self, branches: &Value, definitions: &mut Mapping) -> Value {
        let Some(seq) = branches.as_sequence() else {
            return branches.clone();
        };

        Value::Sequence(
            seq.iter()
                .map(|branch| self.flatten_node(branch, definitions, false))
                .collect(),
        )
    }
}

/// Title of an object node eligible for extraction.
///
/// Requires `type: object`, a string `title`, and a non-empty `properties`
/// mapping.
fn extractable_title(map: &Mapping) -> Option<&str> {
    if str_field(map, "type") != Some("object") {
        return None;
    }
    let has_properties = map
        .get("properties")
        .and_then(Value::as_mapping)
        .is_some_and(|props| !props.is_empty());
    if !has_properties {
        return None;
    }
    str_field(map, "title")
}
