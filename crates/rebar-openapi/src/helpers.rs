//! Shared YAML value helpers used across modules.

use serde_yaml_ng::{Mapping, Value};

/// Shorthand for `Value::String`.
pub fn val_s(s: &str) -> Value {
    Value::String(s.to_string())
}

/// Build a reference node `{$ref: target}`.
pub fn ref_node(target: &str) -> Value {
    let mut node = Mapping::new();
    node.insert(val_s("$ref"), val_s(target));
    Value::Mapping(node)
}

/// Look up a string-valued key in a mapping.
pub fn str_field<'a>(map: &'a Mapping, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Build a security requirement list `[{name: []}]`.
pub fn security_requirement(scheme_name: &str) -> Value {
    let mut requirement = Mapping::new();
    requirement.insert(val_s(scheme_name), Value::Sequence(vec![]));
    Value::Sequence(vec![Value::Mapping(requirement)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_node_has_single_key() {
        let node = ref_node("#/definitions/x");
        let map = node.as_mapping().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(str_field(map, "$ref"), Some("#/definitions/x"));
    }

    #[test]
    fn security_requirement_shape() {
        let expected: Value = serde_yaml_ng::from_str("- sharedSecret: []").unwrap();
        assert_eq!(security_requirement("sharedSecret"), expected);
    }
}
