//! # Manifest Documents
//!
//! A [`Resource`] is a borrowed view of one manifest document. Parsing
//! turns it into a JSON value (the form `jsonschema` validates) and a
//! [`Signature`] identifying the object.

use std::fmt;

use serde_json::Value;

use crate::error::ResourceError;

/// One manifest document handed to the validator.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    /// Where the document came from, used only for reporting.
    pub path: &'a str,
    /// Raw YAML or JSON bytes of a single document.
    pub bytes: &'a [u8],
}

impl<'a> Resource<'a> {
    /// Create a resource view.
    pub fn new(path: &'a str, bytes: &'a [u8]) -> Self {
        Self { path, bytes }
    }
}

/// Identity of a Kubernetes object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// `kind`, e.g. `Deployment`.
    pub kind: String,
    /// `apiVersion`, e.g. `apps/v1`.
    pub version: String,
    /// `metadata.namespace`, empty when absent.
    pub namespace: String,
    /// `metadata.name`, falling back to `metadata.generateName`.
    pub name: String,
}

impl Signature {
    /// `apiVersion/Kind`, e.g. `apps/v1/Deployment`.
    pub fn qualified_kind(&self) -> String {
        format!("{}/{}", self.version, self.kind)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.name)
        }
    }
}

/// A parsed document.
#[derive(Debug)]
pub(crate) enum Parsed {
    /// Null document: empty, whitespace or comments only.
    Empty,
    /// A mapping with its signature.
    Object { body: Value, signature: Signature },
}

/// Parse one document into JSON and extract its signature.
pub(crate) fn parse(resource: &Resource<'_>) -> Result<Parsed, ResourceError> {
    let yaml: serde_yaml::Value = serde_yaml::from_slice(resource.bytes)
        .map_err(|e| ResourceError::Unmarshal(e.to_string()))?;

    let body = to_json(yaml).map_err(ResourceError::Unmarshal)?;
    match body {
        Value::Null => Ok(Parsed::Empty),
        Value::Object(_) => {
            let signature = signature_of(&body)?;
            Ok(Parsed::Object { body, signature })
        }
        _ => Err(ResourceError::NotAMapping),
    }
}

fn signature_of(body: &Value) -> Result<Signature, ResourceError> {
    let kind = string_field(body, "kind").ok_or(ResourceError::MissingKey("kind"))?;
    let version =
        string_field(body, "apiVersion").ok_or(ResourceError::MissingKey("apiVersion"))?;

    let metadata = body.get("metadata");
    let metadata_field = |key: &str| {
        metadata
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let mut name = metadata_field("name");
    if name.is_empty() {
        name = metadata_field("generateName");
    }

    Ok(Signature {
        kind,
        version,
        namespace: metadata_field("namespace"),
        name,
    })
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convert a YAML document into the JSON value the schema sees.
///
/// Merge keys (`<<`) are resolved first, so schemas see the merged
/// fields rather than a literal `<<` property. Tags are dropped and
/// scalar keys are stringified.
pub(crate) fn to_json(mut yaml: serde_yaml::Value) -> Result<Value, String> {
    yaml.apply_merge().map_err(|e| e.to_string())?;
    convert(yaml)
}

fn convert(yaml: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => number(&n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            Value::Array(items.into_iter().map(convert).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                object.insert(object_key(key)?, convert(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        Ok(Value::from(i))
    } else if let Some(u) = n.as_u64() {
        Ok(Value::from(u))
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("number {n} has no JSON representation"))
    }
}

fn object_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("mapping key {other:?} cannot be a JSON object key")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(doc: &str) -> Result<Parsed, ResourceError> {
        parse(&Resource::new("test.yaml", doc.as_bytes()))
    }

    #[test]
    fn parses_signature() {
        let doc = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  replicas: 2
"#;
        match parse_str(doc).unwrap() {
            Parsed::Object { body, signature } => {
                assert_eq!(signature.kind, "Deployment");
                assert_eq!(signature.version, "apps/v1");
                assert_eq!(signature.namespace, "prod");
                assert_eq!(signature.name, "web");
                assert_eq!(signature.qualified_kind(), "apps/v1/Deployment");
                assert_eq!(signature.to_string(), "Deployment web");
                assert_eq!(body["spec"]["replicas"], 2);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn generate_name_used_when_name_absent() {
        let doc = "apiVersion: batch/v1\nkind: Job\nmetadata:\n  generateName: migrate-\n";
        match parse_str(doc).unwrap() {
            Parsed::Object { signature, .. } => assert_eq!(signature.name, "migrate-"),
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn empty_and_comment_only_documents_are_empty() {
        assert!(matches!(parse_str("").unwrap(), Parsed::Empty));
        assert!(matches!(parse_str("# just a comment\n").unwrap(), Parsed::Empty));
    }

    #[test]
    fn missing_kind_is_reported() {
        let err = parse_str("apiVersion: v1\nmetadata:\n  name: x\n").unwrap_err();
        assert!(matches!(err, ResourceError::MissingKey("kind")));
        assert_eq!(err.to_string(), "error while parsing: missing 'kind' key");
    }

    #[test]
    fn missing_api_version_is_reported() {
        let err = parse_str("kind: ConfigMap\n").unwrap_err();
        assert!(matches!(err, ResourceError::MissingKey("apiVersion")));
    }

    #[test]
    fn scalar_document_is_not_a_mapping() {
        let err = parse_str("just a string").unwrap_err();
        assert!(matches!(err, ResourceError::NotAMapping));
    }

    #[test]
    fn duplicate_keys_fail_to_unmarshal() {
        let err = parse_str("kind: ConfigMap\nkind: Secret\napiVersion: v1\n").unwrap_err();
        assert!(matches!(err, ResourceError::Unmarshal(_)));
        assert!(err.to_string().starts_with("error unmarshalling resource"));
    }

    #[test]
    fn json_documents_are_accepted() {
        let doc = r#"{"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "ns"}}"#;
        match parse_str(doc).unwrap() {
            Parsed::Object { signature, .. } => assert_eq!(signature.kind, "Namespace"),
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml_str = r#"
name: web
count: 42
ratio: 0.5
enabled: true
80: http
items:
  - one
  - two
"#;
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = to_json(yaml_value).unwrap();

        assert_eq!(json_value["name"], "web");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["ratio"], 0.5);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["80"], "http");
        assert_eq!(json_value["items"][1], "two");
    }

    #[test]
    fn merge_keys_are_resolved() {
        let doc = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: merged
defaults: &defaults
  LOG_LEVEL: info
  MODE: prod
data:
  <<: *defaults
  MODE: dev
";
        match parse_str(doc).unwrap() {
            Parsed::Object { body, .. } => {
                assert_eq!(body["data"]["LOG_LEVEL"], "info");
                assert_eq!(body["data"]["MODE"], "dev");
                assert!(body["data"].get("<<").is_none());
            }
            Parsed::Empty => panic!("expected an object"),
        }
    }

    #[test]
    fn merge_of_non_mapping_is_unmarshal_error() {
        let doc = "apiVersion: v1\nkind: ConfigMap\ndata:\n  <<: 3\n";
        assert!(matches!(parse_str(doc), Err(ResourceError::Unmarshal(_))));
    }

    #[test]
    fn sequence_key_is_unmarshal_error() {
        let doc = "apiVersion: v1\nkind: ConfigMap\n? [a, b]\n: x\n";
        assert!(matches!(parse_str(doc), Err(ResourceError::Unmarshal(_))));
    }
}
