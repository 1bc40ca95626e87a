//! # Schema Locations
//!
//! A schema location is a URL or filesystem path template. Placeholders use
//! the `{{ .Name }}` form of the standalone Kubernetes JSON schema registry:
//!
//! | Placeholder | Example (`apps/v1` Deployment, 1.27.0, strict) |
//! |-------------|-----------------------------------------------|
//! | `NormalizedKubernetesVersion` | `v1.27.0` (`master` stays `master`) |
//! | `StrictSuffix` | `-strict` |
//! | `ResourceKind` | `deployment` |
//! | `ResourceAPIVersion` | `v1` |
//! | `Group` | `apps` |
//! | `KindSuffix` | `-apps-v1` |
//!
//! Templates are parsed once, at validator construction, so a malformed
//! location fails early instead of on every resource.

use crate::error::SchemaError;

/// Alias accepted in place of the built-in registry URL.
pub const DEFAULT_LOCATION_ALIAS: &str = "default";

/// Template of the built-in schema registry.
pub const DEFAULT_SCHEMA_LOCATION: &str = "https://raw.githubusercontent.com/yannh/kubernetes-json-schema/master/{{ .NormalizedKubernetesVersion }}-standalone{{ .StrictSuffix }}/{{ .ResourceKind }}{{ .KindSuffix }}.json";

/// Appended to locations that name a base directory or URL instead of a
/// schema file.
const STANDALONE_LAYOUT: &str =
    "/{{ .NormalizedKubernetesVersion }}-standalone{{ .StrictSuffix }}/{{ .ResourceKind }}{{ .KindSuffix }}.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    NormalizedKubernetesVersion,
    StrictSuffix,
    ResourceKind,
    ResourceApiVersion,
    Group,
    KindSuffix,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "NormalizedKubernetesVersion" => Some(Self::NormalizedKubernetesVersion),
            "StrictSuffix" => Some(Self::StrictSuffix),
            "ResourceKind" => Some(Self::ResourceKind),
            "ResourceAPIVersion" => Some(Self::ResourceApiVersion),
            "Group" => Some(Self::Group),
            "KindSuffix" => Some(Self::KindSuffix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Values substituted into a template for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateData {
    normalized_version: String,
    strict_suffix: &'static str,
    resource_kind: String,
    resource_api_version: String,
    group: String,
    kind_suffix: String,
}

impl TemplateData {
    /// Derive template values for a resource.
    ///
    /// `api_version` is the full `apiVersion` (`v1`, `apps/v1`,
    /// `networking.k8s.io/v1`).
    pub fn new(kind: &str, api_version: &str, kubernetes_version: &str, strict: bool) -> Self {
        let normalized_version = if kubernetes_version == "master" {
            kubernetes_version.to_string()
        } else {
            format!("v{kubernetes_version}")
        };

        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };

        let kind_suffix = if group.is_empty() {
            format!("-{}", version.to_lowercase())
        } else {
            let group_head = group.split('.').next().unwrap_or(group);
            format!("-{}-{}", group_head.to_lowercase(), version.to_lowercase())
        };

        Self {
            normalized_version,
            strict_suffix: if strict { "-strict" } else { "" },
            resource_kind: kind.to_lowercase(),
            resource_api_version: version.to_string(),
            group: group.to_string(),
            kind_suffix,
        }
    }

    fn value(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::NormalizedKubernetesVersion => &self.normalized_version,
            Placeholder::StrictSuffix => self.strict_suffix,
            Placeholder::ResourceKind => &self.resource_kind,
            Placeholder::ResourceApiVersion => &self.resource_api_version,
            Placeholder::Group => &self.group,
            Placeholder::KindSuffix => &self.kind_suffix,
        }
    }
}

/// A parsed schema location template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLocation {
    source: String,
    segments: Vec<Segment>,
}

impl SchemaLocation {
    /// Parse a location as given by the user.
    ///
    /// `"default"` selects [`DEFAULT_SCHEMA_LOCATION`]. A location that does
    /// not end in `.json` is taken as the root of a standalone registry
    /// layout.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidLocation` for empty locations,
    /// unterminated or malformed `{{ }}` actions, and unknown placeholders.
    pub fn parse(location: &str) -> Result<Self, SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidLocation {
            location: location.to_string(),
            reason,
        };

        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(invalid("location is empty".to_string()));
        }

        let source = if trimmed == DEFAULT_LOCATION_ALIAS {
            DEFAULT_SCHEMA_LOCATION.to_string()
        } else if trimmed.ends_with(".json") {
            trimmed.to_string()
        } else {
            format!("{}{STANDALONE_LAYOUT}", trimmed.trim_end_matches('/'))
        };

        let segments = parse_segments(&source).map_err(invalid)?;
        Ok(Self { source, segments })
    }

    /// The full template text, after alias and layout expansion.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the location is fetched over HTTP(S).
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    /// Substitute template values.
    pub fn render(&self, data: &TemplateData) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(p) => out.push_str(data.value(*p)),
            }
        }
        out
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Literal(rest[..open].to_string()));
        }
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or_else(|| "unterminated '{{' action".to_string())?;

        let action = after_open[..close].trim();
        let name = action
            .strip_prefix('.')
            .ok_or_else(|| format!("action '{action}' must reference a field like '.ResourceKind'"))?;
        let placeholder =
            Placeholder::parse(name).ok_or_else(|| format!("unknown field '.{name}'"))?;
        segments.push(Segment::Placeholder(placeholder));

        rest = &after_open[close + 2..];
    }

    if rest.contains("}}") {
        return Err("unmatched '}}'".to_string());
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alias_expands() {
        let loc = SchemaLocation::parse("default").unwrap();
        assert_eq!(loc.as_str(), DEFAULT_SCHEMA_LOCATION);
        assert!(loc.is_remote());
    }

    #[test]
    fn renders_core_group_resource() {
        let loc = SchemaLocation::parse("default").unwrap();
        let data = TemplateData::new("ConfigMap", "v1", "1.27.0", true);
        assert_eq!(
            loc.render(&data),
            "https://raw.githubusercontent.com/yannh/kubernetes-json-schema/master/v1.27.0-standalone-strict/configmap-v1.json"
        );
    }

    #[test]
    fn renders_named_group_resource() {
        let loc = SchemaLocation::parse("default").unwrap();
        let data = TemplateData::new("Ingress", "networking.k8s.io/v1", "master", false);
        assert_eq!(
            loc.render(&data),
            "https://raw.githubusercontent.com/yannh/kubernetes-json-schema/master/master-standalone/ingress-networking-v1.json"
        );
    }

    #[test]
    fn directory_location_gets_standalone_layout() {
        let loc = SchemaLocation::parse("/schemas/").unwrap();
        assert!(!loc.is_remote());
        let data = TemplateData::new("Deployment", "apps/v1", "1.27.0", false);
        assert_eq!(loc.render(&data), "/schemas/v1.27.0-standalone/deployment-apps-v1.json");
    }

    #[test]
    fn custom_template_with_group_and_version() {
        let loc = SchemaLocation::parse(
            "https://example.com/crds/{{.Group}}/{{ .ResourceKind }}_{{ .ResourceAPIVersion }}.json",
        )
        .unwrap();
        let data = TemplateData::new("Certificate", "cert-manager.io/v1", "master", true);
        assert_eq!(loc.render(&data), "https://example.com/crds/cert-manager.io/certificate_v1.json");
    }

    #[test]
    fn unterminated_action_rejected() {
        let err = SchemaLocation::parse("/schemas/{{ .ResourceKind.json").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidLocation { .. }));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = SchemaLocation::parse("/schemas/{{ .Color }}.json").unwrap_err();
        assert!(err.to_string().contains("unknown field '.Color'"));
    }

    #[test]
    fn action_without_dot_rejected() {
        let err = SchemaLocation::parse("/schemas/{{ ResourceKind }}.json").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidLocation { .. }));
    }

    #[test]
    fn empty_location_rejected() {
        assert!(SchemaLocation::parse("   ").is_err());
    }
}
