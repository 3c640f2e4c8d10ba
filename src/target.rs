//! The scan target: raw text plus the `(provider, resource type)` context
//! it is evaluated under.
//!
//! Rules and practices only ever see a `ScanTarget`. Building one is where
//! resource type aliases are resolved and resource addresses are pulled out
//! of the text, so that every finding of a scan shares them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detect;

/// Cloud provider a snippet targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Azure, Provider::Gcp];

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "aws" | "amazon" => Some(Self::Aws),
            "azure" | "azurerm" => Some(Self::Azure),
            "gcp" | "google" => Some(Self::Gcp),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Gcp => write!(f, "gcp"),
        }
    }
}

/// Text under evaluation together with its resolved context.
#[derive(Debug, Clone)]
pub struct ScanTarget<'a> {
    pub text: &'a str,
    pub provider: Provider,
    /// Canonical resource type key (e.g. "s3", never "aws_s3_bucket").
    pub resource_type: String,
    /// Resource addresses declared in the text, in order of appearance.
    pub resources: Vec<String>,
}

impl<'a> ScanTarget<'a> {
    pub fn new(text: &'a str, provider: Provider, resource_type: &str) -> Self {
        Self {
            text,
            provider,
            resource_type: detect::canonical_resource_type(provider, resource_type),
            resources: resource_refs(text),
        }
    }
}

static HCL_RESOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*resource\s+"([A-Za-z0-9_-]+)"\s+"([A-Za-z0-9_-]+)""#).unwrap()
});

static YAML_KIND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^kind:[ \t]*([A-Za-z]+)").unwrap());

static YAML_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^metadata:[ \t]*\n(?:[ \t]+.*\n)*?[ \t]+name:[ \t]*["']?([A-Za-z0-9._-]+)"#)
        .unwrap()
});

/// Extract resource addresses from Terraform headers (`aws_s3_bucket.logs`)
/// or Kubernetes-style YAML documents (`Service/web`).
pub fn resource_refs(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();

    for cap in HCL_RESOURCE_RE.captures_iter(text) {
        refs.push(format!("{}.{}", &cap[1], &cap[2]));
    }

    for doc in text.split("\n---") {
        if let Some(kind) = YAML_KIND_RE.captures(doc) {
            let name = YAML_NAME_RE
                .captures(doc)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "unnamed".into());
            refs.push(format!("{}/{}", &kind[1], name));
        }
    }

    let mut seen = std::collections::HashSet::new();
    refs.retain(|r| seen.insert(r.clone()));
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_terraform_addresses() {
        let text = r#"
resource "aws_s3_bucket" "logs" {
  bucket = "logs"
}

resource "aws_s3_bucket_versioning" "logs" {
  bucket = aws_s3_bucket.logs.id
}
"#;
        assert_eq!(
            resource_refs(text),
            vec!["aws_s3_bucket.logs", "aws_s3_bucket_versioning.logs"]
        );
    }

    #[test]
    fn extracts_yaml_kind_and_name_per_document() {
        let text = "apiVersion: v1\nkind: Service\nmetadata:\n  labels:\n    app: web\n  name: web\nspec:\n  type: ClusterIP\n---\nkind: ConfigMap\nmetadata:\n  name: settings\n";
        assert_eq!(resource_refs(text), vec!["Service/web", "ConfigMap/settings"]);
    }

    #[test]
    fn no_resources_in_free_text() {
        assert!(resource_refs("just some words").is_empty());
        assert!(resource_refs("").is_empty());
    }

    #[test]
    fn target_canonicalizes_terraform_type_names() {
        let target = ScanTarget::new("", Provider::Aws, "aws_s3_bucket");
        assert_eq!(target.resource_type, "s3");
    }

    #[test]
    fn provider_aliases() {
        assert_eq!(Provider::from_str_lenient("AzureRM"), Some(Provider::Azure));
        assert_eq!(Provider::from_str_lenient("google"), Some(Provider::Gcp));
        assert_eq!(Provider::from_str_lenient("oracle"), None);
    }
}
