use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compliance::ComplianceTag;
use crate::error::Result;
use crate::registry::Registry;
use crate::rules::check::compile_rule_pattern;
use crate::rules::policy::Policy;
use crate::rules::{AppliesTo, Check, Rule, RuleCategory, Severity};
use crate::target::Provider;

/// Top-level configuration from `.infraguard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    /// Project-specific rules added to (or replacing) built-in ones.
    #[serde(default, rename = "rules")]
    pub custom_rules: Vec<CustomRule>,
}

/// A rule declared in configuration. Fires when `pattern` matches, or when
/// it does not match if `when_missing` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRule {
    pub id: String,
    pub provider: Provider,
    /// Omit to apply to every known resource type of the provider.
    #[serde(default)]
    pub resource_type: Option<String>,
    pub severity: Severity,
    pub category: RuleCategory,
    pub pattern: String,
    #[serde(default)]
    pub when_missing: bool,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub compliance: Option<ComplianceTag>,
}

impl CustomRule {
    pub fn to_rule(&self) -> Result<Rule> {
        let matches = compile_rule_pattern(&self.id, &self.pattern)?;
        let check = if self.when_missing {
            Check::not(matches)
        } else {
            matches
        };
        let applies_to = match &self.resource_type {
            Some(rt) => AppliesTo::resource(
                self.provider,
                crate::detect::canonical_resource_type(self.provider, rt),
            ),
            None => AppliesTo::any_resource(self.provider),
        };

        let mut rule = Rule::new(&self.id, applies_to, self.severity, self.category)
            .with_check(check)
            .with_title(&self.title)
            .with_description(&self.description)
            .with_recommendation(&self.recommendation);
        rule.compliance_tag = self.compliance;
        Ok(rule)
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The built-in registry extended with this config's custom rules.
    pub fn registry(&self) -> Result<Registry> {
        self.custom_rules
            .iter()
            .try_fold(Registry::builtin().clone(), |registry, custom| {
                Ok(registry.with_rule(custom.to_rule()?))
            })
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# InfraGuard configuration

[policy]
# Minimum severity to fail the scan (low, medium, high, critical).
fail_on = "high"

# Fail scans scoring below this value (0-100).
min_score = 0

# Rule IDs to ignore entirely.
# ignore_rules = ["AWS-S3-004"]

# Per-rule severity overrides.
# [policy.overrides]
# "AWS-SG-003" = "low"

# Project-specific rules.
# [[rules]]
# id = "ORG-001"
# provider = "aws"
# resource_type = "s3"
# severity = "medium"
# category = "configuration"
# pattern = 'cost_center'
# when_missing = true
# title = "Bucket has no cost_center tag"
# compliance = "CNAS-8"
"#
    }
}
