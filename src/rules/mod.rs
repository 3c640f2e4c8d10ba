pub mod builtin;
pub mod check;
pub mod finding;
pub mod policy;
pub mod practice;

use crate::compliance::ComplianceTag;
use crate::registry::Registry;
use crate::report::ValidationReport;
use crate::target::{Provider, ScanTarget};

pub use check::Check;
pub use finding::{Finding, RuleCategory, RuleMetadata, Severity};
pub use practice::{BestPracticePattern, Impact, PracticeCategory, Suggestion};

/// Which `(provider, resource type)` pairs a rule or practice applies to.
/// A `None` resource type covers every resource type of the provider that
/// the registry knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliesTo {
    pub provider: Provider,
    pub resource_type: Option<String>,
}

impl AppliesTo {
    pub fn resource(provider: Provider, resource_type: impl Into<String>) -> Self {
        Self {
            provider,
            resource_type: Some(resource_type.into()),
        }
    }

    pub fn any_resource(provider: Provider) -> Self {
        Self {
            provider,
            resource_type: None,
        }
    }

    /// `resource_type` must already be canonical.
    pub fn matches(&self, provider: Provider, resource_type: &str) -> bool {
        self.provider == provider
            && self
                .resource_type
                .as_deref()
                .map_or(true, |rt| rt == resource_type)
    }
}

/// A declarative security rule: when `check` holds for the text, the rule
/// is violated and produces a finding.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub severity: Severity,
    pub category: RuleCategory,
    pub applies_to: AppliesTo,
    pub check: Check,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub compliance_tag: Option<ComplianceTag>,
}

impl Rule {
    /// Create a rule that never fires until a check is attached.
    pub fn new(
        id: impl Into<String>,
        applies_to: AppliesTo,
        severity: Severity,
        category: RuleCategory,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            category,
            applies_to,
            check: Check::Any(Vec::new()),
            title: String::new(),
            description: String::new(),
            recommendation: String::new(),
            compliance_tag: None,
        }
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.check = check;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    pub fn with_compliance(mut self, tag: ComplianceTag) -> Self {
        self.compliance_tag = Some(tag);
        self
    }

    /// Evaluate this rule alone against a target.
    pub fn evaluate(&self, target: &ScanTarget) -> Option<Finding> {
        if !self.check.holds(target.text) {
            return None;
        }
        Some(Finding {
            rule_id: self.id.clone(),
            severity: self.severity,
            category: self.category,
            title: self.title.clone(),
            description: self.description.clone(),
            recommendation: self.recommendation.clone(),
            compliance_tag: self.compliance_tag,
            affected_resources: target.resources.clone(),
        })
    }

    pub fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            severity: self.severity,
            category: self.category,
            provider: self.applies_to.provider,
            resource_type: self.applies_to.resource_type.clone(),
            compliance_tag: self.compliance_tag,
        }
    }
}

/// Evaluates registry rules and practices against scan targets.
///
/// Holds only a shared reference to a read-only registry; any number of
/// engines can run concurrently over the same catalogue.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'r> {
    registry: &'r Registry,
}

impl RuleEngine<'static> {
    /// Create an engine over the built-in catalogue.
    pub fn new() -> Self {
        Self {
            registry: Registry::builtin(),
        }
    }
}

impl Default for RuleEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> RuleEngine<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Run every applicable rule; one finding per violated rule, in
    /// catalogue order.
    pub fn evaluate(&self, target: &ScanTarget) -> Vec<Finding> {
        let rules = self
            .registry
            .rules_for(target.provider, &target.resource_type);
        if rules.is_empty() {
            tracing::debug!(
                provider = %target.provider,
                resource_type = %target.resource_type,
                "no rules registered for context"
            );
        }
        rules.iter().filter_map(|r| r.evaluate(target)).collect()
    }

    /// Collect best-practice suggestions for a target.
    pub fn suggestions(&self, target: &ScanTarget) -> Vec<Suggestion> {
        self.registry
            .practices_for(target.provider, &target.resource_type)
            .iter()
            .filter_map(|p| p.suggest(target.text))
            .collect()
    }

    /// Scan text under the given context and build the full report.
    pub fn scan(&self, text: &str, provider: Provider, resource_type: &str) -> ValidationReport {
        let target = ScanTarget::new(text, provider, resource_type);
        let findings = self.evaluate(&target);
        let suggestions = self.suggestions(&target);
        let report = ValidationReport::assemble(&target, findings, suggestions);

        tracing::debug!(
            provider = %provider,
            resource_type = %target.resource_type,
            findings = report.findings.len(),
            score = report.score,
            "scan complete"
        );
        report
    }

    /// List metadata for all registered rules.
    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.registry.rules().iter().map(|r| r.metadata()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin;

    fn bucket_rule() -> Rule {
        Rule::new(
            "TEST-001",
            AppliesTo::resource(Provider::Aws, "s3"),
            Severity::High,
            RuleCategory::Encryption,
        )
        .with_check(Check::missing("encryption"))
        .with_title("Encryption missing")
        .with_compliance(ComplianceTag::Cnas1)
    }

    #[test]
    fn rule_without_check_never_fires() {
        let rule = Rule::new(
            "TEST-000",
            AppliesTo::any_resource(Provider::Aws),
            Severity::Low,
            RuleCategory::Configuration,
        );
        let target = ScanTarget::new("", Provider::Aws, "s3");
        assert!(rule.evaluate(&target).is_none());
    }

    #[test]
    fn finding_copies_rule_fields_and_resources() {
        let text = "resource \"aws_s3_bucket\" \"logs\" {}";
        let target = ScanTarget::new(text, Provider::Aws, "s3");
        let finding = bucket_rule().evaluate(&target).unwrap();
        assert_eq!(finding.rule_id, "TEST-001");
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.compliance_tag, Some(ComplianceTag::Cnas1));
        assert_eq!(finding.affected_resources, vec!["aws_s3_bucket.logs"]);
    }

    #[test]
    fn applies_to_any_resource() {
        let scope = AppliesTo::any_resource(Provider::Gcp);
        assert!(scope.matches(Provider::Gcp, "firewall"));
        assert!(!scope.matches(Provider::Aws, "firewall"));
    }

    #[test]
    fn engine_with_custom_registry() {
        let registry = Registry::empty().with_rule(bucket_rule());
        let engine = RuleEngine::with_registry(&registry);
        let target = ScanTarget::new("bucket = \"x\"", Provider::Aws, "s3");
        assert_eq!(engine.evaluate(&target).len(), 1);
        let target = ScanTarget::new("bucket = \"x\"", Provider::Azure, "s3");
        assert!(engine.evaluate(&target).is_empty());
    }

    #[test]
    fn list_rules_covers_catalogue() {
        let engine = RuleEngine::new();
        assert_eq!(engine.list_rules().len(), builtin::all_rules().len());
    }
}
