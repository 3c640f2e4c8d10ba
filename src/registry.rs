//! Rule and best-practice catalogue indexed by `(provider, resource type)`.
//!
//! Supporting a new provider or resource type means adding entries here
//! (or to a registry built from config); nothing downstream changes.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;

use crate::detect;
use crate::rules::{builtin, AppliesTo, BestPracticePattern, Rule};
use crate::target::Provider;

static BUILTIN: Lazy<Registry> =
    Lazy::new(|| Registry::new(builtin::all_rules(), builtin::all_practices()));

#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Vec<Rule>,
    practices: Vec<BestPracticePattern>,
}

impl Registry {
    /// The shared built-in catalogue, built on first use.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn new(rules: Vec<Rule>, practices: Vec<BestPracticePattern>) -> Self {
        Self { rules, practices }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any existing rule with the same id in place.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    /// Add a practice, replacing any existing practice with the same id.
    pub fn with_practice(mut self, practice: BestPracticePattern) -> Self {
        match self.practices.iter_mut().find(|p| p.id == practice.id) {
            Some(existing) => *existing = practice,
            None => self.practices.push(practice),
        }
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn practices(&self) -> &[BestPracticePattern] {
        &self.practices
    }

    /// Rules applicable to the context, in catalogue order. Unknown
    /// contexts yield an empty list.
    pub fn rules_for(&self, provider: Provider, resource_type: &str) -> Vec<&Rule> {
        let rt = detect::canonical_resource_type(provider, resource_type);
        let known = self.knows(provider, &rt);
        self.rules
            .iter()
            .filter(|r| in_scope(&r.applies_to, provider, &rt, known))
            .collect()
    }

    pub fn practices_for(&self, provider: Provider, resource_type: &str) -> Vec<&BestPracticePattern> {
        let rt = detect::canonical_resource_type(provider, resource_type);
        let known = self.knows(provider, &rt);
        self.practices
            .iter()
            .filter(|p| in_scope(&p.applies_to, provider, &rt, known))
            .collect()
    }

    /// `resource_type` must already be canonical.
    fn knows(&self, provider: Provider, resource_type: &str) -> bool {
        self.resource_types(provider).contains(resource_type)
    }

    /// Resource types with at least one resource-specific rule or practice.
    pub fn resource_types(&self, provider: Provider) -> BTreeSet<&str> {
        let rule_scopes = self.rules.iter().map(|r| &r.applies_to);
        let practice_scopes = self.practices.iter().map(|p| &p.applies_to);
        rule_scopes
            .chain(practice_scopes)
            .filter(|scope| scope.provider == provider)
            .filter_map(|scope| scope.resource_type.as_deref())
            .collect()
    }
}

/// Provider-wide entries only reach resource types some resource-specific
/// entry names, so unknown contexts stay empty.
fn in_scope(scope: &AppliesTo, provider: Provider, resource_type: &str, known: bool) -> bool {
    scope.matches(provider, resource_type) && (known || scope.resource_type.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_context_is_empty() {
        let registry = Registry::builtin();
        assert!(registry.rules_for(Provider::Aws, "quantum_computer").is_empty());
        assert!(registry.practices_for(Provider::Azure, "s3").is_empty());
        assert!(registry.practices_for(Provider::Gcp, "mainframe").is_empty());
    }

    #[test]
    fn provider_wide_entries_reach_known_types_only() {
        let registry = Registry::builtin();
        let tags = |rt: &str| {
            registry
                .practices_for(Provider::Aws, rt)
                .iter()
                .any(|p| p.id == "BP-AWS-TAGS")
        };
        assert!(tags("s3"));
        assert!(tags("aws_instance"));
        assert!(!tags("quantum_computer"));
    }

    #[test]
    fn lookup_accepts_terraform_names() {
        let registry = Registry::builtin();
        let by_key = registry.rules_for(Provider::Aws, "s3").len();
        let by_tf = registry.rules_for(Provider::Aws, "aws_s3_bucket").len();
        assert!(by_key > 0);
        assert_eq!(by_key, by_tf);
    }

    #[test]
    fn every_provider_has_resource_types() {
        let registry = Registry::builtin();
        for provider in Provider::ALL {
            assert!(!registry.resource_types(provider).is_empty(), "{provider}");
        }
    }

    #[test]
    fn rule_ids_are_unique() {
        let registry = Registry::builtin();
        let ids: BTreeSet<_> = registry.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), registry.rules().len());
        let ids: BTreeSet<_> = registry.practices().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), registry.practices().len());
    }

    #[test]
    fn with_rule_replaces_by_id() {
        let original = Registry::builtin().rules()[0].clone();
        let replaced = original.clone().with_title("Replaced");
        let registry = Registry::builtin().clone().with_rule(replaced);
        assert_eq!(registry.rules().len(), Registry::builtin().rules().len());
        assert_eq!(registry.rules()[0].title, "Replaced");
    }
}
