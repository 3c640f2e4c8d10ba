//! InfraGuard: rule-based security linter for infrastructure-as-code.
//!
//! Scans Terraform/YAML snippets as raw text against a per-provider rule
//! catalogue, scores the result, maps findings onto the OWASP Cloud-Native
//! Top 10 and validates fixes for hands-on remediation challenges.
//!
//! # Quick Start
//!
//! ```
//! use infraguard::{scan, validate_challenge, Provider};
//!
//! let report = scan(r#"resource "aws_s3_bucket" "b" {}"#, Provider::Aws, "s3");
//! assert!(report.score < 100);
//!
//! let outcome = validate_challenge(1, "kind: Service\nspec:\n  type: NodePort\n");
//! println!("pass: {}, issues: {:?}", outcome.pass, outcome.issues);
//! ```

pub mod challenge;
pub mod compliance;
pub mod config;
pub mod detect;
pub mod error;
pub mod output;
pub mod registry;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod target;

use challenge::ChallengeValidator;
use rules::policy::{Policy, PolicyVerdict};
use rules::RuleEngine;

pub use challenge::{ChallengeOutcome, RealtimeHint};
pub use report::{ProgressUpdate, ValidationReport};
pub use target::Provider;

/// Scan text against the built-in catalogue.
///
/// Total and deterministic: unknown resource types yield a report with no
/// findings and a score of 100.
pub fn scan(text: &str, provider: Provider, resource_type: &str) -> ValidationReport {
    RuleEngine::new().scan(text, provider, resource_type)
}

/// Scan with an explicit engine, then apply a policy to the findings.
pub fn scan_with_policy(
    engine: &RuleEngine<'_>,
    text: &str,
    provider: Provider,
    resource_type: &str,
    policy: &Policy,
) -> (ValidationReport, PolicyVerdict) {
    let mut report = engine.scan(text, provider, resource_type);
    let verdict = policy.evaluate(&report.findings);
    policy.apply_to_report(&mut report);
    (report, verdict)
}

/// Authoritative validation of a challenge solution.
pub fn validate_challenge(challenge_id: u32, text: &str) -> ChallengeOutcome {
    ChallengeValidator::builtin().validate(challenge_id, text)
}

/// Live feedback for a challenge buffer; agrees with
/// [`validate_challenge`] on every input.
pub fn live_hint(challenge_id: u32, text: &str) -> RealtimeHint {
    ChallengeValidator::builtin().live_hint(challenge_id, text)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::rules::Severity;

    const S3_NO_ENCRYPTION: &str = r#"
resource "aws_s3_bucket" "uploads" {
  bucket = "user-uploads"
  acl    = "private"

  versioning {
    enabled = true
  }

  logging {
    target_bucket = "audit-logs"
  }
}
"#;

    #[test]
    fn missing_encryption_is_high_and_costs_points() {
        let report = scan(S3_NO_ENCRYPTION, Provider::Aws, "s3");
        let finding = report
            .findings
            .iter()
            .find(|f| f.rule_id == "AWS-S3-001")
            .unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.title.to_lowercase().contains("encryption"));
        assert_eq!(finding.affected_resources, vec!["aws_s3_bucket.uploads"]);
        assert!(report.score <= 85);
    }

    #[test]
    fn empty_text_triggers_every_must_contain_rule() {
        let report = scan("", Provider::Aws, "s3");
        let ids: Vec<&str> = report.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["AWS-S3-001", "AWS-S3-003", "AWS-S3-004"]);
        assert_eq!(report.score, 70);
        assert!(report.findings.iter().all(|f| f.affected_resources.is_empty()));
    }

    #[test]
    fn unknown_context_is_perfect() {
        let report = scan("anything", Provider::Gcp, "mainframe");
        assert!(report.findings.is_empty());
        assert!(report.suggestions.is_empty());
        assert_eq!(report.score, 100);
        assert!(report.compliance_checklist.iter().all(|e| e.compliant));
    }

    #[test]
    fn unconditional_suggestions_always_present() {
        let report = scan("", Provider::Aws, "s3");
        assert!(report.suggestions.iter().any(|s| s.id == "BP-S3-LIFECYCLE"));
        let report = scan(S3_NO_ENCRYPTION, Provider::Aws, "s3");
        assert!(report.suggestions.iter().any(|s| s.id == "BP-S3-LIFECYCLE"));
    }

    #[test]
    fn policy_rescoring() {
        let mut policy = Policy::default();
        policy.ignore_rules.insert("AWS-S3-001".into());
        let engine = RuleEngine::new();
        let (report, verdict) =
            scan_with_policy(&engine, S3_NO_ENCRYPTION, Provider::Aws, "s3", &policy);
        assert!(report.findings.is_empty());
        assert_eq!(report.score, 100);
        assert!(verdict.pass);
        assert_eq!(verdict.total_findings, 1);
    }

    #[test]
    fn progress_update_after_solving() {
        let text = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\nspec:\n  type: NodePort\n";
        let outcome = validate_challenge(1, text);
        let report = scan(text, Provider::Aws, "s3");
        let update = ProgressUpdate::for_outcome(&outcome, &report).unwrap();
        assert_eq!(update.best_practices_followed, report.suggestions.len());
        assert!(live_hint(1, text).likely_correct);
    }
}
