//! Remediation challenges: a broken snippet, the named requirements a fixed
//! snippet must meet, and the messages shown either way.
//!
//! Authoritative validation and the live hint both evaluate
//! `ChallengeSpec::requirements`, so a hint that says "likely correct"
//! always agrees with the submitted result.

pub mod catalog;
pub mod session;

use std::borrow::Cow;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::rules::Check;

pub use session::{ChallengeSession, SessionState};

/// Edit distance a generic challenge must exceed to count as a real fix.
pub const GENERIC_MIN_CHANGES: usize = 10;

/// One named condition a fixed snippet must satisfy.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    /// Holds when the requirement is met.
    pub check: Check,
    /// Shown when the requirement is not met.
    pub issue: String,
}

impl Requirement {
    pub fn new(name: impl Into<String>, check: Check, issue: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check,
            issue: issue.into(),
        }
    }

    pub fn is_met(&self, text: &str) -> bool {
        self.check.holds(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    /// Challenge-specific requirements.
    Targeted,
    /// Well-formed and meaningfully edited.
    Generic,
}

#[derive(Debug, Clone)]
pub struct ChallengeSpec {
    pub id: u32,
    pub title: String,
    pub briefing: String,
    /// The broken text the challenge starts from; restored on reset.
    pub broken_text: String,
    pub kind: ValidationKind,
    pub requirements: Vec<Requirement>,
    pub remediation_message: String,
    pub success_message: String,
}

impl ChallengeSpec {
    /// A challenge judged by its own requirements. An empty requirement
    /// list falls back to generic validation.
    pub fn targeted(
        id: u32,
        title: impl Into<String>,
        broken_text: impl Into<String>,
        requirements: Vec<Requirement>,
    ) -> Self {
        let broken_text = broken_text.into();
        if requirements.is_empty() {
            return Self::generic(id, title, broken_text);
        }
        Self {
            id,
            title: title.into(),
            briefing: String::new(),
            broken_text,
            kind: ValidationKind::Targeted,
            requirements,
            remediation_message: "Not quite. Review the issues below and try again.".into(),
            success_message: "Challenge complete. The configuration is fixed.".into(),
        }
    }

    /// A challenge judged only by structure and amount of change.
    pub fn generic(id: u32, title: impl Into<String>, broken_text: impl Into<String>) -> Self {
        let broken_text = broken_text.into();
        let requirements = generic_requirements(&broken_text);
        Self {
            id,
            title: title.into(),
            briefing: String::new(),
            broken_text,
            kind: ValidationKind::Generic,
            requirements,
            remediation_message: "The configuration still needs work.".into(),
            success_message: "Looks good. The configuration is valid and has been updated.".into(),
        }
    }

    pub fn with_briefing(mut self, briefing: impl Into<String>) -> Self {
        self.briefing = briefing.into();
        self
    }

    pub fn with_messages(
        mut self,
        remediation: impl Into<String>,
        success: impl Into<String>,
    ) -> Self {
        self.remediation_message = remediation.into();
        self.success_message = success.into();
        self
    }

    /// Requirements not met by `text`, in declaration order.
    pub fn unmet<'s>(&'s self, text: &'s str) -> impl Iterator<Item = &'s Requirement> + 's {
        self.requirements.iter().filter(move |r| !r.is_met(text))
    }

    pub fn is_solved_by(&self, text: &str) -> bool {
        self.unmet(text).next().is_none()
    }

    pub fn info(&self) -> ChallengeInfo {
        ChallengeInfo {
            id: self.id,
            title: self.title.clone(),
            briefing: self.briefing.clone(),
            kind: self.kind,
            requirements: self.requirements.iter().map(|r| r.name.clone()).collect(),
        }
    }
}

fn generic_requirements(original: &str) -> Vec<Requirement> {
    vec![
        Requirement::new(
            "well-formed",
            Check::WellFormed,
            "The configuration is not well-formed: expected key/value or block structure with balanced brackets.",
        ),
        Requirement::new(
            "meaningful-edit",
            Check::edited_from(original, GENERIC_MIN_CHANGES),
            format!(
                "Only cosmetic changes detected; make a substantive fix (more than {GENERIC_MIN_CHANGES} characters changed)."
            ),
        ),
    ]
}

/// Result of a submitted solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeOutcome {
    pub pass: bool,
    pub message: String,
    /// One entry per unmet requirement.
    pub issues: Vec<String>,
}

/// Live feedback computed on every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeHint {
    pub has_changes: bool,
    pub likely_correct: bool,
}

/// Listing entry for a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub id: u32,
    pub title: String,
    pub briefing: String,
    pub kind: ValidationKind,
    pub requirements: Vec<String>,
}

static BUILTIN: Lazy<ChallengeValidator> =
    Lazy::new(|| ChallengeValidator::new(catalog::all_challenges()));

/// Table of challenges keyed by id. Total over every id: unknown ids are
/// validated generically against an empty original text.
#[derive(Debug, Clone, Default)]
pub struct ChallengeValidator {
    challenges: BTreeMap<u32, ChallengeSpec>,
}

impl ChallengeValidator {
    /// Later entries with a duplicate id replace earlier ones.
    pub fn new(challenges: Vec<ChallengeSpec>) -> Self {
        Self {
            challenges: challenges.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// The shared built-in challenge table, built on first use.
    pub fn builtin() -> &'static ChallengeValidator {
        &BUILTIN
    }

    pub fn get(&self, id: u32) -> Option<&ChallengeSpec> {
        self.challenges.get(&id)
    }

    /// The challenge used for `id`, synthesizing a generic one for unknown ids.
    pub fn resolve(&self, id: u32) -> Cow<'_, ChallengeSpec> {
        match self.challenges.get(&id) {
            Some(spec) => Cow::Borrowed(spec),
            None => {
                tracing::debug!(challenge_id = id, "unknown challenge, using generic validation");
                Cow::Owned(ChallengeSpec::generic(id, format!("Challenge {id}"), ""))
            }
        }
    }

    /// Original broken text for `id` (empty for unknown ids).
    pub fn original_text(&self, id: u32) -> &str {
        self.challenges
            .get(&id)
            .map_or("", |c| c.broken_text.as_str())
    }

    /// Authoritative pass/fail with one issue per unmet requirement.
    pub fn validate(&self, id: u32, text: &str) -> ChallengeOutcome {
        let spec = self.resolve(id);
        let issues: Vec<String> = spec.unmet(text).map(|r| r.issue.clone()).collect();
        let pass = issues.is_empty();
        ChallengeOutcome {
            pass,
            message: if pass {
                spec.success_message.clone()
            } else {
                spec.remediation_message.clone()
            },
            issues,
        }
    }

    /// Cheap per-keystroke feedback over the same requirements.
    pub fn live_hint(&self, id: u32, text: &str) -> RealtimeHint {
        let spec = self.resolve(id);
        RealtimeHint {
            has_changes: text != spec.broken_text,
            likely_correct: spec.is_solved_by(text),
        }
    }

    pub fn list(&self) -> Vec<ChallengeInfo> {
        self.challenges.values().map(|c| c.info()).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.challenges.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CLUSTER_IP: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\nspec:\n  type: ClusterIP\n  ports:\n    - port: 80\n";

    #[test]
    fn cluster_ip_fails_external_access() {
        let outcome = ChallengeValidator::builtin().validate(1, CLUSTER_IP);
        assert!(!outcome.pass);
        assert!(outcome.issues.iter().any(|i| i.contains("ClusterIP")));
        assert!(outcome.issues.iter().any(|i| i.contains("restrict")));
    }

    #[test]
    fn node_port_passes_external_access() {
        let fixed = CLUSTER_IP.replace("ClusterIP", "NodePort");
        let validator = ChallengeValidator::builtin();
        let outcome = validator.validate(1, &fixed);
        assert!(outcome.pass, "{:?}", outcome.issues);
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.message, validator.get(1).unwrap().success_message);
        assert!(validator.live_hint(1, &fixed).likely_correct);
    }

    #[test]
    fn one_issue_per_unmet_requirement() {
        let validator = ChallengeValidator::builtin();
        let spec = validator.get(1).unwrap();
        let outcome = validator.validate(1, "");
        assert_eq!(outcome.issues.len(), spec.unmet("").count());
    }

    #[test]
    fn unknown_id_is_generic_against_empty_original() {
        let validator = ChallengeValidator::builtin();
        assert_eq!(validator.original_text(9999), "");
        assert!(!validator.validate(9999, "").pass);
        assert!(!validator.live_hint(9999, "").has_changes);

        let text = "kind: ConfigMap\ndata:\n  retries: \"3\"\n";
        assert!(validator.validate(9999, text).pass);
        assert_eq!(
            validator.live_hint(9999, text),
            RealtimeHint {
                has_changes: true,
                likely_correct: true
            }
        );
    }

    #[test]
    fn generic_rejects_cosmetic_edits() {
        let original = "kind: ConfigMap\ndata:\n  key: value\n";
        let validator = ChallengeValidator::new(vec![ChallengeSpec::generic(7, "tidy", original)]);
        let reformatted = "kind: ConfigMap\ndata:\n    key:   value\n\n";

        let outcome = validator.validate(7, reformatted);
        assert!(!outcome.pass);
        assert_eq!(outcome.issues.len(), 1);
        assert!(outcome.issues[0].contains("cosmetic"));

        let hint = validator.live_hint(7, reformatted);
        assert!(hint.has_changes);
        assert!(!hint.likely_correct);
    }

    #[test]
    fn empty_targeted_requirements_become_generic() {
        let spec = ChallengeSpec::targeted(3, "t", "a: b\n", vec![]);
        assert_eq!(spec.kind, ValidationKind::Generic);
        assert_eq!(spec.requirements.len(), 2);
    }

    #[test]
    fn broken_texts_fail_their_own_challenge() {
        let validator = ChallengeValidator::builtin();
        for id in validator.ids() {
            let original = validator.original_text(id);
            let outcome = validator.validate(id, original);
            assert!(!outcome.pass, "challenge {id} passes unmodified");
            assert!(!outcome.issues.is_empty());
            assert_eq!(
                validator.live_hint(id, original),
                RealtimeHint {
                    has_changes: false,
                    likely_correct: false
                }
            );
        }
    }

    #[test]
    fn list_is_ordered_by_id() {
        let ids: Vec<u32> = ChallengeValidator::builtin().list().iter().map(|c| c.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
