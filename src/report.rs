use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::challenge::ChallengeOutcome;
use crate::compliance::{self, ComplianceEntry};
use crate::rules::{Finding, Suggestion};
use crate::scoring::{self, ScoreBand};
use crate::target::{Provider, ScanTarget};

/// Result of scanning one text sample. Plain data: a pure function of the
/// scanned `(text, provider, resource type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub provider: Provider,
    /// Canonical resource type the text was scanned as.
    pub resource_type: String,
    /// SHA-256 of the scanned text, hex encoded.
    pub input_digest: String,
    /// 0-100, see [`scoring::score`].
    pub score: u8,
    pub findings: Vec<Finding>,
    pub suggestions: Vec<Suggestion>,
    pub compliance_checklist: Vec<ComplianceEntry>,
}

impl ValidationReport {
    pub fn assemble(
        target: &ScanTarget,
        findings: Vec<Finding>,
        suggestions: Vec<Suggestion>,
    ) -> Self {
        let mut report = Self {
            provider: target.provider,
            resource_type: target.resource_type.clone(),
            input_digest: digest(target.text),
            score: 0,
            findings: Vec::new(),
            suggestions,
            compliance_checklist: Vec::new(),
        };
        report.set_findings(findings);
        report
    }

    /// Replace the findings and recompute score and checklist from them.
    pub fn set_findings(&mut self, findings: Vec<Finding>) {
        self.score = scoring::score(&findings);
        self.compliance_checklist = compliance::checklist(&findings);
        self.findings = findings;
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }

    pub fn compliant_count(&self) -> usize {
        self.compliance_checklist
            .iter()
            .filter(|e| e.compliant)
            .count()
    }
}

fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// What a caller reports to a progress tracker after a solved challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub steps_completed: u32,
    pub security_score: u8,
    pub best_practices_followed: usize,
}

impl ProgressUpdate {
    /// `None` unless the outcome passed.
    pub fn for_outcome(outcome: &ChallengeOutcome, report: &ValidationReport) -> Option<Self> {
        outcome.pass.then(|| Self {
            steps_completed: 1,
            security_score: report.score,
            best_practices_followed: report.suggestions.len(),
        })
    }
}
