use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Finding, Severity};
use crate::report::ValidationReport;
use crate::scoring::{self, ScoreBand};

/// Policy verdict: the final pass/fail decision after applying the ignore
/// list and severity overrides to raw findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    /// Score over the effective findings.
    pub score: u8,
    pub band: ScoreBand,
    pub total_findings: usize,
    pub effective_findings: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
    pub min_score: u8,
}

/// Policy configuration loaded from `.infraguard.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Scans scoring below this fail regardless of severities.
    #[serde(default)]
    pub min_score: u8,
    /// Rule IDs to ignore entirely.
    #[serde(default)]
    pub ignore_rules: HashSet<String>,
    /// Per-rule severity overrides.
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

fn default_fail_on() -> Severity {
    Severity::High
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: Severity::High,
            min_score: 0,
            ignore_rules: HashSet::new(),
            overrides: HashMap::new(),
        }
    }
}

impl Policy {
    /// Evaluate findings against this policy and produce a verdict.
    pub fn evaluate(&self, findings: &[Finding]) -> PolicyVerdict {
        let effective = self.apply(findings);
        let score = scoring::score(&effective);

        let highest = effective.iter().map(|f| f.severity).max();
        let failed_severity = effective.iter().any(|f| f.severity >= self.fail_on);

        PolicyVerdict {
            pass: !failed_severity && score >= self.min_score,
            score,
            band: ScoreBand::of(score),
            total_findings: findings.len(),
            effective_findings: effective.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
            min_score: self.min_score,
        }
    }

    /// Filter findings: remove ignored rules, apply overrides.
    pub fn apply(&self, findings: &[Finding]) -> Vec<Finding> {
        findings
            .iter()
            .filter(|f| !self.ignore_rules.contains(&f.rule_id))
            .map(|f| {
                let mut f = f.clone();
                if let Some(&override_sev) = self.overrides.get(&f.rule_id) {
                    f.severity = override_sev;
                }
                f
            })
            .collect()
    }

    /// Apply to a report's findings, recomputing score and checklist.
    pub fn apply_to_report(&self, report: &mut ValidationReport) {
        let effective = self.apply(&report.findings);
        report.set_findings(effective);
    }
}
