//! Linear severity-penalty scoring.

use serde::{Deserialize, Serialize};

use crate::rules::Finding;

pub const MAX_SCORE: u8 = 100;

/// Start at 100, subtract each finding's severity penalty, floor at 0.
pub fn score(findings: &[Finding]) -> u8 {
    let penalty: u32 = findings.iter().map(|f| f.severity.penalty()).sum();
    u32::from(MAX_SCORE).saturating_sub(penalty) as u8
}

/// Coarse reading of a score used by renderers and policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        match score {
            90.. => Self::Good,
            70..=89 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Fair => write!(f, "fair"),
            Self::Good => write!(f, "good"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleCategory, Severity};

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule_id: "TEST".into(),
            severity,
            category: RuleCategory::Configuration,
            title: String::new(),
            description: String::new(),
            recommendation: String::new(),
            compliance_tag: None,
            affected_resources: vec![],
        }
    }

    #[test]
    fn no_findings_scores_full() {
        assert_eq!(score(&[]), 100);
    }

    #[test]
    fn subtracts_penalty_table() {
        let findings = vec![
            finding(Severity::Critical),
            finding(Severity::High),
            finding(Severity::Medium),
            finding(Severity::Low),
        ];
        assert_eq!(score(&findings), 45);
    }

    #[test]
    fn floors_at_zero() {
        let findings: Vec<_> = (0..5).map(|_| finding(Severity::Critical)).collect();
        assert_eq!(score(&findings), 0);
    }

    #[test]
    fn bands() {
        assert_eq!(ScoreBand::of(100), ScoreBand::Good);
        assert_eq!(ScoreBand::of(90), ScoreBand::Good);
        assert_eq!(ScoreBand::of(89), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(70), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(69), ScoreBand::Poor);
    }
}
