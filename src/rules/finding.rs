use serde::{Deserialize, Serialize};

use crate::compliance::ComplianceTag;
use crate::target::Provider;

/// A rule violation detected in one text sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier (e.g., "AWS-S3-001").
    pub rule_id: String,
    pub severity: Severity,
    pub category: RuleCategory,
    /// Short human-readable title of the violated rule.
    pub title: String,
    pub description: String,
    /// Suggested remediation.
    pub recommendation: String,
    /// Compliance taxonomy category this finding counts against.
    pub compliance_tag: Option<ComplianceTag>,
    /// Resource addresses found in the scanned text.
    pub affected_resources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Points deducted from the score for one finding of this severity.
    pub fn penalty(self) -> u32 {
        match self {
            Self::Critical => 25,
            Self::High => 15,
            Self::Medium => 10,
            Self::Low => 5,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    AccessControl,
    Encryption,
    Network,
    Monitoring,
    Configuration,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessControl => write!(f, "Access Control"),
            Self::Encryption => write!(f, "Encryption"),
            Self::Network => write!(f, "Network"),
            Self::Monitoring => write!(f, "Monitoring"),
            Self::Configuration => write!(f, "Configuration"),
        }
    }
}

/// Metadata about a rule, used for `list-rules` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: RuleCategory,
    pub provider: Provider,
    pub resource_type: Option<String>,
    pub compliance_tag: Option<ComplianceTag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_by_impact() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn penalty_table_is_fixed() {
        assert_eq!(Severity::Critical.penalty(), 25);
        assert_eq!(Severity::High.penalty(), 15);
        assert_eq!(Severity::Medium.penalty(), 10);
        assert_eq!(Severity::Low.penalty(), 5);
    }

    #[test]
    fn lenient_parsing_accepts_short_forms() {
        assert_eq!(Severity::from_str_lenient("CRIT"), Some(Severity::Critical));
        assert_eq!(Severity::from_str_lenient("med"), Some(Severity::Medium));
        assert_eq!(Severity::from_str_lenient("info"), None);
    }

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&RuleCategory::AccessControl).unwrap();
        assert_eq!(json, "\"access-control\"");
    }
}
