//! Compliance checklist against the OWASP Cloud-Native Application Security
//! Top 10 (CNAS-1 .. CNAS-10).

use serde::{Deserialize, Serialize};

use crate::rules::Finding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplianceTag {
    #[serde(rename = "CNAS-1")]
    Cnas1,
    #[serde(rename = "CNAS-2")]
    Cnas2,
    #[serde(rename = "CNAS-3")]
    Cnas3,
    #[serde(rename = "CNAS-4")]
    Cnas4,
    #[serde(rename = "CNAS-5")]
    Cnas5,
    #[serde(rename = "CNAS-6")]
    Cnas6,
    #[serde(rename = "CNAS-7")]
    Cnas7,
    #[serde(rename = "CNAS-8")]
    Cnas8,
    #[serde(rename = "CNAS-9")]
    Cnas9,
    #[serde(rename = "CNAS-10")]
    Cnas10,
}

impl ComplianceTag {
    /// The fixed taxonomy, in checklist order.
    pub const ALL: [ComplianceTag; 10] = [
        Self::Cnas1,
        Self::Cnas2,
        Self::Cnas3,
        Self::Cnas4,
        Self::Cnas5,
        Self::Cnas6,
        Self::Cnas7,
        Self::Cnas8,
        Self::Cnas9,
        Self::Cnas10,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Cnas1 => "CNAS-1",
            Self::Cnas2 => "CNAS-2",
            Self::Cnas3 => "CNAS-3",
            Self::Cnas4 => "CNAS-4",
            Self::Cnas5 => "CNAS-5",
            Self::Cnas6 => "CNAS-6",
            Self::Cnas7 => "CNAS-7",
            Self::Cnas8 => "CNAS-8",
            Self::Cnas9 => "CNAS-9",
            Self::Cnas10 => "CNAS-10",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cnas1 => "Insecure cloud, container or orchestration configuration",
            Self::Cnas2 => "Injection flaws",
            Self::Cnas3 => "Improper authentication and authorization",
            Self::Cnas4 => "CI/CD pipeline and software supply chain flaws",
            Self::Cnas5 => "Insecure secrets storage",
            Self::Cnas6 => "Over-permissive or insecure network policies",
            Self::Cnas7 => "Using components with known vulnerabilities",
            Self::Cnas8 => "Improper assets management",
            Self::Cnas9 => "Inadequate compute resource quota limits",
            Self::Cnas10 => "Ineffective logging and monitoring",
        }
    }
}

impl std::fmt::Display for ComplianceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One row of the compliance checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceEntry {
    pub tag: ComplianceTag,
    pub compliant: bool,
    pub violating_finding_titles: Vec<String>,
}

/// Group findings by compliance tag over the whole taxonomy. A category no
/// finding maps to is compliant.
pub fn checklist(findings: &[Finding]) -> Vec<ComplianceEntry> {
    ComplianceTag::ALL
        .iter()
        .map(|&tag| {
            let violating_finding_titles: Vec<String> = findings
                .iter()
                .filter(|f| f.compliance_tag == Some(tag))
                .map(|f| f.title.clone())
                .collect();
            ComplianceEntry {
                tag,
                compliant: violating_finding_titles.is_empty(),
                violating_finding_titles,
            }
        })
        .collect()
}
