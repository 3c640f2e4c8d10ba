use serde::{Deserialize, Serialize};

use super::{AppliesTo, Check};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeCategory {
    Performance,
    Cost,
    Reliability,
    Security,
    Operational,
}

impl std::fmt::Display for PracticeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Performance => write!(f, "performance"),
            Self::Cost => write!(f, "cost"),
            Self::Reliability => write!(f, "reliability"),
            Self::Security => write!(f, "security"),
            Self::Operational => write!(f, "operational"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Guidance attached to a resource type. Suggested whenever its condition
/// holds, or always when it has none. Independent of findings and score.
#[derive(Debug, Clone)]
pub struct BestPracticePattern {
    pub id: String,
    pub category: PracticeCategory,
    pub applies_to: AppliesTo,
    pub condition: Option<Check>,
    pub title: String,
    pub description: String,
    pub implementation_hint: String,
    pub impact: Impact,
}

/// A best-practice pattern instantiated for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub category: PracticeCategory,
    pub title: String,
    pub description: String,
    pub implementation_hint: String,
    pub impact: Impact,
}

impl BestPracticePattern {
    /// Create an unconditional pattern.
    pub fn new(
        id: impl Into<String>,
        applies_to: AppliesTo,
        category: PracticeCategory,
        impact: Impact,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            applies_to,
            condition: None,
            title: String::new(),
            description: String::new(),
            implementation_hint: String::new(),
            impact,
        }
    }

    pub fn when(mut self, condition: Check) -> Self {
        self.condition = Some(condition);
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

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.implementation_hint = hint.into();
        self
    }

    pub fn is_unconditional(&self) -> bool {
        self.condition.is_none()
    }

    pub fn suggest(&self, text: &str) -> Option<Suggestion> {
        let applies = self.condition.as_ref().map_or(true, |c| c.holds(text));
        applies.then(|| Suggestion {
            id: self.id.clone(),
            category: self.category,
            title: self.title.clone(),
            description: self.description.clone(),
            implementation_hint: self.implementation_hint.clone(),
            impact: self.impact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Provider;

    fn tagging() -> BestPracticePattern {
        BestPracticePattern::new(
            "BP-TEST",
            AppliesTo::any_resource(Provider::Aws),
            PracticeCategory::Operational,
            Impact::Low,
        )
        .when(Check::missing("tags"))
        .with_title("Tag resources")
    }

    #[test]
    fn conditional_pattern_follows_its_check() {
        assert!(tagging().suggest("bucket = \"x\"").is_some());
        assert!(tagging().suggest("tags = { team = \"x\" }").is_none());
    }

    #[test]
    fn unconditional_pattern_always_suggests() {
        let pattern = BestPracticePattern::new(
            "BP-ALWAYS",
            AppliesTo::resource(Provider::Aws, "s3"),
            PracticeCategory::Cost,
            Impact::Medium,
        );
        assert!(pattern.is_unconditional());
        assert!(pattern.suggest("").is_some());
    }
}
