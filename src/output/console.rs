use crate::challenge::ChallengeOutcome;
use crate::report::ValidationReport;
use crate::rules::policy::PolicyVerdict;
use crate::rules::Severity;

/// Render a report as human-readable console output.
pub fn render(report: &ValidationReport, verdict: &PolicyVerdict, target_name: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  {} ({} {})\n",
        target_name, report.provider, report.resource_type
    ));
    output.push_str(&format!(
        "  Score: {}/100 ({})\n",
        report.score,
        report.band()
    ));

    if report.findings.is_empty() {
        output.push_str("\n  No security issues found.\n");
    } else {
        let mut sorted: Vec<_> = report.findings.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.rule_id.cmp(&b.rule_id)));

        output.push_str(&format!("\n  {} finding(s) detected:\n\n", sorted.len()));
        for finding in sorted {
            let severity_tag = match finding.severity {
                Severity::Critical => "[CRITICAL]",
                Severity::High => "[HIGH]    ",
                Severity::Medium => "[MEDIUM]  ",
                Severity::Low => "[LOW]     ",
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                severity_tag, finding.rule_id, finding.title
            ));
            if !finding.affected_resources.is_empty() {
                output.push_str(&format!(
                    "           in {}\n",
                    finding.affected_resources.join(", ")
                ));
            }
            output.push_str(&format!("           fix: {}\n", finding.recommendation));
            output.push('\n');
        }
    }

    if !report.suggestions.is_empty() {
        output.push_str("  Best practices:\n");
        for suggestion in &report.suggestions {
            output.push_str(&format!(
                "    - [{}/{}] {}: {}\n",
                suggestion.category, suggestion.impact, suggestion.title, suggestion.implementation_hint
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "  Compliance (OWASP Cloud-Native Top 10): {}/{} compliant\n",
        report.compliant_count(),
        report.compliance_checklist.len()
    ));
    for entry in report.compliance_checklist.iter().filter(|e| !e.compliant) {
        output.push_str(&format!(
            "    x {} {}: {}\n",
            entry.tag,
            entry.tag.name(),
            entry.violating_finding_titles.join("; ")
        ));
    }

    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "\n  Result: {} (threshold: {}, min score: {}, highest: {})\n\n",
        status,
        verdict.fail_threshold,
        verdict.min_score,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}

/// Render a challenge outcome.
pub fn render_outcome(challenge_id: u32, outcome: &ChallengeOutcome) -> String {
    let mut output = String::new();
    let status = if outcome.pass { "SOLVED" } else { "NOT YET" };
    output.push_str(&format!("\n  Challenge {}: {}\n", challenge_id, status));
    output.push_str(&format!("  {}\n", outcome.message));
    for issue in &outcome.issues {
        output.push_str(&format!("    - {}\n", issue));
    }
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::policy::Policy;
    use crate::{scan, validate_challenge, Provider};

    #[test]
    fn lists_findings_by_severity() {
        let text = "ingress {\n  cidr_blocks = [\"0.0.0.0/0\"]\n}\n";
        let report = scan(text, Provider::Aws, "security_group");
        let verdict = Policy::default().evaluate(&report.findings);
        let rendered = render(&report, &verdict, "sg.tf");

        let critical = rendered.find("[CRITICAL] AWS-SG-001").unwrap();
        let low = rendered.find("[LOW]      AWS-SG-003").unwrap();
        assert!(critical < low);
        assert!(rendered.contains("Result: FAIL"));
        assert!(rendered.contains("CNAS-6"));
    }

    #[test]
    fn clean_report() {
        let report = scan("", Provider::Azure, "unknown");
        let verdict = Policy::default().evaluate(&report.findings);
        let rendered = render(&report, &verdict, "empty.tf");
        assert!(rendered.contains("No security issues found."));
        assert!(rendered.contains("10/10 compliant"));
        assert!(rendered.contains("Result: PASS"));
    }

    #[test]
    fn outcome_lists_issues() {
        let outcome = validate_challenge(1, "");
        let rendered = render_outcome(1, &outcome);
        assert!(rendered.contains("NOT YET"));
        assert_eq!(rendered.matches("    - ").count(), outcome.issues.len());
    }
}
