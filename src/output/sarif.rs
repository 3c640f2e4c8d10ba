use crate::error::Result;
use crate::report::ValidationReport;
use crate::rules::Severity;

use serde_json::{json, Value};

/// Render a report as SARIF 2.1.0.
///
/// Produces a self-contained SARIF log compatible with GitHub Code Scanning
/// and other SARIF consumers. Findings are reported against `target_name`
/// since rules match whole snippets rather than lines.
pub fn render(report: &ValidationReport, target_name: &str) -> Result<String> {
    let rules: Vec<Value> = report
        .findings
        .iter()
        .map(|f| {
            let mut rule = json!({
                "id": f.rule_id,
                "name": f.title,
                "shortDescription": { "text": f.title },
                "fullDescription": { "text": f.description },
                "help": { "text": f.recommendation },
                "defaultConfiguration": {
                    "level": severity_to_sarif_level(f.severity),
                },
            });
            if let Some(tag) = f.compliance_tag {
                rule["properties"] = json!({
                    "tags": [tag.id(), f.category.to_string()],
                });
            }
            rule
        })
        .collect();

    let results: Vec<Value> = report
        .findings
        .iter()
        .enumerate()
        .map(|(index, f)| {
            json!({
                "ruleId": f.rule_id,
                "ruleIndex": index,
                "level": severity_to_sarif_level(f.severity),
                "message": { "text": format!("{}. {}", f.title, f.description) },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": target_name },
                    },
                    "logicalLocations": f
                        .affected_resources
                        .iter()
                        .map(|r| json!({ "fullyQualifiedName": r }))
                        .collect::<Vec<_>>(),
                }],
                "fixes": [{
                    "description": { "text": f.recommendation },
                }],
            })
        })
        .collect();

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "InfraGuard",
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "invocations": [{
                "executionSuccessful": true,
                "endTimeUtc": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            }],
            "results": results,
            "automationDetails": {
                "id": format!("infraguard/{}", target_name),
                "guid": uuid::Uuid::new_v4().to_string(),
            },
            "properties": {
                "score": report.score,
                "inputDigest": report.input_digest,
            },
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scan, Provider};

    #[test]
    fn results_reference_rules() {
        let report = scan("", Provider::Aws, "s3");
        let rendered = render(&report, "bucket.tf").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let run = &value["runs"][0];
        let rules = run["tool"]["driver"]["rules"].as_array().unwrap();
        let results = run["results"].as_array().unwrap();
        assert_eq!(rules.len(), report.findings.len());
        assert_eq!(results.len(), report.findings.len());
        assert_eq!(results[0]["ruleId"], rules[0]["id"]);
        assert_eq!(results[0]["level"], "error");
        assert_eq!(run["properties"]["score"], 70);
    }
}
