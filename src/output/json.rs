use crate::error::Result;
use crate::report::ValidationReport;
use crate::rules::policy::PolicyVerdict;

use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    report: &'a ValidationReport,
    verdict: &'a PolicyVerdict,
}

/// Render a report and its verdict as JSON.
pub fn render(report: &ValidationReport, verdict: &PolicyVerdict) -> Result<String> {
    let json = serde_json::to_string_pretty(&JsonReport { report, verdict })?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::policy::Policy;
    use crate::{scan, Provider};

    #[test]
    fn report_round_trips_through_json() {
        let report = scan("", Provider::Aws, "rds");
        let verdict = Policy::default().evaluate(&report.findings);
        let rendered = render(&report, &verdict).unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let parsed: ValidationReport = serde_json::from_value(value["report"].clone()).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(value["verdict"]["pass"], serde_json::json!(verdict.pass));
    }
}
