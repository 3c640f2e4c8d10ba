use proptest::prelude::*;

use infraguard::challenge::{ChallengeSession, ChallengeValidator, SessionState};
use infraguard::rules::RuleEngine;
use infraguard::scoring::{self, MAX_SCORE};
use infraguard::{live_hint, scan, validate_challenge, Provider};

/// Snippet fragments that toggle built-in rules on and off.
const FRAGMENTS: &[&str] = &[
    "resource \"aws_s3_bucket\" \"b\" {\n",
    "resource \"google_container_cluster\" \"c\" {\n",
    "resource \"azurerm_storage_account\" \"s\" {\n",
    "}\n",
    "  acl = \"public-read\"\n",
    "  acl = \"private\"\n",
    "  versioning {\n    enabled = true\n  }\n",
    "  logging {\n    target_bucket = \"logs\"\n  }\n",
    "  server_side_encryption_configuration {}\n",
    "  encrypted = true\n",
    "  publicly_accessible = true\n",
    "  enable_legacy_abac = true\n",
    "  private_cluster_config {}\n",
    "  node_pool {}\n",
    "  min_tls_version = \"TLS1_0\"\n",
    "  tags = { Team = \"x\" }\n",
    "kind: Service\n",
    "spec:\n  type: NodePort\n",
    "spec:\n  type: ClusterIP\n",
    "    securityContext:\n      privileged: true\n",
    "      allowPrivilegeEscalation: false\n",
    "  image: nginx:latest\n",
    "  replicas: 3\n",
];

const CONTEXTS: &[(Provider, &str)] = &[
    (Provider::Aws, "s3"),
    (Provider::Aws, "aws_s3_bucket"),
    (Provider::Aws, "ec2"),
    (Provider::Aws, "rds"),
    (Provider::Aws, "iam"),
    (Provider::Aws, "security_group"),
    (Provider::Azure, "storage_account"),
    (Provider::Azure, "virtual_machine"),
    (Provider::Azure, "sql_database"),
    (Provider::Azure, "network_security_group"),
    (Provider::Gcp, "storage_bucket"),
    (Provider::Gcp, "compute_instance"),
    (Provider::Gcp, "cloud_sql"),
    (Provider::Gcp, "firewall"),
    (Provider::Gcp, "gke_cluster"),
    (Provider::Gcp, "mainframe"),
];

fn snippet() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::collection::vec(prop::sample::select(FRAGMENTS), 0..10).prop_map(|parts| parts.concat()),
        "[ -~\n]{0,160}",
        "\\PC{0,160}",
        any::<String>(),
    ]
}

fn context() -> impl Strategy<Value = (Provider, &'static str)> {
    prop::sample::select(CONTEXTS)
}

/// Catalogue ids, their neighbours, and ids far outside the catalogue.
fn challenge_id() -> impl Strategy<Value = u32> {
    prop_oneof![0u32..48, Just(9_999), any::<u32>()]
}

proptest! {
    #[test]
    fn scanning_is_deterministic(text in snippet(), (provider, rt) in context()) {
        prop_assert_eq!(scan(&text, provider, rt), scan(&text, provider, rt));
    }

    #[test]
    fn checklist_agrees_with_findings(text in snippet(), (provider, rt) in context()) {
        let report = scan(&text, provider, rt);
        for entry in &report.compliance_checklist {
            let titles: Vec<&str> = report
                .findings
                .iter()
                .filter(|f| f.compliance_tag == Some(entry.tag))
                .map(|f| f.title.as_str())
                .collect();
            prop_assert_eq!(entry.compliant, titles.is_empty());
            prop_assert_eq!(&entry.violating_finding_titles, &titles);
        }
    }

    #[test]
    fn score_never_rises_with_more_findings(text in snippet(), (provider, rt) in context()) {
        let report = scan(&text, provider, rt);
        prop_assert!(report.score <= MAX_SCORE);
        prop_assert_eq!(report.score, scoring::score(&report.findings));
        for skip in 0..report.findings.len() {
            let mut fewer = report.findings.clone();
            fewer.remove(skip);
            prop_assert!(scoring::score(&fewer) >= report.score);
        }
    }

    #[test]
    fn findings_come_from_applicable_rules(text in snippet(), (provider, rt) in context()) {
        let engine = RuleEngine::new();
        let applicable: Vec<String> = engine
            .registry()
            .rules_for(provider, rt)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let report = engine.scan(&text, provider, rt);
        for finding in &report.findings {
            prop_assert!(applicable.contains(&finding.rule_id));
        }
    }

    #[test]
    fn live_hint_agrees_with_validation(id in challenge_id(), text in snippet()) {
        let outcome = validate_challenge(id, &text);
        let hint = live_hint(id, &text);
        prop_assert_eq!(hint.likely_correct, outcome.pass);
        prop_assert_eq!(outcome.pass, outcome.issues.is_empty());

        let original = ChallengeValidator::builtin().original_text(id);
        prop_assert_eq!(hint.has_changes, text != original);
    }

    #[test]
    fn reset_is_idempotent(id in challenge_id(), edits in prop::collection::vec(snippet(), 0..4)) {
        let validator = ChallengeValidator::builtin();
        let mut session = ChallengeSession::start(validator, id);
        for edit in edits {
            session.edit(edit);
            session.submit();
        }
        session.reset();
        let once = session.text().to_string();
        session.reset();
        prop_assert_eq!(session.text(), once.as_str());
        prop_assert_eq!(session.text(), validator.original_text(id));
        prop_assert_eq!(session.state(), SessionState::Unmodified);
    }
}

#[test]
fn fallback_is_total_on_empty_input() {
    for id in [0, 1, 13, 15, 22, 40, 41, 9_999, u32::MAX] {
        let outcome = validate_challenge(id, "");
        assert!(!outcome.pass, "challenge {id} accepts empty input");
        assert!(!outcome.issues.is_empty());
        assert!(!live_hint(id, "").likely_correct);
    }
}

#[test]
fn multibyte_text_is_handled() {
    let original = ChallengeValidator::builtin().original_text(15);
    let edited = format!("{original}  описание: \"настройки (кэш)\"\n  メモ: 日本語のコメント\n");
    let outcome = validate_challenge(15, &edited);
    assert!(outcome.pass, "{:?}", outcome.issues);
    assert!(live_hint(15, &edited).likely_correct);
    assert!(!validate_challenge(15, "ü{ß").pass);
}
