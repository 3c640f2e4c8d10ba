use crate::compliance::ComplianceTag;
use crate::rules::{
    AppliesTo, BestPracticePattern, Check, Impact, PracticeCategory, Rule, RuleCategory,
    Severity,
};
use crate::target::Provider;

fn rule(resource_type: &str, id: &str, severity: Severity, category: RuleCategory) -> Rule {
    Rule::new(
        id,
        AppliesTo::resource(Provider::Gcp, resource_type),
        severity,
        category,
    )
}

fn practice(
    resource_type: &str,
    id: &str,
    category: PracticeCategory,
    impact: Impact,
) -> BestPracticePattern {
    BestPracticePattern::new(
        id,
        AppliesTo::resource(Provider::Gcp, resource_type),
        category,
        impact,
    )
}

pub fn rules() -> Vec<Rule> {
    vec![
        // Cloud Storage
        rule("storage_bucket", "GCP-GCS-001", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::not(Check::builtin(r"uniform_bucket_level_access\s*=\s*true")))
            .with_title("Uniform bucket-level access is disabled")
            .with_description("Per-object ACLs make effective permissions hard to reason about.")
            .with_recommendation("Set uniform_bucket_level_access = true.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("storage_bucket", "GCP-GCS-002", Severity::Critical, RuleCategory::AccessControl)
            .with_check(Check::builtin(r#""allUsers"|"allAuthenticatedUsers""#))
            .with_title("Bucket is publicly readable")
            .with_description("An IAM binding grants access to allUsers or allAuthenticatedUsers.")
            .with_recommendation("Remove public members and serve public content through Cloud CDN.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("storage_bucket", "GCP-GCS-003", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::not(Check::builtin(r"(?s)versioning\s*\{[^}]*enabled\s*=\s*true")))
            .with_title("Object versioning is disabled")
            .with_description("Overwritten or deleted objects cannot be recovered.")
            .with_recommendation("Add versioning { enabled = true }.")
            .with_compliance(ComplianceTag::Cnas8),
        rule("storage_bucket", "GCP-GCS-004", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::missing("logging"))
            .with_title("Bucket access logging is not configured")
            .with_description("Usage and storage logs are not exported.")
            .with_recommendation("Add a logging block with a log_bucket.")
            .with_compliance(ComplianceTag::Cnas10),
        // Compute Engine
        rule("compute_instance", "GCP-GCE-001", Severity::High, RuleCategory::Network)
            .with_check(Check::contains("access_config"))
            .with_title("Instance has an external IP address")
            .with_description("An access_config block assigns a public address.")
            .with_recommendation("Remove access_config and reach the instance through IAP or Cloud NAT.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("compute_instance", "GCP-GCE-002", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::missing("shielded_instance_config"))
            .with_title("Shielded VM is not enabled")
            .with_description("Secure boot and integrity monitoring are off.")
            .with_recommendation("Add shielded_instance_config with enable_secure_boot = true.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("compute_instance", "GCP-GCE-003", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::contains("cloud-platform"))
            .with_title("Service account has full cloud-platform scope")
            .with_description("The instance can call every Google Cloud API its service account allows.")
            .with_recommendation("Use a dedicated service account with narrowly granted roles.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("compute_instance", "GCP-GCE-004", Severity::Medium, RuleCategory::AccessControl)
            .with_check(Check::not(Check::builtin(r#"block-project-ssh-keys"?\s*=\s*"?true"#)))
            .with_title("Project-wide SSH keys are allowed")
            .with_description("Any key added to project metadata grants access to this instance.")
            .with_recommendation("Set metadata block-project-ssh-keys = true or use OS Login.")
            .with_compliance(ComplianceTag::Cnas3),
        // Cloud SQL
        rule("cloud_sql", "GCP-SQL-001", Severity::Critical, RuleCategory::Network)
            .with_check(Check::builtin(r#"value\s*=\s*"0\.0\.0\.0/0""#))
            .with_title("Cloud SQL authorized network is open to the internet")
            .with_description("An authorized network admits every IPv4 address.")
            .with_recommendation("Use private IP or the Cloud SQL Auth Proxy instead of authorized networks.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("cloud_sql", "GCP-SQL-002", Severity::High, RuleCategory::Encryption)
            .with_check(Check::not(Check::builtin(
                r#"require_ssl\s*=\s*true|ssl_mode\s*=\s*"(ENCRYPTED_ONLY|TRUSTED_CLIENT_CERTIFICATE_REQUIRED)""#,
            )))
            .with_title("SSL is not required for connections")
            .with_description("Clients may connect over unencrypted channels.")
            .with_recommendation("Set ssl_mode = \"ENCRYPTED_ONLY\" in ip_configuration.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("cloud_sql", "GCP-SQL-003", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::not(Check::builtin(
                r"(?s)backup_configuration\s*\{[^}]*enabled\s*=\s*true",
            )))
            .with_title("Automated backups are disabled")
            .with_description("The instance has no scheduled backups.")
            .with_recommendation("Add backup_configuration { enabled = true }.")
            .with_compliance(ComplianceTag::Cnas8),
        rule("cloud_sql", "GCP-SQL-004", Severity::Low, RuleCategory::Configuration)
            .with_check(Check::builtin(r"deletion_protection\s*=\s*false"))
            .with_title("Deletion protection is disabled")
            .with_description("The instance can be destroyed by a single apply.")
            .with_recommendation("Leave deletion_protection at its default of true.")
            .with_compliance(ComplianceTag::Cnas8),
        // Firewall
        rule("firewall", "GCP-FW-001", Severity::Critical, RuleCategory::Network)
            .with_check(Check::builtin(r#"source_ranges\s*=\s*\[[^\]]*"0\.0\.0\.0/0""#))
            .with_title("Firewall allows traffic from anywhere")
            .with_description("The rule's source ranges include 0.0.0.0/0.")
            .with_recommendation("Restrict source_ranges, or use IAP's 35.235.240.0/20 for administrative access.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("firewall", "GCP-FW-002", Severity::High, RuleCategory::Network)
            .with_check(Check::Any(vec![
                Check::builtin(r#"protocol\s*=\s*"all""#),
                Check::contains("\"0-65535\""),
            ]))
            .with_title("Firewall opens all ports")
            .with_description("The rule matches every protocol or the full port range.")
            .with_recommendation("List the specific protocols and ports the workload serves.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("firewall", "GCP-FW-003", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::missing("log_config"))
            .with_title("Firewall rule logging is disabled")
            .with_description("Connections matched by the rule are not logged.")
            .with_recommendation("Add log_config { metadata = \"INCLUDE_ALL_METADATA\" }.")
            .with_compliance(ComplianceTag::Cnas10),
        // GKE
        rule("gke_cluster", "GCP-GKE-001", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::builtin(r"enable_legacy_abac\s*=\s*true"))
            .with_title("Legacy ABAC authorization is enabled")
            .with_description("ABAC grants broad, static permissions that bypass RBAC.")
            .with_recommendation("Set enable_legacy_abac = false and rely on RBAC.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("gke_cluster", "GCP-GKE-002", Severity::Medium, RuleCategory::Network)
            .with_check(Check::not(Check::builtin(
                r"(?s)network_policy\s*\{[^}]*enabled\s*=\s*true|datapath_provider\s*=\s*\x22ADVANCED_DATAPATH\x22",
            )))
            .with_title("Network policy enforcement is disabled")
            .with_description("Every pod can reach every other pod in the cluster.")
            .with_recommendation("Enable network_policy or Dataplane V2.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("gke_cluster", "GCP-GKE-003", Severity::High, RuleCategory::Network)
            .with_check(Check::missing("private_cluster_config"))
            .with_title("Cluster nodes have public IP addresses")
            .with_description("Without a private cluster config nodes are internet-addressable.")
            .with_recommendation("Add private_cluster_config with enable_private_nodes = true.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("gke_cluster", "GCP-GKE-004", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::builtin(r"auto_upgrade\s*=\s*false"))
            .with_title("Node auto-upgrade is disabled")
            .with_description("Nodes keep running Kubernetes versions with known vulnerabilities.")
            .with_recommendation("Set auto_upgrade = true in node pool management.")
            .with_compliance(ComplianceTag::Cnas7),
        rule("gke_cluster", "GCP-GKE-005", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::builtin(r#"(logging|monitoring)_service\s*=\s*"none""#))
            .with_title("Cluster logging or monitoring is disabled")
            .with_description("Control plane and workload telemetry is discarded.")
            .with_recommendation("Use the default Cloud Logging and Cloud Monitoring services.")
            .with_compliance(ComplianceTag::Cnas10),
        rule("gke_cluster", "GCP-GKE-006", Severity::Low, RuleCategory::Configuration)
            .with_check(Check::All(vec![
                Check::contains("node_pool"),
                Check::missing("max_node_count"),
            ]))
            .with_title("Node pool has no autoscaling ceiling")
            .with_description("Without an upper bound a runaway workload can exhaust quota and budget.")
            .with_recommendation("Add autoscaling { min_node_count, max_node_count } to each node pool.")
            .with_compliance(ComplianceTag::Cnas9),
    ]
}

pub fn practices() -> Vec<BestPracticePattern> {
    vec![
        BestPracticePattern::new(
            "BP-GCP-LABELS",
            AppliesTo::any_resource(Provider::Gcp),
            PracticeCategory::Operational,
            Impact::Low,
        )
        .when(Check::missing("labels"))
        .with_title("Label resources")
        .with_description("Labels drive billing breakdowns and resource filtering.")
        .with_hint("Add labels = { env = \"prod\", team = \"platform\" }."),
        practice("storage_bucket", "BP-GCS-LIFECYCLE", PracticeCategory::Cost, Impact::Medium)
            .when(Check::missing("lifecycle_rule"))
            .with_title("Configure lifecycle rules")
            .with_description("Age out or reclassify objects that are no longer read.")
            .with_hint("Add lifecycle_rule with a SetStorageClass or Delete action."),
        practice("compute_instance", "BP-GCE-SPOT", PracticeCategory::Cost, Impact::Low)
            .with_title("Consider Spot VMs for fault-tolerant workloads")
            .with_description("Spot capacity costs a fraction of on-demand pricing.")
            .with_hint("Set scheduling { provisioning_model = \"SPOT\" } for batch and stateless jobs."),
        practice("cloud_sql", "BP-SQL-HA", PracticeCategory::Reliability, Impact::High)
            .when(Check::not(Check::builtin(r#"availability_type\s*=\s*"REGIONAL""#)))
            .with_title("Use a regional (high availability) instance")
            .with_description("A standby in another zone gives automatic failover.")
            .with_hint("Set availability_type = \"REGIONAL\" in settings."),
        practice("firewall", "BP-FW-PRIORITY", PracticeCategory::Operational, Impact::Low)
            .with_title("Set explicit rule priorities")
            .with_description("Explicit priorities make rule evaluation order obvious.")
            .with_hint("Give deny rules a lower priority number than allow rules."),
        practice("gke_cluster", "BP-GKE-AUTOSCALING", PracticeCategory::Performance, Impact::Medium)
            .when(Check::missing("autoscaling"))
            .with_title("Enable node pool autoscaling")
            .with_description("Capacity follows demand instead of being sized for peak.")
            .with_hint("Add autoscaling to node pools or enable cluster_autoscaling."),
        practice("gke_cluster", "BP-GKE-RELEASE-CHANNEL", PracticeCategory::Operational, Impact::Low)
            .with_title("Subscribe to a release channel")
            .with_description("Release channels keep control plane and nodes on supported versions.")
            .with_hint("Add release_channel { channel = \"REGULAR\" }."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleEngine;
    use crate::target::ScanTarget;

    fn fired(text: &str, resource_type: &str) -> Vec<String> {
        let engine = RuleEngine::new();
        let target = ScanTarget::new(text, Provider::Gcp, resource_type);
        engine.evaluate(&target).into_iter().map(|f| f.rule_id).collect()
    }

    #[test]
    fn public_bucket_binding_flagged() {
        let text = r#"
resource "google_storage_bucket_iam_member" "public" {
  role   = "roles/storage.objectViewer"
  member = "allUsers"
}
"#;
        assert!(fired(text, "storage_bucket").contains(&"GCP-GCS-002".to_string()));
    }

    #[test]
    fn open_firewall_flagged() {
        let text = r#"
resource "google_compute_firewall" "ssh" {
  source_ranges = ["0.0.0.0/0"]
  allow {
    protocol = "tcp"
    ports    = ["22"]
  }
  log_config {
    metadata = "INCLUDE_ALL_METADATA"
  }
}
"#;
        assert_eq!(fired(text, "firewall"), vec!["GCP-FW-001"]);
    }

    #[test]
    fn hardened_cluster_is_clean() {
        let text = r#"
resource "google_container_cluster" "main" {
  enable_legacy_abac = false
  network_policy {
    enabled = true
  }
  private_cluster_config {
    enable_private_nodes = true
  }
}
"#;
        assert!(fired(text, "gke_cluster").is_empty());
    }

    #[test]
    fn unbounded_node_pool_flagged() {
        let text = "node_pool {\n  name = \"default\"\n}\nprivate_cluster_config {}\nnetwork_policy {\n  enabled = true\n}\n";
        assert_eq!(fired(text, "gke_cluster"), vec!["GCP-GKE-006"]);
    }
}
