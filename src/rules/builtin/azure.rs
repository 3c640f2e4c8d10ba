use crate::compliance::ComplianceTag;
use crate::rules::{
    AppliesTo, BestPracticePattern, Check, Impact, PracticeCategory, Rule, RuleCategory,
    Severity,
};
use crate::target::Provider;

fn rule(resource_type: &str, id: &str, severity: Severity, category: RuleCategory) -> Rule {
    Rule::new(
        id,
        AppliesTo::resource(Provider::Azure, resource_type),
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
        AppliesTo::resource(Provider::Azure, resource_type),
        category,
        impact,
    )
}

pub fn rules() -> Vec<Rule> {
    vec![
        // Storage accounts
        rule("storage_account", "AZ-ST-001", Severity::High, RuleCategory::Encryption)
            .with_check(Check::builtin(
                r"(enable_https_traffic_only|https_traffic_only_enabled)\s*=\s*false",
            ))
            .with_title("Storage account allows unencrypted HTTP traffic")
            .with_description("Requests over plain HTTP expose data and shared keys in transit.")
            .with_recommendation("Set https_traffic_only_enabled = true.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("storage_account", "AZ-ST-002", Severity::Medium, RuleCategory::Encryption)
            .with_check(Check::not(Check::builtin(r#"min_tls_version\s*=\s*"TLS1_[23]""#)))
            .with_title("Minimum TLS version is not enforced")
            .with_description("Clients may negotiate TLS 1.0 or 1.1.")
            .with_recommendation("Set min_tls_version = \"TLS1_2\".")
            .with_compliance(ComplianceTag::Cnas1),
        rule("storage_account", "AZ-ST-003", Severity::Critical, RuleCategory::AccessControl)
            .with_check(Check::builtin(
                r#"(allow_blob_public_access|allow_nested_items_to_be_public)\s*=\s*true|container_access_type\s*=\s*"(blob|container)""#,
            ))
            .with_title("Blob containers allow anonymous public access")
            .with_description("Blobs can be read without any credentials.")
            .with_recommendation("Set allow_nested_items_to_be_public = false and use SAS tokens or Entra ID.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("storage_account", "AZ-ST-004", Severity::Low, RuleCategory::Network)
            .with_check(Check::missing("network_rules"))
            .with_title("Storage account network rules are not configured")
            .with_description("The account accepts connections from every network.")
            .with_recommendation("Add network_rules with default_action = \"Deny\" and explicit subnets.")
            .with_compliance(ComplianceTag::Cnas6),
        // Virtual machines
        rule("virtual_machine", "AZ-VM-001", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::Any(vec![
                Check::builtin(r"disable_password_authentication\s*=\s*false"),
                Check::contains("admin_password"),
            ]))
            .with_title("Password authentication is enabled")
            .with_description("Password logins are open to brute-force attempts.")
            .with_recommendation("Use admin_ssh_key and set disable_password_authentication = true.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("virtual_machine", "AZ-VM-002", Severity::Medium, RuleCategory::Encryption)
            .with_check(Check::not(Check::builtin(
                r"encryption_at_host_enabled\s*=\s*true|disk_encryption_set_id",
            )))
            .with_title("Disk encryption is not configured")
            .with_description("Temporary disks and caches are not encrypted end to end.")
            .with_recommendation("Set encryption_at_host_enabled = true or attach a disk encryption set.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("virtual_machine", "AZ-VM-003", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::missing("boot_diagnostics"))
            .with_title("Boot diagnostics are disabled")
            .with_description("Console output and screenshots are unavailable when the VM fails to boot.")
            .with_recommendation("Add a boot_diagnostics block.")
            .with_compliance(ComplianceTag::Cnas10),
        // SQL
        rule("sql_database", "AZ-SQL-001", Severity::High, RuleCategory::Monitoring)
            .with_check(Check::not(Check::builtin(r"auditing_policy")))
            .with_title("SQL auditing is not enabled")
            .with_description("Database events are not written to an audit log.")
            .with_recommendation("Add azurerm_mssql_server_extended_auditing_policy targeting a storage account or Log Analytics.")
            .with_compliance(ComplianceTag::Cnas10),
        rule("sql_database", "AZ-SQL-002", Severity::Critical, RuleCategory::Network)
            .with_check(Check::builtin(
                r#"(?s)start_ip_address\s*=\s*"0\.0\.0\.0".*end_ip_address\s*=\s*"255\.255\.255\.255""#,
            ))
            .with_title("SQL firewall allows every IP address")
            .with_description("A firewall rule spans the entire IPv4 range.")
            .with_recommendation("Allow only application subnets, preferably through private endpoints.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("sql_database", "AZ-SQL-003", Severity::Medium, RuleCategory::Encryption)
            .with_check(Check::builtin(r"transparent_data_encryption_enabled\s*=\s*false"))
            .with_title("Transparent data encryption is disabled")
            .with_description("Database files and backups are stored unencrypted.")
            .with_recommendation("Remove the override or set transparent_data_encryption_enabled = true.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("sql_database", "AZ-SQL-004", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::builtin(r#"administrator_login_password\s*=\s*""#))
            .with_title("SQL administrator password is hardcoded")
            .with_description("The administrator password is stored in plain text in the configuration.")
            .with_recommendation("Use Entra ID authentication or read the password from Key Vault.")
            .with_compliance(ComplianceTag::Cnas5),
        // Network security groups
        rule("network_security_group", "AZ-NSG-001", Severity::Critical, RuleCategory::Network)
            .with_check(Check::All(vec![
                Check::builtin(r#"direction\s*=\s*"Inbound""#),
                Check::builtin(r#"access\s*=\s*"Allow""#),
                Check::builtin(r#"source_address_prefix\s*=\s*"(\*|0\.0\.0\.0/0|Internet)""#),
            ]))
            .with_title("NSG allows inbound traffic from any source")
            .with_description("An inbound allow rule matches every source address.")
            .with_recommendation("Restrict source_address_prefix to known ranges or service tags.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("network_security_group", "AZ-NSG-002", Severity::High, RuleCategory::Network)
            .with_check(Check::builtin(r#"destination_port_range\s*=\s*"(3389|22|\*)""#))
            .with_title("Remote administration ports are exposed")
            .with_description("RDP, SSH or every port is reachable through the group.")
            .with_recommendation("Use Azure Bastion or just-in-time VM access.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("network_security_group", "AZ-NSG-003", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::missing("flow_log"))
            .with_title("NSG flow logs are not configured")
            .with_description("Accepted and denied flows are not recorded.")
            .with_recommendation("Add azurerm_network_watcher_flow_log for the group.")
            .with_compliance(ComplianceTag::Cnas10),
    ]
}

pub fn practices() -> Vec<BestPracticePattern> {
    vec![
        BestPracticePattern::new(
            "BP-AZ-TAGS",
            AppliesTo::any_resource(Provider::Azure),
            PracticeCategory::Operational,
            Impact::Low,
        )
        .when(Check::missing("tags"))
        .with_title("Tag resources")
        .with_description("Tags drive cost management views and policy assignments.")
        .with_hint("Add tags = { environment = \"prod\", owner = \"team\" }."),
        practice("storage_account", "BP-AZ-ST-REDUNDANCY", PracticeCategory::Reliability, Impact::Medium)
            .when(Check::builtin(r#"account_replication_type\s*=\s*"LRS""#))
            .with_title("Use zone- or geo-redundant storage")
            .with_description("LRS keeps all copies in a single datacenter.")
            .with_hint("Set account_replication_type = \"ZRS\" or \"GRS\"."),
        practice("virtual_machine", "BP-AZ-VM-ZONES", PracticeCategory::Reliability, Impact::Medium)
            .with_title("Spread virtual machines across availability zones")
            .with_description("Zonal placement survives a datacenter failure.")
            .with_hint("Set zone on each VM, or use a scale set with zones = [\"1\", \"2\", \"3\"]."),
        practice("sql_database", "BP-AZ-SQL-GEO", PracticeCategory::Reliability, Impact::Medium)
            .with_title("Configure geo-replication or failover groups")
            .with_description("A secondary region keeps the database available during regional outages.")
            .with_hint("Add azurerm_mssql_failover_group with a partner server."),
        practice("network_security_group", "BP-AZ-NSG-ASG", PracticeCategory::Operational, Impact::Low)
            .with_title("Group targets with application security groups")
            .with_description("Rules written against ASGs stay valid as addresses change.")
            .with_hint("Use destination_application_security_group_ids in security rules."),
    ]
}
