//! Context detection: maps Terraform resource type names onto the
//! registry's `(provider, resource type)` keys.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::target::Provider;

/// Terraform resource type -> (provider, canonical resource type).
const TERRAFORM_TYPES: &[(&str, Provider, &str)] = &[
    ("aws_s3_bucket", Provider::Aws, "s3"),
    ("aws_instance", Provider::Aws, "ec2"),
    ("aws_db_instance", Provider::Aws, "rds"),
    ("aws_iam_policy", Provider::Aws, "iam"),
    ("aws_iam_role_policy", Provider::Aws, "iam"),
    ("aws_iam_user_policy", Provider::Aws, "iam"),
    ("aws_security_group", Provider::Aws, "security_group"),
    ("azurerm_storage_account", Provider::Azure, "storage_account"),
    ("azurerm_linux_virtual_machine", Provider::Azure, "virtual_machine"),
    ("azurerm_windows_virtual_machine", Provider::Azure, "virtual_machine"),
    ("azurerm_virtual_machine", Provider::Azure, "virtual_machine"),
    ("azurerm_mssql_server", Provider::Azure, "sql_database"),
    ("azurerm_mssql_database", Provider::Azure, "sql_database"),
    ("azurerm_sql_server", Provider::Azure, "sql_database"),
    ("azurerm_network_security_group", Provider::Azure, "network_security_group"),
    ("google_storage_bucket", Provider::Gcp, "storage_bucket"),
    ("google_compute_instance", Provider::Gcp, "compute_instance"),
    ("google_sql_database_instance", Provider::Gcp, "cloud_sql"),
    ("google_compute_firewall", Provider::Gcp, "firewall"),
    ("google_container_cluster", Provider::Gcp, "gke_cluster"),
];

static RESOURCE_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*resource\s+"([A-Za-z0-9_-]+)""#).unwrap());

/// Normalize a resource type name for registry lookup.
///
/// Accepts the registry key itself in any case, or a Terraform type name
/// belonging to `provider`. Anything else is returned lowercased so an
/// unknown type simply matches no rules.
pub fn canonical_resource_type(provider: Provider, resource_type: &str) -> String {
    let normalized = resource_type.trim().to_lowercase();
    TERRAFORM_TYPES
        .iter()
        .find(|(tf, p, _)| *p == provider && *tf == normalized)
        .map(|(_, _, key)| (*key).to_string())
        .unwrap_or(normalized)
}

/// Infer the context from the first recognized Terraform resource header.
pub fn detect_context(text: &str) -> Option<(Provider, String)> {
    RESOURCE_HEADER_RE.captures_iter(text).find_map(|cap| {
        TERRAFORM_TYPES
            .iter()
            .find(|(tf, _, _)| *tf == &cap[1])
            .map(|(_, provider, key)| (*provider, (*key).to_string()))
    })
}
