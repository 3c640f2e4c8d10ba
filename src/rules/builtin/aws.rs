use crate::compliance::ComplianceTag;
use crate::rules::{
    AppliesTo, BestPracticePattern, Check, Impact, PracticeCategory, Rule, RuleCategory,
    Severity,
};
use crate::target::Provider;

fn rule(resource_type: &str, id: &str, severity: Severity, category: RuleCategory) -> Rule {
    Rule::new(
        id,
        AppliesTo::resource(Provider::Aws, resource_type),
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
        AppliesTo::resource(Provider::Aws, resource_type),
        category,
        impact,
    )
}

const INGRESS_FROM_ANYWHERE: &str = r#"(?s)ingress\s*\{[^}]*"0\.0\.0\.0/0""#;

pub fn rules() -> Vec<Rule> {
    vec![
        // S3
        rule("s3", "AWS-S3-001", Severity::High, RuleCategory::Encryption)
            .with_check(Check::missing("encryption"))
            .with_title("S3 bucket encryption is not configured")
            .with_description("Objects written to the bucket are stored without server-side encryption.")
            .with_recommendation(
                "Add a server_side_encryption_configuration block using aws:kms or AES256.",
            )
            .with_compliance(ComplianceTag::Cnas1),
        rule("s3", "AWS-S3-002", Severity::Critical, RuleCategory::AccessControl)
            .with_check(Check::builtin(r#"acl\s*=\s*"public-read(-write)?""#))
            .with_title("S3 bucket grants public access through its ACL")
            .with_description("A public-read or public-read-write canned ACL exposes every object to the internet.")
            .with_recommendation("Use the private ACL and grant access through bucket policies or CloudFront.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("s3", "AWS-S3-003", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::not(Check::builtin(
                r#"(?s)versioning\w*\s*\{[^}]*(enabled\s*=\s*true|status\s*=\s*"Enabled")"#,
            )))
            .with_title("S3 bucket versioning is disabled")
            .with_description("Overwritten or deleted objects cannot be recovered.")
            .with_recommendation("Enable versioning on the bucket.")
            .with_compliance(ComplianceTag::Cnas8),
        rule("s3", "AWS-S3-004", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::missing("logging"))
            .with_title("S3 access logging is disabled")
            .with_description("Requests made against the bucket are not recorded.")
            .with_recommendation("Add a logging block targeting a dedicated log bucket.")
            .with_compliance(ComplianceTag::Cnas10),
        rule("s3", "AWS-S3-005", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::builtin(
                r"(block_public_acls|block_public_policy|ignore_public_acls|restrict_public_buckets)\s*=\s*false",
            ))
            .with_title("S3 public access block is disabled")
            .with_description("The bucket's public access block explicitly allows public ACLs or policies.")
            .with_recommendation("Set all four public access block flags to true.")
            .with_compliance(ComplianceTag::Cnas3),
        // EC2
        rule("ec2", "AWS-EC2-001", Severity::High, RuleCategory::Encryption)
            .with_check(Check::not(Check::builtin(r"encrypted\s*=\s*true")))
            .with_title("EC2 root volume is not encrypted")
            .with_description("Data on the instance's block devices is stored unencrypted.")
            .with_recommendation("Set encrypted = true in root_block_device, or enable EBS encryption by default.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("ec2", "AWS-EC2-002", Severity::Medium, RuleCategory::AccessControl)
            .with_check(Check::not(Check::builtin(r#"http_tokens\s*=\s*"required""#)))
            .with_title("Instance metadata service v1 is enabled")
            .with_description("IMDSv1 allows credential theft through server-side request forgery.")
            .with_recommendation("Add metadata_options with http_tokens = \"required\".")
            .with_compliance(ComplianceTag::Cnas3),
        rule("ec2", "AWS-EC2-003", Severity::Critical, RuleCategory::AccessControl)
            .with_check(Check::builtin(
                r#"(?i)(aws_secret_access_key|aws_access_key_id|password)\s*[=:]\s*"?[A-Za-z0-9/+]{6,}"#,
            ))
            .with_title("Hardcoded credentials in instance configuration")
            .with_description("Credentials embedded in user data or tags are readable by anyone with describe access.")
            .with_recommendation("Attach an IAM instance profile and read secrets from Secrets Manager at boot.")
            .with_compliance(ComplianceTag::Cnas5),
        rule("ec2", "AWS-EC2-004", Severity::Low, RuleCategory::Monitoring)
            .with_check(Check::not(Check::builtin(r"(?m)^\s*monitoring\s*=\s*true")))
            .with_title("Detailed monitoring is disabled")
            .with_description("CloudWatch only receives five-minute metrics for the instance.")
            .with_recommendation("Set monitoring = true.")
            .with_compliance(ComplianceTag::Cnas10),
        rule("ec2", "AWS-EC2-005", Severity::Medium, RuleCategory::Network)
            .with_check(Check::builtin(r"associate_public_ip_address\s*=\s*true"))
            .with_title("Instance has a public IP address")
            .with_description("The instance is directly addressable from the internet.")
            .with_recommendation("Place the instance in a private subnet behind a load balancer or bastion.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("ec2", "AWS-EC2-006", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::builtin(r"(curl|wget)[^|\n]*\|\s*(sudo\s+)?(ba)?sh"))
            .with_title("User data pipes a remote script into a shell")
            .with_description("Boot-time code is fetched and executed without integrity verification.")
            .with_recommendation("Bake dependencies into the AMI or verify a checksum before executing downloads.")
            .with_compliance(ComplianceTag::Cnas4),
        // RDS
        rule("rds", "AWS-RDS-001", Severity::High, RuleCategory::Encryption)
            .with_check(Check::not(Check::builtin(r"storage_encrypted\s*=\s*true")))
            .with_title("RDS storage is not encrypted")
            .with_description("Database storage, snapshots and replicas are unencrypted at rest.")
            .with_recommendation("Set storage_encrypted = true and optionally a kms_key_id.")
            .with_compliance(ComplianceTag::Cnas1),
        rule("rds", "AWS-RDS-002", Severity::Critical, RuleCategory::Network)
            .with_check(Check::builtin(r"publicly_accessible\s*=\s*true"))
            .with_title("RDS instance is publicly accessible")
            .with_description("The database endpoint resolves to a public address.")
            .with_recommendation("Set publicly_accessible = false and connect through private networking.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("rds", "AWS-RDS-003", Severity::Medium, RuleCategory::Configuration)
            .with_check(Check::Any(vec![
                Check::missing("backup_retention_period"),
                Check::builtin(r"backup_retention_period\s*=\s*0\b"),
            ]))
            .with_title("Automated backups are disabled")
            .with_description("Without a retention period the database cannot be restored to a point in time.")
            .with_recommendation("Set backup_retention_period to at least 7 days.")
            .with_compliance(ComplianceTag::Cnas8),
        rule("rds", "AWS-RDS-004", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::builtin(r#"(?m)^\s*password\s*=\s*""#))
            .with_title("Database password is hardcoded")
            .with_description("The master password is stored in plain text in the configuration and state.")
            .with_recommendation("Use manage_master_user_password = true or reference Secrets Manager.")
            .with_compliance(ComplianceTag::Cnas5),
        rule("rds", "AWS-RDS-005", Severity::Low, RuleCategory::Configuration)
            .with_check(Check::not(Check::builtin(r"deletion_protection\s*=\s*true")))
            .with_title("Deletion protection is disabled")
            .with_description("The database can be destroyed by a single apply.")
            .with_recommendation("Set deletion_protection = true.")
            .with_compliance(ComplianceTag::Cnas8),
        // IAM
        rule("iam", "AWS-IAM-001", Severity::Critical, RuleCategory::AccessControl)
            .with_check(Check::builtin(
                r#""Action"\s*:\s*\[?\s*"\*"|actions\s*=\s*\[\s*"\*"\s*\]"#,
            ))
            .with_title("IAM policy grants wildcard actions")
            .with_description("The policy allows every API action of every service.")
            .with_recommendation("List only the actions the principal needs.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("iam", "AWS-IAM-002", Severity::High, RuleCategory::AccessControl)
            .with_check(Check::builtin(
                r#""Resource"\s*:\s*\[?\s*"\*"|resources\s*=\s*\[\s*"\*"\s*\]"#,
            ))
            .with_title("IAM policy applies to all resources")
            .with_description("Granted actions apply to every resource in the account.")
            .with_recommendation("Scope the Resource element to specific ARNs.")
            .with_compliance(ComplianceTag::Cnas3),
        rule("iam", "AWS-IAM-003", Severity::Medium, RuleCategory::AccessControl)
            .with_check(Check::All(vec![
                Check::contains("Allow"),
                Check::not(Check::builtin(r#"(?i)"?condition"?\s*[:={]"#)),
            ]))
            .with_title("Policy statements have no conditions")
            .with_description("Allow statements apply regardless of source network, MFA or tags.")
            .with_recommendation("Add Condition keys such as aws:SourceVpc or aws:MultiFactorAuthPresent.")
            .with_compliance(ComplianceTag::Cnas3),
        // Security groups
        rule("security_group", "AWS-SG-001", Severity::Critical, RuleCategory::Network)
            .with_check(Check::builtin(INGRESS_FROM_ANYWHERE))
            .with_title("Security group allows ingress from anywhere")
            .with_description("An ingress rule accepts traffic from 0.0.0.0/0.")
            .with_recommendation("Restrict cidr_blocks to known address ranges.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("security_group", "AWS-SG-002", Severity::High, RuleCategory::Network)
            .with_check(Check::All(vec![
                Check::builtin(r"from_port\s*=\s*22\b"),
                Check::builtin(INGRESS_FROM_ANYWHERE),
            ]))
            .with_title("SSH is open to the internet")
            .with_description("Port 22 is reachable from any address.")
            .with_recommendation("Use Session Manager or restrict SSH to a bastion's address range.")
            .with_compliance(ComplianceTag::Cnas6),
        rule("security_group", "AWS-SG-003", Severity::Low, RuleCategory::Configuration)
            .with_check(Check::missing("description"))
            .with_title("Security group has no description")
            .with_description("Undocumented rules are hard to audit and clean up.")
            .with_recommendation("Describe the group and each of its rules.")
            .with_compliance(ComplianceTag::Cnas8),
        rule("security_group", "AWS-SG-004", Severity::Medium, RuleCategory::Network)
            .with_check(Check::builtin(r#"protocol\s*=\s*"(-1|all)""#))
            .with_title("Security group allows all protocols")
            .with_description("A rule matches every protocol and port.")
            .with_recommendation("Specify tcp or udp with an explicit port range.")
            .with_compliance(ComplianceTag::Cnas6),
    ]
}

pub fn practices() -> Vec<BestPracticePattern> {
    vec![
        BestPracticePattern::new(
            "BP-AWS-TAGS",
            AppliesTo::any_resource(Provider::Aws),
            PracticeCategory::Operational,
            Impact::Low,
        )
        .when(Check::missing("tags"))
        .with_title("Tag resources")
        .with_description("Tags drive cost allocation, ownership and automation.")
        .with_hint("Add tags = { Environment = \"prod\", Owner = \"team\" } or use provider default_tags."),
        practice("s3", "BP-S3-LIFECYCLE", PracticeCategory::Cost, Impact::Medium)
            .with_title("Configure a lifecycle policy")
            .with_description("Transition infrequently accessed objects to cheaper storage classes.")
            .with_hint("Add aws_s3_bucket_lifecycle_configuration with STANDARD_IA and GLACIER transitions."),
        practice("s3", "BP-S3-REPLICATION", PracticeCategory::Reliability, Impact::Low)
            .when(Check::missing("replication"))
            .with_title("Replicate critical buckets")
            .with_description("Cross-region replication protects against regional outages.")
            .with_hint("Add aws_s3_bucket_replication_configuration to a bucket in another region."),
        practice("ec2", "BP-EC2-RIGHTSIZE", PracticeCategory::Cost, Impact::Medium)
            .with_title("Right-size the instance type")
            .with_description("Oversized instances are the most common source of wasted compute spend.")
            .with_hint("Review Compute Optimizer recommendations and consider Graviton instance families."),
        practice("ec2", "BP-EC2-EBS-OPTIMIZED", PracticeCategory::Performance, Impact::Low)
            .when(Check::missing("ebs_optimized"))
            .with_title("Enable EBS optimization")
            .with_description("Dedicated EBS bandwidth avoids contention with network traffic.")
            .with_hint("Set ebs_optimized = true."),
        practice("rds", "BP-RDS-MULTI-AZ", PracticeCategory::Reliability, Impact::High)
            .when(Check::not(Check::builtin(r"multi_az\s*=\s*true")))
            .with_title("Run the database in multiple availability zones")
            .with_description("A standby replica gives automatic failover.")
            .with_hint("Set multi_az = true."),
        practice("rds", "BP-RDS-INSIGHTS", PracticeCategory::Performance, Impact::Medium)
            .when(Check::missing("performance_insights_enabled"))
            .with_title("Enable Performance Insights")
            .with_description("Query-level metrics make slow database load easy to diagnose.")
            .with_hint("Set performance_insights_enabled = true."),
        practice("iam", "BP-IAM-ANALYZER", PracticeCategory::Security, Impact::High)
            .with_title("Review policies with IAM Access Analyzer")
            .with_description("Generated least-privilege policies replace guessed ones.")
            .with_hint("Run access-analyzer policy generation against CloudTrail activity."),
        practice("security_group", "BP-SG-REFERENCES", PracticeCategory::Security, Impact::Medium)
            .with_title("Reference security groups instead of CIDR ranges")
            .with_description("Group references follow instances as they scale and move.")
            .with_hint("Use source_security_group_id in aws_security_group_rule."),
    ]
}
