//! Built-in challenge table.
//!
//! Requirement sets are named functions so that challenges sharing the same
//! fix (1, 22 and 40 all expose a Service outside the cluster) share one
//! definition.

use crate::rules::Check;

use super::{ChallengeSpec, Requirement};

fn met_when(name: &str, pattern: &str, issue: &str) -> Requirement {
    Requirement::new(name, Check::builtin(pattern), issue)
}

fn met_unless(name: &str, pattern: &str, issue: &str) -> Requirement {
    Requirement::new(name, Check::not(Check::builtin(pattern)), issue)
}

pub fn external_service_access() -> Vec<Requirement> {
    vec![
        met_unless(
            "drops-cluster-ip",
            r"(?m)^\s*type:\s*ClusterIP\b",
            "Service type ClusterIP restricts access to inside the cluster; external clients cannot reach it.",
        ),
        met_when(
            "exposes-node-port",
            r"(?m)^\s*type:\s*NodePort\b",
            "Set the Service type to NodePort so the application is reachable from outside the cluster.",
        ),
    ]
}

pub fn unprivileged_container() -> Vec<Requirement> {
    vec![
        met_unless(
            "not-privileged",
            r"privileged:\s*true",
            "The container still runs in privileged mode, giving it full access to the host.",
        ),
        met_when(
            "no-privilege-escalation",
            r"allowPrivilegeEscalation:\s*false",
            "Add allowPrivilegeEscalation: false to the container's securityContext.",
        ),
    ]
}

/// A numeric `key` inside a container's `limits:` block, either as an
/// indented mapping of scalar entries or as a flow mapping. A sibling block
/// header such as `requests:` ends the search.
fn limit_pattern(key: &str) -> String {
    format!(
        r#"(?m)^[ \t]*limits:[ \t]*(?:\n(?:[ \t]+[\w.-]+:[ \t]*[^\s#].*\n)*?[ \t]+{key}:|\{{[^}}\n]*\b{key}:)[ \t]*["']?\d+"#
    )
}

pub fn resource_limits() -> Vec<Requirement> {
    vec![
        Requirement::new(
            "declares-limits",
            Check::contains("limits:"),
            "The container has no resources.limits section; one pod can starve the whole node.",
        ),
        met_when(
            "limits-memory",
            &limit_pattern("memory"),
            "Set a memory limit under resources.limits (for example memory: \"256Mi\").",
        ),
        met_when(
            "limits-cpu",
            &limit_pattern("cpu"),
            "Set a CPU limit under resources.limits (for example cpu: \"500m\").",
        ),
    ]
}

pub fn pinned_image() -> Vec<Requirement> {
    vec![
        met_unless(
            "no-latest-tag",
            r#"(?m)image:[ \t]*["']?\S+:latest["']?[ \t]*(?:#.*)?$"#,
            "The image uses the mutable :latest tag; deployments are not reproducible.",
        ),
        met_when(
            "explicit-tag-or-digest",
            r#"(?m)image:[ \t]*["']?(?:[\w.-]+(?::\d+)?/)*[\w.-]+(?::\w[\w.-]*|@sha256:[a-f0-9]{64})["']?[ \t]*(?:#.*)?$"#,
            "Pin the image to an explicit version tag or sha256 digest.",
        ),
    ]
}

pub fn private_bucket() -> Vec<Requirement> {
    vec![
        met_unless(
            "no-public-acl",
            r#"acl\s*=\s*"public-read(-write)?""#,
            "The bucket ACL is still public-read; anyone on the internet can list and download objects.",
        ),
        met_when(
            "blocks-public-acls",
            r"block_public_acls\s*=\s*true",
            "Add an aws_s3_bucket_public_access_block with block_public_acls = true.",
        ),
        met_when(
            "restricts-public-buckets",
            r"restrict_public_buckets\s*=\s*true",
            "Set restrict_public_buckets = true in the public access block.",
        ),
    ]
}

pub fn restricted_ssh() -> Vec<Requirement> {
    vec![
        Requirement::new(
            "no-world-cidr",
            Check::missing("0.0.0.0/0"),
            "SSH is still open to 0.0.0.0/0, the entire internet.",
        ),
        met_when(
            "private-cidr",
            r#"cidr_blocks\s*=\s*\[\s*"(10\.|172\.(1[6-9]|2\d|3[01])\.|192\.168\.)"#,
            "Allow SSH only from a private address range such as 10.0.0.0/8.",
        ),
    ]
}

pub fn encrypted_database() -> Vec<Requirement> {
    vec![
        met_unless(
            "not-unencrypted",
            r"storage_encrypted\s*=\s*false",
            "storage_encrypted is still false; data and snapshots are stored in plain text.",
        ),
        met_when(
            "storage-encrypted",
            r"storage_encrypted\s*=\s*true",
            "Set storage_encrypted = true on the database instance.",
        ),
    ]
}

pub fn secret_reference() -> Vec<Requirement> {
    vec![
        met_unless(
            "no-literal-secret",
            r"(?m)name:\s*\w*(PASSWORD|SECRET|TOKEN)\w*\s*\n\s*value:",
            "A secret is still set as a literal environment value in the manifest.",
        ),
        Requirement::new(
            "uses-secret-ref",
            Check::contains("secretKeyRef"),
            "Load the value from a Secret with valueFrom.secretKeyRef.",
        ),
    ]
}

pub fn non_root_user() -> Vec<Requirement> {
    vec![
        met_when(
            "run-as-non-root",
            r"runAsNonRoot:\s*true",
            "Set runAsNonRoot: true in the securityContext.",
        ),
        met_unless(
            "not-uid-zero",
            r"runAsUser:\s*0\b",
            "runAsUser: 0 runs the container as root.",
        ),
    ]
}

pub fn health_probes() -> Vec<Requirement> {
    vec![
        Requirement::new(
            "readiness-probe",
            Check::contains("readinessProbe:"),
            "Add a readinessProbe so traffic only reaches pods that are ready.",
        ),
        Requirement::new(
            "liveness-probe",
            Check::contains("livenessProbe:"),
            "Add a livenessProbe so hung containers are restarted.",
        ),
    ]
}

pub fn scoped_iam_policy() -> Vec<Requirement> {
    vec![
        met_unless(
            "no-wildcard-action",
            r#""Action"\s*:\s*"\*""#,
            "The policy still allows every action (\"Action\": \"*\").",
        ),
        met_unless(
            "no-wildcard-resource",
            r#""Resource"\s*:\s*"\*""#,
            "The policy still applies to every resource (\"Resource\": \"*\").",
        ),
        met_when(
            "scoped-to-s3",
            r#""Action"\s*:\s*\[?\s*"s3:"#,
            "Grant only the S3 actions the reporting job needs (for example s3:GetObject).",
        ),
    ]
}

pub fn replicated_deployment() -> Vec<Requirement> {
    vec![met_when(
        "multiple-replicas",
        r"(?m)^\s*replicas:\s*([2-9]|[1-9]\d+)\s*$",
        "Run at least two replicas so a single pod failure does not cause an outage.",
    )]
}

pub fn isolated_pod_network() -> Vec<Requirement> {
    vec![
        met_unless(
            "no-host-network",
            r"hostNetwork:\s*true",
            "hostNetwork: true shares the node's network namespace with the pod.",
        ),
        met_when(
            "keeps-containers",
            r"(?m)^\s*containers:",
            "The pod must still declare its containers.",
        ),
    ]
}

pub fn ingress_tls() -> Vec<Requirement> {
    vec![
        Requirement::new(
            "declares-tls",
            Check::builtin(r"(?m)^\s*tls:\s*$"),
            "The Ingress has no tls section; traffic is served over plain HTTP.",
        ),
        Requirement::new(
            "tls-secret",
            Check::contains("secretName:"),
            "Reference the certificate Secret with secretName.",
        ),
    ]
}

const WEB_SERVICE: &str = "\
apiVersion: v1
kind: Service
metadata:
  name: web-frontend
spec:
  type: ClusterIP
  selector:
    app: web-frontend
  ports:
    - port: 80
      targetPort: 8080
";

const PRIVILEGED_POD: &str = "\
apiVersion: v1
kind: Pod
metadata:
  name: log-shipper
spec:
  containers:
    - name: shipper
      image: fluent/fluent-bit:2.2.0
      securityContext:
        privileged: true
";

const UNBOUNDED_DEPLOYMENT: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
spec:
  replicas: 3
  template:
    spec:
      containers:
        - name: api
          image: registry.example.com/api:1.4.2
";

const LATEST_IMAGE: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: cache
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: redis
          image: redis:latest
";

const PUBLIC_BUCKET: &str = r#"resource "aws_s3_bucket" "reports" {
  bucket = "quarterly-reports"
  acl    = "public-read"
}
"#;

const OPEN_SSH: &str = r#"resource "aws_security_group" "bastion" {
  name        = "bastion"
  description = "Bastion host access"

  ingress {
    from_port   = 22
    to_port     = 22
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }
}
"#;

const UNENCRYPTED_DB: &str = r#"resource "aws_db_instance" "orders" {
  identifier        = "orders"
  engine            = "postgres"
  instance_class    = "db.t3.medium"
  allocated_storage = 50
  storage_encrypted = false
}
"#;

const LITERAL_SECRET: &str = "\
apiVersion: v1
kind: Pod
metadata:
  name: billing
spec:
  containers:
    - name: billing
      image: registry.example.com/billing:3.1.0
      env:
        - name: DB_PASSWORD
          value: hunter2
";

const ROOT_CONTAINER: &str = "\
apiVersion: v1
kind: Pod
metadata:
  name: worker
spec:
  securityContext:
    runAsUser: 0
  containers:
    - name: worker
      image: registry.example.com/worker:0.9.1
";

const NO_PROBES: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: checkout
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: checkout
          image: registry.example.com/checkout:2.0.0
          ports:
            - containerPort: 8080
";

const WILDCARD_POLICY: &str = r#"{
  "Version": "2012-10-17",
  "Statement": [
    {
      "Effect": "Allow",
      "Action": "*",
      "Resource": "*"
    }
  ]
}
"#;

const SINGLE_REPLICA: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: payments
spec:
  replicas: 1
  template:
    spec:
      containers:
        - name: payments
          image: registry.example.com/payments:5.2.0
";

const HOST_NETWORK: &str = "\
apiVersion: v1
kind: Pod
metadata:
  name: metrics-agent
spec:
  hostNetwork: true
  containers:
    - name: agent
      image: registry.example.com/agent:1.0.0
";

const PLAIN_INGRESS: &str = "\
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: storefront
spec:
  rules:
    - host: shop.example.com
      http:
        paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: storefront
                port:
                  number: 80
";

const MESSY_CONFIGMAP: &str = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
data:
  LOG_LEVEL: trace
  FEATURE_FLAGS: all
";

const DASHBOARD_SERVICE: &str = "\
apiVersion: v1
kind: Service
metadata:
  name: grafana
spec:
  type: ClusterIP
  selector:
    app: grafana
  ports:
    - port: 3000
";

const QA_SERVICE: &str = "\
apiVersion: v1
kind: Service
metadata:
  name: staging-app
spec:
  type: ClusterIP
  selector:
    app: staging-app
  ports:
    - port: 8080
";

pub fn all_challenges() -> Vec<ChallengeSpec> {
    vec![
        ChallengeSpec::targeted(1, "Expose the web frontend", WEB_SERVICE, external_service_access())
            .with_briefing("Customers cannot reach the frontend. Make the Service reachable from outside the cluster."),
        ChallengeSpec::targeted(2, "Drop privileged mode", PRIVILEGED_POD, unprivileged_container())
            .with_briefing("The log shipper runs privileged. Remove host-level access from the container."),
        ChallengeSpec::targeted(3, "Set resource limits", UNBOUNDED_DEPLOYMENT, resource_limits())
            .with_briefing("The API pods have no resource limits. Cap their memory and CPU."),
        ChallengeSpec::targeted(4, "Pin the container image", LATEST_IMAGE, pinned_image())
            .with_briefing("The cache deployment pulls redis:latest. Pin a specific version."),
        ChallengeSpec::targeted(5, "Make the bucket private", PUBLIC_BUCKET, private_bucket())
            .with_briefing("Quarterly reports are world-readable. Lock the bucket down."),
        ChallengeSpec::targeted(6, "Close SSH to the world", OPEN_SSH, restricted_ssh())
            .with_briefing("The bastion accepts SSH from anywhere. Restrict it to the corporate network."),
        ChallengeSpec::targeted(7, "Encrypt the orders database", UNENCRYPTED_DB, encrypted_database())
            .with_briefing("The orders database is stored unencrypted. Turn on encryption at rest."),
        ChallengeSpec::targeted(8, "Move the secret out of the manifest", LITERAL_SECRET, secret_reference())
            .with_briefing("The billing pod has its database password inline. Read it from a Secret instead."),
        ChallengeSpec::targeted(9, "Stop running as root", ROOT_CONTAINER, non_root_user())
            .with_briefing("The worker runs as UID 0. Make it run as an unprivileged user."),
        ChallengeSpec::targeted(10, "Add health probes", NO_PROBES, health_probes())
            .with_briefing("Checkout pods receive traffic before they are ready and are never restarted when hung."),
        ChallengeSpec::targeted(11, "Tame the wildcard policy", WILDCARD_POLICY, scoped_iam_policy())
            .with_briefing("The reporting job's policy allows everything. Scope it to reading S3."),
        ChallengeSpec::targeted(12, "Scale for availability", SINGLE_REPLICA, replicated_deployment())
            .with_briefing("Payments runs a single replica. Survive the loss of one pod."),
        ChallengeSpec::targeted(13, "Leave the host network", HOST_NETWORK, isolated_pod_network())
            .with_briefing("The metrics agent shares the node's network stack. Isolate it."),
        ChallengeSpec::targeted(14, "Terminate TLS at the ingress", PLAIN_INGRESS, ingress_tls())
            .with_briefing("The storefront is served over plain HTTP. Add TLS to the Ingress."),
        ChallengeSpec::generic(15, "Tidy the ConfigMap", MESSY_CONFIGMAP)
            .with_briefing("Debug settings leaked into production. Replace them with sensible values."),
        ChallengeSpec::targeted(22, "Open the metrics dashboard", DASHBOARD_SERVICE, external_service_access())
            .with_briefing("The on-call team cannot open Grafana from their laptops. Expose the dashboard Service."),
        ChallengeSpec::targeted(40, "Let the QA team in", QA_SERVICE, external_service_access())
            .with_briefing("QA needs to reach the staging app from the office network. Expose its Service."),
    ]
}
