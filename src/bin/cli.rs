use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use infraguard::challenge::ChallengeValidator;
use infraguard::config::Config;
use infraguard::error::GuardError;
use infraguard::output::{self, console, OutputFormat};
use infraguard::rules::{RuleEngine, Severity};
use infraguard::{detect, Provider};

#[derive(Parser)]
#[command(
    name = "infraguard",
    about = "Security linter for infrastructure-as-code snippets",
    version,
    author
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a configuration snippet for security issues
    Scan {
        /// Path to the snippet
        path: PathBuf,

        /// Cloud provider (aws, azure, gcp); detected from resource headers if omitted
        #[arg(long, short = 'p')]
        provider: Option<String>,

        /// Resource type (e.g. s3, aws_s3_bucket); detected if omitted
        #[arg(long, short = 'r')]
        resource_type: Option<String>,

        /// Config file path
        #[arg(long, short = 'c', default_value = ".infraguard.toml")]
        config: PathBuf,

        /// Output format (console, json, sarif)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (low, medium, high, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Check a challenge solution
    Challenge {
        /// Challenge id
        id: u32,

        /// Path to the edited snippet
        path: PathBuf,

        /// Show the live hint instead of submitting
        #[arg(long)]
        live: bool,
    },

    /// List all available rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// List all built-in challenges
    ListChallenges,

    /// Generate a starter .infraguard.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            path,
            provider,
            resource_type,
            config,
            format,
            fail_on,
            output,
        } => cmd_scan(path, provider, resource_type, config, format, fail_on, output),
        Commands::Challenge { id, path, live } => cmd_challenge(id, path, live),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::ListChallenges => cmd_list_challenges(),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn cmd_scan(
    path: PathBuf,
    provider_str: Option<String>,
    resource_type: Option<String>,
    config_path: PathBuf,
    format_str: String,
    fail_on_str: Option<String>,
    output_path: Option<PathBuf>,
) -> Result<i32, GuardError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let text = std::fs::read_to_string(&path)?;
    let target_name = path.display().to_string();

    let (provider, resource_type) = match (provider_str, resource_type) {
        (Some(p), Some(rt)) => (parse_provider(&p)?, rt),
        (p, rt) => {
            let (detected_provider, detected_rt) = detect::detect_context(&text)
                .ok_or_else(|| GuardError::UndetectedContext(target_name.clone()))?;
            let provider = match p {
                Some(p) => parse_provider(&p)?,
                None => detected_provider,
            };
            (provider, rt.unwrap_or(detected_rt))
        }
    };
    tracing::debug!(%provider, %resource_type, path = %target_name, "scanning");

    let mut config = Config::load(&config_path)?;
    if let Some(s) = fail_on_str {
        match Severity::from_str_lenient(&s) {
            Some(sev) => config.policy.fail_on = sev,
            None => eprintln!("Warning: unknown severity '{}', using config default", s),
        }
    }

    let registry = config.registry()?;
    let engine = RuleEngine::with_registry(&registry);
    let (report, verdict) =
        infraguard::scan_with_policy(&engine, &text, provider, &resource_type, &config.policy);
    let rendered = output::render(&report, &verdict, format, &target_name)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = policy failure
    Ok(if verdict.pass { 0 } else { 1 })
}

fn parse_provider(s: &str) -> Result<Provider, GuardError> {
    Provider::from_str_lenient(s).ok_or_else(|| GuardError::UnknownProvider(s.to_string()))
}

fn cmd_challenge(id: u32, path: PathBuf, live: bool) -> Result<i32, GuardError> {
    let text = std::fs::read_to_string(&path)?;
    let validator = ChallengeValidator::builtin();

    if live {
        let hint = validator.live_hint(id, &text);
        println!("{}", serde_json::to_string_pretty(&hint)?);
        return Ok(if hint.likely_correct { 0 } else { 1 });
    }

    let outcome = validator.validate(id, &text);
    print!("{}", console::render_outcome(id, &outcome));
    Ok(if outcome.pass { 0 } else { 1 })
}

fn cmd_list_rules(format_str: String) -> Result<i32, GuardError> {
    let engine = RuleEngine::new();
    let rules = engine.list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<12} {:<6} {:<24} {:<10} {:<8} TITLE",
                "ID", "CLOUD", "RESOURCE", "SEVERITY", "CNAS"
            );
            println!("{}", "-".repeat(96));
            for rule in &rules {
                println!(
                    "{:<12} {:<6} {:<24} {:<10} {:<8} {}",
                    rule.id,
                    rule.provider.to_string(),
                    rule.resource_type.as_deref().unwrap_or("*"),
                    rule.severity.to_string(),
                    rule.compliance_tag.map(|t| t.id()).unwrap_or("-"),
                    rule.title,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_list_challenges() -> Result<i32, GuardError> {
    for info in ChallengeValidator::builtin().list() {
        println!("{:>4}  {:<40} {:?}", info.id, info.title, info.kind);
        if !info.briefing.is_empty() {
            println!("      {}", info.briefing);
        }
    }
    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, GuardError> {
    let path = PathBuf::from(".infraguard.toml");

    if path.exists() && !force {
        eprintln!(".infraguard.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .infraguard.toml");

    Ok(0)
}
