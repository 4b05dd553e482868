use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use accessaudit::{
    build_report, AccessAudit, AuditConfig, ClientSettings, Config, GitHubClient, ReportWriter,
    RunSummary,
};

#[derive(Parser, Debug)]
#[command(name = "accessaudit")]
#[command(version = "0.1.0")]
#[command(about = "Audit direct collaborator and team access across a GitHub organization")]
struct Args {
    /// GitHub organization to audit
    #[arg(short, long)]
    org: String,

    /// Include archived repositories
    #[arg(long)]
    include_archived: bool,

    /// Directory the CSV reports are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Team checks in flight at once when a repository's team list is hidden
    #[arg(long)]
    team_concurrency: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tokio::select! {
        result = run(args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, no reports written");
            ExitCode::SUCCESS
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("accessaudit=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Using GitHub {} against {}", config.token_source, config.api_url);

    let mut audit_config = AuditConfig::from(&config);
    audit_config.organization = args.org.clone();
    audit_config.include_archived = args.include_archived;
    audit_config.output_dir = args.output_dir.clone();
    audit_config.show_progress = !args.no_progress;
    if let Some(n) = args.team_concurrency.filter(|n| *n > 0) {
        audit_config.team_concurrency = n;
    }

    // Preflight
    let github = GitHubClient::new(&config.github_token, &ClientSettings::from(&config))?;
    github.verify_connection().await?;
    github.verify_organization(&audit_config.organization).await?;

    // Resolve access
    let audit = AccessAudit::new(Arc::new(github), audit_config.clone());
    let run = audit.run().await;

    if run.snapshots.is_empty() {
        anyhow::bail!("No repositories found for organization {}", run.organization);
    }

    let report = build_report(&run.snapshots);
    if report.permissions.is_empty() {
        anyhow::bail!(
            "No direct permissions found across {} repositories in {}",
            run.snapshots.len(),
            run.organization
        );
    }

    // Write reports
    let files = ReportWriter::new(&audit_config.output_dir, &run.organization).write(&report)?;

    println!("{}", RunSummary::new(&run, &report).format_text());
    println!("Files created:");
    println!("  {}", files.permissions.display());
    println!("  {}", files.subjects.display());
    println!("  {}", files.repositories.display());

    Ok(())
}
