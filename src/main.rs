//! Salesdash - sales performance dashboard
//!
//! A CLI tool that authenticates a user, fetches the sales spreadsheet as
//! CSV and renders revenue-vs-target ratings: every agent for
//! administrators, a chart plus summary for individual agents.
//!
//! Exit codes:
//!   0 - View rendered (possibly degraded to "no data")
//!   1 - Runtime error (configuration, output file, etc.)
//!   2 - Access denied (bad credentials, unmapped agent, no record)

mod analysis;
mod auth;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod report;

use anyhow::{Context, Result};
use auth::{resolve_scope, CredentialStore, Scope, Session};
use cli::{Args, OutputFormat};
use config::Config;
use error::AccessError;
use models::{Dataset, Role};
use report::{AdminReport, AgentReport};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code for denied access.
const EXIT_ACCESS_DENIED: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Salesdash v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "Arguments: user={:?} source={:?} local={:?} format={:?}",
        args.username, args.source, args.local, args.format
    );

    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .salesdash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Set the source URL and replace the sample accounts before use.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Log in, fetch, and render the view for the session's role.
async fn run_dashboard(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let store = CredentialStore::from_config(&config.users);
    if store.is_empty() {
        warn!("No accounts configured; every login will be rejected");
    }
    debug!("Loaded {} accounts", store.len());

    let username = args.username.as_deref().unwrap_or_default();
    let password = args.password.as_deref().unwrap_or_default();

    let session = match Session::login(&store, username, password) {
        Ok(session) => session,
        Err(e) => return Ok(deny(&e)),
    };

    let scope = match resolve_scope(&session, &store) {
        Ok(scope) => scope,
        Err(e) => return Ok(deny(&e)),
    };

    let source = config.data_source(&args)?;
    let periods = config.source.periods.clone();

    // A failed fetch degrades to an empty dataset.
    let (dataset, fetch_error) = match ingest::fetch_dataset(&source, &periods).await {
        Ok(dataset) => (dataset, None),
        Err(e) => {
            error!("Error fetching data from {}: {}", source.describe(), e);
            (Dataset::empty(periods), Some(e.to_string()))
        }
    };

    if dataset.is_empty() && fetch_error.is_none() {
        warn!("Data source {} returned no agent rows", source.describe());
    }

    let exit_code = match (session.role, scope) {
        (Some(Role::Admin), _) => render_admin(&args, &session, &dataset, fetch_error)?,
        (Some(Role::Standard), scope @ Scope::Agent(_)) => {
            render_agent(&args, &session, &dataset, &scope, fetch_error)?
        }
        _ => deny(&AccessError::NotAuthenticated),
    };

    let session = session.logout();
    debug!("Session closed (authenticated: {})", session.authenticated);
    Ok(exit_code)
}

fn deny(error: &AccessError) -> i32 {
    warn!("Access denied: {:?}", error);
    eprintln!("⛔ {}", error);
    EXIT_ACCESS_DENIED
}

fn render_admin(
    args: &Args,
    session: &Session,
    dataset: &Dataset,
    fetch_error: Option<String>,
) -> Result<i32> {
    let report = AdminReport::build(&session.display_name(), dataset, fetch_error);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_admin_markdown(&report),
    };
    emit(args, &output)?;

    if let Some(ref path) = args.export {
        if report.rows.is_empty() {
            warn!("Nothing to export: the dataset is empty");
        } else {
            report::write_export(&report, path)?;
            println!("\n💾 Performance data exported to {}", path.display());
        }
    }

    Ok(0)
}

fn render_agent(
    args: &Args,
    session: &Session,
    dataset: &Dataset,
    scope: &Scope,
    fetch_error: Option<String>,
) -> Result<i32> {
    if args.export.is_some() {
        warn!("--export is only available to administrators; ignoring it");
    }

    if let Some(e) = fetch_error {
        let report = AgentReport::unavailable(&session.display_name(), &dataset.periods, e);
        emit(args, &render_agent_view(args, &report)?)?;
        return Ok(0);
    }

    let visible = scope.filter(&dataset.records);
    let Some(record) = visible.first().copied() else {
        let agent_name = match scope {
            Scope::Agent(name) => name.clone(),
            Scope::AllAgents => String::new(),
        };
        return Ok(deny(&AccessError::NoRecords { agent_name }));
    };
    if visible.len() > 1 {
        warn!(
            "{} rows found for agent {}; showing the first",
            visible.len(),
            record.agent_name
        );
    }

    let report = AgentReport::build(&session.display_name(), dataset, record);
    emit(args, &render_agent_view(args, &report)?)?;

    Ok(0)
}

fn render_agent_view(args: &Args, report: &AgentReport) -> Result<String> {
    Ok(match args.format {
        OutputFormat::Json => report::generate_json_report(report)?,
        OutputFormat::Markdown => report::generate_agent_markdown(report),
    })
}

/// Print the rendered view or write it to --output.
fn emit(args: &Args, content: &str) -> Result<()> {
    match args.output {
        Some(ref path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write view to {}", path.display()))?;
            println!("✅ View saved to: {}", path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}
