//! InsightDash - survey insight dashboard reports from the terminal
//!
//! A CLI tool that resolves the acting user's identity and establishment
//! scope against the analytics service, loads the dashboard facets
//! concurrently, and renders a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, unresolved identity or scope)

mod api;
mod catalog;
mod cli;
mod config;
mod context;
mod dashboard;
mod error;
mod filters;
mod models;
mod report;
mod scoring;

use anyhow::{Context as _, Result};
use api::{AnalyticsApi, AnalyticsClient};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use context::{ContextResolver, RoleBindingStore, StaticSession};
use dashboard::DashboardEngine;
use filters::FilterState;
use indicatif::{ProgressBar, ProgressStyle};
use report::{DashboardReport, ReportMetadata, StudentSection};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

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

    // Initialize logging
    init_logging(&args);

    info!("InsightDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard load failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            if let Some(dashboard_error) = e.downcast_ref::<error::DashboardError>() {
                if dashboard_error.is_scope_error() {
                    eprintln!("   Check --email, --establishment, and your role binding.");
                }
            }
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .insightdash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".insightdash.toml");

    if path.exists() {
        eprintln!("⚠️  .insightdash.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .insightdash.toml")?;

    println!("✅ Created .insightdash.toml with default settings.");
    println!("   Edit it to set the service URL, session email, and default filters.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete dashboard workflow. Returns the exit code.
async fn run_dashboard(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Connect to the analytics service
    let client = AnalyticsClient::new(&config.service.base_url, config.service.timeout_seconds);
    println!("🔗 Analytics service: {}", client.base_url());
    let api: Arc<dyn AnalyticsApi> = Arc::new(client.clone());
    let roles: Arc<dyn RoleBindingStore> = Arc::new(client);

    // Step 2: Resolve identity and establishment scope
    let session = StaticSession::new(config.session.email.clone());
    let mut resolver = ContextResolver::new(api.clone(), roles, Box::new(session));
    let context = resolver.resolve().await?;

    if context.is_super_user {
        match config.session.establishment {
            Some(ref id) => resolver.select_establishment(id)?,
            None => {
                println!("\n🔑 Super-user access: select an establishment with --establishment <ID>.");
                println!("\nAvailable establishments:");
                for establishment in resolver.establishments() {
                    println!(
                        "   {} - {} ({})",
                        establishment.id, establishment.name, establishment.kind
                    );
                }
                return Ok(1);
            }
        }
    } else if let Some(ref requested) = config.session.establishment {
        if resolver.selected_establishment() != Some(requested.as_str()) {
            warn!(
                "Ignoring establishment {}; staff scope is fixed by the role binding",
                requested
            );
        }
    }

    let establishment_id = resolver.selected_establishment().map(str::to_string);
    info!(
        "Acting as {} for establishment {}",
        context.email,
        establishment_id.as_deref().unwrap_or("<none>")
    );

    // Step 3: Build the filter state
    let academic_year = config
        .filters
        .academic_year
        .clone()
        .unwrap_or_else(context::default_academic_year);
    let mut filters = FilterState::new(academic_year);
    filters.cycle = config.filters.cycle;
    for (key, value) in args.filter_updates() {
        filters.update(key, &value);
    }

    // Step 4: Load the dashboard facets
    let spinner = create_spinner(args.quiet, "Loading dashboard data...");
    let engine = DashboardEngine::new(api.clone());
    let view_model = match engine
        .load_dashboard_data(establishment_id.as_deref(), &filters)
        .await
    {
        Ok(view_model) => {
            spinner.finish_and_clear();
            view_model
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    // Step 5: Optional per-student breakdown
    let student = match filters.student_id {
        Some(ref student_id) => {
            info!("Loading responses for student {}", student_id);
            let student_report = api.get_student_responses(student_id, filters.cycle).await?;
            let scores = scoring::score_all(&student_report.raw_responses());
            Some(StudentSection {
                student: student_report.student.clone(),
                summary: student_report.summary.clone(),
                responses: student_report.responses.clone(),
                scores,
            })
        }
        None => None,
    };

    // Step 6: Render and save the report
    println!("📝 Generating report...");

    let establishment_name = resolver
        .establishments()
        .iter()
        .find(|e| Some(e.id.as_str()) == establishment_id.as_deref())
        .map(|e| e.name.clone())
        .or_else(|| establishment_id.clone())
        .unwrap_or_default();

    let metadata = ReportMetadata {
        establishment_name,
        academic_year: filters.academic_year.clone(),
        cycle: filters.cycle,
        generated_at: Utc::now(),
        active_filters: filters
            .active_filters()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    };

    let dashboard_report = DashboardReport {
        metadata,
        dashboard: view_model.clone(),
        student,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&dashboard_report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Dashboard Summary:");
    if let Some(ref statistics) = view_model.statistics {
        if let Some(total) = statistics.total_students {
            println!("   Students: {}", total);
        }
        if let Some(total) = statistics.total_responses {
            println!("   Responses: {}", total);
        }
    }
    if let Some(ref qla) = view_model.qla {
        println!("   QLA insights: {}", qla.insights.len());
    }
    println!(
        "\n✅ Report saved to: {}",
        args.output.display()
    );

    Ok(0)
}

/// Create a progress spinner, hidden in quiet mode.
fn create_spinner(quiet: bool, message: &'static str) -> ProgressBar {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };

    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);

    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .insightdash.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
