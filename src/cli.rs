//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// InsightDash - survey insight dashboard reports from the terminal
///
/// Resolve your identity and establishment scope against the analytics
/// service, load the dashboard facets, and render a Markdown or JSON
/// report.
///
/// Examples:
///   insightdash --email teacher@school.edu
///   insightdash --email admin@trust.org --establishment est_1 --cycle 2
///   insightdash --email teacher@school.edu --year-group 11 --student stu_42
///   insightdash --email teacher@school.edu --format json -o report.json
///   insightdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Analytics service base URL
    ///
    /// Can also be set via INSIGHTDASH_API_URL or .insightdash.toml config.
    #[arg(long, value_name = "URL", env = "INSIGHTDASH_API_URL")]
    pub api_url: Option<String>,

    /// Email of the acting user
    ///
    /// Used for the super-user check and staff role-binding lookup.
    /// Can also be set via INSIGHTDASH_EMAIL or the config file.
    #[arg(short, long, value_name = "EMAIL", env = "INSIGHTDASH_EMAIL")]
    pub email: Option<String>,

    /// Establishment id to load
    ///
    /// Required for super-users; staff are bound to their establishment
    /// automatically.
    #[arg(long, value_name = "ID")]
    pub establishment: Option<String>,

    /// Survey cycle to report on (1-based)
    #[arg(long, value_name = "N")]
    pub cycle: Option<u32>,

    /// Academic year, e.g. 2024-25
    ///
    /// Defaults to the current academic year (rolls over on 1 August).
    #[arg(long, value_name = "YEAR")]
    pub academic_year: Option<String>,

    /// Filter by year group
    #[arg(long, value_name = "GROUP")]
    pub year_group: Option<String>,

    /// Filter by teaching group
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Filter by faculty
    #[arg(long, value_name = "FACULTY")]
    pub faculty: Option<String>,

    /// Filter by gender
    #[arg(long, value_name = "GENDER")]
    pub gender: Option<String>,

    /// Student id for a per-student breakdown
    ///
    /// Adds raw responses and insight category scores for one student.
    #[arg(long, value_name = "ID")]
    pub student: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report
    #[arg(
        short,
        long,
        default_value = "insight_report.md",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Path to configuration file
    ///
    /// If not specified, looks for .insightdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .insightdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate service URL format if provided
        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate email shape if provided
        if let Some(ref email) = self.email {
            if !email.contains('@') {
                return Err(format!("Invalid email address: {}", email));
            }
        }

        // Validate cycle if provided
        if let Some(cycle) = self.cycle {
            if cycle == 0 {
                return Err("Cycle must be at least 1".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref student) = self.student {
            if student.trim().is_empty() {
                return Err("Student id must not be blank".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The filter updates requested on the command line, as key/value
    /// pairs understood by the filter state.
    pub fn filter_updates(&self) -> Vec<(&'static str, String)> {
        let mut updates = Vec::new();

        if let Some(cycle) = self.cycle {
            updates.push(("cycle", cycle.to_string()));
        }
        if let Some(ref year) = self.academic_year {
            updates.push(("academicYear", year.clone()));
        }
        if let Some(ref year_group) = self.year_group {
            updates.push(("yearGroup", year_group.clone()));
        }
        if let Some(ref group) = self.group {
            updates.push(("group", group.clone()));
        }
        if let Some(ref faculty) = self.faculty {
            updates.push(("faculty", faculty.clone()));
        }
        if let Some(ref gender) = self.gender {
            updates.push(("gender", gender.clone()));
        }
        if let Some(ref student) = self.student {
            updates.push(("studentId", student.clone()));
        }

        updates
    }
}
