mod config;
mod edit_cmd;
mod files;
mod report;
mod resolve_cmd;
mod validate_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::MediaplanConfig;
use mediaplan_core::config::FunnelDefaults;

#[derive(Parser)]
#[command(
    name = "mediaplan",
    about = "Edit media plans and keep their sections consistent",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with the default funnel rates
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show which validators an edit to a section would run
    Resolve {
        /// Plan section, e.g. budgetAllocation
        section: String,
        /// Field path within the section, e.g. platformBreakdown[0].percentage
        field: Option<String>,
    },
    /// Run validators over a plan and report fixes and warnings
    Validate {
        /// Path to the plan JSON file
        plan: PathBuf,
        /// Path to the onboarding form JSON file
        #[arg(long)]
        onboarding: PathBuf,
        /// Comma-separated validator names, or `all`
        #[arg(long, default_value = "all")]
        validators: String,
        /// Plan before the change being validated, for stale-reference detection
        #[arg(long)]
        baseline: Option<PathBuf>,
        /// Write the repaired plan to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one field edit, then run the validators it affects
    Edit {
        /// Path to the plan JSON file
        plan: PathBuf,
        /// Path to the onboarding form JSON file
        #[arg(long)]
        onboarding: PathBuf,
        /// Plan section to edit, e.g. performanceModel
        #[arg(long)]
        section: String,
        /// Field path within the section; empty replaces the whole section
        #[arg(long, default_value = "")]
        field: String,
        /// New value as JSON; non-JSON input is taken as a string
        #[arg(long)]
        value: String,
        /// Write the edited plan to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
}

// -----------------------------------------------------------------------
// init
// -----------------------------------------------------------------------

fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let defaults = FunnelDefaults::default();
    let cfg = config::ConfigFile {
        funnel: config::FunnelSection {
            lead_to_sql_rate: Some(defaults.lead_to_sql_rate),
            sql_to_customer_rate: Some(defaults.sql_to_customer_rate),
        },
        logging: config::LoggingSection {
            filter: Some(config::DEFAULT_LOG_FILTER.to_string()),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  funnel.lead_to_sql_rate = {}", defaults.lead_to_sql_rate);
    println!(
        "  funnel.sql_to_customer_rate = {}",
        defaults.sql_to_customer_rate
    );
    println!("  logging.filter = {}", config::DEFAULT_LOG_FILTER);

    Ok(())
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr so JSON
/// output on stdout stays parseable.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` must work even when the existing config file is malformed.
    if let Commands::Init { force } = cli.command {
        init_tracing(config::DEFAULT_LOG_FILTER);
        return cmd_init(force);
    }

    let resolved = MediaplanConfig::resolve()?;
    init_tracing(&resolved.log_filter);
    run_command(cli.command, &resolved)
}

fn run_command(command: Commands, resolved: &MediaplanConfig) -> anyhow::Result<()> {
    match command {
        Commands::Init { force } => cmd_init(force),
        Commands::Resolve { section, field } => {
            resolve_cmd::run_resolve(&section, field.as_deref())
        }
        Commands::Validate {
            plan,
            onboarding,
            validators,
            baseline,
            output,
            json,
        } => validate_cmd::run_validate(
            &plan,
            &onboarding,
            &validators,
            baseline.as_deref(),
            output.as_deref(),
            json,
            resolved.funnel,
        ),
        Commands::Edit {
            plan,
            onboarding,
            section,
            field,
            value,
            output,
            json,
        } => edit_cmd::run_edit(
            &plan,
            &onboarding,
            &section,
            &field,
            &value,
            output.as_deref(),
            json,
            resolved.funnel,
        ),
    }
}
