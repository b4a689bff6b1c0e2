use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use subsidy_console::client::{ApiClient, SimulationBackend};
use subsidy_console::config::{Config, ConfigOverrides};
use subsidy_console::console::{self, Console, RunState};
use subsidy_console::ledger::Tab;
use subsidy_console::model::EnterpriseRecord;
use subsidy_console::output::csv::{allocations_to_csv, directory_to_csv};
use subsidy_console::output::json::render_json;
use subsidy_console::output::table::{
    render_console_view, render_detail, render_directory_table, render_ledger,
    render_training_report,
};
use subsidy_console::policy::{PolicyControls, WeightAxis};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "subsidy-console",
    about = "Operator console for the MSME subsidy optimization service"
)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(short, long)]
    api: Option<String>,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive optimization console (runs one simulation eagerly)
    Console {
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long = "w-rev")]
        w_rev: Option<f64>,
    },
    /// One-shot simulation run
    Simulate {
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long = "w-rev")]
        w_rev: Option<f64>,
        #[arg(long = "w-emp")]
        w_emp: Option<f64>,
        /// Result section to show: allocated, rejected, or sectors
        #[arg(long, default_value = "allocated")]
        view: String,
    },
    /// Enterprise directory with growth predictions
    Directory {
        /// Substring filter over enterprise id and sector
        #[arg(long)]
        search: Option<String>,
    },
    /// Detail view for one enterprise
    Detail { id: String },
    /// Trigger model training and show evaluation metrics
    Train,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        base_url: cli.api.clone(),
    });

    if let Commands::Config { init, show } = &cli.command {
        if *init {
            Config::write_template(&config_path)?;
            println!("Wrote config template to {}", config_path.display());
        }
        if *show || !*init {
            println!("{}", render_json(&config)?);
        }
        return Ok(());
    }

    let client = Arc::new(ApiClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
        Duration::from_secs(config.api.connect_timeout_secs),
    )?);

    match &cli.command {
        Commands::Console { budget, w_rev } => {
            let policy = build_policy(&config, *budget, *w_rev, None);
            console::run_interactive(client, policy).await?;
        }
        Commands::Simulate {
            budget,
            w_rev,
            w_emp,
            view,
        } => {
            let tab = Tab::parse(view)
                .ok_or_else(|| anyhow!("unknown view '{view}', expected allocated|rejected|sectors"))?;
            let policy = build_policy(&config, *budget, *w_rev, *w_emp);
            run_once(client, policy, tab, cli.output).await?;
        }
        Commands::Directory { search } => {
            let mut records = client.fetch_enterprises().await?;
            if let Some(needle) = search {
                records.retain(|record| record.matches(needle));
            }
            print_directory(&records, search.as_deref(), cli.output)?;
        }
        Commands::Detail { id } => {
            let detail = client.fetch_enterprise(id).await.map_err(|err| {
                if err.is_not_found() {
                    anyhow!("no enterprise with id '{id}'")
                } else {
                    err.into()
                }
            })?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_detail(&detail)),
                OutputFormat::Json => println!("{}", render_json(&detail)?),
                OutputFormat::Csv => {
                    warn!("CSV output for detail not implemented, using JSON");
                    println!("{}", render_json(&detail)?);
                }
            }
        }
        Commands::Train => {
            let report = client.train_model().await?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_training_report(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)?),
                OutputFormat::Csv => {
                    warn!("CSV output for train not implemented, using JSON");
                    println!("{}", render_json(&report)?);
                }
            }
        }
        Commands::Config { .. } => unreachable!("config command handled before dispatch"),
    }

    Ok(())
}

fn build_policy(
    config: &Config,
    budget: Option<f64>,
    w_rev: Option<f64>,
    w_emp: Option<f64>,
) -> PolicyControls {
    let mut policy = PolicyControls::new(
        config.simulation.default_budget,
        config.simulation.default_w_revenue,
    );
    if let Some(budget) = budget {
        policy.set_budget(budget);
    }
    if let Some(value) = w_rev {
        policy.set_weight(WeightAxis::Revenue, value);
    }
    if let Some(value) = w_emp {
        policy.set_weight(WeightAxis::Employment, value);
    }
    policy
}

async fn run_once(
    client: Arc<dyn SimulationBackend>,
    policy: PolicyControls,
    tab: Tab,
    format: OutputFormat,
) -> Result<()> {
    let mut console = Console::new(client, policy);
    console.run().await;
    console.select_tab(tab);

    match console.state() {
        RunState::Succeeded(ledger) => {
            match format {
                OutputFormat::Table => println!("{}", render_ledger(ledger)),
                OutputFormat::Json => println!("{}", render_json(ledger)?),
                OutputFormat::Csv => println!("{}", allocations_to_csv(ledger.allocations())?),
            }
            Ok(())
        }
        RunState::Failed(message) => {
            let message = message.clone();
            println!("{}", render_console_view(console.state()));
            Err(anyhow!("simulation failed: {message}"))
        }
        other => Err(anyhow!("simulation ended in unexpected state: {other:?}")),
    }
}

fn print_directory(
    records: &[EnterpriseRecord],
    search: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if records.is_empty() {
                if let Some(needle) = search {
                    println!("No enterprises found matching \"{needle}\"");
                    return Ok(());
                }
            }
            println!("{}", render_directory_table(records));
        }
        OutputFormat::Json => println!("{}", render_json(records)?),
        OutputFormat::Csv => println!("{}", directory_to_csv(records)?),
    }
    Ok(())
}
