// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! querylens main entry point - CLI and commands.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use querylens::config::{self, CliOptions, Credentials};
use querylens::telemetry::{init_telemetry, TelemetryConfig};
use querylens::{LensDescriptor, MetricsRecord, SourceKind, UsageLens};

/// querylens - query usage and performance for methods.
#[derive(Parser)]
#[command(name = "querylens")]
#[command(author, version, about = "Query usage and performance lenses for methods", long_about = None)]
struct Cli {
    /// Usage source (remote or local)
    #[arg(short, long, env = "QUERYLENS_SOURCE")]
    source: Option<SourceKind>,

    /// Local CSV export to read
    #[arg(long)]
    csv: Option<String>,

    /// Analytics application ID
    #[arg(long, env = "QUERYLENS_APP_ID")]
    app_id: Option<String>,

    /// Analytics API key
    #[arg(long, env = "QUERYLENS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Analytics API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// How many hours of telemetry to query
    #[arg(long)]
    window_hours: Option<u32>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Show info logs and a metrics report
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Show debug output
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for lookups.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up usage for one or more method signatures
    Lookup {
        /// Method signatures, e.g. Shop.Orders.GetOrders
        #[arg(required = true)]
        signatures: Vec<String>,

        /// Show the per-metric table
        #[arg(short, long)]
        details: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Save analytics credentials for the editor integration
    Configure {
        /// Analytics application ID
        #[arg(long = "app-id")]
        app_id: String,

        /// Analytics API key
        #[arg(long = "api-key")]
        api_key: String,
    },

    /// Initialize a new workspace configuration file
    Init,
}

/// One lookup as printed by `--format json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupOutput<'a> {
    signature: &'a str,
    record: MetricsRecord,
    lens: LensDescriptor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = init_telemetry(&TelemetryConfig::from_flags(cli.debug, cli.verbose))?;

    let cli_options = CliOptions {
        source: cli.source,
        csv_path: cli.csv,
        endpoint: cli.endpoint,
        app_id: cli.app_id,
        api_key: cli.api_key,
        window_hours: cli.window_hours,
        timeout_ms: cli.timeout_ms,
    };

    match cli.command {
        Commands::Lookup {
            signatures,
            details,
            format,
        } => handle_lookup(cli_options, &signatures, details, format, cli.verbose).await,
        Commands::Configure { app_id, api_key } => handle_configure(&app_id, &api_key),
        Commands::Init => {
            let workspace_root = std::env::current_dir()?;
            let path = config::init_config(&workspace_root, None)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

async fn handle_lookup(
    cli_options: CliOptions,
    signatures: &[String],
    details: bool,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let workspace_root = config::find_workspace_root(&cwd).unwrap_or(cwd);
    let resolved = config::load_config(&workspace_root, cli_options)?;

    let lens = match UsageLens::from_config(&resolved) {
        Ok(lens) => lens,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red(), e);
            if resolved.source == SourceKind::Remote {
                eprintln!(
                    "{}",
                    "Run `querylens configure --app-id ID --api-key KEY` or pass --csv FILE".dimmed()
                );
            }
            std::process::exit(2);
        }
    };

    let mut outputs = Vec::with_capacity(signatures.len());
    for signature in signatures {
        let record = lens.lookup(signature).await;
        let descriptor = lens.presenter().describe(signature, &record);
        outputs.push(LookupOutput {
            signature,
            record,
            lens: descriptor,
        });
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        OutputFormat::Text => {
            for output in &outputs {
                print_lookup(output, details);
            }
        }
    }

    #[cfg(feature = "telemetry")]
    if verbose {
        eprintln!("{}", querylens::telemetry::GLOBAL_METRICS.snapshot().format_report());
    }
    #[cfg(not(feature = "telemetry"))]
    let _ = verbose;

    Ok(())
}

fn print_lookup(output: &LookupOutput<'_>, details: bool) {
    println!("{}", output.signature.bright_white().bold());

    let description = if output.record.has_data() {
        output.lens.description.green()
    } else {
        output.lens.description.yellow()
    };
    println!("  {}", description);

    if !output.record.additional_info.is_empty() {
        println!("  {}", output.record.additional_info.dimmed());
    }

    if details {
        println!();
        for line in output.lens.details.to_string().lines() {
            println!("  {}", line);
        }
    }
    println!();
}

fn handle_configure(app_id: &str, api_key: &str) -> anyhow::Result<()> {
    let credentials = Credentials::new(app_id.trim(), api_key.trim());
    // Reject what the loader would reject.
    Credentials::parse(&credentials.to_line())?;

    let path = config::save_credentials(&credentials)?;
    println!("{} {}", "Saved credentials to".green(), path.display());
    Ok(())
}
