//! CLI entry point for `mboxfrom`.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use mboxfrom::config::Config;
use mboxfrom::parser::FromLine;
use mboxfrom::scan::{self, Scanner, Separator};

/// Recognize mbox `From ` separator lines.
#[derive(Parser)]
#[command(name = "mboxfrom", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a single line is a separator
    Check {
        line: String,
        #[arg(long)]
        json: bool,
    },
    /// List the separators of an MBOX file ("-" reads stdin)
    Scan {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; a bad file is reported once logging is up
    let loaded = mboxfrom::config::load_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
    }

    match cli.command {
        Commands::Check { line, json } => cmd_check(&line, json, &config),
        Commands::Scan { path, json } => cmd_scan(&path, json, &config),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

/// Set up tracing with stderr output.
fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxfrom", &mut std::io::stdout());
    Ok(())
}

/// Check a single line. Exits with status 1 when it is not a separator.
fn cmd_check(line: &str, json: bool, config: &Config) -> anyhow::Result<()> {
    let from = FromLine::parse(line.as_bytes());

    if json {
        let output = match &from {
            Some(from) => serde_json::json!({
                "recognized": true,
                "sender": from.sender(),
                "calendar": from.calendar(),
                "timestamp": from.timestamp().map(|t| t.timestamp()),
                "date": from.timestamp().map(|t| t.to_rfc3339()),
            }),
            None => serde_json::json!({ "recognized": false }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(from) = &from {
        println!("  {:<10} {}", "Sender", from.sender());
        if let Some(ts) = from.timestamp() {
            println!(
                "  {:<10} {}",
                "Date",
                ts.format(&config.general.date_format)
            );
            println!("  {:<10} {}", "Timestamp", ts.timestamp());
        }
    } else {
        println!("Not a separator line");
    }

    if from.is_none() {
        std::process::exit(1);
    }
    Ok(())
}

/// List every separator of an MBOX file or of stdin.
fn cmd_scan(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    if path == Path::new("-") {
        let stdin = std::io::stdin();
        report(Scanner::new(stdin.lock(), &config.scan), json, config)
    } else {
        report(scan::scan_path(path, &config.scan)?, json, config)
    }
}

fn report<R: BufRead>(scanner: Scanner<R>, json: bool, config: &Config) -> anyhow::Result<()> {
    let separators = scanner.collect::<mboxfrom::error::Result<Vec<_>>>()?;
    tracing::info!(count = separators.len(), "Scan finished");

    if json {
        print_separators_json(&separators)
    } else {
        print_separators_table(&separators, config);
        Ok(())
    }
}

/// Print separators in a human-readable table.
fn print_separators_table(separators: &[Separator], config: &Config) {
    println!();
    println!(
        "  {:>8}  {:>12}  {:<20}  Sender",
        "Line", "Offset", "Date"
    );
    for sep in separators {
        let date = sep
            .date()
            .map(|d| d.format(&config.general.date_format).to_string())
            .unwrap_or_default();
        let sender = if sep.sender.is_empty() {
            "-"
        } else {
            sep.sender.as_str()
        };
        println!(
            "  {:>8}  {:>12}  {:<20}  {}",
            sep.line_number, sep.offset, date, sender
        );
    }
    println!();
    println!("  {} separator(s)", separators.len());
    println!();
}

/// Print separators as JSON.
fn print_separators_json(separators: &[Separator]) -> anyhow::Result<()> {
    let items: Vec<serde_json::Value> = separators
        .iter()
        .map(|sep| {
            serde_json::json!({
                "line": sep.line_number,
                "offset": sep.offset,
                "sender": sep.sender,
                "timestamp": sep.timestamp,
                "date": sep.date().map(|d| d.to_rfc3339()),
                "preceded_by_blank": sep.preceded_by_blank,
            })
        })
        .collect();

    let output = serde_json::json!({
        "separator_count": separators.len(),
        "separators": items,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
