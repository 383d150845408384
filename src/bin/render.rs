//! Command-line companion to the export service.
//!
//! Uses the same configuration and renderer as the HTTP server, which makes
//! it handy for checking a deployment's browser setup.
//!
//! # Usage
//!
//! ```bash
//! # Render a page to ./neonest-data.pdf
//! cargo run --bin render -- export https://example.com
//!
//! # Render to a custom path
//! cargo run --bin render -- export https://example.com -o /tmp/page.pdf
//!
//! # Show the resolved browser setup and launch it once
//! cargo run --bin render -- doctor
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `neonest_pdf_export::config`.

use neonest_pdf_export::config::Config;
use neonest_pdf_export::domain::PdfRenderer;
use neonest_pdf_export::server::build_export_service;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// CLI tool for rendering pages to PDF.
#[derive(Parser)]
#[command(name = "render")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print renderer logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a URL to a PDF file
    Export {
        /// Absolute http(s) URL of the page
        url: String,

        /// Output file (defaults to the configured export filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the browser configuration by launching it once
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    match cli.command {
        Commands::Export { url, output } => export(&config, &url, output, cli.verbose).await,
        Commands::Doctor => doctor(&config).await,
    }
}

/// Renders `url` and writes the PDF to disk.
async fn export(config: &Config, url: &str, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let (_, service) = build_export_service(config);
    let output = output.unwrap_or_else(|| PathBuf::from(&config.export.filename));

    println!("{} {}", "Rendering".bright_blue().bold(), url);
    let started = Instant::now();

    let document = match service.export(Some(url)).await {
        Ok(document) => document,
        Err(e) => {
            println!("{} {}", "Failed:".red().bold(), e);
            if !verbose {
                println!("{}", "Re-run with --verbose for details".dimmed());
            }
            anyhow::bail!("export failed");
        }
    };

    tokio::fs::write(&output, &document.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} ({} bytes, {:.1}s)",
        "Saved".green().bold(),
        output.display(),
        document.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Prints the resolved browser setup, then launches and closes a browser.
async fn doctor(config: &Config) -> Result<()> {
    let (renderer, _) = build_export_service(config);
    let settings = renderer.settings();

    println!("{}", "Browser configuration".bright_blue().bold());
    println!("  Environment:  {}", settings.environment);
    match settings.executable() {
        Some(path) => println!("  Executable:   {}", path.display()),
        None => println!("  Executable:   {}", "auto-detect".yellow()),
    }
    println!("  No sandbox:   {}", settings.no_sandbox);
    println!("  Paper format: {}", settings.paper_format);
    println!(
        "  Network idle: <= {} in flight for {}ms",
        settings.network_idle_max_inflight,
        settings.network_idle_window.as_millis()
    );
    println!();

    if !renderer.health_check().await {
        println!("{} executable not found", "✗".red().bold());
        anyhow::bail!("browser executable missing");
    }

    match renderer.probe().await {
        Ok(version) => {
            println!("{} launched {}", "✓".green().bold(), version);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            anyhow::bail!("browser launch failed")
        }
    }
}
