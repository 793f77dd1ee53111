use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::{
    app::{config_sources, init_config, Config},
    backend::{Backend, HttpBackend, Operation},
};

use super::Commands;

/// Handle CLI subcommands. Returns true when the command finished the run.
///
/// `config_path` is the file given with `--config`, if any.
pub async fn handle_command(
    command: &Commands,
    config: &Config,
    config_path: Option<&Path>,
) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing pdfchat configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config, config_path).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("pdfchat v{}", env!("CARGO_PKG_VERSION"));
    println!("   Upload PDF documents and ask questions about them");
}

/// Show backend reachability and where configuration comes from
async fn show_status(config: &Config, config_path: Option<&Path>) -> Result<()> {
    println!("pdfchat Status:");
    println!();

    let backend = HttpBackend::from_config(&config.backend)?;
    match backend.health().await {
        Ok(true) => println!("  [OK] Backend: {}", backend.endpoint().green()),
        Ok(false) => println!(
            "  [WARNING] Backend: {} answered but reports unhealthy",
            backend.endpoint().yellow()
        ),
        Err(e) => println!(
            "  [ERROR] Backend: {} ({})",
            backend.endpoint().red(),
            e.reason(Operation::Health)
        ),
    }
    println!(
        "      request timeout: {}s",
        config.backend.request_timeout_secs
    );

    let sources = config_sources(config_path)?;
    if sources.is_empty() {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }
    for source in &sources {
        println!("  [OK] Configuration: {}", source.display());
    }

    if std::env::var("PDFCHAT_BACKEND_URL").is_ok() {
        println!("\n  Environment:");
        println!("    • PDFCHAT_BACKEND_URL: Set");
    }

    println!();
    Ok(())
}
