use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use tracing::warn;

use crate::{
    app::{get_data_dir, load_config, load_config_from, Config},
    backend::HttpBackend,
    cli::{handle_command, Cli, Commands},
    coordinator::Controller,
    runtime::NonInteractiveRunner,
    tui::{run_ui, App},
    utils::{init_file_logger, init_logger, log_progress, select_files},
};

/// Resolve configuration: file layers first, then CLI overrides
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config_from(config_path)?
    } else {
        match load_config() {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
                Config::default()
            }
        }
    };

    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.backend.request_timeout_secs = timeout;
    }

    Ok(config)
}

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = resolve_config(&cli)?;
        Ok(Self { cli, config })
    }

    fn logging_requested(&self) -> bool {
        self.cli.verbose || std::env::var_os("RUST_LOG").is_some()
    }

    fn controller(&self) -> Result<Controller> {
        let backend = HttpBackend::from_config(&self.config.backend)?;
        Ok(Controller::new(Arc::new(backend)))
    }

    /// Run the orchestrator. Returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if *command != Commands::Chat && self.logging_requested() {
                init_logger();
            }
            if handle_command(command, &self.config, self.cli.config.as_deref()).await? {
                return Ok(0);
            }
            // Continue to chat for Commands::Chat
        }

        if let Some(prompt) = self.cli.prompt.clone() {
            return self.run_non_interactive(prompt).await;
        }

        self.run_interactive().await?;
        Ok(0)
    }

    async fn run_non_interactive(&self, prompt: String) -> Result<i32> {
        if self.logging_requested() {
            init_logger();
        }

        let runner = NonInteractiveRunner::new(self.controller()?);
        let result = runner.execute(&self.cli.files, prompt).await;

        println!("{}", runner.format_result(&result, self.cli.output_format));

        Ok(if result.answered() { 0 } else { 1 })
    }

    async fn run_interactive(&self) -> Result<()> {
        if self.logging_requested() {
            let log_path = get_data_dir()?.join("pdfchat.log");
            if let Err(e) = init_file_logger(&log_path) {
                eprintln!("⚠️  Logging disabled: {}", e);
            }
        }

        let controller = self.controller()?;
        let total_steps = if self.cli.files.is_empty() { 1 } else { 2 };

        log_progress(
            1,
            total_steps,
            format!("Backend: {}", controller.backend_endpoint().green()),
        );
        if !controller.backend_healthy().await {
            warn!(backend = %controller.backend_endpoint(), "health check failed");
            eprintln!("⚠️  Backend is not answering its health check; uploads may fail.");
        }

        let mut app = App::new(controller, self.config.ui.clone());

        if !self.cli.files.is_empty() {
            log_progress(2, total_steps, format!("Uploading {} file(s)...", self.cli.files.len()));
            let candidates = select_files(&self.cli.files).await;
            app.start_upload(candidates);
        }

        run_ui(app).await
    }
}
