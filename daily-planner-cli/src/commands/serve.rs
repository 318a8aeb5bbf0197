//! Upload server command

use anyhow::{Context, Result};
use console::style;
use daily_planner::config::{PlannerConfig, UploadBackend};
use daily_planner::server;
use daily_planner::state::AppState;
use std::net::IpAddr;

/// Run the image upload server until Ctrl+C
pub struct ServeCommand {
    /// Address override
    pub host: Option<IpAddr>,
    /// Port override
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The storage backend is misconfigured
    /// - The address cannot be bound
    /// - The server fails while running
    pub async fn execute(&self, mut config: PlannerConfig) -> Result<bool> {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let backend = match config.upload.backend {
            UploadBackend::Disk => format!("disk ({})", config.upload.dir.display()),
            UploadBackend::Cloudinary => "cloudinary".to_string(),
        };
        println!(
            "{} {} {}",
            style("Serving").green().bold(),
            style("uploads on").bold(),
            style(format!("http://{}", config.server.bind_addr())).cyan().bold()
        );
        println!("  {} {backend}", style("storage:").dim());
        println!();

        let state = AppState::from_config(config).context("Failed to set up upload storage")?;
        server::serve(state).await?;
        Ok(true)
    }
}
