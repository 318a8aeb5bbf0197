//! Export and email command

use anyhow::{Context, Result};
use console::style;
use daily_planner::config::PlannerConfig;
use daily_planner::export::{
    CancellationToken, ExportError, ExportPipeline, HttpUploader, UploadResult,
    EMAIL_NOT_CONFIGURED_MESSAGE,
};
use daily_planner::feedback::Feedback;
use daily_planner::fields::FieldName;
use daily_planner::notify::{sender_from_settings, NotificationDispatcher, NotifyError};
use daily_planner::render::BlockRasterizer;
use std::sync::Arc;
use tracing::debug;

use crate::feedback::TerminalFeedback;
use crate::session::PlannerSession;

/// Render the planner, upload it and email the link
pub struct SendCommand {
    /// Skip the confirmation prompt
    pub yes: bool,
}

impl SendCommand {
    /// Execute the command
    ///
    /// Ctrl+C cancels the export. Returns `false` when no email backend is
    /// configured, or the export failed, was cancelled or was declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened or the HTTP
    /// clients cannot be built
    pub async fn execute(&self, config: PlannerConfig) -> Result<bool> {
        let mut session = PlannerSession::load(config).await?;
        let fields = session.snapshot();
        let feedback = Arc::new(TerminalFeedback::new(self.yes));

        let config = &session.config;
        let sender = match sender_from_settings(&config.email, config.client.request_timeout()) {
            Ok(sender) => sender,
            Err(NotifyError::NotConfigured) => {
                feedback.alert(EMAIL_NOT_CONFIGURED_MESSAGE);
                eprintln!(
                    "  {}",
                    style("Set email.public_key, email.service_id and email.template_id, or email.backend = \"console\"").dim()
                );
                return Ok(false);
            }
            Err(e) => return Err(e).context("Failed to set up email delivery"),
        };
        let uploader =
            HttpUploader::from_settings(&config.client).context("Failed to set up image upload")?;
        let pipeline = ExportPipeline::new(
            Arc::new(BlockRasterizer::default()),
            Arc::new(uploader),
            NotificationDispatcher::from_settings(&config.email, sender),
            feedback.clone(),
        );

        if let Some(email) = fields.non_blank(FieldName::Email) {
            if !feedback.confirm(&format!("Send your planner to {email}?")) {
                return Ok(false);
            }
        }

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let result = pipeline
            .export_and_send(&mut session.page, &fields, &cancel)
            .await;
        interrupt.abort();

        match result {
            Ok(report) => {
                if let UploadResult::Hosted(url) = &report.upload {
                    println!("  {} {}", style("image:").dim(), style(url).cyan().underlined());
                }
                println!("  {} {}", style("to:").dim(), report.email.to_email);
                Ok(true)
            }
            Err(ExportError::Cancelled) => {
                eprintln!("{}", style("Export cancelled").yellow());
                Ok(false)
            }
            Err(e) => {
                debug!(error = %e, "Planner not sent");
                Ok(false)
            }
        }
    }
}
