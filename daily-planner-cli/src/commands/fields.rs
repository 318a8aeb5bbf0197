//! Commands reading and editing planner fields

use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use daily_planner::config::PlannerConfig;
use daily_planner::fields::FieldName;
use dialoguer::{Editor, Input};

use crate::display::format_planner;
use crate::feedback::TerminalFeedback;
use crate::session::PlannerSession;

/// Print the planner
pub struct ShowCommand {
    /// Print JSON instead of text
    pub json: bool,
}

impl ShowCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened
    pub async fn execute(&self, config: PlannerConfig) -> Result<bool> {
        let session = PlannerSession::load(config).await?;
        let fields = session.snapshot();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&fields)?);
        } else {
            print!("{}", format_planner(&fields));
        }
        Ok(true)
    }
}

/// Set one field
pub struct SetCommand {
    /// Field to change
    pub field: FieldName,
    /// New value
    pub value: String,
}

impl SetCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened
    pub fn execute(self, config: PlannerConfig) -> Result<bool> {
        let mut session = PlannerSession::open(config)?;
        let saved = session
            .fields
            .record_input(&mut session.page, self.field, &self.value);

        if saved {
            println!(
                "{} {}",
                style("Saved").green().bold(),
                style(self.field.label()).bold()
            );
        }
        Ok(saved)
    }
}

/// Prompt for every field in turn
pub struct EditCommand;

impl EditCommand {
    /// Execute the command
    ///
    /// Multi-line fields open the user's editor; an aborted editor keeps
    /// the current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened or a prompt
    /// cannot be shown
    pub async fn execute(&self, config: PlannerConfig) -> Result<bool> {
        let mut session = PlannerSession::load(config).await?;
        let current = session.snapshot();

        for field in FieldName::ALL {
            let value = current.get(field);
            let edited = if field.is_multiline() {
                println!("{} {}", style("Editing").cyan(), style(field.label()).bold());
                Editor::new()
                    .edit(value)
                    .with_context(|| format!("Failed to edit {field}"))?
            } else {
                let initial = if field == FieldName::Date && value.is_empty() {
                    today()
                } else {
                    value.to_string()
                };
                Some(
                    Input::<String>::new()
                        .with_prompt(field.label())
                        .with_initial_text(initial)
                        .allow_empty(true)
                        .interact_text()
                        .with_context(|| format!("Failed to read {field}"))?,
                )
            };

            if let Some(edited) = edited.filter(|edited| edited != value) {
                session.fields.record_input(&mut session.page, field, &edited);
            }
        }

        println!("{}", style("Planner saved").green().bold());
        Ok(true)
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Clear every field after confirmation
pub struct ResetCommand {
    /// Skip the prompt
    pub yes: bool,
}

impl ResetCommand {
    /// Execute the command
    ///
    /// Returns `false` when the user declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened
    pub fn execute(&self, config: PlannerConfig) -> Result<bool> {
        let mut session = PlannerSession::open(config)?;
        let feedback = TerminalFeedback::new(self.yes);

        if session.fields.reset(&mut session.page, &feedback) {
            println!("{}", style("Planner cleared").green().bold());
            Ok(true)
        } else {
            println!("{}", style("Nothing was cleared").dim());
            Ok(false)
        }
    }
}
