//! Quote of the day command

use anyhow::Result;
use console::style;
use daily_planner::config::PlannerConfig;
use daily_planner::fields::FieldName;

use crate::session::PlannerSession;

/// Print the stored quote, fetching one if none is stored
pub struct QuoteCommand {
    /// Replace the stored quote with a fresh one
    pub refresh: bool,
}

impl QuoteCommand {
    /// Execute the command
    ///
    /// Returns `false` when no quote is stored and none could be fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the planner store cannot be opened
    pub async fn execute(&self, config: PlannerConfig) -> Result<bool> {
        let mut session = PlannerSession::open(config)?;
        if self.refresh {
            if session.refresh_quote().await.is_none() {
                eprintln!("{}", style("Could not fetch a new quote").yellow());
            }
        } else {
            session.fetch_quote().await;
        }

        match session.snapshot().non_blank(FieldName::Quote) {
            Some(quote) => {
                println!("{}", style(quote).italic());
                Ok(true)
            }
            None => {
                eprintln!(
                    "{}",
                    style("No quote available. Set quotes.api_key to fetch one.").yellow()
                );
                Ok(false)
            }
        }
    }
}
