//! Integration tests for the planner commands

use clap::Parser;
use daily_planner::config::{EmailBackend, PlannerConfig};
use daily_planner::fields::FieldName;
use daily_planner_cli_lib::cli::Cli;
use daily_planner_cli_lib::PlannerSession;
use tempfile::TempDir;

fn config(dir: &TempDir) -> PlannerConfig {
    let mut config = PlannerConfig::default();
    config.client.store_path = dir.path().join("planner.json");
    config
}

async fn run(dir: &TempDir, args: &[&str]) -> bool {
    run_with(config(dir), args).await
}

#[tokio::test]
async fn test_set_show_reset() {
    let dir = TempDir::new().unwrap();

    assert!(run(&dir, &["set", "name", "Ada"]).await);
    assert!(run(&dir, &["set", "EMAIL", "ada@example.com"]).await);
    assert!(run(&dir, &["show"]).await);
    assert!(run(&dir, &["show", "--json"]).await);

    let fields = PlannerSession::open(config(&dir)).unwrap().snapshot();
    assert_eq!(fields.get(FieldName::Name), "Ada");
    assert_eq!(fields.get(FieldName::Email), "ada@example.com");

    assert!(run(&dir, &["reset", "--yes"]).await);
    let fields = PlannerSession::open(config(&dir)).unwrap().snapshot();
    assert_eq!(fields.get(FieldName::Name), "");
}

async fn run_with(config: PlannerConfig, args: &[&str]) -> bool {
    let cli = Cli::try_parse_from(std::iter::once("daily-planner").chain(args.iter().copied()))
        .unwrap();
    cli.command.execute(config).await.unwrap()
}

fn console_email(dir: &TempDir) -> PlannerConfig {
    let mut config = config(dir);
    config.email.backend = EmailBackend::Console;
    config
}

#[tokio::test]
async fn test_send_without_email_fails() {
    let dir = TempDir::new().unwrap();
    assert!(run(&dir, &["set", "name", "Ada"]).await);

    // nothing is rendered or uploaded without a recipient
    assert!(!run_with(console_email(&dir), &["send", "--yes"]).await);
}

#[tokio::test]
async fn test_send_without_email_service_fails() {
    let dir = TempDir::new().unwrap();
    assert!(run(&dir, &["set", "email", "ada@example.com"]).await);

    // EmailJS is the default backend and has no credentials here
    assert!(!run(&dir, &["send", "--yes"]).await);
}

#[tokio::test]
async fn test_quote_without_api_key() {
    let dir = TempDir::new().unwrap();
    assert!(!run(&dir, &["quote"]).await);

    assert!(run(&dir, &["set", "quote", "Stay hungry. — Steve Jobs"]).await);
    assert!(run(&dir, &["quote"]).await);
}

#[tokio::test]
async fn test_failed_quote_refresh_keeps_stored_quote() {
    let dir = TempDir::new().unwrap();
    assert!(run(&dir, &["set", "quote", "Mine — Me"]).await);

    // no API key is configured, so the fetch fails
    assert!(run(&dir, &["quote", "--refresh"]).await);

    let fields = PlannerSession::open(config(&dir)).unwrap().snapshot();
    assert_eq!(fields.get(FieldName::Quote), "Mine — Me");
}
