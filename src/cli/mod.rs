use crate::data::configuration::Configuration;
use crate::data::dbconnector::{RecordStoreConnection, SQLConnector};
use crate::rotation::{self, overview};
use crate::server;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(short, long, default_value_t = String::from("configuration.toml"))]
    configuration_path: String,
    /// Evaluate rules as of this day instead of today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Show who may host next
    Pool,
    /// Rank everyone for the next-host recommendation
    Next,
    /// Show the decision countdowns
    Deadline,
    /// Commit a person as the next host
    Assign { person_id: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    debug!("Configuration path: {}", args.configuration_path);
    let config = Configuration::load(&args.configuration_path)?;
    debug!("Loaded configuration: {config:?}");

    let db_connector = SQLConnector::new(&config.database.path)
        .open(&config)
        .await?;
    let today = args.today.unwrap_or_else(rotation::current_day);

    let command = args.command.unwrap_or(Command::Serve);
    debug!("Running {command:?} as of {today}");

    let result = match command {
        Command::Serve => return server::run(config, db_connector, args.port).await,
        Command::Pool => execute_pool(&db_connector, today).await,
        Command::Next => execute_next(&db_connector, today).await,
        Command::Deadline => execute_deadline(&db_connector, today).await,
        Command::Assign { person_id } => execute_assign(&db_connector, &person_id).await,
    };
    db_connector.close().await?;
    result
}

async fn execute_pool(db_connector: &SQLConnector, today: NaiveDate) -> anyhow::Result<()> {
    let pool = overview::load_eligible_pool(db_connector.connection()?, today).await?;
    print_json(&pool)
}

async fn execute_next(db_connector: &SQLConnector, today: NaiveDate) -> anyhow::Result<()> {
    let ranking = overview::load_host_ranking(db_connector.connection()?, today).await?;
    print_json(&ranking)
}

async fn execute_deadline(db_connector: &SQLConnector, today: NaiveDate) -> anyhow::Result<()> {
    let db = db_connector.connection()?;
    let cycle = overview::load_cycle_countdown(db, today).await?;
    let placeholder = overview::load_placeholder_countdown(db, today).await?;
    print_json(&serde_json::json!({ "cycle": cycle, "placeholder": placeholder }))
}

async fn execute_assign(db_connector: &SQLConnector, person_id: &str) -> anyhow::Result<()> {
    let outcome = rotation::assign_next_host(db_connector.connection()?, Some(person_id))
        .await
        .context("assignment failed")?;
    match outcome.placeholder() {
        Some(dinner) => println!(
            "Person {} is the next host (dinner {})",
            dinner.host_id, dinner.id
        ),
        None => anyhow::bail!("no active person with id {person_id}"),
    }
    Ok(())
}
