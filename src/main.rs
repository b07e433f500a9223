//! globalmarket-admin - administrative commands for the GlobalMarket database

use anyhow::Context;
use bson::Document;
use clap::{Parser, Subcommand};
use globalmarket_admin::analytics::{self, pipelines, AnalyticsPipeline, PipelineObserver, PipelineSummary};
use globalmarket_admin::database::traits::ConnectionTestable;
use globalmarket_admin::provision::plan::{index_plan, product_search_index, provision_plan};
use globalmarket_admin::schema::{install_validators, integrity, rules};
use globalmarket_admin::{config, AdminConfig, AdminDatabase, MongodbDatabase, MongodbDatabaseBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn, Level};

#[derive(Parser)]
#[command(name = "globalmarket-admin")]
#[command(about = "Indexes, schema validation and analytics for the GlobalMarket database", long_about = None)]
struct Cli {
    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", default_value = config::DEFAULT_URI)]
    uri: String,

    /// Target database
    #[arg(short, long, env = "GLOBALMARKET_DATABASE", default_value = config::DEFAULT_DATABASE_NAME)]
    database: String,

    /// Print the final report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the search index and the collection indexes
    Indexes,

    /// Install the schema validators and run the integrity checks
    Validate {
        /// Only install the validators
        #[arg(long)]
        skip_checks: bool,
    },

    /// Run the analytics pipelines
    Queries {
        /// Pipeline numbers to run (defaults to all)
        #[arg(short, long = "pipeline")]
        pipelines: Vec<u32>,
    },

    /// Indexes, then validation, then queries
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let config = AdminConfig::new(cli.uri.as_str(), cli.database.as_str());
    let db = connect(&config).await?;
    info!("Connected to database `{}`", db.database_name());

    // The client is shut down whatever the command returned.
    let result = run_command(&db, cli.command, cli.json).await;
    db.shutdown().await;
    result
}

async fn run_command(db: &MongodbDatabase, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Indexes => create_indexes(db, json).await,
        Commands::Validate { skip_checks } => validate(db, skip_checks, json).await,
        Commands::Queries { pipelines } => run_queries(db, &pipelines, json).await,
        Commands::All => {
            create_indexes(db, json).await?;
            validate(db, false, json).await?;
            run_queries(db, &[], json).await
        }
    }
}

async fn connect(config: &AdminConfig) -> anyhow::Result<MongodbDatabase> {
    let db = MongodbDatabaseBuilder::from_config(config)
        .await
        .context("Invalid connection settings")?
        .build()
        .await
        .with_context(|| format!("Could not select database `{}`", config.database_name))?;

    if let Err(e) = db.test_database_connection().await {
        error!("Could not reach database `{}`: {}", config.database_name, e);
        return Err(e).context("Connection test failed");
    }

    Ok(db)
}

fn print_json<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

async fn create_indexes(db: &MongodbDatabase, json: bool) -> anyhow::Result<()> {
    info!("Provisioning indexes on `{}`", db.database_name());

    let report = provision_plan(db, &index_plan(), &product_search_index()).await;

    match report.failures() {
        0 => info!("Index provisioning finished without errors"),
        n => warn!("Index provisioning finished with {} failed index(es)", n),
    }
    if json {
        print_json(&report)?;
    }
    Ok(())
}

async fn validate(db: &MongodbDatabase, skip_checks: bool, json: bool) -> anyhow::Result<()> {
    let outcomes = install_validators(db, &rules::validators()).await;
    match outcomes.iter().filter(|outcome| outcome.error.is_some()).count() {
        0 => info!("All validators applied"),
        n => warn!("{} validator(s) could not be applied", n),
    }
    if json {
        print_json(&outcomes)?;
    }

    if skip_checks {
        return Ok(());
    }

    info!("Running data integrity checks");
    let reports = integrity::run_checks(db, &integrity::default_checks()).await;
    let failed = reports.iter().filter(|report| !report.passed()).count();
    match failed {
        0 => info!("Validators are active and verified"),
        n => warn!("{} integrity check(s) failed", n),
    }
    if json {
        print_json(&reports)?;
    }
    Ok(())
}

async fn run_queries(db: &MongodbDatabase, numbers: &[u32], json: bool) -> anyhow::Result<()> {
    let selected: Vec<AnalyticsPipeline> = pipelines::pipelines()
        .into_iter()
        .filter(|pipeline| numbers.is_empty() || numbers.contains(&pipeline.number))
        .collect();

    if selected.is_empty() {
        warn!("No pipeline matches {:?}", numbers);
        return Ok(());
    }

    let mut observer = SpinnerObserver::default();
    let summaries = analytics::run_pipelines(db, &selected, &mut observer).await;
    if json {
        print_json(&summaries)?;
    }
    Ok(())
}

/// Shows a spinner while a pipeline runs and prints its documents above it.
#[derive(Default)]
struct SpinnerObserver {
    progress: Option<ProgressBar>,
}

impl PipelineObserver for SpinnerObserver {
    fn started(&mut self, pipeline: &AnalyticsPipeline) {
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} documents {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let progress = ProgressBar::new_spinner();
        progress.set_style(style);
        progress.set_message(format!("- pipeline {}: {}", pipeline.number, pipeline.title));
        progress.enable_steady_tick(Duration::from_millis(120));
        self.progress = Some(progress);
    }

    fn document(&mut self, _pipeline: &AnalyticsPipeline, document: &Document) {
        let rendered = analytics::render_document(document).unwrap_or_else(|_| document.to_string());
        match &self.progress {
            Some(progress) => {
                progress.println(rendered);
                progress.inc(1);
            }
            None => println!("{}", rendered),
        }
    }

    fn finished(&mut self, pipeline: &AnalyticsPipeline, summary: &PipelineSummary) {
        if let Some(progress) = self.progress.take() {
            match &summary.error {
                None => progress.finish_with_message(format!("- pipeline {} completed", pipeline.number)),
                Some(_) => progress.abandon_with_message(format!("- pipeline {} failed", pipeline.number)),
            }
        }
    }
}
