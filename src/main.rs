use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tarot_insight::config::{AppConfig, ConfigError};
use tarot_insight::db;
use tarot_insight::deck::Spread;
use tarot_insight::insight::{InsightEngine, InsightGenerator, InsightView, LlmInsightGenerator};
use tarot_insight::llm::{LlmClient, LlmError};
use tarot_insight::services::StoreError;
use tarot_insight::services::daily::{DailyCardService, DailyError, DailyOutcome, DailyRecord, DailyRecordStore};
use tarot_insight::services::settings::{SettingsStore, SqliteSettings};
use tarot_insight::topic::Topic;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("llm setup failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Daily(#[from] DailyError),
    #[error("insights require a subscription; run `subscribe on` first")]
    NotSubscribed,
    #[error("no daily record with id {0}")]
    RecordNotFound(Uuid),
    #[error("pass --all or --id")]
    NothingToForget,
    #[error("insight task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Insight(String),
}

#[derive(Parser, Debug)]
#[command(name = "tarot-insight", about = "Tarot readings and card of the day")]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Today's card and advice.
    Daily,
    /// Stored daily cards, newest first.
    History,
    Forget(ForgetArgs),
    Insight(InsightArgs),
    Subscribe {
        #[arg(value_enum)]
        action: SubscribeAction,
    },
}

#[derive(Args, Debug)]
struct ForgetArgs {
    #[arg(long, conflicts_with = "id")]
    all: bool,
    #[arg(long)]
    id: Option<Uuid>,
}

#[derive(Args, Debug)]
struct InsightArgs {
    #[arg(long)]
    topic: Topic,
    #[arg(long, default_value = "three-card")]
    spread: Spread,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SubscribeAction {
    On,
    Off,
    Status,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    info!(url = %config.database_url, "database ready");
    let records = DailyRecordStore::new(pool.clone());
    let settings = SqliteSettings::new(pool);

    match cli.command {
        Command::Daily => {
            let generator = build_generator(&config)?;
            let service = DailyCardService::new(records, generator);
            let outcome = service.today(local_now()).await?;
            if matches!(outcome, DailyOutcome::Cached(_)) {
                info!("daily: already drawn today");
            }
            print_record(outcome.record());
        }
        Command::History => {
            let all = records.fetch().await?;
            if all.is_empty() {
                println!("No daily cards yet.");
            }
            for record in &all {
                print_record(record);
                println!();
            }
        }
        Command::Forget(args) => forget(&records, args).await?,
        Command::Insight(args) => {
            if !settings.is_subscribed().await? {
                return Err(CliError::NotSubscribed);
            }
            let generator = build_generator(&config)?;
            run_insight(generator, args).await?;
        }
        Command::Subscribe { action } => {
            match action {
                SubscribeAction::On => settings.set_subscribed(true).await?,
                SubscribeAction::Off => settings.set_subscribed(false).await?,
                SubscribeAction::Status => {}
            }
            let state = if settings.is_subscribed().await? { "active" } else { "inactive" };
            println!("Subscription {state}");
        }
    }

    Ok(())
}

fn build_generator(config: &AppConfig) -> Result<Arc<dyn InsightGenerator>, CliError> {
    let client = LlmClient::from_env()?;
    info!(model = client.model(), "llm client ready");
    Ok(Arc::new(LlmInsightGenerator::new(
        Arc::new(client),
        config.insight_max_tokens,
        config.response_format,
    )))
}

/// Local wall clock; UTC when the local offset cannot be determined.
fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|e| {
        warn!(error = %e, "local offset unavailable; using UTC");
        OffsetDateTime::now_utc()
    })
}

async fn forget(records: &DailyRecordStore, args: ForgetArgs) -> Result<(), CliError> {
    match (args.all, args.id) {
        (true, _) => {
            let removed = records.delete_all().await?;
            println!("Removed {removed} record(s)");
        }
        (false, Some(id)) => {
            if !records.delete_id(id).await? {
                return Err(CliError::RecordNotFound(id));
            }
            println!("Removed {id}");
        }
        (false, None) => return Err(CliError::NothingToForget),
    }
    Ok(())
}

async fn run_insight(generator: Arc<dyn InsightGenerator>, args: InsightArgs) -> Result<(), CliError> {
    let cards = args.spread.draw(&mut rand::rng());
    for (position, card) in args.spread.positions().iter().zip(&cards) {
        println!("{position}: {card}");
    }
    println!();

    let engine = InsightEngine::new(generator);
    let settled = engine.run_with_retries(args.topic, &cards).await?;

    match settled.view() {
        InsightView::Content { topic, text } => {
            println!("{}\n\n{text}", topic.title());
            Ok(())
        }
        InsightView::Error { report, .. } => Err(CliError::Insight(report.to_string())),
        InsightView::Empty | InsightView::Spinner { .. } => Err(CliError::Insight("no reading produced".into())),
    }
}

fn print_record(record: &DailyRecord) {
    println!("{}  {}", record.date.date(), record.card.display_name());
    println!("  id: {}", record.id);
    println!("  {}", record.advice.trim());
}
