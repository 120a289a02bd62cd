use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use shared::{
    domain::{parse_announcement_id, Announcement},
    error::BoardError,
};
use storage::{
    open_store, sync_recent, AnnouncementStore, LedgerStore, SqliteLedger, StoreSettings,
    StoreTarget,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Operator commands for the announcement table")]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// `mysql://...` or `sqlite:...`; overrides the individual MySQL flags.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(long, default_value_t = 3306)]
    port: u16,
    #[arg(long, default_value = "root")]
    user: String,
    #[arg(long, env = "DB_PASSWORD", default_value = "")]
    password: String,
    #[arg(long, default_value = "project_db")]
    database: String,
}

impl TargetArgs {
    fn into_target(self) -> StoreTarget {
        match self.database_url {
            Some(url) => StoreTarget::Url(url),
            None => StoreTarget::MySql(StoreSettings {
                host: self.host,
                port: self.port,
                user: self.user,
                password: self.password,
                database: self.database,
            }),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the announcement table if it does not exist.
    InitSchema,
    List {
        #[arg(long)]
        json: bool,
    },
    Add {
        #[arg(long)]
        author: String,
        #[arg(long)]
        msg: String,
    },
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        msg: String,
    },
    /// Mirror recently changed rows into the ledger, restoring rows whose
    /// author was changed by someone else.
    Sync {
        #[arg(long, env = "LEDGER_URL", default_value = "sqlite://ledger.db")]
        ledger_url: String,
        /// Poll period; rows dated within the last period are checked.
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        /// Run a single pass and exit.
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let store = open_store(&cli.target.into_target())
        .await
        .context("failed to open announcement store")?;
    let outcome = run(store.as_ref(), cli.command).await;
    store.close().await;
    outcome
}

async fn run(store: &dyn AnnouncementStore, command: Command) -> Result<()> {
    match command {
        Command::InitSchema => {
            store.ensure_schema().await?;
            tracing::info!("announcement table ready");
            println!("announcement table ready");
        }
        Command::List { json } => {
            let rows = store.list_all().await?;
            tracing::info!(rows = rows.len(), "listed announcements");
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_rows(&rows);
            }
        }
        Command::Add { author, msg } => {
            if msg.is_empty() {
                bail!(BoardError::validation("message must not be empty"));
            }
            let id = store.insert(&author, &msg).await?;
            tracing::info!(?id, %author, "created announcement");
            match id {
                Some(id) => println!("created announcement id={id}"),
                None => println!("created announcement"),
            }
        }
        Command::Update { id, author, msg } => {
            let Some(id) = parse_announcement_id(&id) else {
                bail!(BoardError::validation(format!("'{id}' is not a valid id")));
            };
            if msg.is_empty() {
                bail!(BoardError::validation("message must not be empty"));
            }
            if store.update(id, &author, &msg).await? == 0 {
                bail!(BoardError::NotFound(id));
            }
            tracing::info!(%id, %author, "updated announcement");
            println!("updated announcement id={id}");
        }
        Command::Sync {
            ledger_url,
            interval_secs,
            once,
        } => {
            if interval_secs == 0 {
                bail!(BoardError::validation("interval must be at least one second"));
            }
            let ledger = SqliteLedger::connect(&ledger_url)
                .await
                .context("failed to open ledger")?;
            let outcome = run_sync(store, &ledger, Duration::from_secs(interval_secs), once).await;
            ledger.close().await;
            outcome?;
        }
    }
    Ok(())
}

async fn run_sync(
    store: &dyn AnnouncementStore,
    ledger: &dyn LedgerStore,
    period: Duration,
    once: bool,
) -> Result<()> {
    let mut ticker = tokio::time::interval(period);
    tracing::info!(period_secs = period.as_secs(), once, "ledger sync started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("ledger sync stopped");
                return Ok(());
            }
        }

        match sync_recent(store, ledger, period).await {
            Ok(report) if report.is_empty() => tracing::debug!("nothing to sync"),
            Ok(report) => tracing::info!(
                created = report.created,
                updated = report.updated,
                restored = report.restored,
                failed = report.failed,
                "ledger sync pass"
            ),
            Err(err) if once => return Err(err.into()),
            Err(err) => tracing::warn!(error = %err, "ledger sync pass failed"),
        }

        if once {
            return Ok(());
        }
    }
}

fn print_rows(rows: &[Announcement]) {
    println!("{:>6}  {:<12}  {:<19}  msg", "id", "author", "date");
    for row in rows {
        println!(
            "{:>6}  {:<12}  {:<19}  {}",
            row.id.0,
            row.author,
            row.display_date(),
            row.msg
        );
    }
}
