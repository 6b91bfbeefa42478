//! cbioquery chat: interactive natural-language queries over cBioPortal
//! LUAD mutation data.

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use cbq_chat::cli::Cli;
use cbq_chat::config::DataSource;
use cbq_chat::dispatcher::IntentDispatcher;
use cbq_chat::handler::QueryHandler;
use cbq_chat::repl;
use cbq_resolver::{IntentResolver, OracleResolver, PatternResolver, TieredResolver};
use cbq_store::{MemoryStore, MutationStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with replies on stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cbq-chat starting");

    // ── Load config ─────────────────────────────────────────────
    let config = cli.to_config(std::env::var("DATABASE_URL").ok())?;

    // ── Data store ──────────────────────────────────────────────
    let store: Box<dyn MutationStore> = match config.data_source() {
        DataSource::Postgres(url) => {
            tracing::info!("using PostgreSQL");
            Box::new(PgStore::new(url))
        }
        DataSource::Dataset(dir) => {
            tracing::info!(dir = %dir.display(), "loading cBioPortal dataset");
            Box::new(MemoryStore::from_dir(&dir).await?)
        }
        DataSource::Sample => {
            tracing::warn!("no database or dataset configured, using built-in sample data");
            Box::new(MemoryStore::with_sample_data())
        }
    };

    // ── Resolvers ───────────────────────────────────────────────
    let resolver = if config.oracle.enabled {
        tracing::info!(
            transport = ?config.oracle.transport,
            model = %config.oracle.model,
            timeout_secs = config.oracle.timeout_secs,
            "oracle fallback enabled"
        );
        TieredResolver::new(
            Box::new(PatternResolver::new()),
            Box::new(OracleResolver::from_config(&config.oracle)),
        )
    } else {
        tracing::info!("oracle fallback disabled");
        TieredResolver::local_only(Box::new(PatternResolver::new()))
    };
    let resolver: &dyn IntentResolver = &resolver;

    let handler = QueryHandler::new(resolver, IntentDispatcher::new(store.as_ref()));

    let input = BufReader::new(tokio::io::stdin());
    repl::run(&handler, input, tokio::io::stdout()).await?;

    tracing::info!("cbq-chat stopped");
    Ok(())
}
