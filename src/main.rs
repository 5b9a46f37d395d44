use clap::Parser;
use ledgerbot::application::engine::ConversationEngine;
use ledgerbot::domain::ports::LedgerStoreBox;
use ledgerbot::infrastructure::json_file::JsonFileStore;
#[cfg(feature = "storage-rocksdb")]
use ledgerbot::infrastructure::rocksdb::RocksDBStore;
use ledgerbot::interfaces::channel::{ChannelEvent, ReplyDirective};
use ledgerbot::interfaces::csv::event_reader::EventReader;
use ledgerbot::interfaces::router::DispatchRouter;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV script of channel events (`user,kind,payload`). Without it, stdin is
    /// read as an interactive session: `:code` presses a button, anything else
    /// is sent as a message.
    script: Option<PathBuf>,

    /// JSON file holding every user's ledger.
    #[arg(long, env = "LEDGERBOT_DATA_FILE", default_value = "user_data.json")]
    data_file: PathBuf,

    /// Path to a RocksDB database, used instead of the JSON file when the
    /// `storage-rocksdb` feature is enabled.
    #[arg(long, env = "LEDGERBOT_DB_PATH")]
    db_path: Option<PathBuf>,

    /// User id for the interactive session.
    #[arg(long, env = "LEDGERBOT_USER", default_value = "console")]
    user: String,

    /// Print every stored profile as JSON once all events are handled.
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let router = DispatchRouter::new(ConversationEngine::new(open_store(&cli)?));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(script) = &cli.script {
        let file = File::open(script).into_diagnostic()?;
        for event in EventReader::new(file).events() {
            match event {
                Ok(event) => {
                    let user_id = event.user_id().to_string();
                    if let Some(reply) = router.dispatch(event).await {
                        print_reply(&mut out, &user_id, &reply).into_diagnostic()?;
                    }
                }
                Err(e) => {
                    eprintln!("Error reading event: {}", e);
                }
            }
        }
    } else {
        for line in io::stdin().lock().lines() {
            let line = line.into_diagnostic()?;
            if line.trim().is_empty() {
                continue;
            }
            let event = match line.strip_prefix(':') {
                Some(data) => ChannelEvent::callback(&cli.user, data.trim()),
                None => ChannelEvent::message(&cli.user, line),
            };
            if let Some(reply) = router.dispatch(event).await {
                print_reply(&mut out, &cli.user, &reply).into_diagnostic()?;
            }
        }
    }

    if cli.dump {
        let profiles: BTreeMap<_, _> = router
            .engine()
            .profiles()
            .await
            .into_diagnostic()?
            .into_iter()
            .collect();
        let json = serde_json::to_string_pretty(&profiles).into_diagnostic()?;
        writeln!(out, "{json}").into_diagnostic()?;
    }

    Ok(())
}

fn open_store(cli: &Cli) -> Result<LedgerStoreBox> {
    if let Some(db_path) = &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        return Ok(Box::new(RocksDBStore::open(db_path).into_diagnostic()?));

        #[cfg(not(feature = "storage-rocksdb"))]
        eprintln!(
            "WARNING: RocksDB storage requested via --db-path ({}), but the 'storage-rocksdb' feature is not enabled. Falling back to the JSON file store.",
            db_path.display()
        );
    }

    Ok(Box::new(JsonFileStore::open(&cli.data_file)))
}

fn print_reply(out: &mut impl Write, user_id: &str, reply: &ReplyDirective) -> io::Result<()> {
    writeln!(out, "[{user_id}] {}", reply.text)?;
    for action in &reply.actions {
        writeln!(out, "  ({}) {}", action.code, action.label)?;
    }
    Ok(())
}
