use bank_ledger::domain::LineSource;
use bank_ledger::{AccountStore, Config, Console, ConsoleReader, Engine, SqliteRepository};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")] // one user, one thread
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // Logs go to stderr; stdout belongs to the menu dialogue.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(db = ?config.db_path, init_schema = config.init_schema, "Starting bank ledger");

    let repository = SqliteRepository::new(&config.db_path);
    if config.init_schema {
        if let Err(e) = repository.ensure_schema() {
            error!(error = %e, "Could not prepare the users table");
        }
    }

    let mut store = AccountStore::new(repository);
    store.hydrate();

    let mut input = ConsoleReader::new(BufReader::new(tokio::io::stdin()));
    let console = Console::new(input.lines(), tokio::io::stdout());

    let mut engine = Engine::new(console, store);
    engine.process().await?;

    Ok(())
}
