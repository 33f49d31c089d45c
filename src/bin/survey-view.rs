//! survey-view - Interactive TUI viewer for survey responses.
//!
//! Usage:
//!   survey-view                      # Postgres from PG* environment
//!   survey-view --dsn "host=db ..."  # explicit connection string
//!   survey-view --demo               # built-in demo data
//!   survey-view --kind parents --page 2 --dump

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use survey_portal::model::EntityKind;
use survey_portal::store::{MemoryStore, PostgresStore, RecordStore, StoreConfig, StoreError};
use survey_portal::tui::App;
use survey_portal::view::{TableViewController, TableViewModel};

/// How long `--dump` waits for the page.
const DUMP_TIMEOUT: Duration = Duration::from_secs(30);

/// Interactive TUI viewer for survey responses.
#[derive(Parser)]
#[command(name = "survey-view", about = "Survey response viewer", version)]
struct Args {
    /// Postgres connection string. Falls back to PGHOST/PGPORT/PGUSER/...
    #[arg(long, env = "SURVEY_DSN")]
    dsn: Option<String>,

    /// Negotiate TLS with the database.
    #[arg(long)]
    tls: bool,

    /// Use built-in demo data instead of a database (overrides --dsn).
    #[arg(long)]
    demo: bool,

    /// Table to open: students, parents or teachers.
    #[arg(long, default_value = "students", value_parser = parse_kind)]
    kind: EntityKind,

    /// Page to open (1-based).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    page: u64,

    /// Print the page as plain text and exit.
    #[arg(long)]
    dump: bool,

    /// Log file for the TUI (the terminal is in raw mode).
    #[arg(long, default_value = "survey-view.log")]
    log_file: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn parse_kind(s: &str) -> Result<EntityKind, String> {
    EntityKind::parse(s).ok_or_else(|| format!("unknown kind '{}' (students, parents, teachers)", s))
}

/// Initializes the tracing subscriber. Dump mode logs to stderr; the TUI
/// logs to `log_file`.
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&str>) -> Result<(), String> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("survey_portal={},survey_view={}", level, level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("cannot open log file '{}': {}", path, e))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn open_store(args: &Args) -> Result<Arc<dyn RecordStore>, StoreError> {
    if args.demo {
        return Ok(Arc::new(MemoryStore::demo()));
    }
    let config = match &args.dsn {
        Some(dsn) => StoreConfig::new(dsn.as_str()),
        None => StoreConfig::from_env()?,
    }
    .with_tls(args.tls);
    info!(server = %config.redacted(), tls = config.tls, "connecting");
    let store = PostgresStore::new(config);
    store.try_connect()?;
    Ok(Arc::new(store))
}

fn dump(store: Arc<dyn RecordStore>, kind: EntityKind, page: u64) -> bool {
    let mut controller = TableViewController::new(store);
    controller.open(kind, page);
    let result = controller.wait_idle(DUMP_TIMEOUT);
    println!("{}", TableViewModel::from_state(controller.state()).to_text());
    match result {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "dump failed");
            false
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_file = (!args.dump).then_some(args.log_file.as_str());
    if let Err(e) = init_logging(args.verbose, args.quiet, log_file) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    info!("survey-view {} starting", env!("CARGO_PKG_VERSION"));

    let store = match open_store(&args) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.dump {
        if !dump(store, args.kind, args.page) {
            std::process::exit(1);
        }
        return;
    }

    let app = App::new(store, args.kind, args.page);
    if let Err(e) = app.run(Duration::from_millis(100)) {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}
