//! survey-submit - Validates and stores one survey response.
//!
//! Usage:
//!   survey-submit students --field age=14 --field gender=female ...
//!   survey-submit parents --json response.json
//!   survey-submit teachers --demo --json response.json

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::collections::BTreeMap;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use survey_portal::model::EntityKind;
use survey_portal::store::{MemoryStore, PostgresStore, RecordStore, StoreConfig, StoreError};
use survey_portal::survey::{FAILED_MESSAGE, SUBMITTED_MESSAGE, SubmitError, validate_and_submit};

/// Validates and stores one survey response.
#[derive(Parser)]
#[command(name = "survey-submit", about = "Survey response submitter", version)]
struct Args {
    /// Survey to fill: students, parents or teachers.
    #[arg(value_parser = parse_kind)]
    kind: EntityKind,

    /// Answer as name=value. Repeatable.
    #[arg(short, long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// JSON object with the answers. --field values override it.
    #[arg(long, value_name = "FILE")]
    json: Option<String>,

    /// Postgres connection string. Falls back to PGHOST/PGPORT/PGUSER/...
    #[arg(long, env = "SURVEY_DSN")]
    dsn: Option<String>,

    /// Negotiate TLS with the database.
    #[arg(long)]
    tls: bool,

    /// Validate and insert into built-in demo tables (nothing is persisted).
    #[arg(long)]
    demo: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn parse_kind(s: &str) -> Result<EntityKind, String> {
    EntityKind::parse(s).ok_or_else(|| format!("unknown kind '{}' (students, parents, teachers)", s))
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Reads a JSON object of answers. Scalars become their text form, nulls
/// are left out.
fn read_json(path: &str) -> Result<BTreeMap<String, String>, String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path, e))?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON in '{}': {}", path, e))?;

    let mut answers = BTreeMap::new();
    for (name, value) in object {
        let text = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return Err(format!("field '{}' must be a string, number or boolean", name)),
        };
        answers.insert(name, text);
    }
    Ok(answers)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("survey_portal={},survey_submit={}", level, level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(args: &Args) -> Result<Box<dyn RecordStore>, StoreError> {
    if args.demo {
        return Ok(Box::new(MemoryStore::with_survey_tables()));
    }
    let config = match &args.dsn {
        Some(dsn) => StoreConfig::new(dsn.as_str()),
        None => StoreConfig::from_env()?,
    }
    .with_tls(args.tls);
    info!(server = %config.redacted(), tls = config.tls, "connecting");
    Ok(Box::new(PostgresStore::new(config)))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut answers = match args.json.as_deref().map(read_json).transpose() {
        Ok(answers) => answers.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    answers.extend(args.fields.iter().cloned());

    let store = match open_store(&args) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", FAILED_MESSAGE);
            std::process::exit(1);
        }
    };

    match validate_and_submit(store.as_ref(), args.kind, &answers) {
        Ok(_) => println!("{}", SUBMITTED_MESSAGE),
        Err(SubmitError::Invalid(errors)) => {
            for e in &errors {
                eprintln!("  {}", e);
            }
            eprintln!("{}", FAILED_MESSAGE);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", FAILED_MESSAGE);
            std::process::exit(1);
        }
    }
}
