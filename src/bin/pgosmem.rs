//! pgosmem - Reports PostgreSQL relation bytes resident in the OS page cache.
//!
//! Connects to the target database, walks its storage directory under the
//! cluster base path, runs `fincore` on every relation file and prints one
//! `database:relation:bytes` line per relation, largest first.
//!
//! Usage:
//!   pgosmem -m dbhost -d shop -u postgres -p secret

use std::path::Path;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use pgosmem::catalog::{self, CatalogRelationLookup, ConnectParams};
use pgosmem::collector::probe::FincoreProbe;
use pgosmem::collector::traits::RealFs;
use pgosmem::collector::{CollectError, collect_usage};
use pgosmem::report::UsageReport;

/// External page-cache inspection command, expected on PATH.
const FINCORE_COMMAND: &str = "fincore";

/// Cluster storage base directory; one subdirectory per database oid.
const BASE_DIR: &str = "/var/lib/postgresql/8.3/main/base";

/// Server port.
const PORT: u16 = 5432;

/// Reports per-relation OS page cache usage for one database.
#[derive(Parser)]
#[command(name = "pgosmem", about = "PostgreSQL OS page cache usage reporter", version)]
struct Args {
    /// Username for PostgreSQL.
    #[arg(short = 'u', long = "username")]
    username: Option<String>,

    /// Machine to connect to, aka hostname.
    #[arg(short = 'm', long = "machine")]
    machine: Option<String>,

    /// Database name to connect to.
    #[arg(short = 'd', long = "dbname")]
    dbname: Option<String>,

    /// Password for PostgreSQL.
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Failure of one pipeline stage, for the exit diagnostic.
struct RunError {
    stage: &'static str,
    message: String,
}

impl RunError {
    fn new(stage: &'static str, message: impl ToString) -> Self {
        Self {
            stage,
            message: message.to_string(),
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Logs go to stderr; the report owns stdout.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("pgosmem={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(&args) {
        error!(stage = e.stage, "{}", e.message);
        eprintln!("Error: {}: {}", e.stage, e.message);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), RunError> {
    let dbname = args.dbname.clone().unwrap_or_default();
    let params = ConnectParams {
        host: args.machine.clone().unwrap_or_default(),
        port: PORT,
        user: args.username.clone().unwrap_or_default(),
        password: args.password.clone().unwrap_or_default(),
    };

    info!("pgosmem {} starting", env!("CARGO_PKG_VERSION"));
    info!(host = %params.host, database = %dbname, "configuration");

    let databases = catalog::lookup_databases(&params, &dbname)
        .map_err(|e| RunError::new("lookup", e))?;
    if databases.is_empty() {
        return Err(RunError::new(
            "lookup",
            format!(
                "database {:?} not found (names containing \"template\" are excluded)",
                dbname
            ),
        ));
    }

    let fs = RealFs::new();
    let probe = FincoreProbe::new(FINCORE_COMMAND);
    let base_dir = Path::new(BASE_DIR);

    let mut report = UsageReport::new();
    for db in &databases {
        let mut lookup = CatalogRelationLookup::new(params.clone(), db.name.as_str());
        let usage = collect_usage(&fs, &mut lookup, &probe, base_dir, db)
            .map_err(|e| RunError::new(stage_of(&e), e))?;
        report.merge(usage);
    }

    let mut stdout = std::io::stdout().lock();
    report
        .render(&mut stdout)
        .map_err(|e| RunError::new("report", e))?;
    Ok(())
}

fn stage_of(e: &CollectError) -> &'static str {
    match e {
        CollectError::Scan(_) => "scan",
        CollectError::Catalog(_) => "lookup",
        CollectError::Probe(_) => "probe",
    }
}
