//! this binary starts the studentdb REST server
//! to see the list of options, type: `studentdb-server --help`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;

use clap::{crate_version, App, Arg};
use studentdb::{DbError, JsonFileStore, Result, StudentServer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_STORAGE: &str = "storage.json";
const DEFAULT_LOG_LEVEL: &str = "info";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    storage: PathBuf,
    level: Level,
}

impl Opt {
    /// validates the `addr` and `level` parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`DbError::Parsing`] if one of the parameters is invalid
    ///
    fn build(addr: &str, storage: &str, level: &str) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            DbError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;
        let level: Level = level
            .parse()
            .map_err(|_| DbError::Parsing(format!("unknown log level: {}", level)))?;

        Ok(Opt {
            addr,
            storage: PathBuf::from(storage),
            level,
        })
    }
}

#[tokio::main]
async fn main() {
    // parse command line args
    let matches = App::new("studentdb-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a REST server over a JSON file of student records")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("storage")
            .long("storage")
            .value_name("PATH")
            .help("sets the JSON file that holds the student records")
            .default_value(DEFAULT_STORAGE))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the most verbose level that is logged: trace, debug, info, warn or error")
            .default_value(DEFAULT_LOG_LEVEL))
        .get_matches();

    // defaults are set on every arg, so these are always present
    let opt = match Opt::build(
        matches.value_of("addr").unwrap_or(DEFAULT_ADDRESS),
        matches.value_of("storage").unwrap_or(DEFAULT_STORAGE),
        matches.value_of("log-level").unwrap_or(DEFAULT_LOG_LEVEL),
    ) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // set up a tracing subscriber to log to STDERR
    subscriber_config(opt.level);

    // start the server
    if let Err(e) = run(opt).await {
        eprintln!("{}", e);
        exit(1);
    }
}

async fn run(opt: Opt) -> Result<()> {
    info!("studentdb-server {}", env!("CARGO_PKG_VERSION"));
    info!("Storage file: {:?}", opt.storage);

    let store = JsonFileStore::create_if_missing(&opt.storage)?;
    StudentServer::new(store).run(opt.addr).await
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: Level) {
    let subscriber = FmtSubscriber::builder()
        // all spans/events at `level` or less verbose will be written
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install the tracing subscriber: {}", e);
    }
}
