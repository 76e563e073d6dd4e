//! The studentdb-client executable supports the following command line arguments:
//!
//! `studentdb-client list [--addr IP-PORT]`
//!
//!     Print every student as a JSON array.
//!
//! `studentdb-client get <ID> [--addr IP-PORT]`
//!
//!     Print the student with the given id. A missing student is treated as an error.
//!
//! `studentdb-client add <JSON> [--addr IP-PORT]`
//!
//!     Add a student made of the fields of the given JSON object. The server assigns the id.
//!
//! `studentdb-client update <ID> <JSON> [--addr IP-PORT]`
//!
//!     Overwrite the fields of the given JSON object on the student with the given id.
//!
//! `studentdb-client rm <ID> [--addr IP-PORT]`
//!
//!     Remove the student(s) with the given id.
//!
//! --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT.
//! If --addr is not specified then connect on 127.0.0.1:5000.
//! Print an error and return a non-zero exit code on server error, or if IP-PORT does not
//! parse as an address.
//!
//! `studentdb-client -V`
//!
//!     Print the version.

use std::net::SocketAddr;

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use serde::Serialize;
use serde_json::{Map, Value};
use studentdb::{DbError, Result, StudentClient};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";

/// the request to send to the server
#[derive(Debug)]
enum Request {
    List,
    Get { id: String },
    Add { fields: Map<String, Value> },
    Update { id: String, fields: Map<String, Value> },
    Remove { id: String },
}

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    req: Request,
}

impl Opt {
    /// validates the `addr` parameter is a valid IP address and PORT
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`DbError::Parsing`] if one of the parameters is invalid
    ///
    fn build(addr: &str, req: Request) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            DbError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;

        Ok(Opt { addr, req })
    }
}

fn main() -> Result<()> {
    // configure a subscriber that will log messages to STDERR
    subscriber_config();

    let matches = App::new("studentdb-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a client for the studentdb REST server")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommands(vec![
            SubCommand::with_name("list").about("Print every student"),
            SubCommand::with_name("get")
                .about("Print the student with the given id")
                .arg(Arg::with_name("ID").required(true).index(1)),
            SubCommand::with_name("add")
                .about("Add a student from a JSON object of fields")
                .arg(Arg::with_name("JSON").required(true).index(1)),
            SubCommand::with_name("update")
                .about("Overwrite fields of a student from a JSON object of fields")
                .arg(Arg::with_name("ID").required(true).index(1))
                .arg(Arg::with_name("JSON").required(true).index(2)),
            SubCommand::with_name("rm")
                .about("Removes the student(s) with the given id")
                .arg(Arg::with_name("ID").required(true).index(1)),
        ])
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT of the server to connect to")
            .default_value(DEFAULT_ADDRESS)
            .global(true))
        .get_matches();

    let opt = parse_options(&matches)?;
    run(opt)
}

/// runs the specified request on the [`StudentClient`]
/// `opt` contains the server address and the request type to execute
fn run(opt: Opt) -> Result<()> {
    let client = StudentClient::connect(opt.addr)?;
    match opt.req {
        Request::List => print_json(&client.list()?),
        Request::Get { id } => match client.get(&id)? {
            Some(student) => print_json(&student),
            None => Err(DbError::StringErr("Student not found".to_string())),
        },
        Request::Add { fields } => print_json(&client.add(&fields)?),
        Request::Update { id, fields } => print_json(&client.update(&id, &fields)?),
        Request::Remove { id } => {
            println!("{}", client.remove(&id)?);
            Ok(())
        }
    }
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    // `--addr` is global, so it may have been given before or after the subcommand
    let addr = matches
        .subcommand()
        .1
        .and_then(|args| args.value_of("addr"))
        .or_else(|| matches.value_of("addr"))
        .unwrap_or(DEFAULT_ADDRESS);
    let req = match matches.subcommand() {
        ("list", Some(_)) => Request::List,
        ("get", Some(args)) => Request::Get { id: arg(args, "ID")? },
        ("add", Some(args)) => Request::Add {
            fields: json_fields(&arg(args, "JSON")?)?,
        },
        ("update", Some(args)) => Request::Update {
            id: arg(args, "ID")?,
            fields: json_fields(&arg(args, "JSON")?)?,
        },
        ("rm", Some(args)) => Request::Remove { id: arg(args, "ID")? },
        (other, _) => return Err(DbError::Parsing(format!("unknown command: {}", other))),
    };
    Opt::build(addr, req)
}

fn arg(args: &ArgMatches, name: &str) -> Result<String> {
    args.value_of(name)
        .map(String::from)
        .ok_or_else(|| DbError::Parsing(format!("missing argument {}", name)))
}

/// parses `text` as a JSON object of student fields
fn json_fields(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(DbError::Parsing(format!("expected a JSON object, got: {}", text))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// configures a tracing subscriber that will log warnings and errors to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install the tracing subscriber: {}", e);
    }
}
