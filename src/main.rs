#[macro_use]
extern crate clap;

#[macro_use]
extern crate log;
extern crate env_logger;

use std::fs;
use std::io::{self, Read};
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use rustc_serialize::json::Json;

use xmlrpc_bridge::config::{Config, BACKEND_URL_VAR};
use xmlrpc_bridge::dispatch::{Backend, Dispatcher, ReplayBackend};
use xmlrpc_bridge::xmlrpc::{self, Value};
use xmlrpc_bridge::{json, Error, Result};

fn cli() -> Command {
    Command::new("xrb")
        .version(crate_version!())
        .about("Encode, decode and dispatch XML-RPC documents in front of a JSON backend")
        .arg(Arg::new("verbose").short('v').long("verbose").action(ArgAction::SetTrue).global(true).help("Verbose mode"))
        .arg(
            Arg::new("backend-url")
                .long("backend-url")
                .env(BACKEND_URL_VAR)
                .global(true)
                .help("Base URL of the JSON backend"),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_parser(value_parser!(usize))
                .global(true)
                .help("Deepest element nesting accepted when decoding"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("encode")
                .about("Read JSON on stdin, write a methodResponse")
                .arg(Arg::new("fragment").long("fragment").action(ArgAction::SetTrue).help("Write only the <value> element")),
        )
        .subcommand(Command::new("parse-value").about("Read an XML-RPC value on stdin, write it as JSON"))
        .subcommand(Command::new("parse-request").about("Read a methodCall on stdin, write method and parameters as JSON"))
        .subcommand(
            Command::new("call")
                .about("Run one operation against a canned backend answer")
                .arg(
                    Arg::new("operation")
                        .required(true)
                        .value_parser(["hello", "input", "sua", "int"])
                        .help("Operation to run"),
                )
                .arg(Arg::new("arg").long("arg").help("Name or input handed to the operation"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue).help("Write the result as JSON instead of XML-RPC"))
                .arg(Arg::new("reply").long("reply").required(true).help("File holding the backend's JSON body")),
        )
        .subcommand(
            Command::new("handle")
                .about("Dispatch a methodCall read on stdin against a canned backend answer")
                .arg(Arg::new("reply").long("reply").required(true).help("File holding the backend's JSON body")),
        )
}

fn config_from(matches: &ArgMatches) -> Config {
    let mut config = Config::from_env();
    if let Some(url) = matches.get_one::<String>("backend-url") {
        config.backend_url = url.clone();
    }
    if let Some(depth) = matches.get_one::<usize>("max-depth") {
        config.max_depth = *depth;
    }
    config.verbose = matches.get_flag("verbose");
    config
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    trace!("Read stdin: {}", input);
    Ok(input)
}

fn call_operation<B: Backend>(
    dispatcher: &Dispatcher<B>,
    operation: &str,
    arg: Option<&str>,
    as_json: bool,
) -> Result<String> {
    let text = match operation {
        "int" if as_json => json::from_value(&dispatcher.int(arg)?).pretty().to_string(),
        "int" => dispatcher.int_xml(arg)?,
        "hello" if as_json => json::from_string_map(&dispatcher.hello(arg)?).pretty().to_string(),
        "hello" => dispatcher.hello_xml(arg)?,
        "input" if as_json => json::from_string_map(&dispatcher.input(arg)?).pretty().to_string(),
        "input" => dispatcher.input_xml(arg)?,
        "sua" if as_json => json::from_string_map(&dispatcher.sua(arg)?).pretty().to_string(),
        "sua" => dispatcher.sua_xml(arg)?,
        other => return Err(Error::Dispatch(format!("Unknown method: {}", other))),
    };
    Ok(text)
}

fn run(matches: &ArgMatches, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("encode", sub)) => {
            let value = json::parse(&read_stdin()?)?.unwrap_or(Value::Nil);
            if sub.get_flag("fragment") {
                println!("{}", xmlrpc::as_xml(&value));
            } else {
                print!("{}", xmlrpc::encode(&value));
            }
        }
        Some(("parse-value", _)) => {
            let value = config.decode_options().parse_value(&read_stdin()?)?;
            println!("{}", json::from_value(&value).pretty());
        }
        Some(("parse-request", _)) => {
            let request = config.decode_options().parse_request(&read_stdin()?)?;
            let (method, params) = request.into_parts();
            let mut out = ::std::collections::BTreeMap::new();
            out.insert("method".to_string(), method.map_or(Json::Null, Json::String));
            out.insert("params".to_string(), json::from_value(&Value::Struct(params)));
            println!("{}", Json::Object(out).pretty());
        }
        Some(("call", sub)) => {
            let reply_path = sub.get_one::<String>("reply").map(String::as_str).unwrap_or_default();
            let backend = ReplayBackend::new(&config.backend_url, &fs::read_to_string(reply_path)?);
            let dispatcher = Dispatcher::with_options(backend, config.decode_options());
            let operation = sub.get_one::<String>("operation").map(String::as_str).unwrap_or_default();
            let arg = sub.get_one::<String>("arg").map(String::as_str);
            let text = call_operation(&dispatcher, operation, arg, sub.get_flag("json"))?;
            if text.ends_with('\n') {
                print!("{}", text);
            } else {
                println!("{}", text);
            }
        }
        Some(("handle", sub)) => {
            let reply_path = sub.get_one::<String>("reply").map(String::as_str).unwrap_or_default();
            let backend = ReplayBackend::new(&config.backend_url, &fs::read_to_string(reply_path)?);
            let reply = Dispatcher::with_options(backend, config.decode_options()).handle(&read_stdin()?);
            println!("HTTP/1.1 {}", reply.status);
            println!("Content-Type: {}", reply.content_type);
            println!();
            print!("{}", reply.body);
        }
        _ => unreachable!("a subcommand is required"),
    }
    Ok(())
}

fn main() {
    let matches = cli().get_matches();
    let config = config_from(&matches);

    // Init logging to DEBUG only if user required it
    let mut logger = env_logger::Builder::from_default_env();
    if config.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    debug!("Using backend: {}", config.backend_url);
    debug!("Max depth: {}", config.max_depth);

    if let Err(e) = run(&matches, &config) {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use rustc_serialize::json::Json;

    use super::{call_operation, cli, config_from};
    use xmlrpc_bridge::dispatch::{Dispatcher, ReplayBackend};
    use xmlrpc_bridge::xmlrpc::{parse_value, Value};

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let matches = cli()
            .try_get_matches_from(["xrb", "parse-value", "-v", "--max-depth", "12", "--backend-url", "http://b"])
            .unwrap();
        let config = config_from(&matches);
        assert!(config.verbose);
        assert_eq!(12, config.max_depth);
        assert_eq!("http://b", config.backend_url);
    }

    #[test]
    fn test_handle_requires_reply() {
        assert!(cli().try_get_matches_from(["xrb", "handle"]).is_err());
    }

    #[test]
    fn test_call_args() {
        let matches = cli()
            .try_get_matches_from(["xrb", "call", "sua", "--arg", "bob", "--json", "--reply", "body.json"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(Some("sua"), sub.get_one::<String>("operation").map(String::as_str));
        assert_eq!(Some("bob"), sub.get_one::<String>("arg").map(String::as_str));
        assert!(sub.get_flag("json"));

        assert!(cli().try_get_matches_from(["xrb", "call", "nope", "--reply", "b"]).is_err());
        assert!(cli().try_get_matches_from(["xrb", "call", "int"]).is_err());
    }

    #[test]
    fn test_call_operation_output() {
        let dispatcher = Dispatcher::new(ReplayBackend::new("http://b", r#"{"n": 3}"#));

        let text = call_operation(&dispatcher, "hello", Some("bob"), true).unwrap();
        assert_eq!(Some(&Json::String("3".to_string())), Json::from_str(&text).unwrap().find("n"));

        let text = call_operation(&dispatcher, "int", None, true).unwrap();
        assert_eq!(Some(3), Json::from_str(&text).unwrap().find("n").and_then(Json::as_i64));

        let text = call_operation(&dispatcher, "input", Some("x"), false).unwrap();
        assert_eq!(Some(&Value::from("3")), parse_value(&text).unwrap().find("n"));

        let text = call_operation(&dispatcher, "sua", None, false).unwrap();
        assert_eq!(Some(&Value::from("3")), parse_value(&text).unwrap().find("n"));

        assert!(call_operation(&dispatcher, "nope", None, false).is_err());
    }
}
