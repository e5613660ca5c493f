use std::io::{self, Write};
use std::process;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ticketlist::render::{DEFAULT_SEPARATOR, print_list};
use ticketlist::{ListStore, StoreConfig};

const NAMES: [&str; 6] = ["Adewale", "Olufemi", "Nneka", "Jacob", "Adetola", "Kemi"];

struct Args {
    capacity: Option<usize>,
    separator: String,
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: ticketlist-demo [--capacity <n>] [--separator <text>]");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --capacity <n>       Number of list slots [default: $TICKETLIST_CAPACITY or 1024]");
            eprintln!("  --separator <text>   Text printed between payloads [default: \" -> \"]");
            process::exit(2);
        }
    };

    init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Initialize tracing with TICKETLIST_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("TICKETLIST_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("ticketlist={level},ticketlist_demo={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");
    let json = use_json.then(|| fmt::layer().json().with_writer(io::stderr));
    let text = (!use_json).then(|| fmt::layer().with_writer(io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        capacity: None,
        separator: DEFAULT_SEPARATOR.to_string(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--capacity" => {
                let value = args.next().ok_or("--capacity requires a value")?;
                let capacity = value
                    .parse()
                    .map_err(|_| format!("invalid capacity '{value}'"))?;
                parsed.capacity = Some(capacity);
            }
            "--separator" => {
                parsed.separator = args.next().ok_or("--separator requires a value")?;
            }
            "--help" | "-h" => return Err(String::new()),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(parsed)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = StoreConfig::from_env();
    if let Some(capacity) = args.capacity {
        config = config.with_capacity(capacity);
    }
    config.validate().context("invalid store configuration")?;

    info!(capacity = config.capacity, "ticketlist {}", env!("CARGO_PKG_VERSION"));

    let mut store = ListStore::from_config(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "\nCommands Test 1\n")?;
    let first = store.create(NAMES[0])?;
    for name in &NAMES[1..] {
        store.append(first, *name)?;
    }
    print_list(&mut out, &store, first, &args.separator)?;
    store.delete(first)?;

    writeln!(out, "Commands Test 2\n")?;
    let second = store.create(NAMES[0])?;
    for name in &NAMES[1..] {
        store.append(second, *name)?;
    }
    print_list(&mut out, &store, second, &args.separator)?;
    store.remove_head(second)?;
    print_list(&mut out, &store, second, &args.separator)?;
    store.insert_head(second, "Chiamaka")?;
    print_list(&mut out, &store, second, &args.separator)?;
    store.remove_tail(second)?;
    print_list(&mut out, &store, second, &args.separator)?;
    store.delete(second)?;

    writeln!(out, "\nStale Ticket Test\n")?;
    match print_list(&mut out, &store, first, &args.separator) {
        Ok(()) => anyhow::bail!("deleted ticket {first} still resolves"),
        Err(e) => {
            warn!(ticket = %first, error = %e, "Stale ticket rejected as expected");
            writeln!(out, "{}", store.last_error())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.capacity, None);
        assert_eq!(parsed.separator, " -> ");
    }

    #[test]
    fn capacity_and_separator() {
        let parsed = args(&["--capacity", "8", "--separator", ", "]).unwrap();
        assert_eq!(parsed.capacity, Some(8));
        assert_eq!(parsed.separator, ", ");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            args(&["--capacity"]).err().as_deref(),
            Some("--capacity requires a value")
        );
        assert_eq!(
            args(&["--capacity", "many"]).err().as_deref(),
            Some("invalid capacity 'many'")
        );
        assert_eq!(
            args(&["--verbose"]).err().as_deref(),
            Some("unknown argument: --verbose")
        );
        assert_eq!(args(&["-h"]).err().as_deref(), Some(""));
    }

    #[test]
    fn tracing_can_be_initialized_twice() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging");
    }

    #[test]
    fn demo_runs_to_completion() {
        let parsed = args(&["--capacity", "2"]).unwrap();
        run(&parsed).unwrap();
    }
}
