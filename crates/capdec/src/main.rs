use std::io;
use std::io::Read;

use anyhow::Context;
use clap::Parser;
use log::{info, LevelFilter};

use capwire::{FilterPolicy, ProductParser, ProductShape};

mod cli;

use cli::{Args, CliError};

/// Exit status when the product is discarded
const EXIT_DISCARDED: i32 = 2;

fn main() {
    match capdec() {
        Ok(code) => std::process::exit(code),
        Err(cli_error) => cli_error.exit(),
    }
}

fn capdec() -> Result<i32, CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    let payload = read_payload(&args)?;
    let shape = product_shape(&args, &payload);

    let parser = ProductParser::new(FilterPolicy::default());
    match parser.parse(&payload, shape) {
        Some(alert) => {
            if !args.quiet {
                let json = if args.pretty {
                    serde_json::to_string_pretty(&alert)
                } else {
                    serde_json::to_string(&alert)
                }
                .context("unable to serialize alert")?;
                println!("{}", json);
            }
            Ok(0)
        }
        None => {
            info!("product discarded");
            Ok(EXIT_DISCARDED)
        }
    }
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            3.. => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("capwire", log_filter)
            .filter_module("capdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn read_payload(args: &Args) -> Result<String, anyhow::Error> {
    let mut payload = String::new();
    if args.input_is_stdin() {
        info!("reading product from standard input");
        io::stdin()
            .lock()
            .read_to_string(&mut payload)
            .context("unable to read standard input")?;
    } else {
        info!("reading product from file: \"{}\"", &args.file);
        payload = std::fs::read_to_string(&args.file)
            .with_context(|| format!("Unable to open --file \"{}\"", args.file))?;
    }
    Ok(payload)
}

// Shape selection: an explicit flag wins; otherwise markup-looking
// input is treated as a CAP stanza.
fn product_shape(args: &Args, payload: &str) -> ProductShape {
    if args.cap {
        ProductShape::CapEnvelope
    } else if args.plain {
        ProductShape::PlainText
    } else if payload.trim_start().starts_with('<') {
        ProductShape::CapEnvelope
    } else {
        ProductShape::PlainText
    }
}
