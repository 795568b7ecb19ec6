use std::{env, ffi::OsString};

use anyhow::Result;
use clap::{
    arg, crate_authors, crate_name, crate_version, value_parser, ArgAction, ArgMatches, Command,
};
use tscan::{
    logger, report,
    scan::{ScanConfig, Scanner},
};

struct ParsedArgs {
    debug: bool,
    target: String,
    start_port: u16,
    end_port: u16,
    threads: usize,
}

fn parse_args(matches: ArgMatches) -> ParsedArgs {
    // Every argument below is either required or has a default value.
    ParsedArgs {
        debug: matches.get_flag("debug"),
        target: matches.get_one::<String>("target").unwrap().to_owned(),
        start_port: *matches.get_one::<u16>("start-port").unwrap(),
        end_port: *matches.get_one::<u16>("end-port").unwrap(),
        threads: *matches.get_one::<usize>("threads").unwrap(),
    }
}

/// Rewrites the two-letter short flags (`-sp`, `-ep`) into their long
/// forms, since clap only knows single character shorts.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-sp") => OsString::from("--start-port"),
            Some("-ep") => OsString::from("--end-port"),
            _ => arg,
        })
        .collect()
}

fn command() -> Command {
    Command::new(crate_name!())
        .about("Simple TCP connect port scanner.")
        .version(crate_version!())
        .arg_required_else_help(true)
        .author(crate_authors!())
        .args([
            arg!(-d --debug "Turns on debugging information").action(ArgAction::SetTrue),
            arg!([target] "Address or hostname to scan").required(true),
        ])
        .args([
            arg!(-s --"start-port" <PORT> "Starting port number, also -sp")
                .value_parser(value_parser!(u16).range(1..))
                .default_value("1"),
            arg!(-e --"end-port" <PORT> "Ending port number, also -ep")
                .value_parser(value_parser!(u16).range(1..))
                .default_value("1024"),
            arg!(-t --threads <THREADS> "Number of concurrent probes")
                .value_parser(value_parser!(usize))
                .default_value("100"),
        ])
}

fn main() -> Result<()> {
    let arg_matches = command().get_matches_from(normalize_args(env::args_os()));

    // Extract arguments.
    let parsed = parse_args(arg_matches);

    // Set debug if desired.
    if parsed.debug {
        logger::init();
    }

    // Bad input is rejected before anything touches the network.
    let config = ScanConfig::new(
        parsed.target.as_str(),
        parsed.start_port,
        parsed.end_port,
        parsed.threads,
    )?;

    print!(
        "{}",
        report::banner(
            &parsed.target,
            parsed.start_port,
            parsed.end_port,
            parsed.threads
        )
    );

    let result = Scanner::new(config).start()?;

    log::debug!("Scan duration: {:.4}s", result.elapsed.as_secs_f32());

    print!(
        "{}",
        report::render(
            &parsed.target,
            parsed.start_port,
            parsed.end_port,
            &result.ports
        )
    );

    Ok(())
}
