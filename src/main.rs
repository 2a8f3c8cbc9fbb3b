extern crate hs100;

use std::{io, path::Path, process};

use clap::{App, Arg, ArgMatches};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hs100::{commands, config, dispatch, Config, Dispatcher, Error, Options};

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(matches: &ArgMatches) -> Result<i32, Error> {
    // an invalid action must fail before anything else happens
    let requested = matches.value_of("do").map(commands::lookup).transpose()?;
    let path = matches.value_of("config").unwrap_or(config::DEFAULT_PATH);
    let config = Config::load(Path::new(path))?;

    if matches.is_present("displayconfig") {
        for line in config.display() {
            println!("{}", line);
        }
        return Ok(0);
    }

    let action = match requested {
        Some(action) => action,
        None => commands::lookup(config.default_action())?,
    };
    let devices = config.resolve(matches.value_of("device"), matches.is_present("all"))?;
    debug!(%action, devices = devices.len(), "resolved");

    let dispatcher = Dispatcher::new(Options {
        debug: matches.is_present("debug"),
    });
    let stdout = io::stdout();
    let outcomes = dispatcher.run(action, &devices, &mut stdout.lock())?;

    Ok(dispatch::exit_code(&outcomes))
}

fn main() {
    let do_help = format!(
        "One of: {}. Defaults to the configured action, else on",
        commands::names()
    );
    let matches = App::new("hs100")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Control TPLink smart plugs on the local network.")
        .arg(Arg::with_name("config")
            .long("config")
            .value_name("FILE")
            .default_value(config::DEFAULT_PATH)
            .help("Configuration file: /path/to/file.yaml")
        )
        .arg(Arg::with_name("do")
            .long("do")
            .value_name("ACTION")
            .help(&do_help)
        )
        .arg(Arg::with_name("device")
            .long("device")
            .value_name("NAME")
            .help("Configured device to talk to, or all")
        )
        .arg(Arg::with_name("all")
            .long("all")
            .takes_value(false)
            .help("Talk to every configured device")
        )
        .arg(Arg::with_name("debug")
            .long("debug")
            .takes_value(false)
            .help("Display debugging information")
        )
        .arg(Arg::with_name("displayconfig")
            .long("displayconfig")
            .takes_value(false)
            .help("Display configuration")
        )
        .get_matches();

    init_tracing(matches.is_present("debug"));

    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(err.exit_code());
        }
    }
}
