mod app;

use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, BufRead},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use station_core::{
    config::{self, AppConfig},
    Console, Outcome, Script, SharedConsole, Station,
};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

const USAGE: &str = "usage: station [SCRIPT] [--headless]";

struct Args {
    script: Option<PathBuf>,
    headless: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        script: None,
        headless: false,
    };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--headless" => args.headless = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'\n{USAGE}"),
            path => {
                if args.script.is_some() {
                    bail!("only one script may be given\n{USAGE}");
                }
                args.script = Some(PathBuf::from(path));
            }
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config, args.headless)?;

    let script = match &args.script {
        Some(path) => Some(Script::load(path).await?),
        None => None,
    };
    let console = if script.as_ref().map_or(false, Script::opens_station) {
        Console::new(config.journal_capacity)
    } else {
        let station = Station::open(config.platforms).context("failed to open station")?;
        Console::with_station(station, config.journal_capacity)
    };

    if args.headless {
        return run_headless(console, script);
    }

    let mut app = app::StationApp::new(SharedConsole::new(console), config);
    if let Some(script) = script {
        app.attach_playback(script);
    }
    app.run().await
}

fn run_headless(mut console: Console, script: Option<Script>) -> Result<()> {
    let report = |outcome: Outcome| {
        if outcome != Outcome::Done {
            println!("{outcome}");
        }
    };

    match script {
        Some(script) => {
            info!(commands = script.len(), "replaying script");
            for line in &script.lines {
                match console.execute(&line.command) {
                    Ok(outcome) => report(outcome),
                    Err(err) => warn!(line = line.number, command = %line.command, "{err}"),
                }
            }
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = line.context("failed to read command from stdin")?;
                match console.execute_line(&line) {
                    Ok(Some(outcome)) => report(outcome),
                    Ok(None) => {}
                    Err(err) => warn!(command = line.trim(), "{err}"),
                }
            }
        }
    }

    let failures = console.journal().failures();
    if failures > 0 {
        info!(failures, "finished with rejected commands");
    }
    Ok(())
}

fn init_logging(config: &AppConfig, headless: bool) -> Result<()> {
    let log_dir = env::current_dir()?.join(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("station.log");

    let env_filter = EnvFilter::from_default_env();

    // the terminal UI owns stdout, so console output is headless-only
    let stderr_layer = headless.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(io::stderr)
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
