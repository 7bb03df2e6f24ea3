//! # Trestle CLI
//!
//! Command-line front end for `trestle_core`. Every command reads JSON, prints
//! its result as JSON (or CSV with `--csv`) on stdout, and prints warnings as
//! plain lines on stderr.
//!
//! ```text
//! trestle [--config engine.toml] [--csv] relocate <model.json> <elevation> <name>...
//! trestle [--config engine.toml] [--csv] clash <request.json> [tolerance]
//! trestle [--config engine.toml] [--csv] spectrum <params.json>
//! ```
//!
//! Logging goes to stderr and is controlled by `TRESTLE_LOG`
//! (e.g. `TRESTLE_LOG=trestle_core=debug`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use std::time::Duration;

use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trestle_core::clash::{ClashReport, ClashWorker};
use trestle_core::export::{clash_records_csv, spectral_points_csv};
use trestle_core::file_io::{load_clash_request, load_json, load_model};
use trestle_core::relocation::relocate_elements;
use trestle_core::seismic::generate_spectrum;
use trestle_core::snapshot::ModelSnapshot;
use trestle_core::{
    ElevationRelocationRequest, EngineConfig, EngineError, EngineResult, SpectrumParams, Warning,
};

const USAGE: &str = "\
Usage:
  trestle [--config <file.toml>] [--csv] relocate <model.json> <elevation> <name>...
  trestle [--config <file.toml>] [--csv] clash <request.json> [tolerance]
  trestle [--config <file.toml>] [--csv] spectrum <params.json>";

const POLL: Duration = Duration::from_millis(250);

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("TRESTLE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("trestle_core=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

struct Options {
    config: Option<PathBuf>,
    csv: bool,
    command: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        config: None,
        csv: false,
        command: Vec::new(),
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a file argument")?;
                options.config = Some(PathBuf::from(path));
            }
            "--csv" => options.csv = true,
            "-h" | "--help" => return Err(String::new()),
            _ => options.command.push(arg),
        }
    }
    Ok(options)
}

fn main() -> ExitCode {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) if !options.command.is_empty() => options,
        Ok(_) => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}", message);
            }
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("Error: {}", message);
            eprintln!("{}", USAGE);
            ExitCode::from(2)
        }
        Err(CliError::Engine(e)) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

enum CliError {
    Usage(String),
    Engine(EngineError),
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}

fn run(options: &Options) -> Result<(), CliError> {
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let (command, rest) = options
        .command
        .split_first()
        .ok_or_else(|| CliError::Usage("missing command".to_string()))?;
    tracing::debug!(%command, args = rest.len(), "running command");

    match command.as_str() {
        "relocate" => run_relocate(rest, &config, options.csv),
        "clash" => run_clash(rest, &config, options.csv),
        "spectrum" => run_spectrum(rest, &config, options.csv),
        other => Err(CliError::Usage(format!("unknown command '{}'", other))),
    }
}

fn run_relocate(args: &[String], config: &EngineConfig, csv: bool) -> Result<(), CliError> {
    if csv {
        return Err(CliError::Usage("relocate has no CSV output".to_string()));
    }
    let [model_path, elevation, targets @ ..] = args else {
        return Err(CliError::Usage(
            "relocate needs <model.json> <elevation> <name>...".to_string(),
        ));
    };
    if targets.is_empty() {
        return Err(CliError::Usage("relocate needs at least one element name".to_string()));
    }
    let elevation: f64 = parse_number("elevation", elevation)?;

    let model = load_model(Path::new(model_path))?;
    let request = ElevationRelocationRequest::new(targets.iter().cloned(), elevation);
    let outcome = relocate_elements(model.all_elements(), &request, config)?;

    print_warnings(&outcome.warnings);
    eprintln!(
        "relocated {} of {} element(s) to elevation {}",
        outcome.relocated.len(),
        request.targets.len(),
        elevation
    );

    let mut updated = ModelSnapshot::new(model.name, model.discipline);
    updated.elements = outcome.elements;
    print_json(&updated)
}

fn run_clash(args: &[String], config: &EngineConfig, csv: bool) -> Result<(), CliError> {
    let (request_path, tolerance) = match args {
        [path] => (path, config.clash_tolerance),
        [path, tolerance] => (path, parse_number("tolerance", tolerance)?),
        _ => return Err(CliError::Usage("clash needs <request.json> [tolerance]".to_string())),
    };

    let request = load_clash_request(Path::new(request_path))?;
    let mut worker = ClashWorker::new(tolerance);
    worker.start(request);

    let event = worker
        .wait_until_done(POLL)
        .ok_or_else(|| EngineError::detector_failed("clash run ended without a result"))?;

    let mut report = ClashReport::default();
    report.apply(event)?;
    eprintln!("{} clash(es) found", report.len());

    if csv {
        print!("{}", clash_records_csv(&report.records));
        Ok(())
    } else {
        print_json(&report)
    }
}

fn run_spectrum(args: &[String], config: &EngineConfig, csv: bool) -> Result<(), CliError> {
    let [params_path] = args else {
        return Err(CliError::Usage("spectrum needs <params.json>".to_string()));
    };

    let params: SpectrumParams = load_json(Path::new(params_path))?;
    let points = generate_spectrum(&params, &config.spectrum)?;

    if csv {
        print!("{}", spectral_points_csv(&points));
        Ok(())
    } else {
        print_json(&points)
    }
}

fn parse_number(field: &str, value: &str) -> EngineResult<f64> {
    value
        .parse()
        .map_err(|_| EngineError::invalid_input(field, value, "Expected a number"))
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("warning [{}]: {}", warning.code(), warning);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(EngineError::from)?;
    println!("{}", json);
    Ok(())
}
