// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use dsr_cli::{
    parse_points, points_to_json, render_summary, render_validation_summary, result_to_json,
    validation_to_json,
};
use dsr_core::{CorrectionOptions, DsrError, ProgressSink, ValidationOptions};
use dsr_engine::{run_batch, validate_batch, BatchOptions};
use log::info;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

struct CommonArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    tolerance: Option<f64>,
    max_delta: Option<f64>,
    max_cumulative: Option<f64>,
}

impl Default for CommonArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            tolerance: None,
            max_delta: None,
            max_cumulative: None,
        }
    }
}

struct CorrectArgs {
    common: CommonArgs,
    report: Option<PathBuf>,
    seed: u64,
    no_minimal: bool,
    change_range: Option<f64>,
}

enum Command {
    Validate(CommonArgs),
    Correct(CorrectArgs),
}

fn usage() -> ! {
    eprintln!(
        "usage: dsr <command> [options]\n\
         \n\
         commands:\n\
         \u{20}  validate   check recurrence and magnitude invariants\n\
         \u{20}  correct    repair violations via the tiered cascade\n\
         \n\
         common options:\n\
         \u{20}  --input <path>            points JSON (required)\n\
         \u{20}  --output <path>           write output JSON here instead of stdout\n\
         \u{20}  --tolerance <float>       cumulative tolerance\n\
         \u{20}  --max-delta <float>       per-period magnitude bound\n\
         \u{20}  --max-cumulative <float>  cumulative magnitude bound\n\
         \n\
         correct options:\n\
         \u{20}  --report <path>           write the correction report JSON here\n\
         \u{20}  --seed <int>              RNG seed for reproducible runs (default 0)\n\
         \u{20}  --range <float>           partial-tier random change range\n\
         \u{20}  --no-minimal              skip the minimal global tier"
    );
    process::exit(2);
}

fn parse_f64(flag: &str, value: Option<String>) -> f64 {
    let Some(raw) = value else {
        eprintln!("error: {flag} requires a value");
        usage();
    };
    match raw.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!("error: {flag} expects a float, got {raw}");
            usage();
        }
    }
}

fn parse_u64(flag: &str, value: Option<String>) -> u64 {
    let Some(raw) = value else {
        eprintln!("error: {flag} requires a value");
        usage();
    };
    match raw.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!("error: {flag} expects an integer, got {raw}");
            usage();
        }
    }
}

fn parse_path(flag: &str, value: Option<String>) -> PathBuf {
    let Some(raw) = value else {
        eprintln!("error: {flag} requires a value");
        usage();
    };
    PathBuf::from(raw)
}

fn parse_args() -> Command {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        usage();
    };

    let mut common = CommonArgs::default();
    let mut report = None;
    let mut seed = 0_u64;
    let mut no_minimal = false;
    let mut change_range = None;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--input" => common.input = parse_path(&flag, args.next()),
            "--output" => common.output = Some(parse_path(&flag, args.next())),
            "--tolerance" => common.tolerance = Some(parse_f64(&flag, args.next())),
            "--max-delta" => common.max_delta = Some(parse_f64(&flag, args.next())),
            "--max-cumulative" => common.max_cumulative = Some(parse_f64(&flag, args.next())),
            "--report" => report = Some(parse_path(&flag, args.next())),
            "--seed" => seed = parse_u64(&flag, args.next()),
            "--range" => change_range = Some(parse_f64(&flag, args.next())),
            "--no-minimal" => no_minimal = true,
            "-h" | "--help" => usage(),
            other => {
                eprintln!("error: unknown option {other}");
                usage();
            }
        }
    }

    if common.input.as_os_str().is_empty() {
        eprintln!("error: --input is required");
        usage();
    }

    match command.as_str() {
        "validate" => Command::Validate(common),
        "correct" => Command::Correct(CorrectArgs {
            common,
            report,
            seed,
            no_minimal,
            change_range,
        }),
        other => {
            eprintln!("error: unknown command {other}");
            usage();
        }
    }
}

fn validation_options(common: &CommonArgs) -> ValidationOptions {
    let mut options = ValidationOptions::default();
    if let Some(tolerance) = common.tolerance {
        options.cumulative_tolerance = tolerance;
    }
    if let Some(max_delta) = common.max_delta {
        options.max_current_period_value = max_delta;
    }
    if let Some(max_cumulative) = common.max_cumulative {
        options.max_cumulative_value = max_cumulative;
    }
    options
}

fn correction_options(args: &CorrectArgs) -> CorrectionOptions {
    let mut options = CorrectionOptions::default();
    if let Some(tolerance) = args.common.tolerance {
        options.cumulative_tolerance = tolerance;
    }
    if let Some(max_delta) = args.common.max_delta {
        options.max_current_period_value = max_delta;
    }
    if let Some(max_cumulative) = args.common.max_cumulative {
        options.max_cumulative_value = max_cumulative;
    }
    if let Some(range) = args.change_range {
        options.random_change_range = range;
    }
    options.enable_minimal_modification = !args.no_minimal;
    options
}

struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, processed: usize, total: usize) {
        if processed == total || processed % 100 == 0 {
            info!("processed {processed}/{total} points");
        }
    }
}

fn read_input(path: &PathBuf) -> Result<String, DsrError> {
    fs::read_to_string(path)
        .map_err(|err| DsrError::invalid_input(format!("cannot read {}: {err}", path.display())))
}

fn write_output(path: &PathBuf, contents: &str) -> Result<(), DsrError> {
    fs::write(path, contents)
        .map_err(|err| DsrError::invalid_input(format!("cannot write {}: {err}", path.display())))
}

fn run_validate(common: CommonArgs) -> Result<(), DsrError> {
    let mut points = parse_points(&read_input(&common.input)?)?;
    let results = validate_batch(&mut points, &validation_options(&common))?;

    if let Some(path) = &common.output {
        write_output(path, &validation_to_json(&results)?)?;
    }
    print!("{}", render_validation_summary(&results));
    Ok(())
}

fn run_correct(args: CorrectArgs) -> Result<(), DsrError> {
    let mut points = parse_points(&read_input(&args.common.input)?)?;
    let progress = LogProgress;
    let batch = BatchOptions::with_seed(args.seed).with_progress(&progress);

    let result = run_batch(
        &mut points,
        &validation_options(&args.common),
        &correction_options(&args),
        &batch,
    )?;

    if let Some(path) = &args.common.output {
        write_output(path, &points_to_json(&points)?)?;
    }
    if let Some(path) = &args.report {
        write_output(path, &result_to_json(&result)?)?;
    }
    print!("{}", render_summary(&result));
    Ok(())
}

fn main() {
    env_logger::init();

    let outcome = match parse_args() {
        Command::Validate(common) => run_validate(common),
        Command::Correct(args) => run_correct(args),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
