//! `fgate` command line entry point

use anyhow::Context;
use clap::{Arg, ArgAction, Command, value_parser};
use fgate_cli::report::experiment_error;
use fgate_cli::{EvaluationReport, ExperimentReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("fgate")
        .version(fgate_cli::VERSION)
        .about("Evaluate feature decisions and experiment enrollments")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("evaluate")
                .about("Evaluate every feature in a decision file")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Decision file (.json, otherwise YAML)"),
                )
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .help("Marker class prefix, overriding the file's"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate-experiment")
                .about("Validate an experiment enrollment config")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Enrollment file (.json, otherwise YAML)"),
                )
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .help("Show the bucket this subject is assigned to"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("evaluate", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing decision file")?;
            let prefix = args.get_one::<String>("prefix").map(String::as_str);

            let report = EvaluationReport::from_path(path, prefix)
                .with_context(|| format!("evaluating {}", path.display()))?;

            if args.get_flag("json") {
                println!("{}", report.render_json()?);
            } else {
                print!("{}", report.render_text());
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("validate-experiment", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing enrollment file")?;
            let subject = args.get_one::<String>("subject").map(String::as_str);

            match ExperimentReport::from_path(path, subject) {
                Ok(report) => {
                    if args.get_flag("json") {
                        println!("{}", report.render_json()?);
                    } else {
                        print!("{}", report.render_text());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => match experiment_error(&err) {
                    Some(invalid) => {
                        eprintln!("invalid experiment config: {invalid}");
                        Ok(ExitCode::from(2))
                    }
                    None => Err(err).with_context(|| format!("reading {}", path.display())),
                },
            }
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
