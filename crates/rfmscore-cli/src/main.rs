mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use rfmscore_engine::EngineError;
use stdout_io::write_stdout_text;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "RFMSCORE_LOG";

const ROOT_HELP: &str = "rfmscore - Recency-Frequency-Monetary customer scoring

Usage:
  rfmscore <command>

Start here:
  rfmscore score --help
  rfmscore score orders.csv --as-of 2026-03-31
  rfmscore segments example
";

const TOP_LEVEL_HELP: &str = "rfmscore - Recency-Frequency-Monetary customer scoring

USAGE: rfmscore <command>

Score customers:
  rfmscore score <path>                              Score a JSON or CSV transaction file
  rfmscore score <path> --as-of YYYY-MM-DD           Measure recency against a fixed date
  cat orders.csv | rfmscore score                    Read transactions from stdin
  rfmscore score <path> --json                       Emit the full result as JSON

Label customers with segments:
  1. rfmscore segments example > segments.json       Start from a reference configuration
  2. rfmscore segments check segments.json           Validate your rules
  3. rfmscore score <path> --segments segments.json  Score and label

Logs go to stderr. Set RFMSCORE_LOG=debug for per-stage detail.
Run `rfmscore <command> --help` for command usage.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return Err(report_parse_error(&err, &raw_args)),
    };
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

/// Help and version requests exit 0; real parse errors render like any other
/// failure and exit 1.
fn report_parse_error(err: &clap::Error, raw_args: &[String]) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let body = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            return match write_stdout_text(&body) {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::from(2),
            };
        }
        ErrorKind::DisplayVersion => {
            return match write_stdout_text(&err.to_string()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::from(2),
            };
        }
        _ => {}
    }

    let command_hint = if matches!(
        err.kind(),
        ErrorKind::MissingRequiredArgument
            | ErrorKind::InvalidValue
            | ErrorKind::ValueValidation
            | ErrorKind::WrongNumberOfValues
            | ErrorKind::UnknownArgument
            | ErrorKind::InvalidSubcommand
    ) {
        command_path_from_args(raw_args)
    } else {
        None
    };
    let clean_message = strip_clap_boilerplate(&err.to_string());
    let parse_error = EngineError::invalid_argument_for_command(&clean_message, command_hint);
    let mode = infer_requested_output_mode(raw_args);
    if output::print_failure(&parse_error, mode).is_err() {
        return ExitCode::from(2);
    }
    ExitCode::from(1)
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Cuts clap's `Usage:` and `For more information` trailer so the recovery
/// steps are the only guidance printed.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Maps raw args to the subcommand path used in `--help` hints.
fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();

    match non_flags.as_slice() {
        ["score", ..] => Some("score"),
        ["segments", "check", ..] => Some("segments check"),
        ["segments", "example", ..] => Some("segments example"),
        ["segments", ..] => Some("segments"),
        _ => None,
    }
}

fn exit_code_for_error(error: &EngineError) -> ExitCode {
    if error.code.starts_with("internal_") {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
