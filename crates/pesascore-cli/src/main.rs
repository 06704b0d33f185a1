mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::io;
use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use pesascore_client::ClientError;
use stdout_io::write_stdout_text;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV_VAR: &str = "PESASCORE_LOG";
const DEFAULT_LOG_DIRECTIVE: &str = "warn";

const ROOT_HELP: &str = "PesaScore - M-Pesa SMS parsing, credit scoring and funding analysis

Usage:
  pesascore <command>

Start here:
  pesascore sms parse <path>
  pesascore sms import --help
  pesascore score compute --help
";

const TOP_LEVEL_HELP: &str = "PesaScore - M-Pesa SMS parsing, credit scoring and funding analysis

USAGE: pesascore <command>

Read your M-Pesa messages:
  1. pesascore sms parse <path>                                   Preview what each message parses into
  2. pesascore sms import --account <ref> <path>                  Store parsed transactions for an account
  3. pesascore sms list --account <ref>                           List stored transactions, newest first
  4. pesascore account summary --account <ref>                    Balance and money flow for the last 30 days

Credit scoring:
  pesascore score compute --subject <ref> <profile.json>          Score a financial profile and record it
  pesascore score history --subject <ref>                         Show recorded scores, newest first

Funding applications:
  pesascore funding analyze <application.json> [--subject <ref>]  Score an application and suggest next steps

Every command accepts --json for machine-readable output.
Set PESASCORE_HOME to choose the ledger directory and PESASCORE_LOG to see diagnostics on stderr.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

/// Diagnostics go to stderr so stdout stays parseable in `--json` mode.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();
    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
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
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);
    debug!(?mode, "dispatching command");

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

/// Help and version requests succeed; every other clap error is rendered
/// through the same error contract as command failures.
fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let body = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&body).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let command_hint = command_path_from_args(raw_args);
            let parse_error = parse_error_with_command_hint(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's trailing usage and "For more information" lines so the
/// "What to do next" section is the only guidance shown.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_start_matches("error: ").trim_end().to_string()
}

/// The `<group> <command>` pair named in the raw args, for help hints.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let non_flags = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<&str>>();

    let hint = match non_flags.as_slice() {
        ["sms", "parse", ..] => "sms parse",
        ["sms", "import", ..] => "sms import",
        ["sms", "list", ..] => "sms list",
        ["sms", ..] => "sms",
        ["account", "summary", ..] => "account summary",
        ["account", ..] => "account",
        ["score", "compute", ..] => "score compute",
        ["score", "history", ..] => "score history",
        ["score", ..] => "score",
        ["funding", "analyze", ..] => "funding analyze",
        ["funding", ..] => "funding",
        _ => return None,
    };
    Some(hint.to_string())
}

fn parse_error_with_command_hint(clean_message: &str, command_hint: Option<&str>) -> ClientError {
    if matches!(command_hint, Some("sms import" | "sms parse"))
        && clean_message.contains("unexpected argument")
    {
        return ClientError::invalid_argument_with_recovery(
            "Pass at most one message file per call, or pipe messages on stdin.",
            vec![
                "Combine message files first, then pass the combined file.".to_string(),
                "Use stdin: `cat inbox.json | pesascore sms import --account <ref> -`.".to_string(),
            ],
        );
    }

    ClientError::invalid_argument_for_command(clean_message, command_hint)
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.is_internal() {
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
