use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_transaction_type(value: &str) -> Result<String, String> {
    match value {
        "credit" | "debit" => Ok(value.to_string()),
        _ => Err("type must be one of: credit, debit".to_string()),
    }
}

pub fn parse_period_days(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(0) => Err("days must be at least 1".to_string()),
        Ok(days) => Ok(days),
        Err(_) => Err("days must be a whole number".to_string()),
    }
}

/// Extended help shown after `pesascore sms import --help`.
pub const SMS_IMPORT_AFTER_HELP: &str = "\
How import works:
  Each message is parsed in three stages: known M-Pesa receipt templates,
  then keyword and entity analysis, then a short-receipt fallback.
  Parsed transactions are stored in your local ledger under --account.
  Messages that already exist for the account are reported as duplicates
  and never stored twice.

  Accepted inputs:
    JSON  one top-level array of message strings
    JSON  an object with a `messages` array of strings
    CSV   one header row with a `message`, `text`, `sms` or `body` column
    Text  one message per line

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path, or omit <path> and pipe.
  Example: cat inbox.json | pesascore sms import --account wallet -

What to do next:
  1. Run `pesascore sms parse <path>` to preview what will be recognized.
  2. Run `pesascore sms import --account <ref> <path>` to store it.
  3. Run `pesascore account summary --account <ref>` to review the result.
";

#[derive(Debug, Parser)]
#[command(
    name = "pesascore",
    version,
    about = "M-Pesa SMS parsing, credit scoring and funding analysis",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse M-Pesa SMS messages and manage imported transactions
    #[command(arg_required_else_help = true)]
    Sms {
        #[command(subcommand)]
        command: SmsCommand,
    },
    /// Summarize an imported account
    #[command(arg_required_else_help = true)]
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Compute and review credit scores
    #[command(arg_required_else_help = true)]
    Score {
        #[command(subcommand)]
        command: ScoreCommand,
    },
    /// Analyze funding applications
    #[command(arg_required_else_help = true)]
    Funding {
        #[command(subcommand)]
        command: FundingCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SmsCommand {
    /// Parse messages and report transactions without storing anything
    Parse {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a message file (use `-` for stdin)
        path: Option<String>,
    },
    /// Parse messages and store new transactions in the local ledger
    #[command(after_long_help = SMS_IMPORT_AFTER_HELP)]
    Import {
        /// Account reference the transactions belong to
        #[arg(long)]
        account: String,
        /// Phone number recorded for the account
        #[arg(long)]
        phone: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a message file (use `-` for stdin)
        path: Option<String>,
    },
    /// List stored transactions for an account, newest first
    List {
        /// Account reference to list
        #[arg(long)]
        account: String,
        /// Only show `credit` or `debit` transactions
        #[arg(long = "type", value_parser = parse_transaction_type)]
        transaction_type: Option<String>,
        /// Only show one category (e.g. utilities, transfer)
        #[arg(long)]
        category: Option<String>,
        /// Only show transactions on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        since: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AccountCommand {
    /// Show balance and money flow for a recent window
    Summary {
        /// Account reference to summarize
        #[arg(long)]
        account: String,
        /// Window length in days (default 30)
        #[arg(long, value_parser = parse_period_days)]
        days: Option<u32>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ScoreCommand {
    /// Score a financial profile and append it to the subject's history
    Compute {
        /// Subject the score is recorded under
        #[arg(long)]
        subject: String,
        /// Path to a financial profile JSON document
        profile: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Show a subject's score history, newest first
    History {
        /// Subject to show
        #[arg(long)]
        subject: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum FundingCommand {
    /// Score a funding application and suggest next steps
    Analyze {
        /// Path to a funding application JSON document
        application: String,
        /// Subject whose latest credit score personalizes the advice
        #[arg(long)]
        subject: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::{
        AccountCommand, Commands, FundingCommand, ScoreCommand, SmsCommand, parse_from,
    };

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 14] = [
            vec!["pesascore", "sms", "parse"],
            vec!["pesascore", "sms", "parse", "inbox.json", "--json"],
            vec!["pesascore", "sms", "parse", "-"],
            vec!["pesascore", "sms", "import", "--account", "wallet"],
            vec![
                "pesascore",
                "sms",
                "import",
                "--account",
                "wallet",
                "--phone",
                "254712345678",
                "inbox.csv",
            ],
            vec!["pesascore", "sms", "list", "--account", "wallet"],
            vec![
                "pesascore",
                "sms",
                "list",
                "--account",
                "wallet",
                "--type",
                "debit",
                "--category",
                "utilities",
                "--since",
                "2025-07-01",
                "--json",
            ],
            vec!["pesascore", "account", "summary", "--account", "wallet"],
            vec![
                "pesascore",
                "account",
                "summary",
                "--account",
                "wallet",
                "--days",
                "7",
                "--json",
            ],
            vec!["pesascore", "score", "compute", "--subject", "amina", "profile.json"],
            vec!["pesascore", "score", "history", "--subject", "amina"],
            vec!["pesascore", "score", "history", "--subject", "amina", "--json"],
            vec!["pesascore", "funding", "analyze", "application.json"],
            vec![
                "pesascore",
                "funding",
                "analyze",
                "application.json",
                "--subject",
                "amina",
                "--json",
            ],
        ];

        for case in cases {
            let parsed = parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse: {case:?}");
        }
    }

    #[test]
    fn parse_sms_import_fields() {
        let parsed = parse_from([
            "pesascore",
            "sms",
            "import",
            "--account",
            "wallet",
            "-",
            "--json",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Sms {
                    command: SmsCommand::Import {
                        json: true,
                        path: Some(ref path),
                        ..
                    },
                } if path == "-"
            ));
        }
    }

    #[test]
    fn parse_account_summary_days() {
        let parsed = parse_from(["pesascore", "account", "summary", "--account", "w", "--days", "14"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Account {
                    command: AccountCommand::Summary { days: Some(14), .. }
                }
            ));
        }
    }

    #[test]
    fn parse_score_and_funding_subcommands() {
        let compute = parse_from(["pesascore", "score", "compute", "--subject", "a", "p.json"]);
        assert!(compute.is_ok());
        if let Ok(cli) = compute {
            assert!(matches!(
                cli.command,
                Commands::Score {
                    command: ScoreCommand::Compute { json: false, .. }
                }
            ));
        }

        let analyze = parse_from(["pesascore", "funding", "analyze", "app.json"]);
        assert!(analyze.is_ok());
        if let Ok(cli) = analyze {
            assert!(matches!(
                cli.command,
                Commands::Funding {
                    command: FundingCommand::Analyze { subject: None, .. }
                }
            ));
        }
    }

    #[test]
    fn required_flags_are_enforced() {
        let import = parse_from(["pesascore", "sms", "import", "inbox.json"]);
        assert!(import.is_err());
        if let Err(err) = import {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }

        let compute = parse_from(["pesascore", "score", "compute", "--subject", "a"]);
        assert!(compute.is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_date = parse_from([
            "pesascore", "sms", "list", "--account", "w", "--since", "2025-13-01",
        ]);
        assert!(bad_date.is_err());

        let bad_type = parse_from(["pesascore", "sms", "list", "--account", "w", "--type", "refund"]);
        assert!(bad_type.is_err());

        let zero_days = parse_from([
            "pesascore", "account", "summary", "--account", "w", "--days", "0",
        ]);
        assert!(zero_days.is_err());
    }

    #[test]
    fn bare_groups_show_help() {
        for group in ["sms", "account", "score", "funding"] {
            let parsed = parse_from(["pesascore", group]);
            assert!(parsed.is_err());
            if let Err(err) = parsed {
                assert_eq!(
                    err.kind(),
                    ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                );
            }
        }
    }

    #[test]
    fn help_command_is_rejected() {
        let parsed = parse_from(["pesascore", "help"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn sms_import_help_uses_clap_display_help() {
        let parsed = parse_from(["pesascore", "sms", "import", "--help"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
            assert!(err.to_string().contains("How import works:"));
        }
    }
}
