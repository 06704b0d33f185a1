use pesascore_client::commands;
use pesascore_client::commands::sms::SmsListOptions;
use pesascore_client::{ClientResult, SuccessEnvelope};

use crate::cli::{AccountCommand, Cli, Commands, FundingCommand, ScoreCommand, SmsCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Sms { command } => match command {
            SmsCommand::Parse { path, .. } => commands::sms::parse(path.clone()),
            SmsCommand::Import {
                account,
                phone,
                path,
                ..
            } => commands::sms::import(account.clone(), phone.clone(), path.clone()),
            SmsCommand::List {
                account,
                transaction_type,
                category,
                since,
                ..
            } => commands::sms::list_with_options(SmsListOptions {
                account_ref: account.clone(),
                transaction_type: transaction_type.clone(),
                category: category.clone(),
                since: since.as_ref().map(|value| value.as_str().to_string()),
                home_override: None,
            }),
        },
        Commands::Account { command } => match command {
            AccountCommand::Summary { account, days, .. } => {
                commands::account::summary(account.clone(), *days)
            }
        },
        Commands::Score { command } => match command {
            ScoreCommand::Compute {
                subject, profile, ..
            } => commands::score::compute(subject.clone(), profile.clone()),
            ScoreCommand::History { subject, .. } => commands::score::history(subject.clone()),
        },
        Commands::Funding { command } => match command {
            FundingCommand::Analyze {
                application,
                subject,
                ..
            } => commands::funding::analyze_application(application.clone(), subject.clone()),
        },
    }
}
