use crate::cli::{AccountCommand, Commands, FundingCommand, ScoreCommand, SmsCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Sms { command } => match command {
            SmsCommand::Parse { json, .. }
            | SmsCommand::Import { json, .. }
            | SmsCommand::List { json, .. } => *json,
        },
        Commands::Account { command } => match command {
            AccountCommand::Summary { json, .. } => *json,
        },
        Commands::Score { command } => match command {
            ScoreCommand::Compute { json, .. } | ScoreCommand::History { json, .. } => *json,
        },
        Commands::Funding { command } => match command {
            FundingCommand::Analyze { json, .. } => *json,
        },
    };
    OutputMode::from_flag(json)
}
