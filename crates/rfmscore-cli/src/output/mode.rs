use crate::cli::{Commands, SegmentsCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Score { json, .. }
        | Commands::Segments {
            command: SegmentsCommand::Check { json, .. },
        } => *json,
        Commands::Segments {
            command: SegmentsCommand::Example,
        } => false,
    };
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
