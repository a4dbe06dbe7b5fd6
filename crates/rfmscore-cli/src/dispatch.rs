use rfmscore_engine::commands;
use rfmscore_engine::commands::score::ScoreRunOptions;
use rfmscore_engine::{EngineResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, SegmentsCommand};

pub fn dispatch(cli: &Cli) -> EngineResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Score {
            path,
            as_of,
            segments,
            allow_negative,
            skip_invalid,
            single_group,
            ties,
            limit,
            json: _,
        } => commands::score::run_with_options(ScoreRunOptions {
            path: path.clone(),
            as_of: as_of
                .as_ref()
                .map(|date| date.as_str().to_string())
                .unwrap_or_else(today),
            segments_path: segments.clone(),
            allow_negative_amounts: *allow_negative,
            skip_invalid: *skip_invalid,
            single_group: *single_group,
            ties: *ties,
            limit: *limit,
            stdin_override: None,
        }),
        Commands::Segments { command } => match command {
            SegmentsCommand::Check { path, .. } => commands::segments::check(path),
            SegmentsCommand::Example => commands::segments::example(),
        },
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use crate::cli::parse_from;

    use super::dispatch;

    #[test]
    fn segments_example_dispatches_without_input() {
        let parsed = parse_from(["rfmscore", "segments", "example"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let response = dispatch(&cli);
            assert!(response.is_ok());
            if let Ok(success) = response {
                assert_eq!(success.command, "segments example");
            }
        }
    }
}
