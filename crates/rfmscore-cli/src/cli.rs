use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rfmscore_engine::rfm::{SingleGroupPolicy, TiePolicy};

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

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_single_group(value: &str) -> Result<SingleGroupPolicy, String> {
    value.parse::<SingleGroupPolicy>()
}

pub fn parse_ties(value: &str) -> Result<TiePolicy, String> {
    value.parse::<TiePolicy>()
}

/// Extended help shown after `rfmscore score --help`.
pub const SCORE_AFTER_HELP: &str = "\
How scoring works:
  Transactions are grouped per customer into recency (days since the last
  order), frequency (distinct orders) and monetary (total spend). Each
  dimension is ranked best-first and split into quintiles: 5 is the best
  fifth of customers, 1 the worst. The composite is the three digits in
  R-F-M order, for example `525`.

  <path> is a local JSON or CSV file. Use `-` or pipe input to read stdin.
  Example: cat orders.csv | rfmscore score --as-of 2026-03-31

Input fields:
  customer_id (required):  opaque customer key; rows without one are excluded
  order_date  (required):  YYYY-MM-DD, or a timestamp (time of day is ignored)
  order_id    (optional):  line items sharing an order_id count as one order
  amount      (required):  line amount, or provide quantity and unit_price
  quantity, unit_price:    used when amount is absent
  Other CSV columns are ignored.

  JSON example (one top-level array):
  [
    {\"customer_id\": \"17850\", \"order_id\": \"536365\", \"order_date\": \"2010-12-01\", \"amount\": 15.3}
  ]

  CSV example:
  customer_id,order_id,order_date,quantity,unit_price
  17850,536365,2010-12-01 08:26:00,6,2.55

Policy flags:
  --allow-negative   accept negative amounts (returns, refunds)
  --skip-invalid     skip bad rows and report them instead of failing
  --single-group     score when every customer shares a value: 5, 3 or error
  --ties             shared (equal values share a score) or by_customer_id

Segments:
  --segments <file> labels each customer by the first matching rule.
  Run `rfmscore segments example` for a starting configuration.
";

#[derive(Debug, Parser)]
#[command(
    name = "rfmscore",
    version,
    about = "Recency-Frequency-Monetary customer scoring",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score customers from a transaction file or stdin
    #[command(after_long_help = SCORE_AFTER_HELP)]
    Score {
        /// JSON or CSV transaction file, or `-` for stdin
        path: Option<String>,
        /// Reference date recency is measured against (defaults to today)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Segment rules file to label customers with
        #[arg(long)]
        segments: Option<String>,
        /// Accept negative line amounts
        #[arg(long)]
        allow_negative: bool,
        /// Skip invalid rows instead of failing on the first one
        #[arg(long)]
        skip_invalid: bool,
        /// Score used when every customer shares one value: 5, 3 or error
        #[arg(long, value_parser = parse_single_group)]
        single_group: Option<SingleGroupPolicy>,
        /// Tie handling at quintile boundaries: shared or by_customer_id
        #[arg(long, value_parser = parse_ties)]
        ties: Option<TiePolicy>,
        /// Return at most this many customer rows
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Validate or print segment rule configuration
    Segments {
        #[command(subcommand)]
        command: SegmentsCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SegmentsCommand {
    /// Validate a segment rules file
    Check {
        path: String,
        #[arg(long)]
        json: bool,
    },
    /// Print a reference segment configuration
    Example,
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
    use rfmscore_engine::rfm::{SingleGroupPolicy, TiePolicy};

    use super::{Commands, SegmentsCommand, parse_from, parse_iso_date};

    #[test]
    fn score_parses_every_policy_flag() {
        let parsed = parse_from([
            "rfmscore",
            "score",
            "orders.csv",
            "--as-of",
            "2026-03-31",
            "--segments",
            "segments.json",
            "--allow-negative",
            "--skip-invalid",
            "--single-group",
            "3",
            "--ties",
            "by_customer_id",
            "--limit",
            "10",
            "--json",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            match cli.command {
                Commands::Score {
                    path,
                    as_of,
                    segments,
                    allow_negative,
                    skip_invalid,
                    single_group,
                    ties,
                    limit,
                    json,
                } => {
                    assert_eq!(path.as_deref(), Some("orders.csv"));
                    assert_eq!(as_of.as_ref().map(|date| date.as_str()), Some("2026-03-31"));
                    assert_eq!(segments.as_deref(), Some("segments.json"));
                    assert!(allow_negative && skip_invalid && json);
                    assert_eq!(single_group, Some(SingleGroupPolicy::Middle));
                    assert_eq!(ties, Some(TiePolicy::ByCustomerId));
                    assert_eq!(limit, Some(10));
                }
                Commands::Segments { .. } => panic!("expected score"),
            }
        }
    }

    #[test]
    fn score_rejects_bad_dates_and_policies() {
        assert!(parse_from(["rfmscore", "score", "--as-of", "2026-13-01"]).is_err());
        assert!(parse_from(["rfmscore", "score", "--single-group", "4"]).is_err());
        assert!(parse_from(["rfmscore", "score", "--ties", "random"]).is_err());
    }

    #[test]
    fn segments_subcommands_parse() {
        let check = parse_from(["rfmscore", "segments", "check", "rules.json"]);
        assert!(check.is_ok());
        if let Ok(cli) = check {
            assert!(matches!(
                cli.command,
                Commands::Segments {
                    command: SegmentsCommand::Check { ref path, json: false }
                } if path == "rules.json"
            ));
        }

        assert!(parse_from(["rfmscore", "segments", "example"]).is_ok());
        assert!(parse_from(["rfmscore", "segments"]).is_err());
    }

    #[test]
    fn iso_date_parser_requires_real_calendar_dates() {
        assert!(parse_iso_date("2026-02-28").is_ok());
        assert!(parse_iso_date("2026-02-30").is_err());
        assert!(parse_iso_date("2026/02/28").is_err());
        assert!(parse_iso_date("26-02-28").is_err());
    }
}
