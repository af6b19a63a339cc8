use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::data::filter::{DatePolicy, DateWindow, CANONICAL_DATE_FORMAT};
use crate::error::LoadResult;

#[derive(Debug, Parser)]
#[command(name = "covid-dash")]
#[command(about = "Serve an interactive COVID-19 map and trend dashboard over HTTP", long_about = None)]
pub struct Cli {
    /// Dataset file (.csv or .parquet)
    #[arg(long, default_value = "owid-covid-data.csv")]
    pub data: PathBuf,

    /// First day of the window (inclusive)
    #[arg(long, default_value = "2021-01-01", value_parser = parse_day)]
    pub start: NaiveDate,

    /// Last day of the window (inclusive)
    #[arg(long, default_value = "2021-12-31", value_parser = parse_day)]
    pub end: NaiveDate,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, default_value_t = 8050)]
    pub port: u16,

    /// Country selected when the page first loads
    #[arg(long, default_value = "Ireland")]
    pub default_country: String,

    /// Drop rows whose date cannot be parsed instead of refusing to start
    #[arg(long)]
    pub skip_bad_dates: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    pub debug: bool,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, CANONICAL_DATE_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data: PathBuf,
    pub window: DateWindow,
    pub date_policy: DatePolicy,
    pub addr: SocketAddr,
    pub default_country: String,
}

impl Cli {
    pub fn into_settings(self) -> LoadResult<Settings> {
        Ok(Settings {
            window: DateWindow::new(self.start, self.end)?,
            date_policy: if self.skip_bad_dates {
                DatePolicy::Skip
            } else {
                DatePolicy::Fail
            },
            addr: SocketAddr::new(self.host, self.port),
            data: self.data,
            default_country: self.default_country,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    #[test]
    fn defaults_match_the_2021_dashboard() {
        let cli = Cli::parse_from(["covid-dash"]);
        assert!(!cli.debug);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.data, PathBuf::from("owid-covid-data.csv"));
        assert_eq!(settings.window, DateWindow::default());
        assert_eq!(settings.date_policy, DatePolicy::Fail);
        assert_eq!(settings.addr.to_string(), "127.0.0.1:8050");
        assert_eq!(settings.default_country, "Ireland");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "covid-dash",
            "--data",
            "sample.parquet",
            "--start",
            "2020-03-01",
            "--end",
            "2020-03-31",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--default-country",
            "France",
            "--skip-bad-dates",
        ]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.window.start(), NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        assert_eq!(settings.window.end(), NaiveDate::from_ymd_opt(2020, 3, 31).unwrap());
        assert_eq!(settings.date_policy, DatePolicy::Skip);
        assert_eq!(settings.addr.port(), 9000);
        assert_eq!(settings.default_country, "France");
    }

    #[test]
    fn malformed_date_flag_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["covid-dash", "--start", "01/01/2021"]).is_err());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let cli = Cli::parse_from(["covid-dash", "--start", "2022-01-01"]);
        assert!(matches!(cli.into_settings(), Err(LoadError::InvalidWindow { .. })));
    }
}
