use crate::dashboard::ChartSettings;
use crate::loader::LoadOptions;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by the dashboard server and the batch report
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Read ambiguous dates such as 01/02/2024 as day/month/year
    #[arg(long, env = "FUEL_DASHBOARD_DAY_FIRST")]
    pub day_first: bool,

    /// Field delimiter of the uploaded file (a single character, or "tab")
    #[arg(long, default_value = ",", value_parser = parse_delimiter, env = "FUEL_DASHBOARD_DELIMITER")]
    pub delimiter: u8,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1000, env = "FUEL_DASHBOARD_CHART_WIDTH")]
    pub chart_width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 600, env = "FUEL_DASHBOARD_CHART_HEIGHT")]
    pub chart_height: u32,

    /// Currency code shown on amount axes
    #[arg(long, default_value = "IDR", env = "FUEL_DASHBOARD_CURRENCY")]
    pub currency: String,
}

impl AnalysisArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            day_first: self.day_first,
            delimiter: self.delimiter,
        }
    }

    pub fn chart_settings(&self) -> ChartSettings {
        ChartSettings {
            width: self.chart_width,
            height: self.chart_height,
            currency: self.currency.clone(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fuel-dashboard", about = "Browser dashboard for fuel transaction logs")]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "FUEL_DASHBOARD_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "FUEL_DASHBOARD_PORT")]
    pub port: u16,

    /// Log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "info", env = "FUEL_DASHBOARD_LOG_LEVEL")]
    pub log_level: String,

    /// Largest accepted upload in MiB
    #[arg(long, default_value_t = 20, env = "FUEL_DASHBOARD_MAX_UPLOAD_MB")]
    pub max_upload_mb: usize,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

impl ServerArgs {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[derive(Parser, Debug)]
#[command(name = "fuel-report", about = "Write fuel analysis workbooks and charts for a CSV log")]
pub struct ReportArgs {
    /// Fuel transaction log (.csv, .txt or .tsv)
    pub input: PathBuf,

    /// Directory receiving the workbooks and charts
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("delimiter must be one ASCII character, got {:?}", value)),
            }
        }
    }
}

/// Start `env_logger` at `level` unless RUST_LOG says otherwise
pub fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let args = ServerArgs::parse_from(["fuel-dashboard"]);
        assert_eq!(args.bind_address(), "127.0.0.1:3000");
        assert_eq!(args.max_upload_bytes(), 20 * 1024 * 1024);
        assert_eq!(args.analysis.delimiter, b',');
        assert!(!args.analysis.day_first);
        assert_eq!(args.analysis.chart_settings().currency, "IDR");
    }

    #[test]
    fn report_flags() {
        let args = ReportArgs::parse_from([
            "fuel-report",
            "fuel.tsv",
            "-o",
            "out",
            "--day-first",
            "--delimiter",
            "tab",
            "--currency",
            "USD",
        ]);
        assert_eq!(args.input, PathBuf::from("fuel.tsv"));
        assert_eq!(args.output, PathBuf::from("out"));
        let options = args.analysis.load_options();
        assert!(options.day_first);
        assert_eq!(options.delimiter, b'\t');
        assert_eq!(args.analysis.chart_settings().currency, "USD");
    }

    #[test]
    fn delimiter_must_be_single_ascii() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}
