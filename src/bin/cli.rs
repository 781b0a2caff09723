#![cfg(not(tarpaulin_include))]

use clap::Parser;
use fuel_dashboard::config::{ReportArgs, init_logging};
use fuel_dashboard::{loader, report};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = ReportArgs::parse();
    init_logging(&args.log_level);

    let log = match loader::load_log(&args.input, &args.analysis.load_options()) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ingest = &log.report;
    println!(
        "Loaded {} of {} rows from {}",
        ingest.rows_loaded(),
        ingest.rows_read,
        args.input.display()
    );
    for row in &ingest.rejected {
        println!("  skipped line {}: {} = {:?}", row.line, row.column, row.value);
    }
    if ingest.missing_dates > 0 {
        println!("  {} row(s) without a readable date", ingest.missing_dates);
    }

    match report::write_report(&log.records, &args.output, &args.analysis.chart_settings()) {
        Ok(paths) => {
            for path in paths {
                println!("Wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
