use crate::analysis::{AdditionalAnalysis, FuelAnalysis};
use crate::dashboard::{ChartSettings, additional_charts, fuel_charts};
use crate::downloader::{
    DATE_SUMMARY_FILENAME, FUEL_ANALYSIS_FILENAME, date_summary_xlsx, fuel_analysis_xlsx,
};
use crate::error::Result;
use crate::record::TransactionRecord;
use log::info;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

/// Write both workbooks and every chart of both pages into `output_dir`
///
/// Charts are written as `<chart id>.svg`. The directory is created if
/// needed and existing files of the same name are overwritten.
///
/// # Returns
/// * The paths written, workbooks first
pub fn write_report(
    records: &[TransactionRecord],
    output_dir: impl AsRef<Path>,
    settings: &ChartSettings,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    create_dir_all(output_dir)?;

    let fuel = FuelAnalysis::compute(records);
    let additional = AdditionalAnalysis::compute(records);
    let mut written = Vec::new();

    let path = output_dir.join(FUEL_ANALYSIS_FILENAME);
    fs::write(&path, fuel_analysis_xlsx(&fuel)?)?;
    written.push(path);

    let path = output_dir.join(DATE_SUMMARY_FILENAME);
    fs::write(&path, date_summary_xlsx(&additional.date_totals)?)?;
    written.push(path);

    let charts = fuel_charts(&fuel, settings)?
        .into_iter()
        .chain(additional_charts(&additional, settings)?);
    for chart in charts {
        let path = output_dir.join(format!("{}.svg", chart.id));
        fs::write(&path, chart.svg)?;
        written.push(path);
    }

    info!("Wrote {} report files to {}", written.len(), output_dir.display());
    Ok(written)
}
