use crate::error::{DashboardError, Result};
use crate::record::{
    AMOUNT_COLUMN, DATE_COLUMN, DRIVER_COLUMN, ITEM_COLUMN, ODOMETER_COLUMN, QUANTITY_COLUMN,
    TransactionRecord, VEHICLE_COLUMN,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Cell values read as missing in every column
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATE_FORMATS_UNAMBIGUOUS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%B %d, %Y",
];
const DATE_FORMATS_MONTH_FIRST: [&str; 3] = ["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const DATE_FORMATS_DAY_FIRST: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const TIME_SUFFIXES: [&str; 8] = [
    " %H:%M:%S",
    " %H:%M:%S%.f",
    " %H:%M",
    "T%H:%M:%S",
    "T%H:%M:%S%.f",
    "T%H:%M",
    " %I:%M:%S %p",
    " %I:%M %p",
];

/// Options controlling how a fuel log is read
#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    /// Read `a/b/yyyy` as day/month instead of month/day
    pub day_first: bool,

    /// Field delimiter byte
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            day_first: false,
            delimiter: b',',
        }
    }
}

/// A data row left out of the table because a numeric cell did not parse
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Line in the source file, the header being line 1
    pub line: u64,

    /// Column holding the offending value
    pub column: String,

    /// Raw cell value
    pub value: String,
}

/// What happened to the rows of one upload
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Data rows seen, rejected ones included
    pub rows_read: usize,

    pub rejected: Vec<RejectedRow>,

    /// Loaded rows whose transaction date did not parse
    pub missing_dates: usize,
}

impl IngestReport {
    pub fn rows_loaded(&self) -> usize {
        self.rows_read - self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.missing_dates == 0
    }
}

/// A normalized fuel log together with its ingest report
#[derive(Clone, Debug, Default)]
pub struct LoadedLog {
    pub records: Vec<TransactionRecord>,
    pub report: IngestReport,
}

/// Positions of the required columns inside the header row
struct ColumnIndex {
    vehicle: usize,
    driver: usize,
    date: usize,
    item: usize,
    quantity: usize,
    amount: usize,
    odometer: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            vehicle: find(VEHICLE_COLUMN)?,
            driver: find(DRIVER_COLUMN)?,
            date: find(DATE_COLUMN)?,
            item: find(ITEM_COLUMN)?,
            quantity: find(QUANTITY_COLUMN)?,
            amount: find(AMOUNT_COLUMN)?,
            odometer: find(ODOMETER_COLUMN)?,
        })
    }
}

/// Load a fuel log from any reader of delimited text
///
/// The first row must be a header naming every column in
/// [`REQUIRED_COLUMNS`](crate::record::REQUIRED_COLUMNS). Rows with a
/// malformed number are skipped and listed in the returned report;
/// unparsable dates load as missing.
///
/// # Examples
/// ```
/// use fuel_dashboard::loader::{LoadOptions, from_reader};
///
/// let csv = "VehicleRegistrationNo,DriverFullName,TransactionDate,ItemName,Quantity,TotalAmount,Odometer\n\
///            B 1234 XY,Ann Lee,2024-01-05,Diesel,\"1,200.5\",\"12,000\",15000\n";
/// let log = from_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
/// assert_eq!(log.records[0].quantity, Some(1200.5));
/// ```
pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<LoadedLog> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut log = LoadedLog::default();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(row_idx as u64 + 2);
        log.report.rows_read += 1;

        match parse_row(&row, &columns, options) {
            Ok(record) => {
                if record.date.is_none() {
                    log.report.missing_dates += 1;
                }
                log.records.push(record);
            }
            Err((column, value)) => {
                warn!("Rejecting line {}: {} value {:?} is not a number", line, column, value);
                log.report.rejected.push(RejectedRow {
                    line,
                    column: column.to_string(),
                    value,
                });
            }
        }
    }

    debug!(
        "Loaded {} of {} rows ({} missing dates)",
        log.report.rows_loaded(),
        log.report.rows_read,
        log.report.missing_dates
    );

    Ok(log)
}

/// Load a fuel log held in memory, e.g. an uploaded file
pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<LoadedLog> {
    from_reader(bytes, options)
}

/// Load a fuel log from a CSV file on disk
pub fn from_csv(filepath: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedLog> {
    let file = File::open(filepath)?;
    from_reader(file, options)
}

/// Detect the file type from its extension and load it
///
/// `.csv` and `.txt` use the configured delimiter, `.tsv` is always tab
/// separated.
pub fn load_log(filepath: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedLog> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") | Some("txt") => from_csv(path, options),
        Some("tsv") => from_csv(
            path,
            &LoadOptions {
                delimiter: b'\t',
                ..*options
            },
        ),
        Some(ext) => Err(DashboardError::UnsupportedFile(format!(".{}", ext))),
        None => Err(DashboardError::UnsupportedFile(
            path.display().to_string(),
        )),
    }
}

// Returns the offending column and raw value when a numeric cell is malformed
fn parse_row(
    row: &csv::StringRecord,
    columns: &ColumnIndex,
    options: &LoadOptions,
) -> std::result::Result<TransactionRecord, (&'static str, String)> {
    let cell = |idx: usize| row.get(idx).unwrap_or("");
    let number = |idx: usize, column: &'static str| {
        parse_number(cell(idx)).map_err(|_| (column, cell(idx).to_string()))
    };

    Ok(TransactionRecord {
        vehicle: parse_text(cell(columns.vehicle)),
        driver: parse_text(cell(columns.driver)),
        date: parse_date(cell(columns.date), options.day_first),
        item: parse_text(cell(columns.item)),
        quantity: number(columns.quantity, QUANTITY_COLUMN)?,
        amount: number(columns.amount, AMOUNT_COLUMN)?,
        odometer: number(columns.odometer, ODOMETER_COLUMN)?,
    })
}

fn is_missing(raw: &str) -> bool {
    NA_TOKENS.contains(&raw.trim())
}

fn parse_text(raw: &str) -> Option<String> {
    if is_missing(raw) {
        None
    } else {
        Some(raw.trim().to_string())
    }
}

/// Parse a numeric cell, ignoring thousands separators
///
/// Missing cells give `Ok(None)`; anything that is not a finite number after
/// removing commas is an error.
fn parse_number(raw: &str) -> std::result::Result<Option<f64>, ()> {
    if is_missing(raw) {
        return Ok(None);
    }
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(()),
    }
}

/// Parse a transaction date, keeping only the calendar day
///
/// Returns `None` for anything no known format accepts. With `day_first`,
/// `01/02/2024` is the 1st of February; otherwise the 2nd of January. The
/// other reading is still tried when the preferred one is not a valid date.
pub fn parse_date(raw: &str, day_first: bool) -> Option<NaiveDate> {
    let value = raw.trim();
    if is_missing(value) {
        return None;
    }

    let (preferred, fallback) = if day_first {
        (DATE_FORMATS_DAY_FIRST, DATE_FORMATS_MONTH_FIRST)
    } else {
        (DATE_FORMATS_MONTH_FIRST, DATE_FORMATS_DAY_FIRST)
    };

    let formats = DATE_FORMATS_UNAMBIGUOUS
        .iter()
        .chain(preferred.iter())
        .chain(fallback.iter());

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
        for suffix in TIME_SUFFIXES {
            let with_time = format!("{}{}", format, suffix);
            if let Ok(datetime) = NaiveDateTime::parse_from_str(value, &with_time) {
                return Some(datetime.date());
            }
        }
    }

    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.date_naive())
        .ok()
}
