use crate::analysis::{DateTotals, DriverTotal, FuelAnalysis, VehicleAnalysisRow};
use crate::error::Result;
use crate::record::{AMOUNT_COLUMN, DATE_COLUMN, DRIVER_COLUMN, QUANTITY_COLUMN, VEHICLE_COLUMN};
use chrono::{Datelike, NaiveDate};
use log::warn;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

/// Download name of the vehicle and driver workbook
pub const FUEL_ANALYSIS_FILENAME: &str = "fuel_analysis_data.xlsx";

/// Download name of the per-date workbook
pub const DATE_SUMMARY_FILENAME: &str = "date_summary_analysis.xlsx";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const VEHICLE_SHEET: &str = "Vehicle Analysis";
pub const DRIVER_SHEET: &str = "Driver Analysis";
pub const DATE_SHEET: &str = "Sheet1";

const VEHICLE_HEADERS: [&str; 7] = [
    VEHICLE_COLUMN,
    "initial_odometer",
    "last_odometer",
    "total_quantity",
    "FuelEfficiency",
    QUANTITY_COLUMN,
    AMOUNT_COLUMN,
];
const DRIVER_HEADERS: [&str; 2] = [DRIVER_COLUMN, "TotalAmountByDriver"];
const DATE_HEADERS: [&str; 3] = [DATE_COLUMN, QUANTITY_COLUMN, AMOUNT_COLUMN];

/// Build the "Fuel Analysis" workbook
///
/// Sheet `Vehicle Analysis` holds the combined efficiency and totals table
/// in efficiency order, sheet `Driver Analysis` the amount per driver.
/// Missing and non-finite numbers are left as blank cells.
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
pub fn fuel_analysis_xlsx(analysis: &FuelAnalysis) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let vehicle_sheet = workbook.add_worksheet();
    vehicle_sheet.set_name(VEHICLE_SHEET)?;
    write_vehicle_sheet(vehicle_sheet, &analysis.vehicle_analysis)?;

    let driver_sheet = workbook.add_worksheet();
    driver_sheet.set_name(DRIVER_SHEET)?;
    write_driver_sheet(driver_sheet, &analysis.driver_totals)?;

    Ok(workbook.save_to_buffer()?)
}

/// Build the "Additional Analysis" workbook
///
/// A single sheet of quantity and amount per date, in the order the totals
/// are held (newest first after [`date_totals`](crate::analysis::date_totals)).
pub fn date_summary_xlsx(totals: &DateTotals) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(DATE_SHEET)?;

    write_headers(sheet, &DATE_HEADERS)?;
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (idx, row) in totals.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        write_cell_date(sheet, r, 0, row.date, &date_format)?;
        write_cell_number(sheet, r, 1, Some(row.quantity))?;
        write_cell_number(sheet, r, 2, Some(row.amount))?;
    }

    sheet.autofit();
    Ok(workbook.save_to_buffer()?)
}

fn write_vehicle_sheet(sheet: &mut Worksheet, rows: &[VehicleAnalysisRow]) -> Result<()> {
    write_headers(sheet, &VEHICLE_HEADERS)?;

    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_string(r, 0, &row.vehicle)?;
        write_cell_number(sheet, r, 1, row.initial_odometer)?;
        write_cell_number(sheet, r, 2, row.last_odometer)?;
        write_cell_number(sheet, r, 3, Some(row.total_quantity))?;
        write_cell_number(sheet, r, 4, Some(row.efficiency))?;
        write_cell_number(sheet, r, 5, Some(row.quantity))?;
        write_cell_number(sheet, r, 6, Some(row.amount))?;
    }

    sheet.autofit();
    Ok(())
}

fn write_driver_sheet(sheet: &mut Worksheet, rows: &[DriverTotal]) -> Result<()> {
    write_headers(sheet, &DRIVER_HEADERS)?;

    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_string(r, 0, &row.driver)?;
        write_cell_number(sheet, r, 1, Some(row.amount))?;
    }

    sheet.autofit();
    Ok(())
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let header_format = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    Ok(())
}

// Excel dates span 1900-9999; anything else is written as ISO text
fn write_cell_date(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    date: NaiveDate,
    format: &Format,
) -> Result<()> {
    let excel_date = u16::try_from(date.year())
        .ok()
        .and_then(|year| ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8).ok());

    match excel_date {
        Some(excel_date) => sheet.write_datetime_with_format(row, col, &excel_date, format)?,
        None => {
            warn!("Date {} is outside the Excel range, written as text", date);
            sheet.write_string(row, col, date.format("%Y-%m-%d").to_string())?
        }
    };
    Ok(())
}

// Excel has no NaN or infinity, those cells stay blank
fn write_cell_number(sheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<()> {
    if let Some(value) = value.filter(|v| v.is_finite()) {
        sheet.write_number(row, col, value)?;
    }
    Ok(())
}
