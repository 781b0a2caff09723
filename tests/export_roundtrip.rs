use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use fuel_dashboard::TransactionRecord;
use fuel_dashboard::analysis::{AdditionalAnalysis, FuelAnalysis};
use fuel_dashboard::loader::{LoadOptions, from_reader};
use fuel_dashboard::downloader::{
    DATE_SHEET, DRIVER_SHEET, VEHICLE_SHEET, date_summary_xlsx, fuel_analysis_xlsx,
};
use std::io::Cursor;

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 5, d)
}

fn records() -> Vec<TransactionRecord> {
    vec![
        TransactionRecord::new("B 1", "Ann", day(1), "Diesel", 10.0, 150_000.0, 1000.0),
        TransactionRecord::new("B 1", "Ann", day(2), "Diesel", 15.0, 225_000.0, 1500.0),
        TransactionRecord::new("B 2", "Budi", day(1), "Pertamax", 20.0, 300_000.0, 2000.0),
        TransactionRecord::new("B 2", "Budi", day(2), "Pertamax", 10.0, 150_000.0, 2300.0),
        TransactionRecord::new("B 9", "Citra", day(2), "Diesel", 0.0, 0.0, 700.0),
    ]
}

fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    Xlsx::new(Cursor::new(bytes)).unwrap()
}

fn excel_serial(cell: &Data) -> f64 {
    match cell {
        Data::DateTime(dt) => dt.as_f64(),
        other => panic!("expected a date cell, got {:?}", other),
    }
}

fn text(s: &str) -> Data {
    Data::String(s.to_string())
}

#[test]
fn fuel_workbook_has_vehicle_and_driver_sheets() {
    let bytes = fuel_analysis_xlsx(&FuelAnalysis::compute(&records())).unwrap();
    let mut workbook = open(bytes);
    assert_eq!(workbook.sheet_names(), vec![VEHICLE_SHEET, DRIVER_SHEET]);

    let vehicles = workbook.worksheet_range(VEHICLE_SHEET).unwrap();
    let rows: Vec<&[Data]> = vehicles.rows().collect();
    assert_eq!(
        rows[0],
        &[
            text("VehicleRegistrationNo"),
            text("initial_odometer"),
            text("last_odometer"),
            text("total_quantity"),
            text("FuelEfficiency"),
            text("Quantity"),
            text("TotalAmount"),
        ][..]
    );

    // Efficiency order: 20 km/l, 10 km/l, then the vehicle with no fuel
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][0], text("B 1"));
    assert_eq!(rows[1][1], Data::Float(1000.0));
    assert_eq!(rows[1][2], Data::Float(1500.0));
    assert_eq!(rows[1][4], Data::Float(20.0));
    assert_eq!(rows[1][6], Data::Float(375_000.0));
    assert_eq!(rows[2][0], text("B 2"));
    assert_eq!(rows[2][4], Data::Float(10.0));

    // 0 / 0 is left blank
    assert_eq!(rows[3][0], text("B 9"));
    assert_eq!(rows[3][4], Data::Empty);

    let drivers = workbook.worksheet_range(DRIVER_SHEET).unwrap();
    let rows: Vec<&[Data]> = drivers.rows().collect();
    assert_eq!(rows[0], &[text("DriverFullName"), text("TotalAmountByDriver")][..]);
    assert_eq!(rows[1], &[text("Budi"), Data::Float(450_000.0)][..]);
    assert_eq!(rows[2], &[text("Ann"), Data::Float(375_000.0)][..]);
    assert_eq!(rows[3], &[text("Citra"), Data::Float(0.0)][..]);
}

#[test]
fn date_workbook_lists_newest_date_first() {
    let analysis = AdditionalAnalysis::compute(&records());
    let mut workbook = open(date_summary_xlsx(&analysis.date_totals).unwrap());
    assert_eq!(workbook.sheet_names(), vec![DATE_SHEET]);

    let range = workbook.worksheet_range(DATE_SHEET).unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(
        rows[0],
        &[text("TransactionDate"), text("Quantity"), text("TotalAmount")][..]
    );
    assert_eq!(rows.len(), 3);

    // 2024-05-02 then 2024-05-01, as Excel serial days
    assert_eq!(excel_serial(&rows[1][0]), 45414.0);
    assert_eq!(excel_serial(&rows[2][0]), 45413.0);
    assert_eq!(rows[1][1], Data::Float(25.0));
    assert_eq!(rows[1][2], Data::Float(375_000.0));
    assert_eq!(rows[2][1], Data::Float(30.0));
    assert_eq!(rows[2][2], Data::Float(450_000.0));
}

#[test]
fn empty_log_exports_headers_only() {
    let fuel = fuel_analysis_xlsx(&FuelAnalysis::compute(&[])).unwrap();
    let mut workbook = open(fuel);
    let range = workbook.worksheet_range(VEHICLE_SHEET).unwrap();
    assert_eq!(range.rows().count(), 1);

    let additional = AdditionalAnalysis::compute(&[]);
    let mut workbook = open(date_summary_xlsx(&additional.date_totals).unwrap());
    let range = workbook.worksheet_range(DATE_SHEET).unwrap();
    assert_eq!(range.rows().count(), 1);
}

#[test]
fn year_outside_excel_range_is_exported_as_text() {
    let csv = "VehicleRegistrationNo,DriverFullName,TransactionDate,ItemName,Quantity,TotalAmount,Odometer\n\
               B 1,Ann,2024-03-02,Diesel,10,100,1000\n\
               B 1,Ann,0024-03-02,Diesel,5,50,1100\n";
    let log = from_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    let analysis = AdditionalAnalysis::compute(&log.records);
    assert_eq!(analysis.date_totals.len(), 2);

    let mut workbook = open(date_summary_xlsx(&analysis.date_totals).unwrap());
    let range = workbook.worksheet_range(DATE_SHEET).unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();

    assert_eq!(rows.len(), 3);
    assert_eq!(excel_serial(&rows[1][0]), 45353.0);
    assert_eq!(rows[2][0], text("0024-03-02"));
    assert_eq!(rows[2][1], Data::Float(5.0));
}
