use chrono::NaiveDate;
use fuel_dashboard::TransactionRecord;
use fuel_dashboard::analysis::{
    AdditionalAnalysis, FuelAnalysis, SortOrder, date_totals, driver_totals, item_counts,
    item_counts_per_date, record_count_by_date, vehicle_efficiency, vehicle_totals,
};
use fuel_dashboard::loader::{LoadOptions, from_reader};

const HEADER: &str =
    "VehicleRegistrationNo,DriverFullName,TransactionDate,ItemName,Quantity,TotalAmount,Odometer";

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 3, d)
}

fn fleet() -> Vec<TransactionRecord> {
    vec![
        TransactionRecord::new("B 1", "Ann", day(1), "Diesel", 10.0, 150_000.0, 1000.0),
        TransactionRecord::new("B 2", "Budi", day(1), "Pertamax", 20.0, 300_000.0, 2000.0),
        TransactionRecord::new("B 1", "Ann", day(2), "Diesel", 15.0, 225_000.0, 1500.0),
        TransactionRecord::new("B 3", "Citra", day(2), "Diesel", 0.1, 1_500.0, 500.0),
        TransactionRecord::new("B 2", "Budi", day(3), "Pertamax", 10.0, 150_000.0, 2300.0),
        TransactionRecord::new("B 3", "Ann", day(3), "Pertalite", 0.2, 3_000.0, 510.0),
        TransactionRecord::new("B 3", "Citra", day(3), "Pertalite", 0.3, 4_500.0, 530.0),
    ]
}

#[test]
fn efficiency_from_a_csv_upload() {
    let csv = format!(
        "{HEADER}\n\
         B 1,Ann,2024-03-01,Diesel,10,\"150,000\",\"1,000\"\n\
         B 1,Ann,2024-03-02,Diesel,15,\"225,000\",\"1,500\"\n"
    );
    let log = from_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    assert!(log.report.is_clean());

    let rows = vehicle_efficiency(&log.records);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].initial_odometer, Some(1000.0));
    assert_eq!(rows[0].last_odometer, Some(1500.0));
    assert_eq!(rows[0].total_quantity, 25.0);
    assert_eq!(rows[0].efficiency, 20.0);
}

#[test]
fn zero_fuel_does_not_panic() {
    let records = vec![
        TransactionRecord::new("B 1", "Ann", day(1), "Diesel", 0.0, 0.0, 100.0),
        TransactionRecord::new("B 1", "Ann", day(2), "Diesel", 0.0, 0.0, 200.0),
        TransactionRecord::new("B 2", "Ann", day(1), "Diesel", 0.0, 0.0, 300.0),
    ];

    let rows = vehicle_efficiency(&records);
    assert_eq!(rows[0].vehicle, "B 1");
    assert!(rows[0].efficiency.is_infinite());
    assert_eq!(rows[1].vehicle, "B 2");
    assert!(rows[1].efficiency.is_nan());

    // Both pages still build
    let fuel = FuelAnalysis::compute(&records);
    assert_eq!(fuel.vehicle_analysis.len(), 2);
    let additional = AdditionalAnalysis::compute(&records);
    assert_eq!(additional.date_totals.len(), 2);
}

#[test]
fn totals_do_not_depend_on_record_order() {
    let records = fleet();
    let mut reversed = records.clone();
    reversed.reverse();
    let mut rotated = records.clone();
    rotated.rotate_left(3);

    for shuffled in [&reversed, &rotated] {
        assert_eq!(vehicle_totals(&records), vehicle_totals(shuffled));
        assert_eq!(driver_totals(&records), driver_totals(shuffled));
        assert_eq!(vehicle_efficiency(&records), vehicle_efficiency(shuffled));
        assert_eq!(date_totals(&records), date_totals(shuffled));
        assert_eq!(item_counts(&records), item_counts(shuffled));
    }
}

#[test]
fn sums_match_the_source_records() {
    let records = fleet();

    let quantity: f64 = vehicle_totals(&records).iter().map(|t| t.quantity).sum();
    assert!((quantity - 55.6).abs() < 1e-9);

    let ann = driver_totals(&records)
        .into_iter()
        .find(|d| d.driver == "Ann")
        .unwrap();
    assert_eq!(ann.amount, 378_000.0);
}

#[test]
fn date_orders_are_exact_reversals() {
    let totals = date_totals(&fleet());
    assert_eq!(totals.order, SortOrder::Descending);

    let ascending = totals.sorted(SortOrder::Ascending);
    let mut reversed = ascending.rows.clone();
    reversed.reverse();
    assert_eq!(reversed, totals.rows);
    assert_eq!(ascending.rows[0].date, day(1).unwrap());
}

#[test]
fn per_date_item_counts_add_up_to_record_counts() {
    let records = fleet();
    let pivot = item_counts_per_date(&records);

    for (date, count) in record_count_by_date(&records) {
        assert_eq!(pivot.total_for_date(date), count);
    }
    assert_eq!(pivot.series("Pertalite"), Some(vec![0, 0, 2]));
}

#[test]
fn unreadable_dates_stay_out_of_per_date_views() {
    let csv = format!(
        "{HEADER}\n\
         B 1,Ann,2024-03-01,Diesel,10,100,1000\n\
         B 1,Ann,someday,Diesel,5,50,1100\n"
    );
    let log = from_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    assert_eq!(log.report.missing_dates, 1);
    assert_eq!(log.records.len(), 2);

    let additional = AdditionalAnalysis::compute(&log.records);
    assert_eq!(additional.undated_records, 1);
    assert_eq!(additional.date_totals.rows.len(), 1);
    assert_eq!(additional.date_totals.rows[0].quantity, 10.0);

    // The undated row still counts towards the vehicle
    let totals = vehicle_totals(&log.records);
    assert_eq!(totals[0].quantity, 15.0);
}
