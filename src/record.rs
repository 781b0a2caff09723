use chrono::NaiveDate;
use serde::Serialize;

pub const VEHICLE_COLUMN: &str = "VehicleRegistrationNo";
pub const DRIVER_COLUMN: &str = "DriverFullName";
pub const DATE_COLUMN: &str = "TransactionDate";
pub const ITEM_COLUMN: &str = "ItemName";
pub const QUANTITY_COLUMN: &str = "Quantity";
pub const AMOUNT_COLUMN: &str = "TotalAmount";
pub const ODOMETER_COLUMN: &str = "Odometer";

/// Columns a fuel log must carry, in the order they are documented
pub const REQUIRED_COLUMNS: [&str; 7] = [
    VEHICLE_COLUMN,
    DRIVER_COLUMN,
    DATE_COLUMN,
    ITEM_COLUMN,
    QUANTITY_COLUMN,
    AMOUNT_COLUMN,
    ODOMETER_COLUMN,
];

/// One normalized fuel transaction
///
/// Every field is optional: a missing key excludes the record from that
/// grouping only, and a missing number is skipped by sums, minima and maxima.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Vehicle registration number
    pub vehicle: Option<String>,

    /// Driver full name
    pub driver: Option<String>,

    /// Transaction date, `None` when the source value did not parse
    pub date: Option<NaiveDate>,

    /// Fuel or product type
    pub item: Option<String>,

    /// Liters
    pub quantity: Option<f64>,

    /// Currency units
    pub amount: Option<f64>,

    pub odometer: Option<f64>,
}

impl TransactionRecord {
    /// Shorthand used by tests and demos to build a fully populated record
    pub fn new(
        vehicle: &str,
        driver: &str,
        date: Option<NaiveDate>,
        item: &str,
        quantity: f64,
        amount: f64,
        odometer: f64,
    ) -> Self {
        TransactionRecord {
            vehicle: Some(vehicle.to_string()),
            driver: Some(driver.to_string()),
            date,
            item: Some(item.to_string()),
            quantity: Some(quantity),
            amount: Some(amount),
            odometer: Some(odometer),
        }
    }
}
