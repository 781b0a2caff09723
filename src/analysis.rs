//! Aggregate views derived from a normalized fuel log
//!
//! Every view is a pure function of the record slice and is recomputed on
//! each render. Records whose grouping key is missing are left out of that
//! view only.

use crate::record::TransactionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Odometer span and fuel use of one vehicle
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleEfficiency {
    pub vehicle: String,
    pub initial_odometer: Option<f64>,
    pub last_odometer: Option<f64>,
    pub total_quantity: f64,

    /// Distance per liter; `inf` or `NaN` when the quantity is zero
    pub efficiency: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleTotals {
    pub vehicle: String,
    pub quantity: f64,
    pub amount: f64,
}

/// One row of the combined vehicle table offered for download
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleAnalysisRow {
    pub vehicle: String,
    pub initial_odometer: Option<f64>,
    pub last_odometer: Option<f64>,
    pub total_quantity: f64,
    pub efficiency: f64,
    pub quantity: f64,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DriverTotal {
    pub driver: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DateTotal {
    pub date: NaiveDate,
    pub quantity: f64,
    pub amount: f64,
}

/// Quantity and amount per calendar date, kept in a known order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DateTotals {
    pub order: SortOrder,
    pub rows: Vec<DateTotal>,
}

impl DateTotals {
    /// The same rows re-sorted by date
    pub fn sorted(&self, order: SortOrder) -> DateTotals {
        let mut rows = self.rows.clone();
        match order {
            SortOrder::Ascending => rows.sort_by(|a, b| a.date.cmp(&b.date)),
            SortOrder::Descending => rows.sort_by(|a, b| b.date.cmp(&a.date)),
        }
        DateTotals { order, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemCount {
    pub item: String,
    pub count: u64,
}

/// Record counts per (date, item) pivoted into one series per item
///
/// `counts[d][i]` is the number of records on `dates[d]` for `items[i]`;
/// combinations that never occur are zero. Dates and items are ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ItemCountsPerDate {
    pub dates: Vec<NaiveDate>,
    pub items: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl ItemCountsPerDate {
    /// Counts of one item across all dates
    pub fn series(&self, item: &str) -> Option<Vec<u64>> {
        let column = self.items.iter().position(|i| i == item)?;
        Some(self.counts.iter().map(|row| row[column]).collect())
    }

    pub fn total_for_date(&self, date: NaiveDate) -> u64 {
        self.dates
            .iter()
            .position(|d| *d == date)
            .map(|row| self.counts[row].iter().sum())
            .unwrap_or(0)
    }
}

/// Everything shown on the "Fuel Analysis" page
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FuelAnalysis {
    pub vehicle_efficiency: Vec<VehicleEfficiency>,
    pub vehicle_totals: Vec<VehicleTotals>,
    pub vehicle_analysis: Vec<VehicleAnalysisRow>,
    pub driver_totals: Vec<DriverTotal>,
    pub item_counts: Vec<ItemCount>,
}

impl FuelAnalysis {
    pub fn compute(records: &[TransactionRecord]) -> Self {
        let vehicle_efficiency = vehicle_efficiency(records);
        let vehicle_totals = vehicle_totals(records);
        let vehicle_analysis = combine_vehicle_tables(&vehicle_efficiency, &vehicle_totals);

        FuelAnalysis {
            vehicle_efficiency,
            vehicle_totals,
            vehicle_analysis,
            driver_totals: driver_totals(records),
            item_counts: item_counts(records),
        }
    }
}

/// Everything shown on the "Additional Analysis" page
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdditionalAnalysis {
    pub date_totals: DateTotals,
    pub item_counts_per_date: ItemCountsPerDate,

    /// Records left out of the date views because their date is missing
    pub undated_records: usize,
}

impl AdditionalAnalysis {
    pub fn compute(records: &[TransactionRecord]) -> Self {
        AdditionalAnalysis {
            date_totals: date_totals(records),
            item_counts_per_date: item_counts_per_date(records),
            undated_records: records.iter().filter(|r| r.date.is_none()).count(),
        }
    }
}

/// Distance per unit of fuel
///
/// Plain IEEE division: a positive span over zero fuel is `inf`, a zero span
/// over zero fuel is `NaN`. A vehicle without odometer readings is `NaN`.
///
/// # Examples
/// ```
/// use fuel_dashboard::analysis::fuel_efficiency;
///
/// assert_eq!(fuel_efficiency(Some(1000.0), Some(1500.0), 25.0), 20.0);
/// assert!(fuel_efficiency(Some(1000.0), Some(1500.0), 0.0).is_infinite());
/// assert!(fuel_efficiency(None, None, 10.0).is_nan());
/// ```
pub fn fuel_efficiency(initial: Option<f64>, last: Option<f64>, total_quantity: f64) -> f64 {
    match (initial, last) {
        (Some(initial), Some(last)) => (last - initial) / total_quantity,
        _ => f64::NAN,
    }
}

#[derive(Default)]
struct VehicleAccumulator {
    odometer_min: Option<f64>,
    odometer_max: Option<f64>,
    quantities: Vec<f64>,
    amounts: Vec<f64>,
}

fn group_by_vehicle(records: &[TransactionRecord]) -> BTreeMap<&str, VehicleAccumulator> {
    let mut groups: BTreeMap<&str, VehicleAccumulator> = BTreeMap::new();
    for record in records {
        let Some(vehicle) = record.vehicle.as_deref() else {
            continue;
        };
        let acc = groups.entry(vehicle).or_default();
        if let Some(odometer) = record.odometer {
            acc.odometer_min = Some(acc.odometer_min.map_or(odometer, |m| m.min(odometer)));
            acc.odometer_max = Some(acc.odometer_max.map_or(odometer, |m| m.max(odometer)));
        }
        acc.quantities.extend(record.quantity);
        acc.amounts.extend(record.amount);
    }
    groups
}

/// Fuel efficiency per vehicle, best first
///
/// Ties keep vehicle order; vehicles with an undefined (`NaN`) efficiency
/// come last.
pub fn vehicle_efficiency(records: &[TransactionRecord]) -> Vec<VehicleEfficiency> {
    let mut rows: Vec<VehicleEfficiency> = group_by_vehicle(records)
        .into_iter()
        .map(|(vehicle, mut acc)| {
            let total_quantity = order_independent_sum(&mut acc.quantities);
            VehicleEfficiency {
                vehicle: vehicle.to_string(),
                initial_odometer: acc.odometer_min,
                last_odometer: acc.odometer_max,
                total_quantity,
                efficiency: fuel_efficiency(acc.odometer_min, acc.odometer_max, total_quantity),
            }
        })
        .collect();

    rows.sort_by(|a, b| descending_nan_last(a.efficiency, b.efficiency));
    rows
}

/// Total quantity and amount per vehicle, largest quantity first
pub fn vehicle_totals(records: &[TransactionRecord]) -> Vec<VehicleTotals> {
    let mut rows: Vec<VehicleTotals> = group_by_vehicle(records)
        .into_iter()
        .map(|(vehicle, mut acc)| VehicleTotals {
            vehicle: vehicle.to_string(),
            quantity: order_independent_sum(&mut acc.quantities),
            amount: order_independent_sum(&mut acc.amounts),
        })
        .collect();

    rows.sort_by(|a, b| descending_nan_last(a.quantity, b.quantity));
    rows
}

/// Join efficiency and totals on the vehicle, in efficiency order
pub fn combine_vehicle_tables(
    efficiency: &[VehicleEfficiency],
    totals: &[VehicleTotals],
) -> Vec<VehicleAnalysisRow> {
    let by_vehicle: BTreeMap<&str, &VehicleTotals> =
        totals.iter().map(|t| (t.vehicle.as_str(), t)).collect();

    efficiency
        .iter()
        .filter_map(|e| {
            let totals = by_vehicle.get(e.vehicle.as_str())?;
            Some(VehicleAnalysisRow {
                vehicle: e.vehicle.clone(),
                initial_odometer: e.initial_odometer,
                last_odometer: e.last_odometer,
                total_quantity: e.total_quantity,
                efficiency: e.efficiency,
                quantity: totals.quantity,
                amount: totals.amount,
            })
        })
        .collect()
}

/// Total amount per driver, largest first
pub fn driver_totals(records: &[TransactionRecord]) -> Vec<DriverTotal> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(driver) = record.driver.as_deref() {
            groups.entry(driver).or_default().extend(record.amount);
        }
    }

    let mut rows: Vec<DriverTotal> = groups
        .into_iter()
        .map(|(driver, mut amounts)| DriverTotal {
            driver: driver.to_string(),
            amount: order_independent_sum(&mut amounts),
        })
        .collect();

    rows.sort_by(|a, b| descending_nan_last(a.amount, b.amount));
    rows
}

/// Quantity and amount per transaction date, newest first
pub fn date_totals(records: &[TransactionRecord]) -> DateTotals {
    let mut groups: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date {
            let (quantities, amounts) = groups.entry(date).or_default();
            quantities.extend(record.quantity);
            amounts.extend(record.amount);
        }
    }

    let rows = groups
        .into_iter()
        .rev()
        .map(|(date, (mut quantities, mut amounts))| DateTotal {
            date,
            quantity: order_independent_sum(&mut quantities),
            amount: order_independent_sum(&mut amounts),
        })
        .collect();

    DateTotals {
        order: SortOrder::Descending,
        rows,
    }
}

/// Number of records per item name, most frequent first
pub fn item_counts(records: &[TransactionRecord]) -> Vec<ItemCount> {
    let mut groups: BTreeMap<&str, u64> = BTreeMap::new();
    for item in records.iter().filter_map(|r| r.item.as_deref()) {
        *groups.entry(item).or_insert(0) += 1;
    }

    let mut rows: Vec<ItemCount> = groups
        .into_iter()
        .map(|(item, count)| ItemCount {
            item: item.to_string(),
            count,
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Number of records per date and item name
pub fn item_counts_per_date(records: &[TransactionRecord]) -> ItemCountsPerDate {
    let mut groups: BTreeMap<NaiveDate, BTreeMap<&str, u64>> = BTreeMap::new();
    let mut items: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        if let (Some(date), Some(item)) = (record.date, record.item.as_deref()) {
            *groups.entry(date).or_default().entry(item).or_insert(0) += 1;
            items.insert(item);
        }
    }

    let counts = groups
        .values()
        .map(|per_item| {
            items
                .iter()
                .map(|item| per_item.get(item).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    ItemCountsPerDate {
        dates: groups.keys().copied().collect(),
        items: items.into_iter().map(str::to_string).collect(),
        counts,
    }
}

/// Number of records per date, whatever their item
pub fn record_count_by_date(records: &[TransactionRecord]) -> BTreeMap<NaiveDate, u64> {
    let mut counts = BTreeMap::new();
    for date in records.iter().filter_map(|r| r.date) {
        *counts.entry(date).or_insert(0) += 1;
    }
    counts
}

// Summing in sorted order makes totals independent of row order
fn order_independent_sum(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
