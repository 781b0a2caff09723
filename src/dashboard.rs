//! Page composition: which charts each dashboard page shows

use crate::analysis::{AdditionalAnalysis, FuelAnalysis};
use crate::error::Result;
use crate::graph::{
    BLUE_BAR, BarSeries, ChartOptions, GREEN_BAR, LIGHTBLUE_BAR, ORANGE_BAR, PURPLE_BAR,
    SALMON_BAR, SKYBLUE_BAR, bar_chart, dual_axis_bar_chart, series_color, stacked_bar_chart,
};
use crate::record::{AMOUNT_COLUMN, QUANTITY_COLUMN};
use serde::Serialize;

/// The two views offered by the page selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    FuelAnalysis,
    AdditionalAnalysis,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::FuelAnalysis, Page::AdditionalAnalysis];

    /// Page named by a `?page=` value, falling back to Fuel Analysis
    pub fn from_slug(slug: Option<&str>) -> Page {
        match slug {
            Some("additional") => Page::AdditionalAnalysis,
            _ => Page::FuelAnalysis,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Page::FuelAnalysis => "fuel",
            Page::AdditionalAnalysis => "additional",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::FuelAnalysis => "Fuel Analysis",
            Page::AdditionalAnalysis => "Additional Analysis",
        }
    }

    /// File name of the workbook offered on this page
    pub fn download_filename(self) -> &'static str {
        match self {
            Page::FuelAnalysis => crate::downloader::FUEL_ANALYSIS_FILENAME,
            Page::AdditionalAnalysis => crate::downloader::DATE_SUMMARY_FILENAME,
        }
    }
}

/// Chart size and labelling shared by every chart
#[derive(Clone, Debug)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,

    /// Currency code shown on amount axes
    pub currency: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            currency: "IDR".to_string(),
        }
    }
}

impl ChartSettings {
    fn options(&self, title: &str, x_label: &str, y_label: &str) -> ChartOptions {
        ChartOptions {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            secondary_y_label: String::new(),
            width: self.width,
            height: self.height,
        }
    }

    fn amount_label(&self) -> String {
        format!("Total Amount ({}) of Fuel", self.currency)
    }
}

/// A chart ready to be embedded in a page or written to disk
#[derive(Clone, Debug, Serialize)]
pub struct RenderedChart {
    /// Stable identifier, also used as the file stem
    pub id: &'static str,
    pub title: String,
    pub svg: String,
}

const QUANTITY_AXIS: &str = "Total Quantity (L) of Fuel";

/// Charts of the "Fuel Analysis" page, in display order
pub fn fuel_charts(analysis: &FuelAnalysis, settings: &ChartSettings) -> Result<Vec<RenderedChart>> {
    let mut charts = Vec::with_capacity(4);

    let title = "Fuel Efficiency by Vehicle (KM/L)";
    let labels: Vec<String> = analysis
        .vehicle_efficiency
        .iter()
        .map(|r| r.vehicle.clone())
        .collect();
    let values: Vec<f64> = analysis.vehicle_efficiency.iter().map(|r| r.efficiency).collect();
    let options = settings.options(title, "Vehicle Registration No", "Fuel Efficiency (KM/L)");
    charts.push(RenderedChart {
        id: "fuel-efficiency",
        title: title.to_string(),
        svg: bar_chart(&labels, &values, GREEN_BAR, &options)?,
    });

    let title = "Total Quantity and Amount of Fuel by Vehicle";
    let labels: Vec<String> = analysis.vehicle_totals.iter().map(|r| r.vehicle.clone()).collect();
    let quantity = BarSeries::new(
        QUANTITY_COLUMN,
        analysis.vehicle_totals.iter().map(|r| r.quantity).collect(),
        SKYBLUE_BAR,
    );
    let amount = BarSeries::new(
        AMOUNT_COLUMN,
        analysis.vehicle_totals.iter().map(|r| r.amount).collect(),
        ORANGE_BAR,
    );
    let options = ChartOptions {
        secondary_y_label: settings.amount_label(),
        ..settings.options(title, "Vehicle Registration No", QUANTITY_AXIS)
    };
    charts.push(RenderedChart {
        id: "vehicle-totals",
        title: title.to_string(),
        svg: dual_axis_bar_chart(&labels, &quantity, &amount, &options)?,
    });

    let title = "Total Amount of Fuel Purchased by Driver";
    let labels: Vec<String> = analysis.driver_totals.iter().map(|r| r.driver.clone()).collect();
    let values: Vec<f64> = analysis.driver_totals.iter().map(|r| r.amount).collect();
    let options = settings.options(title, "Driver", &settings.amount_label());
    charts.push(RenderedChart {
        id: "driver-totals",
        title: title.to_string(),
        svg: bar_chart(&labels, &values, PURPLE_BAR, &options)?,
    });

    let title = "Total Fuel Type Across All Dates";
    let labels: Vec<String> = analysis.item_counts.iter().map(|r| r.item.clone()).collect();
    let values: Vec<f64> = analysis.item_counts.iter().map(|r| r.count as f64).collect();
    let options = settings.options(title, "Item Name", "Count");
    charts.push(RenderedChart {
        id: "item-counts",
        title: title.to_string(),
        svg: bar_chart(&labels, &values, BLUE_BAR, &options)?,
    });

    Ok(charts)
}

/// Charts of the "Additional Analysis" page, in display order
pub fn additional_charts(
    analysis: &AdditionalAnalysis,
    settings: &ChartSettings,
) -> Result<Vec<RenderedChart>> {
    let mut charts = Vec::with_capacity(2);

    let title = "Total Quantity and Amount of Fuel by Date";
    let rows = &analysis.date_totals.rows;
    let labels: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let quantity = BarSeries::new(
        QUANTITY_COLUMN,
        rows.iter().map(|r| r.quantity).collect(),
        LIGHTBLUE_BAR,
    );
    let amount = BarSeries::new(
        AMOUNT_COLUMN,
        rows.iter().map(|r| r.amount).collect(),
        SALMON_BAR,
    );
    let options = ChartOptions {
        secondary_y_label: settings.amount_label(),
        ..settings.options(title, "Transaction Date", QUANTITY_AXIS)
    };
    charts.push(RenderedChart {
        id: "date-totals",
        title: title.to_string(),
        svg: dual_axis_bar_chart(&labels, &quantity, &amount, &options)?,
    });

    let title = "ItemName Count Per Date";
    let pivot = &analysis.item_counts_per_date;
    let labels: Vec<String> = pivot.dates.iter().map(|d| d.to_string()).collect();
    let series: Vec<BarSeries> = pivot
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let values = pivot.counts.iter().map(|row| row[idx] as f64).collect();
            BarSeries::new(item.clone(), values, series_color(idx))
        })
        .collect();
    let options = settings.options(title, "Transaction Date", "Count");
    charts.push(RenderedChart {
        id: "item-counts-per-date",
        title: title.to_string(),
        svg: stacked_bar_chart(&labels, &series, &options)?,
    });

    Ok(charts)
}
