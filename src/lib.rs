/*!
# Fuel Dashboard

A browser-based dashboard for fuel transaction logs, built in Rust.

## Overview

An operator uploads a CSV export of fuel purchases. The log is normalized
(thousands separators stripped, dates parsed leniently) and summarized per
vehicle, per driver, per date and per fuel item. The summaries are shown as bar
charts on two pages and can be downloaded as Excel workbooks.

## Architecture

### Data Layer
- **loader**: CSV ingestion into [`TransactionRecord`]s with an [`IngestReport`]
  of skipped rows and unreadable dates
- **record**: the normalized transaction and the expected column names

### Analysis Layer
- **analysis**: fuel efficiency, vehicle/driver/date totals and item counts
- **graph**: single-axis, dual-axis and stacked bar charts rendered to SVG
- **dashboard**: the two pages and the charts each one shows
- **downloader**: `fuel_analysis_data.xlsx` and `date_summary_analysis.xlsx`

### Delivery Layer
- **app**: axum routes for the dashboard, uploads and downloads (feature `web`)
- **report**: batch output of workbooks and charts to a directory
- **config**: command line and environment options for both binaries

## Usage

```text
fuel-dashboard --port 3000          # serve the dashboard
fuel-report fuel.csv -o reports/    # write workbooks and charts
```

## REST API Endpoints

- `/?page=fuel|additional` - Dashboard page
- `/upload` - Multipart CSV upload (fields `file`, `page`)
- `/download/fuel_analysis_data.xlsx` - Vehicle and driver workbook
- `/download/date_summary_analysis.xlsx` - Per-date workbook
- `/api/analysis?page=` - Page analysis as JSON
- `/health` - Liveness probe
*/

pub mod analysis;
#[cfg(feature = "web")]
pub mod app;
pub mod config;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod graph;
pub mod loader;
pub mod record;
pub mod report;

pub use error::{DashboardError, Result};
pub use loader::{IngestReport, LoadOptions, LoadedLog};
pub use record::TransactionRecord;
