#![cfg(feature = "web")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use fuel_dashboard::app::{AppState, router};
use fuel_dashboard::dashboard::ChartSettings;
use fuel_dashboard::downloader::XLSX_CONTENT_TYPE;
use fuel_dashboard::loader::LoadOptions;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "fuel-dashboard-test";

const FUEL_CSV: &str = "\
VehicleRegistrationNo,DriverFullName,TransactionDate,ItemName,Quantity,TotalAmount,Odometer
B 1,Ann,2024-03-01,Diesel,10,\"150,000\",\"1,000\"
B 1,Ann,2024-03-02,Diesel,15,\"225,000\",\"1,500\"
B 2,Budi,2024-03-01,Pertamax,20,\"300,000\",\"2,000\"
B 2,Budi,2024-03-02,Pertamax,abc,\"150,000\",\"2,300\"
";

fn app() -> Router {
    let state = AppState::new(LoadOptions::default(), ChartSettings::default()).unwrap();
    router(Arc::new(state), 1024 * 1024)
}

fn upload_request(csv: &str, page: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"page\"\r\n\r\n\
         {page}\r\n\
         --{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"fuel.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn health_check() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn empty_dashboard_shows_only_the_upload_form() {
    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Fuel Transaction Analysis"));
    assert!(html.contains("action=\"/upload\""));
    assert!(html.contains("href=\"/?page=additional\""));
    assert!(!html.contains("<svg"));
    assert!(!html.contains("/download/"));
}

#[tokio::test]
async fn downloads_need_an_upload() {
    let app = app();
    for uri in [
        "/download/fuel_analysis_data.xlsx",
        "/download/date_summary_analysis.xlsx",
        "/api/analysis",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn upload_then_browse_both_pages() {
    let app = app();

    let response = app
        .clone()
        .oneshot(upload_request(FUEL_CSV, "additional"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?page=additional");

    let html = body_text(app.clone().oneshot(get("/?page=fuel")).await.unwrap()).await;
    for id in ["fuel-efficiency", "vehicle-totals", "driver-totals", "item-counts"] {
        assert!(html.contains(&format!("id=\"{}\"", id)), "missing chart {}", id);
    }
    assert!(html.contains("/download/fuel_analysis_data.xlsx"));
    // The malformed Quantity on line 5 is reported, not fatal
    assert!(html.contains("1 row(s) skipped"));
    assert!(html.contains("line 5"));
    assert!(html.contains("3 of 4 rows"));

    let html = body_text(app.clone().oneshot(get("/?page=additional")).await.unwrap()).await;
    assert!(html.contains("id=\"date-totals\""));
    assert!(html.contains("id=\"item-counts-per-date\""));
    assert!(html.contains("/download/date_summary_analysis.xlsx"));

    let response = app
        .clone()
        .oneshot(get("/download/fuel_analysis_data.xlsx"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("fuel_analysis_data.xlsx")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn missing_column_is_a_bad_request() {
    let app = app();
    let csv = "VehicleRegistrationNo,DriverFullName,TransactionDate,ItemName,Quantity,TotalAmount\n\
               B 1,Ann,2024-03-01,Diesel,10,100\n";

    let response = app.clone().oneshot(upload_request(csv, "fuel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Missing required column: Odometer"));

    // Nothing was stored
    let response = app.oneshot(get("/download/fuel_analysis_data.xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analysis_api_returns_page_json() {
    let app = app();
    app.clone()
        .oneshot(upload_request(FUEL_CSV, "fuel"))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/analysis?page=fuel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["page"], "fuel");
    assert_eq!(json["file"], "fuel.csv");
    assert_eq!(json["ingest"]["rows_read"], 4);
    assert_eq!(json["ingest"]["rejected"][0]["column"], "Quantity");

    let efficiency = &json["analysis"]["vehicle_efficiency"];
    assert_eq!(efficiency[0]["vehicle"], "B 1");
    assert_eq!(efficiency[0]["efficiency"], 20.0);
}

#[tokio::test]
async fn failed_upload_keeps_the_previous_one() {
    let app = app();
    let response = app
        .clone()
        .oneshot(upload_request(FUEL_CSV, "fuel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let bad_csv = "VehicleRegistrationNo,DriverFullName,TransactionDate,ItemName,Quantity\n\
                   B 9,Zed,2024-04-01,Diesel,1\n";
    let response = app
        .clone()
        .oneshot(upload_request(bad_csv, "fuel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Missing required column: TotalAmount"));
    // The error page still shows the held upload's charts
    assert!(html.contains("id=\"fuel-efficiency\""));

    let response = app
        .clone()
        .oneshot(get("/download/fuel_analysis_data.xlsx"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/analysis?page=fuel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["file"], "fuel.csv");
    assert_eq!(json["ingest"]["rows_read"], 4);
    assert_eq!(json["analysis"]["vehicle_efficiency"][0]["vehicle"], "B 1");
}
