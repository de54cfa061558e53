// tests/metrics.rs
use std::fs;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt as _;

use startup_directory::ingest::config::DirectoryConfig;
use startup_directory::telemetry::Metrics;
use startup_directory::Directory;

#[tokio::test]
async fn metrics_endpoint_exposes_directory_series() {
    // Recorder first, so ingest-time series are captured.
    Metrics::init().expect("install recorder");

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("list1.csv"), include_str!("fixtures/list_a.csv")).unwrap();
    fs::write(dir.path().join("list2.csv"), include_str!("fixtures/list_b.csv")).unwrap();
    let directory = Directory::load(DirectoryConfig {
        data_dir: dir.path().to_path_buf(),
        sources: vec!["list1.csv".into(), "list2.csv".into(), "gone.csv".into()],
        page_size: 10,
    })
    .await;

    let app = startup_directory::app_with(directory).expect("router");

    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/companies/query")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    for series in [
        "directory_ingest_rows_total",
        "directory_ingest_dedup_total",
        "directory_ingest_source_errors_total",
        "directory_companies_loaded",
        "directory_queries_total",
    ] {
        assert!(text.contains(series), "missing {series} in:\n{text}");
    }
}
