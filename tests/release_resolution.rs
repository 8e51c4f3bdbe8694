//! Integration tests for release resolution
//!
//! These tests wire the real metadata client, cycle cache, naming catalog and
//! HTTP prober together through the configuration layer, against a loopback
//! server that plays both the metadata service and the product host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use chart_cycles::app::{
    Edition, ProductFamily, ProductFormat, ReleaseAssembler, ResolutionOutcome, ResolutionStatus,
    Series,
};
use chart_cycles::cli::build_assembler;
use chart_cycles::config::{AppConfig, ProductConfigToml};

const METADATA_DOCUMENT: &str = r#"{
    "editions": [
        {"period": "CURRENT", "type": "56 DAY", "effectiveDate": "2023-10-05", "cycleNumber": "2310"},
        {"period": "NEXT", "type": "56 DAY", "effectiveDate": "11/30/2023"},
        {"period": "CURRENT", "type": "28 DAY", "effectiveDate": "2023-10-05"},
        {"period": "NEXT", "type": "28 DAY", "effectiveDate": "2023-11-02"}
    ]
}"#;

/// Loopback server answering from a path to status table
struct TestServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    async fn start(files: &[(&str, u16)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/", listener.local_addr().unwrap());
        let routes: Arc<HashMap<String, u16>> = Arc::new(
            files
                .iter()
                .map(|(path, status)| (path.to_string(), *status))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut buffer = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buffer).to_string();
                    let request_line = head.lines().next().unwrap_or_default().to_string();
                    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
                    let path = target.split('?').next().unwrap_or("/").to_string();
                    seen.lock().unwrap().push(request_line.clone());

                    let (status, body) = if path == "/apra/cycles" {
                        (200, METADATA_DOCUMENT)
                    } else {
                        (routes.get(&path).copied().unwrap_or(404), "")
                    };
                    let mut response = format!(
                        "HTTP/1.1 {} Test\r\ncontent-length: {}\r\nconnection: close\r\n",
                        status,
                        body.len()
                    );
                    if status == 302 {
                        response.push_str("location: /mirror/file.zip\r\n");
                    }
                    response.push_str("\r\n");
                    if !request_line.starts_with("HEAD") {
                        response.push_str(body);
                    }
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { base, requests }
    }

    fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.metadata.base_url = format!("{}apra", self.base);
        config.download.base_url = self.base.clone();
        config.client.proxy_host = String::new();
        config
    }

    fn assembler(&self) -> ReleaseAssembler {
        build_assembler(&self.config()).unwrap()
    }

    fn head_requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.starts_with("HEAD"))
            .cloned()
            .collect()
    }
}

#[tokio::test]
async fn test_enroute_release_end_to_end() {
    let server = TestServer::start(&[
        ("/enroute/10-05-2023/enr_cl01.zip", 200),
        ("/enroute/10-05-2023/enr_cl02.zip", 302),
    ])
    .await;
    let assembler = server.assembler();

    let result = assembler
        .resolve_release(
            ProductFamily::IfrEnroute,
            Edition::Current,
            "Caribbean",
            ProductFormat::GeoTiff,
            Some(Series::Low),
        )
        .await;

    assert_eq!(result.status, ResolutionStatus::Ok);
    assert_eq!(result.outcome, ResolutionOutcome::Available);
    assert_eq!(
        result.urls,
        vec![
            format!("{}enroute/10-05-2023/enr_cl01.zip", server.base),
            format!("{}enroute/10-05-2023/enr_cl02.zip", server.base),
        ]
    );
    assert_eq!(
        result.cycle.as_ref().and_then(|c| c.cycle_number.as_deref()),
        Some("2310")
    );

    // Redirects are reported, not followed
    assert_eq!(server.head_requests().len(), 2);
}

#[tokio::test]
async fn test_missing_files_are_filtered() {
    let server = TestServer::start(&[("/enroute/10-05-2023/enr_cl01.zip", 200)]).await;
    let assembler = server.assembler();

    let result = assembler
        .resolve_release(
            ProductFamily::IfrEnroute,
            Edition::Current,
            "caribbean",
            ProductFormat::GeoTiff,
            Some(Series::Low),
        )
        .await;

    assert!(result.is_success());
    assert_eq!(result.urls.len(), 1);
    assert_eq!(result.available_count(), 1);
    assert_eq!(
        result.availability.get("enroute/10-05-2023/enr_cl02.zip"),
        Some(&false)
    );
}

#[tokio::test]
async fn test_nothing_published_is_not_found() {
    let server = TestServer::start(&[]).await;
    let assembler = server.assembler();

    let result = assembler
        .resolve_release(
            ProductFamily::Cifp,
            Edition::Next,
            "US",
            ProductFormat::Zip,
            None,
        )
        .await;

    assert_eq!(result.status, ResolutionStatus::NotFound);
    assert_eq!(result.outcome, ResolutionOutcome::AllCandidatesUnreachable);
    assert!(result.urls.is_empty());
    assert_eq!(
        result.availability.get("Upload_313-d/cifp/CIFP_231102.zip"),
        Some(&false)
    );
}

#[tokio::test]
async fn test_verification_can_be_disabled_per_family() {
    let server = TestServer::start(&[]).await;
    let mut config = server.config();
    config.products.insert(
        "cifp".to_string(),
        ProductConfigToml {
            verify_availability: Some(false),
            ..Default::default()
        },
    );
    let assembler = build_assembler(&config).unwrap();

    let result = assembler
        .resolve_release(
            ProductFamily::Cifp,
            Edition::Current,
            "US",
            ProductFormat::Zip,
            None,
        )
        .await;

    assert_eq!(result.status, ResolutionStatus::Ok);
    assert_eq!(result.outcome, ResolutionOutcome::Unverified);
    assert_eq!(
        result.urls,
        vec![format!("{}Upload_313-d/cifp/CIFP_231005.zip", server.base)]
    );
    assert!(server.head_requests().is_empty());
}

#[tokio::test]
async fn test_edition_only_derives_cycle_numbers() {
    let server = TestServer::start(&[]).await;
    let assembler = server.assembler();

    let current = assembler
        .resolve_edition_only(ProductFamily::Cifp, Edition::Current, None)
        .await
        .unwrap();
    let next = assembler
        .resolve_edition_only(ProductFamily::Cifp, Edition::Next, None)
        .await
        .unwrap();

    assert_eq!(current.cycle_number.as_deref(), Some("50"));
    assert_eq!(next.cycle_number.as_deref(), Some("51"));

    // One metadata fetch serves both editions
    let fetches = server
        .requests
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.contains("/apra/cycles"))
        .count();
    assert_eq!(fetches, 1);

    let enroute_next = assembler
        .resolve_edition_only(ProductFamily::IfrEnroute, Edition::Next, None)
        .await
        .unwrap();
    assert_eq!(
        enroute_next.effective_date,
        chrono::NaiveDate::from_ymd_opt(2023, 11, 30).unwrap()
    );
    assert!(enroute_next.cycle_number.is_none());
}

#[tokio::test]
async fn test_metadata_outage_is_not_found() {
    let mut config = AppConfig::default();
    config.metadata.base_url = "http://127.0.0.1:9/apra".to_string();
    config.client.proxy_host = String::new();
    let assembler = build_assembler(&config).unwrap();

    let result = assembler
        .resolve_release(
            ProductFamily::Sectional,
            Edition::Current,
            "Seattle",
            ProductFormat::GeoTiff,
            None,
        )
        .await;

    assert_eq!(result.status, ResolutionStatus::NotFound);
    assert_eq!(result.outcome, ResolutionOutcome::MetadataUnavailable);
    assert!(result.cycle.is_none());
}
