//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use record_ingest::config::ServiceConfig;
use record_ingest::http::HttpServer;
use record_ingest::lifecycle::Shutdown;
use record_ingest::store::RecordStore;
use tokio::net::TcpListener;

/// A service instance listening on an ephemeral local port.
#[allow(dead_code)]
pub struct TestService {
    pub addr: SocketAddr,
    pub store: Arc<RecordStore>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with default settings.
pub async fn start_service() -> TestService {
    start_service_with(ServiceConfig::default()).await
}

/// Start the service with `config`, ignoring its bind address.
#[allow(dead_code)]
pub async fn start_service_with(config: ServiceConfig) -> TestService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let store = server.store();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    wait_until_ready(addr).await;

    TestService {
        addr,
        store,
        shutdown,
    }
}

async fn wait_until_ready(addr: SocketAddr) {
    let client = reqwest::Client::new();
    let url = format!("http://{}/health", addr);
    for _ in 0..50 {
        if let Ok(res) = client.get(&url).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("service at {} did not become ready", addr);
}
