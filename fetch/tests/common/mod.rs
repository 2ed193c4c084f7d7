//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use randex_types::ReferenceHandle;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub fn client() -> reqwest::Client {
    randex_fetch::build_client(&randex_fetch::ClientOptions::default())
        .expect("client should build")
}

/// A PokeAPI-shaped record with `image` at `/sprites/front_default`.
pub fn record(name: &str, image: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "sprites": {
            "front_default": image,
            "back_default": null
        }
    })
}

/// Mount a record at `route`, answered after `delay`.
pub async fn mount_record(server: &MockServer, route: &str, image: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(record(route, Some(image)))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn handle(server: &MockServer, name: &str, route: &str) -> ReferenceHandle {
    ReferenceHandle::new(name, format!("{}{route}", server.uri())).expect("valid handle")
}

/// Handle pointing at a local port nothing listens on.
pub fn unreachable_handle(name: &str) -> ReferenceHandle {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };
    ReferenceHandle::new(name, format!("http://127.0.0.1:{port}/pokemon/{name}/"))
        .expect("valid handle")
}

/// Answers every request with a record after `delay`, noting when each
/// request reached the server.
#[derive(Clone)]
pub struct DispatchLog {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl DispatchLog {
    pub fn new(delay: Duration) -> Self {
        Self {
            arrivals: Arc::new(Mutex::new(Vec::new())),
            delay,
        }
    }

    /// Serve every path under `prefix` through this log.
    pub async fn mount(&self, server: &MockServer, prefix: &str) {
        Mock::given(method("GET"))
            .and(path_regex(format!("^{prefix}")))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    pub fn arrivals(&self) -> Vec<Instant> {
        self.arrivals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Time between the first and the last request reaching the server.
    pub fn spread(&self) -> Duration {
        let arrivals = self.arrivals();
        match (arrivals.iter().min(), arrivals.iter().max()) {
            (Some(first), Some(last)) => *last - *first,
            _ => Duration::ZERO,
        }
    }
}

impl Respond for DispatchLog {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_json(record(request.url.path(), Some("https://img.test/sprite.png")))
            .set_delay(self.delay)
    }
}
