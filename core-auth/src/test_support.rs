//! Shared fixtures for the unit tests in this crate.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, Clock, HttpClient, HttpRequest, HttpResponse, KeyValueStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::types::{SessionCredentials, UserRole, UserSummary};

pub(crate) const BASE: &str = "http://api.test";

enum Reply {
    Respond(u16, String),
    Fail(String),
}

/// HTTP client answering from per-route queues keyed by `"METHOD /path"`.
///
/// Unscripted routes answer `404` with an empty body.
#[derive(Clone, Default)]
pub(crate) struct ScriptedHttpClient {
    routes: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedHttpClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, route: &str, status: u16, body: &str) -> &Self {
        self.push(route, Reply::Respond(status, body.to_string()));
        self
    }

    pub(crate) fn fail(&self, route: &str) -> &Self {
        self.push(route, Reply::Fail(format!("connection refused: {}", route)));
        self
    }

    fn push(&self, route: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requests_to(&self, route: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| route_of(request) == route)
            .collect()
    }

    pub(crate) fn calls_to(&self, route: &str) -> usize {
        self.requests_to(route).len()
    }
}

fn route_of(request: &HttpRequest) -> String {
    let path = request.url.strip_prefix(BASE).unwrap_or(&request.url);
    format!("{} {}", request.method, path)
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let route = route_of(&request);
        self.requests.lock().unwrap().push(request);

        let reply = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(|queue| queue.pop_front());

        match reply {
            Some(Reply::Respond(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Fail(message)) => Err(BridgeError::OperationFailed(message)),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Store whose every operation fails, like storage disabled by the host.
pub(crate) struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get_item(&self, _key: &str) -> BridgeResult<Option<String>> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> BridgeResult<()> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn remove_item(&self, _key: &str) -> BridgeResult<()> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn keys(&self) -> BridgeResult<Vec<String>> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }
}

pub(crate) fn sample_user() -> UserSummary {
    UserSummary {
        id: "u1".to_string(),
        email: "jane@example.com".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        role: UserRole::Student,
    }
}

pub(crate) fn session_at(
    clock: &dyn Clock,
    access_token: &str,
    refresh_token: &str,
    valid_for: Duration,
) -> SessionCredentials {
    SessionCredentials::new(
        access_token,
        refresh_token,
        Some(sample_user()),
        clock.now() + valid_for,
    )
}
