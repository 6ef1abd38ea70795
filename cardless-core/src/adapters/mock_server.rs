//! Mock bank account data API server for testing
//!
//! Simulates the endpoints the client uses, with the same response shapes:
//! - POST /api/v2/token/new/ and /api/v2/token/refresh/
//! - GET /api/v2/institutions/?country=XX and /api/v2/institutions/{id}/
//! - GET/POST /api/v2/requisitions/ (paged), GET/DELETE /api/v2/requisitions/{id}/
//! - GET /api/v2/accounts/{id}/, .../balances/, .../transactions/
//!
//! Every data endpoint requires `Authorization: Bearer access-N`.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};
use url::Url;

const API_PREFIX: &str = "/api/v2";
const REFRESH_TOKEN: &str = "refresh-0";

/// Configuration for the simulated API
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Lifetime of the access token issued by token/new
    pub access_expires: i64,
    /// Lifetime of access tokens issued by token/refresh
    pub refreshed_access_expires: i64,
    /// Reject the secret pair with 401
    pub fail_auth: bool,
    /// Answer data endpoints with 500 and an empty body
    pub fail_server: bool,
    /// Total number of requisitions served by the paged listing
    pub num_requisitions: usize,
    /// Delay before answering a refresh, to widen race windows
    pub refresh_delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            access_expires: 86_400,
            refreshed_access_expires: 86_400,
            fail_auth: false,
            fail_server: false,
            num_requisitions: 3,
            refresh_delay_ms: 0,
        }
    }
}

/// Shared server state, observable from tests
#[derive(Debug)]
struct MockState {
    config: MockConfig,
    base_url: String,
    refresh_calls: AtomicUsize,
    deleted_requisitions: Mutex<Vec<String>>,
}

/// Mock API server for testing
pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<MockState>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockApiServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let state = Arc::new(MockState {
            config,
            base_url: format!("http://127.0.0.1:{}{}", port, API_PREFIX),
            refresh_calls: AtomicUsize::new(0),
            deleted_requisitions: Mutex::new(Vec::new()),
        });
        let state_clone = state.clone();

        // Set listener to non-blocking for graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// API base URL for this server (includes the `/api/v2` prefix)
    pub fn base_url(&self) -> String {
        self.state.base_url.clone()
    }

    /// Number of token/refresh calls received so far
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn deleted_requisitions(&self) -> Vec<String> {
        self.state
            .deleted_requisitions
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A parsed incoming request
struct MockRequest {
    method: String,
    path: String,
    query: Vec<(String, String)>,
    authorization: Option<String>,
    body: JsonValue,
}

fn read_request(stream: &mut TcpStream) -> Option<MockRequest> {
    stream.set_nonblocking(false).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;

    let mut data = Vec::new();
    let mut buffer = [0; 4096];
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match name.as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value),
                _ => {}
            }
        }
    }

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body = serde_json::from_slice(&data[header_end..]).unwrap_or(JsonValue::Null);

    let url = Url::parse(&format!("http://mock{}", target)).ok()?;
    let query = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Some(MockRequest {
        method,
        path: url.path().to_string(),
        query,
        authorization,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, state: &MockState) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (status, body) = route(&request, state);
    send_response(&mut stream, status, &body);
}

fn api_error(summary: &str, detail: &str, status: u16) -> (u16, String) {
    let body = json!({"summary": summary, "detail": detail, "status_code": status});
    (status, body.to_string())
}

fn ok(status: u16, body: JsonValue) -> (u16, String) {
    (status, body.to_string())
}

fn route(request: &MockRequest, state: &MockState) -> (u16, String) {
    let config = &state.config;
    let Some(path) = request.path.strip_prefix(API_PREFIX) else {
        return api_error("Not found.", "Unknown API prefix", 404);
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("POST", ["token", "new"]) => {
            if config.fail_auth || request.body["secret_key"].as_str() != Some("valid_key") {
                return api_error(
                    "Authentication failed",
                    "No active account found with the given credentials",
                    401,
                );
            }
            ok(
                200,
                json!({
                    "access": "access-0",
                    "access_expires": config.access_expires,
                    "refresh": REFRESH_TOKEN,
                    "refresh_expires": 2_592_000
                }),
            )
        }
        ("POST", ["token", "refresh"]) => {
            let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if config.refresh_delay_ms > 0 {
                thread::sleep(Duration::from_millis(config.refresh_delay_ms));
            }
            if request.body["refresh"].as_str() != Some(REFRESH_TOKEN) {
                return api_error("Invalid token", "Token is invalid or expired", 401);
            }
            ok(
                200,
                json!({
                    "access": format!("access-{}", n),
                    "access_expires": config.refreshed_access_expires
                }),
            )
        }
        _ if !is_authorized(request) => api_error(
            "Authentication credentials were not provided.",
            "Authentication credentials were not provided.",
            401,
        ),
        _ if config.fail_server => (500, String::new()),
        ("GET", ["institutions"]) => {
            let country = query_value(request, "country").unwrap_or_default();
            ok(200, json!([institution_json("SANDBOXFINANCE_SFIN0000", &country), sparse_institution_json()]))
        }
        ("GET", ["institutions", "MISSING"]) => api_error("Not found.", "Not found.", 404),
        ("GET", ["institutions", id]) => ok(200, institution_json(id, "GB")),
        ("GET", ["requisitions"]) => {
            let limit = query_number(request, "limit").unwrap_or(100);
            let offset = query_number(request, "offset").unwrap_or(0);
            ok(200, requisitions_page_json(state, limit, offset))
        }
        ("POST", ["requisitions"]) => {
            let institution_id = request.body["institution_id"].as_str().unwrap_or_default();
            let redirect = request.body["redirect"].as_str().unwrap_or_default();
            if institution_id == "UNKNOWN_BANK" {
                // Field errors are nested objects, not the flat error shape
                return (
                    400,
                    json!({
                        "institution_id": {"summary": "Unknown institution", "detail": "missing"},
                        "status_code": 400
                    })
                    .to_string(),
                );
            }
            ok(201, requisition_json("req-new", institution_id, redirect, &[]))
        }
        ("GET", ["requisitions", id]) => ok(
            200,
            requisition_json(id, "SANDBOXFINANCE_SFIN0000", "https://example.com/cb", &["acc-1", "acc-2"]),
        ),
        ("DELETE", ["requisitions", id]) => {
            if let Ok(mut deleted) = state.deleted_requisitions.lock() {
                deleted.push(id.to_string());
            }
            ok(200, json!({"summary": "Requisition deleted", "detail": format!("Requisition {} deleted", id)}))
        }
        ("GET", ["accounts", id]) => ok(200, account_json(id)),
        ("GET", ["accounts", id, "balances"]) => ok(200, balances_json(id)),
        ("GET", ["accounts", _, "transactions"]) => ok(200, transactions_json()),
        _ => api_error("Not found.", "Endpoint not found", 404),
    }
}

fn is_authorized(request: &MockRequest) -> bool {
    request
        .authorization
        .as_deref()
        .map(|v| v.starts_with("Bearer access-"))
        .unwrap_or(false)
}

fn query_value(request: &MockRequest, name: &str) -> Option<String> {
    request
        .query
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

fn query_number(request: &MockRequest, name: &str) -> Option<usize> {
    query_value(request, name).and_then(|v| v.parse().ok())
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn institution_json(id: &str, country: &str) -> JsonValue {
    json!({
        "id": id,
        "name": "Sandbox Finance",
        "bic": "SFIN0000",
        "transaction_total_days": "90",
        "max_access_valid_for_days": "90",
        "countries": [country.to_uppercase()],
        "logo": "https://cdn.example.com/sandbox.png"
    })
}

/// Older responses carry only the mandatory fields
fn sparse_institution_json() -> JsonValue {
    json!({
        "id": "LEGACY_BANK_LGCY0000",
        "name": "Legacy Bank",
        "bic": "LGCY0000",
        "transaction_total_days": null
    })
}

fn requisition_json(id: &str, institution_id: &str, redirect: &str, accounts: &[&str]) -> JsonValue {
    json!({
        "id": id,
        "created": "2024-03-01T09:15:00.123456Z",
        "redirect": redirect,
        "status": if accounts.is_empty() { "CR" } else { "LN" },
        "institution_id": institution_id,
        "agreement": "2dea1b84-97b0-4cb4-8805-302c227587c8",
        "reference": format!("ref-{}", id),
        "accounts": accounts,
        "user_language": "EN",
        "link": format!("https://ob.gocardless.com/psd2/start/{}", id),
        "ssn": null,
        "account_selection": false,
        "redirect_immediate": false
    })
}

fn requisitions_page_json(state: &MockState, limit: usize, offset: usize) -> JsonValue {
    let total = state.config.num_requisitions;
    let limit = limit.max(1);
    let results: Vec<JsonValue> = (offset..total.min(offset + limit))
        .map(|i| requisition_json(&format!("req-{}", i), "SANDBOXFINANCE_SFIN0000", "https://example.com/cb", &[]))
        .collect();
    let page_url = |o: usize| format!("{}/requisitions/?limit={}&offset={}", state.base_url, limit, o);
    let next = (offset + limit < total).then(|| page_url(offset + limit));
    let previous = (offset > 0).then(|| page_url(offset.saturating_sub(limit)));

    json!({
        "count": total,
        "next": next,
        "previous": previous,
        "results": results
    })
}

fn account_json(id: &str) -> JsonValue {
    json!({
        "id": id,
        "created": "2024-03-01T09:20:00.000000Z",
        "last_accessed": null,
        "iban": "GL2010440000010445",
        "bban": null,
        "status": "READY",
        "institution_id": "SANDBOXFINANCE_SFIN0000",
        "owner_name": "John Doe",
        "name": "Main Account"
    })
}

fn balances_json(account_id: &str) -> JsonValue {
    json!({
        "balances": [
            {
                "balanceAmount": {"amount": "1913.12", "currency": "EUR"},
                "balanceType": "expected",
                "referenceDate": "2024-03-01"
            },
            {
                "balanceAmount": {"amount": "1900.00", "currency": "EUR"},
                "balanceType": "interimAvailable",
                "referenceDate": null,
                "accountId": account_id
            }
        ]
    })
}

fn transactions_json() -> JsonValue {
    json!({
        "transactions": {
            "booked": [
                {
                    "transactionId": "2024030101927901-1",
                    "bookingDate": "2024-03-01",
                    "valueDate": "2024-03-01",
                    "transactionAmount": {"amount": "45.00", "currency": "EUR"},
                    "debtorName": "MON MOTHMA",
                    "debtorAccount": {"iban": "GL4018072659601049"},
                    "remittanceInformationUnstructured": "For the support of Restoration of the Republic foundation",
                    "additionalInformation": "PAYMENT"
                },
                {
                    "transactionId": "2024030101927905-1",
                    "bookingDate": "2024-03-01",
                    "valueDate": "2024-03-01",
                    "transactionAmount": {"amount": "-15.00", "currency": "EUR"},
                    "creditorName": "Freshto",
                    "remittanceInformationStructuredArray": ["PAYMENT Alderaan Coffe"]
                }
            ],
            "pending": [
                {
                    "valueDate": "2024-03-02",
                    "transactionAmount": {"amount": "-10.00", "currency": "EUR"},
                    "remittanceInformationUnstructured": "Reserved PAYMENT Emperor's Burgers"
                }
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::ReqwestTransport;
    use crate::ports::{HttpRequest, Method, Transport};

    #[test]
    fn test_mock_server_starts() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        assert!(server.port() > 0);
        assert!(server.base_url().ends_with("/api/v2"));
    }

    #[test]
    fn test_mock_server_requires_bearer_token() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let transport = ReqwestTransport::new().unwrap();
        let url = Url::parse(&format!("{}/accounts/acc-1/", server.base_url())).unwrap();

        let response = transport.execute(HttpRequest::new(Method::Get, url)).unwrap();
        assert_eq!(response.status, 401);
        assert!(response.body.contains("status_code"));
    }

    #[test]
    fn test_mock_server_reads_post_body() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let transport = ReqwestTransport::new().unwrap();
        let url = Url::parse(&format!("{}/token/new/", server.base_url())).unwrap();

        let request = HttpRequest::new(Method::Post, url)
            .header("Content-Type", "application/json")
            .body(r#"{"secret_id":"id","secret_key":"valid_key"}"#);
        let response = transport.execute(request).unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body.contains("access-0"));
    }
}
