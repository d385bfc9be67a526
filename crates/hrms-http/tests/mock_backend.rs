//! Mock backend tests for the authenticated session.
//!
//! These tests use wiremock to simulate the HRMS backend and exercise token
//! attachment, the shared refresh, replay, and the logout paths without
//! network access.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use hrms_core::error::{AuthError, Error, TransportError};
use hrms_core::{
    AccessToken, ApiRequest, ApiUrl, CredentialPair, CredentialStore, Credentials, Navigator,
    RefreshToken, SessionState,
};
use hrms_http::{
    AuthenticatedHttpSession, CookieCredentialStore, HttpClient, MemoryCredentialStore,
    SessionConfig,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Navigator that counts redirects.
#[derive(Default)]
struct CountingNavigator {
    redirects: AtomicUsize,
    at_login: AtomicBool,
}

impl CountingNavigator {
    fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn is_at_login(&self) -> bool {
        self.at_login.load(Ordering::SeqCst)
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    session: AuthenticatedHttpSession,
    store: Arc<MemoryCredentialStore>,
    navigator: Arc<CountingNavigator>,
}

fn config_for(server: &MockServer) -> SessionConfig {
    SessionConfig::new(ApiUrl::new(server.uri()).unwrap())
}

fn harness(server: &MockServer, access: Option<&str>, refresh: Option<&str>) -> Harness {
    harness_with(config_for(server), access, refresh)
}

fn harness_with(config: SessionConfig, access: Option<&str>, refresh: Option<&str>) -> Harness {
    let store = Arc::new(MemoryCredentialStore::with_tokens(CredentialPair::new(
        access.map(AccessToken::new),
        refresh.map(RefreshToken::new),
    )));
    let navigator = Arc::new(CountingNavigator::default());
    let session = AuthenticatedHttpSession::new(config, store.clone(), navigator.clone()).unwrap();
    Harness {
        session,
        store,
        navigator,
    }
}

fn unauthenticated(request: &Request) -> bool {
    !request.headers.contains_key("authorization")
}

async fn mount_expired(server: &MockServer, route: &str, token: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "message": "jwt expired"
        })))
        .mount(server)
        .await;
}

async fn mount_ok(server: &MockServer, route: &str, token: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// Credential attachment
// ============================================================================

#[tokio::test]
async fn test_attaches_bearer_token() {
    let server = MockServer::start().await;
    mount_ok(&server, "/employees", "T1", json!([{"id": 1}])).await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let response = h.session.get("/employees").await.unwrap();

    assert_eq!(response.status(), 200);
    let employees: serde_json::Value = response.json().unwrap();
    assert_eq!(employees[0]["id"], 1);
}

#[tokio::test]
async fn test_sends_without_token_when_store_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(unauthenticated)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, None, None);
    let status: serde_json::Value = h.session.get_json("/health").await.unwrap();

    assert_eq!(status["status"], "ok");
}

#[tokio::test]
async fn test_caller_cannot_forge_authorization() {
    let server = MockServer::start().await;
    mount_ok(&server, "/employees", "T1", json!([])).await;

    let h = harness(&server, Some("T1"), None);
    let request = ApiRequest::get("/employees").header("Authorization", "Bearer forged");

    assert!(h.session.send(request).await.is_ok());
}

#[tokio::test]
async fn test_token_stays_on_the_api_origin() {
    let api = MockServer::start().await;
    let files = MockServer::start().await;
    mount_ok(&api, "/employees", "T1", json!([])).await;
    Mock::given(method("GET"))
        .and(path("/payslips/42.pdf"))
        .and(unauthenticated)
        .respond_with(ResponseTemplate::new(200).set_body_string("%PDF"))
        .expect(1)
        .mount(&files)
        .await;
    Mock::given(method("GET"))
        .and(path("/payslips/43.pdf"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "signature expired"})))
        .expect(1)
        .mount(&files)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(0)
        .mount(&api)
        .await;

    let h = harness(&api, Some("T1"), Some("R1"));

    // An absolute URL on the API's own origin is still authenticated.
    let own = h.session.get(&format!("{}/employees", api.uri())).await.unwrap();
    assert_eq!(own.status(), 200);

    let foreign = h
        .session
        .get(&format!("{}/payslips/42.pdf", files.uri()))
        .await
        .unwrap();
    assert_eq!(foreign.status(), 200);

    // Another origin's 401 says nothing about our session.
    let err = h
        .session
        .get(&format!("{}/payslips/43.pdf", files.uri()))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::Api(api_err) if api_err.status == 401));
    assert!(!err.is_session_terminal());
    assert_eq!(
        h.store.load().await.unwrap(),
        CredentialPair::new(Some(AccessToken::new("T1")), Some(RefreshToken::new("R1")))
    );
    assert_eq!(h.navigator.redirects(), 0);
}

// ============================================================================
// Refresh and replay
// ============================================================================

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let server = MockServer::start().await;
    mount_expired(&server, "/employees", "T1").await;
    mount_ok(&server, "/employees", "T2", json!([{"id": 7}])).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let response = h.session.get("/employees").await.unwrap();

    assert_eq!(response.status(), 200);
    let pair = h.store.load().await.unwrap();
    assert_eq!(pair.access, Some(AccessToken::new("T2")));
    // No new refresh token in the response: the old one is kept.
    assert_eq!(pair.refresh, Some(RefreshToken::new("R1")));
    assert_eq!(h.navigator.redirects(), 0);
    assert!(!h.session.is_refreshing());
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;
    mount_expired(&server, "/payroll", "T1").await;
    mount_ok(&server, "/payroll", "T2", json!({"items": []})).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T2",
            "refreshToken": "R2"
        })))
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    h.session.get("/payroll").await.unwrap();

    assert_eq!(
        h.store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("R2"))
    );
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let server = MockServer::start().await;
    for route in ["/employees", "/leaves", "/overtime"] {
        mount_expired(&server, route, "T1").await;
    }
    mount_ok(&server, "/employees", "T2", json!([{"id": 1}])).await;
    mount_ok(&server, "/leaves", "T2", json!([{"id": 2}])).await;
    // Fails on its own merits after the replay.
    Mock::given(method("GET"))
        .and(path("/overtime"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "FORBIDDEN",
            "message": "Managers only"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "T2"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let (employees, leaves, overtime) = tokio::join!(
        h.session.get("/employees"),
        h.session.get("/leaves"),
        h.session.get("/overtime"),
    );

    assert_eq!(employees.unwrap().status(), 200);
    assert_eq!(leaves.unwrap().status(), 200);
    match overtime {
        Err(Error::Api(err)) => {
            assert_eq!(err.status, 403);
            assert_eq!(err.code.as_deref(), Some("FORBIDDEN"));
        }
        other => panic!("expected 403, got {:?}", other),
    }
    assert_eq!(
        h.store.access_token().await.unwrap(),
        Some(AccessToken::new("T2"))
    );
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_replayed_request_rejected_again_is_terminal() {
    let server = MockServer::start().await;
    mount_expired(&server, "/attendance", "T1").await;
    mount_expired(&server, "/attendance", "T2").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let err = h.session.get("/attendance").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::RetryRejected { .. })));
    assert!(err.is_session_terminal());
    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 1);
}

/// A GET rejected with 401 only after `delay`, as if it was on the wire while
/// another request refreshed the token.
async fn mount_slow_expired(server: &MockServer, route: &str, token: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "jwt expired"}))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_late_rejection_replays_with_token_refreshed_meanwhile() {
    let server = MockServer::start().await;
    mount_slow_expired(&server, "/reports/headcount", "T1", Duration::from_millis(500)).await;
    mount_ok(&server, "/reports/headcount", "T2", json!({"total": 120})).await;
    mount_expired(&server, "/employees", "T1").await;
    mount_ok(&server, "/employees", "T2", json!([{"id": 1}])).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let (report, employees) = tokio::join!(
        h.session.get("/reports/headcount"),
        h.session.get("/employees"),
    );

    assert_eq!(employees.unwrap().status(), 200);
    let report: serde_json::Value = report.unwrap().json().unwrap();
    assert_eq!(report["total"], 120);
    assert_eq!(
        h.store.access_token().await.unwrap(),
        Some(AccessToken::new("T2"))
    );
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_late_rejection_replay_rejected_again_is_terminal() {
    let server = MockServer::start().await;
    mount_slow_expired(&server, "/reports/headcount", "T1", Duration::from_millis(500)).await;
    mount_expired(&server, "/reports/headcount", "T2").await;
    mount_expired(&server, "/employees", "T1").await;
    mount_ok(&server, "/employees", "T2", json!([{"id": 1}])).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let (report, employees) = tokio::join!(
        h.session.get("/reports/headcount"),
        h.session.get("/employees"),
    );

    assert_eq!(employees.unwrap().status(), 200);
    assert!(matches!(
        report,
        Err(Error::Auth(AuthError::RetryRejected { .. }))
    ));
    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 1);
}

// ============================================================================
// Terminal paths
// ============================================================================

#[tokio::test]
async fn test_refresh_failure_rejects_all_waiters_and_redirects_once() {
    let server = MockServer::start().await;
    for route in ["/employees", "/leaves", "/overtime"] {
        mount_expired(&server, route, "T1").await;
    }
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "refresh token expired"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let results = tokio::join!(
        h.session.get("/employees"),
        h.session.get("/leaves"),
        h.session.get("/overtime"),
    );

    for result in [results.0, results.1, results.2] {
        match result {
            Err(Error::Auth(AuthError::RefreshFailed { original, reason })) => {
                assert_eq!(original.map(|e| e.status), Some(401));
                assert!(reason.contains("401"), "reason: {}", reason);
            }
            other => panic!("expected refresh failure, got {:?}", other),
        }
    }
    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 1);
}

#[tokio::test]
async fn test_missing_token_is_terminal_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(unauthenticated)
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, None, None);
    let err = h.session.get("/profile").await.unwrap_err();

    match &err {
        Error::Auth(AuthError::Unauthenticated { original }) => {
            assert_eq!(original.message.as_deref(), Some("Unauthorized"));
        }
        other => panic!("expected unauthenticated, got {:?}", other),
    }
    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 1);
}

#[tokio::test]
async fn test_refresh_token_alone_is_restored_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/employees"))
        .and(unauthenticated)
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;
    mount_ok(&server, "/employees", "T2", json!([{"id": 3}])).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, None, Some("R1"));
    let employees: serde_json::Value = h.session.get_json("/employees").await.unwrap();

    assert_eq!(employees[0]["id"], 3);
    assert_eq!(
        h.store.load().await.unwrap(),
        CredentialPair::new(Some(AccessToken::new("T2")), Some(RefreshToken::new("R1")))
    );
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_failed_restore_before_sending_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "refresh token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, None, Some("R-stale"));
    let err = h.session.get("/employees").await.unwrap_err();

    match err {
        Error::Auth(AuthError::RefreshFailed { original, reason }) => {
            assert!(original.is_none());
            assert!(reason.contains("401"), "reason: {}", reason);
        }
        other => panic!("expected refresh failure, got {:?}", other),
    }
    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 1);
}

#[tokio::test]
async fn test_rejection_on_login_screen_is_not_recovered() {
    let server = MockServer::start().await;
    mount_expired(&server, "/employees", "T1").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    h.navigator.at_login.store(true, Ordering::SeqCst);

    let err = h.session.get("/employees").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::Rejected { .. })));
    assert_eq!(h.navigator.redirects(), 0);
    assert_eq!(
        h.store.access_token().await.unwrap(),
        Some(AccessToken::new("T1"))
    );
}

// ============================================================================
// Pass-through
// ============================================================================

#[tokio::test]
async fn test_backend_error_payload_passes_through() {
    let server = MockServer::start().await;
    let payload = json!({
        "code": "LEAVE_BALANCE_EXCEEDED",
        "message": "Requested 5 days, 2 remaining",
        "details": {"remaining": 2}
    });
    Mock::given(method("POST"))
        .and(path("/leaves"))
        .respond_with(ResponseTemplate::new(422).set_body_json(payload.clone()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let err = h
        .session
        .post("/leaves", &json!({"days": 5}))
        .await
        .unwrap_err();

    let api = err.api_error().expect("API error");
    assert_eq!(api.status, 422);
    assert_eq!(api.payload.as_ref(), Some(&payload));
    assert_eq!(
        h.store.load().await.unwrap(),
        CredentialPair::new(Some(AccessToken::new("T1")), Some(RefreshToken::new("R1")))
    );
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_network_timeout_is_surfaced_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout(Duration::from_millis(200));
    let h = harness_with(config, Some("T1"), Some("R1"));
    let err = h.session.get("/departments").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Transport(TransportError::Timeout { .. })
    ));
    assert_eq!(
        h.store.access_token().await.unwrap(),
        Some(AccessToken::new("T1"))
    );
    assert_eq!(h.navigator.redirects(), 0);
}

// ============================================================================
// Login, logout, restore
// ============================================================================

#[tokio::test]
async fn test_login_stores_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "hr.admin@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T1",
            "refreshToken": "R1"
        })))
        .mount(&server)
        .await;

    let h = harness(&server, None, None);
    h.session
        .login(&Credentials::new("hr.admin@example.com", "secret123"))
        .await
        .unwrap();

    assert_eq!(h.session.state().await.unwrap(), SessionState::Authenticated);
    assert_eq!(
        h.store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("R1"))
    );
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    let h = harness(&server, None, None);
    let err = h
        .session
        .login(&Credentials::new("hr.admin@example.com", "wrong"))
        .await
        .unwrap_err();

    match err {
        Error::Auth(AuthError::InvalidCredentials(reason)) => {
            assert_eq!(reason, "Invalid email or password");
        }
        other => panic!("expected invalid credentials, got {:?}", other),
    }
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;
    mount_ok(&server, "/employees", "T1", json!([])).await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let err = h
        .session
        .login(&Credentials::new("someone.else@example.com", "typo"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials(_))));
    assert_eq!(
        h.store.load().await.unwrap(),
        CredentialPair::new(Some(AccessToken::new("T1")), Some(RefreshToken::new("R1")))
    );
    assert_eq!(h.session.get("/employees").await.unwrap().status(), 200);
}

#[tokio::test]
async fn test_login_replaces_previous_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T5"})))
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    h.session
        .login(&Credentials::new("hr.admin@example.com", "secret123"))
        .await
        .unwrap();

    assert_eq!(
        h.store.load().await.unwrap(),
        CredentialPair::new(Some(AccessToken::new("T5")), None)
    );
}

#[tokio::test]
async fn test_logout_clears_store_even_if_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    h.session.logout().await.unwrap();

    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_restore_from_refresh_token_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T9"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, None, Some("R1"));
    assert_eq!(h.session.state().await.unwrap(), SessionState::Recoverable);

    let state = h.session.restore().await.unwrap();

    assert_eq!(state, SessionState::Authenticated);
    assert_eq!(
        h.store.access_token().await.unwrap(),
        Some(AccessToken::new("T9"))
    );
}

#[tokio::test]
async fn test_restore_failure_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = harness(&server, None, Some("R-stale"));
    let state = h.session.restore().await.unwrap();

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(h.store.load().await.unwrap().is_cleared());
    assert_eq!(h.navigator.redirects(), 1);
}

#[tokio::test]
async fn test_explicit_refresh_failure_reports_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "INVALID_REFRESH_TOKEN"
        })))
        .mount(&server)
        .await;

    let h = harness(&server, Some("T1"), Some("R1"));
    let err = h.session.refresh().await.unwrap_err();

    match err {
        Error::Auth(AuthError::RefreshFailed { original, reason }) => {
            assert!(original.is_none());
            assert!(reason.contains("INVALID_REFRESH_TOKEN"), "reason: {}", reason);
        }
        other => panic!("expected refresh failure, got {:?}", other),
    }
}

// ============================================================================
// Cookie-held refresh token
// ============================================================================

#[tokio::test]
async fn test_refresh_cookie_set_at_login_is_sent_on_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=rt-cookie; Path=/; HttpOnly")
                .set_body_json(json!({"accessToken": "T1"})),
        )
        .mount(&server)
        .await;
    mount_expired(&server, "/employees", "T1").await;
    mount_ok(&server, "/employees", "T2", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("cookie", "refresh_token=rt-cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let store = Arc::new(CookieCredentialStore::new(&config).unwrap());
    let client = HttpClient::with_cookie_jar(&config, store.jar()).unwrap();
    let navigator = Arc::new(CountingNavigator::default());
    let session =
        AuthenticatedHttpSession::with_client(config, client, store.clone(), navigator.clone());

    session
        .login(&Credentials::new("hr.admin@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(
        store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("rt-cookie"))
    );

    let response = session.get("/employees").await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(navigator.redirects(), 0);
}
