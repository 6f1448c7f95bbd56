#![allow(clippy::unwrap_used)]
// Integration tests for `Console` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proxmon_core::model::PROTECTED_GROUP_NAME;
use proxmon_core::{
    CollectingNotifier, Console, ConsoleConfig, CoreError, FormMode, Group, GroupForm, GroupId,
    Level, MetricValue, ProxyFilter, ProxyForm, ProxyId, RefreshController, ResourceRefresh,
    TestMode,
};

// ── Helpers ──────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Console, Arc<CollectingNotifier>) {
    let server = MockServer::start().await;
    let mut config = ConsoleConfig::new(Url::parse(&server.uri()).unwrap());
    config.timeout = Duration::from_secs(5);
    let notifier = Arc::new(CollectingNotifier::default());
    let console = Console::with_notifier(config, notifier.clone()).unwrap();
    (server, console, notifier)
}

fn proxy_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "host": "192.168.1.10",
        "ssh_port": 22,
        "snmp_port": 161,
        "snmp_version": "v2c",
        "snmp_community": "public",
        "username": "root",
        "group_id": 1,
        "group_name": "Production-Proxy",
        "is_main": true,
        "is_active": true
    })
}

fn valid_form() -> ProxyForm {
    ProxyForm {
        name: "PROD-MAIN-01".into(),
        host: "192.168.1.10".into(),
        password: Some(SecretString::from("Secure1!".to_string())),
        group_id: Some(GroupId(1)),
        is_main: true,
        ..ProxyForm::default()
    }
}

fn group(id: i64, name: &str, proxy_count: u32) -> Group {
    Group {
        id: GroupId(id),
        name: name.into(),
        description: None,
        proxy_count,
        main_server: None,
        created_at: None,
        updated_at: None,
    }
}

// ── Validation never reaches the network ─────────────────────────────

#[tokio::test]
async fn test_incomplete_proxy_forms_are_rejected_locally() {
    let (server, console, notifier) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/proxies"))
        .respond_with(ResponseTemplate::new(201).set_body_json(proxy_json(1, "x")))
        .expect(0)
        .mount(&server)
        .await;

    let form = ProxyForm {
        name: "   ".into(),
        ..valid_form()
    };
    let err = console.save_proxy(&form).await.unwrap_err();
    assert!(err.is_validation());

    let form = ProxyForm {
        host: String::new(),
        ..valid_form()
    };
    let err = console.save_proxy(&form).await.unwrap_err();
    match err {
        CoreError::ValidationFailed { field, reason } => {
            assert_eq!((field.as_str(), reason.as_str()), ("host", "is required"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let form = ProxyForm {
        host: "not-an-ip".into(),
        ..valid_form()
    };
    let err = console.save_proxy(&form).await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { ref field, .. } if field == "host"));

    assert_eq!(notifier.count(Level::Warning), 3);
}

#[tokio::test]
async fn test_protected_group_delete_is_refused_locally() {
    let (server, console, notifier) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/groups/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = console
        .delete_group(&group(1, PROTECTED_GROUP_NAME, 0))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(notifier.count(Level::Warning), 1);
}

// ── CRUD ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_proxy_sends_payload() {
    let (server, console, notifier) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/proxies"))
        .and(body_partial_json(json!({
            "name": "PROD-MAIN-01",
            "host": "192.168.1.10",
            "password": "Secure1!",
            "group_id": 1,
            "snmp_version": "v2c"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(proxy_json(5, "PROD-MAIN-01")))
        .expect(1)
        .mount(&server)
        .await;

    let proxy = console.save_proxy(&valid_form()).await.unwrap();
    assert_eq!(proxy.id, ProxyId(5));
    assert_eq!(notifier.count(Level::Success), 1);
}

#[tokio::test]
async fn test_edit_without_password_uses_put() {
    let (server, console, _) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/proxies/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proxy_json(5, "renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let form = ProxyForm {
        mode: FormMode::Edit(ProxyId(5)),
        name: "renamed".into(),
        password: None,
        ..valid_form()
    };
    let proxy = console.save_proxy(&form).await.unwrap();
    assert_eq!(proxy.name, "renamed");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_proxy_maps_to_conflict_message() {
    let (server, console, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/proxies"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "error": "Main proxy already exists in this group" })),
        )
        .mount(&server)
        .await;

    let err = console.save_proxy(&valid_form()).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));
    assert_eq!(
        err.to_string(),
        "duplicate name/IP: Main proxy already exists in this group"
    );
}

#[tokio::test]
async fn test_duplicate_group_maps_to_group_message() {
    let (server, console, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = console
        .save_group(&GroupForm::create("Staging"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "group name already exists");
}

#[tokio::test]
async fn test_get_missing_proxy_is_not_found() {
    let (server, console, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/proxies/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&server)
        .await;

    let err = console.get_proxy(ProxyId(99)).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
    assert_eq!(err.to_string(), "proxy not found: 99");
}

#[tokio::test]
async fn test_proxy_status_passes_collector_report_through() {
    let (server, console, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/monitoring/status/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "proxy_id": 10,
            "proxy_name": "PROD-MAIN-01",
            "host": "192.168.1.10",
            "group_name": "",
            "is_main": true,
            "status": { "ssh": "ok", "snmp": { "cpu": 41.5 } }
        })))
        .mount(&server)
        .await;

    let status = console.proxy_status(ProxyId(10)).await.unwrap();
    assert_eq!(status.proxy_id, ProxyId(10));
    assert_eq!(status.group_name, None);
    assert_eq!(status.status["snmp"]["cpu"], json!(41.5));
}

#[tokio::test]
async fn test_proxy_status_errors() {
    let (server, console, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/monitoring/status/11"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "no SSH username" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/monitoring/status/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = console.proxy_status(ProxyId(11)).await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }), "got {err:?}");
    assert_eq!(
        err.to_string(),
        "Operation rejected by backend: SSH credentials not configured: no SSH username"
    );

    let err = console.proxy_status(ProxyId(99)).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_find_group_by_name_or_id() {
    let (server, console, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": PROTECTED_GROUP_NAME, "proxy_count": 0 },
            { "id": 2, "name": "Production-Proxy", "proxy_count": 3 }
        ])))
        .mount(&server)
        .await;

    assert_eq!(console.find_group("Production-Proxy").await.unwrap().id, GroupId(2));
    assert_eq!(console.find_group("1").await.unwrap().name, PROTECTED_GROUP_NAME);
    assert!(matches!(
        console.find_group("missing").await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_list_proxies_filters_main_only() {
    let (server, console, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/proxies"))
        .and(query_param("is_main", "true"))
        .and(query_param("group_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([proxy_json(1, "main")])))
        .expect(1)
        .mount(&server)
        .await;

    let filter = ProxyFilter {
        group_id: Some(GroupId(1)),
        main_only: true,
    };
    let proxies = console.list_proxies(&filter).await.unwrap();
    assert_eq!(proxies.len(), 1);
    assert!(proxies[0].is_main);
}

#[tokio::test]
async fn test_deep_test_uses_monitoring_endpoint() {
    let (server, console, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/monitoring/test/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "SNMP timeout"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = console.test_proxy(ProxyId(3), TestMode::Deep).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "SNMP timeout");
}

// ── Resource refresh ─────────────────────────────────────────────────

fn resources_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": [{
            "proxy_id": 1,
            "proxy_name": "PROD-MAIN-01",
            "host": "192.168.1.10",
            "group_name": "Production-Proxy",
            "is_main": true,
            "resource_data": {
                "date": "2024-06-15", "time": "10:30:00",
                "cpu": 45.5, "memory": "error", "uc": 12
            }
        }]
    })
}

#[tokio::test]
async fn test_refresh_resources_fills_board() {
    let (server, console, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/monitoring/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(resources_body()))
        .mount(&server)
        .await;

    assert_eq!(console.refresh_resources(None).await.unwrap(), 1);
    let sample = console.board().get(ProxyId(1)).unwrap();
    assert_eq!(sample.metrics.cpu, MetricValue::Value(45.5));
    assert_eq!(sample.metrics.memory, MetricValue::Error);
    assert_eq!(console.board().filter_by_group("Production-Proxy").len(), 1);
}

#[tokio::test]
async fn test_refresh_failure_keeps_controller_active() {
    let (server, console, notifier) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/monitoring/resources"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .mount(&server)
        .await;

    let task = Arc::new(ResourceRefresh::new(console.clone(), None));
    let controller = RefreshController::new(task, 60, console.notifier()).unwrap();
    assert!(controller.start());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while notifier.count(Level::Error) == 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(controller.is_active());
    let errors: Vec<_> = notifier
        .snapshot()
        .into_iter()
        .filter(|n| n.level == Level::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Internal server error: db down");
    assert!(console.board().is_empty());

    controller.shutdown();
    assert!(!controller.is_active());
}
