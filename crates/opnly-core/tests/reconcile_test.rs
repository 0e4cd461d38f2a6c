#![allow(clippy::unwrap_used)]
// Reconciliation of local bookmarks against a mock appliance.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opnly_api::FirewallClient;
use opnly_core::reconcile::reconcile;
use opnly_core::{CoreError, Database, RuleBookmark, RuleState};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FirewallClient) {
    let server = MockServer::start().await;
    let client = FirewallClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "key",
        SecretString::from("secret"),
    );
    (server, client)
}

/// A loopback URL with nothing listening on it.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn bookmarks(entries: &[(&str, &str)]) -> Vec<RuleBookmark> {
    let store = Database::open_in_memory().unwrap().bookmarks();
    for (name, uuid) in entries {
        store.upsert(name, uuid).unwrap();
    }
    store.list().unwrap()
}

async fn mount_rule(server: &MockServer, uuid: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/api/firewall/filter/getRule/{uuid}")))
        .respond_with(response)
        .mount(server)
        .await;
}

fn states(listing: &opnly_core::RuleListing) -> Vec<(&str, RuleState)> {
    listing
        .rows
        .iter()
        .map(|r| (r.bookmark.uuid.as_str(), r.state))
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_enabled_rule_reported() {
    let (server, client) = setup().await;
    mount_rule(
        &server,
        "uuid-1",
        ResponseTemplate::new(200).set_body_json(json!({ "rule": { "enabled": "1" } })),
    )
    .await;

    let listing = reconcile(&client, bookmarks(&[("WAN-block", "uuid-1")]), 8).await;

    assert!(listing.is_complete());
    assert_eq!(states(&listing), vec![("uuid-1", RuleState::Enabled)]);
    assert_eq!(listing.rows[0].bookmark.name, "WAN-block");
}

#[tokio::test]
async fn test_missing_rule_object_is_unknown_not_error() {
    let (server, client) = setup().await;
    mount_rule(
        &server,
        "gone",
        ResponseTemplate::new(200).set_body_json(json!({})),
    )
    .await;

    let listing = reconcile(&client, bookmarks(&[("Deleted", "gone")]), 8).await;

    assert!(listing.is_complete());
    assert_eq!(states(&listing), vec![("gone", RuleState::Unknown)]);
}

#[tokio::test]
async fn test_order_kept_with_out_of_order_responses() {
    let (server, client) = setup().await;
    // The first bookmark answers last.
    mount_rule(
        &server,
        "a",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "rule": { "enabled": "1" } }))
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    mount_rule(
        &server,
        "b",
        ResponseTemplate::new(200).set_body_json(json!({ "rule": { "enabled": 0 } })),
    )
    .await;
    mount_rule(
        &server,
        "c",
        ResponseTemplate::new(200).set_body_json(json!({ "rule": { "enabled": "yes" } })),
    )
    .await;

    let listing = reconcile(&client, bookmarks(&[("A", "a"), ("B", "b"), ("C", "c")]), 8).await;

    assert_eq!(
        states(&listing),
        vec![
            ("a", RuleState::Enabled),
            ("b", RuleState::Disabled),
            ("c", RuleState::Unknown),
        ]
    );
}

#[tokio::test]
async fn test_failures_isolated_and_reported_once() {
    let (server, client) = setup().await;
    mount_rule(
        &server,
        "ok",
        ResponseTemplate::new(200).set_body_json(json!({ "rule": { "enabled": "0" } })),
    )
    .await;
    mount_rule(&server, "bad-1", ResponseTemplate::new(500)).await;
    mount_rule(&server, "bad-2", ResponseTemplate::new(502)).await;

    let listing = reconcile(
        &client,
        bookmarks(&[("one", "bad-1"), ("two", "ok"), ("three", "bad-2")]),
        2,
    )
    .await;

    assert_eq!(
        states(&listing),
        vec![
            ("bad-1", RuleState::Unknown),
            ("ok", RuleState::Disabled),
            ("bad-2", RuleState::Unknown),
        ]
    );

    let failure = listing.failure.unwrap();
    assert_eq!(failure.failed, 2);
    assert!(matches!(
        failure.first,
        CoreError::RemoteError { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_unreachable_appliance_keeps_every_row() {
    let client = FirewallClient::with_client(
        reqwest::Client::new(),
        Url::parse(&closed_port_uri()).unwrap(),
        "key",
        SecretString::from("secret"),
    );

    let listing = reconcile(&client, bookmarks(&[("A", "a"), ("B", "b")]), 8).await;

    assert_eq!(listing.rows.len(), 2);
    assert!(listing.rows.iter().all(|r| r.state == RuleState::Unknown));
    let failure = listing.failure.unwrap();
    assert_eq!(failure.failed, 2);
    assert!(matches!(failure.first, CoreError::ConnectionFailure { .. }));
}

#[tokio::test]
async fn test_empty_store_yields_empty_listing() {
    let (_server, client) = setup().await;
    let listing = reconcile(&client, Vec::new(), 8).await;
    assert!(listing.rows.is_empty());
    assert!(listing.is_complete());
}
