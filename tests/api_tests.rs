mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

use common::{build_test_app, decimal, get, memory_app, post_empty, post_json, send};
use sharptracker::models::Table;
use sharptracker::store::MemoryStore;

fn nba_wager(stake: &str, odds: &str) -> serde_json::Value {
    json!({
        "date": "2024-03-01",
        "sport": "Basketball",
        "league": "NBA",
        "bookie": "Bet365",
        "type": "Moneyline",
        "event": "Lakers ML",
        "odds": odds,
        "stake": stake,
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _store) = memory_app();

    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _store) = memory_app();

    let resp = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_create_settle_and_flush() {
    let (app, store) = memory_app();

    let (status, json) = send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], 1);
    assert_eq!(json["data"]["status"], "Pending");
    assert_eq!(json["data"]["type"], "Moneyline");

    let (_, json) = send(&app, get("/api/wagers/pending")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app,
        post_json("/api/wagers/1/settle", json!({ "status": "Won" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "Won");
    assert_eq!(decimal(&json["data"]["pl"]), Decimal::from(10));

    let (_, json) = send(&app, get("/api/sync/status")).await;
    assert_eq!(json["data"]["dirty"], 2);
    assert_eq!(json["data"]["loaded"], true);

    // Nothing reaches the store until flush beyond the initial table creation.
    let before = store.snapshot("Bets").unwrap();
    assert!(before.rows.is_empty());

    let (status, json) = send(&app, post_empty("/api/sync/flush")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mutations"], 2);
    assert_eq!(json["data"]["status"]["dirty"], 0);

    let bets = store.snapshot("Bets").unwrap();
    assert_eq!(bets.rows.len(), 1);
    assert_eq!(bets.cell(0, "status"), "Won");

    let (_, json) = send(&app, get("/api/wagers/pending")).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cashout_settlement_records_payout() {
    let (app, _store) = memory_app();

    send(&app, post_json("/api/wagers", nba_wager("20", "3.00"))).await;
    let (status, json) = send(
        &app,
        post_json(
            "/api/wagers/1/settle",
            json!({ "status": "Cashed Out", "payout": "26.50" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "Cashed Out");
    assert_eq!(decimal(&json["data"]["pl"]), "6.50".parse::<Decimal>().unwrap());
    assert_eq!(
        decimal(&json["data"]["cashout_amount"]),
        "26.50".parse::<Decimal>().unwrap()
    );

    let (_, json) = send(&app, get("/api/analytics/cashouts")).await;
    let results = json["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_settle_twice_conflicts() {
    let (app, _store) = memory_app();

    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;
    let (status, _) = send(
        &app,
        post_json("/api/wagers/1/settle", json!({ "status": "Lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        post_json("/api/wagers/1/settle", json!({ "status": "Won" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_settle_rejects_pending_and_missing_payout() {
    let (app, _store) = memory_app();
    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;

    let (status, _) = send(
        &app,
        post_json("/api/wagers/1/settle", json!({ "status": "Pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/api/wagers/1/settle", json!({ "status": "Cashed Out" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&app, get("/api/sync/status")).await;
    assert_eq!(json["data"]["dirty"], 1);
}

#[tokio::test]
async fn test_settle_unknown_wager_is_not_found() {
    let (app, _store) = memory_app();

    let (status, _) = send(
        &app,
        post_json("/api/wagers/42/settle", json!({ "status": "Won" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wager_outside_limits_rejected() {
    let (app, _store) = memory_app();

    let (status, _) = send(&app, post_json("/api/wagers", nba_wager("10", "1.00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post_json("/api/wagers", nba_wager("50001", "2.00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_wager() {
    let (app, _store) = memory_app();
    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/wagers/1")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], 1);

    let (_, json) = send(&app, get("/api/wagers")).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_applies_filters() {
    let (app, _store) = memory_app();
    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;
    let mut epl = nba_wager("5", "1.80");
    epl["sport"] = json!("Soccer");
    epl["league"] = json!("EPL");
    epl["bookie"] = json!("Pinnacle");
    send(&app, post_json("/api/wagers", epl)).await;

    let (_, json) = send(&app, get("/api/wagers?league=EPL")).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["league"], "EPL");

    let (_, json) = send(&app, get("/api/wagers?bookie=Pinnacle,Bet365")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (_, json) = send(&app, get("/api/analytics/summary?sport=Basketball")).await;
    assert_eq!(json["data"]["total_wagers"], 1);
    assert_eq!(decimal(&json["data"]["exposure"]), Decimal::from(10));
}

#[tokio::test]
async fn test_bankroll_nets_cash_and_exposure() {
    let (app, _store) = memory_app();

    let (status, _) = send(
        &app,
        post_json(
            "/api/cash",
            json!({ "date": "2024-02-28", "bookie": "Bet365", "type": "Deposit", "amount": "100" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        &app,
        post_json(
            "/api/cash",
            json!({ "bookie": "Bet365", "type": "Withdrawal", "amount": "30" }),
        ),
    )
    .await;
    assert_eq!(decimal(&json["data"]["amount"]), Decimal::from(-30));

    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;

    let (_, json) = send(&app, get("/api/bankroll")).await;
    let rows = json["data"].as_array().unwrap();
    let bet365 = rows.iter().find(|r| r["bookie"] == "Bet365").unwrap();
    assert_eq!(decimal(&bet365["balance"]), Decimal::from(60));
    assert_eq!(decimal(&bet365["pending_exposure"]), Decimal::from(10));
}

#[tokio::test]
async fn test_negative_cash_amount_rejected() {
    let (app, _store) = memory_app();

    let (status, _) = send(
        &app,
        post_json("/api/cash", json!({ "bookie": "Bet365", "type": "Deposit", "amount": "-5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meta_round_trip() {
    let (app, _store) = memory_app();

    let req = Request::builder()
        .method("PUT")
        .uri("/api/meta")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "sports": ["Soccer", " "], "bookies": [" Pinnacle "] }).to_string(),
        ))
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["sports"], json!(["Soccer"]));
    assert_eq!(json["data"]["bookies"], json!(["Pinnacle"]));

    let (_, json) = send(&app, get("/api/meta")).await;
    assert_eq!(json["data"]["bookies"], json!(["Pinnacle"]));

    // Configured bookies show up in the bankroll even without activity
    let (_, json) = send(&app, get("/api/bankroll")).await;
    assert_eq!(json["data"][0]["bookie"], "Pinnacle");
}

#[tokio::test]
async fn test_timeline_resolutions() {
    let (app, _store) = memory_app();
    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;
    send(&app, post_json("/api/wagers/1/settle", json!({ "status": "Won" }))).await;
    let mut later = nba_wager("10", "2.00");
    later["date"] = json!("2024-03-20");
    send(&app, post_json("/api/wagers", later)).await;
    send(&app, post_json("/api/wagers/2/settle", json!({ "status": "Lost" }))).await;

    let (status, json) = send(&app, get("/api/analytics/timeline")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (_, json) = send(&app, get("/api/analytics/timeline?resolution=month")).await;
    let buckets = json["data"].as_array().unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["start"], "2024-03-01");
    assert_eq!(decimal(&buckets[0]["pl"]), Decimal::ZERO);

    let (status, _) = send(&app, get("/api/analytics/timeline?resolution=week")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&app, get("/api/analytics/equity-curve")).await;
    let points = json["data"].as_array().unwrap();
    assert_eq!(decimal(&points[0]["cumulative_pl"]), Decimal::from(10));
    assert_eq!(decimal(&points[1]["cumulative_pl"]), Decimal::ZERO);

    let (_, json) = send(&app, get("/api/analytics/by-sport")).await;
    assert_eq!(json["data"][0]["sport"], "Basketball");
}

#[tokio::test]
async fn test_discard_drops_unflushed_changes() {
    let (app, _store) = memory_app();
    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;

    let (status, json) = send(&app, post_empty("/api/sync/discard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mutations"], 1);
    assert_eq!(json["data"]["status"]["loaded"], false);

    let (_, json) = send(&app, get("/api/wagers")).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_required_when_token_set() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(store, Some("s3cret"));

    let (status, json) = send(&app, get("/api/wagers")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);

    let req = Request::builder()
        .uri("/api/wagers")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/wagers")
        .header("authorization", "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    // Health stays public
    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_identities_are_isolated() {
    let (app, store) = memory_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/wagers")
        .header("content-type", "application/json")
        .header("x-ledger-user", "alice")
        .body(Body::from(nba_wager("10", "2.00").to_string()))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .uri("/api/wagers")
        .header("x-ledger-user", "bob")
        .body(Body::empty())
        .unwrap();
    let (_, json) = send(&app, req).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let req = Request::builder()
        .method("POST")
        .uri("/api/sync/flush")
        .header("x-ledger-user", "alice")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    assert_eq!(store.snapshot("alice_Bets").unwrap().rows.len(), 1);
    assert!(store.snapshot("bob_Bets").unwrap().rows.is_empty());

    let (status, _) = send(&app, get("/api/sync/sessions")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_identity_rejected() {
    let (app, _store) = memory_app();

    let req = Request::builder()
        .uri("/api/wagers")
        .header("x-ledger-user", "../etc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreachable_store_is_service_unavailable() {
    let store = Arc::new(MemoryStore::new());
    store.set_fail_reads(true);
    let app = build_test_app(store, None);

    let (status, json) = send(&app, get("/api/wagers")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("refused"));
}

#[tokio::test]
async fn test_failed_flush_keeps_changes_staged() {
    let (app, store) = memory_app();
    send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;

    store.set_fail_writes(true);
    let (status, _) = send(&app, post_empty("/api/sync/flush")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, json) = send(&app, get("/api/sync/status")).await;
    assert_eq!(json["data"]["dirty"], 1);

    store.set_fail_writes(false);
    let (status, json) = send(&app, post_empty("/api/sync/flush")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mutations"], 1);
}

#[tokio::test]
async fn test_load_picks_up_external_edits() {
    let (app, store) = memory_app();
    send(&app, get("/api/wagers")).await;

    let mut bets = Table::with_columns(&[
        "id", "date", "sport", "league", "bookie", "type", "event", "odds", "stake", "status",
        "pl", "cashout_amount",
    ]);
    bets.rows.push(
        [
            "7", "2024-01-05", "Tennis", "ATP", "Pinnacle", "Match", "Sinner", "1.50", "40",
            "Pending", "0", "0",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );
    store.insert("Bets", bets);

    let (status, json) = send(&app, post_empty("/api/sync/load")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["dirty"], 0);

    let (_, json) = send(&app, get("/api/wagers")).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], 7);

    // New ids continue after the highest loaded one
    let (_, json) = send(&app, post_json("/api/wagers", nba_wager("10", "2.00"))).await;
    assert_eq!(json["data"]["id"], 8);
}
