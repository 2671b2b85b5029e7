use http::Method;
use serde_json::{json, Value};

use crate::router::AppState;
use crate::tests::utils::{body_json, get, json_request, send, test_state};

fn create_product(state: &AppState, user: &str, name: &str) -> Value {
    let req = json_request(
        Method::POST,
        "/api/products",
        user,
        json!({
            "name": name,
            "url": "https://example.com/item/1",
            "platform": "Other",
        }),
    );

    let resp = send(state, req);
    assert_eq!(resp.status(), 201);
    body_json(resp)["product"].clone()
}

#[test]
fn overview_of_an_empty_account_is_all_zeros() {
    let state = test_state();

    let body = body_json(send(&state, get("/api/analytics/overview", "u1")));
    assert_eq!(body["totalProducts"], 0);
    assert_eq!(body["trackedProducts"], 0);
    assert_eq!(body["avgPrice"], 0.0);
    assert_eq!(body["priceAlerts"], 0);
}

#[test]
fn overview_counts_products_and_alerts() {
    let state = test_state();
    create_product(&state, "u1", "First");
    let second = create_product(&state, "u1", "Second");
    let id = second["id"].as_i64().unwrap();

    // Deactivate one product; it still counts toward the total.
    let req = json_request(
        Method::PUT,
        &format!("/api/products/{id}"),
        "u1",
        json!({ "isActive": false }),
    );
    assert_eq!(send(&state, req).status(), 200);

    let body = body_json(send(&state, get("/api/analytics/overview", "u1")));
    assert_eq!(body["totalProducts"], 2);
    assert_eq!(body["trackedProducts"], 1);
    assert!(body["avgPrice"].as_f64().unwrap() > 0.0);
    // Targets are validated to sit below the current price, so a fresh
    // account never starts with an alert.
    assert_eq!(body["priceAlerts"], 0);
}

#[test]
fn trends_cover_todays_seed_samples() {
    let state = test_state();
    create_product(&state, "u1", "First");
    create_product(&state, "u1", "Second");

    let body = body_json(send(&state, get("/api/analytics/trends", "u1")));
    let trends = body["trends"].as_array().unwrap();

    // Both seed samples land on today: exactly one bucket.
    assert_eq!(trends.len(), 1);

    let point = &trends[0];
    let min = point["minPrice"].as_f64().unwrap();
    let avg = point["avgPrice"].as_f64().unwrap();
    let max = point["maxPrice"].as_f64().unwrap();
    assert!(min <= avg && avg <= max);
}

#[test]
fn trends_of_an_empty_account_are_empty() {
    let state = test_state();
    let body = body_json(send(&state, get("/api/analytics/trends?days=90", "u1")));
    assert!(body["trends"].as_array().unwrap().is_empty());
}

#[test]
fn performance_ranks_by_views() {
    let state = test_state();
    let quiet = create_product(&state, "u1", "Quiet Product");
    let popular = create_product(&state, "u1", "Popular Product With A Long Name");
    let popular_id = popular["id"].as_i64().unwrap();
    let quiet_id = quiet["id"].as_i64().unwrap();

    // Three views for one product, one for the other.
    for _ in 0..3 {
        send(&state, get(&format!("/api/products/{popular_id}"), "u1"));
    }
    send(&state, get(&format!("/api/products/{quiet_id}"), "u1"));

    let body = body_json(send(&state, get("/api/analytics/performance", "u1")));
    let entries = body["performance"].as_array().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["views"], 3);
    assert_eq!(entries[1]["views"], 1);
    // Names are clipped to 20 characters for the ranking view.
    assert_eq!(entries[0]["product"].as_str().unwrap().chars().count(), 20);
}

#[test]
fn performance_respects_the_limit_parameter() {
    let state = test_state();
    for i in 0..4 {
        create_product(&state, "u1", &format!("Product {i}"));
    }

    let body = body_json(send(&state, get("/api/analytics/performance?limit=2", "u1")));
    assert_eq!(body["performance"].as_array().unwrap().len(), 2);
}

#[test]
fn analytics_are_scoped_by_user() {
    let state = test_state();
    create_product(&state, "alice", "Widget");

    let body = body_json(send(&state, get("/api/analytics/overview", "bob")));
    assert_eq!(body["totalProducts"], 0);
}
