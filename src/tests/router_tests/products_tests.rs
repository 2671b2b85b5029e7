use http::Method;
use serde_json::{json, Value};

use crate::errors::ServerError;
use crate::router::{handle, AppState};
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
fn service_banner_needs_no_auth() {
    let state = test_state();

    let req = http::Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(astra::Body::empty())
        .unwrap();

    let resp = send(&state, req);
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["status"], "active");
}

#[test]
fn api_routes_require_the_scope_header() {
    let state = test_state();

    let req = http::Request::builder()
        .method(Method::GET)
        .uri("/api/products")
        .body(astra::Body::empty())
        .unwrap();

    let err = handle(req, &state).unwrap_err();
    assert!(matches!(err, ServerError::Unauthorized));
}

#[test]
fn unknown_routes_are_404() {
    let state = test_state();
    let resp = send(&state, get("/api/nope", "u1"));
    assert_eq!(resp.status(), 404);
}

#[test]
fn create_returns_the_product_with_seed_history() {
    let state = test_state();
    let product = create_product(&state, "u1", "Mechanical Keyboard");

    assert_eq!(product["name"], "Mechanical Keyboard");
    assert_eq!(product["platform"], "Other");
    assert_eq!(product["currency"], "INR");
    assert_eq!(product["isActive"], true);
    assert!(product["currentPrice"].as_f64().unwrap() > 0.0);
    assert_eq!(product["priceHistory"].as_array().unwrap().len(), 1);
    // No extraction rules for this platform, so the seed sample is synthetic.
    assert_eq!(product["priceHistory"][0]["scraped"], false);
}

#[test]
fn create_rejects_unknown_platform_and_bad_url() {
    let state = test_state();

    let req = json_request(
        Method::POST,
        "/api/products",
        "u1",
        json!({ "name": "X", "url": "https://example.com/x", "platform": "Etsy" }),
    );
    assert_eq!(send(&state, req).status(), 400);

    let req = json_request(
        Method::POST,
        "/api/products",
        "u1",
        json!({ "name": "X", "url": "not a url", "platform": "Other" }),
    );
    assert_eq!(send(&state, req).status(), 400);
}

#[test]
fn collection_reads_are_cached_until_a_mutation() {
    let state = test_state();
    create_product(&state, "u1", "Widget");

    // First read populates the cache, second read hits it.
    let fresh = body_json(send(&state, get("/api/products", "u1")));
    assert!(fresh.get("cached").is_none());

    let cached = body_json(send(&state, get("/api/products", "u1")));
    assert_eq!(cached["cached"], true);
    assert_eq!(
        cached["products"].as_array().unwrap().len(),
        fresh["products"].as_array().unwrap().len()
    );

    // Any mutation invalidates the scope: the next read is fresh again.
    create_product(&state, "u1", "Second Widget");
    let after_create = body_json(send(&state, get("/api/products", "u1")));
    assert!(after_create.get("cached").is_none());
    assert_eq!(after_create["products"].as_array().unwrap().len(), 2);
}

#[test]
fn update_and_delete_invalidate_the_collection_cache() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    let warm = |state: &AppState| {
        send(state, get("/api/products", "u1"));
        body_json(send(state, get("/api/products", "u1")))
    };

    assert_eq!(warm(&state)["cached"], true);

    let req = json_request(
        Method::PUT,
        &format!("/api/products/{id}"),
        "u1",
        json!({ "name": "Renamed" }),
    );
    assert_eq!(send(&state, req).status(), 200);
    assert!(body_json(send(&state, get("/api/products", "u1")))
        .get("cached")
        .is_none());

    assert_eq!(warm(&state)["cached"], true);

    let req = json_request(
        Method::DELETE,
        &format!("/api/products/{id}"),
        "u1",
        json!({}),
    );
    assert_eq!(send(&state, req).status(), 200);
    assert!(body_json(send(&state, get("/api/products", "u1")))
        .get("cached")
        .is_none());
}

#[test]
fn detail_bumps_the_view_counter() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    let first = body_json(send(&state, get(&format!("/api/products/{id}"), "u1")));
    assert_eq!(first["product"]["metadata"]["views"], 1);

    let second = body_json(send(&state, get(&format!("/api/products/{id}"), "u1")));
    assert_eq!(second["product"]["metadata"]["views"], 2);
}

#[test]
fn detail_of_missing_product_is_404() {
    let state = test_state();
    let resp = send(&state, get("/api/products/999", "u1"));
    assert_eq!(resp.status(), 404);
}

#[test]
fn update_enforces_target_below_current() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    // Synthetic prices are far below this, so the target is never valid.
    let req = json_request(
        Method::PUT,
        &format!("/api/products/{id}"),
        "u1",
        json!({ "targetPrice": 10_000_000.0 }),
    );
    let resp = send(&state, req);
    assert_eq!(resp.status(), 400);

    // And far above this, so a tiny target always passes.
    let req = json_request(
        Method::PUT,
        &format!("/api/products/{id}"),
        "u1",
        json!({ "targetPrice": 1.0 }),
    );
    let resp = send(&state, req);
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["product"]["targetPrice"], 1.0);
}

#[test]
fn update_can_deactivate_a_product() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    let req = json_request(
        Method::PUT,
        &format!("/api/products/{id}"),
        "u1",
        json!({ "isActive": false }),
    );
    let resp = send(&state, req);
    assert_eq!(body_json(resp)["product"]["isActive"], false);
}

#[test]
fn delete_then_fetch_is_404() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    let req = json_request(
        Method::DELETE,
        &format!("/api/products/{id}"),
        "u1",
        json!({}),
    );
    assert_eq!(send(&state, req).status(), 200);
    assert_eq!(send(&state, get(&format!("/api/products/{id}"), "u1")).status(), 404);
}

#[test]
fn price_check_appends_history_and_reports_target() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    let req = json_request(
        Method::POST,
        &format!("/api/products/{id}/check"),
        "u1",
        json!({}),
    );
    let resp = send(&state, req);
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["product"]["metadata"]["priceChecks"], 1);
    assert_eq!(body["product"]["priceHistory"].as_array().unwrap().len(), 2);
    assert!(body["sample"]["price"].as_f64().unwrap() > 0.0);
    // No target is set, so the alert flag stays down.
    assert_eq!(body["targetReached"], false);
}

#[test]
fn history_endpoint_returns_the_ledger() {
    let state = test_state();
    let product = create_product(&state, "u1", "Widget");
    let id = product["id"].as_i64().unwrap();

    let resp = send(&state, get(&format!("/api/products/{id}/history?days=7"), "u1"));
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["productId"], id);
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
}

#[test]
fn users_cannot_see_each_others_products() {
    let state = test_state();
    let product = create_product(&state, "alice", "Widget");
    let id = product["id"].as_i64().unwrap();

    let listing = body_json(send(&state, get("/api/products", "bob")));
    assert!(listing["products"].as_array().unwrap().is_empty());

    assert_eq!(send(&state, get(&format!("/api/products/{id}"), "bob")).status(), 404);
}
