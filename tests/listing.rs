use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use ledger_api::{
    app, query::compose, AppState, EntryDraft, EntryStore, ListParams, ListQuery, MemoryEntryStore, PageLimits,
    DEFAULT_BODY_LIMIT,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn seeded(entries: &[(&str, i64)]) -> (Router, Arc<MemoryEntryStore>) {
    let store = Arc::new(MemoryEntryStore::new());
    for (i, (name, value)) in entries.iter().enumerate() {
        store
            .insert(&EntryDraft {
                name: name.to_string(),
                description: None,
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).expect("date"),
                value: Decimal::from(*value),
            })
            .await
            .expect("insert");
    }
    let state = AppState::new(store.clone(), PageLimits::default());
    (app(state, DEFAULT_BODY_LIMIT), store)
}

fn values(listing: &Value) -> Vec<String> {
    listing["result"]
        .as_array()
        .expect("result array")
        .iter()
        .map(|e| e["value"].as_str().expect("value string").to_string())
        .collect()
}

fn names(listing: &Value) -> Vec<String> {
    listing["result"]
        .as_array()
        .expect("result array")
        .iter()
        .map(|e| e["name"].as_str().expect("name string").to_string())
        .collect()
}

#[tokio::test]
async fn orders_by_value_and_paginates() {
    let (router, _) = seeded(&[("a", 10), ("b", -5), ("c", 20)]).await;

    let (status, listing) = get_json(
        &router,
        "/api/v1/entries?order_by=value&direction=ASC&per_page=2&page=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(values(&listing), ["-5", "10"]);
    assert_eq!(listing["total"], json!(3));
    assert_eq!(listing["last_page"], json!(2));
    assert_eq!(listing["order_by"], json!("value"));
    assert_eq!(listing["direction"], json!("ASC"));
    assert_eq!(listing["page"], json!(1));
    assert_eq!(listing["per_page"], json!(2));
    assert_eq!(listing["search"], Value::Null);

    let (_, second) = get_json(
        &router,
        "/api/v1/entries?order_by=value&direction=asc&per_page=2&page=2",
    )
    .await;
    assert_eq!(values(&second), ["20"]);
}

#[tokio::test]
async fn defaults_list_by_id_ascending() {
    let (router, _) = seeded(&[("first", 1), ("second", 2), ("third", 3)]).await;
    let (status, listing) = get_json(&router, "/api/v1/entries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&listing), ["first", "second", "third"]);
    assert_eq!(listing["per_page"], json!(25));
    assert_eq!(listing["last_page"], json!(1));
}

#[tokio::test]
async fn descending_order_breaks_ties_by_id() {
    let (router, _) = seeded(&[("x", 5), ("y", 7), ("z", 5)]).await;
    let (_, listing) = get_json(&router, "/api/v1/entries?order_by=value&direction=DESC").await;
    assert_eq!(names(&listing), ["y", "x", "z"]);
}

#[tokio::test]
async fn search_filters_before_counting() {
    let (router, _) = seeded(&[
        ("Weekly groceries", -80),
        ("Rent", -1200),
        ("Grocery delivery tip", -5),
        ("Salary", 3200),
    ])
    .await;

    let (status, listing) = get_json(&router, "/api/v1/entries?search=groc&order_by=value").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&listing), ["Weekly groceries", "Grocery delivery tip"]);
    assert_eq!(listing["total"], json!(2));
    assert_eq!(listing["search"], json!("groc"));

    let (_, any_word) = get_json(&router, "/api/v1/entries?search=sal%20rent").await;
    assert_eq!(names(&any_word), ["Rent", "Salary"]);
}

#[tokio::test]
async fn unmatched_search_is_empty_not_an_error() {
    let (router, _) = seeded(&[("Rent", -1200)]).await;
    let (status, listing) = get_json(&router, "/api/v1/entries?search=zebra").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["result"], json!([]));
    assert_eq!(listing["total"], json!(0));
    assert_eq!(listing["last_page"], json!(0));
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let (router, _) = seeded(&[("a", 1), ("b", 2)]).await;
    let (status, listing) = get_json(&router, "/api/v1/entries?per_page=1&page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["result"], json!([]));
    assert_eq!(listing["total"], json!(2));
    assert_eq!(listing["last_page"], json!(2));
    assert_eq!(listing["page"], json!(9));
}

#[tokio::test]
async fn overflowing_page_is_past_the_end() {
    let (router, _) = seeded(&[("a", 1), ("b", 2), ("c", 3)]).await;
    let (status, listing) = get_json(&router, "/api/v1/entries?page=99999999999999999999&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["result"], json!([]));
    assert_eq!(listing["page"], json!(u32::MAX));
    assert_eq!(listing["total"], json!(3));
    assert_eq!(listing["last_page"], json!(2));
}

#[tokio::test]
async fn overflowing_per_page_is_rejected() {
    let (router, _) = seeded(&[("a", 1)]).await;
    let (status, body) = get_json(&router, "/api/v1/entries?per_page=99999999999999999999").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("query_error"));

    let (status, listing) = get_json(&router, "/api/v1/entries?per_page=-99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["per_page"], json!(0));
    assert_eq!(listing["result"], json!([]));
}

#[tokio::test]
async fn zero_per_page_is_defined() {
    let (router, _) = seeded(&[("a", 1), ("b", 2)]).await;
    let (status, listing) = get_json(&router, "/api/v1/entries?per_page=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["result"], json!([]));
    assert_eq!(listing["total"], json!(2));
    assert_eq!(listing["last_page"], json!(0));
}

#[tokio::test]
async fn bad_listing_parameters_are_rejected() {
    let (router, _) = seeded(&[("a", 1)]).await;

    let (status, body) = get_json(&router, "/api/v1/entries?order_by=password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("query_error"));

    let (status, _) = get_json(&router, "/api/v1/entries?direction=up").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&router, "/api/v1/entries?per_page=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("query_error"));
}

#[tokio::test]
async fn page_bounds_hold_for_every_page_size() {
    let entries: Vec<(String, i64)> = (0..23).map(|i| (format!("entry {i}"), i)).collect();
    let refs: Vec<(&str, i64)> = entries.iter().map(|(n, v)| (n.as_str(), *v)).collect();
    let (_, store) = seeded(&refs).await;

    for per_page in 1..=30u32 {
        let params = ListParams {
            per_page: Some(per_page.to_string()),
            ..ListParams::default()
        };
        let query = ListQuery::from_params(&params, &PageLimits::default()).expect("valid params");
        let listing = compose(store.as_ref(), &query).await.expect("listing");
        assert!(listing.result.len() <= per_page as usize);
        assert_eq!(listing.total, 23);
        assert_eq!(listing.last_page, 23u64.div_ceil(u64::from(per_page)));

        let last = ListQuery {
            page: listing.last_page as u32,
            ..query
        };
        let tail = compose(store.as_ref(), &last).await.expect("last page");
        let expected_tail = 23 - (listing.last_page as usize - 1) * per_page as usize;
        assert_eq!(tail.result.len(), expected_tail);
    }
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("get request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let parsed = serde_json::from_slice::<Value>(&bytes).expect("json body");
    (status, parsed)
}
