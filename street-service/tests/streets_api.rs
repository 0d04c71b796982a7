mod common;

use axum::http::{header, Method, StatusCode};
use common::{street_id, TestApp, ALICE, ALICE_TOKEN, BASE_URI, BOB_TOKEN};
use serde_json::json;
use std::collections::HashSet;

#[tokio::test]
async fn anonymous_streets_take_ids_from_global_sequence() {
    let app = TestApp::spawn().await;

    let response = app
        .send(
            Method::POST,
            "/v1/streets",
            None,
            Some(r#"{"name":"First","data":{"street":{"segments":[]}}}"#),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let first = response.json().clone();
    assert_eq!(first["namespacedId"], 1);
    assert_eq!(first["name"], "First");
    assert!(first["creatorId"].is_null());
    assert_eq!(
        response.header(header::LOCATION),
        Some(format!("{}/v1/streets/{}", BASE_URI, street_id(&first)).as_str())
    );

    let second = app.create_street(None, json!({ "name": "Second" })).await;
    assert_eq!(second["namespacedId"], 2);
}

#[tokio::test]
async fn empty_body_creates_unnamed_street() {
    let app = TestApp::spawn().await;

    let response = app.send(Method::POST, "/v1/streets", None, None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.json()["name"].is_null());
}

#[tokio::test]
async fn concurrent_anonymous_creations_get_distinct_ids() {
    let app = TestApp::spawn().await;

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                app.create_street(None, json!({ "name": format!("street {}", i) }))
                    .await["namespacedId"]
                    .as_i64()
                    .unwrap()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()), "duplicate namespaced id");
    }
    assert_eq!(ids, (1..=20).collect::<HashSet<i64>>());
}

#[tokio::test]
async fn signed_in_streets_use_private_counters() {
    let app = TestApp::spawn().await;

    let a1 = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    let a2 = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    let b1 = app.create_street(Some(BOB_TOKEN), json!({})).await;
    let anon = app.create_street(None, json!({})).await;

    assert_eq!(a1["namespacedId"], 1);
    assert_eq!(a2["namespacedId"], 2);
    assert_eq!(a1["creatorId"], ALICE);
    assert_eq!(b1["namespacedId"], 1);
    assert_eq!(anon["namespacedId"], 1);
}

#[tokio::test]
async fn unknown_login_token_cannot_create() {
    let app = TestApp::spawn().await;

    let response = app
        .send(Method::POST, "/v1/streets", Some("stale-token"), Some("{}"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_or_invalid_body_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .send(Method::POST, "/v1/streets", None, Some("{not json"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let long_name = "x".repeat(300);
    let response = app
        .send(
            Method::POST,
            "/v1/streets",
            None,
            Some(&json!({ "name": long_name }).to_string()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forking_checks_the_original_street() {
    let app = TestApp::spawn().await;

    let response = app
        .send(
            Method::POST,
            "/v1/streets",
            None,
            Some(r#"{"originalStreetId":"does-not-exist"}"#),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let original = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    let fork = app
        .create_street(None, json!({ "originalStreetId": street_id(&original) }))
        .await;
    assert_eq!(fork["originalStreetId"], original["id"]);

    assert_eq!(
        app.delete_street(&street_id(&original), ALICE_TOKEN).await,
        StatusCode::NO_CONTENT
    );
    let response = app
        .send(
            Method::POST,
            "/v1/streets",
            None,
            Some(&json!({ "originalStreetId": street_id(&original) }).to_string()),
        )
        .await;
    assert_eq!(response.status, StatusCode::GONE);
}

#[tokio::test]
async fn get_returns_street_with_cache_headers() {
    let app = TestApp::spawn().await;
    let street = app.create_street(None, json!({ "name": "Market St" })).await;
    let uri = format!("/v1/streets/{}", street_id(&street));

    let response = app.get(&uri).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["name"], "Market St");
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
    assert!(response
        .header(header::LAST_MODIFIED)
        .is_some_and(|v| v.ends_with("GMT")));
    assert_eq!(
        response.header(header::LOCATION),
        Some(format!("{}{}", BASE_URI, uri).as_str())
    );

    let head = app.send(Method::HEAD, &uri, None, None).await;
    assert_eq!(head.status, StatusCode::NO_CONTENT);
    assert!(head.header(header::LAST_MODIFIED).is_some());
    assert!(head.body.is_none());
}

#[tokio::test]
async fn get_distinguishes_missing_from_deleted() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/v1/streets/nope").await.status, StatusCode::NOT_FOUND);

    let street = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    app.delete_street(&street_id(&street), ALICE_TOKEN).await;

    let uri = format!("/v1/streets/{}", street_id(&street));
    assert_eq!(app.get(&uri).await.status, StatusCode::GONE);
    assert_eq!(
        app.send(Method::HEAD, &uri, None, None).await.status,
        StatusCode::GONE
    );
}

#[tokio::test]
async fn anonymous_street_is_updatable_by_anyone() {
    let app = TestApp::spawn().await;
    let street = app
        .create_street(None, json!({ "name": "Old", "data": { "v": 1 } }))
        .await;
    let uri = format!("/v1/streets/{}", street_id(&street));

    let response = app
        .send(Method::PUT, &uri, None, Some(r#"{"data":{"v":2}}"#))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let updated = app.get(&uri).await;
    assert_eq!(updated.json()["name"], "Old");
    assert_eq!(updated.json()["data"]["v"], 2);
}

#[tokio::test]
async fn owned_street_is_updatable_only_by_owner() {
    let app = TestApp::spawn().await;
    let street = app.create_street(Some(ALICE_TOKEN), json!({ "name": "Mine" })).await;
    let uri = format!("/v1/streets/{}", street_id(&street));
    let body = Some(r#"{"name":"Renamed"}"#);

    assert_eq!(
        app.send(Method::PUT, &uri, None, body).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.send(Method::PUT, &uri, Some("stale-token"), body).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.send(Method::PUT, &uri, Some(BOB_TOKEN), body).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.send(Method::PUT, &uri, Some(ALICE_TOKEN), body).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&uri).await.json()["name"], "Renamed");
}

#[tokio::test]
async fn update_requires_body_and_live_street() {
    let app = TestApp::spawn().await;
    let street = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    let uri = format!("/v1/streets/{}", street_id(&street));

    assert_eq!(
        app.send(Method::PUT, &uri, Some(ALICE_TOKEN), None).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.send(Method::PUT, "/v1/streets/missing", None, Some("{}"))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.send(
            Method::PUT,
            &uri,
            Some(ALICE_TOKEN),
            Some(r#"{"originalStreetId":"missing"}"#)
        )
        .await
        .status,
        StatusCode::NOT_FOUND
    );

    app.delete_street(&street_id(&street), ALICE_TOKEN).await;
    assert_eq!(
        app.send(Method::PUT, &uri, Some(ALICE_TOKEN), Some("{}"))
            .await
            .status,
        StatusCode::GONE
    );
}

#[tokio::test]
async fn delete_is_owner_only_and_idempotent() {
    let app = TestApp::spawn().await;
    let owned = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    let anonymous = app.create_street(None, json!({})).await;
    let uri = format!("/v1/streets/{}", street_id(&owned));

    assert_eq!(
        app.send(Method::DELETE, &uri, None, None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.delete_street("missing", ALICE_TOKEN).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.delete_street(&street_id(&owned), "stale-token").await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.delete_street(&street_id(&owned), BOB_TOKEN).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.delete_street(&street_id(&anonymous), ALICE_TOKEN).await,
        StatusCode::FORBIDDEN
    );

    assert_eq!(
        app.delete_street(&street_id(&owned), ALICE_TOKEN).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&uri).await.status, StatusCode::GONE);
    assert_eq!(
        app.delete_street(&street_id(&owned), ALICE_TOKEN).await,
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn namespaced_lookups_redirect_to_canonical_uri() {
    let app = TestApp::spawn().await;
    let owned = app.create_street(Some(ALICE_TOKEN), json!({})).await;
    let anonymous = app.create_street(None, json!({})).await;

    let response = app
        .get(&format!("/v1/streets?creatorId={}&namespacedId=1", ALICE))
        .await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header(header::LOCATION),
        Some(format!("{}/v1/streets/{}", BASE_URI, street_id(&owned)).as_str())
    );
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));

    let response = app.get("/v1/streets?namespacedId=1").await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header(header::LOCATION),
        Some(format!("{}/v1/streets/{}", BASE_URI, street_id(&anonymous)).as_str())
    );
}

#[tokio::test]
async fn namespaced_lookup_failures() {
    let app = TestApp::spawn().await;
    let owned = app.create_street(Some(ALICE_TOKEN), json!({})).await;

    let cases = [
        ("/v1/streets?creatorId=nobody&namespacedId=1", StatusCode::NOT_FOUND),
        ("/v1/streets?creatorId=alice&namespacedId=7", StatusCode::NOT_FOUND),
        ("/v1/streets?creatorId=alice", StatusCode::BAD_REQUEST),
        ("/v1/streets?namespacedId=abc", StatusCode::BAD_REQUEST),
        ("/v1/streets?namespacedId=1", StatusCode::NOT_FOUND),
    ];
    for (uri, expected) in cases {
        assert_eq!(app.get(uri).await.status, expected, "{}", uri);
    }

    app.delete_street(&street_id(&owned), ALICE_TOKEN).await;
    assert_eq!(
        app.get("/v1/streets?creatorId=alice&namespacedId=1")
            .await
            .status,
        StatusCode::GONE
    );
}

#[tokio::test]
async fn listing_paginates_active_streets() {
    let app = TestApp::spawn().await;
    let mut created = Vec::new();
    for i in 0..5 {
        created.push(
            app.create_street(Some(ALICE_TOKEN), json!({ "name": format!("s{}", i) }))
                .await,
        );
    }
    app.delete_street(&street_id(&created[0]), ALICE_TOKEN).await;

    let all = app.get("/v1/streets").await;
    assert_eq!(all.status, StatusCode::OK);
    let streets = all.json()["streets"].as_array().unwrap();
    assert_eq!(streets.len(), 4);
    assert!(streets.iter().all(|s| s["id"] != created[0]["id"]));
    assert_eq!(
        all.json()["meta"]["links"]["self"],
        format!("{}/v1/streets?start=0&count=20", BASE_URI)
    );

    let first = app.get("/v1/streets?start=0&count=2").await;
    let links = &first.json()["meta"]["links"];
    assert_eq!(first.json()["streets"].as_array().unwrap().len(), 2);
    assert!(links.get("prev").is_none());
    assert_eq!(
        links["next"],
        format!("{}/v1/streets?start=2&count=2", BASE_URI)
    );

    let last = app.get("/v1/streets?start=2&count=2").await;
    let links = &last.json()["meta"]["links"];
    assert_eq!(
        links["prev"],
        format!("{}/v1/streets?start=0&count=2", BASE_URI)
    );
    assert!(links.get("next").is_none());

    let middle = app.get("/v1/streets?start=1&count=2").await;
    let links = &middle.json()["meta"]["links"];
    assert_eq!(
        links["prev"],
        format!("{}/v1/streets?start=0&count=1", BASE_URI)
    );
    assert_eq!(
        links["next"],
        format!("{}/v1/streets?start=3&count=1", BASE_URI)
    );
}

#[tokio::test]
async fn capacity_sums_street_segments() {
    let app = TestApp::spawn().await;
    let street = app
        .create_street(
            None,
            json!({
                "data": {
                    "street": {
                        "segments": [
                            { "type": "sidewalk", "variantString": "normal" },
                            { "type": "bus-lane", "variantString": "inbound|shared" },
                            { "type": "food-truck", "variantString": "left" }
                        ]
                    }
                }
            }),
        )
        .await;

    let response = app
        .get(&format!("/v1/streets/{}/capacity", street_id(&street)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["averageTotal"], 24_000);
    assert_eq!(body["potentialTotal"], 27_000);
    assert_eq!(body["segmentData"][1]["label"], "inbound|shared bus-lane");
    assert_eq!(body["segmentData"][2]["capacity"]["average"], 0);

    let empty = app.create_street(None, json!({})).await;
    let response = app
        .get(&format!("/v1/streets/{}/capacity", street_id(&empty)))
        .await;
    assert_eq!(response.json()["averageTotal"], 0);
}

#[tokio::test]
async fn listing_past_the_end_is_an_empty_page() {
    let app = TestApp::spawn().await;
    app.create_street(None, json!({})).await;

    let response = app
        .get("/v1/streets?start=18446744073709551615&count=5")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["streets"].as_array().unwrap().is_empty());
    assert!(response.json()["meta"]["links"].get("next").is_none());
}
