//! End-to-end calls through the HTTP front.

use std::fs;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use eti_router::calling::CALLING_KEY;
use eti_router::http::X_REQUEST_ID;

mod common;

async fn post(addr: std::net::SocketAddr, form: &[(&str, &str)]) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{}/demo/call", addr))
        .form(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn echo_call_round_trips() {
    let dir = common::default_layout();
    let router = Arc::new(common::boot(dir.path()).await.unwrap());
    let (addr, shutdown) = common::serve(router.clone()).await;

    let encoded = common::calling(json!({
        "methodName": "echo",
        "requestID": "req-1",
        "token": "t-1",
        "amount": 3
    }));
    let res = post(addr, &[(CALLING_KEY, encoded.as_str())]).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(X_REQUEST_ID));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["requestID"], "req-1");
    assert_eq!(body["methodName"], "echo");
    assert_eq!(body["auth"], "token");
    assert_eq!(body["calling"]["amount"], 3);

    shutdown.trigger();
}

#[tokio::test]
async fn calling_in_query_string_is_accepted() {
    let dir = common::default_layout();
    let router = Arc::new(common::boot(dir.path()).await.unwrap());
    let (addr, shutdown) = common::serve(router).await;

    let encoded = common::calling(json!({
        "methodName": "Echo",
        "requestID": 9,
        "productID": "p",
        "operatorID": "o"
    }));
    let res = reqwest::Client::new()
        .get(format!("http://{}/", addr))
        .query(&[(CALLING_KEY, encoded.as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["requestID"], "9");
    assert_eq!(body["auth"], "operator");

    shutdown.trigger();
}

#[tokio::test]
async fn method_singleton_survives_across_calls() {
    let dir = common::default_layout();
    let router = Arc::new(common::boot(dir.path()).await.unwrap());
    let (addr, shutdown) = common::serve(router.clone()).await;

    let encoded = common::calling(json!({"methodName": "echo", "requestID": "r", "token": "t"}));
    for _ in 0..3 {
        let res = post(addr, &[(CALLING_KEY, encoded.as_str())]).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert!(router.methods().is_cached("echo"));
    assert_eq!(router.methods().cached_count(), 1);
    let first = router.load_method("ECHO").unwrap();
    let second = router.load_method("echo").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_calls_get_fixed_messages() {
    let dir = common::default_layout();
    let router = Arc::new(common::boot(dir.path()).await.unwrap());
    let (addr, shutdown) = common::serve(router).await;

    let no_request_id = common::calling(json!({"methodName": "echo", "token": "t"}));
    let both_auth = common::calling(json!({
        "methodName": "echo", "requestID": "r", "token": "t", "productID": "p", "operatorID": "o"
    }));
    let no_method = common::calling(json!({"requestID": "r", "token": "t"}));

    let cases: Vec<(Vec<(&str, &str)>, &str)> = vec![
        (vec![], "Parameter Missing"),
        (vec![("other", "x")], "Parameter Error"),
        (vec![(CALLING_KEY, "")], "Parameter Empty"),
        (vec![(CALLING_KEY, "0")], "Parameter Empty"),
        (vec![(CALLING_KEY, "!!not-base64!!")], "JSON Method Name Error"),
        (vec![(CALLING_KEY, no_method.as_str())], "JSON Method Name Error"),
        (vec![(CALLING_KEY, both_auth.as_str())], "JSON Parameter Empty"),
        (vec![(CALLING_KEY, no_request_id.as_str())], "JSON RequestID Missing"),
    ];

    for (form, expected) in cases {
        let res = post(addr, &form).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "form {:?}", form);
        assert_eq!(res.text().await.unwrap(), expected, "form {:?}", form);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn missing_method_file_is_not_found_and_logged() {
    let dir = common::default_layout();
    let router = Arc::new(common::boot(dir.path()).await.unwrap());
    let (addr, shutdown) = common::serve(router.clone()).await;

    let encoded = common::calling(json!({"methodName": "refund", "requestID": "r", "token": "t"}));
    let res = post(addr, &[(CALLING_KEY, encoded.as_str())]).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "JSON Method Name Error");

    let log_root = router.paths().log_root().to_path_buf();
    let logs: Vec<_> = fs::read_dir(&log_root).unwrap().collect();
    assert_eq!(logs.len(), 1);
    let contents = fs::read_to_string(logs[0].as_ref().unwrap().path()).unwrap();
    assert!(contents.contains("refund.class"));
    assert!(contents.contains("Output the errorCode 35."));
    assert!(contents.contains("/demo/call"));

    shutdown.trigger();
}

#[tokio::test]
async fn class_file_without_registered_type_is_not_defined() {
    let dir = common::default_layout();
    fs::write(dir.path().join("app").join(common::APP).join("lib").join("refund.class"), "").unwrap();
    let router = Arc::new(common::boot(dir.path()).await.unwrap());
    let (addr, shutdown) = common::serve(router).await;

    let encoded = common::calling(json!({"methodName": "refund", "requestID": "r", "token": "t"}));
    let res = post(addr, &[(CALLING_KEY, encoded.as_str())]).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "JSON Method Name Error");

    shutdown.trigger();
}
