use super::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, affiliate_id: &str) -> RakutenConfig {
    RakutenConfig {
        application_id: "app-123".into(),
        affiliate_id: affiliate_id.into(),
        api_base: server.uri(),
    }
}

fn client(server: &MockServer) -> RakutenClient {
    RakutenClient::new(&config(server, ""), Client::new())
}

fn item(n: u32) -> serde_json::Value {
    json!({
        "itemName": format!("折りたたみ傘 {n}"),
        "itemPrice": 1000 + n,
        "itemUrl": format!("https://item.rakuten.co.jp/shop/umbrella-{n}/"),
        "affiliateUrl": "",
        "mediumImageUrls": [
            format!("https://thumbnail.image.rakuten.co.jp/{n}-a.jpg?_ex=128x128"),
            format!("https://thumbnail.image.rakuten.co.jp/{n}-b.jpg?_ex=128x128")
        ]
    })
}

#[tokio::test]
async fn test_search_sends_expected_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("applicationId", "app-123"))
        .and(query_param("keyword", "umbrella"))
        .and(query_param("hits", "3"))
        .and(query_param("imageFlag", "1"))
        .and(query_param("formatVersion", "2"))
        .and(query_param_is_missing("affiliateId"))
        .and(query_param_is_missing("sort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3, "page": 1, "hits": 3,
            "Items": [item(1), item(2), item(3)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client(&server).search("umbrella", DEFAULT_HITS).await.unwrap();
    assert_eq!(list.len(), 3);
    let first = list.get(0).unwrap();
    assert_eq!(first.name, "折りたたみ傘 1");
    assert_eq!(first.price, 1001);
    assert_eq!(first.url, "https://item.rakuten.co.jp/shop/umbrella-1/");
    assert_eq!(
        first.image_url,
        "https://thumbnail.image.rakuten.co.jp/1-a.jpg?_ex=128x128"
    );
    let names: Vec<&str> = list.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["折りたたみ傘 1", "折りたたみ傘 2", "折りたたみ傘 3"]);
}

#[tokio::test]
async fn test_search_includes_affiliate_id_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("affiliateId", "aff-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RakutenClient::new(&config(&server, "aff-9"), Client::new());
    assert!(client.search("umbrella", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_trims_keyword() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("keyword", "傘"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": [item(1)]})))
        .expect(1)
        .mount(&server)
        .await;

    let list = client(&server).search("  傘\n", 3).await.unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_search_empty_result_is_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"count": 0, "Items": []})),
        )
        .mount(&server)
        .await;

    let list = client(&server).search("zzzz-no-such-thing", 3).await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_search_404_not_found_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found", "error_description": "not found"
        })))
        .mount(&server)
        .await;

    assert!(client(&server).search("nothing", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_never_exceeds_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [item(1), item(2), item(3), item(4), item(5)]
        })))
        .mount(&server)
        .await;

    let list = client(&server).search("umbrella", 3).await.unwrap();
    assert_eq!(list.len(), 3);
    let list = client(&server).search("umbrella", 2).await.unwrap();
    assert_eq!(list.len(), 2);
}

#[tokio::test]
async fn test_search_accepts_format_version_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [{"Item": {
                "itemName": "Widget",
                "itemPrice": 1000,
                "itemUrl": "https://x/1",
                "mediumImageUrls": [{"imageUrl": "https://img/1"}]
            }}]
        })))
        .mount(&server)
        .await;

    let list = client(&server).search("widget", 3).await.unwrap();
    assert_eq!(
        list.get(0),
        Some(&ProductRecord {
            name: "Widget".into(),
            price: 1000,
            url: "https://x/1".into(),
            image_url: "https://img/1".into(),
        })
    );
}

#[tokio::test]
async fn test_search_bad_application_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "wrong_parameter",
            "error_description": "specify valid applicationId"
        })))
        .mount(&server)
        .await;

    let err = client(&server).search("umbrella", 3).await.unwrap_err();
    let ShopcrabError::Search { message, retryable } = err else {
        panic!("expected search error");
    };
    assert_eq!(
        message,
        "wrong_parameter (400): specify valid applicationId"
    );
    assert!(!retryable);
}

#[tokio::test]
async fn test_search_rate_limited_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": "too_many_requests",
            "error_description": "number of allowed requests has been exceeded for this API. please try again soon."
        })))
        .mount(&server)
        .await;

    let err = client(&server).search("umbrella", 3).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("too_many_requests"));
}

#[tokio::test]
async fn test_search_server_error_plain_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).search("umbrella", 3).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("HTTP 503: maintenance"));
}

#[tokio::test]
async fn test_search_invalid_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).search("umbrella", 3).await.unwrap_err();
    assert!(matches!(err, ShopcrabError::Search { retryable: false, .. }));
}

#[tokio::test]
async fn test_search_item_missing_price_is_parse_error() {
    let server = MockServer::start().await;
    let mut broken = item(2);
    broken.as_object_mut().unwrap().remove("itemPrice");
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Items": [item(1), broken]})),
        )
        .mount(&server)
        .await;

    let err = client(&server).search("umbrella", 3).await.unwrap_err();
    assert!(matches!(err, ShopcrabError::Parse(_)));
    assert!(err.to_string().contains("itemPrice"));
}

#[tokio::test]
async fn test_search_empty_keyword_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).search("   ", 3).await.unwrap_err();
    assert!(matches!(err, ShopcrabError::Search { retryable: false, .. }));
}

#[tokio::test]
async fn test_search_empty_application_id_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let mut cfg = config(&server, "");
    cfg.application_id.clear();
    let err = RakutenClient::new(&cfg, Client::new())
        .search("umbrella", 3)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("applicationId"));
}

#[test]
fn test_record_parse_rejects_missing_images() {
    let raw: RawItem = serde_json::from_value(json!({
        "itemName": "No image",
        "itemPrice": 10,
        "itemUrl": "https://x/1",
        "mediumImageUrls": []
    }))
    .unwrap();
    let err = ProductRecord::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("mediumImageUrls"));
}

#[test]
fn test_record_parse_rejects_relative_url() {
    let raw: RawItem = serde_json::from_value(json!({
        "itemName": "Relative",
        "itemPrice": 10,
        "itemUrl": "/shop/item/1",
        "mediumImageUrls": ["https://img/1"]
    }))
    .unwrap();
    let err = ProductRecord::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("itemUrl"));
}

#[test]
fn test_record_parse_rejects_blank_name() {
    let raw: RawItem = serde_json::from_value(json!({
        "itemName": "  ",
        "itemPrice": 10,
        "itemUrl": "https://x/1",
        "mediumImageUrls": ["https://img/1"]
    }))
    .unwrap();
    assert!(ProductRecord::try_from(raw).is_err());
}
