use super::*;
use wiremock::matchers::{header_regex, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn get_response(server: &MockServer) -> Response {
    Client::new().get(server.uri()).send().await.unwrap()
}

#[test]
fn test_build_http_client() {
    assert!(build_http_client(&HttpConfig::default()).is_ok());
}

#[tokio::test]
async fn test_client_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_regex("user-agent", "^shopcrab/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let resp = client.get(server.uri()).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}

#[tokio::test]
async fn test_limited_text_under_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;
    let text = limited_text(get_response(&server).await, 1024).await.unwrap();
    assert_eq!(text, "bad request");
}

#[tokio::test]
async fn test_limited_text_truncates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_bytes(vec![b'x'; 200]))
        .mount(&server)
        .await;
    let text = limited_text(get_response(&server).await, 50).await.unwrap();
    assert!(text.ends_with("\n[truncated]"));
    assert_eq!(text.trim_end_matches("\n[truncated]").len(), 50);
}

#[tokio::test]
async fn test_limited_text_exact_limit_not_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'y'; 64]))
        .mount(&server)
        .await;
    let text = limited_text(get_response(&server).await, 64).await.unwrap();
    assert_eq!(text.len(), 64);
}

#[tokio::test]
async fn test_limited_text_handles_invalid_utf8() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFE, b'o', b'k']))
        .mount(&server)
        .await;
    let text = limited_text(get_response(&server).await, 1024).await.unwrap();
    assert!(text.contains("ok"));
}
