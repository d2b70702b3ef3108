// Shared test helpers; not every item is used by every test binary.
#![allow(unused)]

use std::sync::Arc;

use axum::Router;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use shopcrab::config::Config;
use shopcrab::dispatch::Dispatcher;
use shopcrab::gateway::{GatewayState, build_router};
use shopcrab::line::LineClient;
use shopcrab::rakuten::RakutenClient;

pub const CHANNEL_SECRET: &str = "integration-secret";
pub const CHANNEL_TOKEN: &str = "integration-token";
pub const APPLICATION_ID: &str = "1234567890";

/// A config whose outbound APIs point at the given mock servers.
pub fn test_config(line_base: &str, rakuten_base: &str) -> Config {
    let mut config = Config::default();
    config.line.channel_secret = CHANNEL_SECRET.into();
    config.line.channel_token = CHANNEL_TOKEN.into();
    config.line.api_base = line_base.into();
    config.rakuten.application_id = APPLICATION_ID.into();
    config.rakuten.api_base = rakuten_base.into();
    config
}

/// The router `serve` would run, wired to real HTTP clients.
pub fn app(config: &Config) -> Router {
    let http = reqwest::Client::new();
    let dispatcher = Dispatcher::new(
        config.line.channel_secret.clone(),
        Arc::new(RakutenClient::new(&config.rakuten, http.clone())),
        Arc::new(LineClient::new(&config.line, http)),
    );
    build_router(
        GatewayState::new(Arc::new(dispatcher)),
        &config.gateway.webhook_path,
    )
}

pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

pub fn text_event(reply_token: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "webhookEventId": format!("evt-{}", reply_token),
        "deliveryContext": {"isRedelivery": false},
        "replyToken": reply_token,
        "source": {"type": "user", "userId": "U4af4980629"},
        "message": {"id": "444573844083572737", "type": "text", "text": text}
    })
}

pub fn webhook_body(events: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({"destination": "Ubot", "events": events})).unwrap()
}

pub fn webhook_request(path: &str, body: Vec<u8>, signature: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("x-line-signature", sig);
    }
    builder.body(axum::body::Body::from(body)).unwrap()
}

/// A `formatVersion=2` search item.
pub fn rakuten_item(name: &str, price: u64) -> Value {
    let slug = name.to_lowercase().replace(' ', "-");
    json!({
        "itemName": name,
        "itemPrice": price,
        "itemUrl": format!("https://item.rakuten.co.jp/shop/{}/", slug),
        "mediumImageUrls": [format!("https://thumbnail.image.rakuten.co.jp/{}.jpg", slug)],
        "shopName": "shop"
    })
}
