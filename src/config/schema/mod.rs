use serde::{Deserialize, Serialize};

use crate::errors::ShopcrabError;

/// Generate a `Debug` impl that replaces secret fields with `[REDACTED]`
/// (or `[empty]` when unset) so configs can be logged safely.
macro_rules! redact_debug {
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// LINE Messaging API
// ---------------------------------------------------------------------------

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Channel secret, used to verify `X-Line-Signature`.
    #[serde(default, rename = "channelSecret")]
    pub channel_secret: String,
    /// Long-lived channel access token for the reply API.
    #[serde(default, rename = "channelToken")]
    pub channel_token: String,
    #[serde(default = "default_line_api_base", rename = "apiBase")]
    pub api_base: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_token: String::new(),
            api_base: default_line_api_base(),
        }
    }
}

redact_debug!(
    LineConfig,
    redact(channel_secret),
    redact(channel_token),
    api_base,
);

// ---------------------------------------------------------------------------
// Rakuten Ichiba item search
// ---------------------------------------------------------------------------

fn default_rakuten_api_base() -> String {
    "https://app.rakuten.co.jp".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RakutenConfig {
    #[serde(default, rename = "applicationId")]
    pub application_id: String,
    /// Optional; when set, the API returns affiliate links.
    #[serde(default, rename = "affiliateId")]
    pub affiliate_id: String,
    #[serde(default = "default_rakuten_api_base", rename = "apiBase")]
    pub api_base: String,
}

impl Default for RakutenConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            affiliate_id: String::new(),
            api_base: default_rakuten_api_base(),
        }
    }
}

redact_debug!(
    RakutenConfig,
    redact(application_id),
    redact(affiliate_id),
    api_base,
);

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_webhook_path() -> String {
    "/callback".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_webhook_path", rename = "webhookPath")]
    pub webhook_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound HTTP
// ---------------------------------------------------------------------------

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs", rename = "connectTimeoutSecs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub rakuten: RakutenConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Everything `serve` needs. Called once at startup so a missing secret
    /// stops the process before the listener binds.
    pub fn validate(&self) -> Result<(), ShopcrabError> {
        self.validate_line()?;
        self.validate_search()?;
        self.validate_gateway()?;
        Ok(())
    }

    /// The subset needed to run a product search without LINE credentials.
    pub fn validate_search(&self) -> Result<(), ShopcrabError> {
        self.validate_rakuten()?;
        self.validate_http()?;
        Ok(())
    }

    fn validate_line(&self) -> Result<(), ShopcrabError> {
        if self.line.channel_secret.trim().is_empty() {
            return Err(ShopcrabError::Config(
                "line.channelSecret is required (or set LINE_BOT_CHANNEL_SECRET)".into(),
            ));
        }
        if self.line.channel_token.trim().is_empty() {
            return Err(ShopcrabError::Config(
                "line.channelToken is required (or set LINE_BOT_CHANNEL_TOKEN)".into(),
            ));
        }
        validate_base_url("line.apiBase", &self.line.api_base)
    }

    fn validate_rakuten(&self) -> Result<(), ShopcrabError> {
        let r = &self.rakuten;
        if r.application_id.trim().is_empty() {
            return Err(ShopcrabError::Config(
                "rakuten.applicationId is required (or set RAKUTEN_APPLICATION_ID)".into(),
            ));
        }
        validate_base_url("rakuten.apiBase", &r.api_base)
    }

    fn validate_gateway(&self) -> Result<(), ShopcrabError> {
        let g = &self.gateway;
        if g.port == 0 {
            return Err(ShopcrabError::Config("gateway.port must be > 0".into()));
        }
        if !g.webhook_path.starts_with('/') {
            return Err(ShopcrabError::Config(
                "gateway.webhookPath must start with '/'".into(),
            ));
        }
        // axum treats these as capture syntax and panics on malformed ones.
        if g.webhook_path.contains(['{', '}', '*']) {
            return Err(ShopcrabError::Config(format!(
                "gateway.webhookPath must be a literal path without '{{', '}}' or '*': {}",
                g.webhook_path
            )));
        }
        if g.webhook_path == "/api/health" {
            return Err(ShopcrabError::Config(
                "gateway.webhookPath collides with /api/health".into(),
            ));
        }
        Ok(())
    }

    fn validate_http(&self) -> Result<(), ShopcrabError> {
        let h = &self.http;
        if h.connect_timeout_secs == 0 {
            return Err(ShopcrabError::Config(
                "http.connectTimeoutSecs must be > 0".into(),
            ));
        }
        if h.timeout_secs == 0 {
            return Err(ShopcrabError::Config("http.timeoutSecs must be > 0".into()));
        }
        if h.timeout_secs > 300 {
            return Err(ShopcrabError::Config(
                "http.timeoutSecs is unreasonably large (> 300)".into(),
            ));
        }
        Ok(())
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ShopcrabError> {
    match url::Url::parse(value) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
        Ok(u) => Err(ShopcrabError::Config(format!(
            "{field} must be an http(s) URL, got scheme '{}'",
            u.scheme()
        ))),
        Err(e) => Err(ShopcrabError::Config(format!(
            "{field} is not a valid URL: {e}"
        ))),
    }
}
