use thiserror::Error;

/// Typed error hierarchy for shopcrab.
///
/// Request-fatal variants (`Authentication`, `Decode`) abort a webhook call before any
/// event is handled. The remaining pipeline variants are scoped to a single event and
/// only ever get logged. Startup glue can keep using `anyhow::Result`; the `Internal`
/// variant converts via `?`.
#[derive(Debug, Error)]
pub enum ShopcrabError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Malformed webhook payload: {0}")]
    Decode(String),

    #[error("Product search failed: {message}")]
    Search { message: String, retryable: bool },

    #[error("Invalid product record: {0}")]
    Parse(String),

    #[error("Failed to render reply: {0}")]
    Render(String),

    #[error("Reply delivery failed ({status}): {message}")]
    Delivery { status: u16, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ShopcrabResult<T> = std::result::Result<T, ShopcrabError>;

impl ShopcrabError {
    /// Whether this error rejects the whole webhook call rather than a single event.
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::Decode(_))
    }

    /// Whether a later attempt could plausibly succeed. Nothing retries today; the
    /// flag only ends up in logs.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Search { retryable, .. } => *retryable,
            Self::Delivery { status, .. } => *status == 0 || *status == 429 || *status >= 500,
            Self::Internal(_) => true,
            Self::Config(_)
            | Self::Authentication(_)
            | Self::Decode(_)
            | Self::Parse(_)
            | Self::Render(_) => false,
        }
    }
}
