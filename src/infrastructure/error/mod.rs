use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Bad recipient specifier or option-set field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Service-account assertion exchange failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Gateway answered with a status other than 200 or 404
    #[error("Failed to send notification. status code: {status_code}")]
    Delivery { status_code: u16, body: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Network failure talking to the gateway
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Token store error: {0}")]
    Store(String),
}

impl PushError {
    /// Stable error code for structured logs
    pub fn code(&self) -> &'static str {
        match self {
            PushError::Config(_) => "CONFIG_ERROR",
            PushError::Validation(_) => "VALIDATION_ERROR",
            PushError::Auth(_) => "AUTH_ERROR",
            PushError::Delivery { .. } => "DELIVERY_ERROR",
            PushError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            PushError::Transport(_) => "TRANSPORT_ERROR",
            PushError::Store(_) => "STORE_ERROR",
        }
    }

    /// HTTP status carried by a delivery error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PushError::Delivery { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        PushError::MalformedPayload(err.to_string())
    }
}

impl From<redis::RedisError> for PushError {
    fn from(err: redis::RedisError) -> Self {
        PushError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PushError>;
