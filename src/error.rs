use std::path::PathBuf;

/// Central error type for buttond.
#[derive(Debug, thiserror::Error)]
pub enum ButtonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure talking to the playback API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("not authorized: {0}")]
    Auth(#[from] AuthError),
}

/// Failure obtaining or refreshing an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no cached token, authorization required")]
    NoToken,

    #[error("token endpoint rejected request: HTTP {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token cache {path}: {source}")]
    Cache {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("token JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure delivering a UDP notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("cannot resolve {0}")]
    Resolve(String),

    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ButtonError>;
