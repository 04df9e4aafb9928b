use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub http: HttpConfig,
    pub notify: NotifyConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Spotify application credentials and OAuth settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,

    /// Must match the redirect URI registered with the Spotify app.
    pub redirect_uri: String,

    /// Where the access/refresh token pair is cached between runs.
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    /// Space-separated OAuth scopes.
    #[serde(default = "default_scopes")]
    pub scopes: String,

    /// Upper bound on any single Web API request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl SpotifyConfig {
    /// The local path the OAuth redirect lands on: `/` plus the last path
    /// segment of the redirect URI.
    #[must_use]
    pub fn callback_path(&self) -> String {
        let segment = self
            .redirect_uri
            .rsplit_once('/')
            .map_or(self.redirect_uri.as_str(), |(_, last)| last);
        format!("/{segment}")
    }

    /// The token cache path with a leading `~/` expanded from `$HOME`.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        match (self.cache_path.strip_prefix("~/"), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
            _ => PathBuf::from(&self.cache_path),
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Status page listener.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub port: u16,

    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Target for UDP notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub host: String,
    pub port: u16,
}

impl NotifyConfig {
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// BCM pin numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct GpioConfig {
    #[serde(default = "default_blue_led")]
    pub blue_led: u8,
    #[serde(default = "default_red_led")]
    pub red_led: u8,
    #[serde(default = "default_green_led")]
    pub green_led: u8,
    #[serde(default = "default_blue_button")]
    pub blue_button: u8,
    #[serde(default = "default_red_button")]
    pub red_button: u8,
    #[serde(default = "default_green_button")]
    pub green_button: u8,
}

impl GpioConfig {
    #[must_use]
    pub const fn pins(&self) -> [u8; 6] {
        [
            self.blue_led,
            self.red_led,
            self.green_led,
            self.blue_button,
            self.red_button,
            self.green_button,
        ]
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            blue_led: default_blue_led(),
            red_led: default_red_led(),
            green_led: default_green_led(),
            blue_button: default_blue_button(),
            red_button: default_red_button(),
            green_button: default_green_button(),
        }
    }
}

/// Debounce and animation timing.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Edges closer than this (microseconds) to the previous edge are ignored.
    #[serde(default = "default_debounce_us")]
    pub debounce_us: u32,

    /// LED flicker period.
    #[serde(default = "default_short_period_ms")]
    pub short_period_ms: u64,

    /// How often the playback state is re-read from Spotify.
    #[serde(default = "default_long_period_secs")]
    pub long_period_secs: u64,
}

impl TimingConfig {
    #[must_use]
    pub const fn short_period(&self) -> Duration {
        Duration::from_millis(self.short_period_ms)
    }

    #[must_use]
    pub const fn long_period(&self) -> Duration {
        Duration::from_secs(self.long_period_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_us: default_debounce_us(),
            short_period_ms: default_short_period_ms(),
            long_period_secs: default_long_period_secs(),
        }
    }
}

// --- Defaults ---

fn default_cache_path() -> String {
    "~/.buttond-token.json".to_string()
}

fn default_scopes() -> String {
    "user-modify-playback-state user-read-playback-state".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_blue_led() -> u8 {
    7
}

fn default_red_led() -> u8 {
    21
}

fn default_green_led() -> u8 {
    20
}

fn default_blue_button() -> u8 {
    25
}

fn default_red_button() -> u8 {
    8
}

fn default_green_button() -> u8 {
    16
}

fn default_debounce_us() -> u32 {
    200_000
}

fn default_short_period_ms() -> u64 {
    1000
}

fn default_long_period_secs() -> u64 {
    300
}
