use crate::config::schema::SpotifyConfig;
use crate::error::{AuthError, RemoteError, Result};
use crate::remote::auth::TokenManager;
use crate::remote::{Authenticator, CurrentlyPlaying, PlaybackApi};
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

const API_BASE: &str = "https://api.spotify.com/v1";

/// Spotify Web API player endpoints.
pub struct SpotifyClient {
    http: reqwest::Client,
    tokens: TokenManager,
    api_base: String,
}

impl SpotifyClient {
    /// # Errors
    /// Returns `ButtonError::HttpClient` if the HTTP client cannot be built,
    /// or `ButtonError::Config` for unusable OAuth settings.
    pub fn new(config: &SpotifyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            tokens: TokenManager::new(config)?,
            api_base: API_BASE.to_string(),
        })
    }

    async fn bearer(&mut self) -> std::result::Result<String, AuthError> {
        self.tokens.access_token(&self.http, None).await
    }

    /// Send a player command that returns no body.
    async fn command(&mut self, method: Method, endpoint: &str) -> std::result::Result<(), RemoteError> {
        let token = self.bearer().await?;
        let url = format!("{}{endpoint}", self.api_base);

        let resp = self
            .http
            .request(method.clone(), url.as_str())
            .bearer_auth(token)
            .header(CONTENT_LENGTH, "0")
            .send()
            .await?;
        let status = resp.status();

        if status.is_success() {
            debug!("{method} {endpoint} → {status}");
            Ok(())
        } else {
            warn!("{method} {endpoint} → {status}");
            Err(RemoteError::Status {
                endpoint: endpoint.to_string(),
                status,
            })
        }
    }
}

#[async_trait]
impl PlaybackApi for SpotifyClient {
    async fn currently_playing(&mut self) -> std::result::Result<Option<CurrentlyPlaying>, RemoteError> {
        const ENDPOINT: &str = "/me/player/currently-playing";

        let token = self.bearer().await?;
        let resp = self
            .http
            .get(format!("{}{ENDPOINT}", self.api_base))
            .bearer_auth(token)
            .send()
            .await?;
        let status = resp.status();

        if status == StatusCode::NO_CONTENT {
            debug!("GET {ENDPOINT} → nothing playing");
            return Ok(None);
        }
        if !status.is_success() {
            warn!("GET {ENDPOINT} → {status}");
            return Err(RemoteError::Status {
                endpoint: ENDPOINT.to_string(),
                status,
            });
        }

        let playing: CurrentlyPlaying = resp.json().await?;
        debug!("GET {ENDPOINT} → is_playing={}", playing.is_playing);
        Ok(Some(playing))
    }

    async fn previous_track(&mut self) -> std::result::Result<(), RemoteError> {
        self.command(Method::POST, "/me/player/previous").await
    }

    async fn next_track(&mut self) -> std::result::Result<(), RemoteError> {
        self.command(Method::POST, "/me/player/next").await
    }

    async fn start_playback(&mut self) -> std::result::Result<(), RemoteError> {
        self.command(Method::PUT, "/me/player/play").await
    }

    async fn pause_playback(&mut self) -> std::result::Result<(), RemoteError> {
        self.command(Method::PUT, "/me/player/pause").await
    }
}

#[async_trait]
impl Authenticator for SpotifyClient {
    fn authorize_url(&self) -> String {
        self.tokens.authorize_url()
    }

    async fn access_token(&mut self, code: Option<&str>) -> std::result::Result<String, AuthError> {
        self.tokens.access_token(&self.http, code).await
    }
}
