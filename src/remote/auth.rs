use crate::config::schema::SpotifyConfig;
use crate::error::{AuthError, ButtonError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Tokens are refreshed this many seconds before they actually expire.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Owner-only: the cache holds a refresh token.
const CACHE_MODE: u32 = 0o600;

/// An access token as cached on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: u64,
    #[serde(default)]
    pub scope: String,
}

impl Token {
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now + EXPIRY_MARGIN_SECS
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: u64,
    #[serde(default)]
    scope: String,
}

/// Authorization-code grant with refresh, cached in a JSON file.
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: String,
    cache_path: PathBuf,
    authorize_endpoint: Url,
    token_endpoint: Url,
    token: Option<Token>,
}

impl TokenManager {
    /// # Errors
    /// Returns `ButtonError::Config` if an endpoint URL cannot be parsed.
    pub fn new(config: &SpotifyConfig) -> crate::error::Result<Self> {
        let parse = |url: &str| {
            Url::parse(url).map_err(|e| ButtonError::Config(format!("bad URL {url}: {e}")))
        };
        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            cache_path: config.cache_path(),
            authorize_endpoint: parse(AUTHORIZE_URL)?,
            token_endpoint: parse(TOKEN_URL)?,
            token: None,
        })
    }

    #[must_use]
    pub fn authorize_url(&self) -> String {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scopes);
        url.into()
    }

    /// Exchange `code` if given; otherwise return the cached token,
    /// refreshing it first when it is about to expire.
    ///
    /// # Errors
    /// `AuthError::NoToken` if nothing is cached and no code was given, or
    /// the error from the token endpoint or the cache file.
    pub async fn access_token(
        &mut self,
        http: &reqwest::Client,
        code: Option<&str>,
    ) -> Result<String, AuthError> {
        if let Some(code) = code {
            info!("exchanging authorization code");
            let form = [
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ];
            let token = self.request(http, &form, None).await?;
            return self.store(token).await;
        }

        if self.token.is_none() {
            self.token = load_cache(&self.cache_path).await?;
        }
        let Some(token) = self.token.clone() else {
            return Err(AuthError::NoToken);
        };

        if !token.is_expired(unix_now()) {
            return Ok(token.access_token);
        }

        let Some(refresh) = token.refresh_token else {
            warn!("access token expired and no refresh token cached");
            return Err(AuthError::NoToken);
        };
        debug!("refreshing access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh.as_str()),
        ];
        let refreshed = self.request(http, &form, Some(refresh.as_str())).await?;
        self.store(refreshed).await
    }

    async fn request(
        &self,
        http: &reqwest::Client,
        form: &[(&str, &str)],
        previous_refresh: Option<&str>,
    ) -> Result<Token, AuthError> {
        let resp = http
            .post(self.token_endpoint.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }

        let body: TokenResponse = resp.json().await?;
        Ok(Token {
            access_token: body.access_token,
            // Refresh responses may omit the refresh token; keep the old one.
            refresh_token: body
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: unix_now() + body.expires_in,
            scope: body.scope,
        })
    }

    async fn store(&mut self, token: Token) -> Result<String, AuthError> {
        save_cache(&self.cache_path, &token).await?;
        let access = token.access_token.clone();
        self.token = Some(token);
        Ok(access)
    }
}

async fn load_cache(path: &Path) -> Result<Option<Token>, AuthError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(AuthError::Cache {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn save_cache(path: &Path, token: &Token) -> Result<(), AuthError> {
    let json = serde_json::to_vec_pretty(token)?;
    write_private(path, &json)
        .await
        .map_err(|source| AuthError::Cache {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("token cached at {}", path.display());
    Ok(())
}

/// Write `bytes` to `path` with owner-only permissions, tightening them if the
/// file already existed.
async fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CACHE_MODE)
        .open(path)
        .await?;
    file.set_permissions(Permissions::from_mode(CACHE_MODE)).await?;
    file.write_all(bytes).await?;
    file.flush().await
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
