pub mod auth;
pub mod spotify;

use crate::action;
use crate::error::{AuthError, RemoteError};
use crate::state::{ButtonId, LogicalState};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

/// The subset of the "currently playing" response the daemon cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
}

/// Playback control on the remote player.
#[async_trait]
pub trait PlaybackApi: Send {
    /// `None` when nothing is loaded on any device.
    async fn currently_playing(&mut self) -> Result<Option<CurrentlyPlaying>, RemoteError>;

    async fn previous_track(&mut self) -> Result<(), RemoteError>;

    async fn next_track(&mut self) -> Result<(), RemoteError>;

    async fn start_playback(&mut self) -> Result<(), RemoteError>;

    async fn pause_playback(&mut self) -> Result<(), RemoteError>;
}

/// OAuth authorization-code flow.
#[async_trait]
pub trait Authenticator: Send {
    /// Where the user logs in to grant access.
    fn authorize_url(&self) -> String;

    /// Exchange `code` for a token if given, otherwise return the cached
    /// token, refreshing it when expired.
    async fn access_token(&mut self, code: Option<&str>) -> Result<String, AuthError>;
}

/// A playback client together with its token manager.
pub trait Remote: PlaybackApi + Authenticator {}

impl<T: PlaybackApi + Authenticator> Remote for T {}

/// The remote service behind its own lock.
///
/// Remote calls and token exchanges never interleave, but they never hold the
/// state lock either, so the LED keeps animating while a request is in flight.
pub struct RemoteConnection {
    inner: Mutex<Box<dyn Remote>>,
}

impl RemoteConnection {
    pub fn new(remote: Box<dyn Remote>) -> Self {
        Self {
            inner: Mutex::new(remote),
        }
    }

    /// Run the remote side of a press and report the resulting state.
    pub async fn perform(&self, button: ButtonId) -> LogicalState {
        let mut remote = self.inner.lock().await;
        action::perform(&mut **remote, button).await
    }

    pub async fn authorize_url(&self) -> String {
        self.inner.lock().await.authorize_url()
    }

    /// Make sure a usable token exists, completing a login if `code` is set.
    ///
    /// # Errors
    /// Returns the `AuthError` from the token manager.
    pub async fn authenticate(&self, code: Option<&str>) -> Result<(), AuthError> {
        self.inner.lock().await.access_token(code).await.map(|_| ())
    }
}
