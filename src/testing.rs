//! In-memory stand-ins for the GPIO, Spotify and UDP collaborators.

use crate::device::led::LedPattern;
use crate::device::{ButtonLevels, Hardware};
use crate::error::{AuthError, RemoteError};
use crate::notify::Notify;
use crate::remote::{Authenticator, CurrentlyPlaying, PlaybackApi};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// A player that remembers whether it is playing and logs every call.
#[derive(Clone)]
pub struct FakeSpotify {
    /// `None` means no active device.
    playing: Arc<Mutex<Option<bool>>>,
    fail: bool,
    authorized: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    /// Playback calls wait here until it reads `true`.
    gate: Arc<watch::Sender<bool>>,
}

impl FakeSpotify {
    fn with(playing: Option<bool>, fail: bool) -> Self {
        Self {
            playing: Arc::new(Mutex::new(playing)),
            fail,
            authorized: Arc::new(Mutex::new(!fail)),
            calls: Arc::default(),
            gate: Arc::new(watch::Sender::new(true)),
        }
    }

    /// Hold every playback call after it is recorded until `open_gate`.
    pub fn gated(self) -> Self {
        self.gate.send_replace(false);
        self
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// Wait until `call` has reached the player at least once.
    pub async fn reached(&self, call: &str) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while self.count(call) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    pub fn stopped() -> Self {
        Self::with(Some(false), false)
    }

    pub fn playing() -> Self {
        Self::with(Some(true), false)
    }

    /// Nothing loaded on any device.
    pub fn idle() -> Self {
        Self::with(None, false)
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self::with(Some(false), true)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn is_playing(&self) -> bool {
        let playing = *self.playing.lock().unwrap();
        playing.unwrap_or(false)
    }

    fn record(&self, call: &'static str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(RemoteError::Auth(AuthError::NoToken))
        } else {
            Ok(())
        }
    }

    async fn enter(&self, call: &'static str) -> Result<(), RemoteError> {
        self.record(call)?;
        let mut gate = self.gate.subscribe();
        loop {
            let open = *gate.borrow_and_update();
            if open || gate.changed().await.is_err() {
                return Ok(());
            }
        }
    }

    fn set_playing(&self, playing: bool) {
        *self.playing.lock().unwrap() = Some(playing);
    }
}

#[async_trait]
impl PlaybackApi for FakeSpotify {
    async fn currently_playing(&mut self) -> Result<Option<CurrentlyPlaying>, RemoteError> {
        self.enter("currently_playing").await?;
        let playing = *self.playing.lock().unwrap();
        Ok(playing.map(|is_playing| CurrentlyPlaying { is_playing }))
    }

    async fn previous_track(&mut self) -> Result<(), RemoteError> {
        self.enter("previous").await?;
        self.set_playing(true);
        Ok(())
    }

    async fn next_track(&mut self) -> Result<(), RemoteError> {
        self.enter("next").await?;
        self.set_playing(true);
        Ok(())
    }

    async fn start_playback(&mut self) -> Result<(), RemoteError> {
        self.enter("start").await?;
        self.set_playing(true);
        Ok(())
    }

    async fn pause_playback(&mut self) -> Result<(), RemoteError> {
        self.enter("pause").await?;
        self.set_playing(false);
        Ok(())
    }
}

#[async_trait]
impl Authenticator for FakeSpotify {
    fn authorize_url(&self) -> String {
        "https://accounts.example/authorize?client_id=x&scope=y".to_string()
    }

    async fn access_token(&mut self, code: Option<&str>) -> Result<String, AuthError> {
        let mut authorized = self.authorized.lock().unwrap();
        if code == Some("good-code") {
            *authorized = true;
        }
        if *authorized {
            Ok("token".to_string())
        } else {
            Err(AuthError::NoToken)
        }
    }
}

/// Buttons whose levels the test sets, and an LED that records every write.
#[derive(Clone, Default)]
pub struct FakeHardware {
    levels: Arc<Mutex<Option<ButtonLevels>>>,
    shown: Arc<Mutex<Vec<LedPattern>>>,
}

impl FakeHardware {
    pub fn set_levels(&self, levels: ButtonLevels) {
        *self.levels.lock().unwrap() = Some(levels);
    }

    pub fn shown(&self) -> Vec<LedPattern> {
        self.shown.lock().unwrap().clone()
    }

    pub fn last_shown(&self) -> Option<LedPattern> {
        self.shown.lock().unwrap().last().copied()
    }
}

impl Hardware for FakeHardware {
    fn read_buttons(&self) -> ButtonLevels {
        let levels = *self.levels.lock().unwrap();
        levels.unwrap_or(ButtonLevels::RELEASED)
    }

    fn show(&mut self, pattern: LedPattern) {
        self.shown.lock().unwrap().push(pattern);
    }
}

/// Collects notifications instead of sending them.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
