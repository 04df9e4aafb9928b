use crate::error::RemoteError;
use crate::remote::PlaybackApi;
use crate::state::{ButtonId, LogicalState};
use tracing::{info, warn};

/// Perform the remote side of a press and report the state to display.
///
/// Never fails: any remote error becomes [`LogicalState::ERROR`].
pub async fn perform<P: PlaybackApi + ?Sized>(api: &mut P, button: ButtonId) -> LogicalState {
    match button {
        ButtonId::Blue => press_blue(api).await,
        ButtonId::Red => press_red(api).await,
        ButtonId::Green => press_green(api).await,
        ButtonId::All => press_all(api).await,
        ButtonId::None => press_nothing(api).await,
    }
}

/// Previous track. Skipping always resumes playback, so a `Stopped` reading
/// right afterwards is shown as playing.
pub async fn press_blue<P: PlaybackApi + ?Sized>(api: &mut P) -> LogicalState {
    info!("press blue");
    match api.previous_track().await {
        Ok(()) => resumed(derive_state(api).await),
        Err(e) => failed("previous track", &e),
    }
}

/// Play/pause toggle.
pub async fn press_red<P: PlaybackApi + ?Sized>(api: &mut P) -> LogicalState {
    info!("press red");
    let current = derive_state(&mut *api).await;

    let result = if current == LogicalState::STOPPED {
        api.start_playback().await.map(|()| LogicalState::PLAYING)
    } else if current.is_playing() {
        api.pause_playback().await.map(|()| LogicalState::STOPPED)
    } else {
        Ok(current)
    };

    result.unwrap_or_else(|e| failed("pause/unpause", &e))
}

/// Next track. Same display rule as [`press_blue`].
pub async fn press_green<P: PlaybackApi + ?Sized>(api: &mut P) -> LogicalState {
    info!("press green");
    match api.next_track().await {
        Ok(()) => resumed(derive_state(api).await),
        Err(e) => failed("next track", &e),
    }
}

/// Pause and start the three-phase "all pressed" display. A failed pause is
/// logged but still shows the all-pressed pattern.
pub async fn press_all<P: PlaybackApi + ?Sized>(api: &mut P) -> LogicalState {
    info!("press all");
    if let Err(e) = api.pause_playback().await {
        warn!("pause on all-press failed: {e}");
    }
    LogicalState::ALL_PRESSED
}

/// Refresh only; nothing is changed on the remote side.
pub async fn press_nothing<P: PlaybackApi + ?Sized>(api: &mut P) -> LogicalState {
    info!("press nothing");
    derive_state(api).await
}

/// Read the remote playback state.
///
/// Playing is always reported as the first playing phase; callers that
/// animate substitute their own phase.
pub async fn derive_state<P: PlaybackApi + ?Sized>(api: &mut P) -> LogicalState {
    match api.currently_playing().await {
        Ok(Some(playing)) if playing.is_playing => LogicalState::PLAYING,
        Ok(_) => LogicalState::STOPPED,
        Err(e) => {
            warn!("currently playing: {e}");
            LogicalState::ERROR
        }
    }
}

fn resumed(state: LogicalState) -> LogicalState {
    if state == LogicalState::STOPPED {
        LogicalState::PLAYING
    } else {
        state
    }
}

fn failed(what: &str, err: &RemoteError) -> LogicalState {
    warn!("{what} failed: {err}");
    LogicalState::ERROR
}
