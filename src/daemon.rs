use crate::animator::PeriodicAnimator;
use crate::config::schema::AppConfig;
use crate::device::gpio::RpiHardware;
use crate::error::Result;
use crate::event::EdgeEvent;
use crate::http;
use crate::machine::ButtonStateMachine;
use crate::notify::{Notify, UdpNotifier};
use crate::remote::spotify::SpotifyClient;
use crate::remote::RemoteConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Run the buttond daemon.
///
/// # Errors
/// Returns `ButtonError` if the GPIO backend, the Spotify client, the UDP
/// socket or the HTTP listener cannot be set up.
pub async fn run(config: AppConfig) -> Result<()> {
    let cancel = CancellationToken::new();
    let (edge_tx, mut edge_rx) = mpsc::unbounded_channel::<EdgeEvent>();

    let hardware = RpiHardware::open(&config.gpio, edge_tx)?;
    let remote = Arc::new(RemoteConnection::new(Box::new(SpotifyClient::new(
        &config.spotify,
    )?)));
    let notifier: Arc<dyn Notify> = Arc::new(UdpNotifier::bind(&config.notify).await?);
    let listener = TcpListener::bind((config.http.bind.as_str(), config.http.port)).await?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let machine = Arc::new(ButtonStateMachine::new(
        Box::new(hardware),
        remote,
        notifier,
        config.timing.debounce_us,
    ));
    machine.announce("booted").await;

    let animator_handle = spawn_animator(&machine, &config, &cancel);
    let http_handle = spawn_http_server(&machine, &config, listener, &cancel);
    let presses = TaskTracker::new();

    info!("buttond running, notifying {}", config.notify.target());

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = async { tokio::signal::ctrl_c().await.ok(); } => {
                info!("received SIGINT, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            edge = edge_rx.recv() => {
                match edge {
                    Some(edge) => handle_edge(&machine, &presses, edge).await,
                    None => break,
                }
            }
        }
    }

    info!("daemon shutting down...");
    cancel.cancel();
    wind_down(&machine, &presses, [animator_handle, http_handle], SHUTDOWN_GRACE).await;
    info!("daemon stopped");
    Ok(())
}

fn spawn_animator(
    machine: &Arc<ButtonStateMachine>,
    config: &AppConfig,
    cancel: &CancellationToken,
) -> JoinHandle<()> {
    let animator = PeriodicAnimator::new(Arc::clone(machine), &config.timing);
    tokio::spawn(animator.run(cancel.clone()))
}

fn spawn_http_server(
    machine: &Arc<ButtonStateMachine>,
    config: &AppConfig,
    listener: TcpListener,
    cancel: &CancellationToken,
) -> JoinHandle<()> {
    let app = http::router(Arc::clone(machine), &config.spotify.callback_path());
    let server_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = http::serve(listener, app, server_cancel.clone()).await {
            error!("HTTP server error: {e}");
            server_cancel.cancel();
        }
    })
}

/// Debounce in arrival order, then act on the press in its own task so a
/// slow remote call never holds up the next edge.
async fn handle_edge(machine: &Arc<ButtonStateMachine>, presses: &TaskTracker, edge: EdgeEvent) {
    if let Some(button) = machine.intake(edge).await {
        let machine = Arc::clone(machine);
        presses.spawn(async move {
            machine.on_accept(button).await;
        });
    }
}

/// Wait up to `grace` for the background tasks and any press still talking to
/// the remote, then switch the LED off.
async fn wind_down<const N: usize>(
    machine: &ButtonStateMachine,
    presses: &TaskTracker,
    tasks: [JoinHandle<()>; N],
    grace: Duration,
) {
    presses.close();
    let drained = tokio::time::timeout(grace, async {
        for task in tasks {
            let _ = task.await;
        }
        presses.wait().await;
    })
    .await;
    if drained.is_err() {
        warn!("{} press(es) still in flight after {grace:?}", presses.len());
    }

    machine.lights_out().await;
}
