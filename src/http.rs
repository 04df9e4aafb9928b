use crate::machine::ButtonStateMachine;
use crate::state::{ButtonId, LogicalState};
use axum::extract::{Query, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Paths that simulate a button press.
pub const PRESS_PATHS: [&str; 4] = ["/blue", "/red", "/green", "/nothing"];

#[derive(Clone)]
struct AppState {
    machine: Arc<ButtonStateMachine>,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

/// Build the status/OAuth/press router. `callback_path` is where the OAuth
/// redirect lands.
pub fn router(machine: Arc<ButtonStateMachine>, callback_path: &str) -> Router {
    Router::new()
        .route("/", get(status))
        .route(callback_path, get(callback))
        .route("/blue", get(press_blue))
        .route("/red", get(press_red))
        .route("/green", get(press_green))
        .route("/nothing", get(press_nothing))
        .fallback(not_found)
        .layer(middleware::from_fn(only_get))
        .with_state(AppState { machine })
}

/// Serve `app` on `listener` until `cancel` fires.
///
/// # Errors
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("status page on http://{addr}/");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn only_get(request: Request, next: Next) -> Response {
    if request.method() == Method::GET {
        next.run(request).await
    } else {
        not_found().await.into_response()
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<html><body>Not found</body></html>"))
}

fn found() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

async fn status(State(app): State<AppState>) -> Html<String> {
    let remote = app.machine.remote();
    let login = match remote.authenticate(None).await {
        Ok(()) => None,
        Err(e) => {
            warn!("authentication error: {e}");
            Some(remote.authorize_url().await)
        }
    };

    let state = app.machine.on_accept(ButtonId::None).await;
    Html(status_page(state, login.as_deref()))
}

async fn callback(
    State(app): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match params.code.as_deref() {
        Some(code) => match app.machine.remote().authenticate(Some(code)).await {
            Ok(()) => info!("authorization complete"),
            Err(e) => warn!("authorization failed: {e}"),
        },
        None => warn!("OAuth callback without a code"),
    }
    found()
}

async fn press(app: &AppState, button: ButtonId) -> Response {
    app.machine.on_accept(button).await;
    found()
}

async fn press_blue(State(app): State<AppState>) -> Response {
    press(&app, ButtonId::Blue).await
}

async fn press_red(State(app): State<AppState>) -> Response {
    press(&app, ButtonId::Red).await
}

async fn press_green(State(app): State<AppState>) -> Response {
    press(&app, ButtonId::Green).await
}

async fn press_nothing(State(app): State<AppState>) -> Response {
    press(&app, ButtonId::None).await
}

/// Render the status page. `login` is the authorize URL when the token is
/// unusable.
#[must_use]
pub fn status_page(state: LogicalState, login: Option<&str>) -> String {
    let text = match login {
        None => format!("Authentication token is ok ({state})"),
        Some(url) => format!(
            "Authentication token must be renewed, \
             <a href=\"{}\">click here to log in</a> ({state})",
            escape_attr(url)
        ),
    };
    format!("<html><body>{text}</body></html>")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
