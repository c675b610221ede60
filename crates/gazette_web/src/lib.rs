//! HTTP surface for Gazette: the news site, the notes site and the shared
//! users pages, rendered from embedded templates.

pub mod error;
mod middleware;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{WebError, WebResult};
pub use routes::app_router;
pub use session::SESSION_COOKIE;
pub use state::{AppKind, AppState};

use log::info;
use tokio::net::TcpListener;

/// Serves `state` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let kind = state.kind();
    info!(
        "event=server_start module=web status=ok app={kind} addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("event=server_stop module=web status=ok app={kind}");
    Ok(())
}
