//! Supervision of the relay's long-running tasks.
//!
//! The relay runs a small, fixed set of [`Component`]s: the console channel
//! and the Ctrl-C watcher. They share one [`CancellationToken`], and the
//! relay lives exactly as long as all of them do: the first component to
//! finish, cleanly or not, cancels the token and the others wind down.
//! [`RelayHandle::join`] reports the first error, if there was one.

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::AppError;

/// Owned future returned by [`Component::run`].
pub type ComponentFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// An independently runnable unit, e.g. a console channel.
pub trait Component: Send + 'static {
    /// Used in log lines.
    fn id(&self) -> &str;

    /// Run until `shutdown` is cancelled or the work runs out.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

// ── CtrlCWatcher ─────────────────────────────────────────────────────────────

/// Ends the relay on Ctrl-C. Exits quietly once something else has.
pub struct CtrlCWatcher;

impl Component for CtrlCWatcher {
    fn id(&self) -> &str {
        "ctrl-c"
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(async move {
            tokio::select! {
                _ = shutdown.cancelled() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    signal.map_err(|e| AppError::Comms(format!("cannot listen for ctrl-c: {e}")))?;
                    info!("ctrl-c received, initiating shutdown");
                    Ok(())
                }
            }
        })
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

pub struct RelayHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl RelayHandle {
    /// Wait until every component has exited.
    pub async fn join(self) -> Result<(), AppError> {
        self.inner
            .await
            .map_err(|e| AppError::Comms(format!("relay supervisor panicked: {e}")))?
    }
}

/// Spawn every component on its own task under one shutdown token.
pub fn spawn_components(
    components: Vec<Box<dyn Component>>,
    shutdown: CancellationToken,
) -> RelayHandle {
    let inner = tokio::spawn(async move {
        let mut set = JoinSet::new();
        for component in components {
            let id = component.id().to_string();
            debug!(component = %id, "spawning component");
            let run = component.run(shutdown.clone());
            set.spawn(async move { (id, run.await) });
        }

        let mut first_err: Option<AppError> = None;
        while let Some(joined) = set.join_next().await {
            if !shutdown.is_cancelled() {
                shutdown.cancel();
            }
            match joined {
                Ok((id, Ok(()))) => debug!(component = %id, "component finished"),
                Ok((id, Err(e))) => {
                    error!(component = %id, error = %e, "component failed");
                    first_err.get_or_insert(e);
                }
                Err(e) => {
                    error!("component panicked: {e}");
                    first_err.get_or_insert_with(|| AppError::Comms(format!("component panicked: {e}")));
                }
            }
        }

        first_err.map_or(Ok(()), Err)
    });

    RelayHandle { inner }
}
