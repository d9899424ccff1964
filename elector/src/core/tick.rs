//! tick emitter emits a `Tick` event at a fixed interval.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tracing::info;
use tracing::Instrument;
use tracing::Level;
use tracing::Span;

use crate::core::io::notification::Notification;

/// Emit Notification::Tick event at regular `interval`.
pub(crate) struct Tick {
    interval: Duration,

    tx: mpsc::UnboundedSender<Notification>,
}

pub(crate) struct TickHandle {
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for TickHandle {
    /// Signal the tick loop to stop.
    fn drop(&mut self) {
        if self.shutdown().is_some() {
            info!("Tick is shut down on drop");
        }
    }
}

impl Tick {
    pub(crate) fn spawn(
        interval: Duration,
        tx: mpsc::UnboundedSender<Notification>,
    ) -> TickHandle {
        let (shutdown, shutdown_rx) = oneshot::channel();

        let this = Self { interval, tx };

        let join_handle = tokio::spawn(
            this.tick_loop(shutdown_rx)
                .instrument(tracing::span!(parent: &Span::current(), Level::DEBUG, "tick")),
        );

        TickHandle {
            shutdown: Mutex::new(Some(shutdown)),
            join_handle: Mutex::new(Some(join_handle)),
        }
    }

    pub(crate) async fn tick_loop(self, mut cancel_rx: oneshot::Receiver<()>) {
        let mut i = 0;

        loop {
            let at = Instant::now() + self.interval;

            tokio::select! {
                _ = sleep_until(at) => {}
                _ = &mut cancel_rx => {
                    info!("TickLoop received cancel signal, quit");
                    return;
                }
            }

            i += 1;

            let send_res = self.tx.send(Notification::Tick { i });
            if let Err(_e) = send_res {
                info!("Stopping tick_loop(), main loop terminated");
                break;
            } else {
                tracing::debug!("Tick sent: {}", i)
            }
        }
    }
}

impl TickHandle {
    /// Stop the tick loop and return its join handle, or `None` if it has
    /// already been stopped.
    pub(crate) fn shutdown(&self) -> Option<JoinHandle<()>> {
        let shutdown = {
            let mut x = self.shutdown.lock().unwrap_or_else(|e| e.into_inner());
            x.take()
        };

        let shutdown = shutdown?;
        let _ = shutdown.send(());

        let mut jh = self.join_handle.lock().unwrap_or_else(|e| e.into_inner());
        jh.take()
    }
}
