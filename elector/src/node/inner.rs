use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::trace;
use tracing::Level;

use crate::config::RuntimeConfig;
use crate::core::core_state::CoreState;
use crate::core::io::api_message::APIMessage;
use crate::dispatch::Dispatcher;
use crate::errors::Fatal;
use crate::errors::Infallible;
use crate::Config;
use crate::Metrics;
use crate::NodeId;

/// NodeInner is the internal handle and provides internally used APIs to
/// communicate with `Core`.
pub(crate) struct NodeInner {
    pub(in crate::node) id: NodeId,
    pub(in crate::node) config: Arc<Config>,
    pub(in crate::node) runtime_config: Arc<RuntimeConfig>,
    pub(in crate::node) dispatcher: Dispatcher,
    pub(in crate::node) tx_api: mpsc::UnboundedSender<APIMessage>,
    pub(in crate::node) rx_metrics: watch::Receiver<Metrics>,
    pub(in crate::node) core_state: std::sync::Mutex<CoreState>,
}

impl NodeInner {
    /// Send a [`APIMessage`] to Core
    pub(crate) async fn send_msg(&self, mes: APIMessage) -> Result<(), Fatal> {
        let send_res = self.tx_api.send(mes);

        if let Err(e) = send_res {
            let fatal = self
                .get_core_stopped_error(
                    "sending APIMessage to Core",
                    Some(e.0.to_string()),
                )
                .await;
            return Err(fatal);
        }
        Ok(())
    }

    /// Invoke Core by sending a [`APIMessage`] and blocks waiting for response.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) async fn call_core<T>(
        &self,
        mes: APIMessage,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, Fatal> {
        let sum = if tracing::enabled!(Level::DEBUG) {
            Some(mes.to_string())
        } else {
            None
        };

        self.send_msg(mes).await?;

        let recv_res = rx.await;
        trace!(
            "id={} call_core receives result is error: {:?}",
            self.id,
            recv_res.is_err()
        );

        match recv_res {
            Ok(x) => Ok(x),
            Err(_) => {
                let fatal = self
                    .get_core_stopped_error("receiving rx from Core", sum)
                    .await;
                tracing::error!(error = debug(&fatal), "core_call fatal error");
                Err(fatal)
            }
        }
    }

    pub(in crate::node) fn is_core_running(&self) -> bool {
        let state = self.core_state.lock().unwrap();
        state.is_running()
    }

    /// Get the error that caused Core to stop.
    pub(in crate::node) async fn get_core_stopped_error(
        &self,
        when: impl fmt::Display,
        message_summary: Option<impl fmt::Display + Default>,
    ) -> Fatal {
        let core_res = self.join_core_task().await;

        tracing::info!(
            core_result = debug(&core_res),
            "Core stopped: {}; message: {}",
            when,
            message_summary.unwrap_or_default()
        );

        core_res
    }

    /// Wait for `Core` task to finish, record the returned value from the
    /// task and return the error it quit with.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(in crate::node) async fn join_core_task(&self) -> Fatal {
        // Get the Running state of Core,
        // or an error if Core has been in Joining state.
        let running_res = {
            let mut state = self.core_state.lock().unwrap();

            match &*state {
                CoreState::Running(_) => {
                    let (tx, rx) = watch::channel::<bool>(false);

                    let prev =
                        std::mem::replace(&mut *state, CoreState::Joining(rx));

                    let CoreState::Running(join_handle) = prev else {
                        unreachable!()
                    };

                    Ok((join_handle, tx))
                }
                CoreState::Joining(watch_rx) => Err(watch_rx.clone()),
                CoreState::Done(res) => {
                    // Core has already finished exiting, nothing to do
                    return Self::stopped_error(res);
                }
            }
        };

        match running_res {
            Ok((join_handle, tx)) => {
                let join_res = join_handle.await;

                tracing::info!(res = debug(&join_res), "Core exited");

                let core_task_res = match join_res {
                    Err(err) => {
                        if err.is_panic() {
                            Err(Fatal::Panicked)
                        } else {
                            Err(Fatal::Stopped)
                        }
                    }
                    Ok(returned_res) => returned_res,
                };

                let fatal = Self::stopped_error(&core_task_res);
                {
                    let mut state = self.core_state.lock().unwrap();
                    *state = CoreState::Done(core_task_res);
                }
                tx.send(true).ok();
                fatal
            }
            Err(mut rx) => {
                // Other task is waiting for the core to finish.
                loop {
                    let res = rx.changed().await;
                    if res.is_err() {
                        break;
                    }
                    if *rx.borrow() {
                        break;
                    }
                }

                let state = self.core_state.lock().unwrap();
                match &*state {
                    CoreState::Done(res) => Self::stopped_error(res),
                    _ => Fatal::Stopped,
                }
            }
        }
    }

    fn stopped_error(res: &Result<Infallible, Fatal>) -> Fatal {
        match res {
            Ok(infallible) => match *infallible {},
            Err(fatal) => fatal.clone(),
        }
    }
}
