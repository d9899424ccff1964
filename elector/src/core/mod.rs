//! The `Core` is the single task that owns a node's election state.
//!
//! Request handlers, timers and vote collectors never touch the state. They
//! send an `APIMessage` or a `Notification` to `Core` and it applies them one
//! by one.

#[allow(clippy::module_inception)]
pub(crate) mod core;
pub(crate) mod core_state;
pub(crate) mod io;
pub(crate) mod roles;
mod tick;

pub(crate) use self::core::Core;
pub(crate) use tick::Tick;
pub(crate) use tick::TickHandle;
