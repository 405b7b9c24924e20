//! Notification fan-out: the dispatcher, the service contract and the
//! built-in services.

pub mod builder;
pub mod context;
pub mod discord;
pub mod dispatcher;
pub mod error;
pub mod ntfy;
pub mod service;
pub mod slack;
pub mod telegram;
pub mod webhook;

use std::sync::{Arc, LazyLock};

pub use builder::{build_dispatcher, build_services};
pub use context::Context;
pub use dispatcher::{DispatchOption, Dispatcher};
pub use error::NotifyError;
pub use service::{Notifier, WebhookUrl, deliver_each, render_message};

static DEFAULT_DISPATCHER: LazyLock<Dispatcher> = LazyLock::new(Dispatcher::new);

/// The process-wide dispatcher used by [`send`] and [`use_services`].
///
/// Created enabled and empty on first access.
pub fn default_dispatcher() -> &'static Dispatcher {
    &DEFAULT_DISPATCHER
}

/// Registers services on the process-wide dispatcher.
pub fn use_services<I>(services: I) -> &'static Dispatcher
where
    I: IntoIterator<Item = Arc<dyn Notifier>>,
{
    default_dispatcher().use_services(services)
}

/// Sends through the process-wide dispatcher.
pub async fn send(ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
    default_dispatcher().send(ctx, subject, message).await
}
