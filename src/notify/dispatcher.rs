use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::notify::context::Context;
use crate::notify::error::NotifyError;
use crate::notify::service::Notifier;

/// Configuration commands applied in order by [`Dispatcher::with_options`] and
/// [`Dispatcher::configure`]. The last one applied wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOption {
    Enable,
    Disable,
}

/// Fans one notification out to every registered service.
///
/// Services run one after another in registration order. The first failure
/// stops the fan-out and is returned; services after it are never called. A
/// disabled dispatcher accepts every send and does nothing.
pub struct Dispatcher {
    enabled: AtomicBool,
    services: RwLock<Vec<Arc<dyn Notifier>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            services: RwLock::new(Vec::new()),
        }
    }

    /// Builds an enabled dispatcher, then applies `options`. `None` entries are skipped.
    pub fn with_options<I>(options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<DispatchOption>>,
    {
        let dispatcher = Self::new();
        dispatcher.configure(options);
        dispatcher
    }

    pub fn configure<I>(&self, options: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Option<DispatchOption>>,
    {
        for option in options {
            let option: Option<DispatchOption> = option.into();
            match option {
                Some(DispatchOption::Enable) => self.enable(),
                Some(DispatchOption::Disable) => self.disable(),
                None => {}
            }
        }
        self
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Appends services to the fan-out, keeping their order. Duplicates are allowed.
    pub fn use_services<I>(&self, services: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Notifier>>,
    {
        let mut registered = self
            .services
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = registered.len();
        registered.extend(services);
        debug!(
            added = registered.len() - before,
            total = registered.len(),
            "Registered notification services"
        );
        self
    }

    pub fn use_service<N>(&self, service: N) -> &Self
    where
        N: Notifier + 'static,
    {
        self.use_services([Arc::new(service) as Arc<dyn Notifier>])
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn service_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|service| service.name().to_string())
            .collect()
    }

    /// Sends `subject` and `message` to every service, stopping at the first
    /// failure or when `ctx` is cancelled.
    pub async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        if !self.is_enabled() {
            debug!("Dispatcher disabled; notification dropped");
            return Ok(());
        }

        let services = self.snapshot();
        for (index, service) in services.iter().enumerate() {
            let position = index + 1;
            if let Some(err) = ctx.err() {
                debug!(position, error = %err, "Fan-out stopped by context");
                return Err(err);
            }

            if let Err(err) = service.send(ctx, subject, message).await {
                warn!(
                    service = service.name(),
                    position,
                    error = %err,
                    "Notification service send failed"
                );
                if err.is_cancellation() {
                    return Err(err);
                }
                return Err(NotifyError::Service {
                    service: service.name().to_string(),
                    position,
                    source: Box::new(err),
                });
            }
            debug!(service = service.name(), position, "Notification service send succeeded");
        }

        Ok(())
    }

    fn snapshot(&self) -> Vec<Arc<dyn Notifier>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for Dispatcher {
    fn name(&self) -> &str {
        "dispatcher"
    }

    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        Dispatcher::send(self, ctx, subject, message).await
    }
}
