use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    #[error("failed to send message to {channel} receiver '{receiver}': {message}")]
    Delivery {
        channel: &'static str,
        receiver: String,
        message: String,
    },
    #[error("send notification: service '{service}' (#{position}) failed: {source}")]
    Service {
        service: String,
        position: usize,
        #[source]
        source: Box<NotifyError>,
    },
    #[error("Failed to construct {channel} service: {message}")]
    Construction {
        channel: &'static str,
        message: String,
    },
    #[error("Notification configuration error: {message}")]
    ConfigError { message: String },
}

impl NotifyError {
    /// True when the error came from the send context rather than a service.
    pub fn is_cancellation(&self) -> bool {
        match self {
            NotifyError::Cancelled | NotifyError::DeadlineExceeded => true,
            NotifyError::Service { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }

    pub fn is_delivery(&self) -> bool {
        match self {
            NotifyError::Delivery { .. } => true,
            NotifyError::Service { source, .. } => source.is_delivery(),
            _ => false,
        }
    }

    /// Name of the outermost service that failed, if the error was raised by a dispatcher.
    pub fn failed_service(&self) -> Option<&str> {
        match self {
            NotifyError::Service { service, .. } => Some(service.as_str()),
            _ => None,
        }
    }
}
