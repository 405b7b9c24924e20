pub mod config;
pub mod notify;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

pub use notify::{
    Context, DispatchOption, Dispatcher, Notifier, NotifyError, default_dispatcher, send,
    use_services,
};
