pub mod tracing;

pub use tracing::{TracingConfig, TracingError, TracingGuard, init_global_tracing, init_tracing};
