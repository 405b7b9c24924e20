//! Subscriber setup for applications embedding herald.
//!
//! Events go to stderr, to `herald.log` in the state directory, or both. Each
//! destination gets one `fmt` layer, plain or JSON, and the layers share a
//! single `EnvFilter`.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::paths::{PathError, Paths};
use crate::config::schema::LoggingConfig;

const LOG_FILE_NAME: &str = "herald.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    pub log_to_file: bool,
    pub log_to_stderr: bool,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_to_file: false,
            log_to_stderr: true,
            json_format: false,
        }
    }
}

impl TracingConfig {
    /// Unknown level names fall back to info; `validate_config` reports them.
    pub fn from_logging(logging: &LoggingConfig) -> Self {
        let level = Level::from_str(logging.level.trim()).unwrap_or(Level::INFO);
        Self {
            level,
            log_to_file: logging.log_file,
            log_to_stderr: true,
            json_format: logging.json,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize state directory: {0}")]
    StateDir(#[from] PathError),

    #[error("Failed to open log file {path}: {source}")]
    LogFileOpen { path: PathBuf, source: io::Error },

    #[error("A global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Keeps the subscriber installed and flushes the log file when dropped.
///
/// For a global subscriber dropping the guard only flushes; the subscriber
/// stays in place for the rest of the process.
#[derive(Debug)]
pub struct TracingGuard {
    _default_guard: Option<DefaultGuard>,
    file: Option<SharedFile>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

#[derive(Debug, Clone)]
struct SharedFile(Arc<Mutex<File>>);

impl SharedFile {
    fn open_in_state_dir() -> Result<Self, TracingError> {
        let path = Paths::ensure_state_dir()?.join(LOG_FILE_NAME);
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TracingError::LogFileOpen { path, source })?;
        Ok(Self(Arc::new(Mutex::new(file))))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, File> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl io::Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Installs a subscriber for the current thread until the guard is dropped.
///
/// Events emitted on other threads, including other tokio worker threads, are
/// not captured. Use [`init_global_tracing`] when the whole process should log.
pub fn init_tracing(config: &TracingConfig) -> Result<TracingGuard, TracingError> {
    let (layers, file) = build_layers(config)?;
    let default_guard = tracing_subscriber::registry()
        .with(layers)
        .with(resolve_env_filter(config))
        .set_default();

    Ok(TracingGuard {
        _default_guard: Some(default_guard),
        file,
    })
}

/// Installs the subscriber process-wide. Fails when one is already set.
pub fn init_global_tracing(config: &TracingConfig) -> Result<TracingGuard, TracingError> {
    let (layers, file) = build_layers(config)?;
    tracing_subscriber::registry()
        .with(layers)
        .with(resolve_env_filter(config))
        .try_init()?;

    Ok(TracingGuard {
        _default_guard: None,
        file,
    })
}

fn build_layers(
    config: &TracingConfig,
) -> Result<(Vec<BoxedLayer>, Option<SharedFile>), TracingError> {
    let mut layers = Vec::new();
    if config.log_to_stderr {
        layers.push(fmt_layer(io::stderr, config.json_format, true));
    }

    let file = if config.log_to_file {
        let file = SharedFile::open_in_state_dir()?;
        layers.push(fmt_layer(file.clone(), config.json_format, false));
        Some(file)
    } else {
        None
    };

    Ok((layers, file))
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true);
    if json { layer.json().boxed() } else { layer.boxed() }
}

fn resolve_env_filter(config: &TracingConfig) -> EnvFilter {
    if config.level == Level::DEBUG {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
    }
}
