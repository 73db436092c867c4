// Logger lifecycle: shared core, background worker, global singleton

use crate::config::{Config, ConfigError};
use crate::consumer::{Consumer, LogSink, StdoutSink};
use crate::producer::{ProducerHandle, ProducerList};
use crate::registry::FormatRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Errors from installing the global logger
#[derive(Error, Debug)]
pub enum InitError {
    #[error("global logger already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// State shared between producers, the consumer and the logger facade.
#[derive(Debug)]
pub(crate) struct Core {
    pub(crate) formats: FormatRegistry,
    pub(crate) producers: ProducerList,
    pub(crate) done: AtomicBool,
    pub(crate) config: Config,
}

impl Core {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            formats: FormatRegistry::new(config.registry_capacity),
            producers: ProducerList::new(),
            done: AtomicBool::new(false),
            config,
        }
    }

    pub(crate) fn handle(self: &Arc<Self>) -> ProducerHandle {
        let node = self.producers.push(self.config.ring_capacity);
        ProducerHandle::new(node, Arc::clone(self))
    }
}

/// The asynchronous logger.
///
/// Construction spawns the single consumer thread. Producers hand
/// records over through per-thread SPSC rings; the consumer renders them
/// and writes the sink. Most programs use the process-wide instance
/// through the logging macros and never touch this type directly.
#[derive(Debug)]
pub struct Logger {
    core: Arc<Core>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Logger {
    /// Create a logger writing to stdout.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_sink(config, Box::new(StdoutSink::new()))
    }

    /// Create a logger with a caller-supplied sink.
    ///
    /// The sink is fixed for the life of the logger; it cannot be
    /// swapped while the consumer is running.
    pub fn with_sink(config: Config, sink: Box<dyn LogSink>) -> Result<Self, ConfigError> {
        config.validate()?;
        let core = Arc::new(Core::new(config));
        let consumer = Consumer::new(Arc::clone(&core), sink);
        let worker = thread::spawn(move || consumer.run());
        Ok(Self {
            core,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Register a producer ring for the calling thread.
    pub fn handle(&self) -> ProducerHandle {
        self.core.handle()
    }

    /// Register a format literal under its identifier.
    ///
    /// # Panics
    /// A full registry or an id collision between different literals is
    /// a configuration bug; both abort with a diagnostic.
    pub(crate) fn intern(&self, id: u32, literal: &'static str) {
        if let Err(err) = self.core.formats.register(id, literal) {
            panic!("hotlog: fatal format registration failure: {err}");
        }
    }

    /// Total records dropped under the Drop policy, across all producers.
    pub fn dropped(&self) -> u64 {
        self.core
            .producers
            .iter()
            .map(|node| node.dropped.load(Ordering::Relaxed))
            .sum()
    }

    /// Stop the consumer after it drains every ring.
    ///
    /// Idempotent. When it returns, every record enqueued before the
    /// call has been written to the sink and the worker thread is gone.
    /// Records logged after shutdown accumulate in their rings until the
    /// drop policy rejects them.
    pub fn shutdown(&self) {
        self.core.done.store(true, Ordering::Release);
        if let Ok(mut worker) = self.worker.lock() {
            // Joining under the lock makes concurrent shutdown() calls
            // block until the drain completes.
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install the global logger with an explicit configuration.
pub fn init(config: Config) -> Result<(), InitError> {
    init_with_sink(config, Box::new(StdoutSink::new()))
}

/// Install the global logger with an explicit configuration and sink.
///
/// Fails if the global logger already exists, including the lazily
/// created default one.
pub fn init_with_sink(config: Config, sink: Box<dyn LogSink>) -> Result<(), InitError> {
    let logger = Logger::with_sink(config, sink)?;
    GLOBAL.set(logger).map_err(|rejected| {
        // Stop the worker the losing logger already spawned.
        rejected.shutdown();
        InitError::AlreadyInitialized
    })
}

/// The process-wide logger, created with defaults on first use.
pub(crate) fn global() -> &'static Logger {
    GLOBAL.get_or_init(|| Logger::new(Config::default()).expect("default configuration is valid"))
}

/// Drain and stop the global logger. Idempotent; a no-op when no global
/// logger was ever created.
pub fn shutdown() {
    if let Some(logger) = GLOBAL.get() {
        logger.shutdown();
    }
}

/// Total records the global logger has dropped.
pub fn dropped() -> u64 {
    GLOBAL.get().map_or(0, Logger::dropped)
}

/// Macro entry point: one-time format registration for a call site.
#[doc(hidden)]
pub fn register_call_site(id: u32, literal: &'static str) {
    global().intern(id, literal);
}
