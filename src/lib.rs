// SPDX-License-Identifier: Apache-2.0 OR MIT

//! High-throughput asynchronous logging backend.
//!
//! Producer threads submit records through the `log_*!` macros (or
//! [`Logger::log`]); each producer gets its own lock-free SPSC ring buffer,
//! so submission never takes a lock and never blocks on I/O. A single
//! background consumer thread drains all rings in rounds, formats records,
//! and writes them to a size-rotated log file and/or the terminal.
//!
//! The pipeline guarantees per-producer FIFO ordering, bounded memory, and a
//! full drain of every submitted record when [`destroy_instance`] returns.
//! Across producers, the merged stream follows the consumer's round-robin
//! sampling order rather than global timestamp order.
//!
//! ```no_run
//! use rapidlog::{log_info, Config};
//!
//! rapidlog::initialize(Config::default()).expect("logger init");
//! rapidlog::set_module_name("Net");
//! log_info!("listener ready on port {}", 4000);
//! rapidlog::destroy_instance();
//! ```

mod config;
mod consumer;
mod error;
mod format;
mod level;
#[macro_use]
mod macros;
mod producer;
mod record;
mod registry;
mod ring;
mod sink;

pub use config::Config;
pub use error::{Error, Result};
pub use level::Level;
pub use record::{Context, Record, SourceLocation};

use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::thread::JoinHandle;

use consumer::Consumer;
use registry::Registry;
use sink::FileSink;

/// State shared between the public handle, the producers, and the consumer
/// thread.
pub(crate) struct Shared {
    /// Full configuration; read briefly per consumer batch, written by
    /// `configure`/`set_log_level`
    pub(crate) config: RwLock<Config>,
    /// Mirror of `config.min_level` for the lock-free submission fast path
    pub(crate) min_level: AtomicU8,
    pub(crate) registry: Arc<Registry>,
    /// Consumer lifecycle: Running -> Stopping -> Drained
    pub(crate) state: AtomicU8,
    /// Handoff slot for a freshly opened file sink (or `Some(None)` to
    /// disable file output); the consumer installs it at its next round so
    /// the file handle never leaves that thread
    pub(crate) sink_update: Mutex<Option<Option<FileSink>>>,
}

impl Shared {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            min_level: AtomicU8::new(config.min_level.as_u8()),
            registry: Arc::new(Registry::new()),
            state: AtomicU8::new(consumer::RUNNING),
            sink_update: Mutex::new(None),
            config: RwLock::new(config),
        }
    }
}

/// Handle to the process-wide logging pipeline.
///
/// Obtained from [`get_instance`] after [`initialize`]; all methods are safe
/// to call from any thread.
pub struct Logger {
    shared: Arc<Shared>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

static INSTANCE: OnceLock<Logger> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// Initialize the process-wide logger and spawn the consumer thread.
///
/// Idempotent: only the first call takes effect, later calls return `Ok`
/// without touching the existing instance.
pub fn initialize(config: Config) -> Result<()> {
    let _guard = INIT.lock().unwrap();
    if INSTANCE.get().is_some() {
        return Ok(());
    }

    let shared = Arc::new(Shared::new(config));

    let file = {
        let config = shared.config.read().unwrap();
        if config.file_output {
            Some(FileSink::open(&config)?)
        } else {
            None
        }
    };
    *shared.sink_update.lock().unwrap() = Some(file);

    let consumer = Consumer::new(Arc::clone(&shared));
    let handle = std::thread::Builder::new()
        .name("log-consumer".to_string())
        .spawn(move || consumer.run())
        .map_err(|e| Error::ConsumerSpawn { source: e })?;

    let _ = INSTANCE.set(Logger {
        shared,
        consumer: Mutex::new(Some(handle)),
    });

    if let Some(logger) = INSTANCE.get() {
        logger.log(crate::source_loc!(), Level::Info, "Logger initialized");
    }
    Ok(())
}

/// Get the process-wide logger.
///
/// Fails with [`Error::NotInitialized`] before [`initialize`].
pub fn get_instance() -> Result<&'static Logger> {
    INSTANCE.get().ok_or(Error::NotInitialized)
}

/// Stop the consumer: drains every ring, flushes and closes the sinks, and
/// joins the consumer thread. Idempotent; errors during teardown are
/// swallowed. Quiesce producers first - submissions after this returns are
/// a usage error and go nowhere.
pub fn destroy_instance() {
    if let Some(logger) = INSTANCE.get() {
        logger.shutdown();
    }
}

/// Set the module name attached to records from the calling thread.
pub fn set_module_name(name: &str) {
    producer::set_module_name(name);
}

impl Logger {
    /// Submit one pre-rendered message. The fast path: below `min_level`
    /// this returns immediately without allocating.
    pub fn log(&self, loc: SourceLocation, level: Level, message: impl Into<String>) {
        if !self.level_enabled(level) {
            return;
        }
        producer::submit(&self.shared.registry, loc, level, message.into());
    }

    /// True when records at `level` pass the current filter.
    #[inline]
    pub fn level_enabled(&self, level: Level) -> bool {
        level.as_u8() >= self.shared.min_level.load(Ordering::Relaxed)
    }

    /// Replace the configuration. Reopens the log file when file output or
    /// a path-affecting field changed; the old configuration stays in place
    /// if the new file cannot be opened.
    pub fn configure(&self, config: Config) -> Result<()> {
        let mut current = self.shared.config.write().unwrap();

        if current.sink_changed(&config) {
            let sink = if config.file_output {
                Some(FileSink::open(&config)?)
            } else {
                None
            };
            *self.shared.sink_update.lock().unwrap() = Some(sink);
        }

        self.shared
            .min_level
            .store(config.min_level.as_u8(), Ordering::Relaxed);
        *current = config;
        Ok(())
    }

    /// Change the minimum level without touching the rest of the config.
    pub fn set_log_level(&self, level: Level) {
        let mut config = self.shared.config.write().unwrap();
        config.min_level = level;
        self.shared.min_level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Dump a per-producer table (submitted and queued record counts) to
    /// the process output stream.
    pub fn print_stats(&self) {
        let snapshot = self.shared.registry.snapshot();
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        let _ = writeln!(
            out,
            "{:<10} {:<16} {:>12} {:>10}",
            "producer", "module", "submitted", "queued"
        );
        let mut total = 0u64;
        for ring in &snapshot {
            total += ring.submitted();
            let _ = writeln!(
                out,
                "{:<10} {:<16} {:>12} {:>10}",
                format!("T-{}", ring.thread_id()),
                ring.label(),
                ring.submitted(),
                ring.len()
            );
        }
        let _ = writeln!(
            out,
            "total: {} submitted across {} producer(s)",
            total,
            snapshot.len()
        );
        let _ = out.flush();
    }

    fn shutdown(&self) {
        self.shared
            .state
            .store(consumer::STOPPING, Ordering::Release);
        let handle = self.consumer.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}
