// Log consumer - drains producer rings, formats, and writes sinks

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::format::{render, FormatOptions};
use crate::level::Level;
use crate::record::Record;
use crate::sink::{FileSink, LogSink, StdoutSink};
use crate::Shared;

/// Consumer states
pub(crate) const RUNNING: u8 = 0;
pub(crate) const STOPPING: u8 = 1;
pub(crate) const DRAINED: u8 = 2;

/// Upper bound on records gathered per round
pub(crate) const BATCH_SIZE: usize = 16_384;

/// Chunking for the shutdown drain
const FINAL_DRAIN_CHUNK: usize = 4_096;

/// Idle sleep when some ring was nearly full last round
const SHORT_IDLE: Duration = Duration::from_micros(10);

/// Idle sleep when every ring was empty
const LONG_IDLE: Duration = Duration::from_micros(100);

/// The single background drain task.
///
/// Owns both sinks outright; producers never touch file or terminal I/O.
/// Runs until the shared state moves to `Stopping`, then performs a final
/// drain of every visible ring, flushes, and marks itself `Drained`.
pub(crate) struct Consumer {
    shared: Arc<Shared>,
    file: Option<FileSink>,
    console: Option<Box<dyn LogSink>>,
    batch: Vec<Record>,
    line_buf: Vec<u8>,
    console_buf: Vec<u8>,
    file_degraded: bool,
}

impl Consumer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            file: None,
            console: None,
            batch: Vec::with_capacity(BATCH_SIZE),
            line_buf: Vec::with_capacity(256),
            console_buf: Vec::with_capacity(64 * 1024),
            file_degraded: false,
        }
    }

    /// Test hook: replace the lazily created stdout sink with a capture sink.
    #[cfg(test)]
    pub(crate) fn with_console(shared: Arc<Shared>, console: Box<dyn LogSink>) -> Self {
        let mut consumer = Self::new(shared);
        consumer.console = Some(console);
        consumer
    }

    /// Main loop; runs on the dedicated consumer thread until drained.
    pub(crate) fn run(mut self) {
        loop {
            self.install_sink_update();

            let (drained_any, nearly_full) = self.round();

            if self.shared.state.load(Ordering::Acquire) == STOPPING {
                self.final_drain();
                self.flush_sinks();
                self.shared.state.store(DRAINED, Ordering::Release);
                return;
            }

            if !drained_any {
                std::thread::sleep(if nearly_full { SHORT_IDLE } else { LONG_IDLE });
            }
        }
    }

    /// One round: snapshot the registry, drain each ring up to an equal
    /// share of the batch, then flush whatever was gathered.
    fn round(&mut self) -> (bool, bool) {
        let snapshot = self.shared.registry.snapshot();
        let per_ring_quota = BATCH_SIZE / snapshot.len().max(1);
        let mut nearly_full = false;

        for ring in &snapshot {
            if ring.is_nearly_full() {
                nearly_full = true;
            }

            let mut taken = 0;
            while taken < per_ring_quota && self.batch.len() < BATCH_SIZE {
                match ring.dequeue() {
                    Some(record) => {
                        self.batch.push(record);
                        taken += 1;
                    }
                    None => break,
                }
            }

            // the producer is gone and nothing is left: release the ring
            if !ring.is_active() && ring.is_empty() {
                self.shared.registry.unregister(ring);
            }
        }

        let drained_any = !self.batch.is_empty();
        if drained_any {
            self.flush_batch();
        }
        (drained_any, nearly_full)
    }

    /// Format and write out everything gathered this round.
    ///
    /// File writes go record-by-record so the sink's rotation check runs at
    /// record granularity; console output is written as one buffer per
    /// batch and flushed at least once per batch.
    fn flush_batch(&mut self) {
        let (file_on, console_on, file_opts, console_opts) = {
            let config = self.shared.config.read().unwrap();
            (
                config.file_output,
                config.console_output,
                FormatOptions::from_config(&config, false),
                FormatOptions::from_config(&config, config.use_colors),
            )
        };

        if console_on && self.console.is_none() {
            self.console = Some(Box::new(StdoutSink::new()));
        }

        let mut urgent = false;
        let mut batch = std::mem::take(&mut self.batch);
        for record in batch.drain(..) {
            if matches!(record.level, Level::Error | Level::Fatal) {
                urgent = true;
            }

            if file_on && !self.file_degraded {
                if let Some(file) = self.file.as_mut() {
                    self.line_buf.clear();
                    render(&record, &file_opts, &mut self.line_buf);
                    if let Err(e) = file.write(&self.line_buf) {
                        report_write_failure(e);
                        self.file_degraded = true;
                    }
                }
            }

            if console_on && self.console.is_some() {
                render(&record, &console_opts, &mut self.console_buf);
            }
        }
        self.batch = batch;

        if self.file_degraded {
            // disabled for the remainder of the process
            self.file = None;
        } else if let Some(file) = self.file.as_mut() {
            let result = if urgent {
                file.flush()
            } else {
                file.flush_buffer()
            };
            if let Err(e) = result {
                report_write_failure(e);
                self.file_degraded = true;
                self.file = None;
            }
        }

        if !self.console_buf.is_empty() {
            if let Some(console) = self.console.as_mut() {
                let _ = console.write(&self.console_buf);
                let _ = console.flush();
            }
            self.console_buf.clear();
        }
    }

    /// Shutdown drain: empty every ring visible in one last snapshot,
    /// flushing in bounded chunks. Rings unregistered since the stop signal
    /// are still drained through the snapshot's strong references.
    fn final_drain(&mut self) {
        let snapshot = self.shared.registry.snapshot();
        loop {
            let mut drained_any = false;
            for ring in &snapshot {
                while let Some(record) = ring.dequeue() {
                    self.batch.push(record);
                    drained_any = true;
                    if self.batch.len() >= FINAL_DRAIN_CHUNK {
                        self.flush_batch();
                    }
                }
            }
            if !self.batch.is_empty() {
                self.flush_batch();
            }
            if !drained_any {
                return;
            }
        }
    }

    fn flush_sinks(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        if let Some(console) = self.console.as_mut() {
            let _ = console.flush();
        }
    }

    /// Install a file sink handed over by `initialize`/`configure`. Keeps
    /// the file handle owned by this thread at all times.
    fn install_sink_update(&mut self) {
        let update = self.shared.sink_update.lock().unwrap().take();
        if let Some(new_sink) = update {
            if let Some(mut old) = self.file.take() {
                let _ = old.flush();
            }
            self.file = new_sink;
            self.file_degraded = false;
        }
    }
}

fn report_write_failure(source: std::io::Error) {
    eprintln!("rapidlog: {}", Error::FileWrite { source });
}
