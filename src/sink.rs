// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output sinks: rotating file and terminal

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::Local;

use crate::config::Config;
use crate::error::{Error, Result};

/// Destination for formatted output bytes
pub(crate) trait LogSink: Send {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Terminal sink (process standard output)
pub(crate) struct StdoutSink {
    stdout: io::Stdout,
}

impl StdoutSink {
    pub(crate) fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl LogSink for StdoutSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Append-only rotating file sink.
///
/// Owned exclusively by the consumer thread; rotation and retention run
/// inline with writes so producers never block on file I/O.
#[derive(Debug)]
pub(crate) struct FileSink {
    dir: PathBuf,
    prefix: String,
    max_file_bytes: u64,
    max_files: usize,
    writer: BufWriter<File>,
    current_size: u64,
}

impl FileSink {
    /// Create the log directory if missing and open the active file for
    /// append, seeding `current_size` from its existing length.
    pub(crate) fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.log_dir).map_err(|e| Error::FileOpen {
            path: config.log_dir.clone(),
            source: e,
        })?;

        let path = config.active_file();
        let file = open_append(&path).map_err(|e| Error::FileOpen {
            path: path.clone(),
            source: e,
        })?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            dir: config.log_dir.clone(),
            prefix: config.file_prefix.clone(),
            max_file_bytes: config.max_file_bytes,
            max_files: config.max_files,
            writer: BufWriter::new(file),
            current_size,
        })
    }

    /// Append one formatted record. Rotation is checked per call, so the
    /// active file never grows past `max_file_bytes` by more than one
    /// record.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.current_size += bytes.len() as u64;
        if self.current_size >= self.max_file_bytes {
            self.rotate()?;
        }
        Ok(())
    }

    /// Drain buffered bytes to the OS (once per consumer batch)
    pub(crate) fn flush_buffer(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Drain buffers and force an OS-level flush (shutdown, ERROR/FATAL)
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }

    /// Close the active file under a timestamped name and start a fresh one,
    /// then apply retention.
    fn rotate(&mut self) -> io::Result<()> {
        self.writer.flush()?;

        let active = self.active_path();
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut rotated = self.dir.join(format!("{}_{}.log", self.prefix, stamp));
        // several rotations can land in the same second; never overwrite a
        // historical file
        let mut n = 1;
        while rotated.exists() {
            rotated = self.dir.join(format!("{}_{}_{}.log", self.prefix, stamp, n));
            n += 1;
        }
        fs::rename(&active, &rotated)?;

        self.writer = BufWriter::new(open_append(&active)?);
        self.current_size = 0;

        self.cleanup();
        Ok(())
    }

    /// Delete the oldest matching files so at most `max_files` remain
    fn cleanup(&self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        let mut logs: Vec<(std::time::SystemTime, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let stem = path.file_stem()?.to_str()?;
                if !stem.starts_with(&self.prefix) || path.extension()? != "log" {
                    return None;
                }
                let mtime = entry.metadata().ok()?.modified().ok()?;
                Some((mtime, path))
            })
            .collect();

        // newest first
        logs.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in logs.drain(..).skip(self.max_files) {
            let _ = fs::remove_file(path);
        }
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.prefix))
    }
}

fn open_append(path: &std::path::Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, max_file_bytes: u64, max_files: usize) -> Config {
        Config {
            log_dir: dir.to_path_buf(),
            file_prefix: "test".to_string(),
            max_file_bytes,
            max_files,
            ..Config::default()
        }
    }

    fn matching_files(dir: &std::path::Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|e| e == "log")
                    && p.file_stem()
                        .and_then(|s| s.to_str())
                        .is_some_and(|s| s.starts_with("test"))
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_open_creates_dir_and_file() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let mut sink = FileSink::open(&config(&nested, 1024, 3)).unwrap();
        sink.write(b"hello\n").unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(nested.join("test.log")).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_open_seeds_current_size() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), 1024, 3);
        fs::write(cfg.active_file(), b"previous run\n").unwrap();

        let sink = FileSink::open(&cfg).unwrap();
        assert_eq!(sink.current_size, 13);
    }

    #[test]
    fn test_rotation_resets_size_and_renames() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::open(&config(dir.path(), 32, 5)).unwrap();

        // two writes cross the 32-byte threshold and force one rotation
        sink.write(b"0123456789012345\n").unwrap();
        assert_eq!(sink.current_size, 17);
        sink.write(b"0123456789012345\n").unwrap();
        assert_eq!(sink.current_size, 0);

        let files = matching_files(dir.path());
        assert_eq!(files.len(), 2);
        // the rotated file holds everything written so far
        let rotated = files
            .iter()
            .find(|p| p.file_name().unwrap() != "test.log")
            .unwrap();
        assert_eq!(fs::read(rotated).unwrap().len(), 34);
        assert_eq!(fs::read(dir.path().join("test.log")).unwrap().len(), 0);
    }

    #[test]
    fn test_retention_keeps_max_files() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::open(&config(dir.path(), 8, 3)).unwrap();

        for i in 0..10 {
            sink.write(format!("record {i}\n").as_bytes()).unwrap();
        }
        sink.flush().unwrap();

        assert_eq!(matching_files(dir.path()).len(), 3);
    }

    #[test]
    fn test_same_second_rotations_do_not_overwrite() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::open(&config(dir.path(), 4, 10)).unwrap();

        // every write rotates; all within one second
        for i in 0..4 {
            sink.write(format!("{i}{i}{i}{i}\n").as_bytes()).unwrap();
        }

        // active + 4 distinct rotated files
        assert_eq!(matching_files(dir.path()).len(), 5);
    }

    #[test]
    fn test_cleanup_ignores_unrelated_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("other.log"), b"keep me\n").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep me too\n").unwrap();

        let mut sink = FileSink::open(&config(dir.path(), 8, 2)).unwrap();
        for i in 0..8 {
            sink.write(format!("record {i}\n").as_bytes()).unwrap();
        }

        assert!(dir.path().join("other.log").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(matching_files(dir.path()).len(), 2);
    }

    #[test]
    fn test_open_failure_surfaces() {
        let dir = tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"not a directory").unwrap();

        let err = FileSink::open(&config(&blocked, 1024, 3)).unwrap_err();
        assert!(matches!(err, Error::FileOpen { .. }));
    }
}
