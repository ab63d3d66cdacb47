//! Rolling Logger
//!
//! Installs a global `tracing` subscriber that writes formatted records to a
//! size-rotated log file and keeps the most recent lines in a circular
//! buffer, so the application can show them without touching the disk.
//! Records emitted through the `log` crate are forwarded as well.

mod rolling_file;

use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub use rolling_file::RollingFile;

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Rotate once the active file would exceed this many bytes
    pub max_file_bytes: u64,
    /// Number of files kept, including the active one
    pub max_files: usize,
    /// Capacity of the in-memory line buffer
    pub buffer_lines: usize,
    pub level: log::LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024,
            max_files: 5,
            buffer_lines: 500,
            level: log::LevelFilter::Info,
        }
    }
}

/// Fixed-capacity buffer of the most recent log lines
pub struct LineBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Up to `n` most recent lines, oldest first
    pub fn tail(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

struct Sink {
    file: Mutex<RollingFile>,
    buffer: Mutex<LineBuffer>,
    log_path: PathBuf,
}

static SINK: OnceLock<Arc<Sink>> = OnceLock::new();

/// Writer handed out per record; the record is committed on drop
pub struct RecordWriter {
    sink: Arc<Sink>,
    bytes: Vec<u8>,
}

impl Write for RecordWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        if self.bytes.is_empty() {
            return;
        }
        if let Ok(mut file) = self.sink.file.lock() {
            if let Err(e) = file.write_record(&self.bytes).and_then(|_| file.flush()) {
                eprintln!("rolling-logger: failed to write log file: {}", e);
            }
        }
        if let Ok(mut buffer) = self.sink.buffer.lock() {
            let text = String::from_utf8_lossy(&self.bytes);
            for line in text.lines().filter(|l| !l.is_empty()) {
                buffer.push(line.to_string());
            }
        }
    }
}

#[derive(Clone)]
struct SinkWriter(Arc<Sink>);

impl<'a> MakeWriter<'a> for SinkWriter {
    type Writer = RecordWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RecordWriter {
            sink: self.0.clone(),
            bytes: Vec::new(),
        }
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn to_tracing_level(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Initialize the global logger with default settings
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<PathBuf, String> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize the global logger. Returns the path of the active log file.
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<PathBuf, String> {
    if let Some(sink) = SINK.get() {
        return Ok(sink.log_path.clone());
    }

    let file = RollingFile::open(
        log_dir.as_ref(),
        app_name,
        config.max_file_bytes,
        config.max_files,
    )
    .map_err(|e| format!("Failed to open log file: {}", e))?;
    let log_path = file.active_path();

    let sink = Arc::new(Sink {
        file: Mutex::new(file),
        buffer: Mutex::new(LineBuffer::new(config.buffer_lines)),
        log_path: log_path.clone(),
    });
    if SINK.set(sink.clone()).is_err() {
        return Ok(log_path);
    }

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_target(true)
        .with_writer(SinkWriter(sink));

    tracing_subscriber::registry()
        .with(layer.with_filter(to_tracing_level(config.level)))
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;
    log::set_max_level(config.level);

    Ok(log_path)
}

fn ensure_initialized() -> Result<(), String> {
    if SINK.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent `n` formatted lines, oldest first. Empty before init.
pub fn recent_lines(n: usize) -> Vec<String> {
    SINK.get()
        .and_then(|sink| sink.buffer.lock().ok().map(|b| b.tail(n)))
        .unwrap_or_default()
}

/// Path of the active log file, if initialized
pub fn log_path() -> Option<PathBuf> {
    SINK.get().map(|sink| sink.log_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_drops_oldest() {
        let mut buffer = LineBuffer::new(3);
        for i in 0..5 {
            buffer.push(format!("line {}", i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.tail(10), vec!["line 2", "line 3", "line 4"]);
        assert_eq!(buffer.tail(1), vec!["line 4"]);
    }

    #[test]
    fn test_init_writes_file_and_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_logger(dir.path(), "Test").unwrap();

        info("hello from test").unwrap();
        log::warn!("bridged record");

        let lines = recent_lines(50);
        assert!(lines.iter().any(|l| l.contains("hello from test")));

        // The subscriber is global; a second init is a no-op.
        let again = init_logger(dir.path(), "Other").unwrap();
        assert_eq!(again, path);
        assert_eq!(log_path(), Some(path));
    }
}
