//! Size-based rolling log file.
//!
//! The active file is `<name>.log`. When it would grow past `max_bytes` it is
//! renamed to `<name>.1.log`, older files shift up by one and the oldest
//! beyond `max_files` is removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct RollingFile {
    dir: PathBuf,
    name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: &Path, name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = Self::path_for(dir, name, 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            dir: dir.to_path_buf(),
            name: name.to_string(),
            max_bytes,
            max_files: max_files.max(1),
            file,
            written,
        })
    }

    /// Path of the active file
    pub fn active_path(&self) -> PathBuf {
        Self::path_for(&self.dir, &self.name, 0)
    }

    fn path_for(dir: &Path, name: &str, index: usize) -> PathBuf {
        if index == 0 {
            dir.join(format!("{}.log", name))
        } else {
            dir.join(format!("{}.{}.log", name, index))
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = Self::path_for(&self.dir, &self.name, self.max_files - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.max_files - 1).rev() {
            let from = Self::path_for(&self.dir, &self.name, index);
            if from.exists() {
                fs::rename(&from, Self::path_for(&self.dir, &self.name, index + 1))?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.active_path())?;
        self.written = 0;
        Ok(())
    }

    /// Append a complete record, rotating first if it would overflow the file
    pub fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        let len = record.len() as u64;
        if self.written > 0 && self.written + len > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(record)?;
        self.written += len;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
