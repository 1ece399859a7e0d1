//! Output file for captured records

use crate::error::{LoggerError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Truncating, line-oriented file writer.
///
/// Each record is flushed as soon as it is written, so the file never
/// holds a partial line no matter when the process stops.
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,
    records: u64,
    bytes: u64,
}

impl OutputSink {
    /// Create `path`, discarding anything a previous run left there
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| LoggerError::Sink {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Writing records to {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            records: 0,
            bytes: 0,
        })
    }

    /// Append one record followed by `\n`
    pub fn write_record(&mut self, record: &str) -> Result<()> {
        writeln!(self.writer, "{}", record)
            .and_then(|_| self.writer.flush())
            .map_err(|source| self.error(source))?;

        self.records += 1;
        self.bytes += record.len() as u64 + 1;
        Ok(())
    }

    /// Flush and close, reporting any error the drop path would swallow
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush().map_err(|source| self.error(source))
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    fn error(&self, source: std::io::Error) -> LoggerError {
        LoggerError::Sink {
            path: self.path.clone(),
            source,
        }
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_records_are_newline_terminated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let mut sink = OutputSink::create(&path).unwrap();
        sink.write_record("a").unwrap();
        sink.write_record("").unwrap();
        sink.write_record("b c").unwrap();

        // Visible before the sink is closed
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n\nb c\n");
        assert_eq!(sink.records(), 3);
        assert_eq!(sink.bytes(), 7);
        sink.finish().unwrap();
    }

    #[test]
    fn test_create_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "left over from last run\n").unwrap();

        let sink = OutputSink::create(&path).unwrap();
        drop(sink);

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");

        let err = OutputSink::create(&path).err().unwrap();
        assert_eq!(err.stage(), "write");
    }
}
