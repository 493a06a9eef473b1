//! Log file acquisition.
//!
//! Opens log files, decompressing `.gz` files transparently, and yields
//! their lines. Invalid UTF-8 is replaced rather than rejected so one bad
//! byte does not abort a large log.

use crate::utils::config::GZIP_SUFFIX;
use crate::utils::error::InputError;
use flate2::read::MultiGzDecoder;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// An open log stream
///
/// The underlying file is closed when the source is dropped, on success and
/// error paths alike.
pub struct LogSource {
    path: PathBuf,
    reader: Box<dyn BufRead>,
    buf: Vec<u8>,
    line_number: usize,
}

impl LogSource {
    /// Open a log file
    ///
    /// # Errors
    /// * `InputError::NotFound` - the path does not exist
    /// * `InputError::ReadFailed` - the file could not be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if is_gzipped(path) {
            debug!("Reading {} as gzip", path.display());
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self::from_reader(path, reader))
    }

    /// Wrap an already-open reader, e.g. stdin or an in-memory buffer
    pub fn from_reader(name: impl Into<PathBuf>, reader: Box<dyn BufRead>) -> Self {
        Self {
            path: name.into(),
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based number of the line most recently returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line without its terminator; `Ok(None)` at end of input
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl Iterator for LogSource {
    type Item = Result<String, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().ends_with(GZIP_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    #[test]
    fn test_plain_lines() {
        let data = b"first\r\nsecond\n\nlast".to_vec();
        let source = LogSource::from_reader("mem", Box::new(Cursor::new(data)));

        let lines: Vec<String> = source.map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["first", "second", "", "last"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let data = b"ok \xff line\n".to_vec();
        let mut source = LogSource::from_reader("mem", Box::new(Cursor::new(data)));

        assert_eq!(source.next_line().unwrap().unwrap(), "ok \u{fffd} line");
        assert_eq!(source.line_number(), 1);
        assert!(source.next_line().unwrap().is_none());
    }

    #[test]
    fn test_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log.gz");

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"one\ntwo\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = LogSource::open(&path).unwrap().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LogSource::open(dir.path().join("nope.log"));

        assert!(matches!(result, Err(InputError::NotFound(_))));
    }
}
