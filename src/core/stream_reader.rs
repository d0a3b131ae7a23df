use crate::core::LineSource;
use crate::domain::model::Line;
use crate::utils::error::{LabError, Result};
use nix::errno::Errno;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Longest chunk handed out at once, as `fgets` with a `BUFSIZ` buffer.
/// Longer lines come back as several unterminated pieces.
pub const MAX_LINE_BYTES: usize = 8191;

/// Line reader backed by a user-space read-ahead buffer.
///
/// The first read pulls up to 8 KiB into memory. After a
/// `fork` the child gets its own copy of that buffer, so both processes
/// hand out the same lines until their buffers run dry.
#[derive(Debug)]
pub struct BufferedLines {
    reader: BufReader<File>,
}

impl BufferedLines {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            LabError::sys("fopen error", Errno::from_raw(e.raw_os_error().unwrap_or(0)))
        })?;
        Ok(Self::new(file))
    }

    pub fn new(file: File) -> Self {
        Self {
            reader: BufReader::new(file),
        }
    }

    /// Bytes read from the file but not yet handed out.
    pub fn buffered(&self) -> usize {
        self.reader.buffer().len()
    }
}

impl LineSource for BufferedLines {
    fn next_line(&mut self) -> Result<Option<Line>> {
        let mut bytes = Vec::new();
        let read = (&mut self.reader)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut bytes)?;
        if read == 0 {
            return Ok(None);
        }

        let terminated = bytes.last() == Some(&b'\n');
        Ok(Some(Line { bytes, terminated }))
    }
}
