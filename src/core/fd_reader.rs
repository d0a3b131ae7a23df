use crate::core::LineSource;
use crate::domain::model::Line;
use crate::utils::error::{LabError, Result};
use nix::errno::Errno;
use std::fs::File;
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::Path;

/// Reads lines one byte per `read(2)`.
///
/// No read-ahead is kept, so the kernel file offset always sits right
/// after the last line handed out. A forked child holding a copy of this
/// reader continues exactly where the parent stopped.
#[derive(Debug)]
pub struct RawFdLines {
    fd: OwnedFd,
}

impl RawFdLines {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            LabError::sys("open failed", Errno::from_raw(e.raw_os_error().unwrap_or(0)))
        })?;
        Ok(Self::from_fd(file.into()))
    }

    pub fn from_fd(fd: OwnedFd) -> Self {
        Self { fd }
    }

    fn read_byte(&self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match nix::unistd::read(self.fd.as_raw_fd(), &mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(LabError::sys("read failed", e)),
            }
        }
    }
}

impl LineSource for RawFdLines {
    fn next_line(&mut self) -> Result<Option<Line>> {
        let mut bytes = Vec::new();
        while let Some(byte) = self.read_byte()? {
            bytes.push(byte);
            if byte == b'\n' {
                return Ok(Some(Line {
                    bytes,
                    terminated: true,
                }));
            }
        }

        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Line {
                bytes,
                terminated: false,
            }))
        }
    }
}
