use crate::utils::error::Result;
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

/// Unbuffered writer over a raw file descriptor.
///
/// Every `write` is a single `write(2)`, so nothing sits in user space at
/// `fork` time and parent and child append through the same open file
/// description.
#[derive(Debug)]
pub struct FdSink {
    fd: OwnedFd,
}

impl FdSink {
    /// Duplicates fd 1.
    pub fn stdout() -> Result<Self> {
        let fd = io::stdout().as_fd().try_clone_to_owned()?;
        Ok(Self { fd })
    }

    pub fn from_file(file: File) -> Self {
        Self { fd: file.into() }
    }
}

impl AsFd for FdSink {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl Write for FdSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        nix::unistd::write(&self.fd, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
