// Tue Jan 13 2026 - Alex

use crate::utils::process::ProcessUtils;
use std::io::{self, ErrorKind, Read};
use std::os::unix::io::AsRawFd;

const READ_CHUNK: usize = 8192;

/// A child pipe that never blocks the reader. Dropping the inner stream
/// closes the descriptor, which happens as soon as EOF is seen.
pub struct PipeReader<R> {
    inner: Option<R>,
}

impl<R: Read + AsRawFd> PipeReader<R> {
    pub fn new(inner: R) -> io::Result<Self> {
        ProcessUtils::set_nonblocking(inner.as_raw_fd())?;
        Ok(Self { inner: Some(inner) })
    }

    /// Appends everything readable right now to `buf`.
    pub fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let Some(reader) = self.inner.as_mut() else {
            return Ok(0);
        };

        let mut chunk = [0u8; READ_CHUNK];
        let mut total = 0;

        loop {
            match reader.read(&mut chunk) {
                Ok(0) => {
                    self.inner = None;
                    break;
                }
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    total += n;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.inner = None;
                    return Err(e);
                }
            }
        }

        Ok(total)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    pub fn close(&mut self) {
        self.inner = None;
    }
}
